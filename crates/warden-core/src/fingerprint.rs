//! Content fingerprinting: canonical digests for duplicate detection.
//!
//! Each segment maps to a tagged token; tokens are joined in segment order
//! and the joined byte string is hashed with BLAKE3. Determinism and order
//! sensitivity are the contract — two messages with identical ordered
//! segments (including byte-identical image content) always collide, and
//! nothing else should.

use crate::error::MediaError;
use crate::traits::MediaFetcher;
use crate::types::{Fingerprint, Message, Segment};

/// Separator between segment tokens in the canonical stream.
const TOKEN_SEPARATOR: &str = "|";

/// Token for a text segment: `text:<blake3(utf8 bytes)>`.
pub fn text_token(text: &str) -> String {
    format!("text:{}", blake3::hash(text.as_bytes()).to_hex())
}

/// Token for an image segment: `image:<blake3(fetched bytes)>`.
pub fn image_token(bytes: &[u8]) -> String {
    format!("image:{}", blake3::hash(bytes).to_hex())
}

/// Hash an ordered token stream into a fingerprint.
pub fn fingerprint_tokens(tokens: &[String]) -> Fingerprint {
    let joined = tokens.join(TOKEN_SEPARATOR);
    Fingerprint(blake3::hash(joined.as_bytes()).into())
}

/// Fingerprint a message, resolving image segments through the media
/// fetcher.
///
/// A fetch failure is surfaced as [`MediaError`] — the caller decides to
/// skip moderation for the message (fail-open), never to guess a digest.
pub async fn fingerprint_message(
    message: &Message,
    media: &dyn MediaFetcher,
) -> Result<Fingerprint, MediaError> {
    let mut tokens = Vec::with_capacity(message.segments.len());
    for segment in &message.segments {
        let token = match segment {
            Segment::Text(text) => text_token(text),
            Segment::Mention(user) => format!("at:{user}"),
            Segment::Sticker(id) => format!("face:{id}"),
            Segment::Image(resource) => {
                let bytes = media.fetch(resource).await?;
                image_token(&bytes)
            }
        };
        tokens.push(token);
    }
    Ok(fingerprint_tokens(&tokens))
}

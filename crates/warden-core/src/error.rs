//! Error types for the Warden engine.
//!
//! Transient collaborator failures (media, gateway, store) are fail-open:
//! the caller logs and skips the moderation effect. Invalid-state conditions
//! (empty lottery, zero weight) are warn-and-no-op.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("fetch failed for {resource}: {reason}")] FetchFailed { resource: String, reason: String },
    #[error("fetch timed out for {0}")] Timeout(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("send failed: {0}")] SendFailed(String),
    #[error("mute failed for user {user}: {reason}")] MuteFailed { user: u64, reason: String },
    #[error("role change failed for user {user}: {reason}")] RoleChangeFailed { user: u64, reason: String },
    #[error("member list unavailable: {0}")] MemberListUnavailable(String),
    #[error("timeout")] Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("append failed: {0}")] AppendFailed(String),
    #[error("query failed: {0}")] QueryFailed(String),
    #[error("storage: {0}")] Storage(String),
    #[error("timeout")] Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("no eligible candidates")] NoCandidates,
    #[error("total weight is zero across {0} candidates")] ZeroTotalWeight(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("malformed subject key: {0}")] Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WardenError {
    #[error(transparent)] Media(#[from] MediaError),
    #[error(transparent)] Gateway(#[from] GatewayError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Lottery(#[from] LotteryError),
    #[error(transparent)] Subject(#[from] SubjectError),
}

impl WardenError {
    /// Whether this error is a transient collaborator failure, as opposed to
    /// an invalid-state signal. Transient failures skip the moderation effect
    /// for the message at hand; invalid states are no-ops with a warning.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WardenError::Media(_) | WardenError::Gateway(_) | WardenError::Store(_)
        )
    }
}

//! Benchmarks for the fingerprint hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use warden_core::fingerprint::{fingerprint_tokens, image_token, text_token};

fn bench_text_token(c: &mut Criterion) {
    let text = "lorem ipsum dolor sit amet ".repeat(8);
    c.bench_function("text_token_200b", |b| {
        b.iter(|| text_token(black_box(&text)))
    });
}

fn bench_image_token(c: &mut Criterion) {
    let bytes = vec![0xABu8; 64 * 1024];
    c.bench_function("image_token_64k", |b| {
        b.iter(|| image_token(black_box(&bytes)))
    });
}

fn bench_fingerprint_tokens(c: &mut Criterion) {
    let tokens: Vec<String> = (0..8).map(|i| text_token(&format!("segment {i}"))).collect();
    c.bench_function("fingerprint_8_tokens", |b| {
        b.iter(|| fingerprint_tokens(black_box(&tokens)))
    });
}

criterion_group!(
    benches,
    bench_text_token,
    bench_image_token,
    bench_fingerprint_tokens
);
criterion_main!(benches);

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sable::aes::{self, AesGcm};
use sable::chacha::{ChaCha20Poly1305, Poly1305, core::block};
use sable::material::{Nonce, SecretKey};
use sable::traits::{Cipher, MacAlgorithm};
use sable::x25519::scalar_mul;

pub fn bench_aes_block(c: &mut Criterion) {
    let round_keys = aes::expand_key_for_encrypting(&[0u8; 32]).unwrap();

    c.bench_function("aes-256 block", |b| {
        b.iter(|| aes::encrypt_block(&round_keys, black_box(&[0u8; 16])))
    });
}

pub fn bench_aes_gcm(c: &mut Criterion) {
    let gcm = AesGcm::aes128();
    let key = SecretKey::from_bytes([0u8; 16]);
    let nonce = Nonce::new([0u8; 12]);
    let message = vec![0u8; 1024];

    c.bench_function("aes-128-gcm 1 KiB", |b| {
        b.iter(|| gcm.encrypt(black_box(&message), &key, &nonce, &[]).unwrap())
    });
}

pub fn bench_chacha20_block(c: &mut Criterion) {
    c.bench_function("chacha20 block", |b| {
        b.iter(|| block(black_box(&[0u8; 32]), 1, black_box(&[0u8; 12])))
    });
}

pub fn bench_chacha20poly1305(c: &mut Criterion) {
    let key = SecretKey::from_bytes([0u8; 32]);
    let nonce = Nonce::new([0u8; 12]);
    let message = vec![0u8; 1024];

    c.bench_function("chacha20-poly1305 1 KiB", |b| {
        b.iter(|| {
            ChaCha20Poly1305
                .encrypt(black_box(&message), &key, &nonce, &[])
                .unwrap()
        })
    });
}

pub fn bench_poly1305(c: &mut Criterion) {
    let key = SecretKey::from_bytes([7u8; 32]);
    let message = vec![0u8; 1024];

    c.bench_function("poly1305 1 KiB", |b| {
        b.iter(|| {
            Poly1305
                .calculate_mac(black_box(&message), &key, &[], &[])
                .unwrap()
        })
    });
}

pub fn bench_x25519(c: &mut Criterion) {
    let mut base = [0u8; 32];
    base[0] = 9;

    c.bench_function("x25519 scalar mul", |b| {
        b.iter(|| scalar_mul(black_box(&[0x42u8; 32]), black_box(&base)))
    });
}

criterion_group!(
    benches,
    bench_aes_block,
    bench_aes_gcm,
    bench_chacha20_block,
    bench_chacha20poly1305,
    bench_poly1305,
    bench_x25519
);
criterion_main!(benches);

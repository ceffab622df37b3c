//! Pure-Rust cryptographic primitives for Sable
//!
//! This crate implements the cryptographic algorithms used throughout the
//! Sable ecosystem from scratch: no external crypto engine is involved in
//! any of the bit-level work. Platform-native providers (where available)
//! plug into the same capability traits from the outside; they are not part
//! of this crate.
//!
//! The focus is on **bit-exact correctness, constant-time execution, and
//! auditability**. Every algorithm follows its published specification and
//! is validated against the official test vectors.
//!
//! # Module overview
//!
//! - `material`
//!   Key material and value types: [`SecretKey`] with its explicit
//!   `destroy()` zeroing path, [`SecretBox`] (ciphertext, nonce, MAC),
//!   [`Nonce`], [`Mac`], [`Signature`], key pairs, and a JWK-like
//!   import/export format for asymmetric keys.
//!
//! - `traits`
//!   The capability contracts ([`Cipher`], [`StreamingCipher`],
//!   [`MacAlgorithm`], [`SignatureAlgorithm`], [`KeyExchangeAlgorithm`])
//!   that each algorithm implements and that callers program against.
//!   Native-provider adapters implement the same traits, so the pure
//!   implementations here are drop-in interchangeable with them.
//!
//! - `aes`
//!   The AES block engine (128/192/256-bit keys, table-driven, FIPS-197)
//!   and the CBC, CTR and GCM operating modes, including the GHASH
//!   polynomial authenticator.
//!
//! - `chacha`
//!   The ChaCha20 stream cipher (RFC 8439), HChaCha20/XChaCha20, the
//!   Poly1305 one-time authenticator, and the composed
//!   ChaCha20-Poly1305 / XChaCha20-Poly1305 AEAD constructions.
//!
//! - `curve25519`
//!   Finite-field and scalar arithmetic modulo `2²⁵⁵ − 19` and the group
//!   order ℓ, plus Edwards-curve group operations. This is the leaf layer
//!   under both signatures and key agreement.
//!
//! - `ed25519` / `x25519`
//!   Ed25519 signatures (RFC 8032) and X25519 key agreement (RFC 7748)
//!   built on the `curve25519` core.
//!
//! - `hmac`
//!   An HMAC [`MacAlgorithm`] adapter over the `hmac`/`sha2` crates, used
//!   where a cipher mode requires a caller-supplied MAC (AES-CBC). Digest
//!   compression functions themselves are deliberately out of scope here.
//!
//! # Design goals
//!
//! - No secret-dependent branches or memory access in the primitives
//! - Explicit, minimal APIs; errors surface immediately and are never
//!   retried internally
//! - Authenticated decryption is fail-closed: no clear text is released
//!   before the MAC has been recomputed and compared in constant time
//! - Key material is wiped on `destroy()` and on drop
//!
//! [`SecretKey`]: material::SecretKey
//! [`SecretBox`]: material::SecretBox
//! [`Nonce`]: material::Nonce
//! [`Mac`]: material::Mac
//! [`Signature`]: material::Signature
//! [`Cipher`]: traits::Cipher
//! [`StreamingCipher`]: traits::StreamingCipher
//! [`MacAlgorithm`]: traits::MacAlgorithm
//! [`SignatureAlgorithm`]: traits::SignatureAlgorithm
//! [`KeyExchangeAlgorithm`]: traits::KeyExchangeAlgorithm

#![forbid(unsafe_code)]

pub mod aes;
pub mod chacha;
pub mod curve25519;
pub mod ed25519;
pub mod error;
pub mod hmac;
pub mod material;
pub mod traits;
pub mod x25519;

pub use error::{Error, Result};
pub use material::{KeyPair, Mac, Nonce, PublicKey, SecretBox, SecretKey, Signature};
pub use traits::{
    Cipher, KeyExchangeAlgorithm, MacAlgorithm, MacSink, SignatureAlgorithm, StreamingCipher,
};

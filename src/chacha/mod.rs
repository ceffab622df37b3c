//! ChaCha20 stream cipher family and Poly1305 authenticator.
//!
//! - `core` implements the ChaCha20 block function (RFC 8439), the
//!   keystream XOR with arbitrary byte offsets, and the HChaCha20 sub-key
//!   derivation used by XChaCha20.
//! - `poly1305` implements the one-time authenticator, both as a direct
//!   function and as a streaming sink.
//! - `aead` composes the two into ChaCha20-Poly1305 and
//!   XChaCha20-Poly1305.

pub mod aead;
pub mod core;
pub mod poly1305;

pub use aead::{ChaCha20Poly1305, XChaCha20Poly1305};
pub use poly1305::Poly1305;

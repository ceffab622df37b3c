//! Key material and value types.
//!
//! This module defines the data the capability traits operate on:
//!
//! - [`SecretKey`] / [`SecretKeyData`]: symmetric key material with an
//!   explicit, irreversible `destroy()` zeroing path,
//! - [`Nonce`]: per-encryption unique value with algorithm-fixed length,
//! - [`SecretBox`]: the authenticated-encryption output triple
//!   (ciphertext, nonce, MAC),
//! - [`Mac`]: a fixed-length authentication tag with constant-time
//!   equality,
//! - [`KeyPair`] / [`PublicKey`] / [`Signature`]: asymmetric key material
//!   and signature values,
//! - [`JsonWebKey`]: a JWK-like interchange format for asymmetric keys.
//!
//! No algorithm logic lives here, only structure and lifecycle. All types
//! are immutable after creation except for the `destroy()` path on secret
//! key material, and none rely on drop order for security beyond best-effort
//! zeroization.

mod jwk;
mod keypair;
mod nonce;
mod secret_box;
mod secret_key;

pub use jwk::JsonWebKey;
pub use keypair::{KeyPair, PublicKey, Signature};
pub use nonce::Nonce;
pub use secret_box::{Mac, SecretBox};
pub use secret_key::{SecretKey, SecretKeyData};

use crate::error::{Error, Result};

/// Fills `buffer` with bytes from the operating system entropy source.
pub(crate) fn fill_random(buffer: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buffer).map_err(|_| Error::Unsupported("system entropy unavailable"))
}

/// Constant-time byte-slice equality.
///
/// Both slices are always scanned in full; only the lengths (which are
/// public for every use in this crate) can short-circuit.
pub(crate) fn constant_time_eq(x: &[u8], y: &[u8]) -> bool {
    if x.len() != y.len() {
        return false;
    }

    x.iter().zip(y).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

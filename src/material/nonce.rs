//! Nonce values.

use crate::error::Result;

use super::fill_random;

/// A per-encryption unique value.
///
/// The required length is fixed per algorithm (16 bytes for AES-CBC/CTR,
/// 12 for AES-GCM and ChaCha20-Poly1305, 24 for XChaCha20) and is checked
/// by the cipher before any work is done. Reusing a `(key, nonce)` pair is
/// a caller-level security violation that no library can detect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// Wraps existing nonce bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generates `length` fresh random nonce bytes.
    pub fn random(length: usize) -> Result<Self> {
        let mut bytes = vec![0u8; length];
        fill_random(&mut bytes)?;

        Ok(Self(bytes))
    }

    /// The nonce bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the nonce is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for Nonce {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Nonce {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

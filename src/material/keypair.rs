//! Asymmetric key pairs, public keys, and signature values.

use crate::error::Result;

use super::SecretKey;
use super::constant_time_eq;

/// A public key: the compressed curve point (Ed25519) or the Montgomery
/// u-coordinate (X25519), as raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wraps public key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The encoded public key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An asymmetric key pair.
///
/// Holds the private key material and the matching public key. The
/// invariant `public == scalar_base_mul(private)` must hold for any pair
/// used in signing or agreement; [`KeyPair::from_components`] trusts the
/// caller to have preserved it and does not recompute the public key.
pub struct KeyPair {
    private: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Reassembles a key pair from previously generated components.
    ///
    /// No recomputation or validation is performed; a mismatched pair will
    /// produce signatures that do not verify and shared secrets that do not
    /// agree, not an error here.
    pub fn from_components(private: SecretKey, public: PublicKey) -> Self {
        Self { private, public }
    }

    /// The private key material.
    pub fn private_key(&self) -> &SecretKey {
        &self.private
    }

    /// Mutable access, for `destroy()`.
    pub fn private_key_mut(&mut self) -> &mut SecretKey {
        &mut self.private
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Extracts the raw private key bytes.
    pub fn extract_private_bytes(&self) -> Result<&[u8]> {
        self.private.extract_bytes()
    }
}

/// A digital signature together with the signer's public key.
///
/// Carrying the public key makes a signature self-contained for
/// verification. Equality of the signature bytes is constant-time.
#[derive(Clone, Debug)]
pub struct Signature {
    bytes: Vec<u8>,
    public_key: PublicKey,
}

impl Signature {
    /// Assembles a signature value.
    pub fn new(bytes: impl Into<Vec<u8>>, public_key: PublicKey) -> Self {
        Self {
            bytes: bytes.into(),
            public_key,
        }
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The signer's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signature length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the signature is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.bytes, &other.bytes) && self.public_key == other.public_key
    }
}

impl Eq for Signature {}

//! Authenticated-encryption output and MAC values.

use crate::error::{Error, Result};

use super::Nonce;
use super::constant_time_eq;

/// A message authentication code.
///
/// Fixed length per algorithm (16 bytes for GCM and Poly1305 tags, digest
/// length for HMAC). Equality is constant-time so a `Mac` can be compared
/// against an attacker-supplied value directly.
#[derive(Clone, Debug)]
pub struct Mac(Vec<u8>);

impl Mac {
    /// Wraps MAC bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The MAC bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the MAC is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for Mac {}

/// The output triple of authenticated encryption.
///
/// `mac` is a function of `cipher_text`, `nonce`, the associated data and
/// the secret key. Decryption recomputes it and compares in constant time
/// before releasing a single clear-text byte.
#[derive(Clone, Debug, PartialEq)]
pub struct SecretBox {
    cipher_text: Vec<u8>,
    nonce: Nonce,
    mac: Mac,
}

impl SecretBox {
    /// Assembles a secret box from its parts.
    pub fn new(cipher_text: impl Into<Vec<u8>>, nonce: Nonce, mac: Mac) -> Self {
        Self {
            cipher_text: cipher_text.into(),
            nonce,
            mac,
        }
    }

    /// The encrypted message bytes.
    pub fn cipher_text(&self) -> &[u8] {
        &self.cipher_text
    }

    /// The nonce the message was encrypted with.
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The authentication tag.
    pub fn mac(&self) -> &Mac {
        &self.mac
    }

    /// Serializes as `nonce || cipher_text || mac`.
    ///
    /// The layout is self-delimiting only together with the algorithm's
    /// fixed nonce and MAC lengths, which is what
    /// [`SecretBox::from_concatenation`] takes.
    pub fn concatenation(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.nonce.len() + self.cipher_text.len() + self.mac.len());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.cipher_text);
        out.extend_from_slice(self.mac.as_bytes());

        out
    }

    /// Parses `nonce || cipher_text || mac` given the algorithm's fixed
    /// nonce and MAC lengths.
    pub fn from_concatenation(
        bytes: &[u8],
        nonce_length: usize,
        mac_length: usize,
    ) -> Result<Self> {
        if bytes.len() < nonce_length + mac_length {
            return Err(Error::InvalidParameter(
                "concatenation shorter than nonce and mac",
            ));
        }

        let (nonce, rest) = bytes.split_at(nonce_length);
        let (cipher_text, mac) = rest.split_at(rest.len() - mac_length);

        Ok(Self {
            cipher_text: cipher_text.to_vec(),
            nonce: Nonce::new(nonce),
            mac: Mac::new(mac),
        })
    }
}

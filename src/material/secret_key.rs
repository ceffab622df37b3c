//! Secret key material.
//!
//! A [`SecretKey`] is either raw byte material owned exclusively by this
//! process ([`SecretKeyData`]) or an opaque handle to a key that lives in an
//! external keystore and may not be exportable. Extraction is the only
//! operation that can fail on an opaque key; destruction is the only
//! mutation allowed on any key.
//!
//! Once `destroy()` has run, the bytes are zeroed and every later read
//! fails with [`Error::KeyDestroyed`]. There is no way back.

use zeroize::Zeroize;

use crate::error::{Error, Result};

use super::fill_random;

/// Raw symmetric key bytes with an explicit destruction path.
///
/// `SecretKeyData` owns its bytes exclusively. Destroying it zeroizes the
/// buffer in place and marks the value invalid; the destroyed state is
/// permanent and observable, which is deliberately different from simply
/// dropping the value.
pub struct SecretKeyData {
    bytes: Vec<u8>,
    destroyed: bool,
}

impl SecretKeyData {
    /// Wraps existing key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            destroyed: false,
        }
    }

    /// Generates `length` fresh random key bytes.
    pub fn random(length: usize) -> Result<Self> {
        let mut bytes = vec![0u8; length];
        fill_random(&mut bytes)?;

        Ok(Self {
            bytes,
            destroyed: false,
        })
    }

    /// Returns the key bytes, or [`Error::KeyDestroyed`].
    pub fn bytes(&self) -> Result<&[u8]> {
        if self.destroyed {
            return Err(Error::KeyDestroyed);
        }

        Ok(&self.bytes)
    }

    /// Irreversibly zeroes and invalidates the key material.
    pub fn destroy(&mut self) {
        self.bytes.zeroize();
        self.destroyed = true;
    }

    /// Whether [`SecretKeyData::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for SecretKeyData {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// A symmetric secret key: raw bytes or an opaque external handle.
///
/// The opaque form models keys generated and held by a native provider;
/// its bytes are materialized lazily at first extraction when the provider
/// marked them exportable, and extraction fails with
/// [`Error::KeyNotExtractable`] otherwise. That failure is distinct from
/// the destroyed state, which always wins.
pub struct SecretKey {
    repr: Repr,
}

enum Repr {
    Data(SecretKeyData),
    Opaque {
        label: String,
        exported: Option<SecretKeyData>,
        destroyed: bool,
    },
}

impl SecretKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            repr: Repr::Data(SecretKeyData::new(bytes)),
        }
    }

    /// Generates a fresh random key of `length` bytes.
    pub fn random(length: usize) -> Result<Self> {
        Ok(Self {
            repr: Repr::Data(SecretKeyData::random(length)?),
        })
    }

    /// Creates a non-exportable opaque handle.
    ///
    /// The pure implementations in this crate cannot operate on such a key;
    /// every extraction fails with [`Error::KeyNotExtractable`]. The variant
    /// exists so callers can pass provider-held keys through the same
    /// capability seam.
    pub fn opaque(label: impl Into<String>) -> Self {
        Self {
            repr: Repr::Opaque {
                label: label.into(),
                exported: None,
                destroyed: false,
            },
        }
    }

    /// Creates an opaque handle whose bytes were exported by the provider.
    pub fn opaque_exportable(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            repr: Repr::Opaque {
                label: label.into(),
                exported: Some(SecretKeyData::new(bytes)),
                destroyed: false,
            },
        }
    }

    /// Returns the raw key bytes.
    ///
    /// Fails with [`Error::KeyDestroyed`] after [`SecretKey::destroy`], and
    /// with [`Error::KeyNotExtractable`] for an opaque handle without
    /// exported bytes.
    pub fn extract_bytes(&self) -> Result<&[u8]> {
        match &self.repr {
            Repr::Data(data) => data.bytes(),
            Repr::Opaque { destroyed: true, .. } => Err(Error::KeyDestroyed),
            Repr::Opaque {
                exported: Some(data),
                ..
            } => data.bytes(),
            Repr::Opaque { exported: None, .. } => Err(Error::KeyNotExtractable),
        }
    }

    /// Irreversibly destroys the key material.
    ///
    /// Raw bytes are zeroed in place. For opaque handles the local copy (if
    /// any) is zeroed and the handle is invalidated; revoking the key inside
    /// the external keystore is the provider's job, not ours.
    pub fn destroy(&mut self) {
        match &mut self.repr {
            Repr::Data(data) => data.destroy(),
            Repr::Opaque {
                exported,
                destroyed,
                ..
            } => {
                if let Some(data) = exported {
                    data.destroy();
                }
                *destroyed = true;
            }
        }
    }

    /// Whether this key has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        match &self.repr {
            Repr::Data(data) => data.is_destroyed(),
            Repr::Opaque { destroyed, .. } => *destroyed,
        }
    }

    /// The keystore label for opaque handles, if any.
    pub fn label(&self) -> Option<&str> {
        match &self.repr {
            Repr::Data(_) => None,
            Repr::Opaque { label, .. } => Some(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroyed_key_fails_every_read() {
        let mut key = SecretKey::from_bytes([7u8; 32]);
        assert_eq!(key.extract_bytes().unwrap(), &[7u8; 32]);

        key.destroy();
        assert!(key.is_destroyed());
        assert_eq!(key.extract_bytes(), Err(Error::KeyDestroyed));

        // destroy is idempotent
        key.destroy();
        assert_eq!(key.extract_bytes(), Err(Error::KeyDestroyed));
    }

    #[test]
    fn opaque_key_is_not_extractable() {
        let key = SecretKey::opaque("hsm:key-1");
        assert_eq!(key.extract_bytes(), Err(Error::KeyNotExtractable));
        assert_eq!(key.label(), Some("hsm:key-1"));
    }

    #[test]
    fn opaque_exported_bytes_round_trip() {
        let mut key = SecretKey::opaque_exportable("hsm:key-2", [1u8; 16]);
        assert_eq!(key.extract_bytes().unwrap(), &[1u8; 16]);

        key.destroy();
        assert_eq!(key.extract_bytes(), Err(Error::KeyDestroyed));
    }
}

//! Capability contracts implemented by the algorithms in this crate.
//!
//! Each trait describes one cryptographic capability, independently of the
//! algorithm that provides it. Exactly one pure implementation exists per
//! algorithm here; platform-native adapters implement the same traits
//! elsewhere and are substitutable without any change in calling code.
//!
//! The traits take their inputs by reference and return freshly allocated
//! values. None of the operations block, suspend, or retry, and none keep
//! state between calls; the only stateful object is the [`MacSink`], whose
//! `add* → close → mac` order is enforced explicitly.
//!
//! Parameter validation happens eagerly: a key or nonce of the wrong length
//! is rejected before any cryptographic work starts.

use crate::error::Result;
use crate::material::{KeyPair, Mac, Nonce, PublicKey, SecretBox, SecretKey, Signature};

/// Authenticated encryption of byte messages.
///
/// `encrypt` seals a message into a [`SecretBox`]; `decrypt` recomputes the
/// MAC, compares it in constant time, and only then releases clear text.
pub trait Cipher {
    /// Secret key length in bytes.
    fn key_length(&self) -> usize;

    /// Nonce length in bytes expected by this cipher.
    fn nonce_length(&self) -> usize;

    /// MAC length in bytes produced by this cipher.
    fn mac_length(&self) -> usize;

    /// Generates a random secret key of the correct length.
    fn new_secret_key(&self) -> Result<SecretKey> {
        SecretKey::random(self.key_length())
    }

    /// Generates a random nonce of the correct length.
    ///
    /// Uniqueness per key is still the caller's responsibility; this only
    /// guarantees correct length and fresh randomness.
    fn new_nonce(&self) -> Result<Nonce> {
        Nonce::random(self.nonce_length())
    }

    /// Encrypts and authenticates `clear_text`.
    fn encrypt(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
    ) -> Result<SecretBox>;

    /// Authenticates and decrypts a [`SecretBox`].
    ///
    /// Fails closed with [`crate::Error::AuthenticationFailed`] when the MAC
    /// does not match; no clear text is released in that case.
    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>>;
}

/// A cipher whose keystream can be entered at an arbitrary byte offset.
///
/// `key_stream_index` selects the position inside the keystream at which
/// the message starts. Encrypting at offset `k` and decrypting at the same
/// offset recovers the message; engines that cannot honor an offset reject
/// non-zero values with [`crate::Error::Unsupported`] before doing any work.
pub trait StreamingCipher: Cipher {
    /// Encrypts with the keystream entered at `key_stream_index`.
    fn encrypt_at(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox>;

    /// Decrypts with the keystream entered at `key_stream_index`.
    fn decrypt_at(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>>;
}

/// Incremental MAC computation.
///
/// A sink is a strict state machine: any number of `add` calls, then one
/// `close`, then `mac`. Adding after close fails with
/// [`crate::Error::SinkClosed`]; asking for the MAC before close fails with
/// [`crate::Error::SinkNotClosed`]. Sinks are not thread-safe; concurrent
/// use must be serialized by the caller.
pub trait MacSink {
    /// Feeds more message bytes into the MAC computation.
    fn add(&mut self, chunk: &[u8]) -> Result<()>;

    /// Finishes absorbing input. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Returns the final MAC. Only valid after [`MacSink::close`].
    fn mac(&mut self) -> Result<Mac>;
}

/// Message authentication codes.
pub trait MacAlgorithm {
    /// MAC length in bytes.
    fn mac_length(&self) -> usize;

    /// Opens a streaming sink for incremental MAC computation.
    fn open_sink(&self, key: &SecretKey, nonce: &[u8], aad: &[u8]) -> Result<Box<dyn MacSink>>;

    /// Computes the MAC of a complete message in one call.
    fn calculate_mac(
        &self,
        message: &[u8],
        key: &SecretKey,
        nonce: &[u8],
        aad: &[u8],
    ) -> Result<Mac> {
        let mut sink = self.open_sink(key, nonce, aad)?;
        sink.add(message)?;
        sink.close()?;
        sink.mac()
    }
}

/// Digital signatures.
pub trait SignatureAlgorithm {
    /// Public key length in bytes.
    fn public_key_length(&self) -> usize;

    /// Signature length in bytes.
    fn signature_length(&self) -> usize;

    /// Generates a fresh signing key pair.
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Signs a message. The returned [`Signature`] carries the signer's
    /// public key so it can be verified on its own.
    fn sign(&self, message: &[u8], key_pair: &KeyPair) -> Result<Signature>;

    /// Verifies a signature over a message.
    ///
    /// Returns `Ok(false)` for any cryptographically invalid or
    /// non-canonical signature; `Err` is reserved for structurally
    /// impossible inputs (e.g. a destroyed key).
    fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool>;
}

/// Diffie-Hellman style key agreement.
pub trait KeyExchangeAlgorithm {
    /// Public key length in bytes.
    fn public_key_length(&self) -> usize;

    /// Generates a fresh agreement key pair.
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Computes the shared secret between our key pair and a remote public
    /// key. Both sides computing with swapped roles obtain byte-identical
    /// secrets.
    fn shared_secret(&self, key_pair: &KeyPair, remote_public_key: &PublicKey)
    -> Result<SecretKey>;
}

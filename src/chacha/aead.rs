//! ChaCha20-Poly1305 and XChaCha20-Poly1305 AEAD (RFC 8439 §2.8).
//!
//! The construction:
//!
//! 1. The Poly1305 one-time key is the first 32 bytes of the ChaCha20
//!    keystream block at counter 0.
//! 2. The message is encrypted with the keystream starting at counter 1.
//! 3. The tag authenticates `AAD ‖ pad16 ‖ ciphertext ‖ pad16 ‖
//!    len(AAD)₆₄ ‖ len(ciphertext)₆₄`, lengths little-endian.
//!
//! XChaCha20-Poly1305 is the same construction after deriving a sub-key
//! with HChaCha20 from the first 16 bytes of the 24-byte nonce; the
//! remaining 8 bytes form the low part of the effective 96-bit nonce.
//!
//! Decryption recomputes the tag and compares it in constant time before
//! any keystream is applied; on mismatch no clear text exists, even
//! internally.

use crate::error::{Error, Result};
use crate::material::{Mac, Nonce, SecretBox, SecretKey};
use crate::traits::{Cipher, StreamingCipher};

use super::core::{block, hchacha20, keystream_xor};
use super::poly1305::Poly1305State;

/// ChaCha20-Poly1305 with the standard 96-bit nonce.
pub struct ChaCha20Poly1305;

/// XChaCha20-Poly1305 with a 192-bit nonce.
pub struct XChaCha20Poly1305;

fn check_key(key: &SecretKey) -> Result<[u8; 32]> {
    let key_bytes = key.extract_bytes()?;
    key_bytes.try_into().map_err(|_| Error::InvalidKeyLength {
        got: key_bytes.len(),
        expected: "32 bytes",
    })
}

/// RFC 8439 §2.8 tag over AAD and ciphertext.
fn authenticate(one_time_key: &[u8; 32], aad: &[u8], cipher_text: &[u8]) -> Mac {
    let zero_pad = [0u8; 16];
    let mut state = Poly1305State::new(one_time_key);

    state.update(aad);
    state.update(&zero_pad[..(16 - aad.len() % 16) % 16]);

    state.update(cipher_text);
    state.update(&zero_pad[..(16 - cipher_text.len() % 16) % 16]);

    state.update(&(aad.len() as u64).to_le_bytes());
    state.update(&(cipher_text.len() as u64).to_le_bytes());

    Mac::new(state.finalize())
}

fn seal(
    key: &[u8; 32],
    nonce: &[u8; 12],
    clear_text: &[u8],
    aad: &[u8],
    key_stream_index: usize,
) -> (Vec<u8>, Mac) {
    let block0 = block(key, 0, nonce);
    let one_time_key: [u8; 32] = block0[..32].try_into().expect("block is 64 bytes");

    let cipher_text = keystream_xor(key, nonce, 1, key_stream_index, clear_text);
    let mac = authenticate(&one_time_key, aad, &cipher_text);

    (cipher_text, mac)
}

fn open(
    key: &[u8; 32],
    nonce: &[u8; 12],
    cipher_text: &[u8],
    mac: &Mac,
    aad: &[u8],
    key_stream_index: usize,
) -> Result<Vec<u8>> {
    let block0 = block(key, 0, nonce);
    let one_time_key: [u8; 32] = block0[..32].try_into().expect("block is 64 bytes");

    let expected = authenticate(&one_time_key, aad, cipher_text);
    if &expected != mac {
        return Err(Error::AuthenticationFailed);
    }

    Ok(keystream_xor(key, nonce, 1, key_stream_index, cipher_text))
}

fn standard_nonce(nonce: &Nonce) -> Result<[u8; 12]> {
    nonce
        .as_bytes()
        .try_into()
        .map_err(|_| Error::InvalidNonceLength {
            got: nonce.len(),
            expected: "12 bytes",
        })
}

/// Reduces a 24-byte XChaCha20 nonce to a sub-key and 12-byte sub-nonce.
fn extended_nonce(key: &[u8; 32], nonce: &Nonce) -> Result<([u8; 32], [u8; 12])> {
    let bytes: &[u8; 24] = nonce
        .as_bytes()
        .try_into()
        .map_err(|_| Error::InvalidNonceLength {
            got: nonce.len(),
            expected: "24 bytes",
        })?;

    let derivation: &[u8; 16] = bytes[..16].try_into().expect("16 bytes");
    let sub_key = hchacha20(key, derivation);

    let mut sub_nonce = [0u8; 12];
    sub_nonce[4..].copy_from_slice(&bytes[16..]);

    Ok((sub_key, sub_nonce))
}

impl Cipher for ChaCha20Poly1305 {
    fn key_length(&self) -> usize {
        32
    }

    fn nonce_length(&self) -> usize {
        12
    }

    fn mac_length(&self) -> usize {
        16
    }

    fn encrypt(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
    ) -> Result<SecretBox> {
        self.encrypt_at(clear_text, key, nonce, aad, 0)
    }

    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_at(secret_box, key, aad, 0)
    }
}

impl StreamingCipher for ChaCha20Poly1305 {
    fn encrypt_at(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox> {
        let key_bytes = check_key(key)?;
        let nonce_bytes = standard_nonce(nonce)?;

        let (cipher_text, mac) = seal(&key_bytes, &nonce_bytes, clear_text, aad, key_stream_index);
        Ok(SecretBox::new(cipher_text, nonce.clone(), mac))
    }

    fn decrypt_at(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>> {
        let key_bytes = check_key(key)?;
        let nonce_bytes = standard_nonce(secret_box.nonce())?;

        open(
            &key_bytes,
            &nonce_bytes,
            secret_box.cipher_text(),
            secret_box.mac(),
            aad,
            key_stream_index,
        )
    }
}

impl Cipher for XChaCha20Poly1305 {
    fn key_length(&self) -> usize {
        32
    }

    fn nonce_length(&self) -> usize {
        24
    }

    fn mac_length(&self) -> usize {
        16
    }

    fn encrypt(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
    ) -> Result<SecretBox> {
        self.encrypt_at(clear_text, key, nonce, aad, 0)
    }

    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_at(secret_box, key, aad, 0)
    }
}

impl StreamingCipher for XChaCha20Poly1305 {
    fn encrypt_at(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox> {
        let key_bytes = check_key(key)?;
        let (sub_key, sub_nonce) = extended_nonce(&key_bytes, nonce)?;

        let (cipher_text, mac) = seal(&sub_key, &sub_nonce, clear_text, aad, key_stream_index);
        Ok(SecretBox::new(cipher_text, nonce.clone(), mac))
    }

    fn decrypt_at(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>> {
        let key_bytes = check_key(key)?;
        let (sub_key, sub_nonce) = extended_nonce(&key_bytes, secret_box.nonce())?;

        open(
            &sub_key,
            &sub_nonce,
            secret_box.cipher_text(),
            secret_box.mac(),
            aad,
            key_stream_index,
        )
    }
}

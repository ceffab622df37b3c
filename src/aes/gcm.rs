//! AES-GCM authenticated encryption (NIST SP 800-38D).
//!
//! GCM encrypts with a CTR keystream derived from the nonce and
//! authenticates AAD and ciphertext with GHASH under the hash subkey
//! `H = E(K, 0¹²⁸)`:
//!
//! 1. For a 96-bit nonce, `J0 = nonce ‖ 0³¹ ‖ 1`; for a 128-bit nonce,
//!    `J0 = GHASH(nonce ‖ padding ‖ length)`.
//! 2. Ciphertext comes from counters `inc32(J0), inc32²(J0), …`.
//! 3. The tag is `GHASH(AAD, ciphertext) ⊕ E(K, J0)`, truncated to the
//!    configured tag length.
//!
//! Decryption recomputes the tag and compares it in constant time against
//! the received one, which must match the configured length exactly; on any
//! mismatch the operation fails closed and no clear text is produced, not
//! even internally.

use crate::error::{Error, Result};
use crate::material::{Mac, Nonce, SecretBox, SecretKey};
use crate::traits::{Cipher, StreamingCipher};

use super::block::{BLOCK_LENGTH, RoundKeys, encrypt_block, expand_key_for_encrypting};
use super::ghash::Ghash;

/// AES in Galois/Counter mode.
pub struct AesGcm {
    key_length: usize,
    nonce_length: usize,
    tag_length: usize,
}

impl AesGcm {
    /// AES-128-GCM with a 12-byte nonce and a 16-byte tag.
    pub fn aes128() -> Self {
        Self::new(16)
    }

    /// AES-192-GCM with a 12-byte nonce and a 16-byte tag.
    pub fn aes192() -> Self {
        Self::new(24)
    }

    /// AES-256-GCM with a 12-byte nonce and a 16-byte tag.
    pub fn aes256() -> Self {
        Self::new(32)
    }

    fn new(key_length: usize) -> Self {
        Self {
            key_length,
            nonce_length: 12,
            tag_length: 16,
        }
    }

    /// Selects a 96-bit or 128-bit nonce.
    pub fn with_nonce_length(mut self, nonce_length: usize) -> Result<Self> {
        if !matches!(nonce_length, 12 | 16) {
            return Err(Error::InvalidParameter("nonce must be 12 or 16 bytes"));
        }

        self.nonce_length = nonce_length;
        Ok(self)
    }

    /// Negotiates the tag length, in whole bytes from 4 to 16.
    pub fn with_tag_length(mut self, tag_length: usize) -> Result<Self> {
        if !(4..=16).contains(&tag_length) {
            return Err(Error::InvalidParameter("tag must be 4 to 16 bytes"));
        }

        self.tag_length = tag_length;
        Ok(self)
    }

    fn round_keys(&self, key: &SecretKey) -> Result<RoundKeys> {
        let key_bytes = key.extract_bytes()?;
        if key_bytes.len() != self.key_length {
            return Err(Error::InvalidKeyLength {
                got: key_bytes.len(),
                expected: "the configured AES key length",
            });
        }

        expand_key_for_encrypting(key_bytes)
    }

    fn check_nonce(&self, nonce: &Nonce) -> Result<()> {
        if nonce.len() != self.nonce_length {
            return Err(Error::InvalidNonceLength {
                got: nonce.len(),
                expected: "the configured GCM nonce length",
            });
        }

        Ok(())
    }

    /// Derives the pre-counter block J0 from the nonce.
    fn initial_counter(h: &[u8; BLOCK_LENGTH], nonce: &[u8]) -> [u8; BLOCK_LENGTH] {
        if nonce.len() == 12 {
            let mut j0 = [0u8; BLOCK_LENGTH];
            j0[..12].copy_from_slice(nonce);
            j0[15] = 1;
            return j0;
        }

        let mut ghash = Ghash::new(h);
        ghash.update_padded(nonce);
        ghash.update_lengths(0, nonce.len() as u64);
        ghash.output()
    }

    /// Generates the CTR keystream from `inc32(J0)` and XORs it over `data`.
    fn counter_xor(
        round_keys: &RoundKeys,
        j0: &[u8; BLOCK_LENGTH],
        data: &[u8],
    ) -> Vec<u8> {
        let mut counter = *j0;
        let mut output = Vec::with_capacity(data.len());
        let mut offset = 0usize;

        while offset < data.len() {
            inc32(&mut counter);
            let keystream = encrypt_block(round_keys, &counter);

            let take = (data.len() - offset).min(BLOCK_LENGTH);
            for i in 0..take {
                output.push(data[offset + i] ^ keystream[i]);
            }

            offset += take;
        }

        output
    }

    fn tag(
        round_keys: &RoundKeys,
        h: &[u8; BLOCK_LENGTH],
        j0: &[u8; BLOCK_LENGTH],
        aad: &[u8],
        cipher_text: &[u8],
        tag_length: usize,
    ) -> Vec<u8> {
        let mut ghash = Ghash::new(h);
        ghash.update_padded(aad);
        ghash.update_padded(cipher_text);
        ghash.update_lengths(aad.len() as u64, cipher_text.len() as u64);

        let mask = encrypt_block(round_keys, j0);
        let mut tag = ghash.output();
        for (t, m) in tag.iter_mut().zip(&mask) {
            *t ^= m;
        }

        tag[..tag_length].to_vec()
    }
}

/// Increments the low 32 bits of a big-endian counter block.
fn inc32(block: &mut [u8; BLOCK_LENGTH]) {
    let mut value = u32::from_be_bytes(block[12..].try_into().expect("4 bytes"));
    value = value.wrapping_add(1);
    block[12..].copy_from_slice(&value.to_be_bytes());
}

impl Cipher for AesGcm {
    fn key_length(&self) -> usize {
        self.key_length
    }

    fn nonce_length(&self) -> usize {
        self.nonce_length
    }

    fn mac_length(&self) -> usize {
        self.tag_length
    }

    fn encrypt(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
    ) -> Result<SecretBox> {
        self.check_nonce(nonce)?;
        let round_keys = self.round_keys(key)?;

        let h = encrypt_block(&round_keys, &[0u8; BLOCK_LENGTH]);
        let j0 = Self::initial_counter(&h, nonce.as_bytes());

        let cipher_text = Self::counter_xor(&round_keys, &j0, clear_text);
        let tag = Self::tag(&round_keys, &h, &j0, aad, &cipher_text, self.tag_length);

        Ok(SecretBox::new(cipher_text, nonce.clone(), Mac::new(tag)))
    }

    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>> {
        self.check_nonce(secret_box.nonce())?;
        let round_keys = self.round_keys(key)?;

        let h = encrypt_block(&round_keys, &[0u8; BLOCK_LENGTH]);
        let j0 = Self::initial_counter(&h, secret_box.nonce().as_bytes());

        let expected = Mac::new(Self::tag(
            &round_keys,
            &h,
            &j0,
            aad,
            secret_box.cipher_text(),
            self.tag_length,
        ));

        // Mac equality is constant-time and length-aware, so a truncated or
        // extended tag fails here as well.
        if &expected != secret_box.mac() {
            return Err(Error::AuthenticationFailed);
        }

        Ok(Self::counter_xor(
            &round_keys,
            &j0,
            secret_box.cipher_text(),
        ))
    }
}

impl StreamingCipher for AesGcm {
    fn encrypt_at(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox> {
        if key_stream_index != 0 {
            return Err(Error::Unsupported("GCM cannot enter the keystream mid-way"));
        }

        self.encrypt(clear_text, key, nonce, aad)
    }

    fn decrypt_at(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>> {
        if key_stream_index != 0 {
            return Err(Error::Unsupported("GCM cannot enter the keystream mid-way"));
        }

        self.decrypt(secret_box, key, aad)
    }
}

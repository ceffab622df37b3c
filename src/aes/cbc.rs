//! AES-CBC: cipher block chaining with caller-selected padding and MAC.
//!
//! CBC chains ciphertext blocks: `c[i] = E(k, p[i] ⊕ c[i-1])` with the
//! 16-byte nonce as `c[-1]`. The mode is not authenticated by itself, so
//! every instance carries a caller-supplied MAC algorithm; decryption
//! verifies the MAC over `cipher_text ‖ nonce` before the first block is
//! touched, and unpadding runs only on authenticated data.
//!
//! Padding is PKCS#7 by default (always adds 1..=16 bytes, so the empty
//! message encrypts to one block). Zero padding is available for callers
//! that track message lengths themselves; it cannot be removed
//! unambiguously and is therefore not stripped on decryption.

use crate::error::{Error, Result};
use crate::material::{Nonce, SecretBox, SecretKey};
use crate::traits::{Cipher, MacAlgorithm};

use super::block::{
    BLOCK_LENGTH, RoundKeys, decrypt_block, encrypt_block, expand_key_for_decrypting,
    expand_key_for_encrypting,
};

/// Padding scheme applied before chaining.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Padding {
    /// PKCS#7: pad with `n` bytes of value `n`, `1 ..= 16`. Stripped and
    /// validated on decryption.
    #[default]
    Pkcs7,
    /// Pad with zero bytes up to the block boundary. Nothing is stripped on
    /// decryption; the caller owns the clear-text length.
    Zero,
}

/// AES in CBC mode with a caller-supplied MAC algorithm.
pub struct AesCbc<M: MacAlgorithm> {
    key_length: usize,
    padding: Padding,
    mac_algorithm: M,
}

impl<M: MacAlgorithm> AesCbc<M> {
    /// AES-128-CBC with PKCS#7 padding.
    pub fn aes128(mac_algorithm: M) -> Self {
        Self::new(16, mac_algorithm)
    }

    /// AES-192-CBC with PKCS#7 padding.
    pub fn aes192(mac_algorithm: M) -> Self {
        Self::new(24, mac_algorithm)
    }

    /// AES-256-CBC with PKCS#7 padding.
    pub fn aes256(mac_algorithm: M) -> Self {
        Self::new(32, mac_algorithm)
    }

    fn new(key_length: usize, mac_algorithm: M) -> Self {
        Self {
            key_length,
            padding: Padding::Pkcs7,
            mac_algorithm,
        }
    }

    /// Selects the padding scheme.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    fn check_key<'k>(&self, key: &'k SecretKey) -> Result<&'k [u8]> {
        let key_bytes = key.extract_bytes()?;
        if key_bytes.len() != self.key_length {
            return Err(Error::InvalidKeyLength {
                got: key_bytes.len(),
                expected: "the configured AES key length",
            });
        }

        Ok(key_bytes)
    }

    fn check_nonce(&self, nonce: &Nonce) -> Result<()> {
        if nonce.len() != BLOCK_LENGTH {
            return Err(Error::InvalidNonceLength {
                got: nonce.len(),
                expected: "16 bytes",
            });
        }

        Ok(())
    }

    fn pad(&self, clear_text: &[u8]) -> Vec<u8> {
        let mut padded = clear_text.to_vec();

        match self.padding {
            Padding::Pkcs7 => {
                let fill = BLOCK_LENGTH - clear_text.len() % BLOCK_LENGTH;
                padded.resize(clear_text.len() + fill, fill as u8);
            }
            Padding::Zero => {
                let rem = clear_text.len() % BLOCK_LENGTH;
                if rem != 0 {
                    padded.resize(clear_text.len() + BLOCK_LENGTH - rem, 0);
                }
            }
        }

        padded
    }

    fn unpad(&self, mut clear_text: Vec<u8>) -> Result<Vec<u8>> {
        match self.padding {
            Padding::Pkcs7 => {
                let fill = *clear_text.last().ok_or(Error::InvalidParameter(
                    "pkcs7 clear text cannot be empty",
                ))? as usize;

                if fill == 0 || fill > BLOCK_LENGTH || fill > clear_text.len() {
                    return Err(Error::InvalidParameter("invalid pkcs7 padding"));
                }

                let body = clear_text.len() - fill;
                if clear_text[body..].iter().any(|&b| b as usize != fill) {
                    return Err(Error::InvalidParameter("invalid pkcs7 padding"));
                }

                clear_text.truncate(body);
                Ok(clear_text)
            }
            Padding::Zero => Ok(clear_text),
        }
    }

    fn chain_encrypt(round_keys: &RoundKeys, nonce: &[u8], padded: &[u8]) -> Vec<u8> {
        let mut previous: [u8; BLOCK_LENGTH] = nonce.try_into().expect("nonce is 16 bytes");
        let mut cipher_text = Vec::with_capacity(padded.len());

        for chunk in padded.chunks_exact(BLOCK_LENGTH) {
            let mut block = [0u8; BLOCK_LENGTH];
            for (b, (p, c)) in block.iter_mut().zip(chunk.iter().zip(&previous)) {
                *b = p ^ c;
            }

            previous = encrypt_block(round_keys, &block);
            cipher_text.extend_from_slice(&previous);
        }

        cipher_text
    }

    fn chain_decrypt(round_keys: &RoundKeys, nonce: &[u8], cipher_text: &[u8]) -> Vec<u8> {
        let mut previous: [u8; BLOCK_LENGTH] = nonce.try_into().expect("nonce is 16 bytes");
        let mut clear_text = Vec::with_capacity(cipher_text.len());

        for chunk in cipher_text.chunks_exact(BLOCK_LENGTH) {
            let block: [u8; BLOCK_LENGTH] = chunk.try_into().expect("chunk is 16 bytes");
            let decrypted = decrypt_block(round_keys, &block);

            for (d, c) in decrypted.iter().zip(&previous) {
                clear_text.push(d ^ c);
            }

            previous = block;
        }

        clear_text
    }
}

impl<M: MacAlgorithm> Cipher for AesCbc<M> {
    fn key_length(&self) -> usize {
        self.key_length
    }

    fn nonce_length(&self) -> usize {
        BLOCK_LENGTH
    }

    fn mac_length(&self) -> usize {
        self.mac_algorithm.mac_length()
    }

    fn encrypt(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
    ) -> Result<SecretBox> {
        self.check_nonce(nonce)?;
        let key_bytes = self.check_key(key)?;
        let round_keys = expand_key_for_encrypting(key_bytes)?;

        let padded = self.pad(clear_text);
        let cipher_text = Self::chain_encrypt(&round_keys, nonce.as_bytes(), &padded);

        let mut mac_input = cipher_text.clone();
        mac_input.extend_from_slice(nonce.as_bytes());
        let mac = self
            .mac_algorithm
            .calculate_mac(&mac_input, key, nonce.as_bytes(), aad)?;

        Ok(SecretBox::new(cipher_text, nonce.clone(), mac))
    }

    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>> {
        self.check_nonce(secret_box.nonce())?;
        let key_bytes = self.check_key(key)?;

        let cipher_text = secret_box.cipher_text();
        if cipher_text.is_empty() || cipher_text.len() % BLOCK_LENGTH != 0 {
            if self.padding == Padding::Zero && cipher_text.is_empty() {
                // Zero padding admits the empty message.
            } else {
                return Err(Error::InvalidParameter(
                    "cipher text length is not a positive multiple of 16",
                ));
            }
        }

        // Authenticate before touching a single block.
        let mut mac_input = cipher_text.to_vec();
        mac_input.extend_from_slice(secret_box.nonce().as_bytes());
        let expected = self.mac_algorithm.calculate_mac(
            &mac_input,
            key,
            secret_box.nonce().as_bytes(),
            aad,
        )?;

        if &expected != secret_box.mac() {
            return Err(Error::AuthenticationFailed);
        }

        let round_keys = expand_key_for_decrypting(key_bytes)?;
        let clear_text = Self::chain_decrypt(&round_keys, secret_box.nonce().as_bytes(), cipher_text);

        self.unpad(clear_text)
    }
}

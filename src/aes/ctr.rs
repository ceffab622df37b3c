//! AES-CTR: counter mode with keystream offsets.
//!
//! The 16-byte nonce seeds a 128-bit counter block; successive keystream
//! blocks are the encryptions of the incremented counter. Only the low
//! `counter_bits` bits of the block participate in the increment (64 by
//! default), wrapping inside that window; with a 64-bit counter the safe
//! message size per nonce is unbounded for practical purposes.
//!
//! CTR itself provides no authentication; like CBC, this implementation
//! authenticates through the caller-supplied MAC algorithm, computed over
//! `cipher_text ‖ nonce` and verified before any clear text is produced.
//!
//! `key_stream_index` enters the keystream at an arbitrary byte offset:
//! generation starts at block `index / 16` and the first `index % 16` bytes
//! of that block are discarded.

use crate::error::{Error, Result};
use crate::material::{Nonce, SecretBox, SecretKey};
use crate::traits::{Cipher, MacAlgorithm, StreamingCipher};

use super::block::{BLOCK_LENGTH, RoundKeys, encrypt_block, expand_key_for_encrypting};

/// AES in counter mode, authenticated by a caller-supplied MAC.
pub struct AesCtr<M: MacAlgorithm> {
    key_length: usize,
    counter_bits: u32,
    mac_algorithm: M,
}

impl<M: MacAlgorithm> AesCtr<M> {
    /// AES-128-CTR with a 64-bit counter.
    pub fn aes128(mac_algorithm: M) -> Self {
        Self::new(16, mac_algorithm)
    }

    /// AES-192-CTR with a 64-bit counter.
    pub fn aes192(mac_algorithm: M) -> Self {
        Self::new(24, mac_algorithm)
    }

    /// AES-256-CTR with a 64-bit counter.
    pub fn aes256(mac_algorithm: M) -> Self {
        Self::new(32, mac_algorithm)
    }

    fn new(key_length: usize, mac_algorithm: M) -> Self {
        Self {
            key_length,
            counter_bits: 64,
            mac_algorithm,
        }
    }

    /// Overrides the counter width. Accepts 32, 64 or 128 bits.
    pub fn with_counter_bits(mut self, counter_bits: u32) -> Result<Self> {
        if !matches!(counter_bits, 32 | 64 | 128) {
            return Err(Error::InvalidParameter("counter width must be 32, 64 or 128"));
        }

        self.counter_bits = counter_bits;
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
        if nonce.len() != BLOCK_LENGTH {
            return Err(Error::InvalidNonceLength {
                got: nonce.len(),
                expected: "16 bytes",
            });
        }

        Ok(())
    }

    /// XORs `data` against the keystream starting at byte `key_stream_index`.
    fn keystream_xor(
        &self,
        round_keys: &RoundKeys,
        nonce: &[u8],
        data: &[u8],
        key_stream_index: usize,
    ) -> Vec<u8> {
        let mut counter: [u8; BLOCK_LENGTH] = nonce.try_into().expect("nonce is 16 bytes");
        add_to_counter(
            &mut counter,
            (key_stream_index / BLOCK_LENGTH) as u128,
            self.counter_bits,
        );

        let mut skip = key_stream_index % BLOCK_LENGTH;
        let mut output = Vec::with_capacity(data.len());
        let mut offset = 0usize;

        while offset < data.len() {
            let keystream = encrypt_block(round_keys, &counter);
            add_to_counter(&mut counter, 1, self.counter_bits);

            let take = (data.len() - offset).min(BLOCK_LENGTH - skip);
            for i in 0..take {
                output.push(data[offset + i] ^ keystream[skip + i]);
            }

            offset += take;
            skip = 0;
        }

        output
    }

    fn seal(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox> {
        self.check_nonce(nonce)?;
        let round_keys = self.round_keys(key)?;

        let cipher_text =
            self.keystream_xor(&round_keys, nonce.as_bytes(), clear_text, key_stream_index);

        let mut mac_input = cipher_text.clone();
        mac_input.extend_from_slice(nonce.as_bytes());
        let mac = self
            .mac_algorithm
            .calculate_mac(&mac_input, key, nonce.as_bytes(), aad)?;

        Ok(SecretBox::new(cipher_text, nonce.clone(), mac))
    }

    fn open(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>> {
        self.check_nonce(secret_box.nonce())?;
        let round_keys = self.round_keys(key)?;

        let mut mac_input = secret_box.cipher_text().to_vec();
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

        Ok(self.keystream_xor(
            &round_keys,
            secret_box.nonce().as_bytes(),
            secret_box.cipher_text(),
            key_stream_index,
        ))
    }
}

/// Adds `amount` into the low `counter_bits` bits of a big-endian counter
/// block, wrapping inside that window.
fn add_to_counter(block: &mut [u8; BLOCK_LENGTH], amount: u128, counter_bits: u32) {
    let window = (counter_bits / 8) as usize;
    let start = BLOCK_LENGTH - window;

    let mut value = 0u128;
    for &byte in &block[start..] {
        value = (value << 8) | byte as u128;
    }

    value = value.wrapping_add(amount);
    if counter_bits < 128 {
        value &= (1u128 << counter_bits) - 1;
    }

    for (i, byte) in block[start..].iter_mut().rev().enumerate() {
        *byte = (value >> (8 * i)) as u8;
    }
}

impl<M: MacAlgorithm> Cipher for AesCtr<M> {
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
        self.seal(clear_text, key, nonce, aad, 0)
    }

    fn decrypt(&self, secret_box: &SecretBox, key: &SecretKey, aad: &[u8]) -> Result<Vec<u8>> {
        self.open(secret_box, key, aad, 0)
    }
}

impl<M: MacAlgorithm> StreamingCipher for AesCtr<M> {
    fn encrypt_at(
        &self,
        clear_text: &[u8],
        key: &SecretKey,
        nonce: &Nonce,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<SecretBox> {
        self.seal(clear_text, key, nonce, aad, key_stream_index)
    }

    fn decrypt_at(
        &self,
        secret_box: &SecretBox,
        key: &SecretKey,
        aad: &[u8],
        key_stream_index: usize,
    ) -> Result<Vec<u8>> {
        self.open(secret_box, key, aad, key_stream_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // NIST SP 800-38A F.5.1 (CTR-AES128), full 128-bit counter.
    #[test]
    fn sp_800_38a_ctr_aes128() {
        let key = SecretKey::from_bytes(hex!("2b7e151628aed2a6abf7158809cf4f3c"));
        let nonce = hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let plaintext = hex!(
            "6bc1bee22e409f96e93d7e117393172a"
            "ae2d8a571e03ac9c9eb76fac45af8e51"
            "30c81c46a35ce411e5fbc1191a0a52ef"
            "f69f2445df4f9b17ad2b417be66c3710"
        );
        let expected = hex!(
            "874d6191b620e3261bef6864990db6ce"
            "9806f66b7970fdff8617187bb9fffdff"
            "5ae4df3edbd5d35e5b4f09020db03eab"
            "1e031dda2fbe03d1792170a0f3009cee"
        );

        let ctr = AesCtr::aes128(crate::hmac::HmacSha256)
            .with_counter_bits(128)
            .unwrap();
        let round_keys = ctr.round_keys(&key).unwrap();

        let cipher_text = ctr.keystream_xor(&round_keys, &nonce, &plaintext, 0);
        assert_eq!(cipher_text, expected);

        let recovered = ctr.keystream_xor(&round_keys, &nonce, &cipher_text, 0);
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn keystream_offset_slices_the_same_stream() {
        let key = SecretKey::from_bytes([0x42u8; 32]);
        let nonce = Nonce::new([7u8; 16]);
        let ctr = AesCtr::aes256(crate::hmac::HmacSha256);

        let message = (0u8..=255).collect::<Vec<_>>();
        let whole = ctr.encrypt(&message, &key, &nonce, &[]).unwrap();

        // Encrypting the tail at its keystream offset must reproduce the
        // corresponding ciphertext slice, for offsets crossing block
        // boundaries and not.
        for split in [1usize, 15, 16, 17, 40, 255] {
            let tail = ctr
                .encrypt_at(&message[split..], &key, &nonce, &[], split)
                .unwrap();
            assert_eq!(tail.cipher_text(), &whole.cipher_text()[split..]);
        }
    }

    #[test]
    fn counter_addition_wraps_inside_window() {
        let mut block = [0xffu8; 16];
        add_to_counter(&mut block, 1, 64);

        assert_eq!(&block[..8], &[0xff; 8], "high half must stay untouched");
        assert_eq!(&block[8..], &[0u8; 8], "low half must wrap to zero");

        let mut block = [0u8; 16];
        add_to_counter(&mut block, 0x0102, 32);
        assert_eq!(&block[12..], &[0, 0, 0x01, 0x02]);
    }

    #[test]
    fn rejects_wrong_nonce_length() {
        let key = SecretKey::from_bytes([0u8; 16]);
        let ctr = AesCtr::aes128(crate::hmac::HmacSha256);

        let result = ctr.encrypt(b"hello", &key, &Nonce::new([0u8; 12]), &[]);
        assert!(matches!(result, Err(Error::InvalidNonceLength { .. })));
    }
}

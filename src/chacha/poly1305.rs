//! Poly1305 one-time authenticator (RFC 8439 §2.5).
//!
//! The 256-bit key splits into a field key `r` (clamped per the
//! specification) and an additive key `s`. The message is absorbed in
//! 16-byte chunks, each read as a little-endian integer with an extra high
//! bit, into the accumulator
//!
//! ```text
//! h = (h + chunk) · r  mod  2¹³⁰ − 5
//! ```
//!
//! and the tag is `h + s mod 2¹²⁸`. Limbs are 26 bits wide in `u32`s with
//! 64-bit intermediate products, matching the arithmetic of the reference
//! implementations; all paths are constant-time.
//!
//! A `(r, s)` pair authenticates exactly one message. Reuse across two
//! messages forfeits the security of the construction, which is why the
//! AEAD layer derives a fresh key per nonce and why the sink consumes its
//! state on finalization.

use crate::error::{Error, Result};
use crate::material::{Mac, SecretKey};
use crate::traits::{MacAlgorithm, MacSink};

/// Poly1305 as a capability. 32-byte one-time keys, 16-byte MACs.
///
/// The nonce and AAD arguments of the contract are ignored here: in the
/// AEAD constructions both are folded into the authenticated message
/// before Poly1305 runs.
pub struct Poly1305;

/// The running accumulator.
///
/// Buffers partial blocks so input may arrive in arbitrary pieces.
pub(crate) struct Poly1305State {
    r: [u32; 5],
    h: [u32; 5],
    s: [u8; 16],
    buffer: [u8; 16],
    buffered: usize,
}

impl Poly1305State {
    /// Splits and clamps a 32-byte one-time key.
    pub(crate) fn new(one_time_key: &[u8; 32]) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(one_time_key[..16].chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
        }

        // Clamp: r &= 0x0ffffffc_0ffffffc_0ffffffc_0fffffff
        words[0] &= 0x0fff_ffff;
        words[1] &= 0x0fff_fffc;
        words[2] &= 0x0fff_fffc;
        words[3] &= 0x0fff_fffc;

        let r = [
            words[0] & 0x3ff_ffff,
            ((words[0] >> 26) | (words[1] << 6)) & 0x3ff_ffff,
            ((words[1] >> 20) | (words[2] << 12)) & 0x3ff_ffff,
            ((words[2] >> 14) | (words[3] << 18)) & 0x3ff_ffff,
            (words[3] >> 8) & 0x3ff_ffff,
        ];

        let mut s = [0u8; 16];
        s.copy_from_slice(&one_time_key[16..32]);

        Self {
            r,
            h: [0u32; 5],
            s,
            buffer: [0u8; 16],
            buffered: 0,
        }
    }

    /// Absorbs message bytes, buffering any trailing partial block.
    pub(crate) fn update(&mut self, mut data: &[u8]) {
        if self.buffered > 0 {
            let take = data.len().min(16 - self.buffered);
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered == 16 {
                let block = self.buffer;
                self.absorb_partial(&block);
                self.buffered = 0;
            }
        }

        let mut chunks = data.chunks_exact(16);
        for chunk in &mut chunks {
            let block: [u8; 16] = chunk.try_into().expect("chunk is 16 bytes");
            self.absorb_partial(&block);
        }

        let tail = chunks.remainder();
        self.buffer[..tail.len()].copy_from_slice(tail);
        self.buffered = tail.len();
    }

    /// Absorbs one chunk of at most 16 bytes: `h = (h + chunk) · r`.
    ///
    /// The implicit high bit sits at position `8 · len`, so full and
    /// partial blocks go through the same path.
    fn absorb_partial(&mut self, chunk: &[u8]) {
        let mut padded = [0u8; 17];
        padded[..chunk.len()].copy_from_slice(chunk);
        padded[chunk.len()] = 1;

        let t = [
            u32::from_le_bytes(padded[0..4].try_into().expect("4 bytes")),
            u32::from_le_bytes(padded[4..8].try_into().expect("4 bytes")),
            u32::from_le_bytes(padded[8..12].try_into().expect("4 bytes")),
            u32::from_le_bytes(padded[12..16].try_into().expect("4 bytes")),
            padded[16] as u32,
        ];

        self.h[0] = self.h[0].wrapping_add(t[0] & 0x3ff_ffff);
        self.h[1] = self.h[1].wrapping_add(((t[0] >> 26) | (t[1] << 6)) & 0x3ff_ffff);
        self.h[2] = self.h[2].wrapping_add(((t[1] >> 20) | (t[2] << 12)) & 0x3ff_ffff);
        self.h[3] = self.h[3].wrapping_add(((t[2] >> 14) | (t[3] << 18)) & 0x3ff_ffff);
        self.h[4] = self.h[4].wrapping_add(((t[3] >> 8) | (t[4] << 24)) & 0x3ff_ffff);

        let h: [u64; 5] = self.h.map(u64::from);
        let r: [u64; 5] = self.r.map(u64::from);
        let r5 = [r[0], r[1] * 5, r[2] * 5, r[3] * 5, r[4] * 5];

        // d[k] = Σ h[i] · r[k−i], with wrapped terms scaled by 5
        let mut d = [0u64; 5];
        for k in 0..5 {
            for i in 0..5 {
                if i <= k {
                    d[k] += h[i] * r[k - i];
                } else {
                    d[k] += h[i] * r5[5 + k - i];
                }
            }
        }

        let mut carry = 0u64;
        for k in 0..5 {
            let value = d[k] + carry;
            self.h[k] = (value as u32) & 0x3ff_ffff;
            carry = value >> 26;
        }

        self.h[0] += (carry * 5) as u32;
        let carry = self.h[0] >> 26;
        self.h[0] &= 0x3ff_ffff;
        self.h[1] += carry;
    }

    /// Flushes any buffered partial block, fully reduces the accumulator,
    /// and returns `h + s mod 2¹²⁸`.
    pub(crate) fn finalize(mut self) -> [u8; 16] {
        if self.buffered > 0 {
            let buffered = self.buffered;
            let block = self.buffer;
            self.absorb_partial(&block[..buffered]);
        }

        // Full carry propagation
        let mut carry;

        carry = self.h[1] >> 26;
        self.h[1] &= 0x3ff_ffff;
        self.h[2] += carry;

        carry = self.h[2] >> 26;
        self.h[2] &= 0x3ff_ffff;
        self.h[3] += carry;

        carry = self.h[3] >> 26;
        self.h[3] &= 0x3ff_ffff;
        self.h[4] += carry;

        carry = self.h[4] >> 26;
        self.h[4] &= 0x3ff_ffff;
        self.h[0] += carry * 5;

        carry = self.h[0] >> 26;
        self.h[0] &= 0x3ff_ffff;
        self.h[1] += carry;

        // g = h + 5 − 2¹³⁰; select g when it did not go negative
        let mut g = [0u32; 5];
        carry = 5;
        for (g_limb, h_limb) in g.iter_mut().zip(&self.h) {
            let value = h_limb.wrapping_add(carry);
            *g_limb = value & 0x3ff_ffff;
            carry = value >> 26;
        }

        let mask = carry.wrapping_sub(1);
        for (h_limb, g_limb) in self.h.iter_mut().zip(&g) {
            *h_limb = (*h_limb & mask) | (*g_limb & !mask);
        }

        let packed = [
            self.h[0] | (self.h[1] << 26),
            (self.h[1] >> 6) | (self.h[2] << 20),
            (self.h[2] >> 12) | (self.h[3] << 14),
            (self.h[3] >> 18) | (self.h[4] << 8),
        ];

        // tag = h + s mod 2¹²⁸, byte-wise with carry
        let mut tag = [0u8; 16];
        let mut carry = 0u16;
        for i in 0..16 {
            let h_byte = (packed[i / 4] >> (8 * (i % 4))) as u8;
            let sum = h_byte as u16 + self.s[i] as u16 + carry;
            tag[i] = sum as u8;
            carry = sum >> 8;
        }

        tag
    }
}

struct Poly1305Sink {
    state: Option<Poly1305State>,
    mac: Option<Mac>,
}

impl MacSink for Poly1305Sink {
    fn add(&mut self, chunk: &[u8]) -> Result<()> {
        match &mut self.state {
            Some(state) => {
                state.update(chunk);
                Ok(())
            }
            None => Err(Error::SinkClosed),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(state) = self.state.take() {
            self.mac = Some(Mac::new(state.finalize()));
        }

        Ok(())
    }

    fn mac(&mut self) -> Result<Mac> {
        self.mac.clone().ok_or(Error::SinkNotClosed)
    }
}

impl MacAlgorithm for Poly1305 {
    fn mac_length(&self) -> usize {
        16
    }

    fn open_sink(&self, key: &SecretKey, _nonce: &[u8], _aad: &[u8]) -> Result<Box<dyn MacSink>> {
        let key_bytes = key.extract_bytes()?;
        let one_time_key: &[u8; 32] =
            key_bytes
                .try_into()
                .map_err(|_| Error::InvalidKeyLength {
                    got: key_bytes.len(),
                    expected: "32 bytes",
                })?;

        Ok(Box::new(Poly1305Sink {
            state: Some(Poly1305State::new(one_time_key)),
            mac: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 8439 §2.5.2.
    #[test]
    fn rfc_8439_tag_vector() {
        let key = SecretKey::from_bytes(hex!(
            "85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b"
        ));
        let message = b"Cryptographic Forum Research Group";

        let mac = Poly1305.calculate_mac(message, &key, &[], &[]).unwrap();
        assert_eq!(mac.as_bytes(), hex!("a8061dc1305136c6c22b8baf0c0127a9"));
    }

    #[test]
    fn chunking_does_not_change_the_tag() {
        let key = SecretKey::from_bytes([0x77u8; 32]);
        let message: Vec<u8> = (0..100).map(|i| i as u8).collect();

        let whole = Poly1305.calculate_mac(&message, &key, &[], &[]).unwrap();

        for chunk_size in [1usize, 3, 15, 16, 17, 33] {
            let mut sink = Poly1305.open_sink(&key, &[], &[]).unwrap();
            for chunk in message.chunks(chunk_size) {
                sink.add(chunk).unwrap();
            }
            sink.close().unwrap();
            assert_eq!(sink.mac().unwrap(), whole);
        }
    }

    #[test]
    fn sink_state_machine_is_strict() {
        let key = SecretKey::from_bytes([1u8; 32]);
        let mut sink = Poly1305.open_sink(&key, &[], &[]).unwrap();

        assert_eq!(sink.mac().unwrap_err(), Error::SinkNotClosed);
        sink.add(b"one-time").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.add(b"late"), Err(Error::SinkClosed));
    }

    #[test]
    fn key_length_is_checked_eagerly() {
        let key = SecretKey::from_bytes([0u8; 16]);
        assert!(matches!(
            Poly1305.calculate_mac(b"x", &key, &[], &[]),
            Err(Error::InvalidKeyLength { .. })
        ));
    }
}

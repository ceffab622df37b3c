//! HMAC adapters over the `hmac`/`sha2` crates.
//!
//! Digest compression functions are deliberately not reimplemented here;
//! they are mechanical compared to the primitives this crate is about, so
//! the HMAC [`MacAlgorithm`] implementations delegate to the RustCrypto
//! `hmac` and `sha2` crates. They exist primarily as the caller-supplied
//! MAC that AES-CBC and AES-CTR require.
//!
//! HMAC keys may have any length; the nonce and AAD parameters of the
//! capability contract are ignored, as HMAC has no notion of either.

use ::hmac::Mac as _;
use sha2::{Sha256, Sha512};

use crate::error::{Error, Result};
use crate::material::{Mac, SecretKey};
use crate::traits::{MacAlgorithm, MacSink};

/// HMAC-SHA-256 (32-byte MAC).
pub struct HmacSha256;

/// HMAC-SHA-512 (64-byte MAC).
pub struct HmacSha512;

enum SinkState<M: ::hmac::Mac> {
    Open(M),
    Closed(Mac),
}

struct HmacSink<M: ::hmac::Mac> {
    state: SinkState<M>,
}

impl<M: ::hmac::Mac> MacSink for HmacSink<M> {
    fn add(&mut self, chunk: &[u8]) -> Result<()> {
        match &mut self.state {
            SinkState::Open(inner) => {
                inner.update(chunk);
                Ok(())
            }
            SinkState::Closed(_) => Err(Error::SinkClosed),
        }
    }

    fn close(&mut self) -> Result<()> {
        // Idempotent: closing a closed sink keeps its MAC.
        let state = std::mem::replace(&mut self.state, SinkState::Closed(Mac::new(Vec::new())));
        self.state = match state {
            SinkState::Open(inner) => {
                SinkState::Closed(Mac::new(inner.finalize().into_bytes().to_vec()))
            }
            closed @ SinkState::Closed(_) => closed,
        };

        Ok(())
    }

    fn mac(&mut self) -> Result<Mac> {
        match &self.state {
            SinkState::Open(_) => Err(Error::SinkNotClosed),
            SinkState::Closed(mac) => Ok(mac.clone()),
        }
    }
}

macro_rules! impl_hmac {
    ($name:ty, $digest:ty, $length:expr) => {
        impl MacAlgorithm for $name {
            fn mac_length(&self) -> usize {
                $length
            }

            fn open_sink(
                &self,
                key: &SecretKey,
                _nonce: &[u8],
                _aad: &[u8],
            ) -> Result<Box<dyn MacSink>> {
                let key_bytes = key.extract_bytes()?;
                let inner = ::hmac::Hmac::<$digest>::new_from_slice(key_bytes)
                    .map_err(|_| Error::InvalidKeyLength {
                        got: key_bytes.len(),
                        expected: "any length accepted by HMAC",
                    })?;

                Ok(Box::new(HmacSink {
                    state: SinkState::Open(inner),
                }))
            }
        }
    };
}

impl_hmac!(HmacSha256, Sha256, 32);
impl_hmac!(HmacSha512, Sha512, 64);

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 4231 test case 2.
    #[test]
    fn rfc_4231_case_2() {
        let key = SecretKey::from_bytes(*b"Jefe");
        let message = b"what do ya want for nothing?";

        let mac = HmacSha256.calculate_mac(message, &key, &[], &[]).unwrap();
        assert_eq!(
            mac.as_bytes(),
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );

        let mac = HmacSha512.calculate_mac(message, &key, &[], &[]).unwrap();
        assert_eq!(
            mac.as_bytes(),
            hex!(
                "164b7a7bfcf819e2e395fbe73b56e0a3"
                "87bd64222e831fd610270cd7ea250554"
                "9758bf75c05a994a6d034f65f8f0e6fd"
                "caeab1a34d4a6b4b636e070a38bce737"
            )
        );
    }

    #[test]
    fn sink_enforces_the_state_machine() {
        let key = SecretKey::from_bytes([0u8; 32]);
        let mut sink = HmacSha256.open_sink(&key, &[], &[]).unwrap();

        sink.add(b"hello ").unwrap();
        assert_eq!(sink.mac().unwrap_err(), Error::SinkNotClosed);

        sink.add(b"world").unwrap();
        sink.close().unwrap();
        let first = sink.mac().unwrap();

        assert_eq!(sink.add(b"more"), Err(Error::SinkClosed));
        sink.close().unwrap();
        assert_eq!(sink.mac().unwrap(), first);

        // Chunking must not change the result.
        let whole = HmacSha256
            .calculate_mac(b"hello world", &key, &[], &[])
            .unwrap();
        assert_eq!(first, whole);
    }

    #[test]
    fn destroyed_key_is_rejected() {
        let mut key = SecretKey::from_bytes([1u8; 16]);
        key.destroy();

        assert_eq!(
            HmacSha256.calculate_mac(b"x", &key, &[], &[]),
            Err(Error::KeyDestroyed)
        );
    }
}

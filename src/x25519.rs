//! X25519 key agreement (RFC 7748).
//!
//! Montgomery-ladder scalar multiplication on curve25519. Private keys are
//! 32 random bytes, clamped before use; public keys are the u-coordinate
//! of `scalar · 9`. Both sides of an exchange obtain the same 32-byte
//! shared secret.
//!
//! The ladder runs 255 fixed iterations with masked conditional swaps, so
//! neither timing nor memory access depends on the scalar. Per RFC 7748
//! the high bit of an incoming u-coordinate is ignored and low-order peer
//! points produce an all-zero secret, which is returned as-is; rejecting
//! it is a protocol-level decision.

use crate::curve25519::FieldElement;
use crate::error::{Error, Result};
use crate::material::{KeyPair, PublicKey, SecretKey};
use crate::traits::KeyExchangeAlgorithm;

/// Private scalar, public key and shared secret length in bytes.
pub const KEY_LENGTH: usize = 32;

/// The X25519 key agreement algorithm.
pub struct X25519;

/// Clamped scalar multiplication: `clamp(scalar) · u`.
pub fn scalar_mul(scalar: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
    let mut e = *scalar;
    e[0] &= 248;
    e[31] &= 127;
    e[31] |= 64;

    // from_bytes discards bit 255 of u, as RFC 7748 requires
    let x1 = FieldElement::from_bytes(u);

    let mut x2 = FieldElement::ONE;
    let mut z2 = FieldElement::ZERO;
    let mut x3 = x1;
    let mut z3 = FieldElement::ONE;

    let mut swap = 0u32;

    for position in (0..255).rev() {
        let bit = ((e[position >> 3] >> (position & 7)) & 1) as u32;
        swap ^= bit;

        x2.swap(&mut x3, swap);
        z2.swap(&mut z3, swap);
        swap = bit;

        let mut tmp0 = x3 - z3;
        let mut tmp1 = x2 - z2;
        x2 = x2 + z2;
        z2 = x3 + z3;

        z3 = tmp0 * x2;
        z2 = z2 * tmp1;

        tmp0 = tmp1.square();
        tmp1 = x2.square();

        x3 = z3 + z2;
        z2 = z3 - z2;
        x2 = tmp1 * tmp0;
        tmp1 = tmp1 - tmp0;

        z2 = z2.square();
        z3 = tmp1.mul121666();
        x3 = x3.square();
        tmp0 = tmp0 + z3;

        z3 = x1 * z2;
        z2 = tmp1 * tmp0;
    }

    x2.swap(&mut x3, swap);
    z2.swap(&mut z3, swap);

    (x2 * z2.invert()).to_bytes()
}

/// Derives the public key `scalar · 9` for a private key.
pub fn public_key_bytes(scalar: &[u8; 32]) -> [u8; 32] {
    let mut base = [0u8; 32];
    base[0] = 9;
    scalar_mul(scalar, &base)
}

fn check_key_bytes(bytes: &[u8]) -> Result<[u8; 32]> {
    bytes.try_into().map_err(|_| Error::InvalidKeyLength {
        got: bytes.len(),
        expected: "32 bytes",
    })
}

impl KeyExchangeAlgorithm for X25519 {
    fn public_key_length(&self) -> usize {
        KEY_LENGTH
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let private = SecretKey::random(KEY_LENGTH)?;
        let scalar = check_key_bytes(private.extract_bytes()?)?;

        let public = public_key_bytes(&scalar);
        Ok(KeyPair::from_components(private, PublicKey::new(public)))
    }

    fn shared_secret(
        &self,
        key_pair: &KeyPair,
        remote_public_key: &PublicKey,
    ) -> Result<SecretKey> {
        let scalar = check_key_bytes(key_pair.extract_private_bytes()?)?;

        let their_u =
            check_key_bytes(remote_public_key.as_bytes()).map_err(|_| Error::InvalidParameter(
                "remote public key must be 32 bytes",
            ))?;

        Ok(SecretKey::from_bytes(scalar_mul(&scalar, &their_u)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 7748 §5.2, first test vector.
    #[test]
    fn rfc_7748_scalar_mul_vector() {
        let scalar = hex!("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
        let u = hex!("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");

        assert_eq!(
            scalar_mul(&scalar, &u),
            hex!("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552")
        );
    }

    // RFC 7748 §6.1 Diffie-Hellman vectors.
    #[test]
    fn rfc_7748_diffie_hellman() {
        let alice_private = hex!("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let bob_private = hex!("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");

        let alice_public = public_key_bytes(&alice_private);
        let bob_public = public_key_bytes(&bob_private);

        assert_eq!(
            alice_public,
            hex!("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
        );
        assert_eq!(
            bob_public,
            hex!("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
        );

        let shared = hex!("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");
        assert_eq!(scalar_mul(&alice_private, &bob_public), shared);
        assert_eq!(scalar_mul(&bob_private, &alice_public), shared);
    }

    #[test]
    fn exchange_is_symmetric_through_the_trait() {
        let alice = X25519.generate_key_pair().unwrap();
        let bob = X25519.generate_key_pair().unwrap();

        let alice_view = X25519.shared_secret(&alice, bob.public_key()).unwrap();
        let bob_view = X25519.shared_secret(&bob, alice.public_key()).unwrap();

        assert_eq!(
            alice_view.extract_bytes().unwrap(),
            bob_view.extract_bytes().unwrap()
        );
    }

    #[test]
    fn wrong_key_lengths_are_rejected() {
        let pair = X25519.generate_key_pair().unwrap();

        assert!(matches!(
            X25519.shared_secret(&pair, &PublicKey::new([0u8; 31])),
            Err(Error::InvalidParameter(_))
        ));

        let bad = KeyPair::from_components(
            SecretKey::from_bytes([0u8; 16]),
            PublicKey::new([0u8; 32]),
        );
        assert!(matches!(
            X25519.shared_secret(&bad, pair.public_key()),
            Err(Error::InvalidKeyLength { .. })
        ));
    }
}

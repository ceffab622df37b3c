//! Ed25519 signatures (RFC 8032).
//!
//! Key generation hashes a 32-byte seed with SHA-512; the first half,
//! clamped, becomes the secret scalar `a` and the second half the nonce
//! prefix. Signing is deterministic:
//!
//! ```text
//! r = H(prefix ‖ M) mod ℓ          R = r·B
//! k = H(R ‖ A ‖ M) mod ℓ           S = r + k·a mod ℓ
//! ```
//!
//! and the signature is `R ‖ S` (64 bytes). Verification checks
//! `S·B == R + k·A` through one vartime double-scalar multiplication over
//! `−A`. Non-canonical encodings are rejected, never normalized: a set
//! high bit in `S` or an undecodable `A` or `R` fails verification.
//!
//! The private key stored in a [`KeyPair`] is the 32-byte seed; expansion
//! happens on every signing call, so reconstructed key pairs behave
//! identically to freshly generated ones.

use sha2::{Digest, Sha512};

use crate::curve25519::Scalar;
use crate::curve25519::edwards::Extended;
use crate::error::{Error, Result};
use crate::material::{KeyPair, PublicKey, SecretKey, Signature, constant_time_eq};
use crate::traits::SignatureAlgorithm;

/// Private seed length in bytes.
pub const SEED_LENGTH: usize = 32;

/// Public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// The Ed25519 signature algorithm.
pub struct Ed25519;

struct ExpandedKey {
    scalar: Scalar,
    prefix: [u8; 32],
}

fn expand_seed(seed: &[u8; SEED_LENGTH]) -> ExpandedKey {
    let digest = Sha512::digest(seed);

    let mut scalar_bytes: [u8; 32] = digest[..32].try_into().expect("digest is 64 bytes");
    scalar_bytes[0] &= 248;
    scalar_bytes[31] &= 63;
    scalar_bytes[31] |= 64;

    ExpandedKey {
        scalar: Scalar::from_bytes(scalar_bytes),
        prefix: digest[32..].try_into().expect("digest is 64 bytes"),
    }
}

fn check_seed(key: &SecretKey) -> Result<[u8; SEED_LENGTH]> {
    let bytes = key.extract_bytes()?;
    bytes.try_into().map_err(|_| Error::InvalidKeyLength {
        got: bytes.len(),
        expected: "32 bytes",
    })
}

/// Derives the public key for a seed. Exposed for callers that rebuild a
/// [`KeyPair`] from stored seed bytes.
pub fn public_key_bytes(seed: &[u8; SEED_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH] {
    Extended::scalar_mul_base(&expand_seed(seed).scalar).compress()
}

fn reduced_digest(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }

    let digest: [u8; 64] = hasher.finalize().into();
    Scalar::reduce(&digest)
}

impl SignatureAlgorithm for Ed25519 {
    fn public_key_length(&self) -> usize {
        PUBLIC_KEY_LENGTH
    }

    fn signature_length(&self) -> usize {
        SIGNATURE_LENGTH
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let seed_key = SecretKey::random(SEED_LENGTH)?;
        let seed = check_seed(&seed_key)?;

        let public = public_key_bytes(&seed);
        Ok(KeyPair::from_components(seed_key, PublicKey::new(public)))
    }

    fn sign(&self, message: &[u8], key_pair: &KeyPair) -> Result<Signature> {
        let seed = check_seed(key_pair.private_key())?;
        let expanded = expand_seed(&seed);

        let public = key_pair.public_key();
        if public.len() != PUBLIC_KEY_LENGTH {
            return Err(Error::InvalidParameter("public key must be 32 bytes"));
        }

        let r = reduced_digest(&[&expanded.prefix, message]);
        let r_point = Extended::scalar_mul_base(&r).compress();

        let k = reduced_digest(&[&r_point, public.as_bytes(), message]);
        let s = Scalar::mul_add(k, expanded.scalar, r);

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature[..32].copy_from_slice(&r_point);
        signature[32..].copy_from_slice(&s.to_bytes());

        Ok(Signature::new(signature, public.clone()))
    }

    fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        let bytes = signature.as_bytes();
        let public = signature.public_key();

        if bytes.len() != SIGNATURE_LENGTH || public.len() != PUBLIC_KEY_LENGTH {
            return Ok(false);
        }

        // Reject non-canonical S: its top three bits must be clear.
        if bytes[63] & 0b1110_0000 != 0 {
            return Ok(false);
        }

        let public_bytes: [u8; 32] = public.as_bytes().try_into().expect("checked above");
        let Some(a) = Extended::decompress(&public_bytes) else {
            return Ok(false);
        };

        let k = reduced_digest(&[&bytes[..32], public.as_bytes(), message]);
        let s = Scalar::from_bytes(bytes[32..].try_into().expect("checked above"));

        // S·B == R + k·A  ⟺  R == S·B + k·(−A)
        let r_check = a.negate().double_scalar_mul_vartime(&k, &s).compress();

        Ok(constant_time_eq(&r_check, &bytes[..32]))
    }
}

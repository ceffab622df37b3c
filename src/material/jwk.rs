//! JWK-like asymmetric key interchange.
//!
//! Native-provider adapters exchange asymmetric keys in a JSON-Web-Key-like
//! structure: `kty`, `crv`, and the coordinates/scalar as unpadded
//! base64url. The pure implementations only ever need raw bytes, so this
//! module is a thin boundary format, not a PKI layer: no `kid`, `alg`, or
//! certificate handling.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{KeyPair, PublicKey, SecretKey};

/// A JWK-like key description.
///
/// For the curves in this crate (`Ed25519`, `X25519`) the key type is
/// `"OKP"`, `x` holds the public key bytes and `d` the private bytes; `y`
/// only appears for short-Weierstrass keys coming from a native provider
/// and is passed through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type, e.g. `"OKP"`.
    pub kty: String,

    /// Curve name, e.g. `"Ed25519"` or `"X25519"`.
    pub crv: String,

    /// Public key / x-coordinate, base64url without padding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// y-coordinate for curves that have one, base64url without padding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Private key bytes, base64url without padding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl JsonWebKey {
    /// Exports a public key.
    pub fn from_public_key(crv: &str, public_key: &PublicKey) -> Self {
        Self {
            kty: "OKP".to_owned(),
            crv: crv.to_owned(),
            x: Some(URL_SAFE_NO_PAD.encode(public_key.as_bytes())),
            y: None,
            d: None,
        }
    }

    /// Exports a key pair, private bytes included.
    ///
    /// Fails when the private key is destroyed or not extractable.
    pub fn from_key_pair(crv: &str, key_pair: &KeyPair) -> Result<Self> {
        let mut jwk = Self::from_public_key(crv, key_pair.public_key());
        jwk.d = Some(URL_SAFE_NO_PAD.encode(key_pair.extract_private_bytes()?));

        Ok(jwk)
    }

    /// Imports the public part.
    pub fn to_public_key(&self) -> Result<PublicKey> {
        let x = self
            .x
            .as_deref()
            .ok_or(Error::InvalidParameter("jwk is missing the x component"))?;

        Ok(PublicKey::new(decode_component(x)?))
    }

    /// Imports a full key pair.
    ///
    /// The `public == scalar_base_mul(private)` invariant is trusted, as it
    /// is everywhere a pair is reassembled from raw components.
    pub fn to_key_pair(&self) -> Result<KeyPair> {
        let d = self
            .d
            .as_deref()
            .ok_or(Error::InvalidParameter("jwk is missing the d component"))?;

        Ok(KeyPair::from_components(
            SecretKey::from_bytes(decode_component(d)?),
            self.to_public_key()?,
        ))
    }

    /// Serializes to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("jwk serialization cannot fail")
    }

    /// Parses from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|_| Error::InvalidParameter("malformed jwk json"))
    }
}

fn decode_component(component: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(component)
        .map_err(|_| Error::InvalidParameter("malformed base64url in jwk"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_pair_round_trip() {
        let pair = KeyPair::from_components(
            SecretKey::from_bytes([3u8; 32]),
            PublicKey::new([4u8; 32]),
        );

        let jwk = JsonWebKey::from_key_pair("Ed25519", &pair).unwrap();
        assert_eq!(jwk.kty, "OKP");

        let parsed = JsonWebKey::from_json(&jwk.to_json()).unwrap();
        let restored = parsed.to_key_pair().unwrap();

        assert_eq!(restored.extract_private_bytes().unwrap(), &[3u8; 32]);
        assert_eq!(restored.public_key().as_bytes(), &[4u8; 32]);
    }

    #[test]
    fn destroyed_private_key_does_not_export() {
        let mut pair = KeyPair::from_components(
            SecretKey::from_bytes([3u8; 32]),
            PublicKey::new([4u8; 32]),
        );
        pair.private_key_mut().destroy();

        assert_eq!(
            JsonWebKey::from_key_pair("X25519", &pair),
            Err(Error::KeyDestroyed)
        );
    }

    #[test]
    fn public_only_jwk_has_no_private_component() {
        let jwk = JsonWebKey::from_public_key("X25519", &PublicKey::new([9u8; 32]));
        assert!(jwk.d.is_none());
        assert!(jwk.to_key_pair().is_err());
        assert_eq!(jwk.to_public_key().unwrap().as_bytes(), &[9u8; 32]);
    }
}

//! Error taxonomy for the primitive layer.
//!
//! Every failure mode surfaces as one of the variants below, raised
//! synchronously before or instead of producing output. Nothing here is
//! transient: the caller must treat every error as final, and no operation
//! in this crate retries internally.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cryptographic primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A secret key had a length the algorithm does not accept.
    ///
    /// Detected eagerly, before any cryptographic work.
    #[error("invalid key length: got {got} bytes, expected {expected}")]
    InvalidKeyLength {
        /// Length of the supplied key in bytes.
        got: usize,
        /// Human-readable description of the accepted lengths.
        expected: &'static str,
    },

    /// A nonce had a length the algorithm does not accept.
    #[error("invalid nonce length: got {got} bytes, expected {expected}")]
    InvalidNonceLength {
        /// Length of the supplied nonce in bytes.
        got: usize,
        /// Human-readable description of the accepted lengths.
        expected: &'static str,
    },

    /// Some other parameter was out of range or malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Authentication failed during decryption or MAC verification.
    ///
    /// Raised when a tag does not match its recomputation. The operation is
    /// fail-closed: zero clear-text bytes have been released. Deliberately
    /// distinct from [`Error::InvalidParameter`] so callers can tell
    /// "tampered or wrong key" apart from "malformed input".
    #[error("message authentication failed")]
    AuthenticationFailed,

    /// The requested parameter combination is not implemented by this
    /// engine. No partial computation has taken place.
    #[error("unsupported configuration: {0}")]
    Unsupported(&'static str),

    /// An operation touched key material that has been destroyed.
    #[error("secret key has been destroyed")]
    KeyDestroyed,

    /// The key is an opaque handle whose bytes cannot be exported.
    #[error("secret key is not extractable")]
    KeyNotExtractable,

    /// A streaming sink was used after `close()`.
    #[error("sink is closed")]
    SinkClosed,

    /// A streaming sink result was requested before `close()`.
    #[error("sink is still open")]
    SinkNotClosed,
}

//! Curve25519 arithmetic core.
//!
//! Leaf layer shared by Ed25519 and X25519:
//!
//! - `field`: arithmetic in 𝔽ₚ with `p = 2²⁵⁵ − 19`, using the ref10
//!   10-limb signed representation,
//! - `scalar`: arithmetic modulo the group order ℓ in radix 2²¹,
//! - `edwards`: point representations and scalar multiplication on the
//!   twisted Edwards curve,
//! - `table`: curve constants and base-point tables, derived once at
//!   runtime from the curve equation and cached.
//!
//! Everything that can touch secret data is branch-free; only point
//! decompression and signature verification, which operate on public
//! inputs, use data-dependent branches.

pub mod edwards;
pub mod field;
pub mod scalar;
pub(crate) mod table;

pub use field::FieldElement;
pub use scalar::Scalar;

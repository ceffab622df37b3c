//! Arithmetic in the field 𝔽ₚ, `p = 2²⁵⁵ − 19`.
//!
//! ## Representation
//!
//! A field element is ten signed 32-bit limbs in the mixed radix of the
//! Ed25519 reference implementation, alternating 26- and 25-bit widths:
//!
//! ```text
//! [26, 25, 26, 25, 26, 25, 26, 25, 26, 25] bits
//! ```
//!
//! Limb `i` carries weight `2^⌈25.5·i⌉`. Additions and subtractions are
//! limb-wise and may leave values partially reduced; multiplication ends
//! with the reference carry chain that returns every limb to its nominal
//! range. Full canonical reduction happens only in `to_bytes`.
//!
//! ## Multiplication
//!
//! The product is a convolution over limb pairs. A term `f[i]·g[j]` lands
//! in output limb `(i+j) mod 10` scaled by
//!
//! - 2 when `i` and `j` are both odd (two half-bit offsets line up), and
//! - 19 when `i + j ≥ 10` (the wrap `2²⁵⁵ ≡ 19 mod p`).
//!
//! Both scale decisions depend only on loop indices, never on values, so
//! the double loop is constant-time. With limbs bounded by 2²⁶ the
//! accumulated products stay under 2⁶¹, inside `i64` even when doubled for
//! `double_square`.
//!
//! ## Constant-time behavior
//!
//! No operation here branches on limb values or indexes memory by secret
//! data. Conditional swap and move take a 0/1 selector and are mask-based.

use std::array;
use std::ops::{Add, Mul, Neg, Sub};

/// Reads 3 little-endian bytes as an integer.
#[inline(always)]
pub(crate) fn load_3(input: &[u8]) -> u64 {
    (input[0] as u64) | ((input[1] as u64) << 8) | ((input[2] as u64) << 16)
}

/// Reads 4 little-endian bytes as an integer.
#[inline(always)]
pub(crate) fn load_4(input: &[u8]) -> u64 {
    (input[0] as u64)
        | ((input[1] as u64) << 8)
        | ((input[2] as u64) << 16)
        | ((input[3] as u64) << 24)
}

/// An element of 𝔽ₚ in the 10-limb representation.
#[derive(Clone, Copy)]
pub struct FieldElement(pub(crate) [i32; 10]);

/// The reference carry chain for a freshly accumulated product.
///
/// Order matters: 0 and 4 first, then the odd/even pairs, then the wrap of
/// limb 9 into limb 0 through the factor 19, then limb 0 once more. The
/// sequence keeps every intermediate inside `i64` and every output limb
/// within its nominal width.
fn carry(mut h: [i64; 10]) -> FieldElement {
    for index in [0usize, 4] {
        let c = (h[index] + (1i64 << 25)) >> 26;
        h[index + 1] += c;
        h[index] -= c << 26;
    }

    for index in [1usize, 5] {
        let c = (h[index] + (1i64 << 24)) >> 25;
        h[index + 1] += c;
        h[index] -= c << 25;
    }

    for index in [2usize, 6] {
        let c = (h[index] + (1i64 << 25)) >> 26;
        h[index + 1] += c;
        h[index] -= c << 26;
    }

    for index in [3usize, 7] {
        let c = (h[index] + (1i64 << 24)) >> 25;
        h[index + 1] += c;
        h[index] -= c << 25;
    }

    let c4 = (h[4] + (1i64 << 25)) >> 26;
    h[5] += c4;
    h[4] -= c4 << 26;

    let c8 = (h[8] + (1i64 << 25)) >> 26;
    h[9] += c8;
    h[8] -= c8 << 26;

    let c9 = (h[9] + (1i64 << 24)) >> 25;
    h[0] += c9 * 19;
    h[9] -= c9 << 25;

    let c0 = (h[0] + (1i64 << 25)) >> 26;
    h[1] += c0;
    h[0] -= c0 << 26;

    FieldElement(h.map(|x| x as i32))
}

/// Unreduced limb convolution of two elements.
fn mul_unreduced(f: &[i32; 10], g: &[i32; 10]) -> [i64; 10] {
    let mut h = [0i64; 10];

    for i in 0..10 {
        for j in 0..10 {
            let mut term = (f[i] as i64) * (g[j] as i64);

            if i & 1 == 1 && j & 1 == 1 {
                term *= 2;
            }
            if i + j >= 10 {
                term *= 19;
            }

            h[(i + j) % 10] += term;
        }
    }

    h
}

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = FieldElement([0; 10]);

    /// The multiplicative identity.
    pub const ONE: Self = FieldElement([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    /// A small non-negative constant. Valid for `value < 2²⁶`.
    pub(crate) const fn from_u32(value: u32) -> Self {
        let mut limbs = [0i32; 10];
        limbs[0] = value as i32;
        FieldElement(limbs)
    }

    /// Decodes 32 little-endian bytes, reducing modulo `p`.
    ///
    /// Bit 255 of the encoding is ignored, as in the reference decoding.
    pub fn from_bytes(input: &[u8; 32]) -> Self {
        let mut h = [
            load_4(&input[0..]) as i64,
            (load_3(&input[4..]) << 6) as i64,
            (load_3(&input[7..]) << 5) as i64,
            (load_3(&input[10..]) << 3) as i64,
            (load_3(&input[13..]) << 2) as i64,
            load_4(&input[16..]) as i64,
            (load_3(&input[20..]) << 7) as i64,
            (load_3(&input[23..]) << 5) as i64,
            (load_3(&input[26..]) << 4) as i64,
            ((load_3(&input[29..]) & 0x7f_ffff) << 2) as i64,
        ];

        // Odd limbs first (25-bit), with the top limb wrapping into limb 0
        for index in (1..10).step_by(2) {
            let c = (h[index] + (1i64 << 24)) >> 25;
            h[index] -= c << 25;

            if index == 9 {
                h[0] += c * 19;
            } else {
                h[index + 1] += c;
            }
        }

        // Even limbs (26-bit)
        for index in (0..9).step_by(2) {
            let c = (h[index] + (1i64 << 25)) >> 26;
            h[index] -= c << 26;
            h[index + 1] += c;
        }

        FieldElement(h.map(|x| x as i32))
    }

    /// Encodes into the canonical 32-byte little-endian form.
    ///
    /// Performs the final reduction, so the output is the unique
    /// representative in `[0, p)` regardless of how unreduced the limbs
    /// were (within their invariant bounds).
    pub fn to_bytes(self) -> [u8; 32] {
        let mut h = self.0.map(|x| x as i64);

        // Compute the overflow q = ⌊value / p⌋ ∈ {0, 1, ...} by pushing a
        // tentative carry through all limbs, then fold 19·q back in.
        let mut q = (19 * h[9] + (1i64 << 24)) >> 25;
        for (index, limb) in h.iter().enumerate() {
            let shift = if index % 2 == 0 { 26 } else { 25 };
            q = (limb + q) >> shift;
        }

        h[0] += 19 * q;

        for index in 0..9 {
            let shift = if index % 2 == 0 { 26 } else { 25 };
            let c = h[index] >> shift;
            h[index] -= c << shift;
            h[index + 1] += c;
        }
        // Discard the carry out of limb 9: that is the reduction mod 2²⁵⁵
        h[9] &= (1i64 << 25) - 1;

        let mut out = [0u8; 32];
        out[0] = h[0] as u8;
        out[1] = (h[0] >> 8) as u8;
        out[2] = (h[0] >> 16) as u8;
        out[3] = ((h[0] >> 24) | (h[1] << 2)) as u8;
        out[4] = (h[1] >> 6) as u8;
        out[5] = (h[1] >> 14) as u8;
        out[6] = ((h[1] >> 22) | (h[2] << 3)) as u8;
        out[7] = (h[2] >> 5) as u8;
        out[8] = (h[2] >> 13) as u8;
        out[9] = ((h[2] >> 21) | (h[3] << 5)) as u8;
        out[10] = (h[3] >> 3) as u8;
        out[11] = (h[3] >> 11) as u8;
        out[12] = ((h[3] >> 19) | (h[4] << 6)) as u8;
        out[13] = (h[4] >> 2) as u8;
        out[14] = (h[4] >> 10) as u8;
        out[15] = (h[4] >> 18) as u8;
        out[16] = h[5] as u8;
        out[17] = (h[5] >> 8) as u8;
        out[18] = (h[5] >> 16) as u8;
        out[19] = ((h[5] >> 24) | (h[6] << 1)) as u8;
        out[20] = (h[6] >> 7) as u8;
        out[21] = (h[6] >> 15) as u8;
        out[22] = ((h[6] >> 23) | (h[7] << 3)) as u8;
        out[23] = (h[7] >> 5) as u8;
        out[24] = (h[7] >> 13) as u8;
        out[25] = ((h[7] >> 21) | (h[8] << 4)) as u8;
        out[26] = (h[8] >> 4) as u8;
        out[27] = (h[8] >> 12) as u8;
        out[28] = ((h[8] >> 20) | (h[9] << 6)) as u8;
        out[29] = (h[9] >> 2) as u8;
        out[30] = (h[9] >> 10) as u8;
        out[31] = (h[9] >> 18) as u8;

        out
    }

    /// Constant-time swap: exchanges `self` and `rhs` when `selector == 1`.
    pub(crate) fn swap(&mut self, rhs: &mut Self, selector: u32) {
        let mask = -(selector as i32);

        for (a, b) in self.0.iter_mut().zip(rhs.0.iter_mut()) {
            let diff = (*a ^ *b) & mask;
            *a ^= diff;
            *b ^= diff;
        }
    }

    /// Constant-time move: replaces `self` with `rhs` when `selector == 1`.
    pub(crate) fn conditional_move(&mut self, rhs: &Self, selector: u32) {
        let mask = -(selector as i32);

        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a ^= (*a ^ b) & mask;
        }
    }

    /// `1` when the element is non-zero, `0` otherwise. Constant-time over
    /// the canonical encoding.
    pub(crate) fn is_non_zero(&self) -> i32 {
        (self.to_bytes().iter().fold(0u8, |acc, &b| acc | b) != 0) as i32
    }

    /// The sign of the element: the low bit of its canonical encoding.
    pub(crate) fn is_negative(&self) -> i32 {
        (self.to_bytes()[0] & 1) as i32
    }

    /// `self²`.
    pub fn square(self) -> Self {
        carry(mul_unreduced(&self.0, &self.0))
    }

    /// `2 · self²` in one reduction pass.
    pub(crate) fn double_square(self) -> Self {
        let mut h = mul_unreduced(&self.0, &self.0);
        for limb in h.iter_mut() {
            *limb *= 2;
        }

        carry(h)
    }

    /// `self^(2ⁿ)` by `n` squarings.
    pub(crate) fn n_square(self, n: usize) -> Self {
        (0..n).fold(self, |acc, _| acc.square())
    }

    /// `self · 121666`, the curve constant `(486662 − 2) / 4` used by the
    /// Montgomery ladder.
    pub(crate) fn mul121666(self) -> Self {
        carry(self.0.map(|x| x as i64 * 121_666))
    }

    /// `self^(2²⁵² − 3)`, the exponent `(p − 5) / 8`.
    ///
    /// Fixed addition chain from the reference implementation; used for
    /// square-root extraction in point decompression.
    pub(crate) fn pow22523(self) -> Self {
        let mut t0 = self.square();
        let mut t1 = t0.n_square(2);

        t1 = self * t1;
        t0 = t0 * t1;

        t0 = t0.square();
        t0 = t1 * t0;

        t1 = t0.n_square(5);
        t0 = t1 * t0;

        t1 = t0.n_square(10);
        t1 = t1 * t0;

        let mut t2 = t1.n_square(20);
        t1 = t2 * t1;

        t1 = t1.n_square(10);
        t0 = t1 * t0;

        t1 = t0.n_square(50);
        t1 = t1 * t0;

        t2 = t1.n_square(100);
        t1 = t2 * t1;

        t1 = t1.n_square(50);
        t0 = t1 * t0;

        t0 = t0.n_square(2);

        t0 * self
    }

    /// The multiplicative inverse, `self^(p − 2)` by Fermat.
    ///
    /// Returns zero for zero, the reference convention.
    pub fn invert(self) -> Self {
        let mut t0 = self.square();
        let mut t1 = t0.n_square(2);

        t1 = self * t1;
        t0 = t0 * t1;

        let mut t2 = t0.square();
        t1 = t1 * t2;

        t2 = t1.n_square(5);
        t1 = t2 * t1;

        t2 = t1.n_square(10);
        t2 = t2 * t1;

        let mut t3 = t2.n_square(20);
        t2 = t3 * t2;

        t2 = t2.n_square(10);
        t1 = t2 * t1;

        t2 = t1.n_square(50);
        t2 = t2 * t1;

        t3 = t2.n_square(100);
        t2 = t3 * t2;

        t2 = t2.n_square(50);
        t1 = t2 * t1;

        t1 = t1.n_square(5);

        t1 * t0
    }
}

/// Limb-wise addition; the result may be only partially reduced.
impl Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        FieldElement(array::from_fn(|i| self.0[i].wrapping_add(rhs.0[i])))
    }
}

/// Limb-wise subtraction; limbs may go negative until the next reduction.
impl Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        FieldElement(array::from_fn(|i| self.0[i].wrapping_sub(rhs.0[i])))
    }
}

/// Limb-wise negation, not reduced.
impl Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        FieldElement(self.0.map(|x| -x))
    }
}

/// Field multiplication with the reference reduction.
impl Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        carry(mul_unreduced(&self.0, &rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(value: u32) -> FieldElement {
        FieldElement::from_u32(value)
    }

    #[test]
    fn encoding_round_trips() {
        let mut bytes = [0u8; 32];
        bytes[0] = 42;
        bytes[17] = 0x7e;
        bytes[31] = 0x11;

        assert_eq!(FieldElement::from_bytes(&bytes).to_bytes(), bytes);
    }

    #[test]
    fn p_encodes_as_zero() {
        // p = 2^255 - 19
        let mut p = [0xffu8; 32];
        p[0] = 0xed;
        p[31] = 0x7f;

        assert_eq!(FieldElement::from_bytes(&p).to_bytes(), [0u8; 32]);
        assert_eq!(FieldElement::from_bytes(&p).is_non_zero(), 0);
    }

    #[test]
    fn small_multiplication_matches_integers() {
        assert_eq!((fe(1000) * fe(1000)).to_bytes(), {
            let mut expected = [0u8; 32];
            expected[..4].copy_from_slice(&1_000_000u32.to_le_bytes());
            expected
        });

        assert_eq!((fe(7).square()).to_bytes(), fe(49).to_bytes());
        assert_eq!((fe(7).double_square()).to_bytes(), fe(98).to_bytes());
        assert_eq!(fe(3).mul121666().to_bytes(), fe(364_998).to_bytes());
    }

    #[test]
    fn subtraction_wraps_modulo_p() {
        // 0 - 1 = p - 1, which ends in 0xec
        let minus_one = (FieldElement::ZERO - FieldElement::ONE).to_bytes();
        assert_eq!(minus_one[0], 0xec);
        assert_eq!(minus_one[31], 0x7f);

        assert_eq!((-FieldElement::ONE).to_bytes(), minus_one);
    }

    #[test]
    fn inversion_hits_the_identity() {
        for value in [2u32, 5, 121_666, 48_662_101] {
            let inverse = fe(value).invert();
            assert_eq!((fe(value) * inverse).to_bytes(), FieldElement::ONE.to_bytes());
        }

        assert_eq!(FieldElement::ZERO.invert().to_bytes(), [0u8; 32]);
    }

    #[test]
    fn pow22523_agrees_with_inversion_identity() {
        // x^((p-5)/8) satisfies (x^((p-5)/8))^8 · x^5 = x^(p) = x
        let x = fe(9);
        let y = x.pow22523();

        let y8 = y.square().square().square();
        let x5 = x.square().square() * x;
        assert_eq!((y8 * x5).to_bytes(), x.to_bytes());
    }

    #[test]
    fn conditional_swap_and_move() {
        let mut a = fe(1);
        let mut b = fe(2);

        a.swap(&mut b, 0);
        assert_eq!(a.to_bytes(), fe(1).to_bytes());

        a.swap(&mut b, 1);
        assert_eq!(a.to_bytes(), fe(2).to_bytes());
        assert_eq!(b.to_bytes(), fe(1).to_bytes());

        let mut c = fe(3);
        c.conditional_move(&fe(9), 0);
        assert_eq!(c.to_bytes(), fe(3).to_bytes());
        c.conditional_move(&fe(9), 1);
        assert_eq!(c.to_bytes(), fe(9).to_bytes());
    }
}

//! Group operations on the twisted Edwards curve edwards25519.
//!
//! The curve is `−x² + y² = 1 + d·x²·y²` over 𝔽ₚ, `p = 2²⁵⁵ − 19`, with
//! the constant `d = −121665/121666`.
//!
//! ## Representations
//!
//! Scalar multiplication juggles several coordinate systems, each tuned
//! for one role, exactly as in the reference implementations:
//!
//! - [`Extended`]: `(X : Y : Z : T)` with `T = XY/Z`; the main working
//!   form, supporting complete addition without inversions.
//! - [`Projective`]: `(X : Y : Z)`; used for doubling.
//! - [`Completed`]: the transient output of additions and doublings,
//!   converted immediately into one of the other forms.
//! - [`Cached`]: `(Y+X, Y−X, Z, 2dT)`; the right-hand operand of
//!   repeated additions.
//! - [`Affine`]: `(Y+X, Y−X, 2dXY)` with `Z = 1`; precomputed table
//!   entries for fixed-base multiplication.
//!
//! ## Constant-time behavior
//!
//! Fixed-base scalar multiplication (used with secret scalars) walks the
//! precomputed window table with mask-based selection and no
//! data-dependent branches. The double-scalar multiplication and point
//! decompression are variable-time and reserved for verification, where
//! every input is public.

use super::field::FieldElement;
use super::scalar::Scalar;
use super::table;

/// `1` when `a == b`, branch-free.
#[inline(always)]
fn ct_equal(a: i8, b: i8) -> u8 {
    let diff = (a as u8) ^ (b as u8);
    ((diff as u64).wrapping_sub(1) >> 63) as u8
}

/// `1` when `digit < 0`, branch-free.
#[inline(always)]
fn ct_negative(digit: i8) -> u8 {
    ((digit as i64 as u64) >> 63) as u8
}

/// A point in extended coordinates `(X : Y : Z : T)`.
#[derive(Clone, Copy)]
pub struct Extended {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
    pub(crate) t: FieldElement,
}

/// A point in projective coordinates `(X : Y : Z)`.
#[derive(Clone, Copy)]
pub struct Projective {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

/// The completed form produced by additions and doublings.
pub struct Completed {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    t: FieldElement,
}

/// A point prepared for repeated addition.
#[derive(Clone, Copy)]
pub struct Cached {
    y_plus_x: FieldElement,
    y_minus_x: FieldElement,
    z: FieldElement,
    t2d: FieldElement,
}

/// A table entry: an affine point in the `(Y+X, Y−X, 2dXY)` form.
#[derive(Clone, Copy)]
pub struct Affine {
    pub(crate) y_plus_x: FieldElement,
    pub(crate) y_minus_x: FieldElement,
    pub(crate) xy2d: FieldElement,
}

impl Completed {
    /// Mixed addition `a + b` with a cached operand.
    pub(crate) fn add(a: &Extended, b: &Cached) -> Self {
        let mut x = a.y + a.x;
        let mut y = a.y - a.x;
        let mut z = x * b.y_plus_x;
        let mut t = b.t2d * a.t;

        y = y * b.y_minus_x;
        x = a.z * b.z;
        let double_z = x + x;

        x = z - y;
        y = z + y;
        z = double_z + t;
        t = double_z - t;

        Self { x, y, z, t }
    }

    /// Mixed subtraction `a − b` with a cached operand.
    pub(crate) fn sub(a: &Extended, b: &Cached) -> Self {
        let mut x = a.y + a.x;
        let mut y = a.y - a.x;
        let mut z = x * b.y_minus_x;
        let mut t = b.t2d * a.t;

        y = y * b.y_plus_x;
        x = a.z * b.z;
        let double_z = x + x;

        x = z - y;
        y = z + y;
        z = double_z - t;
        t = double_z + t;

        Self { x, y, z, t }
    }

    /// Mixed addition `a + b` with an affine table entry.
    pub(crate) fn add_affine(a: &Extended, b: &Affine) -> Self {
        let mut x = a.y + a.x;
        let mut y = a.y - a.x;
        let mut z = x * b.y_plus_x;
        let mut t = b.xy2d * a.t;
        let double_z = a.z + a.z;

        y = y * b.y_minus_x;
        x = z - y;
        y = z + y;
        z = double_z + t;
        t = double_z - t;

        Self { x, y, z, t }
    }

    /// Mixed subtraction `a − b` with an affine table entry.
    pub(crate) fn sub_affine(a: &Extended, b: &Affine) -> Self {
        let mut x = a.y + a.x;
        let mut y = a.y - a.x;
        let mut z = x * b.y_minus_x;
        let mut t = b.xy2d * a.t;
        let double_z = a.z + a.z;

        y = y * b.y_plus_x;
        x = z - y;
        y = z + y;
        z = double_z - t;
        t = double_z + t;

        Self { x, y, z, t }
    }
}

impl Projective {
    /// The neutral element `(0, 1)`.
    pub(crate) const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
    };

    pub(crate) fn from_completed(p: &Completed) -> Self {
        Self {
            x: p.x * p.t,
            y: p.y * p.z,
            z: p.z * p.t,
        }
    }

    pub(crate) fn from_extended(p: &Extended) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    /// Point doubling.
    pub(crate) fn double(&self) -> Completed {
        let mut x = self.x.square();
        let mut z = self.y.square();
        let mut t = self.z.double_square();
        let mut y = self.x + self.y;

        let y_squared = y.square();
        y = z + x;
        z = z - x;
        x = y_squared - y;
        t = t - z;

        Completed { x, y, z, t }
    }

    /// Compressed 32-byte encoding: `y` little-endian with the sign of `x`
    /// in the top bit.
    pub(crate) fn compress(&self) -> [u8; 32] {
        let recip = self.z.invert();
        let x = self.x * recip;
        let y = self.y * recip;

        let mut output = y.to_bytes();
        output[31] ^= (x.is_negative() as u8) << 7;

        output
    }
}

impl Extended {
    /// The neutral element `(0, 1)`.
    pub(crate) const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        t: FieldElement::ZERO,
    };

    pub(crate) fn from_completed(p: &Completed) -> Self {
        Self {
            x: p.x * p.t,
            y: p.y * p.z,
            z: p.z * p.t,
            t: p.x * p.y,
        }
    }

    pub(crate) fn double(&self) -> Completed {
        Projective::from_extended(self).double()
    }

    /// The inverse point `(−x, y)`.
    pub(crate) fn negate(&self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
            z: self.z,
            t: -self.t,
        }
    }

    /// Compressed 32-byte encoding.
    pub fn compress(&self) -> [u8; 32] {
        Projective::from_extended(self).compress()
    }

    /// Decompresses a 32-byte encoding, recovering `x` from the curve
    /// equation
    ///
    /// ```text
    /// x² = (y² − 1) / (d·y² + 1)
    /// ```
    ///
    /// via the `(p − 5)/8` square-root chain, trying the `√−1` twist when
    /// the first candidate fails. Returns `None` for encodings that name
    /// no curve point.
    ///
    /// Variable-time; encodings are public.
    pub fn decompress(bytes: &[u8; 32]) -> Option<Self> {
        let y = FieldElement::from_bytes(bytes);
        let z = FieldElement::ONE;

        let y_squared = y.square();
        let u = y_squared - z;
        let v = y_squared * *table::d() + z;

        // Candidate x = u·v³ · (u·v⁷)^((p−5)/8)
        let v3 = v.square() * v;
        let mut x = (v3.square() * v * u).pow22523();
        x = x * v3 * u;

        let vxx = x.square() * v;
        let mut check = vxx - u;
        if check.is_non_zero() == 1 {
            check = vxx + u;
            if check.is_non_zero() == 1 {
                return None;
            }

            x = x * *table::sqrt_m1();
        }

        if x.is_negative() as u8 != bytes[31] >> 7 {
            x = -x;
        }

        let t = x * y;
        Some(Self { x, y, z, t })
    }

    /// Fixed-base scalar multiplication `a · B`.
    ///
    /// The scalar is split into 64 signed radix-16 digits in `[−8, 7]`;
    /// odd-position digits are accumulated first, the accumulator is
    /// multiplied by 16 with four doublings, then the even positions
    /// follow. Table lookups go through [`Affine::select`], so the whole
    /// walk is constant-time in the scalar.
    pub fn scalar_mul_base(a: &Scalar) -> Self {
        let mut digits = [0i8; 64];
        for (i, byte) in a.to_bytes().iter().enumerate() {
            digits[2 * i] = (byte & 0x0f) as i8;
            digits[2 * i + 1] = (byte >> 4) as i8;
        }

        // Normalize digits into [-8, 7]
        let mut carry = 0i8;
        for digit in digits.iter_mut().take(63) {
            *digit += carry;
            carry = (*digit + 8) >> 4;
            *digit -= carry << 4;
        }
        digits[63] += carry;

        let mut h = Self::IDENTITY;

        for i in (1..64).step_by(2) {
            let entry = Affine::select(i / 2, digits[i]);
            h = Self::from_completed(&Completed::add_affine(&h, &entry));
        }

        for _ in 0..4 {
            h = Self::from_completed(&Projective::from_extended(&h).double());
        }

        for i in (0..64).step_by(2) {
            let entry = Affine::select(i / 2, digits[i]);
            h = Self::from_completed(&Completed::add_affine(&h, &entry));
        }

        h
    }

    /// Double-scalar multiplication `a · self + b · B`.
    ///
    /// Sliding-window over precomputed odd multiples of `self` and of the
    /// base point. Variable-time: only for verification, where the point
    /// and both scalars are public.
    pub fn double_scalar_mul_vartime(&self, a: &Scalar, b: &Scalar) -> Projective {
        let a_digits = a.slide();
        let b_digits = b.slide();

        // Odd multiples self, 3·self, …, 15·self
        let mut multiples = [Cached::from_extended(self); 8];
        let double = Self::from_completed(&self.double());
        for j in 1..8 {
            let sum = Completed::add(&double, &multiples[j - 1]);
            multiples[j] = Cached::from_extended(&Self::from_completed(&sum));
        }

        let base_odd = table::base_odd_multiples();

        let mut r = Projective::IDENTITY;
        let mut started = false;

        for (&a_digit, &b_digit) in a_digits.iter().zip(b_digits.iter()).rev() {
            if !started {
                if a_digit == 0 && b_digit == 0 {
                    continue;
                }
                started = true;
            }

            let mut t = r.double();

            if a_digit > 0 {
                t = Completed::add(
                    &Self::from_completed(&t),
                    &multiples[(a_digit / 2) as usize],
                );
            } else if a_digit < 0 {
                t = Completed::sub(
                    &Self::from_completed(&t),
                    &multiples[(-a_digit / 2) as usize],
                );
            }

            if b_digit > 0 {
                t = Completed::add_affine(
                    &Self::from_completed(&t),
                    &base_odd[(b_digit / 2) as usize],
                );
            } else if b_digit < 0 {
                t = Completed::sub_affine(
                    &Self::from_completed(&t),
                    &base_odd[(-b_digit / 2) as usize],
                );
            }

            r = Projective::from_completed(&t);
        }

        r
    }
}

impl Cached {
    pub(crate) fn from_extended(p: &Extended) -> Self {
        Self {
            y_plus_x: p.y + p.x,
            y_minus_x: p.y - p.x,
            z: p.z,
            t2d: p.t * *table::d2(),
        }
    }
}

impl Affine {
    /// The identity in affine form. A selection placeholder, not a table
    /// entry.
    pub(crate) const IDENTITY: Self = Self {
        y_plus_x: FieldElement::ONE,
        y_minus_x: FieldElement::ONE,
        xy2d: FieldElement::ZERO,
    };

    /// Normalizes an extended point into the affine table form.
    pub(crate) fn from_extended(p: &Extended) -> Self {
        let recip = p.z.invert();
        let x = p.x * recip;
        let y = p.y * recip;

        Self {
            y_plus_x: y + x,
            y_minus_x: y - x,
            xy2d: x * y * *table::d2(),
        }
    }

    fn conditional_move(&mut self, other: &Self, selector: u8) {
        self.y_plus_x.conditional_move(&other.y_plus_x, selector as u32);
        self.y_minus_x
            .conditional_move(&other.y_minus_x, selector as u32);
        self.xy2d.conditional_move(&other.xy2d, selector as u32);
    }

    /// Selects `digit · 256^pos · B` from the window table, branch-free.
    ///
    /// `digit` is a signed radix-16 digit in `[−8, 8]`. The absolute value
    /// indexes the table through masked moves and negative digits take the
    /// negated entry, so neither the value nor its sign leaks.
    pub(crate) fn select(pos: usize, digit: i8) -> Self {
        let negative = ct_negative(digit);
        let magnitude = (digit as i16 - (((-(negative as i16)) & (digit as i16)) << 1)) as i8;

        let mut entry = Self::IDENTITY;
        for (j, candidate) in table::base_window()[pos].iter().enumerate() {
            entry.conditional_move(candidate, ct_equal(magnitude, (j + 1) as i8));
        }

        let negated = Self {
            y_plus_x: entry.y_minus_x,
            y_minus_x: entry.y_plus_x,
            xy2d: -entry.xy2d,
        };
        entry.conditional_move(&negated, negative);

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_from_u64(value: u64) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Scalar::from_bytes(bytes)
    }

    #[test]
    fn base_point_compresses_to_the_standard_encoding() {
        let one = scalar_from_u64(1);
        let b = Extended::scalar_mul_base(&one);

        // The canonical encoding of B: y = 4/5 with a positive x.
        let mut expected = [0x66u8; 32];
        expected[0] = 0x58;
        assert_eq!(b.compress(), expected);
    }

    #[test]
    fn decompression_inverts_compression() {
        for seed in [2u64, 3, 12_345, 0xffff_ffff] {
            let p = Extended::scalar_mul_base(&scalar_from_u64(seed));
            let bytes = p.compress();

            let q = Extended::decompress(&bytes).expect("valid encoding");
            assert_eq!(q.compress(), bytes);
        }
    }

    #[test]
    fn invalid_encodings_are_rejected() {
        // Roughly half of all y-coordinates name no curve point. Over a
        // spread of small y values some must be rejected, and every
        // accepted one must survive a compression round trip.
        let mut rejected = 0;

        for y in 2u8..=33 {
            let mut bytes = [0u8; 32];
            bytes[0] = y;

            match Extended::decompress(&bytes) {
                None => rejected += 1,
                Some(point) => assert_eq!(point.compress(), bytes),
            }
        }

        assert!(rejected > 0, "no invalid encoding was rejected");
    }

    #[test]
    fn addition_matches_scalar_arithmetic() {
        // (a + b)·B == a·B + b·B
        let left = Extended::scalar_mul_base(&scalar_from_u64(1000 + 77));

        let a = Extended::scalar_mul_base(&scalar_from_u64(1000));
        let b = Extended::scalar_mul_base(&scalar_from_u64(77));
        let sum =
            Extended::from_completed(&Completed::add(&a, &Cached::from_extended(&b)));

        assert_eq!(left.compress(), sum.compress());
    }

    #[test]
    fn doubling_matches_scalar_arithmetic() {
        let twice = Extended::scalar_mul_base(&scalar_from_u64(2 * 333));
        let point = Extended::scalar_mul_base(&scalar_from_u64(333));
        let doubled = Extended::from_completed(&point.double());

        assert_eq!(twice.compress(), doubled.compress());
    }

    #[test]
    fn double_scalar_mul_combines_both_terms() {
        // a·P + b·B with P = p·B must equal (a·p + b)·B
        let p_scalar = scalar_from_u64(11_111);
        let a = scalar_from_u64(7_777);
        let b = scalar_from_u64(123);

        let point = Extended::scalar_mul_base(&p_scalar);
        let combined = point.double_scalar_mul_vartime(&a, &b);

        let expected = Extended::scalar_mul_base(&Scalar::mul_add(a, p_scalar, b));
        assert_eq!(combined.compress(), expected.compress());
    }

    #[test]
    fn negation_cancels() {
        let point = Extended::scalar_mul_base(&scalar_from_u64(42));
        let sum = Completed::add(
            &point,
            &Cached::from_extended(&point.negate()),
        );

        let result = Extended::from_completed(&sum);
        assert_eq!(result.compress(), Extended::IDENTITY.compress());
    }
}

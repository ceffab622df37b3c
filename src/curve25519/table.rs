//! Curve constants and base-point tables.
//!
//! Nothing here is hand-transcribed: every constant is derived from the
//! curve definition at first use and cached for the lifetime of the
//! process, which makes the values bit-identical to the reference tables
//! by construction.
//!
//! - `d = −121665/121666` and `2d`,
//! - `√−1 = 2 · 4^((p−5)/8)` (since `4^((p−5)/8) = 2^((p−5)/4)`),
//! - the base point `B` with `y = 4/5` and positive `x`,
//! - `BASE_WINDOW[k][j] = (j+1) · 256ᵏ · B` for the fixed-base walk,
//! - the odd multiples `B, 3B, …, 15B` for the verification-side
//!   double-scalar multiplication.
//!
//! Derivation runs on public data only, so the one-time cost is the only
//! difference from carrying literal tables.

use std::sync::OnceLock;

use super::edwards::{Affine, Cached, Completed, Extended};
use super::field::FieldElement;

/// The Edwards constant `d`.
pub(crate) fn d() -> &'static FieldElement {
    static D: OnceLock<FieldElement> = OnceLock::new();
    D.get_or_init(|| {
        -(FieldElement::from_u32(121_665) * FieldElement::from_u32(121_666).invert())
    })
}

/// `2d`.
pub(crate) fn d2() -> &'static FieldElement {
    static D2: OnceLock<FieldElement> = OnceLock::new();
    D2.get_or_init(|| *d() + *d())
}

/// A square root of −1 in 𝔽ₚ.
pub(crate) fn sqrt_m1() -> &'static FieldElement {
    static SQRT_M1: OnceLock<FieldElement> = OnceLock::new();
    SQRT_M1.get_or_init(|| {
        FieldElement::from_u32(2) * FieldElement::from_u32(4).pow22523()
    })
}

fn add(a: &Extended, b: &Extended) -> Extended {
    Extended::from_completed(&Completed::add(a, &Cached::from_extended(b)))
}

fn double(p: &Extended) -> Extended {
    Extended::from_completed(&p.double())
}

/// The standard base point `B`.
pub(crate) fn base_point() -> &'static Extended {
    static BASE: OnceLock<Extended> = OnceLock::new();
    BASE.get_or_init(|| {
        let y = FieldElement::from_u32(4) * FieldElement::from_u32(5).invert();

        // The encoding of y with a cleared sign bit decompresses to the
        // canonical B, whose x-coordinate is even.
        Extended::decompress(&y.to_bytes()).expect("the base point is on the curve")
    })
}

/// Window table for fixed-base multiplication:
/// `BASE_WINDOW[k][j] = (j+1) · 256ᵏ · B`.
pub(crate) fn base_window() -> &'static [[Affine; 8]; 32] {
    static TABLE: OnceLock<[[Affine; 8]; 32]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[Affine::IDENTITY; 8]; 32];
        let mut power = *base_point();

        for row in table.iter_mut() {
            let mut multiple = power;
            for entry in row.iter_mut() {
                *entry = Affine::from_extended(&multiple);
                multiple = add(&multiple, &power);
            }

            for _ in 0..8 {
                power = double(&power);
            }
        }

        table
    })
}

/// Odd multiples `B, 3B, 5B, …, 15B` in affine form.
pub(crate) fn base_odd_multiples() -> &'static [Affine; 8] {
    static TABLE: OnceLock<[Affine; 8]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let double_b = double(base_point());

        let mut table = [Affine::IDENTITY; 8];
        let mut current = *base_point();
        table[0] = Affine::from_extended(&current);

        for entry in table.iter_mut().skip(1) {
            current = add(&current, &double_b);
            *entry = Affine::from_extended(&current);
        }

        table
    })
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Nutation in longitude and obliquity from a truncated IAU 1980
//! series. The thirteen largest terms are retained, good to about
//! 0.05 arcsec; the full 106-term series buys nothing at the arcsecond
//! accuracy the rest of the apparent-place pipeline works to.

use crate::constants::{DAYS_PER_CENTURY, J2000};
use crate::math::angles::RAD_PER_ARCSEC;
use crate::math::rotation::r1;
use crate::math::Matrix3;

/// One term of the IAU 1980 nutation series: multiples of the five
/// fundamental arguments (D, M, M', F, Omega) and sine/cosine amplitudes
/// in units of 0.0001 arcsec (with T-rates in 0.0001 arcsec/century).
struct NutationTerm {
    d: i8,
    m: i8,
    mp: i8,
    f: i8,
    om: i8,
    psi: f64,
    psi_t: f64,
    eps: f64,
    eps_t: f64,
}

#[rustfmt::skip]
const NUTATION_TERMS: [NutationTerm; 13] = [
    NutationTerm { d:  0, m:  0, mp:  0, f:  0, om: 1, psi: -171_996.0, psi_t: -174.2, eps: 92_025.0, eps_t:  8.9 },
    NutationTerm { d: -2, m:  0, mp:  0, f:  2, om: 2, psi:  -13_187.0, psi_t:   -1.6, eps:  5_736.0, eps_t: -3.1 },
    NutationTerm { d:  0, m:  0, mp:  0, f:  2, om: 2, psi:   -2_274.0, psi_t:   -0.2, eps:    977.0, eps_t: -0.5 },
    NutationTerm { d:  0, m:  0, mp:  0, f:  0, om: 2, psi:    2_062.0, psi_t:    0.2, eps:   -895.0, eps_t:  0.5 },
    NutationTerm { d:  0, m:  1, mp:  0, f:  0, om: 0, psi:    1_426.0, psi_t:   -3.4, eps:     54.0, eps_t: -0.1 },
    NutationTerm { d:  0, m:  0, mp:  1, f:  0, om: 0, psi:      712.0, psi_t:    0.1, eps:     -7.0, eps_t:  0.0 },
    NutationTerm { d: -2, m:  1, mp:  0, f:  2, om: 2, psi:     -517.0, psi_t:    1.2, eps:    224.0, eps_t: -0.6 },
    NutationTerm { d:  0, m:  0, mp:  0, f:  2, om: 1, psi:     -386.0, psi_t:   -0.4, eps:    200.0, eps_t:  0.0 },
    NutationTerm { d:  0, m:  0, mp:  1, f:  2, om: 2, psi:     -301.0, psi_t:    0.0, eps:    129.0, eps_t: -0.1 },
    NutationTerm { d: -2, m: -1, mp:  0, f:  2, om: 2, psi:      217.0, psi_t:   -0.5, eps:    -95.0, eps_t:  0.3 },
    NutationTerm { d: -2, m:  0, mp:  1, f:  0, om: 0, psi:     -158.0, psi_t:    0.0, eps:      0.0, eps_t:  0.0 },
    NutationTerm { d: -2, m:  0, mp:  0, f:  2, om: 1, psi:      129.0, psi_t:    0.1, eps:    -70.0, eps_t:  0.0 },
    NutationTerm { d:  0, m:  0, mp: -1, f:  2, om: 2, psi:      123.0, psi_t:    0.0, eps:    -53.0, eps_t:  0.0 },
];

fn poly(t: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// Nutation in longitude and obliquity, both in radians, at the given
/// Julian Ephemeris Date.
pub fn nutation_constants(jed: f64) -> (f64, f64) {
    let t = (jed - J2000) / DAYS_PER_CENTURY;

    // Fundamental arguments (Delaunay), IAU 1980, in degrees.
    let d = poly(t, &[297.850_36, 445_267.111_480, -0.001_9142, 1.0 / 189_474.0]);
    let m = poly(t, &[357.527_72, 35_999.050_340, -0.000_1603, -1.0 / 300_000.0]);
    let mp = poly(t, &[134.962_98, 477_198.867_398, 0.008_6972, 1.0 / 56_250.0]);
    let f = poly(t, &[93.271_91, 483_202.017_538, -0.003_6825, 1.0 / 327_270.0]);
    let om = poly(t, &[125.044_52, -1934.136_261, 0.002_0708, 1.0 / 450_000.0]);

    let mut dpsi = 0.0;
    let mut deps = 0.0;
    for term in &NUTATION_TERMS {
        let arg = (term.d as f64 * d
            + term.m as f64 * m
            + term.mp as f64 * mp
            + term.f as f64 * f
            + term.om as f64 * om)
            .to_radians();
        dpsi += (term.psi + term.psi_t * t) * arg.sin();
        deps += (term.eps + term.eps_t * t) * arg.cos();
    }

    (
        dpsi * 1.0e-4 * RAD_PER_ARCSEC,
        deps * 1.0e-4 * RAD_PER_ARCSEC,
    )
}

/// Nutation matrix transforming the mean equatorial frame of date to the
/// true equatorial frame of date.
pub fn nutation_matrix(obliquity: f64, nut_lon: f64, nut_obq: f64) -> Matrix3 {
    use crate::math::rotation::r3;
    r1(-obliquity - nut_obq) * r3(-nut_lon) * r1(obliquity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angles::ARCSEC_PER_RAD;
    use approx::assert_abs_diff_eq;

    #[test]
    fn nutation_1987_example() {
        // 1987 April 10.0 TT: dpsi = -3.788", deps = +9.443" (Meeus 22.a).
        let jed = 2_446_895.5;
        let (dpsi, deps) = nutation_constants(jed);
        assert_abs_diff_eq!(dpsi * ARCSEC_PER_RAD, -3.788, epsilon = 0.08);
        assert_abs_diff_eq!(deps * ARCSEC_PER_RAD, 9.443, epsilon = 0.08);
    }

    #[test]
    fn nutation_is_bounded() {
        // Nutation in longitude stays within +/- 20", obliquity within +/- 10".
        for k in 0..50 {
            let jed = J2000 + k as f64 * 137.3;
            let (dpsi, deps) = nutation_constants(jed);
            assert!(dpsi.abs() * ARCSEC_PER_RAD < 20.0);
            assert!(deps.abs() * ARCSEC_PER_RAD < 10.0);
        }
    }

    #[test]
    fn matrix_is_a_rotation() {
        let (dpsi, deps) = nutation_constants(J2000 + 777.0);
        let m = nutation_matrix(0.409, dpsi, deps);
        assert_abs_diff_eq!(m.determinant(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-12);
    }
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Atmospheric refraction at standard conditions (1010 mb, 10 C).
//!
//! `remove_refraction` uses Bennett's closed form; `apply_refraction`
//! inverts it numerically so the pair are mutual inverses to well under
//! 0.01 arcsec. Below -1 degree apparent altitude the Bennett argument
//! is clipped, holding refraction at its horizon-asymptote value.

use crate::math::angles::{Angle, ARCMIN_PER_RAD};

/// Apparent altitude below which the refraction formula is clipped.
const CLIP_ALT_DEG: f64 = -1.0;

/// Refraction in radians as a function of *apparent* altitude.
/// Bennett (1982), accurate to about 0.07 arcmin over the full arc.
fn refraction(apparent_alt: f64) -> f64 {
    let h = apparent_alt.to_degrees().max(CLIP_ALT_DEG);
    let r_arcmin = 1.0 / (h + 7.31 / (h + 4.4)).to_radians().tan();
    r_arcmin / ARCMIN_PER_RAD
}

/// Converts an apparent (refracted) altitude to the true altitude.
pub fn remove_refraction(apparent_alt: Angle) -> Angle {
    Angle::new(apparent_alt.rad() - refraction(apparent_alt.rad()))
}

/// Converts a true altitude to the apparent (refracted) altitude by
/// inverting `remove_refraction`.
pub fn apply_refraction(true_alt: Angle) -> Angle {
    // Fixed point of h_app = h_true + R(h_app). The iteration contracts
    // by ~0.2 per round near the horizon; run it to a fixed tolerance.
    let mut h = true_alt.rad() + refraction(true_alt.rad());
    for _ in 0..24 {
        let next = true_alt.rad() + refraction(h);
        if (next - h).abs() < 1e-12 {
            h = next;
            break;
        }
        h = next;
    }
    Angle::new(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angles::ARCSEC_PER_RAD;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(90.0)]
    #[case(45.0)]
    #[case(10.0)]
    #[case(1.0)]
    #[case(0.0)]
    #[case(-0.5)]
    fn apply_and_remove_are_inverses(#[case] alt_deg: f64) {
        let alt = Angle::from_degrees(alt_deg);
        let round = remove_refraction(apply_refraction(alt));
        assert!(
            (round.rad() - alt.rad()).abs() * ARCSEC_PER_RAD < 0.01,
            "altitude {alt_deg}: residual {} arcsec",
            (round.rad() - alt.rad()).abs() * ARCSEC_PER_RAD
        );
    }

    #[test]
    fn refraction_magnitude_at_horizon() {
        // Refraction on the horizon is about 34 arcmin.
        let r = apply_refraction(Angle::from_degrees(0.0)).rad() * ARCMIN_PER_RAD;
        assert!((28.0..40.0).contains(&r), "horizon refraction {r} arcmin");
    }

    #[test]
    fn refraction_decreases_with_altitude() {
        let r10 = refraction(Angle::from_degrees(10.0).rad());
        let r45 = refraction(Angle::from_degrees(45.0).rad());
        assert!(r10 > r45);
        // ~1 arcmin at 45 degrees.
        assert_abs_diff_eq!(r45 * ARCMIN_PER_RAD, 1.0, epsilon = 0.2);
    }

    #[test]
    fn clipped_below_horizon() {
        let deep = refraction(Angle::from_degrees(-20.0).rad());
        let edge = refraction(Angle::from_degrees(CLIP_ALT_DEG).rad());
        assert_abs_diff_eq!(deep, edge, epsilon = 1e-15);
    }
}

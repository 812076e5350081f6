/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Osculating Keplerian elements and two-body propagation.

use crate::constants::{DAYS_PER_CENTURY, J2000, SUN_MU_AU3_DAY2};
use crate::errors::{NegativeEccentricitySnafu, OrbitError};
use crate::math::angles::{Angle, TWO_PI};
use crate::math::rotation::{r1, r3};
use crate::math::{Matrix3, Vector3};

use snafu::ensure;

/// Eccentricities within this distance of 1.0 take the parabolic branch
/// of Kepler's equation.
const PARABOLIC_ECC_EPSILON: f64 = 1e-8;

const MAX_KEPLER_ITER: usize = 64;

/// Osculating Keplerian orbital elements.
///
/// Angles are in radians, distances in AU, rates in radians per day.
/// The reference plane is whatever frame the elements were derived in;
/// `transformed` rotates elements between planes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Orbit {
    /// Epoch of the elements as a Julian (Ephemeris) Date
    pub t: f64,
    /// Periapsis distance [AU]
    pub q: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination to the reference plane [rad]
    pub i: f64,
    /// Argument of periapsis [rad]
    pub w: f64,
    /// Longitude of the ascending node [rad]
    pub n: f64,
    /// Mean anomaly at epoch [rad]
    pub m: f64,
    /// Mean motion [rad/day]
    pub mm: f64,
}

impl Orbit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(t: f64, q: f64, e: f64, i: f64, w: f64, n: f64, m: f64, mm: f64) -> Self {
        Self {
            t,
            q,
            e,
            i,
            w,
            n,
            m,
            mm,
        }
    }

    /// Semi-major axis [AU]; negative for hyperbolic orbits, infinite for
    /// parabolic ones.
    pub fn semi_major_axis(&self) -> f64 {
        if (self.e - 1.0).abs() < PARABOLIC_ECC_EPSILON {
            f64::INFINITY
        } else {
            self.q / (1.0 - self.e)
        }
    }

    /// Orbital period in days; infinite for unbound orbits.
    pub fn period(&self) -> f64 {
        if self.e < 1.0 && self.mm > 0.0 {
            TWO_PI / self.mm
        } else {
            f64::INFINITY
        }
    }

    /// Heliocentric position [AU] and velocity [AU/day] in the elements'
    /// reference frame at the given Julian Ephemeris Date.
    pub fn position_velocity(&self, jed: f64) -> Result<(Vector3, Vector3), OrbitError> {
        ensure!(self.e >= 0.0, NegativeEccentricitySnafu { ecc: self.e });

        let m = self.m + self.mm * (jed - self.t);

        // In-plane (perifocal) position and velocity.
        let (x, y, vx, vy) = if (self.e - 1.0).abs() < PARABOLIC_ECC_EPSILON {
            // Parabolic branch: Barker's equation s + s^3/3 = M solved in
            // closed form; s = tan(nu/2).
            let w3 = 1.5 * m;
            let b = (w3 + (w3 * w3 + 1.0).sqrt()).cbrt();
            let s = b - 1.0 / b;
            let sdot = self.mm / (1.0 + s * s);
            (
                self.q * (1.0 - s * s),
                2.0 * self.q * s,
                -2.0 * self.q * s * sdot,
                2.0 * self.q * sdot,
            )
        } else if self.e < 1.0 {
            let a = self.q / (1.0 - self.e);
            let ea = solve_elliptic_kepler(Angle::new(m).mod_pi().rad(), self.e)?;
            let (sin_ea, cos_ea) = ea.sin_cos();
            let b = a * (1.0 - self.e * self.e).sqrt();
            let eadot = self.mm / (1.0 - self.e * cos_ea);
            (
                a * (cos_ea - self.e),
                b * sin_ea,
                -a * sin_ea * eadot,
                b * cos_ea * eadot,
            )
        } else {
            let a = self.q / (1.0 - self.e); // negative
            let ha = solve_hyperbolic_kepler(m, self.e)?;
            let b = -a * (self.e * self.e - 1.0).sqrt();
            let hadot = self.mm / (self.e * ha.cosh() - 1.0);
            (
                a * (ha.cosh() - self.e),
                -b * ha.sinh(),
                a * ha.sinh() * hadot,
                -b * ha.cosh() * hadot,
            )
        };

        // Rotate from the perifocal frame into the reference frame:
        // active rotations by w about Z, i about X, n about Z.
        let rot = r3(-self.n) * r1(-self.i) * r3(-self.w);
        let pos = rot * Vector3::new(x, y, 0.0);
        let vel = rot * Vector3::new(vx, vy, 0.0);
        Ok((pos, vel))
    }

    /// Returns these elements re-referenced through the rotation `mat`,
    /// which maps the current reference frame to the target frame. Used to
    /// convert binary-star orbits between the sky plane and the fundamental
    /// equatorial frame.
    pub fn transformed(&self, mat: &Matrix3) -> Self {
        let own = r3(-self.n) * r1(-self.i) * r3(-self.w);
        let total = mat * own;

        // Extract 3-1-3 angles from the combined perifocal-to-frame rotation.
        let cos_i = total[(2, 2)].clamp(-1.0, 1.0);
        let i = cos_i.acos();
        let (n, w) = if i.sin().abs() < 1e-12 {
            (0.0, total[(1, 0)].atan2(total[(0, 0)]))
        } else {
            (
                total[(0, 2)].atan2(-total[(1, 2)]),
                total[(2, 0)].atan2(total[(2, 1)]),
            )
        };

        Self {
            i,
            w: Angle::new(w).mod_2pi().rad(),
            n: Angle::new(n).mod_2pi().rad(),
            ..*self
        }
    }
}

/// Solves the elliptic Kepler equation `E - e sin E = M` by Newton's
/// method to 1e-12 in `E`.
pub fn solve_elliptic_kepler(m: f64, e: f64) -> Result<f64, OrbitError> {
    let mut ea = if e < 0.8 { m } else { std::f64::consts::PI.copysign(m) };
    for _ in 0..MAX_KEPLER_ITER {
        let delta = (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-12 {
            return Ok(ea);
        }
    }
    Err(OrbitError::KeplerDiverged {
        iter: MAX_KEPLER_ITER,
        mean_anomaly: m,
        ecc: e,
    })
}

/// Solves the hyperbolic Kepler equation `e sinh H - H = M` by Newton's
/// method to 1e-12 in `H`.
pub fn solve_hyperbolic_kepler(m: f64, e: f64) -> Result<f64, OrbitError> {
    let mut ha = (2.0 * m.abs() / e).ln().max(1e-3).copysign(m);
    for _ in 0..MAX_KEPLER_ITER {
        let delta = (e * ha.sinh() - ha - m) / (e * ha.cosh() - 1.0);
        ha -= delta;
        if delta.abs() < 1e-12 {
            return Ok(ha);
        }
    }
    Err(OrbitError::KeplerDiverged {
        iter: MAX_KEPLER_ITER,
        mean_anomaly: m,
        ecc: e,
    })
}

/// Mean J2000 heliocentric elements with secular rates per Julian century
/// (Standish 1992, valid 1800-2050): a [AU], e, i, mean longitude L,
/// longitude of perihelion, longitude of ascending node [deg].
struct MeanElements {
    a: f64,
    e: f64,
    i: f64,
    l: f64,
    lp: f64,
    node: f64,
    da: f64,
    de: f64,
    di: f64,
    dl: f64,
    dlp: f64,
    dnode: f64,
}

#[rustfmt::skip]
const MEAN_ELEMENTS: [MeanElements; 9] = [
    // Mercury
    MeanElements { a: 0.387_099_27, e: 0.205_635_93, i: 7.004_979_02, l: 252.250_323_50, lp: 77.457_796_28, node: 48.330_765_93,
        da: 0.000_000_37, de: 0.000_019_06, di: -0.005_947_49, dl: 149_472.674_111_75, dlp: 0.160_476_89, dnode: -0.125_340_81 },
    // Venus
    MeanElements { a: 0.723_335_66, e: 0.006_776_72, i: 3.394_676_05, l: 181.979_099_50, lp: 131.602_467_18, node: 76.679_842_55,
        da: 0.000_003_90, de: -0.000_041_07, di: -0.000_788_90, dl: 58_517.815_387_29, dlp: 0.002_683_29, dnode: -0.277_694_18 },
    // Earth-Moon barycenter
    MeanElements { a: 1.000_002_61, e: 0.016_711_23, i: -0.000_015_31, l: 100.464_571_66, lp: 102.937_681_93, node: 0.0,
        da: 0.000_005_62, de: -0.000_043_92, di: -0.012_946_68, dl: 35_999.372_449_81, dlp: 0.323_273_64, dnode: 0.0 },
    // Mars
    MeanElements { a: 1.523_710_34, e: 0.093_394_10, i: 1.849_691_42, l: -4.553_432_05, lp: -23.943_629_59, node: 49.559_538_91,
        da: 0.000_018_47, de: 0.000_078_82, di: -0.008_131_31, dl: 19_140.302_684_99, dlp: 0.444_410_88, dnode: -0.292_573_43 },
    // Jupiter
    MeanElements { a: 5.202_887_00, e: 0.048_386_24, i: 1.304_396_95, l: 34.396_440_51, lp: 14.728_479_83, node: 100.473_909_09,
        da: -0.000_116_07, de: -0.000_132_53, di: -0.001_837_14, dl: 3_034.746_127_75, dlp: 0.212_526_68, dnode: 0.204_691_06 },
    // Saturn
    MeanElements { a: 9.536_675_94, e: 0.053_861_79, i: 2.485_991_87, l: 49.954_244_23, lp: 92.598_878_31, node: 113.662_424_48,
        da: -0.001_250_60, de: -0.000_509_91, di: 0.001_936_09, dl: 1_222.493_622_01, dlp: -0.418_972_16, dnode: -0.288_677_94 },
    // Uranus
    MeanElements { a: 19.189_164_64, e: 0.047_257_44, i: 0.772_637_83, l: 313.238_104_51, lp: 170.954_276_30, node: 74.016_925_03,
        da: -0.001_961_76, de: -0.000_043_97, di: -0.002_429_39, dl: 428.482_027_85, dlp: 0.408_052_81, dnode: 0.042_405_89 },
    // Neptune
    MeanElements { a: 30.069_922_76, e: 0.008_590_48, i: 1.770_043_47, l: -55.120_029_69, lp: 44.964_762_27, node: 131.784_225_74,
        da: 0.000_262_91, de: 0.000_051_05, di: 0.000_353_72, dl: 218.459_453_25, dlp: -0.322_414_64, dnode: -0.005_086_64 },
    // Pluto
    MeanElements { a: 39.482_116_75, e: 0.248_827_30, i: 17.140_012_06, l: 238.929_038_33, lp: 224.068_916_29, node: 110.303_936_84,
        da: -0.000_315_96, de: 0.000_051_70, di: 0.000_048_18, dl: 145.207_805_15, dlp: -0.040_629_42, dnode: -0.011_834_82 },
];

/// Mean obliquity at J2000 used to carry ecliptic mean elements into the
/// fundamental equatorial frame.
const OBLIQUITY_J2000_DEG: f64 = 23.439_291_11;

/// Returns mean osculating elements for a major planet (1 = Mercury ..
/// 9 = Pluto; 3 is the Earth-Moon barycenter) at the given JED, referenced
/// to the ecliptic J2000 plane. Returns None for any other body number.
pub fn planet_mean_orbit(planet: i32, jed: f64) -> Option<Orbit> {
    if !(1..=9).contains(&planet) {
        return None;
    }
    let el = &MEAN_ELEMENTS[(planet - 1) as usize];
    let t = (jed - J2000) / DAYS_PER_CENTURY;

    let a = el.a + el.da * t;
    let e = el.e + el.de * t;
    let i = (el.i + el.di * t).to_radians();
    let l = (el.l + el.dl * t).to_radians();
    let lp = (el.lp + el.dlp * t).to_radians();
    let node = (el.node + el.dnode * t).to_radians();

    let m = Angle::new(l - lp).mod_pi().rad();
    let w = lp - node;
    let mm = (SUN_MU_AU3_DAY2 / (a * a * a)).sqrt();

    Some(Orbit::new(jed, a * (1.0 - e), e, i, w, node, m, mm))
}

/// Rotation carrying ecliptic-J2000 referenced vectors into the
/// fundamental (equatorial J2000) frame.
pub fn ecliptic_to_fundamental() -> Matrix3 {
    r1(-OBLIQUITY_J2000_DEG.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 0.1)]
    #[case(-2.5, 0.5)]
    #[case(3.0, 0.95)]
    #[case(0.1, 0.99)]
    fn elliptic_kepler_satisfies_equation(#[case] m: f64, #[case] e: f64) {
        let ea = solve_elliptic_kepler(m, e).unwrap();
        assert_abs_diff_eq!(ea - e * ea.sin(), m, epsilon = 1e-11);
    }

    #[rstest]
    #[case(0.5, 1.2)]
    #[case(-3.0, 2.5)]
    #[case(10.0, 1.05)]
    fn hyperbolic_kepler_satisfies_equation(#[case] m: f64, #[case] e: f64) {
        let ha = solve_hyperbolic_kepler(m, e).unwrap();
        assert_abs_diff_eq!(e * ha.sinh() - ha, m, epsilon = 1e-10);
    }

    #[test]
    fn circular_orbit_radius_and_speed() {
        // 1 AU circular orbit: r = 1, v = mean motion.
        let mm = SUN_MU_AU3_DAY2.sqrt();
        let orbit = Orbit::new(J2000, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, mm);
        let (pos, vel) = orbit.position_velocity(J2000 + 55.0).unwrap();
        assert_abs_diff_eq!(pos.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vel.norm(), mm, epsilon = 1e-12);
        // Velocity is perpendicular to the radius on a circular orbit.
        assert_abs_diff_eq!(pos.dot(&vel), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn periapsis_distance_at_epoch() {
        let orbit = Orbit::new(J2000, 0.5, 0.3, 0.2, 0.4, 1.0, 0.0, 0.02);
        let (pos, _) = orbit.position_velocity(J2000).unwrap();
        assert_abs_diff_eq!(pos.norm(), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn angular_momentum_is_conserved() {
        let orbit = Orbit::new(J2000, 0.8, 0.6, 0.3, 0.7, 2.0, 0.0, 0.01);
        let (p1, v1) = orbit.position_velocity(J2000 + 10.0).unwrap();
        let (p2, v2) = orbit.position_velocity(J2000 + 200.0).unwrap();
        let h1 = p1.cross(&v1);
        let h2 = p2.cross(&v2);
        assert_abs_diff_eq!(h1, h2, epsilon = 1e-10);
    }

    #[test]
    fn transform_round_trips_elements() {
        let orbit = Orbit::new(J2000, 1.2, 0.4, 0.9, 1.5, 2.5, 0.3, 0.005);
        let m = ecliptic_to_fundamental();
        let back = orbit.transformed(&m).transformed(&m.transpose());
        assert_abs_diff_eq!(back.i, orbit.i, epsilon = 1e-10);
        assert_abs_diff_eq!(back.w, orbit.w, epsilon = 1e-10);
        assert_abs_diff_eq!(back.n, orbit.n, epsilon = 1e-10);
    }

    #[test]
    fn transform_preserves_state_vectors() {
        let orbit = Orbit::new(J2000, 1.2, 0.4, 0.9, 1.5, 2.5, 0.3, 0.005);
        let m = ecliptic_to_fundamental();
        let rotated = orbit.transformed(&m);
        let (p, v) = orbit.position_velocity(J2000 + 42.0).unwrap();
        let (pr, vr) = rotated.position_velocity(J2000 + 42.0).unwrap();
        assert_abs_diff_eq!(m * p, pr, epsilon = 1e-10);
        assert_abs_diff_eq!(m * v, vr, epsilon = 1e-10);
    }

    #[test]
    fn earth_mean_elements_give_one_au() {
        let orbit = planet_mean_orbit(3, J2000).unwrap();
        let (pos, vel) = orbit.position_velocity(J2000).unwrap();
        assert!((0.97..1.03).contains(&pos.norm()), "r = {}", pos.norm());
        // About 365.25 days per revolution.
        assert_abs_diff_eq!(orbit.period(), 365.25, epsilon = 0.5);
        assert!(vel.norm() > 0.0);
    }

    #[test]
    fn negative_eccentricity_is_rejected() {
        let orbit = Orbit::new(J2000, 1.0, -0.1, 0.0, 0.0, 0.0, 0.0, 0.01);
        assert!(orbit.position_velocity(J2000).is_err());
    }
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Geocentric lunar position and velocity from an embedded truncation
//! of the ELP lunar theory (the Chapront ELP-2000/82 abridgment).
//!
//! The truncation is part of the contract: roughly a fifth of the main
//! problem terms and the strongest planetary perturbations are kept,
//! which holds the error to a few arcseconds in longitude and latitude
//! and a few tens of kilometers in distance over several millennia
//! around J2000 while evaluating 5-10x faster than the full series.
//! Velocity comes from term-by-term analytic differentiation.

use crate::constants::{DAYS_PER_CENTURY, J2000, KM_PER_AU};
use crate::coords::precession;
use crate::math::rotation::r1;
use crate::math::Vector3;

/// Mass ratio used when deriving the Earth's offset from the Earth-Moon
/// barycenter without a DE file.
pub const MOON_EARTH_MASS_RATIO: f64 = 1.0 / 81.300_567_8;

/// One term of a main-problem series: integer multiples of the four
/// Delaunay arguments (D, l', l, F) and an amplitude. Longitude and
/// latitude amplitudes are in 1e-6 degrees, distance in 1e-3 km.
struct MainTerm {
    d: i8,
    lp: i8,
    l: i8,
    f: i8,
    a: f64,
}

macro_rules! terms {
    ($( ($d:expr, $lp:expr, $l:expr, $f:expr, $a:expr) ),* $(,)?) => {
        &[ $( MainTerm { d: $d, lp: $lp, l: $l, f: $f, a: $a } ),* ]
    };
}

/// Main-problem series for ecliptic longitude, 1e-6 degrees.
#[rustfmt::skip]
const LON_TERMS: &[MainTerm] = terms![
    (0, 0, 1, 0, 6_288_774.0), (2, 0, -1, 0, 1_274_027.0), (2, 0, 0, 0, 658_314.0),
    (0, 0, 2, 0, 213_618.0), (0, 1, 0, 0, -185_116.0), (0, 0, 0, 2, -114_332.0),
    (2, 0, -2, 0, 58_793.0), (2, -1, -1, 0, 57_066.0), (2, 0, 1, 0, 53_322.0),
    (2, -1, 0, 0, 45_758.0), (0, 1, -1, 0, -40_923.0), (1, 0, 0, 0, -34_720.0),
    (0, 1, 1, 0, -30_383.0), (2, 0, 0, -2, 15_327.0), (0, 0, 1, 2, -12_528.0),
    (0, 0, 1, -2, 10_980.0), (4, 0, -1, 0, 10_675.0), (0, 0, 3, 0, 10_034.0),
    (4, 0, -2, 0, 8_548.0), (2, 1, -1, 0, -7_888.0), (2, 1, 0, 0, -6_766.0),
    (1, 0, -1, 0, -5_163.0), (1, 1, 0, 0, 4_987.0), (2, -1, 1, 0, 4_036.0),
    (2, 0, 2, 0, 3_994.0), (4, 0, 0, 0, 3_861.0), (2, 0, -3, 0, 3_665.0),
    (0, 1, -2, 0, -2_689.0), (2, 0, -1, 2, -2_602.0), (2, -1, -2, 0, 2_390.0),
    (1, 0, 1, 0, -2_348.0), (2, -2, 0, 0, 2_236.0), (0, 1, 2, 0, -2_120.0),
    (0, 2, 0, 0, -2_069.0), (2, -2, -1, 0, 2_048.0), (2, 0, 1, -2, -1_773.0),
    (2, 0, 0, 2, -1_595.0), (4, -1, -1, 0, 1_215.0), (0, 0, 2, 2, -1_110.0),
    (3, 0, -1, 0, -892.0), (2, 1, 1, 0, -810.0), (4, -1, -2, 0, 759.0),
    (0, 2, -1, 0, -713.0), (2, 2, -1, 0, -700.0), (2, 1, -2, 0, 691.0),
    (2, -1, 0, -2, 596.0), (4, 0, 1, 0, 549.0), (0, 0, 4, 0, 537.0),
    (4, -1, 0, 0, 520.0), (1, 0, -2, 0, -487.0), (2, 1, 0, -2, -399.0),
    (0, 0, 2, -2, -381.0), (1, 1, 1, 0, 351.0), (3, 0, -2, 0, -340.0),
    (4, 0, -3, 0, 330.0), (2, -1, 2, 0, 327.0), (0, 2, 1, 0, -323.0),
    (1, 1, -1, 0, 299.0), (2, 0, 3, 0, 294.0),
];

/// Main-problem series for ecliptic latitude, 1e-6 degrees.
#[rustfmt::skip]
const LAT_TERMS: &[MainTerm] = terms![
    (0, 0, 0, 1, 5_128_122.0), (0, 0, 1, 1, 280_602.0), (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0), (2, 0, -1, 1, 55_413.0), (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0), (0, 0, 2, 1, 17_198.0), (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0), (2, -1, 0, -1, 8_216.0), (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0), (2, 1, 0, -1, -3_359.0), (2, -1, -1, 1, 2_463.0),
    (2, -1, 0, 1, 2_211.0), (2, -1, -1, -1, 2_065.0), (0, 1, -1, -1, -1_870.0),
    (4, 0, -1, -1, 1_828.0), (0, 1, 0, 1, -1_794.0), (0, 0, 0, 3, -1_749.0),
    (0, 1, -1, 1, -1_565.0), (1, 0, 0, 1, -1_491.0), (0, 1, 1, 1, -1_475.0),
    (0, 1, 1, -1, -1_410.0), (0, 1, 0, -1, -1_344.0), (1, 0, 0, -1, -1_335.0),
    (0, 0, 3, 1, 1_107.0), (4, 0, 0, -1, 1_021.0), (4, 0, -1, 1, 833.0),
    (0, 0, 1, -3, 777.0), (4, 0, -2, 1, 671.0), (2, 0, 0, -3, 607.0),
    (2, 0, 2, -1, 596.0), (2, -1, 1, -1, 491.0), (2, 0, -2, 1, -451.0),
    (0, 0, 3, -1, 439.0), (2, 0, 2, 1, 422.0), (2, 0, -3, -1, 421.0),
    (2, 1, -1, 1, -366.0), (2, 1, 0, 1, -351.0), (4, 0, 0, 1, 331.0),
    (2, -1, 1, 1, 315.0), (2, -2, 0, -2, 302.0), (0, 0, 1, 3, -283.0),
    (2, 1, 1, -1, -229.0), (1, 1, 0, -1, 223.0), (1, 1, 0, 1, 223.0),
    (0, 1, -2, -1, -220.0), (2, 1, -1, -1, -220.0), (1, 0, 1, -1, -185.0),
    (2, -1, -2, -1, 181.0), (0, 1, 2, 1, -177.0), (4, 0, -2, -1, 176.0),
    (4, -1, -1, -1, 166.0), (1, 0, 1, 1, -164.0), (4, 0, 1, -1, 132.0),
    (1, 0, -2, -1, -119.0), (4, -1, 0, -1, 115.0), (2, -2, 0, 1, 107.0),
];

/// Main-problem series for distance, 1e-3 km.
#[rustfmt::skip]
const DIST_TERMS: &[MainTerm] = terms![
    (0, 0, 1, 0, -20_905_355.0), (2, 0, -1, 0, -3_699_111.0), (2, 0, 0, 0, -2_955_968.0),
    (0, 0, 2, 0, -569_925.0), (0, 1, 0, 0, 48_888.0), (0, 0, 0, 2, -3_149.0),
    (2, 0, -2, 0, 246_158.0), (2, -1, -1, 0, -152_138.0), (2, 0, 1, 0, -170_733.0),
    (2, -1, 0, 0, -204_586.0), (0, 1, -1, 0, -129_620.0), (1, 0, 0, 0, 108_743.0),
    (0, 1, 1, 0, 104_755.0), (2, 0, 0, -2, 10_321.0), (0, 0, 1, -2, 79_661.0),
    (4, 0, -1, 0, -34_782.0), (0, 0, 3, 0, -23_210.0), (4, 0, -2, 0, -21_636.0),
    (2, 1, -1, 0, 24_208.0), (2, 1, 0, 0, 30_824.0), (1, 0, -1, 0, -8_379.0),
    (1, 1, 0, 0, -16_675.0), (2, -1, 1, 0, -12_831.0), (2, 0, 2, 0, -10_445.0),
    (4, 0, 0, 0, -11_650.0), (2, 0, -3, 0, 14_403.0), (0, 1, -2, 0, -7_003.0),
    (2, 0, -1, -2, 8_752.0), (2, -1, -2, 0, 10_056.0), (1, 0, 1, 0, 6_322.0),
    (2, -2, 0, 0, -9_884.0), (0, 1, 2, 0, 5_751.0), (2, -2, -1, 0, -4_950.0),
    (2, 0, 1, -2, 4_130.0), (4, -1, -1, 0, -3_958.0), (3, 0, -1, 0, 3_258.0),
    (2, 1, 1, 0, 2_616.0), (4, -1, -2, 0, -1_897.0), (0, 2, -1, 0, -2_117.0),
    (2, 2, -1, 0, 2_354.0), (4, 0, 1, 0, -1_423.0), (0, 0, 4, 0, -1_117.0),
    (4, -1, 0, 0, -1_571.0), (1, 0, -2, 0, -1_739.0), (0, 0, 2, -2, -4_421.0),
    (0, 2, 1, 0, 1_165.0),
];

/// The fundamental arguments as polynomials in Julian centuries:
/// value in degrees and rate in degrees per century.
struct Argument {
    value: f64,
    rate: f64,
}

fn argument(t: f64, coeffs: &[f64]) -> Argument {
    let mut value = 0.0;
    for &c in coeffs.iter().rev() {
        value = value * t + c;
    }
    let mut rate = 0.0;
    for (k, &c) in coeffs.iter().enumerate().skip(1) {
        rate += k as f64 * c * t.powi(k as i32 - 1);
    }
    Argument { value, rate }
}

struct Arguments {
    lm: Argument, // Moon's mean longitude
    d: Argument,  // mean elongation
    lp: Argument, // Sun's mean anomaly
    l: Argument,  // Moon's mean anomaly
    f: Argument,  // argument of latitude
    e: f64,       // eccentricity damping for l' terms
    de: f64,
}

fn arguments(t: f64) -> Arguments {
    Arguments {
        lm: argument(
            t,
            &[218.316_447_7, 481_267.881_234_21, -0.001_578_6, 1.0 / 538_841.0, -1.0 / 65_194_000.0],
        ),
        d: argument(
            t,
            &[297.850_192_1, 445_267.111_403_4, -0.001_881_9, 1.0 / 545_868.0, -1.0 / 113_065_000.0],
        ),
        lp: argument(
            t,
            &[357.529_109_2, 35_999.050_290_9, -0.000_153_6, 1.0 / 24_490_000.0],
        ),
        l: argument(
            t,
            &[134.963_396_4, 477_198.867_505_5, 0.008_741_4, 1.0 / 69_699.0, -1.0 / 14_712_000.0],
        ),
        f: argument(
            t,
            &[93.272_095_0, 483_202.017_523_3, -0.003_653_9, -1.0 / 3_526_000.0, 1.0 / 863_310_000.0],
        ),
        e: 1.0 - 0.002_516 * t - 0.000_007_4 * t * t,
        de: -0.002_516 - 2.0 * 0.000_007_4 * t,
    }
}

/// Evaluates a main-problem series and its time derivative. `sine`
/// selects sine terms (longitude, latitude) versus cosine (distance).
fn evaluate(series: &[MainTerm], args: &Arguments, sine: bool) -> (f64, f64) {
    let mut sum = 0.0;
    let mut rate = 0.0;
    for term in series {
        let arg = (term.d as f64 * args.d.value
            + term.lp as f64 * args.lp.value
            + term.l as f64 * args.l.value
            + term.f as f64 * args.f.value)
            .to_radians();
        let arg_rate = (term.d as f64 * args.d.rate
            + term.lp as f64 * args.lp.rate
            + term.l as f64 * args.l.rate
            + term.f as f64 * args.f.rate)
            .to_radians();

        // Terms involving the Sun's mean anomaly are damped by the slow
        // decrease of the Earth's orbital eccentricity.
        let (efac, defac) = match term.lp.abs() {
            0 => (1.0, 0.0),
            1 => (args.e, args.de),
            _ => (args.e * args.e, 2.0 * args.e * args.de),
        };

        let (s, c) = arg.sin_cos();
        if sine {
            sum += term.a * efac * s;
            rate += term.a * (efac * c * arg_rate + defac * s);
        } else {
            sum += term.a * efac * c;
            rate += term.a * (defac * c - efac * s * arg_rate);
        }
    }
    (sum, rate)
}

/// Computes the Moon's geocentric position [AU] and velocity [AU/day]
/// in the fundamental (J2000 mean equatorial) frame at the given
/// Julian Ephemeris Date.
pub fn moon_position_velocity(jed: f64) -> (Vector3, Vector3) {
    let t = (jed - J2000) / DAYS_PER_CENTURY;
    let args = arguments(t);

    let (mut lon_sum, mut lon_rate) = evaluate(LON_TERMS, &args, true);
    let (mut lat_sum, mut lat_rate) = evaluate(LAT_TERMS, &args, true);
    let (dist_sum, dist_rate) = evaluate(DIST_TERMS, &args, false);

    // Strongest planetary perturbations (Venus, Jupiter) and the flattening
    // term, in the same 1e-6 degree units.
    let a1 = argument(t, &[119.75, 131.849]);
    let a2 = argument(t, &[53.09, 479_264.290]);
    let a3 = argument(t, &[313.45, 481_266.484]);
    for (amp, arg) in [
        (3958.0, a1.value),
        (1962.0, args.lm.value - args.f.value),
        (318.0, a2.value),
    ] {
        lon_sum += amp * arg.to_radians().sin();
    }
    lon_rate += 3958.0 * a1.value.to_radians().cos() * a1.rate.to_radians()
        + 1962.0 * (args.lm.value - args.f.value).to_radians().cos()
            * (args.lm.rate - args.f.rate).to_radians()
        + 318.0 * a2.value.to_radians().cos() * a2.rate.to_radians();

    for (amp, value, vrate) in [
        (-2235.0, args.lm.value, args.lm.rate),
        (382.0, a3.value, a3.rate),
        (175.0, a1.value - args.f.value, a1.rate - args.f.rate),
        (175.0, a1.value + args.f.value, a1.rate + args.f.rate),
        (127.0, args.lm.value - args.l.value, args.lm.rate - args.l.rate),
        (-115.0, args.lm.value + args.l.value, args.lm.rate + args.l.rate),
    ] {
        lat_sum += amp * value.to_radians().sin();
        lat_rate += amp * value.to_radians().cos() * vrate.to_radians();
    }

    // Ecliptic-of-date spherical coordinates and their rates (per century).
    let lon = (args.lm.value + lon_sum * 1e-6).to_radians();
    let lat = (lat_sum * 1e-6).to_radians();
    let dist_km = 385_000.56 + dist_sum * 1e-3;

    let lon_dot = (args.lm.rate + lon_rate * 1e-6).to_radians() / DAYS_PER_CENTURY;
    let lat_dot = (lat_rate * 1e-6).to_radians() / DAYS_PER_CENTURY;
    let dist_dot_km = dist_rate * 1e-3 / DAYS_PER_CENTURY;

    let r = dist_km / KM_PER_AU;
    let r_dot = dist_dot_km / KM_PER_AU;

    let (sin_lon, cos_lon) = lon.sin_cos();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let unit = Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
    let d_unit_dlon = Vector3::new(-cos_lat * sin_lon, cos_lat * cos_lon, 0.0);
    let d_unit_dlat = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);

    let pos_ecl = unit * r;
    let vel_ecl = unit * r_dot + (d_unit_dlon * lon_dot + d_unit_dlat * lat_dot) * r;

    // Mean ecliptic of date -> mean equator of date -> fundamental.
    let to_equ = r1(-precession::obliquity(jed));
    let to_j2000 = precession::precession_matrix(jed).transpose();
    let rot = to_j2000 * to_equ;

    (rot * pos_ecl, rot * vel_ecl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::spherical::Spherical;
    use approx::assert_abs_diff_eq;

    /// 1992 April 12.0 TT reference values: geocentric lambda 133.162655,
    /// beta -3.229126, distance 368409.7 km, on the mean ecliptic of date.
    #[test]
    fn reference_epoch_1992() {
        let jed = 2_448_724.5;
        let (pos, _) = moon_position_velocity(jed);

        // Carry the fundamental-frame vector back to the ecliptic of date.
        let to_ecl = r1(precession::obliquity(jed)) * precession::precession_matrix(jed);
        let ecl = Spherical::from_vector(&(to_ecl * pos));

        assert_abs_diff_eq!(ecl.lon.to_degrees(), 133.162_655, epsilon = 0.02);
        assert_abs_diff_eq!(ecl.lat.to_degrees(), -3.229_126, epsilon = 0.01);
        assert_abs_diff_eq!(ecl.rad * KM_PER_AU, 368_409.7, epsilon = 50.0);
    }

    #[test]
    fn distance_stays_in_lunar_range() {
        for k in 0..120 {
            let jed = J2000 + k as f64 * 11.3;
            let (pos, _) = moon_position_velocity(jed);
            let d = pos.norm() * KM_PER_AU;
            assert!((356_000.0..407_000.0).contains(&d), "distance {d} km");
        }
    }

    #[test]
    fn velocity_matches_finite_differences() {
        let jed = J2000 + 1234.5;
        let h = 1e-3;
        let (p0, v) = moon_position_velocity(jed);
        let (p1, _) = moon_position_velocity(jed + h);
        let (pm, _) = moon_position_velocity(jed - h);
        let fd = (p1 - pm) / (2.0 * h);
        assert_abs_diff_eq!(v, fd, epsilon = 1e-8);
        assert!(p0.norm() > 0.0);
    }

    #[test]
    fn sidereal_period_is_27_3_days() {
        // The ecliptic longitude advances 360 degrees in ~27.32 days.
        let (p0, _) = moon_position_velocity(J2000);
        let (p1, _) = moon_position_velocity(J2000 + 27.321_661);
        let sep = crate::math::angular_separation(&p0.normalize(), &p1.normalize());
        assert!(sep.to_degrees() < 2.5, "separation {} deg", sep.to_degrees());
    }
}

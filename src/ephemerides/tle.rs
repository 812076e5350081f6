/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Two-line element sets and the Earth-satellite propagator seam.
//!
//! The SGP4/SDP4 analytic theories are external collaborators; this
//! module fixes the interface they plug into and supplies a plain
//! Keplerian adapter so satellite objects remain computable without
//! them (adequate for pass prediction over a few days near the TLE
//! epoch, not for operational tracking).

use crate::constants::SECONDS_PER_DAY;
use crate::errors::{BadChecksumSnafu, BadLineLengthSnafu, TleError};
use crate::math::angles::TWO_PI;
use crate::math::Vector3;
use crate::orbit::Orbit;
use crate::time::{CalendarKind, Time};

use snafu::ensure;

/// Earth's gravitational parameter, km^3/s^2 (WGS72, the SGP4 value).
const EARTH_MU_KM3_S2: f64 = 398_600.8;

/// A NORAD two-line element set.
#[derive(Clone, Debug, PartialEq)]
pub struct Tle {
    pub name: String,
    pub norad: i64,
    pub intl_designator: String,
    /// Epoch as a civil Julian Date (UTC)
    pub epoch_jd: f64,
    /// Inclination [rad]
    pub inclination: f64,
    /// Right ascension of the ascending node [rad]
    pub raan: f64,
    pub eccentricity: f64,
    /// Argument of perigee [rad]
    pub arg_perigee: f64,
    /// Mean anomaly at epoch [rad]
    pub mean_anomaly: f64,
    /// Mean motion [rev/day]
    pub mean_motion: f64,
    /// First derivative of mean motion / 2 [rev/day^2]
    pub mean_motion_dot: f64,
    /// B* drag term [1/Earth radii]
    pub bstar: f64,
    pub revolution_number: i64,
}

/// Anything that can turn a TLE plus an epoch into a geocentric state.
/// Implementations return position in kilometers and velocity in
/// kilometers per second, in the true equatorial frame of date.
pub trait SatellitePropagator {
    fn position_velocity(&self, jed: f64) -> (Vector3, Vector3);

    /// Whether the deep-space (SDP4) branch applies: period >= 225 min.
    fn is_deep_space(&self) -> bool;
}

impl Tle {
    /// Parses a two-line element set, with an optional preceding name
    /// line. Both data lines are checksum-verified.
    pub fn parse(text: &str) -> Result<Self, TleError> {
        let mut lines = text.lines().map(str::trim_end).filter(|l| !l.is_empty());
        let first = lines.next().ok_or(TleError::BadField { field: "line 1" })?;
        let (name, line1) = if first.starts_with('1') && first.len() >= 69 {
            (String::new(), first)
        } else {
            (
                first.trim().to_string(),
                lines.next().ok_or(TleError::BadField { field: "line 1" })?,
            )
        };
        let line2 = lines.next().ok_or(TleError::BadField { field: "line 2" })?;

        verify_line(line1, 1)?;
        verify_line(line2, 2)?;

        let norad = field(line1, 2, 7, "catalog number")?
            .parse::<i64>()
            .map_err(|_| TleError::BadField {
                field: "catalog number",
            })?;
        let intl_designator = field(line1, 9, 17, "international designator")?
            .trim()
            .to_string();

        let epoch_year: i32 = field(line1, 18, 20, "epoch year")?
            .parse()
            .map_err(|_| TleError::BadField { field: "epoch year" })?;
        let epoch_day: f64 = field(line1, 20, 32, "epoch day")?
            .trim()
            .parse()
            .map_err(|_| TleError::BadField { field: "epoch day" })?;
        let year = if epoch_year < 57 {
            2000 + epoch_year
        } else {
            1900 + epoch_year
        };
        let epoch_jd =
            Time::from_calendar_date(CalendarKind::Gregorian, 0.0, year, 1, epoch_day, 0, 0, 0.0)
                .jd;

        let mean_motion_dot: f64 = field(line1, 33, 43, "mean motion dot")?
            .trim()
            .parse()
            .map_err(|_| TleError::BadField {
                field: "mean motion dot",
            })?;
        let bstar = parse_exponent_field(field(line1, 53, 61, "bstar")?)?;

        let inclination = parse_degrees(field(line2, 8, 16, "inclination")?)?;
        let raan = parse_degrees(field(line2, 17, 25, "raan")?)?;
        let eccentricity: f64 = format!("0.{}", field(line2, 26, 33, "eccentricity")?.trim())
            .parse()
            .map_err(|_| TleError::BadField {
                field: "eccentricity",
            })?;
        let arg_perigee = parse_degrees(field(line2, 34, 42, "argument of perigee")?)?;
        let mean_anomaly = parse_degrees(field(line2, 43, 51, "mean anomaly")?)?;
        let mean_motion: f64 = field(line2, 52, 63, "mean motion")?
            .trim()
            .parse()
            .map_err(|_| TleError::BadField {
                field: "mean motion",
            })?;
        let revolution_number = field(line2, 63, 68, "revolution number")?
            .trim()
            .parse()
            .unwrap_or(0);

        Ok(Self {
            name,
            norad,
            intl_designator,
            epoch_jd,
            inclination,
            raan,
            eccentricity,
            arg_perigee,
            mean_anomaly,
            mean_motion,
            mean_motion_dot,
            bstar,
            revolution_number,
        })
    }

    /// Orbital period in minutes.
    pub fn period_minutes(&self) -> f64 {
        24.0 * 60.0 / self.mean_motion
    }
}

fn field<'a>(line: &'a str, start: usize, end: usize, name: &'static str) -> Result<&'a str, TleError> {
    line.get(start..end).ok_or(TleError::BadField { field: name })
}

fn parse_degrees(s: &str) -> Result<f64, TleError> {
    s.trim()
        .parse::<f64>()
        .map(|d| d.to_radians())
        .map_err(|_| TleError::BadField { field: "angle" })
}

/// Parses the TLE compressed exponent notation, e.g. ` 34123-4` for
/// 0.34123e-4.
fn parse_exponent_field(s: &str) -> Result<f64, TleError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let (mantissa_str, exp_str) = s.split_at(s.len().saturating_sub(2));
    let sign = if mantissa_str.starts_with('-') { -1.0 } else { 1.0 };
    let digits: String = mantissa_str.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(0.0);
    }
    let mantissa: f64 = format!("0.{digits}")
        .parse()
        .map_err(|_| TleError::BadField { field: "exponent field" })?;
    let exp: i32 = exp_str
        .replace('+', "")
        .parse()
        .map_err(|_| TleError::BadField { field: "exponent field" })?;
    Ok(sign * mantissa * 10f64.powi(exp))
}

/// TLE line checksum: sum of digits, minus signs count as 1, modulo 10.
fn checksum(line: &str) -> u32 {
    line.chars()
        .take(68)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

fn verify_line(line: &str, which: usize) -> Result<(), TleError> {
    ensure!(
        line.len() >= 69,
        BadLineLengthSnafu {
            line: which,
            len: line.len(),
        }
    );
    let expected = line
        .chars()
        .nth(68)
        .and_then(|c| c.to_digit(10))
        .ok_or(TleError::BadField { field: "checksum" })?;
    let computed = checksum(line);
    ensure!(
        computed == expected,
        BadChecksumSnafu {
            line: which,
            expected,
            computed,
        }
    );
    Ok(())
}

/// Plain Keplerian propagation of TLE mean elements. Stands in when no
/// SGP4/SDP4 implementation is plugged in.
pub struct KeplerSatellite {
    tle: Tle,
    orbit: Orbit,
}

impl KeplerSatellite {
    pub fn new(tle: Tle) -> Self {
        let mm_rad_day = tle.mean_motion * TWO_PI; // rad/day
        // Semi-major axis from the mean motion, in km.
        let n_rad_s = mm_rad_day / SECONDS_PER_DAY;
        let sma_km = (EARTH_MU_KM3_S2 / (n_rad_s * n_rad_s)).cbrt();
        let orbit = Orbit::new(
            tle.epoch_jd,
            sma_km * (1.0 - tle.eccentricity), // q in km here, scaled on output
            tle.eccentricity,
            tle.inclination,
            tle.arg_perigee,
            tle.raan,
            tle.mean_anomaly,
            mm_rad_day,
        );
        Self { tle, orbit }
    }

    pub fn tle(&self) -> &Tle {
        &self.tle
    }
}

impl SatellitePropagator for KeplerSatellite {
    fn position_velocity(&self, jed: f64) -> (Vector3, Vector3) {
        match self.orbit.position_velocity(jed) {
            // The orbit was built with q in kilometers, so the state is
            // already km and km/day; convert velocity to km/s.
            Ok((pos, vel)) => (pos, vel / SECONDS_PER_DAY),
            Err(_) => (Vector3::zeros(), Vector3::zeros()),
        }
    }

    fn is_deep_space(&self) -> bool {
        self.tle.period_minutes() >= 225.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KM_PER_EARTH_RADII;
    use approx::assert_abs_diff_eq;

    const ISS: &str = "ISS (ZARYA)\n\
        1 25544U 98067A   20094.54083333  .00016717  00000-0  10270-3 0  9001\n\
        2 25544  51.6442 147.0743 0004607  95.6786 264.4929 15.48679624221528";

    #[test]
    fn parses_iss_elements() {
        let tle = Tle::parse(ISS).unwrap();
        assert_eq!(tle.norad, 25544);
        assert_eq!(tle.name, "ISS (ZARYA)");
        assert_abs_diff_eq!(tle.inclination.to_degrees(), 51.6442, epsilon = 1e-6);
        assert_abs_diff_eq!(tle.raan.to_degrees(), 147.0743, epsilon = 1e-6);
        assert_abs_diff_eq!(tle.eccentricity, 0.0004607, epsilon = 1e-9);
        assert_abs_diff_eq!(tle.mean_motion, 15.486_796_24, epsilon = 1e-8);
        // Epoch 2020 day 94.54083333 is 2020-04-03 12:58 UT.
        assert_abs_diff_eq!(tle.epoch_jd, 2_458_943.040_833, epsilon = 1e-5);
        assert!(!KeplerSatellite::new(tle).is_deep_space());
    }

    #[test]
    fn checksum_is_enforced() {
        let bad = ISS.replace("9005", "9006");
        assert!(Tle::parse(&bad).is_err());
    }

    #[test]
    fn kepler_adapter_gives_leo_altitude() {
        let tle = Tle::parse(ISS).unwrap();
        let epoch = tle.epoch_jd;
        let sat = KeplerSatellite::new(tle);
        let (pos, vel) = sat.position_velocity(epoch);
        let alt = pos.norm() - KM_PER_EARTH_RADII;
        assert!((350.0..450.0).contains(&alt), "altitude {alt} km");
        // Circular LEO speed ~7.7 km/s.
        assert!((7.4..8.0).contains(&vel.norm()), "speed {} km/s", vel.norm());
    }

    #[test]
    fn exponent_field_forms() {
        assert_abs_diff_eq!(parse_exponent_field(" 10270-3").unwrap(), 0.10270e-3, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_exponent_field("-11606-4").unwrap(), -0.11606e-4, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_exponent_field(" 00000-0").unwrap(), 0.0, epsilon = 1e-15);
    }
}

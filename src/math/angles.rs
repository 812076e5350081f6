/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};
use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;
pub const HALF_PI: f64 = PI / 2.0;

pub const DEG_PER_RAD: f64 = 180.0 / PI;
pub const RAD_PER_DEG: f64 = PI / 180.0;
pub const HOUR_PER_RAD: f64 = 12.0 / PI;
pub const RAD_PER_HOUR: f64 = PI / 12.0;
pub const ARCMIN_PER_RAD: f64 = 60.0 * DEG_PER_RAD;
pub const RAD_PER_ARCMIN: f64 = 1.0 / ARCMIN_PER_RAD;
pub const ARCSEC_PER_RAD: f64 = 3600.0 * DEG_PER_RAD;
pub const RAD_PER_ARCSEC: f64 = 1.0 / ARCSEC_PER_RAD;

/// An angle stored in radians, convertible to and from degrees, hours,
/// arcminutes, arcseconds, and sexagesimal representations.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub const fn new(rad: f64) -> Self {
        Self(rad)
    }

    pub fn from_degrees(deg: f64) -> Self {
        Self(deg * RAD_PER_DEG)
    }

    pub fn from_hours(hours: f64) -> Self {
        Self(hours * RAD_PER_HOUR)
    }

    pub fn from_arcmin(arcmin: f64) -> Self {
        Self(arcmin * RAD_PER_ARCMIN)
    }

    pub fn from_arcsec(arcsec: f64) -> Self {
        Self(arcsec * RAD_PER_ARCSEC)
    }

    pub const fn rad(&self) -> f64 {
        self.0
    }

    pub fn to_degrees(&self) -> f64 {
        self.0 * DEG_PER_RAD
    }

    pub fn to_hours(&self) -> f64 {
        self.0 * HOUR_PER_RAD
    }

    pub fn to_arcmin(&self) -> f64 {
        self.0 * ARCMIN_PER_RAD
    }

    pub fn to_arcsec(&self) -> f64 {
        self.0 * ARCSEC_PER_RAD
    }

    /// Reduces this angle to the half-open interval [0, 2π).
    pub fn mod_2pi(&self) -> Self {
        Self(self.0 - TWO_PI * (self.0 / TWO_PI).floor())
    }

    /// Reduces this angle to the half-open interval (-π, +π].
    pub fn mod_pi(&self) -> Self {
        let mut x = self.mod_2pi().0;
        if x > PI {
            x -= TWO_PI;
        }
        Self(x)
    }
}

impl From<f64> for Angle {
    fn from(rad: f64) -> Self {
        Self(rad)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Angle {
    type Output = Angle;
    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

/// Sexagesimal degrees-minutes-seconds representation of an angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DegMinSec {
    pub sign: char,
    pub deg: i16,
    pub min: i16,
    pub sec: f64,
}

impl DegMinSec {
    pub fn new(sign: char, deg: i16, min: i16, sec: f64) -> Self {
        Self {
            sign,
            deg,
            min,
            sec,
        }
    }

    pub fn from_angle(ang: Angle) -> Self {
        let degrees = ang.to_degrees().abs();
        let deg = degrees as i16;
        let min = (60.0 * (degrees - deg as f64)) as i16;
        let sec = 3600.0 * (degrees - deg as f64 - min as f64 / 60.0);
        Self {
            sign: if ang.rad() >= 0.0 { '+' } else { '-' },
            deg,
            min,
            sec,
        }
    }

    pub fn to_angle(&self) -> Angle {
        let sign = if self.sign == '-' { -1.0 } else { 1.0 };
        Angle::from_degrees(
            sign * (self.deg as f64 + self.min as f64 / 60.0 + self.sec / 3600.0),
        )
    }

    /// Parses strings like `-08 12 06.0`; whitespace-separated fields,
    /// missing trailing fields treated as zero. Returns None for an
    /// empty or non-numeric string.
    pub fn parse(s: &str) -> Option<Self> {
        parse_sexagesimal(s).map(|(sign, a, b, c)| Self::new(sign, a, b, c))
    }
}

impl fmt::Display for DegMinSec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{:02} {:02} {:04.1}",
            self.sign, self.deg, self.min, self.sec
        )
    }
}

/// Sexagesimal hours-minutes-seconds representation of an angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HourMinSec {
    pub sign: char,
    pub hour: i16,
    pub min: i16,
    pub sec: f64,
}

impl HourMinSec {
    pub fn new(sign: char, hour: i16, min: i16, sec: f64) -> Self {
        Self {
            sign,
            hour,
            min,
            sec,
        }
    }

    pub fn from_angle(ang: Angle) -> Self {
        let hours = ang.to_hours().abs();
        let hour = hours as i16;
        let min = (60.0 * (hours - hour as f64)) as i16;
        let sec = 3600.0 * (hours - hour as f64 - min as f64 / 60.0);
        Self {
            sign: if ang.rad() >= 0.0 { '+' } else { '-' },
            hour,
            min,
            sec,
        }
    }

    pub fn to_angle(&self) -> Angle {
        let sign = if self.sign == '-' { -1.0 } else { 1.0 };
        Angle::from_hours(sign * (self.hour as f64 + self.min as f64 / 60.0 + self.sec / 3600.0))
    }

    pub fn parse(s: &str) -> Option<Self> {
        parse_sexagesimal(s).map(|(sign, a, b, c)| Self::new(sign, a, b, c))
    }
}

impl fmt::Display for HourMinSec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02} {:02} {:06.3}",
            self.hour, self.min, self.sec
        )
    }
}

fn parse_sexagesimal(s: &str) -> Option<(char, i16, i16, f64)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let sign = if s.starts_with('-') { '-' } else { '+' };
    let body = s.trim_start_matches(['+', '-']);
    let mut parts = body.split_whitespace();
    let major: i16 = parts.next()?.parse().ok()?;
    let min: i16 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let sec: f64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0.0);
    Some((sign, major, min, sec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-1.0)]
    #[case(7.0 * PI)]
    #[case(-7.0 * PI)]
    #[case(TWO_PI)]
    #[case(-1e-9)]
    fn mod_2pi_in_range(#[case] rad: f64) {
        let m = Angle::new(rad).mod_2pi().rad();
        assert!((0.0..TWO_PI).contains(&m), "mod_2pi({rad}) = {m}");
    }

    #[rstest]
    #[case(0.0)]
    #[case(PI)]
    #[case(-PI)]
    #[case(3.5 * PI)]
    #[case(-3.5 * PI)]
    fn mod_pi_in_range(#[case] rad: f64) {
        let m = Angle::new(rad).mod_pi().rad();
        assert!(-PI < m && m <= PI, "mod_pi({rad}) = {m}");
    }

    #[test]
    fn unit_conversions() {
        assert_abs_diff_eq!(Angle::from_degrees(180.0).rad(), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(Angle::from_hours(12.0).rad(), PI, epsilon = 1e-15);
        assert_abs_diff_eq!(Angle::from_arcsec(3600.0).to_degrees(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Angle::from_arcmin(60.0).to_degrees(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn dms_round_trip() {
        let ang = Angle::from_degrees(-8.201_667);
        let dms = DegMinSec::from_angle(ang);
        assert_eq!(dms.sign, '-');
        assert_eq!(dms.deg, 8);
        assert_eq!(dms.min, 12);
        assert_abs_diff_eq!(dms.to_angle().rad(), ang.rad(), epsilon = 1e-12);
    }

    #[test]
    fn hms_parse_and_format() {
        let hms = HourMinSec::parse("05 14 32.3").unwrap();
        assert_eq!(hms.hour, 5);
        assert_eq!(hms.min, 14);
        assert_abs_diff_eq!(hms.sec, 32.3, epsilon = 1e-12);
        assert_eq!(format!("{hms}"), "05 14 32.300");
    }

    #[test]
    fn dms_parse_negative() {
        let dms = DegMinSec::parse("-08 12 06").unwrap();
        assert_eq!(dms.sign, '-');
        assert!(dms.to_angle().rad() < 0.0);
        assert!(DegMinSec::parse("").is_none());
        assert!(DegMinSec::parse("junk").is_none());
    }
}

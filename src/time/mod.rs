/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Civil time as a Julian Date with a local zone and calendar system,
//! plus Delta-T, sidereal time, and Julian/Besselian epoch conversions.

use crate::constants::{
    B1900, DAYS_PER_BESSELIAN_YEAR, DAYS_PER_CENTURY, DAYS_PER_JULIAN_YEAR, J1970, J2000,
    SECONDS_PER_DAY,
};
use crate::math::angles::Angle;

use core::ops::{Add, Sub};
use hifitime::Epoch;

/// Calendar system used for calendar-date conversion. The Gregorian
/// reform crossover (1582-10-15) is the caller's responsibility; the
/// conversion never switches systems on its own.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CalendarKind {
    #[default]
    Gregorian,
    Julian,
}

/// A broken-out calendar date in a particular calendar and zone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalendarDate {
    pub calendar: CalendarKind,
    pub zone: f64,
    pub year: i32,
    pub month: i16,
    pub day: f64,
    pub hour: i16,
    pub min: i16,
    pub sec: f64,
}

/// An instant in the civil (UTC-like) time scale: a Julian Date plus the
/// local zone in hours east of UTC and the calendar system used when
/// converting to calendar dates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Time {
    /// Julian Date in the civil (UTC) scale, including fractional day from noon UT
    pub jd: f64,
    /// Local time zone, hours east of UTC
    pub zone: f64,
    /// Calendar system for calendar-date conversion
    pub calendar: CalendarKind,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            jd: J2000,
            zone: 0.0,
            calendar: CalendarKind::Gregorian,
        }
    }
}

impl Time {
    pub fn new(jd: f64, zone: f64) -> Self {
        Self {
            jd,
            zone,
            calendar: CalendarKind::Gregorian,
        }
    }

    /// Current system time in UTC.
    pub fn from_system() -> Self {
        let now = Epoch::now().unwrap_or_else(|_| Epoch::from_jde_utc(J2000));
        Self::new(now.to_jde_utc_days(), 0.0)
    }

    pub fn from_unix_time(secs: f64) -> Self {
        Self::new(secs / SECONDS_PER_DAY + J1970, 0.0)
    }

    pub fn from_julian_year(year: f64) -> Self {
        Self::new(J2000 + DAYS_PER_JULIAN_YEAR * (year - 2000.0), 0.0)
    }

    pub fn from_besselian_year(year: f64) -> Self {
        Self::new(B1900 + DAYS_PER_BESSELIAN_YEAR * (year - 1900.0), 0.0)
    }

    /// Converts a calendar date, time-of-day, and zone to a Julian Date.
    /// Impossible dates (month 13, day 32) are not validated; the caller
    /// must provide valid input.
    #[allow(clippy::too_many_arguments)]
    pub fn from_calendar_date(
        calendar: CalendarKind,
        zone: f64,
        year: i32,
        month: i16,
        day: f64,
        hour: i16,
        min: i16,
        sec: f64,
    ) -> Self {
        let day =
            day + hour as f64 / 24.0 + min as f64 / 1440.0 + sec / 86400.0 - zone / 24.0;

        let (year, month) = if month < 3 {
            (year - 1, month + 12)
        } else {
            (year, month)
        };

        let b = if calendar == CalendarKind::Gregorian {
            let a = (year as f64 / 100.0).floor();
            2.0 - a + (a / 4.0).floor()
        } else {
            0.0
        };

        let jd = (365.25 * (year as f64 + 4716.0)).floor()
            + (30.6001 * (month as f64 + 1.0)).floor()
            + day
            + b
            - 1524.5;

        Self {
            jd,
            zone,
            calendar,
        }
    }

    /// Converts this instant to a calendar date in the given calendar and zone.
    pub fn to_calendar_date_in(&self, calendar: CalendarKind, zone: f64) -> CalendarDate {
        let j = self.jd + 0.5 + zone / 24.0;
        let z = j.floor();
        let f = j - z;
        let z = z as i64;

        let a = if calendar == CalendarKind::Gregorian {
            let alpha = ((z as f64 - 1_867_216.25) / 36524.25) as i64;
            z + 1 + alpha - alpha / 4
        } else {
            z
        };

        let b = a + 1524;
        let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
        let d = (365.25 * c as f64).floor() as i64;
        let e = ((b - d) as f64 / 30.6001) as i64;

        let day = (b - d) as f64 - (30.6001 * e as f64).floor() + f;
        let month = if e < 14 { e - 1 } else { e - 13 } as i16;
        let year = if month > 2 { c - 4716 } else { c - 4715 } as i32;

        let hour = (f * 24.0) as i16;
        let min = (f * 1440.0 - hour as f64 * 60.0) as i16;
        let sec = f * 86400.0 - hour as f64 * 3600.0 - min as f64 * 60.0;

        CalendarDate {
            calendar,
            zone,
            year,
            month,
            day,
            hour,
            min,
            sec,
        }
    }

    pub fn to_calendar_date(&self) -> CalendarDate {
        self.to_calendar_date_in(self.calendar, self.zone)
    }

    pub fn to_julian_year(&self) -> f64 {
        (self.jd - J2000) / DAYS_PER_JULIAN_YEAR + 2000.0
    }

    pub fn to_besselian_year(&self) -> f64 {
        (self.jd - B1900) / DAYS_PER_BESSELIAN_YEAR + 1900.0
    }

    /// Day of the week in the local zone: 0 = Sunday .. 6 = Saturday.
    pub fn weekday(&self) -> i32 {
        let d = (self.jd + self.zone / 24.0 + 0.5).floor() as i64 % 7;
        (if d < 0 { d + 7 } else { d }) as i32
    }

    /// Julian Date of the most recent local midnight at or before this time.
    pub fn local_midnight(&self) -> Self {
        let jd = (self.jd + self.zone / 24.0 - 0.5).floor() + 0.5 - self.zone / 24.0;
        Self {
            jd,
            zone: self.zone,
            calendar: self.calendar,
        }
    }

    /// Delta-T, the offset from Universal to Terrestrial Dynamical Time in
    /// seconds, from the Espenak–Meeus piecewise polynomials in Julian year
    /// (covering -500 through 2150), with the long-term quadratic asymptote
    /// outside that span.
    pub fn delta_t(&self) -> f64 {
        let y = self.to_julian_year() - 0.5 / 12.0;

        if y < -500.0 {
            let u = (y - 1820.0) / 100.0;
            -20.0 + 32.0 * u * u
        } else if y < 500.0 {
            let u = y / 100.0;
            polynomial(
                u,
                &[
                    10538.6,
                    -1014.41,
                    33.78311,
                    -5.952053,
                    -0.1798452,
                    0.022174192,
                    0.0090316521,
                ],
            )
        } else if y < 1600.0 {
            let u = (y - 1000.0) / 100.0;
            polynomial(
                u,
                &[
                    1574.2,
                    -556.01,
                    71.23472,
                    0.319781,
                    -0.8503463,
                    -0.005050998,
                    0.0083572073,
                ],
            )
        } else if y < 1700.0 {
            let t = y - 1600.0;
            polynomial(t, &[120.0, -0.9808, -0.01532, 1.0 / 7129.0])
        } else if y < 1800.0 {
            let t = y - 1700.0;
            polynomial(
                t,
                &[8.83, 0.1603, -0.0059285, 0.00013336, -1.0 / 1_174_000.0],
            )
        } else if y < 1860.0 {
            let t = y - 1800.0;
            polynomial(
                t,
                &[
                    13.72,
                    -0.332447,
                    0.0068612,
                    0.0041116,
                    -0.00037436,
                    0.0000121272,
                    -0.0000001699,
                    0.000000000875,
                ],
            )
        } else if y < 1900.0 {
            let t = y - 1860.0;
            polynomial(
                t,
                &[7.62, 0.5737, -0.251754, 0.01680668, -0.0004473624, 1.0 / 233_174.0],
            )
        } else if y < 1920.0 {
            let t = y - 1900.0;
            polynomial(t, &[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197])
        } else if y < 1940.0 {
            let t = y - 1920.0;
            polynomial(t, &[21.20, 0.84493, -0.076100, 0.0020936])
        } else if y < 1960.0 {
            let t = y - 1950.0;
            polynomial(t, &[29.07, 0.407, -1.0 / 233.0, 1.0 / 2547.0])
        } else if y < 1985.0 {
            let t = y - 1975.0;
            polynomial(t, &[45.45, 1.067, -1.0 / 260.0, -1.0 / 718.0])
        } else if y < 2005.0 {
            let t = y - 2000.0;
            polynomial(
                t,
                &[63.86, 0.3345, -0.060374, 0.0017275, 0.000651814, 0.00002373599],
            )
        } else if y < 2050.0 {
            // Refit against published Delta-T from 2000-2015 while keeping
            // the projected 93-second value at 2050.
            let t = y - 2000.0;
            polynomial(t, &[63.83, 0.1102, 0.009464])
        } else if y < 2150.0 {
            let u = (y - 1820.0) / 100.0;
            -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
        } else {
            let u = (y - 1820.0) / 100.0;
            -20.0 + 32.0 * u * u
        }
    }

    /// Julian Ephemeris Date: this civil JD with Delta-T added.
    pub fn jed(&self) -> f64 {
        self.jd + self.delta_t() / SECONDS_PER_DAY
    }

    /// Greenwich *mean* sidereal time at this instant, in radians from 0
    /// to 2π, from the IAU 1982 expression with JD0 the prior UT midnight.
    pub fn greenwich_mean_sidereal_time(&self) -> Angle {
        let jd0 = (self.jd - 0.5).floor() + 0.5;
        let t = (jd0 - J2000) / DAYS_PER_CENTURY;
        let t2 = t * t;
        let t3 = t2 * t;
        let gmst = 280.460_618_37 + 360.985_647_366_29 * (self.jd - J2000) + 0.000_387_933 * t2
            - t3 / 38_710_000.0;
        Angle::from_degrees(gmst).mod_2pi()
    }

    /// Local *mean* sidereal time for an observer at `lon` radians east.
    /// The equation of the equinoxes is applied by `Coordinates`, which
    /// owns the nutation constants.
    pub fn sidereal_time(&self, lon: f64) -> Angle {
        (self.greenwich_mean_sidereal_time() + Angle::new(lon)).mod_2pi()
    }
}

impl Add<f64> for Time {
    type Output = Time;
    fn add(self, days: f64) -> Time {
        Time {
            jd: self.jd + days,
            ..self
        }
    }
}

impl Sub<f64> for Time {
    type Output = Time;
    fn sub(self, days: f64) -> Time {
        Time {
            jd: self.jd - days,
            ..self
        }
    }
}

impl Sub for Time {
    type Output = f64;
    fn sub(self, other: Time) -> f64 {
        self.jd - other.jd
    }
}

fn polynomial(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    // 2000-01-01 12:00 UT is JD 2451545.0
    #[case(CalendarKind::Gregorian, 2000, 1, 1.0, 12, 0, 0.0, 2_451_545.0)]
    // 1957-10-04 19:26:24 UT (Sputnik launch), Meeus example 7.a
    #[case(CalendarKind::Gregorian, 1957, 10, 4.0, 19, 26, 24.0, 2_436_116.31)]
    // 333-01-27 12:00, Julian calendar, Meeus example 7.b
    #[case(CalendarKind::Julian, 333, 1, 27.0, 12, 0, 0.0, 1_842_713.0)]
    fn calendar_to_jd(
        #[case] calendar: CalendarKind,
        #[case] year: i32,
        #[case] month: i16,
        #[case] day: f64,
        #[case] hour: i16,
        #[case] min: i16,
        #[case] sec: f64,
        #[case] jd: f64,
    ) {
        let t = Time::from_calendar_date(calendar, 0.0, year, month, day, hour, min, sec);
        assert_abs_diff_eq!(t.jd, jd, epsilon = 1e-6);
    }

    #[rstest]
    #[case(2_451_545.0)]
    #[case(2_436_116.31)]
    #[case(2_458_849.5)]
    #[case(2_400_000.5)]
    fn calendar_round_trip_within_millisecond(#[case] jd: f64) {
        let t = Time::new(jd, 0.0);
        let date = t.to_calendar_date();
        let back = Time::from_calendar_date(
            date.calendar,
            date.zone,
            date.year,
            date.month,
            date.day.floor(),
            date.hour,
            date.min,
            date.sec,
        );
        assert_abs_diff_eq!(back.jd, jd, epsilon = 1.0e-3 / SECONDS_PER_DAY);
    }

    #[test]
    fn delta_t_modern_values() {
        // Published Delta-T: ~63.8s in 2000, ~69s in 2018.
        let dt2000 = Time::from_julian_year(2000.0).delta_t();
        assert!((63.0..65.0).contains(&dt2000), "deltaT(2000) = {dt2000}");
        let dt2018 = Time::from_julian_year(2018.0).delta_t();
        assert!((68.0..71.0).contains(&dt2018), "deltaT(2018) = {dt2018}");
    }

    #[test]
    fn delta_t_is_continuous_at_segment_edges() {
        for &y in &[
            -500.0, 500.0, 1600.0, 1700.0, 1800.0, 1860.0, 1900.0, 1920.0, 1940.0, 1960.0,
            1985.0, 2005.0, 2050.0, 2150.0,
        ] {
            let lo = Time::from_julian_year(y - 0.01).delta_t();
            let hi = Time::from_julian_year(y + 0.01).delta_t();
            assert!(
                (lo - hi).abs() < 2.0,
                "deltaT jump of {} s at year {y}",
                (lo - hi).abs()
            );
        }
    }

    #[test]
    fn gmst_at_j2000() {
        // GMST at 2000-01-01 12:00 UT is about 18h 41m 50s.
        let t = Time::new(J2000, 0.0);
        let gmst = t.greenwich_mean_sidereal_time().to_hours();
        assert_abs_diff_eq!(gmst, 18.697_374, epsilon = 1e-3);
    }

    #[test]
    fn weekday_of_j2000_is_saturday() {
        assert_eq!(Time::new(J2000, 0.0).weekday(), 6);
    }

    #[test]
    fn local_midnight_is_before_time() {
        let t = Time::new(2_458_849.73, -8.0);
        let mid = t.local_midnight();
        assert!(mid.jd <= t.jd);
        assert!(t.jd - mid.jd < 1.0);
        // Midnight local corresponds to a fractional JD offset by the zone.
        let x = mid.jd + mid.zone / 24.0 + 0.5;
        assert_abs_diff_eq!(x, x.round(), epsilon = 1e-6);
    }

    #[test]
    fn julian_besselian_epochs() {
        assert_abs_diff_eq!(Time::from_julian_year(2000.0).jd, J2000, epsilon = 1e-9);
        assert_abs_diff_eq!(
            Time::from_julian_year(2010.5).to_julian_year(),
            2010.5,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(Time::from_besselian_year(1900.0).jd, B1900, epsilon = 1e-9);
    }
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Data and apparent-place computation for objects outside the solar
//! system: stars, double and variable stars, and deep-sky objects.

use crate::constants::{AU_PER_PARSEC, DAYS_PER_JULIAN_YEAR, J2000, LY_PER_PARSEC};
use crate::coords::Coordinates;
use crate::math::angles::{ARCSEC_PER_RAD, HALF_PI};
use crate::math::rotation::{r2, r3};
use crate::math::spherical::Spherical;
use crate::math::{Matrix3, Vector3};
use crate::orbit::Orbit;

/// Heliocentric J2000 state and photometry common to every stellar and
/// deep-sky record. Unknown numeric quantities are infinite (parallax
/// uses zero, matching catalog convention).
#[derive(Clone, Debug, PartialEq)]
pub struct StarData {
    /// Heliocentric position unit vector, fundamental frame, epoch J2000
    pub position: Vector3,
    /// Heliocentric space velocity in distance-units per Julian year;
    /// infinite if unknown
    pub velocity: Vector3,
    /// Heliocentric parallax in arcseconds; zero if unknown
    pub parallax: f64,
    /// Radial velocity as a fraction of light speed; infinite if unknown
    pub radvel: f64,
    /// Visual magnitude at J2000
    pub vmag: f64,
    /// Blue magnitude at J2000
    pub bmag: f64,
    /// Spectral type, or galaxy morphological type for galaxies
    pub spectral_type: String,

    pub double: Option<DoubleData>,
    pub variable: Option<VariableData>,
    pub deep_sky: Option<DeepSkyData>,
}

impl Default for StarData {
    fn default() -> Self {
        Self {
            position: Vector3::x(),
            velocity: Vector3::repeat(f64::INFINITY),
            parallax: 0.0,
            radvel: f64::INFINITY,
            vmag: f64::INFINITY,
            bmag: f64::INFINITY,
            spectral_type: String::new(),
            double: None,
            variable: None,
            deep_sky: None,
        }
    }
}

/// Double-star companion data. The binary orbit, when present, is
/// referenced to the fundamental equatorial frame; `primary` is an
/// index into the owning object array, or None until the containing
/// region is fully loaded and back-references are resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleData {
    pub components: String,
    pub mag_delta: f64,
    /// Angular separation [rad]; infinite if unknown
    pub separation: f64,
    /// Position angle [rad] in the fundamental frame; infinite if unknown
    pub position_angle: f64,
    /// Julian year of the position angle measurement
    pub pa_year: f64,
    pub orbit: Option<Orbit>,
    pub primary: Option<usize>,
}

impl Default for DoubleData {
    fn default() -> Self {
        Self {
            components: String::new(),
            mag_delta: f64::INFINITY,
            separation: f64::INFINITY,
            position_angle: f64::INFINITY,
            pa_year: f64::INFINITY,
            orbit: None,
            primary: None,
        }
    }
}

/// Variable-star data.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableData {
    pub var_type: String,
    /// Magnitude at maximum light (brightest)
    pub max_mag: f64,
    /// Magnitude at minimum light (faintest)
    pub min_mag: f64,
    /// Period in days
    pub period: f64,
    /// Epoch of maximum light as a Julian Date
    pub epoch: f64,
}

impl Default for VariableData {
    fn default() -> Self {
        Self {
            var_type: String::new(),
            max_mag: f64::INFINITY,
            min_mag: f64::INFINITY,
            period: f64::INFINITY,
            epoch: f64::INFINITY,
        }
    }
}

/// Deep-sky object dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct DeepSkyData {
    /// Apparent major axis [rad]
    pub major_axis: f64,
    /// Apparent minor axis [rad]
    pub minor_axis: f64,
    /// Position angle of the major axis from north [rad]
    pub position_angle: f64,
}

impl Default for DeepSkyData {
    fn default() -> Self {
        Self {
            major_axis: f64::INFINITY,
            minor_axis: f64::INFINITY,
            position_angle: f64::INFINITY,
        }
    }
}

impl StarData {
    /// Sets the J2000 mean equatorial coordinates and proper motion.
    /// `coords.rad` is the distance in light years, `motion.lon`/`lat`
    /// the proper motion in radians per year, `motion.rad` the radial
    /// velocity in light years per year. Any may be infinite.
    pub fn set_fundamental_motion(&mut self, coords: Spherical, motion: Spherical) {
        self.parallax = if coords.rad.is_finite() {
            LY_PER_PARSEC / coords.rad
        } else {
            0.0
        };
        self.radvel = motion.rad;

        let mut radial_rate = motion.rad;
        if !coords.rad.is_finite() || !motion.rad.is_finite() {
            radial_rate = 0.0;
        } else {
            radial_rate /= coords.rad;
        }

        let unit = Spherical::new(coords.lon, coords.lat, 1.0);
        self.position = unit.to_vector();

        if motion.lon.is_finite() && motion.lat.is_finite() {
            // d/dt of the unit position for the given angular rates plus
            // the normalized radial rate.
            let (sin_lon, cos_lon) = coords.lon.sin_cos();
            let (sin_lat, cos_lat) = coords.lat.sin_cos();
            let d_lon = Vector3::new(-cos_lat * sin_lon, cos_lat * cos_lon, 0.0);
            let d_lat = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
            self.velocity =
                d_lon * motion.lon + d_lat * motion.lat + self.position * radial_rate;
        } else {
            self.velocity = Vector3::repeat(f64::INFINITY);
        }
    }

    /// Heliocentric spherical coordinates in the fundamental frame; the
    /// radial part is the distance in light years, infinite if unknown.
    pub fn fundamental_coords(&self) -> Spherical {
        let mut coords = Spherical::from_vector(&self.position);
        coords.rad = if self.parallax > 0.0 {
            LY_PER_PARSEC / self.parallax
        } else {
            f64::INFINITY
        };
        coords
    }

    /// Proper motion in radians per year and radial velocity in light
    /// years per year, in the fundamental frame.
    pub fn fundamental_motion(&self) -> Spherical {
        if !self.velocity.x.is_finite() {
            return Spherical::new(f64::INFINITY, f64::INFINITY, self.radvel);
        }
        let mut motion = Spherical::velocity_from_vectors(&self.position, &self.velocity);
        motion.rad = self.radvel;
        motion
    }

    /// Computes the apparent direction, distance [AU], and magnitude for
    /// the observer in `coords`, applying space motion, heliocentric
    /// parallax, and aberration per the coordinate flags.
    pub fn apparent_place(&self, coords: &Coordinates) -> (Vector3, f64, f64) {
        let mut direction = self.position;

        if coords.star_motion() && self.velocity.x.is_finite() {
            direction += self.velocity * ((coords.jed() - J2000) / DAYS_PER_JULIAN_YEAR);
        }
        if coords.star_parallax() && self.parallax > 0.0 {
            direction -= coords.observer_position() * (self.parallax / AU_PER_PARSEC);
        }

        let base_mag = if self.vmag.is_finite() { self.vmag } else { self.bmag };

        let (distance, magnitude) = if direction == self.position {
            // Both corrections were skipped; J2000 values carry over.
            let distance = if self.parallax > 0.0 {
                AU_PER_PARSEC / self.parallax
            } else {
                f64::INFINITY
            };
            (distance, base_mag)
        } else {
            // Delta is the ratio of the current to the J2000 distance;
            // it rescales the apparent magnitude.
            let delta = direction.norm();
            direction /= delta;
            let distance = if self.parallax > 0.0 {
                delta * AU_PER_PARSEC / self.parallax
            } else {
                f64::INFINITY
            };
            (distance, base_mag + 5.0 * delta.log10())
        };

        let direction = if coords.aberration() {
            coords.apply_aberration(direction.normalize())
        } else {
            direction.normalize()
        };

        (direction, distance, magnitude)
    }
}

impl StarData {
    /// Apparent angular motion of this star in the given output frame,
    /// for an already computed apparent `direction` and `distance`.
    /// For inertial frames the result is the proper motion in radians
    /// per year (plus the current radial velocity); the horizon frame is
    /// rotating, so there the angular rates are diurnal, in radians per
    /// day.
    pub fn apparent_motion(
        &self,
        coords: &Coordinates,
        frame: crate::coords::Frame,
        direction: &Vector3,
        distance: f64,
    ) -> Spherical {
        use crate::coords::Frame;

        if frame == Frame::Horizon {
            let pos = coords.transform(Frame::Fundamental, Frame::Horizon, *direction);
            // The star is fixed in the fundamental frame; its horizon
            // motion is the frame's rotation, omega x r with omega along
            // the celestial pole.
            let omega = Vector3::new(
                0.0,
                0.0,
                crate::math::angles::TWO_PI * crate::constants::SIDEREAL_PER_SOLAR_DAYS,
            );
            let vel = coords
                .transform(Frame::Equatorial, Frame::Horizon, omega)
                .cross(&pos);
            let mut motion = Spherical::velocity_from_vectors(&pos, &vel);
            motion.rad = self.radvel;
            return motion;
        }

        if !self.velocity.x.is_finite() {
            return Spherical::new(f64::INFINITY, f64::INFINITY, self.radvel);
        }

        let (pos, vel) = if distance.is_finite() && self.parallax > 0.0 {
            (
                *direction * distance,
                self.velocity * (AU_PER_PARSEC / self.parallax),
            )
        } else {
            (self.position, self.velocity)
        };

        let pos = coords.transform(Frame::Fundamental, frame, pos);
        let vel = coords.transform(Frame::Fundamental, frame, vel);
        let mut motion = Spherical::velocity_from_vectors(&pos, &vel);
        motion.rad = if self.radvel.is_finite() && self.parallax > 0.0 {
            motion.rad / crate::constants::AU_PER_LY
        } else {
            self.radvel
        };
        motion
    }
}

/// Moffat stellar image profile: intensity at squared radius `r2` for a
/// profile with central intensity `max` and exponent `beta`.
pub fn moffat_function(max: f64, r2: f64, beta: f64) -> f64 {
    max / (1.0 + r2).powf(beta)
}

/// Radius at which a Moffat profile with central intensity `max` and
/// exponent `beta` falls to intensity `z`.
pub fn moffat_radius(z: f64, max: f64, beta: f64) -> f64 {
    ((max / z).powf(1.0 / beta) - 1.0).max(0.0).sqrt()
}

/// Effective temperature in kelvin from a B-V color index
/// (Ballesteros' approximation, valid for main-sequence stars).
pub fn bmv_to_temperature(bmv: f64) -> f64 {
    4600.0 * (1.0 / (0.92 * bmv + 1.7) + 1.0 / (0.92 * bmv + 0.62))
}

/// Rotation carrying vectors referenced to the sky plane at (ra, dec)
/// into the fundamental frame; the plane's Z axis points along the line
/// of sight.
pub fn sky_plane_to_fundamental(ra: f64, dec: f64) -> Matrix3 {
    r3(-ra) * r2(dec - HALF_PI)
}

impl DoubleData {
    /// Stores a binary orbit given with sky-plane-referenced elements,
    /// rotating it into the fundamental frame.
    pub fn set_orbit_from_sky_plane(&mut self, orbit: Orbit, ra: f64, dec: f64) {
        self.orbit = Some(orbit.transformed(&sky_plane_to_fundamental(ra, dec)));
    }

    /// Returns the binary orbit re-referenced to the sky plane at
    /// (ra, dec), for serialization.
    pub fn orbit_in_sky_plane(&self, ra: f64, dec: f64) -> Option<Orbit> {
        self.orbit
            .as_ref()
            .map(|o| o.transformed(&sky_plane_to_fundamental(ra, dec).transpose()))
    }

    /// Apparent offset of the companion from its primary at the given
    /// epoch: the orbital position in arcseconds projected on the sky,
    /// converted to a tangent-plane displacement in radians.
    pub fn companion_offset(&self, jed: f64) -> Option<Vector3> {
        let orbit = self.orbit.as_ref()?;
        let (pos, _) = orbit.position_velocity(jed).ok()?;
        Some(pos / ARCSEC_PER_RAD)
    }
}

/// Converts an absolute magnitude and distance in parsecs to an
/// apparent magnitude.
pub fn apparent_magnitude(abs_mag: f64, dist_pc: f64) -> f64 {
    abs_mag + 5.0 * dist_pc.log10() - 5.0
}

/// Converts an apparent magnitude and distance in parsecs to an
/// absolute magnitude.
pub fn absolute_magnitude(app_mag: f64, dist_pc: f64) -> f64 {
    app_mag - 5.0 * dist_pc.log10() + 5.0
}

/// Brightness ratio corresponding to a magnitude difference.
pub fn brightness_ratio(mag_diff: f64) -> f64 {
    10.0_f64.powf(mag_diff / 2.5)
}

/// Magnitude difference corresponding to a brightness ratio.
pub fn magnitude_difference(ratio: f64) -> f64 {
    2.5 * ratio.log10()
}

/// Combined magnitude of two superimposed sources.
pub fn magnitude_sum(mag1: f64, mag2: f64) -> f64 {
    -magnitude_difference(brightness_ratio(-mag1) + brightness_ratio(-mag2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angles::{Angle, RAD_PER_ARCSEC};
    use crate::time::Time;
    use approx::assert_abs_diff_eq;

    fn geocentric_coords(jd: f64) -> Coordinates {
        Coordinates::new(Time::new(jd, 0.0), Spherical::new(0.0, 0.0, 0.0))
    }

    fn sirius() -> StarData {
        let mut star = StarData::default();
        let coords = Spherical::new(
            Angle::from_hours(6.0 + 45.0 / 60.0 + 8.9 / 3600.0).rad(),
            Angle::from_degrees(-(16.0 + 42.0 / 60.0 + 58.0 / 3600.0)).rad(),
            8.6,
        );
        let motion = Spherical::new(
            -0.546 * RAD_PER_ARCSEC,
            -1.223 * RAD_PER_ARCSEC,
            -5.5 / 299_792.458,
        );
        star.set_fundamental_motion(coords, motion);
        star.vmag = -1.46;
        star
    }

    #[test]
    fn motion_round_trip() {
        let star = sirius();
        let coords = star.fundamental_coords();
        assert_abs_diff_eq!(coords.rad, 8.6, epsilon = 1e-9);
        let motion = star.fundamental_motion();
        assert_abs_diff_eq!(motion.lon / RAD_PER_ARCSEC, -0.546, epsilon = 1e-6);
        assert_abs_diff_eq!(motion.lat / RAD_PER_ARCSEC, -1.223, epsilon = 1e-6);
    }

    #[test]
    fn parallax_from_distance() {
        let star = sirius();
        // 8.6 ly = 2.64 pc, parallax ~0.379 arcsec.
        assert_abs_diff_eq!(star.parallax, LY_PER_PARSEC / 8.6, epsilon = 1e-12);
        assert!((0.37..0.39).contains(&star.parallax));
    }

    #[test]
    fn apparent_place_without_flags_is_j2000() {
        let mut coords = geocentric_coords(J2000 + 5000.0);
        coords.set_star_motion(false);
        coords.set_star_parallax(false);
        coords.set_aberration(false);
        let star = sirius();
        let (dir, dist, mag) = star.apparent_place(&coords);
        assert_abs_diff_eq!(dir, star.position, epsilon = 1e-12);
        assert_abs_diff_eq!(mag, -1.46, epsilon = 1e-12);
        assert_abs_diff_eq!(dist, AU_PER_PARSEC / star.parallax, epsilon = 1e-3);
    }

    #[test]
    fn proper_motion_moves_the_star() {
        let mut coords = geocentric_coords(J2000 + 100.0 * DAYS_PER_JULIAN_YEAR);
        coords.set_star_parallax(false);
        coords.set_aberration(false);
        let star = sirius();
        let (dir, _, _) = star.apparent_place(&coords);
        let sep = crate::math::angular_separation(&dir, &star.position);
        // ~1.34"/yr total proper motion over a century.
        assert_abs_diff_eq!(sep / RAD_PER_ARCSEC, 134.0, epsilon = 2.0);
    }

    #[test]
    fn parallax_shifts_by_less_than_the_parallax_angle() {
        let mut coords = geocentric_coords(J2000 + 50.0);
        coords.set_star_motion(false);
        coords.set_aberration(false);
        let star = sirius();
        let (dir, _, _) = star.apparent_place(&coords);
        let sep = crate::math::angular_separation(&dir, &star.position);
        assert!(sep <= star.parallax * RAD_PER_ARCSEC * 1.05);
    }

    #[test]
    fn sky_plane_points_along_line_of_sight() {
        let ra = 1.2;
        let dec = -0.4;
        let m = sky_plane_to_fundamental(ra, dec);
        let los = m * Vector3::z();
        let star_dir = Spherical::new(ra, dec, 1.0).to_vector();
        assert_abs_diff_eq!(los, star_dir, epsilon = 1e-12);
    }

    #[test]
    fn binary_orbit_round_trips_through_sky_plane() {
        let mut double = DoubleData::default();
        let orbit = Orbit::new(J2000, 7.5, 0.59, 0.77, 2.6, 0.8, 0.0, 2.0 * std::f64::consts::PI / (50.1 * 365.25));
        double.set_orbit_from_sky_plane(orbit, 1.77, -0.29);
        let back = double.orbit_in_sky_plane(1.77, -0.29).unwrap();
        assert_abs_diff_eq!(back.i, orbit.i, epsilon = 1e-10);
        assert_abs_diff_eq!(back.w, Angle::new(orbit.w).mod_2pi().rad(), epsilon = 1e-10);
        assert_abs_diff_eq!(back.n, Angle::new(orbit.n).mod_2pi().rad(), epsilon = 1e-10);
    }

    #[test]
    fn apparent_motion_recovers_proper_motion() {
        let mut coords = geocentric_coords(J2000);
        coords.set_aberration(false);
        coords.set_star_parallax(false);
        coords.set_star_motion(false);
        let star = sirius();
        let (dir, dist, _) = star.apparent_place(&coords);
        let motion = star.apparent_motion(&coords, crate::coords::Frame::Fundamental, &dir, dist);
        // In the fundamental frame the apparent motion is the catalog
        // proper motion.
        assert_abs_diff_eq!(motion.lon / RAD_PER_ARCSEC, -0.546, epsilon = 1e-3);
        assert_abs_diff_eq!(motion.lat / RAD_PER_ARCSEC, -1.223, epsilon = 1e-3);
    }

    #[test]
    fn horizon_motion_is_diurnal() {
        let coords = Coordinates::new(
            Time::new(2_458_954.5, 0.0),
            Spherical::new(0.0, 0.65, 0.0),
        );
        let star = sirius();
        let (dir, dist, _) = star.apparent_place(&coords);
        let motion = star.apparent_motion(&coords, crate::coords::Frame::Horizon, &dir, dist);
        // An equatorial-belt star sweeps ~2 pi radians of azimuth a day.
        assert!(motion.lon.abs() > 1.0, "azimuth rate {} rad/day", motion.lon);
        assert!(motion.lon.abs() < 20.0);
    }

    #[test]
    fn moffat_profile() {
        assert_abs_diff_eq!(moffat_function(10.0, 0.0, 4.0), 10.0, epsilon = 1e-12);
        let z = moffat_function(10.0, 2.25, 4.0);
        assert_abs_diff_eq!(moffat_radius(z, 10.0, 4.0), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn color_temperature_of_the_sun() {
        // Solar B-V is 0.656; effective temperature ~5780 K.
        assert_abs_diff_eq!(bmv_to_temperature(0.656), 5780.0, epsilon = 150.0);
    }

    #[test]
    fn magnitude_utilities() {
        assert_abs_diff_eq!(brightness_ratio(5.0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(magnitude_difference(100.0), 5.0, epsilon = 1e-12);
        // Two equal sources are 0.753 magnitudes brighter than one.
        assert_abs_diff_eq!(magnitude_sum(5.0, 5.0), 5.0 - 0.7526, epsilon = 1e-3);
        assert_abs_diff_eq!(apparent_magnitude(absolute_magnitude(3.2, 41.0), 41.0), 3.2, epsilon = 1e-12);
    }
}

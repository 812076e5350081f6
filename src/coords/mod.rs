/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Reference-frame transformations for a particular observer time and
//! geographic location: precession, nutation, aberration, refraction,
//! and the cached matrix set that carries the fundamental (ICRS) frame
//! to the equatorial, ecliptic, galactic, and horizon frames of date.

pub mod nutation;
pub mod precession;
pub mod refraction;

pub use refraction::{apply_refraction, remove_refraction};

use crate::constants::{
    EARTH_FLATTENING, KM_PER_AU, KM_PER_EARTH_RADII, LIGHT_AU_PER_DAY, SIDEREAL_PER_SOLAR_DAYS,
};
use crate::ephemerides::jplde::{DeBody, JplDeEphemeris};
use crate::math::angles::{Angle, TWO_PI};
use crate::math::rotation::r1;
use crate::math::spherical::Spherical;
use crate::math::{Matrix3, Vector3};
use crate::orbit::{ecliptic_to_fundamental, planet_mean_orbit};
use crate::time::Time;

use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// The principal astronomical reference frames.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    /// ICRS: mean equatorial frame at J2000; +X toward the vernal equinox,
    /// +Z toward the north celestial pole. Spherical coords are RA/Dec.
    Fundamental,
    /// True equatorial frame of date (precession and nutation applied).
    Equatorial,
    /// True ecliptic frame of date; the X/Y plane is Earth's orbital plane.
    Ecliptic,
    /// Galactic frame, fixed relative to the ICRS; +X toward the galactic
    /// center, +Z toward the north galactic pole.
    Galactic,
    /// Local horizon frame; spherical coords are azimuth (from north
    /// through east) and altitude.
    Horizon,
}

/// Fundamental (ICRS) to galactic rotation, J2000 values.
#[rustfmt::skip]
const GALACTIC_MATRIX: Matrix3 = Matrix3::new(
    -0.054_875_560_4, -0.873_437_090_2, -0.483_835_015_5,
     0.494_109_427_9, -0.444_829_630_0,  0.746_982_244_5,
    -0.867_666_149_0, -0.198_076_373_4,  0.455_983_776_2,
);

/// Observer time, location, and the derived transformation state used
/// by all ephemeris computation. Mutable and not shareable across
/// threads; each thread wanting coordinates builds its own.
pub struct Coordinates {
    time: Time,
    location: Spherical,

    jed: f64,
    lst: f64,
    obliquity: f64,
    nut_lon: f64,
    nut_obq: f64,

    pre_mat: Matrix3,
    nut_mat: Matrix3,
    equ_mat: Matrix3,
    ecl_mat: Matrix3,
    hor_mat: Matrix3,
    gal_mat: Matrix3,

    obs_pos: Vector3,
    obs_vel: Vector3,

    star_parallax: bool,
    star_motion: bool,
    aberration: bool,
    light_time: bool,

    de: Option<Rc<RefCell<JplDeEphemeris>>>,
}

impl Coordinates {
    /// Creates coordinates for an observer at `location` (longitude and
    /// latitude in radians, east and north positive; altitude above the
    /// geoid in kilometers as the radial part).
    pub fn new(time: Time, location: Spherical) -> Self {
        let mut coords = Self {
            time,
            location,
            jed: 0.0,
            lst: 0.0,
            obliquity: 0.0,
            nut_lon: 0.0,
            nut_obq: 0.0,
            pre_mat: Matrix3::identity(),
            nut_mat: Matrix3::identity(),
            equ_mat: Matrix3::identity(),
            ecl_mat: Matrix3::identity(),
            hor_mat: Matrix3::identity(),
            gal_mat: GALACTIC_MATRIX,
            obs_pos: Vector3::zeros(),
            obs_vel: Vector3::zeros(),
            star_parallax: true,
            star_motion: true,
            aberration: true,
            light_time: true,
            de: None,
        };
        coords.update();
        coords
    }

    pub fn set_time(&mut self, time: Time) {
        self.time = time;
        self.update();
    }

    pub fn set_location(&mut self, location: Spherical) {
        self.location = location;
        self.update();
    }

    /// Attaches an open JPL DE ephemeris used for the observer's
    /// heliocentric state and by solar-system objects computed against
    /// these coordinates.
    pub fn set_ephemeris(&mut self, de: Option<Rc<RefCell<JplDeEphemeris>>>) {
        self.de = de;
        self.update();
    }

    pub fn ephemeris(&self) -> Option<Rc<RefCell<JplDeEphemeris>>> {
        self.de.clone()
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn location(&self) -> Spherical {
        self.location
    }

    pub fn jed(&self) -> f64 {
        self.jed
    }

    /// Local apparent sidereal time in radians.
    pub fn lst(&self) -> f64 {
        self.lst
    }

    pub fn observer_position(&self) -> Vector3 {
        self.obs_pos
    }

    pub fn observer_velocity(&self) -> Vector3 {
        self.obs_vel
    }

    pub fn set_observer_position(&mut self, pos: Vector3) {
        self.obs_pos = pos;
    }

    pub fn set_observer_velocity(&mut self, vel: Vector3) {
        self.obs_vel = vel;
    }

    pub fn star_parallax(&self) -> bool {
        self.star_parallax
    }

    pub fn star_motion(&self) -> bool {
        self.star_motion
    }

    pub fn aberration(&self) -> bool {
        self.aberration
    }

    pub fn light_time(&self) -> bool {
        self.light_time
    }

    pub fn set_star_parallax(&mut self, on: bool) {
        self.star_parallax = on;
    }

    pub fn set_star_motion(&mut self, on: bool) {
        self.star_motion = on;
    }

    pub fn set_aberration(&mut self, on: bool) {
        self.aberration = on;
    }

    pub fn set_light_time(&mut self, on: bool) {
        self.light_time = on;
    }

    /// Recomputes every derived quantity after a time or location change.
    fn update(&mut self) {
        self.jed = self.time.jed();
        self.obliquity = precession::obliquity(self.jed);
        let (nut_lon, nut_obq) = nutation::nutation_constants(self.jed);
        self.nut_lon = nut_lon;
        self.nut_obq = nut_obq;

        // Local apparent sidereal time: mean sidereal time plus the
        // equation of the equinoxes.
        self.lst = (self.time.sidereal_time(self.location.lon)
            + Angle::new(nut_lon * (self.obliquity + nut_obq).cos()))
        .mod_2pi()
        .rad();

        self.pre_mat = precession::precession_matrix(self.jed);
        self.nut_mat = nutation::nutation_matrix(self.obliquity, nut_lon, nut_obq);
        self.equ_mat = self.nut_mat * self.pre_mat;
        self.ecl_mat = r1(self.obliquity + nut_obq) * self.equ_mat;
        self.hor_mat = self.horizon_matrix() * self.equ_mat;
        self.gal_mat = GALACTIC_MATRIX;

        let (earth_pos, earth_vel) = self.earth_state();

        // Geocentric observer offset, rotated from the true equatorial
        // frame of date back to the fundamental frame.
        let geodetic = Spherical::new(self.lst, self.location.lat, self.location.rad);
        let geo_km = geodetic_to_geocentric(geodetic, KM_PER_EARTH_RADII, EARTH_FLATTENING);
        let geo_au = geo_km / KM_PER_AU;
        let omega = TWO_PI * SIDEREAL_PER_SOLAR_DAYS; // rad/day
        let vel_au = Vector3::new(-omega * geo_au.y, omega * geo_au.x, 0.0);

        self.obs_pos = earth_pos + self.equ_mat.transpose() * geo_au;
        self.obs_vel = earth_vel + self.equ_mat.transpose() * vel_au;
    }

    /// Earth's heliocentric state in the fundamental frame, from the
    /// attached DE ephemeris when possible, otherwise from mean elements.
    fn earth_state(&self) -> (Vector3, Vector3) {
        if let Some(de) = &self.de {
            if let Ok(state) = de.borrow_mut().compute(DeBody::Earth, self.jed) {
                return state;
            }
            debug!(
                "DE ephemeris cannot supply Earth at JED {}, using mean elements",
                self.jed
            );
        }
        let rot = ecliptic_to_fundamental();
        planet_mean_orbit(3, self.jed)
            .and_then(|orbit| orbit.position_velocity(self.jed).ok())
            .map(|(p, v)| (rot * p, rot * v))
            .unwrap_or((Vector3::zeros(), Vector3::zeros()))
    }

    /// True-equatorial-of-date to horizon rotation. Rows are the north,
    /// east, and zenith directions; azimuth is measured from north
    /// through east, which makes this orthogonal with determinant -1
    /// rather than a proper rotation.
    fn horizon_matrix(&self) -> Matrix3 {
        let (sin_lat, cos_lat) = self.location.lat.sin_cos();
        let (sin_lst, cos_lst) = self.lst.sin_cos();
        Matrix3::new(
            -sin_lat * cos_lst,
            -sin_lat * sin_lst,
            cos_lat,
            -sin_lst,
            cos_lst,
            0.0,
            cos_lat * cos_lst,
            cos_lat * sin_lst,
            sin_lat,
        )
    }

    /// The stored matrix carrying the fundamental frame to `frame`.
    pub fn matrix(&self, frame: Frame) -> Matrix3 {
        match frame {
            Frame::Fundamental => Matrix3::identity(),
            Frame::Equatorial => self.equ_mat,
            Frame::Ecliptic => self.ecl_mat,
            Frame::Galactic => self.gal_mat,
            Frame::Horizon => self.hor_mat,
        }
    }

    /// Transforms a rectangular vector from one frame to another. Every
    /// stored matrix maps fundamental to target, so the general transform
    /// composes one transpose and one forward matrix.
    pub fn transform(&self, from: Frame, to: Frame, v: Vector3) -> Vector3 {
        self.matrix(to) * (self.matrix(from).transpose() * v)
    }

    /// Transforms spherical coordinates between frames, preserving the
    /// radial distance.
    pub fn transform_spherical(&self, from: Frame, to: Frame, s: Spherical) -> Spherical {
        let rad = s.rad;
        let v = Spherical::new(s.lon, s.lat, 1.0).to_vector();
        let mut out = Spherical::from_vector(&self.transform(from, to, v));
        out.rad = rad;
        out
    }

    /// Applies annual aberration to a unit direction vector in the
    /// fundamental frame, using the observer's heliocentric velocity.
    pub fn apply_aberration(&self, direction: Vector3) -> Vector3 {
        (direction + self.obs_vel / LIGHT_AU_PER_DAY).normalize()
    }

    /// Removes annual aberration; the inverse of `apply_aberration` to
    /// within first-order convergence of the fixed-point iteration.
    pub fn remove_aberration(&self, direction: Vector3) -> Vector3 {
        let p = self.obs_vel / LIGHT_AU_PER_DAY;
        let mut u = direction;
        for _ in 0..5 {
            u = ((direction * (u + p).norm()) - p).normalize();
        }
        u
    }

    /// Computes the apparent direction (unit vector in the fundamental
    /// frame) and distance in AU of an object at the given heliocentric
    /// J2000 position. Geocentric parallax is always applied; aberration
    /// follows the configuration flag. Light-time retardation is the
    /// responsibility of the solar-system propagators, which re-evaluate
    /// their position at the retarded epoch before calling this.
    pub fn apparent_direction(&self, position: Vector3) -> (Vector3, f64) {
        let mut dir = position - self.obs_pos;
        let distance = dir.norm();
        if distance > 0.0 {
            dir /= distance;
        }
        if self.aberration {
            dir = self.apply_aberration(dir);
        }
        (dir, distance)
    }
}

/// Converts a geodetic location (lon/lat radians, altitude km above the
/// ellipsoid) to a geocentric rectangular vector in kilometers, for an
/// ellipsoid with equatorial radius `re` km and flattening `f`.
pub fn geodetic_to_geocentric(geodetic: Spherical, re: f64, f: f64) -> Vector3 {
    let e2 = 2.0 * f - f * f;
    let (sin_lat, cos_lat) = geodetic.lat.sin_cos();
    let (sin_lon, cos_lon) = geodetic.lon.sin_cos();
    let alt = if geodetic.rad.is_finite() { geodetic.rad } else { 0.0 };
    let n = re / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        (n + alt) * cos_lat * cos_lon,
        (n + alt) * cos_lat * sin_lon,
        (n * (1.0 - e2) + alt) * sin_lat,
    )
}

/// Converts a geocentric rectangular vector in kilometers back to a
/// geodetic location; the inverse of `geodetic_to_geocentric`.
pub fn geocentric_to_geodetic(geocentric: Vector3, re: f64, f: f64) -> Spherical {
    let e2 = 2.0 * f - f * f;
    let rho = (geocentric.x * geocentric.x + geocentric.y * geocentric.y).sqrt();
    let lon = geocentric.y.atan2(geocentric.x);
    if rho == 0.0 {
        let lat = std::f64::consts::FRAC_PI_2.copysign(geocentric.z);
        let alt = geocentric.z.abs() - re * (1.0 - f);
        return Spherical::new(lon, lat, alt);
    }
    let mut lat = (geocentric.z / rho).atan();
    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = re / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        lat = ((geocentric.z + n * e2 * sin_lat) / rho).atan();
    }
    let sin_lat = lat.sin();
    let n = re / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let alt = rho / lat.cos() - n;
    Spherical::new(Angle::new(lon).mod_2pi().rad(), lat, alt)
}

/// Converts a redshift z to a radial velocity as a fraction of light
/// speed, using the relativistic Doppler relation.
pub fn redshift_to_radvel(z: f64) -> f64 {
    let z1 = (z + 1.0) * (z + 1.0);
    (z1 - 1.0) / (z1 + 1.0)
}

/// Converts a radial velocity (fraction of light speed) to a redshift.
pub fn radvel_to_redshift(rv: f64) -> f64 {
    ((1.0 + rv) / (1.0 - rv)).sqrt() - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::J2000;
    use crate::math::angles::ARCSEC_PER_RAD;
    use crate::time::Time;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn palo_alto(jd: f64) -> Coordinates {
        let time = Time::new(jd, -8.0);
        let location = Spherical::new(
            Angle::from_degrees(-122.1).rad(),
            Angle::from_degrees(37.3).rad(),
            0.0,
        );
        Coordinates::new(time, location)
    }

    #[rstest]
    #[case(Frame::Fundamental, Frame::Equatorial)]
    #[case(Frame::Fundamental, Frame::Ecliptic)]
    #[case(Frame::Fundamental, Frame::Galactic)]
    #[case(Frame::Fundamental, Frame::Horizon)]
    #[case(Frame::Equatorial, Frame::Ecliptic)]
    #[case(Frame::Ecliptic, Frame::Horizon)]
    #[case(Frame::Galactic, Frame::Horizon)]
    fn transform_round_trips(#[case] a: Frame, #[case] b: Frame) {
        let coords = palo_alto(2_458_954.5);
        let v = Vector3::new(0.48, -0.6, 0.64).normalize();
        let round = coords.transform(b, a, coords.transform(a, b, v));
        assert_abs_diff_eq!(round, v, epsilon = 1e-10);
    }

    #[test]
    fn equatorial_matrix_is_close_to_identity_near_j2000() {
        let coords = palo_alto(J2000);
        let m = coords.matrix(Frame::Equatorial);
        // Only nutation (tens of arcsec) separates the frames at J2000.
        let off = (m - Matrix3::identity()).norm();
        assert!(off < 1e-3, "off-identity {off}");
    }

    #[test]
    fn galactic_center_in_galactic_frame() {
        // The galactic center (Sgr A*) is near RA 17h45.7m, Dec -29 00'.
        let coords = palo_alto(J2000);
        let ra = Angle::from_hours(17.0 + 45.7 / 60.0).rad();
        let dec = Angle::from_degrees(-29.01).rad();
        let v = Spherical::new(ra, dec, 1.0).to_vector();
        let gal = Spherical::from_vector(&coords.transform(Frame::Fundamental, Frame::Galactic, v));
        assert!(
            gal.lat.abs().to_degrees() < 0.2,
            "galactic latitude {}",
            gal.lat.to_degrees()
        );
        assert!(gal.lon.to_degrees() < 0.5 || gal.lon.to_degrees() > 359.5);
    }

    #[test]
    fn zenith_has_altitude_ninety() {
        let coords = palo_alto(2_458_954.5);
        // A vector toward the observer's zenith: declination = latitude,
        // hour angle zero, in the equatorial frame of date.
        let zenith_equ = Spherical::new(coords.lst(), coords.location().lat, 1.0).to_vector();
        let hor = coords.transform(Frame::Equatorial, Frame::Horizon, zenith_equ);
        let sph = Spherical::from_vector(&hor);
        assert_abs_diff_eq!(sph.lat.to_degrees(), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn aberration_round_trip() {
        let coords = palo_alto(2_458_954.5);
        let v = Vector3::new(0.3, 0.4, 0.866_025).normalize();
        let round = coords.remove_aberration(coords.apply_aberration(v));
        assert_abs_diff_eq!(round, v, epsilon = 1e-8);
    }

    #[test]
    fn aberration_magnitude_is_about_twenty_arcsec() {
        let coords = palo_alto(2_458_954.5);
        // Pick a direction perpendicular to the observer's velocity for
        // the full aberration displacement.
        let vel = coords.observer_velocity();
        let v = vel.cross(&Vector3::z()).normalize();
        let shifted = coords.apply_aberration(v);
        let sep = crate::math::angular_separation(&v, &shifted) * ARCSEC_PER_RAD;
        assert!((15.0..26.0).contains(&sep), "aberration {sep} arcsec");
    }

    #[test]
    fn observer_offset_from_earth_center_is_one_earth_radius() {
        let coords = palo_alto(2_458_954.5);
        let rot = ecliptic_to_fundamental();
        let (earth_pos, _) = planet_mean_orbit(3, coords.jed())
            .and_then(|o| o.position_velocity(coords.jed()).ok())
            .map(|(p, v)| (rot * p, rot * v))
            .unwrap();
        let offset = (coords.observer_position() - earth_pos).norm() * KM_PER_AU;
        assert_abs_diff_eq!(offset, 6371.0, epsilon = 30.0);
    }

    #[test]
    fn geodetic_round_trip() {
        let geodetic = Spherical::new(1.2, 0.65, 0.3);
        let v = geodetic_to_geocentric(geodetic, KM_PER_EARTH_RADII, EARTH_FLATTENING);
        let back = geocentric_to_geodetic(v, KM_PER_EARTH_RADII, EARTH_FLATTENING);
        assert_abs_diff_eq!(back.lon, geodetic.lon, epsilon = 1e-10);
        assert_abs_diff_eq!(back.lat, geodetic.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(back.rad, geodetic.rad, epsilon = 1e-4);
    }

    #[test]
    fn redshift_radvel_inverses() {
        for &z in &[0.0, 0.1, 1.0, 5.0] {
            assert_abs_diff_eq!(radvel_to_redshift(redshift_to_radvel(z)), z, epsilon = 1e-12);
        }
    }

    #[test]
    fn earth_velocity_is_orbital() {
        let coords = palo_alto(2_458_954.5);
        // Earth's orbital speed is ~0.0172 AU/day.
        let v = coords.observer_velocity().norm();
        assert!((0.015..0.020).contains(&v), "observer velocity {v} AU/day");
    }
}

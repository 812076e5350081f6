/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Solar-system objects: major planets, the Sun and Moon, asteroids,
//! comets, and Earth satellites. The identifier selects the ephemeris
//! path: a JPL DE file when one is attached and covers the epoch, the
//! embedded ELP series for the Moon, Keplerian propagation from stored
//! osculating or mean elements otherwise.

use crate::catalog::identifier::{CatalogId, Identifier};
use crate::constants::{KM_PER_AU, LIGHT_AU_PER_DAY, SECONDS_PER_DAY};
use crate::coords::Coordinates;
use crate::ephemerides::elp;
use crate::ephemerides::jplde::DeBody;
use crate::ephemerides::tle::{KeplerSatellite, SatellitePropagator, Tle};
use crate::math::Vector3;
use crate::orbit::{ecliptic_to_fundamental, planet_mean_orbit, Orbit};

use log::warn;

/// JPL planet numbers for the bodies with dedicated ephemeris paths.
pub const SUN: i64 = 0;
pub const MERCURY: i64 = 1;
pub const VENUS: i64 = 2;
pub const EARTH: i64 = 3;
pub const MARS: i64 = 4;
pub const JUPITER: i64 = 5;
pub const SATURN: i64 = 6;
pub const URANUS: i64 = 7;
pub const NEPTUNE: i64 = 8;
pub const PLUTO: i64 = 9;
/// The Moon carries the planetary-satellite numbering convention.
pub const LUNA: i64 = 301;

/// State and elements of a solar-system object.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetData {
    /// Osculating elements for minor bodies, or None for bodies served
    /// by a planetary theory
    pub orbit: Option<Orbit>,
    /// Two-line elements for Earth satellites
    pub tle: Option<Tle>,
    /// Absolute magnitude H (asteroids) or g (comets); infinite if unknown
    pub h_mag: f64,
    /// Slope parameter G (asteroids) or brightening exponent k (comets)
    pub g_param: f64,
    /// Current heliocentric position [AU], fundamental frame
    pub position: Vector3,
    /// Current heliocentric velocity [AU/day], fundamental frame
    pub velocity: Vector3,
}

impl Default for PlanetData {
    fn default() -> Self {
        Self {
            orbit: None,
            tle: None,
            h_mag: f64::INFINITY,
            g_param: f64::INFINITY,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }
}

impl PlanetData {
    pub fn with_orbit(orbit: Orbit, h_mag: f64, g_param: f64) -> Self {
        Self {
            orbit: Some(orbit),
            h_mag,
            g_param,
            ..Default::default()
        }
    }

    pub fn with_tle(tle: Tle) -> Self {
        Self {
            tle: Some(tle),
            ..Default::default()
        }
    }

    /// Heliocentric position and velocity at `jed` in the fundamental
    /// frame, dispatching on the object's identifier. Returns None when
    /// no ephemeris path can serve the body.
    pub fn heliocentric_state(
        &self,
        ident: Identifier,
        coords: &Coordinates,
        jed: f64,
    ) -> Option<(Vector3, Vector3)> {
        match ident.catalog() {
            CatalogId::JplPlanet => self.major_body_state(ident.number(), coords, jed),
            CatalogId::AsteroidNumber | CatalogId::CometNumber => self.kepler_state(jed),
            CatalogId::Norad => self.satellite_state(coords, jed),
            _ => self.kepler_state(jed),
        }
    }

    fn major_body_state(
        &self,
        number: i64,
        coords: &Coordinates,
        jed: f64,
    ) -> Option<(Vector3, Vector3)> {
        if number == LUNA {
            // Geocentric lunar theory plus the Earth's heliocentric state.
            let (moon_pos, moon_vel) = elp::moon_position_velocity(jed);
            let (earth_pos, earth_vel) = self.earth_state(coords, jed)?;
            return Some((earth_pos + moon_pos, earth_vel + moon_vel));
        }

        // DE file first, when attached and in range.
        if let Some(de) = coords.ephemeris() {
            if let Some(body) = DeBody::from_number(number as i32) {
                if let Ok(state) = de.borrow_mut().compute(body, jed) {
                    return Some(state);
                }
            }
        }

        if number == SUN {
            return Some((Vector3::zeros(), Vector3::zeros()));
        }

        // Keplerian mean elements with secular rates as the fallback.
        let orbit = planet_mean_orbit(number as i32, jed)?;
        let state = orbit.position_velocity(jed).ok()?;
        let rot = ecliptic_to_fundamental();
        Some((rot * state.0, rot * state.1))
    }

    fn earth_state(&self, coords: &Coordinates, jed: f64) -> Option<(Vector3, Vector3)> {
        if let Some(de) = coords.ephemeris() {
            if let Ok(state) = de.borrow_mut().compute(DeBody::Earth, jed) {
                return Some(state);
            }
        }
        let orbit = planet_mean_orbit(EARTH as i32, jed)?;
        let state = orbit.position_velocity(jed).ok()?;
        let rot = ecliptic_to_fundamental();
        Some((rot * state.0, rot * state.1))
    }

    fn kepler_state(&self, jed: f64) -> Option<(Vector3, Vector3)> {
        let orbit = self.orbit.as_ref()?;
        match orbit.position_velocity(jed) {
            Ok((pos, vel)) => {
                let rot = ecliptic_to_fundamental();
                Some((rot * pos, rot * vel))
            }
            Err(err) => {
                warn!("Kepler propagation failed: {err}");
                None
            }
        }
    }

    /// Earth satellites: geocentric propagation (km, km/s, equatorial of
    /// date) carried to heliocentric AU/day in the fundamental frame.
    fn satellite_state(&self, coords: &Coordinates, jed: f64) -> Option<(Vector3, Vector3)> {
        let tle = self.tle.as_ref()?;
        let sat = KeplerSatellite::new(tle.clone());
        let (pos_km, vel_kms) = sat.position_velocity(jed);
        // The propagator works in the equatorial frame of date; carry the
        // geocentric state back to the fundamental frame.
        let of_date = coords.matrix(crate::coords::Frame::Equatorial).transpose();
        let geo_pos = of_date * (pos_km / KM_PER_AU);
        let geo_vel = of_date * (vel_kms * SECONDS_PER_DAY / KM_PER_AU);
        let (earth_pos, earth_vel) = self.earth_state(coords, jed)?;
        Some((earth_pos + geo_pos, earth_vel + geo_vel))
    }

    /// Computes the apparent direction, distance, and magnitude for the
    /// observer in `coords`, with light-time iteration when enabled.
    /// Returns None if no ephemeris path serves the body.
    pub fn apparent_place(
        &mut self,
        ident: Identifier,
        coords: &Coordinates,
    ) -> Option<(Vector3, f64, f64)> {
        let jed = coords.jed();
        let (mut pos, mut vel) = self.heliocentric_state(ident, coords, jed)?;

        if coords.light_time() {
            // Re-evaluate the body at the retarded epoch until the
            // light-time converges; two or three rounds suffice.
            let mut tau = 0.0;
            for _ in 0..3 {
                let next_tau = (pos - coords.observer_position()).norm() / LIGHT_AU_PER_DAY;
                if (next_tau - tau).abs() * SECONDS_PER_DAY < 1e-6 {
                    break;
                }
                tau = next_tau;
                let state = self.heliocentric_state(ident, coords, jed - tau)?;
                pos = state.0;
                vel = state.1;
            }
        }

        self.position = pos;
        self.velocity = vel;

        let (direction, distance) = coords.apparent_direction(pos);
        let magnitude = self.magnitude(ident, &pos, &coords.observer_position(), distance);
        Some((direction, distance, magnitude))
    }

    /// Apparent visual magnitude from the standard phase-dependent
    /// expressions for the major bodies, the H-G system for asteroids,
    /// and the g/k law for comets.
    fn magnitude(
        &self,
        ident: Identifier,
        position: &Vector3,
        observer: &Vector3,
        delta: f64,
    ) -> f64 {
        let r = position.norm();
        let to_sun = -position;
        let to_observer = observer - position;
        let phase = if r > 0.0 && delta > 0.0 {
            crate::math::angular_separation(&to_sun.normalize(), &to_observer.normalize())
        } else {
            0.0
        };
        let i = phase.to_degrees();

        match ident.catalog() {
            CatalogId::JplPlanet => {
                let log_rd = 5.0 * (r * delta).log10();
                match ident.number() {
                    SUN => -26.74 + 5.0 * delta.log10(),
                    MERCURY => -0.42 + log_rd + 0.0380 * i - 0.000_273 * i * i
                        + 0.000_002 * i * i * i,
                    VENUS => -4.40 + log_rd + 0.0009 * i + 0.000_239 * i * i
                        - 0.000_000_65 * i * i * i,
                    MARS => -1.52 + log_rd + 0.016 * i,
                    JUPITER => -9.40 + log_rd + 0.005 * i,
                    SATURN => -8.88 + log_rd + 0.044 * i,
                    URANUS => -7.19 + log_rd,
                    NEPTUNE => -6.87 + log_rd,
                    PLUTO => -1.0 + log_rd,
                    LUNA => {
                        // Allen's lunar phase law; r is the Moon's
                        // heliocentric distance, delta the topocentric one.
                        let i4 = i * i * i * i;
                        0.23 + 5.0 * (r * delta).log10() + 0.026 * i + 4.0e-9 * i4
                    }
                    _ => f64::INFINITY,
                }
            }
            CatalogId::AsteroidNumber => {
                if !self.h_mag.is_finite() {
                    return f64::INFINITY;
                }
                let g = if self.g_param.is_finite() { self.g_param } else { 0.15 };
                let half_tan = (phase / 2.0).tan();
                let phi1 = (-3.33 * half_tan.powf(0.63)).exp();
                let phi2 = (-1.87 * half_tan.powf(1.22)).exp();
                self.h_mag + 5.0 * (r * delta).log10()
                    - 2.5 * ((1.0 - g) * phi1 + g * phi2).log10()
            }
            CatalogId::CometNumber => {
                if !self.h_mag.is_finite() {
                    return f64::INFINITY;
                }
                let k = if self.g_param.is_finite() { self.g_param } else { 4.0 };
                self.h_mag + 5.0 * delta.log10() + 2.5 * k * r.log10()
            }
            _ => f64::INFINITY,
        }
    }
}

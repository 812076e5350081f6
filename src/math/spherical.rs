/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::angles::Angle;
use super::Vector3;

/// A point in a spherical coordinate system (lon/lat, RA/Dec, Az/Alt).
///
/// `lon` is in radians from 0 to 2π, `lat` in radians from -π/2 to +π/2,
/// and `rad` is the distance from the origin in arbitrary units —
/// infinite if unknown, 1.0 for a unit vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spherical {
    pub lon: f64,
    pub lat: f64,
    pub rad: f64,
}

impl Spherical {
    pub const fn new(lon: f64, lat: f64, rad: f64) -> Self {
        Self { lon, lat, rad }
    }

    pub fn from_vector(v: &Vector3) -> Self {
        let rad = v.norm();
        if rad == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            lon: Angle::new(v.y.atan2(v.x)).mod_2pi().rad(),
            lat: (v.z / rad).clamp(-1.0, 1.0).asin(),
            rad,
        }
    }

    pub fn to_vector(&self) -> Vector3 {
        let r = if self.rad.is_finite() { self.rad } else { 1.0 };
        Vector3::new(
            r * self.lat.cos() * self.lon.cos(),
            r * self.lat.cos() * self.lon.sin(),
            r * self.lat.sin(),
        )
    }

    /// Converts a rectangular position and velocity to angular rates and a
    /// radial rate about this point's direction. Used for proper-motion
    /// output: `lon` is the longitude rate, `lat` the latitude rate, `rad`
    /// the radial velocity, all per the input time unit.
    pub fn velocity_from_vectors(pos: &Vector3, vel: &Vector3) -> Self {
        let rad = pos.norm();
        let xy2 = pos.x * pos.x + pos.y * pos.y;
        if rad == 0.0 || xy2 == 0.0 {
            return Self::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        }
        let lon_rate = (pos.x * vel.y - pos.y * vel.x) / xy2;
        let lat_rate = (vel.z * xy2 - pos.z * (pos.x * vel.x + pos.y * vel.y))
            / (rad * rad * xy2.sqrt());
        let rad_rate = pos.dot(vel) / rad;
        Self::new(lon_rate, lat_rate, rad_rate)
    }

    pub fn angular_separation(&self, other: &Self) -> f64 {
        super::angular_separation(
            &Self::new(self.lon, self.lat, 1.0).to_vector(),
            &Self::new(other.lon, other.lat, 1.0).to_vector(),
        )
    }

    pub fn position_angle(&self, other: &Self) -> f64 {
        super::position_angle(
            &Self::new(self.lon, self.lat, 1.0).to_vector(),
            &Self::new(other.lon, other.lat, 1.0).to_vector(),
        )
    }
}

impl From<Vector3> for Spherical {
    fn from(v: Vector3) -> Self {
        Self::from_vector(&v)
    }
}

impl From<Spherical> for Vector3 {
    fn from(s: Spherical) -> Self {
        s.to_vector()
    }
}

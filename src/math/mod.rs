/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Vector3 is nalgebra's Vector3 with a 64-bit floating point representation.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub mod angles;
pub mod interpolation;
pub mod rotation;
pub mod spherical;

/// Normalizes `v` in place and returns its original magnitude.
/// A zero vector is left unchanged and zero is returned.
pub fn normalize_in_place(v: &mut Vector3) -> f64 {
    let s = v.norm();
    if s > 0.0 {
        *v /= s;
    }
    s
}

/// Angular separation between two unit vectors, in radians.
/// The dot product is clamped to [-1, 1] so antipodal and identical
/// directions do not produce NaN.
pub fn angular_separation(a: &Vector3, b: &Vector3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Position angle of `b` as seen from `a`, measured from north through east,
/// in radians from 0 to 2π.
pub fn position_angle(a: &Vector3, b: &Vector3) -> f64 {
    let sph_a = spherical::Spherical::from_vector(a);
    let sph_b = spherical::Spherical::from_vector(b);
    let eta = sph_b.lat.cos() * (sph_b.lon - sph_a.lon).sin();
    let xi = sph_a.lat.cos() * sph_b.lat.sin()
        - sph_a.lat.sin() * sph_b.lat.cos() * (sph_b.lon - sph_a.lon).cos();
    angles::Angle::new(eta.atan2(xi)).mod_2pi().rad()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_returns_old_magnitude() {
        let mut v = Vector3::new(3.0, 4.0, 0.0);
        let s = normalize_in_place(&mut v);
        assert_abs_diff_eq!(s, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.norm(), 1.0, epsilon = 1e-12);

        let mut zero = Vector3::zeros();
        assert_eq!(normalize_in_place(&mut zero), 0.0);
        assert_eq!(zero, Vector3::zeros());
    }

    #[test]
    fn separation_clamps_dot_product() {
        let v = Vector3::x();
        // Numerically the dot of a unit vector with itself may exceed 1.0.
        assert_abs_diff_eq!(angular_separation(&v, &v), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(
            angular_separation(&v, &-v),
            std::f64::consts::PI,
            epsilon = 1e-15
        );
    }

    #[test]
    fn position_angle_north_through_east() {
        // A point due north of the reference has position angle 0.
        let a = spherical::Spherical::new(0.0, 0.0, 1.0).to_vector();
        let north = spherical::Spherical::new(0.0, 0.1, 1.0).to_vector();
        assert_abs_diff_eq!(position_angle(&a, &north), 0.0, epsilon = 1e-12);
        // A point due east has position angle π/2.
        let east = spherical::Spherical::new(0.1, 0.0, 1.0).to_vector();
        assert_abs_diff_eq!(
            position_angle(&a, &east),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-3
        );
    }
}

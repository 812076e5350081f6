/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::Matrix3;

/// Axes for elementary rotations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Returns a rotation matrix for a rotation about the X axis.
pub fn r1(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Returns a rotation matrix for a rotation about the Y axis.
pub fn r2(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Returns a rotation matrix for a rotation about the Z axis.
pub fn r3(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Composes elementary axis rotations, applied in the order given:
/// `rotation(&[(Axis::Z, a), (Axis::X, b)])` first rotates by `a`
/// about Z, then by `b` about X.
pub fn rotation(steps: &[(Axis, f64)]) -> Matrix3 {
    let mut m = Matrix3::identity();
    for &(axis, angle) in steps {
        let r = match axis {
            Axis::X => r1(angle),
            Axis::Y => r2(angle),
            Axis::Z => r3(angle),
        };
        m = r * m;
    }
    m
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Almagest is the computation core of a sky-catalog and ephemeris
//! engine: coordinate and time frameworks, JPL DE and ELP lunar
//! ephemerides, Keplerian and satellite propagation, a polymorphic
//! object catalog over a Hierarchical Triangular Mesh spatial index,
//! and a generic astronomical event finder.

extern crate log;

pub mod catalog;
pub mod constants;
pub mod coords;
pub mod ephemerides;
pub mod errors;
pub mod events;
pub mod htm;
pub mod math;
pub mod orbit;
pub mod time;

pub mod prelude {
    pub use crate::catalog::identifier::{CatalogId, Identifier};
    pub use crate::catalog::object::{Object, ObjectType};
    pub use crate::catalog::Catalog;
    pub use crate::coords::{Coordinates, Frame};
    pub use crate::ephemerides::jplde::{DeSeries, JplDeEphemeris};
    pub use crate::errors::InputOutputError;
    pub use crate::htm::Htm;
    pub use crate::math::angles::Angle;
    pub use crate::math::spherical::Spherical;
    pub use crate::math::{Matrix3, Vector3};
    pub use crate::time::{CalendarKind, Time};
    pub use std::fs::File;
}

/// Defines the number of bytes in a double (prevents magic numbers)
pub(crate) const DBL_SIZE: usize = 8;

/// Memory maps a file and **copies** the data on the heap prior to returning a pointer to this heap data.
#[macro_export]
macro_rules! file2heap {
    ($filename:tt) => {
        match File::open($filename) {
            Err(e) => Err($crate::errors::InputOutputError::IOError { kind: e.kind() }),
            Ok(file) => unsafe {
                use bytes::Bytes;
                use memmap2::MmapOptions;
                match MmapOptions::new().map(&file) {
                    Err(_) => Err($crate::errors::InputOutputError::IOUnknownError),
                    Ok(mmap) => {
                        let bytes = Bytes::copy_from_slice(&mmap);
                        Ok(bytes)
                    }
                }
            },
        }
    };
}

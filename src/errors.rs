/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use snafu::prelude::*;

use std::io::ErrorKind as IOErrorKind;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InputOutputError {
    /// Raised for an error in reading or writing the file(s)
    IOError { kind: IOErrorKind },
    /// Raised if an IO error occurred but its representation is not simple (and therefore not an std::io::ErrorKind).
    IOUnknownError,
}

impl From<IOErrorKind> for InputOutputError {
    fn from(kind: IOErrorKind) -> Self {
        Self::IOError { kind }
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MathError {
    #[snafu(display("prevented a division by zero when {action}"))]
    DivisionByZero { action: &'static str },
    #[snafu(display("{msg}: {value}"))]
    DomainError { value: f64, msg: &'static str },
    #[snafu(display("max iterations reached ({iter}) when {action}"))]
    MaxIterationsReached { iter: usize, action: &'static str },
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EphemerisError {
    #[snafu(display("no ephemeris file is currently open"))]
    NotOpen,
    #[snafu(display("JED {jed} outside ephemeris span [{start}, {stop}]"))]
    EpochOutOfRange { jed: f64, start: f64, stop: f64 },
    #[snafu(display("body identifier {body} is not on the ephemeris file"))]
    UnknownBody { body: i32 },
    #[snafu(display(
        "record bytes between indexes {start} and {end} could not be read, file contains {size} bytes (data malformed?)"
    ))]
    InaccessibleBytes {
        start: usize,
        end: usize,
        size: usize,
    },
    #[snafu(display("ephemeris header is not a recognized JPL DE layout: {reason}"))]
    MalformedHeader { reason: &'static str },
    #[snafu(display("data checksum differs from expected checksum (expected {expected:x}, computed {computed:x})"))]
    ChecksumInvalid { expected: u32, computed: u32 },
    #[snafu(display("{source} encountered when loading ephemeris from {path}"))]
    Loading {
        path: String,
        source: InputOutputError,
    },
    #[snafu(display("{source}"))]
    EphemMath { source: MathError },
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum OrbitError {
    #[snafu(display("eccentricity cannot be negative: {ecc}"))]
    NegativeEccentricity { ecc: f64 },
    #[snafu(display("Kepler solver did not converge after {iter} iterations (M = {mean_anomaly}, e = {ecc})"))]
    KeplerDiverged {
        iter: usize,
        mean_anomaly: f64,
        ecc: f64,
    },
    #[snafu(display("mean motion must be positive to propagate, got {mm} rad/day"))]
    NoMeanMotion { mm: f64 },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogError {
    #[snafu(display("CSV row does not start with a recognized object type code: {code}"))]
    UnknownTypeCode { code: String },
    #[snafu(display("CSV row has {got} fields but type {kind} requires at least {need}"))]
    TooFewFields {
        kind: &'static str,
        got: usize,
        need: usize,
    },
    #[snafu(display("{source} encountered when reading {path}"))]
    CatalogIo {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("CSV format error: {source}"))]
    CatalogCsv { source: csv::Error },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TleError {
    #[snafu(display("TLE line {line} has length {len}, expected 69 characters"))]
    BadLineLength { line: usize, len: usize },
    #[snafu(display("TLE line {line} checksum mismatch (expected {expected}, computed {computed})"))]
    BadChecksum {
        line: usize,
        expected: u32,
        computed: u32,
    },
    #[snafu(display("TLE field `{field}` could not be parsed"))]
    BadField { field: &'static str },
}

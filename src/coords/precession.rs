/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Long-term precession from the Vondrák-Capitaine-Wallace (2011)
//! series, built in the ecliptic formulation: the motion of the ecliptic
//! pole (P_A, Q_A), the accumulated general precession p_A along the
//! ecliptic, and the mean obliquity.

use crate::constants::{DAYS_PER_CENTURY, J2000};
use crate::math::angles::RAD_PER_ARCSEC;
use crate::math::rotation::{r1, r3};
use crate::math::Matrix3;

use std::f64::consts::TAU;

/// Periodic term of the ecliptic-pole series: period in Julian centuries
/// and cosine/sine amplitudes for P_A and Q_A in arcseconds.
struct PqTerm {
    period: f64,
    pc: f64,
    ps: f64,
    qc: f64,
    qs: f64,
}

#[rustfmt::skip]
const PQ_TERMS: [PqTerm; 8] = [
    PqTerm { period:  708.15, pc: -5486.751211, ps:  -684.661560, qc:   667.666730, qs: -5523.863691 },
    PqTerm { period: 2309.00, pc:   -17.127623, ps:  2446.283880, qc: -2354.886252, qs:  -549.747450 },
    PqTerm { period: 1620.00, pc:  -617.517403, ps:   399.671049, qc:  -428.152441, qs:  -310.998056 },
    PqTerm { period:  492.20, pc:   413.442940, ps:  -356.652376, qc:   376.202861, qs:   421.535876 },
    PqTerm { period: 1183.00, pc:    78.614193, ps:  -186.387003, qc:   184.778874, qs:   -36.776172 },
    PqTerm { period:  622.00, pc:  -180.732815, ps:  -316.800070, qc:   335.321713, qs:  -145.278396 },
    PqTerm { period:  882.00, pc:   -87.676083, ps:   198.296701, qc:  -185.138669, qs:   -34.744450 },
    PqTerm { period:  547.00, pc:    46.140315, ps:   101.135679, qc:  -120.972830, qs:    22.885731 },
];

/// Periodic term of the general-precession series: period in Julian
/// centuries and cosine/sine amplitudes in arcseconds.
struct PaTerm {
    period: f64,
    c: f64,
    s: f64,
}

#[rustfmt::skip]
const PA_TERMS: [PaTerm; 10] = [
    PaTerm { period:  409.90, c: -6908.287473, s: -2845.175469 },
    PaTerm { period:  396.15, c: -3198.706291, s:   449.844989 },
    PaTerm { period:  537.22, c:  1453.674527, s: -1255.915323 },
    PaTerm { period:  402.90, c:  -857.748557, s:   886.736783 },
    PaTerm { period:  417.15, c:  1173.231614, s:   418.887514 },
    PaTerm { period:  288.92, c:  -156.981465, s:   997.912441 },
    PaTerm { period: 4043.00, c:   371.836550, s:  -240.979710 },
    PaTerm { period:  306.00, c:  -216.619040, s:    76.541307 },
    PaTerm { period:  277.00, c:   193.691479, s:   -36.788069 },
    PaTerm { period:  203.00, c:    11.891524, s:  -170.964086 },
];

/// Ecliptic-pole components P_A, Q_A in arcseconds at `t` Julian
/// centuries from J2000. The fitted series carries a constant offset at
/// J2000 which callers subtract (`pq_at` below does so).
fn pq_raw(t: f64) -> (f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let mut p = 5851.607687 - 0.1189000 * t - 0.00028913 * t2 + 0.000000101 * t3;
    let mut q = -1600.886300 + 1.1689818 * t - 0.00000020 * t2 - 0.000000437 * t3;
    for term in &PQ_TERMS {
        let (s, c) = (TAU * t / term.period).sin_cos();
        p += term.pc * c + term.ps * s;
        q += term.qc * c + term.qs * s;
    }
    (p, q)
}

fn pq_at(t: f64) -> (f64, f64) {
    let (p, q) = pq_raw(t);
    let (p0, q0) = pq_raw(0.0);
    (p - p0, q - q0)
}

/// Accumulated general precession in ecliptic longitude since J2000, in
/// radians, at `t` Julian centuries from J2000.
fn general_precession(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mut pa = 8134.017132 + 5043.0520035 * t - 0.00710733 * t2 + 0.000000271 * t3;
    for term in &PA_TERMS {
        let (s, c) = (TAU * t / term.period).sin_cos();
        pa += term.c * c + term.s * s;
    }
    let pa0 = 8134.017132 + PA_TERMS.iter().map(|term| term.c).sum::<f64>();
    (pa - pa0) * RAD_PER_ARCSEC
}

/// Mean obliquity of the ecliptic (Laskar 1986) in radians. The series
/// argument is in units of 10,000 Julian years from J2000.
pub fn obliquity(jed: f64) -> f64 {
    let u = (jed - J2000) / DAYS_PER_CENTURY / 100.0;
    let coeffs = [
        84381.448, -4680.93, -1.55, 1999.25, -51.38, -249.67, -39.05, 7.12, 27.87, 5.79, 2.45,
    ];
    let mut eps = 0.0;
    for &c in coeffs.iter().rev() {
        eps = eps * u + c;
    }
    eps * RAD_PER_ARCSEC
}

const OBLIQUITY_J2000: f64 = 84381.448 * RAD_PER_ARCSEC;

/// Precession matrix transforming the fundamental (mean equatorial
/// J2000) frame to the mean equatorial frame of the given epoch. Built
/// from the ecliptic-pole inclination and node (pi_A, Pi_A) and the
/// general precession p_A:
///
/// `M = R1(-eps_A) R3(-Pi_A - p_A) R1(pi_A) R3(Pi_A) R1(eps_0)`
pub fn precession_matrix(jed: f64) -> Matrix3 {
    let t = (jed - J2000) / DAYS_PER_CENTURY;

    let (p, q) = pq_at(t);
    let p = p * RAD_PER_ARCSEC;
    let q = q * RAD_PER_ARCSEC;

    let sin_pi = (p * p + q * q).sqrt().clamp(0.0, 1.0);
    let pi_a = sin_pi.asin();
    let node = p.atan2(q);

    let pa = general_precession(t);
    let eps = obliquity(jed);

    r1(-eps) * r3(-node - pa) * r1(pi_a) * r3(node) * r1(OBLIQUITY_J2000)
}

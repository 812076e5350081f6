/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Reader for JPL binary DE planetary ephemerides (series 200, 403-438).
//!
//! The file is memory-mapped and copied to the heap once; all record
//! access is then bounds-checked slicing of that buffer. The most
//! recently used coefficient block is cached, so stepping time forward
//! touches the buffer once per block span rather than once per query.

use crate::errors::{EphemMathSnafu, EphemerisError, LoadingSnafu};
use crate::math::interpolation::chebyshev_eval;
use crate::math::Vector3;
use crate::{file2heap, DBL_SIZE};

use bytes::Bytes;
use log::{debug, trace};
use snafu::ResultExt;
use std::fs::File;
use zerocopy::byteorder::{F64, I32, NativeEndian};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

type F64n = F64<NativeEndian>;
type I32n = I32<NativeEndian>;

/// Number of four-byte words per record, per DE series.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeSeries {
    De200,
    De403,
    De404,
    De405,
    De406,
    De421,
    De422,
    De430,
    De431,
    De438,
}

impl DeSeries {
    /// KSIZE, the record length in 4-byte words.
    pub fn ksize(&self) -> usize {
        match self {
            DeSeries::De200 => 1652,
            DeSeries::De404 | DeSeries::De406 => 1456,
            _ => 2036,
        }
    }
}

/// Bodies the reader can return heliocentric states for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeBody {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Moon,
}

impl DeBody {
    /// Body number 0-10 as used by the public `compute` contract.
    pub fn from_number(id: i32) -> Option<Self> {
        use DeBody::*;
        Some(match id {
            0 => Sun,
            1 => Mercury,
            2 => Venus,
            3 => Earth,
            4 => Mars,
            5 => Jupiter,
            6 => Saturn,
            7 => Uranus,
            8 => Neptune,
            9 => Pluto,
            10 => Moon,
            _ => return None,
        })
    }
}

const OLDMAX: usize = 400;
const NMAX: usize = 1000;

/// First header record, fixed legacy layout: three title lines, the
/// first 400 constant names, the time span, and the body pointer table.
/// The trailing `numde`/`lpt` region is reinterpreted for files written
/// with the extended `ipt[13]` layout, where librations occupy the
/// thirteenth pointer row and `numde` follows it.
#[derive(FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct DeHeaderRecord {
    ttl: [[u8; 84]; 3],
    cnam: [[u8; 6]; OLDMAX],
    ss: [F64n; 3],
    ncon: I32n,
    au: F64n,
    emrat: F64n,
    ipt: [[I32n; 3]; 12],
    numde: I32n,
    lpt: [I32n; 3],
}

const HEADER_PREFIX_SIZE: usize = 3 * 84 + OLDMAX * 6 + 3 * 8 + 4 + 8 + 8 + 12 * 3 * 4 + 4 + 12;

/// An open JPL DE ephemeris. Owns the heap copy of the file and a
/// one-block coefficient cache; not reentrant and not shareable across
/// threads.
pub struct JplDeEphemeris {
    bytes: Bytes,
    pub crc32_checksum: u32,
    ksize: usize,

    titles: [String; 3],
    constants: Vec<(String, f64)>,
    start_jed: f64,
    stop_jed: f64,
    step_days: f64,
    au_km: f64,
    emrat: f64,
    numde: i32,
    /// Pointer table rows: coefficient offset (1-based), coefficients per
    /// component, sub-intervals per block. Rows 0-9 are Mercury..Pluto
    /// and the geocentric Moon, row 10 the Sun, row 11 nutations, row 12
    /// librations.
    ipt: [[i32; 3]; 13],

    cached_block: Option<(usize, Vec<f64>)>,
}

impl JplDeEphemeris {
    /// Opens and parses a binary DE file. The whole file is copied to the
    /// heap; the returned reader owns it.
    pub fn open(path: &str, series: DeSeries) -> Result<Self, EphemerisError> {
        let bytes = file2heap!(path).with_context(|_| LoadingSnafu { path })?;
        let crc32_checksum = crc32fast::hash(&bytes);
        let ksize = series.ksize();
        let recsize = ksize * 4;

        let header_bytes =
            bytes
                .get(..HEADER_PREFIX_SIZE)
                .ok_or(EphemerisError::InaccessibleBytes {
                    start: 0,
                    end: HEADER_PREFIX_SIZE,
                    size: bytes.len(),
                })?;
        let header = DeHeaderRecord::read_from_bytes(header_bytes)
            .map_err(|_| EphemerisError::MalformedHeader {
                reason: "header record shorter than the fixed prefix",
            })?;

        let start_jed = header.ss[0].get();
        let stop_jed = header.ss[1].get();
        let step_days = header.ss[2].get();
        if !(start_jed.is_finite() && stop_jed.is_finite() && step_days > 0.0)
            || stop_jed <= start_jed
        {
            return Err(EphemerisError::MalformedHeader {
                reason: "nonsensical start/stop/step",
            });
        }

        let mut ipt = [[0_i32; 3]; 13];
        for (row, src) in ipt.iter_mut().take(12).zip(header.ipt.iter()) {
            for (dst, v) in row.iter_mut().zip(src.iter()) {
                *dst = v.get();
            }
        }

        // Legacy layout: numde then lpt[3] (librations). Extended layout:
        // the thirteenth ipt row sits where legacy numde/lpt[0..1] were,
        // and numde follows as lpt[2].
        let legacy_numde = header.numde.get();
        let numde = if (100..1000).contains(&legacy_numde) {
            ipt[12] = [header.lpt[0].get(), header.lpt[1].get(), header.lpt[2].get()];
            legacy_numde
        } else {
            ipt[12] = [legacy_numde, header.lpt[0].get(), header.lpt[1].get()];
            header.lpt[2].get()
        };

        let ncon = header.ncon.get().clamp(0, NMAX as i32) as usize;

        // Constant names: the first 400 live in the fixed prefix, any
        // remainder in cnam2 immediately after it.
        let mut names = Vec::with_capacity(ncon);
        for name in header.cnam.iter().take(ncon.min(OLDMAX)) {
            names.push(String::from_utf8_lossy(name).trim().to_string());
        }
        if ncon > OLDMAX {
            let extra = ncon - OLDMAX;
            let cnam2 = bytes
                .get(HEADER_PREFIX_SIZE..HEADER_PREFIX_SIZE + extra * 6)
                .ok_or(EphemerisError::MalformedHeader {
                    reason: "constant name table extends past record 1",
                })?;
            for chunk in cnam2.chunks_exact(6) {
                names.push(String::from_utf8_lossy(chunk).trim().to_string());
            }
        }

        let titles = core::array::from_fn(|i| {
            String::from_utf8_lossy(&header.ttl[i]).trim().to_string()
        });

        let mut reader = Self {
            bytes,
            crc32_checksum,
            ksize,
            titles,
            constants: Vec::new(),
            start_jed,
            stop_jed,
            step_days,
            au_km: header.au.get(),
            emrat: header.emrat.get(),
            numde,
            ipt,
            cached_block: None,
        };

        // Record 2 holds the constant values.
        let values = reader.read_doubles(recsize, ncon)?;
        reader.constants = names.into_iter().zip(values).collect();

        debug!(
            "opened DE{} spanning JED {} to {} step {} days ({} constants)",
            reader.numde,
            reader.start_jed,
            reader.stop_jed,
            reader.step_days,
            reader.constants.len()
        );
        Ok(reader)
    }

    /// Releases the file data. Idempotent; subsequent `compute` calls
    /// fail with `NotOpen`.
    pub fn close(&mut self) {
        self.bytes = Bytes::new();
        self.cached_block = None;
    }

    pub fn is_open(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// Recomputes the CRC32 of the underlying bytes and compares it with
    /// the checksum recorded at open time.
    pub fn scrub(&self) -> Result<(), EphemerisError> {
        let computed = crc32fast::hash(&self.bytes);
        if computed == self.crc32_checksum {
            Ok(())
        } else {
            Err(EphemerisError::ChecksumInvalid {
                expected: self.crc32_checksum,
                computed,
            })
        }
    }

    pub fn titles(&self) -> &[String; 3] {
        &self.titles
    }

    pub fn constants(&self) -> &[(String, f64)] {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn span(&self) -> (f64, f64, f64) {
        (self.start_jed, self.stop_jed, self.step_days)
    }

    pub fn de_number(&self) -> i32 {
        self.numde
    }

    pub fn au_km(&self) -> f64 {
        self.au_km
    }

    pub fn earth_moon_mass_ratio(&self) -> f64 {
        self.emrat
    }

    /// Heliocentric position [AU] and velocity [AU/day] of a body in the
    /// fundamental frame at the given Julian Ephemeris Date. Fails if the
    /// reader is closed or the epoch is outside the file span; outputs
    /// are untouched on failure.
    pub fn compute(
        &mut self,
        body: DeBody,
        jed: f64,
    ) -> Result<(Vector3, Vector3), EphemerisError> {
        if !self.is_open() {
            return Err(EphemerisError::NotOpen);
        }
        if jed < self.start_jed || jed > self.stop_jed {
            return Err(EphemerisError::EpochOutOfRange {
                jed,
                start: self.start_jed,
                stop: self.stop_jed,
            });
        }

        let sun = self.interpolate_body(10, jed)?;

        let heliocentric = |state: (Vector3, Vector3)| (state.0 - sun.0, state.1 - sun.1);

        match body {
            DeBody::Sun => Ok((Vector3::zeros(), Vector3::zeros())),
            DeBody::Mercury => Ok(heliocentric(self.interpolate_body(0, jed)?)),
            DeBody::Venus => Ok(heliocentric(self.interpolate_body(1, jed)?)),
            DeBody::Mars => Ok(heliocentric(self.interpolate_body(3, jed)?)),
            DeBody::Jupiter => Ok(heliocentric(self.interpolate_body(4, jed)?)),
            DeBody::Saturn => Ok(heliocentric(self.interpolate_body(5, jed)?)),
            DeBody::Uranus => Ok(heliocentric(self.interpolate_body(6, jed)?)),
            DeBody::Neptune => Ok(heliocentric(self.interpolate_body(7, jed)?)),
            DeBody::Pluto => Ok(heliocentric(self.interpolate_body(8, jed)?)),
            DeBody::Earth => {
                let emb = self.interpolate_body(2, jed)?;
                let moon = self.interpolate_body(9, jed)?;
                let f = 1.0 / (1.0 + self.emrat);
                Ok(heliocentric((emb.0 - moon.0 * f, emb.1 - moon.1 * f)))
            }
            DeBody::Moon => {
                let emb = self.interpolate_body(2, jed)?;
                let moon = self.interpolate_body(9, jed)?;
                let f = 1.0 / (1.0 + self.emrat);
                let earth = (emb.0 - moon.0 * f, emb.1 - moon.1 * f);
                Ok(heliocentric((earth.0 + moon.0, earth.1 + moon.1)))
            }
        }
    }

    /// Nutations in longitude and obliquity [rad] and their rates
    /// [rad/day] from the file, if the series carries them.
    pub fn nutations(&mut self, jed: f64) -> Result<(f64, f64, f64, f64), EphemerisError> {
        if !self.is_open() {
            return Err(EphemerisError::NotOpen);
        }
        if self.ipt[11][1] <= 0 {
            return Err(EphemerisError::UnknownBody { body: 14 });
        }
        let (vals, rates) = self.interpolate_components(11, 2, jed)?;
        Ok((vals[0], vals[1], rates[0], rates[1]))
    }

    /// Interpolates one 3-component body row of the pointer table,
    /// returning raw file units scaled to AU and AU/day.
    fn interpolate_body(&mut self, row: usize, jed: f64) -> Result<(Vector3, Vector3), EphemerisError> {
        let (vals, rates) = self.interpolate_components(row, 3, jed)?;
        let aufac = 1.0 / self.au_km;
        Ok((
            Vector3::new(vals[0], vals[1], vals[2]) * aufac,
            Vector3::new(rates[0], rates[1], rates[2]) * aufac,
        ))
    }

    fn interpolate_components(
        &mut self,
        row: usize,
        ncm: usize,
        jed: f64,
    ) -> Result<([f64; 3], [f64; 3]), EphemerisError> {
        let offset = self.ipt[row][0];
        let ncf = self.ipt[row][1];
        let na = self.ipt[row][2];
        if offset <= 0 || ncf <= 0 || na <= 0 {
            return Err(EphemerisError::UnknownBody { body: row as i32 });
        }
        let (offset, ncf, na) = (offset as usize, ncf as usize, na as usize);

        // Record number, with the first two records being header data.
        let mut nr = ((jed - self.start_jed) / self.step_days) as usize + 2;
        if jed == self.stop_jed {
            nr -= 1;
        }
        let block_start = self.start_jed + (nr - 2) as f64 * self.step_days;
        let t_block = (jed - block_start) / self.step_days;

        self.ensure_block(nr)?;
        let block = &self.cached_block.as_ref().expect("block cached above").1;

        // Sub-interval within the block and normalized Chebyshev time.
        let mut l = (t_block * na as f64) as usize;
        if l >= na {
            l = na - 1;
        }
        let tc = 2.0 * (t_block * na as f64 - l as f64) - 1.0;

        let base = offset - 1 + l * ncf * ncm;
        let mut vals = [0.0; 3];
        let mut rates = [0.0; 3];
        // Derivative scale from normalized time to per-day.
        let vfac = 2.0 * na as f64 / self.step_days;
        for c in 0..ncm {
            let coeffs = block.get(base + c * ncf..base + (c + 1) * ncf).ok_or(
                EphemerisError::InaccessibleBytes {
                    start: base + c * ncf,
                    end: base + (c + 1) * ncf,
                    size: block.len(),
                },
            )?;
            let (v, d) = chebyshev_eval(tc, coeffs).context(EphemMathSnafu)?;
            vals[c] = v;
            rates[c] = d * vfac;
        }
        Ok((vals, rates))
    }

    /// Loads the requested coefficient block into the one-block cache if
    /// it is not the one already there.
    fn ensure_block(&mut self, nr: usize) -> Result<(), EphemerisError> {
        if matches!(self.cached_block, Some((cached, _)) if cached == nr) {
            trace!("block {nr} served from cache");
            return Ok(());
        }
        let ncoeff = self.ksize / 2;
        let block = self.read_doubles(nr * self.ksize * 4, ncoeff)?;
        debug!("loaded DE coefficient block {nr}");
        self.cached_block = Some((nr, block));
        Ok(())
    }

    fn read_doubles(&self, byte_offset: usize, count: usize) -> Result<Vec<f64>, EphemerisError> {
        let end = byte_offset + count * DBL_SIZE;
        let slice = self
            .bytes
            .get(byte_offset..end)
            .ok_or(EphemerisError::InaccessibleBytes {
                start: byte_offset,
                end,
                size: self.bytes.len(),
            })?;
        Ok(slice
            .chunks_exact(DBL_SIZE)
            .map(|c| f64::from_ne_bytes(c.try_into().expect("chunks_exact yields 8 bytes")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_open() {
        let err = JplDeEphemeris::open("/nonexistent/de438.eph", DeSeries::De438);
        assert!(err.is_err());
    }

    #[test]
    fn ksize_per_series() {
        assert_eq!(DeSeries::De200.ksize(), 1652);
        assert_eq!(DeSeries::De404.ksize(), 1456);
        assert_eq!(DeSeries::De406.ksize(), 1456);
        assert_eq!(DeSeries::De430.ksize(), 2036);
        assert_eq!(DeSeries::De438.ksize(), 2036);
    }

    #[test]
    fn body_numbering_matches_contract() {
        assert_eq!(DeBody::from_number(0), Some(DeBody::Sun));
        assert_eq!(DeBody::from_number(3), Some(DeBody::Earth));
        assert_eq!(DeBody::from_number(10), Some(DeBody::Moon));
        assert_eq!(DeBody::from_number(11), None);
        assert_eq!(DeBody::from_number(-1), None);
    }

    /// Builds a tiny synthetic DE-format file in memory: one body row
    /// (used for all pointers) whose X component is a known Chebyshev
    /// series, so `compute` can be validated end to end.
    fn synthetic_de(path: &std::path::Path) {
        use std::io::Write;

        let ksize = DeSeries::De438.ksize();
        let recsize = ksize * 4;
        let ncoeff = ksize / 2;

        let mut rec1 = vec![0_u8; recsize];
        // Titles and constant names stay blank. ss[3]:
        let mut off = 3 * 84 + OLDMAX * 6;
        for v in [2_451_536.5_f64, 2_451_600.5, 32.0] {
            rec1[off..off + 8].copy_from_slice(&v.to_ne_bytes());
            off += 8;
        }
        rec1[off..off + 4].copy_from_slice(&2_i32.to_ne_bytes()); // ncon
        off += 4;
        rec1[off..off + 8].copy_from_slice(&149_597_870.7_f64.to_ne_bytes()); // au
        off += 8;
        rec1[off..off + 8].copy_from_slice(&81.30056_f64.to_ne_bytes()); // emrat
        off += 8;
        // ipt: all twelve rows point at the same 4-coefficient, 1-subinterval set.
        for _ in 0..12 {
            for v in [1_i32, 4, 1] {
                rec1[off..off + 4].copy_from_slice(&v.to_ne_bytes());
                off += 4;
            }
        }
        rec1[off..off + 4].copy_from_slice(&438_i32.to_ne_bytes()); // numde
        off += 4;
        for _ in 0..3 {
            rec1[off..off + 4].copy_from_slice(&0_i32.to_ne_bytes()); // lpt
            off += 4;
        }

        let mut rec2 = vec![0_u8; recsize];
        for (i, v) in [1.5_f64, 2.5].iter().enumerate() {
            rec2[i * 8..i * 8 + 8].copy_from_slice(&v.to_ne_bytes());
        }

        // Two data records covering the full span.
        let mut data = vec![0_u8; 2 * recsize];
        let mut coeffs = vec![0.0_f64; ncoeff];
        // X component: 7 + 3*T1(tc). Y, Z zero.
        coeffs[0] = 7.0;
        coeffs[1] = 3.0;
        for rec in 0..2 {
            for (i, c) in coeffs.iter().enumerate() {
                let at = rec * recsize + i * 8;
                data[at..at + 8].copy_from_slice(&c.to_ne_bytes());
            }
        }

        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(&rec1).unwrap();
        f.write_all(&rec2).unwrap();
        f.write_all(&data).unwrap();
    }

    #[test]
    fn synthetic_file_round_trip() {
        let dir = std::env::temp_dir().join("almagest-de-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("synthetic.eph");
        synthetic_de(&path);

        let mut de = JplDeEphemeris::open(path.to_str().unwrap(), DeSeries::De438).unwrap();
        assert_eq!(de.de_number(), 438);
        let (start, stop, step) = de.span();
        assert_eq!(start, 2_451_536.5);
        assert_eq!(stop, 2_451_600.5);
        assert_eq!(step, 32.0);
        de.scrub().unwrap();

        // Every planet row holds X = 7 + 3*tc km; the Sun row is the same,
        // so heliocentric Mercury is identically zero.
        let (pos, vel) = de.compute(DeBody::Mercury, start + 16.0).unwrap();
        assert!(pos.norm() < 1e-12, "heliocentric pos {pos:?}");
        assert!(vel.norm() < 1e-12);

        // The Moon row is geocentric, so the Moon's heliocentric state
        // picks up the EMB-relative terms; it must still be finite.
        let (moon_pos, _) = de.compute(DeBody::Moon, start + 16.0).unwrap();
        assert!(moon_pos.norm().is_finite());

        // Epochs outside the span fail.
        assert!(de.compute(DeBody::Mars, start - 1.0).is_err());
        assert!(de.compute(DeBody::Mars, stop + 1.0).is_err());
        // The stop epoch itself is in range.
        assert!(de.compute(DeBody::Mars, stop).is_ok());

        de.close();
        assert!(de.compute(DeBody::Mars, start + 1.0).is_err());
        de.close(); // idempotent
    }

    #[test]
    fn mid_block_chebyshev_value() {
        let dir = std::env::temp_dir().join("almagest-de-test2");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("synthetic.eph");
        synthetic_de(&path);

        let mut de = JplDeEphemeris::open(path.to_str().unwrap(), DeSeries::De438).unwrap();
        let (start, _, step) = de.span();
        // Sun row X at mid-block (tc = 0): 7 km. Scaled by 1/au.
        let (vals, rates) = de.interpolate_components(10, 3, start + step / 2.0).unwrap();
        assert!((vals[0] - 7.0).abs() < 1e-12);
        // d/dt of 3*tc over a 32-day block: 3 * 2/32 km/day.
        assert!((rates[0] - 3.0 * 2.0 / step).abs() < 1e-12);
    }
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Packed 64-bit catalog identifiers with bidirectional string
//! conversion for ~30 astronomical catalogs.
//!
//! An identifier packs `catalog * 10^16 + number`, where each catalog
//! defines its own numeric sub-encoding (Bayer packs letter, superscript
//! and constellation; Durchmusterung packs sign, zone, number and
//! suffix; and so on). Unparseable strings yield the null identifier —
//! never an error.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

const CATALOG_FACTOR: i64 = 10_000_000_000_000_000;

/// Catalog designators. The numeric codes are stable and part of the
/// packed identifier encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i64)]
pub enum CatalogId {
    Unknown = 0,

    /// JPL planet/moon identifiers (Mercury = 1, Venus = 2, Luna = 301, ...)
    JplPlanet = 1,
    /// Numbered asteroids (Ceres = 1, Pallas = 2, ...)
    AsteroidNumber = 2,
    /// Numbered periodic comets (Halley = 1, Encke = 2, ...)
    CometNumber = 3,
    /// NORAD satellite catalog (ISS = 25544, HST = 20580, ...)
    Norad = 4,

    /// Bayer star letters (alpha CMa, ...)
    Bayer = 10,
    /// Flamsteed star numbers (9 CMa, ...)
    Flamsteed = 11,
    /// General Catalog of Variable Stars (R And, ...)
    Gcvs = 12,
    /// Harvard Revised (Yale Bright Star) catalog
    Hr = 13,
    /// Henry Draper star catalog
    Hd = 14,
    /// Smithsonian Astrophysical Observatory star catalog
    Sao = 15,
    /// Bonner Durchmusterung star catalog
    Bd = 16,
    /// Cordoba Durchmusterung star catalog
    Cd = 17,
    /// Cape Photographic Durchmusterung star catalog
    Cp = 18,
    /// Hipparcos star catalog
    Hip = 19,
    /// Washington Double Star catalog
    Wds = 20,

    /// Messier deep sky objects
    Messier = 30,
    /// Caldwell deep sky objects
    Caldwell = 31,
    /// New General Catalog of deep sky objects
    Ngc = 32,
    /// Index Catalog of deep sky objects
    Ic = 33,
    /// Melotte Catalog of open clusters
    Mel = 34,
    /// Lynds Bright Nebula catalog
    Lbn = 35,
    /// Galactic Planetary Nebulae (Strasbourg-ESO)
    Png = 36,
    /// Perek-Kohoutek Catalog (planetary nebulae)
    Pk = 37,
    /// Principal Galaxy Catalog
    Pgc = 38,
    /// Uppsala Galaxy Catalog
    Ugc = 39,
    /// Uppsala Galaxy Catalog Appendix
    Ugca = 40,

    /// Gliese-Jahreiss Nearby Star Catalog
    Gj = 41,
    /// Tycho star catalog
    Tyc = 42,
}

impl CatalogId {
    pub fn from_code(code: i64) -> Self {
        use CatalogId::*;
        match code {
            1 => JplPlanet,
            2 => AsteroidNumber,
            3 => CometNumber,
            4 => Norad,
            10 => Bayer,
            11 => Flamsteed,
            12 => Gcvs,
            13 => Hr,
            14 => Hd,
            15 => Sao,
            16 => Bd,
            17 => Cd,
            18 => Cp,
            19 => Hip,
            20 => Wds,
            30 => Messier,
            31 => Caldwell,
            32 => Ngc,
            33 => Ic,
            34 => Mel,
            35 => Lbn,
            36 => Png,
            37 => Pk,
            38 => Pgc,
            39 => Ugc,
            40 => Ugca,
            41 => Gj,
            42 => Tyc,
            _ => Unknown,
        }
    }

    /// Short designation used for index file names and display prefixes.
    pub fn designation(&self) -> &'static str {
        use CatalogId::*;
        match self {
            Unknown => "Name",
            JplPlanet => "JPL",
            AsteroidNumber => "Ast",
            CometNumber => "Com",
            Norad => "NORAD",
            Bayer => "Bayer",
            Flamsteed => "Flamsteed",
            Gcvs => "GCVS",
            Hr => "HR",
            Hd => "HD",
            Sao => "SAO",
            Bd => "BD",
            Cd => "CD",
            Cp => "CP",
            Hip => "HIP",
            Wds => "WDS",
            Messier => "M",
            Caldwell => "C",
            Ngc => "NGC",
            Ic => "IC",
            Mel => "Mel",
            Lbn => "LBN",
            Png => "PNG",
            Pk => "PK",
            Pgc => "PGC",
            Ugc => "UGC",
            Ugca => "UGCA",
            Gj => "GJ",
            Tyc => "TYC",
        }
    }

    pub fn from_designation(s: &str) -> Self {
        use CatalogId::*;
        match s {
            "JPL" => JplPlanet,
            "Ast" => AsteroidNumber,
            "Com" => CometNumber,
            "NORAD" => Norad,
            "Bayer" => Bayer,
            "Flamsteed" => Flamsteed,
            "GCVS" => Gcvs,
            "HR" => Hr,
            "HD" => Hd,
            "SAO" => Sao,
            "BD" => Bd,
            "CD" => Cd,
            "CP" => Cp,
            "HIP" => Hip,
            "WDS" => Wds,
            "M" => Messier,
            "C" => Caldwell,
            "NGC" => Ngc,
            "IC" => Ic,
            "Mel" => Mel,
            "LBN" => Lbn,
            "PNG" => Png,
            "PK" => Pk,
            "PGC" => Pgc,
            "UGC" => Ugc,
            "UGCA" => Ugca,
            "GJ" => Gj,
            "TYC" => Tyc,
            _ => Unknown,
        }
    }
}

/// A catalog identifier packed into a single 64-bit integer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(i64);

/// Multimap from identifiers to proper names, read from name tables.
pub type IdentifierNameMap = BTreeMap<Identifier, Vec<String>>;

const GREEK_LETTERS: [&str; 24] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi",
    "psi", "omega",
];

const CONSTELLATIONS: [&str; 88] = [
    "And", "Ant", "Aps", "Aqr", "Aql", "Ara", "Ari", "Aur", "Boo", "Cae", "Cam", "Cnc", "CVn",
    "CMa", "CMi", "Cap", "Car", "Cas", "Cen", "Cep", "Cet", "Cha", "Cir", "Col", "Com", "CrA",
    "CrB", "Crv", "Crt", "Cru", "Cyg", "Del", "Dor", "Dra", "Equ", "Eri", "For", "Gem", "Gru",
    "Her", "Hor", "Hya", "Hyi", "Ind", "Lac", "Leo", "LMi", "Lep", "Lib", "Lup", "Lyn", "Lyr",
    "Men", "Mic", "Mon", "Mus", "Nor", "Oct", "Oph", "Ori", "Pav", "Peg", "Per", "Phe", "Pic",
    "Psc", "PsA", "Pup", "Pyx", "Ret", "Sge", "Sgr", "Sco", "Scl", "Sct", "Ser", "Sex", "Tau",
    "Tel", "Tri", "TrA", "Tuc", "UMa", "UMi", "Vel", "Vir", "Vol", "Vul",
];

impl Identifier {
    pub const NULL: Identifier = Identifier(0);

    pub fn new(catalog: CatalogId, number: i64) -> Self {
        Self(catalog as i64 * CATALOG_FACTOR + number)
    }

    pub fn catalog(&self) -> CatalogId {
        CatalogId::from_code(self.0 / CATALOG_FACTOR)
    }

    pub fn number(&self) -> i64 {
        self.0 % CATALOG_FACTOR
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Parses an identifier from its textual form. Unparseable strings
    /// yield the null identifier.
    pub fn parse(s: &str) -> Self {
        let s = normalize(s);
        let len = s.len();
        if len == 0 {
            return Self::NULL;
        }

        // A number in parentheses is an asteroid number.
        if s.starts_with('(') && s.ends_with(')') {
            if let Some(n) = leading_int(&s[1..len - 1]) {
                if n > 0 {
                    return Self::new(CatalogId::AsteroidNumber, n);
                }
            }
        }

        // A number followed by "P" is a periodic comet number. The "P"
        // must end the designation (or introduce a "/Name" suffix) so
        // Flamsteed stars like "1 Peg" are not swallowed here.
        if let Some(pos) = s.find('P') {
            let tail_ok = matches!(s.as_bytes().get(pos + 1), None | Some(b'/'));
            if tail_ok {
                if let Some(n) = full_int(&s[..pos]) {
                    if n > 0 {
                        return Self::new(CatalogId::CometNumber, n);
                    }
                }
            }
        }

        if let Some(rest) = s.strip_prefix('M') {
            if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                if let Some(m) = leading_int(rest) {
                    if (1..=110).contains(&m) {
                        return Self::new(CatalogId::Messier, m);
                    }
                }
            }
        }

        if let Some(rest) = s.strip_prefix('C') {
            if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                if let Some(c) = leading_int(rest) {
                    if (1..=109).contains(&c) {
                        return Self::new(CatalogId::Caldwell, c);
                    }
                }
            }
        }

        if let Some(rest) = s.strip_prefix("NGC") {
            if let Some(ngc) = parse_ngcic(rest) {
                return Self::new(CatalogId::Ngc, ngc);
            }
        }

        if let Some(rest) = s.strip_prefix("IC") {
            if let Some(ic) = parse_ngcic(rest) {
                return Self::new(CatalogId::Ic, ic);
            }
        }

        if let Some(rest) = s.strip_prefix("Mel") {
            if let Some(mel) = leading_int(skip_to_digit(rest)) {
                return Self::new(CatalogId::Mel, mel);
            }
        }

        if let Some(rest) = s.strip_prefix("LBN") {
            if let Some(lbn) = leading_int(rest.trim_start()) {
                if lbn > 0 {
                    return Self::new(CatalogId::Lbn, lbn);
                }
            }
        }

        if let Some(rest) = s.strip_prefix("PNG") {
            if let Some(png) = parse_png_pk(rest) {
                return Self::new(CatalogId::Png, png);
            }
        }

        if let Some(rest) = s.strip_prefix("PK") {
            if let Some(pk) = parse_png_pk(rest) {
                return Self::new(CatalogId::Pk, pk);
            }
        }

        if let Some(rest) = s.strip_prefix("PGC") {
            if let Some(pgc) = leading_int(rest.trim_start()) {
                if pgc > 0 {
                    return Self::new(CatalogId::Pgc, pgc);
                }
            }
        }

        if let Some(rest) = s.strip_prefix("UGCA") {
            if let Some(n) = leading_int(rest.trim_start()) {
                if n > 0 {
                    return Self::new(CatalogId::Ugca, n);
                }
            }
        }

        if let Some(rest) = s.strip_prefix("UGC") {
            if let Some(n) = leading_int(rest.trim_start()) {
                if n > 0 {
                    return Self::new(CatalogId::Ugc, n);
                }
            }
        }

        if let Some(rest) = s.strip_prefix("TYC") {
            if let Some(tyc) = parse_tyc(rest) {
                return Self::new(CatalogId::Tyc, tyc);
            }
        }

        for (prefix, cat) in [
            ("HR", CatalogId::Hr),
            ("HD", CatalogId::Hd),
            ("SAO", CatalogId::Sao),
            ("HIP", CatalogId::Hip),
        ] {
            if s.starts_with(prefix) {
                if let Some(n) = leading_int(skip_to_digit(&s)) {
                    return Self::new(cat, n);
                }
            }
        }

        // "SD" (Southern Durchmusterung, found in SKY2000) also maps to BD.
        for (prefixes, cat) in [
            (&["BD", "SD"][..], CatalogId::Bd),
            (&["CD"][..], CatalogId::Cd),
            (&["CP"][..], CatalogId::Cp),
        ] {
            if prefixes.iter().any(|p| s.starts_with(p)) {
                if let Some(pos) = s.find(['+', '-']) {
                    if let Some(dm) = parse_dm(&s[pos..]) {
                        return Self::new(cat, dm);
                    }
                }
            }
        }

        if let Some(rest) = s.strip_prefix("WDS") {
            if let Some(wds) = parse_wds(rest.trim_start()) {
                return Self::new(CatalogId::Wds, wds);
            }
        }

        if let Some(rest) = s.strip_prefix("GJ") {
            if let Some(gj) = parse_gj(rest.trim_start()) {
                return Self::new(CatalogId::Gj, gj);
            }
        }

        // An all-digit string is a NORAD satellite number.
        if s.chars().all(|c| c.is_ascii_digit()) {
            if let Some(n) = full_int(&s) {
                if n > 0 {
                    return Self::new(CatalogId::Norad, n);
                }
            }
        }

        // The remaining forms end in a three-letter constellation
        // abbreviation: GCVS variable designations, Flamsteed numbers,
        // and Bayer letters (with optional superscript).
        let con = if len >= 3 {
            constellation_number(&s[len - 3..])
        } else {
            0
        };
        if con == 0 {
            return Self::NULL;
        }

        let prefix = s.split_whitespace().next().unwrap_or("");

        let var = gcvs_to_number(prefix);
        if var > 0 {
            return Self::new(CatalogId::Gcvs, var * 100 + con);
        }

        let num_start = s.find(|c: char| c.is_ascii_digit());
        let num = num_start
            .and_then(|start| leading_int(&s[start..]))
            .unwrap_or(0);

        if num_start == Some(0) {
            return Self::new(CatalogId::Flamsteed, num * 100 + con);
        }

        let bayer_str = match num_start {
            Some(start) => &s[..start],
            None => prefix,
        };
        let bay = bayer_to_number(bayer_str.trim());
        if bay > 0 {
            return Self::new(CatalogId::Bayer, (bay * 100 + num) * 100 + con);
        }

        Self::NULL
    }

    /// Reads an identifier-to-name table: CSV rows of
    /// `Name,ident[,ident...]`. Returns the number of pairs inserted.
    pub fn import_name_map<R: std::io::BufRead>(reader: R, map: &mut IdentifierNameMap) -> usize {
        let mut count = 0;
        for line in reader.lines().map_while(Result::ok) {
            let mut tokens = line.split(',');
            let name = match tokens.next() {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            for token in tokens {
                let ident = Identifier::parse(token);
                if !ident.is_null() {
                    map.entry(ident).or_default().push(name.clone());
                    count += 1;
                }
            }
        }
        count
    }
}

impl FromStr for Identifier {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CatalogId::*;
        let id = self.number();
        match self.catalog() {
            Bayer => {
                let bay = id / 10_000;
                let num = (id - bay * 10_000) / 100;
                let con = (id % 100) as usize;
                let constr = CONSTELLATIONS.get(con.wrapping_sub(1)).unwrap_or(&"");
                if num > 0 {
                    write!(f, "{}{} {}", bayer_to_string(bay), num, constr)
                } else {
                    write!(f, "{} {}", bayer_to_string(bay), constr)
                }
            }
            Flamsteed => {
                let con = (id % 100) as usize;
                let constr = CONSTELLATIONS.get(con.wrapping_sub(1)).unwrap_or(&"");
                write!(f, "{} {}", id / 100, constr)
            }
            Gcvs => {
                let con = (id % 100) as usize;
                let constr = CONSTELLATIONS.get(con.wrapping_sub(1)).unwrap_or(&"");
                write!(f, "{} {}", gcvs_to_string(id / 100), constr)
            }
            Hr => write!(f, "HR {id}"),
            Hd => write!(f, "HD {id}"),
            Sao => write!(f, "SAO {id}"),
            Hip => write!(f, "HIP {id}"),
            Bd => write!(f, "BD {}", dm_to_string(id)),
            Cd => write!(f, "CD {}", dm_to_string(id)),
            Cp => write!(f, "CP {}", dm_to_string(id)),
            Wds => write!(f, "WDS {}", wds_to_string(id)),
            Gj => write!(f, "GJ {}", gj_to_string(id)),
            Tyc => write!(f, "TYC {}", tyc_to_string(id)),
            Messier => write!(f, "M {id}"),
            Caldwell => write!(f, "C {id}"),
            Ngc => write!(f, "NGC {}", ngcic_to_string(id)),
            Ic => write!(f, "IC {}", ngcic_to_string(id)),
            Mel => write!(f, "Mel {id}"),
            Lbn => write!(f, "LBN {id}"),
            Png => write!(f, "PNG {}", png_pk_to_string(id, true)),
            Pk => write!(f, "PK {}", png_pk_to_string(id, false)),
            Pgc => write!(f, "PGC {id}"),
            Ugc => write!(f, "UGC {id}"),
            Ugca => write!(f, "UGCA {id}"),
            AsteroidNumber => write!(f, "({id})"),
            CometNumber => write!(f, "{id}P"),
            Norad => write!(f, "{id}"),
            JplPlanet | Unknown => write!(f, "{id}"),
        }
    }
}

/// Cleans the quirks of catalog source files: underscores become spaces,
/// `_A`/`_B` component suffixes are dropped, `mu.`/`nu.`/`xi.` style
/// punctuation is stripped, and `ksi` is the GCVS spelling of `xi`.
fn normalize(s: &str) -> String {
    let mut s = s.trim().to_string();
    for suffix in ["_A", "_B", "_C"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.to_string();
        }
    }
    s = s.replace('_', " ");
    // Bayer "mu." style punctuation: a period directly after letters is
    // dropped; decimal points inside numbers (GJ, PNG) are kept.
    if let Some(pos) = s.find('.') {
        if pos > 0
            && s.as_bytes()[pos - 1].is_ascii_alphabetic()
            && s.as_bytes().get(pos + 1).map_or(true, |c| *c == b' ')
        {
            s.remove(pos);
        }
    }
    if let Some(rest) = s.strip_prefix("ksi") {
        s = format!("xi{rest}");
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn skip_to_digit(s: &str) -> &str {
    match s.find(|c: char| c.is_ascii_digit()) {
        Some(pos) => &s[pos..],
        None => "",
    }
}

/// Parses the integer prefix of a string (after trimming), ignoring
/// any trailing junk. None if there are no leading digits.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    s[..end].parse().ok()
}

fn full_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn constellation_number(abbrev: &str) -> i64 {
    CONSTELLATIONS
        .iter()
        .position(|&c| c == abbrev)
        .map(|i| i as i64 + 1)
        .unwrap_or(0)
}

fn bayer_to_number(s: &str) -> i64 {
    let len = s.len();
    if len == 1 {
        let c = s.as_bytes()[0];
        if c.is_ascii_lowercase() {
            return (c - b'a') as i64 + 25;
        } else if (b'A'..b'R').contains(&c) {
            return (c - b'A') as i64 + 51;
        }
        return 0;
    }
    for (i, name) in GREEK_LETTERS.iter().enumerate() {
        if name.len() >= len && &name[..len] == s {
            return i as i64 + 1;
        }
    }
    0
}

fn bayer_to_string(bay: i64) -> String {
    if bay > 50 {
        ((bay - 51 + 'A' as i64) as u8 as char).to_string()
    } else if bay > 24 {
        ((bay - 25 + 'a' as i64) as u8 as char).to_string()
    } else if (1..=24).contains(&bay) {
        GREEK_LETTERS[(bay - 1) as usize].to_string()
    } else {
        String::new()
    }
}

/// Encodes a GCVS variable-star designation following the Argelander
/// sequence: R..Z, RR..ZZ, AA..QZ (J skipped), then V335, V336, ...
fn gcvs_to_number(s: &str) -> i64 {
    let bytes = s.as_bytes();
    let len = bytes.len();

    if len == 1 && (b'R'..=b'Z').contains(&bytes[0]) {
        return (bytes[0] - b'R') as i64 + 1;
    }

    if len == 2
        && (b'R'..=b'Z').contains(&bytes[0])
        && bytes[1] >= bytes[0]
        && bytes[1] <= b'Z'
    {
        let n1 = (bytes[0] - b'R') as i64;
        let n2 = (bytes[1] - b'R') as i64;
        return n1 * 9 - (n1 - 1) * n1 / 2 + (n2 - n1) + 10;
    }

    if len == 2
        && (b'A'..b'R').contains(&bytes[0])
        && bytes[0] != b'J'
        && bytes[1] >= bytes[0]
        && bytes[1] <= b'Z'
        && bytes[1] != b'J'
    {
        let mut n1 = (bytes[0] - b'A') as i64;
        let mut n2 = (bytes[1] - b'A') as i64;
        // J is skipped
        if bytes[0] >= b'K' {
            n1 -= 1;
        }
        if bytes[1] >= b'K' {
            n2 -= 1;
        }
        return n1 * 25 - (n1 - 1) * n1 / 2 + (n2 - n1) + 55;
    }

    if len > 3 && bytes[0] == b'V' && bytes[1].is_ascii_digit() {
        return full_int(&s[1..]).unwrap_or(0);
    }

    0
}

/// Inverse of `gcvs_to_number`; J is skipped symmetrically.
fn gcvs_to_string(n: i64) -> String {
    if n <= 0 {
        return String::new();
    }
    if n < 10 {
        return (((b'R' + n as u8 - 1) as char)).to_string();
    }
    if n < 55 {
        let n0 = n - 10;
        let mut n1 = 0_i64;
        let mut n2 = 9_i64;
        while n2 <= n0 {
            n1 += 1;
            n2 += 9 - n1;
        }
        let n2 = n0 - n2 + 9;
        return format!(
            "{}{}",
            (b'R' + n1 as u8) as char,
            (b'R' + n2 as u8) as char
        );
    }
    if n < 335 {
        let n0 = n - 55;
        let mut n1 = 0_i64;
        let mut n2 = 25_i64;
        while n2 <= n0 {
            n1 += 1;
            n2 += 25 - n1;
        }
        let mut n2 = n0 - n2 + 25;
        // J is skipped
        if n1 >= (b'J' - b'A') as i64 {
            n1 += 1;
        }
        if n2 >= (b'J' - b'A') as i64 {
            n2 += 1;
        }
        return format!(
            "{}{}",
            (b'A' + n1 as u8) as char,
            (b'A' + n2 as u8) as char
        );
    }
    format!("V{n}")
}

/// Durchmusterung `{+|-}ZZ NNNN[suffix]`, suffix one of a, b, n, p, s.
fn parse_dm(s: &str) -> Option<i64> {
    let s = s.trim();
    let mut chars = s.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => 0,
        _ => return None,
    };
    let rest = chars.as_str().trim_start();
    let zone = leading_int(rest)?;
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = rest.trim_start();
    let num = leading_int(rest)?;
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    let suffix = match rest.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a') => 1,
        Some('b') => 2,
        Some('n') => 3,
        Some('p') => 4,
        Some('s') => 5,
        _ => 0,
    };
    Some(sign * 100_000_000 + zone * 1_000_000 + num * 10 + suffix)
}

fn dm_to_string(dm: i64) -> String {
    let sign = dm / 100_000_000;
    let zone = (dm - sign * 100_000_000) / 1_000_000;
    let num = (dm - sign * 100_000_000 - zone * 1_000_000) / 10;
    let suffix = dm % 10;

    let sign_ch = if sign != 0 { '+' } else { '-' };
    let suffix_ch = match suffix {
        1 => "a",
        2 => "b",
        3 => "n",
        4 => "p",
        5 => "s",
        _ => "",
    };
    format!("{sign_ch}{zone:02} {num}{suffix_ch}")
}

/// WDS coordinate designation `HHMMM{+|-}DDMM`.
fn parse_wds(s: &str) -> Option<i64> {
    let pos = s.find(['+', '-'])?;
    let ra = full_int(&s[..pos])?;
    let sign = if s.as_bytes()[pos] == b'+' { 1 } else { 0 };
    let dec = full_int(&s[pos + 1..])?;
    if (0..24_000).contains(&ra) && (0..9_000).contains(&dec) {
        Some(ra * 100_000 + sign * 10_000 + dec)
    } else {
        None
    }
}

fn wds_to_string(wds: i64) -> String {
    let ra = wds / 100_000;
    let sign = (wds - ra * 100_000) / 10_000;
    let dec = wds % 10_000;
    format!("{:05}{}{:04}", ra, if sign != 0 { '+' } else { '-' }, dec)
}

/// GJ decimal number plus optional component letters (A, B, C, AB, AC, BC).
fn parse_gj(s: &str) -> Option<i64> {
    let comp_pos = s.find(['A', 'B', 'C']);
    let comps = comp_pos.map(|p| s[p..].trim()).unwrap_or("");
    let num_str = comp_pos.map(|p| &s[..p]).unwrap_or(s).trim();
    let value: f64 = num_str.parse().ok()?;
    let d = (value * 10.0 + 0.1) as i64;
    if d <= 0 {
        return None;
    }
    let c = match comps {
        "A" => 1,
        "B" => 2,
        "C" => 3,
        "AB" => 4,
        "AC" => 5,
        "BC" => 6,
        _ => 0,
    };
    Some(10 * d + c)
}

fn gj_to_string(gj: i64) -> String {
    let d = gj / 10;
    let c = (gj % 10) as usize;
    const COMPS: [&str; 7] = ["", "A", "B", "C", "AB", "AC", "BC"];
    let comps = COMPS.get(c).unwrap_or(&"");
    if d % 10 == 0 {
        format!("{}{}", d / 10, comps)
    } else {
        format!("{:.1}{}", d as f64 / 10.0, comps)
    }
}

/// NGC/IC number with an optional A-I extension letter.
fn parse_ngcic(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let num = leading_int(s)?;
    let rest = s.trim_start_matches(|c: char| c.is_ascii_digit() || c == ' ');
    let ext = match rest.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c @ 'A'..='I') => c as i64 - 'A' as i64 + 1,
        _ => 0,
    };
    if (0..=7840).contains(&num) && num > 0 {
        Some(num * 10 + ext)
    } else {
        None
    }
}

fn ngcic_to_string(ngcic: i64) -> String {
    let num = ngcic / 10;
    let ext = ngcic % 10;
    if ext > 0 {
        format!("{}{}", num, (b'A' + ext as u8 - 1) as char)
    } else {
        format!("{num}")
    }
}

/// Galactic planetary nebula designation `LLL.L{+|-}BB.B`.
fn parse_png_pk(s: &str) -> Option<i64> {
    let mut s = s.trim().to_string();
    // Some PK listings put a space where the latitude decimal point goes.
    if s.len() >= 2 {
        let pos = s.len() - 2;
        if s.as_bytes()[pos] == b' ' {
            s.replace_range(pos..pos + 1, ".");
        }
    }
    let sep = s.rfind(['+', '-'])?;
    if sep == 0 {
        return None;
    }
    let lon: f64 = s[..sep].trim().parse().ok()?;
    let sign = if s.as_bytes()[sep] == b'+' { 1 } else { 0 };
    let lat: f64 = s[sep + 1..].trim().parse().ok()?;
    let londec = (lon * 10.0 + 0.1) as i64;
    let latdec = (lat * 10.0 + 0.1) as i64;
    if (0..3600).contains(&londec) && (0..900).contains(&latdec) {
        Some(londec * 10_000 + sign * 1_000 + latdec)
    } else {
        None
    }
}

fn png_pk_to_string(id: i64, is_png: bool) -> String {
    let londec = id / 10_000;
    let sign = (id - londec * 10_000) / 1_000;
    let latdec = id % 1_000;
    let sign_ch = if sign != 0 { '+' } else { '-' };
    if is_png {
        format!("{:05.1}{}{:04.1}", londec as f64 / 10.0, sign_ch, latdec as f64 / 10.0)
    } else {
        format!("{:03.0}{}{:04.1}", londec as f64 / 10.0, sign_ch, latdec as f64 / 10.0)
    }
}

/// Tycho designation `RRRR-NNNNN-C`.
fn parse_tyc(s: &str) -> Option<i64> {
    let mut parts = s.trim().split('-');
    let t1 = full_int(parts.next()?)?;
    let t2 = full_int(parts.next()?)?;
    let t3 = parts.next().and_then(full_int).unwrap_or(1);
    if (1..=9537).contains(&t1) && t2 > 0 && t2 < 100_000 && (1..=3).contains(&t3) {
        Some((t1 * 100_000 + t2) * 10 + t3)
    } else {
        None
    }
}

fn tyc_to_string(tyc: i64) -> String {
    let t3 = tyc % 10;
    let t2 = (tyc / 10) % 100_000;
    let t1 = tyc / 1_000_000;
    format!("{t1}-{t2}-{t3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bayer_parse_and_format() {
        let sirius = Identifier::parse("alpha CMa");
        assert_eq!(sirius.catalog(), CatalogId::Bayer);
        assert_eq!(sirius.number(), (1 * 100 + 0) * 100 + 14);
        assert_eq!(sirius.to_string(), "alpha CMa");

        // Abbreviated Greek letters and superscripts.
        let alp2 = Identifier::parse("alp2 Cen");
        assert_eq!(alp2.catalog(), CatalogId::Bayer);
        assert_eq!(alp2.to_string(), "alpha2 Cen");

        // ksi is the GCVS spelling of xi.
        assert_eq!(Identifier::parse("ksi Per"), Identifier::parse("xi Per"));

        // Single-letter Bayer forms.
        assert_eq!(Identifier::parse("h Per").catalog(), CatalogId::Bayer);
        assert_eq!(Identifier::parse("G Sco").catalog(), CatalogId::Bayer);
    }

    #[test]
    fn underscores_and_components_normalize() {
        assert_eq!(
            Identifier::parse("alpha_CMa"),
            Identifier::parse("alpha CMa")
        );
        assert_eq!(
            Identifier::parse("mu. Cep"),
            Identifier::parse("mu Cep")
        );
        assert_eq!(
            Identifier::parse("alpha Cen_A"),
            Identifier::parse("alpha Cen")
        );
    }

    #[rstest]
    #[case("HD 48915", CatalogId::Hd, 48915)]
    #[case("HR 2491", CatalogId::Hr, 2491)]
    #[case("SAO 151881", CatalogId::Sao, 151881)]
    #[case("HIP 32349", CatalogId::Hip, 32349)]
    #[case("M 31", CatalogId::Messier, 31)]
    #[case("C 14", CatalogId::Caldwell, 14)]
    #[case("PGC 2557", CatalogId::Pgc, 2557)]
    #[case("UGC 454", CatalogId::Ugc, 454)]
    #[case("UGCA 86", CatalogId::Ugca, 86)]
    #[case("Mel 25", CatalogId::Mel, 25)]
    #[case("LBN 974", CatalogId::Lbn, 974)]
    #[case("(1)", CatalogId::AsteroidNumber, 1)]
    #[case("1P", CatalogId::CometNumber, 1)]
    #[case("25544", CatalogId::Norad, 25544)]
    fn simple_catalogs(#[case] s: &str, #[case] cat: CatalogId, #[case] num: i64) {
        let ident = Identifier::parse(s);
        assert_eq!(ident.catalog(), cat, "{s}");
        assert_eq!(ident.number(), num, "{s}");
    }

    #[rstest]
    #[case("HD 48915")]
    #[case("HR 2491")]
    #[case("HIP 32349")]
    #[case("M 31")]
    #[case("NGC 1976")]
    #[case("NGC 6302B")]
    #[case("IC 434")]
    #[case("BD +04 3561")]
    #[case("CD -45 1234a")]
    #[case("WDS 06451-1643")]
    #[case("GJ 551")]
    #[case("GJ 559AB")]
    #[case("TYC 5949-2777-1")]
    #[case("PNG 036.1-57.1")]
    #[case("alpha CMa")]
    #[case("61 Cyg")]
    #[case("RR Lyr")]
    #[case("V1500 Cyg")]
    #[case("(433)")]
    #[case("2P")]
    fn string_round_trip(#[case] s: &str) {
        let ident = Identifier::parse(s);
        assert!(!ident.is_null(), "{s} failed to parse");
        assert_eq!(Identifier::parse(&ident.to_string()), ident, "{s}");
    }

    #[test]
    fn gcvs_argelander_sequence() {
        assert_eq!(gcvs_to_number("R"), 1);
        assert_eq!(gcvs_to_number("Z"), 9);
        assert_eq!(gcvs_to_number("RR"), 10);
        assert_eq!(gcvs_to_number("RZ"), 18);
        assert_eq!(gcvs_to_number("SS"), 19);
        assert_eq!(gcvs_to_number("ZZ"), 54);
        assert_eq!(gcvs_to_number("AA"), 55);
        assert_eq!(gcvs_to_number("QZ"), 334);
        // J is skipped in both positions.
        assert_eq!(gcvs_to_number("JK"), 0);
        assert_eq!(gcvs_to_number("AJ"), 0);
        assert_eq!(gcvs_to_number("V335"), 335);
    }

    #[test]
    fn gcvs_full_sequence_round_trips() {
        for n in 1..=334 {
            let s = gcvs_to_string(n);
            assert!(!s.contains('J'), "GCVS {n} produced {s}");
            assert_eq!(gcvs_to_number(&s), n, "GCVS {n} / {s}");
        }
        assert_eq!(gcvs_to_number(&gcvs_to_string(1500)), 1500);
    }

    #[test]
    fn flamsteed_with_constellation() {
        let ident = Identifier::parse("61 Cyg");
        assert_eq!(ident.catalog(), CatalogId::Flamsteed);
        assert_eq!(ident.number() / 100, 61);
        assert_eq!(ident.to_string(), "61 Cyg");
    }

    #[test]
    fn durchmusterung_packing() {
        let ident = Identifier::parse("BD +04 3561");
        assert_eq!(ident.catalog(), CatalogId::Bd);
        assert_eq!(ident.number(), 1 * 100_000_000 + 4 * 1_000_000 + 3561 * 10);
        // SD parses as BD.
        assert_eq!(Identifier::parse("SD -12 345").catalog(), CatalogId::Bd);
    }

    #[test]
    fn unparseable_yields_null() {
        assert!(Identifier::parse("").is_null());
        assert!(Identifier::parse("Betelgeuse").is_null());
        assert!(Identifier::parse("XYZ Nowhere").is_null());
    }

    #[test]
    fn name_map_import() {
        let data = "Sirius,alpha CMa,HR 2491,HD 48915\nVega,alpha Lyr\n";
        let mut map = IdentifierNameMap::new();
        let n = Identifier::import_name_map(std::io::Cursor::new(data), &mut map);
        assert_eq!(n, 4);
        let names = map.get(&Identifier::parse("HD 48915")).unwrap();
        assert_eq!(names, &vec!["Sirius".to_string()]);
    }
}

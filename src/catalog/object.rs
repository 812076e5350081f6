/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The polymorphic celestial-object record.
//!
//! Every object carries a type code, names, sorted identifiers, and the
//! apparent direction/distance/magnitude updated by `compute_ephemeris`.
//! The type-specific payload is a tagged record with optional
//! double-star, variable-star, and deep-sky substructures rather than a
//! class hierarchy, so a double-variable star is simply a star with
//! both substructures populated.

use crate::catalog::identifier::{CatalogId, Identifier};
use crate::catalog::planet::PlanetData;
use crate::catalog::star::{DeepSkyData, DoubleData, StarData, VariableData};
use crate::constants::{J2000, LIGHT_KM_PER_SEC, LY_PER_PARSEC, PARSEC_PER_LY};
use crate::coords::Coordinates;
use crate::errors::CatalogError;
use crate::math::angles::{
    Angle, DegMinSec, HourMinSec, ARCMIN_PER_RAD, ARCSEC_PER_RAD, RAD_PER_ARCSEC, TWO_PI,
};
use crate::math::spherical::Spherical;
use crate::math::Vector3;
use crate::orbit::Orbit;
use crate::time::Time;

/// Recognized astronomical object types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Nonexistent/unknown object or erroneous catalog entry
    Nonexistent,
    /// Major planet (Mercury, Venus, etc.)
    Planet,
    /// Natural satellite (Moon, Io, Europa, etc.)
    Moon,
    /// Minor planet (Ceres, Pallas, etc.)
    Asteroid,
    /// Comet (Halley, Encke, etc.)
    Comet,
    /// Artificial satellite (ISS, HST, etc.)
    Satellite,
    /// Interplanetary spacecraft (Voyager, Cassini, etc.)
    Spacecraft,
    /// Single star
    Star,
    /// Double star
    DoubleStar,
    /// Variable single star
    VariableStar,
    /// Double star with a variable component
    DoubleVariableStar,
    OpenCluster,
    GlobularCluster,
    /// Emission or reflection nebula, or supernova remnant
    BrightNebula,
    DarkNebula,
    PlanetaryNebula,
    Galaxy,
    /// Constellation officially recognized by the IAU
    Constellation,
    /// Informally recognized star pattern (Big Dipper, etc.)
    Asterism,
}

impl ObjectType {
    /// Two-character type code used as the first CSV column.
    pub fn code(&self) -> &'static str {
        use ObjectType::*;
        match self {
            Nonexistent => "NO",
            Planet => "PL",
            Moon => "MN",
            Asteroid => "AS",
            Comet => "CM",
            Satellite => "ST",
            Spacecraft => "SC",
            Star => "SS",
            DoubleStar => "DS",
            VariableStar => "VS",
            DoubleVariableStar => "DV",
            OpenCluster => "OC",
            GlobularCluster => "GC",
            BrightNebula => "BN",
            DarkNebula => "DN",
            PlanetaryNebula => "PN",
            Galaxy => "GX",
            Constellation => "CN",
            Asterism => "AM",
        }
    }

    pub fn from_code(code: &str) -> Self {
        use ObjectType::*;
        match code {
            "PL" => Planet,
            "MN" => Moon,
            "AS" => Asteroid,
            "CM" => Comet,
            "ST" => Satellite,
            "SC" => Spacecraft,
            "SS" => Star,
            "DS" => DoubleStar,
            "VS" => VariableStar,
            "DV" => DoubleVariableStar,
            "OC" => OpenCluster,
            "GC" => GlobularCluster,
            "BN" => BrightNebula,
            "DN" => DarkNebula,
            "PN" => PlanetaryNebula,
            "GX" => Galaxy,
            "CN" => Constellation,
            "AM" => Asterism,
            _ => Nonexistent,
        }
    }

    pub fn is_stellar(&self) -> bool {
        use ObjectType::*;
        matches!(
            self,
            Star | DoubleStar
                | VariableStar
                | DoubleVariableStar
                | OpenCluster
                | GlobularCluster
                | BrightNebula
                | DarkNebula
                | PlanetaryNebula
                | Galaxy
                | Constellation
                | Asterism
        )
    }

    pub fn is_solar_system(&self) -> bool {
        use ObjectType::*;
        matches!(self, Planet | Moon | Asteroid | Comet | Satellite | Spacecraft)
    }
}

/// Type-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectData {
    Star(StarData),
    Planet(PlanetData),
}

/// A celestial object: the common attributes plus the tagged payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    object_type: ObjectType,
    pub names: Vec<String>,
    identifiers: Vec<Identifier>,
    /// Apparent direction as a unit vector in the fundamental frame
    pub direction: Vector3,
    /// Distance in AU; infinite if unknown
    pub distance: f64,
    /// Apparent visual magnitude; infinite if unknown
    pub magnitude: f64,
    pub data: ObjectData,
}

impl Object {
    /// Creates an empty object of the given type. The type cannot change
    /// after construction.
    pub fn new(object_type: ObjectType) -> Self {
        let data = if object_type.is_solar_system() {
            ObjectData::Planet(PlanetData::default())
        } else {
            let mut star = StarData::default();
            match object_type {
                ObjectType::DoubleStar => star.double = Some(DoubleData::default()),
                ObjectType::VariableStar => star.variable = Some(VariableData::default()),
                ObjectType::DoubleVariableStar => {
                    star.double = Some(DoubleData::default());
                    star.variable = Some(VariableData::default());
                }
                t if t.is_stellar() && t != ObjectType::Star => {
                    star.deep_sky = Some(DeepSkyData::default())
                }
                _ => {}
            }
            ObjectData::Star(star)
        };
        Self {
            object_type,
            names: Vec::new(),
            identifiers: Vec::new(),
            direction: Vector3::repeat(f64::INFINITY),
            distance: f64::INFINITY,
            magnitude: f64::INFINITY,
            data,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn name(&self, i: usize) -> &str {
        self.names.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Returns this object's identifier in the given catalog, or the
    /// null identifier if it has none there.
    pub fn identifier(&self, catalog: CatalogId) -> Identifier {
        self.identifiers
            .iter()
            .copied()
            .find(|ident| ident.catalog() == catalog)
            .unwrap_or(Identifier::NULL)
    }

    /// Adds an identifier if it is valid and not already present,
    /// keeping the set sorted. Returns whether it was added.
    pub fn add_identifier(&mut self, ident: Identifier) -> bool {
        if ident.is_null() || self.identifiers.contains(&ident) {
            return false;
        }
        self.identifiers.push(ident);
        self.identifiers.sort();
        true
    }

    pub fn set_identifiers(&mut self, mut idents: Vec<Identifier>) {
        idents.retain(|i| !i.is_null());
        idents.sort();
        idents.dedup();
        self.identifiers = idents;
    }

    pub fn star(&self) -> Option<&StarData> {
        match &self.data {
            ObjectData::Star(star) => Some(star),
            _ => None,
        }
    }

    pub fn star_mut(&mut self) -> Option<&mut StarData> {
        match &mut self.data {
            ObjectData::Star(star) => Some(star),
            _ => None,
        }
    }

    pub fn planet(&self) -> Option<&PlanetData> {
        match &self.data {
            ObjectData::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    pub fn planet_mut(&mut self) -> Option<&mut PlanetData> {
        match &mut self.data {
            ObjectData::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    /// Updates the apparent direction, distance, and magnitude for the
    /// observer in `coords`. Double stars with a binary orbit are
    /// finished by `apply_binary_orbit` once their primary is known.
    pub fn compute_ephemeris(&mut self, coords: &Coordinates) {
        match &mut self.data {
            ObjectData::Star(star) => {
                let (direction, distance, magnitude) = star.apparent_place(coords);
                self.direction = direction;
                self.distance = distance;
                self.magnitude = magnitude;
            }
            ObjectData::Planet(planet) => {
                let ident = self
                    .identifiers
                    .iter()
                    .copied()
                    .find(|i| {
                        matches!(
                            i.catalog(),
                            CatalogId::JplPlanet
                                | CatalogId::AsteroidNumber
                                | CatalogId::CometNumber
                                | CatalogId::Norad
                        )
                    })
                    .unwrap_or(Identifier::NULL);
                match planet.apparent_place(ident, coords) {
                    Some((direction, distance, magnitude)) => {
                        self.direction = direction;
                        self.distance = distance;
                        self.magnitude = magnitude;
                    }
                    None => {
                        self.direction = Vector3::repeat(f64::INFINITY);
                        self.distance = f64::INFINITY;
                        self.magnitude = f64::INFINITY;
                    }
                }
            }
        }
    }

    /// Apparent angular motion in the given frame for a stellar object
    /// whose ephemeris has been computed; None for solar-system bodies.
    pub fn apparent_motion(
        &self,
        coords: &Coordinates,
        frame: crate::coords::Frame,
    ) -> Option<crate::math::spherical::Spherical> {
        self.star()
            .map(|star| star.apparent_motion(coords, frame, &self.direction, self.distance))
    }

    /// Places a binary companion relative to its primary's already
    /// computed apparent direction, by propagating the binary orbit and
    /// offsetting on the tangent plane. Aberration is not reapplied; the
    /// primary's direction already carries it.
    pub fn apply_binary_orbit(&mut self, coords: &Coordinates, primary: &Object) {
        let (direction, distance) = {
            let star = match self.star() {
                Some(star) => star,
                None => return,
            };
            let double = match &star.double {
                Some(double) => double,
                None => return,
            };
            let offset = match double.companion_offset(coords.jed()) {
                Some(offset) => offset,
                None => return,
            };
            (
                (primary.direction + offset).normalize(),
                primary.distance,
            )
        };
        self.direction = direction;
        self.distance = distance;
        if let Some(star) = self.star() {
            self.magnitude = if star.vmag.is_finite() { star.vmag } else { star.bmag };
        }
    }

    /// Serializes this object as one CSV row (§ region file format).
    pub fn to_csv(&self) -> Vec<String> {
        let mut fields = vec![self.object_type.code().to_string()];
        match &self.data {
            ObjectData::Star(star) => {
                self.star_csv(star, &mut fields);
            }
            ObjectData::Planet(planet) => {
                self.planet_csv(planet, &mut fields);
            }
        }
        for ident in &self.identifiers {
            fields.push(ident.to_string());
        }
        for name in &self.names {
            fields.push(name.clone());
        }
        fields
    }

    fn star_csv(&self, star: &StarData, fields: &mut Vec<String>) {
        let coords = star.fundamental_coords();
        let motion = star.fundamental_motion();

        fields.push(HourMinSec::from_angle(Angle::new(coords.lon)).to_string());
        fields.push(DegMinSec::from_angle(Angle::new(coords.lat)).to_string());
        // Proper motion in seconds of time per year and arcsec per year.
        fields.push(fmt_opt(motion.lon, |v| {
            format!("{:+.5}", v * ARCSEC_PER_RAD / 15.0)
        }));
        fields.push(fmt_opt(motion.lat, |v| format!("{:+.4}", v * ARCSEC_PER_RAD)));
        fields.push(fmt_opt(star.vmag, |v| format!("{v:+.2}")));
        fields.push(fmt_opt(star.bmag, |v| format!("{v:+.2}")));
        fields.push(fmt_opt(coords.rad, |v| format!("{:.3E}", v * PARSEC_PER_LY)));
        fields.push(fmt_opt(star.radvel, |v| {
            format!("{:+.1}", v * LIGHT_KM_PER_SEC)
        }));
        fields.push(star.spectral_type.clone());

        if let Some(double) = star.double.as_ref() {
            fields.push(double.components.clone());
            fields.push(fmt_opt(double.mag_delta, |v| format!("{v:+.2}")));
            fields.push(fmt_opt(double.separation, |v| {
                format!("{:.1}", v * ARCSEC_PER_RAD)
            }));
            fields.push(fmt_opt(double.position_angle, |v| {
                format!("{:.1}", v.to_degrees())
            }));
            fields.push(fmt_opt(double.pa_year, |v| format!("{v:.2}")));

            match double.orbit_in_sky_plane(coords.lon, coords.lat) {
                Some(orbit) => {
                    fields.push(format!("{:.4}", Time::new(orbit.t, 0.0).to_julian_year()));
                    fields.push(format!("{:.4}", orbit.semi_major_axis()));
                    fields.push(format!("{:.4}", orbit.e));
                    fields.push(format!("{:.2}", orbit.i.to_degrees()));
                    fields.push(format!("{:.2}", orbit.w.to_degrees()));
                    fields.push(format!("{:.2}", orbit.n.to_degrees()));
                    fields.push(format!("{:.6}", TWO_PI / orbit.mm / 365.25));
                }
                None => fields.extend(std::iter::repeat(String::new()).take(7)),
            }
        }

        if let Some(variable) = star.variable.as_ref() {
            fields.push(variable.var_type.clone());
            fields.push(fmt_opt(variable.max_mag, |v| format!("{v:+.2}")));
            fields.push(fmt_opt(variable.min_mag, |v| format!("{v:+.2}")));
            fields.push(fmt_opt(variable.period, |v| format!("{v:.2}")));
            fields.push(fmt_opt(variable.epoch, |v| format!("{v:.2}")));
        }

        if let Some(deep_sky) = star.deep_sky.as_ref() {
            fields.push(fmt_opt(deep_sky.major_axis, |v| {
                format!("{:.2}", v * ARCMIN_PER_RAD)
            }));
            fields.push(fmt_opt(deep_sky.minor_axis, |v| {
                format!("{:.2}", v * ARCMIN_PER_RAD)
            }));
            fields.push(fmt_opt(deep_sky.position_angle, |v| {
                format!("{:.1}", v.to_degrees())
            }));
        }
    }

    fn planet_csv(&self, planet: &PlanetData, fields: &mut Vec<String>) {
        match planet.orbit.as_ref() {
            Some(orbit) => {
                fields.push(format!("{:.6}", orbit.t));
                fields.push(format!("{:.8}", orbit.q));
                fields.push(format!("{:.8}", orbit.e));
                fields.push(format!("{:.5}", orbit.i.to_degrees()));
                fields.push(format!("{:.5}", orbit.w.to_degrees()));
                fields.push(format!("{:.5}", orbit.n.to_degrees()));
                fields.push(format!("{:.5}", orbit.m.to_degrees()));
                fields.push(format!("{:.9}", orbit.mm.to_degrees()));
            }
            None => fields.extend(std::iter::repeat(String::new()).take(8)),
        }
        fields.push(fmt_opt(planet.h_mag, |v| format!("{v:.2}")));
        fields.push(fmt_opt(planet.g_param, |v| format!("{v:.2}")));
    }

    /// Builds an object from one CSV row. Returns an error for rows with
    /// an unknown type code or too few fields for the type.
    pub fn from_csv(fields: &[String]) -> Result<Object, CatalogError> {
        let code = fields.first().map(String::as_str).unwrap_or("");
        let object_type = ObjectType::from_code(code);
        if object_type == ObjectType::Nonexistent {
            return Err(CatalogError::UnknownTypeCode {
                code: code.to_string(),
            });
        }
        if object_type.is_solar_system() {
            Self::planet_from_csv(object_type, fields)
        } else {
            Self::star_from_csv(object_type, fields)
        }
    }

    fn star_from_csv(object_type: ObjectType, fields: &[String]) -> Result<Object, CatalogError> {
        // Index of the first identifier field depends on the substructures.
        let first_ident = match object_type {
            ObjectType::Star => 10,
            ObjectType::DoubleStar => 22,
            ObjectType::VariableStar => 15,
            ObjectType::DoubleVariableStar => 27,
            _ => 13,
        };
        if fields.len() < first_ident {
            return Err(CatalogError::TooFewFields {
                kind: object_type.code(),
                got: fields.len(),
                need: first_ident,
            });
        }

        let mut object = Object::new(object_type);

        let ra = HourMinSec::parse(&fields[1])
            .map(|h| h.to_angle().rad())
            .unwrap_or(f64::INFINITY);
        let dec = DegMinSec::parse(&fields[2])
            .map(|d| d.to_angle().rad())
            .unwrap_or(f64::INFINITY);
        let pm_ra = parse_opt(&fields[3]).map(|v| v * 15.0 * RAD_PER_ARCSEC);
        let pm_dec = parse_opt(&fields[4]).map(|v| v * RAD_PER_ARCSEC);
        let vmag = parse_opt(&fields[5]);
        let bmag = parse_opt(&fields[6]);
        let dist_ly = parse_opt(&fields[7]).map(|pc| pc * LY_PER_PARSEC);
        let radvel = parse_opt(&fields[8]).map(|kms| kms / LIGHT_KM_PER_SEC);
        let spectral_type = fields[9].trim().to_string();

        {
            let star = object.star_mut().expect("stellar types carry star data");
            star.set_fundamental_motion(
                Spherical::new(ra, dec, dist_ly.unwrap_or(f64::INFINITY)),
                Spherical::new(
                    pm_ra.unwrap_or(f64::INFINITY),
                    pm_dec.unwrap_or(f64::INFINITY),
                    radvel.unwrap_or(f64::INFINITY),
                ),
            );
            star.vmag = vmag.unwrap_or(f64::INFINITY);
            star.bmag = bmag.unwrap_or(f64::INFINITY);
            star.spectral_type = spectral_type;

            if let Some(double) = star.double.as_mut() {
                double.components = fields[10].trim().to_string();
                double.mag_delta = parse_opt(&fields[11]).unwrap_or(f64::INFINITY);
                double.separation = parse_opt(&fields[12])
                    .map(|v| v * RAD_PER_ARCSEC)
                    .unwrap_or(f64::INFINITY);
                double.position_angle = parse_opt(&fields[13])
                    .map(f64::to_radians)
                    .unwrap_or(f64::INFINITY);
                double.pa_year = parse_opt(&fields[14]).unwrap_or(f64::INFINITY);

                if !fields[15].is_empty() && !fields[16].is_empty() && !fields[17].is_empty() {
                    let epoch_year = parse_opt(&fields[15]).unwrap_or(2000.0);
                    let sma = parse_opt(&fields[16]).unwrap_or(0.0);
                    let e = parse_opt(&fields[17]).unwrap_or(0.0);
                    let period_years = parse_opt(&fields[21]).unwrap_or(f64::INFINITY);
                    let orbit = Orbit::new(
                        Time::from_julian_year(epoch_year).jd,
                        sma * (1.0 - e),
                        e,
                        parse_opt(&fields[18]).unwrap_or(0.0).to_radians(),
                        parse_opt(&fields[19]).unwrap_or(0.0).to_radians(),
                        parse_opt(&fields[20]).unwrap_or(0.0).to_radians(),
                        0.0,
                        TWO_PI / (period_years * 365.25),
                    );
                    double.set_orbit_from_sky_plane(orbit, ra, dec);
                }
            }

            if let Some(variable) = star.variable.as_mut() {
                let fv = if object_type == ObjectType::VariableStar { 10 } else { 22 };
                variable.var_type = fields[fv].trim().to_string();
                variable.max_mag = parse_opt(&fields[fv + 1]).unwrap_or(f64::INFINITY);
                variable.min_mag = parse_opt(&fields[fv + 2]).unwrap_or(f64::INFINITY);
                variable.period = parse_opt(&fields[fv + 3]).unwrap_or(f64::INFINITY);
                variable.epoch = parse_opt(&fields[fv + 4]).unwrap_or(f64::INFINITY);
            }

            if let Some(deep_sky) = star.deep_sky.as_mut() {
                deep_sky.major_axis = parse_opt(&fields[10])
                    .map(|v| v / ARCMIN_PER_RAD)
                    .unwrap_or(f64::INFINITY);
                deep_sky.minor_axis = parse_opt(&fields[11])
                    .map(|v| v / ARCMIN_PER_RAD)
                    .unwrap_or(f64::INFINITY);
                deep_sky.position_angle = parse_opt(&fields[12])
                    .map(f64::to_radians)
                    .unwrap_or(f64::INFINITY);
            }
        }

        object.parse_trailing_fields(&fields[first_ident..]);
        Ok(object)
    }

    fn planet_from_csv(object_type: ObjectType, fields: &[String]) -> Result<Object, CatalogError> {
        const FIRST_IDENT: usize = 11;
        if fields.len() < FIRST_IDENT {
            return Err(CatalogError::TooFewFields {
                kind: object_type.code(),
                got: fields.len(),
                need: FIRST_IDENT,
            });
        }
        let mut object = Object::new(object_type);
        {
            let planet = object.planet_mut().expect("solar-system types carry planet data");
            if !fields[1].is_empty() {
                planet.orbit = Some(Orbit::new(
                    parse_opt(&fields[1]).unwrap_or(J2000),
                    parse_opt(&fields[2]).unwrap_or(1.0),
                    parse_opt(&fields[3]).unwrap_or(0.0),
                    parse_opt(&fields[4]).unwrap_or(0.0).to_radians(),
                    parse_opt(&fields[5]).unwrap_or(0.0).to_radians(),
                    parse_opt(&fields[6]).unwrap_or(0.0).to_radians(),
                    parse_opt(&fields[7]).unwrap_or(0.0).to_radians(),
                    parse_opt(&fields[8]).unwrap_or(0.0).to_radians(),
                ));
            }
            planet.h_mag = parse_opt(&fields[9]).unwrap_or(f64::INFINITY);
            planet.g_param = parse_opt(&fields[10]).unwrap_or(f64::INFINITY);
        }
        object.parse_trailing_fields(&fields[FIRST_IDENT..]);
        Ok(object)
    }

    /// Trailing CSV fields are identifiers where they parse as such, and
    /// names otherwise.
    fn parse_trailing_fields(&mut self, fields: &[String]) {
        for field in fields {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let ident = Identifier::parse(field);
            if !ident.is_null() {
                self.add_identifier(ident);
            } else {
                self.names.push(field.to_string());
            }
        }
    }
}

/// Infinite and NaN values serialize as the empty string.
fn fmt_opt(value: f64, fmt: impl Fn(f64) -> String) -> String {
    if value.is_finite() {
        fmt(value)
    } else {
        String::new()
    }
}

/// Empty fields deserialize as None (callers substitute infinity).
fn parse_opt(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ObjectType::Star, "SS")]
    #[case(ObjectType::DoubleVariableStar, "DV")]
    #[case(ObjectType::PlanetaryNebula, "PN")]
    #[case(ObjectType::Satellite, "ST")]
    #[case(ObjectType::Asterism, "AM")]
    fn type_codes_round_trip(#[case] t: ObjectType, #[case] code: &str) {
        assert_eq!(t.code(), code);
        assert_eq!(ObjectType::from_code(code), t);
    }

    #[test]
    fn unknown_code_is_nonexistent() {
        assert_eq!(ObjectType::from_code("ZZ"), ObjectType::Nonexistent);
    }

    fn rigel_fields() -> Vec<String> {
        [
            "SS",
            "05 14 32.272",
            "-08 12 05.90",
            "+0.00009",
            "-0.0056",
            "+0.13",
            "-0.03",
            "2.643E2",
            "+17.8",
            "B8Ia",
            "HR 1713",
            "HD 34085",
            "beta Ori",
            "Rigel",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn star_csv_round_trip() {
        let object = Object::from_csv(&rigel_fields()).unwrap();
        assert_eq!(object.object_type(), ObjectType::Star);
        assert_eq!(object.names, vec!["Rigel"]);
        assert_eq!(object.identifiers().len(), 3);
        assert!(!object.identifier(CatalogId::Hr).is_null());
        assert!(!object.identifier(CatalogId::Bayer).is_null());
        assert!(object.identifier(CatalogId::Hip).is_null());

        // The row quantizes through the serialized precision (0.1 arcsec
        // in declination, 0.01 mag), so compare at that level.
        let row = object.to_csv();
        let back = Object::from_csv(&row).unwrap();
        let star = object.star().unwrap();
        let star2 = back.star().unwrap();
        assert_abs_diff_eq!(star.position, star2.position, epsilon = 2e-6);
        assert_abs_diff_eq!(star.parallax, star2.parallax, epsilon = 1e-5);
        assert_abs_diff_eq!(star.vmag, star2.vmag, epsilon = 0.01);
        assert_eq!(star.spectral_type, star2.spectral_type);
        assert_eq!(object.identifiers(), back.identifiers());
    }

    #[test]
    fn unknown_fields_become_infinity() {
        let mut fields = rigel_fields();
        fields[5] = String::new(); // Vmag
        fields[7] = String::new(); // distance
        let object = Object::from_csv(&fields).unwrap();
        let star = object.star().unwrap();
        assert!(star.vmag.is_infinite());
        assert_eq!(star.parallax, 0.0);
        assert!(star.fundamental_coords().rad.is_infinite());
    }

    #[test]
    fn too_few_fields_is_an_error() {
        let fields: Vec<String> = ["DS", "05 14 32.3", "-08 12 06"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(Object::from_csv(&fields).is_err());
    }

    #[test]
    fn variable_star_round_trip() {
        let fields: Vec<String> = [
            "VS",
            "02 19 20.8",
            "-02 58 39",
            "+0.0001",
            "-0.2387",
            "+2.00",
            "",
            "9.2E1",
            "+63.8",
            "M7IIIe",
            "M",
            "+2.00",
            "+10.10",
            "331.96",
            "2444839.36",
            "omicron Cet",
            "Mira",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let object = Object::from_csv(&fields).unwrap();
        let star = object.star().unwrap();
        let variable = star.variable.as_ref().unwrap();
        assert_eq!(variable.var_type, "M");
        assert_abs_diff_eq!(variable.period, 331.96, epsilon = 1e-9);
        assert_eq!(object.names, vec!["Mira"]);

        let back = Object::from_csv(&object.to_csv()).unwrap();
        let variable2 = back.star().unwrap().variable.as_ref().unwrap();
        assert_abs_diff_eq!(variable.period, variable2.period, epsilon = 0.01);
        assert_abs_diff_eq!(variable.epoch, variable2.epoch, epsilon = 0.01);
    }

    #[test]
    fn deep_sky_round_trip() {
        let fields: Vec<String> = [
            "GX",
            "00 42 44.3",
            "+41 16 09",
            "",
            "",
            "+3.44",
            "+4.36",
            "2.4E5",
            "-301.0",
            "Sb",
            "190.00",
            "60.00",
            "35.0",
            "M 31",
            "NGC 224",
            "Andromeda Galaxy",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let object = Object::from_csv(&fields).unwrap();
        let deep = object.star().unwrap().deep_sky.as_ref().unwrap();
        assert_abs_diff_eq!(deep.major_axis * ARCMIN_PER_RAD, 190.0, epsilon = 1e-9);
        assert!(!object.identifier(CatalogId::Messier).is_null());
        assert!(!object.identifier(CatalogId::Ngc).is_null());

        let back = Object::from_csv(&object.to_csv()).unwrap();
        let deep2 = back.star().unwrap().deep_sky.as_ref().unwrap();
        assert_abs_diff_eq!(deep.major_axis, deep2.major_axis, epsilon = 1e-5);
        assert_abs_diff_eq!(deep.position_angle, deep2.position_angle, epsilon = 2e-3);
    }

    #[test]
    fn asteroid_round_trip() {
        let mut object = Object::new(ObjectType::Asteroid);
        object.add_identifier(Identifier::new(CatalogId::AsteroidNumber, 1));
        object.names.push("Ceres".to_string());
        *object.planet_mut().unwrap() = PlanetData::with_orbit(
            Orbit::new(2_458_954.5, 2.55, 0.078, 0.185, 1.28, 1.40, 0.5, 0.003_76),
            3.34,
            0.12,
        );
        let back = Object::from_csv(&object.to_csv()).unwrap();
        let orbit = back.planet().unwrap().orbit.as_ref().unwrap();
        assert_abs_diff_eq!(orbit.q, 2.55, epsilon = 1e-6);
        assert_abs_diff_eq!(orbit.e, 0.078, epsilon = 1e-6);
        assert_eq!(back.names, vec!["Ceres"]);
        assert_eq!(
            back.identifier(CatalogId::AsteroidNumber).number(),
            1
        );
    }
}

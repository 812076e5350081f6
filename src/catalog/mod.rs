/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The owning object array and its identifier lookup structures, plus
//! the bounded CSV import/export shim.

pub mod identifier;
pub mod object;
pub mod planet;
pub mod star;

use crate::catalog::identifier::{CatalogId, Identifier};
use crate::catalog::object::Object;
use crate::coords::Coordinates;
use crate::errors::{CatalogCsvSnafu, CatalogError, CatalogIoSnafu};

use log::warn;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// An ordered, owning array of celestial objects. Retrieval hands out
/// non-owning views; objects never move once inserted, so indices are
/// stable handles.
#[derive(Clone, Default)]
pub struct Catalog {
    objects: Vec<Object>,
}

/// Multimap from identifiers to object indices within one catalog.
pub type ObjectMap = BTreeMap<Identifier, Vec<usize>>;

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn push(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.objects.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.objects.iter_mut()
    }

    /// Builds a multimap from identifiers in the given catalog to object
    /// indices.
    pub fn make_object_map(&self, catalog: CatalogId) -> ObjectMap {
        let mut map = ObjectMap::new();
        for (index, object) in self.objects.iter().enumerate() {
            for ident in object.identifiers() {
                if ident.catalog() == catalog {
                    map.entry(*ident).or_default().push(index);
                }
            }
        }
        map
    }

    /// Looks up the first object bearing the given identifier.
    pub fn find(&self, ident: Identifier, map: &ObjectMap) -> Option<&Object> {
        map.get(&ident)
            .and_then(|indices| indices.first())
            .and_then(|&i| self.objects.get(i))
    }

    /// Recomputes the ephemerides of every object, then resolves binary
    /// companions against their primaries' fresh apparent places.
    pub fn compute_ephemerides(&mut self, coords: &Coordinates) {
        for object in &mut self.objects {
            object.compute_ephemeris(coords);
        }
        for index in 0..self.objects.len() {
            let primary_index = self.objects[index]
                .star()
                .and_then(|s| s.double.as_ref())
                .and_then(|d| d.primary);
            if let Some(p) = primary_index {
                if p != index && p < self.objects.len() {
                    let primary = self.objects[p].clone();
                    self.objects[index].apply_binary_orbit(coords, &primary);
                }
            }
        }
    }

    /// Resolves double-star primary back-references: a secondary points
    /// at the first object sharing its WDS identifier. Runs after a
    /// region is fully loaded; until then the references stay None.
    pub fn resolve_binary_primaries(&mut self) {
        let wds_map = self.make_object_map(CatalogId::Wds);
        for index in 0..self.objects.len() {
            let wds = self.objects[index].identifier(CatalogId::Wds);
            if wds.is_null() {
                continue;
            }
            let primary = wds_map
                .get(&wds)
                .and_then(|indices| indices.iter().copied().find(|&i| i != index));
            if let Some(p) = primary {
                if let Some(double) = self.objects[index]
                    .star_mut()
                    .and_then(|s| s.double.as_mut())
                {
                    double.primary = Some(p);
                }
            }
        }
    }

    /// Reads objects from CSV. Unparseable rows are skipped with a
    /// warning; returns the number of objects imported.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut count = 0;
        for record in csv_reader.records() {
            let record = record.context(CatalogCsvSnafu)?;
            let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
            if fields.is_empty() {
                continue;
            }
            match Object::from_csv(&fields) {
                Ok(object) => {
                    self.objects.push(object);
                    count += 1;
                }
                Err(err) => warn!("skipping catalog row: {err}"),
            }
        }
        Ok(count)
    }

    /// Writes every object as one CSV row; returns the number written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, CatalogError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        for object in &self.objects {
            csv_writer
                .write_record(object.to_csv())
                .context(CatalogCsvSnafu)?;
        }
        csv_writer.flush().map_err(|e| CatalogError::CatalogIo {
            path: String::new(),
            source: e,
        })?;
        Ok(self.objects.len())
    }

    pub fn import_csv_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let file = std::fs::File::open(path).with_context(|_| CatalogIoSnafu {
            path: path.display().to_string(),
        })?;
        self.import_csv(std::io::BufReader::new(file))
    }

    pub fn export_csv_file(&self, path: &Path) -> Result<usize, CatalogError> {
        let file = std::fs::File::create(path).with_context(|_| CatalogIoSnafu {
            path: path.display().to_string(),
        })?;
        self.export_csv(std::io::BufWriter::new(file))
    }
}

/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Magnitude-levelled spatial store over the Hierarchical Triangular
//! Mesh, with lazy region loading and identifier/name indices.
//!
//! Objects are bucketed by magnitude: the HTM is built with an ordered
//! list of magnitude thresholds, one per subdivision level, so bright
//! objects live in the eight large base triangles (or the origin
//! region) and progressively fainter ones in progressively smaller
//! triangles. Each populated region persists as one CSV file under the
//! root path, loadable independently and, on request, on a background
//! thread.

pub mod mesh;

pub use mesh::{
    id_level, id_to_name, is_inside, name_to_id, name_to_triangle, vector_to_id, ORIGIN_ID,
};

use crate::catalog::identifier::{CatalogId, Identifier};
use crate::catalog::object::Object;
use crate::catalog::Catalog;
use crate::math::Vector3;

use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Location of an object inside the HTM: the region it lives in and its
/// 0-based row offset within that region's file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectLoc {
    pub region: u64,
    pub offset: usize,
}

/// Lifecycle of a region's object data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegionState {
    Absent,
    Loading,
    Loaded,
}

/// Callback invoked (from the loading thread, for asynchronous loads)
/// after a region's objects are published.
pub type RegionLoadCallback = Arc<dyn Fn(u64) + Send + Sync>;

type RegionMap = HashMap<u64, Arc<Catalog>>;
type IdentIndex = BTreeMap<Identifier, Vec<ObjectLoc>>;
type NameIndex = BTreeMap<String, Vec<ObjectLoc>>;

/// The mesh-backed object store. The region map is shared with loader
/// threads behind a mutex, which supplies the publish/observe ordering;
/// the per-region loader slots live on the owning thread only, so each
/// region can have at most one loader in flight.
pub struct Htm {
    mag_levels: Vec<f64>,
    rootpath: PathBuf,
    regions: Arc<Mutex<RegionMap>>,
    loaders: HashMap<u64, JoinHandle<()>>,
    callback: Option<RegionLoadCallback>,
    ident_index: HashMap<CatalogId, IdentIndex>,
    name_index: NameIndex,
}

impl Htm {
    /// Creates an HTM with one magnitude threshold per level and a root
    /// directory holding the region files.
    pub fn new(mag_levels: Vec<f64>, rootpath: impl Into<PathBuf>) -> Self {
        Self {
            mag_levels,
            rootpath: rootpath.into(),
            regions: Arc::new(Mutex::new(HashMap::new())),
            loaders: HashMap::new(),
            callback: None,
            ident_index: HashMap::new(),
            name_index: NameIndex::new(),
        }
    }

    /// Registers the region-load completion callback for this instance.
    pub fn set_region_load_callback(&mut self, callback: Option<RegionLoadCallback>) {
        self.callback = callback;
    }

    /// The HTM level whose magnitude bucket contains `mag`, or None if
    /// the magnitude is fainter than every threshold.
    pub fn mag_level(&self, mag: f64) -> Option<usize> {
        self.mag_levels.iter().position(|&limit| mag <= limit)
    }

    /// Brightest and faintest magnitudes stored in the given region, or
    /// None if the ID does not correspond to a populated level.
    pub fn mag_limits(&self, id: u64) -> Option<(f64, f64)> {
        let level = self.level_of(id)?;
        if level >= self.mag_levels.len() {
            return None;
        }
        let min = if level == 0 {
            f64::NEG_INFINITY
        } else {
            self.mag_levels[level - 1]
        };
        Some((min, self.mag_levels[level]))
    }

    /// IDs of the sub-regions directly inside the given region: the
    /// eight base triangles for the origin, four children otherwise, and
    /// none at the bottom level.
    pub fn sub_region_ids(&self, id: u64) -> Vec<u64> {
        let level = match self.level_of(id) {
            Some(level) => level,
            None => return Vec::new(),
        };
        if level + 1 >= self.mag_levels.len() {
            return Vec::new();
        }
        if id == ORIGIN_ID {
            (8..16).collect()
        } else {
            (0..4).map(|child| id * 4 + child).collect()
        }
    }

    fn level_of(&self, id: u64) -> Option<usize> {
        if id == ORIGIN_ID {
            Some(0)
        } else {
            id_level(id).map(|l| l + 1)
        }
    }

    /// Stores one stellar object, creating its region if needed. Returns
    /// false for objects with no usable magnitude or position.
    pub fn store(&mut self, object: Object) -> bool {
        let star = match object.star() {
            Some(star) => star,
            None => return false,
        };
        let mag = if star.vmag.is_finite() { star.vmag } else { star.bmag };
        let level = match self.mag_level(mag) {
            Some(level) => level,
            None => return false,
        };
        let position = star.position;

        let id = if level > 0 {
            let id = vector_to_id(&position, level - 1);
            if id == mesh::INVALID_ID {
                return false;
            }
            id
        } else {
            ORIGIN_ID
        };

        let mut regions = match self.regions.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        let entry = regions.entry(id).or_insert_with(|| Arc::new(Catalog::new()));
        Arc::make_mut(entry).push(object);
        true
    }

    /// Stores every stellar object of the array; returns how many were
    /// accepted.
    pub fn store_all(&mut self, objects: impl IntoIterator<Item = Object>) -> usize {
        objects.into_iter().filter(|o| self.store(o.clone())).count()
    }

    /// Total number of objects across the loaded regions.
    pub fn count_stars(&self) -> usize {
        self.regions
            .lock()
            .map(|regions| regions.values().map(|c| c.len()).sum())
            .unwrap_or(0)
    }

    pub fn count_stars_in(&self, id: u64) -> usize {
        self.regions
            .lock()
            .ok()
            .and_then(|regions| regions.get(&id).map(|c| c.len()))
            .unwrap_or(0)
    }

    pub fn region_state(&self, id: u64) -> RegionState {
        if self.get_objects(id).is_some() {
            RegionState::Loaded
        } else if self.loaders.contains_key(&id) {
            RegionState::Loading
        } else {
            RegionState::Absent
        }
    }

    /// The loaded object array of a region, if present.
    pub fn get_objects(&self, id: u64) -> Option<Arc<Catalog>> {
        self.regions.lock().ok()?.get(&id).cloned()
    }

    fn region_path(&self, id: u64) -> PathBuf {
        self.rootpath.join(format!("{}.csv", id_to_name(id)))
    }

    /// Loads a region's objects. With `sync`, loads on the calling
    /// thread and returns the loaded handle (or None if the file is
    /// absent or empty). Without `sync`, spawns at most one background
    /// loader for the region and returns None; once the loader has
    /// published the region, a subsequent call returns the handle.
    pub fn load_region(&mut self, id: u64, sync: bool) -> Option<Arc<Catalog>> {
        if let Some(loaded) = self.get_objects(id) {
            // Reap the finished loader slot, if any.
            if let Some(handle) = self.loaders.remove(&id) {
                let _ = handle.join();
            }
            return Some(loaded);
        }

        if !sync {
            // Coalesce duplicate requests on the in-flight loader.
            if !self.loaders.contains_key(&id) {
                let regions = Arc::clone(&self.regions);
                let path = self.region_path(id);
                let callback = self.callback.clone();
                let handle = std::thread::spawn(move || {
                    load_region_job(&regions, &path, id, callback.as_ref());
                });
                self.loaders.insert(id, handle);
            }
            return None;
        }

        // A synchronous request first waits out any loader in flight for
        // this region rather than reading the file twice.
        if let Some(handle) = self.loaders.remove(&id) {
            let _ = handle.join();
            if let Some(loaded) = self.get_objects(id) {
                return Some(loaded);
            }
        }

        load_region_job(
            &self.regions,
            &self.region_path(id),
            id,
            self.callback.as_ref(),
        );
        self.get_objects(id)
    }

    /// Loads a region and, recursively, all of its sub-regions. Returns
    /// the number of regions loaded (zero for asynchronous loads).
    pub fn load_regions(&mut self, id: u64, sync: bool) -> usize {
        let mut n = usize::from(self.load_region(id, sync).is_some());
        for sub in self.sub_region_ids(id) {
            n += self.load_regions(sub, sync);
        }
        n
    }

    /// Drops a region's objects, first waiting out any loader in flight.
    pub fn dump_region(&mut self, id: u64) {
        if let Some(handle) = self.loaders.remove(&id) {
            let _ = handle.join();
        }
        if let Ok(mut regions) = self.regions.lock() {
            regions.remove(&id);
        }
    }

    /// Drops every region; loaders run to completion first.
    pub fn dump_regions(&mut self) {
        for (_, handle) in self.loaders.drain() {
            let _ = handle.join();
        }
        if let Ok(mut regions) = self.regions.lock() {
            regions.clear();
        }
    }

    /// Saves one region as `<rootpath>/<region-name>.csv`. Returns the
    /// number of objects written.
    pub fn save_region(&self, id: u64) -> usize {
        match self.get_objects(id) {
            Some(objects) => match objects.export_csv_file(&self.region_path(id)) {
                Ok(n) => n,
                Err(err) => {
                    warn!("saving region {}: {err}", id_to_name(id));
                    0
                }
            },
            None => 0,
        }
    }

    /// Saves every loaded region. Returns the total number of objects
    /// written.
    pub fn save_regions(&self) -> usize {
        let ids: Vec<u64> = match self.regions.lock() {
            Ok(regions) => regions.keys().copied().collect(),
            Err(_) => return 0,
        };
        ids.into_iter().map(|id| self.save_region(id)).sum()
    }

    /// Builds the in-memory object index for one catalog (or the name
    /// index for `CatalogId::Unknown`) by walking the loaded regions.
    /// Returns the number of index entries.
    pub fn make_object_map(&mut self, catalog: CatalogId) -> usize {
        let mut ident_map = IdentIndex::new();
        let mut name_map = NameIndex::new();
        self.collect_map(catalog, ORIGIN_ID, &mut ident_map, &mut name_map);

        if catalog == CatalogId::Unknown {
            let n = name_map.values().map(Vec::len).sum();
            self.name_index = name_map;
            n
        } else {
            let n = ident_map.values().map(Vec::len).sum();
            self.ident_index.insert(catalog, ident_map);
            n
        }
    }

    fn collect_map(
        &self,
        catalog: CatalogId,
        id: u64,
        ident_map: &mut IdentIndex,
        name_map: &mut NameIndex,
    ) {
        if let Some(objects) = self.get_objects(id) {
            for (offset, object) in objects.iter().enumerate() {
                let loc = ObjectLoc { region: id, offset };
                if catalog == CatalogId::Unknown {
                    for name in &object.names {
                        name_map.entry(name.clone()).or_default().push(loc);
                    }
                } else {
                    for ident in object.identifiers() {
                        if ident.catalog() == catalog {
                            ident_map.entry(*ident).or_default().push(loc);
                        }
                    }
                }
            }
        }
        for sub in self.sub_region_ids(id) {
            self.collect_map(catalog, sub, ident_map, name_map);
        }
    }

    fn index_path(&self, catalog: CatalogId) -> PathBuf {
        self.rootpath
            .join("index")
            .join(format!("{}.csv", catalog.designation()))
    }

    /// Serializes an object index to `<rootpath>/index/<catalog>.csv`
    /// as (key, region-name, offset) rows. Returns entries written.
    pub fn save_object_map(&self, catalog: CatalogId) -> usize {
        let path = self.index_path(catalog);
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return 0;
            }
        }
        let file = match std::fs::File::create(&path) {
            Ok(file) => file,
            Err(err) => {
                warn!("saving index {}: {err}", path.display());
                return 0;
            }
        };
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(std::io::BufWriter::new(file));

        let mut n = 0;
        if catalog == CatalogId::Unknown {
            for (name, locs) in &self.name_index {
                for loc in locs {
                    if write_index_row(&mut writer, name, loc) {
                        n += 1;
                    }
                }
            }
        } else if let Some(map) = self.ident_index.get(&catalog) {
            for (ident, locs) in map {
                let key = ident.to_string();
                for loc in locs {
                    if write_index_row(&mut writer, &key, loc) {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Loads an object index from disk into memory. Returns entries
    /// read; on any I/O failure the index is simply left empty.
    pub fn load_object_map(&mut self, catalog: CatalogId) -> usize {
        let path = self.index_path(catalog);
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(_) => return 0,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(std::io::BufReader::new(file));

        let mut ident_map = IdentIndex::new();
        let mut name_map = NameIndex::new();
        let mut n = 0;
        for record in reader.records().map_while(Result::ok) {
            if record.len() < 3 {
                continue;
            }
            let region = name_to_id(record.get(1).unwrap_or(""));
            let offset = record.get(2).and_then(|f| f.parse().ok()).unwrap_or(0);
            let loc = ObjectLoc { region, offset };
            let key = record.get(0).unwrap_or("");
            if catalog == CatalogId::Unknown {
                if !key.is_empty() {
                    name_map.entry(key.to_string()).or_default().push(loc);
                    n += 1;
                }
            } else {
                let ident = Identifier::parse(key);
                if !ident.is_null() {
                    ident_map.entry(ident).or_default().push(loc);
                    n += 1;
                }
            }
        }

        if n > 0 {
            if catalog == CatalogId::Unknown {
                self.name_index = name_map;
            } else {
                self.ident_index.insert(catalog, ident_map);
            }
        }
        debug!("loaded {} index entries for {}", n, catalog.designation());
        n
    }

    /// Finds the locations of every object bearing the identifier. Loads
    /// the relevant index from disk on first use, but never forces the
    /// object regions themselves to load.
    pub fn find_object_locs(&mut self, ident: Identifier) -> Vec<ObjectLoc> {
        let catalog = ident.catalog();
        if self
            .ident_index
            .get(&catalog)
            .map_or(true, |map| map.is_empty())
        {
            self.load_object_map(catalog);
        }
        self.ident_index
            .get(&catalog)
            .and_then(|map| map.get(&ident))
            .cloned()
            .unwrap_or_default()
    }

    /// Finds object locations by name. Case-sensitive whole-string
    /// lookups use the sorted index directly; prefix or case-insensitive
    /// matching scans linearly, which the small name table tolerates.
    pub fn find_object_locs_by_name(
        &mut self,
        name: &str,
        case_sensitive: bool,
        begins_with: bool,
    ) -> Vec<ObjectLoc> {
        if self.name_index.is_empty() {
            self.load_object_map(CatalogId::Unknown);
        }
        if case_sensitive && !begins_with {
            return self.name_index.get(name).cloned().unwrap_or_default();
        }

        let wanted = if case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        };
        let mut results = Vec::new();
        for (key, locs) in &self.name_index {
            let key_cmp = if case_sensitive {
                key.clone()
            } else {
                key.to_lowercase()
            };
            let matched = if begins_with {
                key_cmp.starts_with(&wanted)
            } else {
                key_cmp == wanted
            };
            if matched {
                results.extend_from_slice(locs);
            }
        }
        results
    }

    /// Synchronously loads the region containing the location, if
    /// needed, and returns a copy of the object there.
    pub fn load_object(&mut self, loc: &ObjectLoc) -> Option<Object> {
        let objects = self.load_region(loc.region, true)?;
        objects.get(loc.offset).cloned()
    }

    pub fn rootpath(&self) -> &Path {
        &self.rootpath
    }

    pub fn mag_levels(&self) -> &[f64] {
        &self.mag_levels
    }
}

impl Drop for Htm {
    fn drop(&mut self) {
        // Loaders hold a reference to the region map; every one must
        // finish before the store goes away.
        for (_, handle) in self.loaders.drain() {
            let _ = handle.join();
        }
    }
}

/// Reads a region file and publishes its objects into the shared region
/// map; runs on the calling thread for synchronous loads and on the
/// spawned thread otherwise. Missing or empty files leave the region
/// absent.
fn load_region_job(
    regions: &Mutex<RegionMap>,
    path: &Path,
    id: u64,
    callback: Option<&RegionLoadCallback>,
) {
    let mut catalog = Catalog::new();
    match catalog.import_csv_file(path) {
        Ok(n) if n > 0 => {
            catalog.resolve_binary_primaries();
            if let Ok(mut regions) = regions.lock() {
                regions.insert(id, Arc::new(catalog));
            }
            debug!("region {} loaded with {n} objects", id_to_name(id));
            if let Some(callback) = callback {
                callback(id);
            }
        }
        Ok(_) => debug!("region file {} is empty", path.display()),
        Err(err) => warn!("region {} stays absent: {err}", id_to_name(id)),
    }
}

fn write_index_row<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    key: &str,
    loc: &ObjectLoc,
) -> bool {
    let region = id_to_name(loc.region);
    let offset = loc.offset.to_string();
    writer
        .write_record([key, region.as_str(), offset.as_str()])
        .is_ok()
}

/// Convenience: the region a unit vector falls in at the level matching
/// a magnitude, per the store's bucketing rule.
pub fn region_for(htm: &Htm, position: &Vector3, mag: f64) -> Option<u64> {
    let level = htm.mag_level(mag)?;
    if level == 0 {
        Some(ORIGIN_ID)
    } else {
        match vector_to_id(position, level - 1) {
            mesh::INVALID_ID => None,
            id => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::object::ObjectType;
    use crate::math::spherical::Spherical;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_star(lon: f64, lat: f64, mag: f64, name: &str) -> Object {
        let mut object = Object::new(ObjectType::Star);
        object.names.push(name.to_string());
        let star = object.star_mut().unwrap();
        star.position = Spherical::new(lon, lat, 1.0).to_vector();
        star.vmag = mag;
        object
    }

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("almagest-htm-{tag}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn magnitude_levels_bucket_objects() {
        let htm = Htm::new(vec![2.0, 5.0, 8.0], "/tmp/unused");
        assert_eq!(htm.mag_level(-1.4), Some(0));
        assert_eq!(htm.mag_level(3.0), Some(1));
        assert_eq!(htm.mag_level(7.9), Some(2));
        assert_eq!(htm.mag_level(9.0), None);

        assert_eq!(htm.mag_limits(ORIGIN_ID), Some((f64::NEG_INFINITY, 2.0)));
        assert_eq!(htm.mag_limits(8), Some((2.0, 5.0)));
    }

    #[test]
    fn sub_regions() {
        let htm = Htm::new(vec![2.0, 5.0, 8.0], "/tmp/unused");
        assert_eq!(htm.sub_region_ids(ORIGIN_ID), (8..16).collect::<Vec<_>>());
        assert_eq!(htm.sub_region_ids(8), vec![32, 33, 34, 35]);
        // Bottom level has no children.
        assert!(htm.sub_region_ids(32).is_empty());
    }

    #[test]
    fn store_and_save_and_reload() {
        let root = temp_root("roundtrip");
        let mut htm = Htm::new(vec![2.0, 6.0], &root);
        assert!(htm.store(test_star(0.5, 0.4, 1.0, "Bright")));
        assert!(htm.store(test_star(0.5, 0.4, 4.0, "Faint")));
        assert!(htm.store(test_star(3.5, -0.7, 5.0, "Southern")));
        // Too faint for every level.
        assert!(!htm.store(test_star(1.0, 1.0, 9.9, "Invisible")));
        assert_eq!(htm.count_stars(), 3);

        assert_eq!(htm.save_regions(), 3);

        let mut reloaded = Htm::new(vec![2.0, 6.0], &root);
        assert_eq!(reloaded.region_state(ORIGIN_ID), RegionState::Absent);
        let origin = reloaded.load_region(ORIGIN_ID, true).expect("origin file");
        assert_eq!(origin.len(), 1);
        assert_eq!(origin.get(0).unwrap().names, vec!["Bright"]);
        assert_eq!(reloaded.region_state(ORIGIN_ID), RegionState::Loaded);

        let n = reloaded.load_regions(ORIGIN_ID, true);
        assert_eq!(n, 3);
        assert_eq!(reloaded.count_stars(), 3);
    }

    #[test]
    fn async_load_publishes_and_calls_back() {
        let root = temp_root("async");
        let mut htm = Htm::new(vec![2.0], &root);
        htm.store(test_star(1.0, -0.2, 0.0, "Solo"));
        htm.save_regions();

        let mut loaded = Htm::new(vec![2.0], &root);
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        loaded.set_region_load_callback(Some(Arc::new(|_id| {
            CALLS.fetch_add(1, Ordering::SeqCst);
        })));

        assert!(loaded.load_region(ORIGIN_ID, false).is_none());
        // Requesting again while in flight coalesces on the same loader.
        let _ = loaded.load_region(ORIGIN_ID, false);
        assert_eq!(loaded.loaders.len(), 1);

        // Wait for the publication and reap the loader.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            if let Some(objects) = loaded.load_region(ORIGIN_ID, false) {
                assert_eq!(objects.len(), 1);
                break;
            }
            assert!(std::time::Instant::now() < deadline, "load timed out");
            std::thread::yield_now();
        }
        assert!(loaded.loaders.is_empty());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn absent_file_stays_absent() {
        let root = temp_root("absent");
        let mut htm = Htm::new(vec![2.0], &root);
        assert!(htm.load_region(ORIGIN_ID, true).is_none());
        assert_eq!(htm.region_state(ORIGIN_ID), RegionState::Absent);
    }

    #[test]
    fn dump_region_frees_objects() {
        let root = temp_root("dump");
        let mut htm = Htm::new(vec![2.0], &root);
        htm.store(test_star(1.0, -0.2, 0.0, "Solo"));
        assert_eq!(htm.count_stars(), 1);
        htm.dump_region(ORIGIN_ID);
        assert_eq!(htm.count_stars(), 0);
        assert_eq!(htm.region_state(ORIGIN_ID), RegionState::Absent);
    }

    #[test]
    fn index_round_trip_without_force_loading() {
        let root = temp_root("index");
        let mut htm = Htm::new(vec![2.0, 6.0], &root);
        let mut star = test_star(0.5, 0.4, 4.0, "Sirius");
        star.add_identifier(Identifier::parse("HD 48915"));
        htm.store(star);
        htm.save_regions();
        assert_eq!(htm.make_object_map(CatalogId::Hd), 1);
        assert_eq!(htm.make_object_map(CatalogId::Unknown), 1);
        assert_eq!(htm.save_object_map(CatalogId::Hd), 1);
        assert_eq!(htm.save_object_map(CatalogId::Unknown), 1);

        let mut fresh = Htm::new(vec![2.0, 6.0], &root);
        let locs = fresh.find_object_locs(Identifier::parse("HD 48915"));
        assert_eq!(locs.len(), 1);
        // The index lookup must not load the region itself.
        assert_eq!(fresh.region_state(locs[0].region), RegionState::Absent);

        let by_name = fresh.find_object_locs_by_name("sirius", false, false);
        assert_eq!(by_name, locs);
        let by_prefix = fresh.find_object_locs_by_name("Sir", true, true);
        assert_eq!(by_prefix, locs);
        assert!(fresh.find_object_locs_by_name("sir", true, false).is_empty());

        // loadObject is what finally materializes the region.
        let object = fresh.load_object(&locs[0]).expect("object loads");
        assert_eq!(object.names, vec!["Sirius"]);
        assert_eq!(fresh.region_state(locs[0].region), RegionState::Loaded);
    }
}

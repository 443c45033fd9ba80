//! Multi-resolution cell index powering key lookups and radius searches.
//!
//! Every stored item is indexed under the cell containing it at each level
//! of the hierarchy, from the leaf level up to the root. A reverse index
//! remembers those cells per key so that removal costs one probe per level
//! regardless of how many items are stored.
//!
//! [`SpatialIndex`] does no locking of its own; [`crate::GeoCollection`]
//! guards it with a reader-writer lock.

use crate::covering::CoveringCell;
use crate::geometry::{CellId, LEVEL_COUNT, SphericalGeometry};
use geo::Point;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Keys of the items located in one cell.
type CellItems<K> = FxHashSet<K>;

/// One cell an item is indexed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSlot {
    pub level: u8,
    pub cell: CellId,
}

/// Per-key list of indexed cells, finest level first.
pub type CellSlots = SmallVec<[CellSlot; LEVEL_COUNT]>;

/// Stored contents together with the location they were stored at.
#[derive(Debug, Clone)]
struct ItemRecord<V> {
    contents: V,
    latitude: f64,
    longitude: f64,
    /// Position in enumeration order
    seq: u64,
}

/// Item records plus the cell and reverse indexes over them.
#[derive(Debug)]
pub struct SpatialIndex<K, V> {
    /// Cell position to keys, one map per level
    cells: Vec<FxHashMap<CellId, CellItems<K>>>,
    /// Cells each key is indexed under, for fast removal
    keys: FxHashMap<K, CellSlots>,
    items: FxHashMap<K, ItemRecord<V>>,
    /// Enumeration order for pagination
    order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K, V> SpatialIndex<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an index for a hierarchy whose finest level is `max_level`.
    pub fn new(max_level: u8) -> Self {
        Self::with_capacity(max_level, 0)
    }

    pub fn with_capacity(max_level: u8, capacity: usize) -> Self {
        let mut items = FxHashMap::default();
        items.reserve(capacity);
        let mut keys = FxHashMap::default();
        keys.reserve(capacity);

        Self {
            cells: (0..=max_level).map(|_| FxHashMap::default()).collect(),
            keys,
            items,
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Number of levels every item is indexed under.
    pub fn level_count(&self) -> usize {
        self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Store `contents` for `key` at a location, replacing any previous record.
    ///
    /// When the key is already stored at exactly the same coordinates only
    /// the contents are swapped; otherwise the key is removed from every
    /// cell it was indexed under and indexed again at the new location.
    /// Returns the contents that were replaced.
    pub fn insert<G>(
        &mut self,
        geometry: &G,
        key: K,
        contents: V,
        latitude: f64,
        longitude: f64,
    ) -> Option<V>
    where
        G: SphericalGeometry + ?Sized,
    {
        if let Some(record) = self.items.get_mut(&key)
            && record.latitude == latitude
            && record.longitude == longitude
        {
            return Some(std::mem::replace(&mut record.contents, contents));
        }

        let (previous, seq) = match self.remove_entry(&key) {
            Some(record) => (Some(record.contents), record.seq),
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                (None, seq)
            }
        };

        let leaf = geometry.leaf_cell_of(latitude, longitude);
        let mut slots = CellSlots::new();
        for level in (0..self.cells.len()).rev() {
            let level = level as u8;
            let cell = geometry.ancestor_at(leaf, level);
            self.cells[usize::from(level)]
                .entry(cell)
                .or_default()
                .insert(key.clone());
            slots.push(CellSlot { level, cell });
        }

        log::debug!(
            "Indexed item at ({}, {}) under leaf cell {:#018x}",
            latitude,
            longitude,
            leaf
        );

        self.keys.insert(key.clone(), slots);
        self.order.insert(seq, key.clone());
        self.items.insert(
            key,
            ItemRecord {
                contents,
                latitude,
                longitude,
                seq,
            },
        );

        previous
    }

    /// Remove a key and all of its index entries. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|record| {
            self.order.remove(&record.seq);
            record.contents
        })
    }

    /// Drop a key's record and cell entries, keeping its enumeration slot.
    fn remove_entry(&mut self, key: &K) -> Option<ItemRecord<V>> {
        let record = self.items.remove(key)?;

        if let Some(slots) = self.keys.remove(key) {
            for slot in &slots {
                let level = &mut self.cells[usize::from(slot.level)];
                if let Some(bucket) = level.get_mut(&slot.cell) {
                    bucket.remove(key);
                    if bucket.is_empty() {
                        level.remove(&slot.cell);
                    }
                }
            }
            log::debug!("Removed {} cell entries for item", slots.len());
        }

        Some(record)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.items.get(key).map(|record| &record.contents)
    }

    /// Location a key was stored at; `x` is longitude and `y` latitude.
    pub fn location_of(&self, key: &K) -> Option<Point> {
        self.items
            .get(key)
            .map(|record| Point::new(record.longitude, record.latitude))
    }

    /// Contents in insertion order, skipping `start_index` items and
    /// returning at most `page_size`.
    ///
    /// Updating a key keeps its position; deleting and re-inserting it
    /// moves it to the end.
    pub fn page(&self, page_size: usize, start_index: usize) -> Vec<&V> {
        if start_index >= self.items.len() {
            return Vec::new();
        }

        self.order
            .values()
            .skip(start_index)
            .take(page_size)
            .filter_map(|key| self.get(key))
            .collect()
    }

    /// Keys indexed under `cell` at `level`.
    pub fn keys_in_cell(&self, level: u8, cell: CellId) -> Option<&FxHashSet<K>> {
        self.cells.get(usize::from(level))?.get(&cell)
    }

    /// Cells a key is indexed under, finest level first.
    pub fn slots_of(&self, key: &K) -> Option<&[CellSlot]> {
        self.keys.get(key).map(|slots| slots.as_slice())
    }

    /// Contents of every key found in the given cells, in covering order.
    ///
    /// A key reachable through more than one cell is reported once.
    pub fn collect_covered(&self, covering: &[CoveringCell]) -> Vec<&V> {
        let mut seen = FxHashSet::default();
        let mut found = Vec::new();

        for covering_cell in covering {
            let Some(bucket) = self.keys_in_cell(covering_cell.level, covering_cell.cell) else {
                continue;
            };

            log::trace!(
                "Cell {:#018x} at level {} holds {} items",
                covering_cell.cell,
                covering_cell.level,
                bucket.len()
            );

            for key in bucket {
                if seen.insert(key)
                    && let Some(contents) = self.get(key)
                {
                    found.push(contents);
                }
            }
        }

        found
    }

    pub fn clear(&mut self) {
        for level in &mut self.cells {
            level.clear();
        }
        self.keys.clear();
        self.items.clear();
        self.order.clear();
    }

    /// Get statistics about the index
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            item_count: self.items.len(),
            occupied_cells: self.cells.iter().map(FxHashMap::len).collect(),
            cell_entries: self.keys.values().map(SmallVec::len).sum(),
        }
    }
}

/// Statistics about the spatial index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub item_count: usize,
    /// Number of non-empty cells per level, coarsest first
    pub occupied_cells: Vec<usize>,
    /// Total number of (cell, key) entries across all levels
    pub cell_entries: usize,
}

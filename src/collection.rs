//! Thread-safe geo collection.
//!
//! [`GeoCollection`] wraps a [`SpatialIndex`] in a single reader-writer
//! lock. Writes (`set`, `delete`) hold the lock exclusively for the whole
//! reindex, so readers never observe an item indexed at some levels but
//! not others. Reads (`item_by_key`, `get_items`, `items_within_distance`)
//! share the lock.
//!
//! # Examples
//!
//! ```rust
//! use geocollection::{GeoCollection, SearchCoveringParameters};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let collection: Arc<GeoCollection<u32, String>> = Arc::new(GeoCollection::new());
//!
//! let writer = Arc::clone(&collection);
//! thread::spawn(move || {
//!     writer.set(1, "chicago".to_string(), 41.8796, -87.6303);
//! })
//! .join()
//! .unwrap();
//!
//! let params = SearchCoveringParameters::at_level(5, 5);
//! let (found, covering) = collection.items_within_distance(41.8796, -87.6303, 1000.0, &params);
//! assert_eq!(found, vec!["chicago".to_string()]);
//! assert!(!covering.is_empty());
//! ```

use crate::config::Config;
use crate::covering::{SearchCap, SearchCoveringParameters, SearchCoveringResult};
use crate::error::Result;
use crate::geometry::{S2Geometry, SphericalGeometry};
use crate::index::{IndexStats, SpatialIndex};
use crate::validation::validate_coordinates;
use geo::Point;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;

/// Interface for location based collections.
///
/// Code that only stores and searches items can depend on this trait
/// rather than on [`GeoCollection`] directly.
pub trait LocationCollection<K, V> {
    /// Store `contents` under `key` at a location, replacing any previous record.
    fn set(&self, key: K, contents: V, latitude: f64, longitude: f64) -> Option<V>;

    /// Remove a key. Removing an unknown key is not an error.
    fn delete(&self, key: &K) -> Option<V>;

    /// Contents of every item within `distance_meters` of a point, plus the
    /// cells that were searched.
    fn items_within_distance(
        &self,
        latitude: f64,
        longitude: f64,
        distance_meters: f64,
        params: &SearchCoveringParameters,
    ) -> (Vec<V>, SearchCoveringResult);

    fn item_by_key(&self, key: &K) -> Option<V>;

    /// A page of stored contents in enumeration order.
    fn get_items(&self, page_size: usize, start_index: usize) -> Vec<V>;
}

/// Location based cache of items keyed by `K`.
pub struct GeoCollection<K, V, G = S2Geometry> {
    geometry: G,
    config: Config,
    inner: RwLock<SpatialIndex<K, V>>,
}

impl<K, V> GeoCollection<K, V, S2Geometry>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty collection with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty collection with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_geometry(S2Geometry::new(), config)
    }
}

impl<K, V> Default for GeoCollection<K, V, S2Geometry>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, G> GeoCollection<K, V, G>
where
    K: Eq + Hash + Clone,
    G: SphericalGeometry,
{
    /// Creates an empty collection over a custom geometry provider.
    pub fn with_geometry(geometry: G, config: Config) -> Self {
        let index = SpatialIndex::with_capacity(geometry.max_level(), config.initial_capacity);
        Self {
            geometry,
            config,
            inner: RwLock::new(index),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Store `contents` under `key` at a location.
    ///
    /// A key that already exists is replaced. If its coordinates are
    /// unchanged only the contents are swapped. Coordinates are not
    /// validated: out-of-range values wrap around the sphere. Use
    /// [`GeoCollection::try_set`] to reject them instead.
    ///
    /// Returns the contents previously stored under the key.
    pub fn set(&self, key: K, contents: V, latitude: f64, longitude: f64) -> Option<V> {
        if !latitude.is_finite() || !longitude.is_finite() {
            log::warn!(
                "Storing item with non-finite coordinates ({}, {})",
                latitude,
                longitude
            );
        }

        self.inner
            .write()
            .insert(&self.geometry, key, contents, latitude, longitude)
    }

    /// Like [`GeoCollection::set`], but rejects non-finite or out-of-range coordinates.
    pub fn try_set(&self, key: K, contents: V, latitude: f64, longitude: f64) -> Result<Option<V>> {
        validate_coordinates(latitude, longitude)?;
        Ok(self
            .inner
            .write()
            .insert(&self.geometry, key, contents, latitude, longitude))
    }

    /// Store `contents` at a point whose `x` is longitude and `y` latitude.
    pub fn set_point(&self, key: K, contents: V, point: &Point) -> Option<V> {
        self.set(key, contents, point.y(), point.x())
    }

    /// Remove a key and every index entry for it.
    pub fn delete(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Location a key was stored at.
    pub fn location_of(&self, key: &K) -> Option<Point> {
        self.inner.read().location_of(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    /// Compute the cells a radius search would probe, without probing them.
    pub fn search_covering(
        &self,
        latitude: f64,
        longitude: f64,
        distance_meters: f64,
        params: &SearchCoveringParameters,
    ) -> SearchCoveringResult {
        match SearchCap::from_radius_meters(latitude, longitude, distance_meters) {
            Some(cap) => SearchCoveringResult::new(self.geometry.covering_of(&cap, params)),
            None => {
                log::warn!(
                    "Rejecting radius search with invalid distance {}",
                    distance_meters
                );
                SearchCoveringResult::default()
            }
        }
    }
}

impl<K, V, G> GeoCollection<K, V, G>
where
    K: Eq + Hash + Clone,
    V: Clone,
    G: SphericalGeometry,
{
    /// Contents stored under `key`, if any.
    pub fn item_by_key(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    /// A page of stored contents.
    ///
    /// Items are enumerated in the order their keys were first stored.
    /// A `start_index` past the end yields an empty page.
    pub fn get_items(&self, page_size: usize, start_index: usize) -> Vec<V> {
        self.inner
            .read()
            .page(page_size, start_index)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Contents of all items within `distance_meters` of a point.
    ///
    /// This is an approximation: every item within the radius is returned,
    /// but items in covering cells slightly beyond it are returned too. The
    /// covering cells are returned alongside for inspection.
    pub fn items_within_distance(
        &self,
        latitude: f64,
        longitude: f64,
        distance_meters: f64,
        params: &SearchCoveringParameters,
    ) -> (Vec<V>, SearchCoveringResult) {
        let covering = self.search_covering(latitude, longitude, distance_meters, params);

        let found: Vec<V> = self
            .inner
            .read()
            .collect_covered(covering.cells())
            .into_iter()
            .cloned()
            .collect();

        log::debug!(
            "Radius search of {}m around ({}, {}) probed {} cells and found {} items",
            distance_meters,
            latitude,
            longitude,
            covering.len(),
            found.len()
        );

        (found, covering)
    }

    /// Radius search using the configured default covering parameters.
    pub fn items_within(
        &self,
        latitude: f64,
        longitude: f64,
        distance_meters: f64,
    ) -> (Vec<V>, SearchCoveringResult) {
        let params = self.config.default_covering;
        self.items_within_distance(latitude, longitude, distance_meters, &params)
    }
}

impl<K, V, G> LocationCollection<K, V> for GeoCollection<K, V, G>
where
    K: Eq + Hash + Clone,
    V: Clone,
    G: SphericalGeometry,
{
    fn set(&self, key: K, contents: V, latitude: f64, longitude: f64) -> Option<V> {
        GeoCollection::set(self, key, contents, latitude, longitude)
    }

    fn delete(&self, key: &K) -> Option<V> {
        GeoCollection::delete(self, key)
    }

    fn items_within_distance(
        &self,
        latitude: f64,
        longitude: f64,
        distance_meters: f64,
        params: &SearchCoveringParameters,
    ) -> (Vec<V>, SearchCoveringResult) {
        GeoCollection::items_within_distance(self, latitude, longitude, distance_meters, params)
    }

    fn item_by_key(&self, key: &K) -> Option<V> {
        GeoCollection::item_by_key(self, key)
    }

    fn get_items(&self, page_size: usize, start_index: usize) -> Vec<V> {
        GeoCollection::get_items(self, page_size, start_index)
    }
}

impl<K, V, G> fmt::Debug for GeoCollection<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoCollection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

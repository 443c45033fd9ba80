//! Collection builder for flexible configuration
//!
//! This module provides a builder pattern for creating collections with a
//! validated configuration and, optionally, a custom geometry provider.

use crate::collection::GeoCollection;
use crate::config::Config;
use crate::covering::SearchCoveringParameters;
use crate::error::{GeoCollectionError, Result};
use crate::geometry::{S2Geometry, SphericalGeometry};
use std::hash::Hash;
use std::path::Path;

/// Builder for collection configuration and geometry.
#[derive(Debug)]
pub struct CollectionBuilder<G = S2Geometry> {
    config: Config,
    geometry: G,
}

impl CollectionBuilder<S2Geometry> {
    /// Create a new builder with default configuration over S2 cells.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            geometry: S2Geometry::new(),
        }
    }
}

impl Default for CollectionBuilder<S2Geometry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> CollectionBuilder<G>
where
    G: SphericalGeometry,
{
    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Read the configuration from a JSON or TOML file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = Config::load(path)?;
        Ok(self)
    }

    /// Covering parameters used by [`GeoCollection::items_within`].
    pub fn default_covering(mut self, params: SearchCoveringParameters) -> Self {
        self.config.default_covering = params;
        self
    }

    /// Pre-size the collection for `capacity` items.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Use a different geometry provider.
    pub fn geometry<H: SphericalGeometry>(self, geometry: H) -> CollectionBuilder<H> {
        CollectionBuilder {
            config: self.config,
            geometry,
        }
    }

    /// Build the collection after validating the configuration.
    pub fn build<K, V>(self) -> Result<GeoCollection<K, V, G>>
    where
        K: Eq + Hash + Clone,
    {
        self.config.validate().map_err(GeoCollectionError::Config)?;

        if self.config.default_covering.max_level > self.geometry.max_level() {
            return Err(GeoCollectionError::Config(format!(
                "default_covering.max_level {} exceeds the geometry's finest level {}",
                self.config.default_covering.max_level,
                self.geometry.max_level()
            )));
        }

        Ok(GeoCollection::with_geometry(self.geometry, self.config))
    }
}

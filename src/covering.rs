//! Search regions, covering parameters and covering diagnostics.
//!
//! A radius search is turned into a [`SearchCap`], which the geometry
//! provider covers with a set of cells according to
//! [`SearchCoveringParameters`]. The cells that were actually probed are
//! returned to the caller as a [`SearchCoveringResult`].

use crate::error::{GeoCollectionError, Result};
use crate::geometry::{CellId, EARTH_RADIUS_METERS, MAX_CELL_LEVEL, cell_token};
use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Largest level step the region coverer supports.
const MAX_LEVEL_MOD: u8 = 3;

/// Controls the algorithm and parameters used to cover a search area.
///
/// Coarser levels cover more area with fewer index probes but return more
/// items outside the requested radius. `max_cells` bounds the number of
/// probes; `level_mod` restricts the covering to every Nth level above
/// `min_level`.
///
/// ```rust
/// use geocollection::SearchCoveringParameters;
///
/// let json = r#"{"min_level": 5, "max_level": 5, "level_mod": 1, "max_cells": 5}"#;
/// let params: SearchCoveringParameters = serde_json::from_str(json).unwrap();
/// assert!(!params.use_fast_covering);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCoveringParameters {
    #[serde(default = "SearchCoveringParameters::default_level_mod")]
    pub level_mod: u8,
    #[serde(default = "SearchCoveringParameters::default_max_cells")]
    pub max_cells: usize,
    #[serde(default = "SearchCoveringParameters::default_max_level")]
    pub max_level: u8,
    #[serde(default)]
    pub min_level: u8,
    /// Use the cheaper, looser covering heuristic instead of the exact one.
    #[serde(default)]
    pub use_fast_covering: bool,
}

impl SearchCoveringParameters {
    const fn default_level_mod() -> u8 {
        1
    }

    const fn default_max_cells() -> usize {
        8
    }

    const fn default_max_level() -> u8 {
        MAX_CELL_LEVEL
    }

    /// Parameters that restrict the covering to a single level.
    pub fn at_level(level: u8, max_cells: usize) -> Self {
        Self {
            level_mod: 1,
            max_cells,
            max_level: level,
            min_level: level,
            use_fast_covering: false,
        }
    }

    pub fn with_fast_covering(mut self, enabled: bool) -> Self {
        self.use_fast_covering = enabled;
        self
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn with_levels(mut self, min_level: u8, max_level: u8) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    pub fn with_level_mod(mut self, level_mod: u8) -> Self {
        self.level_mod = level_mod;
        self
    }

    /// Check that the parameters can be handed to the coverer unchanged.
    pub fn validate(&self) -> Result<()> {
        if self.max_level > MAX_CELL_LEVEL {
            return Err(GeoCollectionError::InvalidCoveringParameters(format!(
                "max_level must be at most {}, got {}",
                MAX_CELL_LEVEL, self.max_level
            )));
        }

        if self.min_level > self.max_level {
            return Err(GeoCollectionError::InvalidCoveringParameters(format!(
                "min_level ({}) must be <= max_level ({})",
                self.min_level, self.max_level
            )));
        }

        if !(1..=MAX_LEVEL_MOD).contains(&self.level_mod) {
            return Err(GeoCollectionError::InvalidCoveringParameters(format!(
                "level_mod must be between 1 and {}, got {}",
                MAX_LEVEL_MOD, self.level_mod
            )));
        }

        if self.max_cells == 0 {
            return Err(GeoCollectionError::InvalidCoveringParameters(
                "max_cells must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Clamp every field into the range the coverer accepts.
    ///
    /// Valid parameters are returned unchanged.
    pub fn normalized(&self) -> Self {
        let max_level = self.max_level.min(MAX_CELL_LEVEL);
        let normalized = Self {
            level_mod: self.level_mod.clamp(1, MAX_LEVEL_MOD),
            max_cells: self.max_cells.max(1),
            max_level,
            min_level: self.min_level.min(max_level),
            use_fast_covering: self.use_fast_covering,
        };

        if normalized != *self {
            log::debug!(
                "Adjusted covering parameters from {:?} to {:?}",
                self,
                normalized
            );
        }

        normalized
    }
}

impl Default for SearchCoveringParameters {
    fn default() -> Self {
        Self {
            level_mod: Self::default_level_mod(),
            max_cells: Self::default_max_cells(),
            max_level: Self::default_max_level(),
            min_level: 0,
            use_fast_covering: false,
        }
    }
}

/// A circular search region on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchCap {
    /// Center of the cap; `x` is longitude and `y` latitude, in degrees.
    pub center: Point,
    /// Angular radius in radians, within `[0, PI]`.
    pub angle_radians: f64,
}

impl SearchCap {
    /// Build a cap whose arc radius along the Earth's surface is `distance_meters`.
    ///
    /// Returns `None` for negative or NaN distances. Distances larger than
    /// half the Earth's circumference produce a cap covering the whole sphere.
    pub fn from_radius_meters(latitude: f64, longitude: f64, distance_meters: f64) -> Option<Self> {
        if distance_meters.is_nan() || distance_meters < 0.0 {
            return None;
        }

        Some(Self {
            center: Point::new(longitude, latitude),
            angle_radians: (distance_meters / EARTH_RADIUS_METERS).min(PI),
        })
    }

    pub fn radius_meters(&self) -> f64 {
        self.angle_radians * EARTH_RADIUS_METERS
    }
}

/// A cell chosen by the coverer, with its outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveringCell {
    pub level: u8,
    pub cell: CellId,
    /// Closed ring of `[longitude, latitude]` vertices in counter-clockwise
    /// order; the first vertex is repeated last.
    pub boundary: Vec<[f64; 2]>,
}

/// The cells scanned by a radius search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCoveringResult(Vec<CoveringCell>);

impl SearchCoveringResult {
    pub fn new(cells: Vec<CoveringCell>) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[CoveringCell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoveringCell> + '_ {
        self.0.iter()
    }

    /// Cell outlines as nested `[longitude, latitude]` rings.
    pub fn boundaries(&self) -> Vec<Vec<[f64; 2]>> {
        self.0.iter().map(|cell| cell.boundary.clone()).collect()
    }

    /// Render the covering as a GeoJSON feature collection of cell polygons.
    ///
    /// Each feature carries the cell `level` and its `token`.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .0
            .iter()
            .map(|cell| {
                let ring = cell
                    .boundary
                    .iter()
                    .map(|vertex| vec![vertex[0], vertex[1]])
                    .collect();

                let mut properties = JsonObject::new();
                properties.insert("level".to_string(), cell.level.into());
                properties.insert("token".to_string(), cell_token(cell.cell).into());

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }
}

impl IntoIterator for SearchCoveringResult {
    type Item = CoveringCell;
    type IntoIter = std::vec::IntoIter<CoveringCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

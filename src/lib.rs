//! In-memory geospatial collection with multi-resolution S2 indexing.
//!
//! Items are stored under a key at a latitude/longitude and can be fetched
//! by key, paged through, or searched by distance from a point. Every item
//! is indexed in the cell containing it at each of the 31 S2 levels, so a
//! radius search only needs to probe the handful of cells that cover the
//! search area.
//!
//! ```rust
//! use geocollection::{GeoCollection, SearchCoveringParameters};
//!
//! let collection: GeoCollection<u32, &str> = GeoCollection::new();
//! collection.set(1, "chicago", 41.8796, -87.6303);
//! collection.set(2, "manhattan", 40.7531, -73.9812);
//!
//! let params = SearchCoveringParameters::at_level(5, 5);
//! let (nearby, _covering) = collection.items_within_distance(41.8786, -87.6313, 1000.0, &params);
//! assert_eq!(nearby, vec!["chicago"]);
//!
//! collection.delete(&1);
//! assert_eq!(collection.item_by_key(&1), None);
//! # Ok::<(), geocollection::GeoCollectionError>(())
//! ```

pub mod builder;
pub mod collection;
pub mod config;
pub mod covering;
pub mod error;
pub mod geometry;
pub mod index;
pub mod validation;

pub use builder::CollectionBuilder;
pub use collection::{GeoCollection, LocationCollection};
pub use config::Config;
pub use covering::{CoveringCell, SearchCap, SearchCoveringParameters, SearchCoveringResult};
pub use error::{GeoCollectionError, Result};
pub use geometry::{
    CellId, EARTH_RADIUS_METERS, LEVEL_COUNT, MAX_CELL_LEVEL, S2Geometry, SphericalGeometry,
    earth_distance_meters, point_from_lat_lng,
};
pub use index::{CellSlot, IndexStats, SpatialIndex};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{
        CollectionBuilder, Config, GeoCollection, GeoCollectionError, LocationCollection, Result,
        SearchCoveringParameters, SearchCoveringResult,
    };

    pub use geo::Point;
}

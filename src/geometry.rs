//! Spherical geometry used by the index.
//!
//! The index never computes cells or coverings itself; it asks a
//! [`SphericalGeometry`] provider. [`S2Geometry`] is the default provider,
//! backed by the `s2` crate's hierarchical cell decomposition.

use crate::covering::{CoveringCell, SearchCap, SearchCoveringParameters};
use geo::Point;
use s2::cap::Cap;
use s2::cell::Cell;
use s2::cellid::CellID;
use s2::latlng::LatLng;
use s2::point::Point as S2Point;
use s2::region::RegionCoverer;
use s2::s1::{Angle, Rad};

/// Mean radius of the Earth in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Level of a leaf cell in the S2 hierarchy.
pub const MAX_CELL_LEVEL: u8 = 30;

/// Number of levels an item is indexed under, leaf to root inclusive.
pub const LEVEL_COUNT: usize = MAX_CELL_LEVEL as usize + 1;

/// Identifier of a cell at some level of the hierarchy.
pub type CellId = u64;

/// Capability the index needs from a spherical geometry library.
pub trait SphericalGeometry: Send + Sync {
    /// The finest level; items are indexed at every level in `0..=max_level()`.
    fn max_level(&self) -> u8;

    /// The leaf cell containing a point.
    fn leaf_cell_of(&self, latitude: f64, longitude: f64) -> CellId;

    /// The ancestor of `cell` at `level`. At the leaf level this is `cell` itself.
    fn ancestor_at(&self, cell: CellId, level: u8) -> CellId;

    /// A set of cells whose union contains `cap`.
    fn covering_of(&self, cap: &SearchCap, params: &SearchCoveringParameters)
    -> Vec<CoveringCell>;

    /// Great-circle distance in radians. Points use `x` = longitude, `y` = latitude.
    fn angular_distance(&self, a: &Point, b: &Point) -> f64;
}

/// Geometry provider backed by S2 cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct S2Geometry;

impl S2Geometry {
    pub fn new() -> Self {
        Self
    }
}

impl SphericalGeometry for S2Geometry {
    fn max_level(&self) -> u8 {
        MAX_CELL_LEVEL
    }

    fn leaf_cell_of(&self, latitude: f64, longitude: f64) -> CellId {
        let latlng = LatLng::from_degrees(latitude, longitude);
        CellID::from(&latlng).0
    }

    fn ancestor_at(&self, cell: CellId, level: u8) -> CellId {
        CellID(cell).parent(u64::from(level)).0
    }

    fn covering_of(
        &self,
        cap: &SearchCap,
        params: &SearchCoveringParameters,
    ) -> Vec<CoveringCell> {
        let params = params.normalized();
        let center = to_s2_point(&cap.center);
        let region = Cap::from_center_angle(&center, &Angle::from(Rad(cap.angle_radians)));

        let coverer = RegionCoverer {
            min_level: params.min_level,
            max_level: params.max_level,
            level_mod: params.level_mod,
            max_cells: params.max_cells,
        };

        let union = if params.use_fast_covering {
            coverer.fast_covering(&region)
        } else {
            coverer.covering(&region)
        };

        union
            .0
            .iter()
            .map(|cell_id| CoveringCell {
                level: cell_id.level() as u8,
                cell: cell_id.0,
                boundary: cell_boundary(cell_id),
            })
            .collect()
    }

    fn angular_distance(&self, a: &Point, b: &Point) -> f64 {
        to_s2_point(a).distance(&to_s2_point(b)).rad()
    }
}

fn to_s2_point(point: &Point) -> S2Point {
    let latlng = LatLng::from_degrees(point.y(), point.x());
    S2Point::from(&latlng)
}

/// Vertices of a cell as a closed `[longitude, latitude]` ring.
///
/// S2 numbers cell vertices counter-clockwise starting at the lower left.
fn cell_boundary(cell_id: &CellID) -> Vec<[f64; 2]> {
    let cell = Cell::from(cell_id);
    let mut ring: Vec<[f64; 2]> = (0..4)
        .map(|k| {
            let vertex = LatLng::from(&cell.vertex(k));
            [vertex.lng.deg(), vertex.lat.deg()]
        })
        .collect();

    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Build a point from a latitude/longitude pair given in degrees.
pub fn point_from_lat_lng(latitude: f64, longitude: f64) -> Point {
    Point::new(longitude, latitude)
}

/// Distance in meters between two points on the surface of the Earth.
///
/// ```rust
/// use geocollection::geometry::{earth_distance_meters, point_from_lat_lng};
///
/// let a = point_from_lat_lng(41.883170, -87.632278);
/// let b = point_from_lat_lng(41.883178, -87.630916);
/// assert!((earth_distance_meters(&a, &b) - 105.0).abs() < 10.0);
/// ```
pub fn earth_distance_meters(a: &Point, b: &Point) -> f64 {
    S2Geometry.angular_distance(a, b) * EARTH_RADIUS_METERS
}

/// Compact hex form of a cell id with trailing zeros removed.
pub fn cell_token(cell: CellId) -> String {
    if cell == 0 {
        return "X".to_string();
    }
    format!("{:016x}", cell).trim_end_matches('0').to_string()
}

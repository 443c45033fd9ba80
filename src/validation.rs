//! Validation for geographic coordinates.

use crate::error::{GeoCollectionError, Result};

/// Validates a latitude/longitude pair in degrees.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use geocollection::validation::validate_coordinates;
///
/// assert!(validate_coordinates(40.7128, -74.0060).is_ok());
/// assert!(validate_coordinates(95.0, -74.0).is_err());
/// assert!(validate_coordinates(40.0, 200.0).is_err());
/// ```
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() {
        return Err(GeoCollectionError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !longitude.is_finite() {
        return Err(GeoCollectionError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoCollectionError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoCollectionError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(())
}

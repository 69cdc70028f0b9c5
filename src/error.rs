//! Unified error handling for the spot-discovery library.
//!
//! Only garbage input is an error here: coordinates that are non-finite or
//! outside the valid lat/lon range, and configurations that cannot be
//! evaluated. Everything that is merely absent or empty — no clues, no spots
//! left to explore, zero ratings — is signalled with `Option`, empty
//! collections, or `DiscoveryOutcome::NoChange`, never with an `Err`.

use thiserror::Error;

use crate::GeoLocation;

/// Unified error type for spot-discovery operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    /// Input location is non-finite or outside valid lat/lon range
    #[error("invalid coordinates ({latitude}, {longitude}): {message}")]
    InvalidCoordinates {
        latitude: f64,
        longitude: f64,
        message: String,
    },
    /// Configuration cannot be evaluated
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl DiscoveryError {
    /// Build an `InvalidCoordinates` error for a rejected location.
    pub(crate) fn invalid_location(location: &GeoLocation, message: &str) -> Self {
        DiscoveryError::InvalidCoordinates {
            latitude: location.latitude,
            longitude: location.longitude,
            message: message.to_string(),
        }
    }
}

/// Result type alias for spot-discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Reject locations the geodesic math cannot handle.
pub(crate) fn ensure_valid_location(location: &GeoLocation) -> Result<()> {
    if !location.is_valid() {
        return Err(DiscoveryError::invalid_location(
            location,
            "latitude must be in [-90, 90] and longitude in [-180, 180]",
        ));
    }
    Ok(())
}

//! Coordinate record and parse error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A coordinate pair exactly as supplied by the user or an import.
///
/// Values are kept as text; they are only interpreted when a resolution
/// attempt is made, so malformed values travel through the scheduler and
/// come back out untouched in the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (comma or dot separator).
    pub latitude: String,
    /// Longitude in decimal degrees (comma or dot separator).
    pub longitude: String,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude text.
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Creates a coordinate from already-parsed decimal degrees.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude.to_string(), longitude.to_string())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Errors raised while parsing coordinate text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Text does not match the expected coordinate format.
    #[error("Invalid coordinate format: '{input}'")]
    Format {
        /// The rejected input.
        input: String,
    },
}

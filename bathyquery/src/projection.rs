//! Spherical Web Mercator projection and query envelopes.
//!
//! The bathymetry service works in Web Mercator Auxiliary Sphere
//! (WKID 102100), so every lookup converts a geographic point into projected
//! metres and wraps it in a square envelope.

use std::f64::consts::FRAC_PI_4;

use serde_json::{json, Value};

/// Sphere radius used by the Web Mercator projection, in metres.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Web Mercator Auxiliary Sphere spatial reference id.
pub const WEB_MERCATOR_WKID: u32 = 102100;

/// Default half-width of a query envelope, in metres.
pub const DEFAULT_HALF_WIDTH_M: f64 = 1000.0;

/// Spatial reference tag attached to geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialReference {
    /// Well-known id of the reference system.
    pub wkid: u32,
}

impl SpatialReference {
    /// Web Mercator Auxiliary Sphere.
    pub const WEB_MERCATOR: SpatialReference = SpatialReference {
        wkid: WEB_MERCATOR_WKID,
    };
}

/// Axis-aligned bounding box in projected coordinates.
///
/// Recomputed for every attempt; never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub spatial_reference: SpatialReference,
}

impl Envelope {
    /// Envelope geometry JSON in the shape the service expects:
    /// `{"xmin":..,"ymin":..,"xmax":..,"ymax":..,"spatialReference":{"wkid":102100}}`
    pub fn to_json(&self) -> Value {
        json!({
            "xmin": self.xmin,
            "ymin": self.ymin,
            "xmax": self.xmax,
            "ymax": self.ymax,
            "spatialReference": { "wkid": self.spatial_reference.wkid },
        })
    }

    /// Centre of the envelope.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// Width of the envelope in projected units.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the envelope in projected units.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Projects latitude/longitude in degrees to spherical Web Mercator metres.
///
/// Returns `(x, y)`. No range validation is done; latitudes at the poles
/// produce infinite `y`.
#[inline]
pub fn to_web_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Builds a square envelope of side `2 * half_width_m` centred on the
/// projected point.
///
/// Callers must reject NaN or missing coordinates before calling.
///
/// # Examples
///
/// ```
/// use bathyquery::projection::{to_envelope, DEFAULT_HALF_WIDTH_M};
///
/// let env = to_envelope(0.0, 0.0, DEFAULT_HALF_WIDTH_M);
/// assert_eq!(env.xmin, -1000.0);
/// assert!((env.ymax - 1000.0).abs() < 1e-6);
/// ```
pub fn to_envelope(lat: f64, lon: f64, half_width_m: f64) -> Envelope {
    let (x, y) = to_web_mercator(lat, lon);
    Envelope {
        xmin: x - half_width_m,
        ymin: y - half_width_m,
        xmax: x + half_width_m,
        ymax: y + half_width_m,
        spatial_reference: SpatialReference::WEB_MERCATOR,
    }
}

//! BathyQuery - bathymetry depth lookup for coordinate lists
//!
//! This library resolves latitude/longitude pairs to depth features by
//! querying an ArcGIS MapServer `dynamicLayer/query` endpoint. Requests are
//! issued in rate-limited batches and each coordinate falls back through
//! successive map layers until one returns data or its attempts run out.
//!
//! # Modules
//!
//! - [`coord`]: coordinate values and text parsing (decimal and DMS)
//! - [`projection`]: WGS84 to Web Mercator and query envelopes
//! - [`provider`]: query parameters, HTTP transport and the ArcGIS source
//! - [`scheduler`]: the batch scheduler with layer fallback
//! - [`telemetry`]: counters for a resolution run
//! - [`import`]: survey CSV import
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod coord;
pub mod import;
pub mod logging;
pub mod projection;
pub mod provider;
pub mod scheduler;
pub mod telemetry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

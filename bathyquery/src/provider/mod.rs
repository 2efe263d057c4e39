//! Depth lookup against the external spatial query service
//!
//! This module provides the query builder, the HTTP client abstraction and
//! the ArcGIS-backed [`DepthSource`] used by the batch scheduler.
//!
//! ```ignore
//! use bathyquery::provider::{ArcGisDepthSource, ProviderSettings, ReqwestClient};
//!
//! let settings = ProviderSettings::default();
//! let client = ReqwestClient::with_timeout(settings.timeout_secs)?;
//! let source = ArcGisDepthSource::new(client, settings);
//! let response = source.fetch_depth(&envelope, 0).await?;
//! ```

mod arcgis;
mod http;
pub mod query;
mod types;

pub use arcgis::{ArcGisDepthSource, ProviderSettings, DEFAULT_DEPTH_FIELD, DEFAULT_ENDPOINT};
pub use http::{AsyncHttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use query::{build_query_params, QueryParams};
pub use types::{DepthSource, FetchError, Feature, Field, QueryResponse, ServiceFault};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

//! ArcGIS MapServer bathymetry source.
//!
//! Queries a MapServer `dynamicLayer/query` endpoint for depth features
//! intersecting a Web Mercator envelope.
//!
//! # Request
//!
//! `GET {endpoint}?f=json&returnGeometry=false&spatialRel=esriSpatialRelIntersects
//!  &geometry={envelope}&geometryType=esriGeometryEnvelope&inSR=102100&outSR=102100
//!  &outFields={depth_field}&layer={"source":{"type":"mapLayer","mapLayerId":N}}`
//!
//! - No authentication
//! - Layers are numbered data sources; higher numbers are fallback datasets
//!
//! # Errors
//!
//! ArcGIS servers frequently answer `200 OK` with an `{"error": {...}}`
//! body. That is reported as [`FetchError::Api`] carrying the embedded code,
//! the same as a real HTTP failure.

use tracing::trace;

use crate::projection::Envelope;
use crate::provider::query::build_query_params;
use crate::provider::{AsyncHttpClient, DepthSource, FetchError, QueryResponse};

/// Default query endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://gis.ngdc.noaa.gov/arcgis/rest/services/nos_hydro_dynamic/MapServer/dynamicLayer/query";

/// Default name of the depth attribute.
pub const DEFAULT_DEPTH_FIELD: &str = "DEPTH";

/// Connection settings for the depth service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Query endpoint URL.
    pub endpoint: String,
    /// Attribute requested from the service.
    pub depth_field: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            depth_field: DEFAULT_DEPTH_FIELD.to_string(),
            timeout_secs: crate::provider::http::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderSettings {
    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the depth attribute name.
    pub fn with_depth_field(mut self, field: impl Into<String>) -> Self {
        self.depth_field = field.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Depth source backed by an ArcGIS MapServer.
///
/// # Example
///
/// ```ignore
/// use bathyquery::provider::{ArcGisDepthSource, ProviderSettings, ReqwestClient};
///
/// let client = ReqwestClient::new()?;
/// let source = ArcGisDepthSource::new(client, ProviderSettings::default());
/// // Hand the source to a BatchScheduler...
/// ```
pub struct ArcGisDepthSource<C: AsyncHttpClient> {
    http_client: C,
    settings: ProviderSettings,
}

impl<C: AsyncHttpClient> ArcGisDepthSource<C> {
    /// Creates a new ArcGIS depth source.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `settings` - Endpoint and depth field
    pub fn new(http_client: C, settings: ProviderSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    /// Settings this source was built with.
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

impl<C: AsyncHttpClient> DepthSource for ArcGisDepthSource<C> {
    async fn fetch_depth(
        &self,
        envelope: &Envelope,
        layer: u32,
    ) -> Result<QueryResponse, FetchError> {
        let params = build_query_params(envelope, layer, &self.settings.depth_field);
        let body = self
            .http_client
            .get(&self.settings.endpoint, params.as_pairs())
            .await?;

        let response: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        if let Some(fault) = response.error {
            return Err(FetchError::Api { status: fault.code });
        }

        trace!(
            layer,
            features = response.features.len(),
            "Depth query answered"
        );
        Ok(response)
    }

    fn name(&self) -> &str {
        "ArcGIS"
    }
}

//! Core types for depth lookups.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::projection::Envelope;

/// Errors from a single depth lookup.
///
/// None of these are fatal to a resolution run: the scheduler folds every
/// variant into a "no features" attempt and moves on to the next layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The service answered with a non-success status.
    #[error("Service returned HTTP {status}")]
    Api {
        /// HTTP status code (or the service's embedded error code).
        status: u16,
    },

    /// The request never completed (timeout, DNS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not a valid query response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Api { status } => Some(*status),
            _ => None,
        }
    }
}

/// One attributed record returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Attribute name to scalar value.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    /// Creates a feature carrying a single numeric attribute.
    pub fn with_value(name: &str, value: f64) -> Self {
        let mut attributes = Map::new();
        attributes.insert(name.to_string(), Value::from(value));
        Self { attributes }
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Reads an attribute as a number.
    ///
    /// Accepts numeric values and numeric strings (with either decimal
    /// separator), since services are not consistent about field types.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.attribute(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => crate::coord::parse_decimal(s),
            _ => None,
        }
    }
}

/// Field descriptor from the response's `fields` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Error object some services embed in a `200 OK` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFault {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// Query response document.
///
/// The shape is dictated by the service: `displayFieldName`, `features`,
/// `fieldAliases` and `fields`. Missing members default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub display_field_name: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub field_aliases: Map<String, Value>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceFault>,
}

impl QueryResponse {
    /// Creates a response holding only the given features.
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }
}

/// A source of depth features for a projected envelope.
///
/// One call is one network request against one layer. Implementations
/// must not retry; retry and layer fallback belong to the scheduler.
pub trait DepthSource: Send + Sync {
    /// Queries `layer` for features intersecting `envelope`.
    fn fetch_depth(
        &self,
        envelope: &Envelope,
        layer: u32,
    ) -> impl Future<Output = Result<QueryResponse, FetchError>> + Send;

    /// Human-readable source name for logs.
    fn name(&self) -> &str;
}

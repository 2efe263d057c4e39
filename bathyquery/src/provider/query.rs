//! Query parameter construction for the spatial query endpoint.

use serde_json::json;

use crate::projection::Envelope;

/// Spatial relationship requested from the service.
pub const SPATIAL_REL_INTERSECTS: &str = "esriSpatialRelIntersects";

/// Geometry type tag for envelope queries.
pub const GEOMETRY_TYPE_ENVELOPE: &str = "esriGeometryEnvelope";

/// Ordered key/value parameters for one query request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Looks up a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters in insertion order, ready for URL encoding.
    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Builds the request parameters for querying `layer` over `envelope`.
///
/// The layer is addressed as a dynamic map-layer source so any numbered
/// layer of the service can be queried through the same endpoint. Only
/// `depth_field` is requested and geometry is not returned.
pub fn build_query_params(envelope: &Envelope, layer: u32, depth_field: &str) -> QueryParams {
    let wkid = envelope.spatial_reference.wkid.to_string();
    let layer_source = json!({
        "source": { "type": "mapLayer", "mapLayerId": layer },
    });

    QueryParams {
        pairs: vec![
            ("f", "json".to_string()),
            ("returnGeometry", "false".to_string()),
            ("spatialRel", SPATIAL_REL_INTERSECTS.to_string()),
            ("geometry", envelope.to_json().to_string()),
            ("geometryType", GEOMETRY_TYPE_ENVELOPE.to_string()),
            ("inSR", wkid.clone()),
            ("outSR", wkid),
            ("outFields", depth_field.to_string()),
            ("layer", layer_source.to_string()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::to_envelope;
    use serde_json::Value;

    fn sample_params(layer: u32) -> QueryParams {
        let envelope = to_envelope(-2.21, -47.43, 1000.0);
        build_query_params(&envelope, layer, "depth")
    }

    #[test]
    fn test_fixed_fields() {
        let params = sample_params(0);
        assert_eq!(params.get("f"), Some("json"));
        assert_eq!(params.get("returnGeometry"), Some("false"));
        assert_eq!(params.get("spatialRel"), Some("esriSpatialRelIntersects"));
        assert_eq!(params.get("geometryType"), Some("esriGeometryEnvelope"));
        assert_eq!(params.get("inSR"), Some("102100"));
        assert_eq!(params.get("outSR"), Some("102100"));
        assert_eq!(params.get("outFields"), Some("depth"));
        assert_eq!(params.len(), 9);
    }

    #[test]
    fn test_geometry_is_envelope_json() {
        let envelope = to_envelope(-2.21, -47.43, 1000.0);
        let params = build_query_params(&envelope, 0, "depth");
        let geometry: Value = serde_json::from_str(params.get("geometry").unwrap()).unwrap();

        assert_eq!(geometry["xmin"].as_f64().unwrap(), envelope.xmin);
        assert_eq!(geometry["ymax"].as_f64().unwrap(), envelope.ymax);
        assert_eq!(geometry["spatialReference"]["wkid"], 102100);
    }

    #[test]
    fn test_layer_selector_names_dynamic_layer() {
        let params = sample_params(3);
        let layer: Value = serde_json::from_str(params.get("layer").unwrap()).unwrap();
        assert_eq!(layer["source"]["type"], "mapLayer");
        assert_eq!(layer["source"]["mapLayerId"], 3);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sample_params(2), sample_params(2));
        assert_ne!(sample_params(1), sample_params(2));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(sample_params(0).get("token"), None);
    }
}

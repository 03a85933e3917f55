use std::collections::HashMap;

use geo::{HasDimensions, Validation};

use crate::geofile::feature::FeatureCollection;

/// One invalid feature together with the human-readable cause.
#[derive(Debug, Clone)]
pub struct InvalidFeature {
    pub attributes: Option<HashMap<String, String>>,
    pub invalid_cause: String,
}

/// The invalid subset of a feature collection, in collection order.
#[derive(Debug, Default)]
pub struct InvalidityReport {
    pub entries: Vec<InvalidFeature>,
}

impl InvalidityReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collect every feature whose geometry fails the validity predicate and
/// assign it a cause. Pure and total, valid features are skipped.
pub fn classify_invalid(collection: &FeatureCollection) -> InvalidityReport {
    let entries = collection
        .features
        .iter()
        .filter(|feature| !feature.geometry.is_valid())
        .map(|feature| InvalidFeature {
            attributes: feature.attributes.clone(),
            invalid_cause: invalid_cause(&feature.geometry),
        })
        .collect();
    InvalidityReport { entries }
}

/// Human-readable cause for an invalid geometry. First match wins; the
/// emptiness checks are only reached when the validity predicate passes.
pub fn invalid_cause(geometry: &geo::Geometry) -> String {
    let cause = match geometry {
        geo::Geometry::Polygon(polygon) => {
            if !polygon.is_valid() {
                "Invalid Polygon: Self-intersection detected"
            } else if polygon.is_empty() {
                "Invalid Polygon: Empty geometry"
            } else {
                "Invalid Polygon: Unknown reason"
            }
        }
        geo::Geometry::MultiPolygon(multi_polygon) => {
            if !multi_polygon.is_valid() {
                "Invalid MultiPolygon: Invalid components detected"
            } else if multi_polygon.is_empty() {
                "Invalid MultiPolygon: Empty geometry"
            } else {
                "Invalid MultiPolygon: Unknown reason"
            }
        }
        _ => "Unknown geometry type",
    };
    cause.to_owned()
}

use std::collections::HashMap;

use geo::Centroid;

#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: geo::Geometry,
    // TODO support different value types besides String. See gdal::vector::OGRFieldType for types
    // supported by GDAL.
    pub attributes: Option<HashMap<String, String>>,
}

impl From<geo::Geometry> for Feature {
    fn from(value: geo::Geometry) -> Self {
        Self {
            geometry: value,
            attributes: None,
        }
    }
}

/// All features read from one geofile, in file order, together with the
/// attribute schema of the source layer.
#[derive(Debug, Default)]
pub struct FeatureCollection {
    /// Field names in layer definition order.
    pub field_names: Vec<String>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(field_names: Vec<String>, features: Vec<Feature>) -> Self {
        Self {
            field_names,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Mean of the per-feature centroid x and y coordinates, used as the
    /// initial center of the rendered map. Features without a computable
    /// centroid (e.g. empty geometries) are left out of the mean.
    pub fn mean_centroid(&self) -> Option<geo::Point> {
        let centroids: Vec<geo::Point> = self
            .features
            .iter()
            .filter_map(|feature| feature.geometry.centroid())
            .collect();
        if centroids.is_empty() {
            return None;
        }
        let count = centroids.len() as f64;
        let (sum_x, sum_y) = centroids
            .iter()
            .fold((0.0, 0.0), |(x, y), point| (x + point.x(), y + point.y()));
        Some(geo::Point::new(sum_x / count, sum_y / count))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{Feature, FeatureCollection};

    #[test]
    fn test_mean_centroid_is_mean_of_feature_centroids() {
        let collection = FeatureCollection::new(
            Vec::new(),
            vec![
                Feature::from(geo::Geometry::Point(geo::Point::new(0.0, 0.0))),
                Feature::from(geo::Geometry::Point(geo::Point::new(2.0, 4.0))),
            ],
        );

        let centroid = collection.mean_centroid().unwrap();
        assert_abs_diff_eq!(centroid.x(), 1.0);
        assert_abs_diff_eq!(centroid.y(), 2.0);
    }

    #[test]
    fn test_mean_centroid_of_empty_collection_is_none() {
        let collection = FeatureCollection::default();
        assert!(collection.mean_centroid().is_none());
    }
}

use std::{fs, io, path::Path};

use super::feature::FeatureCollection;

/// Convert a feature collection to a GeoJSON document, carrying the
/// attributes of each feature as properties.
pub fn features_to_geojson(collection: &FeatureCollection) -> geojson::GeoJson {
    let feature_collection: geojson::FeatureCollection = collection
        .features
        .iter()
        .map(|feature| {
            let mut properties = geojson::JsonObject::new();
            if let Some(attributes) = &feature.attributes {
                for field_name in &collection.field_names {
                    if let Some(value) = attributes.get(field_name) {
                        properties.insert(
                            field_name.to_owned(),
                            serde_json::Value::String(value.to_owned()),
                        );
                    }
                }
            }
            geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::from(geojson::Value::from(
                    &feature.geometry,
                ))),
                id: None,
                properties: (!properties.is_empty()).then_some(properties),
                foreign_members: None,
            }
        })
        .collect();
    geojson::GeoJson::from(feature_collection)
}

pub fn write_features_to_geojson(
    collection: &FeatureCollection,
    output_filepath: &Path,
) -> io::Result<()> {
    fs::write(output_filepath, features_to_geojson(collection).to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::geofile::feature::{Feature, FeatureCollection};

    use super::features_to_geojson;

    #[test]
    fn test_features_to_geojson_carries_attributes_as_properties() {
        let collection = FeatureCollection::new(
            vec!["name".to_string()],
            vec![
                Feature {
                    geometry: geo::Geometry::Point(geo::Point::new(1.0, 2.0)),
                    attributes: Some(HashMap::from([("name".to_string(), "a".to_string())])),
                },
                Feature::from(geo::Geometry::Point(geo::Point::new(3.0, 4.0))),
            ],
        );

        let geojson_document = features_to_geojson(&collection);
        let feature_collection = match geojson_document {
            geojson::GeoJson::FeatureCollection(feature_collection) => feature_collection,
            other => panic!("Expected a FeatureCollection, got {:?}", other),
        };

        assert_eq!(2, feature_collection.features.len());
        let properties = feature_collection.features[0].properties.as_ref().unwrap();
        assert_eq!("a", properties["name"]);
        assert!(feature_collection.features[1].properties.is_none());
    }
}

use std::{fs, io::Cursor};

use thiserror::Error;

use super::feature::FeatureCollection;
use super::gdal_geofile::{read_features_from_geofile, GdalDriverType};

/// Error type returned by [`ingest`].
///
/// Every variant is terminal for the current invocation; the caller reports
/// it and may re-invoke with another file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The filename extension is none of .kml, .zip, .geojson, .json.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded zip archive contains no .shp entry.
    #[error("no .shp entry found in zip archive")]
    NoShapefileFound,

    /// The zip archive itself could not be read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Staging the uploaded bytes to a temporary location failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// GDAL could not decode the staged file. The underlying message is
    /// passed through verbatim.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Decode an uploaded geofile into a [`FeatureCollection`].
///
/// The decoding strategy is selected by the lowercase filename suffix:
/// .kml and .geojson/.json are decoded directly with the matching GDAL
/// driver, .zip archives are extracted and the contained shapefile is read.
pub fn ingest(filename: &str, content: &[u8]) -> Result<FeatureCollection, IngestError> {
    let lowercase_filename = filename.to_ascii_lowercase();
    if lowercase_filename.ends_with(".kml") {
        decode_staged(content, "upload.kml", GdalDriverType::Kml)
    } else if lowercase_filename.ends_with(".zip") {
        ingest_zipped_shapefile(content)
    } else if lowercase_filename.ends_with(".geojson") || lowercase_filename.ends_with(".json") {
        decode_staged(content, "upload.geojson", GdalDriverType::GeoJson)
    } else {
        Err(IngestError::UnsupportedFormat(filename.to_owned()))
    }
}

/// Stage the uploaded bytes in a temporary directory and decode them with
/// the given driver. The directory is removed when this returns, also on
/// the error paths.
fn decode_staged(
    content: &[u8],
    staged_filename: &str,
    driver: GdalDriverType,
) -> Result<FeatureCollection, IngestError> {
    let tmpdir = tempfile::tempdir()?;
    let staged_filepath = tmpdir.path().join(staged_filename);
    fs::write(&staged_filepath, content)?;
    read_features_from_geofile(&staged_filepath, driver)
        .map_err(|err| IngestError::Decode(err.to_string()))
}

fn ingest_zipped_shapefile(content: &[u8]) -> Result<FeatureCollection, IngestError> {
    let tmpdir = tempfile::tempdir()?;
    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    archive.extract(tmpdir.path())?;

    let mut shapefile_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.to_ascii_lowercase().ends_with(".shp"))
        .map(|name| name.to_owned())
        .collect();
    // Pick deterministically when the archive holds several shapefiles.
    shapefile_names.sort();
    let shapefile_name = match shapefile_names.first() {
        Some(name) => name,
        None => return Err(IngestError::NoShapefileFound),
    };
    if 1 < shapefile_names.len() {
        log::warn!(
            "Archive contains {} shapefiles, reading {:?}",
            shapefile_names.len(),
            shapefile_name
        );
    }

    read_features_from_geofile(
        &tmpdir.path().join(shapefile_name),
        GdalDriverType::EsriShapefile,
    )
    .map_err(|err| IngestError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::io::Write;

    use rstest::rstest;
    use testdir::testdir;

    use super::{ingest, IngestError};
    use crate::geofile::feature::Feature;
    use crate::geofile::gdal_geofile::{write_features_to_geofile, GdalDriverType};

    const POINTS_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "one", "value": 1},
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
            },
            {
                "type": "Feature",
                "properties": {"name": "two", "value": 2},
                "geometry": {"type": "Point", "coordinates": [3.0, 4.0]}
            }
        ]
    }"#;

    const PLACEMARK_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>somewhere</name>
      <Point>
        <coordinates>139.79,35.68</coordinates>
      </Point>
    </Placemark>
  </Document>
</kml>
"#;

    fn zip_directory_contents(dir: &std::path::Path) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().unwrap().to_str().unwrap().to_owned();
            writer
                .start_file(name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(&fs::read(&path).unwrap()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[rstest]
    #[case("data.xyz")]
    #[case("data")]
    #[case("data.shp")]
    fn test_ingest_rejects_unsupported_extensions(#[case] filename: &str) {
        let result = ingest(filename, b"irrelevant");
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_ingest_zip_without_shapefile_entry() {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("readme.txt", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"nothing spatial here").unwrap();
        let content = writer.finish().unwrap().into_inner();

        let result = ingest("data.zip", &content);
        assert!(matches!(result, Err(IngestError::NoShapefileFound)));
    }

    #[rstest]
    #[case("points.geojson")]
    #[case("points.json")]
    #[case("POINTS.GEOJSON")]
    fn test_ingest_geojson(#[case] filename: &str) {
        let collection = ingest(filename, POINTS_GEOJSON.as_bytes()).unwrap();
        assert_eq!(2, collection.len());
        assert_eq!(
            vec!["name".to_string(), "value".to_string()],
            collection.field_names
        );
        let attributes = collection.features[0].attributes.as_ref().unwrap();
        assert_eq!("one", attributes["name"]);
        assert!(matches!(
            collection.features[0].geometry,
            geo::Geometry::Point(_)
        ));
    }

    #[test]
    fn test_ingest_kml_placemark() {
        let collection = ingest("somewhere.kml", PLACEMARK_KML.as_bytes()).unwrap();
        assert_eq!(1, collection.len());
        assert!(matches!(
            collection.features[0].geometry,
            geo::Geometry::Point(_)
        ));
    }

    #[test]
    fn test_ingest_malformed_geojson_is_a_decode_error() {
        let result = ingest("broken.geojson", b"{ not geojson at all");
        assert!(matches!(result, Err(IngestError::Decode(_))));
    }

    #[test]
    fn test_ingest_zipped_shapefile_round_trip() {
        let features = vec![
            Feature {
                geometry: geo::Geometry::Point(geo::Point::new(10.0, 20.0)),
                attributes: Some(HashMap::from([("name".to_string(), "a".to_string())])),
            },
            Feature {
                geometry: geo::Geometry::Point(geo::Point::new(30.0, 40.0)),
                attributes: Some(HashMap::from([("name".to_string(), "b".to_string())])),
            },
        ];

        let test_dir = testdir!();
        write_features_to_geofile(
            &features,
            &test_dir.join("points.shp"),
            None,
            GdalDriverType::EsriShapefile,
        )
        .unwrap();

        let content = zip_directory_contents(&test_dir);
        let collection = ingest("points.zip", &content).unwrap();
        assert_eq!(features.len(), collection.len());
        assert_eq!(vec!["name".to_string()], collection.field_names);
    }
}

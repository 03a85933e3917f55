use anyhow::{anyhow, Context};
use gdal::vector::LayerAccess;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::{collections::HashMap, collections::HashSet, path::Path};

use super::feature::{Feature, FeatureCollection};

pub enum GdalDriverType {
    Kml,
    GeoJson,
    EsriShapefile,
    GeoPackage,
}

impl GdalDriverType {
    pub fn name(&self) -> &'static str {
        match self {
            GdalDriverType::Kml => "KML",
            GdalDriverType::GeoJson => "GeoJSON",
            GdalDriverType::EsriShapefile => "ESRI Shapefile",
            GdalDriverType::GeoPackage => "GPKG",
        }
    }
}

/// Read all features of a vector geofile through the given GDAL driver.
///
/// The first layer of the dataset is read. Features whose geometry cannot be
/// converted are skipped with a warning, so every returned feature carries a
/// usable geometry.
pub fn read_features_from_geofile(
    filepath: &Path,
    driver: GdalDriverType,
) -> anyhow::Result<FeatureCollection> {
    gdal::DriverManager::register_all();
    let allowed_drivers = [driver.name()];
    let mut open_options = gdal::DatasetOptions::default();
    open_options.open_flags = gdal::GdalOpenFlags::GDAL_OF_VECTOR;
    open_options.allowed_drivers = Some(&allowed_drivers);
    let dataset = gdal::Dataset::open_ex(filepath, open_options)?;

    let layer_count = dataset.layer_count();
    if 0 == layer_count {
        return Err(anyhow!("Found no layers in {:?}", filepath));
    }
    if 1 < layer_count {
        log::warn!(
            "Found {} layers in {:?}, only the first one is read.",
            layer_count,
            filepath
        );
    }
    let mut layer = dataset.layer(0)?;

    let field_names: Vec<String> = layer.defn().fields().map(|field| field.name()).collect();

    let mut features = Vec::new();
    for gdal_feature in layer.features() {
        let geometry = match geo::Geometry::try_from(gdal_feature.geometry()) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!("Skipping feature without usable geometry: {}", err);
                continue;
            }
        };

        let mut attributes = HashMap::new();
        for (field_name, field_value) in gdal_feature.fields() {
            if let Some(value) = field_value {
                attributes.insert(field_name, field_value_to_string(value));
            }
        }
        features.push(Feature {
            geometry,
            attributes: (!attributes.is_empty()).then_some(attributes),
        });
    }

    Ok(FeatureCollection::new(field_names, features))
}

fn field_value_to_string(value: gdal::vector::FieldValue) -> String {
    use gdal::vector::FieldValue;
    match value {
        FieldValue::IntegerValue(value) => value.to_string(),
        FieldValue::Integer64Value(value) => value.to_string(),
        FieldValue::RealValue(value) => value.to_string(),
        FieldValue::StringValue(value) => value,
        FieldValue::IntegerListValue(values) => format!("{:?}", values),
        FieldValue::Integer64ListValue(values) => format!("{:?}", values),
        FieldValue::RealListValue(values) => format!("{:?}", values),
        FieldValue::StringListValue(values) => format!("{:?}", values),
        FieldValue::DateValue(value) => value.to_string(),
        FieldValue::DateTimeValue(value) => value.to_string(),
    }
}

pub fn write_features_to_geofile(
    features: &[Feature],
    output_filepath: &Path,
    crs: Option<&gdal::spatial_ref::SpatialRef>,
    driver: GdalDriverType,
) -> anyhow::Result<()> {
    let driver =
        gdal::DriverManager::get_driver_by_name(driver.name()).context("Getting GDAL driver")?;

    if features.is_empty() {
        return Ok(());
    }
    let layer_type = {
        use gdal::vector::OGRwkbGeometryType::*;
        let geometry = &features.iter().nth(0).unwrap().geometry;
        // TODO verify that all features have the same geometry type up front.
        match geometry {
            geo::Geometry::Point(_) => wkbPoint,
            geo::Geometry::LineString(_) => wkbLineString,
            geo::Geometry::Polygon(_) => wkbPolygon,
            geo::Geometry::MultiPoint(_) => wkbMultiPoint,
            geo::Geometry::MultiLineString(_) => wkbMultiLineString,
            geo::Geometry::MultiPolygon(_) => wkbMultiPolygon,
            _ => {
                return Err(anyhow!("Cannot write geometry type {:?} to file.", {
                    geometry
                }))
            }
        }
    };

    let crs = match crs {
        Some(crs) => crs.clone(),
        None => gdal::spatial_ref::SpatialRef::from_epsg(4326).unwrap(),
    };
    let crs_name = crs.name()?;
    log::debug!("Using spatial ref {} for writing geofile", crs_name);

    let mut dataset = driver.create_vector_only(output_filepath)?;
    let layer_options = gdal::LayerOptions {
        name: "",
        srs: Some(&crs),
        ty: layer_type,
        options: None,
    };

    let mut layer = dataset.create_layer(layer_options)?;

    // Create the fields based on all attributes of all features.
    let field_names = get_field_names(features);
    let field_definitions: Vec<(&str, gdal::vector::OGRFieldType::Type)> = field_names
        .iter()
        .map(|field_name| (field_name as &str, gdal::vector::OGRFieldType::OFTString))
        .collect();
    layer.create_defn_fields(&field_definitions)?;

    log::info!(
        "Writing {} features to {:?}",
        features.len(),
        output_filepath
    );
    unsafe {
        // Start a transaction in case the driver supports transactions, e.g. GeoPackage.
        // Committing all features once as opposed to per-feature is a massive speedup for these drivers.
        gdal_sys::OGR_L_StartTransaction(layer.c_layer());
    };
    let bar = ProgressBar::new(features.len() as u64);
    for feature in features {
        let wkb = wkb::geom_to_wkb(&feature.geometry)
            .or_else(|err| Err(anyhow!("Could not write geometry to WKB, {:?}", err)))?;
        let geometry = gdal::vector::Geometry::from_wkb(&wkb)?;

        match &feature.attributes {
            Some(attributes) => {
                let mut field_names = Vec::new();
                let mut values = Vec::new();
                for (key, value) in attributes {
                    field_names.push(key);
                    values.push(gdal::vector::FieldValue::StringValue(value.to_owned()))
                }
                let field_names: Vec<&str> = field_names.iter().map(|name| name as &str).collect();
                layer.create_feature_fields(geometry, &field_names, &values)?;
            }
            None => layer.create_feature(geometry)?,
        }

        bar.inc(1);
    }
    unsafe {
        gdal_sys::OGR_L_CommitTransaction(layer.c_layer());
    };
    Ok(())
}

fn get_field_names(features: &[Feature]) -> Vec<String> {
    let fields: HashSet<String> = features
        .par_iter()
        .filter_map(|feature| match &feature.attributes {
            Some(attributes) => Some(attributes.keys().cloned().collect::<Vec<String>>()),
            None => None,
        })
        .flatten()
        .collect();
    fields.into_iter().collect()
}

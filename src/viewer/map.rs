use std::{fs, io, path::Path};

use serde::Deserialize;

use crate::geofile::feature::FeatureCollection;
use crate::geofile::geojson::features_to_geojson;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapOptions {
    /// Initial zoom level of the rendered map.
    pub zoom_start: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self { zoom_start: 10 }
    }
}

const MAP_HTML_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">

<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Geofile Viewer</title>

  <!-- Leaflet 1.9.4 -->
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous"
    referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"
    referrerpolicy="no-referrer"></script>

  <style>
    html,
    body,
    #map {
      height: 100%;
      margin: 0;
    }
  </style>
</head>

<body>
  <div id="map"></div>
  <script>
    var map = L.map('map').setView([{{CENTER_LAT}}, {{CENTER_LON}}], {{ZOOM}});
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      maxZoom: 19,
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
    L.geoJSON({{GEOJSON}}).addTo(map);
  </script>
</body>

</html>
"#;

/// Render the collection as a self-contained Leaflet page, centered on the
/// mean of the per-feature centroids.
pub fn render_map_html(collection: &FeatureCollection, options: &MapOptions) -> String {
    let center = collection.mean_centroid().unwrap_or_else(|| {
        log::warn!("No centroid could be computed, centering the map at the origin.");
        geo::Point::new(0.0, 0.0)
    });
    MAP_HTML_TEMPLATE
        .replace("{{CENTER_LAT}}", &center.y().to_string())
        .replace("{{CENTER_LON}}", &center.x().to_string())
        .replace("{{ZOOM}}", &options.zoom_start.to_string())
        .replace("{{GEOJSON}}", &features_to_geojson(collection).to_string())
}

pub fn write_map_html(
    collection: &FeatureCollection,
    output_filepath: &Path,
    options: &MapOptions,
) -> io::Result<()> {
    fs::write(output_filepath, render_map_html(collection, options))
}

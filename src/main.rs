extern crate log;
pub mod geofile;
pub mod validity;
pub mod viewer;
use crate::geofile::ingest::ingest;
use crate::validity::classify::classify_invalid;
use crate::viewer::map::{write_map_html, MapOptions};
use crate::viewer::table::{render_attribute_table, render_invalidity_report};
use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;
use std::{
    fs::{self, read_to_string},
    path::Path,
};

/// View a geospatial file: print its attribute table, flag invalid polygon
/// geometries with a cause, and render the features on an interactive map.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input geofile (.kml, .zip shapefile archive, .geojson or .json).
    #[arg(short, long)]
    geofile_path: String,

    /// Path the interactive HTML map is written to.
    #[arg(short, long, default_value = "map.html")]
    map_path: String,

    /// Path to an optional YAML viewer config file.
    #[arg(short, long)]
    config_filepath: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct Config {
    /// Number of rows shown per table.
    max_table_rows: usize,
    map: MapOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_table_rows: 5,
            map: MapOptions::default(),
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config: Config = match &args.config_filepath {
        Some(config_filepath) => {
            if !Path::new(config_filepath).exists() {
                return Err(anyhow!("Config file {} not found", config_filepath));
            }
            serde_yaml::from_str(&read_to_string(config_filepath)?)?
        }
        None => Config::default(),
    };

    let geofile_path = Path::new(&args.geofile_path);
    if !geofile_path.exists() {
        return Err(anyhow!("Input file {} not found", &args.geofile_path));
    }
    let filename = geofile_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Could not determine the input filename"))?;
    let content = fs::read(geofile_path)?;

    let collection = ingest(filename, &content)?;
    log::info!("Read {} features from {}", collection.len(), filename);
    println!("{}", render_attribute_table(&collection, config.max_table_rows));

    let report = classify_invalid(&collection);
    if report.is_empty() {
        log::info!("All polygons are valid!");
    } else {
        log::warn!("Found {} invalid polygon(s):", report.len());
        println!(
            "{}",
            render_invalidity_report(&report, &collection.field_names, config.max_table_rows)
        );
    }

    let map_path = Path::new(&args.map_path);
    write_map_html(&collection, map_path, &config.map)?;
    log::info!("Wrote interactive map to {:?}", map_path);
    Ok(())
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}

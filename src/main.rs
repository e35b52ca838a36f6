//! Geo point clustering tool
//!
//! Reads geographic points from CSV files, clusters them for every zoom level,
//! and writes the markers visible in a viewport at one zoom: single points and
//! clusters with their size and expansion zoom.

use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use rust_geocluster::cluster::{BoundingBox, ClusterOptions, Clusterer, Feature, LatLng};
use std::fs::File;
use std::io;
use std::path::PathBuf;


#[derive(Parser)]
#[command(name = "rust_geocluster")]
#[command(about = "Geo point clustering tool for map markers", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude columns
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file with visible markers (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Map zoom to query, fractional zooms are floored
    #[arg(short, long, default_value_t = 0.0)]
    zoom: f64,

    /// Viewport west longitude
    #[arg(long, default_value_t = -180.0, allow_negative_numbers = true)]
    west: f64,

    /// Viewport south latitude
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    south: f64,

    /// Viewport east longitude, less than west to cross the antimeridian
    #[arg(long, default_value_t = 180.0, allow_negative_numbers = true)]
    east: f64,

    /// Viewport north latitude
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    north: f64,

    /// Grow the viewport on every side by this share of its span
    #[arg(long, default_value_t = 0.0)]
    expand_by: f64,

    /// Cluster radius in pixels
    #[arg(short, long, default_value_t = 40.0)]
    radius: f64,

    /// Tile extent in pixels, the radius is relative to it
    #[arg(long, default_value_t = 512.0)]
    extent: f64,

    /// Minimum points to form a cluster
    #[arg(short = 'm', long, default_value_t = 2)]
    min_points: usize,

    /// Min zoom level to cluster the points on
    #[arg(long, default_value_t = 0)]
    min_zoom: u8,

    /// Max zoom level to cluster the points on
    #[arg(long, default_value_t = 16)]
    max_zoom: u8,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// One output row, `expansion_zoom` is only set for clusters
#[derive(Debug, Clone, PartialEq)]
struct Marker {
    kind: &'static str,
    id: usize,
    lat: f64,
    lng: f64,
    count: usize,
    expansion_zoom: Option<u8>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let options = ClusterOptions::default()
        .with_min_zoom(args.min_zoom)
        .with_max_zoom(args.max_zoom)
        .with_min_points(args.min_points)
        .with_radius(args.radius)
        .with_extent(args.extent);

    let mut clusterer = match Clusterer::new(|p: &LatLng| *p, options) {
        Ok(clusterer) => clusterer,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Read points from file
    let points = match read_points(&args.input) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("Error reading CSV: {}", e);
            std::process::exit(1);
        }
    };

    if points.is_empty() {
        eprintln!("No points found in CSV file");
        std::process::exit(1);
    }

    log::debug!("Read {} points from {:?}", points.len(), args.input);

    clusterer.load(points);

    let bbox =
        BoundingBox::new(args.west, args.south, args.east, args.north).expanded(args.expand_by);
    log::debug!("Querying zoom {} in {:?}", args.zoom, bbox);

    let markers = collect_markers(&clusterer, args.zoom, &bbox);

    log::debug!(
        "Found {} markers, {} of them clusters",
        markers.len(),
        markers.iter().filter(|m| m.kind == "cluster").count()
    );

    // Write markers to output (stdout or file)
    let result = match &args.output {
        None => write_markers(io::stdout(), &markers),
        Some(output_file) => {
            File::create(output_file)
                .map_err(Into::into)
                .and_then(|file| write_markers(file, &markers))
        }
    };
    if let Err(e) = result {
        eprintln!("Error writing CSV: {}", e);
        std::process::exit(1);
    }
    if let Some(output_file) = &args.output {
        log::debug!("Markers written to {:?}", output_file);
    }
}

/// Reads points from a file
///
/// Expected format: `latitude,longitude` (header row is optional, extra columns are ignored)
///
/// Records that don't start with two numbers are skipped.
fn read_points(filename: &PathBuf) -> Result<Vec<LatLng>, Box<dyn std::error::Error>> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut points = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.len() < 2 {
            continue;
        }

        // A header row fails to parse here as well
        let lat = record[0].trim().parse::<f64>();
        let lng = record[1].trim().parse::<f64>();
        if let (Ok(lat), Ok(lng)) = (lat, lng) {
            points.push(LatLng::new(lat, lng));
        }
    }

    Ok(points)
}

/// Turns the features visible in `bbox` into output rows
fn collect_markers<F>(
    clusterer: &Clusterer<LatLng, F>,
    zoom: f64,
    bbox: &BoundingBox,
) -> Vec<Marker>
where
    F: Fn(&LatLng) -> LatLng,
{
    clusterer
        .get_clusters_in(zoom, bbox)
        .into_iter()
        .map(|feature| match feature {
            Feature::Point { id, payload } => Marker {
                kind: "point",
                id,
                lat: payload.lat,
                lng: payload.lng,
                count: 1,
                expansion_zoom: None,
            },
            Feature::Cluster { id, count, lat, lng } => Marker {
                kind: "cluster",
                id,
                lat,
                lng,
                count,
                expansion_zoom: clusterer.get_cluster_expansion_zoom(id).ok(),
            },
        })
        .collect()
}

/// Writes markers as CSV
///
/// Format: `kind,id,latitude,longitude,count,expansion_zoom` with a header row
fn write_markers<W: io::Write>(
    out: W,
    markers: &[Marker],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);

    writer.write_record(["kind", "id", "latitude", "longitude", "count", "expansion_zoom"])?;
    for marker in markers {
        writer.write_record([
            marker.kind.to_string(),
            marker.id.to_string(),
            marker.lat.to_string(),
            marker.lng.to_string(),
            marker.count.to_string(),
            marker
                .expansion_zoom
                .map_or_else(String::new, |z| z.to_string()),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use tileroute::config::{self, ProfileRule, DEFAULT_MEMORY_LIMIT_MB, NO_INITIAL_DIRECTION};
use tileroute::distance::{lat_from_y31, lon_from_x31, x31_from_lon, y31_from_lat};
use tileroute::map::{self, MemoryMapBuilder};
use tileroute::{RoutingConfiguration, RoutingContext};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct MapLoadError(PathBuf, #[source] map::osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct ProfileLoadError(PathBuf, #[source] config::xml::Error);

#[derive(Parser)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the end point
    end_lat: f64,

    /// Longitude of the end point
    end_lon: f64,

    /// Built-in profile (car, bicycle, pedestrian) or a path to a routing XML document
    #[arg(short, long, default_value = "car")]
    profile: String,

    /// Name of the profile to use from the routing XML document
    #[arg(long, default_value = "car")]
    profile_name: String,

    /// Soft memory limit of the tile cache, in megabytes
    #[arg(short, long, default_value_t = DEFAULT_MEMORY_LIMIT_MB)]
    memory_limit: usize,

    /// Zoom of the subregions into which the map is split
    #[arg(long, default_value_t = map::DEFAULT_SUBREGION_ZOOM)]
    zoom: u32,

    /// Swap left and right turn penalties
    #[arg(long)]
    left_side: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let rules = load_profile(&cli.profile, &cli.profile_name)?;
    let config = RoutingConfiguration::new(&rules, NO_INITIAL_DIRECTION, cli.memory_limit);
    let m = load_map(&cli.osm_file)?.build(cli.zoom);

    let mut ctx = RoutingContext::new(&config, &m);
    ctx.set_start(x31_from_lon(cli.start_lon), y31_from_lat(cli.start_lat));
    ctx.set_target(x31_from_lon(cli.end_lon), y31_from_lat(cli.end_lat));

    let route = tileroute::search_route_internal(&mut ctx, cli.left_side)?;
    if route.is_empty() {
        log::warn!("no route found");
    }

    let total_time: f32 = route.iter().map(|r| r.routing_time).sum();
    log::info!("route of {} roads, {:.0} s", route.len(), total_time);

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{\"time\": {}}},", total_time);

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    // Consecutive roads share their joining point
    let mut points: Vec<(u32, u32)> = Vec::default();
    for p in route.iter().flat_map(|r| r.points()) {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }

    let mut points = points.into_iter().peekable();
    while let Some((x, y)) = points.next() {
        let suffix = if points.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", lon_from_x31(x), lat_from_y31(y), suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_profile(profile: &str, name: &str) -> Result<Vec<ProfileRule>, ProfileLoadError> {
    let builtin = match profile {
        "car" => Some(config::CAR_PROFILE),
        "bicycle" => Some(config::BICYCLE_PROFILE),
        "pedestrian" => Some(config::PEDESTRIAN_PROFILE),
        _ => None,
    };

    match builtin {
        Some(triples) => Ok(ProfileRule::from_triples(triples)),
        None => config::xml::read_profile_from_file(profile, name)
            .map_err(|e| ProfileLoadError(PathBuf::from(profile), e)),
    }
}

fn load_map<P: AsRef<Path>>(path: P) -> Result<MemoryMapBuilder, MapLoadError> {
    let name = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut builder = MemoryMapBuilder::new(name);
    match map::osm::add_roads_from_file(&mut builder, map::osm::FileFormat::Unknown, path.as_ref()) {
        Ok(()) => Ok(builder),
        Err(e) => Err(MapLoadError(PathBuf::from(path.as_ref()), e)),
    }
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Offline road routing over lazily loaded map tiles.
//!
//! Road data is read through a [MapReader] in square subregions, which are loaded on demand
//! into a [TileCache] as the search expands. The cache lives in a [RoutingContext] and
//! survives between searches; it is trimmed when it grows over the configured memory limit.
//! Interpretation of road tags is customizable via [routing profiles](RoutingConfiguration).
//! The search is a bidirectional A* over road segments, aware of one-way streets,
//! turn restrictions, obstacles and turn penalties.
//!
//! # Example
//!
//! ```no_run
//! let mut builder = tileroute::map::MemoryMapBuilder::new("monaco");
//! tileroute::map::osm::add_roads_from_file(
//!     &mut builder,
//!     tileroute::map::osm::FileFormat::Unknown,
//!     "path/to/monaco.osm",
//! ).expect("failed to load monaco.osm");
//! let map = builder.build(tileroute::map::DEFAULT_SUBREGION_ZOOM);
//!
//! let config = tileroute::RoutingConfiguration::from_triples(tileroute::config::CAR_PROFILE);
//! let mut ctx = tileroute::RoutingContext::new(&config, &map);
//! ctx.set_start(tileroute::distance::x31_from_lon(7.4246), tileroute::distance::y31_from_lat(43.7384));
//! ctx.set_target(tileroute::distance::x31_from_lon(7.4323), tileroute::distance::y31_from_lat(43.7478));
//!
//! let route = tileroute::search_route_internal(&mut ctx, false)
//!     .expect("failed to find route");
//!
//! for r in &route {
//!     println!("road {}: {} → {}", r.object.id, r.start_point_index, r.end_point_index);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod distance;
pub mod map;
pub mod progress;
pub mod search;
pub mod segment;
pub mod tile;

pub use cache::TileCache;
pub use config::RoutingConfiguration;
pub use context::RoutingContext;
pub use distance::earth_distance;
pub use map::{MapReader, RouteDataObject, RouteSubregion};
pub use progress::{PrecalculatedRouteDirection, ProgressListener, RouteCalculationProgress};
pub use search::{find_route_segment, search_route_internal, SearchError};
pub use segment::{RouteSegment, RouteSegmentResult};
pub use tile::RoutingSubregionTile;

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::TileCache;
use crate::config::RoutingConfiguration;
use crate::distance::measured_distance_31;
use crate::map::{MapReader, RouteDataObject, SearchQuery};
use crate::progress::{PrecalculatedRouteDirection, ProgressListener};
use crate::segment::{RouteSegment, SegmentArena, SegmentId};

/// Largest valid coordinate of the 31-bit projection.
const MAX_31: i64 = (1 << 31) - 1;

/// Identifier of a road point, used to de-duplicate roads coming from overlapping subregions.
pub fn calc_route_id(road_id: i64, point: usize) -> i64 {
    road_id.wrapping_shl(10).wrapping_add(point as i64)
}

/// State of routing over one map: the tile cache, the read-only configuration,
/// the endpoints and statistics.
///
/// The context (and its cache) may be reused for many consecutive searches,
/// but must not be shared between concurrent searches.
pub struct RoutingContext<'a> {
    pub config: &'a RoutingConfiguration,
    reader: &'a dyn MapReader,
    pub cache: TileCache,

    /// Whether subregions should be taken from the basemap layer.
    pub basemap: bool,

    pub progress: Option<Arc<dyn ProgressListener>>,
    pub precalculated_route: Option<PrecalculatedRouteDirection>,

    pub start_x: u32,
    pub start_y: u32,
    pub target_x: u32,
    pub target_y: u32,

    /// Road (and direction along it) of the first segment of the preferred route,
    /// derived from [RoutingConfiguration::initial_direction].
    pub first_road_id: i64,
    pub first_road_direction: i8,

    pub visited_segments: usize,
    pub loaded_tiles: usize,
    pub time_to_load: Duration,
    pub time_to_calculate: Duration,
}

impl<'a> RoutingContext<'a> {
    pub fn new(config: &'a RoutingConfiguration, reader: &'a dyn MapReader) -> Self {
        Self {
            config,
            reader,
            cache: TileCache::new(),
            basemap: false,
            progress: None,
            precalculated_route: None,
            start_x: 0,
            start_y: 0,
            target_x: 0,
            target_y: 0,
            first_road_id: 0,
            first_road_direction: 0,
            visited_segments: 0,
            loaded_tiles: 0,
            time_to_load: Duration::ZERO,
            time_to_calculate: Duration::ZERO,
        }
    }

    pub fn set_start(&mut self, x31: u32, y31: u32) {
        self.start_x = x31;
        self.start_y = y31;
    }

    pub fn set_target(&mut self, x31: u32, y31: u32) {
        self.target_x = x31;
        self.target_y = y31;
    }

    /// Zeroes the statistics before a new search. The cache is kept.
    pub fn reset_stats(&mut self) {
        self.visited_segments = 0;
        self.loaded_tiles = 0;
        self.time_to_load = Duration::ZERO;
        self.time_to_calculate = Duration::ZERO;
        self.first_road_id = 0;
        self.first_road_direction = 0;
    }

    pub fn accept_line(&self, r: &RouteDataObject) -> bool {
        self.config.accept_line(r)
    }

    pub fn is_interrupted(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Checks if the search should run from both ends.
    pub fn plan_route_in_2_directions(&self) -> bool {
        self.config.plan_road_direction == 0
    }

    pub fn get_size(&self) -> usize {
        self.cache.get_size()
    }

    fn tile_id(&self, xloc: u32, yloc: u32) -> i64 {
        ((xloc as i64) << self.config.zoom_to_load) + yloc as i64
    }

    /// Ensures subregions of the coarse tile at (`xloc`, `yloc`) are indexed and loaded.
    pub fn load_headers(&mut self, xloc: u32, yloc: u32) {
        let started = Instant::now();
        let tile_id = self.tile_id(xloc, yloc);

        if !self.cache.is_indexed(tile_id) {
            let tz = 31 - self.config.zoom_to_load;
            let q = SearchQuery::new(
                xloc << tz,
                ((xloc as u64 + 1) << tz).min(u32::MAX as u64) as u32,
                yloc << tz,
                ((yloc as u64 + 1) << tz).min(u32::MAX as u64) as u32,
            );
            let subregions = self.reader.search_route_subregions(&q, self.basemap);
            self.cache.index(tile_id, subregions);
        }

        self.load_header_objects(tile_id);
        self.time_to_load += started.elapsed();
    }

    /// Loads all not loaded subregions of a coarse tile. If there is anything to load,
    /// the cache is first trimmed to the memory limit.
    pub fn load_header_objects(&mut self, tile_id: i64) {
        let to_load: Vec<i64> = self
            .cache
            .subregions_of(tile_id)
            .iter()
            .cloned()
            .filter(|&k| self.cache.tile(k).is_some_and(|t| !t.is_loaded()))
            .collect();

        if to_load.is_empty() {
            return;
        }

        self.cache
            .unload_unused_tiles(self.config.memory_limitation * 1024 * 1024);

        for key in to_load {
            let Some(tile) = self.cache.tile_mut(key) else {
                continue;
            };

            let s = tile.subregion;
            let q = SearchQuery::new(s.left, s.right, s.top, s.bottom);
            let roads = self.reader.search_route_data_for_subregion(&q, &s);
            let total = roads.len();

            tile.set_loaded();
            let mut accepted = 0;
            for road in roads {
                if self.config.accept_line(&road) {
                    tile.add(Rc::new(road));
                    accepted += 1;
                }
            }

            self.loaded_tiles += 1;
            log::debug!(
                "loaded subregion {} (generation {}): {} of {} roads accepted",
                key,
                tile.load_generation(),
                accepted,
                total,
            );
        }
    }

    /// Returns a newly allocated chain of segments starting at the given coordinate,
    /// with one segment per distinct road point found in the covering subregions.
    ///
    /// If the same road point comes from multiple subregions, only the copy of the
    /// road with more points is used.
    pub fn load_route_segment(
        &mut self,
        x31: u32,
        y31: u32,
        arena: &mut SegmentArena,
    ) -> Option<SegmentId> {
        let z = self.config.zoom_to_load;
        let xloc = x31 >> (31 - z);
        let yloc = y31 >> (31 - z);
        self.load_headers(xloc, yloc);

        let mut order: Vec<i64> = Vec::default();
        let mut found: HashMap<i64, (Rc<RouteDataObject>, usize)> = HashMap::default();

        for key in self.cache.subregions_of(self.tile_id(xloc, yloc)).to_vec() {
            let Some(tile) = self.cache.tile_mut(key) else {
                continue;
            };
            if !tile.is_loaded() {
                continue;
            }
            tile.access += 1;

            for s in tile.segments_at(x31, y31) {
                let route_id = calc_route_id(s.road_id(), s.segment_start);
                match found.get_mut(&route_id) {
                    Some(existing) => {
                        if existing.0.points_len() < s.road.points_len() {
                            *existing = (Rc::clone(&s.road), s.segment_start);
                        }
                    }
                    None => {
                        order.push(route_id);
                        found.insert(route_id, (Rc::clone(&s.road), s.segment_start));
                    }
                }
            }
        }

        let mut head = None;
        for route_id in order.into_iter().rev() {
            if let Some((road, start)) = found.remove(&route_id) {
                let mut s = RouteSegment::new(road, start);
                s.next = head;
                head = Some(arena.alloc(s));
            }
        }
        head
    }

    /// Loads all coarse tiles around a coordinate and returns every road found in them,
    /// without duplicates.
    ///
    /// The neighborhood spans the tiles of `zoom_around` adjacent to the point, but at least
    /// one coarse tile in each direction.
    pub fn load_tile_data(&mut self, x31: u32, y31: u32, zoom_around: u32) -> Vec<Rc<RouteDataObject>> {
        let z = self.config.zoom_to_load;
        let (t, shift): (i64, i64) = if z <= zoom_around {
            (1, 1 << (31 - zoom_around.min(31)))
        } else {
            (1 << (z - zoom_around), 1 << (31 - z))
        };

        let mut ids: HashSet<i64> = HashSet::default();
        let mut roads = Vec::default();
        let mut visited_tiles: HashSet<i64> = HashSet::default();

        for i in -t..=t {
            for j in -t..=t {
                let x = (x31 as i64 + i * shift).clamp(0, MAX_31) as u32;
                let y = (y31 as i64 + j * shift).clamp(0, MAX_31) as u32;
                let (xloc, yloc) = (x >> (31 - z), y >> (31 - z));
                let tile_id = self.tile_id(xloc, yloc);
                if !visited_tiles.insert(tile_id) {
                    continue;
                }

                self.load_headers(xloc, yloc);
                for &key in self.cache.subregions_of(tile_id) {
                    let Some(tile) = self.cache.tile(key).filter(|t| t.is_loaded()) else {
                        continue;
                    };
                    for s in tile.all_segments() {
                        if ids.insert(s.road_id()) {
                            roads.push(Rc::clone(&s.road));
                        }
                    }
                }
            }
        }

        roads
    }

    /// Estimated travel time (seconds) between two points at the maximum default speed,
    /// scaled by the heuristic coefficient.
    pub fn heuristic(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> f32 {
        self.config.heur_coefficient * measured_distance_31(x1, y1, x2, y2)
            / self.config.max_default_speed
    }
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::mem::size_of;
use std::rc::Rc;

use crate::map::{RouteDataObject, RouteSubregion};
use crate::segment::{RouteSegment, SegmentArena, SegmentId};

/// Packs a coordinate of the 31-bit projection into a single map key.
pub fn point_key(x31: u32, y31: u32) -> u64 {
    ((x31 as u64) << 31) + y31 as u64
}

/// Size of one entry of [RoutingSubregionTile::routes], in bytes.
const ROUTE_ENTRY_SIZE: usize = size_of::<(u64, SegmentId)>();

/// In-memory bucket of one map subregion: chains of [RouteSegment]s
/// keyed by their packed starting coordinate.
///
/// The bucket outlives unloading, so that its load history is kept.
#[derive(Debug)]
pub struct RoutingSubregionTile {
    pub subregion: RouteSubregion,

    /// Number of lookups since the last eviction run, decayed by each run.
    pub access: u32,

    loaded: bool,
    load_generation: u32,
    size: usize,

    segments: SegmentArena,
    routes: HashMap<u64, SegmentId>,
}

impl RoutingSubregionTile {
    pub fn new(subregion: RouteSubregion) -> Self {
        Self {
            subregion,
            access: 0,
            loaded: false,
            load_generation: 0,
            size: size_of::<Self>(),
            segments: SegmentArena::default(),
            routes: HashMap::default(),
        }
    }

    /// Adds a segment with an unassigned direction at every point of the road,
    /// at the tail of the chain of its coordinate.
    pub fn add(&mut self, road: Rc<RouteDataObject>) {
        self.size += road.estimated_size() + size_of::<RouteSegment>() * road.points_len();

        for (idx, &(x, y)) in road.points.iter().enumerate() {
            let id = self.segments.alloc(RouteSegment::new(Rc::clone(&road), idx));
            match self.routes.get(&point_key(x, y)) {
                Some(&head) => self.segments.append(head, id),
                None => {
                    self.routes.insert(point_key(x, y), id);
                }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_loaded(&mut self) {
        self.loaded = true;
        self.load_generation += 1;
    }

    /// Drops all segments. Load history is preserved.
    pub fn unload(&mut self) {
        self.routes.clear();
        self.segments.clear();
        self.size = 0;
        self.loaded = false;
    }

    /// Returns how many times the tile was loaded: 0 means never.
    pub fn load_generation(&self) -> u32 {
        self.load_generation
    }

    /// Estimated memory occupied by the tile, in bytes.
    pub fn get_size(&self) -> usize {
        self.size + self.routes.len() * ROUTE_ENTRY_SIZE
    }

    /// Iterates over the segments starting at the given coordinate.
    pub fn segments_at(&self, x31: u32, y31: u32) -> impl Iterator<Item = &RouteSegment> {
        self.segments
            .chain(self.routes.get(&point_key(x31, y31)).cloned())
            .map(|(_, s)| s)
    }

    /// Iterates over all stored segments, chain by chain.
    pub fn all_segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.routes
            .values()
            .flat_map(|&head| self.segments.chain(Some(head)).map(|(_, s)| s))
    }

    /// Number of distinct coordinates with at least one segment.
    pub fn points_count(&self) -> usize {
        self.routes.len()
    }
}

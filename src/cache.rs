// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::HashMap;
use std::mem::size_of;

use crate::map::RouteSubregion;
use crate::tile::RoutingSubregionTile;

/// Size of one entry of the subregion maps, in bytes.
const TILE_ENTRY_SIZE: usize = size_of::<(i64, usize)>();

const MB: f64 = 1024.0 * 1024.0;

/// Cache of [RoutingSubregionTile]s which can be reused by many searches.
///
/// Tiles are stored once per physical subregion (see [RouteSubregion::key]),
/// and indexed by the coarse tiles through which they were discovered.
#[derive(Debug, Default)]
pub struct TileCache {
    subregion_tiles: HashMap<i64, RoutingSubregionTile>,
    indexed_subregions: HashMap<i64, Vec<i64>>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if subregions of a coarse tile were already indexed.
    pub fn is_indexed(&self, tile_id: i64) -> bool {
        self.indexed_subregions.contains_key(&tile_id)
    }

    /// Records the subregions covering a coarse tile, creating buckets
    /// for subregions which were not seen before.
    pub fn index(&mut self, tile_id: i64, subregions: Vec<RouteSubregion>) {
        let keys = subregions
            .into_iter()
            .map(|s| {
                let key = s.key();
                self.subregion_tiles
                    .entry(key)
                    .or_insert_with(|| RoutingSubregionTile::new(s));
                key
            })
            .collect();
        self.indexed_subregions.insert(tile_id, keys);
    }

    /// Returns the subregion keys of a coarse tile, or an empty slice if it was not indexed.
    pub fn subregions_of(&self, tile_id: i64) -> &[i64] {
        self.indexed_subregions
            .get(&tile_id)
            .map(|k| k.as_slice())
            .unwrap_or_default()
    }

    pub fn tile(&self, key: i64) -> Option<&RoutingSubregionTile> {
        self.subregion_tiles.get(&key)
    }

    pub fn tile_mut(&mut self, key: i64) -> Option<&mut RoutingSubregionTile> {
        self.subregion_tiles.get_mut(&key)
    }

    /// Number of known subregions, loaded or not.
    pub fn len(&self) -> usize {
        self.subregion_tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subregion_tiles.is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.subregion_tiles.values().filter(|t| t.is_loaded()).count()
    }

    /// Estimated memory occupied by the cache, in bytes.
    pub fn get_size(&self) -> usize {
        // both the key → tile map and the coarse tile index
        self.subregion_tiles.len() * TILE_ENTRY_SIZE * 2
            + self
                .subregion_tiles
                .values()
                .map(|t| t.get_size())
                .sum::<usize>()
    }

    /// Unloads the least accessed tiles if the cache occupies at least 90% of `memory_limit`
    /// (in bytes), until it occupies less than 70%. The access counters of all tiles
    /// which were loaded before the run are then divided by 3.
    ///
    /// Returns the number of unloaded tiles.
    pub fn unload_unused_tiles(&mut self, memory_limit: usize) -> usize {
        let mut size = self.get_size();
        let critical = 0.9 * memory_limit as f64;
        if (size as f64) < critical {
            return 0;
        }

        let occupied_before = size as f64 / MB;
        let desirable = 0.7 * memory_limit as f64;

        let mut list: Vec<&mut RoutingSubregionTile> = self
            .subregion_tiles
            .values_mut()
            .filter(|t| t.is_loaded())
            .collect();
        list.sort_by(|a, b| compare_tiles(a, b));

        let loaded = list.len();
        let mut unloaded = 0;
        for tile in list.iter_mut() {
            if (size as f64) < desirable {
                break;
            }
            size = size.saturating_sub(tile.get_size());
            tile.unload();
            unloaded += 1;
        }

        for tile in list {
            tile.access /= 3;
        }

        log::info!(
            "Run GC (before {:.3} MB after {:.3} MB) unload {} of {} tiles",
            occupied_before,
            self.get_size() as f64 / MB,
            unloaded,
            loaded,
        );
        unloaded
    }
}

/// Eviction order of tiles: least accessed first, and from equally accessed
/// tiles the larger ones first.
pub fn compare_tiles(a: &RoutingSubregionTile, b: &RoutingSubregionTile) -> Ordering {
    a.access
        .cmp(&b.access)
        .then_with(|| b.get_size().cmp(&a.get_size()))
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::{
    MapReader, Restriction, RestrictionKind, RouteDataObject, RouteRegion, RouteSubregion,
    SearchQuery,
};

/// Default zoom of the grid used by [MemoryMapBuilder::build] to split roads into subregions.
pub const DEFAULT_SUBREGION_ZOOM: u32 = 13;

#[derive(Debug, Clone)]
struct StoredSubregion {
    descriptor: RouteSubregion,
    roads: Vec<RouteDataObject>,
}

/// [MapReader] over roads held in memory, partitioned into rectangular subregions.
///
/// Counts data queries, which makes it possible to observe the paging behavior
/// of the router.
#[derive(Debug, Default)]
pub struct MemoryMap {
    detailed: Vec<StoredSubregion>,
    basemap: Vec<StoredSubregion>,
    data_queries: Cell<usize>,
}

impl MemoryMap {
    /// Adds a subregion with explicit bounds and content. The file pointer
    /// is assigned automatically and returned in the descriptor.
    pub fn push_subregion(
        &mut self,
        left: u32,
        right: u32,
        top: u32,
        bottom: u32,
        roads: Vec<RouteDataObject>,
        basemap: bool,
    ) -> RouteSubregion {
        let descriptor = RouteSubregion {
            left,
            right,
            top,
            bottom,
            file_pointer: (self.detailed.len() + self.basemap.len()) as u64 + 1,
        };
        let stored = StoredSubregion { descriptor, roads };
        if basemap {
            self.basemap.push(stored);
        } else {
            self.detailed.push(stored);
        }
        descriptor
    }

    /// Number of subregions in the detailed layer.
    pub fn subregion_count(&self) -> usize {
        self.detailed.len()
    }

    /// Number of [MapReader::search_route_data_for_subregion] calls answered so far.
    pub fn data_queries(&self) -> usize {
        self.data_queries.get()
    }

    fn layer(&self, basemap: bool) -> &[StoredSubregion] {
        if basemap {
            &self.basemap
        } else {
            &self.detailed
        }
    }
}

impl MapReader for MemoryMap {
    fn search_route_subregions(&self, query: &SearchQuery, basemap: bool) -> Vec<RouteSubregion> {
        self.layer(basemap)
            .iter()
            .filter(|s| query.intersects(&s.descriptor))
            .map(|s| s.descriptor)
            .collect()
    }

    fn search_route_data_for_subregion(
        &self,
        _query: &SearchQuery,
        subregion: &RouteSubregion,
    ) -> Vec<RouteDataObject> {
        self.data_queries.set(self.data_queries.get() + 1);
        self.detailed
            .iter()
            .chain(self.basemap.iter())
            .find(|s| s.descriptor == *subregion)
            .map(|s| s.roads.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct PendingRoad {
    id: i64,
    points: Vec<(u32, u32)>,
    types: Vec<u32>,
    point_types: Vec<Vec<u32>>,
    restrictions: Vec<Restriction>,
    basemap: bool,
}

/// Collects roads and splits them into a [MemoryMap] with a regular grid of subregions.
#[derive(Debug, Default)]
pub struct MemoryMapBuilder {
    region: RouteRegion,
    roads: Vec<PendingRoad>,
    by_id: HashMap<i64, usize>,
}

impl MemoryMapBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            region: RouteRegion::new(name),
            ..Default::default()
        }
    }

    /// Returns the number of roads added so far.
    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Adds a road to the detailed layer. Re-using an id replaces the previous road.
    /// Roads with less than 2 points are ignored.
    pub fn add_road(&mut self, id: i64, points: &[(u32, u32)], tags: &[(&str, &str)]) {
        self.insert_road(id, points, tags, false);
    }

    /// Adds a road to the basemap layer.
    pub fn add_basemap_road(&mut self, id: i64, points: &[(u32, u32)], tags: &[(&str, &str)]) {
        self.insert_road(id, points, tags, true);
    }

    fn insert_road(&mut self, id: i64, points: &[(u32, u32)], tags: &[(&str, &str)], basemap: bool) {
        if points.len() < 2 {
            log::debug!("road {} has less than 2 points - skipping", id);
            return;
        }

        let road = PendingRoad {
            id,
            points: points.to_vec(),
            types: tags
                .iter()
                .map(|&(t, v)| self.region.intern(t, v))
                .collect(),
            point_types: Vec::default(),
            restrictions: Vec::default(),
            basemap,
        };

        match self.by_id.get(&id) {
            Some(&idx) => self.roads[idx] = road,
            None => {
                self.by_id.insert(id, self.roads.len());
                self.roads.push(road);
            }
        }
    }

    /// Attaches an extra tag to a specific point of an already added road.
    pub fn add_point_tag(&mut self, road_id: i64, point: usize, tag: &str, value: &str) {
        let rule = self.region.intern(tag, value);
        if let Some(road) = self.by_id.get(&road_id).map(|&idx| &mut self.roads[idx]) {
            if point >= road.points.len() {
                return;
            }
            if road.point_types.len() <= point {
                road.point_types.resize(point + 1, Vec::default());
            }
            road.point_types[point].push(rule);
        }
    }

    /// Attaches a turn restriction from road `from` onto road `to`.
    pub fn add_restriction(&mut self, from: i64, to: i64, kind: RestrictionKind) {
        if let Some(&idx) = self.by_id.get(&from) {
            self.roads[idx].restrictions.push(Restriction { to, kind });
        }
    }

    /// Splits all roads into square subregions of a grid at the provided zoom.
    /// A road is stored in every subregion containing at least one of its points.
    pub fn build(self, zoom: u32) -> MemoryMap {
        let zoom = zoom.clamp(1, 31);
        let shift = 31 - zoom;
        let region = Rc::new(self.region);

        let mut detailed: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::default();
        let mut basemap: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::default();

        for (idx, road) in self.roads.iter().enumerate() {
            let cells = if road.basemap {
                &mut basemap
            } else {
                &mut detailed
            };
            for &(x, y) in &road.points {
                let list = cells.entry((x >> shift, y >> shift)).or_default();
                if !list.contains(&idx) {
                    list.push(idx);
                }
            }
        }

        let mut map = MemoryMap::default();
        for (cells, is_basemap) in [(detailed, false), (basemap, true)] {
            for ((cx, cy), indices) in cells {
                let left = cx << shift;
                let top = cy << shift;
                let right = (((cx as u64 + 1) << shift) - 1) as u32;
                let bottom = (((cy as u64 + 1) << shift) - 1) as u32;
                let roads = indices
                    .iter()
                    .map(|&i| self.roads[i].to_object(&region))
                    .collect();
                map.push_subregion(left, right, top, bottom, roads, is_basemap);
            }
        }
        map
    }
}

impl PendingRoad {
    fn to_object(&self, region: &Rc<RouteRegion>) -> RouteDataObject {
        RouteDataObject {
            region: Rc::clone(region),
            id: self.id,
            points: self.points.clone(),
            types: self.types.clone(),
            point_types: self.point_types.clone(),
            restrictions: self.restrictions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: u32 = 1 << (31 - DEFAULT_SUBREGION_ZOOM);

    #[test]
    fn roads_are_split_into_grid_cells() {
        let mut b = MemoryMapBuilder::new("test");
        b.add_road(1, &[(10, 10), (20, 20)], &[("highway", "primary")]);
        b.add_road(2, &[(20, 20), (CELL + 5, 20)], &[("highway", "residential")]);
        b.add_road(3, &[(5, 5)], &[("highway", "residential")]);
        assert_eq!(b.len(), 2);

        let map = b.build(DEFAULT_SUBREGION_ZOOM);
        assert_eq!(map.subregion_count(), 2);

        let all = map.search_route_subregions(&SearchQuery::new(0, CELL * 2, 0, CELL), false);
        assert_eq!(all.len(), 2);
        assert!(map
            .search_route_subregions(&SearchQuery::new(0, CELL * 2, 0, CELL), true)
            .is_empty());

        let first = map.search_route_subregions(&SearchQuery::new(0, 100, 0, 100), false);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].left, 0);
        assert_eq!(first[0].right, CELL - 1);

        let q = SearchQuery::new(0, 100, 0, 100);
        let mut ids: Vec<i64> = map
            .search_route_data_for_subregion(&q, &first[0])
            .iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        assert_eq!(ids, [1, 2]);
        assert_eq!(map.data_queries(), 1);
    }

    #[test]
    fn point_tags_and_restrictions() {
        let mut b = MemoryMapBuilder::new("test");
        b.add_road(1, &[(10, 10), (20, 20), (30, 30)], &[("highway", "primary")]);
        b.add_point_tag(1, 1, "highway", "traffic_signals");
        b.add_point_tag(1, 9, "barrier", "gate");
        b.add_restriction(1, 2, RestrictionKind::NoLeftTurn);

        let map = b.build(DEFAULT_SUBREGION_ZOOM);
        let sub = map.search_route_subregions(&SearchQuery::new(0, 100, 0, 100), false)[0];
        let road = &map.search_route_data_for_subregion(&SearchQuery::new(0, 100, 0, 100), &sub)[0];

        assert_eq!(
            road.point_tags(1).collect::<Vec<_>>(),
            [("highway", "traffic_signals")]
        );
        assert_eq!(road.point_types.len(), 2);
        assert_eq!(
            road.restrictions,
            [Restriction {
                to: 2,
                kind: RestrictionKind::NoLeftTurn
            }]
        );
    }
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Road data as provided by a tiled map database.
//!
//! The router never parses map files itself. Instead, it consumes a [MapReader],
//! which answers two kinds of queries: which [subregions](RouteSubregion) cover
//! a bounding box, and which [roads](RouteDataObject) are stored in a subregion.

use std::collections::HashMap;
use std::rc::Rc;

mod memory;
pub mod osm;

pub use memory::{MemoryMap, MemoryMapBuilder, DEFAULT_SUBREGION_ZOOM};

/// Table of `tag=value` pairs, shared by all roads from a single map region.
/// Roads refer to their tags by indices into this table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RouteRegion {
    pub name: String,
    decoding_rules: Vec<(String, String)>,
    index: HashMap<(String, String), u32>,
}

impl RouteRegion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the index of the `tag=value` decoding rule, adding it to the table if necessary.
    pub fn intern(&mut self, tag: &str, value: &str) -> u32 {
        let key = (tag.to_string(), value.to_string());
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.decoding_rules.len() as u32;
        self.decoding_rules.push(key.clone());
        self.index.insert(key, idx);
        idx
    }

    /// Resolves a decoding rule. Unknown indices resolve to `None`.
    pub fn decode(&self, rule: u32) -> Option<(&str, &str)> {
        self.decoding_rules
            .get(rule as usize)
            .map(|(t, v)| (t.as_str(), v.as_str()))
    }

    /// Returns the number of decoding rules in this region.
    pub fn len(&self) -> usize {
        self.decoding_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoding_rules.is_empty()
    }
}

/// Kind of a [turn restriction](https://wiki.openstreetmap.org/wiki/Relation:restriction)
/// attached to a road.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionKind {
    NoRightTurn,
    NoLeftTurn,
    NoUTurn,
    NoStraightOn,
    OnlyRightTurn,
    OnlyLeftTurn,
    OnlyStraightOn,
}

impl RestrictionKind {
    /// Parses the value of a `restriction` tag, like "no_left_turn".
    pub fn from_tag(value: &str) -> Option<Self> {
        match value {
            "no_right_turn" => Some(Self::NoRightTurn),
            "no_left_turn" => Some(Self::NoLeftTurn),
            "no_u_turn" => Some(Self::NoUTurn),
            "no_straight_on" => Some(Self::NoStraightOn),
            "only_right_turn" => Some(Self::OnlyRightTurn),
            "only_left_turn" => Some(Self::OnlyLeftTurn),
            "only_straight_on" => Some(Self::OnlyStraightOn),
            _ => None,
        }
    }

    /// Returns true if the restriction forbids its `from` → `to` movement.
    pub fn is_prohibitory(self) -> bool {
        matches!(
            self,
            Self::NoRightTurn | Self::NoLeftTurn | Self::NoUTurn | Self::NoStraightOn
        )
    }

    /// Returns true if the restriction makes its `from` → `to` movement the only allowed one.
    pub fn is_mandatory(self) -> bool {
        !self.is_prohibitory()
    }
}

/// A turn restriction from the road it is attached to, onto the road with id `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restriction {
    pub to: i64,
    pub kind: RestrictionKind,
}

/// An immutable road: a polyline in the 31-bit projection with tags.
///
/// Instances are shared (with [Rc]) between all tiles and segments referencing them.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDataObject {
    pub region: Rc<RouteRegion>,
    pub id: i64,

    /// Geometry as (x31, y31) pairs.
    pub points: Vec<(u32, u32)>,

    /// Decoding rule indices of the road tags, in declared order.
    pub types: Vec<u32>,

    /// Decoding rule indices of extra tags of specific points (barriers, traffic signals, ...).
    /// May be shorter than [RouteDataObject::points].
    pub point_types: Vec<Vec<u32>>,

    pub restrictions: Vec<Restriction>,
}

impl RouteDataObject {
    pub fn points_len(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, idx: usize) -> (u32, u32) {
        self.points[idx]
    }

    /// Iterates over all resolvable tags of the road, in declared order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.types.iter().filter_map(|&t| self.region.decode(t))
    }

    /// Iterates over all resolvable extra tags of a point.
    pub fn point_tags(&self, idx: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.point_types
            .get(idx)
            .map(|t| t.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&t| self.region.decode(t))
    }

    /// Returns the value of the first tag with the given key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags().find_map(|(t, v)| if t == key { Some(v) } else { None })
    }

    /// Rough estimate of the memory occupied by this road, in bytes.
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.points.len() * std::mem::size_of::<(u32, u32)>()
            + self.types.len() * std::mem::size_of::<u32>()
            + self
                .point_types
                .iter()
                .map(|t| std::mem::size_of::<Vec<u32>>() + t.len() * std::mem::size_of::<u32>())
                .sum::<usize>()
            + self.restrictions.len() * std::mem::size_of::<Restriction>()
    }
}

/// Descriptor of a subregion - one on-demand loadable unit of the map index.
///
/// `top` has a smaller y31 than `bottom`, as the projection grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSubregion {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,

    /// Position of the subregion data in the underlying storage.
    pub file_pointer: u64,
}

impl RouteSubregion {
    /// Key identifying the physical subregion, regardless of the tile it was found through.
    pub fn key(&self) -> i64 {
        ((self.left as i64) << 31).wrapping_add(self.file_pointer as i64)
    }
}

/// Bounding box query in the 31-bit projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl SearchQuery {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn intersects(&self, s: &RouteSubregion) -> bool {
        s.left <= self.right && s.right >= self.left && s.top <= self.bottom && s.bottom >= self.top
    }
}

/// Interface of the map database reader.
pub trait MapReader {
    /// Returns descriptors of all subregions intersecting the query bounding box,
    /// either from the detailed map or from the basemap.
    fn search_route_subregions(&self, query: &SearchQuery, basemap: bool) -> Vec<RouteSubregion>;

    /// Returns all roads stored in a given subregion. The caller takes ownership.
    fn search_route_data_for_subregion(
        &self,
        query: &SearchQuery,
        subregion: &RouteSubregion,
    ) -> Vec<RouteDataObject>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_interning() {
        let mut r = RouteRegion::new("test");
        let a = r.intern("highway", "primary");
        let b = r.intern("oneway", "yes");
        assert_eq!(r.intern("highway", "primary"), a);
        assert_ne!(a, b);
        assert_eq!(r.decode(b), Some(("oneway", "yes")));
        assert_eq!(r.decode(42), None);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn road_tags_skip_unknown_rules() {
        let mut r = RouteRegion::new("test");
        let highway = r.intern("highway", "primary");
        let signals = r.intern("highway", "traffic_signals");
        let road = RouteDataObject {
            region: Rc::new(r),
            id: 1,
            points: vec![(0, 0), (10, 10)],
            types: vec![99, highway],
            point_types: vec![vec![], vec![signals]],
            restrictions: vec![],
        };

        assert_eq!(road.tags().collect::<Vec<_>>(), [("highway", "primary")]);
        assert_eq!(road.tag("highway"), Some("primary"));
        assert_eq!(road.tag("oneway"), None);
        assert_eq!(road.point_tags(0).count(), 0);
        assert_eq!(
            road.point_tags(1).collect::<Vec<_>>(),
            [("highway", "traffic_signals")]
        );
        assert_eq!(road.point_tags(7).count(), 0);
    }

    #[test]
    fn restriction_kinds() {
        assert_eq!(
            RestrictionKind::from_tag("no_left_turn"),
            Some(RestrictionKind::NoLeftTurn)
        );
        assert_eq!(RestrictionKind::from_tag("only_360"), None);
        assert!(RestrictionKind::NoUTurn.is_prohibitory());
        assert!(RestrictionKind::OnlyStraightOn.is_mandatory());
    }

    #[test]
    fn query_intersection() {
        let s = RouteSubregion {
            left: 100,
            right: 200,
            top: 100,
            bottom: 200,
            file_pointer: 0,
        };
        assert!(SearchQuery::new(150, 300, 0, 150).intersects(&s));
        assert!(SearchQuery::new(200, 300, 200, 300).intersects(&s));
        assert!(!SearchQuery::new(201, 300, 0, 300).intersects(&s));
        assert!(!SearchQuery::new(0, 300, 0, 99).intersects(&s));
    }
}

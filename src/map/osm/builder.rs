// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use super::model::{Element, Node, Tags, TurnRestriction, Way};
use crate::map::{MemoryMapBuilder, RestrictionKind};

/// Converts a stream of [OSM elements](Element) into roads of a [MemoryMapBuilder].
///
/// Nodes must precede the ways referencing them, as is customary for OSM files.
/// Restrictions are resolved against the roads already seen.
pub(super) struct RoadCollector<'a> {
    map: &'a mut MemoryMapBuilder,
    nodes: HashMap<i64, ((u32, u32), Tags)>,
    roads: HashSet<i64>,
}

impl<'a> RoadCollector<'a> {
    pub(super) fn new(map: &'a mut MemoryMapBuilder) -> Self {
        Self {
            map,
            nodes: HashMap::default(),
            roads: HashSet::default(),
        }
    }

    /// Add all elements from the provided iterator.
    pub(super) fn add_elements<E, I>(&mut self, elements: I) -> Result<(), E>
    where
        I: IntoIterator<Item = Result<Element, E>>,
    {
        for e in elements {
            match e? {
                Element::Node(n) => self.add_node(n),
                Element::Way(w) => self.add_way(w),
                Element::TurnRestriction(r) => self.add_restriction(r),
            }
        }
        Ok(())
    }

    fn add_node(&mut self, n: Node) {
        self.nodes.insert(n.id, ((n.x31, n.y31), n.tags));
    }

    fn add_way(&mut self, w: Way) {
        if !w.tags.iter().any(|(k, _)| k == "highway") {
            return;
        }

        // Drop references to unknown nodes
        let known: Vec<&((u32, u32), Tags)> =
            w.refs.iter().filter_map(|id| self.nodes.get(id)).collect();
        if known.len() < 2 {
            log::debug!("way {} references less than 2 known nodes - skipping", w.id);
            return;
        }

        let points: Vec<(u32, u32)> = known.iter().map(|n| n.0).collect();
        let tags: Vec<(&str, &str)> = w.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let point_tags: Vec<(usize, &str, &str)> = known
            .iter()
            .enumerate()
            .flat_map(|(idx, n)| n.1.iter().map(move |(k, v)| (idx, k.as_str(), v.as_str())))
            .collect();

        self.map.add_road(w.id, &points, &tags);
        for (idx, k, v) in point_tags {
            self.map.add_point_tag(w.id, idx, k, v);
        }
        self.roads.insert(w.id);
    }

    fn add_restriction(&mut self, r: TurnRestriction) {
        let Some(kind) = RestrictionKind::from_tag(&r.kind) else {
            log::debug!("relation {}: unsupported restriction {}", r.id, r.kind);
            return;
        };

        match (r.from, r.to) {
            (Some(from), Some(to)) if self.roads.contains(&from) => {
                self.map.add_restriction(from, to, kind);
            }
            _ => log::debug!("relation {}: invalid restriction members", r.id),
        }
    }
}

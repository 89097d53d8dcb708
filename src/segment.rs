// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::map::RouteDataObject;

/// Index of a [RouteSegment] in a [SegmentArena].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u32);

/// How a [RouteSegment] was reached by the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parent {
    /// The segment was never reached.
    #[default]
    Unvisited,

    /// The segment is one of the sources of the search.
    Origin,

    /// The segment was reached from the end of another segment.
    Segment(SegmentId),
}

/// Traversal of one road, starting at point `segment_start`, in one direction.
///
/// The direction starts unassigned (0) and is claimed by [init_route_segment].
#[derive(Debug, Clone)]
pub struct RouteSegment {
    pub road: Rc<RouteDataObject>,
    pub segment_start: usize,
    direction_assgn: i8,

    /// Next segment starting at the same coordinate, possibly of another road.
    pub next: Option<SegmentId>,

    /// Sibling traversing the same road from the same point in the other direction.
    pub opposite_direction: Option<SegmentId>,

    pub parent_route: Parent,

    /// Cost (seconds) from the origin of the search.
    pub distance_from_start: f32,

    /// Heuristic estimate (seconds) to the other end of the search.
    pub distance_to_end: f32,

    /// 0 if the segment is not a part of the final route, otherwise the direction
    /// of the search which produced it (1 forward, -1 backward).
    pub reverse_way_search: i8,
}

impl RouteSegment {
    pub fn new(road: Rc<RouteDataObject>, segment_start: usize) -> Self {
        Self {
            road,
            segment_start,
            direction_assgn: 0,
            next: None,
            opposite_direction: None,
            parent_route: Parent::Unvisited,
            distance_from_start: 0.0,
            distance_to_end: 0.0,
            reverse_way_search: 0,
        }
    }

    pub fn road_id(&self) -> i64 {
        self.road.id
    }

    /// Returns the assigned direction: 1, -1 or 0 if not yet assigned.
    pub fn direction(&self) -> i8 {
        self.direction_assgn
    }

    pub fn is_positive(&self) -> bool {
        self.direction_assgn > 0
    }

    /// Index of the point reached after traversing the segment.
    /// Only meaningful once the direction is assigned.
    pub fn segment_end(&self) -> usize {
        if self.direction_assgn < 0 {
            self.segment_start.saturating_sub(1)
        } else {
            self.segment_start + 1
        }
    }

    pub fn is_visited(&self) -> bool {
        self.parent_route != Parent::Unvisited
    }

    /// Coordinates of the starting point.
    pub fn start_point(&self) -> (u32, u32) {
        self.road.point(self.segment_start)
    }
}

/// Storage for [RouteSegment]s, linked together by [SegmentId]s.
#[derive(Debug, Default, Clone)]
pub struct SegmentArena {
    segments: Vec<RouteSegment>,
}

impl SegmentArena {
    pub fn alloc(&mut self, segment: RouteSegment) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(segment);
        id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Appends `id` at the tail of the chain starting at `head`.
    pub fn append(&mut self, head: SegmentId, id: SegmentId) {
        let mut at = head;
        while let Some(next) = self[at].next {
            at = next;
        }
        self[at].next = Some(id);
    }

    /// Iterates over the chain of segments starting at `head`, following [RouteSegment::next].
    pub fn chain(&self, head: Option<SegmentId>) -> Chain<'_> {
        Chain { arena: self, at: head }
    }
}

impl Index<SegmentId> for SegmentArena {
    type Output = RouteSegment;

    fn index(&self, id: SegmentId) -> &RouteSegment {
        &self.segments[id.0 as usize]
    }
}

impl IndexMut<SegmentId> for SegmentArena {
    fn index_mut(&mut self, id: SegmentId) -> &mut RouteSegment {
        &mut self.segments[id.0 as usize]
    }
}

/// Iterator over a chain of segments sharing a coordinate.
pub struct Chain<'a> {
    arena: &'a SegmentArena,
    at: Option<SegmentId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (SegmentId, &'a RouteSegment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.at?;
        let segment = &self.arena[id];
        self.at = segment.next;
        Some((id, segment))
    }
}

/// Resolves the direction of a segment, returning the segment which traverses its road
/// from the same point in the requested direction.
///
/// Returns `None` if the requested direction would walk off the end of the road.
/// An unassigned segment is claimed for the requested direction. A segment assigned
/// to the other direction lazily creates (once) and returns its opposite sibling.
pub fn init_route_segment(
    arena: &mut SegmentArena,
    id: SegmentId,
    positive_direction: bool,
) -> Option<SegmentId> {
    let s = &arena[id];
    if s.segment_start == 0 && !positive_direction {
        return None;
    }
    if s.segment_start + 1 >= s.road.points_len() && positive_direction {
        return None;
    }

    let wanted: i8 = if positive_direction { 1 } else { -1 };
    if s.direction_assgn == 0 {
        arena[id].direction_assgn = wanted;
        return Some(id);
    }
    if s.direction_assgn == wanted {
        return Some(id);
    }

    if let Some(opposite) = s.opposite_direction {
        if arena[opposite].direction_assgn != wanted {
            log::warn!(
                "segment {}:{} has an opposite sibling with direction {}",
                s.road.id,
                s.segment_start,
                arena[opposite].direction_assgn
            );
            arena[opposite].direction_assgn = wanted;
        }
        return Some(opposite);
    }

    let mut sibling = RouteSegment::new(Rc::clone(&s.road), s.segment_start);
    sibling.direction_assgn = wanted;
    sibling.opposite_direction = Some(id);
    let sibling = arena.alloc(sibling);
    arena[id].opposite_direction = Some(sibling);
    Some(sibling)
}

/// One road traversed by a found route, from `start_point_index` to `end_point_index`
/// (decreasing indices mean the road is traversed backwards).
#[derive(Debug, Clone)]
pub struct RouteSegmentResult {
    pub object: Rc<RouteDataObject>,
    pub start_point_index: usize,
    pub end_point_index: usize,

    /// Time (seconds) spent on this road, including the turn onto it.
    pub routing_time: f32,

    /// For every point from `start_point_index` to `end_point_index`,
    /// other roads which could have been taken at that point.
    pub attached_routes: Vec<Vec<RouteSegmentResult>>,
}

impl RouteSegmentResult {
    pub fn new(object: Rc<RouteDataObject>, start_point_index: usize, end_point_index: usize) -> Self {
        Self {
            object,
            start_point_index,
            end_point_index,
            routing_time: 0.0,
            attached_routes: Vec::default(),
        }
    }

    pub fn is_forward(&self) -> bool {
        self.end_point_index >= self.start_point_index
    }

    /// Iterates over the traversed point indices, in travel order.
    pub fn point_indices(&self) -> Box<dyn Iterator<Item = usize>> {
        if self.is_forward() {
            Box::new(self.start_point_index..=self.end_point_index)
        } else {
            Box::new((self.end_point_index..=self.start_point_index).rev())
        }
    }

    /// Iterates over the traversed coordinates, in travel order.
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.point_indices().map(|i| self.object.point(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::RouteRegion;

    fn road(id: i64, points: usize) -> Rc<RouteDataObject> {
        Rc::new(RouteDataObject {
            region: Rc::new(RouteRegion::new("test")),
            id,
            points: (0..points as u32).map(|i| (i * 10, 0)).collect(),
            types: vec![],
            point_types: vec![],
            restrictions: vec![],
        })
    }

    #[test]
    fn init_is_idempotent() {
        let mut arena = SegmentArena::default();
        let s = arena.alloc(RouteSegment::new(road(1, 3), 1));
        assert_eq!(arena[s].direction(), 0);

        assert_eq!(init_route_segment(&mut arena, s, true), Some(s));
        assert_eq!(init_route_segment(&mut arena, s, true), Some(s));
        assert_eq!(arena[s].direction(), 1);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn init_creates_sibling_once() {
        let mut arena = SegmentArena::default();
        let s = arena.alloc(RouteSegment::new(road(1, 3), 1));

        let forward = init_route_segment(&mut arena, s, true).unwrap();
        let backward = init_route_segment(&mut arena, s, false).unwrap();
        assert_ne!(forward, backward);
        assert_eq!(arena[forward].opposite_direction, Some(backward));
        assert_eq!(arena[backward].opposite_direction, Some(forward));
        assert_eq!(arena[backward].direction(), -1);
        assert_eq!(arena[backward].segment_start, 1);
        assert_eq!(arena[backward].segment_end(), 0);
        assert_eq!(arena[forward].segment_end(), 2);

        assert_eq!(init_route_segment(&mut arena, s, false), Some(backward));
        assert_eq!(init_route_segment(&mut arena, backward, true), Some(forward));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn init_at_road_ends() {
        let mut arena = SegmentArena::default();
        let first = arena.alloc(RouteSegment::new(road(1, 3), 0));
        let last = arena.alloc(RouteSegment::new(road(1, 3), 2));

        assert_eq!(init_route_segment(&mut arena, first, false), None);
        assert_eq!(init_route_segment(&mut arena, last, true), None);
        assert_eq!(arena[first].direction(), 0);
        assert_eq!(init_route_segment(&mut arena, last, false), Some(last));
        assert_eq!(init_route_segment(&mut arena, first, true), Some(first));
    }

    #[test]
    fn chains() {
        let mut arena = SegmentArena::default();
        let a = arena.alloc(RouteSegment::new(road(1, 2), 0));
        let b = arena.alloc(RouteSegment::new(road(2, 2), 1));
        let c = arena.alloc(RouteSegment::new(road(3, 2), 0));
        arena.append(a, b);
        arena.append(a, c);

        let ids: Vec<i64> = arena.chain(Some(a)).map(|(_, s)| s.road_id()).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(arena.chain(None).count(), 0);
    }

    #[test]
    fn result_points() {
        let r = road(1, 4);
        let backward = RouteSegmentResult::new(Rc::clone(&r), 3, 1);
        assert!(!backward.is_forward());
        assert_eq!(backward.points().collect::<Vec<_>>(), [(30, 0), (20, 0), (10, 0)]);

        let forward = RouteSegmentResult::new(r, 0, 1);
        assert_eq!(forward.point_indices().collect::<Vec<_>>(), [0, 1]);
    }
}

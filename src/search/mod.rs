// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Bidirectional A* search over segments loaded on demand by a [RoutingContext].
//!
//! Each side of the search walks [RouteSegment](crate::RouteSegment)s: a segment at point `p`
//! with direction `d` means "at `p`, about to traverse the edge towards `p + d`".
//! The backward side walks edges against the travel direction, starting at the target.
//! Both sides identify their states by the real (travel-direction) edge, which is how
//! a meeting of the two sides is detected.

mod error;
mod queue;

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::f64::consts::PI;
use std::rc::Rc;
use std::time::Instant;

use crate::config::NO_INITIAL_DIRECTION;
use crate::context::RoutingContext;
use crate::distance::measured_distance_31;
use crate::map::RouteDataObject;
use crate::segment::{init_route_segment, Parent, RouteSegmentResult, SegmentArena, SegmentId};

pub use error::SearchError;
use queue::QueueItem;

/// Zoom of the neighborhood searched for roads near the start and target points.
pub const ZOOM_AROUND: u32 = 17;

/// Penalty (seconds) of starting in a direction deviating from
/// the initial direction by more than 90°.
const WRONG_INITIAL_DIRECTION_PENALTY: f32 = 500.0;

/// Number of settled segments between progress reports.
const PROGRESS_INTERVAL: usize = 100;

/// Lower bound of the effective road speed (m/s), protects against zero priorities.
const MIN_EFFECTIVE_SPEED: f32 = 0.1;

/// Finds the road point closest to the given coordinate, among roads
/// in the tiles around the coordinate.
pub fn find_route_segment(
    ctx: &mut RoutingContext,
    x31: u32,
    y31: u32,
) -> Option<(Rc<RouteDataObject>, usize)> {
    let mut best: Option<(Rc<RouteDataObject>, usize, f32)> = None;

    for road in ctx.load_tile_data(x31, y31, ZOOM_AROUND) {
        for (i, &(x, y)) in road.points.iter().enumerate() {
            let d = measured_distance_31(x31, y31, x, y);
            if best.as_ref().map_or(true, |b| d < b.2) {
                best = Some((Rc::clone(&road), i, d));
            }
        }
    }

    best.map(|(road, i, _)| (road, i))
}

/// Finds the fastest route between [RoutingContext::start_x]/[RoutingContext::start_y]
/// and [RoutingContext::target_x]/[RoutingContext::target_y].
///
/// Returns an empty vector if no route exists. With `left_side_navigation`
/// left and right turn penalties are swapped.
///
/// The tile cache of the context is kept after the search, so that following
/// searches over the same area are faster.
pub fn search_route_internal(
    ctx: &mut RoutingContext,
    left_side_navigation: bool,
) -> Result<Vec<RouteSegmentResult>, SearchError> {
    let started = Instant::now();
    if ctx.is_interrupted() {
        return Err(SearchError::Cancelled);
    }

    let (start_x, start_y) = (ctx.start_x, ctx.start_y);
    let (target_x, target_y) = (ctx.target_x, ctx.target_y);

    let Some(start) = find_route_segment(ctx, start_x, start_y) else {
        if let Some(p) = &ctx.progress {
            p.set_segment_not_found(0);
        }
        return Err(SearchError::StartNotFound);
    };

    let Some(target) = find_route_segment(ctx, target_x, target_y) else {
        if let Some(p) = &ctx.progress {
            p.set_segment_not_found(1);
        }
        return Err(SearchError::TargetNotFound);
    };

    let start_point = start.0.point(start.1);
    let target_point = target.0.point(target.1);
    let result = if start_point == target_point {
        Ok(vec![RouteSegmentResult::new(start.0, start.1, start.1)])
    } else {
        Search::new(ctx, left_side_navigation, start_point, target_point).run()
    };

    ctx.time_to_calculate += started.elapsed();
    log::info!(
        "Route search finished: visited {} segments, loaded {} tiles, load time {:?}, calculation time {:?}",
        ctx.visited_segments,
        ctx.loaded_tiles,
        ctx.time_to_load,
        ctx.time_to_calculate,
    );
    result
}

/// A road edge, as traversed in the travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    road: i64,
    from: usize,
    dir: i8,
}

#[derive(Debug, Default)]
struct Side {
    queue: BinaryHeap<QueueItem>,

    /// Best known segment for every reached edge.
    visited: HashMap<EdgeKey, SegmentId>,
    settled: HashSet<EdgeKey>,
    max_cost: f32,
}

#[derive(Debug, Clone, Copy)]
struct Meeting {
    total: f32,
    forward: SegmentId,
    backward: SegmentId,
}

struct Search<'c, 'a> {
    ctx: &'c mut RoutingContext<'a>,
    arena: SegmentArena,
    forward: Side,
    backward: Side,
    left_side_navigation: bool,
    start_point: (u32, u32),
    target_point: (u32, u32),
    best: Option<Meeting>,
    best_initial_deviation: f64,
}

impl<'c, 'a> Search<'c, 'a> {
    fn new(
        ctx: &'c mut RoutingContext<'a>,
        left_side_navigation: bool,
        start_point: (u32, u32),
        target_point: (u32, u32),
    ) -> Self {
        Self {
            ctx,
            arena: SegmentArena::default(),
            forward: Side::default(),
            backward: Side::default(),
            left_side_navigation,
            start_point,
            target_point,
            best: None,
            best_initial_deviation: f64::INFINITY,
        }
    }

    fn run(mut self) -> Result<Vec<RouteSegmentResult>, SearchError> {
        let two_directions = self.ctx.plan_route_in_2_directions();
        self.add_sources(false, self.start_point);
        self.add_sources(true, self.target_point);

        if !two_directions {
            // The target is only recognized, never expanded
            let keys: Vec<EdgeKey> = self.backward.visited.keys().cloned().collect();
            self.backward.settled.extend(keys);
            self.backward.queue.clear();
        }

        let mut settled = 0;
        loop {
            if self.ctx.is_interrupted() {
                return Err(SearchError::Cancelled);
            }

            let reverse = two_directions
                && !self.backward.queue.is_empty()
                && (self.forward.queue.is_empty()
                    || self.backward.queue.len() < self.forward.queue.len());

            let Some(item) = self.side_mut(reverse).queue.pop() else {
                break;
            };

            // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same segment.
            if item.cost > self.arena[item.segment].distance_from_start {
                continue;
            }

            if self.best.is_some_and(|m| item.score >= m.total) {
                break;
            }

            let key = self.edge_of(reverse, item.segment);
            let side = self.side_mut(reverse);
            if !side.settled.insert(key) {
                continue;
            }
            side.max_cost = side.max_cost.max(item.cost);
            self.ctx.visited_segments += 1;

            // The other side already knows its best cost from this edge
            if self.side(!reverse).settled.contains(&key) {
                self.check_meeting(reverse, key, item.segment);
                continue;
            }

            settled += 1;
            if settled % PROGRESS_INTERVAL == 0 {
                self.report_progress();
            }

            self.expand(reverse, item.segment);
        }

        self.report_progress();
        match self.best {
            Some(m) => Ok(self.reconstruct(m)),
            None => Ok(Vec::default()),
        }
    }

    fn side(&self, reverse: bool) -> &Side {
        if reverse {
            &self.backward
        } else {
            &self.forward
        }
    }

    fn side_mut(&mut self, reverse: bool) -> &mut Side {
        if reverse {
            &mut self.backward
        } else {
            &mut self.forward
        }
    }

    fn report_progress(&self) {
        if let Some(p) = &self.ctx.progress {
            p.update_status(
                self.forward.max_cost,
                self.forward.queue.len(),
                self.backward.max_cost,
                self.backward.queue.len(),
            );
        }
    }

    /// Returns the real edge traversed by a segment of one of the sides.
    fn edge_of(&self, reverse: bool, id: SegmentId) -> EdgeKey {
        let s = &self.arena[id];
        if reverse {
            EdgeKey {
                road: s.road_id(),
                from: s.segment_end(),
                dir: -s.direction(),
            }
        } else {
            EdgeKey {
                road: s.road_id(),
                from: s.segment_start,
                dir: s.direction(),
            }
        }
    }

    /// Checks if a road may be driven from point `from` towards `from + dir`.
    fn is_passable(&self, road: &RouteDataObject, from: usize, dir: i8) -> bool {
        let to = from as isize + dir as isize;
        if to < 0 || to as usize >= road.points_len() {
            return false;
        }
        let to = to as usize;

        let c = self.ctx.config;
        match c.is_one_way(road) {
            1 if dir < 0 => return false,
            -1 if dir > 0 => return false,
            _ => {}
        }

        c.define_obstacle(road, to) >= 0.0 && c.define_routing_obstacle(road, to) >= 0.0
    }

    /// Time (seconds) of driving a road from point `from` towards `from + dir`,
    /// including the penalty of the point reached.
    fn edge_time(&self, road: &RouteDataObject, from: usize, dir: i8) -> f32 {
        let c = self.ctx.config;
        let to = (from as isize + dir as isize) as usize;
        let (x1, y1) = road.point(from);
        let (x2, y2) = road.point(to);
        let speed = (c.define_speed(road) * c.define_speed_priority(road)).max(MIN_EFFECTIVE_SPEED);
        measured_distance_31(x1, y1, x2, y2) / speed + c.define_routing_obstacle(road, to).max(0.0)
    }

    /// Checks turn restrictions of leaving road `from` onto road `to`.
    fn is_turn_allowed(&self, from: &RouteDataObject, to: &RouteDataObject) -> bool {
        if !self.ctx.config.restrictions_aware() || from.id == to.id {
            return true;
        }

        let mut allowed = true;
        for r in &from.restrictions {
            if r.to == to.id {
                return r.kind.is_mandatory();
            }
            if r.kind.is_mandatory() {
                allowed = false;
            }
        }
        allowed
    }

    fn heuristic(&self, reverse: bool, (x, y): (u32, u32)) -> f32 {
        if reverse {
            let (sx, sy) = self.start_point;
            return self.ctx.heuristic(x, y, sx, sy);
        }

        if let Some(t) = self
            .ctx
            .precalculated_route
            .as_ref()
            .and_then(|p| p.time_to_end(x, y))
        {
            return t;
        }

        let (tx, ty) = self.target_point;
        self.ctx.heuristic(x, y, tx, ty)
    }

    /// Returns the penalty for starting on a road in a given direction,
    /// remembering the best aligned start road in the context.
    fn initial_direction_penalty(&mut self, road: &RouteDataObject, from: usize, dir: i8) -> f32 {
        let initial = self.ctx.config.initial_direction;
        if initial == NO_INITIAL_DIRECTION {
            return 0.0;
        }

        let (x1, y1) = road.point(from);
        let (x2, y2) = road.point((from as isize + dir as isize) as usize);
        let bearing = (x2 as f64 - x1 as f64).atan2(y1 as f64 - y2 as f64);
        let deviation = align_angle(initial as f64 - bearing).abs();

        if deviation < self.best_initial_deviation {
            self.best_initial_deviation = deviation;
            self.ctx.first_road_id = road.id;
            self.ctx.first_road_direction = dir;
        }

        if deviation > PI / 2.0 {
            WRONG_INITIAL_DIRECTION_PENALTY
        } else {
            0.0
        }
    }

    /// Pushes all segments at a point into one side of the search.
    fn add_sources(&mut self, reverse: bool, (x, y): (u32, u32)) {
        let head = self.ctx.load_route_segment(x, y, &mut self.arena);
        let ids: Vec<SegmentId> = self.arena.chain(head).map(|(id, _)| id).collect();

        for id in ids {
            for positive in [true, false] {
                let Some(n) = init_route_segment(&mut self.arena, id, positive) else {
                    continue;
                };
                let key = self.edge_of(reverse, n);
                let road = Rc::clone(&self.arena[n].road);
                if !self.is_passable(&road, key.from, key.dir) {
                    continue;
                }

                let cost = if reverse {
                    0.0
                } else {
                    self.initial_direction_penalty(&road, key.from, key.dir)
                };
                self.relax(reverse, n, cost, Parent::Origin);
            }
        }
    }

    /// Records a cost of reaching a segment, if it is better than the known one.
    fn relax(&mut self, reverse: bool, id: SegmentId, cost: f32, parent: Parent) {
        let key = self.edge_of(reverse, id);
        let side = self.side(reverse);
        if side.settled.contains(&key) {
            return;
        }

        let canonical = match side.visited.get(&key) {
            Some(&known) if self.arena[known].distance_from_start <= cost => return,
            Some(&known) => known,
            None => id,
        };

        let h = self.heuristic(reverse, self.arena[canonical].start_point());
        let s = &mut self.arena[canonical];
        s.distance_from_start = cost;
        s.distance_to_end = h;
        s.parent_route = parent;

        let side = self.side_mut(reverse);
        side.visited.insert(key, canonical);
        side.queue.push(QueueItem {
            segment: canonical,
            cost,
            score: cost + h,
        });

        self.check_meeting(reverse, key, canonical);
    }

    /// Updates the best meeting, if the other side has also reached the edge.
    fn check_meeting(&mut self, reverse: bool, key: EdgeKey, id: SegmentId) {
        let Some(&other) = self.side(!reverse).visited.get(&key) else {
            return;
        };
        let (forward, backward) = if reverse { (other, id) } else { (id, other) };

        let road = Rc::clone(&self.arena[forward].road);
        let total = self.arena[forward].distance_from_start
            + self.edge_time(&road, key.from, key.dir)
            + self.arena[backward].distance_from_start;

        if self.best.map_or(true, |m| total < m.total) {
            self.best = Some(Meeting {
                total,
                forward,
                backward,
            });
        }
    }

    fn expand(&mut self, reverse: bool, id: SegmentId) {
        let s = &self.arena[id];
        let road = Rc::clone(&s.road);
        let dir = s.direction();
        let arrival = s.segment_end();
        let key = self.edge_of(reverse, id);
        let cost = s.distance_from_start + self.edge_time(&road, key.from, key.dir);

        let (x, y) = road.point(arrival);
        let head = self.ctx.load_route_segment(x, y, &mut self.arena);
        let chain: Vec<SegmentId> = self.arena.chain(head).map(|(n, _)| n).collect();

        for n in chain {
            let next_road = Rc::clone(&self.arena[n].road);
            let k = self.arena[n].segment_start;
            let continuation = next_road.id == road.id && k == arrival;

            for positive in [true, false] {
                let e: i8 = if positive { 1 } else { -1 };
                if continuation && e != dir {
                    continue;
                }

                let turn = if continuation {
                    0.0
                } else {
                    let (from, from_point, from_dir, to, to_start, to_dir) = if reverse {
                        (&next_road, k, -e, &road, arrival, -dir)
                    } else {
                        (&road, arrival, dir, &next_road, k, e)
                    };

                    if !self.is_turn_allowed(from, to) {
                        continue;
                    }

                    self.ctx.config.calculate_turn_time(
                        from,
                        from_point,
                        from_dir,
                        to,
                        to_start,
                        to_dir,
                        self.left_side_navigation,
                    )
                };

                let Some(m) = init_route_segment(&mut self.arena, n, positive) else {
                    continue;
                };
                let next_key = self.edge_of(reverse, m);
                if !self.is_passable(&next_road, next_key.from, next_key.dir) {
                    continue;
                }

                self.relax(reverse, m, cost + turn, Parent::Segment(id));
            }
        }
    }

    /// Walks parent links from a segment, returning the segments in the visiting order.
    fn walk_parents(&self, from: Option<SegmentId>) -> Vec<SegmentId> {
        let mut path = Vec::default();
        let mut at = from;
        while let Some(id) = at {
            if path.len() > self.arena.len() {
                log::warn!("cycle in parent links of segment {:?}", id);
                break;
            }
            path.push(id);
            at = match self.arena[id].parent_route {
                Parent::Segment(id) => Some(id),
                Parent::Origin | Parent::Unvisited => None,
            };
        }
        path
    }

    fn reconstruct(&mut self, m: Meeting) -> Vec<RouteSegmentResult> {
        let mut forward = self.walk_parents(Some(m.forward));
        forward.reverse();

        let backward_parent = match self.arena[m.backward].parent_route {
            Parent::Segment(id) => Some(id),
            _ => None,
        };
        let backward = self.walk_parents(backward_parent);

        let mut edges: Vec<(Rc<RouteDataObject>, EdgeKey)> = Vec::default();
        for (ids, reverse) in [(forward, false), (backward, true)] {
            for id in ids {
                self.arena[id].reverse_way_search = if reverse { -1 } else { 1 };
                edges.push((Rc::clone(&self.arena[id].road), self.edge_of(reverse, id)));
            }
        }
        self.arena[m.backward].reverse_way_search = -1;

        let mut results: Vec<RouteSegmentResult> = Vec::default();
        let mut last: Option<(Rc<RouteDataObject>, EdgeKey)> = None;

        for (road, e) in edges {
            let to = (e.from as isize + e.dir as isize) as usize;
            let time = self.edge_time(&road, e.from, e.dir);

            let continues = last
                .as_ref()
                .is_some_and(|(_, prev)| prev.road == e.road && prev.dir == e.dir)
                && results.last().is_some_and(|r| r.end_point_index == e.from);

            match results.last_mut() {
                Some(r) if continues => {
                    r.end_point_index = to;
                    r.routing_time += time;
                }

                _ => {
                    let turn = match &last {
                        Some((prev_road, prev)) => self.ctx.config.calculate_turn_time(
                            prev_road,
                            (prev.from as isize + prev.dir as isize) as usize,
                            prev.dir,
                            &road,
                            e.from,
                            e.dir,
                            self.left_side_navigation,
                        ),
                        None => 0.0,
                    };
                    let mut r = RouteSegmentResult::new(Rc::clone(&road), e.from, to);
                    r.routing_time = turn + time;
                    results.push(r);
                }
            }

            last = Some((road, e));
        }

        self.attach_routes(&mut results);
        results
    }

    /// Fills [RouteSegmentResult::attached_routes] with roads which could be taken
    /// at the points of the route.
    fn attach_routes(&mut self, results: &mut [RouteSegmentResult]) {
        for i in 0..results.len() {
            let prev_road = i.checked_sub(1).map(|j| results[j].object.id);
            let next_road = results.get(i + 1).map(|r| r.object.id);
            let r = &results[i];
            let indices: Vec<usize> = r.point_indices().collect();
            let own = r.object.id;
            let road = Rc::clone(&r.object);

            let mut attached = Vec::with_capacity(indices.len());
            for (pos, &idx) in indices.iter().enumerate() {
                let mut exclude = vec![own];
                exclude.extend(prev_road.filter(|_| pos == 0));
                exclude.extend(next_road.filter(|_| pos + 1 == indices.len()));

                let (x, y) = road.point(idx);
                attached.push(self.roads_at(x, y, &exclude));
            }
            results[i].attached_routes = attached;
        }
    }

    fn roads_at(&mut self, x: u32, y: u32, exclude: &[i64]) -> Vec<RouteSegmentResult> {
        let mut arena = SegmentArena::default();
        let head = self.ctx.load_route_segment(x, y, &mut arena);

        let mut found = Vec::default();
        for (_, s) in arena.chain(head) {
            if exclude.contains(&s.road_id()) {
                continue;
            }
            for dir in [1, -1] {
                if self.is_passable(&s.road, s.segment_start, dir) {
                    let to = (s.segment_start as isize + dir as isize) as usize;
                    found.push(RouteSegmentResult::new(Rc::clone(&s.road), s.segment_start, to));
                }
            }
        }
        found
    }
}

/// Normalizes an angle into the [-π, π] range.
fn align_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Cost model of the router: converts tags of [roads](RouteDataObject) into
//! speeds, priorities, exclusions and point penalties.

use std::collections::HashMap;

use crate::map::RouteDataObject;

mod profile;
pub mod xml;

pub use profile::{ProfileRule, RuleKind, BICYCLE_PROFILE, CAR_PROFILE, PEDESTRIAN_PROFILE};

/// Speed returned by [RoutingConfiguration::max_speed] for `maxspeed=none`, in m/s.
pub const UNLIMITED_MAX_SPEED: f32 = 40.0;

/// Default memory budget of the tile cache, in megabytes.
pub const DEFAULT_MEMORY_LIMIT_MB: usize = 48;

/// Value of [RoutingConfiguration::initial_direction] meaning "no preferred direction".
pub const NO_INITIAL_DIRECTION: f32 = -360.0;

/// Turns sharper than this angle (in degrees) are penalized with
/// [RoutingConfiguration::left_turn] or [RoutingConfiguration::right_turn].
const TURN_ANGLE_THRESHOLD: f64 = 45.0;

/// Routing profile, immutable after construction and shared read-only by searches.
///
/// Built from an ordered list of [ProfileRule] triples. All lookups are done by exact
/// string keys of the form `tag$value` (or `tag$` for tag-only point obstacles).
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfiguration {
    highway_speed: HashMap<String, f32>,
    highway_priorities: HashMap<String, f32>,
    avoid: HashMap<String, f32>,
    obstacles: HashMap<String, f32>,
    routing_obstacles: HashMap<String, f32>,
    attributes: HashMap<String, String>,

    /// Zoom of the coarse tiles used to batch subregion loading.
    pub zoom_to_load: u32,

    /// Multiplier of the distance-to-target heuristic; values above 1
    /// trade optimality for speed.
    pub heur_coefficient: f32,

    /// Upper bound for default speeds, in m/s.
    pub max_default_speed: f32,

    /// Speed of roads without any matching speed entry, in m/s.
    pub min_default_speed: f32,

    pub restrictions: bool,
    pub oneway_aware: bool,
    pub follow_limitations: bool,

    /// Soft memory budget of the tile cache, in megabytes.
    pub memory_limitation: usize,

    /// 0 to search from both ends, any other value to search only forward.
    pub plan_road_direction: i32,

    pub router_name: String,
    pub router_profile: String,

    /// Preferred initial heading, in radians clockwise from north, or [NO_INITIAL_DIRECTION].
    pub initial_direction: f32,

    pub distance_recalculate: f32,

    /// Turn penalties, in seconds.
    pub roundabout_turn: f32,
    pub left_turn: f32,
    pub right_turn: f32,
}

impl RoutingConfiguration {
    /// Builds a configuration from profile rules. Later rules with the same kind and key
    /// override earlier ones. Unknown attributes are ignored and missing attributes
    /// take their defaults.
    pub fn new(rules: &[ProfileRule], initial_direction: f32, memory_limit_mb: usize) -> Self {
        let mut c = Self {
            highway_speed: HashMap::default(),
            highway_priorities: HashMap::default(),
            avoid: HashMap::default(),
            obstacles: HashMap::default(),
            routing_obstacles: HashMap::default(),
            attributes: HashMap::default(),
            zoom_to_load: 16,
            heur_coefficient: 1.0,
            max_default_speed: 130.0 / 3.6,
            min_default_speed: 45.0 / 3.6,
            restrictions: true,
            oneway_aware: true,
            follow_limitations: true,
            memory_limitation: memory_limit_mb,
            plan_road_direction: 0,
            router_name: String::default(),
            router_profile: String::default(),
            initial_direction,
            distance_recalculate: 10000.0,
            roundabout_turn: 0.0,
            left_turn: 0.0,
            right_turn: 0.0,
        };

        for rule in rules {
            let table = match rule.kind {
                RuleKind::HighwaySpeed => &mut c.highway_speed,
                RuleKind::HighwayPriority => &mut c.highway_priorities,
                RuleKind::Avoid => &mut c.avoid,
                RuleKind::Obstacle => &mut c.obstacles,
                RuleKind::RoutingObstacle => &mut c.routing_obstacles,
                RuleKind::Attribute => {
                    c.attributes.insert(rule.key.clone(), rule.value.clone());
                    continue;
                }
            };
            table.insert(rule.key.clone(), parse_number(&rule.value));
        }

        c.default_params();
        c
    }

    /// Shorthand for building a configuration from a static table of triples,
    /// like [CAR_PROFILE], without an initial direction and with the default memory limit.
    pub fn from_triples(triples: &[(RuleKind, &str, &str)]) -> Self {
        Self::new(
            &ProfileRule::from_triples(triples),
            NO_INITIAL_DIRECTION,
            DEFAULT_MEMORY_LIMIT_MB,
        )
    }

    fn default_params(&mut self) {
        self.plan_road_direction = self.parse_float("planRoadDirection", 0.0) as i32;
        self.restrictions = self.parse_bool("restrictionsAware", true);
        self.follow_limitations = self.parse_bool("followSpeedLimitations", true);
        self.oneway_aware = self.parse_bool("onewayAware", true);
        self.roundabout_turn = self.parse_float("roundaboutTurn", 0.0);
        self.left_turn = self.parse_float("leftTurn", 0.0);
        self.right_turn = self.parse_float("rightTurn", 0.0);
        self.min_default_speed = self.parse_float("minDefaultSpeed", 45.0) / 3.6;
        self.max_default_speed = self.parse_float("maxDefaultSpeed", 130.0) / 3.6;
        self.heur_coefficient = self.parse_float("heuristicCoefficient", 1.0);
        self.memory_limitation = self
            .parse_float("nativeMemoryLimitInMB", self.memory_limitation as f32)
            .max(0.0) as usize;
        self.zoom_to_load = (self.parse_float("zoomToLoadTiles", 16.0) as u32).clamp(1, 31);
        self.router_name = self.parse_string("name", "default");
        self.router_profile = self.parse_string("baseProfile", "car");
        self.distance_recalculate = self.parse_float("recalculateDistanceHelp", 10000.0);
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    fn parse_float(&self, key: &str, default: f32) -> f32 {
        self.attribute(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool(&self, key: &str, default: bool) -> bool {
        self.attribute(key).map_or(default, |v| v == "true")
    }

    fn parse_string(&self, key: &str, default: &str) -> String {
        self.attribute(key).unwrap_or(default).to_string()
    }

    /// Returns the configured speed (km/h) under a given key, or 0.
    fn highway_speed(&self, key: &str) -> f32 {
        self.highway_speed.get(key).cloned().unwrap_or(0.0)
    }

    /// Checks if a road is a part of the routable graph: at least one of its tags must
    /// have a positive speed (`highway` tags may also be matched by their bare value),
    /// and none of its tags can be avoided.
    pub fn accept_line(&self, r: &RouteDataObject) -> bool {
        let accepted = r.tags().any(|(tag, value)| {
            (tag == "highway" && self.highway_speed(value) > 0.0)
                || self.highway_speed(&rule_key(tag, value)) > 0.0
        });

        accepted
            && !r
                .tags()
                .any(|(tag, value)| self.avoid.contains_key(&rule_key(tag, value)))
    }

    /// Returns the product of all matching priorities, or 1 if no priority matches.
    pub fn define_speed_priority(&self, r: &RouteDataObject) -> f32 {
        r.tags()
            .filter_map(|(tag, value)| self.highway_priorities.get(&rule_key(tag, value)))
            .product()
    }

    pub fn min_default_speed(&self) -> f32 {
        self.min_default_speed
    }

    pub fn max_default_speed(&self) -> f32 {
        self.max_default_speed
    }

    /// Returns 1 if the road can only be traversed forward, -1 if only backwards,
    /// and 0 if in both directions. Roundabouts are always one-way forward.
    pub fn is_one_way(&self, r: &RouteDataObject) -> i8 {
        if !self.oneway_aware {
            return 0;
        }

        for (tag, value) in r.tags() {
            match (tag, value) {
                ("oneway", "-1" | "reverse") => return -1,
                ("oneway", "1" | "yes") => return 1,
                ("roundabout", _) | ("junction", "roundabout") => return 1,
                _ => {}
            }
        }
        0
    }

    /// Checks if the road is a part of a roundabout.
    pub fn is_roundabout(&self, r: &RouteDataObject) -> bool {
        r.tags()
            .any(|(tag, value)| tag == "roundabout" || (tag == "junction" && value == "roundabout"))
    }

    /// Returns the time penalty (seconds) of passing a given point of a road,
    /// or 0 if nothing matches. Exact `tag$value` entries take precedence over `tag$` ones.
    /// A negative value marks an impassable point.
    pub fn define_routing_obstacle(&self, r: &RouteDataObject, point: usize) -> f32 {
        lookup_point(&self.routing_obstacles, r, point)
    }

    /// Same as [RoutingConfiguration::define_routing_obstacle], but against the
    /// table of general obstacles.
    pub fn define_obstacle(&self, r: &RouteDataObject, point: usize) -> f32 {
        lookup_point(&self.obstacles, r, point)
    }

    pub fn restrictions_aware(&self) -> bool {
        self.restrictions
    }

    /// Parses the `maxspeed` tag of the road into m/s. Returns 0 if the tag
    /// is missing or malformed.
    pub fn max_speed(&self, r: &RouteDataObject) -> f32 {
        let Some(v) = r.tag("maxspeed") else {
            return 0.0;
        };

        if v == "none" {
            return UNLIMITED_MAX_SPEED;
        }

        let digits = v.bytes().take_while(|b| b.is_ascii_digit()).count();
        match v[..digits].parse::<u32>() {
            Ok(kmh) => {
                let mut f = kmh as f32 / 3.6;
                if v.contains("mph") {
                    f *= 1.6;
                }
                f
            }
            Err(_) => 0.0,
        }
    }

    /// Returns the speed (m/s) of the road: its speed limit (if following limitations),
    /// otherwise the first matching configured speed, otherwise [RoutingConfiguration::min_default_speed].
    pub fn define_speed(&self, r: &RouteDataObject) -> f32 {
        if self.follow_limitations {
            let m = self.max_speed(r);
            if m > 0.0 {
                return m;
            }
        }

        r.tags()
            .map(|(tag, value)| self.highway_speed(&rule_key(tag, value)))
            .find(|&f| f > 0.0)
            .map(|f| f / 3.6)
            .unwrap_or(self.min_default_speed)
    }

    /// Returns the time penalty (seconds) of switching from road `from` (arriving at `from_point`
    /// moving in `from_dir`) onto road `to` (leaving `to_start` in `to_dir`).
    ///
    /// Continuing on the same road is free. Entering a roundabout costs [RoutingConfiguration::roundabout_turn].
    /// Other turns sharper than 45° cost [RoutingConfiguration::left_turn] or
    /// [RoutingConfiguration::right_turn]; the two are swapped for left-side traffic.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_turn_time(
        &self,
        from: &RouteDataObject,
        from_point: usize,
        from_dir: i8,
        to: &RouteDataObject,
        to_start: usize,
        to_dir: i8,
        left_side_navigation: bool,
    ) -> f32 {
        if from.id == to.id {
            return 0.0;
        }

        if self.is_roundabout(to) && !self.is_roundabout(from) {
            return self.roundabout_turn;
        }

        let before = from_point as isize - from_dir as isize;
        let after = to_start as isize + to_dir as isize;
        if before < 0
            || before as usize >= from.points_len()
            || after < 0
            || after as usize >= to.points_len()
        {
            return 0.0;
        }

        let (ax, ay) = direction(from.point(before as usize), from.point(from_point));
        let (bx, by) = direction(to.point(to_start), to.point(after as usize));
        let angle = (ax * by - ay * bx).atan2(ax * bx + ay * by).to_degrees();

        if angle.abs() < TURN_ANGLE_THRESHOLD {
            0.0
        } else if (angle > 0.0) != left_side_navigation {
            self.left_turn
        } else {
            self.right_turn
        }
    }
}

/// Returns a vector between two points, with the y axis pointing north.
fn direction(from: (u32, u32), to: (u32, u32)) -> (f64, f64) {
    (
        to.0 as f64 - from.0 as f64,
        from.1 as f64 - to.1 as f64,
    )
}

fn rule_key(tag: &str, value: &str) -> String {
    format!("{}${}", tag, value)
}

/// Parses a numeric profile value, treating garbage as 0.
fn parse_number(v: &str) -> f32 {
    v.trim().parse().unwrap_or(0.0)
}

fn lookup_point(table: &HashMap<String, f32>, r: &RouteDataObject, point: usize) -> f32 {
    if table.is_empty() {
        return 0.0;
    }

    r.point_tags(point)
        .find_map(|(tag, value)| table.get(&rule_key(tag, value)))
        .or_else(|| {
            r.point_tags(point)
                .find_map(|(tag, _)| table.get(&rule_key(tag, "")))
        })
        .cloned()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::RouteRegion;
    use std::rc::Rc;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-4),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    macro_rules! tags {
        {} => { &[] as &[(&str, &str)] };
        {$( $k:literal : $v:literal ),+} => { &[ $( ($k, $v) ),+ ] as &[(&str, &str)] };
    }

    fn road_with_point_tags(tags: &[(&str, &str)], point_tags: &[(&str, &str)]) -> RouteDataObject {
        let mut region = RouteRegion::new("test");
        let types = tags.iter().map(|&(k, v)| region.intern(k, v)).collect();
        let middle = point_tags.iter().map(|&(k, v)| region.intern(k, v)).collect();
        RouteDataObject {
            region: Rc::new(region),
            id: 1,
            points: vec![(0, 0), (100, 0), (200, 0)],
            types,
            point_types: vec![vec![], middle],
            restrictions: vec![],
        }
    }

    fn road(tags: &[(&str, &str)]) -> RouteDataObject {
        road_with_point_tags(tags, &[])
    }

    fn test_config(extra: &[(RuleKind, &str, &str)]) -> RoutingConfiguration {
        let mut triples = vec![
            (RuleKind::HighwaySpeed, "highway$primary", "90"),
            (RuleKind::HighwaySpeed, "highway$residential", "30"),
            (RuleKind::HighwaySpeed, "living_street", "20"),
            (RuleKind::HighwaySpeed, "route$ferry", "10"),
            (RuleKind::HighwayPriority, "highway$primary", "1.5"),
            (RuleKind::HighwayPriority, "surface$unpaved", "0.5"),
            (RuleKind::Avoid, "access$no", "1"),
            (RuleKind::RoutingObstacle, "highway$traffic_signals", "25"),
            (RuleKind::RoutingObstacle, "barrier$", "30"),
            (RuleKind::RoutingObstacle, "barrier$gate", "60"),
            (RuleKind::Obstacle, "barrier$block", "-1"),
        ];
        triples.extend_from_slice(extra);
        RoutingConfiguration::from_triples(&triples)
    }

    #[test]
    fn defaults() {
        let c = RoutingConfiguration::from_triples(&[]);
        assert_eq!(c.zoom_to_load, 16);
        assert_eq!(c.plan_road_direction, 0);
        assert_eq!(c.memory_limitation, DEFAULT_MEMORY_LIMIT_MB);
        assert!(c.restrictions_aware());
        assert!(c.oneway_aware);
        assert!(c.follow_limitations);
        assert_almost_eq!(c.min_default_speed(), 12.5);
        assert_almost_eq!(c.max_default_speed(), 36.1111);
        assert_eq!(c.heur_coefficient, 1.0);
        assert_eq!(c.router_name, "default");
        assert_eq!(c.router_profile, "car");
        assert_eq!(c.distance_recalculate, 10000.0);
        assert_eq!(c.initial_direction, NO_INITIAL_DIRECTION);
    }

    #[test]
    fn attributes() {
        let c = test_config(&[
            (RuleKind::Attribute, "planRoadDirection", "1"),
            (RuleKind::Attribute, "restrictionsAware", "false"),
            (RuleKind::Attribute, "onewayAware", "no"),
            (RuleKind::Attribute, "minDefaultSpeed", "36"),
            (RuleKind::Attribute, "maxDefaultSpeed", "garbage"),
            (RuleKind::Attribute, "nativeMemoryLimitInMB", "16"),
            (RuleKind::Attribute, "zoomToLoadTiles", "14"),
            (RuleKind::Attribute, "name", ""),
            (RuleKind::Attribute, "leftTurn", "12.5"),
            (RuleKind::Attribute, "unknownKey", "42"),
        ]);
        assert_eq!(c.plan_road_direction, 1);
        assert!(!c.restrictions_aware());
        assert!(!c.oneway_aware);
        assert_almost_eq!(c.min_default_speed(), 10.0);
        assert_almost_eq!(c.max_default_speed(), 36.1111);
        assert_eq!(c.memory_limitation, 16);
        assert_eq!(c.zoom_to_load, 14);
        assert_eq!(c.router_name, "default");
        assert_eq!(c.left_turn, 12.5);
    }

    #[test]
    fn accept_line() {
        let c = test_config(&[]);
        assert!(c.accept_line(&road(tags! {"highway": "primary"})));
        assert!(c.accept_line(&road(tags! {"highway": "living_street"})));
        assert!(c.accept_line(&road(tags! {"route": "ferry"})));
        assert!(!c.accept_line(&road(tags! {"highway": "motorway"})));
        assert!(!c.accept_line(&road(tags! {})));
        assert!(!c.accept_line(&road(tags! {"highway": "primary", "access": "no"})));
        assert!(c.accept_line(&road(tags! {"highway": "primary", "access": "yes"})));
    }

    #[test]
    fn define_speed() {
        let c = test_config(&[]);
        assert_almost_eq!(c.define_speed(&road(tags! {"highway": "primary"})), 25.0);
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "residential"})),
            30.0 / 3.6
        );
        // bare highway values only decide acceptance, speed falls back to the minimum
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "living_street"})),
            c.min_default_speed()
        );
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "primary", "maxspeed": "60 mph"})),
            60.0 * 1.6 / 3.6
        );
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "primary", "maxspeed": "50"})),
            50.0 / 3.6
        );
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "primary", "maxspeed": "none"})),
            UNLIMITED_MAX_SPEED
        );
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "primary", "maxspeed": "signals"})),
            25.0
        );
    }

    #[test]
    fn define_speed_without_limitations() {
        let c = test_config(&[(RuleKind::Attribute, "followSpeedLimitations", "false")]);
        assert_almost_eq!(
            c.define_speed(&road(tags! {"highway": "primary", "maxspeed": "60 mph"})),
            25.0
        );
    }

    #[test]
    fn define_speed_is_positive_and_bounded() {
        let c = test_config(&[]);
        for tags in [
            tags! {"highway": "primary"},
            tags! {"highway": "residential"},
            tags! {"highway": "living_street"},
            tags! {"route": "ferry"},
            tags! {"highway": "primary", "maxspeed": "80"},
        ] {
            let r = road(tags);
            assert!(c.accept_line(&r));
            let speed = c.define_speed(&r);
            assert!(speed > 0.0 && speed <= c.max_default_speed());
        }
    }

    #[test]
    fn max_speed() {
        let c = test_config(&[]);
        assert_eq!(c.max_speed(&road(tags! {"highway": "primary"})), 0.0);
        assert_eq!(c.max_speed(&road(tags! {"maxspeed": "walk"})), 0.0);
        assert_almost_eq!(c.max_speed(&road(tags! {"maxspeed": "30;50"})), 30.0 / 3.6);
    }

    #[test]
    fn define_speed_priority() {
        let c = test_config(&[]);
        assert_eq!(c.define_speed_priority(&road(tags! {"highway": "residential"})), 1.0);
        assert_eq!(c.define_speed_priority(&road(tags! {"highway": "primary"})), 1.5);
        assert_eq!(
            c.define_speed_priority(&road(tags! {"highway": "primary", "surface": "unpaved"})),
            0.75
        );
    }

    #[test]
    fn is_one_way() {
        let c = test_config(&[]);
        assert_eq!(c.is_one_way(&road(tags! {"highway": "primary"})), 0);
        assert_eq!(c.is_one_way(&road(tags! {"oneway": "yes"})), 1);
        assert_eq!(c.is_one_way(&road(tags! {"oneway": "1"})), 1);
        assert_eq!(c.is_one_way(&road(tags! {"oneway": "-1"})), -1);
        assert_eq!(c.is_one_way(&road(tags! {"oneway": "reverse"})), -1);
        assert_eq!(c.is_one_way(&road(tags! {"oneway": "no"})), 0);
        assert_eq!(c.is_one_way(&road(tags! {"junction": "roundabout"})), 1);
        assert_eq!(c.is_one_way(&road(tags! {"roundabout": "yes"})), 1);
        // first matching tag wins
        assert_eq!(
            c.is_one_way(&road(tags! {"oneway": "-1", "junction": "roundabout"})),
            -1
        );

        let unaware = test_config(&[(RuleKind::Attribute, "onewayAware", "false")]);
        assert_eq!(unaware.is_one_way(&road(tags! {"oneway": "yes"})), 0);
        assert_eq!(unaware.is_one_way(&road(tags! {"junction": "roundabout"})), 0);
    }

    #[test]
    fn routing_obstacles() {
        let c = test_config(&[]);
        let signals = road_with_point_tags(tags! {"highway": "primary"}, tags! {"highway": "traffic_signals"});
        assert_eq!(c.define_routing_obstacle(&signals, 1), 25.0);
        assert_eq!(c.define_routing_obstacle(&signals, 0), 0.0);
        assert_eq!(c.define_routing_obstacle(&signals, 2), 0.0);

        let gate = road_with_point_tags(tags! {"highway": "primary"}, tags! {"barrier": "gate"});
        assert_eq!(c.define_routing_obstacle(&gate, 1), 60.0);

        let stile = road_with_point_tags(tags! {"highway": "primary"}, tags! {"barrier": "stile"});
        assert_eq!(c.define_routing_obstacle(&stile, 1), 30.0);

        let crossing = road_with_point_tags(tags! {"highway": "primary"}, tags! {"crossing": "zebra"});
        assert_eq!(c.define_routing_obstacle(&crossing, 1), 0.0);

        let block = road_with_point_tags(tags! {"highway": "primary"}, tags! {"barrier": "block"});
        assert_eq!(c.define_obstacle(&block, 1), -1.0);
        assert_eq!(c.define_obstacle(&gate, 1), 0.0);
    }

    fn road_between(id: i64, points: &[(u32, u32)], tags: &[(&str, &str)]) -> RouteDataObject {
        let mut r = road(tags);
        r.id = id;
        r.points = points.to_vec();
        r
    }

    #[test]
    fn turn_time() {
        let c = test_config(&[
            (RuleKind::Attribute, "leftTurn", "10"),
            (RuleKind::Attribute, "rightTurn", "4"),
            (RuleKind::Attribute, "roundaboutTurn", "7"),
        ]);

        // Travelling east along `from` (y grows southwards)
        let from = road_between(1, &[(0, 1000), (1000, 1000)], tags! {"highway": "primary"});
        let north = road_between(2, &[(1000, 1000), (1000, 0)], tags! {"highway": "primary"});
        let south = road_between(3, &[(1000, 1000), (1000, 2000)], tags! {"highway": "primary"});
        let east = road_between(4, &[(1000, 1000), (2000, 1010)], tags! {"highway": "primary"});
        let circle = road_between(5, &[(1000, 1000), (2000, 0)], tags! {"junction": "roundabout"});

        assert_eq!(c.calculate_turn_time(&from, 1, 1, &from, 1, 1, false), 0.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &north, 0, 1, false), 10.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &south, 0, 1, false), 4.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &east, 0, 1, false), 0.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &north, 0, 1, true), 4.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &south, 0, 1, true), 10.0);
        assert_eq!(c.calculate_turn_time(&from, 1, 1, &circle, 0, 1, false), 7.0);

        // Travelling south along `north` reversed, then turning east is a left turn
        assert_eq!(c.calculate_turn_time(&north, 0, -1, &east, 0, 1, false), 10.0);
    }
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Category of a single entry of a routing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `tag$value` (or, for highways, a bare value) → speed in km/h.
    HighwaySpeed,

    /// `tag$value` → multiplicative speed priority.
    HighwayPriority,

    /// `tag$value` → any value; matching roads are excluded from routing.
    Avoid,

    /// `tag$value` or `tag$` → a negative value marks an impassable point.
    Obstacle,

    /// `tag$value` or `tag$` → time penalty in seconds for passing a point;
    /// a negative value marks an impassable point.
    RoutingObstacle,

    /// Named profile parameter, like `maxDefaultSpeed`.
    Attribute,
}

/// One `(kind, key, value)` triple of a routing profile description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRule {
    pub kind: RuleKind,
    pub key: String,
    pub value: String,
}

impl ProfileRule {
    pub fn new(kind: RuleKind, key: &str, value: &str) -> Self {
        Self {
            kind,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Converts a static table of triples into owned rules.
    pub fn from_triples(triples: &[(RuleKind, &str, &str)]) -> Vec<Self> {
        triples
            .iter()
            .map(|&(kind, key, value)| Self::new(kind, key, value))
            .collect()
    }
}

use RuleKind::*;

/// Example routing profile for cars.
pub const CAR_PROFILE: &[(RuleKind, &str, &str)] = &[
    (Attribute, "name", "car"),
    (Attribute, "baseProfile", "car"),
    (Attribute, "minDefaultSpeed", "45"),
    (Attribute, "maxDefaultSpeed", "130"),
    (Attribute, "leftTurn", "10"),
    (Attribute, "rightTurn", "4"),
    (Attribute, "roundaboutTurn", "8"),
    (HighwaySpeed, "highway$motorway", "110"),
    (HighwaySpeed, "highway$motorway_link", "80"),
    (HighwaySpeed, "highway$trunk", "100"),
    (HighwaySpeed, "highway$trunk_link", "75"),
    (HighwaySpeed, "highway$primary", "65"),
    (HighwaySpeed, "highway$primary_link", "50"),
    (HighwaySpeed, "highway$secondary", "60"),
    (HighwaySpeed, "highway$secondary_link", "50"),
    (HighwaySpeed, "highway$tertiary", "45"),
    (HighwaySpeed, "highway$tertiary_link", "40"),
    (HighwaySpeed, "highway$unclassified", "35"),
    (HighwaySpeed, "highway$road", "35"),
    (HighwaySpeed, "highway$residential", "35"),
    (HighwaySpeed, "highway$living_street", "25"),
    (HighwaySpeed, "highway$service", "30"),
    (HighwaySpeed, "highway$track", "15"),
    (HighwaySpeed, "route$ferry", "15"),
    (HighwayPriority, "highway$motorway", "1.2"),
    (HighwayPriority, "highway$motorway_link", "1.2"),
    (HighwayPriority, "highway$trunk", "1.2"),
    (HighwayPriority, "highway$primary", "1.1"),
    (HighwayPriority, "highway$secondary", "1.05"),
    (HighwayPriority, "highway$residential", "0.7"),
    (HighwayPriority, "highway$service", "0.5"),
    (HighwayPriority, "highway$track", "0.3"),
    (Avoid, "access$no", "1"),
    (Avoid, "access$private", "1"),
    (Avoid, "motor_vehicle$no", "1"),
    (Avoid, "motorcar$no", "1"),
    (Avoid, "highway$construction", "1"),
    (Obstacle, "barrier$block", "-1"),
    (Obstacle, "barrier$bollard", "-1"),
    (RoutingObstacle, "highway$traffic_signals", "25"),
    (RoutingObstacle, "railway$level_crossing", "25"),
    (RoutingObstacle, "highway$stop", "10"),
    (RoutingObstacle, "barrier$", "30"),
];

/// Example routing profile for bicycles.
pub const BICYCLE_PROFILE: &[(RuleKind, &str, &str)] = &[
    (Attribute, "name", "bicycle"),
    (Attribute, "baseProfile", "bicycle"),
    (Attribute, "minDefaultSpeed", "10"),
    (Attribute, "maxDefaultSpeed", "20"),
    (Attribute, "followSpeedLimitations", "false"),
    (HighwaySpeed, "highway$primary", "16"),
    (HighwaySpeed, "highway$secondary", "16"),
    (HighwaySpeed, "highway$tertiary", "16"),
    (HighwaySpeed, "highway$unclassified", "16"),
    (HighwaySpeed, "highway$residential", "16"),
    (HighwaySpeed, "highway$living_street", "14"),
    (HighwaySpeed, "highway$service", "14"),
    (HighwaySpeed, "highway$cycleway", "18"),
    (HighwaySpeed, "highway$track", "12"),
    (HighwaySpeed, "highway$path", "12"),
    (HighwaySpeed, "highway$footway", "8"),
    (HighwaySpeed, "highway$pedestrian", "8"),
    (HighwayPriority, "highway$cycleway", "1.3"),
    (HighwayPriority, "highway$primary", "0.8"),
    (Avoid, "access$no", "1"),
    (Avoid, "bicycle$no", "1"),
    (RoutingObstacle, "highway$traffic_signals", "20"),
    (RoutingObstacle, "barrier$", "10"),
];

/// Example routing profile for pedestrians.
pub const PEDESTRIAN_PROFILE: &[(RuleKind, &str, &str)] = &[
    (Attribute, "name", "pedestrian"),
    (Attribute, "baseProfile", "pedestrian"),
    (Attribute, "minDefaultSpeed", "4"),
    (Attribute, "maxDefaultSpeed", "5"),
    (Attribute, "onewayAware", "false"),
    (Attribute, "followSpeedLimitations", "false"),
    (HighwaySpeed, "highway$primary", "5"),
    (HighwaySpeed, "highway$secondary", "5"),
    (HighwaySpeed, "highway$tertiary", "5"),
    (HighwaySpeed, "highway$unclassified", "5"),
    (HighwaySpeed, "highway$residential", "5"),
    (HighwaySpeed, "highway$living_street", "5"),
    (HighwaySpeed, "highway$service", "5"),
    (HighwaySpeed, "highway$track", "5"),
    (HighwaySpeed, "highway$path", "5"),
    (HighwaySpeed, "highway$footway", "5"),
    (HighwaySpeed, "highway$pedestrian", "5"),
    (HighwaySpeed, "highway$steps", "3"),
    (HighwayPriority, "highway$footway", "1.2"),
    (HighwayPriority, "highway$pedestrian", "1.2"),
    (Avoid, "access$no", "1"),
    (Avoid, "foot$no", "1"),
    (RoutingObstacle, "highway$traffic_signals", "30"),
];

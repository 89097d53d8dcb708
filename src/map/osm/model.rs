// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Tags of an element, sorted by key and value.
pub type Tags = Vec<(String, String)>;

/// An [OSM node](https://wiki.openstreetmap.org/wiki/Node), already projected
/// onto the 31-bit tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: i64,
    pub x31: u32,
    pub y31: u32,
    pub tags: Tags,
}

/// An [OSM way](https://wiki.openstreetmap.org/wiki/Way), a candidate road.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub refs: Vec<i64>,
    pub tags: Tags,
}

/// A [restriction relation](https://wiki.openstreetmap.org/wiki/Relation:restriction),
/// reduced to its `from` and `to` ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRestriction {
    pub id: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,

    /// Value of the `restriction` tag, e.g. `no_left_turn`.
    pub kind: String,
}

/// Element of an OSM file relevant for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Way(Way),
    TurnRestriction(TurnRestriction),
}

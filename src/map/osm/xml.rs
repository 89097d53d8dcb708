// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model::{Element, Node, Tags, TurnRestriction, Way};
use crate::distance::{x31_from_lon, y31_from_lat};

/// Source of XML events.
///
/// Hides the difference between [quick_xml::Reader::read_event] on in-memory data
/// and [quick_xml::Reader::read_event_into] on buffered IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

pub(super) struct IoParser<R: io::BufRead> {
    reader: quick_xml::Reader<R>,
    buf: Vec<u8>,
}

impl<R: io::BufRead> Parser for IoParser<R> {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.buf.clear();
        self.reader.read_event_into(&mut self.buf)
    }
}

pub(super) struct BufParser<'d>(quick_xml::Reader<&'d [u8]>);

impl<'d> Parser for BufParser<'d> {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.0.read_event()
    }
}

/// Element whose closing tag was not reached yet.
enum Pending {
    Node(Node),
    Way(Way),
    Relation(PendingRelation),
}

#[derive(Default)]
struct PendingRelation {
    id: i64,
    is_restriction: bool,
    kind: Option<String>,
    from: Option<i64>,
    to: Option<i64>,
}

impl Pending {
    fn add_tag(&mut self, k: String, v: String) {
        match self {
            Pending::Node(n) => n.tags.push((k, v)),
            Pending::Way(w) => w.tags.push((k, v)),
            Pending::Relation(r) => match k.as_str() {
                "type" => r.is_restriction = v == "restriction",
                "restriction" => r.kind = Some(v),
                _ => {}
            },
        }
    }

    fn finish(self) -> Option<Element> {
        match self {
            Pending::Node(mut n) => {
                n.tags.sort();
                Some(Element::Node(n))
            }

            Pending::Way(mut w) => {
                w.tags.sort();
                Some(Element::Way(w))
            }

            Pending::Relation(r) if r.is_restriction => match r.kind {
                Some(kind) => Some(Element::TurnRestriction(TurnRestriction {
                    id: r.id,
                    from: r.from,
                    to: r.to,
                    kind,
                })),
                None => {
                    log::debug!("relation {}: restriction without kind", r.id);
                    None
                }
            },

            Pending::Relation(_) => None,
        }
    }
}

/// Streams routing-relevant [Element]s from an OSM XML document.
///
/// Relations other than turn restrictions are skipped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    pending: Option<Pending>,
    eof: bool,
}

impl<'d> Reader<BufParser<'d>> {
    pub(super) fn from_buffer(data: &'d [u8]) -> Self {
        Self::new(BufParser(quick_xml::Reader::from_reader(data)))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser {
            reader: quick_xml::Reader::from_reader(reader),
            buf: Vec::default(),
        })
    }
}

impl<P: Parser> Reader<P> {
    fn new(parser: P) -> Self {
        Self {
            parser,
            pending: None,
            eof: false,
        }
    }

    /// Opens a new element, returning it immediately if it has no children.
    fn open(&mut self, start: &BytesStart<'_>, is_empty: bool) -> Option<Element> {
        let pending = match start.local_name().as_ref() {
            b"node" => parse_node(start).map(Pending::Node),
            b"way" => parse_id(start).map(|id| {
                Pending::Way(Way {
                    id,
                    refs: Vec::default(),
                    tags: Tags::default(),
                })
            }),
            b"relation" => parse_id(start).map(|id| {
                Pending::Relation(PendingRelation {
                    id,
                    ..Default::default()
                })
            }),

            b"tag" => {
                if let (Some(p), [Some(k), v]) = (&mut self.pending, attributes(start, ["k", "v"])) {
                    p.add_tag(k, v.unwrap_or_default());
                }
                return None;
            }

            b"nd" => {
                if let (Some(Pending::Way(w)), Some(r)) = (&mut self.pending, parse_ref(start)) {
                    w.refs.push(r);
                }
                return None;
            }

            b"member" => {
                if let Some(Pending::Relation(r)) = &mut self.pending {
                    add_member(r, start);
                }
                return None;
            }

            _ => return None,
        };

        if is_empty {
            pending.and_then(Pending::finish)
        } else {
            self.pending = pending;
            None
        }
    }

    fn close(&mut self, name: &[u8]) -> Option<Element> {
        match name {
            b"node" | b"way" | b"relation" => self.pending.take().and_then(Pending::finish),
            _ => None,
        }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Element, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.eof {
            let element = match self.parser.read_event() {
                Err(e) => return Some(Err(e)),
                Ok(Event::Eof) => {
                    self.eof = true;
                    None
                }
                Ok(Event::Empty(start)) => {
                    let start = start.into_owned();
                    self.open(&start, true)
                }
                Ok(Event::Start(start)) => {
                    let start = start.into_owned();
                    self.open(&start, false)
                }
                Ok(Event::End(end)) => {
                    let name = end.local_name().as_ref().to_vec();
                    self.close(&name)
                }
                Ok(_) => None,
            };

            if element.is_some() {
                return element.map(Ok);
            }
        }

        self.pending.take().and_then(Pending::finish).map(Ok)
    }
}

/// Returns the values of the requested attributes, in the order of `keys`.
fn attributes<const N: usize>(start: &BytesStart<'_>, keys: [&str; N]) -> [Option<String>; N] {
    let mut values: [Option<String>; N] = std::array::from_fn(|_| None);
    for attr in start.attributes().flatten() {
        if let Some(i) = keys.iter().position(|k| k.as_bytes() == attr.key.as_ref()) {
            values[i] = from_utf8(&attr.value).ok().map(str::to_string);
        }
    }
    values
}

fn parse_id(start: &BytesStart<'_>) -> Option<i64> {
    let [id] = attributes(start, ["id"]);
    id?.parse().ok().filter(|&id| id != 0)
}

fn parse_ref(start: &BytesStart<'_>) -> Option<i64> {
    let [r] = attributes(start, ["ref"]);
    r?.parse().ok().filter(|&r| r != 0)
}

fn parse_node(start: &BytesStart<'_>) -> Option<Node> {
    let [id, lat, lon] = attributes(start, ["id", "lat", "lon"]);
    let id: i64 = id.and_then(|s| s.parse().ok()).filter(|&id| id != 0)?;
    let position = lat
        .and_then(|s| s.parse::<f64>().ok())
        .zip(lon.and_then(|s| s.parse::<f64>().ok()))
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite());

    match position {
        Some((lat, lon)) => Some(Node {
            id,
            x31: x31_from_lon(lon),
            y31: y31_from_lat(lat),
            tags: Tags::default(),
        }),
        None => {
            log::debug!("node {}: no position - skipping", id);
            None
        }
    }
}

fn add_member(r: &mut PendingRelation, start: &BytesStart<'_>) {
    let [type_, role] = attributes(start, ["type", "role"]);
    if type_.as_deref() != Some("way") {
        return;
    }

    let Some(way) = parse_ref(start) else {
        return;
    };
    match role.as_deref() {
        Some("from") => r.from = Some(way),
        Some("to") => r.to = Some(way),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tags {
        {} => { Tags::default() };
        {$( $k:literal : $v:literal ),+} => {
            vec![ $( ($k.to_string(), $v.to_string()) ),+ ]
        };
    }

    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.osm");

    fn collect_all<I: Iterator<Item = Result<Element, quick_xml::Error>>>(
        elements: I,
    ) -> Result<(Vec<Node>, Vec<Way>, Vec<TurnRestriction>), quick_xml::Error> {
        let mut nodes = Vec::default();
        let mut ways = Vec::default();
        let mut restrictions = Vec::default();

        for e in elements {
            match e? {
                Element::Node(n) => nodes.push(n),
                Element::Way(w) => ways.push(w),
                Element::TurnRestriction(r) => restrictions.push(r),
            }
        }

        Ok((nodes, ways, restrictions))
    }

    fn check_simple<I: Iterator<Item = Result<Element, quick_xml::Error>>>(
        elements: I,
    ) -> Result<(), quick_xml::Error> {
        let (nodes, ways, restrictions) = collect_all(elements)?;

        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[0].id, -1);
        assert_eq!((nodes[0].x31, nodes[0].y31), (1 << 30, 1 << 30));
        assert_eq!(nodes[1].x31, x31_from_lon(0.01));
        assert!(nodes[3].y31 < nodes[2].y31);
        assert_eq!(nodes[3].tags, tags! {"highway": "traffic_signals"});
        assert_eq!(nodes[5].tags, tags! {});

        assert_eq!(ways.len(), 6);
        assert_eq!(
            ways[0],
            Way {
                id: -100,
                refs: vec![-1, -2, -3],
                tags: tags! {"highway": "primary", "name": "Main Street"},
            }
        );
        assert_eq!(ways[2].tags, tags! {"highway": "residential", "oneway": "yes"});
        assert_eq!(ways[4].refs, [-1, -4, -99]);

        assert_eq!(
            restrictions,
            [TurnRestriction {
                id: -200,
                from: Some(-100),
                to: Some(-101),
                kind: "no_left_turn".to_string(),
            }]
        );

        Ok(())
    }

    #[test]
    fn parse_from_buf() -> Result<(), quick_xml::Error> {
        check_simple(Reader::from_buffer(SIMPLE_XML))
    }

    #[test]
    fn parse_from_io() -> Result<(), quick_xml::Error> {
        check_simple(Reader::from_io(io::Cursor::new(SIMPLE_XML)))
    }

    #[test]
    fn restriction_without_kind_is_skipped() -> Result<(), quick_xml::Error> {
        let data = br#"<osm>
            <relation id="1">
                <member type="way" ref="10" role="from"/>
                <member type="way" ref="11" role="to"/>
                <tag k="type" v="restriction"/>
            </relation>
            <relation id="2">
                <member type="way" ref="10" role="from"/>
                <member type="node" ref="5" role="to"/>
                <tag k="restriction" v="only_straight_on"/>
                <tag k="type" v="restriction"/>
            </relation>
        </osm>"#;

        let (_, _, restrictions) = collect_all(Reader::from_buffer(data))?;
        assert_eq!(
            restrictions,
            [TurnRestriction {
                id: 2,
                from: Some(10),
                to: None,
                kind: "only_straight_on".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn node_without_position_is_skipped() -> Result<(), quick_xml::Error> {
        let data = br#"<osm><node id="1" lat="1.0"/><node id="2" lat="0" lon="0"/></osm>"#;
        let (nodes, _, _) = collect_all(Reader::from_buffer(data))?;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 2);
        Ok(())
    }
}

// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reading of routing profiles from XML documents of the following shape:
//!
//! ```xml
//! <routing_config>
//!   <routingProfile name="car" baseProfile="car" maxDefaultSpeed="130">
//!     <attribute name="heuristicCoefficient" value="1.2"/>
//!     <road tag="highway" value="motorway" speed="110" priority="1.2"/>
//!     <avoid tag="access" value="no"/>
//!     <obstacle tag="barrier" value="block" penalty="-1"/>
//!     <routingObstacle tag="barrier" penalty="30"/>
//!   </routingProfile>
//! </routing_config>
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};

use super::{ProfileRule, RuleKind};

/// Error which can occur when reading a routing profile document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("routing profile not found: {0}")]
    ProfileNotFound(String),
}

/// Returns the names of all routing profiles defined in the document, in order.
pub fn profile_names(data: &[u8]) -> Result<Vec<String>, Error> {
    let mut reader = quick_xml::Reader::from_reader(data);
    let mut names = Vec::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"routingProfile" => {
                if let Some(name) = attributes(&e)?.remove("name") {
                    names.push(name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(names)
}

/// Reads all rules of the routing profile with the given name.
///
/// Attributes of the `routingProfile` element and `attribute` children become
/// [RuleKind::Attribute] rules; `road`, `avoid`, `obstacle` and `routingObstacle`
/// children become rules keyed by `tag$value`. A `road` without a `value` is keyed
/// by its bare tag.
pub fn read_profile(data: &[u8], name: &str) -> Result<Vec<ProfileRule>, Error> {
    let mut reader = quick_xml::Reader::from_reader(data);
    let mut rules = Vec::default();
    let mut found = false;
    let mut inside = false;

    loop {
        let (e, is_empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) if inside && e.local_name().as_ref() == b"routingProfile" => break,
            Event::Eof => break,
            _ => continue,
        };

        if e.local_name().as_ref() == b"routingProfile" {
            let attrs = attributes(&e)?;
            if attrs.get("name").map(|n| n.as_str()) != Some(name) {
                continue;
            }

            found = true;
            inside = !is_empty;

            let mut keys: Vec<&String> = attrs.keys().collect();
            keys.sort();
            rules.extend(
                keys.into_iter()
                    .map(|k| ProfileRule::new(RuleKind::Attribute, k, &attrs[k])),
            );

            if is_empty {
                break;
            }
        } else if inside {
            add_child_rules(&mut rules, &e)?;
        }
    }

    if found {
        Ok(rules)
    } else {
        Err(Error::ProfileNotFound(name.to_string()))
    }
}

/// Reads a routing profile from a file.
pub fn read_profile_from_file<P: AsRef<Path>>(path: P, name: &str) -> Result<Vec<ProfileRule>, Error> {
    let data = fs::read(path)?;
    read_profile(&data, name)
}

fn add_child_rules(rules: &mut Vec<ProfileRule>, e: &BytesStart<'_>) -> Result<(), Error> {
    let attrs = attributes(e)?;
    let get = |k: &str| attrs.get(k).map(|v| v.as_str());

    match e.local_name().as_ref() {
        b"attribute" => {
            if let (Some(name), Some(value)) = (get("name"), get("value")) {
                rules.push(ProfileRule::new(RuleKind::Attribute, name, value));
            }
        }

        b"road" => {
            if let Some(tag) = get("tag") {
                let key = match get("value") {
                    Some(value) => format!("{}${}", tag, value),
                    None => tag.to_string(),
                };
                if let Some(speed) = get("speed") {
                    rules.push(ProfileRule::new(RuleKind::HighwaySpeed, &key, speed));
                }
                if let Some(priority) = get("priority") {
                    rules.push(ProfileRule::new(RuleKind::HighwayPriority, &key, priority));
                }
            }
        }

        b"avoid" => {
            if let (Some(tag), Some(value)) = (get("tag"), get("value")) {
                let key = format!("{}${}", tag, value);
                rules.push(ProfileRule::new(RuleKind::Avoid, &key, "1"));
            }
        }

        b"obstacle" | b"routingObstacle" => {
            let kind = if e.local_name().as_ref() == b"obstacle" {
                RuleKind::Obstacle
            } else {
                RuleKind::RoutingObstacle
            };
            if let Some(tag) = get("tag") {
                let key = format!("{}${}", tag, get("value").unwrap_or(""));
                rules.push(ProfileRule::new(kind, &key, get("penalty").unwrap_or("0")));
            }
        }

        other => log::debug!(
            "ignoring unknown profile element {:?}",
            String::from_utf8_lossy(other)
        ),
    }

    Ok(())
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, Error> {
    let mut map = HashMap::default();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::super::RoutingConfiguration;
    use super::*;

    const PROFILES: &[u8] = include_bytes!("test_fixtures/routing.xml");

    #[test]
    fn names() {
        assert_eq!(profile_names(PROFILES).unwrap(), ["car", "bicycle", "empty"]);
    }

    #[test]
    fn read_car() {
        let rules = read_profile(PROFILES, "car").unwrap();

        assert!(rules.contains(&ProfileRule::new(RuleKind::Attribute, "name", "car")));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::Attribute,
            "heuristicCoefficient",
            "1.5"
        )));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::HighwaySpeed,
            "highway$primary",
            "90"
        )));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::HighwayPriority,
            "highway$primary",
            "1.1"
        )));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::HighwaySpeed,
            "living_street",
            "20"
        )));
        assert!(rules.contains(&ProfileRule::new(RuleKind::Avoid, "access$no", "1")));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::RoutingObstacle,
            "barrier$",
            "30"
        )));
        assert!(rules.contains(&ProfileRule::new(
            RuleKind::Obstacle,
            "barrier$block",
            "-1"
        )));

        // Rules of other profiles are not included
        assert!(!rules.contains(&ProfileRule::new(
            RuleKind::HighwaySpeed,
            "highway$cycleway",
            "18"
        )));

        let c = RoutingConfiguration::new(&rules, -360.0, 32);
        assert_eq!(c.router_name, "car");
        assert_eq!(c.heur_coefficient, 1.5);
        assert!((c.max_default_speed - 120.0 / 3.6).abs() < 1e-4);
        assert_eq!(c.zoom_to_load, 15);
        assert_eq!(c.memory_limitation, 32);
    }

    #[test]
    fn read_self_closing() {
        let rules = read_profile(PROFILES, "empty").unwrap();
        assert_eq!(
            rules,
            [
                ProfileRule::new(RuleKind::Attribute, "baseProfile", "pedestrian"),
                ProfileRule::new(RuleKind::Attribute, "name", "empty"),
            ]
        );
    }

    #[test]
    fn missing_profile() {
        assert!(matches!(
            read_profile(PROFILES, "boat"),
            Err(Error::ProfileNotFound(name)) if name == "boat"
        ));
    }
}

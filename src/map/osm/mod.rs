// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of [OpenStreetMap](https://www.openstreetmap.org/) XML extracts into a [MemoryMapBuilder].

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use builder::RoadCollector;

use crate::map::MemoryMapBuilder;

mod builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,

    /// [OSM PBF](https://wiki.openstreetmap.org/wiki/PBF_Format), which is not supported
    Pbf,
}

impl FileFormat {
    /// Guesses the file format from the first bytes of the file.
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if prefix.starts_with(b"BZh") {
            Self::XmlBz2
        } else if prefix.len() >= 8 && &prefix[4..8] == b"\x0a\x09OSM" {
            Self::Pbf
        } else {
            Self::Xml
        }
    }
}

/// Error which can occur when loading an OSM file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(FileFormat),
}

/// Parse OSM features from a reader and add all roads (ways with a `highway` tag)
/// to the provided [MemoryMapBuilder].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn add_roads_from_io<R: io::Read>(
    map: &mut MemoryMapBuilder,
    format: FileFormat,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);

    let format = if format == FileFormat::Unknown {
        FileFormat::detect(b.fill_buf()?)
    } else {
        format
    };

    match format {
        FileFormat::Xml => {
            let r = xml::Reader::from_io(b);
            RoadCollector::new(map).add_elements(r)?;
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            RoadCollector::new(map).add_elements(r)?;
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            RoadCollector::new(map).add_elements(r)?;
        }

        FileFormat::Pbf | FileFormat::Unknown => return Err(Error::UnsupportedFormat(format)),
    }

    log::info!("loaded {} roads", map.len());
    Ok(())
}

/// Parse OSM features from a file at the provided path into a [MemoryMapBuilder].
pub fn add_roads_from_file<P: AsRef<Path>>(
    map: &mut MemoryMapBuilder,
    format: FileFormat,
    path: P,
) -> Result<(), Error> {
    let f = File::open(path)?;
    add_roads_from_io(map, format, f)
}

/// Parse OSM features from a static buffer into a [MemoryMapBuilder].
pub fn add_roads_from_buffer(
    map: &mut MemoryMapBuilder,
    format: FileFormat,
    data: &[u8],
) -> Result<(), Error> {
    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        RoadCollector::new(map).add_elements(xml::Reader::from_buffer(data))?;
        Ok(())
    } else {
        add_roads_from_io(map, format, io::Cursor::new(data))
    }
}

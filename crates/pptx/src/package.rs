//! OPC package I/O: parts, relationships and content types.
//!
//! A `.pptx` is a ZIP archive of XML parts tied together by `.rels`
//! relationship parts and a `[Content_Types].xml` manifest.

use crate::xml::{attr, escape, local_name, trailing_number};
use quick_xml::events::Event;
use quick_xml::Reader;
use slidegen_core::{Error, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Largest part we are willing to inflate.
pub const MAX_PART_BYTES: u64 = 256 * 1024 * 1024;
/// Upper bound on the inflated size of a whole package.
pub const MAX_PACKAGE_BYTES: u64 = 512 * 1024 * 1024;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

pub const CT_PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const CT_SLIDESHOW_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
pub const CT_MACRO_PRESENTATION_MAIN: &str =
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
pub const CT_MACRO_TEMPLATE_MAIN: &str =
    "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_NOTES_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";

/// XML declaration used for every part we write.
pub(crate) const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Whether a content type marks a PresentationML main part.
pub fn is_presentation_main(content_type: &str) -> bool {
    [
        CT_PRESENTATION_MAIN,
        CT_TEMPLATE_MAIN,
        CT_SLIDESHOW_MAIN,
        CT_MACRO_PRESENTATION_MAIN,
        CT_MACRO_TEMPLATE_MAIN,
    ]
    .contains(&content_type)
}

/// The relationships part that belongs to `part`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => PACKAGE_RELS_PART.to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target relative to its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative path from `source_part`'s directory to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, file) = target.split_at(target.len().saturating_sub(1));

    let common = source_dir
        .iter()
        .zip(target_dir)
        .take_while(|(a, b)| a == b)
        .count();

    let mut path: Vec<&str> = vec![".."; source_dir.len() - common];
    path.extend_from_slice(&target_dir[common..]);
    path.extend_from_slice(file);
    path.join("/")
}

/// An in-memory OPC package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every part of a ZIP archive into memory.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::read_bounded(reader, MAX_PART_BYTES, MAX_PACKAGE_BYTES)
    }

    fn read_bounded<R: Read + Seek>(reader: R, part_limit: u64, package_limit: u64) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = BTreeMap::new();
        let mut total = 0u64;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();

            let remaining = package_limit - total;
            let mut data = Vec::new();
            file.take(part_limit.min(remaining) + 1)
                .read_to_end(&mut data)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", name, e)))?;
            let size = data.len() as u64;
            if size > part_limit {
                return Err(Error::InvalidTemplate(format!(
                    "part '{}' exceeds {} bytes",
                    name, part_limit
                )));
            }
            if size > remaining {
                return Err(Error::InvalidTemplate(format!(
                    "package exceeds {} bytes uncompressed",
                    package_limit
                )));
            }
            total += size;
            parts.insert(name, data);
        }

        Ok(Self { parts })
    }

    /// Read a package from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// A required XML part as text.
    pub fn xml_part(&self, name: &str) -> Result<&str> {
        let bytes = self
            .part(name)
            .ok_or_else(|| Error::InvalidTemplate(format!("missing part '{}'", name)))?;
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        std::str::from_utf8(bytes)
            .map_err(|e| Error::Xml(format!("part '{}' is not UTF-8: {}", name, e)))
    }

    pub fn set_part(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), data.into());
    }

    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Parsed relationships of `part`; empty when it has none.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let path = rels_path(part);
        if !self.contains(&path) {
            return Ok(Relationships::default());
        }
        Relationships::parse(self.xml_part(&path)?)
    }

    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) {
        self.set_part(rels_path(part), rels.to_xml());
    }

    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(self.xml_part(CONTENT_TYPES_PART)?)
    }

    pub fn set_content_types(&mut self, types: &ContentTypes) {
        self.set_part(CONTENT_TYPES_PART, types.to_xml());
    }

    /// Write the package as a ZIP archive, manifest first.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = [CONTENT_TYPES_PART, PACKAGE_RELS_PART]
            .into_iter()
            .filter_map(|name| self.parts.get_key_value(name))
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| *name != CONTENT_TYPES_PART && *name != PACKAGE_RELS_PART),
            );

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
        }
        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(())
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Last path segment of the type URI, e.g. `slideLayout`.
    pub fn type_name(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or_default()
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.type_name() == name
    }
}

/// The relationships of one part, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let id = attr(e, b"Id").unwrap_or_default();
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    let target = attr(e, b"Target").unwrap_or_default();
                    let external = attr(e, b"TargetMode").is_some_and(|m| m == "External");
                    items.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
                }
                _ => {}
            }
        }

        Ok(Self { items })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        xml.push_str(&format!("<Relationships xmlns=\"{}\">", RELATIONSHIPS_NS));
        for rel in &self.items {
            xml.push_str(&format!(
                "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"{}/>",
                escape(&rel.id),
                escape(&rel.rel_type),
                escape(&rel.target),
                if rel.external {
                    " TargetMode=\"External\""
                } else {
                    ""
                }
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Internal relationships of the given type name.
    pub fn of_type<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.items
            .iter()
            .filter(move |r| !r.external && r.is_type(name))
    }

    pub fn first_of_type<'a>(&'a self, name: &'a str) -> Option<&'a Relationship> {
        self.of_type(name).next()
    }

    /// Add an internal relationship and return its new id.
    pub fn add(&mut self, type_name: &str, target: impl Into<String>) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: format!("{}{}", REL_TYPE_BASE, type_name),
            target: target.into(),
            external: false,
        });
        id
    }

    /// Keep only relationships matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Relationship) -> bool) {
        self.items.retain(f);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(trailing_number))
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

/// The `[Content_Types].xml` manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// `(extension, content type)`, extension lowercase without dot.
    defaults: Vec<(String, String)>,
    /// `(part name without leading slash, content type)`.
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attr(e, b"Extension"), attr(e, b"ContentType"))
                            {
                                types.defaults.push((ext.to_ascii_lowercase(), ct));
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) =
                                (attr(e, b"PartName"), attr(e, b"ContentType"))
                            {
                                types
                                    .overrides
                                    .push((part.trim_start_matches('/').to_string(), ct));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing content types: {}", e)));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        xml.push_str(&format!("<Types xmlns=\"{}\">", CONTENT_TYPES_NS));
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape(ext),
                escape(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                "<Override PartName=\"/{}\" ContentType=\"{}\"/>",
                escape(part),
                escape(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    /// Content type of a part: its override, else the default for its extension.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part = part.trim_start_matches('/');
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(part))
        {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part = part.trim_start_matches('/');
        match self
            .overrides
            .iter_mut()
            .find(|(p, _)| p.eq_ignore_ascii_case(part))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((part.to_string(), content_type.to_string())),
        }
    }

    pub fn remove_override(&mut self, part: &str) {
        let part = part.trim_start_matches('/');
        self.overrides.retain(|(p, _)| !p.eq_ignore_ascii_case(part));
    }
}

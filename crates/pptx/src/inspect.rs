//! Reading slide text back out of a `.pptx`, in presentation order.
//!
//! Used to verify generated decks and by `slidegen inspect`.

use crate::package::{resolve_target, Package};
use crate::xml::{attr, attr_i64, local_name, rel_attr, trailing_number};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use slidegen_core::{Error, Result};
use std::io::{Read, Seek};

/// Text content of one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlideSummary {
    /// 1-based position in the deck.
    pub number: usize,
    /// Text of the title placeholder, if any.
    pub title: Option<String>,
    /// Other text lines, top-to-bottom then left-to-right.
    pub lines: Vec<String>,
    pub pictures: usize,
    pub has_notes: bool,
}

/// Reads slide text from presentation packages.
#[derive(Debug, Clone, Default)]
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read every slide from a `.pptx` archive.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideSummary>> {
        let package = Package::from_reader(reader)?;
        self.read_package(&package)
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<SlideSummary>> {
        let package = Package::from_bytes(bytes)?;
        self.read_package(&package)
    }

    pub fn read_package(&self, package: &Package) -> Result<Vec<SlideSummary>> {
        let main_part = package
            .relationships("")?
            .first_of_type("officeDocument")
            .map(|rel| resolve_target("", &rel.target))
            .ok_or_else(|| Error::InvalidTemplate("no main document part".to_string()))?;

        let slide_order = self.slide_order(package, &main_part)?;
        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_part) in slide_order.iter().enumerate() {
            let mut slide = self.read_slide(package.xml_part(slide_part)?)?;
            slide.number = idx + 1;
            slide.has_notes = package
                .relationships(slide_part)?
                .first_of_type("notesSlide")
                .is_some();
            slides.push(slide);
        }
        Ok(slides)
    }

    /// Slide parts in `p:sldIdLst` order, falling back to part numbering.
    fn slide_order(&self, package: &Package, main_part: &str) -> Result<Vec<String>> {
        let rels = package.relationships(main_part)?;

        let mut reader = Reader::from_str(package.xml_part(main_part)?);
        reader.trim_text(true);
        let mut ordered = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    if let Some(rel) = rel_attr(e, b"id").and_then(|id| rels.by_id(&id)) {
                        ordered.push(resolve_target(main_part, &rel.target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
                }
                _ => {}
            }
        }

        if ordered.is_empty() {
            let mut slides: Vec<(String, Option<usize>)> = rels
                .of_type("slide")
                .map(|rel| {
                    let path = resolve_target(main_part, &rel.target);
                    let order = trailing_number(&path);
                    (path, order)
                })
                .collect();
            slides.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            ordered = slides.into_iter().map(|(path, _)| path).collect();
        }

        Ok(ordered)
    }

    fn read_slide(&self, xml: &str) -> Result<SlideSummary> {
        let mut summary = SlideSummary::default();
        let mut shapes = extract_shapes(xml)?;
        shapes.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));

        for shape in shapes {
            if shape.is_picture {
                summary.pictures += 1;
                continue;
            }
            if shape.is_title && summary.title.is_none() {
                summary.title = Some(shape.paragraphs.join(" "));
                continue;
            }
            summary.lines.extend(shape.paragraphs);
        }
        Ok(summary)
    }
}

/// A shape with its text and position.
#[derive(Debug, Default)]
struct ShapeInfo {
    paragraphs: Vec<String>,
    x: i64,
    y: i64,
    is_title: bool,
    is_picture: bool,
}

fn extract_shapes(xml: &str) -> Result<Vec<ShapeInfo>> {
    let mut shapes = Vec::new();
    // whitespace inside runs is significant, so text is not trimmed
    let mut reader = Reader::from_str(xml);

    let mut current: Option<ShapeInfo> = None;
    let mut seen_offset = false;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event();
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let is_start = matches!(event, Ok(Event::Start(_)));
                match local_name(e.name().as_ref()) {
                    b"sp" => {
                        current = Some(ShapeInfo::default());
                        seen_offset = false;
                    }
                    b"pic" => {
                        current = Some(ShapeInfo {
                            is_picture: true,
                            ..ShapeInfo::default()
                        });
                        seen_offset = false;
                    }
                    b"ph" => {
                        if let Some(shape) = current.as_mut() {
                            let ph_type = attr(e, b"type");
                            shape.is_title =
                                matches!(ph_type.as_deref(), Some("title") | Some("ctrTitle"));
                        }
                    }
                    b"off" if !seen_offset => {
                        if let Some(shape) = current.as_mut() {
                            shape.x = attr_i64(e, b"x").unwrap_or(0);
                            shape.y = attr_i64(e, b"y").unwrap_or(0);
                            seen_offset = true;
                        }
                    }
                    b"p" if current.is_some() => paragraph = Some(String::new()),
                    b"t" if is_start => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    p.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    if let (Some(text), Some(shape)) = (paragraph.take(), current.as_mut()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            shape.paragraphs.push(text.to_string());
                        }
                    }
                }
                b"sp" | b"pic" => {
                    if let Some(shape) = current.take() {
                        if shape.is_picture || !shape.paragraphs.is_empty() {
                            shapes.push(shape);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

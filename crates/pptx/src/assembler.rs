//! Presentation assembly: template package + outline → new `.pptx` bytes.
//!
//! The output keeps the template's masters, layouts, theme and media, drops
//! every template slide and writes one new slide per outline entry.

use crate::analyzer::Template;
use crate::layout::select_layout;
use crate::package::{
    relative_target, rels_path, resolve_target, ContentTypes, Package, Relationships,
    CT_NOTES_SLIDE, CT_PRESENTATION_MAIN, CT_SLIDE, PACKAGE_RELS_PART,
};
use crate::writer::{notes_slide_xml, PictureShape, RunStyle, ShapeAnchor, SlideWriter, TextShape};
use crate::xml::{attr, local_name};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use slidegen_core::fit::truncate_chars;
use slidegen_core::{
    Error, FontRole, KeywordMatcher, LayoutInfo, Outline, OutlineEntry, Result, SlideKind,
    StyleProfile, TemplateImage, TextFitter,
};
use std::collections::{BTreeSet, HashSet};

/// Longest title we write, including the ellipsis.
pub const MAX_TITLE_CHARS: usize = 60;

/// First `p:sldId@id` value allowed by PresentationML.
const FIRST_SLIDE_ID: u32 = 256;

/// `p:ext@uri` of the PowerPoint 2010 sections extension.
const SECTIONS_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Relationship types whose targets belong to a single slide.
const SLIDE_OWNED_TYPES: &[&str] = &[
    "notesSlide",
    "comments",
    "chart",
    "chartUserShapes",
    "diagramData",
    "diagramLayout",
    "diagramQuickStyle",
    "diagramColors",
    "diagramDrawing",
    "tags",
    "vmlDrawing",
    "oleObject",
    "package",
    "themeOverride",
];

/// What happened while assembling a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Slides written; always the outline length.
    pub slide_count: usize,
    /// Titles or bodies that had to be cut to fit.
    pub truncations: usize,
    /// Template media parts placed on generated slides.
    pub images_placed: Vec<String>,
    /// Notes slides written.
    pub notes_written: usize,
}

/// A generated deck and its report.
#[derive(Debug, Clone)]
pub struct AssembledDeck {
    pub bytes: Vec<u8>,
    pub report: AssemblyReport,
}

/// Builds a new presentation from an analyzed template and an outline.
#[derive(Debug, Clone)]
pub struct PresentationAssembler {
    title_fitter: TextFitter,
    body_fitter: TextFitter,
    matcher: KeywordMatcher,
}

impl Default for PresentationAssembler {
    fn default() -> Self {
        Self {
            title_fitter: TextFitter::title(),
            body_fitter: TextFitter::body(),
            matcher: KeywordMatcher::default(),
        }
    }
}

impl PresentationAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different image relevance matcher.
    pub fn with_matcher(mut self, matcher: KeywordMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Assemble the deck. The template is not modified.
    pub fn assemble(&self, template: &Template, outline: &Outline) -> Result<AssembledDeck> {
        let mut package = template.package.clone();
        let main_part = template.main_part.as_str();
        let profile = &template.profile;

        let removed = strip_template_slides(&mut package, template)?;

        let mut content_types = package.content_types()?;
        for part in &removed {
            content_types.remove_override(part);
        }
        content_types.set_override(main_part, CT_PRESENTATION_MAIN);

        let mut pres_rels = package.relationships(main_part)?;
        pres_rels.retain(|rel| {
            rel.external || !removed.contains(&resolve_target(main_part, &rel.target))
        });
        drop_macros(&mut package, &mut content_types, &mut pres_rels, main_part);

        let mut report = AssemblyReport::default();
        let mut used_images: HashSet<usize> = HashSet::new();
        let image_texts: Vec<String> = profile
            .reusable_images
            .iter()
            .map(TemplateImage::searchable_text)
            .collect();
        let mut slide_ids = Vec::with_capacity(outline.len());

        for (i, entry) in outline.entries().iter().enumerate() {
            let number = i + 1;
            let slide_part = format!("ppt/slides/slide{}.xml", number);
            let layout = select_layout(entry.kind, &profile.layouts).ok_or_else(|| {
                Error::InvalidTemplate("template has no slide layouts".to_string())
            })?;
            log::debug!(
                "Slide {} ({}) uses layout '{}'",
                number,
                entry.kind.as_str(),
                layout.name
            );

            let mut slide_rels = Relationships::default();
            slide_rels.add(
                "slideLayout",
                relative_target(&slide_part, &layout.part_name),
            );

            let mut writer = SlideWriter::new();
            report.truncations += self.write_text(&mut writer, profile, layout, entry)?;

            if entry.kind != SlideKind::Title {
                let query = entry.searchable_text();
                let candidates = image_texts
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !used_images.contains(idx))
                    .map(|(idx, text)| (idx, text.as_str()));
                if let Some((idx, score)) = self.matcher.best_match(&query, candidates) {
                    let image = &profile.reusable_images[idx];
                    if let Some(frame) = image.frame {
                        used_images.insert(idx);
                        let rel_id =
                            slide_rels.add("image", relative_target(&slide_part, &image.part_name));
                        writer.add_picture(&PictureShape {
                            name: format!("Picture {}", writer.shape_count() + 2),
                            description: image.description.clone(),
                            rel_id,
                            frame,
                        })?;
                        log::debug!(
                            "Placed '{}' on slide {} (score {:.2})",
                            image.part_name,
                            number,
                            score
                        );
                        report.images_placed.push(image.part_name.clone());
                    }
                }
            }

            if let Some(notes) = entry.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                match template.notes_master.as_deref() {
                    Some(notes_master) => {
                        let notes_part = format!("ppt/notesSlides/notesSlide{}.xml", number);
                        let mut notes_rels = Relationships::default();
                        notes_rels.add("notesMaster", relative_target(&notes_part, notes_master));
                        notes_rels.add("slide", relative_target(&notes_part, &slide_part));
                        package.set_part(notes_part.as_str(), notes_slide_xml(notes)?);
                        package.set_relationships(&notes_part, &notes_rels);
                        content_types.set_override(&notes_part, CT_NOTES_SLIDE);
                        slide_rels.add("notesSlide", relative_target(&slide_part, &notes_part));
                        report.notes_written += 1;
                    }
                    None => {
                        log::debug!("Template has no notes master; skipping notes for slide {}", number);
                    }
                }
            }

            package.set_part(slide_part.as_str(), writer.finish());
            package.set_relationships(&slide_part, &slide_rels);
            content_types.set_override(&slide_part, CT_SLIDE);

            let rel_id = pres_rels.add("slide", relative_target(main_part, &slide_part));
            slide_ids.push((FIRST_SLIDE_ID + i as u32, rel_id));
        }

        let presentation = rewrite_presentation(package.xml_part(main_part)?, &slide_ids)?;
        package.set_part(main_part, presentation);
        package.set_relationships(main_part, &pres_rels);
        package.set_content_types(&content_types);
        prune_unreferenced_media(&mut package)?;

        report.slide_count = slide_ids.len();
        log::info!(
            "Assembled {} slide(s): {} truncation(s), {} image(s), {} notes",
            report.slide_count,
            report.truncations,
            report.images_placed.len(),
            report.notes_written
        );

        Ok(AssembledDeck {
            bytes: package.to_bytes()?,
            report,
        })
    }

    /// Write title and body shapes; returns the number of truncations.
    fn write_text(
        &self,
        writer: &mut SlideWriter,
        profile: &StyleProfile,
        layout: &LayoutInfo,
        entry: &OutlineEntry,
    ) -> Result<usize> {
        let mut truncations = 0;

        let title = truncate_chars(entry.title.trim(), MAX_TITLE_CHARS);
        let mut title_cut = title.chars().count() < entry.title.trim().chars().count();
        let title_ph = layout.title_placeholder();
        let title_frame = title_ph
            .and_then(|p| p.frame)
            .unwrap_or_else(|| profile.slide_size.title_frame());
        let title_input = vec![title];
        let fitted = self.title_fitter.fit(&title_input, &title_frame);
        title_cut |= fitted.paragraphs != title_input;
        if title_cut {
            truncations += 1;
        }
        writer.add_text(&TextShape {
            name: "Title 1".to_string(),
            anchor: match title_ph {
                Some(p) => ShapeAnchor::Placeholder {
                    kind: p.kind,
                    idx: p.idx,
                },
                None => ShapeAnchor::TextBox(title_frame),
            },
            style: RunStyle {
                font: profile.font(FontRole::Title).to_string(),
                color: profile.title_color(),
                size: fitted.size_hundredths(),
            },
            paragraphs: fitted.paragraphs,
            bulleted: false,
        })?;

        let bullets: Vec<String> = entry
            .bullets
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if bullets.is_empty() {
            return Ok(truncations);
        }

        let body_ph = layout.body_placeholder(entry.kind == SlideKind::Title);
        let body_frame = body_ph
            .and_then(|p| p.frame)
            .unwrap_or_else(|| profile.slide_size.body_frame());
        let fitted = self.body_fitter.fit(&bullets, &body_frame);
        if fitted.paragraphs != bullets {
            truncations += 1;
        }
        writer.add_text(&TextShape {
            name: "Content 2".to_string(),
            anchor: match body_ph {
                Some(p) => ShapeAnchor::Placeholder {
                    kind: p.kind,
                    idx: p.idx,
                },
                None => ShapeAnchor::TextBox(body_frame),
            },
            style: RunStyle {
                font: profile.font(FontRole::Body).to_string(),
                color: profile.body_color(),
                size: fitted.size_hundredths(),
            },
            paragraphs: fitted.paragraphs,
            bulleted: true,
        })?;

        Ok(truncations)
    }
}

/// Remove template slides and the parts they own. Returns removed part names.
fn strip_template_slides(package: &mut Package, template: &Template) -> Result<BTreeSet<String>> {
    let mut pending: Vec<String> = template.slide_parts.clone();
    pending.extend(
        package
            .part_names()
            .filter(|name| {
                (name.starts_with("ppt/slides/") || name.starts_with("ppt/notesSlides/"))
                    && name.ends_with(".xml")
            })
            .map(String::from),
    );

    let mut removed = BTreeSet::new();
    while let Some(part) = pending.pop() {
        if !removed.insert(part.clone()) {
            continue;
        }
        for rel in package.relationships(&part)?.iter() {
            if !rel.external && SLIDE_OWNED_TYPES.iter().any(|t| rel.is_type(t)) {
                pending.push(resolve_target(&part, &rel.target));
            }
        }
        package.remove_part(&part);
        package.remove_part(&rels_path(&part));
    }

    // Other parts (viewProps, custom XML) may still point at removed slides.
    let sources: Vec<String> = package
        .part_names()
        .filter(|name| name.ends_with(".rels"))
        .map(String::from)
        .collect();
    for rels_part in sources {
        let Some(source) = source_of_rels(&rels_part) else {
            continue;
        };
        if !package.contains(&source) {
            continue;
        }
        let mut rels = package.relationships(&source)?;
        let before = rels.len();
        rels.retain(|rel| rel.external || !removed.contains(&resolve_target(&source, &rel.target)));
        if rels.len() != before {
            package.set_relationships(&source, &rels);
            if source.ends_with("viewProps.xml") {
                let cleaned = strip_elements(package.xml_part(&source)?, &[b"sldLst"])?;
                package.set_part(source.as_str(), cleaned);
            }
        }
    }

    log::debug!("Removed {} template part(s)", removed.len());
    Ok(removed)
}

/// `ppt/slides/_rels/slide1.xml.rels` → `ppt/slides/slide1.xml`.
fn source_of_rels(rels_part: &str) -> Option<String> {
    if rels_part == PACKAGE_RELS_PART {
        return Some(String::new());
    }
    let file = rels_part.strip_suffix(".rels")?;
    let (dir, name) = file.rsplit_once("_rels/")?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(format!("{}{}", dir, name))
}

/// Drop a VBA project so the output is a plain presentation.
fn drop_macros(
    package: &mut Package,
    content_types: &mut ContentTypes,
    pres_rels: &mut Relationships,
    main_part: &str,
) {
    let vba: Vec<String> = pres_rels
        .of_type("vbaProject")
        .map(|rel| resolve_target(main_part, &rel.target))
        .collect();
    if vba.is_empty() {
        return;
    }
    pres_rels.retain(|rel| !rel.is_type("vbaProject"));
    for part in vba {
        log::info!("Dropping macro part '{}'", part);
        package.remove_part(&part);
        package.remove_part(&rels_path(&part));
        content_types.remove_override(&part);
    }
}

/// Remove media parts no relationship points at any more.
fn prune_unreferenced_media(package: &mut Package) -> Result<()> {
    let mut referenced = HashSet::new();
    let rels_parts: Vec<String> = package
        .part_names()
        .filter(|name| name.ends_with(".rels"))
        .map(String::from)
        .collect();
    for rels_part in rels_parts {
        let Some(source) = source_of_rels(&rels_part) else {
            continue;
        };
        for rel in package.relationships(&source)?.iter() {
            if !rel.external {
                referenced.insert(resolve_target(&source, &rel.target));
            }
        }
    }

    let orphans: Vec<String> = package
        .part_names()
        .filter(|name| name.starts_with("ppt/media/") && !referenced.contains(*name))
        .map(String::from)
        .collect();
    for part in orphans {
        log::debug!("Pruning unreferenced media '{}'", part);
        package.remove_part(&part);
    }
    Ok(())
}

/// Namespace prefix of an element name, including the colon (`p:`).
fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => String::from_utf8_lossy(&name[..=pos]).into_owned(),
        None => String::new(),
    }
}

fn write_event<'a>(writer: &mut Writer<Vec<u8>>, event: Event<'a>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Error writing XML: {}", e)))
}

/// Rewrite `presentation.xml` so its slide list is exactly `slides`.
///
/// Custom shows and sections, which reference the removed slides, are dropped.
fn rewrite_presentation(xml: &str, slides: &[(u32, String)]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + slides.len() * 48));

    let mut prefix = String::from("p:");
    let mut rel_prefix = String::from("r");
    let mut wrote_list = false;
    // open elements written so far; the root's children sit at depth 1
    let mut depth = 0usize;
    // depth inside an element being dropped
    let mut skip_depth = 0usize;

    let slide_list = |prefix: &str, rel_prefix: &str, writer: &mut Writer<Vec<u8>>| -> Result<()> {
        let list = format!("{}sldIdLst", prefix);
        let item = format!("{}sldId", prefix);
        let rid = format!("{}:id", rel_prefix);
        write_event(writer, Event::Start(BytesStart::new(list.as_str())))?;
        for (id, rel_id) in slides {
            let id = id.to_string();
            let elem = BytesStart::new(item.as_str())
                .with_attributes([("id", id.as_str()), (rid.as_str(), rel_id.as_str())]);
            write_event(writer, Event::Empty(elem))?;
        }
        write_event(writer, Event::End(BytesEnd::new(list.as_str())))
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Xml(format!("Error parsing presentation: {}", e)))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                let top_level = depth == 1;
                if is_start {
                    depth += 1;
                }
                match local_name(e.name().as_ref()) {
                    b"presentation" if depth <= 1 => {
                        prefix = prefix_of(e.name().as_ref());
                        for a in e.attributes().flatten() {
                            if a.value.as_ref() == RELATIONSHIPS_NS.as_bytes() {
                                if let Some(p) = a.key.as_ref().strip_prefix(b"xmlns:") {
                                    rel_prefix = String::from_utf8_lossy(p).into_owned();
                                }
                            }
                        }
                        write_event(&mut writer, event.clone())?;
                    }
                    b"sldIdLst" if top_level => {
                        slide_list(&prefix, &rel_prefix, &mut writer)?;
                        wrote_list = true;
                        if is_start {
                            depth -= 1;
                            skip_depth = 1;
                        }
                    }
                    b"sldSz" | b"notesSz" | b"smartTags" | b"embeddedFontLst"
                    | b"custShowLst" | b"photoAlbum" | b"custDataLst" | b"kinsoku"
                    | b"defaultTextStyle" | b"modifyVerifier" | b"extLst"
                        if top_level && !wrote_list =>
                    {
                        slide_list(&prefix, &rel_prefix, &mut writer)?;
                        wrote_list = true;
                        if local_name(e.name().as_ref()) == b"custShowLst" {
                            if is_start {
                                depth -= 1;
                                skip_depth = 1;
                            }
                        } else {
                            write_event(&mut writer, event.clone())?;
                        }
                    }
                    b"custShowLst" if top_level => {
                        if is_start {
                            depth -= 1;
                            skip_depth = 1;
                        }
                    }
                    b"ext" if attr(e, b"uri").as_deref() == Some(SECTIONS_EXT_URI) => {
                        if is_start {
                            depth -= 1;
                            skip_depth = 1;
                        }
                    }
                    _ => write_event(&mut writer, event.clone())?,
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                write_event(&mut writer, event)?;
            }
            Event::Eof => break,
            other => write_event(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("presentation is not UTF-8: {}", e)))
}

/// Copy `xml` without the elements whose local name is in `names`.
fn strip_elements(xml: &str, names: &[&[u8]]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Xml(format!("Error parsing part: {}", e)))?;
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }
        match event {
            Event::Start(ref e) if names.contains(&local_name(e.name().as_ref())) => {
                skip_depth = 1;
            }
            Event::Empty(ref e) if names.contains(&local_name(e.name().as_ref())) => {}
            Event::Eof => break,
            other => write_event(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("part is not UTF-8: {}", e)))
}

//! Template analyzer: reads an uploaded `.pptx`/`.potx` and extracts the
//! style profile (palette, fonts, layouts, reusable pictures).
//!
//! Analysis only reads; it works on an owned copy of the upload.

use crate::format::TemplateFormat;
use crate::package::{is_presentation_main, resolve_target, Package, PACKAGE_RELS_PART};
use crate::xml::{attr, attr_i64, local_name, rel_attr, trailing_number};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidegen_core::{
    Error, FontRole, Frame, LayoutInfo, PaletteColor, Placeholder, PlaceholderKind, Result, Rgb,
    SlideSize, StyleProfile, TemplateImage,
};
use slidegen_core::style::DEFAULT_FONT;
use std::collections::BTreeMap;
use std::path::Path;

/// An analyzed template: its style profile plus the package it came from.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) format: TemplateFormat,
    pub(crate) profile: StyleProfile,
    pub(crate) package: Package,
    /// Main presentation part, usually `ppt/presentation.xml`.
    pub(crate) main_part: String,
    /// Template slides in presentation order.
    pub(crate) slide_parts: Vec<String>,
    pub(crate) notes_master: Option<String>,
}

impl Template {
    pub fn format(&self) -> TemplateFormat {
        self.format
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Number of slides in the template itself.
    pub fn slide_count(&self) -> usize {
        self.slide_parts.len()
    }

    /// Whether speaker notes can be written for generated slides.
    pub fn has_notes_master(&self) -> bool {
        self.notes_master.is_some()
    }
}

/// Extracts reusable style facts from a presentation template.
#[derive(Debug, Clone, Default)]
pub struct TemplateAnalyzer;

impl TemplateAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Analyze a template file, opened read-only.
    pub fn analyze_file(&self, path: &Path) -> Result<Template> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("template");
        self.analyze(filename, &bytes)
    }

    /// Analyze template bytes uploaded under `filename`.
    pub fn analyze(&self, filename: &str, bytes: &[u8]) -> Result<Template> {
        let format = TemplateFormat::sniff(filename, bytes)?;

        let package = Package::from_bytes(bytes).map_err(|e| match e {
            Error::Zip(msg) => Error::UnsupportedFormat(msg),
            other => other,
        })?;
        let main_part = find_main_part(&package)?;

        let template = self
            .read_structure(format, package, main_part)
            .map_err(into_invalid_template)?;

        log::info!(
            "Analyzed template '{}': {} layout(s), {} slide(s), {} image(s)",
            filename,
            template.profile.layouts.len(),
            template.slide_parts.len(),
            template.profile.reusable_images.len()
        );
        Ok(template)
    }

    fn read_structure(
        &self,
        format: TemplateFormat,
        package: Package,
        main_part: String,
    ) -> Result<Template> {
        let presentation = parse_presentation(package.xml_part(&main_part)?)?;
        let pres_rels = package.relationships(&main_part)?;

        let resolve = |rid: &str| {
            pres_rels
                .by_id(rid)
                .map(|rel| resolve_target(&main_part, &rel.target))
        };

        let mut slide_parts: Vec<String> = presentation
            .slide_rids
            .iter()
            .filter_map(|rid| resolve(rid))
            .collect();
        if slide_parts.is_empty() {
            slide_parts = parts_by_number(
                pres_rels
                    .of_type("slide")
                    .map(|rel| resolve_target(&main_part, &rel.target)),
            );
        }

        let mut master_parts: Vec<String> = presentation
            .master_rids
            .iter()
            .filter_map(|rid| resolve(rid))
            .collect();
        if master_parts.is_empty() {
            master_parts = parts_by_number(
                pres_rels
                    .of_type("slideMaster")
                    .map(|rel| resolve_target(&main_part, &rel.target)),
            );
        }
        if master_parts.is_empty() {
            return Err(Error::InvalidTemplate(
                "template has no slide master".to_string(),
            ));
        }

        let notes_master = presentation
            .notes_master_rids
            .iter()
            .filter_map(|rid| resolve(rid))
            .chain(
                pres_rels
                    .of_type("notesMaster")
                    .map(|rel| resolve_target(&main_part, &rel.target)),
            )
            .find(|part| package.contains(part));

        let mut layouts = Vec::new();
        let mut theme: Option<ThemeInfo> = None;
        let mut master_background = None;

        for master_part in &master_parts {
            let master = PartInfo::parse(package.xml_part(master_part)?)?;
            let master_rels = package.relationships(master_part)?;

            if theme.is_none() {
                if let Some(rel) = master_rels.first_of_type("theme") {
                    let theme_part = resolve_target(master_part, &rel.target);
                    if package.contains(&theme_part) {
                        theme = Some(ThemeInfo::parse(package.xml_part(&theme_part)?)?);
                    }
                }
            }
            if master_background.is_none() {
                master_background = master.background.clone();
            }

            let mut layout_parts: Vec<String> = master
                .layout_rids
                .iter()
                .filter_map(|rid| master_rels.by_id(rid))
                .map(|rel| resolve_target(master_part, &rel.target))
                .collect();
            if layout_parts.is_empty() {
                layout_parts = parts_by_number(
                    master_rels
                        .of_type("slideLayout")
                        .map(|rel| resolve_target(master_part, &rel.target)),
                );
            }

            for layout_part in layout_parts {
                if !package.contains(&layout_part) {
                    log::warn!("Layout '{}' is referenced but missing", layout_part);
                    continue;
                }
                let layout = PartInfo::parse(package.xml_part(&layout_part)?)?;
                let placeholders = layout
                    .placeholders
                    .into_iter()
                    .map(|p| inherit_frame(p, &master.placeholders))
                    .collect();
                let index = layouts.len();
                layouts.push(LayoutInfo {
                    index,
                    name: layout
                        .name
                        .unwrap_or_else(|| format!("Layout {}", index + 1)),
                    layout_type: layout.layout_type,
                    part_name: layout_part,
                    placeholders,
                });
            }
        }

        if layouts.is_empty() {
            return Err(Error::InvalidTemplate(
                "template has no slide layouts".to_string(),
            ));
        }

        let theme = theme.unwrap_or_default();
        let color_palette = if theme.palette.is_empty() {
            StyleProfile::default_palette()
        } else {
            theme.palette.clone()
        };

        let mut slides = Vec::with_capacity(slide_parts.len());
        for slide_part in &slide_parts {
            slides.push(PartInfo::parse(package.xml_part(slide_part)?)?);
        }
        let first_slide = slides.first();

        let background = first_slide
            .and_then(|s| s.background.as_ref())
            .or(master_background.as_ref())
            .and_then(|c| c.resolve(&color_palette))
            .or_else(|| palette_lookup(&color_palette, "lt1"))
            .unwrap_or(Rgb::WHITE);

        let slide_font = first_slide.and_then(|s| s.first_font.clone());
        let mut font_choices = BTreeMap::new();
        font_choices.insert(
            FontRole::Title,
            theme
                .major_font
                .clone()
                .or_else(|| slide_font.clone())
                .unwrap_or_else(|| DEFAULT_FONT.to_string()),
        );
        font_choices.insert(
            FontRole::Body,
            theme
                .minor_font
                .clone()
                .or(slide_font)
                .unwrap_or_else(|| DEFAULT_FONT.to_string()),
        );

        let mut reusable_images = Vec::new();
        for (slide_part, slide) in slide_parts.iter().zip(&slides) {
            let rels = package.relationships(slide_part)?;
            let context = slide.text.join(" ");
            for picture in &slide.pictures {
                let Some(rel) = picture.embed.as_deref().and_then(|id| rels.by_id(id)) else {
                    continue;
                };
                if rel.external {
                    continue;
                }
                let media_part = resolve_target(slide_part, &rel.target);
                if !package.contains(&media_part) {
                    log::warn!("Picture target '{}' is missing", media_part);
                    continue;
                }
                let extension = media_part
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .unwrap_or_default();
                reusable_images.push(TemplateImage {
                    part_name: media_part.clone(),
                    extension,
                    frame: picture.frame,
                    description: picture.description.clone(),
                    context: context.clone(),
                });
            }
        }

        let profile = StyleProfile {
            slide_size: presentation.slide_size,
            color_palette,
            background,
            font_choices,
            layouts,
            reusable_images,
        };

        Ok(Template {
            format,
            profile,
            package,
            main_part,
            slide_parts,
            notes_master,
        })
    }
}

/// Locate the main part and check that it really is a presentation.
fn find_main_part(package: &Package) -> Result<String> {
    let not_presentation =
        |why: &str| Error::UnsupportedFormat(format!("not a presentation document: {}", why));

    if !package.contains(PACKAGE_RELS_PART) {
        return Err(not_presentation("missing package relationships"));
    }
    let rels = package.relationships("").map_err(|_| {
        not_presentation("unreadable package relationships")
    })?;
    let main_part = rels
        .first_of_type("officeDocument")
        .map(|rel| resolve_target("", &rel.target))
        .ok_or_else(|| not_presentation("no main document part"))?;

    let content_types = package
        .content_types()
        .map_err(|_| not_presentation("missing content types"))?;
    match content_types.content_type_of(&main_part) {
        Some(ct) if is_presentation_main(ct) => {}
        Some(ct) => return Err(not_presentation(ct)),
        None => return Err(not_presentation("main part has no content type")),
    }
    if !package.contains(&main_part) {
        return Err(Error::InvalidTemplate(format!(
            "main part '{}' is missing",
            main_part
        )));
    }
    Ok(main_part)
}

/// Structural problems found after the format check are template defects.
fn into_invalid_template(e: Error) -> Error {
    match e {
        Error::Xml(msg) | Error::Zip(msg) => Error::InvalidTemplate(msg),
        other => other,
    }
}

/// Order part names by their trailing number (`slide2` before `slide10`).
fn parts_by_number(parts: impl Iterator<Item = String>) -> Vec<String> {
    let mut parts: Vec<String> = parts.collect();
    parts.sort_by(|a, b| match (trailing_number(a), trailing_number(b)) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    parts.dedup();
    parts
}

/// Fill a layout placeholder's missing frame from the master.
fn inherit_frame(mut placeholder: Placeholder, master: &[Placeholder]) -> Placeholder {
    if placeholder.frame.is_some() {
        return placeholder;
    }
    let own = placeholder.kind;
    let wanted = |kind: PlaceholderKind| match own {
        k if k.is_title() => kind == PlaceholderKind::Title,
        PlaceholderKind::Body
        | PlaceholderKind::Object
        | PlaceholderKind::Subtitle
        | PlaceholderKind::Picture
        | PlaceholderKind::Other => kind == PlaceholderKind::Body,
        k => kind == k,
    };
    placeholder.frame = master
        .iter()
        .find(|m| wanted(m.kind))
        .and_then(|m| m.frame);
    placeholder
}

fn palette_lookup(palette: &[PaletteColor], name: &str) -> Option<Rgb> {
    palette.iter().find(|c| c.name == name).map(|c| c.color)
}

/// A colour as written in DrawingML: literal or a theme reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColorRef {
    Rgb(Rgb),
    Scheme(String),
}

impl ColorRef {
    fn resolve(&self, palette: &[PaletteColor]) -> Option<Rgb> {
        match self {
            ColorRef::Rgb(rgb) => Some(*rgb),
            ColorRef::Scheme(name) => {
                let name = match name.as_str() {
                    "bg1" => "lt1",
                    "tx1" => "dk1",
                    "bg2" => "lt2",
                    "tx2" => "dk2",
                    other => other,
                };
                palette_lookup(palette, name)
            }
        }
    }
}

/// What we need from `ppt/presentation.xml`.
#[derive(Debug, Default)]
struct PresentationInfo {
    slide_size: SlideSize,
    slide_rids: Vec<String>,
    master_rids: Vec<String>,
    notes_master_rids: Vec<String>,
}

fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut info = PresentationInfo::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"sldSz" => {
                        if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                            if cx > 0 && cy > 0 {
                                info.slide_size = SlideSize { cx, cy };
                            }
                        }
                    }
                    b"sldId" => info.slide_rids.extend(rel_attr(e, b"id")),
                    b"sldMasterId" => info.master_rids.extend(rel_attr(e, b"id")),
                    b"notesMasterId" => info.notes_master_rids.extend(rel_attr(e, b"id")),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Theme facts: colour scheme and major/minor fonts.
#[derive(Debug, Clone, Default)]
struct ThemeInfo {
    palette: Vec<PaletteColor>,
    major_font: Option<String>,
    minor_font: Option<String>,
}

impl ThemeInfo {
    fn parse(xml: &str) -> Result<Self> {
        let mut theme = ThemeInfo::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut in_scheme = false;
        let mut scheme_slot: Option<String> = None;
        let mut font_slot: Option<FontRole> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"clrScheme" => in_scheme = true,
                    b"majorFont" => font_slot = Some(FontRole::Title),
                    b"minorFont" => font_slot = Some(FontRole::Body),
                    b"srgbClr" | b"sysClr" => {
                        theme.record_color(scheme_slot.as_deref(), in_scheme, e)
                    }
                    name if in_scheme && scheme_slot.is_none() => {
                        scheme_slot = Some(String::from_utf8_lossy(name).into_owned());
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                    b"srgbClr" | b"sysClr" => {
                        theme.record_color(scheme_slot.as_deref(), in_scheme, e)
                    }
                    b"latin" => {
                        let typeface = attr(e, b"typeface").filter(|t| !t.trim().is_empty());
                        match font_slot {
                            Some(FontRole::Title) if theme.major_font.is_none() => {
                                theme.major_font = typeface;
                            }
                            Some(FontRole::Body) if theme.minor_font.is_none() => {
                                theme.minor_font = typeface;
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"clrScheme" => {
                        in_scheme = false;
                        scheme_slot = None;
                    }
                    b"majorFont" | b"minorFont" => font_slot = None,
                    name if scheme_slot.as_deref().map(str::as_bytes) == Some(name) => {
                        scheme_slot = None;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("Error parsing theme: {}", e))),
                _ => {}
            }
        }

        Ok(theme)
    }

    fn record_color(&mut self, slot: Option<&str>, in_scheme: bool, e: &BytesStart<'_>) {
        if !in_scheme {
            return;
        }
        if let (Some(slot), Some(rgb)) = (slot, literal_color(e)) {
            if !self.palette.iter().any(|c| c.name == slot) {
                self.palette.push(PaletteColor::new(slot, rgb));
            }
        }
    }
}

/// `a:srgbClr@val` or `a:sysClr@lastClr`.
fn literal_color(e: &BytesStart<'_>) -> Option<Rgb> {
    match local_name(e.name().as_ref()) {
        b"srgbClr" => attr(e, b"val").and_then(|v| Rgb::from_hex(&v)),
        b"sysClr" => attr(e, b"lastClr").and_then(|v| Rgb::from_hex(&v)),
        _ => None,
    }
}

/// A picture shape found on a slide.
#[derive(Debug, Clone, Default)]
struct PictureRef {
    embed: Option<String>,
    frame: Option<Frame>,
    description: String,
}

/// Shape being read.
#[derive(Debug, Default)]
struct ShapeState {
    is_picture: bool,
    placeholder: Option<(PlaceholderKind, Option<u32>)>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    description: String,
    embed: Option<String>,
}

impl ShapeState {
    fn frame(&self) -> Option<Frame> {
        match (self.offset, self.extent) {
            (Some((x, y)), Some((cx, cy))) => Some(Frame::new(x, y, cx, cy)),
            _ => None,
        }
    }
}

/// Facts read from a slide, layout or master part.
#[derive(Debug, Default)]
struct PartInfo {
    /// `p:cSld@name`.
    name: Option<String>,
    /// `p:sldLayout@type`.
    layout_type: Option<String>,
    /// Layout relationship ids of a master, in order.
    layout_rids: Vec<String>,
    placeholders: Vec<Placeholder>,
    background: Option<ColorRef>,
    pictures: Vec<PictureRef>,
    /// Text runs in document order.
    text: Vec<String>,
    /// First explicit latin typeface on a run.
    first_font: Option<String>,
}

impl PartInfo {
    fn parse(xml: &str) -> Result<Self> {
        let mut info = PartInfo::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut shape: Option<ShapeState> = None;
        let mut in_background = false;
        let mut in_run_props = false;
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"sp" => shape = Some(ShapeState::default()),
                        b"pic" => {
                            shape = Some(ShapeState {
                                is_picture: true,
                                ..ShapeState::default()
                            })
                        }
                        b"bg" => in_background = true,
                        b"rPr" => in_run_props = true,
                        b"t" => in_text = true,
                        b"sldLayout" => info.layout_type = attr(e, b"type"),
                        _ => {}
                    }
                    info.on_element(e, &mut shape, in_background, in_run_props);
                }
                Ok(Event::Empty(ref e)) => {
                    info.on_element(e, &mut shape, in_background, in_run_props);
                }
                Ok(Event::Text(ref e)) if in_text => {
                    let text = e.unescape().unwrap_or_default();
                    if !text.trim().is_empty() {
                        info.text.push(text.trim().to_string());
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" | b"pic" => {
                        if let Some(done) = shape.take() {
                            info.finish_shape(done);
                        }
                    }
                    b"bg" => in_background = false,
                    b"rPr" => in_run_props = false,
                    b"t" => in_text = false,
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

        Ok(info)
    }

    /// Handle an element that may be either a start tag or self-closing.
    fn on_element(
        &mut self,
        e: &BytesStart<'_>,
        shape: &mut Option<ShapeState>,
        in_background: bool,
        in_run_props: bool,
    ) {
        match local_name(e.name().as_ref()) {
            b"cSld" => {
                if self.name.is_none() {
                    self.name = attr(e, b"name").filter(|n| !n.trim().is_empty());
                }
            }
            b"sldLayoutId" => self.layout_rids.extend(rel_attr(e, b"id")),
            b"srgbClr" | b"sysClr" if in_background && self.background.is_none() => {
                self.background = literal_color(e).map(ColorRef::Rgb);
            }
            b"schemeClr" if in_background && self.background.is_none() => {
                self.background = attr(e, b"val").map(ColorRef::Scheme);
            }
            b"latin" if in_run_props && self.first_font.is_none() => {
                self.first_font = attr(e, b"typeface")
                    .filter(|t| !t.trim().is_empty() && !t.starts_with('+'));
            }
            name => {
                if let Some(state) = shape.as_mut() {
                    on_shape_element(state, name, e);
                }
            }
        }
    }

    fn finish_shape(&mut self, shape: ShapeState) {
        let frame = shape.frame();
        if shape.is_picture {
            self.pictures.push(PictureRef {
                embed: shape.embed,
                frame,
                description: shape.description,
            });
        } else if let Some((kind, idx)) = shape.placeholder {
            self.placeholders.push(Placeholder { kind, idx, frame });
        }
    }
}

fn on_shape_element(state: &mut ShapeState, name: &[u8], e: &BytesStart<'_>) {
    match name {
        b"ph" => {
            let kind = PlaceholderKind::from_ph_type(attr(e, b"type").as_deref());
            let idx = attr(e, b"idx").and_then(|v| v.parse().ok());
            state.placeholder = Some((kind, idx));
        }
        b"cNvPr" => {
            let parts: Vec<String> = [attr(e, b"name"), attr(e, b"descr"), attr(e, b"title")]
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .collect();
            state.description = parts.join(" ");
        }
        b"blip" => {
            if state.embed.is_none() {
                state.embed = rel_attr(e, b"embed");
            }
        }
        b"off" if state.offset.is_none() => {
            if let (Some(x), Some(y)) = (attr_i64(e, b"x"), attr_i64(e, b"y")) {
                state.offset = Some((x, y));
            }
        }
        b"ext" if state.extent.is_none() => {
            if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                state.extent = Some((cx, cy));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presentation() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:notesMasterIdLst><p:notesMasterId r:id="rId4"/></p:notesMasterIdLst>
  <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
</p:presentation>"#;
        let info = parse_presentation(xml).unwrap();
        assert_eq!(info.slide_rids, vec!["rId3", "rId2"]);
        assert_eq!(info.master_rids, vec!["rId1"]);
        assert_eq!(info.notes_master_rids, vec!["rId4"]);
        assert_eq!(info.slide_size, SlideSize { cx: 12_192_000, cy: 6_858_000 });
    }

    #[test]
    fn test_parse_theme() {
        let xml = r#"<a:theme xmlns:a="a"><a:themeElements>
  <a:clrScheme name="Office">
    <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
    <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
    <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
  </a:clrScheme>
  <a:fontScheme name="Office">
    <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/></a:majorFont>
    <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
  </a:fontScheme>
</a:themeElements></a:theme>"#;
        let theme = ThemeInfo::parse(xml).unwrap();
        let names: Vec<_> = theme.palette.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["dk1", "lt1", "accent1"]);
        assert_eq!(theme.palette[2].color, Rgb::new(0x44, 0x72, 0xC4));
        assert_eq!(theme.major_font.as_deref(), Some("Calibri Light"));
        assert_eq!(theme.minor_font.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_parse_layout_part() {
        let xml = r#"<p:sldLayout xmlns:p="p" xmlns:a="a" type="title">
  <p:cSld name="Title Slide"><p:spTree>
    <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="685800" y="2130425"/><a:ext cx="7772400" cy="1470025"/></a:xfrm></p:spPr></p:sp>
    <p:sp><p:nvSpPr><p:cNvPr id="3" name="Subtitle 2"/><p:cNvSpPr/><p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr>
      <p:spPr/></p:sp>
  </p:spTree></p:cSld>
</p:sldLayout>"#;
        let info = PartInfo::parse(xml).unwrap();
        assert_eq!(info.name.as_deref(), Some("Title Slide"));
        assert_eq!(info.layout_type.as_deref(), Some("title"));
        assert_eq!(info.placeholders.len(), 2);
        assert_eq!(info.placeholders[0].kind, PlaceholderKind::CenteredTitle);
        assert_eq!(
            info.placeholders[0].frame,
            Some(Frame::new(685_800, 2_130_425, 7_772_400, 1_470_025))
        );
        assert_eq!(info.placeholders[1].idx, Some(1));
        assert_eq!(info.placeholders[1].frame, None);
    }

    #[test]
    fn test_parse_slide_part() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a" xmlns:r="r"><p:cSld>
  <p:bg><p:bgPr><a:solidFill><a:schemeClr val="tx2"/></a:solidFill></p:bgPr></p:bg>
  <p:spTree>
    <p:sp><p:txBody><a:p><a:r><a:rPr lang="en-US"><a:latin typeface="Georgia"/></a:rPr><a:t>Quarterly sales</a:t></a:r></a:p></p:txBody></p:sp>
    <p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3" descr="sales chart"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
      <p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
      <p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="300" cy="400"/></a:xfrm></p:spPr></p:pic>
  </p:spTree></p:cSld></p:sld>"#;
        let info = PartInfo::parse(xml).unwrap();
        assert_eq!(info.background, Some(ColorRef::Scheme("tx2".into())));
        assert_eq!(info.first_font.as_deref(), Some("Georgia"));
        assert_eq!(info.text, vec!["Quarterly sales"]);
        assert_eq!(info.pictures.len(), 1);
        assert_eq!(info.pictures[0].embed.as_deref(), Some("rId2"));
        assert_eq!(info.pictures[0].frame, Some(Frame::new(100, 200, 300, 400)));
        assert_eq!(info.pictures[0].description, "Picture 3 sales chart");
    }

    #[test]
    fn test_scheme_color_resolution() {
        let palette = vec![
            PaletteColor::new("dk1", Rgb::BLACK),
            PaletteColor::new("lt1", Rgb::WHITE),
        ];
        assert_eq!(
            ColorRef::Scheme("bg1".into()).resolve(&palette),
            Some(Rgb::WHITE)
        );
        assert_eq!(
            ColorRef::Scheme("tx1".into()).resolve(&palette),
            Some(Rgb::BLACK)
        );
        assert_eq!(ColorRef::Scheme("accent6".into()).resolve(&palette), None);
    }

    #[test]
    fn test_inherit_frame_from_master() {
        let master = vec![
            Placeholder {
                kind: PlaceholderKind::Title,
                idx: None,
                frame: Some(Frame::new(1, 2, 3, 4)),
            },
            Placeholder {
                kind: PlaceholderKind::Body,
                idx: Some(1),
                frame: Some(Frame::new(5, 6, 7, 8)),
            },
        ];
        let title = inherit_frame(
            Placeholder {
                kind: PlaceholderKind::CenteredTitle,
                idx: None,
                frame: None,
            },
            &master,
        );
        assert_eq!(title.frame, Some(Frame::new(1, 2, 3, 4)));

        let body = inherit_frame(
            Placeholder {
                kind: PlaceholderKind::Object,
                idx: Some(1),
                frame: None,
            },
            &master,
        );
        assert_eq!(body.frame, Some(Frame::new(5, 6, 7, 8)));
    }

    #[test]
    fn test_parts_by_number() {
        let parts = parts_by_number(
            ["ppt/slides/slide10.xml", "ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(
            parts,
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide10.xml"
            ]
        );
    }
}

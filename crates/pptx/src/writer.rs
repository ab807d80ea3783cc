//! PresentationML writers for generated slides and notes slides.

use crate::package::XML_DECLARATION;
use crate::xml::escape;
use slidegen_core::{Error, Frame, PlaceholderKind, Result, Rgb};
use std::fmt::Write;

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// Bullet glyph for text boxes that do not inherit list styles.
const BULLET_CHAR: &str = "\u{2022}";

/// Left margin and hanging indent for text box bullets, in EMU.
const BULLET_INDENT_EMU: i64 = 342_900;

fn xml_err(e: std::fmt::Error) -> Error {
    Error::Xml(e.to_string())
}

/// Character formatting applied to every run of a text shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    pub font: String,
    pub color: Rgb,
    /// Size in hundredths of a point.
    pub size: u32,
}

/// Where a text shape goes on the slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeAnchor {
    /// Fill a layout placeholder; geometry is inherited from the layout.
    Placeholder {
        kind: PlaceholderKind,
        idx: Option<u32>,
    },
    /// A free text box at an explicit frame.
    TextBox(Frame),
}

/// A text shape to write.
#[derive(Debug, Clone)]
pub struct TextShape {
    pub name: String,
    pub anchor: ShapeAnchor,
    pub paragraphs: Vec<String>,
    pub style: RunStyle,
    /// Draw bullet glyphs on a text box.
    pub bulleted: bool,
}

/// A picture that references an image relationship of the slide.
#[derive(Debug, Clone)]
pub struct PictureShape {
    pub name: String,
    pub description: String,
    pub rel_id: String,
    pub frame: Frame,
}

/// Builds one `p:sld` part.
#[derive(Debug)]
pub struct SlideWriter {
    shapes: String,
    next_id: u32,
}

impl Default for SlideWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideWriter {
    pub fn new() -> Self {
        Self {
            shapes: String::with_capacity(2048),
            // id 1 is the group shape
            next_id: 2,
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a text shape. Shapes without paragraphs are skipped.
    pub fn add_text(&mut self, shape: &TextShape) -> Result<()> {
        if shape.paragraphs.is_empty() {
            return Ok(());
        }
        let id = self.take_id();
        let xml = &mut self.shapes;

        xml.push_str("<p:sp><p:nvSpPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{}"/>"#,
            id,
            escape(&shape.name)
        )
        .map_err(xml_err)?;

        match shape.anchor {
            ShapeAnchor::Placeholder { kind, idx } => {
                xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#);
                if let Some(ph_type) = kind.ph_type() {
                    write!(xml, r#" type="{}""#, ph_type).map_err(xml_err)?;
                }
                if let Some(idx) = idx {
                    write!(xml, r#" idx="{}""#, idx).map_err(xml_err)?;
                }
                xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");
                xml.push_str("<p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>");
            }
            ShapeAnchor::TextBox(frame) => {
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
                xml.push_str("<p:spPr>");
                write_xfrm(xml, &frame)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
                xml.push_str("</p:spPr>");
                xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"/><a:lstStyle/>"#);
            }
        }

        let bullets = shape.bulleted && matches!(shape.anchor, ShapeAnchor::TextBox(_));
        for paragraph in &shape.paragraphs {
            xml.push_str("<a:p>");
            if bullets {
                write!(
                    xml,
                    r#"<a:pPr marL="{}" indent="-{}"><a:buFont typeface="Arial"/><a:buChar char="{}"/></a:pPr>"#,
                    BULLET_INDENT_EMU, BULLET_INDENT_EMU, BULLET_CHAR
                )
                .map_err(xml_err)?;
            }
            xml.push_str("<a:r>");
            write_run_props(xml, &shape.style)?;
            write!(xml, "<a:t>{}</a:t>", escape(paragraph)).map_err(xml_err)?;
            xml.push_str("</a:r></a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    /// Add a picture shape.
    pub fn add_picture(&mut self, picture: &PictureShape) -> Result<()> {
        let id = self.take_id();
        let xml = &mut self.shapes;

        xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{}" descr="{}"/>"#,
            id,
            escape(&picture.name),
            escape(&picture.description)
        )
        .map_err(xml_err)?;
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
        xml.push_str("</p:nvPicPr><p:blipFill>");
        write!(xml, r#"<a:blip r:embed="{}"/>"#, escape(&picture.rel_id)).map_err(xml_err)?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>");
        write_xfrm(xml, &picture.frame)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(())
    }

    /// Number of shapes written so far.
    pub fn shape_count(&self) -> usize {
        (self.next_id - 2) as usize
    }

    /// Finish the slide and return the part XML.
    pub fn finish(self) -> String {
        let mut xml = String::with_capacity(self.shapes.len() + 512);
        xml.push_str(XML_DECLARATION);
        xml.push_str("<p:sld ");
        xml.push_str(NS_DECLS);
        xml.push_str("><p:cSld><p:spTree>");
        xml.push_str(GROUP_PROPS);
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        xml
    }
}

const GROUP_PROPS: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

fn write_xfrm(xml: &mut String, frame: &Frame) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
    .map_err(xml_err)
}

fn write_run_props(xml: &mut String, style: &RunStyle) -> Result<()> {
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr>"#,
        style.size,
        style.color.to_hex(),
        escape(&style.font)
    )
    .map_err(xml_err)
}

/// Build a `p:notes` part holding speaker notes, one paragraph per line.
pub fn notes_slide_xml(notes: &str) -> Result<String> {
    let mut xml = String::with_capacity(1024 + notes.len());
    xml.push_str(XML_DECLARATION);
    xml.push_str("<p:notes ");
    xml.push_str(NS_DECLS);
    xml.push_str("><p:cSld><p:spTree>");
    xml.push_str(GROUP_PROPS);
    xml.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
    );
    xml.push_str(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
    );
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    for line in notes.lines() {
        if line.trim().is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        } else {
            write!(
                xml,
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape(line)
            )
            .map_err(xml_err)?;
        }
    }
    if notes.lines().next().is_none() {
        xml.push_str("<a:p/>");
    }
    xml.push_str("</p:txBody></p:sp></p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn style() -> RunStyle {
        RunStyle {
            font: "Calibri".into(),
            color: Rgb::new(0x1F, 0x4E, 0x79),
            size: 4000,
        }
    }

    /// Parse the whole document, failing on malformed XML.
    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        reader.check_end_names(true);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML: {e}\n{xml}"),
            }
        }
    }

    #[test]
    fn test_placeholder_shape() {
        let mut writer = SlideWriter::new();
        writer
            .add_text(&TextShape {
                name: "Title 1".into(),
                anchor: ShapeAnchor::Placeholder {
                    kind: PlaceholderKind::Title,
                    idx: None,
                },
                paragraphs: vec!["Q3 <Results> & Plans".into()],
                style: style(),
                bulleted: false,
            })
            .unwrap();
        writer
            .add_text(&TextShape {
                name: "Content 2".into(),
                anchor: ShapeAnchor::Placeholder {
                    kind: PlaceholderKind::Object,
                    idx: Some(1),
                },
                paragraphs: vec!["First".into(), "Second".into()],
                style: style(),
                bulleted: true,
            })
            .unwrap();
        assert_eq!(writer.shape_count(), 2);

        let xml = writer.finish();
        assert_well_formed(&xml);
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
        assert!(xml.contains("Q3 &lt;Results&gt; &amp; Plans"));
        assert!(xml.contains(r#"sz="4000""#));
        assert!(xml.contains(r#"<a:srgbClr val="1F4E79"/>"#));
        // placeholders inherit bullets from the layout
        assert!(!xml.contains("buChar"));
    }

    #[test]
    fn test_text_box_with_bullets() {
        let mut writer = SlideWriter::new();
        writer
            .add_text(&TextShape {
                name: "Body".into(),
                anchor: ShapeAnchor::TextBox(Frame::new(10, 20, 30, 40)),
                paragraphs: vec!["One".into(), "Two".into()],
                style: style(),
                bulleted: true,
            })
            .unwrap();
        let xml = writer.finish();
        assert_well_formed(&xml);
        assert!(xml.contains(r#"<a:off x="10" y="20"/><a:ext cx="30" cy="40"/>"#));
        assert_eq!(xml.matches("<a:buChar").count(), 2);
        assert!(xml.contains(r#"txBox="1""#));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut writer = SlideWriter::new();
        writer
            .add_text(&TextShape {
                name: "Body".into(),
                anchor: ShapeAnchor::TextBox(Frame::new(0, 0, 1, 1)),
                paragraphs: Vec::new(),
                style: style(),
                bulleted: true,
            })
            .unwrap();
        assert_eq!(writer.shape_count(), 0);
        assert!(!writer.finish().contains("<p:sp>"));
    }

    #[test]
    fn test_picture_shape() {
        let mut writer = SlideWriter::new();
        writer
            .add_picture(&PictureShape {
                name: "Picture 2".into(),
                description: "growth \"chart\"".into(),
                rel_id: "rId2".into(),
                frame: Frame::new(1, 2, 3, 4),
            })
            .unwrap();
        let xml = writer.finish();
        assert_well_formed(&xml);
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains("growth &quot;chart&quot;"));
    }

    #[test]
    fn test_notes_slide() {
        let xml = notes_slide_xml("Open with the headline.\n\nThen pause & ask.").unwrap();
        assert_well_formed(&xml);
        assert!(xml.contains(r#"<p:ph type="body" idx="1"/>"#));
        assert!(xml.contains("Then pause &amp; ask."));
        assert_eq!(xml.matches("<a:p>").count(), 3);
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut writer = SlideWriter::new();
        writer
            .add_text(&TextShape {
                name: "Title 1".into(),
                anchor: ShapeAnchor::Placeholder {
                    kind: PlaceholderKind::Title,
                    idx: None,
                },
                paragraphs: vec!["Q3\u{1} results\u{0}".into()],
                style: style(),
                bulleted: false,
            })
            .unwrap();
        let xml = writer.finish();
        assert_well_formed(&xml);
        assert!(xml.contains("<a:t>Q3 results</a:t>"));

        let notes = notes_slide_xml("Pause\u{8} here").unwrap();
        assert_well_formed(&notes);
        assert!(notes.contains("<a:t>Pause here</a:t>"));
    }
}

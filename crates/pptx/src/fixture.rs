//! Small in-memory templates for tests.
//!
//! The generated package has one master, a "Title Slide" and a
//! "Title and Content" layout, a theme, one slide with a picture and,
//! optionally, a notes master.

use crate::format::TemplateFormat;
use crate::package::{Package, CT_PRESENTATION_MAIN, CT_SLIDE, CT_TEMPLATE_MAIN, XML_DECLARATION};

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// 1x1 transparent PNG.
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Builder for a minimal but complete presentation template.
#[derive(Debug, Clone)]
pub struct TemplateFixture {
    format: TemplateFormat,
    notes_master: bool,
    background: &'static str,
    picture_description: String,
}

impl Default for TemplateFixture {
    fn default() -> Self {
        Self {
            format: TemplateFormat::Pptx,
            notes_master: true,
            background: "FFFFFF",
            picture_description: "revenue growth chart".to_string(),
        }
    }
}

impl TemplateFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: TemplateFormat) -> Self {
        self.format = format;
        self
    }

    pub fn notes_master(mut self, enabled: bool) -> Self {
        self.notes_master = enabled;
        self
    }

    /// Slide background as `RRGGBB`.
    pub fn background(mut self, hex: &'static str) -> Self {
        self.background = hex;
        self
    }

    /// Alt text of the picture on the template slide.
    pub fn picture_description(mut self, description: impl Into<String>) -> Self {
        self.picture_description = description.into();
        self
    }

    /// The template as an in-memory package.
    pub fn package(&self) -> Package {
        let mut package = Package::new();
        package.set_part("[Content_Types].xml", self.content_types());
        package.set_part(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );
        package.set_part("ppt/presentation.xml", self.presentation());

        let mut pres_rels = vec![
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            ("rId2", "slide", "slides/slide1.xml"),
            ("rId3", "theme", "theme/theme1.xml"),
        ];
        if self.notes_master {
            pres_rels.push(("rId4", "notesMaster", "notesMasters/notesMaster1.xml"));
        }
        package.set_part("ppt/_rels/presentation.xml.rels", rels(&pres_rels));

        package.set_part("ppt/slideMasters/slideMaster1.xml", self.master());
        package.set_part(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
                ("rId3", "theme", "../theme/theme1.xml"),
            ]),
        );

        package.set_part("ppt/slideLayouts/slideLayout1.xml", title_layout());
        package.set_part("ppt/slideLayouts/slideLayout2.xml", content_layout());
        for n in 1..=2 {
            package.set_part(
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            );
        }

        package.set_part("ppt/slides/slide1.xml", self.slide());
        package.set_part(
            "ppt/slides/_rels/slide1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout2.xml"),
                ("rId2", "image", "../media/image1.png"),
            ]),
        );
        package.set_part("ppt/media/image1.png", PIXEL_PNG);
        package.set_part("ppt/theme/theme1.xml", theme());

        if self.notes_master {
            package.set_part("ppt/notesMasters/notesMaster1.xml", notes_master());
            package.set_part(
                "ppt/notesMasters/_rels/notesMaster1.xml.rels",
                rels(&[("rId1", "theme", "../theme/theme2.xml")]),
            );
            package.set_part("ppt/theme/theme2.xml", theme());
        }

        package
    }

    /// The template as `.pptx`/`.potx` bytes.
    pub fn build(&self) -> Vec<u8> {
        match self.package().to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => panic!("fixture package failed to serialize: {e}"),
        }
    }

    /// A filename with the right extension.
    pub fn filename(&self) -> &'static str {
        match self.format {
            TemplateFormat::Pptx => "template.pptx",
            TemplateFormat::Potx => "template.potx",
        }
    }

    fn content_types(&self) -> String {
        let main = match self.format {
            TemplateFormat::Pptx => CT_PRESENTATION_MAIN,
            TemplateFormat::Potx => CT_TEMPLATE_MAIN,
        };
        let pml = "application/vnd.openxmlformats-officedocument.presentationml";
        let mut xml = format!(
            r#"{XML_DECLARATION}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="{main}"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{pml}.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{pml}.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="{pml}.slideLayout+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="{CT_SLIDE}"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#
        );
        if self.notes_master {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/notesMasters/notesMaster1.xml" ContentType="{pml}.notesMaster+xml"/><Override PartName="/ppt/theme/theme2.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation(&self) -> String {
        let notes = if self.notes_master {
            r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId4"/></p:notesMasterIdLst>"#
        } else {
            ""
        };
        format!(
            r#"{XML_DECLARATION}<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{notes}<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle/></p:presentation>"#
        )
    }

    fn master(&self) -> String {
        format!(
            r#"{XML_DECLARATION}<p:sldMaster {NS}><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{bg}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree>{group}{title}{body}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#,
            bg = self.background,
            group = GROUP,
            title = placeholder(2, "Title Placeholder 1", r#"type="title""#, Some((457200, 274638, 8229600, 1143000))),
            body = placeholder(3, "Text Placeholder 2", r#"type="body" idx="1""#, Some((457200, 1600200, 8229600, 4525963))),
        )
    }

    fn slide(&self) -> String {
        format!(
            r#"{XML_DECLARATION}<p:sld {NS}><p:cSld><p:spTree>{GROUP}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"><a:latin typeface="Georgia"/></a:rPr><a:t>Quarterly revenue growth</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture 2" descr="{descr}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="5486400" y="1600200"/><a:ext cx="3200400" cy="2400300"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            descr = crate::xml::escape(&self.picture_description),
        )
    }
}

const GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn rels(items: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        r#"{XML_DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );
    for (id, rel_type, target) in items {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL}/{rel_type}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn placeholder(id: u32, name: &str, ph: &str, frame: Option<(i64, i64, i64, i64)>) -> String {
    let sp_pr = match frame {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph {ph}/></p:nvPr></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#
    )
}

fn title_layout() -> String {
    format!(
        r#"{XML_DECLARATION}<p:sldLayout {NS} type="title" preserve="1"><p:cSld name="Title Slide"><p:spTree>{GROUP}{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        placeholder(2, "Title 1", r#"type="ctrTitle""#, Some((685800, 2130425, 7772400, 1470025))),
        placeholder(3, "Subtitle 2", r#"type="subTitle" idx="1""#, Some((1371600, 3886200, 6400800, 1752600))),
    )
}

fn content_layout() -> String {
    format!(
        r#"{XML_DECLARATION}<p:sldLayout {NS} type="obj" preserve="1"><p:cSld name="Title and Content"><p:spTree>{GROUP}{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        placeholder(2, "Title 1", r#"type="title""#, None),
        placeholder(3, "Content Placeholder 2", r#"idx="1""#, None),
    )
}

fn notes_master() -> String {
    format!(
        r#"{XML_DECLARATION}<p:notesMaster {NS}><p:cSld><p:spTree>{GROUP}{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#,
        placeholder(2, "Notes Placeholder 1", r#"type="body" idx="1""#, Some((685800, 4343400, 5486400, 4114800))),
    )
}

fn theme() -> String {
    format!(
        r#"{XML_DECLARATION}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"/></a:themeElements></a:theme>"#
    )
}

/// Default `.pptx` template bytes.
pub fn minimal_template() -> Vec<u8> {
    TemplateFixture::new().build()
}

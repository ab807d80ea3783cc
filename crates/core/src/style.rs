//! Style facts extracted from a presentation template.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EMUs (English Metric Units) per point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Default font when a template does not name one.
pub const DEFAULT_FONT: &str = "Calibri";

/// A 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase `RRGGBB` without a leading `#`, as DrawingML expects.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Perceived brightness in `0.0..=1.0` (ITU-R BT.601 weights).
    pub fn luminance(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    /// Whether light text reads better on this colour.
    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }

    /// Whether two colours differ enough in brightness to be legible together.
    pub fn contrasts_with(&self, other: &Rgb) -> bool {
        (self.luminance() - other.luminance()).abs() >= 0.4
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// A named entry of the template palette (`dk1`, `accent1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub color: Rgb,
}

impl PaletteColor {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Which text a font applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    Title,
    Body,
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Width in points.
    pub fn width_pt(&self) -> f64 {
        self.cx as f64 / EMU_PER_POINT as f64
    }

    /// Height in points.
    pub fn height_pt(&self) -> f64 {
        self.cy as f64 / EMU_PER_POINT as f64
    }
}

/// Slide dimensions, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    pub cx: i64,
    pub cy: i64,
}

impl SlideSize {
    /// Frame for a title when neither layout nor master declares one.
    pub fn title_frame(&self) -> Frame {
        Frame::new(self.cx / 20, self.cy / 25, self.cx * 9 / 10, self.cy / 6)
    }

    /// Frame for body text when neither layout nor master declares one.
    pub fn body_frame(&self) -> Frame {
        Frame::new(self.cx / 20, self.cy * 7 / 30, self.cx * 9 / 10, self.cy * 2 / 3)
    }
}

impl Default for SlideSize {
    /// 10in x 7.5in, the 4:3 default.
    fn default() -> Self {
        Self {
            cx: 9_144_000,
            cy: 6_858_000,
        }
    }
}

/// The kind of a layout placeholder, from `p:ph@type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    /// `p:ph` without a type: a generic content placeholder.
    Object,
    Picture,
    Date,
    Footer,
    SlideNumber,
    Other,
}

impl PlaceholderKind {
    /// Map a `p:ph@type` value; `None` means the attribute was absent.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenteredTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some("pic") => Self::Picture,
            Some("dt") => Self::Date,
            Some("ftr") => Self::Footer,
            Some("sldNum") => Self::SlideNumber,
            Some(_) => Self::Other,
        }
    }

    /// The `p:ph@type` value to write, or `None` to omit the attribute.
    pub fn ph_type(&self) -> Option<&'static str> {
        match self {
            Self::Title => Some("title"),
            Self::CenteredTitle => Some("ctrTitle"),
            Self::Subtitle => Some("subTitle"),
            Self::Body => Some("body"),
            Self::Object => None,
            Self::Picture => Some("pic"),
            Self::Date => Some("dt"),
            Self::Footer => Some("ftr"),
            Self::SlideNumber => Some("sldNum"),
            Self::Other => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenteredTitle)
    }
}

/// A placeholder declared by a slide layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub idx: Option<u32>,
    /// Resolved frame; inherited from the master when the layout omits it.
    pub frame: Option<Frame>,
}

/// A slide layout available in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    /// Position in master order.
    pub index: usize,
    /// Display name (`p:cSld@name`).
    pub name: String,
    /// Layout type (`p:sldLayout@type`), e.g. `title`, `obj`, `secHead`.
    pub layout_type: Option<String>,
    /// Package part, e.g. `ppt/slideLayouts/slideLayout2.xml`.
    pub part_name: String,
    pub placeholders: Vec<Placeholder>,
}

impl LayoutInfo {
    /// The title placeholder, if the layout has one.
    pub fn title_placeholder(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.kind.is_title())
    }

    /// The main text placeholder below the title.
    ///
    /// Prefers `body`/`obj`; a subtitle is only used when `allow_subtitle` is set.
    pub fn body_placeholder(&self, allow_subtitle: bool) -> Option<&Placeholder> {
        self.placeholders
            .iter()
            .find(|p| matches!(p.kind, PlaceholderKind::Body | PlaceholderKind::Object))
            .or_else(|| {
                allow_subtitle
                    .then(|| {
                        self.placeholders
                            .iter()
                            .find(|p| p.kind == PlaceholderKind::Subtitle)
                    })
                    .flatten()
            })
    }
}

/// A picture found on a template slide that may be reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateImage {
    /// Source part, e.g. `ppt/media/image1.png`.
    pub part_name: String,
    /// Lowercase file extension without the dot.
    pub extension: String,
    /// Where the picture sat on its slide.
    pub frame: Option<Frame>,
    /// Shape name and alt text.
    pub description: String,
    /// Text of the slide the picture was found on.
    pub context: String,
}

impl TemplateImage {
    /// Words that describe the picture, for relevance matching.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.description, self.context)
    }
}

/// Reusable visual facts derived from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub slide_size: SlideSize,
    /// Theme colours in scheme order.
    pub color_palette: Vec<PaletteColor>,
    /// Effective background of the first slide.
    pub background: Rgb,
    pub font_choices: BTreeMap<FontRole, String>,
    /// Layouts in master order; never empty for an analyzed template.
    pub layouts: Vec<LayoutInfo>,
    pub reusable_images: Vec<TemplateImage>,
}

impl StyleProfile {
    /// Palette used when a template has no theme.
    pub fn default_palette() -> Vec<PaletteColor> {
        vec![
            PaletteColor::new("primary", Rgb::new(0x1F, 0x4E, 0x79)),
            PaletteColor::new("secondary", Rgb::new(0x44, 0x72, 0xC4)),
            PaletteColor::new("accent", Rgb::new(0x70, 0xAD, 0x47)),
        ]
    }

    /// Look up a palette entry by scheme name.
    pub fn palette_color(&self, name: &str) -> Option<Rgb> {
        self.color_palette
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.color)
    }

    /// The brand colour: `primary`, else the first accent, else the first entry.
    pub fn primary_color(&self) -> Rgb {
        self.color_palette
            .iter()
            .find(|c| c.name == "primary")
            .or_else(|| {
                self.color_palette
                    .iter()
                    .find(|c| c.name.starts_with("accent"))
            })
            .or_else(|| self.color_palette.first())
            .map(|c| c.color)
            .unwrap_or(Rgb::new(0x1F, 0x4E, 0x79))
    }

    /// Font for the given role, defaulting to Calibri.
    pub fn font(&self, role: FontRole) -> &str {
        self.font_choices
            .get(&role)
            .map(String::as_str)
            .unwrap_or(DEFAULT_FONT)
    }

    /// Colour for title text, legible against the background.
    pub fn title_color(&self) -> Rgb {
        let primary = self.primary_color();
        if primary.contrasts_with(&self.background) {
            primary
        } else {
            self.body_color()
        }
    }

    /// Colour for body text: white on dark backgrounds, dark grey otherwise.
    pub fn body_color(&self) -> Rgb {
        if self.background.is_dark() {
            Rgb::WHITE
        } else {
            Rgb::new(40, 40, 40)
        }
    }

    /// Names of the available layouts, in order.
    pub fn layout_names(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.name.as_str()).collect()
    }
}

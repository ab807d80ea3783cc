//! Core domain types, error taxonomy, text fitting and keyword matching
//! for generating slide decks from free-form text.

pub mod error;
pub mod fit;
pub mod keywords;
pub mod style;
pub mod types;

pub use error::{Error, Result};
pub use fit::{FittedText, TextFitter};
pub use keywords::KeywordMatcher;
pub use style::{
    FontRole, Frame, LayoutInfo, PaletteColor, Placeholder, PlaceholderKind, Rgb, SlideSize,
    StyleProfile, TemplateImage,
};
pub use types::{Outline, OutlineEntry, SlideKind};

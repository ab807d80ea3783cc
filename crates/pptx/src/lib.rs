//! PPTX (Office Open XML) backend: template analysis, layout selection and
//! presentation assembly.
//!
//! A template is read into an in-memory [`Package`], analyzed into a
//! [`StyleProfile`](slidegen_core::StyleProfile), and then reused to write a
//! new deck with one slide per outline entry.

pub mod analyzer;
pub mod assembler;
pub mod format;
pub mod inspect;
pub mod layout;
pub mod package;
pub mod writer;
mod xml;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use analyzer::{Template, TemplateAnalyzer};
pub use assembler::{AssembledDeck, AssemblyReport, PresentationAssembler, MAX_TITLE_CHARS};
pub use format::TemplateFormat;
pub use inspect::{DeckReader, SlideSummary};
pub use layout::select_layout;
pub use package::Package;

/// MIME type of a generated deck.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

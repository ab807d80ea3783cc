//! Domain types for the slide outline produced by the LLM adapter.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The role a slide plays in the deck; drives layout selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// Opening slide with the deck title.
    Title,
    /// Divider between major topics.
    Section,
    /// Regular title-and-bullets slide.
    #[default]
    Content,
    /// Side-by-side comparison.
    Comparison,
    /// Closing summary slide.
    Conclusion,
}

impl SlideKind {
    /// Every kind, in deck order of typical appearance.
    pub const ALL: [SlideKind; 5] = [
        SlideKind::Title,
        SlideKind::Section,
        SlideKind::Content,
        SlideKind::Comparison,
        SlideKind::Conclusion,
    ];

    /// Interpret a free-form label from the provider.
    ///
    /// Unknown or empty labels fall back to [`SlideKind::Content`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "title" | "cover" | "intro" => Self::Title,
            "section" | "section_header" | "divider" => Self::Section,
            "comparison" | "compare" | "two_column" => Self::Comparison,
            "conclusion" | "summary" | "closing" => Self::Conclusion,
            _ => Self::Content,
        }
    }

    /// Lowercase label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Section => "section",
            Self::Content => "content",
            Self::Comparison => "comparison",
            Self::Conclusion => "conclusion",
        }
    }
}

/// A single slide description in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Slide title.
    pub title: String,

    /// Bullet points in display order.
    pub bullets: Vec<String>,

    /// Optional speaker notes.
    pub notes: Option<String>,

    /// Role of the slide in the deck.
    pub kind: SlideKind,
}

impl OutlineEntry {
    /// Create a content slide with the given title and no bullets.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
            notes: None,
            kind: SlideKind::Content,
        }
    }

    /// Set the slide kind.
    pub fn with_kind(mut self, kind: SlideKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append a bullet.
    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.bullets.push(bullet.into());
        self
    }

    /// Set speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Title and bullets joined into one string, used for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.clone();
        for bullet in &self.bullets {
            text.push(' ');
            text.push_str(bullet);
        }
        text
    }
}

/// An ordered, non-empty sequence of slide descriptions.
///
/// Built once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outline {
    title: Option<String>,
    entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Build an outline, rejecting one without slides.
    pub fn new(title: Option<String>, entries: Vec<OutlineEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::MalformedResponse(
                "the outline contains no slides".to_string(),
            ));
        }
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self { title, entries })
    }

    /// Deck title suggested by the provider, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Slides in presentation order.
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    /// Number of slides the outline describes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slide titles in order.
    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_kind_from_label() {
        assert_eq!(SlideKind::from_label("title"), SlideKind::Title);
        assert_eq!(SlideKind::from_label(" Conclusion "), SlideKind::Conclusion);
        assert_eq!(SlideKind::from_label("COMPARISON"), SlideKind::Comparison);
        assert_eq!(SlideKind::from_label("section"), SlideKind::Section);
        assert_eq!(SlideKind::from_label("bullets"), SlideKind::Content);
        assert_eq!(SlideKind::from_label(""), SlideKind::Content);
    }

    #[test]
    fn test_slide_kind_serde_matches_as_str() {
        for kind in SlideKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_empty_outline_is_rejected() {
        let err = Outline::new(Some("Deck".into()), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_outline_accessors() {
        let outline = Outline::new(
            Some("  ".into()),
            vec![
                OutlineEntry::new("Intro").with_kind(SlideKind::Title),
                OutlineEntry::new("Numbers").with_bullet("Q1 up 20%"),
            ],
        )
        .unwrap();
        assert_eq!(outline.title(), None);
        assert_eq!(outline.len(), 2);
        assert!(!outline.is_empty());
        assert_eq!(outline.titles(), vec!["Intro", "Numbers"]);
    }

    #[test]
    fn test_searchable_text() {
        let entry = OutlineEntry::new("Sales")
            .with_bullet("Q1 grew")
            .with_bullet("Q2 flat");
        assert_eq!(entry.searchable_text(), "Sales Q1 grew Q2 flat");
    }
}

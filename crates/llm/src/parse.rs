//! Parsing provider output into an [`Outline`].
//!
//! Providers often wrap the JSON in prose or code fences, so the object is
//! taken from the first `{` to the last `}`.

use serde::Deserialize;
use slidegen_core::{Error, Outline, OutlineEntry, Result, SlideKind};

#[derive(Debug, Deserialize)]
struct RawOutline {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slides: Vec<RawSlide>,
}

#[derive(Debug, Deserialize)]
struct RawSlide {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "content")]
    bullets: Option<BulletList>,
    #[serde(default, alias = "slide_type")]
    slide_kind: Option<String>,
    #[serde(default, alias = "speaking_notes", alias = "speaker_notes")]
    notes: Option<String>,
}

/// Bullets as a list, or a single string split on newlines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BulletList {
    Many(Vec<serde_json::Value>),
    One(String),
}

impl BulletList {
    fn into_lines(self) -> Vec<String> {
        match self {
            BulletList::Many(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            BulletList::One(text) => text.lines().map(String::from).collect(),
        }
    }
}

/// Take the JSON object embedded in `raw`.
fn json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Strip list markers providers sometimes add themselves.
fn clean_bullet(bullet: &str) -> String {
    bullet
        .trim()
        .trim_start_matches(['-', '*', '\u{2022}'])
        .trim()
        .to_string()
}

/// Parse raw provider text into a normalised outline.
pub fn parse_outline(raw: &str) -> Result<Outline> {
    let json = json_object(raw).ok_or_else(|| {
        Error::MalformedResponse("provider response contains no JSON object".to_string())
    })?;
    let parsed: RawOutline = serde_json::from_str(json)
        .map_err(|e| Error::MalformedResponse(format!("provider response is not an outline: {}", e)))?;

    let mut entries = Vec::with_capacity(parsed.slides.len());
    for slide in parsed.slides {
        let bullets: Vec<String> = slide
            .bullets
            .map(BulletList::into_lines)
            .unwrap_or_default()
            .iter()
            .map(|b| clean_bullet(b))
            .filter(|b| !b.is_empty())
            .collect();
        let title = slide.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.is_empty() && bullets.is_empty() {
            continue;
        }

        let title = if title.is_empty() {
            format!("Slide {}", entries.len() + 1)
        } else {
            title
        };
        let kind = slide
            .slide_kind
            .as_deref()
            .map(SlideKind::from_label)
            .unwrap_or_default();

        let mut entry = OutlineEntry::new(title).with_kind(kind);
        entry.bullets = bullets;
        if let Some(notes) = slide.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            entry = entry.with_notes(notes);
        }
        entries.push(entry);
    }

    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let outline = Outline::new(title, entries)?;
    log::debug!("Parsed outline with {} slide(s)", outline.len());
    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let raw = r#"Here is your outline:
```json
{
  "title": "Quarterly Review",
  "slides": [
    {"title": "Quarterly Review", "content": ["Q3 2024"], "slide_type": "title"},
    {"title": "Revenue", "content": ["- Up 12%", "  ", "Europe flat"], "slide_type": "content",
     "speaking_notes": "Lead with the headline."},
    {"title": "Wrap-up", "bullets": ["Questions?"], "slide_kind": "Conclusion"}
  ]
}
```
Let me know if you need changes."#;
        let outline = parse_outline(raw).unwrap();
        assert_eq!(outline.title(), Some("Quarterly Review"));
        assert_eq!(outline.len(), 3);

        let entries = outline.entries();
        assert_eq!(entries[0].kind, SlideKind::Title);
        assert_eq!(entries[1].bullets, vec!["Up 12%", "Europe flat"]);
        assert_eq!(entries[1].notes.as_deref(), Some("Lead with the headline."));
        assert_eq!(entries[2].kind, SlideKind::Conclusion);
        assert_eq!(entries[2].bullets, vec!["Questions?"]);
    }

    #[test]
    fn test_unknown_kind_and_blank_titles() {
        let raw = r#"{"slides": [
            {"title": "  ", "content": ["Orphan bullet"], "slide_type": "agenda"},
            {"title": "", "content": []},
            {"title": "Notes only", "speaker_notes": "  say hi  "},
            {"title": "String body", "content": "line one\nline two"}
        ]}"#;
        let outline = parse_outline(raw).unwrap();
        let entries = outline.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Slide 1");
        assert_eq!(entries[0].kind, SlideKind::Content);
        assert_eq!(entries[1].notes.as_deref(), Some("say hi"));
        assert_eq!(entries[2].bullets, vec!["line one", "line two"]);
        assert_eq!(outline.title(), None);
    }

    #[test]
    fn test_malformed_responses() {
        for raw in [
            "I cannot help with that.",
            "} backwards {",
            "{\"slides\": [}",
            "{\"slides\": []}",
            "{\"slides\": [{\"title\": \" \", \"content\": [\"\"]}]}",
        ] {
            let err = parse_outline(raw).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{raw}: {err:?}");
        }
    }
}

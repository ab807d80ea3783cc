//! Choosing a template layout for each slide kind.

use slidegen_core::{LayoutInfo, SlideKind};

/// `p:sldLayout@type` values that suit a slide kind, best first.
fn preferred_types(kind: SlideKind) -> &'static [&'static str] {
    match kind {
        SlideKind::Title => &["title"],
        SlideKind::Section => &["secHead"],
        SlideKind::Content => &["obj", "tx"],
        SlideKind::Comparison => &["twoTxTwoObj", "twoObj", "twoColTx"],
        SlideKind::Conclusion => &[],
    }
}

/// Whole words that identify a suitable layout by its display name.
fn name_keywords(kind: SlideKind) -> &'static [&'static str] {
    match kind {
        SlideKind::Title => &["title", "cover", "intro"],
        SlideKind::Section => &["section", "divider", "header", "chapter"],
        SlideKind::Content => &["content", "bullet", "bullets", "text", "list"],
        SlideKind::Comparison => &["two", "comparison", "column", "columns", "vs"],
        SlideKind::Conclusion => &["conclusion", "thank", "thanks", "end", "summary"],
    }
}

/// Pick the layout for `kind`.
///
/// Tries the layout type, then the layout name, then a fixed index, so the
/// same template and kind always give the same layout. Returns `None` only
/// when `layouts` is empty.
pub fn select_layout(kind: SlideKind, layouts: &[LayoutInfo]) -> Option<&LayoutInfo> {
    if layouts.is_empty() {
        return None;
    }

    for wanted in preferred_types(kind) {
        if let Some(layout) = layouts
            .iter()
            .find(|l| l.layout_type.as_deref() == Some(*wanted))
        {
            return Some(layout);
        }
    }

    let keywords = name_keywords(kind);
    if let Some(layout) = layouts.iter().find(|l| {
        let name = l.name.to_lowercase();
        name.split(|c: char| !c.is_alphanumeric())
            .any(|word| keywords.contains(&word))
    }) {
        return Some(layout);
    }

    let fallback = match kind {
        SlideKind::Title | SlideKind::Section | SlideKind::Conclusion => 0,
        SlideKind::Content | SlideKind::Comparison => 1.min(layouts.len() - 1),
    };
    layouts.get(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(index: usize, name: &str, layout_type: Option<&str>) -> LayoutInfo {
        LayoutInfo {
            index,
            name: name.to_string(),
            layout_type: layout_type.map(String::from),
            part_name: format!("ppt/slideLayouts/slideLayout{}.xml", index + 1),
            placeholders: Vec::new(),
        }
    }

    fn office_layouts() -> Vec<LayoutInfo> {
        vec![
            layout(0, "Title Slide", Some("title")),
            layout(1, "Title and Content", Some("obj")),
            layout(2, "Section Header", Some("secHead")),
            layout(3, "Two Content", Some("twoObj")),
            layout(4, "Comparison", Some("twoTxTwoObj")),
            layout(5, "Blank", Some("blank")),
        ]
    }

    #[test]
    fn test_select_by_type() {
        let layouts = office_layouts();
        let pick = |kind| select_layout(kind, &layouts).map(|l| l.index);
        assert_eq!(pick(SlideKind::Title), Some(0));
        assert_eq!(pick(SlideKind::Content), Some(1));
        assert_eq!(pick(SlideKind::Section), Some(2));
        // twoTxTwoObj outranks twoObj
        assert_eq!(pick(SlideKind::Comparison), Some(4));
    }

    #[test]
    fn test_select_by_name() {
        let layouts = vec![
            layout(0, "Cover", Some("cust")),
            layout(1, "Agenda", Some("cust")),
            layout(2, "Thank You", Some("cust")),
        ];
        assert_eq!(
            select_layout(SlideKind::Conclusion, &layouts).map(|l| l.index),
            Some(2)
        );
        assert_eq!(
            select_layout(SlideKind::Title, &layouts).map(|l| l.index),
            Some(0)
        );
    }

    #[test]
    fn test_name_match_needs_whole_word() {
        let layouts = vec![
            layout(0, "Legend", Some("cust")),
            layout(1, "Appendix", Some("cust")),
            layout(2, "Agenda", Some("cust")),
            layout(3, "The End", Some("cust")),
        ];
        assert_eq!(
            select_layout(SlideKind::Conclusion, &layouts).map(|l| l.index),
            Some(3)
        );

        // no whole-word match falls back to the first layout
        let layouts = vec![
            layout(0, "Opening", Some("cust")),
            layout(1, "Legend", Some("cust")),
            layout(2, "Appendix", Some("cust")),
        ];
        assert_eq!(
            select_layout(SlideKind::Conclusion, &layouts).map(|l| l.index),
            Some(0)
        );

        let layouts = vec![
            layout(0, "Cover", Some("cust")),
            layout(1, "Two-Column Layout", Some("cust")),
        ];
        assert_eq!(
            select_layout(SlideKind::Comparison, &layouts).map(|l| l.index),
            Some(1)
        );
    }

    #[test]
    fn test_select_fallback() {
        let layouts = vec![layout(0, "Alpha", None), layout(1, "Beta", None)];
        assert_eq!(
            select_layout(SlideKind::Content, &layouts).map(|l| l.index),
            Some(1)
        );
        assert_eq!(
            select_layout(SlideKind::Conclusion, &layouts).map(|l| l.index),
            Some(0)
        );

        let single = vec![layout(0, "Only", None)];
        assert_eq!(
            select_layout(SlideKind::Comparison, &single).map(|l| l.index),
            Some(0)
        );
        assert!(select_layout(SlideKind::Title, &[]).is_none());
    }

    #[test]
    fn test_select_is_deterministic() {
        let layouts = office_layouts();
        for kind in SlideKind::ALL {
            let first = select_layout(kind, &layouts).map(|l| l.index);
            let second = select_layout(kind, &layouts).map(|l| l.index);
            assert_eq!(first, second);
        }
    }
}

//! Keyword overlap scoring, used to decide whether a template picture
//! belongs on a generated slide.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Runs of letters and digits.
static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Words too common to signal relevance.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "will", "have",
    "has", "had", "not", "but", "you", "your", "our", "their", "its", "into", "over", "than",
    "then", "them", "they", "there", "these", "those", "what", "when", "where", "which", "who",
    "why", "how", "all", "any", "can", "each", "more", "most", "other", "some", "such", "only",
    "own", "same", "too", "very", "just", "also", "about", "after", "before", "slide", "picture",
    "image", "placeholder",
];

/// Minimum word length considered a keyword.
const MIN_KEYWORD_LEN: usize = 3;

/// Normalize a string for comparison purposes.
///
/// Applies NFKC, lowercases, drops punctuation and collapses whitespace.
pub fn normalize_for_comparison(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    WORD_REGEX
        .find_iter(&folded)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinct significant words of `text`.
pub fn keywords(text: &str) -> HashSet<String> {
    normalize_for_comparison(text)
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the keyword sets, from 0.0 (disjoint) to 1.0.
pub fn keyword_overlap(a: &str, b: &str) -> f64 {
    let words_a = keywords(a);
    let words_b = keywords(b);

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;

    intersection / union
}

/// Picks the most relevant candidate text for a query.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    /// Minimum overlap for a candidate to count as relevant.
    threshold: f64,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl KeywordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum overlap score.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Best `(index, score)` among candidates scoring at least the threshold.
    ///
    /// Ties go to the earliest candidate. A zero score never matches.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<(usize, f64)>
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut best: Option<(usize, f64)> = None;
        for (index, text) in candidates {
            let score = keyword_overlap(query, text);
            if score <= 0.0 || score < self.threshold {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_for_comparison() {
        assert_eq!(normalize_for_comparison("Q1 Sales grew 20%!"), "q1 sales grew 20");
        assert_eq!(
            normalize_for_comparison("  Product   Launch  "),
            "product launch"
        );
        // NFKC folds compatibility forms.
        assert_eq!(normalize_for_comparison("ﬁnance"), "finance");
    }

    #[test]
    fn test_keywords_filters_noise() {
        let words = keywords("The sales team and the new product, 2024");
        assert!(words.contains("sales"));
        assert!(words.contains("team"));
        assert!(words.contains("product"));
        assert!(!words.contains("the"));
        assert!(!words.contains("and"));
        assert!(!words.contains("2024"));
    }

    #[test]
    fn test_keyword_overlap() {
        assert_eq!(keyword_overlap("sales growth", "growth sales"), 1.0);
        let partial = keyword_overlap("sales growth", "sales decline");
        assert!(partial > 0.0 && partial < 1.0);
        assert_eq!(keyword_overlap("sales growth", "team offsite"), 0.0);
        assert_eq!(keyword_overlap("", "team offsite"), 0.0);
    }

    #[test]
    fn test_best_match_picks_highest_score() {
        let matcher = KeywordMatcher::new();
        let candidates = [
            "company logo",
            "product launch rocket",
            "product launch rocket timeline",
        ];
        let found = matcher.best_match(
            "New product launch",
            candidates.iter().enumerate().map(|(i, c)| (i, *c)),
        );
        assert_eq!(found.map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_best_match_respects_threshold() {
        let matcher = KeywordMatcher::new().with_threshold(0.9);
        let found = matcher.best_match("sales growth team", [(0, "sales chart")]);
        assert!(found.is_none());

        let matcher = KeywordMatcher::new();
        assert!(matcher.best_match("sales", [(0, "weather map")]).is_none());
    }
}

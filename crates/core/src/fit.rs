//! Text fitting: shrink the font in fixed steps until the text fits its
//! frame, and truncate with an ellipsis once the floor size is reached.
//!
//! Capacity is estimated from the frame size alone: a character is half the
//! font size wide and a line is 1.2 times the font size tall. Each paragraph
//! starts on a new line.

use crate::style::Frame;

/// Marker appended to cut text.
pub const ELLIPSIS: char = '\u{2026}';

/// Average glyph width as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.5;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Default left+right text inset (0.1in each side), in points.
const HORIZONTAL_INSET_PT: f64 = 14.4;

/// Default top+bottom text inset (0.05in each side), in points.
const VERTICAL_INSET_PT: f64 = 7.2;

/// Cut `text` to at most `max_chars` characters, ending in [`ELLIPSIS`] when cut.
///
/// Applying it twice gives the same result as applying it once.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max_chars - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

/// Paragraphs and the font size they fit at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedText {
    pub paragraphs: Vec<String>,
    /// Font size in whole points.
    pub font_pt: u32,
}

impl FittedText {
    /// Font size in hundredths of a point, as `a:rPr@sz` expects.
    pub fn size_hundredths(&self) -> u32 {
        self.font_pt * 100
    }
}

/// Step-down font fitting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFitter {
    start_pt: u32,
    step_pt: u32,
    floor_pt: u32,
}

impl TextFitter {
    /// Create a fitter that tries sizes from `start_pt` down to `floor_pt`.
    pub fn new(start_pt: u32, floor_pt: u32) -> Self {
        let floor_pt = floor_pt.max(1);
        Self {
            start_pt: start_pt.max(floor_pt),
            step_pt: 2,
            floor_pt,
        }
    }

    /// Set the decrement between attempts.
    pub fn with_step(mut self, step_pt: u32) -> Self {
        self.step_pt = step_pt.max(1);
        self
    }

    /// Policy for slide titles: 40pt down to 20pt.
    pub fn title() -> Self {
        Self::new(40, 20)
    }

    /// Policy for bullet text: 28pt down to 12pt.
    pub fn body() -> Self {
        Self::new(28, 12)
    }

    pub fn floor_pt(&self) -> u32 {
        self.floor_pt
    }

    /// Fit paragraphs into `frame`.
    ///
    /// Returns the largest size at which the text fits. When nothing fits at
    /// the floor, the text is truncated to the floor capacity and the size
    /// search is repeated on the truncated text, so re-fitting a result
    /// returns it unchanged.
    pub fn fit(&self, paragraphs: &[String], frame: &Frame) -> FittedText {
        if let Some(font_pt) = self.largest_fitting(paragraphs, frame) {
            return FittedText {
                paragraphs: paragraphs.to_vec(),
                font_pt,
            };
        }

        let truncated = self.truncate_to_fit(paragraphs, frame);
        log::debug!(
            "Truncated {} paragraph(s) to {} at {}pt",
            paragraphs.len(),
            truncated.len(),
            self.floor_pt
        );
        let font_pt = self
            .largest_fitting(&truncated, frame)
            .unwrap_or(self.floor_pt);
        FittedText {
            paragraphs: truncated,
            font_pt,
        }
    }

    /// Whether the paragraphs fit `frame` at `font_pt`.
    pub fn fits(&self, paragraphs: &[String], frame: &Frame, font_pt: u32) -> bool {
        let (chars_per_line, max_lines) = capacity(frame, font_pt);
        if paragraphs.is_empty() {
            return true;
        }
        if chars_per_line == 0 {
            return false;
        }
        let needed: usize = paragraphs
            .iter()
            .map(|p| lines_needed(p.chars().count(), chars_per_line))
            .sum();
        needed <= max_lines
    }

    fn largest_fitting(&self, paragraphs: &[String], frame: &Frame) -> Option<u32> {
        let mut size = self.start_pt;
        loop {
            if self.fits(paragraphs, frame, size) {
                return Some(size);
            }
            if size <= self.floor_pt {
                return None;
            }
            size = size.saturating_sub(self.step_pt).max(self.floor_pt);
        }
    }

    /// Keep whole paragraphs while they fit at the floor size, cut the first
    /// one that does not, and drop the rest.
    fn truncate_to_fit(&self, paragraphs: &[String], frame: &Frame) -> Vec<String> {
        let (chars_per_line, max_lines) = capacity(frame, self.floor_pt);
        if chars_per_line == 0 || max_lines == 0 {
            return Vec::new();
        }

        let mut kept: Vec<String> = Vec::new();
        let mut used = 0;
        for paragraph in paragraphs {
            let len = paragraph.chars().count();
            let needed = lines_needed(len, chars_per_line);
            if used + needed <= max_lines {
                kept.push(paragraph.clone());
                used += needed;
                continue;
            }

            let remaining = max_lines - used;
            if remaining > 0 {
                let budget = remaining * chars_per_line;
                kept.push(truncate_chars(paragraph, budget.min(len)));
            } else if let Some(last) = kept.last_mut() {
                mark_continued(last, chars_per_line);
            }
            break;
        }
        kept
    }
}

/// End a kept paragraph with an ellipsis without growing its line count.
fn mark_continued(paragraph: &mut String, chars_per_line: usize) {
    if paragraph.ends_with(ELLIPSIS) {
        return;
    }
    paragraph.truncate(paragraph.trim_end().len());
    let len = paragraph.chars().count();
    let room = lines_needed(len, chars_per_line) * chars_per_line;
    if len >= room {
        paragraph.pop();
    }
    paragraph.push(ELLIPSIS);
}

/// `(chars per line, lines)` for a frame at the given font size.
fn capacity(frame: &Frame, font_pt: u32) -> (usize, usize) {
    let size = f64::from(font_pt.max(1));
    let width = (frame.width_pt() - HORIZONTAL_INSET_PT).max(0.0);
    let height = (frame.height_pt() - VERTICAL_INSET_PT).max(0.0);
    let chars_per_line = (width / (size * CHAR_WIDTH_FACTOR)).floor() as usize;
    let lines = (height / (size * LINE_HEIGHT_FACTOR)).floor() as usize;
    (chars_per_line, lines)
}

fn lines_needed(chars: usize, chars_per_line: usize) -> usize {
    chars.div_ceil(chars_per_line).max(1)
}

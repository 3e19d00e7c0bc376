//! Line breaking for headless block height estimation

use crate::layout::font::FontMetrics;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Estimates how many lines a run of text occupies at a given width
#[derive(Debug, Clone, Default)]
pub struct LineBreaker {
    metrics: FontMetrics,
}

impl LineBreaker {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    /// Number of lines `text` wraps to at `max_width`. Empty text still
    /// occupies one line.
    pub fn line_count(&self, text: &str, max_width: f32) -> usize {
        if text.is_empty() {
            return 1;
        }

        let max_width = max_width.max(self.metrics.fallback_advance);
        let mut lines = 1;
        let mut x: f32 = 0.0;
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            // Trailing spaces may hang past the edge
            let visible = self.text_width(segment.trim_end());
            let advance = self.text_width(segment);

            if x > 0.0 && x + visible > max_width {
                lines += 1;
                x = 0.0;
            }

            if visible > max_width {
                // Unbreakable run wider than the line: emergency breaks
                let extra = (visible / max_width).ceil() as usize - 1;
                lines += extra;
                x = visible - extra as f32 * max_width;
            } else {
                x += advance;
            }

            if opportunity == BreakOpportunity::Mandatory && end < text.len() {
                lines += 1;
                x = 0.0;
            }
        }

        lines
    }

    /// Height of `text` wrapped at `max_width`
    pub fn text_height(&self, text: &str, max_width: f32) -> f32 {
        self.line_count(text, max_width) as f32 * self.metrics.line_height
    }

    /// Advance width of a string, control characters excluded
    pub fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|grapheme| {
                if grapheme == "\t" {
                    self.metrics.fallback_advance * 4.0
                } else if grapheme.chars().all(|c| c.is_control()) {
                    0.0
                } else {
                    grapheme.chars().map(|c| self.metrics.advance(c)).sum()
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> LineBreaker {
        // 8px per char, 10px lines
        LineBreaker::new(FontMetrics::uniform(10.0, 8.0))
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(breaker().line_count("", 100.0), 1);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(breaker().line_count("Hello", 100.0), 1);
        assert_eq!(breaker().text_width("Hello"), 40.0);
    }

    #[test]
    fn test_line_wrap() {
        // 40px width = 5 chars per line
        assert_eq!(breaker().line_count("Hello World", 40.0), 2);
        assert_eq!(breaker().text_height("Hello World", 40.0), 20.0);
    }

    #[test]
    fn test_explicit_newline() {
        assert_eq!(breaker().line_count("Hello\nWorld", 1000.0), 2);
        // Trailing newline does not open a new line
        assert_eq!(breaker().line_count("Hello\n", 1000.0), 1);
    }

    #[test]
    fn test_long_word_emergency_break() {
        // 20 chars * 8px = 160px at 40px per line
        assert_eq!(breaker().line_count("abcdefghijklmnopqrst", 40.0), 4);
    }
}

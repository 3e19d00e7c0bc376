//! Font metrics for headless text measurement

/// Advance widths and line height of the body font
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub line_height: f32,
    /// Advances indexed by ASCII code point
    pub ascii_advances: Vec<f32>,
    /// Advance for everything outside ASCII
    pub fallback_advance: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 18px body text at 1.7 line height, average glyph ~0.5em
        Self::uniform(30.6, 9.0)
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, ascii_advances: Vec<f32>, fallback_advance: f32) -> Self {
        Self {
            line_height,
            ascii_advances,
            fallback_advance,
        }
    }

    /// Every character has the same advance
    pub fn uniform(line_height: f32, advance: f32) -> Self {
        Self::new(line_height, vec![advance; 128], advance)
    }

    pub fn advance(&self, c: char) -> f32 {
        Some(c)
            .filter(char::is_ascii)
            .and_then(|c| self.ascii_advances.get(c as usize))
            .copied()
            .unwrap_or(self.fallback_advance)
    }
}

//! Reader configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// What the reader does when the canonical content reports a mutation batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationPolicy {
    /// Re-render the visible pages against the existing pagination.
    /// Page boundaries can drift after heavy highlighting.
    #[default]
    RefreshVisible,
    /// Re-measure and re-paginate on every batch
    Repaginate,
}

/// Tunables for geometry, input and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderConfig {
    /// Vertical space taken by header, back-link, page counter and book padding
    pub chrome_allowance: f32,
    /// Floor for the page height budget
    pub min_page_height: f32,
    /// Viewports at most this wide use single-page mode
    pub single_page_breakpoint: f32,
    /// Maximum width of the two-page spread
    pub spread_max_width: f32,
    /// Horizontal viewport padding (both sides together)
    pub viewport_gutter: f32,
    /// Width of the spine between the two pages of a spread
    pub spine_width: f32,
    /// Horizontal padding inside one spread page (both sides together)
    pub page_padding: f32,
    /// Minimum horizontal travel for a touch swipe
    pub swipe_threshold: f32,
    pub resize_debounce_ms: u32,
    /// Fixed delay used by the legacy grace-period activation
    pub startup_grace_ms: u32,
    /// Fallback completion when no transition-end signal arrives
    pub flip_timeout_ms: u32,
    pub mutation_policy: MutationPolicy,
    /// Element id of the auxiliary panel that captures keyboard and touch input
    pub aux_panel_id: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            // header 73 + back-link 44 + counter 48 + book padding 48 + 24
            chrome_allowance: 237.0,
            min_page_height: 300.0,
            single_page_breakpoint: 768.0,
            spread_max_width: 900.0,
            viewport_gutter: 48.0,
            spine_width: 2.0,
            page_padding: 48.0,
            swipe_threshold: 50.0,
            resize_debounce_ms: 250,
            startup_grace_ms: 150,
            flip_timeout_ms: 1200,
            mutation_policy: MutationPolicy::RefreshVisible,
            aux_panel_id: "notepad-panel".to_string(),
        }
    }
}

impl ReaderConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break pagination or input routing
    pub fn validate(&self) -> Result<()> {
        if !self.min_page_height.is_finite() || self.min_page_height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minPageHeight must be positive, got {}",
                self.min_page_height
            )));
        }

        let non_negative = [
            ("chromeAllowance", self.chrome_allowance),
            ("singlePageBreakpoint", self.single_page_breakpoint),
            ("spreadMaxWidth", self.spread_max_width),
            ("viewportGutter", self.viewport_gutter),
            ("spineWidth", self.spine_width),
            ("pagePadding", self.page_padding),
            ("swipeThreshold", self.swipe_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(())
    }
}

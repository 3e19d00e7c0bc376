//! Viewport geometry and page budgets

use crate::config::ReaderConfig;
use serde::{Deserialize, Serialize};

/// Environment inputs the reader depends on
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// User prefers reduced motion
    pub reduced_motion: bool,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            reduced_motion: false,
        }
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// How many pages are visible at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    /// One page, narrow viewports
    Single,
    /// Two facing pages
    #[default]
    Spread,
}

impl DisplayMode {
    pub fn for_width(width: f32, config: &ReaderConfig) -> Self {
        if finite_or_zero(width) <= config.single_page_breakpoint {
            DisplayMode::Single
        } else {
            DisplayMode::Spread
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, DisplayMode::Single)
    }
}

/// Page budgets derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub mode: DisplayMode,
    /// Width of one page's content area, used to measure at the right width
    pub page_width: f32,
    /// Height budget for one page, never below the configured floor
    pub page_height: f32,
}

impl PageGeometry {
    pub fn from_viewport(viewport: &Viewport, config: &ReaderConfig) -> Self {
        let width = finite_or_zero(viewport.width);
        let height = finite_or_zero(viewport.height);
        let mode = DisplayMode::for_width(width, config);

        let page_width = match mode {
            DisplayMode::Single => width - config.viewport_gutter,
            DisplayMode::Spread => {
                let spread = config.spread_max_width.min(width - config.viewport_gutter);
                spread / 2.0 - config.spine_width - config.page_padding
            }
        };

        Self {
            mode,
            page_width: page_width.max(1.0),
            page_height: (height - config.chrome_allowance).max(config.min_page_height),
        }
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_geometry() {
        let config = ReaderConfig::default();
        let geometry = PageGeometry::from_viewport(&Viewport::new(1280.0, 900.0), &config);

        assert_eq!(geometry.mode, DisplayMode::Spread);
        assert_eq!(geometry.page_height, 663.0); // 900 - 237
        assert_eq!(geometry.page_width, 400.0); // 900 / 2 - 2 - 48
    }

    #[test]
    fn test_single_geometry() {
        let config = ReaderConfig::default();
        let geometry = PageGeometry::from_viewport(&Viewport::new(768.0, 1000.0), &config);

        assert_eq!(geometry.mode, DisplayMode::Single);
        assert_eq!(geometry.page_width, 720.0);
    }

    #[test]
    fn test_narrow_spread_uses_viewport() {
        let config = ReaderConfig::default();
        let geometry = PageGeometry::from_viewport(&Viewport::new(848.0, 900.0), &config);
        assert_eq!(geometry.page_width, 350.0); // (848 - 48) / 2 - 50
    }

    #[test]
    fn test_height_floor() {
        let config = ReaderConfig::default();
        for height in [0.0, 100.0, -50.0, f32::NAN, f32::NEG_INFINITY] {
            let geometry = PageGeometry::from_viewport(&Viewport::new(1024.0, height), &config);
            assert_eq!(geometry.page_height, 300.0);
        }
    }

    #[test]
    fn test_degenerate_width() {
        let config = ReaderConfig::default();
        let geometry = PageGeometry::from_viewport(&Viewport::new(f32::NAN, 800.0), &config);
        assert_eq!(geometry.mode, DisplayMode::Single);
        assert_eq!(geometry.page_width, 1.0);
    }
}

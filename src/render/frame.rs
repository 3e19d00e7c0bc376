//! Render frames: what the visible page slots should show

use crate::content::CanonicalContent;
use crate::layout::{DisplayMode, Pagination};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content of one page slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Face {
    /// Slot not shown (left slot in single-page mode)
    Hidden,
    /// Shown but empty: the absent cover facing page 0 of a spread
    Blank,
    /// Markup of one page
    Page { index: usize, html: String },
}

impl Face {
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Face::Page { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Human-readable position, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatus {
    pub current: usize,
    pub total: usize,
}

impl PageStatus {
    pub fn new(current_index: usize, total: usize) -> Self {
        Self {
            current: current_index + 1,
            total,
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page {} of {}", self.current, self.total)
    }
}

/// Everything the display needs for one (pages, index, mode) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub mode: DisplayMode,
    pub left: Face,
    pub right: Face,
    pub status: PageStatus,
}

/// Builds frames by cloning block markup out of the canonical content
#[derive(Debug, Default, Clone, Copy)]
pub struct PageRenderer;

impl PageRenderer {
    /// Concatenated markup of every block on a page. Out of range is empty.
    pub fn page_html(pagination: &Pagination, content: &CanonicalContent, index: usize) -> String {
        let Some(page) = pagination.page(index) else {
            return String::new();
        };

        let mut html = String::new();
        for &id in page.blocks() {
            html.push_str(content.html(id));
        }
        html
    }

    /// Frame for the visible pages.
    ///
    /// Single-page mode shows `pages[current]` alone. A spread shows
    /// `pages[current - 1]` on the left (blank at index 0) and
    /// `pages[current]` on the right.
    pub fn frame(
        pagination: &Pagination,
        content: &CanonicalContent,
        current: usize,
        mode: DisplayMode,
    ) -> RenderFrame {
        let page = |index: usize| Face::Page {
            index,
            html: Self::page_html(pagination, content, index),
        };

        let left = match mode {
            DisplayMode::Single => Face::Hidden,
            DisplayMode::Spread if current == 0 => Face::Blank,
            DisplayMode::Spread => page(current - 1),
        };

        RenderFrame {
            mode,
            left,
            right: page(current),
            status: PageStatus::new(current, pagination.len()),
        }
    }
}

//! Input routing: keyboard, click zones and swipes to navigation intents

use crate::layout::DisplayMode;
use crate::{Point, Rect};

/// Navigation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Prev,
}

/// Keys the reader cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowDown,
    PageDown,
    Space,
    ArrowLeft,
    ArrowUp,
    PageUp,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowRight" => Key::ArrowRight,
            "ArrowDown" => Key::ArrowDown,
            "PageDown" => Key::PageDown,
            " " | "Spacebar" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowUp" => Key::ArrowUp,
            "PageUp" => Key::PageUp,
            _ => Key::Other,
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        match self {
            Key::ArrowRight | Key::ArrowDown | Key::PageDown | Key::Space => Some(Intent::Next),
            Key::ArrowLeft | Key::ArrowUp | Key::PageUp => Some(Intent::Prev),
            Key::Other => None,
        }
    }
}

/// Where keyboard focus is when a key arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusContext {
    /// Event target is a text-entry field
    pub in_text_entry: bool,
    /// Event target is inside an open auxiliary panel
    pub in_open_panel: bool,
}

impl FocusContext {
    pub fn is_captured(&self) -> bool {
        self.in_text_entry || self.in_open_panel
    }
}

/// Intent for a key press; the caller prevents the default action
/// whenever this returns `Some`.
pub fn route_key(key: Key, focus: FocusContext) -> Option<Intent> {
    if focus.is_captured() {
        return None;
    }
    key.intent()
}

/// Intent for a click at `point` on the reading surface.
/// Left half goes back, right half forward. Single-page mode uses the
/// dedicated controls instead, and clicks outside the surface are ignored.
pub fn route_click(point: Point, surface: Rect, mode: DisplayMode) -> Option<Intent> {
    if mode.is_single() || !surface.contains_point(point) {
        return None;
    }

    let mid_x = surface.x + surface.width / 2.0;
    if point.x < mid_x {
        Some(Intent::Prev)
    } else {
        Some(Intent::Next)
    }
}

/// Recognizes horizontal swipes between touch start and touch end
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start: Option<Point>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn touch_start(&mut self, point: Point) {
        self.start = Some(point);
    }

    /// Classify the gesture ending at `point`.
    ///
    /// The horizontal travel must exceed the threshold and must not be
    /// smaller than the vertical travel (that is a scroll). Swiping left
    /// goes forward.
    pub fn touch_end(&mut self, point: Point, panel_open: bool) -> Option<Intent> {
        let start = self.start.take()?;
        if panel_open {
            return None;
        }

        let dx = point.x - start.x;
        let dy = point.y - start.y;

        if dx.abs() <= self.threshold || dy.abs() > dx.abs() {
            return None;
        }

        if dx < 0.0 {
            Some(Intent::Next)
        } else {
            Some(Intent::Prev)
        }
    }
}

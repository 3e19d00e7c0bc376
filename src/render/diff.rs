//! Render diff protocol: minimal writes between presented frames

use crate::error::Result;
use crate::render::{Face, PageStatus, RenderFrame};
use serde::{Deserialize, Serialize};

/// A visible page slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Left,
    Right,
}

/// A single patch operation for the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPatch {
    /// Replace a slot's content
    ShowFace { slot: Slot, face: Face },
    /// Publish the page status to the visible counter and the announcer
    SetStatus(PageStatus),
    /// Re-register icon placeholders inside freshly inserted markup
    RefreshIcons,
}

/// Patches needed to move the display from one frame to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDiff {
    pub patches: Vec<RenderPatch>,
}

impl RenderDiff {
    /// Compare against the previously presented frame. No previous frame
    /// means a full redraw.
    pub fn between(previous: Option<&RenderFrame>, next: &RenderFrame) -> Self {
        let mut diff = Self::default();

        let faces = [(Slot::Left, &next.left), (Slot::Right, &next.right)];
        for (slot, face) in faces {
            let old = previous.map(|frame| match slot {
                Slot::Left => &frame.left,
                Slot::Right => &frame.right,
            });
            if old != Some(face) {
                diff.patches.push(RenderPatch::ShowFace {
                    slot,
                    face: face.clone(),
                });
            }
        }

        let faces_changed = diff.has_patches();

        if previous.map(|frame| frame.status) != Some(next.status) {
            diff.patches.push(RenderPatch::SetStatus(next.status));
        }

        if faces_changed {
            diff.patches.push(RenderPatch::RefreshIcons);
        }

        diff
    }

    pub fn has_patches(&self) -> bool {
        !self.patches.is_empty()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

/// Display side of the page renderer
pub trait RenderSink {
    fn apply(&mut self, patch: &RenderPatch) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DisplayMode;

    fn frame(left: Face, right_html: &str, current: usize) -> RenderFrame {
        RenderFrame {
            mode: DisplayMode::Spread,
            left,
            right: Face::Page {
                index: current,
                html: right_html.into(),
            },
            status: PageStatus::new(current, 3),
        }
    }

    #[test]
    fn test_full_redraw_without_previous() {
        let next = frame(Face::Blank, "<p>a</p>", 0);
        let diff = RenderDiff::between(None, &next);

        assert_eq!(diff.patch_count(), 4);
        assert_eq!(
            diff.patches[0],
            RenderPatch::ShowFace {
                slot: Slot::Left,
                face: Face::Blank
            }
        );
        assert_eq!(diff.patches[2], RenderPatch::SetStatus(next.status));
        assert_eq!(diff.patches[3], RenderPatch::RefreshIcons);
    }

    #[test]
    fn test_identical_frames_no_patches() {
        let next = frame(Face::Blank, "<p>a</p>", 0);
        let diff = RenderDiff::between(Some(&next.clone()), &next);
        assert!(!diff.has_patches());
    }

    #[test]
    fn test_highlight_only_touches_changed_slot() {
        let previous = frame(Face::Blank, "<p>a</p>", 0);
        let next = frame(Face::Blank, "<p><mark>a</mark></p>", 0);
        let diff = RenderDiff::between(Some(&previous), &next);

        assert_eq!(diff.patch_count(), 2);
        assert!(matches!(
            diff.patches[0],
            RenderPatch::ShowFace {
                slot: Slot::Right,
                ..
            }
        ));
        assert_eq!(diff.patches[1], RenderPatch::RefreshIcons);
    }
}

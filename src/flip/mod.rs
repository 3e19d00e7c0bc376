//! Flip controller: the page-turn state machine
//!
//! A turn is `Idle -> Animating(transition) -> Idle`. The transition is
//! created when a navigation intent is accepted and dropped on completion;
//! while it exists, every other intent is dropped.

use crate::error::Result;
use crate::render::Slot;

/// Direction of a page turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Right page turns over to the left
    Forward,
    /// Left page turns back to the right
    Backward,
}

impl FlipDirection {
    /// Rotation about the vertical axis when the surface first appears
    pub fn start_angle(&self) -> f32 {
        match self {
            FlipDirection::Forward => 0.0,
            FlipDirection::Backward => 180.0,
        }
    }

    /// Rotation the surface animates to
    pub fn end_angle(&self) -> f32 {
        match self {
            FlipDirection::Forward => -180.0,
            FlipDirection::Backward => 0.0,
        }
    }

    /// Slot the flip surface sits over and hides during the turn
    pub fn covered_slot(&self) -> Slot {
        match self {
            FlipDirection::Forward => Slot::Right,
            FlipDirection::Backward => Slot::Left,
        }
    }
}

/// One in-flight page turn
#[derive(Debug, Clone, PartialEq)]
pub struct FlipTransition {
    pub direction: FlipDirection,
    pub from_page: usize,
    pub to_page: usize,
    pub front_html: String,
    pub back_html: String,
}

/// Explicit turn state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FlipState {
    #[default]
    Idle,
    Animating(FlipTransition),
}

/// Display side of a page turn
pub trait FlipSurface {
    /// Fill the transient surface's faces from `transition`, place it over
    /// the covered slot, hide that slot and start the rotation. The display
    /// signals completion at least once; the session ignores repeats.
    fn begin_flip(&mut self, transition: &FlipTransition) -> Result<()>;

    /// Discard the transient surface and unhide the covered slot
    fn end_flip(&mut self, direction: FlipDirection);
}

/// Owner of the flip state; its methods are the only transitions
#[derive(Debug, Default)]
pub struct FlipController {
    state: FlipState,
}

impl FlipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FlipState {
        &self.state
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, FlipState::Animating(_))
    }

    pub fn transition(&self) -> Option<&FlipTransition> {
        match &self.state {
            FlipState::Animating(transition) => Some(transition),
            FlipState::Idle => None,
        }
    }

    /// Accept a turn from `current` if idle and the target page exists.
    ///
    /// `page_html` renders one page. Forward turns show the current page on
    /// the front face and the next page on the back; backward turns show the
    /// previous page on the front and the current page on the back.
    pub fn start<F>(
        &mut self,
        direction: FlipDirection,
        current: usize,
        page_count: usize,
        page_html: F,
    ) -> Option<&FlipTransition>
    where
        F: Fn(usize) -> String,
    {
        if self.is_animating() {
            return None;
        }

        let target = match direction {
            FlipDirection::Forward => current.checked_add(1).filter(|&next| next < page_count),
            FlipDirection::Backward => current.checked_sub(1),
        };
        let Some(target) = target.filter(|_| current < page_count) else {
            log::debug!("flip {direction:?} from page {current} out of range");
            return None;
        };

        let (front, back) = match direction {
            FlipDirection::Forward => (current, target),
            FlipDirection::Backward => (target, current),
        };

        self.state = FlipState::Animating(FlipTransition {
            direction,
            from_page: current,
            to_page: target,
            front_html: page_html(front),
            back_html: page_html(back),
        });
        self.transition()
    }

    /// Finish the running turn, returning it. No-op when idle.
    pub fn complete(&mut self) -> Option<FlipTransition> {
        match std::mem::take(&mut self.state) {
            FlipState::Animating(transition) => Some(transition),
            FlipState::Idle => None,
        }
    }

    /// Drop the running turn without committing it
    pub fn abort(&mut self) -> Option<FlipDirection> {
        self.complete().map(|transition| transition.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(index: usize) -> String {
        format!("<p>page {index}</p>")
    }

    #[test]
    fn test_forward_faces() {
        let mut flip = FlipController::new();
        let transition = flip.start(FlipDirection::Forward, 1, 3, html).unwrap();

        assert_eq!(transition.to_page, 2);
        assert_eq!(transition.front_html, "<p>page 1</p>");
        assert_eq!(transition.back_html, "<p>page 2</p>");
        assert!(flip.is_animating());
    }

    #[test]
    fn test_backward_faces() {
        let mut flip = FlipController::new();
        let transition = flip.start(FlipDirection::Backward, 2, 3, html).unwrap();

        assert_eq!(transition.to_page, 1);
        assert_eq!(transition.front_html, "<p>page 1</p>");
        assert_eq!(transition.back_html, "<p>page 2</p>");
    }

    #[test]
    fn test_out_of_range_stays_idle() {
        let mut flip = FlipController::new();
        assert!(flip.start(FlipDirection::Forward, 2, 3, html).is_none());
        assert!(flip.start(FlipDirection::Backward, 0, 3, html).is_none());
        assert!(flip.start(FlipDirection::Forward, 7, 3, html).is_none());
        assert_eq!(flip.state(), &FlipState::Idle);
    }

    #[test]
    fn test_busy_rejects_second_start() {
        let mut flip = FlipController::new();
        flip.start(FlipDirection::Forward, 0, 3, html);
        assert!(flip.start(FlipDirection::Backward, 1, 3, html).is_none());
        assert_eq!(flip.transition().unwrap().direction, FlipDirection::Forward);
    }

    #[test]
    fn test_complete_once() {
        let mut flip = FlipController::new();
        flip.start(FlipDirection::Forward, 0, 2, html);

        assert_eq!(flip.complete().unwrap().to_page, 1);
        assert!(flip.complete().is_none());
        assert!(!flip.is_animating());
    }

    #[test]
    fn test_angles() {
        assert_eq!(FlipDirection::Forward.start_angle(), 0.0);
        assert_eq!(FlipDirection::Forward.end_angle(), -180.0);
        assert_eq!(FlipDirection::Backward.start_angle(), 180.0);
        assert_eq!(FlipDirection::Backward.covered_slot(), Slot::Left);
    }
}

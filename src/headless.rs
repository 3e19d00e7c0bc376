//! Headless display: runs the reader without a browser
//!
//! Heights come either from text metrics (line breaking the block's plain
//! text) or from a fixed list. Render patches and flip surface calls are
//! applied to in-memory slots so callers can inspect what a browser would
//! show.

use crate::content::{plain_text, CanonicalContent};
use crate::error::{Error, Result};
use crate::flip::{FlipDirection, FlipSurface, FlipTransition};
use crate::layout::{BlockMetrics, FontMetrics, LineBreaker, MeasureSurface, PresentationState};
use crate::render::{Face, RenderPatch, RenderSink, Slot};

/// Where block heights come from
#[derive(Debug, Clone)]
pub enum HeightSource {
    /// Estimate from text at the measured width
    Text {
        breaker: LineBreaker,
        block_margin: f32,
    },
    /// One height per block, in document order
    Fixed(Vec<f32>),
}

/// In-memory stand-in for the book DOM
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    heights: HeightSource,
    presentation: PresentationState,
    layout_width: Option<f32>,
    measure_passes: usize,
    left: Face,
    right: Face,
    counter: String,
    announcer: String,
    icon_refreshes: usize,
    flip_surface: Option<FlipTransition>,
    hidden_slot: Option<Slot>,
    flips_begun: usize,
    fail_next_flip: bool,
}

impl HeadlessDisplay {
    /// Text-metric measurement with the given font and bottom margin per block
    pub fn new(metrics: FontMetrics, block_margin: f32) -> Self {
        Self::with_source(HeightSource::Text {
            breaker: LineBreaker::new(metrics),
            block_margin,
        })
    }

    /// Fixed heights, one per block
    pub fn with_heights(heights: Vec<f32>) -> Self {
        Self::with_source(HeightSource::Fixed(heights))
    }

    fn with_source(heights: HeightSource) -> Self {
        Self {
            heights,
            presentation: PresentationState::default(),
            layout_width: None,
            measure_passes: 0,
            left: Face::Hidden,
            right: Face::Hidden,
            counter: String::new(),
            announcer: String::new(),
            icon_refreshes: 0,
            flip_surface: None,
            hidden_slot: None,
            flips_begun: 0,
            fail_next_flip: false,
        }
    }

    /// Swap the fixed heights, e.g. after a simulated reflow
    pub fn set_heights(&mut self, heights: Vec<f32>) {
        self.heights = HeightSource::Fixed(heights);
    }

    /// Make the next `begin_flip` fail
    pub fn fail_next_flip(&mut self) {
        self.fail_next_flip = true;
    }

    pub fn left(&self) -> &Face {
        &self.left
    }

    pub fn right(&self) -> &Face {
        &self.right
    }

    /// Text of the visible page counter
    pub fn counter(&self) -> &str {
        &self.counter
    }

    /// Text of the assistive announcement region
    pub fn announcer(&self) -> &str {
        &self.announcer
    }

    pub fn icon_refreshes(&self) -> usize {
        self.icon_refreshes
    }

    pub fn measure_passes(&self) -> usize {
        self.measure_passes
    }

    /// Inline presentation of the content root
    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    /// The flip surface, while it is visible
    pub fn flip_surface(&self) -> Option<&FlipTransition> {
        self.flip_surface.as_ref()
    }

    pub fn hidden_slot(&self) -> Option<Slot> {
        self.hidden_slot
    }

    pub fn flips_begun(&self) -> usize {
        self.flips_begun
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new(FontMetrics::default(), 24.0)
    }
}

impl MeasureSurface for HeadlessDisplay {
    fn enter_layout_mode(&mut self, width: f32) -> Result<PresentationState> {
        let saved = std::mem::replace(
            &mut self.presentation,
            PresentationState {
                position: "absolute".into(),
                visibility: "hidden".into(),
                width: format!("{width}px"),
                height: "auto".into(),
                overflow: "visible".into(),
            },
        );
        self.layout_width = Some(width);
        Ok(saved)
    }

    fn restore_presentation(&mut self, saved: PresentationState) {
        self.presentation = saved;
        self.layout_width = None;
    }

    fn measure_blocks(&mut self, content: &CanonicalContent) -> Result<Vec<BlockMetrics>> {
        let width = self
            .layout_width
            .ok_or_else(|| Error::Dom("content root is not in layout mode".into()))?;
        self.measure_passes += 1;

        match &self.heights {
            HeightSource::Fixed(heights) => {
                if heights.len() != content.len() {
                    return Err(Error::ContentOutOfSync {
                        expected: content.len(),
                        found: heights.len(),
                    });
                }
                Ok(content
                    .ids()
                    .zip(heights)
                    .map(|(id, &height)| BlockMetrics::new(id, height, 0.0))
                    .collect())
            }
            HeightSource::Text {
                breaker,
                block_margin,
            } => Ok(content
                .blocks()
                .iter()
                .map(|block| {
                    let text = plain_text(&block.html);
                    BlockMetrics::new(block.id, breaker.text_height(&text, width), *block_margin)
                })
                .collect()),
        }
    }
}

impl RenderSink for HeadlessDisplay {
    fn apply(&mut self, patch: &RenderPatch) -> Result<()> {
        match patch {
            RenderPatch::ShowFace { slot, face } => match slot {
                Slot::Left => self.left = face.clone(),
                Slot::Right => self.right = face.clone(),
            },
            RenderPatch::SetStatus(status) => {
                self.counter = status.to_string();
                self.announcer = status.to_string();
            }
            RenderPatch::RefreshIcons => self.icon_refreshes += 1,
        }
        Ok(())
    }
}

impl FlipSurface for HeadlessDisplay {
    fn begin_flip(&mut self, transition: &FlipTransition) -> Result<()> {
        if std::mem::take(&mut self.fail_next_flip) {
            return Err(Error::Dom("flip surface unavailable".into()));
        }
        self.flips_begun += 1;
        self.flip_surface = Some(transition.clone());
        self.hidden_slot = Some(transition.direction.covered_slot());
        Ok(())
    }

    fn end_flip(&mut self, _direction: FlipDirection) {
        self.flip_surface = None;
        self.hidden_slot = None;
    }
}

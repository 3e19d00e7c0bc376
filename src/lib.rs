//! Flipbook reader: a paginated, page-turning view over blog post content
//!
//! This crate provides the reading core with:
//! - Measurement of post blocks at the page width without showing the pass
//! - Greedy pagination of blocks into viewport-fitted pages
//! - Diff-based rendering of the visible page or two-page spread
//! - An explicit flip state machine for animated page turns
//! - Input routing for keys, click zones and swipes
//! - A publish/subscribe bridge for in-place content mutations (highlights)
//!
//! The core is DOM-free; [`wasm`] binds it to the browser and [`headless`]
//! runs it natively.

pub mod config;
pub mod content;
pub mod error;
pub mod flip;
pub mod headless;
pub mod input;
pub mod layout;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::BookReader;

// Re-export primary types
pub use config::{MutationPolicy, ReaderConfig};
pub use content::{BlockId, CanonicalContent, ContentChange, ContentChannel, ContentPublisher};
pub use error::{Error, Result};
pub use flip::{FlipController, FlipDirection, FlipState, FlipSurface, FlipTransition};
pub use headless::HeadlessDisplay;
pub use input::{Intent, Key, SwipeTracker};
pub use layout::{
    measure, paginate, BlockMetrics, DisplayMode, MeasureSurface, Page, PageGeometry, Pagination,
    Viewport,
};
pub use render::{Face, PageRenderer, PageStatus, RenderDiff, RenderFrame, RenderPatch, RenderSink};

/// Reader coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Reader rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Everything a display backend has to provide
pub trait BookDisplay: MeasureSurface + RenderSink + FlipSurface {}

impl<T: MeasureSurface + RenderSink + FlipSurface> BookDisplay for T {}

/// Snapshot of the session's navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderState {
    pub current_page_index: usize,
    pub is_animating: bool,
    pub is_single_page_mode: bool,
}

/// Outcome of a navigation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Page index changed without animation
    Turned { page: usize },
    /// A flip transition started; the index changes on completion
    Flipping(FlipDirection),
    /// Dropped, a transition is running
    Busy,
    /// Dropped, already on the first or last page
    AtBoundary,
    /// The transition could not start; nothing changed
    Aborted,
}

/// One reading session over one post
pub struct Reader<D: BookDisplay> {
    config: ReaderConfig,
    content: CanonicalContent,
    channel: ContentChannel,
    viewport: Viewport,
    geometry: PageGeometry,
    pagination: Pagination,
    current_page: usize,
    flip: FlipController,
    /// Frame the display currently shows
    last_frame: Option<RenderFrame>,
    /// A mutation batch during a flip needs new pages; rebuilt on completion
    stale_pages: bool,
    /// Bumped every time the pages are rebuilt
    layout_generation: u64,
    display: D,
}

impl<D: BookDisplay> Reader<D> {
    /// Measure, paginate and show the first page
    pub fn activate(
        config: ReaderConfig,
        content: CanonicalContent,
        viewport: Viewport,
        display: D,
    ) -> Result<Self> {
        config.validate()?;

        let geometry = PageGeometry::from_viewport(&viewport, &config);
        let mut reader = Self {
            config,
            content,
            channel: ContentChannel::new(),
            viewport,
            geometry,
            pagination: Pagination::default(),
            current_page: 0,
            flip: FlipController::new(),
            last_frame: None,
            stale_pages: false,
            layout_generation: 0,
            display,
        };

        reader.repaginate()?;
        reader.render()?;

        log::info!(
            "reader activated: {} blocks, {} pages, {:?} mode",
            reader.content.len(),
            reader.pagination.len(),
            reader.geometry.mode
        );
        Ok(reader)
    }

    pub fn state(&self) -> ReaderState {
        ReaderState {
            current_page_index: self.current_page,
            is_animating: self.flip.is_animating(),
            is_single_page_mode: self.geometry.mode.is_single(),
        }
    }

    pub fn pages(&self) -> &Pagination {
        &self.pagination
    }

    pub fn content(&self) -> &CanonicalContent {
        &self.content
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Frame last presented to the display
    pub fn frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    /// Number of pagination passes so far, activation included
    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    /// Handle for the collaborator that mutates the canonical content
    pub fn publisher(&self) -> ContentPublisher {
        self.channel.publisher()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn go_to_next_page(&mut self) -> Navigation {
        self.handle_intent(Intent::Next)
    }

    pub fn go_to_prev_page(&mut self) -> Navigation {
        self.handle_intent(Intent::Prev)
    }

    /// Turn the page, animated unless in single-page mode or the user
    /// prefers reduced motion. Dropped while a turn is running or at either
    /// end of the book.
    pub fn handle_intent(&mut self, intent: Intent) -> Navigation {
        if self.flip.is_animating() {
            return Navigation::Busy;
        }

        let target = match intent {
            Intent::Next => {
                Some(self.current_page + 1).filter(|&page| page < self.pagination.len())
            }
            Intent::Prev => self.current_page.checked_sub(1),
        };
        let Some(target) = target else {
            return Navigation::AtBoundary;
        };

        if self.geometry.mode.is_single() || self.viewport.reduced_motion {
            self.current_page = target;
            self.render_or_log();
            return Navigation::Turned { page: target };
        }

        let direction = match intent {
            Intent::Next => FlipDirection::Forward,
            Intent::Prev => FlipDirection::Backward,
        };

        let Some(transition) = self.flip.start(
            direction,
            self.current_page,
            self.pagination.len(),
            |index| PageRenderer::page_html(&self.pagination, &self.content, index),
        ) else {
            return Navigation::Aborted;
        };

        if let Err(err) = self.display.begin_flip(transition) {
            log::warn!("page flip could not start: {err}");
            self.flip.abort();
            self.display.end_flip(direction);
            return Navigation::Aborted;
        }

        log::debug!("flip {direction:?} from page {}", self.current_page);
        Navigation::Flipping(direction)
    }

    /// Transition-end handler: commit the turn and show the new pages.
    ///
    /// Idempotent, so duplicate completion signals commit only once.
    pub fn finish_flip(&mut self) -> Option<usize> {
        let (direction, to_page) = self
            .flip
            .transition()
            .map(|transition| (transition.direction, transition.to_page))?;

        self.display.end_flip(direction);

        if std::mem::take(&mut self.stale_pages) {
            if let Err(err) = self.repaginate() {
                log::warn!("repagination after flip failed: {err}");
            }
        }
        self.current_page = to_page.min(self.pagination.last_index());
        self.render_or_log();

        // Still animating until the new pages are up
        self.flip.complete();
        Some(self.current_page)
    }

    /// Re-measure for a new viewport, clamp the page index and redraw.
    /// A running flip is abandoned first.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if let Some(direction) = self.flip.abort() {
            log::debug!("resize abandoned running flip");
            self.display.end_flip(direction);
        }

        self.viewport = viewport;
        self.geometry = PageGeometry::from_viewport(&viewport, &self.config);
        self.stale_pages = false;
        self.repaginate()?;

        self.last_frame = None;
        self.render()
    }

    /// Apply pending content changes and refresh the visible pages.
    ///
    /// Returns false when nothing was pending. Pages are only rebuilt when
    /// the block structure changed or the mutation policy asks for it.
    pub fn sync_content(&mut self) -> Result<bool> {
        let batch = self.channel.drain();
        if batch.is_empty() {
            return Ok(false);
        }

        let mut structure_changed = false;
        for change in batch {
            match change {
                ContentChange::Replaced { block, html } => {
                    if let Err(err) = self.content.replace_html(block, html) {
                        log::warn!("dropped content change: {err}");
                    }
                }
                ContentChange::Reset { blocks } => {
                    structure_changed |= self.content.reset(blocks);
                }
            }
        }

        let repaginate =
            structure_changed || self.config.mutation_policy == MutationPolicy::Repaginate;

        if self.flip.is_animating() {
            // The completion handler renders the fresh content
            self.stale_pages |= repaginate;
            return Ok(true);
        }

        log::debug!(
            "content v{} synced, repaginate: {repaginate}",
            self.content.version()
        );
        if repaginate {
            self.repaginate()?;
        }
        self.render()?;
        Ok(true)
    }

    /// Present the frame for the current (pages, index, mode)
    pub fn render(&mut self) -> Result<()> {
        let frame = PageRenderer::frame(
            &self.pagination,
            &self.content,
            self.current_page,
            self.geometry.mode,
        );
        let diff = RenderDiff::between(self.last_frame.as_ref(), &frame);

        for patch in &diff.patches {
            if let Err(err) = self.display.apply(patch) {
                // Unknown display state, redraw everything next time
                self.last_frame = None;
                return Err(err);
            }
        }

        self.last_frame = Some(frame);
        Ok(())
    }

    fn render_or_log(&mut self) {
        if let Err(err) = self.render() {
            log::warn!("render failed: {err}");
        }
    }

    fn repaginate(&mut self) -> Result<()> {
        let metrics = measure(&mut self.display, &self.content, self.geometry.page_width)?;
        self.pagination = paginate(&metrics, self.geometry.page_height);
        self.current_page = self.current_page.min(self.pagination.last_index());
        self.layout_generation += 1;
        Ok(())
    }
}

//! Measurement service: block heights under layout, without showing the pass

use crate::content::{BlockId, CanonicalContent};
use crate::error::Result;

/// Measured size of one content block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMetrics {
    pub id: BlockId,
    /// Border-box height
    pub outer_height: f32,
    /// Computed bottom margin, not collapsed with neighbours
    pub margin_bottom: f32,
}

impl BlockMetrics {
    pub fn new(id: BlockId, outer_height: f32, margin_bottom: f32) -> Self {
        Self {
            id,
            outer_height,
            margin_bottom,
        }
    }

    /// Height charged against the page budget
    pub fn height(&self) -> f32 {
        sanitize(self.outer_height) + sanitize(self.margin_bottom)
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Inline presentation of the content root saved before measuring.
///
/// Empty strings mean the property was not set inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationState {
    pub position: String,
    pub visibility: String,
    pub width: String,
    pub height: String,
    pub overflow: String,
}

/// Something that can lay out the canonical content root and report heights
pub trait MeasureSurface {
    /// Put the content root into a layout-only state (absolutely positioned,
    /// invisible, fixed width, natural height) and return what was there before.
    fn enter_layout_mode(&mut self, width: f32) -> Result<PresentationState>;

    /// Put back exactly what `enter_layout_mode` saved
    fn restore_presentation(&mut self, saved: PresentationState);

    /// Heights of every block of `content`, in document order
    fn measure_blocks(&mut self, content: &CanonicalContent) -> Result<Vec<BlockMetrics>>;
}

/// Restores the saved presentation when dropped, including on early return
/// and unwinding.
struct LayoutModeGuard<'a, S: MeasureSurface + ?Sized> {
    surface: &'a mut S,
    saved: Option<PresentationState>,
}

impl<S: MeasureSurface + ?Sized> Drop for LayoutModeGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.surface.restore_presentation(saved);
        }
    }
}

/// Measure every block of `content` as laid out at `width`
pub fn measure<S: MeasureSurface + ?Sized>(
    surface: &mut S,
    content: &CanonicalContent,
    width: f32,
) -> Result<Vec<BlockMetrics>> {
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let saved = surface.enter_layout_mode(width)?;
    let mut guard = LayoutModeGuard {
        surface,
        saved: Some(saved),
    };
    let metrics = guard.surface.measure_blocks(content)?;
    drop(guard);

    log::debug!("measured {} blocks at width {width}", metrics.len());
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct ScriptedSurface {
        current: PresentationState,
        fail: bool,
        restores: usize,
    }

    impl MeasureSurface for ScriptedSurface {
        fn enter_layout_mode(&mut self, width: f32) -> Result<PresentationState> {
            let saved = self.current.clone();
            self.current = PresentationState {
                position: "absolute".into(),
                visibility: "hidden".into(),
                width: format!("{width}px"),
                height: "auto".into(),
                overflow: "visible".into(),
            };
            Ok(saved)
        }

        fn restore_presentation(&mut self, saved: PresentationState) {
            self.current = saved;
            self.restores += 1;
        }

        fn measure_blocks(&mut self, content: &CanonicalContent) -> Result<Vec<BlockMetrics>> {
            assert_eq!(self.current.visibility, "hidden");
            if self.fail {
                return Err(Error::Dom("layout failed".into()));
            }
            Ok(content
                .ids()
                .map(|id| BlockMetrics::new(id, 20.0, 4.0))
                .collect())
        }
    }

    fn prior_state() -> PresentationState {
        PresentationState {
            position: "relative".into(),
            width: "10px".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_measure_restores_state() {
        let content = CanonicalContent::from_html_blocks(["<p>a</p>", "<p>b</p>"]);
        let mut surface = ScriptedSurface {
            current: prior_state(),
            ..Default::default()
        };

        let metrics = measure(&mut surface, &content, 320.0).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].height(), 24.0);
        assert_eq!(surface.current, prior_state());
        assert_eq!(surface.restores, 1);
    }

    #[test]
    fn test_measure_restores_on_failure() {
        let content = CanonicalContent::from_html_blocks(["<p>a</p>"]);
        let mut surface = ScriptedSurface {
            current: prior_state(),
            fail: true,
            ..Default::default()
        };

        assert!(measure(&mut surface, &content, 320.0).is_err());
        assert_eq!(surface.current, prior_state());
        assert_eq!(surface.restores, 1);
    }

    #[test]
    fn test_empty_content_skips_layout() {
        let mut surface = ScriptedSurface::default();
        let metrics = measure(&mut surface, &CanonicalContent::new(), 320.0).unwrap();
        assert!(metrics.is_empty());
        assert_eq!(surface.restores, 0);
    }

    #[test]
    fn test_height_sanitizes() {
        let metrics = BlockMetrics::new(BlockId(0), f32::NAN, -3.0);
        assert_eq!(metrics.height(), 0.0);
        let metrics = BlockMetrics::new(BlockId(0), 30.0, 12.5);
        assert_eq!(metrics.height(), 42.5);
    }
}

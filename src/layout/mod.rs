//! Geometry, measurement and pagination

pub mod font;
mod geometry;
mod line_break;
mod measure;
mod pagination;

pub use font::FontMetrics;
pub use geometry::{DisplayMode, PageGeometry, Viewport};
pub use line_break::LineBreaker;
pub use measure::{measure, BlockMetrics, MeasureSurface, PresentationState};
pub use pagination::{paginate, Page, Pagination};

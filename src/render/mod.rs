//! Render output: frames and the diff protocol

mod diff;
mod frame;

pub use diff::{RenderDiff, RenderPatch, RenderSink, Slot};
pub use frame::{Face, PageRenderer, PageStatus, RenderFrame};

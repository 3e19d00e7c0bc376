//! Error types for the reader core

use crate::content::BlockId;
use thiserror::Error;

/// Errors that can occur while activating or driving a reader session.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required element: #{0}")]
    MissingAnchor(String),

    #[error("invalid reader configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("canonical content has {expected} blocks but the surface measured {found}")]
    ContentOutOfSync { expected: usize, found: usize },

    #[error("unknown content block: {0:?}")]
    UnknownBlock(BlockId),

    #[error("DOM operation failed: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, Error>;

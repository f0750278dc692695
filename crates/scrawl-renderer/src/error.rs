use scrawl_lang::CompileError;
use thiserror::Error;

use crate::session::Lifecycle;

/// The platform surface has gone away (or was never usable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("surface is not available")]
pub struct SurfaceUnavailable;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("script `{name}` not found")]
    NotFound { name: String },
    #[error("failed to read script `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a session operation can refuse. None of these leave the
/// session in a state it cannot draw from again.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("`{operation}` rejected while surface is {state}")]
    InvalidSurfaceState { operation: &'static str, state: Lifecycle },
    #[error("invalid surface dimensions {width}×{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error(transparent)]
    SurfaceUnavailable(#[from] SurfaceUnavailable),
    #[error(transparent)]
    Script(#[from] CompileError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

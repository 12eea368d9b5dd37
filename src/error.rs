//! Error type for world operations
//!
//! Every error is local to a single call; nothing is recoverable mid-call
//! and there is no retry policy. Degenerate geometry is deliberately NOT
//! an error: it always resolves to some deterministic contact.

use thiserror::Error;

use crate::body::BodyKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The handle refers to a removed body or was never issued.
    #[error("unknown body handle {0:?}")]
    UnknownBody(BodyKey),

    /// A collision resolved to a response name nobody registered. This is
    /// an integration bug and must not silently no-op.
    #[error("unknown collision response {0:?}")]
    UnknownResponse(String),

    /// Static bodies never move or change shape after creation.
    #[error("body {0:?} is static and cannot be moved")]
    StaticBody(BodyKey),
}

//! Errors surfaced by guide generation and record keeping.

use std::path::PathBuf;

use sketchstep_pipeline::PipelineError;
use sketchstep_render::RenderError;

/// Errors that can occur while generating or recording a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Analysis failed (bad image, bad configuration).
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A step image could not be rendered or written.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A session file or directory could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A session id that cannot name a directory of its own.
    #[error("invalid session id {0:?}")]
    InvalidSessionId(String),

    /// The session directory already exists.
    #[error("session {0:?} already exists")]
    SessionExists(String),

    /// A record could not be serialized or parsed.
    #[error("invalid session record: {0}")]
    Record(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

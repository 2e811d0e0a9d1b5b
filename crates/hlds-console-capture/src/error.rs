//! Errors raised while acquiring capture channels.

use crate::channel::StdStream;
use std::io;
use thiserror::Error;

/// Errors that can occur while redirecting a standard stream.
///
/// All of them are recoverable for the host: capture is simply left disabled.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Creating the pipe failed.
    #[error("Failed to create pipe for {stream}: {source}")]
    Pipe {
        stream: StdStream,
        #[source]
        source: io::Error,
    },

    /// Setting descriptor flags on the pipe failed.
    #[error("Failed to configure pipe for {stream}: {source}")]
    Configure {
        stream: StdStream,
        #[source]
        source: io::Error,
    },

    /// Saving a copy of the original descriptor failed.
    #[error("Failed to duplicate original {stream}: {source}")]
    Duplicate {
        stream: StdStream,
        #[source]
        source: io::Error,
    },

    /// Pointing the stream at the pipe failed.
    #[error("Failed to redirect {stream} into pipe: {source}")]
    Redirect {
        stream: StdStream,
        #[source]
        source: io::Error,
    },
}

impl CaptureError {
    /// The stream whose redirection failed.
    pub fn stream(&self) -> StdStream {
        match self {
            Self::Pipe { stream, .. }
            | Self::Configure { stream, .. }
            | Self::Duplicate { stream, .. }
            | Self::Redirect { stream, .. } => *stream,
        }
    }
}

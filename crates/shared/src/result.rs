//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Lift crate-specific errors into the shared envelope.
pub trait ResultExt<T> {
    /// Convert the error side into an [`ErrorEnvelope`].
    fn into_envelope(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ErrorEnvelope>,
{
    fn into_envelope(self) -> Result<T> {
        self.map_err(Into::into)
    }
}

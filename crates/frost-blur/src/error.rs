#![forbid(unsafe_code)]

//! Error types for the blur-behind controller.
//!
//! Only backend failures reach callers. Hierarchy render failures are
//! recorded in [`crate::controller::BlurStats`] and never propagated; size
//! problems defer initialization instead of failing.

use std::fmt;

use frost_render::PixelFormat;

/// Failure reported by a [`crate::provider::BlurProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backend could not allocate a buffer of this size.
    Allocation { width: u32, height: u32 },
    /// The buffer handed to the backend is not in a format it accepts.
    UnsupportedFormat(PixelFormat),
    /// Any other backend-specific failure.
    Backend(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { width, height } => {
                write!(f, "blur backend failed to allocate {width}x{height}")
            }
            Self::UnsupportedFormat(format) => {
                write!(f, "blur backend does not accept {format:?} buffers")
            }
            Self::Backend(msg) => write!(f, "blur backend error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Error drawing the view hierarchy into the offscreen surface.
///
/// Returned by [`crate::host::RootView::draw`]; the controller logs and counts
/// it, then carries on with the stale buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Create a render error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hierarchy render failed: {}", self.message)
    }
}

impl std::error::Error for RenderError {}

/// Errors surfaced by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurError {
    /// A configuration value is out of range.
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    /// The blur backend failed.
    Provider(ProviderError),
    /// The provider was used after [`crate::provider::BlurProvider::release`].
    Released,
}

impl BlurError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BlurError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid blur config: {field} ({reason})")
            }
            Self::Provider(err) => write!(f, "{err}"),
            Self::Released => write!(f, "blur provider used after release"),
        }
    }
}

impl std::error::Error for BlurError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Provider(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<ProviderError> for BlurError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BlurError>;

use std::fmt;

use gpu::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub enum MountError {
    /// The render context could not be created.
    Context(RenderError),
    /// The context came up but the scene could not be uploaded.
    Resources(RenderError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::Context(e) => write!(f, "mount failed: {e}"),
            MountError::Resources(e) => write!(f, "scene upload failed: {e}"),
        }
    }
}

impl std::error::Error for MountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MountError::Context(e) | MountError::Resources(e) => Some(e),
        }
    }
}

impl MountError {
    pub fn render_error(&self) -> &RenderError {
        match self {
            MountError::Context(e) | MountError::Resources(e) => e,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DonationError {
    /// Custom amounts must be finite and positive.
    InvalidAmount(f64),
    /// A donation is still animating.
    Busy,
}

impl fmt::Display for DonationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DonationError::InvalidAmount(a) => write!(f, "invalid donation amount: {a}"),
            DonationError::Busy => write!(f, "a donation is already in progress"),
        }
    }
}

impl std::error::Error for DonationError {}

use std::fmt;

use crate::resources::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The accelerated context could not be created.
    ContextCreationFailed(String),
    ResourceAllocation { kind: ResourceKind, reason: String },
    SurfaceLost(String),
    /// The backend was already torn down.
    Disposed,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ContextCreationFailed(e) => write!(f, "context creation failed: {e}"),
            RenderError::ResourceAllocation { kind, reason } => {
                write!(f, "failed to allocate {kind}: {reason}")
            }
            RenderError::SurfaceLost(e) => write!(f, "surface lost: {e}"),
            RenderError::Disposed => write!(f, "render backend already disposed"),
        }
    }
}

impl std::error::Error for RenderError {}

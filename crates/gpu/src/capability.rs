use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    Capable,
    NotCapable,
}

/// Attempts to create an accelerated context on a throwaway surface.
///
/// `Ok(false)` means the host returned no context; `Err` carries whatever the host threw.
pub trait ContextCheck {
    fn try_context(&mut self) -> Result<bool, String>;
}

impl<F> ContextCheck for F
where
    F: FnMut() -> Result<bool, String>,
{
    fn try_context(&mut self) -> Result<bool, String> {
        self()
    }
}

pub struct CapabilityDetector<P: ContextCheck> {
    check: P,
}

impl<P: ContextCheck> CapabilityDetector<P> {
    pub fn new(check: P) -> Self {
        Self { check }
    }

    /// Safe to call repeatedly; each call runs a fresh check.
    pub fn detect(&mut self) -> Capability {
        match self.check.try_context() {
            Ok(true) => {
                debug!("accelerated context available");
                Capability::Capable
            }
            Ok(false) => {
                warn!("no accelerated context; using 2D fallback");
                Capability::NotCapable
            }
            Err(error) => {
                warn!(%error, "context check failed; using 2D fallback");
                Capability::NotCapable
            }
        }
    }
}

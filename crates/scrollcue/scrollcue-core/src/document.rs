//! Host document view.
//!
//! The orchestrator never owns elements. Before each write it asks the host
//! whether the target is still attached; adapters implement this and pass
//! it into Page::update().

/// Connectivity check for element handles.
pub trait Document {
    fn is_connected(&self, target: &str) -> bool;
}

/// Host whose elements are never removed.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysConnected;

impl Document for AlwaysConnected {
    #[inline]
    fn is_connected(&self, _target: &str) -> bool {
        true
    }
}

impl<F> Document for F
where
    F: Fn(&str) -> bool,
{
    #[inline]
    fn is_connected(&self, target: &str) -> bool {
        (self)(target)
    }
}

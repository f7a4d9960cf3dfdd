//! Construction lifecycle of a view.

/// Whether a view has finished construction.
///
/// Geometry depends on the final size and style, so setup requested while
/// still constructing is deferred until the view becomes ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Attributes are still being applied.
    #[default]
    Constructing,
    /// Construction finished; setup runs immediately.
    Ready,
}

impl Lifecycle {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

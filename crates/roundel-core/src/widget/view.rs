//! Host-facing view contract.

use crate::canvas::DrawCanvas;

/// Measurement constraint from the host's layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureSpec {
    /// The view must be exactly this size.
    Exactly(u32),
    /// The view may be at most this size.
    AtMost(u32),
    /// No constraint.
    Unspecified,
}

impl MeasureSpec {
    /// Resolve a desired size against this constraint.
    pub fn resolve(self, desired: u32) -> u32 {
        match self {
            MeasureSpec::Exactly(size) => size,
            MeasureSpec::AtMost(max) => desired.min(max),
            MeasureSpec::Unspecified => desired,
        }
    }
}

/// A renderable component driven by a host toolkit.
pub trait View {
    /// Pick a size for the given constraints.
    fn measure(&self, width: MeasureSpec, height: MeasureSpec) -> (u32, u32);

    /// The host assigned a new size.
    fn on_size_changed(&mut self, width: u32, height: u32, old_width: u32, old_height: u32);

    /// Paint the view in its own coordinate space.
    fn draw(&self, canvas: &mut dyn DrawCanvas);
}

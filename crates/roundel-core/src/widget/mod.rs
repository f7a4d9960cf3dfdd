//! The circular image view and the host view contract.
//!
//! - [`View`] is the small surface a host toolkit drives: measure, resize
//!   and draw.
//! - [`CircleImageView`] keeps style and image state, recomputes geometry
//!   when it changes, and draws through a [`DrawCanvas`](crate::DrawCanvas).

mod circle_image;
mod lifecycle;
mod view;

pub use circle_image::{CircleImageView, WidgetError};
pub use lifecycle::Lifecycle;
pub use view::{MeasureSpec, View};

//! Roundel Render Library
//!
//! Renderer abstraction for hosting a circle image view in a GPU scene.
//! The default implementation uses Vello.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{ImageCache, PngRenderResult, VelloCanvas, VelloRenderer};

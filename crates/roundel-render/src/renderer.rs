//! Renderer trait abstraction.

use kurbo::{Affine, Size, Vec2};
use peniko::Color;
use roundel_core::CircleImageView;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Readback failed: {0}")]
    Readback(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The view to render.
    pub view: &'a CircleImageView,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Position of the view's top-left corner, in logical pixels.
    pub origin: Vec2,
    /// Background color, or `None` to leave the viewport transparent.
    pub background_color: Option<Color>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(view: &'a CircleImageView, viewport_size: Size) -> Self {
        Self {
            view,
            viewport_size,
            scale_factor: 1.0,
            origin: Vec2::ZERO,
            background_color: Some(Color::from_rgba8(250, 250, 250, 255)),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set where the view is placed.
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    /// Maps view coordinates to physical scene coordinates.
    pub fn view_transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * Affine::translate(self.origin)
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color.unwrap_or(Color::TRANSPARENT)
    }
}

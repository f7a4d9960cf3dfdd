//! Roundel Core Library
//!
//! Platform-agnostic model for the Roundel circular image view: colors,
//! bitmaps, image sources, style attributes, circle geometry, paint state
//! and the view state machine itself. Hosts plug in through the
//! [`DrawCanvas`] trait.

pub mod bitmap;
pub mod canvas;
pub mod color;
pub mod geometry;
pub mod paint;
pub mod source;
pub mod style;
pub mod widget;

pub use bitmap::{Bitmap, BitmapError, BitmapId};
pub use canvas::{DrawCanvas, DrawOp, RecordingCanvas};
pub use color::RgbaColor;
pub use geometry::{
    calculate_bounds, CenterCropFit, CircleGeometry, DisplayMetrics, LayoutDirection, Padding,
    DENSITY_DEFAULT,
};
pub use paint::{
    BitmapShader, BlendMode, ColorFilter, ColorMatrix, Paint, PaintStyle, RenderResources,
    TileMode,
};
pub use source::{
    extract_bitmap, BitmapDrawable, ColorDrawable, Drawable, ExtractError, ImageSource,
    ResourceId, ResourceTable, Resources, COLOR_DRAWABLE_DIMENSION,
};
pub use style::{AttributeError, Attributes, CircleStyle, ScaleType, ShadowStyle};
pub use widget::{CircleImageView, Lifecycle, MeasureSpec, View, WidgetError};

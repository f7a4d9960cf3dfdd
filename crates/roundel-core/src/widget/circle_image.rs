//! Circular image view.

use std::fmt;
use std::sync::Arc;

use kurbo::Rect;
use thiserror::Error;

use super::lifecycle::Lifecycle;
use super::view::{MeasureSpec, View};
use crate::bitmap::Bitmap;
use crate::canvas::DrawCanvas;
use crate::color::RgbaColor;
use crate::geometry::{
    calculate_bounds, CenterCropFit, CircleGeometry, DisplayMetrics, LayoutDirection, Padding,
};
use crate::paint::{BitmapShader, ColorFilter, Paint, PaintStyle, RenderResources, TileMode};
use crate::source::{extract_bitmap, Drawable, ImageSource, ResourceId, Resources};
use crate::style::{Attributes, CircleStyle, ScaleType, ShadowStyle};

/// The only scale type the view supports.
const SCALE_TYPE: ScaleType = ScaleType::CenterCrop;

/// Rejected configuration requests.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WidgetError {
    #[error("ScaleType {0} not supported.")]
    UnsupportedScaleType(ScaleType),
    #[error("adjustViewBounds not supported.")]
    AdjustViewBoundsUnsupported,
}

/// An image view that clips its bitmap into a circle.
///
/// Style setters are no-ops when the value does not change. Setters that
/// affect geometry re-run setup; color-only setters just update a paint and
/// request a redraw. Hosts poll [`CircleImageView::take_redraw_request`]
/// and call [`View::draw`].
pub struct CircleImageView {
    lifecycle: Lifecycle,
    setup_pending: bool,

    width: u32,
    height: u32,
    padding: Padding,
    /// Start/top/end/bottom, when padding was set relative to direction.
    relative_padding: Option<[u32; 4]>,
    layout_direction: LayoutDirection,
    metrics: DisplayMetrics,

    style: CircleStyle,
    shadow: ShadowStyle,

    source: Option<ImageSource>,
    resources: Option<Arc<dyn Resources>>,
    /// Bitmap extracted from `source`, used by the plain (non-circular) path.
    source_bitmap: Option<Bitmap>,
    /// Bitmap for the circle; `None` when circular drawing is disabled.
    bitmap: Option<Bitmap>,
    color_filter: Option<Arc<ColorFilter>>,

    paints: RenderResources,
    geometry: CircleGeometry,
    setup_count: u64,
    redraw_requested: bool,
}

impl fmt::Debug for CircleImageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircleImageView")
            .field("lifecycle", &self.lifecycle)
            .field("setup_pending", &self.setup_pending)
            .field("size", &(self.width, self.height))
            .field("padding", &self.padding)
            .field("style", &self.style)
            .field("shadow", &self.shadow)
            .field("has_bitmap", &self.bitmap.is_some())
            .field("geometry", &self.geometry)
            .field("setup_count", &self.setup_count)
            .finish_non_exhaustive()
    }
}

impl Default for CircleImageView {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleImageView {
    /// Create a ready view with default attributes.
    pub fn new() -> Self {
        Self::with_attributes(&Attributes::default())
    }

    /// Create a ready view from construction attributes.
    pub fn with_attributes(attrs: &Attributes) -> Self {
        let mut view = Self::unattached(attrs);
        view.attach();
        view
    }

    /// Create a view that is still constructing.
    ///
    /// Setup requested before [`attach`](Self::attach) is deferred and runs
    /// once on attach.
    pub fn unattached(attrs: &Attributes) -> Self {
        Self {
            lifecycle: Lifecycle::Constructing,
            setup_pending: false,
            width: 0,
            height: 0,
            padding: Padding::default(),
            relative_padding: None,
            layout_direction: LayoutDirection::default(),
            metrics: DisplayMetrics::default(),
            style: attrs.circle_style(),
            shadow: attrs.shadow_style(),
            source: None,
            resources: None,
            source_bitmap: None,
            bitmap: None,
            color_filter: None,
            paints: RenderResources::default(),
            geometry: CircleGeometry::default(),
            setup_count: 0,
            redraw_requested: false,
        }
    }

    /// Finish construction and run any deferred setup.
    pub fn attach(&mut self) {
        if self.lifecycle.is_ready() {
            return;
        }
        log::info!("CircleImageView attached (scale type {})", SCALE_TYPE);

        self.lifecycle = Lifecycle::Ready;
        if self.setup_pending {
            self.setup_pending = false;
            self.setup();
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_setup_pending(&self) -> bool {
        self.setup_pending
    }

    /// Number of times geometry has been recomputed.
    pub fn setup_count(&self) -> u64 {
        self.setup_count
    }

    /// Return and clear the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_requested
    }

    fn invalidate(&mut self) {
        self.redraw_requested = true;
    }

    // --- Scale type / bounds ---------------------------------------------

    pub fn scale_type(&self) -> ScaleType {
        SCALE_TYPE
    }

    /// Only [`ScaleType::CenterCrop`] is accepted.
    pub fn set_scale_type(&mut self, scale_type: ScaleType) -> Result<(), WidgetError> {
        if scale_type != SCALE_TYPE {
            return Err(WidgetError::UnsupportedScaleType(scale_type));
        }
        Ok(())
    }

    /// Adjusting the view bounds to the image is never supported.
    pub fn set_adjust_view_bounds(&mut self, adjust: bool) -> Result<(), WidgetError> {
        if adjust {
            return Err(WidgetError::AdjustViewBoundsUnsupported);
        }
        Ok(())
    }

    // --- Style -----------------------------------------------------------

    pub fn style(&self) -> &CircleStyle {
        &self.style
    }

    pub fn border_width(&self) -> u32 {
        self.style.border_width
    }

    pub fn set_border_width(&mut self, border_width: u32) {
        if border_width == self.style.border_width {
            return;
        }
        self.style.border_width = border_width;
        self.setup();
    }

    pub fn border_color(&self) -> RgbaColor {
        self.style.border_color
    }

    pub fn set_border_color(&mut self, color: RgbaColor) {
        if color == self.style.border_color {
            return;
        }
        self.style.border_color = color;
        self.paints.border_paint.color = color;
        self.invalidate();
    }

    pub fn fill_color(&self) -> RgbaColor {
        self.style.fill_color
    }

    /// Color drawn behind the image. Has no visible effect when the image is
    /// opaque or absent.
    pub fn set_fill_color(&mut self, color: RgbaColor) {
        if color == self.style.fill_color {
            return;
        }
        self.style.fill_color = color;
        self.paints.fill_paint.color = color;
        self.invalidate();
    }

    pub fn circle_padding(&self) -> u32 {
        self.style.circle_padding
    }

    /// Only the drawn image radius depends on it, so no setup is needed.
    pub fn set_circle_padding(&mut self, padding: u32) {
        if padding == self.style.circle_padding {
            return;
        }
        self.style.circle_padding = padding;
        self.invalidate();
    }

    pub fn is_border_overlay(&self) -> bool {
        self.style.border_overlay
    }

    pub fn set_border_overlay(&mut self, overlay: bool) {
        if overlay == self.style.border_overlay {
            return;
        }
        self.style.border_overlay = overlay;
        self.setup();
    }

    pub fn is_disable_circular_transformation(&self) -> bool {
        self.style.disable_circular_transformation
    }

    pub fn set_disable_circular_transformation(&mut self, disable: bool) {
        if disable == self.style.disable_circular_transformation {
            return;
        }
        self.style.disable_circular_transformation = disable;
        self.select_bitmap();
    }

    // --- Shadow (configuration only) --------------------------------------

    pub fn shadow(&self) -> &ShadowStyle {
        &self.shadow
    }

    pub fn is_enable_shadow(&self) -> bool {
        self.shadow.enabled
    }

    /// Takes effect on the next setup.
    pub fn set_enable_shadow(&mut self, enabled: bool) -> &mut Self {
        self.shadow.enabled = enabled;
        self
    }

    pub fn set_shadow_color(&mut self, color: RgbaColor) -> &mut Self {
        self.shadow.color = color;
        self
    }

    pub fn set_shadow_radius(&mut self, radius: f32) -> &mut Self {
        self.shadow.radius = radius;
        self
    }

    pub fn set_shadow_dx(&mut self, dx: f32) -> &mut Self {
        self.shadow.dx = dx;
        self
    }

    pub fn set_shadow_dy(&mut self, dy: f32) -> &mut Self {
        self.shadow.dy = dy;
        self
    }

    // --- Layout ----------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, left: u32, top: u32, right: u32, bottom: u32) {
        self.relative_padding = None;
        self.padding = Padding::new(left, top, right, bottom);
        self.setup();
    }

    pub fn set_padding_relative(&mut self, start: u32, top: u32, end: u32, bottom: u32) {
        self.relative_padding = Some([start, top, end, bottom]);
        self.padding = Padding::relative(start, top, end, bottom, self.layout_direction);
        self.setup();
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.layout_direction
    }

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) {
        if direction == self.layout_direction {
            return;
        }
        self.layout_direction = direction;
        if let Some([start, top, end, bottom]) = self.relative_padding {
            self.padding = Padding::relative(start, top, end, bottom, direction);
            self.setup();
        }
    }

    pub fn display_metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    pub fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        if metrics == self.metrics {
            return;
        }
        self.metrics = metrics;
        self.setup();
    }

    // --- Image -----------------------------------------------------------

    /// Resolver used for [`ImageSource::Resource`] images.
    pub fn set_resources(&mut self, resources: Arc<dyn Resources>) {
        self.resources = Some(resources);
    }

    pub fn image_source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// The bitmap drawn into the circle, if any.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// The decoded image, kept even while circular transformation is disabled.
    pub fn decoded_bitmap(&self) -> Option<&Bitmap> {
        self.source_bitmap.as_ref()
    }

    pub fn set_image(&mut self, source: Option<ImageSource>) {
        self.source = source;
        self.extract_source_bitmap();
    }

    pub fn set_image_bitmap(&mut self, bitmap: Option<Bitmap>) {
        self.set_image(bitmap.map(ImageSource::Bitmap));
    }

    pub fn set_image_drawable(&mut self, drawable: Option<Arc<dyn Drawable>>) {
        self.set_image(drawable.map(ImageSource::Drawable));
    }

    pub fn set_image_resource(&mut self, id: ResourceId) {
        self.set_image(Some(ImageSource::Resource(id)));
    }

    pub fn set_image_uri(&mut self, uri: Option<&str>) {
        self.set_image(uri.map(|u| ImageSource::Uri(u.to_string())));
    }

    /// Decode the current source once; toggles reuse the result.
    fn extract_source_bitmap(&mut self) {
        self.source_bitmap = self.source.as_ref().and_then(|source| {
            match extract_bitmap(source, self.resources.as_deref()) {
                Ok(bitmap) => Some(bitmap),
                Err(e) => {
                    log::warn!("Failed to extract bitmap from image source: {}", e);
                    None
                }
            }
        });
        self.select_bitmap();
    }

    fn select_bitmap(&mut self) {
        self.bitmap = if self.style.disable_circular_transformation {
            None
        } else {
            self.source_bitmap.clone()
        };
        if self.bitmap.is_none() {
            // Release the previous image's pixels.
            self.paints.bitmap_paint.shader = None;
        }

        self.setup();
    }

    // --- Color filter ----------------------------------------------------

    pub fn color_filter(&self) -> Option<&Arc<ColorFilter>> {
        self.color_filter.as_ref()
    }

    /// Identity is by pointer: an equal but distinct filter still applies.
    pub fn set_color_filter(&mut self, filter: Option<Arc<ColorFilter>>) {
        let same = match (&filter, &self.color_filter) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        self.color_filter = filter;
        self.apply_color_filter();
        self.invalidate();
    }

    fn apply_color_filter(&mut self) {
        self.paints.bitmap_paint.color_filter = self.color_filter.clone();
    }

    // --- Geometry --------------------------------------------------------

    pub fn geometry(&self) -> &CircleGeometry {
        &self.geometry
    }

    pub fn render_resources(&self) -> &RenderResources {
        &self.paints
    }

    /// Recompute paints and geometry from the current state.
    fn setup(&mut self) {
        if !self.lifecycle.is_ready() {
            self.setup_pending = true;
            return;
        }

        if self.width == 0 && self.height == 0 {
            return;
        }

        let Some(bitmap) = self.bitmap.clone() else {
            self.invalidate();
            return;
        };

        let paints = &mut self.paints;
        paints.bitmap_paint.anti_alias = true;
        paints.bitmap_paint.shader = Some(BitmapShader::new(bitmap.clone(), TileMode::Clamp, TileMode::Clamp));

        paints.border_paint.style = PaintStyle::Stroke;
        paints.border_paint.anti_alias = true;
        paints.border_paint.color = self.style.border_color;
        paints.border_paint.stroke_width = self.style.border_width as f64;

        paints.fill_paint.style = PaintStyle::Fill;
        paints.fill_paint.anti_alias = true;
        paints.fill_paint.color = self.style.fill_color;

        let bounds = calculate_bounds(self.width, self.height, self.padding, &self.shadow, &self.metrics);
        self.geometry = CircleGeometry::compute(bounds, &self.style, bitmap.width(), bitmap.height());

        self.apply_color_filter();
        self.update_shader_transform();

        self.setup_count += 1;
        log::debug!(
            "Circle setup #{}: border {:?} r={:.1}, drawable {:?} r={:.1}",
            self.setup_count,
            self.geometry.border_rect,
            self.geometry.border_radius,
            self.geometry.drawable_rect,
            self.geometry.drawable_radius,
        );

        self.invalidate();
    }

    fn update_shader_transform(&mut self) {
        if let Some(shader) = self.paints.bitmap_paint.shader.as_mut() {
            shader.set_local_transform(self.geometry.shader_transform);
        }
    }

    /// The padded content box.
    fn content_rect(&self) -> Rect {
        let p = self.padding;
        let right = (self.width as f64 - p.right as f64).max(p.left as f64);
        let bottom = (self.height as f64 - p.bottom as f64).max(p.top as f64);
        Rect::new(p.left as f64, p.top as f64, right, bottom)
    }

    /// Plain image drawing: the whole bitmap center-cropped into the content box.
    fn draw_plain(&self, canvas: &mut dyn DrawCanvas) {
        let Some(bitmap) = &self.source_bitmap else {
            return;
        };
        let content = self.content_rect();
        if content.width() <= 0.0 || content.height() <= 0.0 {
            return;
        }
        let transform = CenterCropFit::compute(bitmap.width(), bitmap.height(), content).to_affine(content);
        let paint = Paint {
            anti_alias: true,
            color_filter: self.color_filter.clone(),
            ..Paint::default()
        };
        canvas.draw_bitmap(bitmap, content, transform, &paint);
    }
}

impl View for CircleImageView {
    fn measure(&self, width: MeasureSpec, height: MeasureSpec) -> (u32, u32) {
        let (bw, bh) = self
            .source_bitmap
            .as_ref()
            .map(|b| (b.width(), b.height()))
            .unwrap_or((0, 0));
        let desired_w = bw + self.padding.left + self.padding.right;
        let desired_h = bh + self.padding.top + self.padding.bottom;
        (width.resolve(desired_w), height.resolve(desired_h))
    }

    fn on_size_changed(&mut self, width: u32, height: u32, _old_width: u32, _old_height: u32) {
        self.width = width;
        self.height = height;
        self.setup();
    }

    fn draw(&self, canvas: &mut dyn DrawCanvas) {
        if self.style.disable_circular_transformation {
            self.draw_plain(canvas);
            return;
        }

        if self.bitmap.is_none() || self.paints.bitmap_paint.shader.is_none() {
            return;
        }

        let geometry = &self.geometry;
        if !self.style.fill_color.is_transparent() {
            canvas.draw_circle(geometry.drawable_center(), geometry.drawable_radius, &self.paints.fill_paint);
        }

        let image_radius = geometry.drawable_radius - self.style.circle_padding as f64;
        if image_radius > 0.0 {
            canvas.draw_circle(geometry.drawable_center(), image_radius, &self.paints.bitmap_paint);
        }

        if self.style.border_width > 0 {
            canvas.draw_circle(geometry.border_center(), geometry.border_radius, &self.paints.border_paint);
        }
    }
}

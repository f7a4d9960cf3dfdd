//! Vello-based renderer implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kurbo::{Affine, Circle, Rect, Shape, Stroke};
use peniko::{Brush, Color, Extend, Fill, ImageBrush, ImageData};
use roundel_core::{
    Bitmap, BitmapId, CircleImageView, ColorFilter, DrawCanvas, Paint, PaintStyle, TileMode, View,
};
use vello::Scene;

use crate::renderer::{RenderContext, Renderer};

/// Result of PNG rendering - contains the raw RGBA pixel data and dimensions.
#[derive(Debug)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Bitmap id plus the address of the color filter baked into the pixels.
type ImageKey = (BitmapId, usize);

/// Uploaded image data, keyed by bitmap and color filter.
///
/// Entries not touched since the previous [`ImageCache::trim`] are dropped
/// on the next trim, so replaced bitmaps are released after one frame.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: HashMap<ImageKey, CachedImage>,
    used: HashSet<ImageKey>,
}

/// Holding the filter keeps its address from being reused while the entry lives.
#[derive(Debug)]
struct CachedImage {
    _filter: Option<Arc<ColorFilter>>,
    data: ImageData,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image data for `bitmap` with `filter` applied.
    pub fn get(&mut self, bitmap: &Bitmap, filter: Option<&Arc<ColorFilter>>) -> ImageData {
        let key = (bitmap.id(), filter.map_or(0, |f| Arc::as_ptr(f) as usize));
        self.used.insert(key);
        self.images
            .entry(key)
            .or_insert_with(|| CachedImage {
                _filter: filter.cloned(),
                data: match filter {
                    Some(filter) => filter.apply_to_bitmap(bitmap).to_image_data(),
                    None => bitmap.to_image_data(),
                },
            })
            .data
            .clone()
    }

    /// Drop entries that were not used since the last trim.
    pub fn trim(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.images.retain(|key, _| used.contains(key));
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.used.clear();
    }
}

fn extend(mode: TileMode) -> Extend {
    match mode {
        TileMode::Clamp => Extend::Pad,
        TileMode::Repeat => Extend::Repeat,
        TileMode::Mirror => Extend::Reflect,
    }
}

/// [`DrawCanvas`] that encodes into a Vello scene.
pub struct VelloCanvas<'a> {
    scene: &'a mut Scene,
    images: &'a mut ImageCache,
    transform: Affine,
}

impl<'a> VelloCanvas<'a> {
    pub fn new(scene: &'a mut Scene, images: &'a mut ImageCache, transform: Affine) -> Self {
        Self {
            scene,
            images,
            transform,
        }
    }

    /// Brush for a paint, plus the brush transform when it samples an image.
    fn brush(&mut self, paint: &Paint) -> (Brush, Option<Affine>) {
        match &paint.shader {
            Some(shader) => {
                let data = self.images.get(&shader.bitmap, paint.color_filter.as_ref());
                let brush = ImageBrush::new(data)
                    .with_x_extend(extend(shader.tile_x))
                    .with_y_extend(extend(shader.tile_y));
                (Brush::Image(brush), Some(shader.local_transform))
            }
            None => (Brush::Solid(Color::from(paint.color)), None),
        }
    }

    fn draw_shape(&mut self, shape: &impl Shape, paint: &Paint) {
        let (brush, brush_transform) = self.brush(paint);
        match paint.style {
            PaintStyle::Fill => {
                self.scene
                    .fill(Fill::NonZero, self.transform, &brush, brush_transform, shape);
            }
            PaintStyle::Stroke => {
                if paint.stroke_width <= 0.0 {
                    return;
                }
                let stroke = Stroke::new(paint.stroke_width);
                self.scene
                    .stroke(&stroke, self.transform, &brush, brush_transform, shape);
            }
        }
    }
}

impl DrawCanvas for VelloCanvas<'_> {
    fn draw_circle(&mut self, center: kurbo::Point, radius: f64, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        self.draw_shape(&Circle::new(center, radius), paint);
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, clip: Rect, transform: Affine, paint: &Paint) {
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            return;
        }
        let data = self.images.get(bitmap, paint.color_filter.as_ref());
        let brush = Brush::Image(ImageBrush::new(data).with_extend(Extend::Pad));
        self.scene
            .fill(Fill::NonZero, self.transform, &brush, Some(transform), &clip);
    }
}

/// Vello-based renderer for a circle image view.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Image cache to avoid re-uploading bitmaps every frame.
    images: ImageCache,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            images: ImageCache::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    /// Build a scene containing only the view, at `scale` times its size.
    ///
    /// Returns the scene and the output bounds, or `None` bounds when the
    /// view has not been laid out.
    pub fn build_export_scene(&mut self, view: &CircleImageView, scale: f64) -> (Scene, Option<Rect>) {
        self.scene.reset();

        if view.width() == 0 || view.height() == 0 {
            return (std::mem::take(&mut self.scene), None);
        }

        let transform = Affine::scale(scale);
        view.draw(&mut VelloCanvas::new(&mut self.scene, &mut self.images, transform));
        self.images.trim();

        let bounds = Rect::new(0.0, 0.0, view.width() as f64 * scale, view.height() as f64 * scale);
        log::debug!("Built export scene {}x{}", bounds.width(), bounds.height());
        (std::mem::take(&mut self.scene), Some(bounds))
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();

        if let Some(background) = ctx.background_color {
            let rect = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);
            self.scene
                .fill(Fill::NonZero, Affine::IDENTITY, background, None, &rect);
        }

        let mut canvas = VelloCanvas::new(&mut self.scene, &mut self.images, ctx.view_transform());
        ctx.view.draw(&mut canvas);
        self.images.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use roundel_core::RgbaColor;

    fn laid_out_view() -> CircleImageView {
        let mut view = CircleImageView::new();
        view.set_image_bitmap(Some(Bitmap::filled(20, 10, RgbaColor::rgb(200, 0, 0)).unwrap()));
        view.on_size_changed(100, 100, 0, 0);
        view
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
        assert!(renderer.image_cache().is_empty());
    }

    #[test]
    fn test_build_scene_without_image() {
        let mut renderer = VelloRenderer::new();
        let view = CircleImageView::new();
        let ctx = RenderContext::new(&view, Size::new(800.0, 600.0)).with_background(None);

        renderer.build_scene(&ctx);
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_image() {
        let mut renderer = VelloRenderer::new();
        let view = laid_out_view();
        let ctx = RenderContext::new(&view, Size::new(800.0, 600.0));

        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());
        assert_eq!(renderer.image_cache().len(), 1);

        renderer.build_scene(&ctx);
        assert_eq!(renderer.image_cache().len(), 1);
    }

    #[test]
    fn test_color_filter_gets_own_cache_entry() {
        let mut cache = ImageCache::new();
        let bitmap = Bitmap::filled(2, 2, RgbaColor::rgb(255, 0, 0)).unwrap();
        let filter = Arc::new(ColorFilter::grayscale());

        cache.get(&bitmap, None);
        cache.get(&bitmap, Some(&filter));
        cache.get(&bitmap, Some(&filter));
        assert_eq!(cache.len(), 2);

        cache.trim();
        assert_eq!(cache.len(), 2);
        cache.get(&bitmap, None);
        cache.trim();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_new_filter_after_drop_is_not_served_stale() {
        let mut cache = ImageCache::new();
        let bitmap = Bitmap::filled(2, 2, RgbaColor::WHITE).unwrap();

        for _ in 0..20 {
            let green = Arc::new(ColorFilter::tint(RgbaColor::rgb(0, 255, 0)));
            let green_pixels = cache.get(&bitmap, Some(&green)).data.data().to_vec();
            cache.trim();
            drop(green);

            let blue = Arc::new(ColorFilter::tint(RgbaColor::rgb(0, 0, 255)));
            let blue_pixels = cache.get(&bitmap, Some(&blue)).data.data().to_vec();
            assert_ne!(green_pixels, blue_pixels);
            assert_eq!(&blue_pixels[..4], &[0, 0, 255, 255]);
            cache.trim();
            cache.trim();
        }
    }

    #[test]
    fn test_replaced_bitmap_released() {
        let mut renderer = VelloRenderer::new();
        let mut view = laid_out_view();
        {
            let ctx = RenderContext::new(&view, Size::new(100.0, 100.0));
            renderer.build_scene(&ctx);
        }
        view.set_image_bitmap(Some(Bitmap::filled(5, 5, RgbaColor::WHITE).unwrap()));
        let ctx = RenderContext::new(&view, Size::new(100.0, 100.0));
        renderer.build_scene(&ctx);
        assert_eq!(renderer.image_cache().len(), 1);
    }

    #[test]
    fn test_export_scene_bounds() {
        let mut renderer = VelloRenderer::new();
        let (_, bounds) = renderer.build_export_scene(&CircleImageView::new(), 2.0);
        assert!(bounds.is_none());

        let view = laid_out_view();
        let (scene, bounds) = renderer.build_export_scene(&view, 2.0);
        assert_eq!(bounds, Some(Rect::new(0.0, 0.0, 200.0, 200.0)));
        assert!(!scene.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_plain_mode_draws_clipped_bitmap() {
        let mut view = laid_out_view();
        view.set_disable_circular_transformation(true);
        let mut renderer = VelloRenderer::new();
        let ctx = RenderContext::new(&view, Size::new(100.0, 100.0)).with_background(None);
        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());
    }
}

//! egui painter adapter for the core drawing contract.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::sync::Arc;

use egui::epaint::Vertex;
use egui::{pos2, Color32, ColorImage, Mesh, Painter, Pos2, Shape, Stroke, TextureHandle, TextureId, TextureOptions};
use kurbo::{Affine, Point, Rect};
use roundel_core::{Bitmap, BitmapId, ColorFilter, DrawCanvas, Paint, PaintStyle, RgbaColor};

/// Convert a core color to egui.
pub fn color32(color: RgbaColor) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Convert an egui color to a core color.
pub fn rgba(color: Color32) -> RgbaColor {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    RgbaColor::new(r, g, b, a)
}

type TextureKey = (BitmapId, usize);

/// egui textures for bitmaps, keyed by bitmap and color filter.
///
/// Call [`TextureCache::trim`] once per frame to free textures of bitmaps
/// that are no longer drawn.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<TextureKey, CachedTexture>,
    used: HashSet<TextureKey>,
}

/// Keeps the filter alive so a new filter can't reuse its address while cached.
struct CachedTexture {
    _filter: Option<Arc<ColorFilter>>,
    handle: TextureHandle,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture for `bitmap` with `filter` applied, uploading on first use.
    pub fn get(&mut self, ctx: &egui::Context, bitmap: &Bitmap, filter: Option<&Arc<ColorFilter>>) -> TextureId {
        let key = (bitmap.id(), filter.map_or(0, |f| Arc::as_ptr(f) as usize));
        self.used.insert(key);
        self.textures
            .entry(key)
            .or_insert_with(|| {
                let filtered;
                let source = match filter {
                    Some(filter) => {
                        filtered = filter.apply_to_bitmap(bitmap);
                        &filtered
                    }
                    None => bitmap,
                };
                let image = ColorImage::from_rgba_unmultiplied(
                    [source.width() as usize, source.height() as usize],
                    source.pixels(),
                );
                log::debug!("Uploading {}x{} texture for bitmap {}", source.width(), source.height(), key.0);
                CachedTexture {
                    _filter: filter.cloned(),
                    handle: ctx.load_texture(format!("roundel-{}", key.0), image, TextureOptions::LINEAR),
                }
            })
            .handle
            .id()
    }

    /// Drop textures that were not used since the last trim.
    pub fn trim(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.textures.retain(|key, _| used.contains(key));
    }
}

/// Points on a circle, enough that each segment spans about two pixels.
fn circle_points(center: Point, radius: f64) -> Vec<Point> {
    let segments = ((TAU * radius / 2.0).ceil() as usize).clamp(16, 256);
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Normalized texture coordinate of a canvas point, clamped to the edge.
fn texture_uv(point: Point, inverse: Affine, width: u32, height: u32) -> Pos2 {
    let p = inverse * point;
    pos2(
        (p.x / width as f64).clamp(0.0, 1.0) as f32,
        (p.y / height as f64).clamp(0.0, 1.0) as f32,
    )
}

/// Paints into an egui [`Painter`], with the view's origin at `origin`.
pub struct EguiCanvas<'a> {
    painter: Painter,
    textures: &'a mut TextureCache,
    origin: Pos2,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: Painter, textures: &'a mut TextureCache, origin: Pos2) -> Self {
        Self {
            painter,
            textures,
            origin,
        }
    }

    fn to_screen(&self, point: Point) -> Pos2 {
        pos2(self.origin.x + point.x as f32, self.origin.y + point.y as f32)
    }

    fn textured_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        let Some(shader) = &paint.shader else {
            return;
        };
        let bitmap = &shader.bitmap;
        let texture = self
            .textures
            .get(self.painter.ctx(), bitmap, paint.color_filter.as_ref());
        let inverse = shader.local_transform.inverse();
        let uv = |p: Point| texture_uv(p, inverse, bitmap.width(), bitmap.height());

        let mut mesh = Mesh::with_texture(texture);
        mesh.vertices.push(Vertex {
            pos: self.to_screen(center),
            uv: uv(center),
            color: Color32::WHITE,
        });
        let rim = circle_points(center, radius);
        for p in &rim {
            mesh.vertices.push(Vertex {
                pos: self.to_screen(*p),
                uv: uv(*p),
                color: Color32::WHITE,
            });
        }
        let n = rim.len() as u32;
        for i in 0..n {
            mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
        }
        self.painter.add(Shape::mesh(mesh));
    }
}

impl DrawCanvas for EguiCanvas<'_> {
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        if paint.shader.is_some() {
            self.textured_circle(center, radius, paint);
            return;
        }

        let screen_center = self.to_screen(center);
        let color = color32(paint.color);
        match paint.style {
            PaintStyle::Fill => {
                self.painter.circle_filled(screen_center, radius as f32, color);
            }
            PaintStyle::Stroke => {
                if paint.stroke_width > 0.0 {
                    self.painter.circle_stroke(
                        screen_center,
                        radius as f32,
                        Stroke::new(paint.stroke_width as f32, color),
                    );
                }
            }
        }
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, clip: Rect, transform: Affine, paint: &Paint) {
        let image_rect = transform.transform_rect_bbox(Rect::from_origin_size(Point::ZERO, bitmap.size()));
        let visible = clip.intersect(image_rect);
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return;
        }

        let texture = self
            .textures
            .get(self.painter.ctx(), bitmap, paint.color_filter.as_ref());
        let inverse = transform.inverse();
        let uv_min = texture_uv(Point::new(visible.x0, visible.y0), inverse, bitmap.width(), bitmap.height());
        let uv_max = texture_uv(Point::new(visible.x1, visible.y1), inverse, bitmap.width(), bitmap.height());

        let screen = egui::Rect::from_min_max(
            self.to_screen(Point::new(visible.x0, visible.y0)),
            self.to_screen(Point::new(visible.x1, visible.y1)),
        );
        self.painter.image(
            texture,
            screen,
            egui::Rect::from_min_max(uv_min, uv_max),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        let c = RgbaColor::new(10, 20, 30, 255);
        assert_eq!(rgba(color32(c)), c);
        assert_eq!(color32(RgbaColor::TRANSPARENT), Color32::TRANSPARENT);
    }

    #[test]
    fn test_circle_points_on_radius() {
        let center = Point::new(10.0, 20.0);
        let points = circle_points(center, 50.0);
        assert!(points.len() >= 16);
        for p in points {
            assert!(((p - center).hypot() - 50.0).abs() < 1e-9);
        }
        assert_eq!(circle_points(center, 0.5).len(), 16);
        assert_eq!(circle_points(center, 10_000.0).len(), 256);
    }

    #[test]
    fn test_texture_uv_follows_inverse_transform() {
        // 200x100 bitmap center-cropped into a 100x100 square
        let transform = Affine::translate((-50.0, 0.0));
        let inverse = transform.inverse();
        let center = texture_uv(Point::new(50.0, 50.0), inverse, 200, 100);
        assert_eq!(center, pos2(0.5, 0.5));
        let left = texture_uv(Point::new(0.0, 0.0), inverse, 200, 100);
        assert_eq!(left, pos2(0.25, 0.0));
    }

    #[test]
    fn test_new_filter_after_drop_gets_own_texture() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::new();
        let bitmap = Bitmap::filled(2, 2, RgbaColor::WHITE).unwrap();

        for _ in 0..20 {
            let green = Arc::new(ColorFilter::tint(RgbaColor::rgb(0, 255, 0)));
            let green_id = cache.get(&ctx, &bitmap, Some(&green));
            cache.trim();
            drop(green);

            let blue = Arc::new(ColorFilter::tint(RgbaColor::rgb(0, 0, 255)));
            let blue_id = cache.get(&ctx, &bitmap, Some(&blue));
            assert_ne!(green_id, blue_id);
            cache.trim();
            cache.trim();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_texture_uv_clamps() {
        let uv = texture_uv(Point::new(-10.0, 500.0), Affine::IDENTITY, 100, 100);
        assert_eq!(uv, pos2(0.0, 1.0));
    }
}

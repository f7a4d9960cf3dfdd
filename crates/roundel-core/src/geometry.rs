//! Circle geometry: bounds, radii and the center-crop shader transform.

use kurbo::{Affine, Point, Rect};

use crate::style::{CircleStyle, ShadowStyle};

/// Baseline density that density-independent units are defined against.
pub const DENSITY_DEFAULT: f32 = 160.0;

/// Padding of the view's content box, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn uniform(all: u32) -> Self {
        Self::new(all, all, all, all)
    }

    /// Resolve start/end padding against a layout direction.
    pub fn relative(start: u32, top: u32, end: u32, bottom: u32, direction: LayoutDirection) -> Self {
        match direction {
            LayoutDirection::Ltr => Self::new(start, top, end, bottom),
            LayoutDirection::Rtl => Self::new(end, top, start, bottom),
        }
    }
}

/// Horizontal layout direction, used for relative padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Display density information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Horizontal pixels per inch.
    pub xdpi: f32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self { xdpi: DENSITY_DEFAULT }
    }
}

impl DisplayMetrics {
    pub fn new(xdpi: f32) -> Self {
        Self { xdpi }
    }

    /// Convert density-independent units to whole pixels.
    ///
    /// Fractional dp are truncated before scaling; halves round up, also
    /// for negative offsets.
    pub fn dp_to_px(&self, dp: f32) -> i64 {
        (dp.trunc() * (self.xdpi / DENSITY_DEFAULT) + 0.5).floor() as i64
    }
}

/// The largest square that fits the padded viewport, centered in it.
///
/// With the shadow enabled the shadow offsets are taken off the available
/// space first. Degenerate viewports give an empty square rather than a
/// negative one.
pub fn calculate_bounds(
    width: u32,
    height: u32,
    padding: Padding,
    shadow: &ShadowStyle,
    metrics: &DisplayMetrics,
) -> Rect {
    let mut available_width = width as i64 - padding.left as i64 - padding.right as i64;
    let mut available_height = height as i64 - padding.top as i64 - padding.bottom as i64;

    if shadow.enabled {
        available_width -= metrics.dp_to_px(shadow.dx);
        available_height -= metrics.dp_to_px(shadow.dy);
    }

    let available_width = available_width.max(0);
    let available_height = available_height.max(0);
    let side = available_width.min(available_height);

    let left = padding.left as f64 + (available_width - side) as f64 / 2.0;
    let top = padding.top as f64 + (available_height - side) as f64 / 2.0;

    Rect::new(left, top, left + side as f64, top + side as f64)
}

/// Uniform scale and offset that make a bitmap cover a rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterCropFit {
    pub scale: f64,
    /// Horizontal offset of the scaled bitmap inside the rect, before rounding.
    pub dx: f64,
    /// Vertical offset of the scaled bitmap inside the rect, before rounding.
    pub dy: f64,
}

impl CenterCropFit {
    /// Fit a `bitmap_width` x `bitmap_height` bitmap over `rect`.
    ///
    /// Aspect ratios are compared by cross-multiplication; the bitmap is
    /// scaled to the rect's height when it is relatively wider, otherwise
    /// to its width, and centered along the overflowing axis.
    pub fn compute(bitmap_width: u32, bitmap_height: u32, rect: Rect) -> Self {
        let bw = bitmap_width as f64;
        let bh = bitmap_height as f64;
        if bw <= 0.0 || bh <= 0.0 {
            return Self { scale: 1.0, dx: 0.0, dy: 0.0 };
        }

        if bw * rect.height() > rect.width() * bh {
            let scale = rect.height() / bh;
            Self {
                scale,
                dx: (rect.width() - bw * scale) * 0.5,
                dy: 0.0,
            }
        } else {
            let scale = rect.width() / bw;
            Self {
                scale,
                dx: 0.0,
                dy: (rect.height() - bh * scale) * 0.5,
            }
        }
    }

    /// Scale, then translate by the pixel-snapped offset plus the rect origin.
    pub fn to_affine(&self, rect: Rect) -> Affine {
        Affine::translate((snap(self.dx) + rect.x0, snap(self.dy) + rect.y0))
            * Affine::scale(self.scale)
    }
}

/// Round half up to a whole pixel.
fn snap(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Derived geometry of the circle, recomputed on every setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleGeometry {
    /// Square the border circle is inscribed in.
    pub border_rect: Rect,
    /// Square the image circle is inscribed in.
    pub drawable_rect: Rect,
    /// Radius of the border stroke's center line.
    pub border_radius: f64,
    /// Radius of the image and fill circles.
    pub drawable_radius: f64,
    /// Maps bitmap pixel space onto `drawable_rect`.
    pub shader_transform: Affine,
}

impl Default for CircleGeometry {
    fn default() -> Self {
        Self {
            border_rect: Rect::ZERO,
            drawable_rect: Rect::ZERO,
            border_radius: 0.0,
            drawable_radius: 0.0,
            shader_transform: Affine::IDENTITY,
        }
    }
}

impl CircleGeometry {
    /// Compute geometry for a bitmap of `bitmap_size` inside `bounds`.
    pub fn compute(bounds: Rect, style: &CircleStyle, bitmap_width: u32, bitmap_height: u32) -> Self {
        let border_width = style.border_width as f64;
        let border_rect = bounds;
        let border_radius = ((border_rect.height() - border_width) / 2.0)
            .min((border_rect.width() - border_width) / 2.0)
            .max(0.0);

        let mut drawable_rect = border_rect;
        if !style.border_overlay && style.border_width > 0 {
            // One pixel of overlap so no seam shows between image and border.
            let inset = border_width - 1.0;
            drawable_rect = shrink(drawable_rect, inset);
        }

        let mut drawable_radius = (drawable_rect.height() / 2.0)
            .min(drawable_rect.width() / 2.0)
            .max(0.0);
        if style.border_width > 0 {
            drawable_radius = drawable_radius.min(border_radius);
        }

        let fit = CenterCropFit::compute(bitmap_width, bitmap_height, drawable_rect);

        Self {
            border_rect,
            drawable_rect,
            border_radius,
            drawable_radius,
            shader_transform: fit.to_affine(drawable_rect),
        }
    }

    pub fn border_center(&self) -> Point {
        self.border_rect.center()
    }

    pub fn drawable_center(&self) -> Point {
        self.drawable_rect.center()
    }
}

/// Shrink a rect by `amount` on every side, collapsing to its center when
/// the rect is too small.
fn shrink(rect: Rect, amount: f64) -> Rect {
    let amount = amount
        .min(rect.width() / 2.0)
        .min(rect.height() / 2.0);
    Rect::new(
        rect.x0 + amount,
        rect.y0 + amount,
        rect.x1 - amount,
        rect.y1 - amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn style_with_border(width: u32, overlay: bool) -> CircleStyle {
        CircleStyle {
            border_width: width,
            border_overlay: overlay,
            ..CircleStyle::default()
        }
    }

    #[test]
    fn test_bounds_tall_viewport() {
        let rect = calculate_bounds(
            100,
            200,
            Padding::default(),
            &ShadowStyle::default(),
            &DisplayMetrics::default(),
        );
        assert_eq!(rect, Rect::new(0.0, 50.0, 100.0, 150.0));
    }

    #[test]
    fn test_bounds_with_padding() {
        let rect = calculate_bounds(
            120,
            100,
            Padding::new(10, 0, 30, 20),
            &ShadowStyle::default(),
            &DisplayMetrics::default(),
        );
        // available 80x80
        assert_eq!(rect, Rect::new(10.0, 0.0, 90.0, 80.0));
    }

    #[test]
    fn test_bounds_shadow_offsets_shrink_space() {
        let shadow = ShadowStyle {
            enabled: true,
            dx: 4.0,
            dy: 10.0,
            ..ShadowStyle::default()
        };
        // 2x density: dx -> 8px, dy -> 20px
        let metrics = DisplayMetrics::new(320.0);
        let rect = calculate_bounds(100, 100, Padding::default(), &shadow, &metrics);
        assert_eq!(rect.width(), 80.0);
        assert_eq!(rect.height(), 80.0);
        assert_eq!(rect.x0, 6.0);
        assert_eq!(rect.y0, 0.0);
    }

    #[test]
    fn test_bounds_disabled_shadow_ignored() {
        let shadow = ShadowStyle {
            enabled: false,
            dx: 50.0,
            dy: 50.0,
            ..ShadowStyle::default()
        };
        let rect = calculate_bounds(100, 100, Padding::default(), &shadow, &DisplayMetrics::default());
        assert_eq!(rect, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_bounds_padding_larger_than_view() {
        let rect = calculate_bounds(
            10,
            10,
            Padding::uniform(20),
            &ShadowStyle::default(),
            &DisplayMetrics::default(),
        );
        assert_eq!(rect.width(), 0.0);
        assert_eq!(rect.height(), 0.0);
    }

    #[test]
    fn test_dp_to_px_truncates_fraction() {
        let metrics = DisplayMetrics::new(240.0);
        assert_eq!(metrics.dp_to_px(2.9), 3);
        assert_eq!(metrics.dp_to_px(0.5), 0);
    }

    #[test]
    fn test_dp_to_px_rounds_negative_halves_up() {
        let metrics = DisplayMetrics::new(240.0);
        // -3dp * 1.5 = -4.5
        assert_eq!(metrics.dp_to_px(-3.0), -4);
        assert_eq!(metrics.dp_to_px(3.0), 5);
    }

    #[test]
    fn test_relative_padding() {
        assert_eq!(
            Padding::relative(1, 2, 3, 4, LayoutDirection::Rtl),
            Padding::new(3, 2, 1, 4)
        );
        assert_eq!(
            Padding::relative(1, 2, 3, 4, LayoutDirection::Ltr),
            Padding::new(1, 2, 3, 4)
        );
    }

    #[test]
    fn test_border_inset() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let geo = CircleGeometry::compute(bounds, &style_with_border(10, false), 100, 100);
        assert_eq!(geo.border_rect, bounds);
        assert_eq!(geo.drawable_rect, Rect::new(9.0, 9.0, 91.0, 91.0));
        assert!(approx(geo.border_radius, 45.0));
        assert!(approx(geo.drawable_radius, 41.0));
    }

    #[test]
    fn test_border_overlay_keeps_rect() {
        let bounds = Rect::new(0.0, 50.0, 100.0, 150.0);
        let geo = CircleGeometry::compute(bounds, &style_with_border(10, true), 100, 100);
        assert_eq!(geo.drawable_rect, geo.border_rect);
        assert!(geo.drawable_radius <= geo.border_radius);
    }

    #[test]
    fn test_zero_border_equals_no_border() {
        let bounds = Rect::new(0.0, 50.0, 100.0, 150.0);
        let with_border = CircleGeometry::compute(bounds, &style_with_border(8, false), 40, 40);
        assert_ne!(with_border.drawable_rect, with_border.border_rect);

        let reset = CircleGeometry::compute(bounds, &style_with_border(0, false), 40, 40);
        let never = CircleGeometry::compute(bounds, &CircleStyle::default(), 40, 40);
        assert_eq!(reset, never);
        assert_eq!(reset.drawable_rect, reset.border_rect);
    }

    #[test]
    fn test_radii_invariants() {
        let sizes = [(1, 1), (2, 3), (100, 200), (333, 77), (640, 480)];
        for &(w, h) in &sizes {
            for border in [0, 1, 2, 5, 40] {
                for overlay in [false, true] {
                    let bounds = calculate_bounds(
                        w,
                        h,
                        Padding::default(),
                        &ShadowStyle::default(),
                        &DisplayMetrics::default(),
                    );
                    let geo = CircleGeometry::compute(bounds, &style_with_border(border, overlay), 50, 20);
                    assert!(geo.border_radius >= 0.0, "{w}x{h} border {border}");
                    assert!(geo.drawable_radius >= 0.0, "{w}x{h} border {border}");
                    assert!(
                        geo.drawable_radius <= geo.border_radius,
                        "{w}x{h} border {border} overlay {overlay}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_center_crop_wide_bitmap() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let fit = CenterCropFit::compute(200, 100, rect);
        assert!(approx(fit.scale, 1.0));
        assert!(approx(fit.dx, -50.0));
        assert!(approx(fit.dy, 0.0));

        let affine = fit.to_affine(rect);
        let origin = affine * Point::ZERO;
        assert!(approx(origin.x, -50.0));
        assert!(approx(origin.y, 0.0));
    }

    #[test]
    fn test_center_crop_tall_bitmap() {
        let rect = Rect::new(10.0, 20.0, 110.0, 120.0);
        let fit = CenterCropFit::compute(50, 100, rect);
        assert!(approx(fit.scale, 2.0));
        assert!(approx(fit.dx, 0.0));
        assert!(approx(fit.dy, -50.0));

        let affine = fit.to_affine(rect);
        let corner = affine * Point::new(50.0, 100.0);
        assert!(approx(corner.x, 110.0));
        assert!(approx(corner.y, 170.0));
    }

    #[test]
    fn test_center_crop_snaps_offset() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        // scale 100/30, scaled width 233.33.., dx -66.67
        let fit = CenterCropFit::compute(70, 30, rect);
        let origin = fit.to_affine(rect) * Point::ZERO;
        assert!(approx(origin.x, -67.0));
    }

    #[test]
    fn test_shader_covers_drawable_rect() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let geo = CircleGeometry::compute(bounds, &style_with_border(10, false), 300, 120);
        let inv = geo.shader_transform.inverse();
        let top_left = inv * Point::new(geo.drawable_rect.x0, geo.drawable_rect.y0);
        let bottom_right = inv * Point::new(geo.drawable_rect.x1, geo.drawable_rect.y1);
        assert!(top_left.y >= -1e-9 && bottom_right.y <= 120.0 + 1e-9);
        assert!(top_left.x >= -1.0 && bottom_right.x <= 301.0);
    }
}

//! Paint configuration: solid colors, bitmap shaders and color filters.

use std::sync::Arc;

use kurbo::Affine;

use crate::bitmap::Bitmap;
use crate::color::RgbaColor;

/// Whether a shape is filled or stroked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// How a shader samples outside the bitmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileMode {
    /// Repeat the edge pixels.
    #[default]
    Clamp,
    Repeat,
    Mirror,
}

/// Samples a bitmap through a local transform.
#[derive(Debug, Clone)]
pub struct BitmapShader {
    pub bitmap: Bitmap,
    pub tile_x: TileMode,
    pub tile_y: TileMode,
    /// Maps bitmap pixel space into canvas space.
    pub local_transform: Affine,
}

impl BitmapShader {
    pub fn new(bitmap: Bitmap, tile_x: TileMode, tile_y: TileMode) -> Self {
        Self {
            bitmap,
            tile_x,
            tile_y,
            local_transform: Affine::IDENTITY,
        }
    }

    pub fn set_local_transform(&mut self, transform: Affine) {
        self.local_transform = transform;
    }
}

/// Porter-Duff style modes for blending a filter color over each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Filter color, masked by the pixel's alpha.
    SrcIn,
    /// Filter color composited over the pixel, keeping the pixel's alpha.
    SrcAtop,
    Multiply,
    Screen,
}

/// 4x5 row-major color matrix operating on 0-255 channel values.
///
/// Each output channel is `m[row][0]*r + m[row][1]*g + m[row][2]*b +
/// m[row][3]*a + m[row][4]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    pub fn identity() -> Self {
        Self::scale(1.0, 1.0, 1.0, 1.0)
    }

    pub fn scale(r: f32, g: f32, b: f32, a: f32) -> Self {
        let mut m = [0.0; 20];
        m[0] = r;
        m[6] = g;
        m[12] = b;
        m[18] = a;
        Self(m)
    }

    /// Saturation matrix; 0 is grayscale, 1 is unchanged.
    pub fn saturation(s: f32) -> Self {
        let inv = 1.0 - s;
        let r = 0.213 * inv;
        let g = 0.715 * inv;
        let b = 0.072 * inv;
        Self([
            r + s, g, b, 0.0, 0.0,
            r, g + s, b, 0.0, 0.0,
            r, g, b + s, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    fn apply(&self, c: RgbaColor) -> RgbaColor {
        let m = &self.0;
        let input = [c.r as f32, c.g as f32, c.b as f32, c.a as f32];
        let row = |i: usize| {
            let base = i * 5;
            let v = m[base] * input[0]
                + m[base + 1] * input[1]
                + m[base + 2] * input[2]
                + m[base + 3] * input[3]
                + m[base + 4];
            v.round().clamp(0.0, 255.0) as u8
        };
        RgbaColor::new(row(0), row(1), row(2), row(3))
    }
}

/// Per-pixel color transformation applied to the image.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorFilter {
    Blend { color: RgbaColor, mode: BlendMode },
    Matrix(ColorMatrix),
}

impl ColorFilter {
    pub fn tint(color: RgbaColor) -> Self {
        ColorFilter::Blend {
            color,
            mode: BlendMode::SrcAtop,
        }
    }

    pub fn grayscale() -> Self {
        ColorFilter::Matrix(ColorMatrix::saturation(0.0))
    }

    /// Filter a single straight-alpha pixel.
    pub fn apply(&self, px: RgbaColor) -> RgbaColor {
        match self {
            ColorFilter::Matrix(m) => m.apply(px),
            ColorFilter::Blend { color, mode } => blend(*color, px, *mode),
        }
    }

    /// Filter a whole bitmap into a new one.
    pub fn apply_to_bitmap(&self, bitmap: &Bitmap) -> Bitmap {
        bitmap.map_pixels(|px| self.apply(px))
    }
}

fn blend(src: RgbaColor, dst: RgbaColor, mode: BlendMode) -> RgbaColor {
    let unit = |v: u8| v as f32 / 255.0;
    let byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let (sa, da) = (unit(src.a), unit(dst.a));
    let s = [unit(src.r), unit(src.g), unit(src.b)];
    let d = [unit(dst.r), unit(dst.g), unit(dst.b)];

    match mode {
        BlendMode::SrcIn => RgbaColor::new(src.r, src.g, src.b, byte(sa * da)),
        BlendMode::SrcAtop => {
            let mix = |s: f32, d: f32| s * sa + d * (1.0 - sa);
            RgbaColor::new(byte(mix(s[0], d[0])), byte(mix(s[1], d[1])), byte(mix(s[2], d[2])), dst.a)
        }
        BlendMode::Multiply => {
            let mix = |s: f32, d: f32| d * (1.0 - sa) + s * d * sa;
            RgbaColor::new(byte(mix(s[0], d[0])), byte(mix(s[1], d[1])), byte(mix(s[2], d[2])), dst.a)
        }
        BlendMode::Screen => {
            let mix = |s: f32, d: f32| d + s * sa * (1.0 - d);
            RgbaColor::new(byte(mix(s[0], d[0])), byte(mix(s[1], d[1])), byte(mix(s[2], d[2])), dst.a)
        }
    }
}

/// Everything needed to paint one shape.
#[derive(Debug, Clone)]
pub struct Paint {
    pub style: PaintStyle,
    pub anti_alias: bool,
    pub color: RgbaColor,
    /// Only meaningful for [`PaintStyle::Stroke`].
    pub stroke_width: f64,
    /// When set, the shape is textured with the shader instead of `color`.
    pub shader: Option<BitmapShader>,
    pub color_filter: Option<Arc<ColorFilter>>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            anti_alias: false,
            color: RgbaColor::BLACK,
            stroke_width: 0.0,
            shader: None,
            color_filter: None,
        }
    }
}

/// The paints a circle image view owns and mutates in place.
#[derive(Debug, Clone, Default)]
pub struct RenderResources {
    pub bitmap_paint: Paint,
    pub border_paint: Paint,
    pub fill_paint: Paint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        let px = RgbaColor::new(12, 200, 99, 180);
        assert_eq!(ColorFilter::Matrix(ColorMatrix::identity()).apply(px), px);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let out = ColorFilter::grayscale().apply(RgbaColor::rgb(255, 0, 0));
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_src_in_keeps_alpha_mask() {
        let filter = ColorFilter::Blend {
            color: RgbaColor::rgb(0, 255, 0),
            mode: BlendMode::SrcIn,
        };
        assert_eq!(
            filter.apply(RgbaColor::new(200, 10, 10, 128)),
            RgbaColor::new(0, 255, 0, 128)
        );
        assert_eq!(filter.apply(RgbaColor::TRANSPARENT).a, 0);
    }

    #[test]
    fn test_tint_half_alpha() {
        let filter = ColorFilter::tint(RgbaColor::new(255, 255, 255, 128));
        let out = filter.apply(RgbaColor::new(0, 0, 0, 200));
        assert_eq!(out.a, 200);
        assert!((127..=129).contains(&out.r));
    }

    #[test]
    fn test_multiply_with_opaque_white_is_identity() {
        let filter = ColorFilter::Blend {
            color: RgbaColor::WHITE,
            mode: BlendMode::Multiply,
        };
        let px = RgbaColor::rgb(10, 120, 240);
        assert_eq!(filter.apply(px), px);
    }

    #[test]
    fn test_apply_to_bitmap() {
        let bmp = Bitmap::filled(2, 2, RgbaColor::rgb(255, 0, 0)).unwrap();
        let out = ColorFilter::Matrix(ColorMatrix::scale(0.0, 1.0, 1.0, 1.0)).apply_to_bitmap(&bmp);
        assert_eq!(out.pixel(1, 1), Some(RgbaColor::rgb(0, 0, 0)));
        assert_ne!(out.id(), bmp.id());
    }
}

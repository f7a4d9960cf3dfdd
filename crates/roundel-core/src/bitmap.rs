//! Pixel bitmaps shared between the view and its hosts.

use std::sync::Arc;

use kurbo::Size;
use thiserror::Error;
use uuid::Uuid;

use crate::color::RgbaColor;

/// Identity of a bitmap's pixel content.
///
/// Clones share the id; any mutation assigns a fresh one so renderer caches
/// keyed by id never serve stale pixels.
pub type BitmapId = Uuid;

/// Bitmap construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitmapError {
    #[error("Bitmap dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// An RGBA8 bitmap with straight (non-premultiplied) alpha.
#[derive(Debug, Clone)]
pub struct Bitmap {
    id: BitmapId,
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Create a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Result<Self, BitmapError> {
        Self::filled(width, height, RgbaColor::TRANSPARENT)
    }

    /// Create a bitmap filled with a single color.
    pub fn filled(width: u32, height: u32, color: RgbaColor) -> Result<Self, BitmapError> {
        check_dimensions(width, height)?;
        let pixels = color.to_array().repeat(width as usize * height as usize);
        Ok(Self::from_parts(width, height, pixels))
    }

    /// Wrap an existing RGBA8 buffer.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(BitmapError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self::from_parts(width, height, pixels))
    }

    fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    pub fn id(&self) -> BitmapId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether two bitmaps share the same pixel buffer.
    pub fn shares_pixels(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Read a pixel; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<RgbaColor> {
        let i = self.offset(x, y)?;
        Some(RgbaColor::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    /// Mutable access to the RGBA8 rows, for writing many pixels at once.
    ///
    /// The bitmap gets a new id once per call, not per pixel written.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.id = Uuid::new_v4();
        Arc::make_mut(&mut self.pixels).as_mut_slice()
    }

    /// Write a single pixel. Returns false when out of bounds.
    ///
    /// Each call assigns a new id; loops should go through [`Bitmap::pixels_mut`].
    pub fn set_pixel(&mut self, x: u32, y: u32, color: RgbaColor) -> bool {
        let Some(i) = self.offset(x, y) else {
            return false;
        };
        self.pixels_mut()[i..i + 4].copy_from_slice(&color.to_array());
        true
    }

    /// Fill every pixel with a color.
    pub fn fill(&mut self, color: RgbaColor) {
        let rgba = color.to_array();
        for px in self.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Map every pixel through `f` into a new bitmap.
    pub fn map_pixels(&self, f: impl Fn(RgbaColor) -> RgbaColor) -> Bitmap {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(4) {
            pixels.extend_from_slice(&f(RgbaColor::new(px[0], px[1], px[2], px[3])).to_array());
        }
        Self::from_parts(self.width, self.height, pixels)
    }

    /// Copy of this bitmap with every pixel exactly equal to `color` made
    /// fully transparent.
    pub fn erase_color(&self, color: RgbaColor) -> Bitmap {
        self.map_pixels(|px| if px == color { RgbaColor::TRANSPARENT } else { px })
    }

    /// Convert to peniko image data for GPU upload.
    pub fn to_image_data(&self) -> peniko::ImageData {
        peniko::ImageData {
            data: peniko::Blob::new(Arc::new(self.pixels.as_ref().clone())),
            format: peniko::ImageFormat::Rgba8,
            width: self.width,
            height: self.height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), BitmapError> {
    if width == 0 || height == 0 {
        return Err(BitmapError::EmptyDimensions { width, height });
    }
    Ok(())
}

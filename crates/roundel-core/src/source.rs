//! Image sources and bitmap extraction.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use url::Url;

use crate::bitmap::{Bitmap, BitmapError};
use crate::color::RgbaColor;

/// Edge length of the bitmap a flat-color drawable is rasterized into.
pub const COLOR_DRAWABLE_DIMENSION: u32 = 2;

/// Bitmap extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Drawable has no intrinsic size ({width}x{height})")]
    NoIntrinsicSize { width: i32, height: i32 },
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),
    #[error("Invalid image URI: {0}")]
    InvalidUri(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}

/// Something that can paint itself into a bitmap.
pub trait Drawable: fmt::Debug + Send + Sync {
    /// Natural width in pixels; zero or negative when it has none.
    fn intrinsic_width(&self) -> i32;

    /// Natural height in pixels; zero or negative when it has none.
    fn intrinsic_height(&self) -> i32;

    /// Paint into `target`, stretched to its full size.
    fn draw(&self, target: &mut Bitmap);

    /// The backing bitmap, for drawables that already are one.
    fn as_bitmap(&self) -> Option<&Bitmap> {
        None
    }

    /// Whether this drawable is a single flat color.
    fn is_flat_color(&self) -> bool {
        false
    }
}

/// A drawable backed directly by a bitmap.
#[derive(Debug, Clone)]
pub struct BitmapDrawable {
    bitmap: Bitmap,
}

impl BitmapDrawable {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }
}

impl Drawable for BitmapDrawable {
    fn intrinsic_width(&self) -> i32 {
        self.bitmap.width() as i32
    }

    fn intrinsic_height(&self) -> i32 {
        self.bitmap.height() as i32
    }

    fn draw(&self, target: &mut Bitmap) {
        let (tw, th) = (target.width() as u64, target.height() as u64);
        let (sw, sh) = (self.bitmap.width() as u64, self.bitmap.height() as u64);
        let src = self.bitmap.pixels();
        // Nearest-neighbour scale into the target.
        for (i, px) in target.pixels_mut().chunks_exact_mut(4).enumerate() {
            let (x, y) = (i as u64 % tw, i as u64 / tw);
            let (sx, sy) = (x * sw / tw, y * sh / th);
            let j = ((sy * sw + sx) * 4) as usize;
            px.copy_from_slice(&src[j..j + 4]);
        }
    }

    fn as_bitmap(&self) -> Option<&Bitmap> {
        Some(&self.bitmap)
    }
}

/// A drawable that paints one flat color and has no intrinsic size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDrawable {
    pub color: RgbaColor,
}

impl ColorDrawable {
    pub fn new(color: RgbaColor) -> Self {
        Self { color }
    }
}

impl Drawable for ColorDrawable {
    fn intrinsic_width(&self) -> i32 {
        -1
    }

    fn intrinsic_height(&self) -> i32 {
        -1
    }

    fn draw(&self, target: &mut Bitmap) {
        target.fill(self.color);
    }

    fn is_flat_color(&self) -> bool {
        true
    }
}

/// Identifier of a host-provided image resource.
pub type ResourceId = u32;

/// Resolves resource ids into drawables.
pub trait Resources: Send + Sync {
    fn drawable(&self, id: ResourceId) -> Option<Arc<dyn Drawable>>;
}

/// Resource resolver backed by a map.
#[derive(Debug, Default, Clone)]
pub struct ResourceTable {
    drawables: HashMap<ResourceId, Arc<dyn Drawable>>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ResourceId, drawable: Arc<dyn Drawable>) {
        self.drawables.insert(id, drawable);
    }

    pub fn insert_bitmap(&mut self, id: ResourceId, bitmap: Bitmap) {
        self.insert(id, Arc::new(BitmapDrawable::new(bitmap)));
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

impl Resources for ResourceTable {
    fn drawable(&self, id: ResourceId) -> Option<Arc<dyn Drawable>> {
        self.drawables.get(&id).cloned()
    }
}

/// Where the view's image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bitmap(Bitmap),
    Drawable(Arc<dyn Drawable>),
    Resource(ResourceId),
    /// `file://` URL, plain filesystem path or `data:` URI.
    Uri(String),
}

impl From<Bitmap> for ImageSource {
    fn from(bitmap: Bitmap) -> Self {
        ImageSource::Bitmap(bitmap)
    }
}

/// Turn any image source into a concrete bitmap.
///
/// Bitmaps and bitmap-backed drawables are returned without copying pixels.
pub fn extract_bitmap(
    source: &ImageSource,
    resources: Option<&dyn Resources>,
) -> Result<Bitmap, ExtractError> {
    match source {
        ImageSource::Bitmap(bitmap) => Ok(bitmap.clone()),
        ImageSource::Drawable(drawable) => rasterize(drawable.as_ref()),
        ImageSource::Resource(id) => {
            let drawable = resources
                .and_then(|r| r.drawable(*id))
                .ok_or(ExtractError::UnknownResource(*id))?;
            rasterize(drawable.as_ref())
        }
        ImageSource::Uri(uri) => load_uri(uri),
    }
}

fn rasterize(drawable: &dyn Drawable) -> Result<Bitmap, ExtractError> {
    if let Some(bitmap) = drawable.as_bitmap() {
        return Ok(bitmap.clone());
    }

    let (width, height) = if drawable.is_flat_color() {
        (COLOR_DRAWABLE_DIMENSION, COLOR_DRAWABLE_DIMENSION)
    } else {
        let (w, h) = (drawable.intrinsic_width(), drawable.intrinsic_height());
        if w <= 0 || h <= 0 {
            return Err(ExtractError::NoIntrinsicSize { width: w, height: h });
        }
        (w as u32, h as u32)
    };

    let mut bitmap = Bitmap::new(width, height)?;
    drawable.draw(&mut bitmap);
    Ok(bitmap)
}

fn load_uri(uri: &str) -> Result<Bitmap, ExtractError> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ExtractError::InvalidUri(uri.to_string()))?;
        if !meta.ends_with(";base64") {
            return Err(ExtractError::InvalidUri(uri.to_string()));
        }
        let bytes = STANDARD.decode(payload.trim())?;
        return decode(&bytes);
    }

    let path = match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| ExtractError::InvalidUri(uri.to_string()))?,
        // Single-letter "schemes" are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => {
            return Err(ExtractError::InvalidUri(uri.to_string()));
        }
        _ => PathBuf::from(uri),
    };

    let bytes = std::fs::read(&path)?;
    decode(&bytes)
}

/// Decode PNG/JPEG/WebP bytes into a bitmap.
pub fn decode(bytes: &[u8]) -> Result<Bitmap, ExtractError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Bitmap::from_rgba(width, height, rgba.into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: RgbaColor = RgbaColor::rgb(0, 200, 0);

    #[derive(Debug)]
    struct Checker {
        width: i32,
        height: i32,
    }

    impl Drawable for Checker {
        fn intrinsic_width(&self) -> i32 {
            self.width
        }

        fn intrinsic_height(&self) -> i32 {
            self.height
        }

        fn draw(&self, target: &mut Bitmap) {
            let width = target.width() as usize;
            for (i, px) in target.pixels_mut().chunks_exact_mut(4).enumerate() {
                let c = if (i % width + i / width) % 2 == 0 { RgbaColor::BLACK } else { RgbaColor::WHITE };
                px.copy_from_slice(&c.to_array());
            }
        }
    }

    fn png_bytes(width: u32, height: u32, color: RgbaColor) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color.to_array()));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_bitmap_source_is_not_copied() {
        let bmp = Bitmap::filled(3, 3, GREEN).unwrap();
        let out = extract_bitmap(&ImageSource::Bitmap(bmp.clone()), None).unwrap();
        assert!(out.shares_pixels(&bmp));

        let drawable: Arc<dyn Drawable> = Arc::new(BitmapDrawable::new(bmp.clone()));
        let out = extract_bitmap(&ImageSource::Drawable(drawable), None).unwrap();
        assert!(out.shares_pixels(&bmp));
    }

    #[test]
    fn test_color_drawable_uses_fixed_size() {
        let drawable: Arc<dyn Drawable> = Arc::new(ColorDrawable::new(GREEN));
        let out = extract_bitmap(&ImageSource::Drawable(drawable), None).unwrap();
        assert_eq!(out.width(), COLOR_DRAWABLE_DIMENSION);
        assert_eq!(out.height(), COLOR_DRAWABLE_DIMENSION);
        assert_eq!(out.pixel(1, 1), Some(GREEN));
    }

    #[test]
    fn test_custom_drawable_rasterized_at_intrinsic_size() {
        let drawable: Arc<dyn Drawable> = Arc::new(Checker { width: 4, height: 3 });
        let out = extract_bitmap(&ImageSource::Drawable(drawable), None).unwrap();
        assert_eq!((out.width(), out.height()), (4, 3));
        assert_eq!(out.pixel(0, 0), Some(RgbaColor::BLACK));
        assert_eq!(out.pixel(1, 0), Some(RgbaColor::WHITE));
    }

    #[test]
    fn test_zero_intrinsic_size_fails() {
        let drawable: Arc<dyn Drawable> = Arc::new(Checker { width: 0, height: 10 });
        let err = extract_bitmap(&ImageSource::Drawable(drawable), None).unwrap_err();
        assert!(matches!(err, ExtractError::NoIntrinsicSize { width: 0, height: 10 }));
    }

    #[test]
    fn test_resource_lookup() {
        let mut table = ResourceTable::new();
        table.insert_bitmap(7, Bitmap::filled(5, 2, GREEN).unwrap());

        let out = extract_bitmap(&ImageSource::Resource(7), Some(&table)).unwrap();
        assert_eq!(out.width(), 5);

        let err = extract_bitmap(&ImageSource::Resource(8), Some(&table)).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownResource(8)));
        let err = extract_bitmap(&ImageSource::Resource(7), None).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownResource(7)));
    }

    #[test]
    fn test_file_uri_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, png_bytes(6, 4, GREEN)).unwrap();

        let by_path = extract_bitmap(&ImageSource::Uri(path.display().to_string()), None).unwrap();
        assert_eq!((by_path.width(), by_path.height()), (6, 4));
        assert_eq!(by_path.pixel(5, 3), Some(GREEN));

        let url = Url::from_file_path(&path).unwrap();
        let by_url = extract_bitmap(&ImageSource::Uri(url.to_string()), None).unwrap();
        assert_eq!((by_url.width(), by_url.height()), (6, 4));
    }

    #[test]
    fn test_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(2, 2, GREEN)));
        let out = extract_bitmap(&ImageSource::Uri(uri), None).unwrap();
        assert_eq!(out.pixel(0, 1), Some(GREEN));
    }

    #[test]
    fn test_bad_uris() {
        let err = extract_bitmap(&ImageSource::Uri("https://example.com/a.png".into()), None)
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUri(_)));

        let err = extract_bitmap(&ImageSource::Uri("data:image/png,abc".into()), None).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUri(_)));

        let err = extract_bitmap(&ImageSource::Uri("/no/such/file.png".into()), None).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(decode(b"not an image"), Err(ExtractError::Decode(_))));
    }
}

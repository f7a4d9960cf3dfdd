//! Host canvas contract.

use kurbo::{Affine, Point, Rect};

use crate::bitmap::Bitmap;
use crate::paint::Paint;

/// Drawing surface supplied by the host toolkit.
///
/// Implementations can target Vello scenes, egui painters, or anything
/// else that can draw circles and transformed bitmaps.
pub trait DrawCanvas {
    /// Fill or stroke a circle, textured by `paint.shader` when present.
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint);

    /// Draw a bitmap through `transform`, clipped to `clip`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, clip: Rect, transform: Affine, paint: &Paint);
}

/// A recorded draw call.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    Bitmap {
        bitmap: Bitmap,
        clip: Rect,
        transform: Affine,
        paint: Paint,
    },
}

/// Canvas that records draw calls for later replay or inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Replay the recorded calls onto another canvas.
    pub fn replay(&self, target: &mut dyn DrawCanvas) {
        for op in &self.ops {
            match op {
                DrawOp::Circle { center, radius, paint } => target.draw_circle(*center, *radius, paint),
                DrawOp::Bitmap { bitmap, clip, transform, paint } => {
                    target.draw_bitmap(bitmap, *clip, *transform, paint)
                }
            }
        }
    }
}

impl DrawCanvas for RecordingCanvas {
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, clip: Rect, transform: Affine, paint: &Paint) {
        self.ops.push(DrawOp::Bitmap {
            bitmap: bitmap.clone(),
            clip,
            transform,
            paint: paint.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_replay() {
        let mut rec = RecordingCanvas::new();
        rec.draw_circle(Point::new(5.0, 5.0), 4.0, &Paint::default());
        let bmp = Bitmap::new(1, 1).unwrap();
        rec.draw_bitmap(&bmp, Rect::new(0.0, 0.0, 1.0, 1.0), Affine::IDENTITY, &Paint::default());
        assert_eq!(rec.ops().len(), 2);

        let mut copy = RecordingCanvas::new();
        rec.replay(&mut copy);
        assert_eq!(copy.ops().len(), 2);
        assert!(matches!(copy.ops()[0], DrawOp::Circle { radius, .. } if radius == 4.0));

        rec.clear();
        assert!(rec.is_empty());
    }
}

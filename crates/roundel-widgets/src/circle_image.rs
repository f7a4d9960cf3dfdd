//! Widget that hosts a [`CircleImageView`] in an egui layout.

use egui::{vec2, CursorIcon, Sense, Ui, Vec2};
use roundel_core::{CircleImageView, View};

use crate::canvas::{EguiCanvas, TextureCache};

/// A circle image view placed in an egui layout.
///
/// The view is resized to the allocated rect whenever it changes.
pub struct CircleImage<'a> {
    view: &'a mut CircleImageView,
    textures: &'a mut TextureCache,
    size: Vec2,
    tooltip: Option<&'a str>,
}

impl<'a> CircleImage<'a> {
    pub fn new(view: &'a mut CircleImageView, textures: &'a mut TextureCache) -> Self {
        Self {
            view,
            textures,
            size: vec2(48.0, 48.0),
            tooltip: None,
        }
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn tooltip(mut self, tooltip: &'a str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    /// Show the view and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());

        let width = rect.width().round().max(0.0) as u32;
        let height = rect.height().round().max(0.0) as u32;
        if (width, height) != (self.view.width(), self.view.height()) {
            let (old_width, old_height) = (self.view.width(), self.view.height());
            self.view.on_size_changed(width, height, old_width, old_height);
        }

        if ui.is_rect_visible(rect) {
            let mut canvas = EguiCanvas::new(ui.painter_at(rect), self.textures, rect.min);
            self.view.draw(&mut canvas);
        }
        self.view.take_redraw_request();

        let clicked = response.clicked();
        let response = match self.tooltip {
            Some(tooltip) => response.on_hover_text(tooltip),
            None => response,
        };
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

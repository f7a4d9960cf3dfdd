//! Color swatches and palette rows for picking border, fill and tint colors.

use egui::{pos2, vec2, Color32, CursorIcon, Rect, Sense, Stroke, Ui};
use roundel_core::RgbaColor;

use crate::canvas::{color32, rgba};
use crate::{layout, sizing, theme};

/// Palette offered by [`ColorRow`] (Tailwind 500 shades plus neutrals).
pub const PALETTE: &[(&str, Color32)] = &[
    ("Black", Color32::from_rgb(0, 0, 0)),
    ("White", Color32::from_rgb(255, 255, 255)),
    ("Slate", Color32::from_rgb(100, 116, 139)),
    ("Red", Color32::from_rgb(239, 68, 68)),
    ("Amber", Color32::from_rgb(245, 158, 11)),
    ("Lime", Color32::from_rgb(132, 204, 22)),
    ("Teal", Color32::from_rgb(20, 184, 166)),
    ("Blue", Color32::from_rgb(59, 130, 246)),
    ("Purple", Color32::from_rgb(168, 85, 247)),
    ("Rose", Color32::from_rgb(244, 63, 94)),
];

/// Check if two colors match, alpha included.
pub fn colors_match(a: Color32, b: Color32) -> bool {
    a.to_srgba_unmultiplied() == b.to_srgba_unmultiplied()
}

/// A circular color swatch. Fully transparent colors draw as a "none"
/// swatch with a red diagonal.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
}

impl<'a> ColorSwatch<'a> {
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(vec2(sizing::SWATCH, sizing::SWATCH), Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let center = rect.center();
            let radius = rect.width().min(rect.height()) / 2.0;

            if self.color == Color32::TRANSPARENT {
                painter.circle_filled(center, radius, Color32::WHITE);
                painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::from_gray(200)));
                let offset = radius * 0.6;
                painter.line_segment(
                    [
                        pos2(center.x - offset, center.y + offset),
                        pos2(center.x + offset, center.y - offset),
                    ],
                    Stroke::new(2.0, Color32::from_rgb(239, 68, 68)),
                );
            } else {
                painter.circle_filled(center, radius, self.color);
                if self.color.r() > 240 && self.color.g() > 240 && self.color.b() > 240 {
                    painter.circle_stroke(center, radius, Stroke::new(1.0, theme::BORDER));
                }
            }

            if self.selected {
                painter.circle_stroke(center, radius - 3.0, Stroke::new(2.0, Color32::from_gray(30)));
            }
        }

        let clicked = response.clicked();
        response.on_hover_text(self.tooltip).on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

/// A labeled row of palette swatches.
pub struct ColorRow<'a> {
    label: &'a str,
    current: RgbaColor,
    allow_none: bool,
}

impl<'a> ColorRow<'a> {
    pub fn new(label: &'a str, current: RgbaColor) -> Self {
        Self {
            label,
            current,
            allow_none: false,
        }
    }

    /// Offer a fully transparent "none" swatch first.
    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// Show the row and return the picked color, if any.
    pub fn show(self, ui: &mut Ui) -> Option<RgbaColor> {
        let current = color32(self.current);
        let mut picked = None;

        layout::section_label(ui, self.label);
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = vec2(4.0, 4.0);
            if self.allow_none {
                let (clicked, _) = ColorSwatch::new(Color32::TRANSPARENT, "None")
                    .selected(self.current.is_transparent())
                    .show(ui);
                if clicked {
                    picked = Some(RgbaColor::TRANSPARENT);
                }
            }
            for (name, color) in PALETTE {
                let (clicked, _) = ColorSwatch::new(*color, name)
                    .selected(colors_match(*color, current))
                    .show(ui);
                if clicked {
                    picked = Some(rgba(*color));
                }
            }
        });

        picked.filter(|color| *color != self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_match_includes_alpha() {
        assert!(colors_match(Color32::from_rgb(1, 2, 3), Color32::from_rgb(1, 2, 3)));
        assert!(!colors_match(
            Color32::from_rgb(1, 2, 3),
            Color32::from_rgba_unmultiplied(1, 2, 3, 128)
        ));
    }

    #[test]
    fn test_palette_round_trips_through_core_color() {
        for (name, color) in PALETTE {
            assert_eq!(color32(rgba(*color)), *color, "{name}");
        }
    }
}

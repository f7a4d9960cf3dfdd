//! Control rows: labeled switches and action buttons.

use egui::{pos2, vec2, Align2, Color32, CornerRadius, CursorIcon, FontId, Pos2, Rect, Sense, Ui};

use crate::{sizing, theme};

/// A full-width row with a label on the left and a pill switch on the right.
pub struct SwitchRow<'a> {
    label: &'a str,
    on: bool,
    shortcut: Option<&'a str>,
}

impl<'a> SwitchRow<'a> {
    pub fn new(label: &'a str, on: bool) -> Self {
        Self {
            label,
            on,
            shortcut: None,
        }
    }

    /// Set keyboard shortcut (shown in hover tooltip).
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Show the row and return the new state if it was toggled.
    pub fn show(self, ui: &mut Ui) -> Option<bool> {
        let size = vec2(ui.available_width(), sizing::ROW);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            if response.hovered() {
                painter.rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), theme::HOVER_BG);
            }

            painter.text(
                pos2(rect.left() + 4.0, rect.center().y),
                Align2::LEFT_CENTER,
                self.label,
                FontId::proportional(12.0),
                theme::TEXT,
            );

            let track = Rect::from_center_size(
                pos2(rect.right() - 4.0 - sizing::SWITCH_WIDTH / 2.0, rect.center().y),
                vec2(sizing::SWITCH_WIDTH, sizing::SWITCH_HEIGHT),
            );
            let track_color = if self.on { theme::ACCENT } else { Color32::from_gray(200) };
            painter.rect_filled(track, CornerRadius::same((sizing::SWITCH_HEIGHT / 2.0) as u8), track_color);

            let knob_radius = sizing::SWITCH_HEIGHT / 2.0 - 2.0;
            let knob_x = if self.on {
                track.right() - knob_radius - 2.0
            } else {
                track.left() + knob_radius + 2.0
            };
            painter.circle_filled(Pos2::new(knob_x, track.center().y), knob_radius, Color32::WHITE);
        }

        let clicked = response.clicked();
        let response = match self.shortcut {
            Some(shortcut) => response.on_hover_text(format!("Toggle ({})", shortcut)),
            None => response,
        };
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked.then_some(!self.on)
    }
}

/// A full-width text button with an optional shortcut hint.
pub struct ActionButton<'a> {
    label: &'a str,
    shortcut: Option<&'a str>,
    enabled: bool,
}

impl<'a> ActionButton<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            shortcut: None,
            enabled: true,
        }
    }

    /// Add a shortcut hint.
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Show the button and return true if clicked while enabled.
    pub fn show(self, ui: &mut Ui) -> bool {
        let size = vec2(ui.available_width(), sizing::ROW + 2.0);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if !self.enabled {
                Color32::from_gray(248)
            } else if response.hovered() {
                Color32::from_gray(232)
            } else {
                Color32::from_gray(242)
            };
            let text_color = if self.enabled { theme::TEXT } else { Color32::from_gray(180) };

            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter().text(
                pos2(rect.left() + 8.0, rect.center().y),
                Align2::LEFT_CENTER,
                self.label,
                FontId::proportional(12.0),
                text_color,
            );

            if let Some(shortcut) = self.shortcut {
                ui.painter().text(
                    pos2(rect.right() - 8.0, rect.center().y),
                    Align2::RIGHT_CENTER,
                    shortcut,
                    FontId::proportional(11.0),
                    theme::TEXT_MUTED,
                );
            }
        }

        let clicked = response.clicked();
        if self.enabled {
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
        self.enabled && clicked
    }
}

//! egui components for the Roundel circular image view.
//!
//! - **Canvas**: an egui painter behind the core drawing contract, plus a
//!   texture cache for bitmaps
//! - **CircleImage**: a widget that lays out and paints a view
//! - **Controls**: switch rows, action buttons, color rows
//! - **Layout**: section labels, separators, panel frames

pub mod canvas;
pub mod circle_image;
pub mod colors;
pub mod controls;
pub mod layout;

pub use canvas::{color32, rgba, EguiCanvas, TextureCache};
pub use circle_image::CircleImage;
pub use colors::{colors_match, ColorRow, ColorSwatch, PALETTE};
pub use controls::{ActionButton, SwitchRow};
pub use layout::{panel_frame, section_label, separator};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Color swatch size
    pub const SWATCH: f32 = 20.0;
    /// Row height for switches and buttons
    pub const ROW: f32 = 26.0;
    /// Switch track size
    pub const SWITCH_WIDTH: f32 = 30.0;
    pub const SWITCH_HEIGHT: f32 = 16.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (dark gray)
    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    /// Muted text color
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Selection/active color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
}

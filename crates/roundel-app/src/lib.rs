//! Roundel Application
//!
//! Native demo shell: a window hosting a circle image view rendered with
//! Vello, an egui control panel for its style, and PNG export.

mod app;
mod export;
mod shortcuts;
mod ui;

pub use app::{App, AppConfig};
pub use export::{encode_png, ExportError};
pub use shortcuts::{action_for_key, Shortcut, ShortcutRegistry};
pub use ui::{apply_action, render_ui, FilterChoice, UiAction, UiState};

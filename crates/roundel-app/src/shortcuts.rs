//! Keyboard shortcut registry and dispatch.

use roundel_core::CircleImageView;

use crate::ui::UiAction;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+O").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }

    fn matches(&self, key: &str, ctrl: bool) -> bool {
        self.ctrl == ctrl && self.key.eq_ignore_ascii_case(key)
    }
}

const OPEN: Shortcut = Shortcut::new("O", true, "Open image...");
const EXPORT: Shortcut = Shortcut::new("E", true, "Export to PNG");
const OVERLAY: Shortcut = Shortcut::new("B", false, "Toggle border overlay");
const CIRCULAR: Shortcut = Shortcut::new("D", false, "Toggle circular transformation");

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![OPEN, EXPORT, OVERLAY, CIRCULAR]
    }

    /// Log all shortcuts at info level.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:8} {}", shortcut.format(), shortcut.description);
        }
    }
}

/// Map a pressed character key to an action, given the view's current state.
pub fn action_for_key(key: &str, ctrl: bool, view: &CircleImageView) -> Option<UiAction> {
    if OPEN.matches(key, ctrl) {
        Some(UiAction::OpenImage)
    } else if EXPORT.matches(key, ctrl) {
        Some(UiAction::ExportPng)
    } else if OVERLAY.matches(key, ctrl) {
        Some(UiAction::SetBorderOverlay(!view.is_border_overlay()))
    } else if CIRCULAR.matches(key, ctrl) {
        Some(UiAction::SetDisableCircular(!view.is_disable_circular_transformation()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(OPEN.format(), "Ctrl+O");
        assert_eq!(OVERLAY.format(), "B");
    }

    #[test]
    fn test_file_shortcuts_need_ctrl() {
        let view = CircleImageView::new();
        assert_eq!(action_for_key("o", true, &view), Some(UiAction::OpenImage));
        assert_eq!(action_for_key("E", true, &view), Some(UiAction::ExportPng));
        assert_eq!(action_for_key("o", false, &view), None);
    }

    #[test]
    fn test_toggles_follow_view_state() {
        let mut view = CircleImageView::new();
        assert_eq!(action_for_key("b", false, &view), Some(UiAction::SetBorderOverlay(true)));
        view.set_border_overlay(true);
        assert_eq!(action_for_key("b", false, &view), Some(UiAction::SetBorderOverlay(false)));

        assert_eq!(action_for_key("d", false, &view), Some(UiAction::SetDisableCircular(true)));
        assert_eq!(action_for_key("d", true, &view), None);
    }
}

//! Control panel and avatar strip.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use egui::{vec2, Context, RichText, Slider};
use roundel_core::{CircleImageView, ColorFilter, ColorMatrix, RgbaColor, ShadowStyle};
use roundel_widgets::{
    panel_frame, section_label, separator, theme, ActionButton, CircleImage, ColorRow, SwitchRow,
    TextureCache,
};

/// Width of the control panel, in points.
pub const PANEL_WIDTH: f32 = 250.0;
/// Height of the avatar strip, in points.
pub const AVATAR_STRIP_HEIGHT: f32 = 72.0;
const AVATAR_SIZE: f32 = 48.0;

/// Color filter presets offered by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterChoice {
    #[default]
    None,
    Grayscale,
    Tint,
    Warm,
}

impl FilterChoice {
    pub const ALL: [FilterChoice; 4] = [
        FilterChoice::None,
        FilterChoice::Grayscale,
        FilterChoice::Tint,
        FilterChoice::Warm,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterChoice::None => "None",
            FilterChoice::Grayscale => "Gray",
            FilterChoice::Tint => "Tint",
            FilterChoice::Warm => "Warm",
        }
    }

    fn build(self) -> Option<ColorFilter> {
        match self {
            FilterChoice::None => None,
            FilterChoice::Grayscale => Some(ColorFilter::grayscale()),
            FilterChoice::Tint => Some(ColorFilter::tint(RgbaColor::new(59, 130, 246, 96))),
            FilterChoice::Warm => Some(ColorFilter::Matrix(ColorMatrix::scale(1.0, 0.9, 0.75, 1.0))),
        }
    }
}

/// Actions triggered from the panel or keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SetBorderWidth(u32),
    SetBorderColor(RgbaColor),
    SetBorderOverlay(bool),
    SetFillColor(RgbaColor),
    SetCirclePadding(u32),
    SetDisableCircular(bool),
    SetFilter(FilterChoice),
    SetShadow(ShadowStyle),
    SetExportScale(u32),
    ClearImage,
    /// Needs a file dialog; handled by the shell.
    OpenImage,
    /// Handled by the shell.
    LoadImage(PathBuf),
    /// Needs the GPU; handled by the shell.
    ExportPng,
}

/// UI state that lives outside the view.
pub struct UiState {
    pub filter: FilterChoice,
    pub export_scale: u32,
    /// Area left for the view after panels, in points.
    pub view_rect: egui::Rect,
    pub status: Option<String>,
    /// One allocation per preset, so re-selecting keeps filter identity.
    filters: HashMap<FilterChoice, Arc<ColorFilter>>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            filter: FilterChoice::None,
            export_scale: 2,
            view_rect: egui::Rect::NOTHING,
            status: None,
            filters: HashMap::new(),
        }
    }
}

impl UiState {
    pub fn filter_for(&mut self, choice: FilterChoice) -> Option<Arc<ColorFilter>> {
        if let Some(filter) = self.filters.get(&choice) {
            return Some(filter.clone());
        }
        let filter = Arc::new(choice.build()?);
        self.filters.insert(choice, filter.clone());
        Some(filter)
    }
}

/// Apply an action to the view and avatars.
///
/// Returns `false` for actions the shell must handle itself.
pub fn apply_action(
    view: &mut CircleImageView,
    avatars: &mut [CircleImageView],
    ui_state: &mut UiState,
    action: &UiAction,
) -> bool {
    match action {
        UiAction::SetBorderWidth(width) => view.set_border_width(*width),
        UiAction::SetBorderColor(color) => view.set_border_color(*color),
        UiAction::SetBorderOverlay(overlay) => view.set_border_overlay(*overlay),
        UiAction::SetFillColor(color) => view.set_fill_color(*color),
        UiAction::SetCirclePadding(padding) => view.set_circle_padding(*padding),
        UiAction::SetDisableCircular(disable) => view.set_disable_circular_transformation(*disable),
        UiAction::SetFilter(choice) => {
            ui_state.filter = *choice;
            let filter = ui_state.filter_for(*choice);
            view.set_color_filter(filter.clone());
            for avatar in avatars.iter_mut() {
                avatar.set_color_filter(filter.clone());
            }
        }
        UiAction::SetShadow(shadow) => {
            view.set_enable_shadow(shadow.enabled)
                .set_shadow_color(shadow.color)
                .set_shadow_radius(shadow.radius)
                .set_shadow_dx(shadow.dx)
                .set_shadow_dy(shadow.dy);
        }
        UiAction::SetExportScale(scale) => ui_state.export_scale = (*scale).clamp(1, 4),
        UiAction::ClearImage => {
            view.set_image(None);
            for avatar in avatars.iter_mut() {
                avatar.set_image(None);
            }
            ui_state.status = None;
        }
        UiAction::OpenImage | UiAction::LoadImage(_) | UiAction::ExportPng => return false,
    }
    true
}

/// Render all UI panels and return any triggered action.
pub fn render_ui(
    ctx: &Context,
    ui_state: &mut UiState,
    view: &CircleImageView,
    avatars: &mut [CircleImageView],
    textures: &mut TextureCache,
) -> Option<UiAction> {
    let panel_action = render_control_panel(ctx, ui_state, view);
    render_avatar_strip(ctx, avatars, textures);
    ui_state.view_rect = ctx.available_rect();
    panel_action
}

fn render_control_panel(ctx: &Context, ui_state: &UiState, view: &CircleImageView) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::right("controls")
        .exact_width(PANEL_WIDTH)
        .resizable(false)
        .frame(panel_frame())
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.spacing_mut().item_spacing = vec2(4.0, 6.0);

                if ActionButton::new("Open image…").shortcut("Ctrl+O").show(ui) {
                    action = Some(UiAction::OpenImage);
                }
                let has_image = view.image_source().is_some();
                if ActionButton::new("Export PNG").shortcut("Ctrl+E").enabled(has_image).show(ui) {
                    action = Some(UiAction::ExportPng);
                }
                if ActionButton::new("Clear image").enabled(has_image).show(ui) {
                    action = Some(UiAction::ClearImage);
                }
                let mut scale = ui_state.export_scale;
                if ui.add(Slider::new(&mut scale, 1..=4).text("export scale").suffix("x")).changed() {
                    action = Some(UiAction::SetExportScale(scale));
                }
                separator(ui);

                section_label(ui, "Border");
                let mut width = view.border_width();
                if ui.add(Slider::new(&mut width, 0..=40).text("width").suffix(" px")).changed() {
                    action = Some(UiAction::SetBorderWidth(width));
                }
                if let Some(color) = ColorRow::new("Border color", view.border_color()).show(ui) {
                    action = Some(UiAction::SetBorderColor(color));
                }
                if let Some(on) = SwitchRow::new("Border overlay", view.is_border_overlay())
                    .shortcut("B")
                    .show(ui)
                {
                    action = Some(UiAction::SetBorderOverlay(on));
                }
                separator(ui);

                section_label(ui, "Circle");
                if let Some(color) = ColorRow::new("Fill color", view.fill_color()).allow_none().show(ui) {
                    action = Some(UiAction::SetFillColor(color));
                }
                let mut padding = view.circle_padding();
                if ui.add(Slider::new(&mut padding, 0..=40).text("padding").suffix(" px")).changed() {
                    action = Some(UiAction::SetCirclePadding(padding));
                }
                if let Some(on) = SwitchRow::new("Plain image", view.is_disable_circular_transformation())
                    .shortcut("D")
                    .show(ui)
                {
                    action = Some(UiAction::SetDisableCircular(on));
                }
                separator(ui);

                section_label(ui, "Color filter");
                ui.horizontal(|ui| {
                    for choice in FilterChoice::ALL {
                        if ui.selectable_label(ui_state.filter == choice, choice.label()).clicked()
                            && ui_state.filter != choice
                        {
                            action = Some(UiAction::SetFilter(choice));
                        }
                    }
                });
                separator(ui);

                if let Some(shadow) = shadow_controls(ui, view.shadow()) {
                    action = Some(UiAction::SetShadow(shadow));
                }

                if let Some(status) = &ui_state.status {
                    separator(ui);
                    ui.label(RichText::new(status).size(11.0).color(theme::TEXT_MUTED));
                }
            });
        });

    action
}

fn shadow_controls(ui: &mut egui::Ui, current: &ShadowStyle) -> Option<ShadowStyle> {
    let mut shadow = *current;
    let mut changed = false;

    section_label(ui, "Shadow");
    if let Some(on) = SwitchRow::new("Enabled", shadow.enabled).show(ui) {
        shadow.enabled = on;
        changed = true;
    }
    changed |= ui.add(Slider::new(&mut shadow.radius, 0.0..=25.0).text("radius")).changed();
    changed |= ui.add(Slider::new(&mut shadow.dx, -20.0..=20.0).text("dx (dp)")).changed();
    changed |= ui.add(Slider::new(&mut shadow.dy, -20.0..=20.0).text("dy (dp)")).changed();
    if let Some(color) = ColorRow::new("Shadow color", shadow.color).show(ui) {
        shadow.color = color;
        changed = true;
    }
    ui.label(
        RichText::new("Offsets apply on the next layout.")
            .size(10.0)
            .color(theme::TEXT_MUTED),
    );

    changed.then_some(shadow)
}

fn render_avatar_strip(ctx: &Context, avatars: &mut [CircleImageView], textures: &mut TextureCache) {
    egui::TopBottomPanel::bottom("avatars")
        .exact_height(AVATAR_STRIP_HEIGHT)
        .frame(egui::Frame::new().fill(theme::PANEL_BG).inner_margin(egui::Margin::same(12)))
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing = vec2(12.0, 0.0);
                for avatar in avatars.iter_mut() {
                    CircleImage::new(avatar, textures)
                        .size(vec2(AVATAR_SIZE, AVATAR_SIZE))
                        .tooltip("Preview")
                        .show(ui);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundel_core::{Bitmap, View};

    fn view_with_image() -> CircleImageView {
        let mut view = CircleImageView::new();
        view.set_image_bitmap(Some(Bitmap::filled(8, 8, RgbaColor::WHITE).unwrap()));
        view.on_size_changed(64, 64, 0, 0);
        view
    }

    #[test]
    fn test_style_actions_reach_view() {
        let mut view = view_with_image();
        let mut ui_state = UiState::default();

        assert!(apply_action(&mut view, &mut [], &mut ui_state, &UiAction::SetBorderWidth(6)));
        assert!(apply_action(&mut view, &mut [], &mut ui_state, &UiAction::SetBorderOverlay(true)));
        assert!(apply_action(&mut view, &mut [], &mut ui_state, &UiAction::SetCirclePadding(3)));
        assert_eq!(view.border_width(), 6);
        assert!(view.is_border_overlay());
        assert_eq!(view.circle_padding(), 3);
    }

    #[test]
    fn test_shell_actions_are_deferred() {
        let mut view = CircleImageView::new();
        let mut ui_state = UiState::default();
        assert!(!apply_action(&mut view, &mut [], &mut ui_state, &UiAction::OpenImage));
        assert!(!apply_action(&mut view, &mut [], &mut ui_state, &UiAction::ExportPng));
        assert!(!apply_action(
            &mut view,
            &mut [],
            &mut ui_state,
            &UiAction::LoadImage(PathBuf::from("x.png"))
        ));
    }

    #[test]
    fn test_filter_presets_keep_identity() {
        let mut view = view_with_image();
        let mut avatars = [view_with_image()];
        let mut ui_state = UiState::default();

        apply_action(&mut view, &mut avatars, &mut ui_state, &UiAction::SetFilter(FilterChoice::Grayscale));
        let first = view.color_filter().cloned().unwrap();
        assert!(Arc::ptr_eq(avatars[0].color_filter().unwrap(), &first));

        apply_action(&mut view, &mut avatars, &mut ui_state, &UiAction::SetFilter(FilterChoice::None));
        assert!(view.color_filter().is_none());

        view.take_redraw_request();
        apply_action(&mut view, &mut avatars, &mut ui_state, &UiAction::SetFilter(FilterChoice::Grayscale));
        assert!(Arc::ptr_eq(view.color_filter().unwrap(), &first));
        assert_eq!(ui_state.filter, FilterChoice::Grayscale);
    }

    #[test]
    fn test_shadow_action_sets_every_field() {
        let mut view = CircleImageView::new();
        let mut ui_state = UiState::default();
        let shadow = ShadowStyle {
            enabled: true,
            color: RgbaColor::rgb(10, 10, 10),
            radius: 6.0,
            dx: 1.0,
            dy: 3.0,
        };
        apply_action(&mut view, &mut [], &mut ui_state, &UiAction::SetShadow(shadow));
        assert_eq!(*view.shadow(), shadow);
    }

    #[test]
    fn test_export_scale_clamped() {
        let mut view = CircleImageView::new();
        let mut ui_state = UiState::default();
        apply_action(&mut view, &mut [], &mut ui_state, &UiAction::SetExportScale(9));
        assert_eq!(ui_state.export_scale, 4);
    }

    #[test]
    fn test_clear_image() {
        let mut view = view_with_image();
        let mut avatars = [view_with_image()];
        let mut ui_state = UiState::default();
        apply_action(&mut view, &mut avatars, &mut ui_state, &UiAction::ClearImage);
        assert!(view.bitmap().is_none());
        assert!(avatars[0].bitmap().is_none());
    }
}

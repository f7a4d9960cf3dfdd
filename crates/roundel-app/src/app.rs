//! Core application state and lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kurbo::{Size, Vec2};
use peniko::Color;
use roundel_core::{extract_bitmap, Attributes, AttributeError, Bitmap, CircleImageView, ImageSource, RgbaColor, View};
use roundel_render::{RenderContext, Renderer, RendererError, VelloRenderer};
use roundel_widgets::TextureCache;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::EventLoopError;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState};
use winit::window::{Window, WindowId};

use crate::export::{encode_png, render_scene_to_png, render_target, ExportError};
use crate::shortcuts::action_for_key;
use crate::ui::{apply_action, render_ui, UiAction, UiState};

const AVATAR_COUNT: usize = 4;
/// Space kept between the view and the edges of its area, in points.
const VIEW_MARGIN: f32 = 24.0;
const DEMO_SIZE: u32 = 256;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Attributes the main view is constructed with.
    pub attributes: Attributes,
    /// Image path or URI to show at startup.
    pub image: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Roundel".to_string(),
            width: 1100,
            height: 760,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            attributes: Attributes::default(),
            image: None,
        }
    }
}

impl AppConfig {
    /// Build a config from command-line arguments.
    ///
    /// A `.json` argument is loaded as view attributes; any other argument
    /// is the startup image.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, AttributeError> {
        let mut config = Self::default();
        for arg in args {
            if arg.to_ascii_lowercase().ends_with(".json") {
                config.attributes = Attributes::load(&arg)?;
                log::info!("Loaded attributes from {}", arg);
            } else {
                config.image = Some(arg);
            }
        }
        Ok(config)
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    scene_renderer: VelloRenderer,
    /// Copies the Rgba8Unorm render target to the surface format.
    texture_blitter: vello::wgpu::util::TextureBlitter,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,
    textures: TextureCache,

    // Views
    view: CircleImageView,
    avatars: Vec<CircleImageView>,

    background_color: Color,
    modifiers: ModifiersState,
    /// Actions from keyboard and file drops, applied on the next frame.
    pending_actions: Vec<UiAction>,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
        }
    }

    /// Run the application until the window closes.
    pub fn run(mut self) -> Result<(), EventLoopError> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)
    }

    /// Finish initialization after the surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) -> Result<(), RendererError> {
        let render_cx = self
            .render_cx
            .as_ref()
            .ok_or_else(|| RendererError::InitFailed("render context missing".to_string()))?;
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(format!("{:?}", e)))?;
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        // Setup requested while constructing is deferred until attach.
        let mut view = CircleImageView::unattached(&self.config.attributes);
        match &self.config.image {
            Some(uri) => view.set_image_uri(Some(uri.as_str())),
            None => view.set_image_bitmap(demo_bitmap()),
        }
        view.attach();

        let avatars = make_avatars(&view);

        log::info!(
            "Roundel initialized - {}x{}",
            surface.config.width,
            surface.config.height
        );

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            scene_renderer: VelloRenderer::new(),
            texture_blitter,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            textures: TextureCache::new(),
            view,
            avatars,
            background_color: self.config.background_color,
            modifiers: ModifiersState::empty(),
            pending_actions: Vec::new(),
        });

        window.request_redraw();
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };
        log::info!("Surface size: {}x{}", width, height);

        let render_cx = self.render_cx.get_or_insert_with(vello::util::RenderContext::new);
        let surface = match pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        )) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.finish_init(window, surface) {
            log::error!("{}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        if egui_response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if egui_response.consumed || state.egui_ctx.wants_keyboard_input() {
                    return;
                }
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let Key::Character(key) = &event.logical_key {
                    let ctrl = state.modifiers.control_key() || state.modifiers.super_key();
                    if let Some(action) = action_for_key(key.as_str(), ctrl, &state.view) {
                        state.pending_actions.push(action);
                        state.window.request_redraw();
                    }
                }
            }

            WindowEvent::DroppedFile(path) => {
                state.pending_actions.push(UiAction::LoadImage(path));
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let Some(render_cx) = self.render_cx.as_ref() else {
                    return;
                };
                let device_handle = &render_cx.devices[state.surface.dev_id];
                let device = &device_handle.device;
                let queue = &device_handle.queue;

                // Run egui and collect actions
                let egui_input = state.egui_state.take_egui_input(&state.window);
                let mut actions = std::mem::take(&mut state.pending_actions);
                let egui_output = state.egui_ctx.run(egui_input, |ctx| {
                    if let Some(action) = render_ui(
                        ctx,
                        &mut state.ui_state,
                        &state.view,
                        &mut state.avatars,
                        &mut state.textures,
                    ) {
                        actions.push(action);
                    }
                });
                state.textures.trim();
                state.egui_state.handle_platform_output(&state.window, egui_output.platform_output);
                let egui_primitives = state.egui_ctx.tessellate(egui_output.shapes, egui_output.pixels_per_point);

                for action in actions {
                    if apply_action(&mut state.view, &mut state.avatars, &mut state.ui_state, &action) {
                        continue;
                    }
                    match action {
                        UiAction::OpenImage => {
                            if let Some(path) = pick_image() {
                                load_image(state, &path);
                            }
                        }
                        UiAction::LoadImage(path) => load_image(state, &path),
                        UiAction::ExportPng => {
                            let result = export_view(
                                device,
                                queue,
                                &mut state.vello_renderer,
                                &mut state.scene_renderer,
                                &state.view,
                                state.ui_state.export_scale,
                            );
                            state.ui_state.status = Some(match result {
                                Ok(Some(path)) => format!("Exported {}", path.display()),
                                Ok(None) => "Export cancelled".to_string(),
                                Err(e) => {
                                    log::error!("PNG export failed: {}", e);
                                    format!("Export failed: {}", e)
                                }
                            });
                        }
                        _ => {}
                    }
                }

                let pixels_per_point = egui_output.pixels_per_point;
                let view_rect = state.ui_state.view_rect;
                let (origin, side) = view_placement(view_rect);
                if (side, side) != (state.view.width(), state.view.height()) {
                    let (old_width, old_height) = (state.view.width(), state.view.height());
                    state.view.on_size_changed(side, side, old_width, old_height);
                }
                state.view.take_redraw_request();

                let width = state.surface.config.width;
                let height = state.surface.config.height;
                let render_ctx = RenderContext::new(&state.view, Size::new(width as f64, height as f64))
                    .with_scale_factor(pixels_per_point as f64)
                    .with_origin(origin)
                    .with_background(Some(state.background_color));
                state.scene_renderer.build_scene(&render_ctx);
                let base_color = state.scene_renderer.background_color(&render_ctx);
                let scene = state.scene_renderer.take_scene();

                let surface_texture = match state.surface.surface.get_current_texture() {
                    Ok(t) => t,
                    Err(e) => {
                        log::warn!("Failed to get surface texture: {:?}", e);
                        return;
                    }
                };

                let params = RenderParams {
                    base_color,
                    width,
                    height,
                    antialiasing_method: AaConfig::Area,
                };

                let render_texture = render_target(device, "vello render texture", width, height);
                let render_texture_view = render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

                if let Err(e) =
                    state
                        .vello_renderer
                        .render_to_texture(device, queue, &scene, &render_texture_view, &params)
                {
                    log::error!("Failed to render: {:?}", e);
                    return;
                }

                let surface_view = surface_texture
                    .texture
                    .create_view(&vello::wgpu::TextureViewDescriptor::default());

                {
                    let mut blit_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                        label: Some("blit encoder"),
                    });
                    state
                        .texture_blitter
                        .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
                    queue.submit(std::iter::once(blit_encoder.finish()));
                }

                for (id, image_delta) in &egui_output.textures_delta.set {
                    state.egui_renderer.update_texture(device, queue, *id, image_delta);
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [width, height],
                    pixels_per_point,
                };

                {
                    let mut egui_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                        label: Some("egui encoder"),
                    });
                    state.egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut egui_encoder,
                        &egui_primitives,
                        &screen_descriptor,
                    );

                    let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                        label: Some("egui render pass"),
                        color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                            view: &surface_view,
                            resolve_target: None,
                            ops: vello::wgpu::Operations {
                                load: vello::wgpu::LoadOp::Load,
                                store: vello::wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });
                    // egui-wgpu wants a 'static render pass.
                    let mut render_pass = render_pass.forget_lifetime();
                    state
                        .egui_renderer
                        .render(&mut render_pass, &egui_primitives, &screen_descriptor);
                    drop(render_pass);

                    queue.submit(std::iter::once(egui_encoder.finish()));
                }

                for id in &egui_output.textures_delta.free {
                    state.egui_renderer.free_texture(id);
                }
                surface_texture.present();

                let egui_wants_repaint = egui_output
                    .viewport_output
                    .get(&egui::ViewportId::ROOT)
                    .is_some_and(|viewport| viewport.repaint_delay.is_zero());
                if egui_wants_repaint || state.view.needs_redraw() {
                    state.window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Top-left corner and side of the square view, centered in `area`.
fn view_placement(area: egui::Rect) -> (Vec2, u32) {
    if !area.is_positive() {
        return (Vec2::ZERO, 0);
    }
    let side = (area.width().min(area.height()) - 2.0 * VIEW_MARGIN).max(0.0);
    let center = area.center();
    let origin = Vec2::new((center.x - side / 2.0) as f64, (center.y - side / 2.0) as f64);
    (origin, side.round() as u32)
}

/// Small views sharing the main view's decoded pixels.
fn make_avatars(view: &CircleImageView) -> Vec<CircleImageView> {
    (0..AVATAR_COUNT)
        .map(|i| {
            let mut avatar = CircleImageView::new();
            avatar.set_border_width(2);
            avatar.set_border_color(RgbaColor::WHITE);
            avatar.set_border_overlay(i % 2 == 1);
            avatar.set_image_bitmap(view.decoded_bitmap().cloned());
            avatar
        })
        .collect()
}

/// Decode a file once and share its pixels with every view.
fn load_image(state: &mut AppState, path: &Path) {
    let source = ImageSource::Uri(path.to_string_lossy().into_owned());
    match extract_bitmap(&source, None) {
        Ok(bitmap) => {
            log::info!("Loaded image {:?} ({}x{})", path.file_name(), bitmap.width(), bitmap.height());
            state.ui_state.status = Some(format!("{}x{} image", bitmap.width(), bitmap.height()));
            for avatar in state.avatars.iter_mut() {
                avatar.set_image_bitmap(Some(bitmap.clone()));
            }
            state.view.set_image_bitmap(Some(bitmap));
        }
        Err(e) => {
            log::error!("Failed to load image {:?}: {}", path, e);
            state.ui_state.status = Some(format!("Could not load image: {}", e));
        }
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Image")
        .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
        .pick_file()
}

/// Render the view alone and save it where the user picks.
///
/// Returns `Ok(None)` if the save dialog was cancelled.
fn export_view(
    device: &vello::wgpu::Device,
    queue: &vello::wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    scene_renderer: &mut VelloRenderer,
    view: &CircleImageView,
    scale: u32,
) -> Result<Option<PathBuf>, ExportError> {
    let (scene, bounds) = scene_renderer.build_export_scene(view, scale as f64);
    let bounds = bounds.ok_or(ExportError::Empty)?;
    let width = bounds.width().ceil() as u32;
    let height = bounds.height().ceil() as u32;

    let result = render_scene_to_png(device, queue, vello_renderer, &scene, width, height)?;
    let png_data = encode_png(&result.rgba_data, result.width, result.height)?;

    let Some(path) = rfd::FileDialog::new()
        .set_title("Export PNG")
        .set_file_name("roundel.png")
        .add_filter("PNG Image", &["png"])
        .save_file()
    else {
        return Ok(None);
    };
    std::fs::write(&path, &png_data)?;
    log::info!("Exported PNG to {:?} ({} bytes)", path, png_data.len());
    Ok(Some(path))
}

/// Placeholder image shown when no image was given: a diagonal gradient.
fn demo_bitmap() -> Option<Bitmap> {
    let mut pixels = Vec::with_capacity((DEMO_SIZE * DEMO_SIZE * 4) as usize);
    for y in 0..DEMO_SIZE {
        for x in 0..DEMO_SIZE {
            let t = (x + y) as f32 / (2 * (DEMO_SIZE - 1)) as f32;
            pixels.extend_from_slice(&[
                (59.0 + t * (244.0 - 59.0)) as u8,
                (130.0 - t * (130.0 - 63.0)) as u8,
                (246.0 - t * (246.0 - 94.0)) as u8,
                255,
            ]);
        }
    }
    match Bitmap::from_rgba(DEMO_SIZE, DEMO_SIZE, pixels) {
        Ok(bitmap) => Some(bitmap),
        Err(e) => {
            log::warn!("Failed to build demo image: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_args_reads_attributes_and_image() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r##"{{"borderWidth": 7, "borderColor": "#ff0000"}}"##).unwrap();

        let args = vec![file.path().to_string_lossy().into_owned(), "avatar.png".to_string()];
        let config = AppConfig::from_args(args).unwrap();
        assert_eq!(config.attributes.border_width, 7);
        assert_eq!(config.attributes.border_color, RgbaColor::rgb(255, 0, 0));
        assert_eq!(config.image.as_deref(), Some("avatar.png"));
    }

    #[test]
    fn test_from_args_missing_attributes_file() {
        let result = AppConfig::from_args(vec!["/nonexistent/roundel.json".to_string()]);
        assert!(matches!(result, Err(AttributeError::Io(_))));
    }

    #[test]
    fn test_view_placement_centers_square() {
        let area = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(400.0, 300.0));
        let (origin, side) = view_placement(area);
        assert_eq!(side, 252);
        assert_eq!(origin, Vec2::new(74.0, 24.0));
        assert_eq!(view_placement(egui::Rect::NOTHING), (Vec2::ZERO, 0));
    }

    #[test]
    fn test_avatars_share_decoded_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        std::fs::write(&path, encode_png(&[10, 20, 30, 255].repeat(16), 4, 4).unwrap()).unwrap();

        let mut view = CircleImageView::new();
        view.set_image_uri(Some(path.to_string_lossy().as_ref()));
        view.set_disable_circular_transformation(true);
        let decoded = view.decoded_bitmap().unwrap().clone();

        // Avatars must not go back to disk.
        std::fs::remove_file(&path).unwrap();
        let avatars = make_avatars(&view);
        assert_eq!(avatars.len(), AVATAR_COUNT);
        for avatar in &avatars {
            assert!(avatar.bitmap().unwrap().shares_pixels(&decoded));
        }
    }

    #[test]
    fn test_demo_bitmap() {
        let bitmap = demo_bitmap().unwrap();
        assert_eq!(bitmap.width(), DEMO_SIZE);
        assert_eq!(bitmap.pixel(0, 0), Some(RgbaColor::rgb(59, 130, 246)));
    }
}

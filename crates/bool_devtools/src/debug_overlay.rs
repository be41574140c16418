//! Text half of the debug overlay, rendered via egui on top of the scaled
//! framebuffer. Outlines are drawn by the game into the framebuffer itself.
//!
//! egui needs a three-phase render split because `egui_wgpu::Renderer::render()`
//! wants a `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run the UI, produce tessellated primitives
//!   2. `upload()`  -- upload textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! Event handling stays active while hidden so toggling never drops input state.

use bool_core::time::TimeState;
use winit::window::Window;

const READOUT_COLOR: egui::Color32 = egui::Color32::WHITE;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub actor_tile: (i32, i32),
    pub actor_motion: String,
    pub actor_facing: String,
    /// Tile under the pointer, if the pointer is inside the window.
    pub pointer_tile: Option<(i32, i32)>,
    pub camera_position: (i32, i32),
    pub camera_clamped: bool,
    pub doors_open: usize,
    pub door_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    /// User flipped the camera clamp checkbox
    pub toggle_camera_clamp: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
        visible: bool,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        self.visible && response.consumed
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        log::info!("Debug overlay: {}", if visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let visible = self.visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !visible {
                return;
            }

            egui::Area::new(egui::Id::new("debug_readouts"))
                .anchor(egui::Align2::LEFT_TOP, [4.0, 4.0])
                .interactable(false)
                .show(ctx, |ui| {
                    readout(
                        ui,
                        format!("Player: {}, {}", stats.actor_tile.0, stats.actor_tile.1),
                    );
                    match stats.pointer_tile {
                        Some((x, y)) => readout(ui, format!("Mouse: {}, {}", x, y)),
                        None => readout(ui, "Mouse: -".to_string()),
                    }
                });

            egui::Window::new("Debug")
                .anchor(egui::Align2::RIGHT_TOP, [-4.0, 4.0])
                .resizable(false)
                .default_open(false)
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                    ui.label(format!("Ticks: {}", time.fixed_step_count));
                    ui.separator();
                    ui.label(format!(
                        "Actor: {} facing {}",
                        stats.actor_motion, stats.actor_facing
                    ));
                    ui.label(format!(
                        "Doors open: {}/{}",
                        stats.doors_open, stats.door_count
                    ));
                    ui.label(format!(
                        "Camera: {}, {}",
                        stats.camera_position.0, stats.camera_position.1
                    ));
                    let mut clamped = stats.camera_clamped;
                    if ui.checkbox(&mut clamped, "Clamp camera").changed() {
                        actions.toggle_camera_clamp = true;
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn readout(ui: &mut egui::Ui, text: String) {
    ui.label(
        egui::RichText::new(text)
            .monospace()
            .color(READOUT_COLOR)
            .background_color(egui::Color32::from_black_alpha(160)),
    );
}

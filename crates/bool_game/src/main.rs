//! Bool -- a tile-locked top-down walker.
//!
//! winit drives the event loop via `ApplicationHandler`. Simulation runs inside
//! `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- one `Session::tick` per fixed slice
//!   3. Compose the framebuffer on the CPU and upload it as a texture
//!   4. Draw the framebuffer, then composite the egui debug overlay
//!
//! Hot reload: the level JSON is watched via mtime polling and swapped in at
//! frame boundaries.

mod actor;
mod config;
mod door;
mod level;
mod render;
#[cfg(test)]
mod replay;
mod session;
mod sprites;
mod world;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use bool_core::input::{InputState, Key};
use bool_core::time::TimeState;
use bool_devtools::{DebugOverlay, OverlayStats};
use bool_platform::window::PlatformConfig;
use bool_render::{FramePresenter, GpuContext};
use glam::IVec2;

use config::GameConfig;
use level::LevelWatcher;
use session::{GameMode, Session};

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    presenter: FramePresenter,
    debug_overlay: DebugOverlay,
    time: TimeState,
    input: InputState,
    session: Session,
    level_watcher: LevelWatcher,
}

impl EngineState {
    fn new(window: Arc<Window>, session: Session, config: &GameConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let screen = session.screen_size();
        let presenter = FramePresenter::new(&gpu.device, gpu.surface_format, screen.x, screen.y);
        let debug_overlay =
            DebugOverlay::new(&gpu.device, gpu.surface_format, &window, session.debug());

        Ok(Self {
            window,
            gpu,
            presenter,
            debug_overlay,
            time: TimeState::new(config.tick_rate_hz),
            input: InputState::new(),
            session,
            level_watcher: LevelWatcher::new(config.level.clone()),
        })
    }

    fn reload_level(&mut self) {
        let path = self.level_watcher.path().to_path_buf();
        let result = level::load_level_from_path(&path).and_then(|level| {
            let tileset = session::load_tileset(&path, &level)?;
            self.session.replace_level(&level, tileset)
        });
        if let Err(err) = result {
            log::error!("Level reload failed, keeping the current map: {err}");
        }
    }

    /// Handle keys that act on press rather than feeding the per-tick intent.
    fn handle_command_key(&mut self, key: Key) {
        match key {
            Key::Escape | Key::Q => self.session.set_mode(GameMode::Exit),
            Key::I => {
                let on = self.session.toggle_debug();
                self.debug_overlay.set_visible(on);
            }
            Key::C => {
                self.session.toggle_camera_clamp();
            }
            _ => {}
        }
    }

    /// Tile under the mouse, mapping window pixels to framebuffer pixels first
    /// since the window may have been resized.
    fn pointer_tile(&self) -> Option<IVec2> {
        let (x, y) = self.input.pointer_position?;
        let (win_w, win_h) = self.gpu.size;
        if win_w == 0 || win_h == 0 {
            return None;
        }
        let screen = self.session.screen_size();
        let fb_x = (x * f64::from(screen.x) / f64::from(win_w)).floor() as i32;
        let fb_y = (y * f64::from(screen.y) / f64::from(win_h)).floor() as i32;
        Some(self.session.tile_at_screen(IVec2::new(fb_x, fb_y)))
    }

    fn overlay_stats(&self) -> OverlayStats {
        let actor = self.session.actor();
        let camera = self.session.camera();
        let doors = self.session.grid().doors();
        OverlayStats {
            actor_tile: actor.tile_pos().into(),
            actor_motion: actor.motion().label().to_string(),
            actor_facing: actor.facing().label().to_string(),
            pointer_tile: self.pointer_tile().map(Into::into),
            camera_position: camera.position.into(),
            camera_clamped: self.session.camera_clamped(),
            doors_open: doors.iter().filter(|door| door.is_open()).count(),
            door_count: doors.len(),
        }
    }
}

struct App {
    config: GameConfig,
    /// Built before the window exists; moved into the engine on resume.
    pending_session: Option<Session>,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig, session: Session) -> Self {
        Self {
            config,
            pending_session: Some(session),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(session) = self.pending_session.take() else {
            return;
        };

        let screen = session.screen_size();
        let platform = PlatformConfig {
            title: self.config.title.clone(),
            width: screen.x,
            height: screen.y,
        };
        let state = bool_platform::window::create_window(event_loop, &platform)
            .and_then(|window| EngineState::new(window, session, &self.config));
        match state {
            Ok(state) => {
                log::info!("Window created: {}x{}", platform.width, platform.height);
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("Startup failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.release_all(),

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => {
                                if !event.repeat {
                                    state.handle_command_key(key);
                                }
                                state.input.key_down(key);
                            }
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
                if state.session.mode() == GameMode::Exit {
                    log::info!("Exit requested.");
                    event_loop.exit();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.pointer_position = Some((position.x, position.y));
            }

            WindowEvent::CursorLeft { .. } => {
                state.input.pointer_position = None;
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Fixed-step simulation phase.
                state.time.begin_frame();
                let mut scene_changed = state.time.frame_count == 1;

                if state.level_watcher.should_reload() {
                    state.reload_level();
                    scene_changed = true;
                }

                while state.time.should_step() {
                    state.session.tick(state.input.intent());
                    // Edges are consumed by the first step that sees them; a
                    // press landing on a frame with no steps waits for the next.
                    state.input.end_frame();
                }

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                if scene_changed || state.time.steps_this_frame > 0 {
                    let frame = state.session.render();
                    state
                        .presenter
                        .upload(&state.gpu.device, &state.gpu.queue, frame);
                }

                let stats = state.overlay_stats();
                let (egui_primitives, egui_textures_delta, overlay_actions) = state
                    .debug_overlay
                    .prepare(&state.window, &state.time, &stats);

                if overlay_actions.toggle_camera_clamp {
                    state.session.toggle_camera_clamp();
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });
                    state.presenter.draw(&mut render_pass);
                }

                state.debug_overlay.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .debug_overlay
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.debug_overlay.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyI => Some(Key::I),
        KeyCode::KeyC => Some(Key::C),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Bool starting...");

    let session = config::load_config_or_default(Path::new(config::DEFAULT_CONFIG_PATH))
        .and_then(|config| Session::from_config(&config).map(|session| (config, session)));
    let (config, session) = match session {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, session);
    event_loop.run_app(&mut app).expect("Event loop error");
    log::info!("Bye.");
}

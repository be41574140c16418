//! One running game: the world, the actor, the camera and the renderer, driven
//! one fixed tick at a time. Nothing here touches the window, so the whole
//! pipeline runs headless in tests.
//!
//! Tick order: doors advance, then the actor updates against the new door
//! states, then the camera recentres on the actor.

use std::path::Path;

use bool_core::PlayerIntent;
use bool_render::image::{Image, Rgba};
use bool_render::Camera;
use glam::{IVec2, UVec2};

use crate::actor::{Actor, ActorStep, MotionState};
use crate::config::GameConfig;
use crate::level::{self, LevelFile};
use crate::render::SceneRenderer;
use crate::sprites::{self, SpriteSet, Tileset};
use crate::world::TileGrid;

const MENU_BACKGROUND: Rgba = [88, 88, 88, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Placeholder; nothing updates and the screen shows a flat background.
    Menu,
    Play,
    Exit,
}

pub struct Session {
    mode: GameMode,
    grid: TileGrid,
    actor: Actor,
    camera: Camera,
    sprites: SpriteSet,
    renderer: SceneRenderer,
    start_tile: IVec2,
    debug: bool,
}

impl Session {
    pub fn new(
        grid: TileGrid,
        sprites: SpriteSet,
        start_tile: IVec2,
        viewport_tiles: UVec2,
        scale: u32,
    ) -> Result<Self, String> {
        if !grid.in_bounds(start_tile) {
            return Err(format!(
                "Start tile ({}, {}) is outside the {}x{} map",
                start_tile.x,
                start_tile.y,
                grid.width(),
                grid.height()
            ));
        }
        if grid.would_collide(start_tile) {
            log::warn!(
                "Start tile ({}, {}) is blocked; the actor can only turn until it is freed",
                start_tile.x,
                start_tile.y
            );
        }

        let actor = Actor::new(start_tile, grid.tile_size(), &sprites.actor);
        let mut camera = Camera::new(viewport_tiles, grid.tile_size() as u32, scale);
        camera.follow(actor.pixel_pos(), grid.pixel_size());
        let renderer = SceneRenderer::new(grid.pixel_size(), &camera);

        Ok(Self {
            mode: GameMode::Play,
            grid,
            actor,
            camera,
            sprites,
            renderer,
            start_tile,
            debug: false,
        })
    }

    /// Build a session from settings, loading the level and sprites they name.
    pub fn from_config(config: &GameConfig) -> Result<Self, String> {
        let level = level::load_level_from_path(&config.level)?;
        let sprites = load_sprite_set(config, &config.level, &level)?;
        let grid = level.build_grid(sprites.door.len())?;
        log::info!(
            "Loaded level {} ({}x{} tiles of {}px, {} doors)",
            config.level.display(),
            grid.width(),
            grid.height(),
            grid.tile_size(),
            grid.doors().len()
        );

        let mut session = Self::new(
            grid,
            sprites,
            config.start_tile(),
            config.viewport_tiles(),
            config.scale,
        )?;
        session.set_camera_clamp(config.clamp_camera);
        session.debug = config.debug;
        Ok(session)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::info!("Game mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }

    pub fn camera_clamped(&self) -> bool {
        self.camera.clamp_to_world
    }

    pub fn set_camera_clamp(&mut self, clamp: bool) {
        self.camera.clamp_to_world = clamp;
        self.camera.follow(self.actor.pixel_pos(), self.grid.pixel_size());
    }

    pub fn toggle_camera_clamp(&mut self) -> bool {
        self.set_camera_clamp(!self.camera.clamp_to_world);
        log::info!(
            "Camera clamp: {}",
            if self.camera.clamp_to_world { "ON" } else { "OFF" }
        );
        self.camera.clamp_to_world
    }

    /// Framebuffer size in pixels.
    pub fn screen_size(&self) -> UVec2 {
        self.camera.screen_px()
    }

    /// One fixed step. Returns what the actor did, or `None` outside play.
    pub fn tick(&mut self, intent: PlayerIntent) -> Option<ActorStep> {
        if self.mode != GameMode::Play {
            return None;
        }
        self.grid.advance();
        let step = self.actor.update(intent, &mut self.grid);
        self.camera
            .follow(self.actor.pixel_pos(), self.grid.pixel_size());
        log::trace!(
            "tick {}: {:?} at ({}, {})",
            self.actor.tick_counter(),
            step,
            self.actor.tile_pos().x,
            self.actor.tile_pos().y
        );
        Some(step)
    }

    /// Draw the current state into the framebuffer.
    pub fn render(&mut self) -> &Image {
        match self.mode {
            GameMode::Play => self.renderer.render(
                &self.grid,
                &self.actor,
                &self.camera,
                &self.sprites,
                self.debug,
            ),
            GameMode::Menu | GameMode::Exit => self.renderer.clear_screen(MENU_BACKGROUND),
        }
    }

    /// Tile under a framebuffer pixel.
    pub fn tile_at_screen(&self, screen_px: IVec2) -> IVec2 {
        self.camera.screen_to_tile(screen_px)
    }

    /// Swap in a freshly loaded map and its tiles. The tile size must match
    /// the running map, since actor and door art and the window are sized
    /// from it. The actor keeps its tile when it still exists, but any walk in
    /// progress is dropped so the new map decides the next move.
    pub fn replace_level(&mut self, level: &LevelFile, tileset: Tileset) -> Result<(), String> {
        if level.tile_size != self.grid.tile_size() {
            return Err(format!(
                "Level reload changes tile size from {}px to {}px; restart to apply it",
                self.grid.tile_size(),
                level.tile_size
            ));
        }
        let grid = level.build_grid(self.sprites.door.len())?;

        let tile = self.actor.tile_pos();
        if !grid.in_bounds(tile) {
            let start = if grid.in_bounds(self.start_tile) {
                self.start_tile
            } else {
                IVec2::ZERO
            };
            self.actor = Actor::new(start, grid.tile_size(), &self.sprites.actor);
        } else if self.actor.motion() == MotionState::Walk || grid.would_collide(tile) {
            if grid.would_collide(tile) {
                log::warn!(
                    "Actor tile ({}, {}) is blocked in the reloaded level",
                    tile.x,
                    tile.y
                );
            }
            self.actor = Actor::new(tile, grid.tile_size(), &self.sprites.actor);
        }

        self.sprites.tileset = tileset;
        self.grid = grid;
        self.camera
            .follow(self.actor.pixel_pos(), self.grid.pixel_size());
        self.renderer = SceneRenderer::new(self.grid.pixel_size(), &self.camera);
        log::info!(
            "Level reloaded ({}x{}, {} doors)",
            self.grid.width(),
            self.grid.height(),
            self.grid.doors().len()
        );
        Ok(())
    }
}

/// Load configured sheets, or placeholders for whatever is not configured.
pub fn load_sprite_set(
    config: &GameConfig,
    level_path: &Path,
    level: &LevelFile,
) -> Result<SpriteSet, String> {
    let tile_size = level.tile_size as u32;

    let actor = match &config.actor_sheet {
        Some(path) => sprites::actor_sprites_from_sheet(&sprites::load_sheet(path)?)?,
        None => sprites::placeholder_actor(tile_size)?,
    };
    let door = match &config.door_sheet {
        Some(path) => sprites::door_frames_from_sheet(&sprites::load_sheet(path)?)?,
        None => sprites::placeholder_door(tile_size)?,
    };
    let tileset = load_tileset(level_path, level)?;

    log::info!(
        "Sprites: actor {} ({} frames), door {} ({} frames), {} tiles",
        if config.actor_sheet.is_some() { "sheet" } else { "placeholder" },
        actor.frame_count(),
        if config.door_sheet.is_some() { "sheet" } else { "placeholder" },
        door.len(),
        tileset.len()
    );
    Ok(SpriteSet {
        actor,
        door,
        tileset,
    })
}

/// The level's tileset image, or placeholder tiles covering every id it uses.
pub fn load_tileset(level_path: &Path, level: &LevelFile) -> Result<Tileset, String> {
    let tile_size = level.tile_size as u32;
    match &level.tileset {
        Some(tileset) => {
            let sheet = sprites::load_sheet(&level::tileset_path(level_path, tileset))?;
            Tileset::from_sheet(&sheet, tile_size, tileset.columns)
        }
        None => Ok(Tileset::placeholder(tile_size, level.max_tile_id())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::DoorState;
    use crate::replay::{self, ReplayFrame};
    use crate::world::{Layer, LayerSet};
    use bool_core::Direction;

    const TILE: i32 = 16;

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bool_session_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// 2x3 map with an object at (0, 2).
    fn small_level(tile_size: i32) -> LevelFile {
        serde_json::from_str(&format!(
            r#"{{
                "width": 2, "height": 3, "tile_size": {tile_size},
                "layers": [
                    {{ "name": "Ground", "data": [1, 1, 1, 1, 1, 1] }},
                    {{ "name": "Foreground", "data": [0, 0, 0, 0, 0, 0] }},
                    {{ "name": "Objects", "data": [0, 0, 0, 0, 1, 0] }}
                ]
            }}"#
        ))
        .expect("level json")
    }

    /// 5x3 map with a wall column at x = 2, broken by a door at (2, 1).
    fn session() -> Session {
        let (width, height) = (5, 3);
        let mut objects = vec![0; (width * height) as usize];
        for y in 0..height {
            objects[(y * width + 2) as usize] = 1;
        }
        objects[(width + 2) as usize] = 0;
        let grid = TileGrid::new(
            width,
            height,
            TILE,
            LayerSet {
                ground: Layer::new(width, vec![2; (width * height) as usize]),
                foreground: Layer::empty(width, height),
                objects: Layer::new(width, objects),
            },
            &[IVec2::new(2, 1)],
            4,
        )
        .expect("valid grid");
        let sprites = SpriteSet {
            actor: sprites::placeholder_actor(TILE as u32).expect("actor"),
            door: sprites::placeholder_door(TILE as u32).expect("door"),
            tileset: Tileset::placeholder(TILE as u32, 2),
        };
        Session::new(grid, sprites, IVec2::new(0, 1), UVec2::new(3, 3), 2).expect("session")
    }

    fn run(session: &mut Session, frames: &[ReplayFrame]) {
        for intent in replay::expand(frames) {
            session.tick(intent);
        }
    }

    #[test]
    fn starts_in_play_at_start_tile() {
        let session = session();
        assert_eq!(session.mode(), GameMode::Play);
        assert_eq!(session.actor().tile_pos(), IVec2::new(0, 1));
        assert_eq!(session.actor().facing(), Direction::Down);
        assert!(!session.camera_clamped());
    }

    #[test]
    fn rejects_start_outside_map() {
        let fresh = session();
        let err = Session::new(
            fresh.grid.clone(),
            fresh.sprites.clone(),
            IVec2::new(9, 9),
            UVec2::new(3, 3),
            2,
        )
        .err()
        .expect("start outside map should fail");
        assert!(err.contains("outside"));
    }

    #[test]
    fn walks_through_door_after_opening_it() {
        let mut session = session();
        // Turn right, then one full step up to the door.
        run(
            &mut session,
            &[
                ReplayFrame::walk(Direction::Right, 1),
                ReplayFrame::walk(Direction::Right, 5),
            ],
        );
        assert_eq!(session.actor().tile_pos(), IVec2::new(1, 1));
        assert_eq!(session.actor().motion(), MotionState::Idle);

        // Blocked by the closed door.
        run(&mut session, &[ReplayFrame::walk(Direction::Right, 8)]);
        assert_eq!(session.actor().tile_pos(), IVec2::new(1, 1));

        run(&mut session, &[ReplayFrame::interact(1)]);
        let door = session.grid().door_at(IVec2::new(2, 1)).map(|d| d.state());
        assert_eq!(door, Some(DoorState::Opening));

        // Let the door finish, then walk through it and one tile beyond.
        run(
            &mut session,
            &[ReplayFrame::idle(3), ReplayFrame::walk(Direction::Right, 8)],
        );
        assert_eq!(session.actor().tile_pos(), IVec2::new(3, 1));
    }

    #[test]
    fn door_advances_before_actor_checks_it() {
        let mut session = session();
        run(
            &mut session,
            &[
                ReplayFrame::walk(Direction::Right, 6),
                ReplayFrame::interact(1),
                ReplayFrame::idle(2),
            ],
        );
        assert_eq!(session.actor().tile_pos(), IVec2::new(1, 1));
        // The third advance happens at the start of this tick, so the actor
        // already sees the door open.
        let step = session.tick(PlayerIntent::walk(Direction::Right));
        assert_eq!(step, Some(ActorStep::StartedWalk));
    }

    #[test]
    fn camera_follows_actor_every_tick() {
        let mut session = session();
        let view = session.camera().viewport_px();
        run(&mut session, &[ReplayFrame::walk(Direction::Down, 5)]);
        let expected = session.actor().pixel_pos() - view / 2;
        assert_eq!(session.camera().position, expected);
        assert_eq!(session.actor().motion(), MotionState::Idle);
    }

    #[test]
    fn clamp_toggle_keeps_view_inside_world() {
        let mut session = session();
        assert!(session.camera().position.x < 0);
        assert!(session.toggle_camera_clamp());
        assert_eq!(session.camera().position, IVec2::new(0, 0));
        assert!(!session.toggle_camera_clamp());
        assert!(session.camera().position.x < 0);
    }

    #[test]
    fn menu_and_exit_freeze_the_world() {
        let mut session = session();
        session.set_mode(GameMode::Menu);
        assert_eq!(session.tick(PlayerIntent::walk(Direction::Down)), None);
        assert_eq!(session.actor().tick_counter(), 0);
        let frame = session.render();
        assert_eq!(frame.pixel(0, 0), Some(MENU_BACKGROUND));

        session.set_mode(GameMode::Exit);
        assert_eq!(session.tick(PlayerIntent::idle()), None);
    }

    #[test]
    fn render_produces_scaled_framebuffer() {
        let mut session = session();
        let size = session.screen_size();
        assert_eq!(size, UVec2::new(96, 96));
        let frame = session.render();
        assert_eq!(frame.size(), IVec2::new(96, 96));
    }

    #[test]
    fn pointer_maps_through_camera() {
        let mut session = session();
        session.set_camera_clamp(true);
        assert_eq!(session.tile_at_screen(IVec2::new(0, 0)), IVec2::ZERO);
        // 2x scale, 16px tiles: screen x 64 is world x 32, tile 2.
        assert_eq!(session.tile_at_screen(IVec2::new(64, 40)), IVec2::new(2, 1));
    }

    #[test]
    fn debug_toggle_flips_flag() {
        let mut session = session();
        assert!(!session.debug());
        assert!(session.toggle_debug());
        session.render();
        assert!(!session.toggle_debug());
    }

    #[test]
    fn replace_level_keeps_actor_when_possible() {
        let mut session = session();
        run(&mut session, &[ReplayFrame::walk(Direction::Down, 5)]);
        let before = session.actor().tile_pos();

        let level: LevelFile = serde_json::from_str(
            r#"{
                "width": 2, "height": 3, "tile_size": 16,
                "layers": [
                    { "name": "Ground", "data": [1, 1, 1, 1, 1, 7] },
                    { "name": "Foreground", "data": [0, 0, 0, 0, 0, 0] },
                    { "name": "Objects", "data": [0, 0, 0, 0, 0, 0] }
                ]
            }"#,
        )
        .expect("level json");
        let tileset = load_tileset(Path::new("unused.json"), &level).expect("placeholder tiles");
        session.replace_level(&level, tileset).expect("reload");
        assert_eq!(session.actor().tile_pos(), before);
        assert_eq!(session.grid().width(), 2);
        assert!(session.sprites.tileset.get(7).is_some());
    }

    #[test]
    fn reload_mid_walk_respects_new_obstacles() {
        let mut session = session();
        assert_eq!(
            session.tick(PlayerIntent::walk(Direction::Down)),
            Some(ActorStep::StartedWalk)
        );
        session.tick(PlayerIntent::idle());
        assert_eq!(session.actor().motion(), MotionState::Walk);

        let level = small_level(TILE);
        let tileset = load_tileset(Path::new("unused.json"), &level).expect("placeholder tiles");
        session.replace_level(&level, tileset).expect("reload");
        assert_eq!(session.actor().motion(), MotionState::Idle);
        assert_eq!(session.actor().pixel_offset(), IVec2::ZERO);

        run(
            &mut session,
            &[ReplayFrame::idle(4), ReplayFrame::walk(Direction::Down, 5)],
        );
        assert_eq!(session.actor().tile_pos(), IVec2::new(0, 1));
        assert!(!session.grid().would_collide(session.actor().tile_pos()));
    }

    #[test]
    fn reload_rejects_tile_size_change() {
        let mut session = session();
        let level = small_level(TILE * 2);
        let tileset = load_tileset(Path::new("unused.json"), &level).expect("placeholder tiles");
        let err = session
            .replace_level(&level, tileset)
            .expect_err("tile size change should fail");
        assert!(err.contains("tile size"));
        assert_eq!(session.grid().width(), 5);
        assert_eq!(session.grid().tile_size(), TILE);
    }

    #[test]
    fn scripted_door_run_from_file() {
        let path = temp_file_path("door_run");
        std::fs::write(
            &path,
            r#"{
              "frames": [
                { "direction": "RIGHT", "repeat": 14 },
                { "interact": true },
                { "repeat": 3 },
                { "direction": "RIGHT", "repeat": 8 }
              ]
            }"#,
        )
        .expect("write replay file");
        let replay = replay::load_replay_from_path(&path).expect("replay should load");

        let mut session = session();
        for intent in replay.expanded_intents() {
            session.tick(intent);
        }
        assert_eq!(session.actor().tile_pos(), IVec2::new(3, 1));
        let door = session.grid().door_at(IVec2::new(2, 1)).map(|d| d.state());
        assert_eq!(door, Some(DoorState::Open));

        let _ = std::fs::remove_file(path);
    }
}

//! The player character: a tile-locked walker with an IDLE/WALK state machine.
//!
//! A step onto the next tile plays two walk frames, each shifting the sprite by
//! half a tile. Walk frames only advance on even ticks, so one tile takes four
//! ticks with two of them idle. The tile coordinate commits on the second frame,
//! at which point the sub-tile offset returns to zero.

use bool_core::sprites::ActorSprites;
use bool_core::{Direction, PlayerIntent};
use glam::IVec2;

use crate::world::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Walk,
}

impl MotionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Walk => "WALK",
        }
    }
}

/// What one `update` did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorStep {
    /// Toggled (or tried to toggle) the door in front; nothing else happened.
    Interacted,
    Idle,
    Turned,
    /// Wanted to walk forward but the tile is blocked.
    Blocked,
    StartedWalk,
    /// Odd tick while walking.
    Waiting,
    /// Advanced one walk frame, still between tiles.
    Stepped,
    /// Committed the move onto the next tile.
    Arrived,
}

#[derive(Debug, Clone)]
pub struct Actor {
    tile_pos: IVec2,
    pixel_offset: IVec2,
    facing: Direction,
    motion: MotionState,
    anim_frame: usize,
    tick_counter: u64,
    tile_size: i32,
    frame_count: usize,
}

impl Actor {
    /// An idle actor facing down at `start`. Only the frame count of `sprites`
    /// is kept; drawing looks frames up in the same table again.
    pub fn new<T>(start: IVec2, tile_size: i32, sprites: &ActorSprites<T>) -> Self {
        Self {
            tile_pos: start,
            pixel_offset: IVec2::ZERO,
            facing: Direction::Down,
            motion: MotionState::Idle,
            anim_frame: 0,
            tick_counter: 0,
            tile_size,
            frame_count: sprites.frame_count(),
        }
    }

    pub fn tile_pos(&self) -> IVec2 {
        self.tile_pos
    }

    pub fn pixel_offset(&self) -> IVec2 {
        self.pixel_offset
    }

    /// Top-left of the actor's tile cell plus the walk offset, in world pixels.
    pub fn pixel_pos(&self) -> IVec2 {
        self.tile_pos * self.tile_size + self.pixel_offset
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn anim_frame(&self) -> usize {
        self.anim_frame
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    /// The tile directly in front of the actor.
    pub fn facing_tile(&self) -> IVec2 {
        self.tile_pos + self.facing.unit()
    }

    /// Sprite for the current facing and frame.
    pub fn view<'a, T>(&self, sprites: &'a ActorSprites<T>) -> &'a T {
        sprites.get(self.facing, self.anim_frame)
    }

    pub fn update(&mut self, intent: PlayerIntent, grid: &mut TileGrid) -> ActorStep {
        self.tick_counter += 1;

        // Interacting with a door in front takes the whole tick.
        let ahead = self.facing_tile();
        if intent.interact && grid.has_door(ahead) {
            let _ = grid.toggle_door(ahead);
            return ActorStep::Interacted;
        }

        match self.motion {
            MotionState::Idle => self.update_idle(intent, grid),
            MotionState::Walk => self.update_walk(),
        }
    }

    fn update_idle(&mut self, intent: PlayerIntent, grid: &TileGrid) -> ActorStep {
        match intent.direction {
            Some(dir) if dir == self.facing => {
                if grid.would_collide(self.facing_tile()) {
                    return ActorStep::Blocked;
                }
                self.motion = MotionState::Walk;
                self.anim_frame = 0;
                log::debug!(
                    "Actor walking {} from ({}, {})",
                    self.facing,
                    self.tile_pos.x,
                    self.tile_pos.y
                );
                ActorStep::StartedWalk
            }
            // Turning in place is never blocked.
            Some(dir) => {
                self.facing = dir;
                ActorStep::Turned
            }
            None => ActorStep::Idle,
        }
    }

    fn update_walk(&mut self) -> ActorStep {
        if self.tick_counter % 2 != 0 {
            return ActorStep::Waiting;
        }

        let step = self.facing.unit();
        self.anim_frame = (self.anim_frame + 1) % self.frame_count;
        self.pixel_offset += step * (self.tile_size / 2);

        if self.anim_frame % 2 == 0 {
            self.tile_pos += step;
            self.pixel_offset = IVec2::ZERO;
            self.motion = MotionState::Idle;
            log::debug!("Actor arrived at ({}, {})", self.tile_pos.x, self.tile_pos.y);
            return ActorStep::Arrived;
        }
        ActorStep::Stepped
    }
}

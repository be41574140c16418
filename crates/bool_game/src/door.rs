//! Per-tile animated door.
//!
//! ```text
//!   CLOSED --open()--> OPENING --advance()*--> OPEN --close()--> CLOSING --advance()*--> CLOSED
//! ```
//!
//! Frame 0 is drawn fully closed and frame N-1 fully open. Only `Open` lets the
//! actor through; a door mid-animation blocks movement in either direction.

use std::fmt;

use glam::IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Opening => "OPENING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    Toggle,
}

/// A door was asked to do something its current state does not allow.
/// The door is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub action: DoorAction,
    pub state: DoorState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            DoorAction::Open => "opened",
            DoorAction::Close => "closed",
            DoorAction::Toggle => "toggled",
        };
        write!(f, "door cannot be {} from {} state", verb, self.state)
    }
}

impl std::error::Error for InvalidTransition {}

#[derive(Debug, Clone)]
pub struct Door {
    position: IVec2,
    state: DoorState,
    anim_frame: usize,
    frame_count: usize,
}

impl Door {
    /// A closed door at `position` animating over `frame_count` (>= 2) frames.
    pub fn new(position: IVec2, frame_count: usize) -> Self {
        debug_assert!(frame_count >= 2, "door needs a closed and an open frame");
        Self {
            position,
            state: DoorState::Closed,
            anim_frame: 0,
            frame_count: frame_count.max(2),
        }
    }

    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn open(&mut self) -> Result<(), InvalidTransition> {
        if self.state != DoorState::Closed {
            return Err(self.rejected(DoorAction::Open));
        }
        self.state = DoorState::Opening;
        self.anim_frame = 0;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), InvalidTransition> {
        if self.state != DoorState::Open {
            return Err(self.rejected(DoorAction::Close));
        }
        self.state = DoorState::Closing;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            DoorState::Closed => self.open(),
            DoorState::Open => self.close(),
            DoorState::Opening | DoorState::Closing => Err(self.rejected(DoorAction::Toggle)),
        }
    }

    /// One animation tick.
    pub fn advance(&mut self) {
        match self.state {
            DoorState::Opening => {
                self.anim_frame = (self.anim_frame + 1).min(self.last_frame());
                if self.anim_frame == self.last_frame() {
                    self.state = DoorState::Open;
                }
            }
            DoorState::Closing => {
                self.anim_frame = self.anim_frame.saturating_sub(1);
                if self.anim_frame == 0 {
                    self.state = DoorState::Closed;
                }
            }
            DoorState::Closed | DoorState::Open => {}
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    pub fn is_passable(&self) -> bool {
        self.is_open()
    }

    /// Sprite index to draw this tick.
    pub fn current_frame(&self) -> usize {
        self.anim_frame
    }

    fn last_frame(&self) -> usize {
        self.frame_count - 1
    }

    fn rejected(&self, action: DoorAction) -> InvalidTransition {
        InvalidTransition {
            action,
            state: self.state,
        }
    }
}

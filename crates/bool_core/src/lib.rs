pub mod direction;
pub mod input;
pub mod sprites;
pub mod time;

pub use direction::Direction;
pub use input::{InputState, Key, PlayerIntent};
pub use sprites::{ActorSprites, Frames};
pub use time::TimeState;

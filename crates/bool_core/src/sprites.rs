//! Immutable sprite tables handed to the actor and the doors at construction.
//!
//! The element type is opaque here; the game instantiates these with pixel
//! images, tests with plain labels. Frame counts are fixed once a table is
//! built, and indexing past the end is an invariant violation, not a
//! recoverable error.

use crate::direction::Direction;

/// A non-empty, fixed-length sequence of animation frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Frames<T> {
    frames: Vec<T>,
}

impl<T> Frames<T> {
    pub fn new(frames: Vec<T>) -> Result<Self, String> {
        if frames.is_empty() {
            return Err("Sprite table has no frames".to_string());
        }
        Ok(Self { frames })
    }

    /// Door animations need a distinct closed and open frame.
    pub fn door(frames: Vec<T>) -> Result<Self, String> {
        if frames.len() < 2 {
            return Err(format!(
                "Door animation needs at least 2 frames, got {}",
                frames.len()
            ));
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame `index`. Panics when `index` is out of range.
    pub fn get(&self, index: usize) -> &T {
        assert!(
            index < self.frames.len(),
            "missing sprite frame {} (table has {})",
            index,
            self.frames.len()
        );
        &self.frames[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.frames.iter()
    }
}

/// One walk cycle per facing direction, all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSprites<T> {
    by_direction: [Frames<T>; 4],
}

impl<T> ActorSprites<T> {
    pub fn new(
        up: Frames<T>,
        down: Frames<T>,
        left: Frames<T>,
        right: Frames<T>,
    ) -> Result<Self, String> {
        let by_direction = [up, down, left, right];
        let expected = by_direction[0].len();
        for dir in Direction::ALL {
            let len = by_direction[dir.index()].len();
            if len != expected {
                return Err(format!(
                    "Actor sprites for {} have {} frames, expected {}",
                    dir, len, expected
                ));
            }
        }
        Ok(Self { by_direction })
    }

    pub fn frames(&self, direction: Direction) -> &Frames<T> {
        &self.by_direction[direction.index()]
    }

    /// Frames per walk cycle, shared by every direction.
    pub fn frame_count(&self) -> usize {
        self.by_direction[0].len()
    }

    pub fn get(&self, direction: Direction, frame: usize) -> &T {
        self.frames(direction).get(frame)
    }
}

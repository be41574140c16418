//! Keyboard state with level-triggered and edge-triggered queries, reduced once
//! per tick into a [`PlayerIntent`].
//!
//! - **Held:** `is_held(key)` is true every frame the key is physically down.
//!   Movement reads held keys so a walk continues while the key stays pressed.
//!
//! - **Just pressed / just released:** true only during the frame the transition
//!   happened. They are cleared by `end_frame()`, which the main loop calls only
//!   after at least one fixed tick consumed them, so a press landing on a frame
//!   with zero ticks is not lost.
//!
//! When several direction keys are held, the most recently pressed one wins.

use std::collections::HashSet;

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Space,
    Escape,
    Q,
    I,
    C,
}

impl Key {
    /// Direction this key requests, if it is a movement key.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Up | Key::W => Some(Direction::Up),
            Key::Down | Key::S => Some(Direction::Down),
            Key::Left | Key::A => Some(Direction::Left),
            Key::Right | Key::D => Some(Direction::Right),
            _ => None,
        }
    }
}

/// What the player asked for during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    pub direction: Option<Direction>,
    pub interact: bool,
}

impl PlayerIntent {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn walk(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            interact: false,
        }
    }

    pub fn interact() -> Self {
        Self {
            direction: None,
            interact: true,
        }
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
    /// Held movement keys, oldest press first.
    direction_keys: Vec<Key>,

    pub pointer_position: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            direction_keys: Vec::new(),
            pointer_position: None,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
            if key.direction().is_some() {
                self.direction_keys.push(key);
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
            self.direction_keys.retain(|k| *k != key);
        }
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        let held: Vec<Key> = self.held.iter().copied().collect();
        for key in held {
            self.key_up(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Most recently pressed movement key that is still held.
    pub fn requested_direction(&self) -> Option<Direction> {
        self.direction_keys.last().and_then(|k| k.direction())
    }

    pub fn intent(&self) -> PlayerIntent {
        PlayerIntent {
            direction: self.requested_direction(),
            interact: self.is_just_pressed(Key::Space),
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_up(Key::Space);
        assert!(!input.is_held(Key::Space));
        assert!(input.is_just_released(Key::Space));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::D);
        assert!(!input.is_just_released(Key::D));
        assert!(!input.is_held(Key::D));
    }

    #[test]
    fn test_end_frame_keeps_held_direction() {
        let mut input = InputState::new();
        input.key_down(Key::Down);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Down));
        assert_eq!(input.requested_direction(), Some(Direction::Down));
    }

    #[test]
    fn test_latest_direction_key_wins() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::D);
        assert_eq!(input.requested_direction(), Some(Direction::Right));

        input.key_up(Key::D);
        assert_eq!(input.requested_direction(), Some(Direction::Up));

        input.key_up(Key::Up);
        assert_eq!(input.requested_direction(), None);
    }

    #[test]
    fn test_arrow_and_wasd_map_to_same_direction() {
        assert_eq!(Key::Left.direction(), Key::A.direction());
        assert_eq!(Key::Up.direction(), Key::W.direction());
        assert_eq!(Key::Space.direction(), None);
    }

    #[test]
    fn test_interact_is_edge_triggered() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.intent().interact);
        input.end_frame();
        assert!(input.is_held(Key::Space));
        assert!(!input.intent().interact);
    }

    #[test]
    fn test_intent_combines_direction_and_interact() {
        let mut input = InputState::new();
        input.key_down(Key::S);
        input.key_down(Key::Space);
        assert_eq!(
            input.intent(),
            PlayerIntent {
                direction: Some(Direction::Down),
                interact: true,
            }
        );
    }

    #[test]
    fn test_release_all_clears_everything_held() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::Space);
        input.release_all();
        assert!(!input.is_held(Key::Left));
        assert!(!input.is_held(Key::Space));
        assert_eq!(input.requested_direction(), None);
        assert!(input.is_just_released(Key::Left));
    }

    #[test]
    fn test_default_state_is_empty() {
        let input = InputState::new();
        assert!(!input.is_held(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        assert_eq!(input.intent(), PlayerIntent::idle());
        assert!(input.pointer_position.is_none());
    }
}

//! Scripted input for deterministic multi-tick scenarios. A replay is a list of
//! frames, each holding one intent for `repeat` consecutive ticks.

use bool_core::{Direction, PlayerIntent};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ReplayFrame {
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub interact: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    pub fn idle(repeat: u32) -> Self {
        Self {
            direction: None,
            interact: false,
            repeat,
        }
    }

    pub fn walk(direction: Direction, repeat: u32) -> Self {
        Self {
            direction: Some(direction),
            interact: false,
            repeat,
        }
    }

    pub fn interact(repeat: u32) -> Self {
        Self {
            direction: None,
            interact: true,
            repeat,
        }
    }

    fn intent(&self) -> PlayerIntent {
        PlayerIntent {
            direction: self.direction,
            interact: self.interact,
        }
    }
}

/// One intent per tick.
pub fn expand(frames: &[ReplayFrame]) -> Vec<PlayerIntent> {
    frames
        .iter()
        .flat_map(|frame| std::iter::repeat(frame.intent()).take(frame.repeat.max(1) as usize))
        .collect()
}

impl ReplaySequence {
    pub fn expanded_intents(&self) -> Vec<PlayerIntent> {
        expand(&self.frames)
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, MotionState};
    use crate::world::{Layer, LayerSet, TileGrid};
    use bool_core::sprites::{ActorSprites, Frames};
    use glam::IVec2;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bool_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn open_field(width: i32, height: i32) -> TileGrid {
        TileGrid::new(
            width,
            height,
            16,
            LayerSet {
                ground: Layer::empty(width, height),
                foreground: Layer::empty(width, height),
                objects: Layer::empty(width, height),
            },
            &[],
            2,
        )
        .expect("valid grid")
    }

    fn walker() -> Actor {
        let frames = Frames::new(vec![(); 4]).expect("frames");
        let sprites =
            ActorSprites::new(frames.clone(), frames.clone(), frames.clone(), frames)
                .expect("sprites");
        Actor::new(IVec2::ZERO, 16, &sprites)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "direction": "RIGHT", "repeat": 3 },
                { "interact": true },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let intents = replay.expanded_intents();
        assert_eq!(intents.len(), 6);
        assert_eq!(intents[0], PlayerIntent::walk(Direction::Right));
        assert_eq!(intents[3], PlayerIntent::interact());
        assert_eq!(intents[5], PlayerIntent::idle());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_unknown_direction() {
        let path = temp_file_path("bad_direction");
        fs::write(&path, r#"{ "frames": [{ "direction": "NORTH" }] }"#)
            .expect("write replay file");
        assert!(load_replay_from_path(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let frames = [
            ReplayFrame::walk(Direction::Right, 1),
            ReplayFrame::walk(Direction::Right, 9),
            ReplayFrame::walk(Direction::Down, 1),
            ReplayFrame::walk(Direction::Down, 7),
            ReplayFrame::idle(3),
        ];
        let intents = expand(&frames);

        let mut grid_a = open_field(6, 6);
        let mut grid_b = open_field(6, 6);
        let mut run_a = walker();
        let mut run_b = walker();
        for intent in &intents {
            let step_a = run_a.update(*intent, &mut grid_a);
            let step_b = run_b.update(*intent, &mut grid_b);
            assert_eq!(step_a, step_b);
            assert_eq!(run_a.pixel_pos(), run_b.pixel_pos());
        }
        assert_eq!(run_a.tile_pos(), IVec2::new(2, 2));
        assert_eq!(run_a.motion(), MotionState::Idle);
    }
}

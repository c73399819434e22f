use serde_json::Value;

use crate::engine::GameEngine;
use crate::types::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    Start,
    Pause,
    Resume,
    Reset,
    Move { dir: Direction },
    Hold { dir: Direction },
    Release,
    Snapshot,
}

/// Parses one JSON control line. Anything malformed yields `None` and is ignored by hosts.
pub fn parse_control_message(raw: &str) -> Option<ControlMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start" => Some(ControlMessage::Start),
        "pause" => Some(ControlMessage::Pause),
        "resume" => Some(ControlMessage::Resume),
        "reset" => Some(ControlMessage::Reset),
        "move" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ControlMessage::Move { dir })
        }
        "hold" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ControlMessage::Hold { dir })
        }
        "release" => Some(ControlMessage::Release),
        "snapshot" => Some(ControlMessage::Snapshot),
        _ => None,
    }
}

/// Applies a control message. Returns true when the host should emit a snapshot right away.
pub fn apply_control_message(engine: &mut GameEngine, message: ControlMessage) -> bool {
    match message {
        ControlMessage::Start => {
            engine.start();
        }
        ControlMessage::Pause => {
            engine.pause();
        }
        ControlMessage::Resume => {
            engine.resume();
        }
        ControlMessage::Reset => engine.reset(),
        ControlMessage::Move { dir } => {
            engine.apply_player_move(dir);
        }
        ControlMessage::Hold { dir } => engine.begin_continuous_move(dir),
        ControlMessage::Release => engine.end_continuous_move(),
        ControlMessage::Snapshot => return true,
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngineOptions;
    use crate::types::SessionState;

    #[test]
    fn parse_lifecycle_messages() {
        assert_eq!(
            parse_control_message(r#"{"type":"start"}"#),
            Some(ControlMessage::Start)
        );
        assert_eq!(
            parse_control_message(r#"{"type":"pause"}"#),
            Some(ControlMessage::Pause)
        );
        assert_eq!(
            parse_control_message(r#"{"type":"resume"}"#),
            Some(ControlMessage::Resume)
        );
        assert_eq!(
            parse_control_message(r#"{"type":"reset","extra":1}"#),
            Some(ControlMessage::Reset)
        );
    }

    #[test]
    fn parse_move_and_hold_require_known_direction() {
        assert_eq!(
            parse_control_message(r#"{"type":"move","dir":"left"}"#),
            Some(ControlMessage::Move {
                dir: Direction::Left
            })
        );
        assert_eq!(
            parse_control_message(r#"{"type":"hold","dir":"down"}"#),
            Some(ControlMessage::Hold {
                dir: Direction::Down
            })
        );
        assert!(parse_control_message(r#"{"type":"move","dir":"sideways"}"#).is_none());
        assert!(parse_control_message(r#"{"type":"move"}"#).is_none());
        assert!(parse_control_message(r#"{"type":"hold","dir":3}"#).is_none());
    }

    #[test]
    fn malformed_lines_are_ignored() {
        assert!(parse_control_message("").is_none());
        assert!(parse_control_message("start").is_none());
        assert!(parse_control_message(r#"["start"]"#).is_none());
        assert!(parse_control_message(r#"{"kind":"start"}"#).is_none());
        assert!(parse_control_message(r#"{"type":"teleport"}"#).is_none());
    }

    #[test]
    fn apply_drives_engine_lifecycle() {
        let mut engine = GameEngine::new(GameEngineOptions::with_seed(21));
        assert!(!apply_control_message(&mut engine, ControlMessage::Start));
        assert_eq!(engine.state(), SessionState::Running);
        apply_control_message(&mut engine, ControlMessage::Move {
            dir: Direction::Right,
        });
        assert_eq!(engine.player_index(), 22);
        apply_control_message(&mut engine, ControlMessage::Pause);
        assert_eq!(engine.state(), SessionState::Paused);
        assert!(apply_control_message(&mut engine, ControlMessage::Snapshot));
        apply_control_message(&mut engine, ControlMessage::Reset);
        assert_eq!(engine.state(), SessionState::NotStarted);
        assert_eq!(engine.player_index(), 21);
    }
}

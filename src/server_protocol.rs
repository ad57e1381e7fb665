use serde_json::Value;

use crate::types::MoveIntent;

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Start,
    Input {
        movement: MoveIntent,
        yaw: f32,
        pitch: f32,
    },
    Hover {
        door: Option<usize>,
    },
    Interact,
    PointerLock {
        locked: bool,
    },
    Restart,
    Ping {
        t: f64,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start" => Some(ParsedClientMessage::Start),
        "input" => {
            let movement = MoveIntent {
                forward: parse_optional_bool(object.get("forward"))?,
                back: parse_optional_bool(object.get("back"))?,
                left: parse_optional_bool(object.get("left"))?,
                right: parse_optional_bool(object.get("right"))?,
            };
            let yaw = parse_angle(object.get("yaw"))?;
            let pitch = parse_angle(object.get("pitch"))?;
            Some(ParsedClientMessage::Input {
                movement,
                yaw,
                pitch,
            })
        }
        "hover" => {
            let door = match object.get("door") {
                None | Some(Value::Null) => None,
                Some(value) => Some(usize::try_from(value.as_u64()?).ok()?),
            };
            Some(ParsedClientMessage::Hover { door })
        }
        "interact" => Some(ParsedClientMessage::Interact),
        "pointer_lock" => {
            let locked = object.get("locked")?.as_bool()?;
            Some(ParsedClientMessage::PointerLock { locked })
        }
        "restart" => Some(ParsedClientMessage::Restart),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

fn parse_optional_bool(value: Option<&Value>) -> Option<bool> {
    match value {
        None => Some(false),
        Some(value) => value.as_bool(),
    }
}

fn parse_angle(value: Option<&Value>) -> Option<f32> {
    let Some(value) = value else {
        return Some(0.0);
    };
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    Some(number as f32)
}

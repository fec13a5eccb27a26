//! Field extraction and coercion over a decoded [`RawPayload`].
//!
//! Required fields fail with a [`ValidationError`] naming the field; the two
//! board flags fall back to `false` instead.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::dto::payload::RawPayload;

pub const CREATOR_ID: &str = "creatorId";
pub const BOARD_SIZE: &str = "boardSize";
pub const VOTING_THRESHOLD: &str = "votingThreshold";
pub const EVENTS: &str = "events";
pub const RANDOMIZE_BOARDS: &str = "randomizeBoards";
pub const ADD_FREE_SPACE: &str = "addFreeSpace";
pub const GAME_CODE: &str = "gameCode";
pub const FREE_SPACE_TEXT: &str = "freeSpaceText";

/// Label used when the free space is requested without any text.
pub const DEFAULT_FREE_SPACE_TEXT: &str = "Free Space";

/// A required field is absent or cannot be coerced to its type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing or invalid {field}")]
    Missing { field: &'static str },
    #[error("Invalid {field} format")]
    InvalidFormat { field: &'static str },
    #[error("Events must be an array")]
    NotAList { field: &'static str },
    #[error("Invalid event format at index {index}")]
    InvalidElement { field: &'static str, index: usize },
}

impl ValidationError {
    /// Name of the offending field, indexed for list elements (`events[2]`).
    pub fn field(&self) -> String {
        match self {
            Self::Missing { field } | Self::InvalidFormat { field } | Self::NotAList { field } => {
                (*field).to_string()
            }
            Self::InvalidElement { field, index } => format!("{field}[{index}]"),
        }
    }
}

pub fn creator_id(payload: &RawPayload) -> Result<String, ValidationError> {
    match payload.get(CREATOR_ID) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(ValidationError::Missing { field: CREATOR_ID }),
    }
}

pub fn board_size(payload: &RawPayload) -> Result<i64, ValidationError> {
    integer(payload, BOARD_SIZE)
}

pub fn voting_threshold(payload: &RawPayload) -> Result<i64, ValidationError> {
    integer(payload, VOTING_THRESHOLD)
}

pub fn events(payload: &RawPayload) -> Result<Vec<String>, ValidationError> {
    let Some(Value::Array(items)) = payload.get(EVENTS) else {
        return Err(ValidationError::NotAList { field: EVENTS });
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(event) => Ok(event.clone()),
            _ => Err(ValidationError::InvalidElement {
                field: EVENTS,
                index,
            }),
        })
        .collect()
}

pub fn randomize_boards(payload: &RawPayload) -> bool {
    flag(payload, RANDOMIZE_BOARDS)
}

pub fn add_free_space(payload: &RawPayload) -> bool {
    flag(payload, ADD_FREE_SPACE)
}

/// Caller-chosen game code; `None` lets the generator pick one.
pub fn game_code(payload: &RawPayload) -> Option<String> {
    match payload.get(GAME_CODE) {
        Some(Value::String(code)) if !code.is_empty() => Some(code.clone()),
        _ => None,
    }
}

/// Free space label; only meaningful when the free space is enabled.
pub fn free_space_text(payload: &RawPayload) -> String {
    match payload.get(FREE_SPACE_TEXT) {
        Some(Value::String(text)) => text.clone(),
        _ => DEFAULT_FREE_SPACE_TEXT.to_string(),
    }
}

/// Accept a JSON number (truncated toward zero) or a base-10 integer string.
fn integer(payload: &RawPayload, field: &'static str) -> Result<i64, ValidationError> {
    match payload.get(field) {
        Some(Value::Number(number)) => Ok(truncate(number)),
        Some(Value::String(text)) => text
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidFormat { field }),
        _ => Err(ValidationError::Missing { field }),
    }
}

fn truncate(number: &Number) -> i64 {
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|value| value.trunc() as i64))
        .unwrap_or(i64::MAX)
}

fn flag(payload: &RawPayload, field: &str) -> bool {
    payload
        .get(field)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        match value {
            Value::Object(fields) => fields.into(),
            other => panic!("test payload must be an object, got {other}"),
        }
    }

    #[test]
    fn creator_id_must_be_non_empty_string() {
        assert_eq!(creator_id(&payload(json!({"creatorId": "u1"}))).unwrap(), "u1");

        for value in [json!({}), json!({"creatorId": ""}), json!({"creatorId": 7})] {
            let err = creator_id(&payload(value)).unwrap_err();
            assert_eq!(err.field(), "creatorId");
            assert_eq!(err.to_string(), "Missing or invalid creatorId");
        }
    }

    #[test]
    fn board_size_accepts_numbers_and_numeric_strings() {
        assert_eq!(board_size(&payload(json!({"boardSize": 5}))).unwrap(), 5);
        assert_eq!(board_size(&payload(json!({"boardSize": "4"}))).unwrap(), 4);
        assert_eq!(board_size(&payload(json!({"boardSize": 3.9}))).unwrap(), 3);
        assert_eq!(board_size(&payload(json!({"boardSize": -2.7}))).unwrap(), -2);
        assert_eq!(board_size(&payload(json!({"boardSize": "-1"}))).unwrap(), -1);
    }

    #[test]
    fn board_size_reports_format_and_missing_separately() {
        let err = board_size(&payload(json!({"boardSize": "abc"}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid boardSize format");
        assert_eq!(err.field(), "boardSize");

        let err = board_size(&payload(json!({"boardSize": " 3"}))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidFormat { field: BOARD_SIZE });

        let err = board_size(&payload(json!({"boardSize": true}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid boardSize");

        let err = board_size(&payload(json!({}))).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: BOARD_SIZE });
    }

    #[test]
    fn voting_threshold_uses_the_same_coercion() {
        assert_eq!(
            voting_threshold(&payload(json!({"votingThreshold": "2"}))).unwrap(),
            2
        );
        assert_eq!(
            voting_threshold(&payload(json!({"votingThreshold": 0}))).unwrap(),
            0
        );
        let err = voting_threshold(&payload(json!({"votingThreshold": "two"}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid votingThreshold format");
        let err = voting_threshold(&payload(json!({"votingThreshold": null}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid votingThreshold");
    }

    #[test]
    fn huge_numbers_saturate() {
        assert_eq!(
            board_size(&payload(json!({"boardSize": u64::MAX}))).unwrap(),
            i64::MAX
        );
        assert_eq!(
            board_size(&payload(json!({"boardSize": -1e300}))).unwrap(),
            i64::MIN
        );
    }

    #[test]
    fn events_keep_order() {
        let events = events(&payload(json!({"events": ["b", "a", "c"]}))).unwrap();
        assert_eq!(events, vec!["b", "a", "c"]);
    }

    #[test]
    fn events_must_be_a_list() {
        for value in [json!({}), json!({"events": "a,b"}), json!({"events": {"0": "a"}})] {
            let err = events(&payload(value)).unwrap_err();
            assert_eq!(err.field(), "events");
            assert_eq!(err.to_string(), "Events must be an array");
        }
    }

    #[test]
    fn non_string_event_names_its_index() {
        let err = events(&payload(json!({"events": ["a", "b", 3, "d"]}))).unwrap_err();
        assert_eq!(err.field(), "events[2]");
        assert_eq!(err.to_string(), "Invalid event format at index 2");
    }

    #[test]
    fn flags_default_to_false() {
        assert!(!randomize_boards(&payload(json!({}))));
        assert!(!randomize_boards(&payload(json!({"randomizeBoards": "true"}))));
        assert!(randomize_boards(&payload(json!({"randomizeBoards": true}))));
        assert!(!add_free_space(&payload(json!({"addFreeSpace": 1}))));
        assert!(add_free_space(&payload(json!({"addFreeSpace": true}))));
    }

    #[test]
    fn game_code_is_optional() {
        assert_eq!(game_code(&payload(json!({"gameCode": "abCD"}))).as_deref(), Some("abCD"));
        assert_eq!(game_code(&payload(json!({"gameCode": ""}))), None);
        assert_eq!(game_code(&payload(json!({"gameCode": 1234}))), None);
        assert_eq!(game_code(&payload(json!({}))), None);
    }

    #[test]
    fn free_space_text_defaults() {
        assert_eq!(free_space_text(&payload(json!({}))), "Free Space");
        assert_eq!(
            free_space_text(&payload(json!({"freeSpaceText": "Coffee"}))),
            "Coffee"
        );
        assert_eq!(
            free_space_text(&payload(json!({"freeSpaceText": false}))),
            "Free Space"
        );
    }
}

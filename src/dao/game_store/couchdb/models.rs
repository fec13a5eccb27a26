use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{GameRecord, StoredGame};

pub const CODE_INFIX: &str = "code";

/// Game as stored in CouchDB, with the same top-level shape as the MongoDB document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub game: GameRecord,
}

impl CouchGameDocument {
    pub fn new(collection: &str, id: Uuid, game: GameRecord) -> Self {
        Self {
            id: game_doc_id(collection, id),
            rev: None,
            created_at: OffsetDateTime::now_utc(),
            game,
        }
    }

    pub fn into_stored(self, id: Uuid) -> StoredGame {
        StoredGame {
            id: id.to_string(),
            created_at: self.created_at.into(),
            record: self.game,
        }
    }
}

/// Marker document holding a game code so a second game cannot claim it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouchCodeReservation {
    #[serde(rename = "_id")]
    pub id: String,
    pub game_id: String,
}

impl CouchCodeReservation {
    pub fn new(collection: &str, game_code: &str, game_id: Uuid) -> Self {
        Self {
            id: code_doc_id(collection, game_code),
            game_id: game_doc_id(collection, game_id),
        }
    }
}

/// Body returned by CouchDB after a successful document write.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub rev: String,
}

pub fn game_doc_id(collection: &str, id: Uuid) -> String {
    format!("{}::{}", collection, id)
}

pub fn code_doc_id(collection: &str, game_code: &str) -> String {
    format!("{}::{}::{}", collection, CODE_INFIX, game_code)
}

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GameRecord, StoredGame};

/// Game as stored in a MongoDB collection: the record fields sit at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    created_at: DateTime,
    #[serde(flatten)]
    game: GameRecord,
}

impl MongoGameDocument {
    pub fn new(id: Uuid, game: GameRecord) -> Self {
        Self {
            id: id.to_string(),
            created_at: DateTime::now(),
            game,
        }
    }

    pub fn game_code(&self) -> &str {
        &self.game.game_code
    }
}

impl From<MongoGameDocument> for StoredGame {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            created_at: value.created_at.to_system_time(),
            record: value.game,
        }
    }
}

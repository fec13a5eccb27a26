use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::{GameStatus, StoredGame},
    dto::{
        format_system_time,
        payload::RawPayload,
        validation::{self, ValidationError},
    },
};

/// Typed create-game request obtained by coercing every payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGameRequest {
    pub creator_id: String,
    pub board_size: i64,
    pub voting_threshold: i64,
    pub events: Vec<String>,
    pub randomize_boards: bool,
    /// `Some(label)` when the board has a free space.
    pub free_space: Option<String>,
    pub game_code: Option<String>,
}

impl CreateGameRequest {
    /// Extract and coerce all fields, stopping at the first invalid one.
    pub fn from_payload(payload: &RawPayload) -> Result<Self, ValidationError> {
        let creator_id = validation::creator_id(payload)?;
        let board_size = validation::board_size(payload)?;
        let voting_threshold = validation::voting_threshold(payload)?;
        let events = validation::events(payload)?;
        let randomize_boards = validation::randomize_boards(payload);
        let free_space =
            validation::add_free_space(payload).then(|| validation::free_space_text(payload));
        let game_code = validation::game_code(payload);

        Ok(Self {
            creator_id,
            board_size,
            voting_threshold,
            events,
            randomize_boards,
            free_space,
            game_code,
        })
    }
}

/// Persisted game as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    /// Document identifier assigned by the store.
    pub id: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    pub creator_id: String,
    pub board_size: i64,
    pub events: Vec<String>,
    #[schema(value_type = String, example = "waiting")]
    pub status: GameStatus,
    pub game_code: String,
    pub voting_threshold: i64,
    pub players: Vec<String>,
    pub votes: Vec<i64>,
    pub verified_events: Vec<String>,
    pub host: String,
    pub randomize_boards: bool,
    pub add_free_space: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_space_text: Option<String>,
}

impl From<StoredGame> for GameDocument {
    fn from(stored: StoredGame) -> Self {
        let record = stored.record;
        Self {
            id: stored.id,
            created_at: format_system_time(stored.created_at),
            creator_id: record.creator_id,
            board_size: record.board_size,
            events: record.events,
            status: record.status,
            game_code: record.game_code,
            voting_threshold: record.voting_threshold,
            players: record.players,
            votes: record.votes,
            verified_events: record.verified_events,
            host: record.host,
            randomize_boards: record.randomize_boards,
            add_free_space: record.add_free_space,
            free_space_text: record.free_space_text,
        }
    }
}

/// Successful create-game response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateGameResponse {
    /// Always `true`.
    pub success: bool,
    pub game: GameDocument,
}

impl CreateGameResponse {
    pub fn new(game: GameDocument) -> Self {
        Self {
            success: true,
            game,
        }
    }
}

/// Failure body returned for every rejected request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable failure description.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Lifecycle status of a bingo game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created and waiting for players to join.
    #[default]
    Waiting,
}

/// Canonical game record handed to the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// User who created the game.
    pub creator_id: String,
    /// Side length of the square board.
    pub board_size: i64,
    /// Event pool used to fill the boards.
    pub events: Vec<String>,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Short shareable code players use to join.
    pub game_code: String,
    /// Minimum number of votes needed to confirm an event.
    pub voting_threshold: i64,
    /// Identifiers of the players who joined.
    pub players: Vec<String>,
    /// Vote tally, one entry per event.
    pub votes: Vec<i64>,
    /// Events confirmed by the players.
    pub verified_events: Vec<String>,
    /// User hosting the game.
    pub host: String,
    /// Whether each player's board samples the event pool.
    pub randomize_boards: bool,
    /// Whether the board centre is a free space.
    pub add_free_space: bool,
    /// Label of the free space, only present with `add_free_space`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space_text: Option<String>,
}

/// Game record as returned by a store once persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGame {
    /// Document identifier assigned on creation.
    pub id: String,
    /// Creation timestamp recorded by the store.
    pub created_at: SystemTime,
    /// The persisted record.
    pub record: GameRecord,
}

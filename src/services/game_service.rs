use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameRecord, GameStatus, StoredGame},
        storage::{StorageError, StorageTarget, StoreCredential},
    },
    dto::{game::CreateGameRequest, payload::RawPayload},
    error::ServiceError,
    services::game_code,
    state::SharedState,
};

/// Store writes attempted for one request when generated codes keep colliding.
pub const MAX_CODE_ATTEMPTS: usize = 3;

/// The event pool cannot fill a non-randomized board.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Not enough events provided. Need {required}, got {provided}")]
pub struct CapacityError {
    pub required: i64,
    pub provided: usize,
}

/// Number of events needed to fill a board: every cell except the free space.
pub fn required_event_count(board_size: i64, add_free_space: bool) -> i64 {
    board_size.saturating_mul(board_size) - i64::from(add_free_space)
}

/// Validate, create and persist a game from a raw request body.
///
/// Configuration is checked before the body is even decoded.
pub async fn create_game(
    state: &SharedState,
    body: &[u8],
    credential: Option<StoreCredential>,
) -> Result<StoredGame, ServiceError> {
    let target = state.config().storage_target()?;

    let payload = RawPayload::decode(body).inspect_err(|err| {
        warn!(error = %err, "undecodable create game payload");
    })?;
    debug!("create game payload decoded");

    let request = CreateGameRequest::from_payload(&payload).inspect_err(|err| {
        warn!(field = %err.field(), error = %err, "invalid create game payload");
    })?;

    let record = build_game_record(request.clone()).inspect_err(|err| {
        warn!(
            required = err.required,
            provided = err.provided,
            "not enough events for board"
        );
    })?;

    let store = state.require_game_store().await?;
    persist(store.as_ref(), &target, &request, record, credential).await
}

/// Write the record, drawing a new code when a generated one is taken.
async fn persist(
    store: &dyn GameStore,
    target: &StorageTarget,
    request: &CreateGameRequest,
    mut record: GameRecord,
    credential: Option<StoreCredential>,
) -> Result<StoredGame, ServiceError> {
    let generated_code = request.game_code.is_none();
    let mut attempt = 1;

    loop {
        let document_id = Uuid::new_v4();
        let game_code = record.game_code.clone();

        match store
            .create_document(target.clone(), document_id, record, credential.clone())
            .await
        {
            Ok(stored) => {
                info!(
                    document_id = %stored.id,
                    game_code = %stored.record.game_code,
                    board_size = stored.record.board_size,
                    events = stored.record.events.len(),
                    "game created"
                );
                return Ok(stored);
            }
            Err(StorageError::Conflict { .. }) if generated_code && attempt < MAX_CODE_ATTEMPTS => {
                warn!(%game_code, attempt, "generated game code already taken; retrying");
                record = build_game_record(request.clone())?;
                attempt += 1;
            }
            Err(err) => {
                match &err {
                    StorageError::Conflict { .. } => {
                        warn!(%game_code, "game code already taken");
                    }
                    StorageError::Unavailable { .. } => {
                        error!(error = %err, %document_id, "failed to create game document");
                    }
                }
                return Err(err.into());
            }
        }
    }
}

/// Assemble the canonical record, generating a game code when none was supplied.
pub fn build_game_record(request: CreateGameRequest) -> Result<GameRecord, CapacityError> {
    build_game_record_with(request, game_code::generate)
}

fn build_game_record_with(
    request: CreateGameRequest,
    generate_code: impl FnOnce() -> String,
) -> Result<GameRecord, CapacityError> {
    let CreateGameRequest {
        creator_id,
        board_size,
        voting_threshold,
        events,
        randomize_boards,
        free_space,
        game_code,
    } = request;

    let required = required_event_count(board_size, free_space.is_some());
    let provided = events.len();
    if !randomize_boards && i64::try_from(provided).unwrap_or(i64::MAX) < required {
        return Err(CapacityError { required, provided });
    }

    Ok(GameRecord {
        host: creator_id.clone(),
        creator_id,
        board_size,
        votes: vec![0; provided],
        events,
        status: GameStatus::Waiting,
        game_code: game_code.unwrap_or_else(generate_code),
        voting_threshold,
        players: Vec::new(),
        verified_events: Vec::new(),
        randomize_boards,
        add_free_space: free_space.is_some(),
        free_space_text: free_space,
    })
}

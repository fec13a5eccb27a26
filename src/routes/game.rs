use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::HeaderMap,
    routing::post,
};

use crate::{
    dao::storage::StoreCredential,
    dto::game::{CreateGameResponse, ErrorResponse},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Header carrying a per-request credential forwarded to the store.
pub const STORE_KEY_HEADER: &str = "x-store-key";

/// Routes handling game creation, accepting bodies up to `max_body_bytes`.
pub fn router(max_body_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Create a bingo game from a loosely typed JSON payload and persist it.
///
/// The body is read raw so that any content type is accepted and every
/// decoding failure is reported with the uniform error envelope.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body(
        content = String,
        content_type = "application/json",
        description = "Game definition: creatorId, boardSize, votingThreshold, events, \
                       and optionally randomizeBoards, addFreeSpace, freeSpaceText, gameCode"
    ),
    params(
        ("x-store-key" = Option<String>, Header, description = "Credential forwarded to the document store")
    ),
    responses(
        (status = 200, description = "Game created", body = CreateGameResponse),
        (status = 400, description = "Undecodable payload, invalid field or too few events", body = ErrorResponse),
        (status = 409, description = "Supplied game code already in use", body = ErrorResponse),
        (status = 413, description = "Request body over the configured limit", body = ErrorResponse),
        (status = 500, description = "Missing configuration or unexpected failure", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CreateGameResponse>, AppError> {
    let body = body?;
    let credential = store_credential(&headers);
    let stored = game_service::create_game(&state, &body, credential).await?;
    Ok(Json(CreateGameResponse::new(stored.into())))
}

fn store_credential(headers: &HeaderMap) -> Option<StoreCredential> {
    headers
        .get(STORE_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(StoreCredential::new)
}

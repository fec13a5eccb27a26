/// Persistence collaborators for game records.
pub mod game_store;
/// Game record definitions handed to and returned by the stores.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;

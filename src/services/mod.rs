/// OpenAPI documentation generation.
pub mod documentation;
/// Game code generation.
pub mod game_code;
/// Game creation: record building and persistence.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background supervision of the storage connection.
pub mod storage_supervisor;

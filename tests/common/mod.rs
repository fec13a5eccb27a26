use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use futures::future::BoxFuture;
use uuid::Uuid;

use bingo_back::config::AppConfig;
use bingo_back::dao::game_store::GameStore;
use bingo_back::dao::models::{GameRecord, StoredGame};
use bingo_back::dao::storage::{StorageError, StorageResult, StorageTarget, StoreCredential};
use bingo_back::routes;
use bingo_back::state::{AppState, SharedState};

/// One accepted write, as seen by the store.
#[derive(Debug, Clone)]
pub struct Write {
    pub target: StorageTarget,
    pub document_id: Uuid,
    pub game_code: String,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Accept,
    Fail,
    Panic,
}

/// In-memory store enforcing unique game codes.
pub struct MemoryStore {
    behavior: Behavior,
    codes: Mutex<HashSet<String>>,
    writes: Mutex<Vec<Write>>,
    attempts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            codes: Mutex::new(HashSet::new()),
            writes: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
        })
    }

    /// Mark a code as already taken.
    pub fn reserve(&self, code: &str) {
        self.codes.lock().unwrap().insert(code.to_string());
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Every game code the service tried to write, accepted or not.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

impl GameStore for MemoryStore {
    fn create_document(
        &self,
        target: StorageTarget,
        document_id: Uuid,
        record: GameRecord,
        credential: Option<StoreCredential>,
    ) -> BoxFuture<'static, StorageResult<StoredGame>> {
        self.attempts.lock().unwrap().push(record.game_code.clone());

        let result = match self.behavior {
            Behavior::Panic => panic!("store exploded"),
            Behavior::Fail => Err(StorageError::unavailable(
                "connection refused".into(),
                std::io::Error::other("connection refused"),
            )),
            Behavior::Accept => {
                if self.codes.lock().unwrap().insert(record.game_code.clone()) {
                    self.writes.lock().unwrap().push(Write {
                        target,
                        document_id,
                        game_code: record.game_code.clone(),
                        credential: credential.map(|c| c.expose().to_string()),
                    });
                    Ok(StoredGame {
                        id: document_id.to_string(),
                        created_at: SystemTime::now(),
                        record,
                    })
                } else {
                    Err(StorageError::conflict(record.game_code))
                }
            }
        };
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: SharedState,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Configured server backed by an accepting in-memory store.
    pub async fn new() -> (Self, Arc<MemoryStore>) {
        let store = MemoryStore::new(Behavior::Accept);
        let server = Self::with_store(store.clone()).await;
        (server, store)
    }

    /// Configured server backed by `store`.
    pub async fn with_store(store: Arc<MemoryStore>) -> Self {
        Self::with_config_and_store(AppConfig::default(), store).await
    }

    /// Server using `config` plus the test storage target, backed by `store`.
    pub async fn with_config_and_store(config: AppConfig, store: Arc<MemoryStore>) -> Self {
        let state = AppState::new(config.with_storage_target("bingo", "games"));
        state.install_game_store(store).await;
        Self::from_state(state).await
    }

    /// Server without any store installed, still in degraded mode.
    pub async fn from_config(config: AppConfig) -> Self {
        Self::from_state(AppState::new(config)).await
    }

    async fn from_state(state: SharedState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = routes::app(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// POST a raw body to `/games` and return status and JSON body.
    pub async fn create_game(&self, body: impl Into<String>) -> (u16, serde_json::Value) {
        self.create_game_with(body, None).await
    }

    pub async fn create_game_with(
        &self,
        body: impl Into<String>,
        store_key: Option<&str>,
    ) -> (u16, serde_json::Value) {
        let mut request = reqwest::Client::new()
            .post(format!("{}/games", self.base_url()))
            .header("content-type", "application/json")
            .body(body.into());
        if let Some(key) = store_key {
            request = request.header("x-store-key", key);
        }

        let resp = request.send().await.unwrap();
        let status = resp.status().as_u16();
        let body = resp.json().await.unwrap();
        (status, body)
    }
}

/// Payload for a `size`×`size` board with `events` distinct events.
pub fn game_payload(size: i64, events: usize) -> serde_json::Value {
    serde_json::json!({
        "creatorId": "u1",
        "boardSize": size,
        "votingThreshold": 2,
        "events": (0..events).map(|i| format!("event {i}")).collect::<Vec<_>>(),
    })
}

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for vprikol client integration tests.
//!
//! Provides a scripted [`MockTransport`] and helper functions for
//! constructing common API response bodies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use vprikol_client::{HttpRequest, HttpResponse, Transport, VprikolError};

// ── MockTransport ───────────────────────────────────────────────────

/// A scripted mock transport for integration testing.
///
/// Responses are consumed in order by `execute()`. Once the script is
/// exhausted the `fallback` response (if any) is returned forever; otherwise
/// `execute()` fails with a transport error. Every request is recorded.
pub struct MockTransport {
    incoming: StdMutex<VecDeque<Result<HttpResponse, VprikolError>>>,
    fallback: Option<HttpResponse>,
    /// Recorded outgoing requests.
    pub requests: Arc<StdMutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Create a mock transport with the given scripted responses.
    ///
    /// Returns the transport plus a shared handle for inspecting requests.
    pub fn new(incoming: Vec<HttpResponse>) -> (Self, Arc<StdMutex<Vec<HttpRequest>>>) {
        Self::with_results(incoming.into_iter().map(Ok).collect(), None)
    }

    /// Script responses, then repeat `fallback` once the script runs out.
    pub fn repeating(
        incoming: Vec<HttpResponse>,
        fallback: HttpResponse,
    ) -> (Self, Arc<StdMutex<Vec<HttpRequest>>>) {
        Self::with_results(incoming.into_iter().map(Ok).collect(), Some(fallback))
    }

    /// Script raw results, including transport failures.
    pub fn with_results(
        incoming: Vec<Result<HttpResponse, VprikolError>>,
        fallback: Option<HttpResponse>,
    ) -> (Self, Arc<StdMutex<Vec<HttpRequest>>>) {
        let requests = Arc::new(StdMutex::new(Vec::new()));
        let transport = Self {
            incoming: StdMutex::new(VecDeque::from(incoming)),
            fallback,
            requests: Arc::clone(&requests),
        };
        (transport, requests)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError> {
        self.requests.lock().unwrap().push(request);
        let next = self.incoming.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(result), _) => result,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(VprikolError::Transport("no scripted response".into())),
        }
    }
}

/// Path component of each recorded request, relative to the API root.
pub fn request_paths(requests: &Arc<StdMutex<Vec<HttpRequest>>>) -> Vec<String> {
    requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
        .collect()
}

/// Base URL used by every test client.
pub const BASE_URL: &str = "https://api.test/";

/// Install a `tracing` subscriber honouring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Response helpers ────────────────────────────────────────────────

/// 200 response with a JSON body.
pub fn ok_json(body: Value) -> HttpResponse {
    HttpResponse::new(200, body.to_string())
}

/// Structured API error response.
pub fn api_error(status: u16, error_code: i64, detail: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        json!({"error_code": error_code, "detail": detail}).to_string(),
    )
}

/// Structured API error response with a queue position.
pub fn api_error_queued(status: u16, error_code: i64, detail: &str, queue: i64) -> HttpResponse {
    HttpResponse::new(
        status,
        json!({"error_code": error_code, "detail": detail, "queue_position": queue}).to_string(),
    )
}

/// "Still queued" poll response.
pub fn still_queued() -> HttpResponse {
    api_error_queued(400, 425, "Task is still in queue", 3)
}

/// Successful `find/createTask` response.
pub fn ticket_response(request_id: &str) -> HttpResponse {
    ok_json(json!({
        "request_id": request_id,
        "request_time": 1_700_000_000,
        "queue_position": 5
    }))
}

/// Arizona player payload.
pub fn arizona_player_json() -> Value {
    json!({
        "accountId": 1234567,
        "playerId": 42,
        "lvl": 25,
        "cash": 1_500_000,
        "bank": 90_000_000,
        "individualAccount": null,
        "deposit": 500_000,
        "totalMoney": 92_000_000,
        "isOnline": true,
        "jobLabel": "Taxi driver",
        "jobId": 3,
        "rankNumber": 9,
        "rankLabel": "Colonel",
        "isLeader": false,
        "orgLabel": "LSPD",
        "orgId": 1,
        "vipLvl": 4,
        "vipLabel": "Diamond",
        "phoneNumber": 5550100,
        "updatedAt": 1_700_000_123,
        "playerNick": "Nick_Name",
        "playerServer": 5,
        "serverName": "Arizona Phoenix"
    })
}

/// Rodina player payload.
pub fn rodina_player_json() -> Value {
    json!({
        "hp": 100,
        "hunger": 75,
        "lvl": 12,
        "vip": "Gold",
        "cash": 10_000,
        "bank": 250_000,
        "azCoins": 15,
        "isLeader": true,
        "fraction": "FSB",
        "rank": 10,
        "job": "Miner",
        "isOnline": false
    })
}

/// Members payload with `players` keyed by nickname, in the given order.
pub fn members_json(names: &[&str]) -> Value {
    let mut players = serde_json::Map::new();
    for (i, name) in names.iter().enumerate() {
        players.insert(
            (*name).to_string(),
            json!({
                "id": i,
                "isOnline": i % 2 == 0,
                "isLeader": i == 0,
                "rank": 10 - i,
                "rankLabel": format!("Rank {}", 10 - i),
                "ingameId": 100 + i,
                "ping": 50,
                "lvl": 20,
                "color": 16777215
            }),
        );
    }
    json!({
        "serverName": "Phoenix",
        "fractionLabel": "LSPD",
        "players": players,
        "record": {"count": 80, "date": "2024-01-01", "leader": "Boss_Man"},
        "totalPlayers": names.len(),
        "totalOnline": names.len().div_ceil(2),
        "leaderNick": names.first().copied(),
        "isLeaderOnline": true
    })
}

/// One server-status entry.
pub fn server_status_json(number: u32) -> Value {
    json!({
        "number": number,
        "ip": "185.169.134.3",
        "port": 7777,
        "onlinePlayers": 900,
        "maxPlayers": 1000,
        "isClosed": false,
        "serverLabel": format!("Server {number}")
    })
}

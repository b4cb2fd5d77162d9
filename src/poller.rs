//! Create-task / poll-result protocol behind the player lookup.
//!
//! A lookup is computed asynchronously on the server. The client submits a
//! job, receives a [`JobTicket`], and polls until the job leaves the queue:
//!
//! ```text
//! Submitting ──ok──▶ Polling ──425──▶ (sleep) Polling
//!     │                 ├──200──▶ Found
//!     │                 ├──422──▶ NotFound
//!     │                 └──500/502/503, other──▶ Fatal
//!     └──error──▶ Fatal
//! ```
//!
//! Only "still queued" (425) is retried. Everything else is terminal.

use std::time::Duration;

use tracing::{debug, warn};

use crate::client::ApiRoot;
use crate::envelope::{decode_payload, ApiErrorBody, Envelope, ErrorBody};
use crate::error::{Result, VprikolError};
use crate::error_codes::ErrorCode;
use crate::protocol::{JobTicket, PlayerInfo, ServerVariant};
use crate::transport::{HttpResponse, Transport};

/// Path of the submit call.
pub const CREATE_TASK_PATH: &str = "find/createTask";

/// Path of the poll call.
pub const TASK_RESULT_PATH: &str = "find/getTaskResult";

/// Default delay between polls while the job is queued.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal outcome of a player lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The job finished and the player exists.
    Found(PlayerInfo),
    /// The job finished and the player does not exist (sentinel 422).
    NotFound(ApiErrorBody),
}

impl LookupResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn player(&self) -> Option<&PlayerInfo> {
        match self {
            Self::Found(player) => Some(player),
            Self::NotFound(_) => None,
        }
    }

    pub fn into_player(self) -> Option<PlayerInfo> {
        match self {
            Self::Found(player) => Some(player),
            Self::NotFound(_) => None,
        }
    }
}

/// Tuning for the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before re-polling a queued job.
    pub interval: Duration,
    /// Give up after this many polls of a queued job. `None` polls until the
    /// job completes or the caller drops the future.
    pub max_attempts: Option<u32>,
    /// Force the player payload schema instead of inferring it.
    pub server_variant: Option<ServerVariant>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            server_variant: None,
        }
    }
}

/// Classification of a single poll response.
#[derive(Debug)]
pub(crate) enum PollOutcome {
    Queued { queue_position: Option<i64> },
    Found(PlayerInfo),
    NotFound(ApiErrorBody),
    Failed(VprikolError),
}

#[derive(Debug)]
enum LookupState {
    Submitting,
    Polling { ticket: JobTicket, attempts: u32 },
    Found(PlayerInfo),
    NotFound(ApiErrorBody),
    Fatal(VprikolError),
}

/// Drives one lookup from submit to a terminal state.
pub(crate) struct JobPoller<'a, T: ?Sized> {
    transport: &'a T,
    root: &'a ApiRoot,
    config: &'a PollConfig,
}

impl<'a, T: Transport + ?Sized> JobPoller<'a, T> {
    pub(crate) fn new(transport: &'a T, root: &'a ApiRoot, config: &'a PollConfig) -> Self {
        Self {
            transport,
            root,
            config,
        }
    }

    /// Submit a lookup for `nickname` on `server_id` and poll it to completion.
    pub(crate) async fn run(&self, server_id: u32, nickname: &str) -> Result<LookupResult> {
        let mut state = LookupState::Submitting;
        loop {
            state = match state {
                LookupState::Submitting => {
                    let ticket = self.submit(server_id, nickname).await?;
                    debug!(
                        request_id = %ticket.request_id,
                        queue_position = ticket.queue_position,
                        "lookup submitted"
                    );
                    LookupState::Polling {
                        ticket,
                        attempts: 0,
                    }
                }
                LookupState::Polling { ticket, attempts } => {
                    let response = self.poll_once(&ticket).await?;
                    let attempts = attempts.saturating_add(1);
                    match classify(&response, self.config.server_variant) {
                        PollOutcome::Queued { queue_position } => {
                            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                                warn!(
                                    request_id = %ticket.request_id,
                                    attempts,
                                    "lookup still queued, giving up"
                                );
                                LookupState::Fatal(VprikolError::PollLimitExceeded {
                                    request_id: ticket.request_id,
                                    attempts,
                                })
                            } else {
                                debug!(
                                    request_id = %ticket.request_id,
                                    attempts,
                                    ?queue_position,
                                    "lookup still queued"
                                );
                                tokio::time::sleep(self.config.interval).await;
                                LookupState::Polling { ticket, attempts }
                            }
                        }
                        PollOutcome::Found(player) => LookupState::Found(player),
                        PollOutcome::NotFound(body) => LookupState::NotFound(body),
                        PollOutcome::Failed(err) => LookupState::Fatal(err),
                    }
                }
                LookupState::Found(player) => {
                    debug!(variant = ?player.variant(), "lookup found player");
                    return Ok(LookupResult::Found(player));
                }
                LookupState::NotFound(body) => {
                    debug!(detail = %body.detail, "lookup finished, player not found");
                    return Ok(LookupResult::NotFound(body));
                }
                LookupState::Fatal(err) => {
                    debug!(error = %err, "lookup failed");
                    return Err(err);
                }
            };
        }
    }

    /// Create the server-side job. Any failure here is final.
    async fn submit(&self, server_id: u32, nickname: &str) -> Result<JobTicket> {
        let request = self
            .root
            .post(CREATE_TASK_PATH)
            .with_query("server", server_id)
            .with_query("nick", nickname);
        let response = self.transport.execute(request).await?;
        Envelope::<JobTicket>::decode(&response)?.into_result()
    }

    async fn poll_once(&self, ticket: &JobTicket) -> Result<HttpResponse> {
        let request = self
            .root
            .get(TASK_RESULT_PATH)
            .with_query("request_id", &ticket.request_id);
        self.transport.execute(request).await
    }
}

/// Classify one poll response.
pub(crate) fn classify(response: &HttpResponse, variant: Option<ServerVariant>) -> PollOutcome {
    if response.is_success() {
        return match decode_player(&response.body, variant) {
            Ok(player) => PollOutcome::Found(player),
            Err(err) => PollOutcome::Failed(err),
        };
    }

    let status = response.status;
    match ErrorBody::parse(&response.body) {
        ErrorBody::Api(api) => match api.error_code {
            ErrorCode::StillQueued => PollOutcome::Queued {
                queue_position: api.queue_position,
            },
            ErrorCode::NotFound => PollOutcome::NotFound(api),
            code if code.is_server_fault() => {
                PollOutcome::Failed(VprikolError::FatalInfrastructure {
                    error_code: code,
                    detail: api.detail,
                })
            }
            _ => PollOutcome::Failed(ErrorBody::Api(api).into_error(status)),
        },
        other => {
            let status_code = ErrorCode::from(i64::from(status));
            if status_code.is_server_fault() {
                let detail = match other {
                    ErrorBody::Validation(validation) => validation.detail.to_string(),
                    ErrorBody::Raw(text) => text,
                    ErrorBody::Api(api) => api.detail,
                };
                PollOutcome::Failed(VprikolError::FatalInfrastructure {
                    error_code: status_code,
                    detail,
                })
            } else {
                PollOutcome::Failed(other.into_error(status))
            }
        }
    }
}

fn decode_player(body: &[u8], variant: Option<ServerVariant>) -> Result<PlayerInfo> {
    match variant {
        None => decode_payload::<PlayerInfo>(body),
        Some(variant) => {
            let value = decode_payload::<serde_json::Value>(body)?;
            PlayerInfo::from_value_as(value, variant).map_err(|source| {
                VprikolError::StructuralMismatch {
                    target: std::any::type_name::<PlayerInfo>(),
                    source,
                }
            })
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::transport::HttpRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Replays scripted responses and records every request.
    struct ScriptedTransport {
        responses: StdMutex<VecDeque<HttpResponse>>,
        requests: StdMutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: StdMutex::new(VecDeque::from(responses)),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.rsplit_once(".dev/").unwrap().1.to_string())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| VprikolError::Transport("script exhausted".into()))
        }
    }

    fn root() -> ApiRoot {
        ApiRoot::new("https://api.vprikol.dev/", "secret")
    }

    fn ticket() -> HttpResponse {
        HttpResponse::new(
            200,
            json!({"request_id": "req-1", "request_time": 1700000000, "queue_position": 4})
                .to_string(),
        )
    }

    fn api_error(status: u16, code: i64, detail: &str) -> HttpResponse {
        HttpResponse::new(
            status,
            json!({"error_code": code, "detail": detail, "queue_position": 2}).to_string(),
        )
    }

    fn rodina_player() -> serde_json::Value {
        json!({
            "hp": 100, "hunger": 80, "lvl": 12, "vip": "Gold", "cash": 5000,
            "bank": 120000, "azCoins": 30, "isLeader": false, "fraction": "LSPD",
            "rank": 4, "job": "Lawyer", "isOnline": true
        })
    }

    #[test]
    fn classify_queued() {
        let outcome = classify(&api_error(400, 425, "queued"), None);
        assert!(matches!(outcome, PollOutcome::Queued { queue_position: Some(2) }));
    }

    #[test]
    fn classify_not_found_keeps_fields() {
        let outcome = classify(&api_error(404, 422, "no such player"), None);
        let PollOutcome::NotFound(body) = outcome else {
            panic!("expected NotFound, got {outcome:?}");
        };
        assert_eq!(body.error_code, ErrorCode::NotFound);
        assert_eq!(body.detail, "no such player");
        assert_eq!(body.queue_position, Some(2));
    }

    #[test]
    fn classify_server_faults() {
        for code in [500, 502, 503] {
            let outcome = classify(&api_error(500, code, "down"), None);
            let PollOutcome::Failed(VprikolError::FatalInfrastructure { error_code, detail }) =
                outcome
            else {
                panic!("expected fatal for {code}, got {outcome:?}");
            };
            assert_eq!(error_code.as_i64(), code);
            assert_eq!(detail, "down");
        }
    }

    #[test]
    fn classify_raw_gateway_page_is_fatal() {
        let outcome = classify(&HttpResponse::new(502, "<html>bad gateway</html>"), None);
        assert!(matches!(
            outcome,
            PollOutcome::Failed(VprikolError::FatalInfrastructure {
                error_code: ErrorCode::BadGateway,
                ..
            })
        ));
    }

    #[test]
    fn classify_unknown_code_propagates_as_is() {
        let outcome = classify(&api_error(403, 403, "forbidden"), None);
        assert!(matches!(
            outcome,
            PollOutcome::Failed(VprikolError::Api { error_code: ErrorCode::Other(403), .. })
        ));
    }

    fn validation_body() -> String {
        json!({"detail": [{"loc": ["query", "request_id"], "msg": "field required", "type": "value_error.missing"}]})
            .to_string()
    }

    #[test]
    fn classify_validation_body_propagates_as_is() {
        let outcome = classify(&HttpResponse::new(422, validation_body()), None);
        let PollOutcome::Failed(VprikolError::Validation { status, detail }) = outcome else {
            panic!("expected Validation, got {outcome:?}");
        };
        assert_eq!(status, 422);
        assert_eq!(
            detail.to_string(),
            "query.request_id: field required (value_error.missing)"
        );
    }

    #[test]
    fn classify_raw_body_propagates_as_http() {
        let outcome = classify(&HttpResponse::new(404, "<html>Not Found</html>"), None);
        let PollOutcome::Failed(VprikolError::Http { status, body }) = outcome else {
            panic!("expected Http, got {outcome:?}");
        };
        assert_eq!(status, 404);
        assert_eq!(body, "<html>Not Found</html>");
    }

    #[test]
    fn classify_validation_body_on_server_fault_is_fatal() {
        let outcome = classify(&HttpResponse::new(503, validation_body()), None);
        let PollOutcome::Failed(VprikolError::FatalInfrastructure { error_code, detail }) = outcome
        else {
            panic!("expected fatal, got {outcome:?}");
        };
        assert_eq!(error_code, ErrorCode::ServiceUnavailable);
        assert_eq!(detail, "query.request_id: field required (value_error.missing)");
    }

    #[test]
    fn classify_success_infers_variant() {
        let outcome = classify(&HttpResponse::new(200, rodina_player().to_string()), None);
        let PollOutcome::Found(player) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert_eq!(player.variant(), ServerVariant::Rodina);
    }

    #[test]
    fn classify_success_with_forced_variant_mismatch() {
        let outcome = classify(
            &HttpResponse::new(200, rodina_player().to_string()),
            Some(ServerVariant::Arizona),
        );
        assert!(matches!(
            outcome,
            PollOutcome::Failed(VprikolError::StructuralMismatch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn queued_twice_then_found() {
        let transport = ScriptedTransport::new(vec![
            ticket(),
            api_error(400, 425, "queued"),
            api_error(400, 425, "queued"),
            HttpResponse::new(200, rodina_player().to_string()),
        ]);
        let root = root();
        let config = PollConfig {
            interval: Duration::from_secs(1),
            ..PollConfig::default()
        };
        let start = tokio::time::Instant::now();
        let result = JobPoller::new(&transport, &root, &config)
            .run(7, "Nick_Name")
            .await
            .unwrap();
        assert!(result.is_found());
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(
            transport.paths(),
            [CREATE_TASK_PATH, TASK_RESULT_PATH, TASK_RESULT_PATH, TASK_RESULT_PATH]
        );
    }

    #[tokio::test]
    async fn submit_failure_skips_polling() {
        let transport = ScriptedTransport::new(vec![api_error(400, 400, "bad nick")]);
        let root = root();
        let config = PollConfig::default();
        let err = JobPoller::new(&transport, &root, &config)
            .run(7, "??")
            .await
            .unwrap_err();
        assert!(matches!(err, VprikolError::Api { error_code: ErrorCode::Other(400), .. }));
        assert_eq!(transport.paths(), [CREATE_TASK_PATH]);
    }

    #[tokio::test(start_paused = true)]
    async fn max_attempts_caps_the_loop() {
        let transport = ScriptedTransport::new(vec![
            ticket(),
            api_error(400, 425, "queued"),
            api_error(400, 425, "queued"),
            api_error(400, 425, "queued"),
        ]);
        let root = root();
        let config = PollConfig {
            max_attempts: Some(3),
            ..PollConfig::default()
        };
        let err = JobPoller::new(&transport, &root, &config)
            .run(7, "Nick_Name")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VprikolError::PollLimitExceeded { ref request_id, attempts: 3 } if request_id == "req-1"
        ));
        assert_eq!(transport.paths().len(), 4);
    }

    #[tokio::test]
    async fn transport_error_during_poll_is_propagated() {
        let transport = ScriptedTransport::new(vec![ticket()]);
        let root = root();
        let config = PollConfig::default();
        let err = JobPoller::new(&transport, &root, &config)
            .run(7, "Nick_Name")
            .await
            .unwrap_err();
        assert!(matches!(err, VprikolError::Transport(_)));
    }

    #[tokio::test]
    async fn poll_uses_ticket_request_id() {
        let transport = ScriptedTransport::new(vec![ticket(), api_error(404, 422, "nope")]);
        let root = root();
        let config = PollConfig::default();
        JobPoller::new(&transport, &root, &config)
            .run(7, "Nick_Name")
            .await
            .unwrap();
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].query_param("server"), Some("7"));
        assert_eq!(requests[0].query_param("nick"), Some("Nick_Name"));
        assert_eq!(requests[1].query_param("request_id"), Some("req-1"));
    }
}

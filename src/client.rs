//! Async client for the vprikol API.
//!
//! [`VprikolClient`] is a thin façade over a [`Transport`]: every method builds
//! one request, decodes the response through an [`Envelope`], and returns the
//! typed payload. The player lookup additionally drives the job poller.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = VprikolConfig::new(std::env::var("VPRIKOL_TOKEN")?);
//! let client = VprikolClient::new(ReqwestTransport::new()?, config)?;
//!
//! match client.get_player_information(5, "Nick_Name").await? {
//!     LookupResult::Found(player) => println!("level {}", player.lvl()),
//!     LookupResult::NotFound(body) => println!("not found: {}", body.detail),
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::envelope::{decode_value, Envelope};
use crate::error::{Result, VprikolError};
use crate::poller::{JobPoller, LookupResult, PollConfig};
use crate::protocol::{
    EstateResponse, Gender, GeneratedRpNickname, IpInfo, MembersResponse, Nation,
    OnlineSessions, RatingResponse, RpNicknameCheck, ServerStatus, ServerVariant,
};
use crate::reshape::reshape_field;
use crate::transport::{HttpMethod, HttpRequest, Transport};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.vprikol.dev/";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`VprikolClient`].
///
/// The only required field is the bearer `token`; all others have sensible
/// defaults.
///
/// ```
/// use std::time::Duration;
/// use vprikol_client::VprikolConfig;
///
/// let config = VprikolConfig::new("token")
///     .with_poll_interval(Duration::from_millis(250))
///     .with_max_poll_attempts(40);
/// assert_eq!(config.poll.max_attempts, Some(40));
/// assert_eq!(config.base_url, "https://api.vprikol.dev/");
/// ```
#[derive(Clone)]
pub struct VprikolConfig {
    /// Pre-issued bearer token. Sent verbatim as `Authorization: Bearer <token>`.
    pub token: String,
    /// API root; endpoint paths are appended to it.
    ///
    /// Defaults to **`https://api.vprikol.dev/`**.
    pub base_url: String,
    /// Player lookup polling behaviour.
    pub poll: PollConfig,
}

impl VprikolConfig {
    /// Create a configuration with the given token and default values.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll: PollConfig::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the delay between polls of a queued lookup.
    ///
    /// Defaults to **500 ms**.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// Cap the number of polls of a queued lookup.
    ///
    /// Unbounded by default. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll.max_attempts = Some(attempts.max(1));
        self
    }

    /// Decode lookup results as `variant` instead of inferring it per payload.
    #[must_use]
    pub fn with_server_variant(mut self, variant: ServerVariant) -> Self {
        self.poll.server_variant = Some(variant);
        self
    }
}

impl fmt::Debug for VprikolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VprikolConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("poll", &self.poll)
            .finish()
    }
}

// ── Request building ────────────────────────────────────────────────

/// Base URL plus the authorization header shared by every request.
#[derive(Clone)]
pub(crate) struct ApiRoot {
    base_url: String,
    authorization: String,
}

impl ApiRoot {
    pub(crate) fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {token}"),
        }
    }

    pub(crate) fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}/{path}", self.base_url))
            .with_header("Authorization", self.authorization.clone())
    }

    pub(crate) fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path)
    }

    pub(crate) fn post(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Post, path)
    }
}

impl fmt::Debug for ApiRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRoot")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the vprikol API.
///
/// Holds no mutable state: methods take `&self` and concurrent calls are
/// independent of each other.
pub struct VprikolClient<T> {
    transport: T,
    root: ApiRoot,
    poll: PollConfig,
}

impl<T: Transport> VprikolClient<T> {
    /// Create a client over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`VprikolError::InvalidToken`] if the token is empty.
    pub fn new(transport: T, config: VprikolConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(VprikolError::InvalidToken);
        }
        Ok(Self {
            transport,
            root: ApiRoot::new(&config.base_url, &config.token),
            poll: config.poll,
        })
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Geolocation and ISP of an IP address.
    pub async fn get_ip_info(&self, ip: &str) -> Result<IpInfo> {
        self.fetch(self.root.get("ip").with_query("ip", ip)).await
    }

    /// Members of faction `fraction_id` on `server_id`.
    ///
    /// The wire `players` object (keyed by nickname) is reshaped into a list,
    /// each entry carrying its key as `username`, in wire order.
    pub async fn get_members(&self, server_id: u32, fraction_id: u32) -> Result<MembersResponse> {
        let request = self
            .root
            .get("members")
            .with_query("server", server_id)
            .with_query("fraction_id", fraction_id);
        let mut payload: Value = self.fetch(request).await?;
        reshape_field(&mut payload, "players", "username");
        decode_value(payload)
    }

    /// Look up a player's profile by nickname.
    ///
    /// Submits a lookup job and polls it until it leaves the queue. A missing
    /// player is a [`LookupResult::NotFound`] value, not an error.
    ///
    /// # Errors
    ///
    /// - any error from the submit call, returned before polling starts
    /// - [`VprikolError::FatalInfrastructure`] when the job fails server-side
    /// - [`VprikolError::PollLimitExceeded`] when a poll cap is configured
    /// - any other API, transport or decode error, as-is
    pub async fn get_player_information(
        &self,
        server_id: u32,
        nickname: &str,
    ) -> Result<LookupResult> {
        JobPoller::new(&self.transport, &self.root, &self.poll)
            .run(server_id, nickname)
            .await
    }

    /// Status of one server, or of every server when `server_id` is `None`.
    ///
    /// The API answers with an array or a single object; both become a list.
    pub async fn get_server_status(&self, server_id: Option<u32>) -> Result<Vec<ServerStatus>> {
        let mut request = self.root.get("status");
        if let Some(server_id) = server_id {
            request = request.with_query("server", server_id);
        }
        let payload: Value = self.fetch(request).await?;
        match payload {
            Value::Array(_) => decode_value(payload),
            Value::Object(_) => Ok(vec![decode_value(payload)?]),
            other => {
                debug!(payload = %other, "status payload is neither array nor object");
                decode_value::<ServerStatus>(other).map(|status| vec![status])
            }
        }
    }

    /// A rating board. `rating_type` and `subtype` must be 1, 2 or 3.
    pub async fn get_rating(
        &self,
        server_id: u32,
        rating_type: u8,
        subtype: Option<u8>,
    ) -> Result<RatingResponse> {
        check_rating_kind("rating_type", rating_type)?;
        let mut request = self.root.get("rating").with_query("type", rating_type);
        if let Some(subtype) = subtype {
            check_rating_kind("subtype", subtype)?;
            request = request.with_query("subtype", subtype);
        }
        self.fetch(request.with_query("server", server_id)).await
    }

    /// Whether a nickname follows role-play naming rules.
    pub async fn check_rp_nickname(&self, nickname: &str) -> Result<RpNicknameCheck> {
        self.fetch(self.root.get("checkrp").with_query("nick", nickname))
            .await
    }

    /// Generate a role-play nickname.
    pub async fn generate_rp_nickname(
        &self,
        gender: Gender,
        nation: Nation,
    ) -> Result<GeneratedRpNickname> {
        let request = self
            .root
            .get("rpnick")
            .with_query("gender", gender.as_str())
            .with_query("nation", nation.as_str());
        self.fetch(request).await
    }

    /// Houses and businesses on a server, including auction state.
    pub async fn get_estate(&self, server_id: u32) -> Result<EstateResponse> {
        self.fetch(self.root.get("estate").with_query("server", server_id))
            .await
    }

    /// Recent play sessions of a player.
    pub async fn get_online_sessions(
        &self,
        server_id: u32,
        nickname: &str,
    ) -> Result<OnlineSessions> {
        let request = self
            .root
            .get("online")
            .with_query("server", server_id)
            .with_query("nick", nickname);
        self.fetch(request).await
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Execute a single-shot request and decode the payload.
    async fn fetch<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        Envelope::<R>::decode(&response)?.into_result()
    }
}

impl<T> fmt::Debug for VprikolClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VprikolClient")
            .field("root", &self.root)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

fn check_rating_kind(name: &str, value: u8) -> Result<()> {
    if (1..=3).contains(&value) {
        Ok(())
    } else {
        Err(VprikolError::InvalidArgument(format!(
            "{name} must be 1, 2 or 3, got {value}"
        )))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::poller::DEFAULT_POLL_INTERVAL;

    #[test]
    fn config_defaults() {
        let config = VprikolConfig::new("t");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll.interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.poll.server_variant, None);
    }

    #[test]
    fn max_poll_attempts_is_clamped_to_one() {
        let config = VprikolConfig::new("t").with_max_poll_attempts(0);
        assert_eq!(config.poll.max_attempts, Some(1));
    }

    #[test]
    fn config_debug_redacts_token() {
        let rendered = format!("{:?}", VprikolConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn api_root_joins_paths_and_sets_bearer() {
        for base in ["https://api.example/", "https://api.example"] {
            let req = ApiRoot::new(base, "abc").get("find/getTaskResult");
            assert_eq!(req.url, "https://api.example/find/getTaskResult");
            assert_eq!(req.header("authorization"), Some("Bearer abc"));
            assert_eq!(req.method, HttpMethod::Get);
        }
    }

    #[test]
    fn rating_kind_bounds() {
        assert!(check_rating_kind("type", 1).is_ok());
        assert!(check_rating_kind("type", 3).is_ok());
        assert!(matches!(
            check_rating_kind("type", 0),
            Err(VprikolError::InvalidArgument(_))
        ));
        assert!(check_rating_kind("type", 4).is_err());
    }
}

//! # vprikol client
//!
//! Async Rust client for the vprikol game-server statistics API: player
//! lookup, server status, faction members, rating boards, estate and
//! online-session data.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement the [`Transport`] trait for any HTTP backend
//! - **Typed errors**: API, validation, decode and transport failures are distinct
//!   [`VprikolError`] variants
//! - **Job polling**: [`VprikolClient::get_player_information`] submits the lookup
//!   job and polls it to a [`LookupResult`]
//! - **reqwest built-in**: the default `transport-reqwest` feature provides
//!   `ReqwestTransport`

pub mod client;
pub mod envelope;
pub mod error;
pub mod error_codes;
pub mod poller;
pub mod protocol;
pub mod reshape;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{VprikolClient, VprikolConfig, DEFAULT_BASE_URL};
pub use envelope::{ApiErrorBody, Envelope, ErrorBody};
pub use error::{Result, VprikolError};
pub use error_codes::ErrorCode;
pub use poller::{LookupResult, PollConfig};
pub use protocol::{PlayerInfo, ServerVariant};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[cfg(feature = "transport-reqwest")]
pub use transports::ReqwestTransport;

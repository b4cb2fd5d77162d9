//! Transport implementations for the vprikol API.
//!
//! This module provides concrete [`Transport`](crate::Transport) implementations
//! behind feature gates. Enable the corresponding Cargo feature to pull in
//! a transport:
//!
//! | Feature             | Transport            |
//! |---------------------|----------------------|
//! | `transport-reqwest` | [`ReqwestTransport`] |
//!
//! # Example
//!
//! ```rust,ignore
//! # async fn example() -> Result<(), vprikol_client::VprikolError> {
//! use vprikol_client::{ReqwestTransport, VprikolClient, VprikolConfig};
//!
//! let client = VprikolClient::new(ReqwestTransport::new()?, VprikolConfig::new("token"))?;
//! let servers = client.get_server_status(None).await?;
//! println!("{} servers", servers.len());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "transport-reqwest")]
pub mod http;

#[cfg(feature = "transport-reqwest")]
pub use http::ReqwestTransport;

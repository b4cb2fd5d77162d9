//! # Player Lookup Example
//!
//! Looks up a player's profile and prints the outcome:
//!
//! 1. Read the API token from `VPRIKOL_TOKEN`
//! 2. Submit a lookup job for the given server and nickname
//! 3. Poll until the job finishes, with a caller-side deadline
//!
//! ## Running
//!
//! ```sh
//! VPRIKOL_TOKEN=... cargo run --example lookup_player -- 5 Nick_Name
//!
//! # Verbose polling output:
//! RUST_LOG=vprikol_client=debug VPRIKOL_TOKEN=... cargo run --example lookup_player -- 5 Nick_Name
//! ```

use std::time::Duration;

use vprikol_client::{LookupResult, PlayerInfo, ReqwestTransport, VprikolClient, VprikolConfig};

/// How long to wait for the lookup job before giving up.
const LOOKUP_DEADLINE: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let token = std::env::var("VPRIKOL_TOKEN")?;
    let mut args = std::env::args().skip(1);
    let server_id: u32 = args.next().as_deref().unwrap_or("1").parse()?;
    let nickname = args.next().unwrap_or_else(|| "Nick_Name".to_string());

    let config = VprikolConfig::new(token).with_poll_interval(Duration::from_secs(1));
    let client = VprikolClient::new(ReqwestTransport::new()?, config)?;

    // ── Lookup ──────────────────────────────────────────────────────
    tracing::info!(server_id, %nickname, "looking up player");
    let lookup = client.get_player_information(server_id, &nickname);
    let result = match tokio::time::timeout(LOOKUP_DEADLINE, lookup).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!("lookup did not finish within {LOOKUP_DEADLINE:?}");
            return Ok(());
        }
    };

    match result {
        LookupResult::Found(PlayerInfo::Arizona(player)) => {
            println!(
                "{} on {}: level {}, org {}, online: {}",
                player.player_nick, player.server_name, player.lvl, player.org_label, player.is_online
            );
        }
        LookupResult::Found(PlayerInfo::Rodina(player)) => {
            println!(
                "{nickname}: level {}, fraction {}, online: {}",
                player.lvl, player.fraction, player.is_online
            );
        }
        LookupResult::NotFound(body) => {
            println!("{nickname} not found: {}", body.detail);
        }
    }

    Ok(())
}

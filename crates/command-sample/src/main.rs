//! # Weave Command Sample
//!
//! Boots a [`CommandSystem`] from a TOML file and runs a short scripted session
//! against it, printing each response envelope as JSON.
//!
//! ```bash
//! cargo run -p command-sample                     # crate's own weave.toml
//! cargo run -p command-sample -- /etc/weave.toml  # any other config
//! ```

use anyhow::Context;
use command_framework::tracing::setup_tracing;
use command_framework::{CommandAttributes, CommandRequest};
use command_sample::config::Config;
use command_sample::lifecycle::CommandSystem;
use tracing::{info, Instrument};

const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/weave.toml");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::load(&path).with_context(|| format!("loading config from {path}"))?;
    if config.logging.stdout {
        setup_tracing();
    }

    info!(%path, "Starting weave command sample");
    let system = CommandSystem::new(config).context("registering resource handlers")?;

    let session = [
        CommandRequest::new("PersonalizedInfos", "Get"),
        CommandRequest::new("PersonalizedInfos", "Patch").with_attributes(
            CommandAttributes::new()
                .with("id", "me")
                .with("location", "Study")
                .with("lastUseTimeMs", 12345),
        ),
        CommandRequest::new("PersonalizedInfos", "Update")
            .with_attributes(CommandAttributes::new().with("name", "Desk lamp")),
        CommandRequest::new("PersonalizedInfos", "Patch")
            .with_attributes(CommandAttributes::new().with("colour", "red")),
        CommandRequest::new("AuthorizedApps", "Get"),
        CommandRequest::new("AuthorizedApps", "Patch"),
        CommandRequest::new("Devices", "Get"),
        CommandRequest::new("PersonalizedInfos", "Delete"),
    ];

    for request in session {
        let span = tracing::info_span!("demo", resource = %request.resource, verb = %request.verb);
        let label = format!("{} {}", request.resource, request.verb);
        let envelope = system.execute(request).instrument(span).await;
        println!(
            "{label} -> {}\n{}",
            envelope.http_status(),
            serde_json::to_string_pretty(&envelope)?
        );
    }

    system.shutdown().await.context("stopping stores")?;
    info!("Application completed successfully");
    Ok(())
}

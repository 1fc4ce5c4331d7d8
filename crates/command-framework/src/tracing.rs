//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Everything in the
//! dispatch core logs through `tracing` with structured fields:
//!
//! - **Registry**: `Registered` / `Duplicate registration rejected` with `resource`.
//! - **Resolver**: `Resolved` / `Unsupported verb` with `resource`, `verb`.
//! - **Dispatcher**: a `dispatch` span carrying `request_id`, `resource` and
//!   `verb`; inside it `Ok`, `Business failure`, `Handler failed`,
//!   `Handler panicked`, `Timed out`, `Cancelled`.
//!
//! ```bash
//! # Lifecycle and outcomes
//! RUST_LOG=info cargo run -p command-sample
//!
//! # Attribute dumps for every dispatch
//! RUST_LOG=debug cargo run -p command-sample
//!
//! # Only the dispatch core
//! RUST_LOG=command_framework=debug cargo run -p command-sample
//! ```
//!
//! With `RUST_LOG=info` a Patch shows up as:
//!
//! ```text
//! INFO execute:dispatch: Ok resource="PersonalizedInfos" verb=Patch request_id=2 id=Some(String("me"))
//! ```

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset or invalid.
/// Safe to call more than once: later calls leave the first subscriber in place.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Resource and verb fields already say where we are
        .compact()
        .try_init();
}

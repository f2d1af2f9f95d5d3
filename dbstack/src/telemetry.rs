//! Tracing initialization.
//!
//! Logs go to stderr so the stack document written to stdout stays machine-readable. The
//! filter is taken from `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=dbstack=debug dbstack -f dbstack.yaml > stack.json
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}

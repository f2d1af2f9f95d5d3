use clap::Parser;
use dbstack::{Config, telemetry};

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = dbstack::config::Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    if let Err(err) = dbstack::emit(&config, args.output.as_deref()) {
        if err.is_caller_error() {
            tracing::error!("{err}");
            std::process::exit(2);
        }
        return Err(err.into());
    }
    Ok(())
}

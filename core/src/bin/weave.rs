/// weave CLI
///
/// Runs and inspects reference programs (.toml / .json) on the flow-control
/// engine. Logging is controlled with RUST_LOG (default: info).
use tracing_subscriber::EnvFilter;
use weave_core::cli;

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

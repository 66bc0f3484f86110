//! CrewPilot main entrypoint.

use crewpilot::run;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_env("CREWPILOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e.user_message());
        tracing::debug!(error = %e, "command failed");
        std::process::exit(1);
    }
}

/// Quiver CLI
///
/// Runs and validates GraphQL requests against the bundled demo schema.

use quiver_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

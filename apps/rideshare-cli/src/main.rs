//! # Rideshare CLI Entry Point
//!
//! ```bash
//! rideshare login --email john@example.com --password x --role rider
//! rideshare request "Av. Paulista, 1000, São Paulo" "Rua Augusta, 500, São Paulo"
//! rideshare login --email jane@example.com --password x --role driver
//! rideshare rides --available
//! rideshare accept <ride-id>
//! ```

use clap::Parser;
use rideshare_cli::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    rideshare_cli::init_tracing();

    match rideshare_cli::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{}", body);
            ExitCode::FAILURE
        }
    }
}

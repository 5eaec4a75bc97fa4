//! Address Ledger CLI
//!
//! Reconstructs the history of one address and writes the report artifacts.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --settings /etc/address-ledger/settings.yaml
//! RUST_LOG=debug cargo run
//! ```
//!
//! The settings document names the node, the target address and the output
//! directory. The program writes `{output_path}/{address}.pdf` and
//! `{output_path}/{address}.csv`. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unreadable or incomplete settings, unreachable node, unwritable output, etc.)

use address_ledger::cli;
use address_ledger::io::Settings;
use address_ledger::pipeline;
use std::process;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();

    let settings = match Settings::load(&args.settings) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid settings");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match pipeline::run(&settings) {
        Ok(summary) => {
            println!(
                "Done! The results have been saved to {}",
                summary.report_path.display()
            );
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

use clap::Parser;
use std::path::PathBuf;

/// Default location of the settings document
pub const DEFAULT_SETTINGS_PATH: &str = "settings.yaml";

/// Reconstruct the transaction history of a blockchain address
#[derive(Parser, Debug)]
#[command(name = "address-ledger")]
#[command(
    about = "Reconstruct the transaction history of a blockchain address into a PDF report",
    long_about = None
)]
pub struct CliArgs {
    /// Settings document with the RPC credentials, target address and output directory
    #[arg(
        long = "settings",
        value_name = "PATH",
        default_value = DEFAULT_SETTINGS_PATH,
        help = "Path to the YAML settings document"
    )]
    pub settings: PathBuf,
}

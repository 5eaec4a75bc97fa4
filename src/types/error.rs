//! Error types for the address ledger
//!
//! This module defines all error types that can occur while loading settings,
//! talking to the node and the reputation service, building the ledger and
//! writing the report. Errors are designed to be descriptive for CLI output.
//!
//! # Error Categories
//!
//! - **Settings Errors**: unreadable or malformed settings, missing/empty keys
//! - **RPC Errors**: transport failures, HTTP status failures, node-side errors
//! - **Reputation Errors**: per-address lookup failures (recoverable)
//! - **Ledger Errors**: balance arithmetic overflow
//! - **Report Errors**: PDF/CSV/file system failures
//!
//! Setup-time errors are fatal. RPC errors raised for a single block or
//! transaction during the scan are recovered into a scan gap instead.

use thiserror::Error;

/// Errors raised while loading the settings document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// The settings document could not be read or parsed
    #[error("Unable to load settings from {path}: {message}")]
    Load {
        /// Path of the settings document
        path: String,
        /// Description of the failure
        message: String,
    },

    /// Required keys are absent or empty
    ///
    /// All offending keys are reported together.
    #[error("The following settings are missing or empty: {}", keys.join(", "))]
    MissingKeys {
        /// Names of the missing or empty keys
        keys: Vec<String>,
    },

    /// A key is present but its value has the wrong type or range
    #[error("Invalid value for setting '{key}': {message}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// Description of the problem
        message: String,
    },
}

/// Errors raised by a JSON-RPC call to the node
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    /// The HTTP request could not be sent or the response not read
    #[error("RPC request '{method}' failed: {message}")]
    Transport {
        /// RPC method name
        method: String,
        /// Description of the transport failure
        message: String,
    },

    /// The node answered with a non-success HTTP status and no RPC error body
    #[error("RPC request '{method}' failed with HTTP status {status}")]
    Status {
        /// RPC method name
        method: String,
        /// HTTP status code
        status: u16,
    },

    /// The node returned a JSON-RPC error object
    #[error("RPC error {code} for '{method}': {message}")]
    Node {
        /// RPC method name
        method: String,
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// The response could not be decoded into the expected shape
    #[error("Failed to decode '{method}' response: {message}")]
    Decode {
        /// RPC method name
        method: String,
        /// Description of the decoding failure
        message: String,
    },
}

/// Errors raised by a single reputation lookup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReputationError {
    #[error("Reputation lookup for {address} failed: {message}")]
    Transport { address: String, message: String },

    #[error("Reputation lookup for {address} returned HTTP status {status}")]
    Status { address: String, status: u16 },

    #[error("Failed to decode reputation response for {address}: {message}")]
    Decode { address: String, message: String },
}

/// Errors raised while building the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Applying an entry would overflow the running balance
    #[error("Balance overflow while applying {direction} of transaction {txid}")]
    ArithmeticOverflow {
        /// Transaction being applied
        txid: String,
        /// Direction of the entry that overflowed
        direction: String,
    },
}

/// Errors raised while writing the report artifacts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("PDF rendering error: {message}")]
    Pdf { message: String },

    #[error("CSV export error: {message}")]
    Csv { message: String },
}

/// Top-level error for a run of the tool
///
/// Every variant is fatal and maps to exit code 1.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The node could not be reached at startup
    #[error("Unable to connect to the RPC server: {0}")]
    Connection(RpcError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

// Conversion from csv::Error to ReportError
impl From<csv::Error> for ReportError {
    fn from(error: csv::Error) -> Self {
        ReportError::Csv {
            message: error.to_string(),
        }
    }
}

// Conversion from printpdf::Error to ReportError
impl From<printpdf::Error> for ReportError {
    fn from(error: printpdf::Error) -> Self {
        ReportError::Pdf {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl SettingsError {
    /// Create a Load error
    pub fn load(path: &str, message: impl ToString) -> Self {
        SettingsError::Load {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(key: &str, message: impl ToString) -> Self {
        SettingsError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

impl RpcError {
    /// Create a Transport error
    pub fn transport(method: &str, message: impl ToString) -> Self {
        RpcError::Transport {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a Decode error
    pub fn decode(method: &str, message: impl ToString) -> Self {
        RpcError::Decode {
            method: method.to_string(),
            message: message.to_string(),
        }
    }
}

impl ReportError {
    /// Create an Io error for a path
    pub fn io(path: &std::path::Path, error: std::io::Error) -> Self {
        ReportError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

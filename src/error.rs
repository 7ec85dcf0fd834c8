//! Error types for GreenForce Monitor
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

/// Main error type for the client
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// IO error (config files)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// Transport-level HTTP failure
    #[snafu(display("HTTP error calling {endpoint}: {source}"))]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Backend answered with a non-success status
    #[snafu(display("{endpoint} returned HTTP {status}"))]
    Status { endpoint: String, status: u16 },

    /// Payload did not match the expected shape
    #[snafu(display("Decode error: {message}"))]
    Decode { message: String },

    /// Channel send error
    #[snafu(display("Channel send error: {message}"))]
    ChannelSend { message: String },

    /// Push channel error
    #[snafu(display("Connection error: {message}"))]
    Connection { message: String },

    /// Timeout error
    #[snafu(display("Timeout: {message}"))]
    Timeout { message: String },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;

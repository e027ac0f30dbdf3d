//! Error types for the avatar configurator.

use thiserror::Error;

/// Umbrella error for configurator operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Color error: {0}")]
    Color(#[from] ColorError),
}

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised while talking to the content backend.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to build URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Malformed catalog records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{record} record is missing `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
}

/// A color string that is not a valid hex color.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color `{input}`: {reason}")]
pub struct ColorError {
    pub input: String,
    pub reason: String,
}

/// Result type alias for configurator operations.
pub type Result<T> = std::result::Result<T, Error>;

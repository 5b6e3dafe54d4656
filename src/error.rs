// src/error.rs
//! Gateway error type shared by the dispatch core and the PayPal proxy.

use thiserror::Error;

/// Errors raised inside the gateway. Provider clients return these freely;
/// the dispatcher is the recovery boundary that converts every one of them
/// into a terminal `failed` response, so nothing here escapes to a caller
/// of `generate_video` / `get_video_status`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No registry entry lists the requested model (or provider id).
    #[error("No provider found for: {0}")]
    NoProvider(String),

    /// A registry entry exists but no client is registered for it.
    #[error("No provider client registered for: {0}")]
    NoClient(String),

    /// The resolved model belongs to a different provider than the client
    /// asked to serve it.
    #[error("Model {model} not supported by this provider ({provider})")]
    ModelNotSupported { model: String, provider: String },

    /// The provider requires a credential and none is configured.
    #[error("API key not configured for provider: {0}")]
    ApiKeyNotConfigured(String),

    /// Vendor API returned a non-2xx response.
    #[error("{provider} API error ({status}): {message}")]
    Vendor {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Vendor reply parsed but was missing the fields we need.
    #[error("unexpected {provider} response: {message}")]
    UnexpectedResponse {
        provider: &'static str,
        message: String,
    },

    /// Caller-supplied request is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// PayPal REST API returned a non-2xx response.
    #[error("PayPal API error ({status}): {message}")]
    PayPal { status: u16, message: String },

    /// Network or HTTP transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

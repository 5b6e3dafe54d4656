// src/providers/mod.rs
//! Vendor API clients behind one trait.
//!
//! One client per vendor family. Each builds the vendor-specific wire
//! payload, issues a single HTTP call, and maps the reply into the shared
//! response shape. No retries, no caching; errors propagate freely — the
//! dispatcher owns recovery.

mod aimlapi;
mod fal;
mod gemini;
mod pixverse;

pub use aimlapi::AimlApiClient;
pub use fal::FalClient;
pub use gemini::GeminiClient;
pub use pixverse::PixverseClient;

use async_trait::async_trait;

use crate::catalog::{self, VideoModel};
use crate::error::{GatewayError, Result};
use crate::types::{VideoGenerationRequest, VideoGenerationResponse};

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Registry id this client serves.
    fn id(&self) -> &'static str;

    /// Submits one generation request to the vendor.
    async fn generate(
        &self,
        request: &VideoGenerationRequest,
        model: &VideoModel,
        api_key: &str,
    ) -> Result<VideoGenerationResponse>;

    /// Fetches the current state of a previously submitted job.
    async fn get_status(&self, id: &str, api_key: &str) -> Result<VideoGenerationResponse>;
}

/// Consistency guard: the registry is the one authoritative support table,
/// but a client still refuses a model the registry assigns to someone else
/// (a dispatcher bug, or a caller holding a stale client).
pub(crate) fn ensure_served_by(client_id: &'static str, model: &VideoModel) -> Result<()> {
    match catalog::provider_for_model(model.id) {
        Some(provider) if provider.id == client_id => Ok(()),
        _ => Err(GatewayError::ModelNotSupported {
            model: model.id.to_string(),
            provider: client_id.to_string(),
        }),
    }
}

/// Drains a non-2xx vendor reply into a `Vendor` error carrying the body
/// text, which is usually the vendor's own explanation.
pub(crate) async fn vendor_error(
    provider: &'static str,
    response: reqwest::Response,
) -> GatewayError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    GatewayError::Vendor {
        provider,
        status,
        message,
    }
}

/// Base URL for a registry provider. Empty only if the registry entry is
/// missing, which the catalog tests pin against.
pub(crate) fn registry_base_url(provider_id: &str) -> String {
    catalog::provider_by_id(provider_id)
        .map(|p| p.base_url.to_string())
        .unwrap_or_default()
}

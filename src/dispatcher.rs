// src/dispatcher.rs
//! Routes generation requests to the provider client serving the requested
//! model. This is the designated recovery boundary: `generate_video` and
//! `get_video_status` are total functions. Whatever goes wrong underneath
//! (registry miss, missing credential, vendor failure, network error), the
//! caller always receives a `VideoGenerationResponse`, with failure encoded
//! in its `status` field.

use std::time::Duration;

use crate::catalog::{self, ApiProvider};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::providers::{AimlApiClient, FalClient, GeminiClient, PixverseClient, ProviderClient};
use crate::types::{VideoGenerationRequest, VideoGenerationResponse};

/// Polling contract for in-flight jobs: one status check every interval,
/// up to the attempt ceiling (5 minutes wall clock). Hitting the ceiling
/// returns the last response as-is; it does not cancel the vendor job.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_POLL_ATTEMPTS: u32 = 60;

pub struct Dispatcher {
    config: Config,
    clients: Vec<Box<dyn ProviderClient>>,
}

impl Dispatcher {
    /// Builds the dispatcher from an immutable config. All clients share one
    /// connection pool. Credentials are fixed for the process lifetime;
    /// tests wanting different keys construct a fresh dispatcher.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let clients: Vec<Box<dyn ProviderClient>> = vec![
            Box::new(AimlApiClient::new(http.clone())),
            Box::new(FalClient::new(http.clone())),
            Box::new(PixverseClient::new(http.clone())),
            Box::new(GeminiClient::new(http)),
        ];
        Self { config, clients }
    }

    /// Submits a generation request. Never fails: errors come back as a
    /// terminal `failed` response carrying the message.
    pub async fn generate_video(&self, request: &VideoGenerationRequest) -> VideoGenerationResponse {
        match self.try_generate(request).await {
            Ok(resp) => {
                tracing::info!(
                    model = %request.model_id,
                    job_id = %resp.id,
                    status = ?resp.status,
                    "🎬 generation request accepted"
                );
                resp
            }
            Err(e) => {
                tracing::warn!(model = %request.model_id, error = %e, "generation request failed");
                VideoGenerationResponse::failed(&request.model_id, e.to_string())
            }
        }
    }

    /// Fetches the current state of a job. The caller supplies the provider
    /// explicitly — job ids are vendor-opaque and nothing persists an
    /// id-to-provider mapping. Same no-throw policy as `generate_video`.
    pub async fn get_video_status(&self, id: &str, provider_id: &str) -> VideoGenerationResponse {
        match self.try_get_status(id, provider_id).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(job_id = %id, provider = %provider_id, error = %e, "status check failed");
                VideoGenerationResponse::failed("", e.to_string())
            }
        }
    }

    /// Polls a job on the documented contract (`POLL_INTERVAL` ×
    /// `MAX_POLL_ATTEMPTS`) until it reaches a terminal status or the
    /// ceiling. Returns the last response either way.
    pub async fn poll_until_terminal(&self, id: &str, provider_id: &str) -> VideoGenerationResponse {
        let mut last = self.get_video_status(id, provider_id).await;
        let mut attempts = 1;
        while !last.status.is_terminal() && attempts < MAX_POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;
            last = self.get_video_status(id, provider_id).await;
            attempts += 1;
        }
        last
    }

    async fn try_generate(&self, request: &VideoGenerationRequest) -> Result<VideoGenerationResponse> {
        if request.prompt.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("prompt must not be empty".into()));
        }

        let provider = catalog::provider_for_model(&request.model_id)
            .ok_or_else(|| GatewayError::NoProvider(request.model_id.clone()))?;
        let model = catalog::model_by_id(&request.model_id)
            .ok_or_else(|| GatewayError::NoProvider(request.model_id.clone()))?;

        let api_key = self.require_api_key(provider)?;
        let client = self.client_for(provider.id)?;
        client.generate(request, model, api_key).await
    }

    async fn try_get_status(&self, id: &str, provider_id: &str) -> Result<VideoGenerationResponse> {
        let provider = catalog::provider_by_id(provider_id)
            .ok_or_else(|| GatewayError::NoProvider(provider_id.to_string()))?;

        let api_key = self.require_api_key(provider)?;
        let client = self.client_for(provider.id)?;
        client.get_status(id, api_key).await
    }

    /// Fail-fast credential check, ahead of any network traffic.
    fn require_api_key(&self, provider: &ApiProvider) -> Result<&str> {
        if !provider.requires_api_key {
            return Ok("");
        }
        self.config
            .api_key_for(provider.id)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GatewayError::ApiKeyNotConfigured(provider.id.to_string()))
    }

    fn client_for(&self, provider_id: &str) -> Result<&dyn ProviderClient> {
        self.clients
            .iter()
            .map(|c| c.as_ref())
            .find(|c| c.id() == provider_id)
            .ok_or_else(|| GatewayError::NoClient(provider_id.to_string()))
    }
}

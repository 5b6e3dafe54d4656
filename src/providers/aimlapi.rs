// src/providers/aimlapi.rs
//! AIMLAPI aggregator client. One endpoint fronts many upstream video models
//! (Kling, Runway, Luma, MiniMax, Hunyuan); the catalog's `endpoint_id` is
//! the aggregator-side model name.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_served_by, registry_base_url, vendor_error, ProviderClient};
use crate::catalog::VideoModel;
use crate::error::Result;
use crate::types::{
    default_progress, VideoGenerationRequest, VideoGenerationResponse, VideoStatus,
};

#[derive(Debug, Clone)]
pub struct AimlApiClient {
    http: Client,
    base_url: String,
}

impl AimlApiClient {
    const PROVIDER_ID: &'static str = "aimlapi";

    pub fn new(http: Client) -> Self {
        Self {
            base_url: registry_base_url(Self::PROVIDER_ID),
            http,
        }
    }
}

#[async_trait]
impl ProviderClient for AimlApiClient {
    fn id(&self) -> &'static str {
        Self::PROVIDER_ID
    }

    async fn generate(
        &self,
        request: &VideoGenerationRequest,
        model: &VideoModel,
        api_key: &str,
    ) -> Result<VideoGenerationResponse> {
        ensure_served_by(Self::PROVIDER_ID, model)?;

        let url = format!("{}/v2/generate/video/generation", self.base_url);
        let body = AimlGenerateRequest::from_request(request, model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let raw: AimlGenerationResponse = response.json().await?;
        Ok(map_response(raw, model.id))
    }

    async fn get_status(&self, id: &str, api_key: &str) -> Result<VideoGenerationResponse> {
        let url = format!("{}/v2/generate/video/generation", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("generation_id", id)])
            .bearer_auth(api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let raw: AimlGenerationResponse = response.json().await?;
        Ok(map_response(raw, ""))
    }
}

// ── wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AimlGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a str>,
    /// AIMLAPI calls the aspect ratio "ratio".
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    motion_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

impl<'a> AimlGenerateRequest<'a> {
    fn from_request(request: &'a VideoGenerationRequest, model: &'a VideoModel) -> Self {
        Self {
            model: model.endpoint_id,
            prompt: &request.prompt,
            image_url: request.image_url.as_deref(),
            duration: request.duration,
            resolution: request.resolution.as_deref(),
            ratio: request.aspect_ratio.as_deref(),
            motion_strength: request.motion_strength,
            seed: request.seed,
            negative_prompt: request.negative_prompt.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AimlGenerationResponse {
    #[serde(alias = "generation_id")]
    id: String,
    status: String,
    #[serde(default)]
    video: Option<AimlVideoAsset>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    progress: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct AimlVideoAsset {
    url: String,
}

fn map_response(raw: AimlGenerationResponse, fallback_model: &str) -> VideoGenerationResponse {
    let status = VideoStatus::normalize(&raw.status);
    VideoGenerationResponse {
        id: raw.id,
        status,
        video_url: raw.video.map(|v| v.url),
        thumbnail_url: raw.thumbnail_url,
        duration: raw.duration,
        created_at: Utc::now(),
        model: raw.model.unwrap_or_else(|| fallback_model.to_string()),
        error: raw.error,
        progress: Some(raw.progress.unwrap_or_else(|| default_progress(status))),
    }
}

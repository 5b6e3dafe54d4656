// src/providers/fal.rs
//! fal.ai queue client. Submissions go to the model's own queue path; the
//! returned request id is polled on a shared status endpoint.

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
pub struct FalClient {
    http: Client,
    base_url: String,
}

impl FalClient {
    const PROVIDER_ID: &'static str = "fal";

    pub fn new(http: Client) -> Self {
        Self {
            base_url: registry_base_url(Self::PROVIDER_ID),
            http,
        }
    }

    fn auth_header(api_key: &str) -> String {
        format!("Key {}", api_key)
    }
}

#[async_trait]
impl ProviderClient for FalClient {
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

        let url = format!("{}/{}", self.base_url, model.endpoint_id);
        let body = FalGenerateRequest::from_request(request);

        let response = self
            .http
            .post(&url)
            .header("Authorization", Self::auth_header(api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let raw: FalQueueResponse = response.json().await?;
        // fal answers "IN_QUEUE", which is outside the fixed table and so
        // falls through to Pending.
        let status = VideoStatus::normalize(raw.status.as_deref().unwrap_or("IN_QUEUE"));
        Ok(VideoGenerationResponse::accepted(raw.request_id, status, model.id))
    }

    async fn get_status(&self, id: &str, api_key: &str) -> Result<VideoGenerationResponse> {
        let url = format!("{}/requests/{}/status", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", Self::auth_header(api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let raw: FalStatusResponse = response.json().await?;
        Ok(map_status(id, raw))
    }
}

// ── wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct FalGenerateRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

impl<'a> FalGenerateRequest<'a> {
    fn from_request(request: &'a VideoGenerationRequest) -> Self {
        Self {
            prompt: &request.prompt,
            image_url: request.image_url.as_deref(),
            duration: request.duration,
            resolution: request.resolution.as_deref(),
            aspect_ratio: request.aspect_ratio.as_deref(),
            seed: request.seed,
            negative_prompt: request.negative_prompt.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FalQueueResponse {
    request_id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FalStatusResponse {
    status: String,
    #[serde(default)]
    video: Option<FalVideoAsset>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FalVideoAsset {
    url: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
}

fn map_status(id: &str, raw: FalStatusResponse) -> VideoGenerationResponse {
    let status = VideoStatus::normalize(&raw.status);
    let (video_url, thumbnail_url, duration) = match raw.video {
        Some(v) => (Some(v.url), v.thumbnail_url, v.duration),
        None => (None, None, None),
    };
    VideoGenerationResponse {
        id: id.to_string(),
        status,
        video_url,
        thumbnail_url,
        duration,
        created_at: Utc::now(),
        model: String::new(),
        error: raw.error,
        progress: Some(default_progress(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_payload_has_no_model_field() {
        // The model is addressed by URL path on fal; the body carries only
        // generation parameters.
        let request = VideoGenerationRequest::new("wan-2.2", "a fox in snow")
            .with_resolution("720p")
            .with_negative_prompt("text, watermark");
        let json = serde_json::to_value(FalGenerateRequest::from_request(&request)).unwrap();

        assert_eq!(json["prompt"], "a fox in snow");
        assert_eq!(json["resolution"], "720p");
        assert_eq!(json["negative_prompt"], "text, watermark");
        assert!(json.get("model").is_none());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn in_queue_maps_to_pending() {
        let raw = FalStatusResponse {
            status: "IN_QUEUE".into(),
            video: None,
            error: None,
        };
        let resp = map_status("req-1", raw);
        assert_eq!(resp.status, VideoStatus::Pending);
        assert_eq!(resp.progress, Some(50));
    }

    #[test]
    fn in_progress_maps_to_processing() {
        let raw: FalStatusResponse =
            serde_json::from_str(r#"{"status": "IN_PROGRESS"}"#).unwrap();
        assert_eq!(map_status("req-1", raw).status, VideoStatus::Processing);
    }

    #[test]
    fn completed_carries_video_asset() {
        let raw: FalStatusResponse = serde_json::from_str(
            r#"{"status": "COMPLETED",
                "video": {"url": "https://fal.media/out.mp4",
                          "thumbnail_url": "https://fal.media/out.jpg",
                          "duration": 5}}"#,
        )
        .unwrap();
        let resp = map_status("req-9", raw);
        assert_eq!(resp.id, "req-9");
        assert_eq!(resp.status, VideoStatus::Completed);
        assert_eq!(resp.video_url.as_deref(), Some("https://fal.media/out.mp4"));
        assert_eq!(resp.progress, Some(100));
    }
}

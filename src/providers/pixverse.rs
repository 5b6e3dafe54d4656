// src/providers/pixverse.rs
//! PixVerse direct REST client. Every reply is wrapped in an
//! `ErrCode`/`ErrMsg`/`Resp` envelope; `ErrCode != 0` is a business error
//! even on HTTP 200.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_served_by, registry_base_url, vendor_error, ProviderClient};
use crate::catalog::VideoModel;
use crate::error::{GatewayError, Result};
use crate::types::{
    default_progress, VideoGenerationRequest, VideoGenerationResponse, VideoStatus,
};

#[derive(Debug, Clone)]
pub struct PixverseClient {
    http: Client,
    base_url: String,
}

impl PixverseClient {
    const PROVIDER_ID: &'static str = "pixverse";

    pub fn new(http: Client) -> Self {
        Self {
            base_url: registry_base_url(Self::PROVIDER_ID),
            http,
        }
    }
}

#[async_trait]
impl ProviderClient for PixverseClient {
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

        // Separate endpoints for text-to-video and image-to-video.
        let path = if request.image_url.is_some() {
            "/openapi/v2/video/img/generate"
        } else {
            "/openapi/v2/video/text/generate"
        };
        let url = format!("{}{}", self.base_url, path);
        let body = PixverseGenerateRequest::from_request(request, model);

        let response = self
            .http
            .post(&url)
            .header("API-KEY", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let envelope: PixverseEnvelope<PixverseCreateResp> = response.json().await?;
        let resp = envelope.into_resp()?;
        Ok(VideoGenerationResponse::accepted(
            resp.video_id.to_string(),
            VideoStatus::Pending,
            model.id,
        ))
    }

    async fn get_status(&self, id: &str, api_key: &str) -> Result<VideoGenerationResponse> {
        let url = format!("{}/openapi/v2/video/result/{}", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .header("API-KEY", api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let envelope: PixverseEnvelope<PixverseResultResp> = response.json().await?;
        Ok(map_result(id, envelope.into_resp()?))
    }
}

// ── wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PixverseGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    img_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    /// PixVerse names the resolution "quality".
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    motion_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

impl<'a> PixverseGenerateRequest<'a> {
    fn from_request(request: &'a VideoGenerationRequest, model: &'a VideoModel) -> Self {
        Self {
            model: model.endpoint_id,
            prompt: &request.prompt,
            img_url: request.image_url.as_deref(),
            duration: request.duration,
            quality: request.resolution.as_deref(),
            aspect_ratio: request.aspect_ratio.as_deref(),
            motion_strength: request.motion_strength,
            seed: request.seed,
            negative_prompt: request.negative_prompt.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct PixverseEnvelope<T> {
    #[serde(rename = "ErrCode")]
    err_code: i64,
    #[serde(rename = "ErrMsg", default)]
    err_msg: String,
    #[serde(rename = "Resp", default)]
    resp: Option<T>,
}

impl<T> PixverseEnvelope<T> {
    fn into_resp(self) -> Result<T> {
        if self.err_code != 0 {
            return Err(GatewayError::Vendor {
                provider: PixverseClient::PROVIDER_ID,
                status: 200,
                message: format!("ErrCode {}: {}", self.err_code, self.err_msg),
            });
        }
        self.resp.ok_or_else(|| GatewayError::UnexpectedResponse {
            provider: PixverseClient::PROVIDER_ID,
            message: "envelope missing Resp".into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PixverseCreateResp {
    video_id: u64,
}

#[derive(Debug, Deserialize)]
struct PixverseResultResp {
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    first_frame: Option<String>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    progress: Option<u8>,
}

fn map_result(id: &str, resp: PixverseResultResp) -> VideoGenerationResponse {
    let status = VideoStatus::normalize(&resp.status);
    VideoGenerationResponse {
        id: id.to_string(),
        status,
        video_url: resp.url,
        thumbnail_url: resp.first_frame,
        duration: resp.duration,
        created_at: Utc::now(),
        model: String::new(),
        error: resp.err,
        progress: Some(resp.progress.unwrap_or_else(|| default_progress(status))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn payload_names_follow_pixverse_conventions() {
        let request = VideoGenerationRequest::new("pixverse-v4.5", "dancing robot")
            .with_image_url("https://cdn.example.com/robot.png")
            .with_resolution("1080p");
        let model = catalog::model_by_id("pixverse-v4.5").unwrap();
        let json =
            serde_json::to_value(PixverseGenerateRequest::from_request(&request, model)).unwrap();

        assert_eq!(json["model"], "v4.5");
        assert_eq!(json["img_url"], "https://cdn.example.com/robot.png");
        assert_eq!(json["quality"], "1080p");
        assert!(json.get("resolution").is_none());
    }

    #[test]
    fn envelope_error_code_becomes_vendor_error() {
        let envelope: PixverseEnvelope<PixverseCreateResp> = serde_json::from_str(
            r#"{"ErrCode": 400012, "ErrMsg": "insufficient credits"}"#,
        )
        .unwrap();
        let err = envelope.into_resp().unwrap_err();
        assert!(err.to_string().contains("insufficient credits"));
    }

    #[test]
    fn envelope_ok_unwraps_resp() {
        let envelope: PixverseEnvelope<PixverseCreateResp> = serde_json::from_str(
            r#"{"ErrCode": 0, "ErrMsg": "success", "Resp": {"video_id": 990011}}"#,
        )
        .unwrap();
        assert_eq!(envelope.into_resp().unwrap().video_id, 990011);
    }

    #[test]
    fn succeeded_result_maps_to_completed() {
        let resp: PixverseResultResp = serde_json::from_str(
            r#"{"status": "succeeded", "url": "https://media.pixverse.ai/v.mp4",
                "first_frame": "https://media.pixverse.ai/v.jpg", "duration": 8}"#,
        )
        .unwrap();
        let mapped = map_result("990011", resp);
        assert_eq!(mapped.status, VideoStatus::Completed);
        assert_eq!(mapped.video_url.as_deref(), Some("https://media.pixverse.ai/v.mp4"));
        assert_eq!(mapped.thumbnail_url.as_deref(), Some("https://media.pixverse.ai/v.jpg"));
        assert_eq!(mapped.progress, Some(100));
    }

    #[test]
    fn generating_result_stays_pending() {
        // "generating" is PixVerse-specific vocabulary, outside the fixed
        // table, so it maps to the conservative default.
        let resp: PixverseResultResp =
            serde_json::from_str(r#"{"status": "generating", "progress": 35}"#).unwrap();
        let mapped = map_result("1", resp);
        assert_eq!(mapped.status, VideoStatus::Pending);
        assert_eq!(mapped.progress, Some(35));
    }
}

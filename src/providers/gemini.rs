// src/providers/gemini.rs
//! Google Gemini API client for the Veo models. Generation is a long-running
//! operation: submit returns an operation name, which doubles as the job id
//! the status poll dereferences. Reference images travel as inline multimodal
//! data, not URLs.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_served_by, registry_base_url, vendor_error, ProviderClient};
use crate::catalog::{self, VideoModel};
use crate::error::{GatewayError, Result};
use crate::types::{
    default_progress, VideoGenerationRequest, VideoGenerationResponse, VideoStatus,
};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
}

impl GeminiClient {
    const PROVIDER_ID: &'static str = "google";

    pub fn new(http: Client) -> Self {
        Self {
            base_url: registry_base_url(Self::PROVIDER_ID),
            http,
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
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

        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, model.endpoint_id
        );
        let body = GeminiGenerateRequest::from_request(request)?;

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let operation: GeminiOperation = response.json().await?;
        Ok(VideoGenerationResponse::accepted(
            operation.name,
            VideoStatus::Pending,
            model.id,
        ))
    }

    async fn get_status(&self, id: &str, api_key: &str) -> Result<VideoGenerationResponse> {
        // The id is the operation name ("models/<m>/operations/<op>").
        let url = format!("{}/v1beta/{}", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(vendor_error(Self::PROVIDER_ID, response).await);
        }

        let operation: GeminiOperation = response.json().await?;
        Ok(map_operation(operation))
    }
}

// ── wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateRequest {
    instances: Vec<GeminiInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<GeminiParameters>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<GeminiInlineImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineImage {
    inline_data: GeminiInlineData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
}

impl GeminiGenerateRequest {
    fn from_request(request: &VideoGenerationRequest) -> Result<Self> {
        let image = match request.image_url.as_deref() {
            Some(uri) => Some(inline_image_from_data_uri(uri)?),
            None => None,
        };

        let parameters = if request.aspect_ratio.is_some()
            || request.resolution.is_some()
            || request.duration.is_some()
            || request.negative_prompt.is_some()
        {
            Some(GeminiParameters {
                aspect_ratio: request.aspect_ratio.clone(),
                resolution: request.resolution.clone(),
                duration_seconds: request.duration,
                negative_prompt: request.negative_prompt.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            instances: vec![GeminiInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters,
        })
    }
}

/// The Gemini API takes reference images as inline base64, so the caller
/// must send a data URI; remote URLs cannot be forwarded as-is.
fn inline_image_from_data_uri(uri: &str) -> Result<GeminiInlineImage> {
    let parsed = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"));
    match parsed {
        Some((mime, data)) if !data.is_empty() => Ok(GeminiInlineImage {
            inline_data: GeminiInlineData {
                mime_type: mime.to_string(),
                data: data.to_string(),
            },
        }),
        _ => Err(GatewayError::InvalidRequest(
            "Gemini models take reference images as base64 data URIs, not remote URLs".into(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct GeminiOperation {
    name: String,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<GeminiOperationError>,
    #[serde(default)]
    response: Option<GeminiOperationResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiOperationError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiOperationResponse {
    #[serde(default)]
    generate_video_response: Option<GeminiVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiVideoResponse {
    #[serde(default)]
    generated_samples: Option<Vec<GeminiSample>>,
}

#[derive(Debug, Deserialize)]
struct GeminiSample {
    #[serde(default)]
    video: Option<GeminiVideo>,
}

#[derive(Debug, Deserialize)]
struct GeminiVideo {
    #[serde(default)]
    uri: Option<String>,
}

/// Recovers the catalog id from an operation name like
/// `models/veo-3.0-generate-preview/operations/abc123`. Best-effort; a poll
/// response with an unrecognized name just leaves the model blank.
fn model_from_operation(name: &str) -> String {
    name.strip_prefix("models/")
        .and_then(|rest| rest.split('/').next())
        .and_then(|endpoint| catalog::models().iter().find(|m| m.endpoint_id == endpoint))
        .map(|m| m.id.to_string())
        .unwrap_or_default()
}

fn map_operation(operation: GeminiOperation) -> VideoGenerationResponse {
    let model = model_from_operation(&operation.name);

    if let Some(err) = operation.error {
        let mut resp = VideoGenerationResponse::failed(
            model,
            err.message.unwrap_or_else(|| "unknown Veo error".into()),
        );
        resp.id = operation.name;
        resp.progress = Some(default_progress(VideoStatus::Failed));
        return resp;
    }

    let video_uri = operation.response.and_then(|r| {
        r.generate_video_response
            .and_then(|g| g.generated_samples)
            .and_then(|samples| samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri)
    });

    // Operations carry no status string; done + a sample means completed,
    // anything still running reports as processing.
    let status = if operation.done.unwrap_or(false) && video_uri.is_some() {
        VideoStatus::Completed
    } else {
        VideoStatus::Processing
    };

    VideoGenerationResponse {
        id: operation.name,
        status,
        video_url: video_uri,
        thumbnail_url: None,
        duration: None,
        created_at: Utc::now(),
        model,
        error: None,
        progress: Some(default_progress(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format_is_camel_case() {
        let request = VideoGenerationRequest::new("veo-3", "a whale breaching")
            .with_aspect_ratio("16:9")
            .with_duration(8);
        let json =
            serde_json::to_value(GeminiGenerateRequest::from_request(&request).unwrap()).unwrap();

        assert_eq!(json["instances"][0]["prompt"], "a whale breaching");
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        assert_eq!(json["parameters"]["durationSeconds"], 8);
        assert!(json["instances"][0].get("image").is_none());
    }

    #[test]
    fn bare_prompt_omits_parameters() {
        let request = VideoGenerationRequest::new("veo-2", "rain on a window");
        let json =
            serde_json::to_value(GeminiGenerateRequest::from_request(&request).unwrap()).unwrap();
        assert!(json.get("parameters").is_none());
    }

    #[test]
    fn data_uri_becomes_inline_data() {
        let request = VideoGenerationRequest::new("veo-3", "animate this")
            .with_image_url("data:image/png;base64,iVBORw0KGgo=");
        let json =
            serde_json::to_value(GeminiGenerateRequest::from_request(&request).unwrap()).unwrap();

        let image = &json["instances"][0]["image"]["inlineData"];
        assert_eq!(image["mimeType"], "image/png");
        assert_eq!(image["data"], "iVBORw0KGgo=");
    }

    #[test]
    fn remote_url_is_rejected() {
        let request = VideoGenerationRequest::new("veo-3", "animate this")
            .with_image_url("https://cdn.example.com/ref.png");
        let err = GeminiGenerateRequest::from_request(&request).unwrap_err();
        assert!(err.to_string().contains("data URI"));
    }

    #[test]
    fn model_recovered_from_operation_name() {
        assert_eq!(
            model_from_operation("models/veo-3.0-generate-preview/operations/op-1"),
            "veo-3"
        );
        assert_eq!(model_from_operation("models/unknown/operations/op-1"), "");
        assert_eq!(model_from_operation("garbage"), "");
    }

    #[test]
    fn running_operation_maps_to_processing() {
        let op: GeminiOperation = serde_json::from_str(
            r#"{"name": "models/veo-2.0-generate-001/operations/op-7", "done": false}"#,
        )
        .unwrap();
        let resp = map_operation(op);
        assert_eq!(resp.status, VideoStatus::Processing);
        assert_eq!(resp.model, "veo-2");
        assert_eq!(resp.progress, Some(50));
    }

    #[test]
    fn finished_operation_maps_to_completed_with_uri() {
        let op: GeminiOperation = serde_json::from_str(
            r#"{
                "name": "models/veo-3.0-generate-preview/operations/op-9",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{"video": {"uri": "https://videos.example/v.mp4"}}]
                    }
                }
            }"#,
        )
        .unwrap();
        let resp = map_operation(op);
        assert_eq!(resp.status, VideoStatus::Completed);
        assert_eq!(resp.video_url.as_deref(), Some("https://videos.example/v.mp4"));
        assert_eq!(resp.progress, Some(100));
    }

    #[test]
    fn operation_error_maps_to_failed() {
        let op: GeminiOperation = serde_json::from_str(
            r#"{"name": "models/veo-3.0-generate-preview/operations/op-3",
                "done": true, "error": {"message": "quota exceeded"}}"#,
        )
        .unwrap();
        let resp = map_operation(op);
        assert_eq!(resp.status, VideoStatus::Failed);
        assert_eq!(resp.error.as_deref(), Some("quota exceeded"));
        assert_eq!(resp.id, "models/veo-3.0-generate-preview/operations/op-3");
    }
}

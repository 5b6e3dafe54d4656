// src/types.rs
//! Shared request/response contracts for the video generation flow.
//!
//! Every provider client maps its vendor's wire shapes into these types, so
//! the UI layer sees one vocabulary regardless of which vendor served the
//! request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a generation job as reported to the UI.
///
/// `Completed` and `Failed` are terminal; polling stops once either is
/// reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    /// Maps a vendor's raw status string onto the shared vocabulary.
    ///
    /// Case-insensitive and total. Unrecognized strings map to `Pending`:
    /// an unknown state means "not yet done", so the UI keeps polling
    /// instead of giving up on a vendor-specific intermediate state.
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "queued" => Self::Pending,
            "processing" | "in_progress" => Self::Processing,
            "completed" | "succeeded" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A caller-supplied generation request. Lives only for the duration of one
/// dispatch; nothing persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationRequest {
    /// Catalog id of the model to generate with.
    pub model_id: String,
    /// Text prompt. Must be non-empty.
    pub prompt: String,
    /// Reference image: an https URL or a data URI with inline base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Clip length override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// 0.0..=1.0, how strongly motion follows the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

impl VideoGenerationRequest {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            image_url: None,
            duration: None,
            resolution: None,
            aspect_ratio: None,
            motion_strength: None,
            seed: None,
            negative_prompt: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration = Some(secs);
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    pub fn with_negative_prompt(mut self, text: impl Into<String>) -> Self {
        self.negative_prompt = Some(text.into());
        self
    }
}

/// The response returned to the caller on generation and re-produced by every
/// status poll. Each poll yields a fresh value; nothing is mutated in place
/// and no durable store backs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationResponse {
    /// Vendor-assigned job id, or a locally generated UUID when the failure
    /// happened before any vendor was reached.
    pub id: String,
    pub status: VideoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Clip length in seconds, when the vendor reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub created_at: DateTime<Utc>,
    /// Catalog id of the model used. Best-effort on status polls, where some
    /// vendors do not echo it.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 0-100. Vendor-reported when available, otherwise approximated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl VideoGenerationResponse {
    /// A fresh in-flight response for a newly accepted vendor job.
    pub fn accepted(id: impl Into<String>, status: VideoStatus, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            video_url: None,
            thumbnail_url: None,
            duration: None,
            created_at: Utc::now(),
            model: model.into(),
            error: None,
            progress: Some(default_progress(status)),
        }
    }

    /// The terminal failure shape the dispatcher hands out for any error in
    /// the dispatch path. The id is a locally generated UUID since no vendor
    /// job exists.
    pub fn failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: VideoStatus::Failed,
            video_url: None,
            thumbnail_url: None,
            duration: None,
            created_at: Utc::now(),
            model: model.into(),
            error: Some(message.into()),
            progress: None,
        }
    }
}

/// Progress approximation used when a vendor reports no percentage: a
/// completed job is 100, anything else counts as halfway. An estimate shown
/// to the UI, not a measurement.
pub fn default_progress(status: VideoStatus) -> u8 {
    if status == VideoStatus::Completed {
        100
    } else {
        50
    }
}

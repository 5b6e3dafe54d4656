// src/handlers/video.rs
//! Video generation endpoints - submit, poll, catalog listing.
//!
//! Validation failures are HTTP 400; everything past validation comes back
//! as HTTP 200 with the outcome in the body's `status` field, because the
//! dispatcher never throws. The 500 path exists only as a guard.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::catalog;
use crate::types::VideoGenerationRequest;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub model_id: Option<String>,
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<u32>,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
    pub motion_strength: Option<f32>,
    pub seed: Option<i64>,
    pub negative_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub id: Option<String>,
    pub provider: Option<String>,
}

/// POST /api/video/generate - submit a generation request
pub async fn generate_video(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> impl IntoResponse {
    let (model_id, prompt) = match (body.model_id, body.prompt) {
        (Some(m), Some(p)) if !m.is_empty() && !p.is_empty() => (m, p),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required fields: modelId and prompt"})),
            )
                .into_response();
        }
    };

    let request = VideoGenerationRequest {
        model_id,
        prompt,
        image_url: body.image_url,
        duration: body.duration,
        resolution: body.resolution,
        aspect_ratio: body.aspect_ratio,
        motion_strength: body.motion_strength,
        seed: body.seed,
        negative_prompt: body.negative_prompt,
    };

    let response = state.dispatcher.generate_video(&request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/video/generate?id=&provider= - poll a job
pub async fn get_video_status(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<StatusParams>,
) -> impl IntoResponse {
    let (id, provider) = match (params.id, params.provider) {
        (Some(id), Some(provider)) => (id, provider),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required query parameters: id and provider"})),
            )
                .into_response();
        }
    };

    let response = state.dispatcher.get_video_status(&id, &provider).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/video/models - the model catalog for the UI
pub async fn list_models() -> impl IntoResponse {
    Json(json!({ "models": catalog::models() }))
}

pub fn video_routes() -> Router {
    Router::new()
        .route(
            "/api/video/generate",
            post(generate_video).get(get_video_status),
        )
        .route("/api/video/models", get(list_models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dispatcher::Dispatcher;

    fn test_state() -> Arc<AppState> {
        let config = Config::default();
        Arc::new(AppState {
            dispatcher: Dispatcher::new(config.clone()),
            paypal: None,
            config,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_body_is_rejected_with_400() {
        let response = generate_video(Extension(test_state()), Json(GenerateBody::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required fields: modelId and prompt");
    }

    #[tokio::test]
    async fn missing_prompt_is_rejected_with_400() {
        let body = GenerateBody {
            model_id: Some("kling-2.1".into()),
            ..Default::default()
        };
        let response = generate_video(Extension(test_state()), Json(body))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn domain_failure_is_200_with_failed_body() {
        // No credentials configured: the dispatcher fails, but the route
        // still answers 200 with the failure in the body.
        let body = GenerateBody {
            model_id: Some("kling-2.1".into()),
            prompt: Some("a cat".into()),
            ..Default::default()
        };
        let response = generate_video(Extension(test_state()), Json(body))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "failed");
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("API key not configured"));
    }

    #[tokio::test]
    async fn status_poll_requires_both_query_params() {
        let params = StatusParams {
            id: Some("abc".into()),
            provider: None,
        };
        let response = get_video_status(Extension(test_state()), Query(params))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn model_listing_returns_catalog() {
        let response = list_models().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let models = json["models"].as_array().unwrap();
        assert_eq!(models.len(), catalog::models().len());
        assert!(models.iter().any(|m| m["id"] == "kling-2.1"));
    }
}

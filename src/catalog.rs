// src/catalog.rs
//! Static model catalog and provider registry.
//!
//! This is the single authoritative capability table: the dispatcher resolves
//! a model to its provider here, and the provider clients resolve the
//! vendor-side endpoint id here. Loaded once, never mutated.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

/// UI pricing tier. Used for catalog filtering only; dispatch ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Standard,
    Pro,
    Master,
}

/// One named video-generation capability (vendor + variant).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoModel {
    /// Stable catalog id callers use in requests.
    pub id: &'static str,
    pub name: &'static str,
    pub vendor: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    /// Longest clip the model produces, in seconds. Always positive.
    pub max_duration_secs: u32,
    /// Supported output resolutions, preferred first. Never empty.
    pub resolutions: &'static [&'static str],
    /// Display price, free text for the UI.
    pub price: &'static str,
    pub category: ModelCategory,
    /// Identifier the provider expects on the wire. Catalog ids stay stable
    /// even when a vendor renames its endpoint model.
    #[serde(skip)]
    pub endpoint_id: &'static str,
}

/// One third-party vendor API the gateway can dispatch to.
#[derive(Debug, Clone)]
pub struct ApiProvider {
    pub id: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    /// Catalog ids this provider serves.
    pub supported_models: &'static [&'static str],
    pub requires_api_key: bool,
}

pub static MODELS: &[VideoModel] = &[
    // ---- served through the AIMLAPI aggregator ----
    VideoModel {
        id: "kling-2.1",
        name: "Kling 2.1",
        vendor: "Kuaishou",
        description: "Fast text- and image-to-video with strong prompt adherence.",
        capabilities: &["text-to-video", "image-to-video"],
        max_duration_secs: 10,
        resolutions: &["720p", "1080p"],
        price: "20 credits / 5s",
        category: ModelCategory::Standard,
        endpoint_id: "klingai/v2-1-standard",
    },
    VideoModel {
        id: "kling-2.1-master",
        name: "Kling 2.1 Master",
        vendor: "Kuaishou",
        description: "Highest-fidelity Kling tier with cinematic motion.",
        capabilities: &["text-to-video", "image-to-video", "camera-control"],
        max_duration_secs: 10,
        resolutions: &["1080p"],
        price: "100 credits / 5s",
        category: ModelCategory::Master,
        endpoint_id: "klingai/v2-1-master",
    },
    VideoModel {
        id: "runway-gen4",
        name: "Runway Gen-4 Turbo",
        vendor: "Runway",
        description: "General-purpose generation tuned for consistent characters.",
        capabilities: &["text-to-video", "image-to-video"],
        max_duration_secs: 10,
        resolutions: &["720p"],
        price: "50 credits / 5s",
        category: ModelCategory::Pro,
        endpoint_id: "runway/gen4-turbo",
    },
    VideoModel {
        id: "luma-ray-2",
        name: "Luma Ray 2",
        vendor: "Luma AI",
        description: "Natural physics and coherent motion from short prompts.",
        capabilities: &["text-to-video", "image-to-video", "loop"],
        max_duration_secs: 9,
        resolutions: &["720p", "1080p"],
        price: "45 credits / 5s",
        category: ModelCategory::Pro,
        endpoint_id: "luma-ai/ray-2",
    },
    VideoModel {
        id: "minimax-hailuo-02",
        name: "MiniMax Hailuo 02",
        vendor: "MiniMax",
        description: "Expressive character animation, strong on faces.",
        capabilities: &["text-to-video", "image-to-video"],
        max_duration_secs: 6,
        resolutions: &["768p", "1080p"],
        price: "40 credits / 6s",
        category: ModelCategory::Pro,
        endpoint_id: "minimax/hailuo-02",
    },
    VideoModel {
        id: "hunyuan-video",
        name: "Hunyuan Video",
        vendor: "Tencent",
        description: "Open-weights model with wide stylistic range.",
        capabilities: &["text-to-video"],
        max_duration_secs: 5,
        resolutions: &["720p"],
        price: "15 credits / 5s",
        category: ModelCategory::Standard,
        endpoint_id: "tencent/hunyuan-video",
    },
    // ---- served through the fal.ai queue ----
    VideoModel {
        id: "wan-2.2",
        name: "Wan 2.2",
        vendor: "Alibaba",
        description: "Budget text-to-video with solid temporal stability.",
        capabilities: &["text-to-video", "image-to-video"],
        max_duration_secs: 5,
        resolutions: &["480p", "720p"],
        price: "10 credits / 5s",
        category: ModelCategory::Standard,
        endpoint_id: "fal-ai/wan/v2.2-a14b/text-to-video",
    },
    VideoModel {
        id: "seedance-1.0",
        name: "Seedance 1.0",
        vendor: "ByteDance",
        description: "Multi-shot clips with dynamic camera movement.",
        capabilities: &["text-to-video", "image-to-video", "multi-shot"],
        max_duration_secs: 10,
        resolutions: &["720p", "1080p"],
        price: "35 credits / 5s",
        category: ModelCategory::Pro,
        endpoint_id: "fal-ai/bytedance/seedance/v1/pro/text-to-video",
    },
    VideoModel {
        id: "ltx-video",
        name: "LTX Video 13B",
        vendor: "Lightricks",
        description: "Near-realtime drafts for quick iteration.",
        capabilities: &["text-to-video"],
        max_duration_secs: 5,
        resolutions: &["512p", "768p"],
        price: "5 credits / 5s",
        category: ModelCategory::Standard,
        endpoint_id: "fal-ai/ltx-video-13b-distilled",
    },
    // ---- PixVerse direct REST API ----
    VideoModel {
        id: "pixverse-v4",
        name: "PixVerse V4",
        vendor: "PixVerse",
        description: "Anime and stylized output, effect templates.",
        capabilities: &["text-to-video", "image-to-video", "effects"],
        max_duration_secs: 8,
        resolutions: &["540p", "720p", "1080p"],
        price: "20 credits / 5s",
        category: ModelCategory::Standard,
        endpoint_id: "v4",
    },
    VideoModel {
        id: "pixverse-v4.5",
        name: "PixVerse V4.5",
        vendor: "PixVerse",
        description: "Sharper motion and 20+ camera moves over V4.",
        capabilities: &["text-to-video", "image-to-video", "camera-control"],
        max_duration_secs: 8,
        resolutions: &["540p", "720p", "1080p"],
        price: "30 credits / 5s",
        category: ModelCategory::Pro,
        endpoint_id: "v4.5",
    },
    // ---- Google Gemini API (long-running operations) ----
    VideoModel {
        id: "veo-2",
        name: "Veo 2",
        vendor: "Google",
        description: "High realism with accurate physics simulation.",
        capabilities: &["text-to-video", "image-to-video"],
        max_duration_secs: 8,
        resolutions: &["720p"],
        price: "60 credits / 5s",
        category: ModelCategory::Pro,
        endpoint_id: "veo-2.0-generate-001",
    },
    VideoModel {
        id: "veo-3",
        name: "Veo 3",
        vendor: "Google",
        description: "Flagship generation with native synchronized audio.",
        capabilities: &["text-to-video", "image-to-video", "audio"],
        max_duration_secs: 8,
        resolutions: &["720p", "1080p"],
        price: "150 credits / 8s",
        category: ModelCategory::Master,
        endpoint_id: "veo-3.0-generate-preview",
    },
];

/// Fixed iteration order; `provider_for_model` takes the first match, which
/// is what breaks the tie if a model id ever appears in two lists.
pub static PROVIDERS: &[ApiProvider] = &[
    ApiProvider {
        id: "aimlapi",
        name: "AIMLAPI",
        base_url: "https://api.aimlapi.com",
        supported_models: &[
            "kling-2.1",
            "kling-2.1-master",
            "runway-gen4",
            "luma-ray-2",
            "minimax-hailuo-02",
            "hunyuan-video",
        ],
        requires_api_key: true,
    },
    ApiProvider {
        id: "fal",
        name: "fal.ai",
        base_url: "https://queue.fal.run",
        supported_models: &["wan-2.2", "seedance-1.0", "ltx-video"],
        requires_api_key: true,
    },
    ApiProvider {
        id: "pixverse",
        name: "PixVerse",
        base_url: "https://app-api.pixverse.ai",
        supported_models: &["pixverse-v4", "pixverse-v4.5"],
        requires_api_key: true,
    },
    ApiProvider {
        id: "google",
        name: "Google Gemini API",
        base_url: "https://generativelanguage.googleapis.com",
        supported_models: &["veo-2", "veo-3"],
        requires_api_key: true,
    },
];

lazy_static! {
    static ref MODEL_INDEX: HashMap<&'static str, &'static VideoModel> =
        MODELS.iter().map(|m| (m.id, m)).collect();
}

pub fn models() -> &'static [VideoModel] {
    MODELS
}

pub fn model_by_id(id: &str) -> Option<&'static VideoModel> {
    MODEL_INDEX.get(id).copied()
}

pub fn models_by_category(category: ModelCategory) -> Vec<&'static VideoModel> {
    MODELS.iter().filter(|m| m.category == category).collect()
}

pub fn provider_by_id(id: &str) -> Option<&'static ApiProvider> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// First provider whose `supported_models` lists the id, in registry order.
/// `None` means no provider serves the model and dispatch must fail with a
/// "no provider" error.
pub fn provider_for_model(model_id: &str) -> Option<&'static ApiProvider> {
    PROVIDERS
        .iter()
        .find(|p| p.supported_models.contains(&model_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_model_resolves_to_exactly_one_provider() {
        for model in MODELS {
            let count = PROVIDERS
                .iter()
                .filter(|p| p.supported_models.contains(&model.id))
                .count();
            assert_eq!(count, 1, "model {} listed by {} providers", model.id, count);
        }
    }

    #[test]
    fn every_supported_model_exists_in_catalog() {
        for provider in PROVIDERS {
            for id in provider.supported_models {
                assert!(
                    model_by_id(id).is_some(),
                    "provider {} lists unknown model {}",
                    provider.id,
                    id
                );
            }
        }
    }

    #[test]
    fn model_ids_are_unique() {
        let ids: HashSet<_> = MODELS.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), MODELS.len());
    }

    #[test]
    fn model_constraints_hold() {
        for model in MODELS {
            assert!(model.max_duration_secs > 0, "{}", model.id);
            assert!(!model.resolutions.is_empty(), "{}", model.id);
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(provider_for_model("kling-2.1").unwrap().id, "aimlapi");
        assert_eq!(provider_for_model("veo-3").unwrap().id, "google");
        assert!(provider_for_model("unknown-model-xyz").is_none());
        assert!(model_by_id("unknown-model-xyz").is_none());
    }

    #[test]
    fn category_filter() {
        let master = models_by_category(ModelCategory::Master);
        assert!(master.iter().any(|m| m.id == "kling-2.1-master"));
        assert!(master.iter().all(|m| m.category == ModelCategory::Master));
    }

    #[test]
    fn model_serializes_for_catalog_listing() {
        let json = serde_json::to_value(model_by_id("veo-3").unwrap()).unwrap();
        assert_eq!(json["id"], "veo-3");
        assert_eq!(json["category"], "master");
        assert_eq!(json["maxDurationSecs"], 8);
        // wire identifier is an internal routing detail
        assert!(json.get("endpointId").is_none());
    }
}

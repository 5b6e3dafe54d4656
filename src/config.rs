// src/config.rs
//! Process configuration, read from the environment once in `main` and
//! injected by reference everywhere else. Nothing mutates it after startup.

/// Vendor credentials plus payment settings. Missing vendor keys are
/// warnings, not startup failures: the dispatcher reports "API key not
/// configured" at use time instead.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub aimlapi_key: Option<String>,
    pub fal_key: Option<String>,
    pub pixverse_key: Option<String>,
    pub google_key: Option<String>,
    pub paypal: Option<PayPalConfig>,
    /// Public origin of the front end, used for PayPal return/cancel URLs.
    pub app_url: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: PayPalEnvironment,
    pub plans: SubscriptionPlans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayPalEnvironment {
    #[default]
    Sandbox,
    Live,
}

impl PayPalEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://api-m.sandbox.paypal.com",
            Self::Live => "https://api-m.paypal.com",
        }
    }
}

/// The four billing plan ids from the PayPal dashboard.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPlans {
    pub pro_monthly: Option<String>,
    pub pro_yearly: Option<String>,
    pub premium_monthly: Option<String>,
    pub premium_yearly: Option<String>,
}

impl SubscriptionPlans {
    /// Resolves a caller-facing plan type + cadence to a PayPal plan id.
    pub fn resolve(&self, plan_type: &str, yearly: bool) -> Option<&str> {
        let plan = match (plan_type.to_ascii_lowercase().as_str(), yearly) {
            ("pro", false) => &self.pro_monthly,
            ("pro", true) => &self.pro_yearly,
            ("premium", false) => &self.premium_monthly,
            ("premium", true) => &self.premium_yearly,
            _ => return None,
        };
        plan.as_deref()
    }
}

impl Config {
    /// Reads every setting from the environment. Call once, after
    /// `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        let paypal = match (env_nonempty("PAYPAL_CLIENT_ID"), env_nonempty("PAYPAL_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => {
                let environment = match std::env::var("PAYPAL_ENVIRONMENT").as_deref() {
                    Ok("live") => PayPalEnvironment::Live,
                    _ => PayPalEnvironment::Sandbox,
                };
                Some(PayPalConfig {
                    client_id,
                    client_secret,
                    environment,
                    plans: SubscriptionPlans {
                        pro_monthly: env_nonempty("PAYPAL_PRO_MONTHLY_PLAN_ID"),
                        pro_yearly: env_nonempty("PAYPAL_PRO_YEARLY_PLAN_ID"),
                        premium_monthly: env_nonempty("PAYPAL_PREMIUM_MONTHLY_PLAN_ID"),
                        premium_yearly: env_nonempty("PAYPAL_PREMIUM_YEARLY_PLAN_ID"),
                    },
                })
            }
            _ => {
                tracing::warn!("PayPal credentials not found. Payment endpoints will be disabled.");
                tracing::info!("To enable payments, set: PAYPAL_CLIENT_ID, PAYPAL_CLIENT_SECRET");
                None
            }
        };

        let config = Self {
            aimlapi_key: env_nonempty("AIMLAPI_API_KEY"),
            fal_key: env_nonempty("FAL_API_KEY"),
            pixverse_key: env_nonempty("PIXVERSE_API_KEY"),
            google_key: env_nonempty("GOOGLE_API_KEY"),
            paypal,
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        for (provider, configured) in [
            ("aimlapi", config.aimlapi_key.is_some()),
            ("fal", config.fal_key.is_some()),
            ("pixverse", config.pixverse_key.is_some()),
            ("google", config.google_key.is_some()),
        ] {
            if !configured {
                tracing::warn!(
                    "{} API key not found. Models served by {} will fail until it is set.",
                    provider,
                    provider
                );
            }
        }

        config
    }

    /// Credential for a registry provider id. `None` when absent or empty.
    pub fn api_key_for(&self, provider_id: &str) -> Option<&str> {
        match provider_id {
            "aimlapi" => self.aimlapi_key.as_deref(),
            "fal" => self.fal_key.as_deref(),
            "pixverse" => self.pixverse_key.as_deref(),
            "google" => self.google_key.as_deref(),
            _ => None,
        }
    }
}

/// `std::env::var` that treats empty strings as unset, matching how
/// half-filled `.env` files usually look.
fn env_nonempty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

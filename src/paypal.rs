// src/paypal.rs
//! PayPal REST proxy: client-credentials OAuth, Orders v2 for one-time
//! credit purchases, Billing Subscriptions v1 for plans. A token is fetched
//! per call; PayPal tokens are valid for hours but nothing here caches
//! state, matching the rest of the gateway.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PayPalConfig, SubscriptionPlans};
use crate::error::{GatewayError, Result};

#[derive(Debug, Clone)]
pub struct PayPalClient {
    http: Client,
    config: PayPalConfig,
    /// Front-end origin for return/cancel redirects.
    app_url: String,
}

/// Line item forwarded from the checkout UI.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDescription {
    pub href: String,
    pub rel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub status: String,
    pub links: Vec<LinkDescription>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    /// "value currency", e.g. "9.99 USD".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub id: String,
    pub status: String,
    pub links: Vec<LinkDescription>,
    pub plan_id: String,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig, app_url: String) -> Self {
        Self {
            http: Client::new(),
            config,
            app_url,
        }
    }

    pub fn plans(&self) -> &SubscriptionPlans {
        &self.config.plans
    }

    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/v1/oauth2/token", self.config.environment.base_url());
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(paypal_error(response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Creates a one-time order. `amount` is the order total; items, when
    /// present, are forwarded with an item-total breakdown PayPal requires.
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        items: &[OrderItem],
    ) -> Result<OrderSummary> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.config.environment.base_url());
        let body = CreateOrderRequest::build(amount, currency, items, &self.app_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(paypal_error(response).await);
        }

        let raw: OrderResponse = response.json().await?;
        tracing::info!(order_id = %raw.id, status = %raw.status, "💳 PayPal order created");
        Ok(OrderSummary {
            id: raw.id,
            status: raw.status,
            links: raw.links,
        })
    }

    pub async fn capture_order(&self, order_id: &str) -> Result<CaptureSummary> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v2/checkout/orders/{}/capture",
            self.config.environment.base_url(),
            order_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(paypal_error(response).await);
        }

        let raw: OrderCaptureResponse = response.json().await?;
        tracing::info!(order_id = %raw.id, status = %raw.status, "💳 PayPal order captured");
        Ok(map_capture(raw))
    }

    pub async fn create_subscription(
        &self,
        plan_id: &str,
        user_email: &str,
        user_name: Option<&str>,
    ) -> Result<SubscriptionSummary> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/billing/subscriptions",
            self.config.environment.base_url()
        );
        let body = CreateSubscriptionRequest::build(plan_id, user_email, user_name, &self.app_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(paypal_error(response).await);
        }

        let raw: SubscriptionResponse = response.json().await?;
        tracing::info!(subscription_id = %raw.id, status = %raw.status, "💳 PayPal subscription created");
        Ok(SubscriptionSummary {
            id: raw.id,
            status: raw.status,
            links: raw.links,
            plan_id: plan_id.to_string(),
        })
    }
}

async fn paypal_error(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    GatewayError::PayPal { status, message }
}

/// PayPal money values are strings with exactly two decimal places.
fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

// ── wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnit>,
    application_context: ApplicationContext,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit {
    amount: AmountWithBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<PayPalItem>>,
}

#[derive(Debug, Serialize)]
struct AmountWithBreakdown {
    currency_code: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<AmountBreakdown>,
}

#[derive(Debug, Serialize)]
struct AmountBreakdown {
    item_total: Money,
}

#[derive(Debug, Serialize)]
struct Money {
    currency_code: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct PayPalItem {
    name: String,
    /// PayPal wants quantities as strings.
    quantity: String,
    unit_amount: Money,
}

#[derive(Debug, Serialize)]
struct ApplicationContext {
    brand_name: &'static str,
    user_action: &'static str,
    return_url: String,
    cancel_url: String,
}

impl CreateOrderRequest {
    fn build(amount: Decimal, currency: &str, items: &[OrderItem], app_url: &str) -> Self {
        let mapped_items: Option<Vec<PayPalItem>> = if items.is_empty() {
            None
        } else {
            Some(
                items
                    .iter()
                    .map(|item| PayPalItem {
                        name: item.name.clone(),
                        quantity: item.quantity.to_string(),
                        unit_amount: Money {
                            currency_code: currency.to_string(),
                            value: format_money(item.price),
                        },
                    })
                    .collect(),
            )
        };

        // The item-total breakdown is mandatory whenever items are sent;
        // the caller's amount is the order total either way.
        let breakdown = mapped_items.as_ref().map(|_| AmountBreakdown {
            item_total: Money {
                currency_code: currency.to_string(),
                value: format_money(amount),
            },
        });

        Self {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                amount: AmountWithBreakdown {
                    currency_code: currency.to_string(),
                    value: format_money(amount),
                    breakdown,
                },
                items: mapped_items,
            }],
            application_context: ApplicationContext {
                brand_name: "Video Gateway",
                user_action: "PAY_NOW",
                return_url: format!("{}/credits/success", app_url),
                cancel_url: format!("{}/credits", app_url),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<LinkDescription>,
}

#[derive(Debug, Deserialize)]
struct OrderCaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    payer: Option<Payer>,
    #[serde(default)]
    purchase_units: Vec<CapturedPurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct Payer {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CapturedPurchaseUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    #[serde(default)]
    amount: Option<CaptureAmount>,
}

#[derive(Debug, Deserialize)]
struct CaptureAmount {
    currency_code: String,
    value: String,
}

fn map_capture(raw: OrderCaptureResponse) -> CaptureSummary {
    let amount = raw
        .purchase_units
        .into_iter()
        .filter_map(|u| u.payments)
        .flat_map(|p| p.captures)
        .filter_map(|c| c.amount)
        .next()
        .map(|a| format!("{} {}", a.value, a.currency_code));

    CaptureSummary {
        id: raw.id,
        status: raw.status,
        payer_email: raw.payer.and_then(|p| p.email_address),
        amount,
    }
}

#[derive(Debug, Serialize)]
struct CreateSubscriptionRequest {
    plan_id: String,
    subscriber: Subscriber,
    application_context: ApplicationContext,
}

#[derive(Debug, Serialize)]
struct Subscriber {
    email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<SubscriberName>,
}

#[derive(Debug, Serialize)]
struct SubscriberName {
    given_name: String,
}

impl CreateSubscriptionRequest {
    fn build(plan_id: &str, user_email: &str, user_name: Option<&str>, app_url: &str) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            subscriber: Subscriber {
                email_address: user_email.to_string(),
                name: user_name.map(|n| SubscriberName {
                    given_name: n.to_string(),
                }),
            },
            application_context: ApplicationContext {
                brand_name: "Video Gateway",
                user_action: "SUBSCRIBE_NOW",
                return_url: format!("{}/subscription/success", app_url),
                cancel_url: format!("{}/pricing", app_url),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<LinkDescription>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn order_request_wire_format() {
        let body = CreateOrderRequest::build(
            Decimal::new(999, 2),
            "USD",
            &[],
            "https://videogateway.example",
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["intent"], "CAPTURE");
        assert_eq!(json["purchase_units"][0]["amount"]["value"], "9.99");
        assert_eq!(json["purchase_units"][0]["amount"]["currency_code"], "USD");
        assert!(json["purchase_units"][0].get("items").is_none());
        assert_eq!(
            json["application_context"]["return_url"],
            "https://videogateway.example/credits/success"
        );
    }

    #[test]
    fn order_request_with_items_includes_breakdown() {
        let items = vec![OrderItem {
            name: "500 credits".into(),
            quantity: 2,
            price: Decimal::new(499, 2),
        }];
        let body = CreateOrderRequest::build(Decimal::new(998, 2), "EUR", &items, "https://x");
        let json = serde_json::to_value(&body).unwrap();

        let unit = &json["purchase_units"][0];
        assert_eq!(unit["items"][0]["name"], "500 credits");
        assert_eq!(unit["items"][0]["quantity"], "2");
        assert_eq!(unit["items"][0]["unit_amount"]["value"], "4.99");
        assert_eq!(unit["amount"]["breakdown"]["item_total"]["value"], "9.98");
    }

    #[test]
    fn capture_response_maps_payer_and_amount() {
        let raw: OrderCaptureResponse = serde_json::from_str(
            r#"{
                "id": "5O190127TN364715T",
                "status": "COMPLETED",
                "payer": {"email_address": "buyer@example.com"},
                "purchase_units": [{
                    "payments": {"captures": [{"amount": {"currency_code": "USD", "value": "9.99"}}]}
                }]
            }"#,
        )
        .unwrap();
        let summary = map_capture(raw);

        assert_eq!(summary.id, "5O190127TN364715T");
        assert_eq!(summary.payer_email.as_deref(), Some("buyer@example.com"));
        assert_eq!(summary.amount.as_deref(), Some("9.99 USD"));
    }

    #[test]
    fn capture_response_tolerates_missing_payer() {
        let raw: OrderCaptureResponse =
            serde_json::from_str(r#"{"id": "X", "status": "COMPLETED"}"#).unwrap();
        let summary = map_capture(raw);
        assert!(summary.payer_email.is_none());
        assert!(summary.amount.is_none());
    }

    #[test]
    fn subscription_request_wire_format() {
        let body = CreateSubscriptionRequest::build(
            "P-PRO-M",
            "user@example.com",
            Some("Ada"),
            "https://videogateway.example",
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["plan_id"], "P-PRO-M");
        assert_eq!(json["subscriber"]["email_address"], "user@example.com");
        assert_eq!(json["subscriber"]["name"]["given_name"], "Ada");
        assert_eq!(json["application_context"]["user_action"], "SUBSCRIBE_NOW");
    }

    #[test]
    fn money_is_rounded_to_cents() {
        assert_eq!(format_money(Decimal::new(12346, 3)), "12.35");
        assert_eq!(format_money(Decimal::new(10, 0)), "10.00");
    }
}

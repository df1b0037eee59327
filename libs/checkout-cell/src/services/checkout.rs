use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Appointment deposit: 1000 INR expressed in paise.
const APPOINTMENT_AMOUNT: &str = "100000";
const CURRENCY: &str = "inr";
const PRODUCT_NAME: &str = "Doctor Appointment";

pub struct CheckoutService {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl CheckoutService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.stripe_api_url.clone(),
            secret_key: config.stripe_secret_key.clone(),
        }
    }

    /// Creates a hosted checkout session and returns its redirect URL.
    pub async fn create_session(&self, success_url: &str, cancel_url: &str) -> Result<String> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        debug!("Creating checkout session");

        let params = [
            ("payment_method_types[0]", "card"),
            ("line_items[0][price_data][currency]", CURRENCY),
            ("line_items[0][price_data][product_data][name]", PRODUCT_NAME),
            ("line_items[0][price_data][unit_amount]", APPOINTMENT_AMOUNT),
            ("line_items[0][quantity]", "1"),
            ("mode", "payment"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Checkout API error ({}): {}", status, error_text);
            return Err(anyhow!("Checkout API error ({}): {}", status, error_text));
        }

        let session: Value = response.json().await?;
        session
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("checkout session response had no url"))
    }
}

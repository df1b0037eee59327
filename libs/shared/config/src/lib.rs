use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_api_url: String,
    pub data_api_key: String,
    pub data_source: String,
    pub database: String,
    pub stripe_api_url: String,
    pub stripe_secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            data_api_url: env::var("MONGO_DATA_API_URL")
                .unwrap_or_else(|_| {
                    warn!("MONGO_DATA_API_URL not set, using empty value");
                    String::new()
                }),
            data_api_key: env::var("MONGO_DATA_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("MONGO_DATA_API_KEY not set, using empty value");
                    String::new()
                }),
            data_source: env::var("MONGO_DATA_SOURCE")
                .unwrap_or_else(|_| {
                    warn!("MONGO_DATA_SOURCE not set, using default");
                    "Cluster0".to_string()
                }),
            database: env::var("MONGO_DATABASE")
                .unwrap_or_else(|_| "Patient".to_string()),
            stripe_api_url: env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.data_api_url.is_empty() && !self.data_api_key.is_empty()
    }

    pub fn is_checkout_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty()
    }
}

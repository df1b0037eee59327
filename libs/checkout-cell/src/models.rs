use serde::{Deserialize, Serialize};

/// Body of `POST /payment/checkout`. The caller supplies where the hosted
/// checkout page should send the patient afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub success_url: String,
    pub cancel_url: String,
}

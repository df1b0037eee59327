use anyhow::Result;

use shared_database::{collections, document_store::DocumentStore};

use crate::models::PaymentRecord;

/// Append-only payment ledger. No business rules and no read path here;
/// reporting is handled elsewhere.
pub struct LedgerService {
    store: DocumentStore,
}

impl LedgerService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: PaymentRecord) -> Result<()> {
        let document = serde_json::to_value(&entry)?;
        self.store
            .insert_one(collections::PAYMENT_RECORD, document)
            .await
    }
}

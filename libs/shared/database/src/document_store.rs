use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

/// Client for the document store's HTTP Data API. One instance is built at
/// startup and shared through `AppState`; clones reuse the same connection
/// pool.
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
}

/// Result of an `updateOne` action.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl DocumentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.data_api_url.clone(),
            api_key: config.data_api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("api-key", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }

    async fn action(&self, action: &str, collection: &str, mut payload: Value) -> Result<Value> {
        let url = format!("{}/action/{}", self.base_url, action);
        debug!("Data API {} on {}", action, collection);

        if let Value::Object(map) = &mut payload {
            map.insert("dataSource".to_string(), json!(self.data_source));
            map.insert("database".to_string(), json!(self.database));
            map.insert("collection".to_string(), json!(collection));
        }

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Data API error ({}): {}", status, error_text);
            return Err(anyhow!("Data API error ({}): {}", status, error_text));
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }

    pub async fn find(&self, collection: &str, filter: Value) -> Result<Vec<Value>> {
        let body = self
            .action("find", collection, json!({ "filter": filter }))
            .await?;
        documents(body)
    }

    pub async fn find_sorted(
        &self,
        collection: &str,
        filter: Value,
        sort: Value,
        limit: i64,
    ) -> Result<Vec<Value>> {
        let body = self
            .action(
                "find",
                collection,
                json!({ "filter": filter, "sort": sort, "limit": limit }),
            )
            .await?;
        documents(body)
    }

    pub async fn find_one(&self, collection: &str, filter: Value) -> Result<Option<Value>> {
        let body = self
            .action("findOne", collection, json!({ "filter": filter }))
            .await?;
        match body.get("document") {
            Some(Value::Null) | None => Ok(None),
            Some(doc) => Ok(Some(doc.clone())),
        }
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> Result<()> {
        self.action("insertOne", collection, json!({ "document": document }))
            .await?;
        Ok(())
    }

    pub async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateOutcome> {
        let body = self
            .action(
                "updateOne",
                collection,
                json!({ "filter": filter, "update": update }),
            )
            .await?;
        Ok(UpdateOutcome {
            matched_count: body.get("matchedCount").and_then(Value::as_u64).unwrap_or(0),
            modified_count: body.get("modifiedCount").and_then(Value::as_u64).unwrap_or(0),
        })
    }

    /// Counts documents matching `filter`. The Data API has no count action,
    /// so this runs a `$match`/`$count` aggregation.
    pub async fn count(&self, collection: &str, filter: Value) -> Result<u64> {
        let pipeline = json!([{ "$match": filter }, { "$count": "count" }]);
        let body = self
            .action("aggregate", collection, json!({ "pipeline": pipeline }))
            .await?;
        let docs = documents(body)?;
        Ok(docs
            .first()
            .and_then(|doc| doc.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }
}

fn documents(body: Value) -> Result<Vec<Value>> {
    match body.get("documents").and_then(Value::as_array) {
        Some(docs) => Ok(docs.clone()),
        None => Err(anyhow!("Data API response missing documents array")),
    }
}

/// True when an insert failed because it violated a unique index.
pub fn is_duplicate_key(err: &anyhow::Error) -> bool {
    let message = err.to_string();
    message.contains("E11000") || message.contains("duplicate key")
}

//! PostgREST (Supabase REST) record store

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::store::traits::{GenerationRecord, NewGenerationRecord, RecordStore};

/// Reason reported when the insert succeeds but echoes no rows back
pub const NO_DATA_RETURNED: &str = "No data returned";

/// Connection parameters, present only when both are configured
struct Connection {
    table_url: String,
    service_key: String,
}

/// Record store backed by a PostgREST table
pub struct RestRecordStore {
    client: Client,
    connection: Option<Connection>,
    table: String,
}

/// Error body PostgREST sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

impl RestRecordStore {
    /// Create a new REST store from configuration.
    ///
    /// Missing connection parameters do not fail construction; every
    /// request then fails with a store error instead.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let url = config.url.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let key = config
            .service_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let connection = match (url, key) {
            (Some(url), Some(key)) => Some(Connection {
                table_url: format!("{}/rest/v1/{}", url.trim_end_matches('/'), config.table),
                service_key: key.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            client,
            connection,
            table: config.table.clone(),
        })
    }

    /// Whether both the endpoint URL and service key are set
    pub fn is_configured(&self) -> bool {
        self.connection.is_some()
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or_else(|| {
            AppError::Store("Record store URL or service key is not configured".to_string())
        })
    }

    fn request(&self, method: reqwest::Method, conn: &Connection) -> reqwest::RequestBuilder {
        self.client
            .request(method, &conn.table_url)
            .header("apikey", &conn.service_key)
            .header(AUTHORIZATION, format!("Bearer {}", conn.service_key))
    }

    /// Decode a 2xx body, or turn an error response into `AppError::Store`
    async fn rows(&self, response: Response) -> Result<Vec<GenerationRecord>> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            warn!(table = %self.table, status = %status, "Record store returned an error status");
            let reason = serde_json::from_str::<PostgrestError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("{}: {}", status, body));
            return Err(AppError::Store(reason));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Store(format!("Failed to read response body: {}", e)))?;

        // A blank body means the store ignored `Prefer: return=representation`
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        // PostgREST answers an empty table with `[]`; tolerate `null` as well
        let rows = serde_json::from_slice::<Option<Vec<GenerationRecord>>>(&body)
            .map_err(|e| AppError::Store(format!("Invalid response body: {}", e)))?;

        Ok(rows.unwrap_or_default())
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn insert(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
        let conn = self.connection()?;
        debug!(table = %self.table, "Inserting generation record");

        let response = self
            .request(reqwest::Method::POST, conn)
            .header("Prefer", "return=representation")
            .json(&[&record])
            .send()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Store(NO_DATA_RETURNED.to_string()))
    }

    async fn list_recent(&self) -> Result<Vec<GenerationRecord>> {
        let conn = self.connection()?;

        let response = self
            .request(reqwest::Method::GET, conn)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let rows = self.rows(response).await?;
        debug!(table = %self.table, count = rows.len(), "Fetched generation records");
        Ok(rows)
    }
}

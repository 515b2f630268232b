// File: manager/src/store/rest.rs
use anyhow::{anyhow, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CleanupLogEntry, MaintenanceStatusRow, RemoteStore};
use crate::config::StoreConfig;
use crate::constants::{http, store};
use crate::errors::StoreError;

/// Error codes meaning the relation, procedure or row does not exist
const NOT_FOUND_CODES: &[&str] = &["PGRST116", "PGRST202", "PGRST205", "42P01", "42883"];

/// Error body returned by the REST interface
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// PostgREST client for the hosted back-end
pub struct RestStore {
    base_url: String,
    access_key: String,
    client: Client,
}

impl RestStore {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for the remote store: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("store.url is not configured"))?;
        let key = config
            .access_key
            .as_deref()
            .ok_or_else(|| anyhow!("store.access_key is not configured"))?;

        Self::new(url, key, Duration::from_secs(config.request_timeout_seconds))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, store::REST_PATH, table)
    }

    fn procedure_url(&self, name: &str) -> String {
        format!("{}{}/rpc/{}", self.base_url, store::REST_PATH, name)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.access_key)
            .bearer_auth(&self.access_key)
    }

    async fn send(
        &self,
        operation: &str,
        relation: &str,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let not_found = status == 404
            || body
                .code
                .as_deref()
                .is_some_and(|code| NOT_FOUND_CODES.contains(&code));

        if not_found {
            return Err(StoreError::NotFound {
                operation: operation.to_string(),
                relation: relation.to_string(),
            });
        }

        Err(StoreError::Remote {
            operation: operation.to_string(),
            status,
            code: body.code,
            message: body.message.unwrap_or(text),
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|e| StoreError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }

    async fn delete_all_rows(&self, table: &str) -> Result<u64, StoreError> {
        let operation = format!("delete from {}", table);
        // A condition that matches every row; the store refuses unfiltered deletes.
        let filter = format!("neq.{}", Uuid::nil());

        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal, count=exact");

        let response = self.send(&operation, table, request).await?;
        let deleted = exact_count(&response).unwrap_or_else(|| {
            warn!("{} returned no row count, reporting 0", operation);
            0
        });

        debug!("Deleted {} rows from {}", deleted, table);
        Ok(deleted)
    }

    async fn invoke(&self, name: &str) -> Result<Value, StoreError> {
        let operation = format!("rpc {}", name);
        let request = self.client.post(self.procedure_url(name)).json(&json!({}));

        let response = self.send(&operation, name, request).await?;
        let text = response.text().await.map_err(|e| StoreError::Transport {
            operation: operation.clone(),
            reason: e.to_string(),
        })?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            operation,
            reason: e.to_string(),
        })
    }

    async fn read_latest_log(&self) -> Result<Option<CleanupLogEntry>, StoreError> {
        let table = store::CLEANUP_LOG_TABLE;
        let operation = format!("read {}", table);
        let request = self.client.get(self.table_url(table)).query(&[
            ("select", "*"),
            ("order", "created_at.desc"),
            ("limit", "1"),
        ]);

        let response = self.send(&operation, table, request).await?;
        let rows: Vec<CleanupLogEntry> = Self::decode(&operation, response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_log(&self, entry: &CleanupLogEntry) -> Result<(), StoreError> {
        let table = store::CLEANUP_LOG_TABLE;
        let operation = format!("insert into {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(entry);

        self.send(&operation, table, request).await?;
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<u64, StoreError> {
        let operation = format!("count {}", table);
        let request = self
            .client
            .head(self.table_url(table))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact");

        let response = self.send(&operation, table, request).await?;
        exact_count(&response).ok_or_else(|| StoreError::Decode {
            operation,
            reason: "missing Content-Range header".to_string(),
        })
    }

    async fn read_maintenance_status(&self) -> Result<Option<MaintenanceStatusRow>, StoreError> {
        let table = store::MAINTENANCE_STATUS_TABLE;
        let operation = format!("read {}", table);
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("limit", "1")]);

        let response = self.send(&operation, table, request).await?;
        let rows: Vec<MaintenanceStatusRow> = Self::decode(&operation, response).await?;
        Ok(rows.into_iter().next())
    }
}

/// Total from a `Content-Range: 0-6/7` or `*/7` header
fn exact_count(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

impl RemoteStore for RestStore {
    fn delete_all<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        self.delete_all_rows(table).boxed()
    }

    fn call_procedure<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Value, StoreError>> {
        self.invoke(name).boxed()
    }

    fn latest_cleanup_log(&self) -> BoxFuture<'_, Result<Option<CleanupLogEntry>, StoreError>> {
        self.read_latest_log().boxed()
    }

    fn append_cleanup_log<'a>(
        &'a self,
        entry: &'a CleanupLogEntry,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.insert_log(entry).boxed()
    }

    fn count_rows<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        self.count(table).boxed()
    }

    fn maintenance_status(&self) -> BoxFuture<'_, Result<Option<MaintenanceStatusRow>, StoreError>> {
        self.read_maintenance_status().boxed()
    }
}

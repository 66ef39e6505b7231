//! Warehouse driver over the Snowflake SQL REST API.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::Warehouse;
use crate::config::WarehouseSettings;
use crate::error::PipelineError;

const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

#[derive(Deserialize)]
struct StatementResponse {
    message: Option<String>,
}

pub struct SnowflakeWarehouse {
    client: Client,
    base_url: String,
    token: String,
    settings: WarehouseSettings,
}

impl SnowflakeWarehouse {
    /// Build a driver and verify the session with a probe statement so
    /// account or credential problems surface before the load starts.
    pub async fn connect(settings: &WarehouseSettings) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PipelineError::Connect {
                service: "warehouse",
                source: e.into(),
            })?;

        let warehouse = Self {
            client,
            base_url: format!("https://{}.snowflakecomputing.com", settings.account),
            token: settings.token.clone(),
            settings: settings.clone(),
        };

        warehouse
            .submit("SELECT 1")
            .await
            .map_err(|source| PipelineError::Connect {
                service: "warehouse",
                source,
            })?;

        Ok(warehouse)
    }

    async fn submit(&self, sql: &str) -> Result<()> {
        let request_id = Uuid::new_v4();
        let url = format!(
            "{}/api/v2/statements?requestId={}",
            self.base_url, request_id
        );
        debug!("Submitting statement {}: {}", request_id, sql);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(TOKEN_TYPE_HEADER, "PROGRAMMATIC_ACCESS_TOKEN")
            .json(&json!({
                "statement": sql,
                "database": self.settings.database,
                "schema": self.settings.schema,
                "warehouse": self.settings.warehouse,
                "role": self.settings.role,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StatementResponse>()
                .await
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_default();
            return Err(anyhow!("statement failed with status {}: {}", status, message));
        }

        Ok(())
    }
}

#[async_trait]
impl Warehouse for SnowflakeWarehouse {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.submit(sql).await
    }
}

//! Warehouse bulk load of a staged feature table.
//!
//! The load is an explicit step sequence — InferSchema, CreateTable,
//! CreateStage, Transfer, Copy — where every step is a hard dependency on
//! the previous one. A failed step halts the sequence with a typed
//! `LoadStep` error; state created by earlier steps is intentionally left
//! in place for diagnosis.

pub mod snowflake;

use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use object_store::path::Path;
use object_store::ObjectStore;
use tracing::info;

use crate::error::PipelineError;
use crate::run_id::RunId;

pub use snowflake::SnowflakeWarehouse;

/// Prefix within the intermediate store that backs the warehouse stage.
pub const LOAD_AREA_PREFIX: &str = "load";

/// Rows to sample when inferring the schema from the staged object.
const SCHEMA_SAMPLE_ROWS: usize = 5;

/// Columns carrying free text or identifiers; these are sanitized on load.
/// Everything else (the numeric/categorical feature fields) passes through.
const TEXT_COLUMNS: [&str; 8] = [
    "track",
    "artist",
    "uri",
    "track_href",
    "analysis_url",
    "duration_ms",
    "time_signature",
    "genres",
];

/// Steps of the load sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    InferSchema,
    CreateTable,
    CreateStage,
    Transfer,
    Copy,
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStep::InferSchema => "infer-schema",
            LoadStep::CreateTable => "create-table",
            LoadStep::CreateStage => "create-stage",
            LoadStep::Transfer => "transfer",
            LoadStep::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Minimal SQL execution seam against the warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<()>;
}

/// Warehouse objects the loader addresses.
#[derive(Debug, Clone)]
pub struct LoadTarget {
    /// Destination table, replaced wholesale on every load.
    pub table: String,
    /// Name of the load stage.
    pub stage: String,
    /// External location backing the stage (the store's load area URL).
    pub stage_url: String,
}

#[derive(Debug)]
pub struct LoadReport {
    /// Columns of the inferred (text-only) schema, in header order.
    pub columns: Vec<String>,
}

pub struct WarehouseLoader {
    warehouse: Arc<dyn Warehouse>,
    store: Arc<dyn ObjectStore>,
    target: LoadTarget,
}

impl WarehouseLoader {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        store: Arc<dyn ObjectStore>,
        target: LoadTarget,
    ) -> Self {
        Self {
            warehouse,
            store,
            target,
        }
    }

    /// Run the full load sequence for one staged object.
    pub async fn load(&self, run_id: &RunId) -> Result<LoadReport, PipelineError> {
        let failed = |step: LoadStep| move |source: anyhow::Error| PipelineError::LoadStep { step, source };

        let columns = self
            .infer_schema(run_id)
            .await
            .map_err(failed(LoadStep::InferSchema))?;
        info!(
            "Inferred {} text column(s) from {}",
            columns.len(),
            run_id.object_key()
        );

        self.warehouse
            .execute(&create_table_sql(&self.target.table, &columns))
            .await
            .map_err(failed(LoadStep::CreateTable))?;
        info!("Replaced destination table {}", self.target.table);

        self.warehouse
            .execute(&create_stage_sql(&self.target.stage, &self.target.stage_url))
            .await
            .map_err(failed(LoadStep::CreateStage))?;
        info!("Replaced load stage {}", self.target.stage);

        self.transfer(run_id)
            .await
            .map_err(failed(LoadStep::Transfer))?;
        info!("Transferred {} into the load area", run_id.object_key());

        self.warehouse
            .execute(&copy_sql(&self.target.table, &self.target.stage, &columns))
            .await
            .map_err(failed(LoadStep::Copy))?;
        info!("Copied staged rows into {}", self.target.table);

        Ok(LoadReport { columns })
    }

    /// Read the staged object's header (plus a few rows as a shape check)
    /// and derive the column list. Every column is typed as unconstrained
    /// text; real typing is deferred to downstream consumers.
    async fn infer_schema(&self, run_id: &RunId) -> Result<Vec<String>> {
        let staged = self
            .store
            .get(&Path::from(run_id.object_key()))
            .await?
            .bytes()
            .await?;

        let mut reader = csv::Reader::from_reader(staged.as_ref());
        let header = reader.headers()?.clone();
        if header.is_empty() {
            return Err(anyhow!("staged object {} has no header", run_id.object_key()));
        }

        for (index, row) in reader.records().take(SCHEMA_SAMPLE_ROWS).enumerate() {
            let row = row?;
            if row.len() != header.len() {
                return Err(anyhow!(
                    "row {} has {} field(s) but the header has {}",
                    index + 2,
                    row.len(),
                    header.len()
                ));
            }
        }

        Ok(header.iter().map(String::from).collect())
    }

    /// Server-side copy of the staged object into the load-area prefix the
    /// stage reads from. The stage's purge option removes it after the copy.
    async fn transfer(&self, run_id: &RunId) -> Result<()> {
        let from = Path::from(run_id.object_key());
        let to = Path::from(format!("{}/{}", LOAD_AREA_PREFIX, run_id.object_key()));
        self.store.copy(&from, &to).await?;
        Ok(())
    }
}

pub fn create_table_sql(table: &str, columns: &[String]) -> String {
    let definitions = columns
        .iter()
        .map(|column| format!("{} VARCHAR", column))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE OR REPLACE TABLE {} ({})", table, definitions)
}

pub fn create_stage_sql(stage: &str, stage_url: &str) -> String {
    format!(
        "CREATE OR REPLACE STAGE {} URL = '{}' \
         FILE_FORMAT = (TYPE = 'CSV', FIELD_DELIMITER = ',', SKIP_HEADER = 1) \
         COPY_OPTIONS = (PURGE = TRUE)",
        stage, stage_url
    )
}

pub fn copy_sql(table: &str, stage: &str, columns: &[String]) -> String {
    let select = columns
        .iter()
        .enumerate()
        .map(|(index, column)| select_expression(index + 1, column))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "COPY INTO {} ({}) FROM (SELECT {} FROM @{})",
        table,
        columns.join(", "),
        select,
        stage
    )
}

/// Positional select expression for one column. Free-text columns are
/// stripped down to alphanumerics and spaces; the rest pass through.
pub fn select_expression(position: usize, column: &str) -> String {
    if TEXT_COLUMNS.contains(&column) {
        format!(
            "REGEXP_REPLACE(${}, '[^A-Za-z0-9 ]', '') AS {}",
            position, column
        )
    } else {
        format!("${} AS {}", position, column)
    }
}

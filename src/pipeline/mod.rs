//! Orchestration of the two pipeline stages.
//!
//! `run_extract` takes a playlist snapshot and stages it as a CSV object;
//! `run_load` replaces the warehouse table from that object. Each stage is
//! independently re-runnable for the same run id.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::catalog::SpotifyClient;
use crate::config::AppConfig;
use crate::extract::{FeatureEnricher, PlaylistExtractor};
use crate::load::{LoadTarget, SnowflakeWarehouse, WarehouseLoader};
use crate::run_id::RunId;
use crate::stage::{open_store, StageOutcome, Stager};
use crate::table::FeatureTable;

/// Extract the playlist, enrich it, and stage the feature table. Skips all
/// upstream traffic when an object for this run id is already staged.
pub async fn run_extract(config: &AppConfig, run_id: &RunId) -> Result<StageOutcome> {
    let store = open_store(&config.store)?;
    let stager = Stager::new(store);

    if stager.is_staged(run_id).await? {
        info!("Run {} is already staged, nothing to extract", run_id);
        return Ok(StageOutcome::AlreadyStaged);
    }

    let client = Arc::new(SpotifyClient::connect(&config.catalog).await?);

    let tracks = PlaylistExtractor::new(client.clone())
        .extract(&config.catalog.playlist_id)
        .await?;
    let records = FeatureEnricher::new(client).enrich(&tracks).await?;

    let table = FeatureTable::from_records(&records);
    info!(
        "Built feature table with {} row(s) from {} track(s)",
        table.row_count(),
        tracks.len()
    );

    let outcome = stager.stage(run_id, &table).await?;
    Ok(outcome)
}

/// Load the staged object for this run id into the warehouse table.
pub async fn run_load(config: &AppConfig, run_id: &RunId) -> Result<()> {
    let Some(settings) = &config.warehouse else {
        bail!("loading requires a [warehouse] section in the config file");
    };

    let store = open_store(&config.store)?;
    let warehouse = Arc::new(SnowflakeWarehouse::connect(settings).await?);

    let target = LoadTarget {
        table: settings.table.clone(),
        stage: settings.stage.clone(),
        stage_url: settings.stage_url.clone(),
    };
    let report = WarehouseLoader::new(warehouse, store, target)
        .load(run_id)
        .await?;

    info!(
        "Loaded run {} into {} ({} column(s))",
        run_id,
        settings.table,
        report.columns.len()
    );
    Ok(())
}

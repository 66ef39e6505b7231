//! Idempotent staging of the feature table into the intermediate store.
//!
//! The staged object is keyed by run id and written at most once; a re-run
//! for the same run id short-circuits so a failed downstream stage can be
//! retried without re-extracting.

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use tracing::info;

use crate::config::StoreSettings;
use crate::error::PipelineError;
use crate::run_id::RunId;
use crate::table::FeatureTable;

/// Outcome of a staging attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The object was written by this call.
    Written,
    /// An object already existed under this run id; nothing was written.
    AlreadyStaged,
}

pub struct Stager {
    store: Arc<dyn ObjectStore>,
}

impl Stager {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// True when an object for this run id is already present.
    pub async fn is_staged(&self, run_id: &RunId) -> Result<bool, PipelineError> {
        let key = run_id.object_key();
        match self.store.head(&Path::from(key.as_str())).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(source) => Err(PipelineError::Stage {
                key,
                source: source.into(),
            }),
        }
    }

    /// Persist the table under `<run-id>.csv`. A second call for the same
    /// run id is a no-op that succeeds without writing.
    pub async fn stage(
        &self,
        run_id: &RunId,
        table: &FeatureTable,
    ) -> Result<StageOutcome, PipelineError> {
        let key = run_id.object_key();

        if self.is_staged(run_id).await? {
            info!("Object {} already staged, skipping write", key);
            return Ok(StageOutcome::AlreadyStaged);
        }

        let bytes = table.to_csv().map_err(|source| PipelineError::Stage {
            key: key.clone(),
            source,
        })?;
        self.store
            .put(&Path::from(key.as_str()), PutPayload::from(bytes))
            .await
            .map_err(|source| PipelineError::Stage {
                key: key.clone(),
                source: source.into(),
            })?;

        info!("Staged {} ({} row(s))", key, table.row_count());
        Ok(StageOutcome::Written)
    }
}

/// Open the configured intermediate store: an S3 bucket when one is
/// configured, otherwise a local directory (created if absent).
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn ObjectStore>, PipelineError> {
    let connect = |source: anyhow::Error| PipelineError::Connect {
        service: "object store",
        source,
    };

    if let Some(bucket) = &settings.bucket {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = &settings.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        if let Some(key_id) = &settings.access_key_id {
            builder = builder.with_access_key_id(key_id);
        }
        if let Some(secret) = &settings.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        let store = builder.build().map_err(|e| connect(e.into()))?;
        Ok(Arc::new(store))
    } else if let Some(dir) = &settings.local_dir {
        std::fs::create_dir_all(dir).map_err(|e| connect(e.into()))?;
        let store = LocalFileSystem::new_with_prefix(dir).map_err(|e| connect(e.into()))?;
        Ok(Arc::new(store))
    } else {
        Err(connect(anyhow::anyhow!(
            "store configuration needs either a bucket or a local_dir"
        )))
    }
}

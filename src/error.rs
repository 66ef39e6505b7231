//! Error taxonomy for a pipeline run.
//!
//! Validation and connect errors fail fast, before side effects. Per-item
//! problems during enrichment (a malformed feature entry, a failed artist
//! lookup) are recovered locally with a safe default and never surface here.

use thiserror::Error;

use crate::load::LoadStep;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The externally supplied run identifier failed validation.
    #[error("invalid run id {value:?}: {reason}")]
    InvalidRunId { value: String, reason: String },

    /// A session with an external collaborator could not be established.
    #[error("failed to connect to {service}")]
    Connect {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// An individual upstream request failed. Fatal for playlist pages and
    /// feature batches; per-artist genre lookups never reach this.
    #[error("upstream request failed: {context}")]
    Request {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// The intermediate store rejected a lookup or write.
    #[error("staging {key} failed")]
    Stage {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A warehouse load step failed; later steps are skipped and earlier
    /// state is left in place for diagnosis.
    #[error("load step {step} failed")]
    LoadStep {
        step: LoadStep,
        #[source]
        source: anyhow::Error,
    },
}

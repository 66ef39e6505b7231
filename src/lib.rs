pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod run_id;
pub mod stage;
pub mod table;

pub use error::PipelineError;
pub use run_id::RunId;

//! Validated run identifier.
//!
//! The scheduler hands every stage an 8-digit date stamp (e.g. `20240101`)
//! identifying one pipeline execution. It becomes part of object paths, so
//! it is validated before any I/O happens.

use std::fmt;

use chrono::NaiveDate;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Accepts exactly an 8-digit stamp that parses as a `%Y%m%d` date.
    pub fn parse(value: &str) -> Result<Self, PipelineError> {
        let invalid = |reason: &str| PipelineError::InvalidRunId {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected an 8-digit date stamp (YYYYMMDD)"));
        }
        if NaiveDate::parse_from_str(value, "%Y%m%d").is_err() {
            return Err(invalid("not a calendar date"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic key of the staged object for this run.
    pub fn object_key(&self) -> String {
        format!("{}.csv", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

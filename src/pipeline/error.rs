//! Pipeline contract violations.
//!
//! Per-machine shortfalls (too few readings, missing equipment record,
//! unparsable maintenance date) are never errors: they show up as missing
//! map keys or defaults. Only an input that makes the whole run meaningless
//! is reported here, so callers can tell "nothing found" from "never ran".

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No sensor readings supplied; the pipeline has nothing to analyse")]
    EmptySensorData,
}

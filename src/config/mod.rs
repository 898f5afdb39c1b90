//! Pipeline Configuration Module
//!
//! Provides the analytics tunables loaded from TOML files. Every constant the
//! pipeline uses (window sizes, model parameters, probability cap, health
//! thresholds) lives here with a default matching the documented value.
//!
//! ## Loading Order
//!
//! 1. `SMART_MAINTAIN_CONFIG` environment variable (path to TOML file)
//! 2. `maintenance.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is an explicit value handed to the pipeline; there is no global
//! instance, so two pipelines with different settings can coexist.
//!
//! ```ignore
//! let config = PipelineConfig::load();
//! let pipeline = MaintenancePipeline::new(config);
//! ```

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;

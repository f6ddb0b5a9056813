//! Simulated clinical lab reports.
//!
//! A [`LabReportGenerator`] takes requested tests and order sets, a patient and
//! a list of diseases, and produces a report in which derived tests follow their
//! inputs and disease overrides reshape the generated values.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod generator;
pub mod models;
pub mod report;

use tracing_subscriber::EnvFilter;

pub use catalog::{Catalog, CatalogBuilder, CatalogError, DuplicatePolicy};
pub use config::GeneratorConfig;
pub use engine::{EngineError, GenerationEngine, Sampler};
pub use generator::{LabError, LabReportGenerator};
pub use models::{Gender, LabReport, Patient, ResultFlag, TestValue};
pub use report::{CategoryWithTests, FetchOptions, FullTestResult, TestResultWithMetadata};

/// Install a fmt subscriber filtered by `RUST_LOG`, or the crate default.
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::info!("{} v{} logging initialised", config::APP_NAME, config::APP_VERSION);
    }
}

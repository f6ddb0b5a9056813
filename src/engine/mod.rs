//! Dependency-ordered generation engine.
//!
//! Four stages, leaf first:
//! 1. `expand`: order sets to a flat, duplicate-free list of test ids
//! 2. `dependency`: execution order where prerequisites precede dependents
//! 3. `overrides`: per-test override lists from the active diseases
//! 4. `generate`: per-test strategy dispatch, sampling through `sampler`

pub mod dependency;
pub mod expand;
pub mod generate;
pub mod overrides;
pub mod sampler;

use thiserror::Error;

use crate::models::CalculationError;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Sampling domain error: mean {mean} with SD {sd} cannot yield a non-negative value")]
    SamplingDomain { mean: f64, sd: f64 },

    #[error("Circular test dependency: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("Order set contains itself: {}", path.join(" -> "))]
    OrderSetCycle { path: Vec<String> },

    #[error("Calculation failed for {test_id}: {source}")]
    Calculation {
        test_id: String,
        source: CalculationError,
    },
}

// ═══════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════

pub use dependency::order_by_dependency;
pub use expand::expand_order_sets;
pub use generate::{apply_normal_overrides, GenerationEngine};
pub use overrides::{compose_overrides, OverrideMap};
pub use sampler::{sample_normal, Sampler};

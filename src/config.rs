use serde::{Deserialize, Serialize};

use crate::catalog::DuplicatePolicy;

/// Application-level constants
pub const APP_NAME: &str = "labsim";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unit system used when a caller does not name one.
pub const DEFAULT_UNITS: &str = "metric";

/// Fixed RNG seed for reproducible reports.
pub const SEED_ENV: &str = "LABSIM_SEED";
/// Unit system for fetched views.
pub const UNITS_ENV: &str = "LABSIM_UNITS";

/// Log filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

/// Generator settings. Everything has a usable default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `None` draws from OS entropy on every pass.
    pub seed: Option<u64>,
    pub units: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            units: DEFAULT_UNITS.into(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by `LABSIM_SEED` and `LABSIM_UNITS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a caller-supplied variable source.
    /// An unparseable seed is logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(SEED_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => tracing::warn!(
                    var = SEED_ENV,
                    value = %raw,
                    error = %e,
                    "Ignoring invalid seed"
                ),
            }
        }

        if let Some(units) = lookup(UNITS_ENV) {
            let units = units.trim();
            if !units.is_empty() {
                config.units = units.to_lowercase();
            }
        }

        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.into();
        self
    }
}

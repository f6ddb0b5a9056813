use serde::{Deserialize, Serialize};

/// Named bundle of tests and/or other order sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSet {
    pub id: String,
    pub long: String,
    pub short: String,
    /// Test ids or nested order-set ids, in display order.
    pub components: Vec<String>,
}

impl OrderSet {
    pub fn new(id: &str, long: &str, short: &str, components: &[&str]) -> Self {
        Self {
            id: id.into(),
            long: long.into(),
            short: short.into(),
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }
}

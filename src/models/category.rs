use serde::{Deserialize, Serialize};

/// Display category; lower sort index is shown first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub sort_index: u32,
}

impl Category {
    pub fn new(name: &str, sort_index: u32) -> Self {
        Self {
            name: name.into(),
            sort_index,
        }
    }
}

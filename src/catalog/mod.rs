//! Catalog registry: tests, order sets, diseases and categories, constructed once.
//!
//! The registry is built from ordered lists (built-ins first, caller entries after)
//! and is immutable afterwards. Alongside the entries it holds a precomputed
//! `needed_by` index (inverse of each derived test's `requires`) so cascade
//! updates never need to scan the catalog.

pub mod builtin;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Category, Disease, DiseaseNode, OrderSet, TestDefinition};

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Invalid disease path: {0:?}")]
    InvalidDiseasePath(String),
}

/// What to do when two catalog entries share an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Earliest entry wins; built-ins take priority over caller entries.
    #[default]
    KeepFirst,
    /// Later entry shadows the earlier one, keeping the earlier position.
    Replace,
    /// Fail construction with `CatalogError::DuplicateId`.
    Reject,
}

// ═══════════════════════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════════════════════

pub struct Catalog {
    tests: Vec<TestDefinition>,
    test_index: HashMap<String, usize>,
    order_sets: Vec<OrderSet>,
    order_set_index: HashMap<String, usize>,
    diseases: DiseaseNode,
    categories: Vec<Category>,
    needed_by: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Built-in catalog with the default duplicate policy.
    pub fn builtin() -> Result<Self, CatalogError> {
        CatalogBuilder::builtin().build()
    }

    pub fn test(&self, id: &str) -> Option<&TestDefinition> {
        self.test_index.get(id).map(|&idx| &self.tests[idx])
    }

    /// Case-insensitive test lookup, used for caller-supplied request ids.
    pub fn find_test(&self, id: &str) -> Option<&TestDefinition> {
        self.test(id)
            .or_else(|| self.tests.iter().find(|t| t.id.eq_ignore_ascii_case(id)))
    }

    pub fn tests(&self) -> &[TestDefinition] {
        &self.tests
    }

    pub fn order_set(&self, id: &str) -> Option<&OrderSet> {
        self.order_set_index.get(id).map(|&idx| &self.order_sets[idx])
    }

    pub fn find_order_set(&self, id: &str) -> Option<&OrderSet> {
        self.order_set(id)
            .or_else(|| self.order_sets.iter().find(|o| o.id.eq_ignore_ascii_case(id)))
    }

    pub fn order_sets(&self) -> &[OrderSet] {
        &self.order_sets
    }

    /// Resolve a dot-separated disease path such as `cv.nstemi`.
    pub fn find_disease_by_path(&self, path: &str) -> Option<&Arc<Disease>> {
        self.diseases.disease_at(path)
    }

    pub fn disease_tree(&self) -> &DiseaseNode {
        &self.diseases
    }

    /// Category by case-insensitive name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Tests that directly list `test_id` in `requires`.
    pub fn needed_by(&self, test_id: &str) -> &[String] {
        self.needed_by
            .get(test_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every test that transitively requires `test_id`, breadth first.
    /// Terminates on cyclic `requires` chains.
    pub fn transitive_dependents(&self, test_id: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::from([test_id]);
        let mut queue: VecDeque<&str> = VecDeque::from([test_id]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for dependent in self.needed_by(current) {
                if seen.insert(dependent.as_str()) {
                    out.push(dependent.clone());
                    queue.push_back(dependent.as_str());
                }
            }
        }
        out
    }
}

// ═══════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct CatalogBuilder {
    tests: Vec<TestDefinition>,
    order_sets: Vec<OrderSet>,
    diseases: Vec<Disease>,
    categories: Vec<Category>,
    policy: DuplicatePolicy,
}

impl CatalogBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with the built-in catalog.
    pub fn builtin() -> Self {
        Self::new()
            .with_tests(builtin::lab_tests())
            .with_order_sets(builtin::order_sets())
            .with_diseases(builtin::diseases())
            .with_categories(builtin::categories())
    }

    pub fn with_tests(mut self, tests: impl IntoIterator<Item = TestDefinition>) -> Self {
        self.tests.extend(tests);
        self
    }

    pub fn with_order_sets(mut self, order_sets: impl IntoIterator<Item = OrderSet>) -> Self {
        self.order_sets.extend(order_sets);
        self
    }

    pub fn with_diseases(mut self, diseases: impl IntoIterator<Item = Disease>) -> Self {
        self.diseases.extend(diseases);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories.extend(categories);
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let policy = self.policy;
        let (tests, test_index) = register("test", self.tests, |t| t.id.clone(), policy)?;
        let (order_sets, order_set_index) =
            register("order set", self.order_sets, |o| o.id.clone(), policy)?;
        let (categories, _) = register(
            "category",
            self.categories,
            |c| c.name.to_lowercase(),
            policy,
        )?;

        for disease in &self.diseases {
            if disease.id.is_empty() || disease.id.split('.').any(str::is_empty) {
                return Err(CatalogError::InvalidDiseasePath(disease.id.clone()));
            }
        }
        let (diseases, _) = register("disease", self.diseases, |d| d.id.clone(), policy)?;
        let mut tree = DiseaseNode::root();
        for disease in diseases {
            tree.insert(Arc::new(disease));
        }

        let mut needed_by: HashMap<String, Vec<String>> = HashMap::new();
        for test in &tests {
            for required in test.generate.requires() {
                if test_index.contains_key(required) {
                    needed_by
                        .entry(required.clone())
                        .or_default()
                        .push(test.id.clone());
                }
            }
        }

        tracing::debug!(
            tests = tests.len(),
            order_sets = order_sets.len(),
            categories = categories.len(),
            "Catalog built"
        );

        Ok(Catalog {
            tests,
            test_index,
            order_sets,
            order_set_index,
            diseases: tree,
            categories,
            needed_by,
        })
    }
}

/// Deduplicate `items` by key under `policy`, returning survivors and a key index.
fn register<T>(
    kind: &'static str,
    items: Vec<T>,
    key: impl Fn(&T) -> String,
    policy: DuplicatePolicy,
) -> Result<(Vec<T>, HashMap<String, usize>), CatalogError> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());

    for item in items {
        let id = key(&item);
        match index.get(&id) {
            None => {
                index.insert(id, kept.len());
                kept.push(item);
            }
            Some(&existing) => match policy {
                DuplicatePolicy::KeepFirst => {
                    tracing::warn!(kind, id = %id, "Duplicate catalog id ignored, earlier entry kept");
                }
                DuplicatePolicy::Replace => {
                    tracing::warn!(kind, id = %id, "Duplicate catalog id replaces earlier entry");
                    kept[existing] = item;
                }
                DuplicatePolicy::Reject => {
                    return Err(CatalogError::DuplicateId { kind, id });
                }
            },
        }
    }

    Ok((kept, index))
}

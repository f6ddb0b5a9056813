//! Order-set expansion: nested order sets plus direct test requests, flattened to test ids.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::models::OrderSet;

use super::EngineError;

/// Expand `order_set_ids` (recursively) and union with `test_ids`.
///
/// Direct test requests come first, then order-set contents in discovery order.
/// Ids unknown to the catalog are dropped. An order set reachable from itself is
/// `EngineError::OrderSetCycle`; an order set reached twice by different routes is not.
pub fn expand_order_sets<S: AsRef<str>, T: AsRef<str>>(
    order_set_ids: &[S],
    test_ids: &[T],
    catalog: &Catalog,
) -> Result<Vec<String>, EngineError> {
    let mut expansion = Expansion {
        catalog,
        seen_tests: HashSet::new(),
        expanded_sets: HashSet::new(),
        path: Vec::new(),
        tests: Vec::new(),
    };

    for id in test_ids {
        let id = id.as_ref();
        if catalog.test(id).is_some() {
            expansion.push_test(id);
        } else {
            tracing::debug!(test_id = id, "Unknown test id dropped");
        }
    }

    for id in order_set_ids {
        match catalog.order_set(id.as_ref()) {
            Some(order_set) => expansion.expand(order_set)?,
            None => tracing::debug!(order_set = id.as_ref(), "Unknown order set dropped"),
        }
    }

    Ok(expansion.tests)
}

struct Expansion<'a> {
    catalog: &'a Catalog,
    seen_tests: HashSet<String>,
    expanded_sets: HashSet<String>,
    /// Order sets currently being expanded, outermost first.
    path: Vec<String>,
    tests: Vec<String>,
}

impl Expansion<'_> {
    fn push_test(&mut self, id: &str) {
        if self.seen_tests.insert(id.to_string()) {
            self.tests.push(id.to_string());
        }
    }

    fn expand(&mut self, order_set: &OrderSet) -> Result<(), EngineError> {
        if let Some(pos) = self.path.iter().position(|id| id == &order_set.id) {
            let mut cycle = self.path[pos..].to_vec();
            cycle.push(order_set.id.clone());
            return Err(EngineError::OrderSetCycle { path: cycle });
        }
        if self.expanded_sets.contains(&order_set.id) {
            return Ok(());
        }

        self.path.push(order_set.id.clone());
        let catalog = self.catalog;
        for component in &order_set.components {
            if let Some(nested) = catalog.order_set(component) {
                self.expand(nested)?;
            } else if catalog.test(component).is_some() {
                self.push_test(component);
            } else {
                tracing::debug!(
                    order_set = %order_set.id,
                    component = %component,
                    "Unknown order set component dropped"
                );
            }
        }
        self.path.pop();
        self.expanded_sets.insert(order_set.id.clone());
        Ok(())
    }
}

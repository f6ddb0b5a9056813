//! Dependency graph over requested tests, flattened into an execution order.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::models::TestDefinition;

use super::EngineError;

/// Order `requested` so each derived test follows everything it requires.
///
/// Requirements are resolved against the whole catalog, so a prerequisite that was
/// not requested is still computed. Each test appears once, at its first position.
/// Circular `requires` chains are reported as `EngineError::DependencyCycle`.
pub fn order_by_dependency<S: AsRef<str>>(
    requested: &[S],
    catalog: &Catalog,
) -> Result<Vec<String>, EngineError> {
    let mut resolver = Resolver {
        catalog,
        requested: requested.iter().map(AsRef::as_ref).collect(),
        path: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };

    for id in requested {
        let Some(test) = catalog.test(id.as_ref()) else {
            tracing::debug!(test_id = id.as_ref(), "Unknown test id skipped in dependency graph");
            continue;
        };
        resolver.visit(test)?;
    }
    Ok(resolver.order)
}

/// Depth-first post-order walk. A test is emitted once all of its edges are.
struct Resolver<'a> {
    catalog: &'a Catalog,
    requested: HashSet<&'a str>,
    /// Tests currently being resolved, outermost first.
    path: Vec<String>,
    /// Tests already emitted; their subgraphs are never walked again.
    done: HashSet<String>,
    order: Vec<String>,
}

impl Resolver<'_> {
    fn visit(&mut self, test: &TestDefinition) -> Result<(), EngineError> {
        if self.done.contains(&test.id) {
            return Ok(());
        }
        if let Some(pos) = self.path.iter().position(|id| id == &test.id) {
            let mut cycle = self.path[pos..].to_vec();
            cycle.push(test.id.clone());
            return Err(EngineError::DependencyCycle { path: cycle });
        }
        self.path.push(test.id.clone());

        for required in test.generate.requires() {
            match self.catalog.test(required) {
                Some(dep) => self.visit(dep)?,
                None => tracing::debug!(
                    test_id = %test.id,
                    required = %required,
                    "Required test missing from catalog"
                ),
            }
        }

        // A defaulted input that was also requested must be computed first, otherwise
        // the default would be used in place of the real value.
        for (default_id, _) in test.generate.defaults() {
            let is_requirement = test.generate.requires().contains(default_id);
            if is_requirement || !self.requested.contains(default_id.as_str()) {
                continue;
            }
            if let Some(dep) = self.catalog.test(default_id) {
                self.visit_soft(&test.id, dep)?;
            }
        }

        self.path.pop();
        self.done.insert(test.id.clone());
        self.order.push(test.id.clone());
        Ok(())
    }

    /// Follow a `defaults` edge. If it would close a cycle the edge is dropped and
    /// the default value stands in; everything the attempt emitted is rolled back.
    fn visit_soft(&mut self, from: &str, dep: &TestDefinition) -> Result<(), EngineError> {
        let depth = self.path.len();
        let emitted = self.order.len();
        match self.visit(dep) {
            Err(EngineError::DependencyCycle { path }) => {
                tracing::debug!(
                    test_id = from,
                    default_input = %dep.id,
                    cycle = ?path,
                    "Defaulted input would close a cycle; default used"
                );
                self.path.truncate(depth);
                for id in self.order.drain(emitted..) {
                    self.done.remove(&id);
                }
                Ok(())
            }
            other => other,
        }
    }
}

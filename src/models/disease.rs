use std::fmt;
use std::sync::Arc;

use super::enums::GenerateMethod;
use super::lab::{CalculationError, LabReport, TestValue};
use super::lab_test::CalculateFn;
use super::patient::Patient;

/// Rewrites a mean or SD given the running `(mean, sd)`.
pub type ParamOverrideFn = Arc<dyn Fn(f64, f64, &Patient) -> f64 + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseNomenclature {
    pub long: String,
    pub short: String,
    pub description: String,
}

impl DiseaseNomenclature {
    pub fn new(long: &str, short: &str, description: &str) -> Self {
        Self {
            long: long.into(),
            short: short.into(),
            description: description.into(),
        }
    }
}

/// What an override does to its target test, tagged like `GenerationRule`.
#[derive(Clone)]
pub enum OverrideRule {
    Normal {
        mean: ParamOverrideFn,
        sd: ParamOverrideFn,
    },
    /// Recomputed against a scratch report that already holds the un-overridden value.
    Derived { calculate: CalculateFn },
    /// Written straight into the live report.
    Static { result: CalculateFn },
    /// One of `options`, drawn from the pass's sampler. Chains like `Static`.
    Pick { options: Vec<TestValue> },
}

impl OverrideRule {
    pub fn method(&self) -> GenerateMethod {
        match self {
            Self::Normal { .. } => GenerateMethod::Normal,
            Self::Derived { .. } => GenerateMethod::Derived,
            Self::Static { .. } | Self::Pick { .. } => GenerateMethod::Static,
        }
    }
}

#[derive(Clone)]
pub struct TestOverride {
    pub test_id: String,
    pub rule: OverrideRule,
}

impl TestOverride {
    pub fn normal(
        test_id: &str,
        mean: impl Fn(f64, f64, &Patient) -> f64 + Send + Sync + 'static,
        sd: impl Fn(f64, f64, &Patient) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            rule: OverrideRule::Normal {
                mean: Arc::new(mean),
                sd: Arc::new(sd),
            },
        }
    }

    /// Scale the mean, keep the SD.
    pub fn scale_mean(test_id: &str, factor: f64) -> Self {
        Self::normal(test_id, move |m, _, _| m * factor, |_, sd, _| sd)
    }

    pub fn derived(
        test_id: &str,
        calculate: impl Fn(&LabReport, &Patient) -> Result<TestValue, CalculationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            rule: OverrideRule::Derived {
                calculate: Arc::new(calculate),
            },
        }
    }

    pub fn static_result(
        test_id: &str,
        result: impl Fn(&LabReport, &Patient) -> Result<TestValue, CalculationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            rule: OverrideRule::Static {
                result: Arc::new(result),
            },
        }
    }

    /// Static override that draws one of `options` per pass.
    pub fn pick<V: Into<TestValue> + Clone>(test_id: &str, options: &[V]) -> Self {
        Self {
            test_id: test_id.into(),
            rule: OverrideRule::Pick {
                options: options.iter().cloned().map(Into::into).collect(),
            },
        }
    }
}

impl fmt::Debug for TestOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestOverride")
            .field("test_id", &self.test_id)
            .field("method", &self.rule.method())
            .finish()
    }
}

/// A condition that perturbs the generation of one or more tests.
#[derive(Debug, Clone)]
pub struct Disease {
    /// Dot-separated path in the disease tree, e.g. `cv.nstemi`.
    pub id: String,
    pub nomenclature: DiseaseNomenclature,
    pub test_overrides: Vec<TestOverride>,
}

impl Disease {
    pub fn new(id: &str, nomenclature: DiseaseNomenclature, test_overrides: Vec<TestOverride>) -> Self {
        Self {
            id: id.into(),
            nomenclature,
            test_overrides,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Disease tree
// ═══════════════════════════════════════════════════════════

/// Node in the disease hierarchy. Category nodes carry no disease.
#[derive(Debug, Clone, Default)]
pub struct DiseaseNode {
    pub id: String,
    pub children: Vec<DiseaseNode>,
    pub disease: Option<Arc<Disease>>,
}

impl DiseaseNode {
    pub fn root() -> Self {
        Self::default()
    }

    /// Walk `path` segment by segment; segments match case-insensitively.
    pub fn find(&self, path: &str) -> Option<&DiseaseNode> {
        path.split('.').try_fold(self, |node, segment| {
            node.children
                .iter()
                .find(|child| child.id.eq_ignore_ascii_case(segment))
        })
    }

    pub fn disease_at(&self, path: &str) -> Option<&Arc<Disease>> {
        self.find(path).and_then(|node| node.disease.as_ref())
    }

    /// Place `disease` at its own path, creating category nodes on the way.
    /// Returns the disease previously stored there, if any.
    pub fn insert(&mut self, disease: Arc<Disease>) -> Option<Arc<Disease>> {
        let mut node = self;
        for segment in disease.id.split('.') {
            let idx = match node.children.iter().position(|c| c.id == segment) {
                Some(idx) => idx,
                None => {
                    node.children.push(DiseaseNode {
                        id: segment.into(),
                        ..Default::default()
                    });
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }
        node.disease.replace(disease)
    }

    /// Every disease in the tree, depth first.
    pub fn diseases(&self) -> Vec<&Arc<Disease>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(d) = &node.disease {
                out.push(d);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

//! Query view over a generated report: unit conversion, result flags and
//! category grouping. Nothing here mutates the working report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::DEFAULT_UNITS;
use crate::models::{DisplayRule, FlagLimits, LabReport, Patient, ResultFlag, TestValue};

// ═══════════════════════════════════════════════════════════
// View types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Restrict the view to these ids; `None` returns every requested test.
    pub lab_ids: Option<Vec<String>>,
    /// Unit-system name, matched against each test's renderings.
    pub units: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            lab_ids: None,
            units: DEFAULT_UNITS.into(),
        }
    }
}

impl FetchOptions {
    pub fn with_units(units: &str) -> Self {
        Self {
            units: units.into(),
            ..Self::default()
        }
    }

    pub fn only<S: AsRef<str>>(mut self, lab_ids: &[S]) -> Self {
        self.lab_ids = Some(lab_ids.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNomenclature {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDisplay {
    pub unit_display: String,
    pub precision: u8,
    pub flag: ResultFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultWithMetadata {
    /// Converted to the selected unit system.
    pub value: TestValue,
    /// `"number"` or `"string"`.
    pub value_type: String,
    pub nomenclature: ResultNomenclature,
    pub display: ResultDisplay,
}

impl TestResultWithMetadata {
    /// Value rounded to the display precision, followed by the unit and flag marker.
    pub fn formatted(&self) -> String {
        let value = match &self.value {
            TestValue::Number(n) => format!("{:.*}", usize::from(self.display.precision), n),
            TestValue::Text(s) => s.clone(),
        };
        [
            value.as_str(),
            self.display.unit_display.as_str(),
            self.display.flag.symbol(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithTests {
    /// Empty for tests whose category is not in the catalog.
    pub name: String,
    pub test_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullTestResult {
    pub tests: BTreeMap<String, TestResultWithMetadata>,
    /// Sorted by category sort index; ids within by order in category.
    pub categories: Vec<CategoryWithTests>,
}

impl FullTestResult {
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ═══════════════════════════════════════════════════════════
// Flags
// ═══════════════════════════════════════════════════════════

/// Flag `value` under `rule`. Text values under a limits rule are `Normal`.
pub fn compute_flag(rule: &DisplayRule, value: &TestValue, patient: &Patient) -> ResultFlag {
    match rule {
        DisplayRule::Computed(f) => f(value, patient),
        DisplayRule::Limits(limits) => match value {
            TestValue::Number(n) => flag_from_limits(*n, limits, patient),
            TestValue::Text(_) => ResultFlag::Normal,
        },
    }
}

/// Low limits are checked before high ones, critical before plain.
fn flag_from_limits(value: f64, limits: &FlagLimits, patient: &Patient) -> ResultFlag {
    if limits
        .critical_low
        .as_ref()
        .is_some_and(|f| value <= f(patient))
    {
        ResultFlag::CriticalLow
    } else if value <= (limits.low)(patient) {
        ResultFlag::Low
    } else if limits
        .critical_high
        .as_ref()
        .is_some_and(|f| value >= f(patient))
    {
        ResultFlag::CriticalHigh
    } else if value >= (limits.high)(patient) {
        ResultFlag::High
    } else {
        ResultFlag::Normal
    }
}

// ═══════════════════════════════════════════════════════════
// View assembly
// ═══════════════════════════════════════════════════════════

struct CategoryBucket {
    name: String,
    sort_index: u32,
    tests: Vec<(u32, String)>,
}

/// Build the view of `ids` from `report`.
///
/// Ids missing from the report or the catalog, and tests without a rendering
/// for `units`, are left out.
pub fn build_view<S: AsRef<str>>(
    catalog: &Catalog,
    report: &LabReport,
    ids: &[S],
    patient: &Patient,
    units: &str,
) -> FullTestResult {
    let mut tests = BTreeMap::new();
    let mut buckets: Vec<CategoryBucket> = Vec::new();

    for id in ids {
        let id = id.as_ref();
        let (Some(value), Some(test)) = (report.get(id), catalog.test(id)) else {
            continue;
        };
        let Some(unit) = test.display.unit_for(units) else {
            tracing::debug!(test_id = id, units, "No unit rendering for unit system");
            continue;
        };
        if tests.contains_key(id) {
            continue;
        }

        let converted = (unit.convert)(value);
        tests.insert(
            id.to_string(),
            TestResultWithMetadata {
                value_type: converted.value_type().into(),
                value: converted,
                nomenclature: ResultNomenclature {
                    short: test.nomenclature.short.clone(),
                    long: test.nomenclature.long.clone(),
                },
                display: ResultDisplay {
                    unit_display: unit.unit_display.clone(),
                    precision: unit.precision,
                    flag: compute_flag(&test.display.rule, value, patient),
                },
            },
        );

        let (name, sort_index) = match catalog.category(&test.nomenclature.category) {
            Some(category) => (category.name.clone(), category.sort_index),
            None => (String::new(), u32::MAX),
        };
        let entry = (test.nomenclature.order_in_category, id.to_string());
        match buckets.iter_mut().find(|b| b.name == name) {
            Some(bucket) => bucket.tests.push(entry),
            None => buckets.push(CategoryBucket {
                name,
                sort_index,
                tests: vec![entry],
            }),
        }
    }

    buckets.sort_by_key(|b| b.sort_index);
    let categories = buckets
        .into_iter()
        .map(|mut bucket| {
            bucket.tests.sort_by_key(|(order, _)| *order);
            CategoryWithTests {
                name: bucket.name,
                test_ids: bucket.tests.into_iter().map(|(_, id)| id).collect(),
            }
        })
        .collect();

    FullTestResult { tests, categories }
}

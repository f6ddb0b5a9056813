//! Report generator: request bookkeeping around the generation engine, the
//! query view, and single-test updates that cascade to dependents.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};
use crate::config::GeneratorConfig;
use crate::engine::{
    compose_overrides, expand_order_sets, order_by_dependency, EngineError, GenerationEngine,
    OverrideMap, Sampler,
};
use crate::models::{Disease, LabReport, Patient, TestValue};
use crate::report::{build_view, FetchOptions, FullTestResult};

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Generation error: {0}")]
    Engine(#[from] EngineError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// One patient's lab report: what was requested, under which diseases, and
/// the values of the last successful generation pass.
pub struct LabReportGenerator {
    catalog: Arc<Catalog>,
    config: GeneratorConfig,
    sampler: Sampler,
    patient: Patient,
    requested_tests: Vec<String>,
    requested_order_sets: Vec<String>,
    diseases: Vec<Arc<Disease>>,
    /// Every computed value, including prerequisites nobody asked for.
    report: LabReport,
    /// Expanded ids of the tests actually requested in the last pass.
    requested_result_ids: Vec<String>,
    generated_at: Option<DateTime<Utc>>,
}

impl LabReportGenerator {
    pub fn new(catalog: Arc<Catalog>, patient: Patient, config: GeneratorConfig) -> Self {
        Self {
            catalog,
            sampler: Sampler::from_seed_option(config.seed),
            config,
            patient,
            requested_tests: Vec::new(),
            requested_order_sets: Vec::new(),
            diseases: Vec::new(),
            report: LabReport::new(),
            requested_result_ids: Vec::new(),
            generated_at: None,
        }
    }

    /// Generator over the built-in catalog, for the default patient.
    pub fn builtin(config: GeneratorConfig) -> Result<Self, LabError> {
        let catalog = CatalogBuilder::builtin()
            .duplicate_policy(config.duplicate_policy)
            .build()?;
        Ok(Self::new(Arc::new(catalog), Patient::default(), config))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn patient(&self) -> &Patient {
        &self.patient
    }

    /// Takes effect on the next generation or update.
    pub fn set_patient(&mut self, patient: Patient) {
        self.patient = patient;
    }

    pub fn report(&self) -> &LabReport {
        &self.report
    }

    pub fn requested_result_ids(&self) -> &[String] {
        &self.requested_result_ids
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    // ═══════════════════════════════════════════════════════════
    // Requested tests
    // ═══════════════════════════════════════════════════════════

    pub fn requested_tests(&self) -> &[String] {
        &self.requested_tests
    }

    /// Ids match case-insensitively; unknown ids and repeats are ignored.
    pub fn add_requested_tests<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            match self.catalog.find_test(id.as_ref()) {
                Some(test) => push_unique(&mut self.requested_tests, &test.id),
                None => tracing::debug!(test_id = id.as_ref(), "Unknown test not requested"),
            }
        }
    }

    pub fn remove_requested_tests<S: AsRef<str>>(&mut self, ids: &[S]) {
        remove_matching(&mut self.requested_tests, ids);
    }

    pub fn clear_requested_tests(&mut self) {
        self.requested_tests.clear();
    }

    pub fn set_requested_tests<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.clear_requested_tests();
        self.add_requested_tests(ids);
    }

    // ═══════════════════════════════════════════════════════════
    // Requested order sets
    // ═══════════════════════════════════════════════════════════

    pub fn requested_order_sets(&self) -> &[String] {
        &self.requested_order_sets
    }

    pub fn add_requested_order_sets<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            match self.catalog.find_order_set(id.as_ref()) {
                Some(order_set) => push_unique(&mut self.requested_order_sets, &order_set.id),
                None => tracing::debug!(order_set = id.as_ref(), "Unknown order set not requested"),
            }
        }
    }

    pub fn remove_requested_order_sets<S: AsRef<str>>(&mut self, ids: &[S]) {
        remove_matching(&mut self.requested_order_sets, ids);
    }

    pub fn clear_requested_order_sets(&mut self) {
        self.requested_order_sets.clear();
    }

    pub fn set_requested_order_sets<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.clear_requested_order_sets();
        self.add_requested_order_sets(ids);
    }

    // ═══════════════════════════════════════════════════════════
    // Diseases
    // ═══════════════════════════════════════════════════════════

    /// Active disease paths, in application order.
    pub fn diseases(&self) -> Vec<&str> {
        self.diseases.iter().map(|d| d.id.as_str()).collect()
    }

    /// Paths resolve through the disease tree. Overrides apply in the order added.
    pub fn add_diseases<S: AsRef<str>>(&mut self, paths: &[S]) {
        for path in paths {
            let Some(disease) = self.catalog.find_disease_by_path(path.as_ref()) else {
                tracing::debug!(disease = path.as_ref(), "Unknown disease path ignored");
                continue;
            };
            if !self.diseases.iter().any(|d| Arc::ptr_eq(d, disease)) {
                self.diseases.push(Arc::clone(disease));
            }
        }
    }

    pub fn remove_diseases<S: AsRef<str>>(&mut self, paths: &[S]) {
        self.diseases.retain(|d| {
            !paths
                .iter()
                .any(|p| p.as_ref().eq_ignore_ascii_case(&d.id))
        });
    }

    pub fn clear_diseases(&mut self) {
        self.diseases.clear();
    }

    pub fn set_diseases<S: AsRef<str>>(&mut self, paths: &[S]) {
        self.clear_diseases();
        self.add_diseases(paths);
    }

    fn overrides(&self) -> OverrideMap {
        compose_overrides(self.diseases.iter().map(Arc::as_ref))
    }

    // ═══════════════════════════════════════════════════════════
    // Generation & queries
    // ═══════════════════════════════════════════════════════════

    /// Run a full pass from an empty report.
    ///
    /// On failure the previous report is kept untouched.
    pub fn generate_lab_report(&mut self) -> Result<&LabReport, LabError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_lab_report", run_id = %run_id);
        let _guard = span.enter();
        let started = Utc::now();

        let expanded = expand_order_sets(
            &self.requested_order_sets,
            &self.requested_tests,
            &self.catalog,
        )?;
        let ordered = order_by_dependency(&expanded, &self.catalog)?;
        let overrides = self.overrides();
        let engine = GenerationEngine::new(&self.catalog, &self.patient, &overrides);
        let report = engine.generate(&ordered, LabReport::new(), &mut self.sampler)?;

        let finished = Utc::now();
        tracing::info!(
            requested = expanded.len(),
            computed = report.len(),
            diseases = self.diseases.len(),
            elapsed_ms = (finished - started).num_milliseconds(),
            "Lab report generated"
        );

        self.report = report;
        self.requested_result_ids = expanded;
        self.generated_at = Some(finished);
        Ok(&self.report)
    }

    /// Requested results, optionally narrowed to `options.lab_ids`, rendered in
    /// `options.units`. Prerequisites computed only as inputs are not included.
    pub fn fetch_lab_report(&self, options: &FetchOptions) -> FullTestResult {
        let ids: Vec<&str> = match &options.lab_ids {
            Some(wanted) => wanted
                .iter()
                .map(String::as_str)
                .filter(|id| self.requested_result_ids.iter().any(|r| r == id))
                .collect(),
            None => self.requested_result_ids.iter().map(String::as_str).collect(),
        };
        build_view(&self.catalog, &self.report, &ids, &self.patient, &options.units)
    }

    /// `fetch_lab_report` in the configured unit system.
    pub fn fetch_default(&self) -> FullTestResult {
        self.fetch_lab_report(&FetchOptions::with_units(&self.config.units))
    }

    /// Set `test_id` to `value`, or regenerate it (with overrides) when `None`,
    /// then regenerate every test that transitively depends on it.
    ///
    /// Returns the updated id followed by its dependents in recomputation order;
    /// empty for an unknown id. On error the report is left as it was.
    pub fn update_single_test(
        &mut self,
        test_id: &str,
        value: Option<TestValue>,
    ) -> Result<Vec<String>, LabError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(test) = catalog.find_test(test_id) else {
            tracing::debug!(test_id, "Update for unknown test ignored");
            return Ok(Vec::new());
        };

        let overrides = self.overrides();
        let engine = GenerationEngine::new(&catalog, &self.patient, &overrides);
        let mut report = self.report.clone();

        match value {
            Some(value) => report.insert(test.id.as_str(), value),
            None => {
                engine.compute_single(test, &mut report, &mut self.sampler)?;
            }
        }

        let dependents = catalog.transitive_dependents(&test.id);
        let pending: HashSet<&str> = dependents.iter().map(String::as_str).collect();
        let mut affected = vec![test.id.clone()];
        for id in order_by_dependency(&dependents, &catalog)? {
            let Some(dependent) = catalog.test(&id) else {
                continue;
            };
            if pending.contains(id.as_str()) {
                engine.compute_single(dependent, &mut report, &mut self.sampler)?;
                affected.push(id);
            } else if !report.contains(&id) {
                // Input of a dependent that no earlier pass produced.
                engine.compute_single(dependent, &mut report, &mut self.sampler)?;
            }
        }

        tracing::info!(
            test_id = %test.id,
            dependents = affected.len() - 1,
            "Single test updated"
        );
        self.report = report;
        Ok(affected)
    }

    /// `update_single_test`, then the view of the affected requested tests.
    pub fn update_and_fetch_single_test(
        &mut self,
        test_id: &str,
        value: Option<TestValue>,
        units: Option<&str>,
    ) -> Result<FullTestResult, LabError> {
        let affected = self.update_single_test(test_id, value)?;
        let units = units.unwrap_or(&self.config.units);
        Ok(self.fetch_lab_report(&FetchOptions::with_units(units).only(&affected)))
    }
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}

fn remove_matching<S: AsRef<str>>(list: &mut Vec<String>, ids: &[S]) {
    list.retain(|existing| !ids.iter().any(|id| id.as_ref().eq_ignore_ascii_case(existing)));
}

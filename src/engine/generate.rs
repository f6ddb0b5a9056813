//! Per-test generation: strategy dispatch with disease overrides folded in.

use std::borrow::Cow;

use crate::catalog::Catalog;
use crate::models::{
    CalculateFn, CalculationError, GenerationRule, LabReport, OverrideRule, ParamOverrideFn,
    Patient, TestDefinition, TestOverride, TestValue,
};

use super::overrides::OverrideMap;
use super::sampler::Sampler;
use super::EngineError;

/// Fold normal overrides over `(mean, sd)`.
///
/// Mean overrides run first, each seeing the running mean and the original SD.
/// SD overrides then run with the final mean and the running SD. Non-normal
/// overrides in `overrides` are skipped.
pub fn apply_normal_overrides(
    mean: f64,
    sd: f64,
    overrides: &[TestOverride],
    patient: &Patient,
) -> (f64, f64) {
    let params: Vec<(&ParamOverrideFn, &ParamOverrideFn)> = overrides
        .iter()
        .filter_map(|ov| match &ov.rule {
            OverrideRule::Normal { mean, sd } => Some((mean, sd)),
            _ => None,
        })
        .collect();

    let final_mean = params.iter().fold(mean, |m, (f, _)| f(m, sd, patient));
    let final_sd = params.iter().fold(sd, |s, (_, f)| f(final_mean, s, patient));
    (final_mean, final_sd)
}

/// Computes tests in a given order against one patient and one set of overrides.
pub struct GenerationEngine<'a> {
    catalog: &'a Catalog,
    patient: &'a Patient,
    overrides: &'a OverrideMap,
}

impl<'a> GenerationEngine<'a> {
    pub fn new(catalog: &'a Catalog, patient: &'a Patient, overrides: &'a OverrideMap) -> Self {
        Self {
            catalog,
            patient,
            overrides,
        }
    }

    /// Fill `seed` with every test of `ordered` it does not already hold.
    ///
    /// `ordered` must already respect dependencies (see `order_by_dependency`).
    /// Values present in `seed` are kept as they are. The first failing test
    /// aborts the pass.
    pub fn generate<S: AsRef<str>>(
        &self,
        ordered: &[S],
        seed: LabReport,
        sampler: &mut Sampler,
    ) -> Result<LabReport, EngineError> {
        let mut report = seed;
        for id in ordered {
            let id = id.as_ref();
            if report.contains(id) {
                continue;
            }
            let Some(test) = self.catalog.test(id) else {
                tracing::debug!(test_id = id, "Unknown test id skipped during generation");
                continue;
            };
            self.compute_single(test, &mut report, sampler)?;
        }
        Ok(report)
    }

    /// Compute `test` against `report`, store the value and return it.
    /// An existing value for the test is replaced.
    pub fn compute_single(
        &self,
        test: &TestDefinition,
        report: &mut LabReport,
        sampler: &mut Sampler,
    ) -> Result<TestValue, EngineError> {
        let overrides = self.overrides_for(test);
        let patient = self.patient;
        let calc_err = |source: CalculationError| EngineError::Calculation {
            test_id: test.id.clone(),
            source,
        };

        let value = match &test.generate {
            GenerationRule::Normal {
                mean,
                sd,
                allow_negative,
            } => {
                let (mean, sd) = apply_normal_overrides(
                    mean(patient, &*report),
                    sd(patient, &*report),
                    overrides,
                    patient,
                );
                TestValue::Number(sampler.sample(mean, sd, *allow_negative)?)
            }
            GenerationRule::Derived {
                defaults,
                calculate,
                ..
            } => {
                let inputs = with_defaults(report, defaults);
                let value = calculate(&inputs, patient).map_err(calc_err)?;
                let chain: Vec<&CalculateFn> = overrides
                    .iter()
                    .filter_map(|ov| match &ov.rule {
                        OverrideRule::Derived { calculate } => Some(calculate),
                        _ => None,
                    })
                    .collect();
                if chain.is_empty() {
                    value
                } else {
                    // Each override reads its predecessor's value from a scratch copy.
                    let mut scratch = inputs.into_owned();
                    chain.into_iter().try_fold(value, |value, f| {
                        scratch.insert(test.id.as_str(), value);
                        f(&scratch, patient).map_err(calc_err)
                    })?
                }
            }
            GenerationRule::Static { result } => {
                // Each override sees its predecessor's value in the live report.
                let mut chained: Option<TestValue> = None;
                for ov in overrides {
                    let step = match &ov.rule {
                        OverrideRule::Static { result } => {
                            if let Some(previous) = chained.take() {
                                report.insert(test.id.as_str(), previous);
                            }
                            result(&*report, patient).map_err(calc_err)?
                        }
                        OverrideRule::Pick { options } => {
                            let Some(value) = sampler.pick(options.as_slice()) else {
                                return Err(calc_err(CalculationError::Invalid(
                                    "no options to pick from".into(),
                                )));
                            };
                            value.clone()
                        }
                        _ => continue,
                    };
                    chained = Some(step);
                }
                match chained {
                    Some(value) => value,
                    None => result(&*report, patient).map_err(calc_err)?,
                }
            }
        };

        tracing::trace!(test_id = %test.id, value = %value, "Test computed");
        report.insert(test.id.as_str(), value.clone());
        Ok(value)
    }

    /// Overrides targeting `test`; those of another strategy are reported and ignored.
    fn overrides_for(&self, test: &TestDefinition) -> &'a [TestOverride] {
        let Some(overrides) = self.overrides.get(&test.id) else {
            return &[];
        };
        let method = test.generate.method();
        for ov in overrides.iter().filter(|ov| ov.rule.method() != method) {
            tracing::warn!(
                test_id = %test.id,
                test_method = %method,
                override_method = %ov.rule.method(),
                "Override does not match the test's generation method; ignored"
            );
        }
        overrides
    }
}

/// `report` with every missing defaulted input filled in. Borrows when nothing is missing.
fn with_defaults<'r>(report: &'r LabReport, defaults: &[(String, TestValue)]) -> Cow<'r, LabReport> {
    let mut inputs = Cow::Borrowed(report);
    for (id, value) in defaults {
        if !inputs.contains(id) {
            inputs.to_mut().insert(id.as_str(), value.clone());
        }
    }
    inputs
}

//! Per-test override lists composed from the active diseases.

use std::collections::HashMap;

use crate::models::{Disease, TestOverride};

/// Test id to the overrides targeting it, in disease order then declaration order.
pub type OverrideMap = HashMap<String, Vec<TestOverride>>;

/// Group every override of `diseases` by target test.
///
/// Order matters: overrides are applied as a fold, so swapping two diseases that
/// touch the same test swaps the order of their entries.
pub fn compose_overrides<'a>(diseases: impl IntoIterator<Item = &'a Disease>) -> OverrideMap {
    let mut map = OverrideMap::new();
    for disease in diseases {
        for ov in &disease.test_overrides {
            map.entry(ov.test_id.clone()).or_default().push(ov.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiseaseNomenclature, OverrideRule, Patient};

    fn disease(id: &str, overrides: Vec<TestOverride>) -> Disease {
        Disease::new(id, DiseaseNomenclature::new(id, id, ""), overrides)
    }

    fn applied_mean(ov: &TestOverride, mean: f64) -> f64 {
        match &ov.rule {
            OverrideRule::Normal { mean: f, .. } => f(mean, 1.0, &Patient::default()),
            _ => panic!("expected normal override"),
        }
    }

    #[test]
    fn groups_by_test_in_disease_order() {
        let a = disease(
            "a",
            vec![
                TestOverride::scale_mean("hstnt", 2.0),
                TestOverride::scale_mean("neut", 1.5),
            ],
        );
        let b = disease("b", vec![TestOverride::scale_mean("hstnt", 10.0)]);

        let map = compose_overrides([&a, &b]);
        assert_eq!(map.len(), 2);
        let hstnt = &map["hstnt"];
        assert_eq!(hstnt.len(), 2);
        assert_eq!(applied_mean(&hstnt[0], 1.0), 2.0);
        assert_eq!(applied_mean(&hstnt[1], 1.0), 10.0);

        let swapped = compose_overrides([&b, &a]);
        assert_eq!(applied_mean(&swapped["hstnt"][0], 1.0), 10.0);
        assert_eq!(applied_mean(&swapped["hstnt"][1], 1.0), 2.0);
    }

    #[test]
    fn no_diseases_no_overrides() {
        let map = compose_overrides(std::iter::empty::<&Disease>());
        assert!(map.is_empty());
    }

    #[test]
    fn builtin_diseases_compose() {
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        let nstemi = catalog.find_disease_by_path("cv.nstemi").unwrap();
        let chf = catalog.find_disease_by_path("cv.chf").unwrap();
        let map = compose_overrides([nstemi.as_ref(), chf.as_ref()]);
        assert_eq!(map["hstnt"].len(), 2);
        assert_eq!(map["neut"].len(), 1);
        assert_eq!(map["bnp"].len(), 1);
    }
}

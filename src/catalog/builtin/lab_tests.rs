//! Built-in lab tests. Values are stored in SI units; `conventional` (alias `us`)
//! renderings convert where the two systems differ.

use crate::models::{
    CalculationError, DisplayRule, FlagLimits, GenerationRule, Patient, ResultFlag,
    TestDefinition, TestDisplay, TestNomenclature, TestValue, UnitRendering,
};

use super::categories::{
    CARDIAC, CHEMISTRY, COAGULATION, HEMATOLOGY, HEPATIC, INFLAMMATORY, URINALYSIS,
};

const CONVENTIONAL: &[&str] = &["conventional", "us", "imperial"];

/// µmol/L creatinine per mg/dL.
const CREATININE_UMOL_PER_MG: f64 = 88.4;

fn by_sex(female: f64, male: f64) -> impl Fn(&Patient) -> f64 + Send + Sync + 'static {
    move |p| if p.is_female() { female } else { male }
}

fn numeric(
    id: &str,
    nomenclature: TestNomenclature,
    limits: FlagLimits,
    units: Vec<UnitRendering>,
    generate: GenerationRule,
) -> TestDefinition {
    TestDefinition::new(
        id,
        nomenclature,
        TestDisplay::new(DisplayRule::Limits(limits), units),
        generate,
    )
}

pub fn lab_tests() -> Vec<TestDefinition> {
    let mut tests = hematology();
    tests.extend(chemistry());
    tests.extend(coagulation());
    tests.extend(cardiac());
    tests.extend(hepatic());
    tests.extend(inflammatory());
    tests.extend(urinalysis());
    tests
}

// ═══════════════════════════════════════════════════════════
// Hematology
// ═══════════════════════════════════════════════════════════

fn hematology() -> Vec<TestDefinition> {
    let nom = |long: &str, short: &str, order| TestNomenclature::new(long, short, HEMATOLOGY, order);
    let count = || vec![UnitRendering::any("x10^9/L", 1)];

    vec![
        numeric(
            "wbc",
            nom("White Blood Cell Count", "WBC", 10),
            FlagLimits::fixed(4.0, 11.0).critical_low(1.0).critical_high(30.0),
            count(),
            GenerationRule::derived(&["neut", "lymph", "mono", "eosin", "baso"], |r, _| {
                let total: f64 = ["neut", "lymph", "mono", "eosin", "baso"]
                    .iter()
                    .map(|id| r.number_or(id, 0.0))
                    .sum();
                Ok(total.into())
            }),
        ),
        numeric(
            "rbc",
            nom("Red Blood Cell Count", "RBC", 20),
            FlagLimits::by_patient(by_sex(3.8, 4.3), by_sex(5.2, 5.9)),
            vec![UnitRendering::any("x10^12/L", 2)],
            GenerationRule::normal(|p, _| if p.is_female() { 4.4 } else { 5.0 }, |_, _| 0.3),
        ),
        numeric(
            "hgb",
            nom("Hemoglobin", "Hgb", 30),
            FlagLimits::by_patient(by_sex(120.0, 135.0), by_sex(160.0, 175.0)).critical_low(70.0),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "g/dL", 1, 0.1),
                UnitRendering::any("g/L", 0),
            ],
            GenerationRule::normal(
                |p, _| if p.is_female() { 135.0 } else { 150.0 },
                |_, _| 10.0,
            ),
        ),
        numeric(
            "hct",
            nom("Hematocrit", "Hct", 40),
            FlagLimits::by_patient(by_sex(0.36, 0.40), by_sex(0.46, 0.52)),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "%", 0, 100.0),
                UnitRendering::any("L/L", 2),
            ],
            GenerationRule::derived(&["hgb"], |r, _| Ok((r.require_number("hgb")? * 0.003).into())),
        ),
        numeric(
            "mcv",
            nom("Mean Corpuscular Volume", "MCV", 50),
            FlagLimits::fixed(80.0, 100.0),
            vec![UnitRendering::any("fL", 0)],
            GenerationRule::derived(&["hct", "rbc"], |r, _| {
                let rbc = r.require_number("rbc")?;
                if rbc <= 0.0 {
                    return Err(CalculationError::Invalid(format!("rbc must be positive, got {rbc}")));
                }
                Ok((r.require_number("hct")? / rbc * 1000.0).into())
            }),
        ),
        numeric(
            "rdw",
            nom("Red Cell Distribution Width", "RDW", 60),
            FlagLimits::fixed(11.5, 14.5),
            vec![UnitRendering::any("%", 1)],
            GenerationRule::fixed_normal(13.0, 0.8),
        ),
        numeric(
            "plts",
            nom("Platelets", "Plts", 70),
            FlagLimits::fixed(150.0, 400.0).critical_low(20.0).critical_high(1000.0),
            count(),
            GenerationRule::fixed_normal(250.0, 50.0),
        ),
        numeric(
            "neut",
            nom("Neutrophils", "Neut", 80),
            FlagLimits::fixed(2.0, 7.5).critical_low(0.5),
            count(),
            GenerationRule::fixed_normal(4.0, 1.0),
        ),
        numeric(
            "lymph",
            nom("Lymphocytes", "Lymph", 90),
            FlagLimits::fixed(1.0, 4.0),
            count(),
            GenerationRule::fixed_normal(2.0, 0.5),
        ),
        numeric(
            "mono",
            nom("Monocytes", "Mono", 100),
            FlagLimits::fixed(0.2, 1.0),
            count(),
            GenerationRule::fixed_normal(0.5, 0.15),
        ),
        numeric(
            "eosin",
            nom("Eosinophils", "Eos", 110),
            FlagLimits::fixed(0.0, 0.5),
            vec![UnitRendering::any("x10^9/L", 2)],
            GenerationRule::fixed_normal(0.2, 0.08),
        ),
        numeric(
            "baso",
            nom("Basophils", "Baso", 120),
            FlagLimits::fixed(0.0, 0.1),
            vec![UnitRendering::any("x10^9/L", 2)],
            GenerationRule::fixed_normal(0.05, 0.02),
        ),
    ]
}

// ═══════════════════════════════════════════════════════════
// Chemistry
// ═══════════════════════════════════════════════════════════

/// CKD-EPI 2021 race-free eGFR (mL/min/1.73m²) from creatinine in µmol/L.
pub fn ckd_epi_2021(creatinine_umol: f64, patient: &Patient) -> f64 {
    let scr = creatinine_umol / CREATININE_UMOL_PER_MG;
    let (kappa, alpha, sex_factor) = if patient.is_female() {
        (0.7, -0.241, 1.012)
    } else {
        (0.9, -0.302, 1.0)
    };
    let ratio = scr / kappa;
    142.0
        * ratio.min(1.0).powf(alpha)
        * ratio.max(1.0).powf(-1.200)
        * 0.9938_f64.powf(patient.age)
        * sex_factor
}

fn chemistry() -> Vec<TestDefinition> {
    let nom = |long: &str, short: &str, order| TestNomenclature::new(long, short, CHEMISTRY, order);
    let mmol = |precision| vec![UnitRendering::any("mmol/L", precision)];

    vec![
        numeric(
            "na",
            nom("Sodium", "Na", 10),
            FlagLimits::fixed(135.0, 145.0).critical_low(120.0).critical_high(160.0),
            mmol(0),
            GenerationRule::fixed_normal(140.0, 2.0),
        ),
        numeric(
            "cl",
            nom("Chloride", "Cl", 20),
            FlagLimits::fixed(98.0, 106.0),
            mmol(0),
            GenerationRule::fixed_normal(103.0, 2.0),
        ),
        numeric(
            "k",
            nom("Potassium", "K", 30),
            FlagLimits::fixed(3.5, 5.0).critical_low(2.5).critical_high(6.5),
            mmol(1),
            GenerationRule::fixed_normal(4.2, 0.3),
        ),
        numeric(
            "hco3",
            nom("Bicarbonate", "HCO3", 40),
            FlagLimits::fixed(22.0, 29.0).critical_low(10.0),
            mmol(0),
            GenerationRule::fixed_normal(25.0, 2.0),
        ),
        numeric(
            "ag",
            nom("Anion Gap", "AG", 50),
            FlagLimits::fixed(6.0, 16.0),
            mmol(0),
            GenerationRule::derived(&["na", "cl", "hco3"], |r, _| {
                let gap = r.require_number("na")?
                    - (r.require_number("cl")? + r.require_number("hco3")?);
                Ok(gap.into())
            }),
        ),
        numeric(
            "bun",
            nom("Urea", "BUN", 60),
            FlagLimits::fixed(2.5, 7.1),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "mg/dL", 0, 2.8),
                UnitRendering::any("mmol/L", 1),
            ],
            GenerationRule::fixed_normal(5.0, 1.2),
        ),
        numeric(
            "cr",
            nom("Creatinine", "Cr", 70),
            FlagLimits::by_patient(by_sex(45.0, 60.0), by_sex(90.0, 110.0)),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "mg/dL", 2, 1.0 / CREATININE_UMOL_PER_MG),
                UnitRendering::any("umol/L", 0),
            ],
            GenerationRule::normal(
                |p, _| if p.is_female() { 70.0 } else { 85.0 },
                |_, _| 10.0,
            ),
        ),
        numeric(
            "gfr",
            nom("Estimated GFR", "eGFR", 80),
            FlagLimits::fixed(60.0, f64::INFINITY).critical_low(15.0),
            vec![UnitRendering::any("mL/min/1.73m2", 0)],
            GenerationRule::derived(&["cr"], |r, p| {
                Ok(ckd_epi_2021(r.require_number("cr")?, p).into())
            }),
        ),
        numeric(
            "gluc",
            nom("Glucose", "Gluc", 90),
            FlagLimits::fixed(3.9, 7.8).critical_low(2.5).critical_high(25.0),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "mg/dL", 0, 18.0),
                UnitRendering::any("mmol/L", 1),
            ],
            GenerationRule::fixed_normal(5.5, 0.8),
        ),
    ]
}

// ═══════════════════════════════════════════════════════════
// Coagulation, cardiac, hepatic, inflammatory
// ═══════════════════════════════════════════════════════════

fn coagulation() -> Vec<TestDefinition> {
    vec![
        numeric(
            "inr",
            TestNomenclature::new("International Normalized Ratio", "INR", COAGULATION, 10),
            FlagLimits::fixed(0.8, 1.2).critical_high(5.0),
            vec![UnitRendering::any("", 1)],
            GenerationRule::fixed_normal(1.0, 0.08),
        ),
        numeric(
            "ptt",
            TestNomenclature::new("Partial Thromboplastin Time", "PTT", COAGULATION, 20),
            FlagLimits::fixed(25.0, 35.0).critical_high(100.0),
            vec![UnitRendering::any("s", 0)],
            GenerationRule::fixed_normal(30.0, 3.0),
        ),
    ]
}

fn cardiac() -> Vec<TestDefinition> {
    vec![
        numeric(
            "hstnt",
            TestNomenclature::new("High-Sensitivity Troponin T", "hsTnT", CARDIAC, 10),
            FlagLimits::by_patient(|_| 0.0, by_sex(9.0, 16.0)).critical_high(100.0),
            vec![UnitRendering::any("ng/L", 0)],
            GenerationRule::fixed_normal(6.0, 3.0),
        ),
        numeric(
            "bnp",
            TestNomenclature::new("B-type Natriuretic Peptide", "BNP", CARDIAC, 20),
            FlagLimits::fixed(0.0, 100.0),
            vec![UnitRendering::any("pg/mL", 0)],
            GenerationRule::fixed_normal(50.0, 30.0),
        ),
        numeric(
            "ck",
            TestNomenclature::new("Creatine Kinase", "CK", CARDIAC, 30),
            FlagLimits::fixed(30.0, 200.0).critical_high(5000.0),
            vec![UnitRendering::any("U/L", 0)],
            GenerationRule::fixed_normal(100.0, 40.0),
        ),
    ]
}

fn hepatic() -> Vec<TestDefinition> {
    let nom = |long: &str, short: &str, order| TestNomenclature::new(long, short, HEPATIC, order);
    let enzyme = || vec![UnitRendering::any("U/L", 0)];

    vec![
        numeric(
            "alt",
            nom("Alanine Aminotransferase", "ALT", 10),
            FlagLimits::fixed(7.0, 56.0),
            enzyme(),
            GenerationRule::fixed_normal(25.0, 8.0),
        ),
        numeric(
            "ast",
            nom("Aspartate Aminotransferase", "AST", 20),
            FlagLimits::fixed(10.0, 40.0),
            enzyme(),
            GenerationRule::fixed_normal(24.0, 7.0),
        ),
        numeric(
            "alp",
            nom("Alkaline Phosphatase", "ALP", 30),
            FlagLimits::fixed(44.0, 147.0),
            enzyme(),
            GenerationRule::fixed_normal(70.0, 20.0),
        ),
        numeric(
            "ggt",
            nom("Gamma-Glutamyl Transferase", "GGT", 40),
            FlagLimits::fixed(9.0, 48.0),
            enzyme(),
            GenerationRule::fixed_normal(25.0, 10.0),
        ),
        numeric(
            "lip",
            nom("Lipase", "Lipase", 50),
            FlagLimits::fixed(10.0, 60.0),
            enzyme(),
            GenerationRule::fixed_normal(40.0, 12.0),
        ),
        numeric(
            "tbili",
            nom("Total Bilirubin", "T.Bili", 60),
            FlagLimits::fixed(2.0, 21.0),
            vec![
                UnitRendering::scaled(CONVENTIONAL, "mg/dL", 1, 1.0 / 17.1),
                UnitRendering::any("umol/L", 0),
            ],
            GenerationRule::fixed_normal(10.0, 4.0),
        ),
    ]
}

fn inflammatory() -> Vec<TestDefinition> {
    vec![
        numeric(
            "dimer",
            TestNomenclature::new("D-Dimer", "D-Dimer", INFLAMMATORY, 10),
            FlagLimits::fixed(0.0, 0.5),
            vec![UnitRendering::any("mg/L FEU", 2)],
            GenerationRule::fixed_normal(0.3, 0.1),
        ),
        numeric(
            "crp",
            TestNomenclature::new("C-Reactive Protein", "CRP", INFLAMMATORY, 20),
            FlagLimits::fixed(0.0, 10.0),
            vec![UnitRendering::any("mg/L", 1)],
            GenerationRule::fixed_normal(3.0, 2.0),
        ),
    ]
}

// ═══════════════════════════════════════════════════════════
// Urinalysis
// ═══════════════════════════════════════════════════════════

fn urinalysis() -> Vec<TestDefinition> {
    vec![TestDefinition::new(
        "udip-rbc",
        TestNomenclature::new("Urinalysis RBCs", "Dip RBCs", URINALYSIS, 10),
        TestDisplay::new(
            DisplayRule::computed(|value, _| match value {
                TestValue::Text(s) if s == "Negative" => ResultFlag::Normal,
                _ => ResultFlag::Abnormal,
            }),
            vec![UnitRendering::any("", 0)],
        ),
        GenerationRule::constant("Negative"),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, LabReport};

    fn find(id: &str) -> TestDefinition {
        lab_tests().into_iter().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn ids_are_unique() {
        let tests = lab_tests();
        let mut ids: Vec<&str> = tests.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }

    #[test]
    fn anion_gap_from_electrolytes() {
        let GenerationRule::Derived { calculate, .. } = find("ag").generate else {
            panic!("ag should be derived");
        };
        let mut report = LabReport::new();
        report.insert("na", 140.0);
        report.insert("cl", 100.0);
        report.insert("hco3", 24.0);
        assert_eq!(calculate(&report, &Patient::default()).unwrap(), TestValue::Number(16.0));

        report.remove("cl");
        assert_eq!(
            calculate(&report, &Patient::default()),
            Err(CalculationError::MissingInput("cl".into()))
        );
    }

    #[test]
    fn mcv_rejects_zero_rbc() {
        let GenerationRule::Derived { calculate, .. } = find("mcv").generate else {
            panic!("mcv should be derived");
        };
        let mut report = LabReport::new();
        report.insert("hct", 0.4);
        report.insert("rbc", 0.0);
        assert!(matches!(
            calculate(&report, &Patient::default()),
            Err(CalculationError::Invalid(_))
        ));
    }

    #[test]
    fn egfr_reference_points() {
        // 0.7 mg/dL for a 45 year old woman sits on the kappa knee.
        let female = Patient::new(45.0, 165.0, 60.0, Gender::Female);
        let egfr = ckd_epi_2021(0.7 * CREATININE_UMOL_PER_MG, &female);
        let expected = 142.0 * 0.9938_f64.powf(45.0) * 1.012;
        assert!((egfr - expected).abs() < 1e-9);

        let male = Patient::new(45.0, 180.0, 80.0, Gender::Male);
        assert!(ckd_epi_2021(300.0, &male) < 30.0);
    }

    #[test]
    fn udip_flag_is_computed() {
        let udip = find("udip-rbc");
        let DisplayRule::Computed(flag) = &udip.display.rule else {
            panic!("udip-rbc uses a computed flag");
        };
        let p = Patient::default();
        assert_eq!(flag(&"Negative".into(), &p), ResultFlag::Normal);
        assert_eq!(flag(&"3+".into(), &p), ResultFlag::Abnormal);
    }
}

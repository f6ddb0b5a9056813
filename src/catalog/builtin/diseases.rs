use crate::models::{Disease, DiseaseNomenclature, TestOverride};

/// Built-in diseases, each identified by its path in the disease tree.
pub fn diseases() -> Vec<Disease> {
    vec![
        // Cardiovascular
        Disease::new(
            "cv.nstemi",
            DiseaseNomenclature::new(
                "Non-ST Elevation Myocardial Infarction",
                "NSTEMI",
                "ACS with elevated troponin/ck-mb but normal ECG",
            ),
            vec![
                TestOverride::normal("hstnt", |mean, _, _| mean * 60.0, |_, _, _| 100.0),
                TestOverride::scale_mean("neut", 1.5),
            ],
        ),
        Disease::new(
            "cv.nstemi.nsvt",
            DiseaseNomenclature::new(
                "Non-ST Elevation Myocardial Infarction with Electrical Instability",
                "NSTEMI",
                "ACS with elevated troponin and ck-mb and NSVT",
            ),
            Vec::new(),
        ),
        Disease::new(
            "cv.chf",
            DiseaseNomenclature::new(
                "Exacerbated Congestive Heart Failure",
                "CHF",
                "Congestive heart failure with elevated BNP",
            ),
            vec![
                TestOverride::normal("bnp", |_, _, _| 8000.0, |_, _, _| 3000.0),
                TestOverride::normal(
                    "hstnt",
                    |mean, _, _| if mean < 30.0 { mean * 5.0 } else { mean },
                    |_, sd, _| sd,
                ),
            ],
        ),
        // Trauma
        Disease::new(
            "trauma.rhabdo",
            DiseaseNomenclature::new(
                "Rhabdomyolysis",
                "Rhabdo",
                "Rhabdomyolysis with elevated CK and renal failure",
            ),
            vec![
                TestOverride::normal("ck", |_, _, _| 20000.0, |_, _, _| 4000.0),
                TestOverride::scale_mean("cr", 3.0),
                TestOverride::scale_mean("bun", 3.0),
            ],
        ),
        // Urology
        Disease::new(
            "urology.renalcolic",
            DiseaseNomenclature::new(
                "Renal Colic",
                "Renal Colic",
                "Renal colic with hematuria and mild renal impairement.",
            ),
            vec![
                TestOverride::scale_mean("cr", 1.25),
                TestOverride::pick("udip-rbc", &["3+", "4+"]),
            ],
        ),
        // Vascular
        Disease::new(
            "vasc.pe.submassive",
            DiseaseNomenclature::new(
                "Submassive Pulmonary Embolism",
                "Submassive PE",
                "A pulmonary embolism with mild troponin elevation due to strain",
            ),
            vec![
                TestOverride::normal("dimer", |mean, _, _| mean * 15.0, |_, sd, _| sd * 5.0),
                TestOverride::scale_mean("hstnt", 4.0),
                TestOverride::normal("crp", |mean, _, _| mean * 10.0, |_, sd, _| sd * 4.0),
            ],
        ),
        Disease::new(
            "vasc.pe.massive",
            DiseaseNomenclature::new(
                "Massive Pulmonary Embolism",
                "Massive PE",
                "A pulmonary embolism with marked troponin elevation due to strain and RV failure/infarct",
            ),
            vec![
                TestOverride::normal("dimer", |mean, _, _| mean * 25.0, |_, sd, _| sd * 2.0),
                TestOverride::scale_mean("hstnt", 25.0),
                TestOverride::normal("crp", |mean, _, _| mean * 10.0, |_, sd, _| sd * 4.0),
            ],
        ),
    ]
}

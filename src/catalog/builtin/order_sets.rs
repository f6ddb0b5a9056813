use crate::models::OrderSet;

pub fn order_sets() -> Vec<OrderSet> {
    vec![
        OrderSet::new(
            "cbc",
            "Complete Blood Count",
            "CBC",
            &[
                "wbc", "rbc", "hgb", "hct", "mcv", "rdw", "plts", "neut", "lymph", "mono",
                "eosin", "baso",
            ],
        ),
        OrderSet::new(
            "lytes",
            "Electrolytes",
            "Lytes",
            &["na", "cl", "k", "hco3", "ag", "bun", "cr", "gfr", "gluc"],
        ),
        OrderSet::new("chem7", "Chemistry (7-test)", "CHEM-7", &["lytes"]),
        OrderSet::new("coags", "Coagulation profile", "Coags", &["inr", "ptt"]),
        OrderSet::new(
            "basic",
            "Basic Bloodwork",
            "Basic",
            &["cbc", "lytes", "coags", "alt"],
        ),
        OrderSet::new("cardiac", "Cardiac Bloodwork", "Cardiac", &["basic", "hstnt"]),
        OrderSet::new(
            "hepatic",
            "Hepatic Panel",
            "Hepatic",
            &["alt", "ast", "alp", "ggt", "lip", "tbili"],
        ),
    ]
}

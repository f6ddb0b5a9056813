use crate::models::Category;

pub const HEMATOLOGY: &str = "Hematology";
pub const CHEMISTRY: &str = "Chemistry";
pub const COAGULATION: &str = "Coagulation";
pub const CARDIAC: &str = "Cardiac";
pub const HEPATIC: &str = "Hepatic";
pub const INFLAMMATORY: &str = "Inflammatory";
pub const URINALYSIS: &str = "Urinalysis";

pub fn categories() -> Vec<Category> {
    vec![
        Category::new(HEMATOLOGY, 10),
        Category::new(CHEMISTRY, 20),
        Category::new(COAGULATION, 30),
        Category::new(CARDIAC, 40),
        Category::new(HEPATIC, 50),
        Category::new(INFLAMMATORY, 60),
        Category::new(URINALYSIS, 70),
    ]
}

use serde::{Deserialize, Serialize};

use super::enums::Gender;

/// Patient demographics consulted by generation and flag functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Years.
    pub age: f64,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub gender: Gender,
}

impl Patient {
    pub fn new(age: f64, height: f64, weight: f64, gender: Gender) -> Self {
        Self {
            age,
            height,
            weight,
            gender,
        }
    }

    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new(45.0, 170.0, 70.0, Gender::Female)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patient_is_adult_female() {
        let p = Patient::default();
        assert_eq!(p.age, 45.0);
        assert!(p.is_female());
    }

    #[test]
    fn gender_drives_is_female() {
        let p = Patient::new(30.0, 180.0, 80.0, Gender::Male);
        assert!(!p.is_female());
    }
}

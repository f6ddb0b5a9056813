use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(GenerateMethod {
    Normal => "normal",
    Derived => "derived",
    Static => "static",
});

str_enum!(ResultFlag {
    Normal => "normal",
    Low => "low",
    High => "high",
    CriticalLow => "critical_low",
    CriticalHigh => "critical_high",
    Abnormal => "abnormal",
});

impl ResultFlag {
    /// Short marker printed next to a value on a paper report.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Low => "L",
            Self::High => "H",
            Self::CriticalLow => "L!",
            Self::CriticalHigh => "H!",
            Self::Abnormal => "A",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::CriticalLow | Self::CriticalHigh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_parses_case_insensitive() {
        assert_eq!(Gender::from_str("Female").unwrap(), Gender::Female);
        assert_eq!(Gender::from_str("MALE").unwrap(), Gender::Male);
        assert!(Gender::from_str("x").is_err());
    }

    #[test]
    fn result_flag_symbols() {
        assert_eq!(ResultFlag::Normal.symbol(), "");
        assert_eq!(ResultFlag::CriticalHigh.symbol(), "H!");
        assert_eq!(ResultFlag::Abnormal.symbol(), "A");
        assert!(ResultFlag::CriticalLow.is_critical());
        assert!(!ResultFlag::High.is_critical());
    }

    #[test]
    fn invalid_enum_names_the_field() {
        let err = GenerateMethod::from_str("sampled").unwrap_err();
        assert_eq!(err.field, "GenerateMethod");
        assert!(err.to_string().contains("sampled"));
    }

    #[test]
    fn flag_serializes_snake_case() {
        let json = serde_json::to_string(&ResultFlag::CriticalLow).unwrap();
        assert_eq!(json, "\"critical_low\"");
    }
}

//! Structural validation of mapped records

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{AgentRecord, AttackType, Attribute, CURVE_LEN, Rarity, Specialty};

/// Record validation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the record may be emitted
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Findings that don't prevent emission
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning<S: Into<String>>(mut self, warning: S) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error<S: Into<String>>(mut self, error: S) -> Self {
        self.errors.push(error.into());
        self.is_valid = false;
        self
    }
}

/// Checks mapped records for structural soundness. Pure and infallible.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, record: &AgentRecord) -> ValidationResult {
        let mut result = ValidationResult::success();

        if record.id.trim().is_empty() {
            result = result.with_error("id is empty");
        }
        if record.name.trim().is_empty() {
            result = result.with_error("name is empty");
        }

        result = check_curves(record, result);
        result = check_stats(record, result);
        result = check_attributes(&record.attributes, result);

        let mut seen_factions = HashSet::new();
        for id in &record.faction_ids {
            if !seen_factions.insert(id) {
                result = result.with_error(format!("faction id {id} appears more than once"));
            }
        }

        if record.specialty == Specialty::Unknown {
            result = result.with_warning("specialty is unknown");
        }
        if record.attack_type == AttackType::Unknown {
            result = result.with_warning("attack type is unknown");
        }
        if record.rarity == Rarity::Unknown {
            result = result.with_warning("rarity is unknown");
        }
        if record.degraded {
            result = result.with_warning("record was built from entry data only");
        }

        result
    }
}

fn check_curves(record: &AgentRecord, mut result: ValidationResult) -> ValidationResult {
    for (field, curve) in record.ascension.named() {
        if curve.len() != CURVE_LEN {
            result = result.with_error(format!(
                "{field} curve has {} values, expected {CURVE_LEN}",
                curve.len()
            ));
            continue;
        }
        for (i, value) in curve.iter().enumerate() {
            if !value.is_finite() {
                result = result.with_error(format!("{field} curve value {i} is not finite"));
            } else if *value < 0.0 {
                result = result.with_error(format!("{field} curve value {i} is negative ({value})"));
            }
        }
        if curve.iter().all(|v| *v == 0.0) {
            result = result.with_warning(format!("{field} curve is all zero"));
        }
    }
    result
}

fn check_stats(record: &AgentRecord, mut result: ValidationResult) -> ValidationResult {
    for (name, value) in record.stats.named() {
        if !value.is_finite() {
            result = result.with_error(format!("stat {name} is not finite"));
        } else if value < 0.0 {
            result = result.with_error(format!("stat {name} is negative ({value})"));
        }
    }
    result
}

fn check_attributes(attributes: &[Attribute], mut result: ValidationResult) -> ValidationResult {
    if attributes.is_empty() {
        return result.with_error("attributes are empty");
    }

    let mut seen = HashSet::new();
    for attribute in attributes {
        if !seen.insert(*attribute) {
            result = result.with_error(format!("attribute {} appears more than once", attribute.as_str()));
        }
    }

    if seen.contains(&Attribute::Unknown) {
        result = result.with_warning("attribute is unknown");
    }
    for attribute in attributes {
        if let Some(parent) = attribute.parent() {
            if !seen.contains(&parent) {
                result = result.with_warning(format!(
                    "sub-attribute {} present without {}",
                    attribute.as_str(),
                    parent.as_str()
                ));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AscensionCurves, BaseStats};
    use std::collections::BTreeMap;

    fn record() -> AgentRecord {
        AgentRecord {
            id: "1091".to_string(),
            name: "Miyabi".to_string(),
            localized_names: BTreeMap::new(),
            rarity: Rarity::S,
            attributes: vec![Attribute::Ice, Attribute::Frost],
            specialty: Specialty::Anomaly,
            attack_type: AttackType::Slash,
            faction_ids: vec![6],
            ascension: AscensionCurves {
                hp: vec![0.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0],
                atk: vec![0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0],
                def: vec![0.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0],
            },
            stats: BaseStats {
                crit_rate: 5.0,
                crit_dmg: 50.0,
                ..BaseStats::default()
            },
            degraded: false,
        }
    }

    #[test]
    fn test_complete_record_is_clean() {
        let result = Validator::new().validate(&record());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_structural_errors() {
        let mut r = record();
        r.id = " ".to_string();
        r.ascension.hp.pop();
        r.ascension.atk[2] = f64::NAN;
        r.ascension.def[3] = -1.0;
        r.attributes = vec![Attribute::Fire, Attribute::Fire];
        r.faction_ids = vec![3, 3];
        r.stats.impact = f64::INFINITY;

        let result = Validator::new().validate(&r);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 7, "{:?}", result.errors);
        assert!(result.errors.iter().any(|e| e.contains("hp curve has 6 values")));
    }

    #[test]
    fn test_empty_attributes_are_an_error() {
        let mut r = record();
        r.attributes.clear();
        let result = Validator::new().validate(&r);
        assert_eq!(result.errors, vec!["attributes are empty".to_string()]);
    }

    #[test]
    fn test_degraded_record_is_valid_with_warnings() {
        let mut r = record();
        r.attributes = vec![Attribute::Unknown];
        r.specialty = Specialty::Unknown;
        r.ascension = AscensionCurves::zeroed();
        r.degraded = true;

        let result = Validator::new().validate(&r);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("entry data only")));
        assert!(result.warnings.iter().any(|w| w == "hp curve is all zero"));
        assert!(result.warnings.iter().any(|w| w == "attribute is unknown"));
    }

    #[test]
    fn test_orphan_sub_attribute_warns() {
        let mut r = record();
        r.attributes = vec![Attribute::AuricInk];
        let result = Validator::new().validate(&r);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["sub-attribute auric_ink present without ether".to_string()]);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut r = record();
        r.faction_ids = vec![1, 2, 1];
        r.rarity = Rarity::Unknown;
        let validator = Validator::new();
        assert_eq!(validator.validate(&r), validator.validate(&r));
    }
}

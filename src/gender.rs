// 🏷️ Gender Vocabulary - Rules as Data
// Free-text gender answers mapped to canonical genders through a lookup table

use crate::error::FieldError;
use crate::fields::Gender;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The "declined to answer" response. Where it belongs is a policy decision,
/// see `GenderVocabulary::with_declined_as`.
pub const DECLINED: &str = "VILL EJ UPPGE";

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderRule {
    /// Raw answer, matched case-insensitively after trimming
    pub value: String,

    /// Canonical gender it maps to
    pub gender: Gender,
}

impl GenderRule {
    pub fn new(value: impl Into<String>, gender: Gender) -> Self {
        GenderRule {
            value: value.into().trim().to_uppercase(),
            gender,
        }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.value == normalized
    }
}

/// Which preset table to start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderScheme {
    /// ANNAT and VILL EJ UPPGE map to Other
    #[default]
    Standard,
    /// ANNAT and VILL EJ UPPGE fold into Unknown
    Legacy,
}

// ============================================================================
// VOCABULARY
// ============================================================================

#[derive(Debug, Clone)]
pub struct GenderVocabulary {
    rules: Vec<GenderRule>,
}

impl GenderVocabulary {
    /// Empty vocabulary: every non-matching answer is an error
    pub fn new() -> Self {
        GenderVocabulary { rules: Vec::new() }
    }

    pub fn standard() -> Self {
        Self::with_other_bucket(Gender::Other)
    }

    pub fn legacy() -> Self {
        Self::with_other_bucket(Gender::Unknown)
    }

    pub fn for_scheme(scheme: GenderScheme) -> Self {
        match scheme {
            GenderScheme::Standard => Self::standard(),
            GenderScheme::Legacy => Self::legacy(),
        }
    }

    fn with_other_bucket(other: Gender) -> Self {
        let mut rules = Vec::new();
        for value in ["K", "F", "FEMALE", "KVINNA", "TJEJ"] {
            rules.push(GenderRule::new(value, Gender::Female));
        }
        for value in ["M", "MAN", "MALE", "KILLE"] {
            rules.push(GenderRule::new(value, Gender::Male));
        }
        for value in ["ANNAT", DECLINED] {
            rules.push(GenderRule::new(value, other));
        }
        for value in ["", "?", "EJ SVAR", "UPPGIFT OKÄND"] {
            rules.push(GenderRule::new(value, Gender::Unknown));
        }
        GenderVocabulary { rules }
    }

    /// Load rules from a JSON array of `{"value": .., "gender": ..}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read gender vocabulary: {:?}", path.as_ref()))?;

        let rules: Vec<GenderRule> =
            serde_json::from_str(&content).context("Failed to parse gender vocabulary JSON")?;

        Ok(GenderVocabulary::from_rules(rules))
    }

    pub fn from_rules(rules: Vec<GenderRule>) -> Self {
        let mut vocabulary = GenderVocabulary::new();
        for rule in rules {
            vocabulary.add_rule(rule);
        }
        vocabulary
    }

    /// Add or replace the mapping for one answer
    pub fn add_rule(&mut self, rule: GenderRule) {
        let rule = GenderRule::new(rule.value, rule.gender);
        match self.rules.iter_mut().find(|r| r.value == rule.value) {
            Some(existing) => existing.gender = rule.gender,
            None => self.rules.push(rule),
        }
    }

    /// Route the "declined to answer" response to `gender`
    pub fn with_declined_as(mut self, gender: Gender) -> Self {
        self.add_rule(GenderRule::new(DECLINED, gender));
        self
    }

    pub fn classify(&self, text: &str) -> Result<Gender, FieldError> {
        let normalized = text.trim().to_uppercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.gender)
            .ok_or_else(|| FieldError::InvalidGender(text.to_string()))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for GenderVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

/// Classify against the standard vocabulary
pub fn parse_gender(text: &str) -> Result<Gender, FieldError> {
    GenderVocabulary::standard().classify(text)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_gender_female() {
        for text in ["K", "Kvinna", "TJEJ", "female", "f"] {
            assert_eq!(parse_gender(text), Ok(Gender::Female), "input {}", text);
        }
    }

    #[test]
    fn test_parse_gender_male() {
        for text in ["M", "Man", "Male", "kille", " m "] {
            assert_eq!(parse_gender(text), Ok(Gender::Male), "input {}", text);
        }
    }

    #[test]
    fn test_parse_gender_unknown() {
        for text in ["", "?", "ej svar", "uppgift okänd"] {
            assert_eq!(parse_gender(text), Ok(Gender::Unknown), "input {}", text);
        }
    }

    #[test]
    fn test_parse_gender_other_in_standard_scheme() {
        assert_eq!(parse_gender("annat"), Ok(Gender::Other));
        assert_eq!(parse_gender("vill ej uppge"), Ok(Gender::Other));
    }

    #[test]
    fn test_legacy_scheme_folds_other_into_unknown() {
        let vocabulary = GenderVocabulary::legacy();
        assert_eq!(vocabulary.classify("annat"), Ok(Gender::Unknown));
        assert_eq!(vocabulary.classify("vill ej uppge"), Ok(Gender::Unknown));
        assert_eq!(vocabulary.classify("kvinna"), Ok(Gender::Female));
    }

    #[test]
    fn test_declined_switch() {
        let vocabulary = GenderVocabulary::standard().with_declined_as(Gender::Unknown);
        assert_eq!(vocabulary.classify("Vill ej uppge"), Ok(Gender::Unknown));
        assert_eq!(vocabulary.classify("annat"), Ok(Gender::Other));
        assert_eq!(vocabulary.rule_count(), GenderVocabulary::standard().rule_count());
    }

    #[test]
    fn test_parse_gender_invalid() {
        assert_eq!(
            parse_gender("WAT"),
            Err(FieldError::InvalidGender("WAT".to_string()))
        );
    }

    #[test]
    fn test_add_rule_extends_vocabulary() {
        let mut vocabulary = GenderVocabulary::standard();
        assert!(vocabulary.classify("flicka").is_err());

        vocabulary.add_rule(GenderRule::new("Flicka", Gender::Female));
        assert_eq!(vocabulary.classify("FLICKA"), Ok(Gender::Female));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"value": "pojke", "gender": "Male"}}, {{"value": "", "gender": "Unknown"}}]"#
        )
        .unwrap();

        let vocabulary = GenderVocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocabulary.rule_count(), 2);
        assert_eq!(vocabulary.classify("Pojke"), Ok(Gender::Male));
        assert_eq!(vocabulary.classify(""), Ok(Gender::Unknown));
        assert!(vocabulary.classify("K").is_err());
    }
}

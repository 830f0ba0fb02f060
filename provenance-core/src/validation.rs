//! Validation System - Rule/Policy Separation
//!
//! Rules inspect an artwork and produce structured violations.
//! Policy decides whether those violations block code generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::artwork::{Artwork, ArtworkId, EditionKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub artwork_id: ArtworkId,
}

impl ValidationResult {
    pub fn success(artwork: &Artwork, violations: Vec<ValidationViolation>) -> Self {
        Self { valid: true, violations, artwork_id: artwork.id() }
    }

    pub fn failure(artwork: &Artwork, violations: Vec<ValidationViolation>) -> Self {
        Self { valid: false, violations, artwork_id: artwork.id() }
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// How violations are acted upon
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Block,
    Warn,
    Log,
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, artwork: &Artwork, today: NaiveDate) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Limited editions are numbered from 1 and the index never exceeds the total
pub struct EditionBoundsRule;

impl ValidationRule for EditionBoundsRule {
    fn name(&self) -> &'static str { "edition_bounds" }

    fn validate(&self, artwork: &Artwork, _today: NaiveDate) -> Vec<ValidationViolation> {
        let EditionKind::Limited { index, total } = *artwork.edition() else {
            return vec![];
        };

        if index == 0 || total == 0 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Edition numbers start at 1".to_string(),
                expected: Some("index >= 1 and total >= 1".to_string()),
                actual: Some(format!("{}/{}", index, total)),
                remediation: vec!["Set the copy number and the run size".to_string()],
            }];
        }

        if index > total {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Edition index exceeds edition total".to_string(),
                expected: Some(format!("index <= {}", total)),
                actual: Some(index.to_string()),
                remediation: vec!["Correct the copy number or enlarge the run".to_string()],
            }];
        }

        vec![]
    }
}

/// Codes carry edition numbers in exactly two digits
pub struct CodeWidthRule;

impl ValidationRule for CodeWidthRule {
    fn name(&self) -> &'static str { "code_width" }

    fn validate(&self, artwork: &Artwork, _today: NaiveDate) -> Vec<ValidationViolation> {
        match *artwork.edition() {
            EditionKind::Limited { index, total } if index >= 100 || total >= 100 => {
                vec![ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Warning,
                    message: "Edition numbers above 99 are cut to two digits in the code".to_string(),
                    expected: Some("index and total below 100".to_string()),
                    actual: Some(format!("{}/{}", index, total)),
                    remediation: vec!["Check the printed code against the edition label".to_string()],
                }]
            }
            _ => vec![],
        }
    }
}

pub struct CertificationDateRule;

impl ValidationRule for CertificationDateRule {
    fn name(&self) -> &'static str { "certification_date" }

    fn validate(&self, artwork: &Artwork, today: NaiveDate) -> Vec<ValidationViolation> {
        let date = artwork.certification_date();
        if date > today {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Certification date is in the future".to_string(),
                expected: Some(format!("on or before {}", today)),
                actual: Some(date.to_string()),
                remediation: vec!["Confirm the certification date before printing".to_string()],
            }];
        }
        vec![]
    }
}

pub struct PendingCodeRule;

impl ValidationRule for PendingCodeRule {
    fn name(&self) -> &'static str { "pending_code" }

    fn validate(&self, artwork: &Artwork, _today: NaiveDate) -> Vec<ValidationViolation> {
        if artwork.code().is_some() {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Info,
            message: "Traceability code not generated yet".to_string(),
            expected: None,
            actual: None,
            remediation: vec!["Generate the code before printing documents".to_string()],
        }]
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    failure_mode: FailureMode,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_failure_mode(FailureMode::Block)
    }

    pub fn with_failure_mode(failure_mode: FailureMode) -> Self {
        Self {
            rules: vec![
                Box::new(EditionBoundsRule),
                Box::new(CodeWidthRule),
                Box::new(CertificationDateRule),
                Box::new(PendingCodeRule),
            ],
            failure_mode,
        }
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    pub fn validate(&self, artwork: &Artwork, today: NaiveDate) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(artwork, today))
            .collect();

        let has_errors = violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        match self.failure_mode {
            FailureMode::Block if has_errors => {
                // Only errors are reported on a blocked record
                let errors = violations
                    .into_iter()
                    .filter(|v| v.severity == ViolationSeverity::Error)
                    .collect();
                ValidationResult::failure(artwork, errors)
            }
            FailureMode::Block => ValidationResult::success(artwork, violations),
            FailureMode::Warn | FailureMode::Log => {
                // Never block, just record
                ValidationResult::success(artwork, violations)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

//! Cross-field business rules and the evaluator that aggregates them.
//!
//! Rules are pure functions over the parsed field list. Date fields are
//! compared purely as 6-digit YYMMDD strings converted to integers; calendar
//! validity is deliberately not checked, matching the format layer.

use crate::report::{Severity, ValidationIssue};
use crate::tokenizer::ParsedField;

pub trait BusinessRule: Send + Sync {
    fn id(&self) -> &'static str;
    /// External reference backing the rule, e.g. a UCP 600 article.
    fn reference(&self) -> &'static str;
    fn applies_to(&self, message_type: &str) -> bool;
    fn evaluate(&self, fields: &[ParsedField]) -> Vec<ValidationIssue>;
}

/// Expiry (31D) must not precede issue (31C) or latest shipment (44C).
pub struct DateConsistency;

/// Amount tolerance (39A, `NN/NN`) must stay within a configured maximum.
/// The severity of a breach is configurable; the default is a warning.
pub struct ToleranceCheck {
    pub max_percent: u32,
    pub severity: Severity,
}

impl Default for ToleranceCheck {
    fn default() -> Self {
        Self {
            max_percent: 10,
            severity: Severity::Warning,
        }
    }
}

const AMENDABLE_TYPES: [&str; 4] = ["700", "707", "710", "720"];

impl BusinessRule for DateConsistency {
    fn id(&self) -> &'static str {
        "date-inconsistent"
    }

    fn reference(&self) -> &'static str {
        "UCP 600 art. 6"
    }

    fn applies_to(&self, message_type: &str) -> bool {
        AMENDABLE_TYPES.contains(&message_type)
    }

    fn evaluate(&self, fields: &[ParsedField]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let issue_date = yymmdd(fields, "31C");
        let expiry_date = yymmdd(fields, "31D");
        let shipment_date = yymmdd(fields, "44C");

        if let (Some(issue), Some(expiry)) = (issue_date, expiry_date) {
            if expiry < issue {
                issues.push(
                    ValidationIssue::error(
                        Some("31D"),
                        self.id(),
                        format!("expiry date {expiry:06} precedes issue date {issue:06}"),
                    )
                    .with_reference(self.reference()),
                );
            }
        }
        if let (Some(shipment), Some(expiry)) = (shipment_date, expiry_date) {
            if expiry < shipment {
                issues.push(
                    ValidationIssue::error(
                        Some("44C"),
                        self.id(),
                        format!(
                            "latest shipment date {shipment:06} falls after expiry date {expiry:06}"
                        ),
                    )
                    .with_reference(self.reference()),
                );
            }
        }

        issues
    }
}

impl BusinessRule for ToleranceCheck {
    fn id(&self) -> &'static str {
        "tolerance-exceeded"
    }

    fn reference(&self) -> &'static str {
        "UCP 600 art. 30"
    }

    fn applies_to(&self, message_type: &str) -> bool {
        AMENDABLE_TYPES.contains(&message_type)
    }

    fn evaluate(&self, fields: &[ParsedField]) -> Vec<ValidationIssue> {
        let Some(value) = first_value(fields, "39A") else {
            return Vec::new();
        };
        let Some((plus, minus)) = value.trim().split_once('/') else {
            return Vec::new(); // malformed 39A is the format validator's finding
        };
        let (Ok(plus), Ok(minus)) = (plus.parse::<u32>(), minus.parse::<u32>()) else {
            return Vec::new();
        };

        if plus > self.max_percent || minus > self.max_percent {
            return vec![
                ValidationIssue::new(
                    Some("39A"),
                    self.severity,
                    self.id(),
                    format!(
                        "tolerance {plus}/{minus} exceeds the permitted maximum of {} percent",
                        self.max_percent
                    ),
                )
                .with_reference(self.reference()),
            ];
        }
        Vec::new()
    }
}

/// Ordered list of business rules; runs the ones applicable to a type.
pub struct RuleEvaluator {
    rules: Vec<Box<dyn BusinessRule>>,
}

impl RuleEvaluator {
    pub fn new(rules: Vec<Box<dyn BusinessRule>>) -> Self {
        Self { rules }
    }

    /// The two canonical documentary-credit rules with default tolerance.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(DateConsistency),
            Box::new(ToleranceCheck::default()),
        ])
    }

    pub fn evaluate(&self, message_type: &str, fields: &[ParsedField]) -> Vec<ValidationIssue> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(message_type))
            .flat_map(|rule| rule.evaluate(fields))
            .collect()
    }
}

/// First occurrence of a tag's value, first line only.
fn first_value<'a>(fields: &'a [ParsedField], tag: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|field| field.tag == tag)
        .map(|field| field.value.split('\n').next().unwrap_or(""))
}

/// Leading six digits of a field value as a comparable integer. Returns
/// nothing for absent or non-digit values; those are format findings.
fn yymmdd(fields: &[ParsedField], tag: &str) -> Option<u32> {
    let value = first_value(fields, tag)?;
    let digits: String = value.chars().take(6).collect();
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

//! Mandatory, conditional and occurrence checks against the schema registry.

use crate::report::ValidationIssue;
use crate::schema::{Condition, SchemaRegistry};
use crate::tokenizer::ParsedField;

/// Check the declared message type's field rules against the parsed fields.
/// Returns nothing for a message type the registry does not know; the
/// service reports that case separately.
pub fn check_compliance(
    registry: &SchemaRegistry,
    message_type: &str,
    fields: &[ParsedField],
) -> Vec<ValidationIssue> {
    let Some(definitions) = registry.fields_for(message_type) else {
        return Vec::new();
    };

    let mut issues = Vec::new();

    for definition in definitions {
        let count = occurrences(fields, &definition.tag);

        if definition.mandatory && count == 0 {
            issues.push(ValidationIssue::error(
                Some(&definition.tag),
                "missing-mandatory",
                format!(
                    "mandatory field {} ({}) is missing",
                    definition.tag, definition.name
                ),
            ));
        }

        if let Some(condition) = &definition.conditional {
            match condition {
                Condition::RequiredIfPresent { trigger } => {
                    if occurrences(fields, trigger) > 0 && count == 0 {
                        issues.push(ValidationIssue::error(
                            Some(&definition.tag),
                            "missing-conditional",
                            format!(
                                "field {} ({}) is required when {} is present",
                                definition.tag, definition.name, trigger
                            ),
                        ));
                    }
                }
                Condition::RequiredIfEquals { trigger, value } => {
                    let triggered = fields
                        .iter()
                        .any(|f| f.tag == *trigger && f.value.trim() == value);
                    if triggered && count == 0 {
                        issues.push(ValidationIssue::error(
                            Some(&definition.tag),
                            "missing-conditional",
                            format!(
                                "field {} ({}) is required when {} is '{}'",
                                definition.tag, definition.name, trigger, value
                            ),
                        ));
                    }
                }
                Condition::EitherOr { members } => {
                    // Evaluated once per group, on the lead member.
                    let lead = members.first().map(String::as_str) == Some(definition.tag.as_str());
                    let any_present = members.iter().any(|tag| occurrences(fields, tag) > 0);
                    if lead && !any_present {
                        issues.push(ValidationIssue::error(
                            Some(&definition.tag),
                            "missing-conditional",
                            format!("one of {} is required", members.join(" or ")),
                        ));
                    }
                }
            }
        }

        if count > definition.max_occurrences {
            issues.push(ValidationIssue::error(
                Some(&definition.tag),
                "too-many-occurrences",
                format!(
                    "field {} appears {} times, at most {} allowed",
                    definition.tag, count, definition.max_occurrences
                ),
            ));
        }
    }

    issues
}

fn occurrences(fields: &[ParsedField], tag: &str) -> usize {
    fields.iter().filter(|field| field.tag == tag).count()
}

//! Applies compiled format matchers to parsed fields.

use crate::format::MatcherCache;
use crate::report::ValidationIssue;
use crate::schema::SchemaRegistry;
use crate::tokenizer::ParsedField;

/// Validate every parsed field's value against its format spec. Tags without
/// a definition only warn; a failed match becomes a `format-violation`.
pub fn validate_fields(
    registry: &SchemaRegistry,
    cache: &MatcherCache,
    message_type: &str,
    fields: &[ParsedField],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field in fields {
        let Some(definition) = registry.lookup(message_type, &field.tag) else {
            issues.push(ValidationIssue::warning(
                Some(&field.tag),
                "undefined-field",
                format!(
                    "tag {} is not defined for message type MT{}",
                    field.tag, message_type
                ),
            ));
            continue;
        };

        // The registry compiles every spec at load time, so the cache cannot
        // fail here for a definition it handed out.
        let Ok(matcher) = cache.get(&definition.format_spec) else {
            continue;
        };

        if let Err(expected) = matcher.matches(&field.value) {
            issues.push(ValidationIssue::error(
                Some(&field.tag),
                "format-violation",
                format!(
                    "field {} ({}) does not match format {}: {}",
                    field.tag, definition.name, definition.format_spec, expected
                ),
            ));
        }

        if let Some(allowed) = &definition.allowed_values {
            let value = field.value.trim();
            if !allowed.iter().any(|candidate| candidate == value) {
                issues.push(ValidationIssue::error(
                    Some(&field.tag),
                    "value-not-allowed",
                    format!(
                        "field {} ({}) must be one of: {}",
                        field.tag,
                        definition.name,
                        allowed.join(", ")
                    ),
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, MessageTypeSchema, SchemaSource};
    use crate::tokenizer::tokenize;

    struct Minimal;

    impl SchemaSource for Minimal {
        fn load(&self) -> anyhow::Result<Vec<MessageTypeSchema>> {
            Ok(vec![MessageTypeSchema::new(
                "700",
                "test",
                vec![
                    FieldDefinition::new("31C", "Date of Issue", "6!n"),
                    FieldDefinition::new("40A", "Form of Documentary Credit", "24x")
                        .allowed_values(&["IRREVOCABLE"]),
                ],
            )])
        }
    }

    #[test]
    fn reports_format_violation_and_undefined_field() {
        let registry = SchemaRegistry::load(&Minimal).unwrap();
        let cache = MatcherCache::new();
        let fields = tokenize(":31C:24120\n:99:SOMETHING");

        let issues = validate_fields(&registry, &cache, "700", &fields);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].rule_id, "format-violation");
        assert_eq!(issues[1].rule_id, "undefined-field");
    }

    #[test]
    fn enforces_allowed_values() {
        let registry = SchemaRegistry::load(&Minimal).unwrap();
        let cache = MatcherCache::new();
        let fields = tokenize(":40A:REVOCABLE");

        let issues = validate_fields(&registry, &cache, "700", &fields);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "value-not-allowed");
    }
}

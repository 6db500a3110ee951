//! Smoke Screen Unit tests for the MT validation engine components
//!
//! These test are unit tests that span the codebase, testing behavior in
//! isolation from integration scenarios. These are intended as smoke-screen
//! and generally test the happy-path.

use mt_validation::{
    builtin::{self, BuiltinSource},
    flow::FlowGraph,
    format::FormatMatcher,
    schema::SchemaRegistry,
    service::ValidationService,
    tokenizer::{build_message, tokenize},
    utils::new_report_id,
};
use sled::open;
use std::sync::Arc;
use tempfile::tempdir;

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Report ids are bech32 strings with the report prefix
    #[test]
    fn generates_valid_bech32_report_id() {
        let id = new_report_id().unwrap();
        assert!(id.starts_with("report1"));
        assert!(id.len() > 10); // UUID should produce substantial output
    }

    /// Multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_report_id().unwrap();
        let id2 = new_report_id().unwrap();
        assert_ne!(id1, id2);
    }
}

// FORMAT MODULE TESTS
#[cfg(test)]
mod format_tests {
    use super::*;

    /// The core mini-language shapes from the MT700 schema all compile
    #[test]
    fn builtin_specs_compile() {
        for spec in [
            "16x", "6!n", "3!a15d", "4*35x", "2n/2n", "1!n/1!n", "6!n29x", "[/34x]4*35x",
            "4!a2!a2!c[3!c]", "100*65x", "6!n3!a15d",
        ] {
            assert!(FormatMatcher::compile(spec).is_ok(), "spec {spec}");
        }
    }

    /// A decimal segment accepts digits plus at most one comma
    #[test]
    fn decimal_comma_handling() {
        let matcher = FormatMatcher::compile("3!a15d").unwrap();
        assert!(matcher.matches("USD45000,00").is_ok());
        assert!(matcher.matches("USD45000").is_ok());
        assert!(matcher.matches("USD45,000,00").is_err());
    }

    /// Combined date-and-amount format used by 32A fields
    #[test]
    fn date_amount_format() {
        let matcher = FormatMatcher::compile("6!n3!a15d").unwrap();
        assert!(matcher.matches("241201USD50000,00").is_ok());
        assert!(matcher.matches("2412USD50000,00").is_err());
    }
}

// TOKENIZER MODULE TESTS
#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    /// build_message and tokenize are inverses for plain values
    #[test]
    fn build_then_parse_round_trip() {
        let pairs = [
            ("20", "LC1"),
            ("31C", "241201"),
            ("32B", "USD500000,00"),
            ("20", "LC1 AGAIN"),
        ];

        let fields = tokenize(&build_message(&pairs));

        let back: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.tag.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(back, pairs);
        assert_eq!(fields[3].occurrence_index, 1);
    }

    /// Multi-line values keep their continuation lines
    #[test]
    fn multiline_value_survives_round_trip() {
        let raw = build_message(&[("50", "APPLICANT CO\nMAIN STREET 1")]);
        let fields = tokenize(&raw);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "APPLICANT CO\nMAIN STREET 1");
    }
}

// SCHEMA / BUILTIN TESTS
#[cfg(test)]
mod schema_tests {
    use super::*;

    /// MT700 keeps its fields in message order
    #[test]
    fn mt700_field_order() {
        let registry = SchemaRegistry::load(&BuiltinSource).unwrap();
        let fields = registry.fields_for("700").unwrap();
        let tag_27 = fields.iter().position(|f| f.tag == "27").unwrap();
        let tag_45a = fields.iter().position(|f| f.tag == "45A").unwrap();
        assert!(tag_27 < tag_45a);
    }

    /// Unknown message types are simply absent
    #[test]
    fn unknown_type_is_absent() {
        let registry = SchemaRegistry::load(&BuiltinSource).unwrap();
        assert!(!registry.contains("799"));
        assert!(registry.fields_for("799").is_none());
    }
}

// FLOW GRAPH TESTS
#[cfg(test)]
mod flow_tests {
    use super::*;

    /// The documented amendment loop is legal: 700 -> 707 -> 730 -> 707
    #[test]
    fn amendment_loop_is_legal() {
        let graph = FlowGraph::load(builtin::flow_edges()).unwrap();
        let codes: Vec<String> = ["700", "707", "730", "707", "730"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(graph.validate_sequence(&codes).is_valid);
    }

    /// Reimbursement chain: authorisation, claim, advice
    #[test]
    fn reimbursement_chain_is_legal() {
        let graph = FlowGraph::load(builtin::flow_edges()).unwrap();
        let codes: Vec<String> = ["700", "740", "742", "756"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(graph.validate_sequence(&codes).is_valid);
    }

    /// Every violation names both types and carries a recommendation
    #[test]
    fn violations_carry_recommendations() {
        let graph = FlowGraph::load(builtin::flow_edges()).unwrap();
        let codes: Vec<String> = ["730", "756"].iter().map(|s| s.to_string()).collect();

        let report = graph.validate_sequence(&codes);
        assert!(!report.is_valid);
        assert!(report.violations[0].contains("MT730"));
        assert!(report.violations[0].contains("MT756"));
        assert!(!report.recommendations.is_empty());
    }
}

// SERVICE TESTS
#[cfg(test)]
mod service_tests {
    use super::*;

    fn test_service(name: &str) -> (tempfile::TempDir, ValidationService) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(open(temp_dir.path().join(name)).unwrap());
        db.clear().unwrap();
        let service = ValidationService::with_builtin(db).unwrap();
        (temp_dir, service)
    }

    /// A tag unknown to the schema warns but never invalidates on its own
    #[test]
    fn undefined_field_is_a_warning_only() {
        let (_guard, service) = test_service("undefined_field.db");

        let raw = ":20:LC1\n\
                   :40A:IRREVOCABLE\n\
                   :31D:250630LONDON\n\
                   :50:APPLICANT CO\n\
                   :59:BENEFICIARY CO\n\
                   :32B:EUR10000,00\n\
                   :41D:ANY BANK\n\
                   :45A:GOODS\n\
                   :46A:DOCUMENTS\n\
                   :98Z:NOT A REAL FIELD";

        let report = service.validate("700", raw);

        assert!(report.is_valid);
        assert!(report
            .warnings
            .iter()
            .any(|issue| issue.rule_id == "undefined-field" && issue.tag.as_deref() == Some("98Z")));
    }

    /// Unknown message types yield a complete, invalid report
    #[test]
    fn unknown_message_type_reported() {
        let (_guard, service) = test_service("unknown_type.db");

        let report = service.validate("999", ":20:LC1");

        assert!(!report.is_valid);
        assert_eq!(report.errors[0].rule_id, "unknown-message-type");
        assert_eq!(report.field_count, 1);
    }

    /// A report with format violations still covers every other field
    #[test]
    fn validation_continues_past_failures() {
        let (_guard, service) = test_service("continues.db");

        let raw = ":20:LC1\n\
                   :40A:IRREVOCABLE\n\
                   :31C:BADDATE\n\
                   :31D:250630LONDON\n\
                   :50:APPLICANT CO\n\
                   :59:BENEFICIARY CO\n\
                   :32B:EURO10000\n\
                   :41D:ANY BANK\n\
                   :45A:GOODS\n\
                   :46A:DOCUMENTS";

        let report = service.validate("700", raw);

        let violations: Vec<_> = report
            .errors
            .iter()
            .filter(|issue| issue.rule_id == "format-violation")
            .map(|issue| issue.tag.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(violations, vec!["31C", "32B"]);
    }
}

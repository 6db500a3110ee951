//! End-to-end scenarios against a service backed by a temporary sled db.

use anyhow::Context;
use mt_validation::service::ValidationService;
use sled::open;
use std::sync::Arc;

use tempfile::tempdir; // Use for test db cleanup.

fn service(db_name: &str) -> anyhow::Result<(tempfile::TempDir, ValidationService)> {
    // Sled uses file-based locking to prevent concurrent access, so each test
    // gets its own database on temp for simplified cleanup.
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join(db_name);
    let db = Arc::new(open(db_path)?);
    db.clear()?;

    let service = ValidationService::with_builtin(db)?;
    Ok((temp_dir, service))
}

#[test]
fn missing_mandatory_fields_are_reported() -> anyhow::Result<()> {
    let (_guard, service) = service("missing_mandatory.db")?;

    // MT700 without 45A (goods) and 46A (documents required)
    let raw = ":20:LC1\n\
               :31C:241201\n\
               :31D:250630LONDON\n\
               :40A:IRREVOCABLE\n\
               :50:XYZ IMPORTS LTD\n\
               :59:ABC TRADING CO\n\
               :32B:USD500000,00\n\
               :39A:10/10";

    let report = service.validate("700", raw);

    assert!(!report.is_valid);
    let mut missing: Vec<_> = report
        .errors
        .iter()
        .filter(|issue| issue.rule_id == "missing-mandatory")
        .map(|issue| issue.tag.as_deref().unwrap_or(""))
        .collect();
    missing.sort_unstable();
    assert_eq!(missing, vec!["45A", "46A"]);

    Ok(())
}

#[test]
fn complete_credit_validates_and_persists() -> anyhow::Result<()> {
    let (_guard, service) = service("complete_credit.db")?;

    let raw = "{1:F01ISSUBANKAXXX0000000000}{2:I700ADVBANKBXXXXN}{4:\n\
               :27:1/1\n\
               :40A:IRREVOCABLE\n\
               :20:LC2024120001\n\
               :31C:241201\n\
               :31D:250630LONDON\n\
               :50:XYZ IMPORTS LTD\n\
               NEW YORK\n\
               :59:ABC TRADING CO\n\
               SHANGHAI\n\
               :32B:USD45000,00\n\
               :39A:05/05\n\
               :41D:ANY BANK\n\
               BY NEGOTIATION\n\
               :42C:AT SIGHT\n\
               :42D:CITIBANK NY\n\
               :43P:NOT ALLOWED\n\
               :44E:SHANGHAI\n\
               :44F:NEW YORK\n\
               :44C:250601\n\
               :45A:100 UNITS OF MODEL X WIDGETS\n\
               :46A:SIGNED COMMERCIAL INVOICE IN TRIPLICATE\n\
               FULL SET OF CLEAN ON BOARD BILLS OF LADING\n\
               :47A:ALL DOCUMENTS IN ENGLISH\n\
               :49:CONFIRM\n\
               :71B:ALL CHARGES OUTSIDE\n\
               FOR BENEFICIARY ACCOUNT\n\
               -}";

    let report = service.validate("700", raw);
    assert!(report.is_valid, "unexpected issues: {:?}", report.errors);
    assert!(report.warnings.is_empty());

    // persist, then read the record and the raw text back
    let report_id = service
        .persist_result(&report, raw)
        .context("failed to persist report: ")?;

    let stored = service.load_report(&report_id)?.expect("report not stored");
    assert_eq!(stored.message_type, "700");
    assert!(stored.is_valid);
    assert_eq!(stored.field_count, report.field_count);

    let raw_back = service.load_raw_text(&stored.content_hash)?;
    assert_eq!(raw_back.as_deref(), Some(raw));

    Ok(())
}

#[test]
fn amendment_sequence_is_legal_but_refusal_needs_discrepancy_advice() -> anyhow::Result<()> {
    let (_guard, service) = service("sequences.db")?;

    let legal: Vec<String> = ["700", "707", "730"].iter().map(|s| s.to_string()).collect();
    let report = service.validate_sequence(&legal);
    assert!(report.is_valid, "violations: {:?}", report.violations);

    // MT734 (refusal) may only follow MT750 (advice of discrepancy)
    let illegal: Vec<String> = ["700", "734"].iter().map(|s| s.to_string()).collect();
    let report = service.validate_sequence(&illegal);

    assert!(!report.is_valid);
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].contains("MT700"));
    assert!(report.violations[0].contains("MT734"));
    assert!(
        report
            .recommendations
            .iter()
            .any(|recommendation| recommendation.contains("MT734") && recommendation.contains("750")),
        "recommendations: {:?}",
        report.recommendations
    );

    Ok(())
}

#[test]
fn expiry_before_issue_is_date_inconsistent() -> anyhow::Result<()> {
    let (_guard, service) = service("date_rule.db")?;

    let raw = ":20:LC1\n\
               :40A:IRREVOCABLE\n\
               :31C:241201\n\
               :31D:241130PARIS\n\
               :50:APPLICANT CO\n\
               :59:BENEFICIARY CO\n\
               :32B:EUR10000,00\n\
               :41D:ANY BANK\n\
               :45A:GOODS\n\
               :46A:DOCUMENTS";

    let report = service.validate("700", raw);

    assert!(!report.is_valid);
    assert!(report
        .errors
        .iter()
        .any(|issue| issue.rule_id == "date-inconsistent"));

    Ok(())
}

#[test]
fn calendar_validity_is_out_of_scope() -> anyhow::Result<()> {
    let (_guard, service) = service("month_13.db")?;

    // month 13 passes 6!n; only the digit-string shape is checked
    let raw = ":20:LC1\n\
               :40A:IRREVOCABLE\n\
               :31C:241301\n\
               :31D:251301PARIS\n\
               :50:APPLICANT CO\n\
               :59:BENEFICIARY CO\n\
               :32B:EUR10000,00\n\
               :41D:ANY BANK\n\
               :45A:GOODS\n\
               :46A:DOCUMENTS";

    let report = service.validate("700", raw);

    assert!(
        !report
            .errors
            .iter()
            .any(|issue| issue.rule_id == "format-violation"),
        "errors: {:?}",
        report.errors
    );
    assert!(report.is_valid);

    Ok(())
}

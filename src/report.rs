//! Validation issues and the aggregated reports returned to callers.

/// How bad a finding is. Errors make a report invalid, warnings never do.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    #[n(0)]
    Error,
    #[n(1)]
    Warning,
}

/// One problem found by any validating component. Immutable once created.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    #[n(0)]
    pub tag: Option<String>,
    #[n(1)]
    pub severity: Severity,
    #[n(2)]
    pub rule_id: String,
    #[n(3)]
    pub message: String,
    #[n(4)]
    pub reference: Option<String>,
}

impl ValidationIssue {
    pub fn error(tag: Option<&str>, rule_id: &str, message: String) -> Self {
        Self::new(tag, Severity::Error, rule_id, message)
    }

    pub fn warning(tag: Option<&str>, rule_id: &str, message: String) -> Self {
        Self::new(tag, Severity::Warning, rule_id, message)
    }

    pub fn new(tag: Option<&str>, severity: Severity, rule_id: &str, message: String) -> Self {
        Self {
            tag: tag.map(str::to_string),
            severity,
            rule_id: rule_id.to_string(),
            message,
            reference: None,
        }
    }

    /// Attach an external reference, e.g. the UCP 600 article backing the rule.
    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }
}

/// Complete outcome of validating one message. A report is always returned,
/// malformed input only ever adds issues.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    #[n(0)]
    pub message_type: String,
    #[n(1)]
    pub is_valid: bool,
    #[n(2)]
    pub errors: Vec<ValidationIssue>,
    #[n(3)]
    pub warnings: Vec<ValidationIssue>,
    #[n(4)]
    pub field_count: u64,
}

impl ValidationReport {
    /// Merge issues from all validating components into one report,
    /// ordered by tag then rule id.
    pub fn from_issues(
        message_type: &str,
        field_count: usize,
        mut issues: Vec<ValidationIssue>,
    ) -> Self {
        issues.sort_by(|a, b| {
            (a.tag.as_deref().unwrap_or(""), a.rule_id.as_str())
                .cmp(&(b.tag.as_deref().unwrap_or(""), b.rule_id.as_str()))
        });

        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);

        Self {
            message_type: message_type.to_string(),
            is_valid: errors.is_empty(),
            errors,
            warnings,
            field_count: field_count as u64,
        }
    }
}

/// Outcome of validating a sequence of message-type codes against the
/// dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub is_valid: bool,
    pub violations: Vec<String>,
    pub recommendations: Vec<String>,
}

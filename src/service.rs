//! Service layer API: the validation entry points plus the sled-backed
//! result sink. The engine itself is pure; only `persist_result` touches
//! the database, and it writes the whole record in one batch.

use crate::builtin::{self, BuiltinSource};
use crate::compliance::check_compliance;
use crate::flow::FlowGraph;
use crate::format::MatcherCache;
use crate::report::{SequenceReport, ValidationIssue, ValidationReport};
use crate::rules::RuleEvaluator;
use crate::schema::SchemaRegistry;
use crate::tokenizer::tokenize;
use crate::utils;
use crate::validator::validate_fields;
use chrono::Utc;
use sled::Batch;
use std::sync::Arc;
use tracing::{debug, info};

/// Validation record as persisted. The raw message itself is stored
/// separately under its content hash.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    #[n(0)]
    pub message_type: String,
    #[n(1)]
    pub content_hash: String,
    #[n(2)]
    pub is_valid: bool,
    #[n(3)]
    pub errors: Vec<ValidationIssue>,
    #[n(4)]
    pub warnings: Vec<ValidationIssue>,
    #[n(5)]
    pub field_count: u64,
    /// Unix seconds at persist time.
    #[n(6)]
    pub stored_at: i64,
}

pub struct ValidationService {
    instance: Arc<sled::Db>,
    registry: SchemaRegistry,
    graph: FlowGraph,
    rules: RuleEvaluator,
    cache: MatcherCache,
}

impl ValidationService {
    pub fn new(
        instance: Arc<sled::Db>,
        registry: SchemaRegistry,
        graph: FlowGraph,
        rules: RuleEvaluator,
    ) -> Self {
        Self {
            instance,
            registry,
            graph,
            rules,
            cache: MatcherCache::new(),
        }
    }

    /// Service with the built-in MT7xx schemas, flow graph and standard
    /// rules. Fails only if the built-in data is corrupt, in which case the
    /// process must not serve.
    pub fn with_builtin(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        let registry = SchemaRegistry::load(&BuiltinSource)?;
        let graph = FlowGraph::load(builtin::flow_edges())?;
        Ok(Self::new(instance, registry, graph, RuleEvaluator::standard()))
    }

    /// Validate one message. Always returns a complete report; malformed
    /// input adds issues, it never errors.
    pub fn validate(&self, message_type: &str, raw_text: &str) -> ValidationReport {
        debug!(message_type, "validating message");

        let fields = tokenize(raw_text);
        let mut issues: Vec<ValidationIssue> = Vec::new();

        if self.registry.contains(message_type) {
            issues.extend(validate_fields(
                &self.registry,
                &self.cache,
                message_type,
                &fields,
            ));
            issues.extend(check_compliance(&self.registry, message_type, &fields));
            issues.extend(self.rules.evaluate(message_type, &fields));
        } else {
            issues.push(ValidationIssue::error(
                None,
                "unknown-message-type",
                format!("no schema loaded for message type MT{message_type}"),
            ));
        }

        ValidationReport::from_issues(message_type, fields.len(), issues)
    }

    /// Validate a sequence of message-type codes against the flow graph.
    pub fn validate_sequence(&self, codes: &[String]) -> SequenceReport {
        self.graph.validate_sequence(codes)
    }

    /// Persist a finished report together with the raw message text. The raw
    /// text is content-addressed by its sha256 digest; the report itself is
    /// stored under a fresh bech32 report id, which is returned.
    pub fn persist_result(
        &self,
        report: &ValidationReport,
        raw_text: &str,
    ) -> anyhow::Result<String> {
        let content_hash = sha256::digest(raw_text);
        let report_id = utils::new_report_id()?;

        let stored = StoredReport {
            message_type: report.message_type.clone(),
            content_hash: content_hash.clone(),
            is_valid: report.is_valid,
            errors: report.errors.clone(),
            warnings: report.warnings.clone(),
            field_count: report.field_count,
            stored_at: Utc::now().timestamp(),
        };

        let mut batch = Batch::default();
        batch.insert(content_hash.as_bytes(), raw_text.as_bytes());
        batch.insert(report_id.as_bytes(), minicbor::to_vec(&stored)?);
        self.instance.apply_batch(batch)?;

        info!(
            %report_id,
            message_type = %stored.message_type,
            is_valid = stored.is_valid,
            "validation result persisted"
        );
        Ok(report_id)
    }

    pub fn load_report(&self, report_id: &str) -> anyhow::Result<Option<StoredReport>> {
        match self.instance.get(report_id.as_bytes())? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn load_raw_text(&self, content_hash: &str) -> anyhow::Result<Option<String>> {
        match self.instance.get(content_hash.as_bytes())? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
            None => Ok(None),
        }
    }
}

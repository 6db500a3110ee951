//! Field definitions and the per-message-type schema registry.
//!
//! The registry is loaded once from a collaborator-supplied source and is
//! read-only afterwards. Reloading means building a whole new instance, so
//! concurrent readers never observe a partially-updated schema.

use crate::error::RegistryError;
use crate::format::FormatMatcher;
use std::collections::HashMap;
use tracing::info;

/// Predicate attached to a conditional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Required when another tag is present in the message.
    RequiredIfPresent { trigger: String },
    /// Required when another tag carries a specific value.
    RequiredIfEquals { trigger: String, value: String },
    /// Either-or group, satisfied if any member tag is present.
    /// The group is evaluated once, on its first member.
    EitherOr { members: Vec<String> },
}

/// One SWIFT field's rules for one message type. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub tag: String,
    pub name: String,
    pub format_spec: String,
    pub mandatory: bool,
    pub conditional: Option<Condition>,
    pub max_occurrences: usize,
    pub allowed_values: Option<Vec<String>>,
}

impl FieldDefinition {
    pub fn new(tag: &str, name: &str, format_spec: &str) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            format_spec: format_spec.to_string(),
            mandatory: false,
            conditional: None,
            max_occurrences: 1,
            allowed_values: None,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn conditional(mut self, condition: Condition) -> Self {
        self.conditional = Some(condition);
        self
    }

    pub fn max_occurrences(mut self, count: usize) -> Self {
        self.max_occurrences = count;
        self
    }

    pub fn allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// All field definitions for one message type, in message order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTypeSchema {
    pub code: String,
    pub version: String,
    pub fields: Vec<FieldDefinition>,
}

impl MessageTypeSchema {
    pub fn new(code: &str, version: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            code: code.to_string(),
            version: version.to_string(),
            fields,
        }
    }
}

/// Collaborator seam: where schemas come from (database, config, built-in).
pub trait SchemaSource {
    fn load(&self) -> anyhow::Result<Vec<MessageTypeSchema>>;
}

/// Read-only lookup of field definitions per message type.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, MessageTypeSchema>,
}

impl SchemaRegistry {
    /// Load and verify all schemas. Every format spec is compiled here so a
    /// corrupt spec aborts the load; the engine refuses to start on failure.
    pub fn load(source: &dyn SchemaSource) -> Result<Self, RegistryError> {
        let schemas = source
            .load()
            .map_err(|e| RegistryError::Source(e.to_string()))?;

        let mut map = HashMap::new();
        for schema in schemas {
            for field in &schema.fields {
                FormatMatcher::compile(&field.format_spec).map_err(|source| {
                    RegistryError::BadFormatSpec {
                        message_type: schema.code.clone(),
                        tag: field.tag.clone(),
                        source,
                    }
                })?;
            }
            let code = schema.code.clone();
            if map.insert(code.clone(), schema).is_some() {
                return Err(RegistryError::DuplicateType(code));
            }
        }

        info!(message_types = map.len(), "schema registry loaded");
        Ok(Self { schemas: map })
    }

    pub fn lookup(&self, message_type: &str, tag: &str) -> Option<&FieldDefinition> {
        self.schemas
            .get(message_type)?
            .fields
            .iter()
            .find(|field| field.tag == tag)
    }

    /// Field definitions for a message type, in message order.
    pub fn fields_for(&self, message_type: &str) -> Option<&[FieldDefinition]> {
        self.schemas
            .get(message_type)
            .map(|schema| schema.fields.as_slice())
    }

    pub fn contains(&self, message_type: &str) -> bool {
        self.schemas.contains_key(message_type)
    }
}

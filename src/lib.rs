//! Validation engine for SWIFT MT7xx documentary-credit messages: a
//! compiler for the field-format mini-language, schema-driven field and
//! compliance checks, cross-field business rules and a dependency graph
//! for legal message-type sequences.

pub mod builtin;
pub mod compliance;
pub mod error;
pub mod flow;
pub mod format;
pub mod report;
pub mod rules;
pub mod schema;
pub mod service;
pub mod tokenizer;
pub mod utils;
pub mod validator;

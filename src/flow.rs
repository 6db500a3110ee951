//! Message-flow dependency graph over MT message-type codes.
//!
//! Two edge kinds: a `Continuation` points to the single direct continuation
//! of a message (MT700 -> MT701), a `BusinessFlow` edge is one of possibly
//! many legal follow-ups in the wider workflow (MT700 -> MT707). Business
//! flows may loop (amendment cycles); continuation chains must not.

use crate::error::GraphError;
use crate::report::SequenceReport;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Continuation,
    BusinessFlow,
}

/// Allowed transition between two message-type codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub description: String,
}

impl DependencyEdge {
    pub fn continuation(source: &str, target: &str, description: &str) -> Self {
        Self::new(source, target, EdgeKind::Continuation, description)
    }

    pub fn business(source: &str, target: &str, description: &str) -> Self {
        Self::new(source, target, EdgeKind::BusinessFlow, description)
    }

    fn new(source: &str, target: &str, kind: EdgeKind, description: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            description: description.to_string(),
        }
    }
}

/// Directed graph of legal message-type transitions. Read-only after load.
#[derive(Debug)]
pub struct FlowGraph {
    successors: HashMap<String, Vec<(String, EdgeKind)>>,
    predecessors: HashMap<String, Vec<String>>,
}

impl FlowGraph {
    /// Build the graph and verify the continuation invariants: at most one
    /// continuation successor per type, and no cycle made purely of
    /// continuation edges.
    pub fn load(edges: Vec<DependencyEdge>) -> Result<Self, GraphError> {
        let mut successors: HashMap<String, Vec<(String, EdgeKind)>> = HashMap::new();
        let mut predecessors: HashMap<String, Vec<String>> = HashMap::new();
        let mut continuation: HashMap<String, String> = HashMap::new();

        for edge in &edges {
            if edge.kind == EdgeKind::Continuation
                && continuation
                    .insert(edge.source.clone(), edge.target.clone())
                    .is_some()
            {
                return Err(GraphError::MultipleContinuations(edge.source.clone()));
            }
            successors
                .entry(edge.source.clone())
                .or_default()
                .push((edge.target.clone(), edge.kind));
            predecessors
                .entry(edge.target.clone())
                .or_default()
                .push(edge.source.clone());
        }

        // Walk each continuation chain; revisiting a node means a cycle.
        for start in continuation.keys() {
            let mut seen = HashSet::new();
            let mut current = start.as_str();
            while let Some(next) = continuation.get(current) {
                if !seen.insert(current.to_string()) {
                    return Err(GraphError::ContinuationCycle(current.to_string()));
                }
                current = next;
            }
        }

        debug!(edges = edges.len(), "message flow graph loaded");
        Ok(Self {
            successors,
            predecessors,
        })
    }

    pub fn allowed_successors(&self, code: &str) -> Vec<&str> {
        let mut targets: Vec<&str> = self
            .successors
            .get(code)
            .map(|edges| edges.iter().map(|(target, _)| target.as_str()).collect())
            .unwrap_or_default();
        targets.sort_unstable();
        targets
    }

    pub fn allowed_predecessors(&self, code: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .predecessors
            .get(code)
            .map(|sources| sources.iter().map(String::as_str).collect())
            .unwrap_or_default();
        sources.sort_unstable();
        sources
    }

    /// Validate every consecutive pair of the sequence. A sequence of length
    /// one or less is trivially valid; violations never block validating the
    /// individual messages themselves.
    pub fn validate_sequence(&self, codes: &[String]) -> SequenceReport {
        let mut violations = Vec::new();
        let mut recommendations = Vec::new();

        for pair in codes.windows(2) {
            let (a, b) = (pair[0].as_str(), pair[1].as_str());
            let allowed = self
                .successors
                .get(a)
                .map(|edges| edges.iter().any(|(target, _)| target == b))
                .unwrap_or(false);
            if allowed {
                continue;
            }

            violations.push(format!("MT{a} may not be followed by MT{b}"));

            let successors = self.allowed_successors(a);
            if successors.is_empty() {
                recommendations.push(format!("MT{a} has no defined successors"));
            } else {
                recommendations.push(format!(
                    "MT{a} may be followed by: {}",
                    successors.join(", ")
                ));
            }

            let predecessors = self.allowed_predecessors(b);
            if !predecessors.is_empty() {
                recommendations.push(format!(
                    "MT{b} may only follow: {}",
                    predecessors.join(", ")
                ));
            }
        }

        SequenceReport {
            is_valid: violations.is_empty(),
            violations,
            recommendations,
        }
    }
}

//! Conversation phases.
//!
//! Each agent variant declares its own phase set, so a phase is a named
//! node in that variant's policy rather than a global enum. The `PhaseSpec` of a
//! phase carries the directive handed to the conversation driver and the
//! fields the phase is responsible for collecting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a phase within a variant's policy (e.g. `collecting`, `round_2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(String);

impl PhaseId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhaseId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for PhaseId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PhaseId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How a phase participates in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Conversation continues; at least one outgoing transition.
    Active,
    /// Normal completion; no outgoing transitions.
    Terminal,
    /// Reached only through an explicit exit; no outgoing transitions.
    EndedEarly,
}

impl PhaseKind {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PhaseKind::Active)
    }
}

/// Declaration of one phase in a conversation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSpec {
    id: PhaseId,
    kind: PhaseKind,
    directive: &'static str,
    /// Fields that must already be collected when the phase is entered.
    requires: Vec<String>,
    /// Fields this phase is responsible for collecting.
    collects: Vec<String>,
}

impl PhaseSpec {
    /// A phase where the conversation keeps going.
    pub fn active(id: &str, directive: &'static str) -> Self {
        Self::with_kind(id, PhaseKind::Active, directive)
    }

    /// A normal end of the conversation.
    pub fn terminal(id: &str, directive: &'static str) -> Self {
        Self::with_kind(id, PhaseKind::Terminal, directive)
    }

    /// The phase reached when the caller asks to stop.
    pub fn ended_early(id: &str, directive: &'static str) -> Self {
        Self::with_kind(id, PhaseKind::EndedEarly, directive)
    }

    fn with_kind(id: &str, kind: PhaseKind, directive: &'static str) -> Self {
        Self {
            id: PhaseId::new(id),
            kind,
            directive,
            requires: Vec::new(),
            collects: Vec::new(),
        }
    }

    pub fn collecting(mut self, fields: &[&str]) -> Self {
        self.collects = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn requiring(mut self, fields: &[&str]) -> Self {
        self.requires = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn id(&self) -> &PhaseId {
        &self.id
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Guidance for the conversation driver while in this phase.
    pub fn directive(&self) -> &'static str {
        self.directive
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn collects(&self) -> &[String] {
        &self.collects
    }

    /// Required fields the phase does not collect itself.
    ///
    /// These must be present before the phase may be entered.
    pub fn prerequisites(&self) -> impl Iterator<Item = &String> {
        self.requires
            .iter()
            .filter(move |field| !self.collects.contains(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_id_compares_with_str() {
        let phase = PhaseId::new("round_1");
        assert_eq!(phase, "round_1");
        assert_eq!(phase.to_string(), "round_1");
    }

    #[test]
    fn phase_id_serializes_transparently() {
        let json = serde_json::to_string(&PhaseId::new("collecting")).unwrap();
        assert_eq!(json, "\"collecting\"");
    }

    #[test]
    fn only_active_kind_is_non_terminal() {
        assert!(!PhaseKind::Active.is_terminal());
        assert!(PhaseKind::Terminal.is_terminal());
        assert!(PhaseKind::EndedEarly.is_terminal());
    }

    #[test]
    fn prerequisites_exclude_self_collected_fields() {
        let spec = PhaseSpec::active("wrap_up", "Summarise the lead.")
            .requiring(&["name", "contact", "summary"])
            .collecting(&["summary"]);

        let prereqs: Vec<_> = spec.prerequisites().cloned().collect();
        assert_eq!(prereqs, vec!["name".to_string(), "contact".to_string()]);
    }

    #[test]
    fn builders_set_kind() {
        assert_eq!(PhaseSpec::terminal("done", "Bye.").kind(), PhaseKind::Terminal);
        assert_eq!(
            PhaseSpec::ended_early("ended_early", "Bye.").kind(),
            PhaseKind::EndedEarly
        );
    }
}

//! Conversation policy.
//!
//! A policy is the per-variant transition table: which phases exist, which
//! gates open each outgoing edge, which edges write a record through to
//! storage, and which utterances end the call early. Policies are plain
//! data validated once at startup; evaluation is a pure function.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::foundation::AgentVariant;

use super::errors::DialogueError;
use super::phase::{PhaseId, PhaseKind, PhaseSpec};
use super::prompt::PromptContext;
use super::session::{field_present, CollectedFields, Session};

/// Phrases that end any variant's session early.
pub const DEFAULT_EXIT_PHRASES: &[&str] = &[
    "goodbye",
    "bye bye",
    "hang up",
    "end the call",
    "end call",
];

/// Condition guarding a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Opens on the first turn spent in the phase.
    Always,
    /// Opens once every listed field holds a non-null value.
    FieldsPresent(Vec<String>),
    /// Opens when a field equals a specific value.
    FieldEquals { field: String, value: Value },
    /// Opens after a fixed number of turns in the current phase.
    TurnsInPhase(u32),
}

impl Gate {
    pub fn fields_present(fields: &[&str]) -> Self {
        Gate::FieldsPresent(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn field_equals(field: &str, value: impl Into<Value>) -> Self {
        Gate::FieldEquals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn is_open(&self, snapshot: &TurnSnapshot<'_>) -> bool {
        match self {
            Gate::Always => true,
            Gate::FieldsPresent(fields) => fields
                .iter()
                .all(|field| field_present(snapshot.fields, field)),
            Gate::FieldEquals { field, value } => snapshot.fields.get(field) == Some(value),
            Gate::TurnsInPhase(n) => snapshot.turns_in_phase >= *n,
        }
    }
}

/// Record written through to storage when a transition is taken.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistEffect {
    kind: String,
    fields: Vec<String>,
    fixed: Vec<(String, Value)>,
}

impl PersistEffect {
    /// Copies the listed fields into a record of the given kind.
    pub fn record(kind: &str, fields: &[&str]) -> Self {
        Self {
            kind: kind.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            fixed: Vec::new(),
        }
    }

    /// Adds a constant entry to the payload.
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fixed.push((key.to_string(), value.into()));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Builds the record payload from the session's collected fields.
    ///
    /// Absent fields are skipped rather than written as null.
    pub fn payload(&self, collected: &CollectedFields) -> Value {
        let mut payload = Map::new();
        for field in &self.fields {
            if let Some(value) = collected.get(field).filter(|v| !v.is_null()) {
                payload.insert(field.clone(), value.clone());
            }
        }
        for (key, value) in &self.fixed {
            payload.insert(key.clone(), value.clone());
        }
        Value::Object(payload)
    }
}

/// An outgoing edge of a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    target: PhaseId,
    gate: Gate,
    persist: Option<PersistEffect>,
    clears: Vec<String>,
}

impl Transition {
    pub fn to(target: &str, gate: Gate) -> Self {
        Self {
            target: PhaseId::new(target),
            gate,
            persist: None,
            clears: Vec::new(),
        }
    }

    /// Writes a record when this edge is taken.
    pub fn persisting(mut self, effect: PersistEffect) -> Self {
        self.persist = Some(effect);
        self
    }

    /// Drops fields when this edge is taken, so their gates can reopen.
    pub fn clearing(mut self, fields: &[&str]) -> Self {
        self.clears = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn target(&self) -> &PhaseId {
        &self.target
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn persist(&self) -> Option<&PersistEffect> {
        self.persist.as_ref()
    }

    pub fn clears(&self) -> &[String] {
        &self.clears
    }
}

/// What the policy sees when evaluating a turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnSnapshot<'a> {
    pub fields: &'a CollectedFields,
    pub turns_in_phase: u32,
    pub utterance: Option<&'a str>,
    pub exit_requested: bool,
}

impl<'a> TurnSnapshot<'a> {
    /// Snapshot of a session whose turn has already been recorded.
    pub fn of(session: &'a Session, utterance: Option<&'a str>, exit_requested: bool) -> Self {
        Self {
            fields: session.collected_fields(),
            turns_in_phase: session.turns_in_phase(),
            utterance,
            exit_requested,
        }
    }
}

/// Outcome of evaluating a policy against a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyDecision<'p> {
    /// The caller asked to stop; route to the ended-early phase.
    Exit(&'p PhaseId),
    /// Take this transition.
    Advance(&'p Transition),
    /// No gate opened; stay in the current phase.
    Stay,
}

/// Per-variant transition table.
#[derive(Debug, Clone)]
pub struct ConversationPolicy {
    variant: AgentVariant,
    start: PhaseId,
    ended_early: PhaseId,
    phases: Vec<PhaseSpec>,
    transitions: HashMap<PhaseId, Vec<Transition>>,
    exit_phrases: Vec<String>,
    recall_kind: Option<String>,
}

impl ConversationPolicy {
    pub fn builder(variant: AgentVariant, start: &str) -> PolicyBuilder {
        PolicyBuilder {
            variant,
            start: PhaseId::new(start),
            phases: Vec::new(),
            transitions: Vec::new(),
            exit_phrases: DEFAULT_EXIT_PHRASES.iter().map(|p| p.to_string()).collect(),
            recall_kind: None,
        }
    }

    pub fn variant(&self) -> AgentVariant {
        self.variant
    }

    pub fn start_phase(&self) -> &PhaseId {
        &self.start
    }

    pub fn ended_early_phase(&self) -> &PhaseId {
        &self.ended_early
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    pub fn phase(&self, id: &PhaseId) -> Option<&PhaseSpec> {
        self.phases.iter().find(|spec| spec.id() == id)
    }

    pub fn has_phase(&self, id: &PhaseId) -> bool {
        self.phase(id).is_some()
    }

    pub fn transitions_from(&self, id: &PhaseId) -> &[Transition] {
        self.transitions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn exit_phrases(&self) -> &[String] {
        &self.exit_phrases
    }

    /// Record kind recalled for the caller when a session starts.
    pub fn recall_kind(&self) -> Option<&str> {
        self.recall_kind.as_deref()
    }

    /// Returns true if the utterance contains one of the exit phrases as
    /// whole words, ignoring case and punctuation.
    pub fn is_exit_utterance(&self, utterance: &str) -> bool {
        let padded = format!(" {} ", normalize(utterance));
        self.exit_phrases
            .iter()
            .map(|phrase| normalize(phrase))
            .filter(|phrase| !phrase.is_empty())
            .any(|phrase| padded.contains(&format!(" {} ", phrase)))
    }

    /// Fields the phase collects that are not yet present.
    pub fn missing_fields(&self, phase: &PhaseId, fields: &CollectedFields) -> Vec<String> {
        self.phase(phase)
            .map(|spec| {
                spec.collects()
                    .iter()
                    .filter(|field| !field_present(fields, field))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Prompt context for the session's current phase, without tools.
    pub fn prompt_for(&self, session: &Session) -> PromptContext {
        PromptContext {
            variant: self.variant,
            phase: session.phase().clone(),
            status: session.status(),
            directive: self
                .phase(session.phase())
                .map(PhaseSpec::directive)
                .unwrap_or_default()
                .to_string(),
            missing_fields: self.missing_fields(session.phase(), session.collected_fields()),
            available_tools: Vec::new(),
            recall: None,
        }
    }

    /// Decides where a session goes after a recorded turn.
    ///
    /// Exit always wins. Otherwise the first declared transition whose gate
    /// is open and whose target's prerequisites are collected is taken.
    pub fn evaluate(&self, phase: &PhaseId, snapshot: &TurnSnapshot<'_>) -> PolicyDecision<'_> {
        match self.phase(phase) {
            Some(spec) if !spec.is_terminal() => {}
            _ => return PolicyDecision::Stay,
        }

        let exit_spoken = snapshot
            .utterance
            .map_or(false, |text| self.is_exit_utterance(text));
        if snapshot.exit_requested || exit_spoken {
            return PolicyDecision::Exit(&self.ended_early);
        }

        self.transitions_from(phase)
            .iter()
            .find(|transition| {
                transition.gate.is_open(snapshot) && self.prerequisites_met(&transition.target, snapshot.fields)
            })
            .map(PolicyDecision::Advance)
            .unwrap_or(PolicyDecision::Stay)
    }

    fn prerequisites_met(&self, target: &PhaseId, fields: &CollectedFields) -> bool {
        self.phase(target).map_or(false, |spec| {
            spec.prerequisites().all(|field| field_present(fields, field))
        })
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds and validates a [`ConversationPolicy`].
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    variant: AgentVariant,
    start: PhaseId,
    phases: Vec<PhaseSpec>,
    transitions: Vec<(PhaseId, Transition)>,
    exit_phrases: Vec<String>,
    recall_kind: Option<String>,
}

impl PolicyBuilder {
    pub fn phase(mut self, spec: PhaseSpec) -> Self {
        self.phases.push(spec);
        self
    }

    /// Appends an outgoing edge. Declaration order is evaluation order.
    pub fn transition(mut self, from: &str, transition: Transition) -> Self {
        self.transitions.push((PhaseId::new(from), transition));
        self
    }

    /// Adds variant-specific exit phrases to the defaults.
    pub fn exit_phrases(mut self, phrases: &[&str]) -> Self {
        self.exit_phrases.extend(phrases.iter().map(|p| p.to_string()));
        self
    }

    /// Replaces the defaults entirely, for variants whose in-game speech
    /// would otherwise trip them ("I wave goodbye to the innkeeper").
    pub fn exit_phrases_only(mut self, phrases: &[&str]) -> Self {
        self.exit_phrases = phrases.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn recall(mut self, record_kind: &str) -> Self {
        self.recall_kind = Some(record_kind.to_string());
        self
    }

    pub fn build(self) -> Result<ConversationPolicy, DialogueError> {
        let variant = self.variant;
        let invalid = |reason: String| DialogueError::invalid_policy(variant, reason);

        let mut seen = HashSet::new();
        for spec in &self.phases {
            if !seen.insert(spec.id().clone()) {
                return Err(invalid(format!("phase '{}' is declared twice", spec.id())));
            }
        }

        let kind_of = |id: &PhaseId| {
            self.phases
                .iter()
                .find(|spec| spec.id() == id)
                .map(PhaseSpec::kind)
        };

        match kind_of(&self.start) {
            Some(PhaseKind::Active) => {}
            Some(_) => return Err(invalid(format!("start phase '{}' is terminal", self.start))),
            None => return Err(invalid(format!("start phase '{}' is not declared", self.start))),
        }

        let mut ended_early = self
            .phases
            .iter()
            .filter(|spec| spec.kind() == PhaseKind::EndedEarly)
            .map(|spec| spec.id().clone());
        let ended_early = match (ended_early.next(), ended_early.next()) {
            (Some(id), None) => id,
            (None, _) => return Err(invalid("no ended-early phase declared".to_string())),
            (Some(_), Some(_)) => {
                return Err(invalid("more than one ended-early phase declared".to_string()))
            }
        };

        let mut transitions: HashMap<PhaseId, Vec<Transition>> = HashMap::new();
        for (from, transition) in self.transitions {
            match kind_of(&from) {
                None => {
                    return Err(invalid(format!("transition from undeclared phase '{}'", from)))
                }
                Some(kind) if kind.is_terminal() => {
                    return Err(invalid(format!("terminal phase '{}' has an outgoing transition", from)))
                }
                Some(_) => {}
            }
            match kind_of(&transition.target) {
                None => {
                    return Err(invalid(format!(
                        "transition from '{}' targets undeclared phase '{}'",
                        from, transition.target
                    )))
                }
                Some(PhaseKind::EndedEarly) => {
                    return Err(invalid(format!(
                        "'{}' is reached only through an exit, not from '{}'",
                        transition.target, from
                    )))
                }
                Some(_) => {}
            }
            transitions.entry(from).or_default().push(transition);
        }

        for spec in self.phases.iter().filter(|spec| !spec.is_terminal()) {
            if !transitions.contains_key(spec.id()) {
                return Err(invalid(format!("phase '{}' has no outgoing transition", spec.id())));
            }
        }

        let mut reachable = HashSet::from([self.start.clone(), ended_early.clone()]);
        let mut queue = VecDeque::from([self.start.clone()]);
        while let Some(phase) = queue.pop_front() {
            for transition in transitions.get(&phase).into_iter().flatten() {
                if reachable.insert(transition.target.clone()) {
                    queue.push_back(transition.target.clone());
                }
            }
        }
        if let Some(orphan) = self.phases.iter().find(|spec| !reachable.contains(spec.id())) {
            return Err(invalid(format!("phase '{}' is unreachable", orphan.id())));
        }

        if self.exit_phrases.iter().all(|p| normalize(p).is_empty()) {
            return Err(invalid("no exit phrases declared".to_string()));
        }

        Ok(ConversationPolicy {
            variant,
            start: self.start,
            ended_early,
            phases: self.phases,
            transitions,
            exit_phrases: self.exit_phrases,
            recall_kind: self.recall_kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> CollectedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn order_policy() -> ConversationPolicy {
        ConversationPolicy::builder(AgentVariant::CoffeeOrder, "collecting")
            .phase(PhaseSpec::active("collecting", "Collect.").collecting(&["size", "name"]))
            .phase(PhaseSpec::active("confirming", "Confirm.").requiring(&["size", "name"]))
            .phase(PhaseSpec::terminal("done", "Thanks."))
            .phase(PhaseSpec::ended_early("ended_early", "Bye."))
            .transition(
                "collecting",
                Transition::to("confirming", Gate::fields_present(&["size", "name"]))
                    .persisting(PersistEffect::record("order", &["size", "name"])),
            )
            .transition("confirming", Transition::to("done", Gate::field_equals("confirmed", true)))
            .transition(
                "confirming",
                Transition::to("collecting", Gate::field_equals("confirmed", false))
                    .clearing(&["confirmed"]),
            )
            .exit_phrases(&["cancel my order"])
            .build()
            .expect("valid policy")
    }

    fn snapshot<'a>(fields: &'a CollectedFields, utterance: Option<&'a str>) -> TurnSnapshot<'a> {
        TurnSnapshot {
            fields,
            turns_in_phase: 1,
            utterance,
            exit_requested: false,
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn stays_until_all_fields_collected() {
            let policy = order_policy();
            let partial = fields(&[("size", json!("large"))]);

            let decision = policy.evaluate(&"collecting".into(), &snapshot(&partial, None));
            assert_eq!(decision, PolicyDecision::Stay);
        }

        #[test]
        fn advances_when_gate_opens() {
            let policy = order_policy();
            let full = fields(&[("size", json!("large")), ("name", json!("Ana"))]);

            match policy.evaluate(&"collecting".into(), &snapshot(&full, None)) {
                PolicyDecision::Advance(t) => {
                    assert_eq!(t.target(), &PhaseId::new("confirming"));
                    assert_eq!(t.persist().map(PersistEffect::kind), Some("order"));
                }
                other => panic!("expected advance, got {:?}", other),
            }
        }

        #[test]
        fn exit_phrase_wins_over_open_gate() {
            let policy = order_policy();
            let full = fields(&[("size", json!("large")), ("name", json!("Ana"))]);

            let decision = policy.evaluate(
                &"collecting".into(),
                &snapshot(&full, Some("Actually, cancel my order please.")),
            );
            assert_eq!(decision, PolicyDecision::Exit(&PhaseId::new("ended_early")));
        }

        #[test]
        fn explicit_exit_request_wins() {
            let policy = order_policy();
            let empty = CollectedFields::new();
            let mut snap = snapshot(&empty, None);
            snap.exit_requested = true;

            assert!(matches!(
                policy.evaluate(&"collecting".into(), &snap),
                PolicyDecision::Exit(_)
            ));
        }

        #[test]
        fn first_declared_transition_wins() {
            let policy = order_policy();
            let declined = fields(&[("confirmed", json!(false))]);

            match policy.evaluate(&"confirming".into(), &snapshot(&declined, None)) {
                PolicyDecision::Advance(t) => {
                    assert_eq!(t.target(), &PhaseId::new("collecting"));
                    assert_eq!(t.clears(), &["confirmed".to_string()]);
                }
                other => panic!("expected advance, got {:?}", other),
            }
        }

        #[test]
        fn unmet_prerequisites_block_transition() {
            let policy = ConversationPolicy::builder(AgentVariant::LeadCapture, "discovery")
                .phase(PhaseSpec::active("discovery", "Ask."))
                .phase(PhaseSpec::terminal("wrap_up", "Wrap.").requiring(&["contact"]))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("discovery", Transition::to("wrap_up", Gate::Always))
                .build()
                .expect("valid policy");
            let empty = CollectedFields::new();

            assert_eq!(
                policy.evaluate(&"discovery".into(), &snapshot(&empty, None)),
                PolicyDecision::Stay
            );
        }

        #[test]
        fn terminal_phase_never_moves() {
            let policy = order_policy();
            let empty = CollectedFields::new();
            let mut snap = snapshot(&empty, Some("goodbye"));
            snap.exit_requested = true;

            assert_eq!(policy.evaluate(&"done".into(), &snap), PolicyDecision::Stay);
        }

        #[test]
        fn turn_gate_counts_turns_in_phase() {
            let gate = Gate::TurnsInPhase(3);
            let empty = CollectedFields::new();
            let mut snap = snapshot(&empty, None);

            snap.turns_in_phase = 2;
            assert!(!gate.is_open(&snap));
            snap.turns_in_phase = 3;
            assert!(gate.is_open(&snap));
        }
    }

    mod exit_phrases {
        use super::*;

        #[test]
        fn matches_whole_words_case_insensitively() {
            let policy = order_policy();
            assert!(policy.is_exit_utterance("OK, GOODBYE!"));
            assert!(policy.is_exit_utterance("please hang up now"));
        }

        #[test]
        fn ignores_partial_words() {
            let policy = order_policy();
            assert!(!policy.is_exit_utterance("goodbyes are hard"));
            assert!(!policy.is_exit_utterance("one large latte"));
        }

        #[test]
        fn override_drops_the_defaults() {
            let policy = ConversationPolicy::builder(AgentVariant::GameMaster, "discovery")
                .phase(PhaseSpec::active("discovery", "Ask."))
                .phase(PhaseSpec::terminal("done", "Thank."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("discovery", Transition::to("done", Gate::Always))
                .exit_phrases_only(&["stop game"])
                .build()
                .unwrap();

            assert!(policy.is_exit_utterance("ok stop game"));
            assert!(!policy.is_exit_utterance("goodbye"));
            assert!(!policy.is_exit_utterance("hang up the lantern"));
        }

        #[test]
        fn empty_override_is_rejected() {
            let result = ConversationPolicy::builder(AgentVariant::GameMaster, "discovery")
                .phase(PhaseSpec::active("discovery", "Ask."))
                .phase(PhaseSpec::terminal("done", "Thank."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("discovery", Transition::to("done", Gate::Always))
                .exit_phrases_only(&[])
                .build();

            assert!(result.is_err());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn rejects_missing_start_phase() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "nowhere")
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }

        #[test]
        fn rejects_active_phase_without_outgoing_edge() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "greeting")
                .phase(PhaseSpec::active("greeting", "Hi."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }

        #[test]
        fn rejects_edge_out_of_terminal_phase() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "greeting")
                .phase(PhaseSpec::active("greeting", "Hi."))
                .phase(PhaseSpec::terminal("done", "Bye."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("greeting", Transition::to("done", Gate::Always))
                .transition("done", Transition::to("greeting", Gate::Always))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }

        #[test]
        fn rejects_missing_ended_early_phase() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "greeting")
                .phase(PhaseSpec::active("greeting", "Hi."))
                .phase(PhaseSpec::terminal("done", "Bye."))
                .transition("greeting", Transition::to("done", Gate::Always))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }

        #[test]
        fn rejects_unreachable_phase() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "greeting")
                .phase(PhaseSpec::active("greeting", "Hi."))
                .phase(PhaseSpec::terminal("done", "Bye."))
                .phase(PhaseSpec::terminal("island", "Unreachable."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("greeting", Transition::to("done", Gate::Always))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }

        #[test]
        fn rejects_direct_edge_into_ended_early() {
            let result = ConversationPolicy::builder(AgentVariant::Starter, "greeting")
                .phase(PhaseSpec::active("greeting", "Hi."))
                .phase(PhaseSpec::ended_early("ended_early", "Bye."))
                .transition("greeting", Transition::to("ended_early", Gate::Always))
                .build();
            assert!(matches!(result, Err(DialogueError::InvalidPolicy { .. })));
        }
    }

    #[test]
    fn persist_payload_skips_absent_fields_and_adds_constants() {
        let effect = PersistEffect::record("fraud_case", &["case_id", "note"])
            .with_value("status", "verification_failed");
        let collected = fields(&[("case_id", json!("C-1"))]);

        assert_eq!(
            effect.payload(&collected),
            json!({"case_id": "C-1", "status": "verification_failed"})
        );
    }

    #[test]
    fn missing_fields_lists_uncollected() {
        let policy = order_policy();
        let partial = fields(&[("size", json!("large"))]);

        assert_eq!(
            policy.missing_fields(&"collecting".into(), &partial),
            vec!["name".to_string()]
        );
    }
}

//! Session aggregate.
//!
//! One live conversation with one caller. The controller owns the only
//! mutable handle; everything else sees clones.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::{
    AgentVariant, SessionId, SessionStatus, StateMachine, Timestamp, UserId, ValidationError,
};

use super::phase::PhaseId;

/// Field name to JSON value, ordered for stable rendering.
pub type CollectedFields = BTreeMap<String, Value>;

/// Returns true if `field` holds a non-null value.
pub fn field_present(fields: &CollectedFields, field: &str) -> bool {
    fields.get(field).map_or(false, |value| !value.is_null())
}

/// A dialogue session for one agent variant.
///
/// # Invariants
///
/// - `turn_count` never decreases
/// - `phase_entered_at_turn <= turn_count`
/// - once `status` is terminal, the phase never changes again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    variant: AgentVariant,
    user_id: Option<UserId>,
    phase: PhaseId,
    status: SessionStatus,
    turn_count: u32,
    phase_entered_at_turn: u32,
    collected_fields: CollectedFields,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Opens a fresh session in the given start phase.
    pub fn new(variant: AgentVariant, user_id: Option<UserId>, start: PhaseId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            variant,
            user_id,
            phase: start,
            status: SessionStatus::Active,
            turn_count: 0,
            phase_entered_at_turn: 0,
            collected_fields: CollectedFields::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds an active session at an arbitrary point in its flow.
    ///
    /// The phase is treated as having been entered on `turn_count`.
    pub fn at_phase(
        variant: AgentVariant,
        phase: PhaseId,
        turn_count: u32,
        collected_fields: CollectedFields,
    ) -> Self {
        let mut session = Self::new(variant, None, phase);
        session.turn_count = turn_count;
        session.phase_entered_at_turn = turn_count;
        session.collected_fields = collected_fields;
        session
    }

    /// Reconstitutes a session from stored state without validation.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        variant: AgentVariant,
        user_id: Option<UserId>,
        phase: PhaseId,
        status: SessionStatus,
        turn_count: u32,
        phase_entered_at_turn: u32,
        collected_fields: CollectedFields,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            variant,
            user_id,
            phase,
            status,
            turn_count,
            phase_entered_at_turn: phase_entered_at_turn.min(turn_count),
            collected_fields,
            created_at,
            updated_at,
        }
    }

    /// Attaches a caller identity, used for recall lookups.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> AgentVariant {
        self.variant
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn phase(&self) -> &PhaseId {
        &self.phase
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn phase_entered_at_turn(&self) -> u32 {
        self.phase_entered_at_turn
    }

    /// Turns completed since the current phase was entered.
    pub fn turns_in_phase(&self) -> u32 {
        self.turn_count.saturating_sub(self.phase_entered_at_turn)
    }

    pub fn collected_fields(&self) -> &CollectedFields {
        &self.collected_fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.collected_fields.get(name).filter(|v| !v.is_null())
    }

    /// String value of a field, if present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        field_present(&self.collected_fields, name)
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        !self.status.is_mutable()
    }

    /// Returns a copy with `updates` merged in, for tools that run
    /// earlier in the same turn to be visible to later ones.
    pub fn with_pending_fields(&self, updates: &CollectedFields) -> Self {
        let mut preview = self.clone();
        preview.merge_fields(updates.clone());
        preview
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations (controller only)
    // ───────────────────────────────────────────────────────────────

    /// Counts a turn and merges its field updates.
    pub(crate) fn record_turn(&mut self, updates: CollectedFields) {
        self.merge_fields(updates);
        self.turn_count += 1;
        self.updated_at = Timestamp::now();
    }

    /// Moves to `phase`, resetting the in-phase turn counter.
    ///
    /// A status change must be a lifecycle edge; staying `Active` is not a
    /// change. On error the session is left as it was.
    pub(crate) fn enter_phase(&mut self, phase: PhaseId, status: SessionStatus) -> Result<(), ValidationError> {
        if status != self.status {
            self.status = self.status.transition_to(status)?;
        }
        self.phase = phase;
        self.phase_entered_at_turn = self.turn_count;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub(crate) fn clear_fields(&mut self, fields: &[String]) {
        for field in fields {
            self.collected_fields.remove(field);
        }
    }

    fn merge_fields(&mut self, updates: CollectedFields) {
        self.collected_fields.extend(updates);
    }
}

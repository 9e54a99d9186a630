//! SessionController - owns live sessions and advances them turn by turn.
//!
//! Each session sits behind its own async mutex, so turns of one session
//! are strictly serialized while different sessions proceed in parallel.
//! A turn is computed on a copy and committed only once any write-through
//! record is durable; a failed write leaves the session exactly as it was.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::conversation::{
    CollectedFields, ConversationPolicy, DialogueError, PhaseId, PhaseKind, PolicyDecision,
    PromptContext, Session, TurnSnapshot,
};
use crate::domain::foundation::{AgentVariant, RecordId, SessionId, SessionStatus, UserId};
use crate::domain::records::NewRecord;
use crate::ports::RecordStore;

/// Exclusive handle on a live session for the duration of a turn.
pub type SessionGuard = OwnedMutexGuard<Session>;

/// Input to one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnInput {
    pub field_updates: CollectedFields,
    pub utterance: Option<String>,
    pub exit_requested: bool,
}

impl TurnInput {
    pub fn with_fields(field_updates: CollectedFields) -> Self {
        Self {
            field_updates,
            ..Self::default()
        }
    }

    pub fn from_utterance(text: impl Into<String>) -> Self {
        Self {
            utterance: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn exit() -> Self {
        Self {
            exit_requested: true,
            ..Self::default()
        }
    }

    pub fn with_utterance(mut self, text: impl Into<String>) -> Self {
        self.utterance = Some(text.into());
        self
    }
}

/// How a turn moved the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceStatus {
    Advanced { from: PhaseId, to: PhaseId },
    EndedEarly { from: PhaseId },
    /// No transition's gate opened; the session stays put.
    Insufficient,
}

/// Result of advancing a session.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub session: Session,
    pub status: AdvanceStatus,
    pub record_id: Option<RecordId>,
    pub prompt: PromptContext,
}

/// Ended sessions kept for lookup before the oldest are dropped.
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 1024;

/// Ended sessions in the order they ended.
///
/// Once full, each newly ended session evicts the oldest one; an evicted
/// id reports `SessionNotFound` from then on.
struct Archive {
    sessions: HashMap<SessionId, Session>,
    order: VecDeque<SessionId>,
    capacity: usize,
}

impl Archive {
    fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stores `session`, returning the id evicted to make room, if any.
    fn insert(&mut self, session: Session) -> Option<SessionId> {
        let id = session.id();
        if self.sessions.insert(id, session).is_none() {
            self.order.push_back(id);
        }
        if self.sessions.len() <= self.capacity {
            return None;
        }
        let oldest = self.order.pop_front()?;
        self.sessions.remove(&oldest);
        Some(oldest)
    }

    fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Owner of every session in the process.
pub struct SessionController {
    policies: HashMap<AgentVariant, Arc<ConversationPolicy>>,
    store: Arc<dyn RecordStore>,
    active: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    archived: RwLock<Archive>,
}

impl SessionController {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            policies: HashMap::new(),
            store,
            active: RwLock::new(HashMap::new()),
            archived: RwLock::new(Archive::new(DEFAULT_ARCHIVE_CAPACITY)),
        }
    }

    /// Caps how many ended sessions stay queryable. A zero cap keeps one.
    pub fn with_archive_capacity(mut self, capacity: usize) -> Self {
        self.archived = RwLock::new(Archive::new(capacity));
        self
    }

    pub fn with_policy(mut self, policy: ConversationPolicy) -> Self {
        self.register_policy(policy);
        self
    }

    pub fn register_policy(&mut self, policy: ConversationPolicy) {
        self.policies.insert(policy.variant(), Arc::new(policy));
    }

    pub fn policy(&self, variant: AgentVariant) -> Result<&Arc<ConversationPolicy>, DialogueError> {
        self.policies.get(&variant).ok_or_else(|| {
            DialogueError::invalid_policy(variant, "no conversation policy is registered")
        })
    }

    /// Opens a session in the variant's start phase.
    pub async fn create_session(
        &self,
        variant: AgentVariant,
        user_id: Option<UserId>,
    ) -> Result<Session, DialogueError> {
        let policy = self.policy(variant)?;
        let session = Session::new(variant, user_id, policy.start_phase().clone());

        self.active
            .write()
            .await
            .insert(session.id(), Arc::new(Mutex::new(session.clone())));

        tracing::info!(
            session_id = %session.id(),
            variant = %variant,
            phase = %session.phase(),
            "Session created"
        );
        Ok(session)
    }

    /// Takes ownership of a session built elsewhere, e.g. restored state.
    pub async fn resume(&self, session: Session) -> Result<(), DialogueError> {
        let policy = self.policy(session.variant())?;
        if !policy.has_phase(session.phase()) {
            return Err(DialogueError::invalid_policy(
                session.variant(),
                format!("phase '{}' is not part of the policy", session.phase()),
            ));
        }

        let id = session.id();
        if self.active.read().await.contains_key(&id) || self.archived.read().await.contains(&id) {
            return Err(DialogueError::internal(format!("session {} is already registered", id)));
        }

        if session.is_terminal() {
            self.store_archived(session).await;
        } else {
            self.active.write().await.insert(id, Arc::new(Mutex::new(session)));
        }
        Ok(())
    }

    /// Current state of a live or archived session.
    pub async fn get(&self, id: SessionId) -> Result<Session, DialogueError> {
        let live = self.active.read().await.get(&id).cloned();
        if let Some(handle) = live {
            return Ok(handle.lock().await.clone());
        }
        self.archived
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DialogueError::SessionNotFound(id))
    }

    pub async fn is_terminal(&self, id: SessionId) -> Result<bool, DialogueError> {
        Ok(self.get(id).await?.is_terminal())
    }

    /// Locks a live session for one turn.
    ///
    /// Waits behind any turn already in progress for the same session.
    pub async fn checkout(&self, id: SessionId) -> Result<SessionGuard, DialogueError> {
        let live = self.active.read().await.get(&id).cloned();
        let handle = match live {
            Some(handle) => handle,
            None if self.archived.read().await.contains(&id) => {
                return Err(DialogueError::SessionClosed(id))
            }
            None => return Err(DialogueError::SessionNotFound(id)),
        };

        let guard = handle.lock_owned().await;
        if guard.is_terminal() {
            return Err(DialogueError::SessionClosed(id));
        }
        Ok(guard)
    }

    /// Locks, advances and releases a session.
    pub async fn advance(&self, id: SessionId, input: TurnInput) -> Result<AdvanceOutcome, DialogueError> {
        let mut guard = self.checkout(id).await?;
        self.advance_locked(&mut guard, input).await
    }

    /// Advances a session the caller has already checked out.
    ///
    /// The turn counts even when no gate opens. Exit wins over every
    /// transition. If a write-through record cannot be stored the session
    /// is left untouched and `PersistenceUnavailable` is returned.
    pub async fn advance_locked(
        &self,
        session: &mut Session,
        input: TurnInput,
    ) -> Result<AdvanceOutcome, DialogueError> {
        if session.is_terminal() {
            return Err(DialogueError::SessionClosed(session.id()));
        }
        let policy = Arc::clone(self.policy(session.variant())?);

        let mut next = session.clone();
        next.record_turn(input.field_updates);
        let from = next.phase().clone();

        let decision = policy.evaluate(
            &from,
            &TurnSnapshot::of(&next, input.utterance.as_deref(), input.exit_requested),
        );

        let (status, record_id) = match decision {
            PolicyDecision::Exit(target) => {
                next.enter_phase(target.clone(), SessionStatus::EndedEarly)
                    .map_err(|e| DialogueError::internal(e.to_string()))?;
                (AdvanceStatus::EndedEarly { from }, None)
            }
            PolicyDecision::Advance(transition) => {
                let target = transition.target().clone();
                let status = match policy.phase(&target).map(|spec| spec.kind()) {
                    Some(PhaseKind::Terminal) => SessionStatus::Completed,
                    Some(PhaseKind::EndedEarly) => SessionStatus::EndedEarly,
                    _ => SessionStatus::Active,
                };
                next.enter_phase(target.clone(), status)
                    .map_err(|e| DialogueError::internal(e.to_string()))?;

                let record_id = match transition.persist() {
                    Some(effect) => {
                        let record = NewRecord::new(
                            next.id(),
                            next.user_id().cloned(),
                            effect.kind(),
                            effect.payload(next.collected_fields()),
                        );
                        let id = self.store.append(next.variant(), record).await.map_err(|e| {
                            tracing::warn!(
                                session_id = %next.id(),
                                variant = %next.variant(),
                                phase = %from,
                                error = %e,
                                "Write-through failed; turn not committed"
                            );
                            DialogueError::from(e)
                        })?;
                        Some(id)
                    }
                    None => None,
                };

                next.clear_fields(transition.clears());
                (AdvanceStatus::Advanced { from, to: target }, record_id)
            }
            PolicyDecision::Stay => (AdvanceStatus::Insufficient, None),
        };

        *session = next;

        match &status {
            AdvanceStatus::Insufficient => tracing::debug!(
                session_id = %session.id(),
                phase = %session.phase(),
                turn = session.turn_count(),
                "No transition gate open"
            ),
            _ => tracing::info!(
                session_id = %session.id(),
                variant = %session.variant(),
                phase = %session.phase(),
                turn = session.turn_count(),
                status = %session.status(),
                "Session advanced"
            ),
        }

        if session.is_terminal() {
            self.archive(session).await;
        }

        Ok(AdvanceOutcome {
            session: session.clone(),
            status,
            record_id,
            prompt: policy.prompt_for(session),
        })
    }

    async fn archive(&self, session: &Session) {
        let id = session.id();
        self.store_archived(session.clone()).await;
        self.active.write().await.remove(&id);
        tracing::debug!(session_id = %id, "Session archived");
    }

    async fn store_archived(&self, session: Session) {
        if let Some(evicted) = self.archived.write().await.insert(session) {
            tracing::debug!(session_id = %evicted, "Archived session evicted");
        }
    }

    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }

    pub async fn archived_count(&self) -> usize {
        self.archived.read().await.len()
    }
}

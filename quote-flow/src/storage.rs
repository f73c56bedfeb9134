use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{answers::Answers, error::Result, flow::FlowState, step::StepId};

/// One user's pass through the quote flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub state: FlowState,
    pub answers: Answers,
    /// Route most recently shown to the user, used to tell forward from back.
    pub last_route: Option<String>,
    pub status_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new_at_step(id: impl Into<String>, step: StepId) -> Self {
        Self {
            id: id.into(),
            state: FlowState::Step { step },
            answers: Answers::new(),
            last_route: None,
            status_message: None,
            updated_at: Utc::now(),
        }
    }

    /// Fresh session with a random id, positioned on `step`.
    pub fn start(step: StepId) -> Self {
        Self::new_at_step(Uuid::new_v4().to_string(), step)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

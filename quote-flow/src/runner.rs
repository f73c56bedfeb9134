//! FlowRunner – convenience wrapper that loads a session, applies exactly **one** navigation
//! request to it, and persists the updated session back to storage.
//!
//! An HTTP service usually handles one Continue or Back per request: create the runner once at
//! startup, share it across handlers, and let it do the load → navigate → save roundtrip.
//!
//! ```rust,ignore
//! let runner = FlowRunner::new(Arc::new(QuoteFlow::standard()), storage);
//! let session = runner.start().await?;
//! let nav = runner.advance(&session.id, &step_answers).await?;
//! ```

use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    answers::Answers,
    codec::{from_query, with_query},
    error::{FlowError, Result},
    flow::{Direction, FlowState, Navigation, QuoteFlow},
    step::StepId,
    storage::{Session, SessionStorage},
};

/// Result of landing on a route.
#[derive(Debug, Clone)]
pub struct Visit {
    pub session: Session,
    pub direction: Direction,
    /// False when the guard sent the user back to the first step.
    pub admitted: bool,
}

/// High-level helper that orchestrates the common _load → navigate → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    flow: Arc<QuoteFlow>,
    storage: Arc<dyn SessionStorage>,
}

impl FlowRunner {
    pub fn new(flow: Arc<QuoteFlow>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { flow, storage }
    }

    pub fn flow(&self) -> &QuoteFlow {
        &self.flow
    }

    fn first_step(&self) -> StepId {
        self.flow
            .first_step()
            .map(|step| step.id())
            .unwrap_or(StepId::Location)
    }

    /// Open a new session on the first step.
    pub async fn start(&self) -> Result<Session> {
        let first = self.first_step();
        let mut session = Session::start(first);
        session.last_route = Some(first.route());
        self.storage.save(session.clone()).await?;
        info!(session_id = %session.id, "quote session started");
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<Session> {
        self.storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))
    }

    /// Land on `route` (path plus query). The query replaces the session's
    /// answers; a route the guard rejects lands on the first step instead.
    pub async fn visit(&self, session_id: &str, route: &str) -> Result<Visit> {
        let mut session = self.get(session_id).await?;
        if session.state.is_terminal() {
            return Err(FlowError::TerminalState(session.state));
        }

        let step = StepId::from_route(route)
            .ok_or_else(|| FlowError::UnknownStep(route.to_string()))?;
        let query = route.split_once('?').map(|(_, query)| query).unwrap_or("");
        let answers = from_query(query)?;

        let (target, admitted) = match self.flow.guard(step, &answers) {
            Ok(()) => (step, true),
            Err(e) => {
                debug!(session_id, error = %e, "visit rejected by guard");
                (self.first_step(), false)
            }
        };
        let landed = if admitted {
            with_query(&target.route(), &answers)
        } else {
            target.route()
        };

        let direction = self.flow.direction(session.last_route.as_deref(), &landed);
        session.state = FlowState::Step { step: target };
        session.answers = if admitted { answers } else { Answers::new() };
        session.last_route = Some(landed);
        session.touch();
        self.storage.save(session.clone()).await?;

        Ok(Visit {
            session,
            direction,
            admitted,
        })
    }

    /// Continue from the session's current step with the answers entered on it.
    pub async fn advance(&self, session_id: &str, step_answers: &Answers) -> Result<Navigation> {
        let mut session = self.get(session_id).await?;
        let step = session
            .state
            .step()
            .ok_or(FlowError::TerminalState(session.state))?;

        let nav = self.flow.advance(step, &session.answers, step_answers)?;

        session.status_message = match nav.state {
            FlowState::Exit { reason } => Some(reason.label().to_string()),
            FlowState::Submitted => Some("Quote request received".to_string()),
            FlowState::Step { .. } => None,
        };
        session.state = nav.state;
        session.answers = nav.answers.clone();
        session.last_route = Some(nav.route.clone());
        session.touch();
        self.storage.save(session).await?;

        info!(session_id, from = %step, to = %nav.state, "session advanced");
        Ok(nav)
    }

    /// Go back one step. Only terminal sessions refuse.
    pub async fn back(&self, session_id: &str) -> Result<Navigation> {
        let mut session = self.get(session_id).await?;
        let step = session
            .state
            .step()
            .ok_or(FlowError::TerminalState(session.state))?;

        let nav = self.flow.back(step, &session.answers);

        session.state = nav.state;
        session.last_route = Some(nav.route.clone());
        session.status_message = None;
        session.touch();
        self.storage.save(session).await?;

        debug!(session_id, from = %step, to = %nav.state, "session went back");
        Ok(nav)
    }

    /// Start over: first step, no answers.
    pub async fn restart(&self, session_id: &str) -> Result<Session> {
        let mut session = self.get(session_id).await?;
        let first = self.first_step();

        session.state = FlowState::Step { step: first };
        session.answers.clear();
        session.last_route = Some(first.route());
        session.status_message = None;
        session.touch();
        self.storage.save(session.clone()).await?;

        info!(session_id, "session restarted");
        Ok(session)
    }
}

use chrono::{DateTime, Utc};
use quote_flow::{
    Answers, Direction, ExitReason, FlowState, Navigation, QuoteSummary, Session, StepId,
    StepView, SubmissionStatus,
};
use serde::{Deserialize, Serialize};

/// A step page: render data plus, on the contact step, the quote recap.
#[derive(Debug, Serialize)]
pub struct StepPage {
    #[serde(flatten)]
    pub view: StepView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_summary: Option<QuoteSummary>,
}

impl StepPage {
    pub fn new(view: StepView) -> Self {
        let quote_summary =
            (view.id == StepId::Contact).then(|| QuoteSummary::from_answers(&view.answers));
        Self {
            view,
            quote_summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    /// `step`, `exit` or `submitted`.
    pub destination: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ExitReason>,
    pub route: String,
    pub answers: Answers,
}

impl From<Navigation> for NavigationResponse {
    fn from(nav: Navigation) -> Self {
        let destination = match nav.state {
            FlowState::Step { .. } => "step",
            FlowState::Exit { .. } => "exit",
            FlowState::Submitted => "submitted",
        };
        Self {
            destination,
            step: nav.state.step(),
            reason: nav.exit_reason(),
            route: nav.route,
            answers: nav.answers,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExitQuery {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExitPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ExitReason>,
    pub title: &'static str,
    pub description: &'static str,
    pub start_over: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct VisitRequest {
    pub route: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: FlowState,
    pub answers: Answers,
    pub last_route: Option<String>,
    pub status_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<StepPage>,
}

impl SessionResponse {
    pub fn new(session: Session, view: Option<StepView>) -> Self {
        Self {
            session_id: session.id,
            state: session.state,
            answers: session.answers,
            last_route: session.last_route,
            status_message: session.status_message,
            updated_at: session.updated_at,
            page: view.map(StepPage::new),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub direction: Direction,
    pub admitted: bool,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub session_id: String,
    pub status: SubmissionStatus,
}

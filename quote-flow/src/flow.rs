use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, info};

use crate::{
    answers::{Answers, keys},
    codec::{merge, with_query},
    error::{FlowError, Result},
    exit::ExitReason,
    step::{EXIT_ROUTE, Step, StepId},
    steps::standard_steps,
};

/// Where a quote currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowState {
    /// On one of the question screens.
    Step { step: StepId },
    /// Diverted to the custom quote page. Terminal.
    Exit { reason: ExitReason },
    /// Contact details accepted. Terminal.
    Submitted,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlowState::Step { .. })
    }

    pub fn step(&self) -> Option<StepId> {
        match self {
            FlowState::Step { step } => Some(*step),
            _ => None,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Step { step } => write!(f, "{step}"),
            FlowState::Exit { reason } => write!(f, "exit({reason})"),
            FlowState::Submitted => f.write_str("submitted"),
        }
    }
}

/// Outcome of a navigation request: the state the quote moves to, the route
/// to load, and the answers that route carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    pub state: FlowState,
    pub route: String,
    pub answers: Answers,
}

impl Navigation {
    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self.state {
            FlowState::Exit { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Route of the custom quote page for `reason`.
pub fn exit_route(reason: ExitReason) -> String {
    format!("{EXIT_ROUTE}?{}={}", keys::REASON, reason.as_str())
}

/// Which way the user moved between two routes of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Back,
    /// First visit, a reload, or a route outside the step order.
    Initial,
}

/// Everything a page needs to render one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub id: StepId,
    pub number: usize,
    pub total_steps: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub progress: f32,
    pub previous_progress: f32,
    pub back_href: Option<String>,
    pub summary: Option<String>,
    pub mobile_summary: Option<String>,
    pub footer_status: String,
    pub continue_label: &'static str,
    pub ready: bool,
    pub answers: Answers,
}

/// The ordered question steps plus the rules for moving between them.
pub struct QuoteFlow {
    pub id: String,
    steps: Vec<Arc<dyn Step>>,
}

impl QuoteFlow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// The five-step car quote flow.
    pub fn standard() -> Self {
        standard_steps()
            .into_iter()
            .fold(FlowBuilder::new("car_quote"), FlowBuilder::add_step)
            .build()
    }

    /// Add a step at the end of the flow. A step whose id is already
    /// registered is ignored.
    pub fn add_step(&mut self, step: Arc<dyn Step>) -> &mut Self {
        if self.step_by_id(step.id()).is_none() {
            self.steps.push(step);
        }
        self
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Zero-based lookup.
    pub fn step_at(&self, index: usize) -> Option<&dyn Step> {
        self.steps.get(index).map(|step| step.as_ref())
    }

    pub fn step_by_id(&self, id: StepId) -> Option<&dyn Step> {
        self.position(id).and_then(|index| self.step_at(index))
    }

    pub fn step_by_route(&self, route: &str) -> Option<&dyn Step> {
        StepId::from_route(route).and_then(|id| self.step_by_id(id))
    }

    pub fn first_step(&self) -> Option<&dyn Step> {
        self.step_at(0)
    }

    pub fn next_step(&self, id: StepId) -> Option<&dyn Step> {
        self.position(id).and_then(|index| self.step_at(index + 1))
    }

    pub fn previous_step(&self, id: StepId) -> Option<&dyn Step> {
        self.position(id)
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.step_at(index))
    }

    /// One-based position of the step.
    pub fn number(&self, id: StepId) -> Option<usize> {
        self.position(id).map(|index| index + 1)
    }

    fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id() == id)
    }

    fn require(&self, id: StepId) -> Result<&dyn Step> {
        self.step_by_id(id)
            .ok_or_else(|| FlowError::UnknownStep(id.to_string()))
    }

    fn first_route(&self) -> String {
        self.first_step()
            .map(|step| step.id().route())
            .unwrap_or_else(|| StepId::Location.route())
    }

    pub fn is_step_complete(&self, id: StepId, answers: &Answers) -> bool {
        self.step_by_id(id)
            .is_some_and(|step| step.is_complete(answers))
    }

    /// Check that `answers` may enter `id`: the step's required keys are all
    /// present and every earlier step's validator passes.
    pub fn guard(&self, id: StepId, answers: &Answers) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| FlowError::UnknownStep(id.to_string()))?;

        let mut missing = answers.missing(self.steps[index].descriptor().required_keys);
        for earlier in &self.steps[..index] {
            if earlier.persists_answers() && !earlier.is_complete(answers) {
                for key in answers.missing(earlier.owned_keys()) {
                    if !missing.contains(&key) {
                        missing.push(key);
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FlowError::MissingParameters { step: id, missing })
        }
    }

    /// Route to load when a user lands on `id` with `answers`: the step itself,
    /// or the first step when the guard fails.
    pub fn entry_route(&self, id: StepId, answers: &Answers) -> String {
        match self.guard(id, answers) {
            Ok(()) => with_query(&id.route(), answers),
            Err(e) => {
                info!(step = %id, error = %e, "redirecting to the first step");
                self.first_route()
            }
        }
    }

    /// Resolve Continue on step `id`.
    ///
    /// `persisted` is the answer set carried by the current route and
    /// `step_answers` everything the user entered on this step. An exit leaves
    /// the persisted answers untouched and points at the custom quote page;
    /// otherwise the step's answers are merged over the persisted ones (minus
    /// the keys this step owns) and the next step's route carries them.
    pub fn advance(&self, id: StepId, persisted: &Answers, step_answers: &Answers) -> Result<Navigation> {
        let step = self.require(id)?;

        // The step's submission replaces everything it owns: a toggle left off
        // is simply absent.
        let mut base = persisted.clone();
        for key in step.owned_keys() {
            base.remove(key);
        }
        let merged = merge(&base, step_answers);
        let candidate = with_blank_owned(step, &merged, step_answers);

        if !step.is_complete(&candidate) {
            debug!(step = %id, "continue requested on an incomplete step");
            return Err(FlowError::IncompleteStep(id));
        }

        if let Some(reason) = step.exit_reason(&candidate) {
            info!(step = %id, reason = %reason, "exit condition triggered");
            return Ok(Navigation {
                state: FlowState::Exit { reason },
                route: exit_route(reason),
                answers: persisted.clone(),
            });
        }

        if !step.persists_answers() {
            info!(step = %id, "quote request submitted");
            return Ok(Navigation {
                state: FlowState::Submitted,
                route: with_query(&id.route(), persisted),
                answers: persisted.clone(),
            });
        }

        match self.next_step(id) {
            Some(next) => {
                let next_id = next.id();
                debug!(from = %id, to = %next_id, "advancing");
                Ok(Navigation {
                    state: FlowState::Step { step: next_id },
                    route: with_query(&next_id.route(), &merged),
                    answers: merged,
                })
            }
            None => Ok(Navigation {
                state: FlowState::Submitted,
                route: with_query(&id.route(), &merged),
                answers: merged,
            }),
        }
    }

    /// Resolve Back on step `id`. Never blocked: no validation, no exit checks.
    /// The first step (or a step outside this flow) goes back to the first step.
    pub fn back(&self, id: StepId, persisted: &Answers) -> Navigation {
        let target = self
            .previous_step(id)
            .or_else(|| self.first_step())
            .map(|step| step.id())
            .unwrap_or(StepId::Location);

        Navigation {
            state: FlowState::Step { step: target },
            route: with_query(&target.route(), persisted),
            answers: persisted.clone(),
        }
    }

    /// Direction of travel from `previous` to `current`, by step order.
    pub fn direction(&self, previous: Option<&str>, current: &str) -> Direction {
        let Some(previous) = previous else {
            return Direction::Initial;
        };
        let from = StepId::from_route(previous).and_then(|id| self.position(id));
        let to = StepId::from_route(current).and_then(|id| self.position(id));

        match (from, to) {
            (Some(from), Some(to)) if to > from => Direction::Forward,
            (Some(from), Some(to)) if to < from => Direction::Back,
            _ => Direction::Initial,
        }
    }

    /// Progress of the step before `id`, 0 for the first.
    pub fn previous_progress(&self, id: StepId) -> f32 {
        self.previous_step(id)
            .map(|step| step.descriptor().progress)
            .unwrap_or(0.0)
    }

    /// Render data for step `id`. `answers` may include the user's in-progress
    /// input on this step.
    pub fn view(&self, id: StepId, answers: &Answers) -> Result<StepView> {
        let step = self.require(id)?;
        let descriptor = step.descriptor();
        let effective = with_blank_owned(step, &merge(&Answers::new(), answers), answers);
        let back_href = self
            .previous_step(id)
            .map(|previous| with_query(&previous.id().route(), answers));

        Ok(StepView {
            id,
            number: self.number(id).unwrap_or(1),
            total_steps: self.total_steps(),
            title: descriptor.title,
            description: descriptor.description,
            progress: descriptor.progress,
            previous_progress: self.previous_progress(id),
            back_href,
            summary: step.summary(&effective),
            mobile_summary: step.mobile_summary(&effective),
            footer_status: step.footer_status(&effective),
            continue_label: step.continue_label(&effective),
            ready: step.is_complete(&effective),
            answers: answers.clone(),
        })
    }
}

/// `merged` plus the blank values `step_answers` holds for keys `step` owns.
/// Merging drops blanks, but a toggled field left empty must still block
/// Continue. Keys the invalidation rules removed are not restored.
fn with_blank_owned(step: &dyn Step, merged: &Answers, step_answers: &Answers) -> Answers {
    let blanks: Answers = step_answers
        .iter()
        .filter(|(key, value)| step.owned_keys().contains(key) && value.trim().is_empty())
        .collect();
    merged.overlay(&blanks)
}

impl Default for QuoteFlow {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for creating flows
pub struct FlowBuilder {
    flow: QuoteFlow,
}

impl FlowBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            flow: QuoteFlow::new(id),
        }
    }

    pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
        self.flow.add_step(step);
        self
    }

    pub fn build(self) -> QuoteFlow {
        self.flow
    }
}

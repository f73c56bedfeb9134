use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    answers::Answers,
    error::FlowError,
    exit::{ExitReason, first_exit},
};

/// Route prefix shared by every page of the quote flow.
pub const QUOTE_ROUTE_PREFIX: &str = "/quote";

/// Custom quote page that exits land on.
pub const EXIT_ROUTE: &str = "/quote/exit";

pub const CONTINUE_LABEL: &str = "Continue";
pub const CUSTOM_QUOTE_LABEL: &str = "Get Custom Quote";
pub const READY_STATUS: &str = "Ready to continue";
pub const INCOMPLETE_STATUS: &str = "Complete the fields above";

/// The five question screens, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Location,
    Vehicle,
    Auction,
    Dimensions,
    Contact,
}

impl StepId {
    pub const ALL: [StepId; 5] = [
        StepId::Location,
        StepId::Vehicle,
        StepId::Auction,
        StepId::Dimensions,
        StepId::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Location => "location",
            StepId::Vehicle => "vehicle",
            StepId::Auction => "auction",
            StepId::Dimensions => "dimensions",
            StepId::Contact => "contact",
        }
    }

    pub fn route(&self) -> String {
        format!("{QUOTE_ROUTE_PREFIX}/{}", self.as_str())
    }

    /// Parse a route such as `/quote/vehicle`. A trailing query string or
    /// slash is ignored.
    pub fn from_route(route: &str) -> Option<StepId> {
        let path = route.split('?').next().unwrap_or(route).trim_end_matches('/');
        path.strip_prefix(QUOTE_ROUTE_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|id| id.parse().ok())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| FlowError::UnknownStep(s.to_string()))
    }
}

/// Immutable description of a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepDescriptor {
    pub id: StepId,
    pub title: &'static str,
    pub description: &'static str,
    /// Percentage shown by the progress bar once this step is on screen.
    pub progress: f32,
    /// Answers that earlier steps must have collected before this one may be
    /// entered.
    pub required_keys: &'static [&'static str],
}

/// One question screen of the flow.
pub trait Step: Send + Sync {
    fn descriptor(&self) -> &'static StepDescriptor;

    fn id(&self) -> StepId {
        self.descriptor().id
    }

    /// Answer keys this step collects.
    fn owned_keys(&self) -> &'static [&'static str];

    /// Owned keys run through the exit evaluator, in the order they are checked.
    fn exit_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the answers are complete enough to enable Continue.
    fn is_complete(&self, answers: &Answers) -> bool;

    /// Whether a completed step writes its answers into the forward link.
    fn persists_answers(&self) -> bool {
        true
    }

    /// Exit this step's current answers would take.
    fn exit_reason(&self, answers: &Answers) -> Option<ExitReason> {
        first_exit(answers, self.exit_fields())
    }

    /// One-line recap of the answers, shown next to the Continue button.
    fn summary(&self, _answers: &Answers) -> Option<String> {
        None
    }

    /// Shorter recap for narrow footers.
    fn mobile_summary(&self, answers: &Answers) -> Option<String> {
        self.summary(answers)
    }

    fn continue_label(&self, answers: &Answers) -> &'static str {
        if self.exit_reason(answers).is_some() {
            CUSTOM_QUOTE_LABEL
        } else {
            CONTINUE_LABEL
        }
    }

    fn footer_status(&self, answers: &Answers) -> String {
        match self.summary(answers) {
            Some(summary) => summary,
            None if self.is_complete(answers) => READY_STATUS.to_string(),
            None => INCOMPLETE_STATUS.to_string(),
        }
    }
}

pub mod answers;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod exit;
pub mod flow;
pub mod runner;
pub mod step;
pub mod steps;
pub mod storage;
pub mod submission;
pub mod summary;
pub mod validate;

// Re-export commonly used types
pub use answers::{Answers, keys};
pub use codec::{from_query, merge, to_query, with_query};
pub use error::{FlowError, Result};
pub use exit::{ExitCopy, ExitReason, check_exit};
pub use flow::{Direction, FlowBuilder, FlowState, Navigation, QuoteFlow, StepView, exit_route};
pub use runner::{FlowRunner, Visit};
pub use step::{Step, StepDescriptor, StepId};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use submission::{SubmissionHandle, SubmissionStatus, SubmissionTimeline};
pub use summary::QuoteSummary;

/// Where the exit page's "start over" link points. No answers are carried.
pub fn start_over_route() -> String {
    StepId::Location.route()
}

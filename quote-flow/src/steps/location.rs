use crate::{
    answers::{Answers, keys},
    step::{Step, StepDescriptor, StepId},
    validate::all_present,
};

const OWNED: [&str; 4] = [keys::PICK, keys::PICK_REF, keys::DROP, keys::DROP_REF];

static DESCRIPTOR: StepDescriptor = StepDescriptor {
    id: StepId::Location,
    title: "Where are we moving your car?",
    description: "Let us know where you need your vehicle picked up and delivered to get started with your quote.",
    progress: 12.5,
    required_keys: &[],
};

/// Pickup and destination. Both must come from the location catalog, which is
/// what supplies the `pickRef` / `dropRef` references.
pub struct LocationStep;

impl Step for LocationStep {
    fn descriptor(&self) -> &'static StepDescriptor {
        &DESCRIPTOR
    }

    fn owned_keys(&self) -> &'static [&'static str] {
        &OWNED
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        all_present(answers, &OWNED)
    }

    fn summary(&self, answers: &Answers) -> Option<String> {
        let pick = answers.value(keys::PICK)?;
        let destination = answers.value(keys::DROP)?;
        Some(format!("{pick} → {destination}"))
    }

    fn mobile_summary(&self, answers: &Answers) -> Option<String> {
        let pick = answers.value(keys::PICK)?;
        let destination = answers.value(keys::DROP)?;
        Some(format!("{} → {}", city(pick), city(destination)))
    }
}

/// "Sydney, NSW" → "Sydney".
pub(crate) fn city(label: &str) -> &str {
    label.split(',').next().unwrap_or(label)
}

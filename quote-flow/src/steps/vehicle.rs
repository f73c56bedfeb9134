use crate::{
    answers::{Answers, keys},
    catalog,
    step::{Step, StepDescriptor, StepId},
    validate::all_present,
};

const OWNED: [&str; 4] = [keys::MAKE, keys::MODEL, keys::AGE, keys::DRIVE];

static DESCRIPTOR: StepDescriptor = StepDescriptor {
    id: StepId::Vehicle,
    title: "About Your Vehicle",
    description: "We need some information about your vehicle to make sure we tailor a quote specifically to your needs.",
    progress: 25.0,
    required_keys: &[keys::PICK, keys::PICK_REF, keys::DROP, keys::DROP_REF],
};

/// Make, model, manufacture era (`under30|over30`) and condition
/// (`driveable|issues`).
pub struct VehicleStep;

impl Step for VehicleStep {
    fn descriptor(&self) -> &'static StepDescriptor {
        &DESCRIPTOR
    }

    fn owned_keys(&self) -> &'static [&'static str] {
        &OWNED
    }

    fn exit_fields(&self) -> &'static [&'static str] {
        &[keys::AGE, keys::DRIVE]
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        all_present(answers, &OWNED)
    }

    fn summary(&self, answers: &Answers) -> Option<String> {
        let make = answers.value(keys::MAKE)?;
        let model = answers.value(keys::MODEL)?;
        Some(vehicle_label(make, model))
    }
}

/// Display name from catalog labels, falling back to the raw ids.
pub(crate) fn vehicle_label(make: &str, model: &str) -> String {
    format!(
        "{} {}",
        catalog::make_label(make).unwrap_or(make),
        catalog::model_label(make, model).unwrap_or(model)
    )
}

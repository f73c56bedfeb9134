use crate::{
    answers::{Answers, keys},
    exit::DIMENSION_KEYS,
    step::{Step, StepDescriptor, StepId},
};

static DESCRIPTOR: StepDescriptor = StepDescriptor {
    id: StepId::Dimensions,
    title: "Your Vehicle Specifications",
    description: "If your car is lowered or modified, then please measure carefully. Every cm under 15cm will cost more.",
    progress: 75.0,
    required_keys: &[
        keys::PICK,
        keys::PICK_REF,
        keys::DROP,
        keys::DROP_REF,
        keys::MAKE,
        keys::MODEL,
        keys::AGE,
        keys::DRIVE,
        keys::AUCTION,
    ],
};

/// Four "non-standard" toggles: length over 5.2m, height over 1.9m, ground
/// clearance under 15cm, value over $80,000.
///
/// A toggle that is on is sent as its dimension key (possibly still blank);
/// a toggle that is off is simply absent. Any filled toggle diverts to a
/// custom quote.
pub struct DimensionsStep;

impl Step for DimensionsStep {
    fn descriptor(&self) -> &'static StepDescriptor {
        &DESCRIPTOR
    }

    fn owned_keys(&self) -> &'static [&'static str] {
        &DIMENSION_KEYS
    }

    fn exit_fields(&self) -> &'static [&'static str] {
        &DIMENSION_KEYS
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        DIMENSION_KEYS
            .iter()
            .filter(|key| answers.contains_key(key))
            .all(|key| answers.has(key))
    }

    fn summary(&self, answers: &Answers) -> Option<String> {
        Some(specs_label(toggled_count(answers)))
    }
}

fn toggled_count(answers: &Answers) -> usize {
    DIMENSION_KEYS
        .iter()
        .filter(|key| answers.contains_key(key))
        .count()
}

/// "Standard specs", "1 custom spec", "3 custom specs".
pub(crate) fn specs_label(count: usize) -> String {
    match count {
        0 => "Standard specs".to_string(),
        1 => "1 custom spec".to_string(),
        n => format!("{n} custom specs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_vehicle() {
        let answers = Answers::new();
        assert!(DimensionsStep.is_complete(&answers));
        assert_eq!(DimensionsStep.continue_label(&answers), "Continue");
        assert_eq!(DimensionsStep.footer_status(&answers), "Standard specs");
    }

    #[test]
    fn toggled_dimensions() {
        let half_filled = Answers::new()
            .with(keys::CAR_LENGTH, "5.6")
            .with(keys::CAR_CLEARANCE, "");
        assert!(!DimensionsStep.is_complete(&half_filled));
        assert_eq!(DimensionsStep.footer_status(&half_filled), "2 custom specs");
        assert_eq!(DimensionsStep.continue_label(&half_filled), "Get Custom Quote");

        let filled = half_filled.with(keys::CAR_CLEARANCE, "12");
        assert!(DimensionsStep.is_complete(&filled));
    }
}

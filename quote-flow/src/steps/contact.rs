use crate::{
    answers::{Answers, keys},
    step::{Step, StepDescriptor, StepId},
    validate::{is_valid_email, is_valid_phone},
};

static DESCRIPTOR: StepDescriptor = StepDescriptor {
    id: StepId::Contact,
    title: "Get your tailored quote",
    description: "We have calculated the best suitable pricing options for you based on the information you provided.",
    progress: 100.0,
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

pub const SUBMIT_LABEL: &str = "Get My Quote";

/// Email and phone. Completing this step submits the quote request; the
/// contact details themselves never go into a link.
pub struct ContactStep;

impl Step for ContactStep {
    fn descriptor(&self) -> &'static StepDescriptor {
        &DESCRIPTOR
    }

    fn owned_keys(&self) -> &'static [&'static str] {
        &[keys::EMAIL, keys::PHONE]
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        let email = answers.get(keys::EMAIL).unwrap_or_default();
        let phone = answers.get(keys::PHONE).unwrap_or_default();
        is_valid_email(email) && is_valid_phone(phone)
    }

    fn persists_answers(&self) -> bool {
        false
    }

    fn mobile_summary(&self, answers: &Answers) -> Option<String> {
        self.is_complete(answers)
            .then(|| answers.get(keys::EMAIL).unwrap_or_default().to_string())
    }

    fn continue_label(&self, _answers: &Answers) -> &'static str {
        SUBMIT_LABEL
    }

    fn footer_status(&self, answers: &Answers) -> String {
        if self.is_complete(answers) {
            "Ready to submit".to_string()
        } else {
            "Enter your contact details".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_follows_validity() {
        let partial = Answers::new().with(keys::EMAIL, "jo@example.com");
        assert_eq!(ContactStep.footer_status(&partial), "Enter your contact details");
        assert_eq!(ContactStep.mobile_summary(&partial), None);

        let complete = partial.with(keys::PHONE, "0412 345 678");
        assert_eq!(ContactStep.footer_status(&complete), "Ready to submit");
        assert_eq!(
            ContactStep.mobile_summary(&complete).as_deref(),
            Some("jo@example.com")
        );
        assert_eq!(ContactStep.continue_label(&complete), "Get My Quote");
    }
}

//! Completeness checks that gate the Continue action of each step.

use regex::Regex;
use std::sync::LazyLock;

use crate::answers::{Answers, keys};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+()-]{8,}$").expect("phone pattern compiles"));

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid phone number";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// At least 8 characters of digits, spaces, `+`, `(`, `)` or `-`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

/// True when every key in `required` holds a non-blank answer.
pub fn all_present(answers: &Answers, required: &[&str]) -> bool {
    required.iter().all(|key| answers.has(key))
}

/// Inline message for a contact field that has been typed but does not pass
/// validation. Untouched fields produce no message.
pub fn field_error(field: &str, answers: &Answers) -> Option<&'static str> {
    let value = answers.value(field)?;
    match field {
        keys::EMAIL if !is_valid_email(value) => Some(INVALID_EMAIL_MESSAGE),
        keys::PHONE if !is_valid_phone(value) => Some(INVALID_PHONE_MESSAGE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{flow::QuoteFlow, step::StepId};

    fn is_step_complete(step: StepId, answers: &Answers) -> bool {
        QuoteFlow::standard().is_step_complete(step, answers)
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("jo@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.com.au"));
        assert!(!is_valid_email("jo@example"));
        assert!(!is_valid_email("jo example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("0412 345 678"));
        assert!(is_valid_phone("+61 (2) 9876-5432"));
        assert!(is_valid_phone("12345678"));
        assert!(!is_valid_phone("1234567"));
        assert!(!is_valid_phone("0412 ABC 678"));
    }

    #[test]
    fn field_errors_only_for_typed_values() {
        let answers = Answers::new()
            .with(keys::EMAIL, "not-an-email")
            .with(keys::PHONE, "0412 345 678");

        assert_eq!(field_error(keys::EMAIL, &answers), Some(INVALID_EMAIL_MESSAGE));
        assert_eq!(field_error(keys::PHONE, &answers), None);
        assert_eq!(field_error(keys::EMAIL, &Answers::new()), None);
    }

    #[test]
    fn location_needs_catalog_references() {
        let typed_only = Answers::new()
            .with(keys::PICK, "Somewhere")
            .with(keys::DROP, "Melbourne, VIC")
            .with(keys::DROP_REF, "melbourne-vic");
        assert!(!is_step_complete(StepId::Location, &typed_only));

        let picked = typed_only.with(keys::PICK_REF, "sydney-nsw");
        assert!(is_step_complete(StepId::Location, &picked));
    }

    #[test]
    fn vehicle_needs_all_four_answers() {
        let answers = Answers::new()
            .with(keys::MAKE, "toyota")
            .with(keys::MODEL, "camry")
            .with(keys::AGE, "under30");
        assert!(!is_step_complete(StepId::Vehicle, &answers));
        assert!(is_step_complete(
            StepId::Vehicle,
            &answers.with(keys::DRIVE, "driveable")
        ));
    }

    #[test]
    fn salvage_required_only_from_auction() {
        let private = Answers::new().with(keys::AUCTION, "non-auction");
        assert!(is_step_complete(StepId::Auction, &private));

        let auction = Answers::new().with(keys::AUCTION, "auction");
        assert!(!is_step_complete(StepId::Auction, &auction));
        assert!(is_step_complete(
            StepId::Auction,
            &auction.with(keys::SALVAGE, "non-salvage")
        ));

        assert!(!is_step_complete(StepId::Auction, &Answers::new()));
    }

    #[test]
    fn dimension_toggles_need_values() {
        assert!(is_step_complete(StepId::Dimensions, &Answers::new()));

        let toggled_blank = Answers::new().with(keys::CAR_HEIGHT, "  ");
        assert!(!is_step_complete(StepId::Dimensions, &toggled_blank));

        let toggled_filled = Answers::new().with(keys::CAR_HEIGHT, "2.1");
        assert!(is_step_complete(StepId::Dimensions, &toggled_filled));
    }

    #[test]
    fn contact_needs_email_and_phone() {
        let answers = Answers::new().with(keys::EMAIL, "jo@example.com");
        assert!(!is_step_complete(StepId::Contact, &answers));
        assert!(is_step_complete(
            StepId::Contact,
            &answers.with(keys::PHONE, "0412 345 678")
        ));
    }
}

//! Read-only recap of the persisted answers, shown above the contact form.

use serde::Serialize;

use crate::{
    answers::{Answers, keys},
    catalog,
    steps::{
        dimensions::specs_label,
        location::city,
        vehicle::vehicle_label,
    },
};

/// One custom dimension with its unit, e.g. `Height: 2.1 metres`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecDetail {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSummary {
    pub route: String,
    pub vehicle: String,
    pub age: &'static str,
    pub condition: &'static str,
    pub auction: &'static str,
    pub specs: String,
    pub spec_details: Vec<SpecDetail>,
}

impl QuoteSummary {
    pub fn from_answers(answers: &Answers) -> Self {
        let spec_details = spec_details(answers);
        Self {
            route: route_label(answers),
            vehicle: vehicle_label(
                answers.get(keys::MAKE).unwrap_or_default(),
                answers.get(keys::MODEL).unwrap_or_default(),
            ),
            age: age_label(answers),
            condition: condition_label(answers),
            auction: auction_label(answers),
            specs: specs_label(spec_details.len()),
            spec_details,
        }
    }
}

/// City names only: "Sydney → Perth". The catalog label behind the chosen
/// reference wins over the typed text.
pub fn route_label(answers: &Answers) -> String {
    let pick = place_label(answers, keys::PICK, keys::PICK_REF);
    let destination = place_label(answers, keys::DROP, keys::DROP_REF);
    format!("{} → {}", city(pick), city(destination))
}

fn place_label<'a>(answers: &'a Answers, text_key: &str, ref_key: &str) -> &'a str {
    answers
        .get(ref_key)
        .and_then(catalog::find_location_by_ref)
        .map(|location| location.label)
        .or_else(|| answers.get(text_key))
        .unwrap_or_default()
}

pub fn condition_label(answers: &Answers) -> &'static str {
    if answers.is(keys::DRIVE, "driveable") {
        "Driveable"
    } else {
        "Has Issues"
    }
}

pub fn age_label(answers: &Answers) -> &'static str {
    if answers.is(keys::AGE, "under30") {
        "1985 or later"
    } else {
        "Pre-1985 classic"
    }
}

/// Empty when the auction question has not been answered.
pub fn auction_label(answers: &Answers) -> &'static str {
    match answers.get(keys::AUCTION) {
        Some("non-auction") => "Private or dealer",
        Some("auction") if answers.is(keys::SALVAGE, "salvage") => "Salvage auction",
        Some("auction") => "Auction house",
        _ => "",
    }
}

pub fn spec_details(answers: &Answers) -> Vec<SpecDetail> {
    let units: [(&str, &'static str, fn(&str) -> String); 4] = [
        (keys::CAR_LENGTH, "Length", |v| format!("{v} metres")),
        (keys::CAR_HEIGHT, "Height", |v| format!("{v} metres")),
        (keys::CAR_CLEARANCE, "Clearance", |v| format!("{v} cm")),
        (keys::CAR_VALUE, "Value", |v| format!("${v} AUD")),
    ];

    units
        .into_iter()
        .filter_map(|(key, label, render)| {
            answers.value(key).map(|value| SpecDetail {
                label,
                value: render(value),
            })
        })
        .collect()
}

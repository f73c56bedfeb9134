use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::answers::{Answers, keys};

/// Dimension answers. Holding any of them means the matching "non-standard"
/// toggle is on.
pub const DIMENSION_KEYS: [&str; 4] = [
    keys::CAR_LENGTH,
    keys::CAR_HEIGHT,
    keys::CAR_CLEARANCE,
    keys::CAR_VALUE,
];

/// Why a quote was diverted out of the standard flow into a manual quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    VehicleAge,
    DriveIssues,
    SalvageVehicle,
    CustomDimensions,
    /// Reserved for a route with no standard rate. Nothing in the flow
    /// produces it yet; it is reachable through a direct exit link only.
    NoRates,
}

/// Heading and body shown on the custom quote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitCopy {
    pub title: &'static str,
    pub description: &'static str,
}

/// Copy for an exit page reached without a recognised reason.
pub const GENERIC_EXIT_COPY: ExitCopy = ExitCopy {
    title: "Custom Quote Required",
    description: "Your request requires a personalized quote from our team. We'll get back to you within 24 hours with pricing options.",
};

impl ExitReason {
    pub const ALL: [ExitReason; 5] = [
        ExitReason::VehicleAge,
        ExitReason::DriveIssues,
        ExitReason::SalvageVehicle,
        ExitReason::CustomDimensions,
        ExitReason::NoRates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::VehicleAge => "vehicle_age",
            ExitReason::DriveIssues => "drive_issues",
            ExitReason::SalvageVehicle => "salvage_vehicle",
            ExitReason::CustomDimensions => "custom_dimensions",
            ExitReason::NoRates => "no_rates",
        }
    }

    /// Short internal description of the condition.
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::VehicleAge => "Vehicle manufactured before 1985",
            ExitReason::DriveIssues => "Vehicle has mechanical/roadworthiness issues",
            ExitReason::SalvageVehicle => "Vehicle from salvage auction",
            ExitReason::CustomDimensions => "Vehicle has non-standard dimensions",
            ExitReason::NoRates => "No standard rates for the requested route",
        }
    }

    pub fn copy(&self) -> ExitCopy {
        match self {
            ExitReason::VehicleAge => ExitCopy {
                title: "Classic Vehicle Transport",
                description: "Vehicles manufactured before 1985 require special handling and care. Our team will work with you to ensure your classic car is transported safely with the appropriate equipment.",
            },
            ExitReason::DriveIssues => ExitCopy {
                title: "Non-Driveable Vehicle Transport",
                description: "Vehicles with mechanical issues require special loading equipment. We'll arrange for a forklift or tilt-tray to safely load your vehicle.",
            },
            ExitReason::SalvageVehicle => ExitCopy {
                title: "Salvage Vehicle Transport",
                description: "Salvage auction vehicles often require special handling. Our team will assess your vehicle's condition and arrange the appropriate transport.",
            },
            ExitReason::CustomDimensions => ExitCopy {
                title: "Oversized Vehicle Transport",
                description: "Your vehicle has non-standard dimensions that require special equipment or routing. We'll prepare a custom quote based on your exact specifications.",
            },
            ExitReason::NoRates => ExitCopy {
                title: "Custom Route Quote",
                description: "We don't have standard rates for your requested route. Our team will prepare a custom quote for your specific transport needs.",
            },
        }
    }

    /// Copy for an optional, possibly unrecognised reason.
    pub fn copy_for(reason: Option<&str>) -> ExitCopy {
        reason
            .and_then(|r| r.parse::<ExitReason>().ok())
            .map(|r| r.copy())
            .unwrap_or(GENERIC_EXIT_COPY)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExitReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| format!("unknown exit reason: {s}"))
    }
}

/// Decide whether a single answer diverts the quote out of the standard flow.
///
/// Pure and total: every `(field, value)` pair maps to a reason or `None`.
/// Any non-blank dimension value counts as a "non-standard" toggle being on.
pub fn check_exit(field: &str, value: &str) -> Option<ExitReason> {
    match (field, value) {
        (keys::AGE, "over30") => Some(ExitReason::VehicleAge),
        (keys::DRIVE, "issues") => Some(ExitReason::DriveIssues),
        (keys::SALVAGE, "salvage") => Some(ExitReason::SalvageVehicle),
        (field, value) if DIMENSION_KEYS.contains(&field) && !value.trim().is_empty() => {
            Some(ExitReason::CustomDimensions)
        }
        _ => None,
    }
}

/// First exit triggered by any of `fields` in `answers`, checked in order.
pub fn first_exit(answers: &Answers, fields: &[&str]) -> Option<ExitReason> {
    fields
        .iter()
        .find_map(|field| answers.get(field).and_then(|value| check_exit(field, value)))
}

use crate::{
    answers::{Answers, keys},
    step::{Step, StepDescriptor, StepId},
};

static DESCRIPTOR: StepDescriptor = StepDescriptor {
    id: StepId::Auction,
    title: "Is collection from an auction house?",
    description: "We can collect from a business address, residential address or an auction house. If an auction house, it's super important we know which one.",
    progress: 50.0,
    required_keys: &[
        keys::PICK,
        keys::PICK_REF,
        keys::DROP,
        keys::DROP_REF,
        keys::MAKE,
        keys::MODEL,
        keys::AGE,
        keys::DRIVE,
    ],
};

/// Collection point (`non-auction|auction`) and, for auctions only, whether it
/// is a salvage sale (`non-salvage|salvage`).
pub struct AuctionStep;

impl Step for AuctionStep {
    fn descriptor(&self) -> &'static StepDescriptor {
        &DESCRIPTOR
    }

    fn owned_keys(&self) -> &'static [&'static str] {
        &[keys::AUCTION, keys::SALVAGE]
    }

    fn exit_fields(&self) -> &'static [&'static str] {
        &[keys::SALVAGE]
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        match answers.value(keys::AUCTION) {
            Some("auction") => answers.has(keys::SALVAGE),
            Some(_) => true,
            None => false,
        }
    }

    fn summary(&self, answers: &Answers) -> Option<String> {
        let summary = match (answers.get(keys::AUCTION)?, answers.get(keys::SALVAGE)) {
            ("non-auction", _) => "Not from auction",
            ("auction", Some("salvage")) => "Salvage auction",
            ("auction", Some("non-salvage")) => "Regular auction",
            ("auction", _) => "From auction house",
            _ => return None,
        };
        Some(summary.to_string())
    }
}

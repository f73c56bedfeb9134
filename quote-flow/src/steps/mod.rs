// Question screens of the car quote flow
pub mod auction;
pub mod contact;
pub mod dimensions;
pub mod location;
pub mod vehicle;

use std::sync::Arc;

use crate::step::Step;

pub use auction::AuctionStep;
pub use contact::ContactStep;
pub use dimensions::DimensionsStep;
pub use location::LocationStep;
pub use vehicle::VehicleStep;

/// All built-in steps in flow order.
pub fn standard_steps() -> Vec<Arc<dyn Step>> {
    vec![
        Arc::new(LocationStep),
        Arc::new(VehicleStep),
        Arc::new(AuctionStep),
        Arc::new(DimensionsStep),
        Arc::new(ContactStep),
    ]
}

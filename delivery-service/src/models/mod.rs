pub mod delivery;
pub mod view;

pub use delivery::{Delivery, DeliveryStatus};
pub use view::{ClientSummary, DeliveryView, DeliveryViewResponse, SaleSummary, Sourced};

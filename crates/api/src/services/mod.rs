//! Services that sit between the routes and the repositories.
//!
//! - `notifications` - Forwards stored notifications to delivery channels
//! - `pricing` - Cached view of the active pricing plans

pub mod notifications;
pub mod pricing;

pub use notifications::{DeliveryStatus, NotificationDispatcher};
pub use pricing::PricingCatalog;

//! Domain models returned by the repositories and serialized by the routes.

pub mod billing;
pub mod calendar;
pub mod content;
pub mod messaging;

pub use billing::{Payment, PricingPlan, Subscription};
pub use calendar::TherapySession;
pub use content::{Document, Feedback, Workshop};
pub use messaging::{ConversationSummary, Message, Notification};

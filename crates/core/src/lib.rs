//! Solace Core - Shared types and pure utilities.
//!
//! This crate provides the domain types and the small pieces of business logic
//! used across all Solace components:
//! - `api` - HTTP handlers for messaging, scheduling, billing and content
//! - `cli` - Command-line tools for migrations and billing calculations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Everything here is synchronous and deterministic
//! given its inputs (the "now" variants of the date helpers excepted).
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, currencies and status enums
//! - [`validation`] - Payment field validators and free-text sanitizing
//! - [`subscription`] - Retry schedules, proration and plan hierarchy
//! - [`conversation`] - Order-independent conversation identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod conversation;
pub mod subscription;
pub mod types;
pub mod validation;

pub use conversation::ConversationId;
pub use subscription::{PlanChange, PlanTier, ProrationError, RetrySchedule};
pub use types::*;
pub use validation::{PaymentDetails, PaymentValidationError};

//! Core types for Solace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod email;
pub mod id;
pub mod status;

pub use currency::{Currency, UnknownCurrency};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;

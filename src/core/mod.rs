//! Core types and error handling for pipmatrix.
//!
//! This module contains the error taxonomy shared by every other module:
//! [`PipmatrixError`] for strongly-typed failures and [`ErrorContext`] for
//! user-facing display with actionable suggestions.

pub mod error;

pub use error::{ErrorContext, PipmatrixError, user_friendly_error};

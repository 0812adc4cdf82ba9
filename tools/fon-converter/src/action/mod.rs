//! Implementations of the [`Action`][action]s.
//!
//! [action]: crate::cli::Action

pub mod convert;
pub mod inspect;

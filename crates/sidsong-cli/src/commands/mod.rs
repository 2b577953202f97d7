//! Command implementations.

pub mod check;
pub mod compile;
mod reporting;

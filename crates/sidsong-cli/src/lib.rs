//! sidsong CLI library.
//!
//! Input loading and the command implementations behind the `sidsong` binary.

pub mod commands;
pub mod input;

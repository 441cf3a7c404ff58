//! Utilities shared by the Hanashi binaries and their tests.

pub mod logger;
pub mod time;

//! Domain types

pub mod execution;
pub mod log;

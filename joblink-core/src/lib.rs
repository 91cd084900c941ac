//! Joblink core types
//!
//! Domain types shared by the Rundeck client and the CLI: execution log
//! entries with their severity mapping, execution handles and terminal-state
//! classification, and the declarative step descriptor consumed by a host
//! orchestration runtime.

pub mod descriptor;
pub mod domain;

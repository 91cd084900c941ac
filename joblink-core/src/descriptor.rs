//! Step capability descriptor
//!
//! A declarative description of this step and its options, consumed by the
//! host orchestration runtime when registering the step. The core never
//! depends on how the host renders or stores this; it is plain data.

use serde::Serialize;

/// Value type of a step option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Integer,
}

/// One configurable option of the step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
}

/// Declarative description of the step for the host runtime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub properties: Vec<PropertyDescriptor>,
}

/// Builds the descriptor for the remote-job-reference step
pub fn step_descriptor() -> StepDescriptor {
    StepDescriptor {
        name: "remote-job-reference",
        title: "Remote Rundeck job reference",
        description: "Runs a job on an external Rundeck server and streams its log output",
        properties: vec![
            PropertyDescriptor {
                name: "rundeckURL",
                title: "Remote Rundeck URL",
                description: "Base URL of the remote Rundeck server",
                kind: PropertyKind::String,
                required: true,
            },
            PropertyDescriptor {
                name: "token",
                title: "Token",
                description: "Auth token with permission to run the job",
                kind: PropertyKind::String,
                required: true,
            },
            PropertyDescriptor {
                name: "asUser",
                title: "Run as",
                description: "User the remote execution runs as",
                kind: PropertyKind::String,
                required: false,
            },
            PropertyDescriptor {
                name: "jobID",
                title: "Job UUID",
                description: "Identifier of the remote job to run",
                kind: PropertyKind::String,
                required: true,
            },
            PropertyDescriptor {
                name: "secondsWait",
                title: "Seconds wait",
                description: "Seconds between completion checks",
                kind: PropertyKind::Integer,
                required: true,
            },
            PropertyDescriptor {
                name: "arguments",
                title: "Arguments",
                description: "Command-line argument string passed to the remote job",
                kind: PropertyKind::String,
                required: false,
            },
        ],
    }
}

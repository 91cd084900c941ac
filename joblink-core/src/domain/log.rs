//! Execution log types
//!
//! One entry of a remote execution's log output, as returned by the
//! `/execution/{id}/output` endpoint, plus the severity-to-priority mapping
//! used when forwarding entries to the host's logging sink.

use serde::Deserialize;

/// A single log line from a remote execution
///
/// Deserialized from one element of the output endpoint's `entries` array.
/// All four fields are required; an entry missing any of them (or carrying a
/// non-ISO-8601 `absolute_time`) fails deserialization. The `level` string is
/// kept verbatim so unrecognized remote vocabulary never fails parsing, only
/// downstream classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutionLogEntry {
    /// The log line text
    pub log: String,
    /// Absolute timestamp of the entry, used for watermark comparison
    pub absolute_time: chrono::DateTime<chrono::Utc>,
    /// Raw severity string from the remote system (e.g. "NORMAL", "ERROR")
    pub level: String,
    /// Human-readable time string as the remote system formatted it
    pub time: String,
}

impl ExecutionLogEntry {
    /// Classifies this entry's raw level string
    pub fn severity(&self) -> LogSeverity {
        LogSeverity::parse(&self.level)
    }
}

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Error,
    Warning,
    Normal,
    Unknown,
}

impl LogSeverity {
    /// Classifies a raw remote level string
    ///
    /// The remote vocabulary is uppercase; "SEVERAL" is an error-level value
    /// the remote system emits alongside "ERROR". Anything unrecognized maps
    /// to [`LogSeverity::Unknown`] rather than failing.
    pub fn parse(level: &str) -> Self {
        match level {
            "ERROR" | "SEVERAL" => Self::Error,
            "WARNING" => Self::Warning,
            "NORMAL" => Self::Normal,
            _ => Self::Unknown,
        }
    }

    /// Numeric priority for the host's logging sink
    ///
    /// Lower values denote higher urgency. Unknown severities get the same
    /// priority as normal output.
    pub fn priority(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warning => 1,
            Self::Normal | Self::Unknown => 2,
        }
    }
}

/// Maps a raw remote level string straight to its sink priority
///
/// Total over all inputs: unrecognized strings map to 2.
pub fn severity_priority(level: &str) -> u8 {
    LogSeverity::parse(level).priority()
}

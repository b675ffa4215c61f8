//! Protocol message types and payloads

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Merge protocol message types
///
/// The type is the first token of the subject; the polecat name follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Witness to refinery: a polecat's branch is ready to merge
    MergeReady,
    /// Refinery to witness: the branch landed
    Merged,
    /// Refinery to witness: the merge failed (tests, build, ...)
    MergeFailed,
    /// Refinery to witness: the branch conflicts and must be rebased
    ReworkRequest,
}

impl MessageType {
    pub const ALL: [MessageType; 4] = [
        MessageType::MergeReady,
        MessageType::Merged,
        MessageType::MergeFailed,
        MessageType::ReworkRequest,
    ];

    /// The subject token for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MergeReady => "MERGE_READY",
            Self::Merged => "MERGED",
            Self::MergeFailed => "MERGE_FAILED",
            Self::ReworkRequest => "REWORK_REQUEST",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message type named by a subject line, if any
pub fn parse_message_type(subject: &str) -> Option<MessageType> {
    let token = subject.split_whitespace().next()?;
    MessageType::ALL.into_iter().find(|t| t.as_str() == token)
}

/// Polecat name from a protocol subject (empty if absent)
pub fn extract_polecat(subject: &str) -> String {
    subject
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Whether a subject belongs to the merge protocol
pub fn is_protocol_message(subject: &str) -> bool {
    parse_message_type(subject).is_some()
}

/// `Key: value` lines of a message body
struct Fields<'a>(HashMap<&'a str, &'a str>);

impl<'a> Fields<'a> {
    fn parse(body: &'a str) -> Self {
        let map = body
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
            .filter(|(key, _)| !key.is_empty() && !key.contains(' '))
            .collect();
        Self(map)
    }

    fn get(&self, key: &str) -> String {
        self.0.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    fn time(&self, key: &str) -> Option<DateTime<Utc>> {
        let value = self.0.get(key)?;
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Payload of a MERGE_READY message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReadyPayload {
    pub branch: String,
    pub issue: String,
    pub polecat: String,
    pub rig: String,
    pub verified: String,
}

impl MergeReadyPayload {
    pub fn from_body(body: &str) -> Self {
        let fields = Fields::parse(body);
        Self {
            branch: fields.get("Branch"),
            issue: fields.get("Issue"),
            polecat: fields.get("Polecat"),
            rig: fields.get("Rig"),
            verified: fields.get("Verified"),
        }
    }
}

/// Payload of a MERGED message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedPayload {
    pub branch: String,
    pub issue: String,
    pub polecat: String,
    pub rig: String,
    pub target_branch: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit: String,
}

impl MergedPayload {
    pub fn from_body(body: &str) -> Self {
        let fields = Fields::parse(body);
        Self {
            branch: fields.get("Branch"),
            issue: fields.get("Issue"),
            polecat: fields.get("Polecat"),
            rig: fields.get("Rig"),
            target_branch: fields.get("Target"),
            merged_at: fields.time("Merged-At"),
            merge_commit: fields.get("Merge-Commit"),
        }
    }
}

/// Payload of a MERGE_FAILED message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeFailedPayload {
    pub branch: String,
    pub issue: String,
    pub polecat: String,
    pub rig: String,
    pub target_branch: String,
    pub failed_at: Option<DateTime<Utc>>,
    /// What failed: `tests`, `build`, `push`, ...
    pub failure_type: String,
    pub error: String,
}

impl MergeFailedPayload {
    pub fn from_body(body: &str) -> Self {
        let fields = Fields::parse(body);
        Self {
            branch: fields.get("Branch"),
            issue: fields.get("Issue"),
            polecat: fields.get("Polecat"),
            rig: fields.get("Rig"),
            target_branch: fields.get("Target"),
            failed_at: fields.time("Failed-At"),
            failure_type: fields.get("Failure-Type"),
            error: fields.get("Error"),
        }
    }
}

/// Payload of a REWORK_REQUEST message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReworkRequestPayload {
    pub branch: String,
    pub issue: String,
    pub polecat: String,
    pub rig: String,
    pub target_branch: String,
    pub requested_at: Option<DateTime<Utc>>,
    pub conflict_files: Vec<String>,
}

impl ReworkRequestPayload {
    pub fn from_body(body: &str) -> Self {
        let fields = Fields::parse(body);
        Self {
            branch: fields.get("Branch"),
            issue: fields.get("Issue"),
            polecat: fields.get("Polecat"),
            rig: fields.get("Rig"),
            target_branch: fields.get("Target"),
            requested_at: fields.time("Requested-At"),
            conflict_files: fields.list("Conflict-Files"),
        }
    }
}

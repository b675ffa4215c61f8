//! Health checks for a town

mod orphan;

pub use orphan::{
    is_valid_session, valid_rigs, OrphanSessionCheck, SessionLister, StaticSessionLister,
};

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Outcome severity of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

/// Result of running a check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the check that ran
    pub name: String,
    pub status: CheckStatus,
    /// One-line summary
    pub message: String,
    /// One line per finding
    pub details: Vec<String>,
    /// How to fix the findings, if there are any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
}

impl CheckResult {
    /// Create a passing result
    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Ok, message)
    }

    /// Create a warning result
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warning, message)
    }

    /// Create an error result
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Error, message)
    }

    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            details: Vec::new(),
            fix_hint: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

/// A doctor check
pub trait Check {
    /// Short identifier (e.g., "orphan-sessions")
    fn name(&self) -> &'static str;

    /// What the check looks for
    fn description(&self) -> &'static str;

    /// Inspect the town
    fn run(&mut self, town_root: &Path) -> Result<CheckResult>;

    /// Whether findings can be fixed automatically
    fn can_fix(&self) -> bool {
        false
    }
}

//! Orphaned session detection
//!
//! A session is orphaned when its name says it belongs to a rig the town no
//! longer has. Crew sessions are reported but never offered for cleanup,
//! since they hold a human's work.

use super::{Check, CheckResult};
use crate::error::Result;
use crate::session::{
    categorize_session_with_rigs, is_crew_session, DEACON_SESSION, MAYOR_SESSION, RIG_PREFIX,
    TOWN_PREFIX,
};
use crate::workspace::RESERVED_DIRS;
use std::fs;
use std::path::Path;

/// Source of live session names
pub trait SessionLister {
    fn list_sessions(&self) -> Result<Vec<String>>;
}

/// Session lister over a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticSessionLister {
    sessions: Vec<String>,
}

impl StaticSessionLister {
    pub fn new<I, S>(sessions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sessions: sessions.into_iter().map(Into::into).collect(),
        }
    }
}

impl SessionLister for StaticSessionLister {
    fn list_sessions(&self) -> Result<Vec<String>> {
        Ok(self.sessions.clone())
    }
}

/// Rigs present in a town
///
/// Requires `<town>/mayor`; without it the directory is not a town and no
/// rig is known. A rig is a visible, non-reserved directory holding `crew/`
/// or `polecats/`. Sorted by name.
pub fn valid_rigs(town_root: &Path) -> Result<Vec<String>> {
    if !town_root.join("mayor").is_dir() {
        return Ok(Vec::new());
    }

    let mut rigs = Vec::new();
    for entry in fs::read_dir(town_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') || RESERVED_DIRS.contains(&name.as_str()) {
            continue;
        }
        let path = entry.path();
        if path.join("crew").is_dir() || path.join("polecats").is_dir() {
            rigs.push(name);
        }
    }
    rigs.sort();
    Ok(rigs)
}

/// Whether a session belongs to a live agent of this town
pub fn is_valid_session<S: AsRef<str>>(session: &str, rigs: &[S]) -> bool {
    if session == MAYOR_SESSION || session == DEACON_SESSION {
        return true;
    }
    let Some(record) = categorize_session_with_rigs(session, rigs) else {
        return false;
    };
    if record.role.is_town_level() {
        return true;
    }
    rigs.iter().any(|rig| rig.as_ref() == record.rig)
}

/// Finds sessions whose rig no longer exists
pub struct OrphanSessionCheck<L> {
    lister: L,
    orphans: Vec<String>,
}

impl<L: SessionLister> OrphanSessionCheck<L> {
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            orphans: Vec::new(),
        }
    }

    /// Orphans found by the last run
    pub fn orphans(&self) -> &[String] {
        &self.orphans
    }

    /// Orphans that may be killed: everything except crew sessions
    pub fn fix_targets(&self) -> Vec<String> {
        self.orphans
            .iter()
            .filter(|session| {
                let crew = is_crew_session(session);
                if crew {
                    tracing::debug!(session = %session, "Skipping crew session");
                }
                !crew
            })
            .cloned()
            .collect()
    }
}

impl<L: SessionLister> Check for OrphanSessionCheck<L> {
    fn name(&self) -> &'static str {
        "orphan-sessions"
    }

    fn description(&self) -> &'static str {
        "Detect agent sessions whose rig no longer exists"
    }

    fn run(&mut self, town_root: &Path) -> Result<CheckResult> {
        let rigs = valid_rigs(town_root)?;
        let sessions = self.lister.list_sessions()?;

        self.orphans = sessions
            .into_iter()
            .filter(|s| s.starts_with(RIG_PREFIX) || s.starts_with(TOWN_PREFIX))
            .filter(|s| !is_valid_session(s, rigs.as_slice()))
            .collect();

        tracing::debug!(rigs = ?rigs, orphans = self.orphans.len(), "Orphan session scan");

        if self.orphans.is_empty() {
            return Ok(CheckResult::ok(self.name(), "No orphaned sessions"));
        }

        let details = self
            .orphans
            .iter()
            .map(|s| format!("Orphan: {}", s))
            .collect();
        Ok(CheckResult::warning(
            self.name(),
            format!("Found {} orphaned session(s)", self.orphans.len()),
        )
        .with_details(details)
        .with_fix_hint("Kill the listed sessions with 'tmux kill-session -t <name>' (crew sessions are left alone)"))
    }

    fn can_fix(&self) -> bool {
        true
    }
}

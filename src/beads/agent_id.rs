//! Agent bead IDs
//!
//! Every agent is tracked in beads as an issue whose ID is derived from its
//! identity:
//!
//! - `hq-mayor`, `hq-deacon`
//! - `wt-<rig>-witness`, `wt-<rig>-refinery`
//! - `wt-<rig>-crew-<name>`
//! - `wt-<rig>-polecat-<name>`
//!
//! Unlike session names, polecat IDs always spell out the role, so the
//! mapping can be reversed without guessing.
//!
//! The string helpers return an empty string for anything that is not an
//! agent; callers iterate over mixed lists and skip those entries.

use crate::connection::parse_address;
use crate::session::{AgentIdentity, Role, DEACON_SESSION, MAYOR_SESSION, RIG_PREFIX};
use std::fmt;

/// Type-safe wrapper for agent bead IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentBeadId(String);

impl AgentBeadId {
    /// The bead ID tracking an agent
    pub fn for_identity(identity: &AgentIdentity) -> Self {
        let id = match identity {
            AgentIdentity::Mayor => MAYOR_SESSION.to_string(),
            AgentIdentity::Deacon => DEACON_SESSION.to_string(),
            AgentIdentity::Witness { rig } => format!("{RIG_PREFIX}{rig}-witness"),
            AgentIdentity::Refinery { rig } => format!("{RIG_PREFIX}{rig}-refinery"),
            AgentIdentity::Crew { rig, name } => format!("{RIG_PREFIX}{rig}-crew-{name}"),
            AgentIdentity::Polecat { rig, name } => format!("{RIG_PREFIX}{rig}-polecat-{name}"),
        };
        Self(id)
    }

    /// Parse a bead ID back into the agent it tracks
    ///
    /// Accepts the legacy `wt-mayor` / `wt-deacon` IDs as well.
    pub fn parse(id: &str) -> Option<AgentIdentity> {
        match id {
            MAYOR_SESSION | "wt-mayor" => return Some(AgentIdentity::Mayor),
            DEACON_SESSION | "wt-deacon" => return Some(AgentIdentity::Deacon),
            _ => {}
        }

        let rest = id.strip_prefix(RIG_PREFIX)?;
        if let Some(rig) = rest.strip_suffix("-witness") {
            return AgentIdentity::from_parts(Role::Witness, rig, "");
        }
        if let Some(rig) = rest.strip_suffix("-refinery") {
            return AgentIdentity::from_parts(Role::Refinery, rig, "");
        }
        if let Some((rig, name)) = rest.split_once("-crew-") {
            return AgentIdentity::from_parts(Role::Crew, rig, name);
        }
        if let Some((rig, name)) = rest.split_once("-polecat-") {
            return AgentIdentity::from_parts(Role::Polecat, rig, name);
        }
        None
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentBeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&AgentIdentity> for AgentBeadId {
    fn from(identity: &AgentIdentity) -> Self {
        Self::for_identity(identity)
    }
}

/// Interpret a mail-style address as an agent
///
/// Accepts `mayor`, `deacon` (with or without a trailing slash),
/// `rig/witness`, `rig/refinery`, `rig/crew/name`, `rig/polecat/name`,
/// `rig/polecats/name` and the legacy polecat shorthand `rig/name`.
pub fn identity_for_address(address: &str) -> Option<AgentIdentity> {
    match address {
        "mayor" | "mayor/" => return Some(AgentIdentity::Mayor),
        "deacon" | "deacon/" => return Some(AgentIdentity::Deacon),
        _ => {}
    }

    let addr = parse_address(address).ok()?;
    if !addr.is_local() || addr.is_broadcast() {
        return None;
    }

    let rig = addr.rig.as_str();
    match addr.polecat.split_once('/') {
        None => match addr.polecat.as_str() {
            "witness" => AgentIdentity::from_parts(Role::Witness, rig, ""),
            "refinery" => AgentIdentity::from_parts(Role::Refinery, rig, ""),
            "crew" | "polecat" | "polecats" => None,
            name => AgentIdentity::from_parts(Role::Polecat, rig, name),
        },
        Some((_, name)) if name.contains('/') => None,
        Some(("crew", name)) => AgentIdentity::from_parts(Role::Crew, rig, name),
        Some(("polecat" | "polecats", name)) => AgentIdentity::from_parts(Role::Polecat, rig, name),
        Some(_) => None,
    }
}

/// The address form used for agent beads
///
/// Town-level agents keep a trailing slash and polecats use the singular
/// `polecat` segment.
fn bead_address(identity: &AgentIdentity) -> String {
    match identity {
        AgentIdentity::Polecat { rig, name } => format!("{}/polecat/{}", rig, name),
        other => other.mail_address(),
    }
}

/// Map an agent address to its bead ID (empty if not an agent)
pub fn address_to_agent_bead_id(address: &str) -> String {
    identity_for_address(address)
        .map(|identity| AgentBeadId::for_identity(&identity).to_string())
        .unwrap_or_default()
}

/// Map an agent bead ID back to its address (empty if not an agent)
pub fn agent_bead_id_to_address(id: &str) -> String {
    AgentBeadId::parse(id)
        .map(|identity| bead_address(&identity))
        .unwrap_or_default()
}

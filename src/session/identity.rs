//! Agent identities and their tmux session names
//!
//! Every running agent has exactly one session name. Town-level agents use
//! fixed names (`hq-mayor`, `hq-deacon`); rig-level agents use the `wt-`
//! prefix followed by the rig and a role marker:
//!
//! | Role     | Session name              | Address              |
//! |----------|---------------------------|----------------------|
//! | mayor    | `hq-mayor`                | `mayor`              |
//! | deacon   | `hq-deacon`               | `deacon`             |
//! | witness  | `wt-<rig>-witness`        | `<rig>/witness`      |
//! | refinery | `wt-<rig>-refinery`       | `<rig>/refinery`     |
//! | crew     | `wt-<rig>-crew-<name>`    | `<rig>/crew/<name>`  |
//! | polecat  | `wt-<rig>-<name>`         | `<rig>/polecats/<name>` |
//!
//! Rig names may contain hyphens, so the part after `wt-` is matched against
//! an ordered list of rules (see [`parse_session_name`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of town-level session names
pub const TOWN_PREFIX: &str = "hq-";

/// Prefix of rig-level session names
pub const RIG_PREFIX: &str = "wt-";

/// Session name of the mayor
pub const MAYOR_SESSION: &str = "hq-mayor";

/// Session name of the deacon
pub const DEACON_SESSION: &str = "hq-deacon";

const WITNESS_SUFFIX: &str = "-witness";
const REFINERY_SUFFIX: &str = "-refinery";
const CREW_MARKER: &str = "-crew-";

/// Error type for session name parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionNameError {
    #[error("invalid session name '{0}': missing 'wt-' prefix")]
    MissingPrefix(String),

    #[error("invalid session name '{0}': nothing after prefix")]
    Empty(String),

    #[error("invalid session name '{0}': expected <rig>-<role> or <rig>-<name>")]
    Malformed(String),
}

/// Agent role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Town-level coordinator
    Mayor,
    /// Town-level heartbeat patrol
    Deacon,
    /// Per-rig lifecycle manager
    Witness,
    /// Per-rig merge processor
    Refinery,
    /// Persistent user-managed worker
    Crew,
    /// Ephemeral pool-managed worker
    Polecat,
}

impl Role {
    /// All roles, town-level first
    pub const ALL: [Role; 6] = [
        Role::Mayor,
        Role::Deacon,
        Role::Witness,
        Role::Refinery,
        Role::Crew,
        Role::Polecat,
    ];

    /// Get the role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mayor => "mayor",
            Self::Deacon => "deacon",
            Self::Witness => "witness",
            Self::Refinery => "refinery",
            Self::Crew => "crew",
            Self::Polecat => "polecat",
        }
    }

    /// Check if the role lives at town level (no rig)
    pub fn is_town_level(&self) -> bool {
        matches!(self, Self::Mayor | Self::Deacon)
    }

    /// Check if the role is a named worker (crew or polecat)
    pub fn is_worker(&self) -> bool {
        matches!(self, Self::Crew | Self::Polecat)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mayor" => Ok(Self::Mayor),
            "deacon" => Ok(Self::Deacon),
            "witness" => Ok(Self::Witness),
            "refinery" => Ok(Self::Refinery),
            "crew" => Ok(Self::Crew),
            "polecat" | "polecats" => Ok(Self::Polecat),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Canonical identity of an agent
///
/// The variant decides which fields exist, so a witness can never carry a
/// worker name and a mayor can never carry a rig.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum AgentIdentity {
    Mayor,
    Deacon,
    Witness { rig: String },
    Refinery { rig: String },
    Crew { rig: String, name: String },
    Polecat { rig: String, name: String },
}

impl AgentIdentity {
    /// Build an identity from loose parts
    ///
    /// Returns `None` when a field the role needs is empty. Fields the role
    /// does not use are ignored.
    pub fn from_parts(role: Role, rig: &str, name: &str) -> Option<Self> {
        let rig = rig.to_string();
        let name = name.to_string();
        let identity = match role {
            Role::Mayor => Self::Mayor,
            Role::Deacon => Self::Deacon,
            Role::Witness => Self::Witness { rig },
            Role::Refinery => Self::Refinery { rig },
            Role::Crew => Self::Crew { rig, name },
            Role::Polecat => Self::Polecat { rig, name },
        };

        let rig_ok = role.is_town_level() || identity.rig().is_some_and(|r| !r.is_empty());
        let name_ok = !role.is_worker() || identity.name().is_some_and(|n| !n.is_empty());
        (rig_ok && name_ok).then_some(identity)
    }

    /// The role of this agent
    pub fn role(&self) -> Role {
        match self {
            Self::Mayor => Role::Mayor,
            Self::Deacon => Role::Deacon,
            Self::Witness { .. } => Role::Witness,
            Self::Refinery { .. } => Role::Refinery,
            Self::Crew { .. } => Role::Crew,
            Self::Polecat { .. } => Role::Polecat,
        }
    }

    /// The rig this agent belongs to (`None` for town-level agents)
    pub fn rig(&self) -> Option<&str> {
        match self {
            Self::Mayor | Self::Deacon => None,
            Self::Witness { rig }
            | Self::Refinery { rig }
            | Self::Crew { rig, .. }
            | Self::Polecat { rig, .. } => Some(rig),
        }
    }

    /// The worker name (`None` unless crew or polecat)
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Mayor | Self::Deacon | Self::Witness { .. } | Self::Refinery { .. } => None,
            Self::Crew { name, .. } | Self::Polecat { name, .. } => Some(name),
        }
    }

    /// The tmux session name for this agent
    pub fn session_name(&self) -> String {
        match self {
            Self::Mayor => MAYOR_SESSION.to_string(),
            Self::Deacon => DEACON_SESSION.to_string(),
            Self::Witness { rig } => format!("{RIG_PREFIX}{rig}{WITNESS_SUFFIX}"),
            Self::Refinery { rig } => format!("{RIG_PREFIX}{rig}{REFINERY_SUFFIX}"),
            Self::Crew { rig, name } => format!("{RIG_PREFIX}{rig}{CREW_MARKER}{name}"),
            Self::Polecat { rig, name } => format!("{RIG_PREFIX}{rig}-{name}"),
        }
    }

    /// The slash-delimited address of this agent
    pub fn address(&self) -> String {
        match self {
            Self::Mayor => "mayor".to_string(),
            Self::Deacon => "deacon".to_string(),
            Self::Witness { rig } => format!("{}/witness", rig),
            Self::Refinery { rig } => format!("{}/refinery", rig),
            Self::Crew { rig, name } => format!("{}/crew/{}", rig, name),
            Self::Polecat { rig, name } => format!("{}/polecats/{}", rig, name),
        }
    }

    /// The address used for mail delivery
    ///
    /// Same as [`address`](Self::address) except that town-level agents
    /// carry a trailing slash (`mayor/`).
    pub fn mail_address(&self) -> String {
        match self {
            Self::Mayor | Self::Deacon => format!("{}/", self.address()),
            _ => self.address(),
        }
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl FromStr for AgentIdentity {
    type Err = SessionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_session_name(s)
    }
}

/// A rule applied to the part of a rig session name after `wt-`
type SessionRule = fn(&str) -> Option<AgentIdentity>;

/// Rig session rules, highest priority first
///
/// Role markers are checked before the polecat fallback, so a polecat named
/// `witness` or a rig ending in `-crew-<x>` cannot be expressed. Rig names
/// that merely contain a marker word (`witnesses`, `crewmates`) are fine.
const RIG_SESSION_RULES: &[SessionRule] = &[witness_rule, refinery_rule, crew_rule, polecat_rule];

fn witness_rule(rest: &str) -> Option<AgentIdentity> {
    let rig = rest.strip_suffix(WITNESS_SUFFIX).filter(|r| !r.is_empty())?;
    Some(AgentIdentity::Witness {
        rig: rig.to_string(),
    })
}

fn refinery_rule(rest: &str) -> Option<AgentIdentity> {
    let rig = rest.strip_suffix(REFINERY_SUFFIX).filter(|r| !r.is_empty())?;
    Some(AgentIdentity::Refinery {
        rig: rig.to_string(),
    })
}

fn crew_rule(rest: &str) -> Option<AgentIdentity> {
    let (rig, name) = rest.split_once(CREW_MARKER)?;
    AgentIdentity::from_parts(Role::Crew, rig, name)
}

fn polecat_rule(rest: &str) -> Option<AgentIdentity> {
    let (rig, name) = rest.rsplit_once('-')?;
    AgentIdentity::from_parts(Role::Polecat, rig, name)
}

/// Parse a tmux session name into an agent identity
///
/// `hq-mayor` and `hq-deacon` match exactly. Anything else must start with
/// `wt-`; the remainder is tried against, in order:
///
/// 1. `<rig>-witness`
/// 2. `<rig>-refinery`
/// 3. `<rig>-crew-<name>` (split at the first `-crew-`)
/// 4. `<rig>-<name>` polecat (split at the last `-`)
///
/// # Errors
/// Returns an error when the prefix is missing, nothing follows it, or the
/// remainder has no rig/name split.
pub fn parse_session_name(s: &str) -> Result<AgentIdentity, SessionNameError> {
    match s {
        MAYOR_SESSION => return Ok(AgentIdentity::Mayor),
        DEACON_SESSION => return Ok(AgentIdentity::Deacon),
        _ => {}
    }

    let rest = s
        .strip_prefix(RIG_PREFIX)
        .ok_or_else(|| SessionNameError::MissingPrefix(s.to_string()))?;
    if rest.is_empty() {
        return Err(SessionNameError::Empty(s.to_string()));
    }

    RIG_SESSION_RULES
        .iter()
        .find_map(|rule| rule(rest))
        .ok_or_else(|| SessionNameError::Malformed(s.to_string()))
}

//! Town workspace layout
//!
//! Every agent works out of a fixed directory under the town root:
//!
//! ```text
//! <town>/mayor                        mayor (also holds rigs.json)
//! <town>/deacon                       deacon
//! <town>/<rig>/witness                witness
//! <town>/<rig>/refinery/rig           refinery
//! <town>/<rig>/crew/<name>/rig        crew member
//! <town>/<rig>/polecats/<name>/rig    polecat
//! ```
//!
//! Agents find out who they are either from the `WT_*` environment their
//! session was started with or from where they are standing in this tree.

use crate::session::{AgentIdentity, Role};
use std::path::{Component, Path, PathBuf};

/// Directories at the town root that are never rigs
pub const RESERVED_DIRS: &[&str] = &["mayor", "deacon", ".beads", ".claude", ".git", "plugins"];

/// Sender used when no agent identity is set
pub const OVERSEER: &str = "overseer";

pub const ENV_ROLE: &str = "WT_ROLE";
pub const ENV_RIG: &str = "WT_RIG";
pub const ENV_POLECAT: &str = "WT_POLECAT";
pub const ENV_CREW: &str = "WT_CREW";
pub const ENV_ROLE_HOME: &str = "WT_ROLE_HOME";
pub const ENV_ACTOR: &str = "BD_ACTOR";

/// Home directory of an agent
pub fn role_home(town_root: &Path, identity: &AgentIdentity) -> PathBuf {
    match identity {
        AgentIdentity::Mayor => town_root.join("mayor"),
        AgentIdentity::Deacon => town_root.join("deacon"),
        AgentIdentity::Witness { rig } => town_root.join(rig).join("witness"),
        AgentIdentity::Refinery { rig } => town_root.join(rig).join("refinery").join("rig"),
        AgentIdentity::Crew { rig, name } => town_root.join(rig).join("crew").join(name).join("rig"),
        AgentIdentity::Polecat { rig, name } => {
            town_root.join(rig).join("polecats").join(name).join("rig")
        }
    }
}

/// Path components below the town root, or `None` if outside it
fn components_under<'a>(town_root: &Path, path: &'a Path) -> Option<Vec<&'a str>> {
    let relative = path.strip_prefix(town_root).ok()?;
    relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect()
}

/// Identify the agent whose home contains `path`
///
/// A rig root, or a `crew`/`polecats` directory without a worker name,
/// belongs to no agent.
pub fn detect_role(town_root: &Path, path: &Path) -> Option<AgentIdentity> {
    let parts = components_under(town_root, path)?;
    match parts.as_slice() {
        ["mayor", ..] => Some(AgentIdentity::Mayor),
        ["deacon", ..] => Some(AgentIdentity::Deacon),
        [rig, ..] if RESERVED_DIRS.contains(rig) || rig.starts_with('.') => None,
        [rig, "witness", ..] => AgentIdentity::from_parts(Role::Witness, rig, ""),
        [rig, "refinery", ..] => AgentIdentity::from_parts(Role::Refinery, rig, ""),
        [rig, "crew", name, ..] => AgentIdentity::from_parts(Role::Crew, rig, name),
        [rig, "polecats", name, ..] => AgentIdentity::from_parts(Role::Polecat, rig, name),
        _ => None,
    }
}

/// Environment an agent's session runs with
pub fn role_env(town_root: &Path, identity: &AgentIdentity) -> Vec<(String, String)> {
    let mut env = vec![(ENV_ROLE.to_string(), identity.role().to_string())];

    if let Some(rig) = identity.rig() {
        env.push((ENV_RIG.to_string(), rig.to_string()));
    }
    match identity {
        AgentIdentity::Polecat { name, .. } => env.push((ENV_POLECAT.to_string(), name.clone())),
        AgentIdentity::Crew { name, .. } => env.push((ENV_CREW.to_string(), name.clone())),
        _ => {}
    }
    if identity.rig().is_some() {
        env.push((ENV_ACTOR.to_string(), identity.address()));
    }

    env.push((
        ENV_ROLE_HOME.to_string(),
        role_home(town_root, identity).display().to_string(),
    ));
    env
}

/// Identity described by `WT_*` variables
///
/// `lookup` is usually `|key| std::env::var(key).ok()`. Returns `None` if
/// the role is unset, unknown, or missing its rig or worker name.
pub fn identity_from_env<F>(lookup: F) -> Option<AgentIdentity>
where
    F: Fn(&str) -> Option<String>,
{
    let role: Role = lookup(ENV_ROLE)?.parse().ok()?;
    let rig = lookup(ENV_RIG).unwrap_or_default();
    let name = match role {
        Role::Polecat => lookup(ENV_POLECAT).unwrap_or_default(),
        Role::Crew => lookup(ENV_CREW).unwrap_or_default(),
        _ => String::new(),
    };
    AgentIdentity::from_parts(role, &rig, &name)
}

/// Mail sender for the current process
pub fn sender_from_env<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    identity_from_env(lookup)
        .map(|identity| identity.mail_address())
        .unwrap_or_else(|| OVERSEER.to_string())
}

/// Nearest ancestor of `start` that is a town root
///
/// A town root is marked by `mayor/rigs.json`.
pub fn find_town_root(start: &Path) -> Option<PathBuf> {
    let root = start
        .ancestors()
        .find(|dir| dir.join("mayor").join("rigs.json").is_file())
        .map(Path::to_path_buf);
    tracing::trace!(start = %start.display(), found = ?root, "Town root lookup");
    root
}

/// Rig containing `path`, if any
///
/// The rig is the first component under the town root; it must not be a
/// reserved directory and must carry a `config.json`.
pub fn detect_rig_from_path(town_root: &Path, path: &Path) -> Option<String> {
    let parts = components_under(town_root, path)?;
    let rig = *parts.first()?;
    if RESERVED_DIRS.contains(&rig) {
        return None;
    }
    town_root
        .join(rig)
        .join("config.json")
        .is_file()
        .then(|| rig.to_string())
}

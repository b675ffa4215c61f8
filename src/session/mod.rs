//! Agent sessions
//!
//! Maps between agent identities and the tmux session names they run under,
//! and labels arbitrary live session names.
//!
//! # Session names
//!
//! - `hq-mayor`, `hq-deacon` - Town-level agents
//! - `wt-<rig>-witness`, `wt-<rig>-refinery` - Rig singletons
//! - `wt-<rig>-crew-<name>` - Crew members
//! - `wt-<rig>-<name>` - Polecats

mod classify;
mod identity;

pub use classify::{
    categorize_session, categorize_session_with_rigs, is_crew_session, parse_polecat_session_name,
    AgentRecord,
};
pub use identity::{
    parse_session_name, AgentIdentity, Role, SessionNameError, DEACON_SESSION, MAYOR_SESSION,
    RIG_PREFIX, TOWN_PREFIX,
};

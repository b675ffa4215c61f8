//! Beads integration
//!
//! Maps agents to the IDs of the beads that track them.

mod agent_id;

pub use agent_id::{
    address_to_agent_bead_id, agent_bead_id_to_address, identity_for_address, AgentBeadId,
};

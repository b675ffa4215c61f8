//! Rig addressing
//!
//! Parses and formats the `[machine:]rig/[polecat]` addresses typed on the
//! command line and passed between agents.

mod address;

pub use address::{parse_address, Address, AddressError, LOCAL_MACHINE};

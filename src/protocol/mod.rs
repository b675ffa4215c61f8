//! Merge protocol between witnesses and refineries
//!
//! Witnesses and refineries coordinate merges over ordinary mail. The
//! subject line carries the message type and polecat name
//! (`MERGE_READY nux`); the body carries `Key: value` lines.
//!
//! ```text
//! witness  --MERGE_READY-->     refinery
//! witness  <--MERGED--          refinery
//! witness  <--MERGE_FAILED--    refinery
//! witness  <--REWORK_REQUEST--  refinery
//! ```

mod handlers;
pub mod messages;
mod types;

pub use handlers::{
    wrap_refinery_handlers, wrap_witness_handlers, DefaultWitnessHandler, Handler,
    HandlerRegistry, RefineryHandler, WitnessHandler,
};
pub use types::{
    extract_polecat, is_protocol_message, parse_message_type, MergeFailedPayload,
    MergeReadyPayload, MergedPayload, MessageType, ReworkRequestPayload,
};

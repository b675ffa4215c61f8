//! Agent mail
//!
//! Messages, recipient resolution and nudge targeting. Delivery itself is
//! handled by beads; this module only decides who a message is for.

mod message;
mod nudge;
mod resolve;

pub use message::{Message, Priority};
pub use nudge::resolve_nudge_pattern;
pub use resolve::{match_pattern, Recipient, RecipientType, ResolveError, Resolver};

//! Recipient resolution
//!
//! Turns whatever a user typed as a mail recipient into concrete recipients.
//!
//! # Recipient forms
//!
//! - `queue:<name>` - A work queue
//! - `channel:<name>` - A broadcast channel
//! - `list:<name>`, `announce:<name>` - Mailing lists and announcement feeds
//! - `@<pattern>` - Group patterns (`@town`, `@rig/whaletown`), delivered as-is
//! - `rig/role[/name]` - A direct agent address; `*` segments expand
//!   against the roster
//! - `mayor`, `deacon` - Town-level agents
//! - `<name>` - A crew member or polecat looked up by name

use crate::connection::{parse_address, AddressError};
use crate::session::AgentRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for recipient resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown recipient: {0}")]
    UnknownRecipient(String),

    #[error("invalid recipient '{0}': nothing after prefix")]
    EmptyName(String),

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Kind of recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// A single agent mailbox
    Agent,
    /// A work queue (`queue:`)
    Queue,
    /// A broadcast channel (`channel:`)
    Channel,
    /// A mailing list (`list:`)
    List,
    /// An announcement feed (`announce:`)
    Announce,
    /// A group pattern (`@...`), expanded by the router
    Group,
}

impl RecipientType {
    /// The explicit prefix for this kind, if it has one
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Queue => Some("queue:"),
            Self::Channel => Some("channel:"),
            Self::List => Some("list:"),
            Self::Announce => Some("announce:"),
            Self::Agent | Self::Group => None,
        }
    }
}

/// Explicit prefixes, checked in order
const PREFIXED_TYPES: [RecipientType; 4] = [
    RecipientType::Queue,
    RecipientType::Channel,
    RecipientType::List,
    RecipientType::Announce,
];

/// A resolved recipient
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// Agent address, or the name after the prefix for prefixed kinds
    pub address: String,

    #[serde(rename = "type")]
    pub kind: RecipientType,
}

impl Recipient {
    /// Create a recipient
    pub fn new(address: impl Into<String>, kind: RecipientType) -> Self {
        Self {
            address: address.into(),
            kind,
        }
    }

    /// Create an agent recipient
    pub fn agent(address: impl Into<String>) -> Self {
        Self::new(address, RecipientType::Agent)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix().unwrap_or(""), self.address)
    }
}

/// Match an address against a pattern
///
/// Without `*` the pattern must equal the address. With `*` both must have
/// the same number of `/` segments; each `*` matches exactly one non-empty
/// segment and every other segment must match literally.
pub fn match_pattern(pattern: &str, address: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == address;
    }

    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let address_parts: Vec<&str> = address.split('/').collect();
    if pattern_parts.len() != address_parts.len() {
        return false;
    }

    pattern_parts
        .iter()
        .zip(&address_parts)
        .all(|(p, a)| if *p == "*" { !a.is_empty() } else { p == a })
}

/// Resolves recipients against a snapshot of running agents
///
/// The roster is borrowed for the resolver's lifetime and never modified.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    roster: &'a [AgentRecord],
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a roster (may be empty)
    pub fn new(roster: &'a [AgentRecord]) -> Self {
        Self { roster }
    }

    /// Resolve one recipient string
    ///
    /// # Errors
    /// Returns `UnknownRecipient` when a bare name or a wildcard matches no
    /// agent, and an address error when a direct address is malformed.
    pub fn resolve(&self, address: &str) -> Result<Vec<Recipient>, ResolveError> {
        for kind in PREFIXED_TYPES {
            let Some(prefix) = kind.prefix() else {
                continue;
            };
            if let Some(name) = address.strip_prefix(prefix) {
                if name.is_empty() {
                    return Err(ResolveError::EmptyName(address.to_string()));
                }
                return Ok(vec![Recipient::new(name, kind)]);
            }
        }

        if address.starts_with('@') {
            if address.len() == 1 {
                return Err(ResolveError::EmptyName(address.to_string()));
            }
            return Ok(vec![Recipient::new(address, RecipientType::Group)]);
        }

        match address {
            "mayor" | "deacon" => return Ok(vec![Recipient::agent(format!("{}/", address))]),
            "" => return Err(AddressError::Empty.into()),
            _ => {}
        }

        if address.contains('/') {
            if address.contains('*') {
                return self.expand_wildcard(address);
            }
            parse_address(address)?;
            return Ok(vec![Recipient::agent(address)]);
        }

        self.resolve_name(address)
    }

    fn expand_wildcard(&self, pattern: &str) -> Result<Vec<Recipient>, ResolveError> {
        let mut recipients: Vec<Recipient> = self
            .roster
            .iter()
            .filter_map(|record| record.identity())
            .map(|identity| identity.mail_address())
            .filter(|address| match_pattern(pattern, address))
            .map(Recipient::agent)
            .collect();
        recipients.sort_by(|a, b| a.address.cmp(&b.address));
        recipients.dedup();

        tracing::debug!(pattern, matches = recipients.len(), "Expanded recipient pattern");

        if recipients.is_empty() {
            return Err(ResolveError::UnknownRecipient(pattern.to_string()));
        }
        Ok(recipients)
    }

    fn resolve_name(&self, name: &str) -> Result<Vec<Recipient>, ResolveError> {
        let mut recipients: Vec<Recipient> = self
            .roster
            .iter()
            .filter(|record| record.role.is_worker() && record.name == name)
            .filter_map(|record| record.address())
            .map(Recipient::agent)
            .collect();
        recipients.sort_by(|a, b| a.address.cmp(&b.address));
        recipients.dedup();

        if recipients.is_empty() {
            tracing::debug!(name, "No agent found for bare recipient name");
            return Err(ResolveError::UnknownRecipient(name.to_string()));
        }
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::categorize_session;

    fn roster() -> Vec<AgentRecord> {
        [
            "hq-mayor",
            "wt-whaletown-witness",
            "wt-whaletown-refinery",
            "wt-whaletown-crew-max",
            "wt-whaletown-alpha",
            "wt-beads-witness",
            "wt-beads-crew-max",
        ]
        .into_iter()
        .filter_map(categorize_session)
        .collect()
    }

    #[test]
    fn test_match_pattern() {
        let cases = [
            ("whaletown/witness", "whaletown/witness", true),
            ("mayor/", "mayor/", true),
            ("*/witness", "whaletown/witness", true),
            ("*/witness", "beads/witness", true),
            ("whaletown/*", "whaletown/witness", true),
            ("whaletown/*", "whaletown/refinery", true),
            ("whaletown/crew/*", "whaletown/crew/max", true),
            ("*/witness", "whaletown/refinery", false),
            ("whaletown/*", "beads/witness", false),
            ("whaletown/crew/*", "whaletown/polecats/Toast", false),
            ("whaletown/*", "whaletown/crew/max", false),
            ("whaletown/*/*", "whaletown/crew/max", true),
            ("*/*", "whaletown/witness", true),
            ("*/*/*", "whaletown/crew/max", true),
            ("whaletown/witness", "beads/witness", false),
        ];
        for (pattern, address, want) in cases {
            assert_eq!(match_pattern(pattern, address), want, "{} vs {}", pattern, address);
        }
    }

    #[test]
    fn test_wildcard_never_matches_empty_segment() {
        assert!(!match_pattern("whaletown/*", "whaletown/"));
        assert!(!match_pattern("*/witness", "/witness"));
    }

    #[test]
    fn test_segment_count_law() {
        let patterns = ["*", "*/*", "a/*", "*/b/*", "a/*/c/*"];
        let addresses = ["a", "a/b", "a/b/c", "a/b/c/d", "x/y"];
        for pattern in patterns {
            for address in addresses {
                let same_len = pattern.split('/').count() == address.split('/').count();
                let literal_ok = pattern
                    .split('/')
                    .zip(address.split('/'))
                    .all(|(p, a)| p == "*" || p == a);
                assert_eq!(
                    match_pattern(pattern, address),
                    same_len && literal_ok,
                    "{} vs {}",
                    pattern,
                    address
                );
            }
        }
    }

    #[test]
    fn test_resolve_direct_addresses() {
        let resolver = Resolver::new(&[]);
        let cases = [
            ("whaletown/witness", RecipientType::Agent, "whaletown/witness"),
            ("whaletown/crew/max", RecipientType::Agent, "whaletown/crew/max"),
            ("mayor/", RecipientType::Agent, "mayor/"),
            ("mayor", RecipientType::Agent, "mayor/"),
            ("deacon", RecipientType::Agent, "deacon/"),
        ];
        for (input, kind, address) in cases {
            let got = resolver.resolve(input).unwrap();
            assert_eq!(got, vec![Recipient::new(address, kind)], "{}", input);
        }
    }

    #[test]
    fn test_resolve_prefixes() {
        let resolver = Resolver::new(&[]);
        let cases = [
            ("queue:work", RecipientType::Queue, "work"),
            ("channel:alerts", RecipientType::Channel, "alerts"),
            ("list:oncall", RecipientType::List, "oncall"),
            ("announce:alerts", RecipientType::Announce, "alerts"),
        ];
        for (input, kind, name) in cases {
            let got = resolver.resolve(input).unwrap();
            assert_eq!(got.len(), 1);
            assert_eq!(got[0].kind, kind);
            assert_eq!(got[0].address, name);
            assert_eq!(got[0].to_string(), input);
        }
    }

    #[test]
    fn test_resolve_group_patterns_pass_through() {
        let resolver = Resolver::new(&[]);
        for input in ["@town", "@witnesses", "@rig/whaletown", "@overseer"] {
            let got = resolver.resolve(input).unwrap();
            assert_eq!(got, vec![Recipient::new(input, RecipientType::Group)]);
        }
    }

    #[test]
    fn test_resolve_empty_prefixed_names() {
        let resolver = Resolver::new(&[]);
        for input in ["queue:", "channel:", "@"] {
            assert!(matches!(
                resolver.resolve(input),
                Err(ResolveError::EmptyName(_))
            ));
        }
    }

    #[test]
    fn test_resolve_unknown_name() {
        let resolver = Resolver::new(&[]);
        assert_eq!(
            resolver.resolve("unknown-name"),
            Err(ResolveError::UnknownRecipient("unknown-name".into()))
        );
    }

    #[test]
    fn test_resolve_malformed_address() {
        let resolver = Resolver::new(&[]);
        assert!(matches!(resolver.resolve(""), Err(ResolveError::Address(_))));
        assert!(matches!(
            resolver.resolve("/whaletown"),
            Err(ResolveError::Address(_))
        ));
    }

    #[test]
    fn test_resolve_bare_name_from_roster() {
        let roster = roster();
        let resolver = Resolver::new(&roster);

        let got = resolver.resolve("alpha").unwrap();
        assert_eq!(got, vec![Recipient::agent("whaletown/polecats/alpha")]);

        let got = resolver.resolve("max").unwrap();
        assert_eq!(
            got,
            vec![
                Recipient::agent("beads/crew/max"),
                Recipient::agent("whaletown/crew/max"),
            ]
        );

        // Singletons are not addressable by bare role name
        assert!(resolver.resolve("witness").is_err());
    }

    #[test]
    fn test_resolve_wildcards_against_roster() {
        let roster = roster();
        let resolver = Resolver::new(&roster);

        let got = resolver.resolve("*/witness").unwrap();
        assert_eq!(
            got,
            vec![
                Recipient::agent("beads/witness"),
                Recipient::agent("whaletown/witness"),
            ]
        );

        let got = resolver.resolve("*/crew/max").unwrap();
        assert_eq!(got.len(), 2);

        assert_eq!(
            resolver.resolve("nowhere/*"),
            Err(ResolveError::UnknownRecipient("nowhere/*".into()))
        );
    }
}

//! Human-facing agent addresses
//!
//! Addresses name a rig, optionally a polecat inside it, and optionally the
//! machine the rig lives on.
//!
//! # Address Format
//!
//! - `rig/polecat` - A specific polecat on the local machine
//! - `rig/` or `rig` - Broadcast to every polecat in the rig
//! - `machine:rig/polecat` - A polecat on a remote machine
//!
//! Segments are taken verbatim: no trimming, no case folding. Only the first
//! `:` before the first `/` separates the machine, and only the first `/`
//! separates the rig, so `a/b/c` has polecat `b/c`.
//!
//! # Examples
//!
//! ```
//! use whaletown::connection::Address;
//!
//! let addr: Address = "vm:whaletown/rictus".parse().unwrap();
//! assert_eq!(addr.machine, "vm");
//! assert_eq!(addr.rig, "whaletown");
//! assert_eq!(addr.polecat, "rictus");
//! assert_eq!(addr.to_string(), "vm:whaletown/rictus");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Machine name that is treated the same as no machine at all
pub const LOCAL_MACHINE: &str = "local";

/// Error type for address parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address: empty")]
    Empty,

    #[error("invalid address '{0}': leading slash")]
    LeadingSlash(String),

    #[error("invalid address '{0}': empty machine before ':'")]
    EmptyMachine(String),

    #[error("invalid address '{0}': empty rig")]
    EmptyRig(String),
}

/// A parsed rig address
///
/// `machine` is empty for local addresses and `polecat` is empty for rig
/// broadcasts. Two addresses are equal when their fields match, with an
/// empty machine and `"local"` considered the same machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub machine: String,
    pub rig: String,
    pub polecat: String,
}

/// Parse an address string
///
/// # Errors
/// Returns an error when the input is empty, starts with `/`, has an empty
/// machine in front of a `:`, or has no rig.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    if s.is_empty() {
        return Err(AddressError::Empty);
    }
    if s.starts_with('/') {
        return Err(AddressError::LeadingSlash(s.to_string()));
    }

    // A colon only introduces a machine when it comes before the first slash
    let slash = s.find('/');
    let (machine, rest) = match s.find(':') {
        Some(colon) if !matches!(slash, Some(slash) if slash < colon) => {
            if colon == 0 {
                return Err(AddressError::EmptyMachine(s.to_string()));
            }
            (&s[..colon], &s[colon + 1..])
        }
        _ => ("", s),
    };

    let (rig, polecat) = rest.split_once('/').unwrap_or((rest, ""));
    if rig.is_empty() {
        return Err(AddressError::EmptyRig(s.to_string()));
    }

    Ok(Address {
        machine: machine.to_string(),
        rig: rig.to_string(),
        polecat: polecat.to_string(),
    })
}

impl Address {
    /// Create a local address for a polecat (empty polecat for broadcast)
    pub fn new(rig: impl Into<String>, polecat: impl Into<String>) -> Self {
        Self {
            machine: String::new(),
            rig: rig.into(),
            polecat: polecat.into(),
        }
    }

    /// Set the machine this address points at
    pub fn on_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    /// Parse an address that is already known to be valid
    ///
    /// # Panics
    /// Panics when `s` is not a valid address. Only use this on constants
    /// and fixtures, never on user input.
    pub fn must_parse(s: &str) -> Self {
        match parse_address(s) {
            Ok(addr) => addr,
            Err(e) => panic!("must_parse({:?}): {}", s, e),
        }
    }

    /// The address without its machine prefix: `rig/[polecat]`
    pub fn rig_path(&self) -> String {
        format!("{}/{}", self.rig, self.polecat)
    }

    /// Check if the address refers to this machine
    pub fn is_local(&self) -> bool {
        self.machine.is_empty() || self.machine == LOCAL_MACHINE
    }

    /// Check if the address targets the whole rig
    pub fn is_broadcast(&self) -> bool {
        self.polecat.is_empty()
    }

    /// Compare two optional addresses
    ///
    /// A missing address is never equal to anything, not even to another
    /// missing address.
    pub fn equal(a: Option<&Address>, b: Option<&Address>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn normalized_machine(&self) -> &str {
        if self.is_local() {
            ""
        } else {
            &self.machine
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_machine() == other.normalized_machine()
            && self.rig == other.rig
            && self.polecat == other.polecat
    }
}

impl Eq for Address {}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.machine.is_empty() {
            write!(f, "{}:", self.machine)?;
        }
        write!(f, "{}/{}", self.rig, self.polecat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(machine: &str, rig: &str, polecat: &str) -> Address {
        Address::new(rig, polecat).on_machine(machine)
    }

    fn assert_parses(input: &str, machine: &str, rig: &str, polecat: &str) {
        let got = parse_address(input)
            .unwrap_or_else(|e| panic!("parse_address({:?}) failed: {}", input, e));
        assert_eq!(got.machine, machine, "machine of {:?}", input);
        assert_eq!(got.rig, rig, "rig of {:?}", input);
        assert_eq!(got.polecat, polecat, "polecat of {:?}", input);
    }

    #[test]
    fn test_parse_basic_forms() {
        assert_parses("whaletown/rictus", "", "whaletown", "rictus");
        assert_parses("whaletown/", "", "whaletown", "");
        assert_parses("vm:whaletown/rictus", "vm", "whaletown", "rictus");
        assert_parses("vm:whaletown/", "vm", "whaletown", "");
        assert_parses("whaletown", "", "whaletown", "");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "/",
            "//",
            "///",
            "/polecat",
            "/rig/polecat",
            ":",
            ":/",
            ":rig/polecat",
            ":whaletown/rictus",
            "vm:/rictus",
            "machine:",
            "machine:/",
        ] {
            assert!(
                parse_address(input).is_err(),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_error_kinds() {
        assert_eq!(parse_address(""), Err(AddressError::Empty));
        assert!(matches!(
            parse_address("/rig"),
            Err(AddressError::LeadingSlash(_))
        ));
        assert!(matches!(
            parse_address(":rig/x"),
            Err(AddressError::EmptyMachine(_))
        ));
        assert!(matches!(
            parse_address("vm:/x"),
            Err(AddressError::EmptyRig(_))
        ));
    }

    #[test]
    fn test_colons_after_machine_stay_in_rig() {
        assert_parses("host:8080:rig/polecat", "host", "8080:rig", "polecat");
        assert_parses("machine:rig:port/polecat", "machine", "rig:port", "polecat");
    }

    #[test]
    fn test_colon_after_slash_is_not_a_machine() {
        assert_parses("rig/pole:cat", "", "rig", "pole:cat");
    }

    #[test]
    fn test_extra_slashes_belong_to_polecat() {
        assert_parses("rig/pole/cat/extra", "", "rig", "pole/cat/extra");
        assert_parses("a/b/c/d/e", "", "a", "b/c/d/e");
    }

    #[test]
    fn test_segments_are_verbatim() {
        assert_parses("   ", "", "   ", "");
        assert_parses(" rig/polecat", "", " rig", "polecat");
        assert_parses("rig/polecat ", "", "rig", "polecat ");
        assert_parses("my rig/my polecat", "", "my rig", "my polecat");
        assert_parses("rig-1_v2.0/polecat-alpha_1.0", "", "rig-1_v2.0", "polecat-alpha_1.0");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_parses("日本語/polecat", "", "日本語", "polecat");
        assert_parses("rig/工作者", "", "rig", "工作者");
        assert_parses("🔧/🐱", "", "🔧", "🐱");
        assert_parses("マシン:rig/polecat", "マシン", "rig", "polecat");
    }

    #[test]
    fn test_display() {
        assert_eq!(addr("", "whaletown", "rictus").to_string(), "whaletown/rictus");
        assert_eq!(addr("", "whaletown", "").to_string(), "whaletown/");
        assert_eq!(addr("vm", "whaletown", "rictus").to_string(), "vm:whaletown/rictus");
        assert_eq!(addr("vm", "whaletown", "").to_string(), "vm:whaletown/");
    }

    #[test]
    fn test_rig_path_drops_machine() {
        assert_eq!(addr("", "whaletown", "rictus").rig_path(), "whaletown/rictus");
        assert_eq!(addr("", "whaletown", "").rig_path(), "whaletown/");
        assert_eq!(addr("vm", "whaletown", "rictus").rig_path(), "whaletown/rictus");
        assert_eq!(addr("", "a", "b/c/d").rig_path(), "a/b/c/d");
    }

    #[test]
    fn test_is_local() {
        assert!(addr("", "whaletown", "").is_local());
        assert!(addr("local", "whaletown", "").is_local());
        assert!(!addr("vm", "whaletown", "").is_local());
    }

    #[test]
    fn test_is_broadcast() {
        assert!(addr("", "whaletown", "").is_broadcast());
        assert!(!addr("", "whaletown", "rictus").is_broadcast());
    }

    #[test]
    fn test_equal() {
        let a = addr("", "whaletown", "rictus");
        assert!(Address::equal(Some(&a), Some(&addr("", "whaletown", "rictus"))));
        assert!(Address::equal(
            Some(&addr("", "whaletown", "")),
            Some(&addr("local", "whaletown", ""))
        ));
        assert!(!Address::equal(Some(&a), Some(&addr("", "whaletown", "nux"))));
        assert!(!Address::equal(Some(&a), Some(&addr("vm", "whaletown", "rictus"))));
    }

    #[test]
    fn test_equal_with_missing_side_is_false() {
        let a = addr("", "whaletown", "");
        assert!(!Address::equal(Some(&a), None));
        assert!(!Address::equal(None, Some(&a)));
        assert!(!Address::equal(None, None));
    }

    #[test]
    fn test_roundtrip_local_addresses() {
        for a in [
            addr("", "whaletown", "rictus"),
            addr("", "whaletown", ""),
            addr("local", "whaletown", "rictus"),
            addr("", "a", "b/c"),
            addr("", "日本語", "工作者"),
        ] {
            let parsed = parse_address(&a.to_string()).unwrap();
            assert!(Address::equal(Some(&parsed), Some(&a)), "{:?}", a);
        }
    }

    #[test]
    fn test_must_parse_valid() {
        let a = Address::must_parse("rig/polecat");
        assert_eq!(a.rig, "rig");
        assert_eq!(a.polecat, "polecat");
    }

    #[test]
    #[should_panic(expected = "must_parse")]
    fn test_must_parse_panics_on_empty() {
        Address::must_parse("");
    }

    #[test]
    fn test_serde_roundtrip() {
        let a: Address = "vm:whaletown/rictus".parse().unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"vm:whaletown/rictus\"");

        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, a);

        let bad: Result<Address, _> = serde_json::from_str("\"/nope\"");
        assert!(bad.is_err());
    }
}

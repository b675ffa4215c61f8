//! Classification of live session names
//!
//! Status displays and the orphan check walk whatever sessions tmux reports
//! and need to label each one. Unlike [`parse_session_name`], the classifier
//! also accepts the legacy `wt-witness-<rig>` ordering and never fails:
//! a name that is not an agent session simply yields `None`.
//!
//! [`parse_session_name`]: super::parse_session_name

use super::identity::{AgentIdentity, Role, DEACON_SESSION, MAYOR_SESSION, RIG_PREFIX};
use serde::{Deserialize, Serialize};

/// A labelled agent session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// The tmux session name
    pub session: String,

    /// Agent role
    pub role: Role,

    /// Rig name (empty for town-level agents)
    #[serde(default)]
    pub rig: String,

    /// Worker name (empty unless crew or polecat)
    #[serde(default)]
    pub name: String,
}

impl AgentRecord {
    /// Create a record for a session
    pub fn new(
        session: impl Into<String>,
        role: Role,
        rig: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            role,
            rig: rig.into(),
            name: name.into(),
        }
    }

    /// The identity this record describes
    pub fn identity(&self) -> Option<AgentIdentity> {
        AgentIdentity::from_parts(self.role, &self.rig, &self.name)
    }

    /// Canonical address of the agent (`rig/crew/max`, `rig/polecats/nux`, ...)
    pub fn address(&self) -> Option<String> {
        self.identity().map(|identity| identity.address())
    }
}

/// A classification rule applied to the part of a session name after `wt-`
type ClassifyRule = fn(&str) -> Option<(Role, String, String)>;

/// Classification rules, highest priority first
const CLASSIFY_RULES: &[ClassifyRule] = &[
    canonical_singleton,
    crew_member,
    legacy_singleton,
    polecat_fallback,
];

fn canonical_singleton(rest: &str) -> Option<(Role, String, String)> {
    [("-witness", Role::Witness), ("-refinery", Role::Refinery)]
        .into_iter()
        .find_map(|(suffix, role)| {
            let rig = rest.strip_suffix(suffix).filter(|r| !r.is_empty())?;
            Some((role, rig.to_string(), String::new()))
        })
}

fn crew_member(rest: &str) -> Option<(Role, String, String)> {
    let (rig, name) = rest.split_once("-crew-")?;
    if rig.is_empty() || name.is_empty() {
        return None;
    }
    Some((Role::Crew, rig.to_string(), name.to_string()))
}

fn legacy_singleton(rest: &str) -> Option<(Role, String, String)> {
    [("witness-", Role::Witness), ("refinery-", Role::Refinery)]
        .into_iter()
        .find_map(|(prefix, role)| {
            let rig = rest.strip_prefix(prefix).filter(|r| !r.is_empty())?;
            Some((role, rig.to_string(), String::new()))
        })
}

fn polecat_fallback(rest: &str) -> Option<(Role, String, String)> {
    let (rig, name) = rest.split_once('-')?;
    if rig.is_empty() || name.is_empty() {
        return None;
    }
    Some((Role::Polecat, rig.to_string(), name.to_string()))
}

/// Classify a session name
///
/// Rules, in order:
///
/// 1. `hq-mayor` / `hq-deacon`
/// 2. `wt-<rig>-witness` / `wt-<rig>-refinery`
/// 3. `wt-<rig>-crew-<name>`
/// 4. legacy `wt-witness-<rig>` / `wt-refinery-<rig>`
/// 5. `wt-<rig>-<name>` polecat, split at the first `-`
///
/// Returns `None` for anything that is not an agent session.
pub fn categorize_session(session: &str) -> Option<AgentRecord> {
    match session {
        MAYOR_SESSION => return Some(AgentRecord::new(session, Role::Mayor, "", "")),
        DEACON_SESSION => return Some(AgentRecord::new(session, Role::Deacon, "", "")),
        _ => {}
    }

    let rest = session.strip_prefix(RIG_PREFIX)?;
    if !rest.contains('-') {
        return None;
    }

    let (role, rig, name) = CLASSIFY_RULES.iter().find_map(|rule| rule(rest))?;
    Some(AgentRecord::new(session, role, rig, name))
}

/// Whether `rest` only classifies through the legacy `witness-<rig>` form
fn is_legacy_form(rest: &str) -> bool {
    canonical_singleton(rest).is_none()
        && crew_member(rest).is_none()
        && legacy_singleton(rest).is_some()
}

/// Classify a session name, preferring known rig names for polecats
///
/// Polecat sessions are ambiguous when the rig contains a hyphen
/// (`wt-my-rig-nux`). When one of `rigs` is a prefix of the session, the
/// longest such rig wins.
///
/// A rig named `witness` or `refinery` makes its polecat sessions look like
/// the legacy form (`wt-witness-nux`). The legacy reading is kept only when
/// its rig is known; otherwise a known-rig prefix turns it back into a
/// polecat.
pub fn categorize_session_with_rigs<S: AsRef<str>>(session: &str, rigs: &[S]) -> Option<AgentRecord> {
    let mut record = categorize_session(session)?;
    let rest = match record.role {
        Role::Mayor | Role::Deacon | Role::Crew => return Some(record),
        _ => &session[RIG_PREFIX.len()..],
    };

    let is_known = |rig: &str| rigs.iter().any(|known| known.as_ref() == rig);
    if record.role != Role::Polecat && (!is_legacy_form(rest) || is_known(record.rig.as_str())) {
        return Some(record);
    }

    let known = rigs
        .iter()
        .map(|rig| rig.as_ref())
        .filter_map(|rig| {
            let name = rest.strip_prefix(rig)?.strip_prefix('-')?;
            (!rig.is_empty() && !name.is_empty()).then_some((rig, name))
        })
        .max_by_key(|(rig, _)| rig.len());

    if let Some((rig, name)) = known {
        if record.role != Role::Polecat {
            tracing::debug!(session, rig, "Reading legacy-form session as polecat of known rig");
        }
        record.role = Role::Polecat;
        record.rig = rig.to_string();
        record.name = name.to_string();
    }
    Some(record)
}

/// Check if a session belongs to a crew member
pub fn is_crew_session(session: &str) -> bool {
    categorize_session(session).is_some_and(|record| record.role == Role::Crew)
}

/// Split a polecat session into `(rig, polecat)`
///
/// Returns `None` for every other kind of session, including the old
/// `wt-<town>-mayor` / `wt-<town>-deacon` names.
pub fn parse_polecat_session_name(session: &str) -> Option<(String, String)> {
    let record = categorize_session(session)?;
    if record.role != Role::Polecat || matches!(record.name.as_str(), "mayor" | "deacon") {
        return None;
    }
    Some((record.rig, record.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_rig() {
        let cases = [
            ("wt-whaletown-slit", "whaletown"),
            ("wt-whaletown-Toast", "whaletown"),
            ("wt-myrig-worker", "myrig"),
            ("wt-whaletown-crew-max", "whaletown"),
            ("wt-myrig-crew-user", "myrig"),
            ("wt-whaletown-witness", "whaletown"),
            ("wt-myrig-witness", "myrig"),
            ("wt-witness-whaletown", "whaletown"),
            ("wt-witness-myrig", "myrig"),
            ("wt-whaletown-refinery", "whaletown"),
            ("wt-myrig-refinery", "myrig"),
            ("wt-a-b", "a"),
            ("hq-mayor", ""),
            ("hq-deacon", ""),
        ];
        for (session, want) in cases {
            let rig = categorize_session(session).map(|r| r.rig).unwrap_or_default();
            assert_eq!(rig, want, "rig of {}", session);
        }
    }

    #[test]
    fn test_categorize_role() {
        let cases = [
            ("wt-whaletown-slit", Role::Polecat),
            ("wt-whaletown-Toast", Role::Polecat),
            ("wt-myrig-worker", Role::Polecat),
            ("wt-a-b", Role::Polecat),
            ("wt-whaletown-witness", Role::Witness),
            ("wt-witness-whaletown", Role::Witness),
            ("wt-whaletown-refinery", Role::Refinery),
            ("wt-refinery-whaletown", Role::Refinery),
            ("wt-whaletown-crew-max", Role::Crew),
            ("wt-myrig-crew-user", Role::Crew),
            ("hq-mayor", Role::Mayor),
            ("hq-deacon", Role::Deacon),
        ];
        for (session, want) in cases {
            let record = categorize_session(session)
                .unwrap_or_else(|| panic!("categorize_session({}) returned None", session));
            assert_eq!(record.role, want, "role of {}", session);
            assert_eq!(record.session, session);
        }
    }

    #[test]
    fn test_canonical_and_legacy_orders_agree() {
        let canonical = categorize_session("wt-whaletown-witness").unwrap();
        let legacy = categorize_session("wt-witness-whaletown").unwrap();
        assert_eq!((canonical.role, canonical.rig), (legacy.role, legacy.rig));
    }

    #[test]
    fn test_categorize_hyphenated_names() {
        let crew = categorize_session("wt-foo-bar-crew-my-worker").unwrap();
        assert_eq!((crew.rig.as_str(), crew.name.as_str()), ("foo-bar", "my-worker"));

        let witness = categorize_session("wt-foo-bar-witness").unwrap();
        assert_eq!(witness.rig, "foo-bar");

        let polecat = categorize_session("wt-niflheim-fix-auth-bug").unwrap();
        assert_eq!(polecat.role, Role::Polecat);
        assert_eq!((polecat.rig.as_str(), polecat.name.as_str()), ("niflheim", "fix-auth-bug"));
    }

    #[test]
    fn test_categorize_rejects_non_agents() {
        for session in ["", "wt", "wt-", "wt-only", "other-session", "hq-other", "wt-rig-", "wt--x"] {
            assert_eq!(categorize_session(session), None, "{:?}", session);
        }
    }

    #[test]
    fn test_categorize_with_known_rigs() {
        let rigs = ["my", "my-rig"];
        let record = categorize_session_with_rigs("wt-my-rig-nux", &rigs).unwrap();
        assert_eq!((record.rig.as_str(), record.name.as_str()), ("my-rig", "nux"));

        // No known rig matches: first-token split stays
        let record = categorize_session_with_rigs("wt-other-rig-nux", &rigs).unwrap();
        assert_eq!((record.rig.as_str(), record.name.as_str()), ("other", "rig-nux"));

        // Non-polecats are untouched
        let record = categorize_session_with_rigs("wt-my-rig-witness", &rigs).unwrap();
        assert_eq!((record.role, record.rig.as_str()), (Role::Witness, "my-rig"));
    }

    #[test]
    fn test_polecat_of_rig_named_like_a_role() {
        // Without rig names the legacy reading wins
        let record = categorize_session("wt-witness-nux").unwrap();
        assert_eq!((record.role, record.rig.as_str()), (Role::Witness, "nux"));

        let rigs = ["witness", "refinery", "beads"];
        let record = categorize_session_with_rigs("wt-witness-nux", &rigs).unwrap();
        assert_eq!(
            (record.role, record.rig.as_str(), record.name.as_str()),
            (Role::Polecat, "witness", "nux")
        );
        let record = categorize_session_with_rigs("wt-refinery-Toast", &rigs).unwrap();
        assert_eq!((record.role, record.rig.as_str()), (Role::Polecat, "refinery"));

        // A known legacy rig keeps the legacy reading
        let record = categorize_session_with_rigs("wt-witness-beads", &rigs).unwrap();
        assert_eq!((record.role, record.rig.as_str()), (Role::Witness, "beads"));

        // The canonical singleton of such a rig is unaffected
        let record = categorize_session_with_rigs("wt-witness-witness", &rigs).unwrap();
        assert_eq!((record.role, record.rig.as_str()), (Role::Witness, "witness"));
    }

    #[test]
    fn test_is_crew_session() {
        let cases = [
            ("wt-whaletown-crew-joe", true),
            ("wt-beads-crew-max", true),
            ("wt-niflheim-crew-codex1", true),
            ("wt-7thsense-crew-ss1", true),
            ("wt-a-crew-b", true),
            ("wt-whaletown-witness", false),
            ("wt-whaletown-refinery", false),
            ("wt-whaletown-polecat1", false),
            ("wt-whaletown-polecat-abc", false),
            ("hq-deacon", false),
            ("hq-mayor", false),
            ("wt-whaletown-crew", false),
            ("wt-crew-max", false),
            ("crew-whaletown-max", false),
            ("other-session", false),
            ("", false),
            ("wt", false),
            ("wt-", false),
            ("wt-whaletown", false),
        ];
        for (session, want) in cases {
            assert_eq!(is_crew_session(session), want, "{:?}", session);
        }
    }

    #[test]
    fn test_parse_polecat_session_name() {
        let valid = [
            ("wt-greenplace-Toast", "greenplace", "Toast"),
            ("wt-greenplace-Nux", "greenplace", "Nux"),
            ("wt-beads-Worker", "beads", "Worker"),
            ("wt-greenplace-Max-01", "greenplace", "Max-01"),
        ];
        for (session, rig, polecat) in valid {
            assert_eq!(
                parse_polecat_session_name(session),
                Some((rig.to_string(), polecat.to_string())),
                "{}",
                session
            );
        }

        for session in [
            "wt-greenplace-crew-jack",
            "wt-greenplace-witness",
            "wt-greenplace-refinery",
            "wt-ai-mayor",
            "wt-ai-deacon",
            "whaletown-Toast",
            "",
            "wt-",
            "wt-greenplace-",
        ] {
            assert_eq!(parse_polecat_session_name(session), None, "{:?}", session);
        }
    }

    #[test]
    fn test_record_identity_and_address() {
        let record = categorize_session("wt-whaletown-crew-max").unwrap();
        assert_eq!(
            record.identity(),
            Some(AgentIdentity::Crew {
                rig: "whaletown".into(),
                name: "max".into()
            })
        );
        assert_eq!(record.address().as_deref(), Some("whaletown/crew/max"));

        let mayor = categorize_session("hq-mayor").unwrap();
        assert_eq!(mayor.address().as_deref(), Some("mayor"));
    }
}

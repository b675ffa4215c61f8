//! Nudge target resolution
//!
//! A nudge is typed straight into a running agent's session, so patterns
//! resolve to session names rather than mail recipients.

use super::resolve::match_pattern;
use crate::session::{AgentRecord, Role, DEACON_SESSION, MAYOR_SESSION};

/// Resolve a nudge pattern to the session names it targets
///
/// - `mayor` and `deacon` (with or without a trailing `/`) name the fixed
///   town-level sessions.
/// - Any other pattern must contain `/` and is matched against each agent's
///   address (`rig/witness`, `rig/crew/max`, `rig/polecats/nux`).
/// - A literal two-segment `rig/name` also matches the polecat `name` in
///   `rig`, the legacy short form.
///
/// Returns an empty list when nothing matches.
pub fn resolve_nudge_pattern(pattern: &str, roster: &[AgentRecord]) -> Vec<String> {
    match pattern {
        "mayor" | "mayor/" => return vec![MAYOR_SESSION.to_string()],
        "deacon" | "deacon/" => return vec![DEACON_SESSION.to_string()],
        _ => {}
    }

    if !pattern.contains('/') {
        return Vec::new();
    }

    let legacy = legacy_polecat(pattern);
    let targets: Vec<String> = roster
        .iter()
        .filter(|record| {
            let matches_address = record
                .address()
                .is_some_and(|address| match_pattern(pattern, &address));
            let matches_legacy = record.role == Role::Polecat
                && legacy.is_some_and(|(rig, name)| record.rig == rig && record.name == name);
            matches_address || matches_legacy
        })
        .map(|record| record.session.clone())
        .collect();

    tracing::debug!(pattern, targets = targets.len(), "Resolved nudge pattern");
    targets
}

/// Split a literal `rig/name` pattern
fn legacy_polecat(pattern: &str) -> Option<(&str, &str)> {
    if pattern.contains('*') {
        return None;
    }
    let (rig, name) = pattern.split_once('/')?;
    if rig.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((rig, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::categorize_session;

    fn roster() -> Vec<AgentRecord> {
        [
            "hq-mayor",
            "hq-deacon",
            "wt-whaletown-witness",
            "wt-whaletown-refinery",
            "wt-whaletown-crew-max",
            "wt-whaletown-alpha",
            "wt-whaletown-beta",
            "wt-beads-witness",
            "wt-beads-gamma",
        ]
        .into_iter()
        .filter_map(categorize_session)
        .collect()
    }

    #[test]
    fn test_town_agents() {
        let roster = roster();
        assert_eq!(resolve_nudge_pattern("mayor", &roster), vec!["hq-mayor"]);
        assert_eq!(resolve_nudge_pattern("deacon", &roster), vec!["hq-deacon"]);
    }

    #[test]
    fn test_town_agents_in_mail_form() {
        use crate::mail::Resolver;

        let roster = roster();
        assert_eq!(resolve_nudge_pattern("mayor/", &roster), vec!["hq-mayor"]);
        assert_eq!(resolve_nudge_pattern("deacon/", &roster), vec!["hq-deacon"]);

        // The mail resolver accepts the same spellings
        let resolver = Resolver::new(&roster);
        assert_eq!(resolver.resolve("mayor/").unwrap()[0].address, "mayor/");
        assert_eq!(resolver.resolve("deacon/").unwrap()[0].address, "deacon/");
    }

    #[test]
    fn test_all_witnesses() {
        let roster = roster();
        assert_eq!(
            resolve_nudge_pattern("*/witness", &roster),
            vec!["wt-whaletown-witness", "wt-beads-witness"]
        );
    }

    #[test]
    fn test_polecats_in_rig() {
        let roster = roster();
        assert_eq!(
            resolve_nudge_pattern("whaletown/polecats/*", &roster),
            vec!["wt-whaletown-alpha", "wt-whaletown-beta"]
        );
    }

    #[test]
    fn test_crew_in_rig() {
        let roster = roster();
        assert_eq!(
            resolve_nudge_pattern("whaletown/crew/*", &roster),
            vec!["wt-whaletown-crew-max"]
        );
    }

    #[test]
    fn test_exact_addresses() {
        let roster = roster();
        assert_eq!(
            resolve_nudge_pattern("whaletown/polecats/alpha", &roster),
            vec!["wt-whaletown-alpha"]
        );
        assert_eq!(
            resolve_nudge_pattern("beads/witness", &roster),
            vec!["wt-beads-witness"]
        );
    }

    #[test]
    fn test_legacy_polecat_form() {
        let roster = roster();
        assert_eq!(
            resolve_nudge_pattern("whaletown/alpha", &roster),
            vec!["wt-whaletown-alpha"]
        );
        // Legacy form never targets crew
        assert!(resolve_nudge_pattern("whaletown/max", &roster).is_empty());
    }

    #[test]
    fn test_no_matches() {
        let roster = roster();
        assert!(resolve_nudge_pattern("nonexistent/polecats/*", &roster).is_empty());
        assert!(resolve_nudge_pattern("invalid", &roster).is_empty());
        assert!(resolve_nudge_pattern("*/witness", &[]).is_empty());
    }
}

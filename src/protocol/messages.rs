//! Builders for merge protocol messages

use super::types::MessageType;
use crate::mail::{Message, Priority};
use crate::session::AgentIdentity;
use chrono::{SecondsFormat, Utc};

fn witness(rig: &str) -> String {
    AgentIdentity::Witness { rig: rig.to_string() }.address()
}

fn refinery(rig: &str) -> String {
    AgentIdentity::Refinery { rig: rig.to_string() }.address()
}

fn subject(kind: MessageType, polecat: &str) -> String {
    format!("{} {}", kind, polecat)
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Witness tells the refinery a polecat's branch is ready
pub fn merge_ready(rig: &str, polecat: &str, branch: &str, issue: &str) -> Message {
    let body = format!(
        "Branch: {branch}\n\
         Issue: {issue}\n\
         Polecat: {polecat}\n\
         Rig: {rig}\n\
         Verified: clean git state, issue closed"
    );
    Message::new(witness(rig), refinery(rig), subject(MessageType::MergeReady, polecat), body)
        .with_priority(Priority::High)
}

/// Refinery tells the witness a branch was merged
pub fn merged(
    rig: &str,
    polecat: &str,
    branch: &str,
    issue: &str,
    target: &str,
    merge_commit: &str,
) -> Message {
    let body = format!(
        "Branch: {branch}\n\
         Issue: {issue}\n\
         Polecat: {polecat}\n\
         Rig: {rig}\n\
         Target: {target}\n\
         Merged-At: {}\n\
         Merge-Commit: {merge_commit}\n\
         \n\
         The polecat's work is on {target}; its worktree can be cleaned up.",
        now()
    );
    Message::new(refinery(rig), witness(rig), subject(MessageType::Merged, polecat), body)
}

/// Refinery tells the witness a merge attempt failed
pub fn merge_failed(
    rig: &str,
    polecat: &str,
    branch: &str,
    issue: &str,
    target: &str,
    failure_type: &str,
    error: &str,
) -> Message {
    let body = format!(
        "Branch: {branch}\n\
         Issue: {issue}\n\
         Polecat: {polecat}\n\
         Rig: {rig}\n\
         Target: {target}\n\
         Failed-At: {}\n\
         Failure-Type: {failure_type}\n\
         Error: {error}",
        now()
    );
    Message::new(refinery(rig), witness(rig), subject(MessageType::MergeFailed, polecat), body)
        .with_priority(Priority::High)
}

/// Refinery asks the witness to have a polecat rebase onto the target
pub fn rework_request(
    rig: &str,
    polecat: &str,
    branch: &str,
    issue: &str,
    target: &str,
    conflict_files: &[String],
) -> Message {
    let body = format!(
        "Branch: {branch}\n\
         Issue: {issue}\n\
         Polecat: {polecat}\n\
         Rig: {rig}\n\
         Target: {target}\n\
         Requested-At: {}\n\
         Conflict-Files: {}\n\
         \n\
         Rebase onto the latest target and resubmit:\n\
         \n\
         \x20 git fetch origin\n\
         \x20 git rebase origin/{target}\n\
         \x20 git push --force-with-lease",
        now(),
        conflict_files.join(", ")
    );
    Message::new(refinery(rig), witness(rig), subject(MessageType::ReworkRequest, polecat), body)
        .with_priority(Priority::High)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        parse_message_type, MergeFailedPayload, MergeReadyPayload, MergedPayload,
        ReworkRequestPayload,
    };

    #[test]
    fn test_merge_ready_message() {
        let msg = merge_ready("whaletown", "nux", "polecat/nux/wt-abc", "wt-abc");
        assert_eq!(msg.subject, "MERGE_READY nux");
        assert_eq!(msg.from, "whaletown/witness");
        assert_eq!(msg.to, "whaletown/refinery");
        assert_eq!(msg.priority, Priority::High);
        assert!(msg.body.contains("Branch: polecat/nux/wt-abc"));
        assert!(msg.body.contains("Issue: wt-abc"));

        let payload = MergeReadyPayload::from_body(&msg.body);
        assert_eq!(payload.polecat, "nux");
        assert_eq!(payload.rig, "whaletown");
    }

    #[test]
    fn test_merged_message() {
        let msg = merged("whaletown", "nux", "polecat/nux/wt-abc", "wt-abc", "main", "abc123");
        assert_eq!(msg.subject, "MERGED nux");
        assert_eq!(msg.from, "whaletown/refinery");
        assert_eq!(msg.to, "whaletown/witness");
        assert!(msg.body.contains("Merge-Commit: abc123"));

        let payload = MergedPayload::from_body(&msg.body);
        assert_eq!(payload.target_branch, "main");
        assert!(payload.merged_at.is_some());
    }

    #[test]
    fn test_merge_failed_message() {
        let msg = merge_failed(
            "whaletown",
            "nux",
            "polecat/nux/wt-abc",
            "wt-abc",
            "main",
            "tests",
            "Test failed",
        );
        assert_eq!(msg.subject, "MERGE_FAILED nux");
        assert!(msg.body.contains("Failure-Type: tests"));
        assert!(msg.body.contains("Error: Test failed"));

        let payload = MergeFailedPayload::from_body(&msg.body);
        assert_eq!(payload.error, "Test failed");
        assert!(payload.failed_at.is_some());
    }

    #[test]
    fn test_rework_request_message() {
        let conflicts = vec!["file1.rs".to_string(), "file2.rs".to_string()];
        let msg = rework_request("whaletown", "nux", "polecat/nux/wt-abc", "wt-abc", "main", &conflicts);
        assert_eq!(msg.subject, "REWORK_REQUEST nux");
        assert!(msg.body.contains("Conflict-Files: file1.rs, file2.rs"));
        assert!(msg.body.contains("git rebase origin/main"));

        let payload = ReworkRequestPayload::from_body(&msg.body);
        assert_eq!(payload.conflict_files, conflicts);
    }

    #[test]
    fn test_builders_produce_protocol_subjects() {
        let msgs = [
            merge_ready("r", "p", "b", "i"),
            merged("r", "p", "b", "i", "main", "c"),
            merge_failed("r", "p", "b", "i", "main", "build", "e"),
            rework_request("r", "p", "b", "i", "main", &[]),
        ];
        for (msg, kind) in msgs.iter().zip(MessageType::ALL) {
            assert_eq!(parse_message_type(&msg.subject), Some(kind));
        }
    }
}

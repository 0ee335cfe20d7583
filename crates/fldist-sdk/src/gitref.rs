//! Best-effort commit reference resolution.
//!
//! Asks git for the most recent reflog entry and pulls the short commit
//! hash out of it. Resolution never fails the pipeline: a missing git
//! binary, a project without history, or unrecognizable output all yield
//! `None` and the artifact name simply carries no commit ref.

use std::path::Path;
use std::process::Command;

/// Resolves a short commit hash from the project's reflog, if possible.
pub fn resolve_commit_ref(project_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["reflog", "-1"])
        .current_dir(project_root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    extract_short_ref(&stdout)
}

/// First whitespace-separated token that looks like a short hash:
/// 6 to 8 ASCII alphanumerics.
fn extract_short_ref(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| {
            (6..=8).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_leading_short_hash() {
        let line = "ab12cd3 HEAD@{0}: commit: add packaging step\n";
        assert_eq!(extract_short_ref(line).as_deref(), Some("ab12cd3"));
    }

    #[test]
    fn skips_tokens_outside_the_length_window() {
        let line = "abcd HEAD@{0}: pull: fast-forward to fe90aa12\n";
        assert_eq!(extract_short_ref(line).as_deref(), Some("fe90aa12"));
    }

    #[test]
    fn rejects_tokens_with_punctuation() {
        assert_eq!(extract_short_ref("HEAD@{0}: pull"), None);
    }

    #[test]
    fn empty_output_yields_none() {
        assert_eq!(extract_short_ref(""), None);
    }

    #[test]
    fn missing_repository_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        // No .git here; git exits non-zero and resolution stays soft.
        assert_eq!(resolve_commit_ref(dir.path()), None);
    }
}

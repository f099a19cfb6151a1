//! Short status parsing and the uncommitted-change detector

use crate::{Error, Result};

/// Parsed `git status -s -b` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortStatus {
    /// Branch token of the `##` header, without the `...upstream` suffix
    pub branch: String,
    /// Upstream named in the header, if any
    pub upstream: Option<String>,
    /// Bracketed annotation such as `ahead 3, behind 1`
    pub annotation: Option<String>,
    /// Non-empty status lines after the header
    pub entries: Vec<String>,
}

impl ShortStatus {
    /// Parse short status output that starts with a `## ` header line
    ///
    /// ```text
    /// ## main...origin/main [ahead 3]
    ///  M docs/a/70525_publish.md
    /// ```
    pub fn parse(output: &str) -> Result<Self> {
        let mut lines = output.lines();
        let header = lines
            .next()
            .and_then(|line| line.strip_prefix("## "))
            .ok_or_else(|| {
                Error::ContentValidation(format!(
                    "status output has no branch header: {:?}",
                    output
                ))
            })?;

        let (token, rest) = header
            .split_once(char::is_whitespace)
            .unwrap_or((header, ""));

        let (branch, upstream) = match token.split_once("...") {
            Some((branch, upstream)) => (branch, Some(upstream.to_string())),
            None => (token, None),
        };

        let rest = rest.trim();
        let annotation = rest
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .map(str::to_string);

        let entries = lines
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            branch: branch.to_string(),
            upstream,
            annotation,
            entries,
        })
    }

    /// Whether local commits are not pushed
    pub fn is_ahead(&self) -> bool {
        self.annotation
            .as_deref()
            .is_some_and(|a| a.contains("ahead"))
    }

    /// Whether the working tree or index has changes
    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Outcome of the uncommitted-change check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCheck {
    /// Nothing pending
    Clear,
    /// The status belongs to another branch, so the check does not apply
    OtherBranch(String),
    /// Pending work was found but the operator chose to ignore it
    Ignored,
    /// Unpushed commits or uncommitted changes
    Pending {
        ahead: bool,
        changes: usize,
    },
}

impl ChangeCheck {
    /// Whether the workflow must stop
    pub fn is_pending(&self) -> bool {
        matches!(self, ChangeCheck::Pending { .. })
    }
}

/// Decide whether `status` blocks work on `target`
pub fn check_changes(status: &ShortStatus, target: &str, ignore: bool) -> ChangeCheck {
    if status.branch != target {
        return ChangeCheck::OtherBranch(status.branch.clone());
    }

    let ahead = status.is_ahead();
    let changes = status.entries.len();

    if !ahead && changes == 0 {
        ChangeCheck::Clear
    } else if ignore {
        ChangeCheck::Ignored
    } else {
        ChangeCheck::Pending { ahead, changes }
    }
}

/// Parse short status output and decide in one step
pub fn has_pending_changes(output: &str, target: &str, ignore: bool) -> Result<bool> {
    Ok(check_changes(&ShortStatus::parse(output)?, target, ignore).is_pending())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_with_upstream() {
        let status = ShortStatus::parse("## main...origin/main [ahead 3]\n").unwrap();
        assert_eq!(status.branch, "main");
        assert_eq!(status.upstream.as_deref(), Some("origin/main"));
        assert_eq!(status.annotation.as_deref(), Some("ahead 3"));
        assert!(status.is_ahead());
        assert!(!status.has_changes());
    }

    #[test]
    fn test_parse_entries() {
        let status =
            ShortStatus::parse("## 70525_publish\n M docs/a/x.md\n?? new.md\n\n").unwrap();
        assert_eq!(status.branch, "70525_publish");
        assert_eq!(status.upstream, None);
        assert_eq!(status.entries, vec![" M docs/a/x.md", "?? new.md"]);
    }

    #[test]
    fn test_parse_requires_header() {
        assert!(ShortStatus::parse(" M file\n").is_err());
        assert!(ShortStatus::parse("").is_err());
    }

    #[test]
    fn test_ahead_on_target_is_pending() {
        assert!(has_pending_changes("## main...origin/main [ahead 3]", "main", false).unwrap());
    }

    #[test]
    fn test_other_branch_short_circuits() {
        let status = ShortStatus::parse("## main...origin/main [ahead 3]").unwrap();
        assert_eq!(
            check_changes(&status, "feature-x", false),
            ChangeCheck::OtherBranch("main".to_string())
        );
        assert!(!has_pending_changes("## main...origin/main [ahead 3]", "feature-x", false).unwrap());
    }

    #[test]
    fn test_clean_header_is_clear() {
        assert!(!has_pending_changes("## main", "main", false).unwrap());
        assert!(!has_pending_changes("## main\n", "main", false).unwrap());
    }

    #[test]
    fn test_behind_only_is_clear() {
        assert!(!has_pending_changes("## main...origin/main [behind 2]", "main", false).unwrap());
    }

    #[test]
    fn test_changes_are_pending_unless_ignored() {
        let output = "## key...origin/key\n M a.md\n";
        let status = ShortStatus::parse(output).unwrap();
        assert_eq!(
            check_changes(&status, "key", false),
            ChangeCheck::Pending {
                ahead: false,
                changes: 1
            }
        );
        assert_eq!(check_changes(&status, "key", true), ChangeCheck::Ignored);
    }
}

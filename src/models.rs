use std::fmt;

use chrono::{DateTime, Utc};

/// One tagged image as returned by the registry, reduced to what tag
/// ranking needs.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Tag names in the order the registry listed them.
    pub tags: Vec<String>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// The account/region pair the refresh traffic targets. Hostname and
/// image-reference construction is deterministic; nothing is looked up.
#[derive(Debug, Clone)]
pub struct RegistryHost {
    account_id: String,
    region: String,
}

impl RegistryHost {
    pub fn new(account_id: &str, region: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            region: region.to_string(),
        }
    }

    /// Registry hostname, e.g. `123456789012.dkr.ecr.us-east-1.amazonaws.com`.
    pub fn hostname(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account_id, self.region)
    }

    /// Full image reference for a repository/tag pair.
    pub fn image_ref(&self, repo: &str, tag: &str) -> String {
        format!("{}/{}:{}", self.hostname(), repo, tag)
    }
}

/// Outcome of one pull, delete, push cycle for a single tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed,
    DryRun,
    PullFailed,
    DeleteFailed,
    PushFailed,
}

impl RefreshOutcome {
    /// Dry-run counts as success: the tag was handled as requested.
    pub fn is_success(self) -> bool {
        matches!(self, RefreshOutcome::Completed | RefreshOutcome::DryRun)
    }

    pub fn reason(self) -> &'static str {
        match self {
            RefreshOutcome::Completed => "ok",
            RefreshOutcome::DryRun => "dry-run",
            RefreshOutcome::PullFailed => "pull-failed",
            RefreshOutcome::DeleteFailed => "delete-failed",
            RefreshOutcome::PushFailed => "push-failed",
        }
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Counters accumulated across the whole run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTotals {
    /// Repositories that had at least one tag to refresh.
    pub repositories: usize,
    pub tags_attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunTotals {
    pub fn record(&mut self, outcome: RefreshOutcome) {
        self.tags_attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

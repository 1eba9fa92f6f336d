use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One repository as the page shows it
///
/// Built once from the search response and never edited afterwards; a new
/// search replaces the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub kind: RepoKind,
    pub star_count: u32,
    /// Kept in the offset GitHub sent it with
    pub last_updated: DateTime<FixedOffset>,
    pub language: Option<String>,
}

impl RepositoryRecord {
    /// Date part of the timestamp as written, `YYYY-MM-DD`; no timezone shift
    pub fn updated_day(&self) -> String {
        self.last_updated.format("%Y-%m-%d").to_string()
    }
}

/// Whether the repository was authored by the account or forked from elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    Source,
    Fork,
}

impl RepoKind {
    pub fn from_fork_flag(fork: bool) -> Self {
        if fork {
            RepoKind::Fork
        } else {
            RepoKind::Source
        }
    }
}

impl std::fmt::Display for RepoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoKind::Source => write!(f, "source"),
            RepoKind::Fork => write!(f, "fork"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub avatar_url: String,
    pub login: String,
}

/// A non-empty search result: the owner plus every record GitHub returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRepositories {
    pub owner: OwnerSummary,
    pub records: Vec<RepositoryRecord>,
}

// GitHub API client for account repository searches
pub mod github;

// Re-export common types
pub use github::{GitHubClient, GitHubError, GitHubOwner, GitHubRepo, RepoSearchResponse};

// GitHub provider implementation - bridges API client with SearchProvider trait
use std::time::Duration;

use async_trait::async_trait;
use repofinder_api::{GitHubClient, GitHubError, GitHubRepo, RepoSearchResponse};
use tracing::{debug, info, warn};

use crate::{
    config::GitHubConfig,
    models::{AccountRepositories, OwnerSummary, RepoKind, RepositoryRecord},
    search::SearchProvider,
    Result,
};

/// Wrapper around GitHubClient that implements SearchProvider
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let client = GitHubClient::with_base_url(
            config.token.clone(),
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchProvider for GitHubProvider {
    async fn search_account(&self, account: &str) -> Result<Option<AccountRepositories>> {
        match self.client.search_user_repositories(account).await {
            Ok(response) => {
                let found = normalize(response);
                match &found {
                    Some(repos) => info!("Found {} repositories for {}", repos.records.len(), account),
                    None => info!("No repositories for {}", account),
                }
                Ok(found)
            }
            Err(GitHubError::UnknownAccount(_)) => {
                debug!("GitHub rejected user:{} as unknown", account);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Turn a search response into records, or `None` when nothing matched
pub fn normalize(response: RepoSearchResponse) -> Option<AccountRepositories> {
    if response.incomplete_results {
        warn!(
            "GitHub timed out part of the search; showing {} of {} repositories",
            response.items.len(),
            response.total_count
        );
    }
    if response.total_count == 0 {
        return None;
    }
    let first = response.items.first()?;
    let owner = OwnerSummary {
        avatar_url: first.owner.avatar_url.clone(),
        login: first.owner.login.clone(),
    };
    let records = response.items.into_iter().map(github_to_record).collect();

    Some(AccountRepositories { owner, records })
}

/// Convert a GitHub API repo to our internal record
fn github_to_record(gh: GitHubRepo) -> RepositoryRecord {
    RepositoryRecord {
        name: gh.name,
        url: gh.html_url,
        description: gh.description,
        kind: RepoKind::from_fork_flag(gh.fork),
        star_count: gh.stargazers_count,
        last_updated: gh.updated_at,
        language: gh.language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> RepoSearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_zero_matches() {
        let r = response(r#"{"total_count":0,"incomplete_results":false,"items":[]}"#);
        assert!(normalize(r).is_none());
    }

    #[test]
    fn test_normalize_count_without_items() {
        // total_count can disagree with an empty batch; nothing to show either way
        let r = response(r#"{"total_count":4,"items":[]}"#);
        assert!(normalize(r).is_none());
    }

    #[test]
    fn test_normalize_keeps_api_order_and_owner() {
        let r = response(
            r#"{"total_count":2,"items":[
                {"name":"b","html_url":"https://github.com/o/b","description":"second","fork":true,
                 "stargazers_count":7,"updated_at":"2024-02-03T04:05:06Z","language":"Go",
                 "owner":{"login":"o","avatar_url":"https://avatars.example/o"}},
                {"name":"a","html_url":"https://github.com/o/a","description":null,"fork":false,
                 "stargazers_count":1,"updated_at":"2021-01-01T00:00:00Z","language":null,
                 "owner":{"login":"o","avatar_url":"https://avatars.example/o"}}
            ]}"#,
        );

        let found = normalize(r).unwrap();
        assert_eq!(found.owner.login, "o");
        assert_eq!(found.owner.avatar_url, "https://avatars.example/o");

        let names: Vec<_> = found.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(found.records[0].kind, RepoKind::Fork);
        assert_eq!(found.records[0].updated_day(), "2024-02-03");
        assert_eq!(found.records[1].kind, RepoKind::Source);
        assert!(found.records[1].description.is_none());
    }

    #[test]
    fn test_normalize_incomplete_batch_still_shown() {
        let r = response(
            r#"{"total_count":40,"incomplete_results":true,"items":[
                {"name":"only","html_url":"https://github.com/o/only","description":null,"fork":false,
                 "stargazers_count":2,"updated_at":"2022-08-09T10:11:12Z","language":"Rust",
                 "owner":{"login":"o","avatar_url":"https://avatars.example/o"}}
            ]}"#,
        );

        let found = normalize(r).unwrap();
        assert_eq!(found.records.len(), 1);
        assert_eq!(found.records[0].name, "only");
    }

    #[test]
    fn test_normalize_keeps_day_as_written() {
        let r = response(
            r#"{"total_count":1,"items":[
                {"name":"late","html_url":"https://github.com/o/late","description":null,"fork":false,
                 "stargazers_count":0,"updated_at":"2024-03-01T22:30:00-05:00","language":null,
                 "owner":{"login":"o","avatar_url":"https://avatars.example/o"}}
            ]}"#,
        );

        let found = normalize(r).unwrap();
        assert_eq!(found.records[0].updated_day(), "2024-03-01");
    }
}

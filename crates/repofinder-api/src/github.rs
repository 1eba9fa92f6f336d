use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    /// GitHub refuses `user:` qualifiers it can't resolve with a 422
    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn reset_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(" (resets at {})", at.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    /// `base_url` is `GITHUB_API_BASE`, a GitHub Enterprise host, or a local server in tests
    pub fn with_base_url(token: Option<String>, base_url: String, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!("repofinder/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search every repository owned by `account`, forks included.
    ///
    /// Returns whatever single batch GitHub hands back; no follow-up pages are requested.
    pub async fn search_user_repositories(&self, account: &str) -> Result<RepoSearchResponse> {
        let url = format!("{}/search/repositories", self.base_url);
        let query = account_query(account);
        debug!("GET {} q={}", url, query);

        let mut request = self.client.get(&url).query(&[("q", query.as_str())]);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(GitHubError::UnknownAccount(account.to_string()));
        }

        if is_rate_limited(&response) {
            return Err(GitHubError::RateLimitExceeded {
                reset_at: rate_limit_reset(response.headers()),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed: RepoSearchResponse = serde_json::from_str(&body)?;
        debug!(
            "GitHub reported {} matches, {} in this batch",
            parsed.total_count,
            parsed.items.len()
        );
        Ok(parsed)
    }
}

/// Search qualifier scoping results to one owner, forks included
pub fn account_query(account: &str) -> String {
    format!("user:{} fork:true", account)
}

fn is_rate_limited(response: &reqwest::Response) -> bool {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    // Primary limit exhaustion comes back as a plain 403
    status == reqwest::StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

fn rate_limit_reset(headers: &reqwest::header::HeaderMap) -> Option<DateTime<Utc>> {
    let epoch = headers
        .get("x-ratelimit-reset")?
        .to_str()
        .ok()?
        .parse::<i64>()
        .ok()?;
    Utc.timestamp_opt(epoch, 0).single()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubRepo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u32,
    pub updated_at: DateTime<FixedOffset>,
    pub language: Option<String>,
    pub owner: GitHubOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    pub avatar_url: String,
}

use crate::{models::AccountRepositories, Result};

/// Trait for the account lookup - keeps the controller testable without a network
///
/// `Ok(None)` means the account has no repositories (or doesn't exist);
/// `Err` is reserved for transport, decode and HTTP failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_account(&self, account: &str) -> Result<Option<AccountRepositories>>;
}

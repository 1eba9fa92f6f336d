// Everything between the GitHub client and whatever draws the page
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod models;
pub mod providers;
pub mod search;
pub mod store;
pub mod view;

pub use config::Config;
pub use controller::{UiEvent, ViewController};
pub use error::Error;
pub use filter::{FilterSortState, SortDirection, SortKey, TypeFilter};
pub use models::{AccountRepositories, OwnerSummary, RepoKind, RepositoryRecord};
pub use search::SearchProvider;
pub use store::ResultStore;
pub use view::{Card, PageView, Region, Surface};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;

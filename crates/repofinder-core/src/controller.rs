// Page controller: owns the filter/sort state and reacts to UI events
use std::sync::Arc;

use repofinder_cache::KeyValueStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    filter::{self, FilterSortState, SortKey, TypeFilter},
    models::{AccountRepositories, OwnerSummary, RepositoryRecord},
    search::SearchProvider,
    store::ResultStore,
    view::{PageView, Region, Surface, FAILED_MESSAGE, NOT_FOUND_MESSAGE},
    Error, Result,
};

/// Everything the page can ask the controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SubmitSearch(String),
    SubmitFilter { min_stars: u32, type_filter: TypeFilter },
    ClickSort(SortKey),
    ClickLoadMore,
}

type SearchOutcome = Result<Option<AccountRepositories>>;

/// Drives the page through `NoQuery -> Loading -> NotFound | Failed | Loaded`
///
/// The displayed list is always recomputed in full from the base set; lists
/// are a few dozen records, so there is nothing to patch incrementally.
pub struct ViewController<S> {
    provider: Arc<dyn SearchProvider>,
    store: ResultStore<S>,
    state: FilterSortState,
    page_size: usize,
    region: Region,
    owner: Option<OwnerSummary>,
    displayed: Vec<RepositoryRecord>,
}

impl<S: KeyValueStore> ViewController<S> {
    pub fn new(provider: Arc<dyn SearchProvider>, store: ResultStore<S>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            provider,
            store,
            state: FilterSortState::new(page_size),
            page_size,
            region: Region::NoQuery,
            owner: None,
            displayed: Vec::new(),
        }
    }

    pub fn page(&self) -> PageView {
        match &self.region {
            Region::Loaded => PageView::loaded(self.owner.clone(), &self.displayed, &self.state),
            Region::NoQuery => PageView::empty(Region::NoQuery, None, &self.state),
            Region::Loading { account } => PageView::empty(
                self.region.clone(),
                Some(format!("Searching repositories of {}...", account)),
                &self.state,
            ),
            Region::NotFound => {
                PageView::empty(Region::NotFound, Some(NOT_FOUND_MESSAGE.to_string()), &self.state)
            }
            Region::Failed { .. } => {
                PageView::empty(self.region.clone(), Some(FAILED_MESSAGE.to_string()), &self.state)
            }
        }
    }

    pub fn state(&self) -> &FilterSortState {
        &self.state
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn owner(&self) -> Option<&OwnerSummary> {
        self.owner.as_ref()
    }

    pub fn displayed(&self) -> &[RepositoryRecord] {
        &self.displayed
    }

    /// Show the persisted base set without searching. There is no owner to show.
    pub fn restore_persisted(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }
        info!("Restoring {} persisted records", self.store.base_set().len());
        self.owner = None;
        self.state.reset_for_new_results(self.page_size);
        self.region = Region::Loaded;
        self.recompute();
        true
    }

    /// Handle one event to completion, searches included
    pub async fn dispatch<V: Surface + ?Sized>(&mut self, event: UiEvent, surface: &mut V) {
        match event {
            UiEvent::SubmitSearch(input) => {
                if let Some(account) = self.begin_search(&input, surface) {
                    surface.render(&self.page());
                    let outcome = self.provider.search_account(&account).await;
                    self.finish_search(outcome);
                }
            }
            other => self.apply(other),
        }
        surface.render(&self.page());
    }

    /// Subscribe to UI events until the sender side is dropped
    ///
    /// Searches run on their own task. A new search aborts the one in
    /// flight, so the most recent submit always decides the page.
    pub async fn run<V: Surface>(mut self, mut events: mpsc::UnboundedReceiver<UiEvent>, mut surface: V) -> Self {
        surface.render(&self.page());
        let mut in_flight: Option<JoinHandle<SearchOutcome>> = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        UiEvent::SubmitSearch(input) => {
                            if let Some(account) = self.begin_search(&input, &mut surface) {
                                if let Some(previous) = in_flight.take() {
                                    debug!("Abandoning in-flight search");
                                    previous.abort();
                                }
                                in_flight = Some(self.spawn_search(account));
                            }
                        }
                        other => self.apply(other),
                    }
                }
                joined = async {
                    match in_flight.as_mut() {
                        Some(handle) => handle.await,
                        None => std::future::pending().await,
                    }
                }, if in_flight.is_some() => {
                    in_flight = None;
                    let outcome = joined.unwrap_or_else(|e| Err(Error::ApiError(format!("search task failed: {}", e))));
                    self.finish_search(outcome);
                }
            }
            surface.render(&self.page());
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
        debug!("Event channel closed, controller stopped");
        self
    }

    fn spawn_search(&self, account: String) -> JoinHandle<SearchOutcome> {
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move { provider.search_account(&account).await })
    }

    /// Enter `Loading` for a non-blank query and return the account to look up
    fn begin_search<V: Surface + ?Sized>(&mut self, input: &str, surface: &mut V) -> Option<String> {
        let account = input.trim();
        if account.is_empty() {
            debug!("Ignoring blank search");
            return None;
        }

        surface.reset_search_form();
        info!("Searching repositories for {}", account);
        self.region = Region::Loading {
            account: account.to_string(),
        };
        Some(account.to_string())
    }

    fn finish_search(&mut self, outcome: SearchOutcome) {
        match outcome {
            Ok(Some(found)) => {
                self.store.replace(found.records);
                self.owner = Some(found.owner);
                self.state.reset_for_new_results(self.page_size);
                self.region = Region::Loaded;
                self.recompute();
            }
            Ok(None) => {
                info!("No repositories found");
                self.owner = None;
                self.displayed.clear();
                self.region = Region::NotFound;
            }
            Err(e) => {
                // The persisted base set is left alone
                warn!("Search failed: {}", e);
                self.owner = None;
                self.displayed.clear();
                self.region = Region::Failed {
                    reason: e.to_string(),
                };
            }
        }
    }

    fn apply(&mut self, event: UiEvent) {
        if self.region != Region::Loaded {
            debug!("Ignoring {:?} outside of a loaded page", event);
            return;
        }
        match event {
            UiEvent::SubmitFilter {
                min_stars,
                type_filter,
            } => self.submit_filter(min_stars, type_filter),
            UiEvent::ClickSort(key) => self.click_sort(key),
            UiEvent::ClickLoadMore => self.load_more(),
            UiEvent::SubmitSearch(_) => {}
        }
    }

    fn submit_filter(&mut self, min_stars: u32, type_filter: TypeFilter) {
        debug!("Filter: min_stars={} type={}", min_stars, type_filter);
        self.state.apply_filter(min_stars, type_filter, self.page_size);
        self.recompute();
    }

    fn click_sort(&mut self, key: SortKey) {
        if key == SortKey::None {
            return;
        }
        self.state.toggle_sort(key);
        debug!("Sort: {:?} {:?}", self.state.active_sort, self.state.direction);
        self.recompute();
    }

    fn load_more(&mut self) {
        self.state.visible_count = self.state.visible_count.saturating_add(self.page_size);
    }

    fn recompute(&mut self) {
        self.displayed = filter::derive(self.store.base_set(), &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;
    use crate::models::RepoKind;
    use crate::search::MockSearchProvider;
    use crate::store::BASE_SET_KEY;
    use chrono::{TimeZone, Utc};
    use repofinder_cache::MemoryStore;

    #[derive(Default)]
    struct RecordingSurface {
        resets: usize,
        pages: Vec<PageView>,
    }

    impl Surface for RecordingSurface {
        fn reset_search_form(&mut self) {
            self.resets += 1;
        }

        fn render(&mut self, page: &PageView) {
            self.pages.push(page.clone());
        }
    }

    fn record(name: &str, stars: u32, kind: RepoKind) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            url: format!("https://github.com/octocat/{}", name),
            description: None,
            kind,
            star_count: stars,
            last_updated: Utc.with_ymd_and_hms(2023, 3, 14, 15, 9, 26).unwrap().fixed_offset(),
            language: Some("Rust".into()),
        }
    }

    fn found(login: &str, records: Vec<RepositoryRecord>) -> AccountRepositories {
        AccountRepositories {
            owner: OwnerSummary {
                avatar_url: format!("https://avatars.example/{}", login),
                login: login.to_string(),
            },
            records,
        }
    }

    fn five_records() -> Vec<RepositoryRecord> {
        vec![
            record("one", 10, RepoKind::Source),
            record("two", 50, RepoKind::Fork),
            record("three", 5, RepoKind::Source),
            record("four", 30, RepoKind::Source),
            record("five", 20, RepoKind::Fork),
        ]
    }

    fn controller_with(mock: MockSearchProvider, kv: MemoryStore) -> ViewController<MemoryStore> {
        ViewController::new(Arc::new(mock), ResultStore::open(kv), 3)
    }

    fn loaded_controller() -> ViewController<MemoryStore> {
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account()
            .returning(|_| Ok(Some(found("octocat", five_records()))));
        controller_with(mock, MemoryStore::new())
    }

    #[tokio::test]
    async fn test_blank_search_is_ignored() {
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account().never();
        let mut controller = controller_with(mock, MemoryStore::new());
        let mut surface = RecordingSurface::default();

        controller
            .dispatch(UiEvent::SubmitSearch("   ".into()), &mut surface)
            .await;

        assert_eq!(controller.region(), &Region::NoQuery);
        assert_eq!(surface.resets, 0);
    }

    #[tokio::test]
    async fn test_successful_search_loads_first_page() {
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account()
            .withf(|account| account.eq_ignore_ascii_case("octocat"))
            .times(1)
            .returning(|_| Ok(Some(found("octocat", five_records()))));
        let kv = MemoryStore::new();
        let mut controller = controller_with(mock, kv.clone());
        let mut surface = RecordingSurface::default();

        controller
            .dispatch(UiEvent::SubmitSearch(" octocat ".into()), &mut surface)
            .await;

        assert_eq!(surface.resets, 1);
        // Loading frame first, then the loaded page
        assert!(matches!(surface.pages[0].region, Region::Loading { ref account } if account == "octocat"));

        let page = surface.pages.last().unwrap();
        assert_eq!(page.region, Region::Loaded);
        assert_eq!(page.owner.as_ref().unwrap().login, "octocat");
        assert!(page.filters_visible);
        assert_eq!(page.cards.len(), 3);
        assert!(page.show_load_more);
        assert_eq!(page.total, 5);
        assert!(kv.get(BASE_SET_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_not_found_hides_filters_and_keeps_persisted() {
        let kv = MemoryStore::new();
        ResultStore::open(kv.clone()).replace(five_records());

        let mut mock = MockSearchProvider::new();
        mock.expect_search_account().returning(|_| Ok(None));
        let mut controller = controller_with(mock, kv.clone());
        let mut surface = RecordingSurface::default();

        controller
            .dispatch(UiEvent::SubmitSearch("ghost".into()), &mut surface)
            .await;

        let page = controller.page();
        assert_eq!(page.region, Region::NotFound);
        assert!(page.owner.is_none());
        assert!(!page.filters_visible);
        assert!(page.message.unwrap().contains("couldn't find an account"));
        assert_eq!(ResultStore::open(kv).base_set().len(), 5);
    }

    #[tokio::test]
    async fn test_failure_shows_distinct_message() {
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account()
            .returning(|_| Err(Error::ApiError("connection reset".into())));
        let mut controller = controller_with(mock, MemoryStore::new());
        let mut surface = RecordingSurface::default();

        controller
            .dispatch(UiEvent::SubmitSearch("octocat".into()), &mut surface)
            .await;

        let page = controller.page();
        assert!(matches!(page.region, Region::Failed { ref reason } if reason.contains("connection reset")));
        assert_eq!(page.message.as_deref(), Some(FAILED_MESSAGE));
        assert!(!page.filters_visible);
    }

    #[tokio::test]
    async fn test_events_before_results_are_ignored() {
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account().never();
        let mut controller = controller_with(mock, MemoryStore::new());
        let mut surface = RecordingSurface::default();

        controller.dispatch(UiEvent::ClickLoadMore, &mut surface).await;
        controller.dispatch(UiEvent::ClickSort(SortKey::Name), &mut surface).await;

        assert_eq!(controller.state(), &FilterSortState::new(3));
        assert_eq!(controller.region(), &Region::NoQuery);
    }

    #[tokio::test]
    async fn test_load_more_grows_by_page_size() {
        let mut controller = loaded_controller();
        let mut surface = RecordingSurface::default();
        controller
            .dispatch(UiEvent::SubmitSearch("octocat".into()), &mut surface)
            .await;

        for n in 1..=3 {
            controller.dispatch(UiEvent::ClickLoadMore, &mut surface).await;
            assert_eq!(controller.state().visible_count, 3 + n * 3);
        }
        let page = controller.page();
        assert_eq!(page.cards.len(), 5);
        assert!(!page.show_load_more);
    }

    #[tokio::test]
    async fn test_sort_keeps_pagination_filter_resets_it() {
        let mut controller = loaded_controller();
        let mut surface = RecordingSurface::default();
        controller
            .dispatch(UiEvent::SubmitSearch("octocat".into()), &mut surface)
            .await;
        controller.dispatch(UiEvent::ClickLoadMore, &mut surface).await;

        controller
            .dispatch(UiEvent::ClickSort(SortKey::Stars), &mut surface)
            .await;
        assert_eq!(controller.state().visible_count, 6);
        let stars: Vec<_> = controller.displayed().iter().map(|r| r.star_count).collect();
        assert_eq!(stars, vec![5, 10, 20, 30, 50]);

        controller
            .dispatch(
                UiEvent::SubmitFilter {
                    min_stars: 10,
                    type_filter: TypeFilter::All,
                },
                &mut surface,
            )
            .await;
        assert_eq!(controller.state().visible_count, 3);
        assert_eq!(controller.state().active_sort, SortKey::None);
        // Filtering restarts from the base set, in API order
        let names: Vec<_> = controller.displayed().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "four", "five"]);
    }

    #[tokio::test]
    async fn test_new_search_resets_filters() {
        let mut controller = loaded_controller();
        let mut surface = RecordingSurface::default();
        controller
            .dispatch(UiEvent::SubmitSearch("octocat".into()), &mut surface)
            .await;
        controller
            .dispatch(
                UiEvent::SubmitFilter {
                    min_stars: 40,
                    type_filter: TypeFilter::Fork,
                },
                &mut surface,
            )
            .await;
        controller
            .dispatch(UiEvent::ClickSort(SortKey::Name), &mut surface)
            .await;
        assert_eq!(controller.displayed().len(), 1);

        controller
            .dispatch(UiEvent::SubmitSearch("octocat".into()), &mut surface)
            .await;
        let state = controller.state();
        assert_eq!((state.min_stars, state.type_filter, state.active_sort), (0, TypeFilter::All, SortKey::None));
        assert_eq!(state.direction, SortDirection::Ascending);
        assert_eq!(controller.displayed().len(), 5);
    }

    #[tokio::test]
    async fn test_restore_persisted() {
        let kv = MemoryStore::new();
        let mut mock = MockSearchProvider::new();
        mock.expect_search_account().never();

        let mut empty = controller_with(MockSearchProvider::new(), kv.clone());
        assert!(!empty.restore_persisted());

        ResultStore::open(kv.clone()).replace(five_records());
        let mut controller = controller_with(mock, kv);
        assert!(controller.restore_persisted());

        let page = controller.page();
        assert_eq!(page.region, Region::Loaded);
        assert!(page.owner.is_none());
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_run_processes_events_until_sender_dropped() {
        let controller = loaded_controller();
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(UiEvent::SubmitSearch("octocat".into())).unwrap();
        let handle = tokio::spawn(controller.run(rx, RecordingSurface::default()));

        // Give the search task a chance to finish before the next events
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(UiEvent::ClickLoadMore).unwrap();
        tx.send(UiEvent::ClickSort(SortKey::Name)).unwrap();
        drop(tx);

        let controller = handle.await.unwrap();
        assert_eq!(controller.region(), &Region::Loaded);
        assert_eq!(controller.state().visible_count, 6);
        assert_eq!(controller.displayed()[0].name, "five");
    }
}

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::history::HistoryStack;
use super::{links, subpage, Direction};
use crate::error::{PageError, PageErrorKind};
use crate::gesture::SwipeDirection;
use crate::page::{FetchOutcome, PageCache, PageId, PageKey, PageResponse};
use crate::settings::SettingsService;

/// Navigation state published to views.
#[derive(Debug, Clone)]
pub struct NavState {
    pub page: PageId,
    pub sub_page: u16,
    /// Last successful response; stays on screen through fetch failures
    pub response: Option<Arc<PageResponse>>,
    /// Last fetch failure, cleared by the next success
    pub error: Option<PageError>,
    /// A page change is loading (full-screen placeholder)
    pub is_loading_page: bool,
    /// Any fetch for the visible key is in flight
    pub is_loading_content: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            page: PageId::HOME,
            sub_page: 1,
            response: None,
            error: None,
            is_loading_page: false,
            is_loading_content: false,
        }
    }
}

/// The page/subpage state machine behind the whole UI.
///
/// Owns the history stack and the cache, publishes `NavState` over a
/// watch channel. All operations are infallible at the signature level;
/// fetch failures surface through the state's `error` field and leave the
/// previously displayed content intact.
///
/// Out-of-order completions cannot roll the view back: the cache's token
/// discipline turns them into `Superseded`, which mutates nothing here.
pub struct NavigationController {
    cache: PageCache,
    settings: Arc<SettingsService>,
    history: Mutex<HistoryStack>,
    tx: watch::Sender<NavState>,
}

impl NavigationController {
    pub fn new(cache: PageCache, settings: Arc<SettingsService>) -> Self {
        let (tx, _rx) = watch::channel(NavState::default());
        Self {
            cache,
            settings,
            history: Mutex::new(HistoryStack::new()),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NavState> {
        self.tx.subscribe()
    }

    pub fn settings(&self) -> &Arc<SettingsService> {
        &self.settings
    }

    pub fn state(&self) -> NavState {
        self.tx.borrow().clone()
    }

    /// Link bar targets for the current state: favorites when any exist,
    /// otherwise links scanned from the visible page. Generated links go
    /// empty while a page change is loading; favorites stay.
    pub fn link_targets(&self) -> Vec<PageId> {
        let state = self.tx.borrow();
        let favorites = self.settings.current().favorites;
        links::link_targets(
            state.page,
            state.response.as_deref(),
            &favorites,
            state.is_loading_page,
        )
    }

    /// Fetch a page and, on success, make it the displayed one.
    ///
    /// `is_page_change` marks a navigation to a different page identity:
    /// only those are recorded in history, subpage moves and refreshes are
    /// not.
    pub async fn fetch_page(
        &self,
        page: PageId,
        sub_page: u16,
        force_refresh: bool,
        is_page_change: bool,
    ) {
        let key = PageKey::new(page, sub_page);

        self.tx.send_modify(|state| {
            state.is_loading_content = true;
            if is_page_change {
                state.is_loading_page = true;
            }
        });

        match self.cache.fetch(key, force_refresh).await {
            FetchOutcome::Loaded(response) => {
                let max = response.sub_page_count.max(1);
                self.tx.send_modify(|state| {
                    state.page = page;
                    state.sub_page = sub_page.clamp(1, max);
                    state.response = Some(response);
                    state.error = None;
                    state.is_loading_page = false;
                    state.is_loading_content = false;
                });

                if is_page_change {
                    self.history.lock().unwrap().record(page);
                }
            }
            FetchOutcome::Failed(error) => {
                tracing::debug!("Fetch of {} failed: {}", key, error);
                // Previous content stays; the error renders as an overlay
                self.tx.send_modify(|state| {
                    state.error = Some(error);
                    state.is_loading_page = false;
                    state.is_loading_content = false;
                });
            }
            // A newer request owns the loading flags and the next state
            FetchOutcome::Superseded => {}
        }
    }

    /// Validating entry point for user-typed page numbers. Malformed
    /// input is silently dropped.
    pub async fn open_page(&self, input: &str) {
        match PageId::parse(input) {
            Some(page) => self.open_page_id(page).await,
            None => tracing::debug!("Ignoring malformed page number {:?}", input),
        }
    }

    /// Navigate to a page at its first subpage (link tap, favorites)
    pub async fn open_page_id(&self, page: PageId) {
        self.fetch_page(page, 1, false, true).await;
    }

    /// Follow the prev/next pointer of the last successful response.
    /// No-op when the pointer is absent or nothing has loaded yet.
    pub async fn change_page(&self, direction: Direction) {
        let target = {
            let state = self.tx.borrow();
            state.response.as_ref().and_then(|response| match direction {
                Direction::Next => response.next_page,
                Direction::Back => response.prev_page,
            })
        };

        if let Some(target) = target {
            self.fetch_page(target, 1, false, true).await;
        }
    }

    /// Cycle the subpage, or jump to an explicit target.
    ///
    /// Updates the subpage state, then runs the fetch handler for the new
    /// key; a subpage already in the cache resolves without the network.
    pub async fn change_sub_page(&self, direction: Direction, explicit_target: Option<u16>) {
        let (page, target) = {
            let state = self.tx.borrow();
            let Some(max) = state.response.as_ref().map(|r| r.sub_page_count) else {
                return;
            };

            let target = match explicit_target {
                Some(target) => target,
                None => subpage::next_sub_page(state.sub_page, max, direction),
            };
            if target == 0 || target > max.max(1) {
                return;
            }

            (state.page, target)
        };

        self.tx.send_modify(|state| state.sub_page = target);
        self.fetch_page(page, target, false, false).await;
    }

    /// Force-refetch the currently visible page/subpage
    pub async fn refresh(&self) {
        let (page, sub_page) = {
            let state = self.tx.borrow();
            (state.page, state.sub_page)
        };
        self.fetch_page(page, sub_page, true, false).await;
    }

    /// Back-navigation: revisit the previous distinct page.
    ///
    /// Returns whether the event was consumed; `false` means the caller
    /// should fall through to the platform default (e.g. quit).
    pub async fn go_home(&self) -> bool {
        let target = self.history.lock().unwrap().pop_to_previous();

        match target {
            Some(target) => {
                self.fetch_page(target, 1, false, true).await;
                true
            }
            None => false,
        }
    }

    /// Application came back to the foreground: never show stale content,
    /// but do not touch history either
    pub async fn on_app_foreground(&self) {
        self.cache.invalidate_all();

        let (page, sub_page) = {
            let state = self.tx.borrow();
            (state.page, state.sub_page)
        };
        self.fetch_page(page, sub_page, true, false).await;
    }

    /// Map a classified swipe to a navigation command.
    ///
    /// Blocked entirely while a non-recoverable (non-404) fetch error is
    /// showing; explicit actions (refresh, link tap, back) stay available.
    pub async fn on_swipe(&self, direction: SwipeDirection) {
        let blocked = {
            let state = self.tx.borrow();
            state
                .error
                .as_ref()
                .is_some_and(|error| error.kind != PageErrorKind::NotFound)
        };
        if blocked {
            tracing::debug!("Swipe ignored while a fetch error is showing");
            return;
        }

        match direction {
            SwipeDirection::Left => self.change_page(Direction::Next).await,
            SwipeDirection::Right => self.change_page(Direction::Back).await,
            SwipeDirection::Up => self.change_sub_page(Direction::Next, None).await,
            SwipeDirection::Down => self.change_sub_page(Direction::Back, None).await,
        }
    }

    /// Add or remove the page from favorites (optimistic, persisted
    /// best-effort by the settings service)
    pub fn toggle_favorite(&self, page: PageId) {
        self.settings.toggle_favorite(page);
    }

    #[cfg(test)]
    fn history_pages(&self) -> Vec<PageId> {
        self.history.lock().unwrap().pages().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageErrorKind;
    use crate::settings::MemorySettingsStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Source serving generated pages instantly: three subpages each,
    /// prev/next wired to the numeric neighbors, selected pages failing
    /// with a scripted error.
    struct ScriptedSource {
        calls: AtomicU64,
        failures: HashMap<u16, PageErrorKind>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                calls: AtomicU64::new(0),
                failures: HashMap::new(),
            }
        }

        fn failing(pages: &[(u16, PageErrorKind)]) -> Self {
            Self {
                calls: AtomicU64::new(0),
                failures: pages.iter().copied().collect(),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl crate::page::PageSource for ScriptedSource {
        async fn fetch(
            &self,
            page: PageId,
            sub_page: u16,
        ) -> std::result::Result<PageResponse, PageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(kind) = self.failures.get(&page.number()) {
                return Err(PageError::new(*kind, page));
            }

            let n = page.number();
            Ok(PageResponse {
                page,
                sub_page_count: 3,
                prev_page: PageId::new(n - 1),
                next_page: PageId::new(n + 1),
                lines: vec![
                    format!("PAGE {} SUB {}", page, sub_page),
                    "Uutiset 101  Saa 400".to_string(),
                ],
            })
        }
    }

    fn page(n: u16) -> PageId {
        PageId::new(n).unwrap()
    }

    fn controller(source: ScriptedSource) -> (NavigationController, Arc<ScriptedSource>) {
        let source = Arc::new(source);
        let cache = PageCache::new(source.clone());
        let settings = Arc::new(SettingsService::load(Box::new(MemorySettingsStore::new())));
        (NavigationController::new(cache, settings), source)
    }

    #[tokio::test]
    async fn test_open_page_updates_state_and_history() {
        let (controller, _) = controller(ScriptedSource::new());

        controller.open_page("205").await;

        let state = controller.state();
        assert_eq!(state.page, page(205));
        assert_eq!(state.sub_page, 1);
        assert!(state.response.is_some());
        assert!(state.error.is_none());
        assert!(!state.is_loading_content);
        assert_eq!(controller.history_pages(), vec![page(205)]);
    }

    #[tokio::test]
    async fn test_malformed_page_number_is_ignored() {
        let (controller, source) = controller(ScriptedSource::new());

        for input in ["99", "1000", "20a", ""] {
            controller.open_page(input).await;
        }

        assert_eq!(source.calls(), 0);
        assert_eq!(controller.state().page, PageId::HOME);
        assert!(controller.history_pages().is_empty());
    }

    #[tokio::test]
    async fn test_change_page_follows_neighbors() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("200").await;

        controller.change_page(Direction::Next).await;
        assert_eq!(controller.state().page, page(201));

        controller.change_page(Direction::Back).await;
        assert_eq!(controller.state().page, page(200));

        // A -> B -> A collapses to [B, A]
        assert_eq!(controller.history_pages(), vec![page(201), page(200)]);
    }

    #[tokio::test]
    async fn test_change_page_without_response_is_noop() {
        let (controller, source) = controller(ScriptedSource::new());

        controller.change_page(Direction::Next).await;
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_sub_page_cycles_without_touching_history() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("300").await;

        controller.change_sub_page(Direction::Next, None).await;
        assert_eq!(controller.state().sub_page, 2);

        controller.change_sub_page(Direction::Back, None).await;
        controller.change_sub_page(Direction::Back, None).await;
        // 1 back from subpage 1 wraps to the last subpage
        assert_eq!(controller.state().sub_page, 3);

        assert_eq!(controller.history_pages(), vec![page(300)]);
    }

    #[tokio::test]
    async fn test_sub_page_explicit_target() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("300").await;

        controller.change_sub_page(Direction::Next, Some(3)).await;
        assert_eq!(controller.state().sub_page, 3);

        // Out-of-range explicit targets are dropped
        controller.change_sub_page(Direction::Next, Some(9)).await;
        assert_eq!(controller.state().sub_page, 3);
        controller.change_sub_page(Direction::Next, Some(0)).await;
        assert_eq!(controller.state().sub_page, 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_content() {
        let (controller, _) =
            controller(ScriptedSource::failing(&[(500, PageErrorKind::Network)]));
        controller.open_page("200").await;

        controller.open_page("500").await;

        let state = controller.state();
        assert_eq!(state.error.as_ref().unwrap().kind, PageErrorKind::Network);
        // The old page is still on screen under the error overlay
        assert_eq!(state.response.as_ref().unwrap().page, page(200));
        // The failed navigation never reached history
        assert_eq!(controller.history_pages(), vec![page(200)]);
    }

    #[tokio::test]
    async fn test_swipe_blocked_by_network_error() {
        let (controller, source) =
            controller(ScriptedSource::failing(&[(500, PageErrorKind::Network)]));
        controller.open_page("200").await;
        controller.open_page("500").await;

        let calls = source.calls();
        controller.on_swipe(SwipeDirection::Left).await;
        assert_eq!(source.calls(), calls, "swipe must not trigger a fetch");
        assert_eq!(controller.state().page, page(200));
    }

    #[tokio::test]
    async fn test_swipe_allowed_after_not_found() {
        let (controller, _) =
            controller(ScriptedSource::failing(&[(500, PageErrorKind::NotFound)]));
        controller.open_page("200").await;
        controller.open_page("500").await;

        controller.on_swipe(SwipeDirection::Left).await;
        assert_eq!(controller.state().page, page(201));
        assert!(controller.state().error.is_none());
    }

    #[tokio::test]
    async fn test_swipe_directions_map_to_navigation() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("200").await;

        controller.on_swipe(SwipeDirection::Up).await;
        assert_eq!(controller.state().sub_page, 2);

        controller.on_swipe(SwipeDirection::Down).await;
        assert_eq!(controller.state().sub_page, 1);

        controller.on_swipe(SwipeDirection::Left).await;
        assert_eq!(controller.state().page, page(201));

        controller.on_swipe(SwipeDirection::Right).await;
        assert_eq!(controller.state().page, page(200));
    }

    #[tokio::test]
    async fn test_go_home_walks_history_then_falls_through() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("200").await;
        controller.open_page("300").await;

        assert!(controller.go_home().await);
        assert_eq!(controller.state().page, page(200));

        // Single non-home entry: back lands on the home page
        assert!(controller.go_home().await);
        assert_eq!(controller.state().page, PageId::HOME);

        // Already home with nothing left: not consumed
        assert!(!controller.go_home().await);
    }

    #[tokio::test]
    async fn test_foreground_resume_refetches_without_history() {
        let (controller, source) = controller(ScriptedSource::new());
        controller.open_page("200").await;
        let calls = source.calls();
        let history = controller.history_pages();

        controller.on_app_foreground().await;

        assert_eq!(source.calls(), calls + 1, "resume must bypass the cache");
        assert_eq!(controller.state().page, page(200));
        assert_eq!(controller.history_pages(), history);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let (controller, source) = controller(ScriptedSource::new());
        controller.open_page("200").await;
        let calls = source.calls();

        controller.refresh().await;
        assert_eq!(source.calls(), calls + 1);
    }

    /// Source whose fetches block on a semaphore until released
    struct GatedSource {
        gate: Semaphore,
    }

    #[async_trait]
    impl crate::page::PageSource for GatedSource {
        async fn fetch(
            &self,
            page: PageId,
            sub_page: u16,
        ) -> std::result::Result<PageResponse, PageError> {
            self.gate.acquire().await.unwrap().forget();
            Ok(PageResponse {
                page,
                sub_page_count: 1,
                prev_page: None,
                next_page: None,
                lines: vec![
                    format!("PAGE {} SUB {}", page, sub_page),
                    "Uutiset 101  Saa 400".to_string(),
                ],
            })
        }
    }

    #[tokio::test]
    async fn test_generated_links_empty_while_page_loads() {
        let source = Arc::new(GatedSource {
            gate: Semaphore::new(1),
        });
        let cache = PageCache::new(source.clone());
        let settings = Arc::new(SettingsService::load(Box::new(MemorySettingsStore::new())));
        let controller = Arc::new(NavigationController::new(cache, settings));

        controller.open_page("200").await;
        assert_eq!(controller.link_targets(), vec![page(101), page(400)]);

        // Start a page change that never completes until released
        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.open_page("300").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(controller.state().is_loading_page);

        // The old page stays on screen but its links are withdrawn
        assert!(controller.state().response.is_some());
        assert!(controller.link_targets().is_empty());

        // Favorites are not subject to the loading gate
        controller.toggle_favorite(page(150));
        assert_eq!(controller.link_targets(), vec![page(150)]);
        controller.toggle_favorite(page(150));

        source.gate.add_permits(1);
        pending.await.unwrap();
        assert_eq!(controller.link_targets(), vec![page(101), page(400)]);
    }

    #[tokio::test]
    async fn test_link_targets_favorites_override() {
        let (controller, _) = controller(ScriptedSource::new());
        controller.open_page("200").await;

        // Generated links come from the page content
        assert_eq!(controller.link_targets(), vec![page(101), page(400)]);

        controller.toggle_favorite(page(150));
        controller.toggle_favorite(page(120));
        assert_eq!(controller.link_targets(), vec![page(120), page(150)]);
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::watch;

use tekstitv_core::navigation::Direction;
use tekstitv_core::{
    AppConfig, GestureClassifier, NavState, NavigationController, PageErrorKind, PageId,
    SettingKey, Settings,
};

use crate::input::Action;

/// Terminal application state: a thin view over the controller's
/// published navigation state plus the input-side bits the engine does
/// not care about (digit entry buffer, gesture tracking, toasts).
pub struct App {
    pub controller: Arc<NavigationController>,
    nav: watch::Receiver<NavState>,
    settings: watch::Receiver<Settings>,
    gestures: GestureClassifier,
    /// Accumulating page number entry; opens the page at 3 digits
    pub entry: String,
    /// Transient notice line (e.g. "page 999 not found")
    pub notice: Option<String>,
    notice_since: Option<Instant>,
    notice_ttl: Duration,
    last_error: Option<tekstitv_core::PageError>,
    quit_requested: Arc<AtomicBool>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        controller: Arc<NavigationController>,
        settings: watch::Receiver<Settings>,
        config: &AppConfig,
    ) -> Self {
        let nav = controller.subscribe();
        Self {
            gestures: GestureClassifier::new(config.gesture.clone()),
            controller,
            nav,
            settings,
            entry: String::new(),
            notice: None,
            notice_since: None,
            notice_ttl: Duration::from_secs(config.ui.notice_secs),
            last_error: None,
            quit_requested: Arc::new(AtomicBool::new(false)),
            should_quit: false,
        }
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.borrow().clone()
    }

    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    pub fn link_targets(&self) -> Vec<PageId> {
        self.controller.link_targets()
    }

    pub fn entry_active(&self) -> bool {
        !self.entry.is_empty()
    }

    /// Kick off the initial home page load
    pub fn load_initial_page(&self) {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.open_page_id(PageId::HOME).await });
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPage => self.spawn_page_change(Direction::Next),
            Action::PrevPage => self.spawn_page_change(Direction::Back),
            Action::NextSubPage => self.spawn_sub_page_change(Direction::Next),
            Action::PrevSubPage => self.spawn_sub_page_change(Direction::Back),
            Action::Refresh => {
                let controller = self.controller.clone();
                tokio::spawn(async move { controller.refresh().await });
            }
            Action::Back => {
                // Unconsumed back falls through to quitting, checked on
                // the next tick
                let controller = self.controller.clone();
                let quit = self.quit_requested.clone();
                tokio::spawn(async move {
                    if !controller.go_home().await {
                        quit.store(true, Ordering::Relaxed);
                    }
                });
            }
            Action::ToggleFavorite => {
                let page = self.nav.borrow().page;
                self.controller.toggle_favorite(page);
            }
            Action::ToggleHighlight => self.toggle_bool_setting(SettingKey::HighlightLinks),
            Action::ToggleLinks => self.toggle_bool_setting(SettingKey::ShowLinks),
            Action::Digit(c) => self.push_digit(c),
            Action::Backspace => {
                self.entry.pop();
            }
            Action::None => {}
        }
    }

    fn toggle_bool_setting(&self, key: SettingKey) {
        use tekstitv_core::SettingValue;

        let current = match self.settings.borrow().get(key) {
            SettingValue::Bool(v) => v,
            _ => return,
        };
        // Type-checked toggle can only fail on a key mismatch, which this
        // method never produces
        if let Err(e) = self
            .controller
            .settings()
            .update(key, SettingValue::Bool(!current))
        {
            tracing::warn!("Failed to toggle setting: {}", e);
        }
    }

    fn push_digit(&mut self, c: char) {
        self.entry.push(c);
        if self.entry.len() == 3 {
            let number = std::mem::take(&mut self.entry);
            let controller = self.controller.clone();
            tokio::spawn(async move { controller.open_page(&number).await });
        }
    }

    fn spawn_page_change(&self, direction: Direction) {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.change_page(direction).await });
    }

    fn spawn_sub_page_change(&self, direction: Direction) {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.change_sub_page(direction, None).await });
    }

    /// Feed mouse press/drag/release into the gesture classifier and
    /// dispatch any resolved swipe
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.gestures
                    .touch_start(mouse.column as f32, mouse.row as f32, Instant::now());
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.gestures.touch_move(mouse.column as f32, mouse.row as f32);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(direction) = self.gestures.touch_end(Instant::now()) {
                    let controller = self.controller.clone();
                    tokio::spawn(async move { controller.on_swipe(direction).await });
                }
            }
            _ => {}
        }
    }

    /// Resume handling: invalidate everything and refetch the visible page
    pub fn on_focus_gained(&self) {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.on_app_foreground().await });
    }

    /// Periodic housekeeping: expire the notice, raise a toast for a new
    /// not-found error, honor a deferred quit
    pub fn tick(&mut self) {
        if let Some(since) = self.notice_since {
            if since.elapsed() > self.notice_ttl {
                self.notice = None;
                self.notice_since = None;
            }
        }

        let error = self.nav.borrow().error.clone();
        if error != self.last_error {
            if let Some(ref e) = error {
                if e.kind == PageErrorKind::NotFound {
                    self.notice = Some(e.to_string());
                    self.notice_since = Some(Instant::now());
                }
            }
            self.last_error = error;
        }

        if self.quit_requested.load(Ordering::Relaxed) {
            self.should_quit = true;
        }
    }
}

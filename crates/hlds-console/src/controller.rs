//! The console itself: owns every component and talks to the host.
//!
//! The host integration layer constructs one [`ConsoleController`] and calls
//! into it from its own callbacks: [`tick`](ConsoleController::tick) once per
//! server frame, [`server_activated`](ConsoleController::server_activated)
//! after a map load, and the input methods whenever the display reports
//! operator input. Host capabilities are passed into each call instead of
//! being stored.

use crate::feed::{LogFeed, LogOrigin, LogSink};
use crate::history::CommandHistory;
use crate::host::{dispatch, ConsoleHost, HostCommands, ServerState};
use crate::maps::load_map_list;
use crate::scroll::ViewportEvent;
use crate::selector::{ModalSelector, PointerEvent, Rect, SelectorEvent};
use crate::status::ServerStatus;
use hlds_console_capture::OutputCaptureRedirector;
use hlds_console_config::ConsoleConfig;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Embedded administration console
#[derive(Debug)]
pub struct ConsoleController {
    config: ConsoleConfig,
    capture: OutputCaptureRedirector,
    feed: LogFeed,
    history: CommandHistory,
    map_selector: ModalSelector,
    status: ServerStatus,
    initialized: bool,
    /// Capture is tried at most once per controller
    capture_attempted: bool,
    visible: bool,
    last_refresh: Option<Instant>,
}

impl ConsoleController {
    /// Create a console that will capture the process's own stdout/stderr
    /// (if enabled in `config`) once initialized.
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_capture(config, OutputCaptureRedirector::new())
    }

    /// Create a console around an existing redirector.
    ///
    /// A redirector that is already active is used as is; initialization
    /// will not try to start it again.
    pub fn with_capture(config: ConsoleConfig, capture: OutputCaptureRedirector) -> Self {
        Self {
            feed: LogFeed::new(config.log_capacity),
            history: CommandHistory::new(config.history_capacity),
            map_selector: ModalSelector::new(config.popup_text_size, config.popup_max_height),
            status: ServerStatus::default(),
            capture,
            config,
            initialized: false,
            capture_attempted: false,
            visible: false,
            last_refresh: None,
        }
    }

    /// Start output capture. Safe to call more than once.
    ///
    /// Capture is attempted only on the first call. Failure is not fatal: the
    /// console keeps working without the mirrored output and says so in the
    /// feed. Initializing again after [`shutdown`](Self::shutdown) leaves the
    /// streams alone.
    pub fn initialize<S: ServerState + ?Sized>(&mut self, state: &S) {
        if self.initialized {
            return;
        }

        if self.config.capture_output && !self.capture_attempted {
            self.capture_attempted = true;
            if !self.capture.is_active() {
                if let Err(e) = self.capture.start() {
                    log::warn!("Output capture unavailable: {}", e);
                    self.feed
                        .system_notice("Output capture unavailable", state.server_time());
                }
            }
        }

        self.initialized = true;
        log::info!(
            "Console initialized (capture {})",
            if self.capture.is_active() { "on" } else { "off" }
        );
    }

    /// Hide the console and restore the original output streams.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }

        self.hide();
        self.capture.stop();
        self.initialized = false;
        log::info!("Console shut down");
    }

    /// Attach a log display and bring the status up to date.
    ///
    /// `now` starts the refresh interval that [`tick`](Self::tick) measures.
    /// Ignored before [`initialize`](Self::initialize) or while already shown.
    pub fn show<S: ServerState + ?Sized>(
        &mut self,
        sink: &Rc<RefCell<dyn LogSink>>,
        state: &S,
        now: Instant,
    ) {
        if !self.initialized || self.visible {
            return;
        }

        self.feed.attach_sink(sink);
        self.load_maps(state);
        self.refresh(state);
        self.last_refresh = Some(now);
        self.visible = true;
        log::debug!("Console shown");
    }

    /// Detach the log display. An open map popup is cancelled.
    pub fn hide(&mut self) -> Vec<SelectorEvent> {
        if !self.visible {
            return Vec::new();
        }

        let events = self.map_selector.cancel();
        self.feed.detach_sink();
        self.visible = false;
        self.last_refresh = None;
        log::debug!("Console hidden");
        events
    }

    /// The operator closed the console window: hide and stop the server.
    pub fn close<H: HostCommands + ?Sized>(&mut self, host: &mut H) -> Vec<SelectorEvent> {
        let events = self.hide();
        log::info!("Console window closed, shutting down server");
        dispatch(host, "quit");
        events
    }

    /// Per-frame work: drain captured output and, while shown, refresh the
    /// status once per refresh interval.
    pub fn tick<S: ServerState + ?Sized>(&mut self, now: Instant, state: &S) {
        if !self.initialized {
            return;
        }

        self.poll_capture();

        if !self.visible {
            return;
        }

        let interval = Duration::from_millis(self.config.refresh_interval_ms);
        let due = self
            .last_refresh
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.refresh(state);
            self.last_refresh = Some(now);
        }
    }

    /// Re-read server status and the player roster.
    pub fn refresh<S: ServerState + ?Sized>(&mut self, state: &S) {
        self.status.refresh(state);
    }

    /// Run an operator command: remember it, echo it and send it to the host.
    ///
    /// Empty input does nothing.
    pub fn submit_command<H: HostCommands + ?Sized>(&mut self, text: &str, host: &mut H) -> bool {
        if text.is_empty() {
            return false;
        }

        self.history.submit(text);
        self.feed.command_echo(text);
        dispatch(host, text);
        true
    }

    /// Older history entry for the input field, or `None` to keep its text.
    pub fn history_up(&mut self, current_input: &str) -> Option<String> {
        self.history.navigate_up(current_input).map(str::to_string)
    }

    /// Newer history entry (or the saved draft), or `None` to keep the text.
    pub fn history_down(&mut self) -> Option<String> {
        self.history.navigate_down().map(str::to_string)
    }

    /// Open the map popup over the map control.
    pub fn open_map_selector(&mut self, anchor: Rect, screen: Rect) -> Vec<SelectorEvent> {
        if !self.visible {
            return Vec::new();
        }
        self.map_selector.activate(anchor, screen)
    }

    /// Route a pointer event to the open map popup.
    pub fn handle_map_pointer(&mut self, event: PointerEvent) -> Vec<SelectorEvent> {
        let events = self.map_selector.handle_pointer(event);
        for event in &events {
            if let SelectorEvent::SelectionChanged { .. } = event {
                log::debug!(
                    "Map selection changed to {}",
                    self.map_selector.selected_item().unwrap_or_default()
                );
            }
        }
        events
    }

    /// Change to the selected map. Returns `false` when no map is selected.
    pub fn change_map<H: ConsoleHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(map) = self.map_selector.selected_item().map(str::to_string) else {
            return false;
        };

        dispatch(host, &format!("changelevel {}", map));
        self.notice(&format!("Changing map to: {}", map), &*host);
        true
    }

    /// Restart the current map.
    pub fn restart_map<H: ConsoleHost + ?Sized>(&mut self, host: &mut H) {
        dispatch(host, "restart");
        self.notice("Map restarted", &*host);
    }

    /// Kick the player in `slot`.
    pub fn kick_player<H: ConsoleHost + ?Sized>(&mut self, slot: u32, host: &mut H) -> bool {
        let Some(player) = host.player(slot) else {
            self.notice("Player not found", &*host);
            return false;
        };

        dispatch(host, &format!("kick #{}", player.user_id));
        self.notice(&format!("Kicked: {}", display_name(&player.name)), &*host);
        self.refresh(&*host);
        true
    }

    /// Permanently ban the player in `slot`, kick them and persist the ban list.
    pub fn ban_player<H: ConsoleHost + ?Sized>(&mut self, slot: u32, host: &mut H) -> bool {
        let Some(player) = host.player(slot) else {
            self.notice("Player not found", &*host);
            return false;
        };

        dispatch(host, &format!("banid 0 #{} kick", player.user_id));
        dispatch(host, "writeid");
        self.notice(&format!("Banned: {}", display_name(&player.name)), &*host);
        self.refresh(&*host);
        true
    }

    /// A map finished loading: point the map selector at it.
    pub fn server_activated<S: ServerState + ?Sized>(&mut self, state: &S) {
        self.select_current_map(state);
    }

    /// Select the loaded map in the map list, ignoring case.
    ///
    /// Returns whether a matching entry was found.
    pub fn select_current_map<S: ServerState + ?Sized>(&mut self, state: &S) -> bool {
        let Some(current) = state.map_name().filter(|m| !m.is_empty()) else {
            return false;
        };

        let position = self
            .map_selector
            .items()
            .iter()
            .position(|map| map.eq_ignore_ascii_case(&current));
        match position {
            Some(index) => self.map_selector.select(index),
            None => false,
        }
    }

    /// Re-scan the map directory. Selection resets to the first entry.
    pub fn load_maps<S: ServerState + ?Sized>(&mut self, state: &S) -> Vec<SelectorEvent> {
        let dir = state.game_dir().join(&self.config.maps_subdir);
        let current = state.map_name();
        let maps = load_map_list(&dir, &self.config.map_extension, current.as_deref());
        self.map_selector.set_items(maps)
    }

    /// Add a timestamped console notice to the feed.
    pub fn notice<S: ServerState + ?Sized>(&mut self, text: &str, state: &S) {
        self.feed.system_notice(text, state.server_time());
    }

    /// Operator auto-scroll toggle
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.feed.set_pinned(enabled);
    }

    /// Pointer gesture on the log display. Returns the auto-scroll state.
    pub fn observe_viewport(&mut self, event: ViewportEvent, inside: bool) -> bool {
        self.feed.observe_viewport(event, inside)
    }

    pub fn auto_scroll(&self) -> bool {
        self.feed.is_pinned()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_active()
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn map_selector(&self) -> &ModalSelector {
        &self.map_selector
    }

    pub fn status(&self) -> &ServerStatus {
        &self.status
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn poll_capture(&mut self) {
        for line in self.capture.poll() {
            self.feed.append(&line.text, LogOrigin::Captured);
        }
    }
}

impl Drop for ConsoleController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "Unknown"
    } else {
        name
    }
}

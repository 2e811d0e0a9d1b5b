//! Bounded log feed
//!
//! Captured process output, echoed operator commands and console notices all
//! end up in one ordered ring. While the console window exists, every new
//! entry is mirrored to a display sink, which is scrolled to the tail as long
//! as the [`ScrollPinTracker`] says it is following it.

use crate::scroll::{ScrollPinTracker, ScrollPosition, ViewportEvent};
use crate::status::format_clock;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use strum::Display;

/// Where a log entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogOrigin {
    /// Echo of an operator command
    Command,
    /// A line captured from stdout/stderr
    Captured,
    /// A notice generated by the console itself
    System,
}

/// One line of the feed. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    text: String,
    origin: LogOrigin,
}

impl LogEntry {
    /// The logical line, without a trailing newline
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> LogOrigin {
        self.origin
    }

    /// The line as written to a text display, newline-terminated
    pub fn display_text(&self) -> String {
        format!("{}\n", self.text)
    }
}

/// The live log display.
///
/// Implemented by the rendering layer; the feed only holds a weak reference,
/// so dropping the window detaches it implicitly.
pub trait LogSink {
    /// Append one entry to the displayed text
    fn write_entry(&mut self, entry: &LogEntry);

    /// Scroll so the last line is visible
    fn scroll_to_tail(&mut self);

    /// Current vertical scroll state
    fn scroll_position(&self) -> ScrollPosition;
}

/// Ordered, capacity-bounded log history
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    sink: Option<Weak<RefCell<dyn LogSink>>>,
    pin: ScrollPinTracker,
}

impl LogFeed {
    /// Create an empty feed holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            sink: None,
            pin: ScrollPinTracker::new(),
        }
    }

    /// Append a line, evicting the oldest entry when full.
    ///
    /// Empty text is ignored. Returns whether an entry was added.
    pub fn append(&mut self, text: &str, origin: LogOrigin) -> bool {
        if text.is_empty() {
            return false;
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            text: text.to_string(),
            origin,
        });

        if let Some(sink) = self.live_sink() {
            if let Some(entry) = self.entries.back() {
                sink.borrow_mut().write_entry(entry);
            }
            if self.pin.is_pinned() {
                sink.borrow_mut().scroll_to_tail();
                let position = sink.borrow().scroll_position();
                self.pin.content_appended(position);
            }
        }

        true
    }

    /// Append a console notice stamped with the elapsed server time, e.g.
    /// `[3:07] Map restarted`.
    pub fn system_notice(&mut self, text: &str, server_time: f32) -> bool {
        if text.is_empty() {
            return false;
        }
        let stamped = format!("[{}] {}", format_clock(server_time), text);
        self.append(&stamped, LogOrigin::System)
    }

    /// Append the echo of an operator command, e.g. `> status`.
    pub fn command_echo(&mut self, command: &str) -> bool {
        if command.is_empty() {
            return false;
        }
        self.append(&format!("> {}", command), LogOrigin::Command)
    }

    /// Start mirroring new entries to `sink`.
    ///
    /// Entries appended while no sink was attached are not replayed.
    pub fn attach_sink(&mut self, sink: &Rc<RefCell<dyn LogSink>>) {
        self.sink = Some(Rc::downgrade(sink));
    }

    /// Stop mirroring. Already appended entries are kept.
    pub fn detach_sink(&mut self) {
        self.sink = None;
    }

    /// Whether a display is attached and still alive
    pub fn has_sink(&self) -> bool {
        self.live_sink().is_some()
    }

    /// Feed a pointer gesture on the display to the pin tracker.
    ///
    /// Without a live display there is no position to compare, so nothing
    /// changes. Returns whether the feed is pinned afterwards.
    pub fn observe_viewport(&mut self, event: ViewportEvent, inside: bool) -> bool {
        if let Some(sink) = self.live_sink() {
            let position = sink.borrow().scroll_position();
            self.pin.observe(event, inside, position);
        }
        self.pin.is_pinned()
    }

    /// Whether new entries scroll the display to the tail
    pub fn is_pinned(&self) -> bool {
        self.pin.is_pinned()
    }

    /// Operator override of auto-scroll
    pub fn set_pinned(&mut self, pinned: bool) {
        self.pin.set_pinned(pinned);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry. The attached display is not touched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn live_sink(&self) -> Option<Rc<RefCell<dyn LogSink>>> {
        self.sink.as_ref().and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for LogFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogFeed")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("has_sink", &self.has_sink())
            .field("pinned", &self.pin.is_pinned())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Text display stand-in with a fixed number of visible rows.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub lines: Vec<String>,
        pub visible_rows: usize,
        pub offset: usize,
        pub scroll_calls: usize,
    }

    impl RecordingSink {
        pub fn with_rows(visible_rows: usize) -> Self {
            Self {
                visible_rows,
                ..Self::default()
            }
        }

        fn max_offset(&self) -> usize {
            self.lines.len().saturating_sub(self.visible_rows)
        }
    }

    impl LogSink for RecordingSink {
        fn write_entry(&mut self, entry: &LogEntry) {
            self.lines.push(entry.text().to_string());
        }

        fn scroll_to_tail(&mut self) {
            self.scroll_calls += 1;
            self.offset = self.max_offset();
        }

        fn scroll_position(&self) -> ScrollPosition {
            ScrollPosition::new(self.offset, self.max_offset())
        }
    }

    fn texts(feed: &LogFeed) -> Vec<&str> {
        feed.entries().map(LogEntry::text).collect()
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut feed = LogFeed::new(3);
        for i in 0..10 {
            feed.append(&format!("line {i}"), LogOrigin::Captured);
            assert!(feed.len() <= 3);
        }
        assert_eq!(texts(&feed), vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn test_eviction_removes_oldest_first() {
        let mut feed = LogFeed::new(2);
        feed.append("first", LogOrigin::System);
        feed.append("second", LogOrigin::Captured);
        feed.append("third", LogOrigin::Command);

        assert_eq!(texts(&feed), vec!["second", "third"]);
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut feed = LogFeed::new(10);
        assert!(!feed.append("", LogOrigin::Captured));
        assert!(!feed.system_notice("", 12.0));
        assert!(!feed.command_echo(""));
        assert!(feed.is_empty());
    }

    #[test]
    fn test_notice_and_echo_formatting() {
        let mut feed = LogFeed::new(10);
        feed.system_notice("Map restarted", 187.9);
        feed.command_echo("status");
        feed.append("L 01/01/2024 - 12:00:00: World triggered", LogOrigin::Captured);

        let entries: Vec<_> = feed.entries().cloned().collect();
        assert_eq!(entries[0].text(), "[3:07] Map restarted");
        assert_eq!(entries[0].origin(), LogOrigin::System);
        assert_eq!(entries[1].text(), "> status");
        assert_eq!(entries[1].origin(), LogOrigin::Command);
        assert_eq!(
            entries[2].display_text(),
            "L 01/01/2024 - 12:00:00: World triggered\n"
        );
    }

    #[test]
    fn test_pinned_feed_scrolls_sink_to_tail() {
        let sink = Rc::new(RefCell::new(RecordingSink::with_rows(2)));
        let dyn_sink: Rc<RefCell<dyn LogSink>> = sink.clone();
        let mut feed = LogFeed::new(10);
        feed.attach_sink(&dyn_sink);

        for text in ["a", "b", "c", "d"] {
            feed.append(text, LogOrigin::Captured);
        }

        let sink = sink.borrow();
        assert_eq!(sink.lines, vec!["a", "b", "c", "d"]);
        assert_eq!(sink.scroll_calls, 4);
        assert_eq!(sink.offset, 2);
        assert!(feed.is_pinned());
    }

    #[test]
    fn test_unpinned_feed_leaves_viewport_alone() {
        let sink = Rc::new(RefCell::new(RecordingSink::with_rows(2)));
        let dyn_sink: Rc<RefCell<dyn LogSink>> = sink.clone();
        let mut feed = LogFeed::new(10);
        feed.attach_sink(&dyn_sink);
        for text in ["a", "b", "c", "d", "e"] {
            feed.append(text, LogOrigin::Captured);
        }

        // User scrolls to the top.
        sink.borrow_mut().offset = 0;
        assert!(!feed.observe_viewport(ViewportEvent::Wheel, true));

        feed.append("f", LogOrigin::Captured);
        assert_eq!(sink.borrow().offset, 0);
        assert_eq!(sink.borrow().lines.len(), 6);

        // Back to the tail re-pins.
        sink.borrow_mut().offset = 4;
        assert!(feed.observe_viewport(ViewportEvent::Wheel, true));
    }

    #[test]
    fn test_detach_keeps_entries_and_does_not_replay() {
        let sink = Rc::new(RefCell::new(RecordingSink::with_rows(5)));
        let dyn_sink: Rc<RefCell<dyn LogSink>> = sink.clone();
        let mut feed = LogFeed::new(10);

        feed.attach_sink(&dyn_sink);
        feed.append("seen", LogOrigin::Captured);
        feed.detach_sink();
        feed.append("missed", LogOrigin::Captured);
        feed.attach_sink(&dyn_sink);
        feed.append("seen again", LogOrigin::Captured);

        assert_eq!(texts(&feed), vec!["seen", "missed", "seen again"]);
        assert_eq!(sink.borrow().lines, vec!["seen", "seen again"]);
    }

    #[test]
    fn test_dropped_sink_is_detached() {
        let mut feed = LogFeed::new(10);
        {
            let sink: Rc<RefCell<dyn LogSink>> = Rc::new(RefCell::new(RecordingSink::default()));
            feed.attach_sink(&sink);
            assert!(feed.has_sink());
        }
        assert!(!feed.has_sink());
        assert!(feed.append("still recorded", LogOrigin::System));
    }

    #[test]
    fn test_zero_capacity_keeps_one_entry() {
        let mut feed = LogFeed::new(0);
        feed.append("a", LogOrigin::Captured);
        feed.append("b", LogOrigin::Captured);
        assert_eq!(texts(&feed), vec!["b"]);
        assert_eq!(feed.capacity(), 1);
    }
}

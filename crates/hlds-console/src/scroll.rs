//! Auto-scroll tracking for the log display.
//!
//! The display is "pinned" while it follows the tail of the feed. Scrolling
//! up more than one line unpins it; scrolling back down to the tail pins it
//! again.

/// Vertical scroll state of the log viewport, in lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    /// First visible line
    pub offset: usize,
    /// Largest reachable offset; 0 when all content fits
    pub max_offset: usize,
}

impl ScrollPosition {
    pub fn new(offset: usize, max_offset: usize) -> Self {
        Self { offset, max_offset }
    }

    /// Whether this position counts as following the tail.
    ///
    /// Content that fits entirely always counts. Otherwise the viewport may be
    /// at most one line away from the maximum offset.
    pub fn is_at_tail(&self) -> bool {
        self.max_offset == 0 || self.offset + 1 >= self.max_offset
    }
}

/// Pointer gestures delivered to the log viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Press,
    Drag,
    Release,
    Wheel,
    /// Plain pointer motion; never scrolls
    Move,
}

impl ViewportEvent {
    /// Whether this gesture can change the scroll position
    pub fn can_scroll(self) -> bool {
        !matches!(self, Self::Move)
    }
}

/// Decides whether new log entries should scroll the display to the tail.
#[derive(Debug, Clone)]
pub struct ScrollPinTracker {
    pinned: bool,
}

impl Default for ScrollPinTracker {
    fn default() -> Self {
        Self { pinned: true }
    }
}

impl ScrollPinTracker {
    /// Create a tracker that starts pinned
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Operator override (the auto-scroll toggle).
    ///
    /// Holds until the next qualifying viewport event re-derives the state.
    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    /// Re-derive the pin state after a pointer gesture.
    ///
    /// Gestures outside the viewport, and gestures that cannot scroll, are
    /// ignored. Returns the resulting state.
    pub fn observe(
        &mut self,
        event: ViewportEvent,
        inside: bool,
        position: ScrollPosition,
    ) -> bool {
        if inside && event.can_scroll() {
            self.pinned = position.is_at_tail();
        }
        self.pinned
    }

    /// Re-derive the pin state after the feed scrolled the display itself.
    pub fn content_appended(&mut self, position: ScrollPosition) -> bool {
        if self.pinned {
            self.pinned = position.is_at_tail();
        }
        self.pinned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_that_fits_is_always_pinned() {
        let mut tracker = ScrollPinTracker::new();
        for offset in [0, 3, 100] {
            assert!(tracker.observe(ViewportEvent::Wheel, true, ScrollPosition::new(offset, 0)));
        }
    }

    #[test]
    fn test_one_line_tolerance() {
        let mut tracker = ScrollPinTracker::new();

        assert!(tracker.observe(ViewportEvent::Drag, true, ScrollPosition::new(49, 50)));
        assert!(!tracker.observe(ViewportEvent::Drag, true, ScrollPosition::new(48, 50)));
        assert!(tracker.observe(ViewportEvent::Release, true, ScrollPosition::new(50, 50)));
    }

    #[test]
    fn test_scrolling_up_unpins_and_back_down_repins() {
        let mut tracker = ScrollPinTracker::new();

        tracker.observe(ViewportEvent::Wheel, true, ScrollPosition::new(10, 40));
        assert!(!tracker.is_pinned());

        tracker.observe(ViewportEvent::Wheel, true, ScrollPosition::new(40, 40));
        assert!(tracker.is_pinned());
    }

    #[test]
    fn test_events_outside_viewport_are_ignored() {
        let mut tracker = ScrollPinTracker::new();
        tracker.observe(ViewportEvent::Wheel, false, ScrollPosition::new(0, 40));
        assert!(tracker.is_pinned());
    }

    #[test]
    fn test_plain_motion_is_ignored() {
        let mut tracker = ScrollPinTracker::new();
        tracker.observe(ViewportEvent::Move, true, ScrollPosition::new(0, 40));
        assert!(tracker.is_pinned());
    }

    #[test]
    fn test_manual_override_until_next_event() {
        let mut tracker = ScrollPinTracker::new();
        tracker.set_pinned(false);
        assert!(!tracker.is_pinned());

        // Appending while unpinned leaves it alone.
        tracker.content_appended(ScrollPosition::new(40, 40));
        assert!(!tracker.is_pinned());

        tracker.observe(ViewportEvent::Press, true, ScrollPosition::new(40, 40));
        assert!(tracker.is_pinned());
    }
}

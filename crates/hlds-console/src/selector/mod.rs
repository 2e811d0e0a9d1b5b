//! Modal single-select popup
//!
//! A choice control whose list pops up over the control itself, driven as an
//! explicit state machine:
//!
//! ```text
//! Closed --activate--> OpenPendingRelease --release--> OpenGrabbed
//!    ^                        |                            |
//!    +------- cancel ---------+--- outside press/commit ---+
//! ```
//!
//! The popup opens on a press, so the matching release must not count as a
//! selection. It is swallowed while pending; only after it has been seen does
//! the popup take the pointer grab. From then on a press outside the popup
//! dismisses it and a release over a row commits that row.
//!
//! The selector never blocks. Each pointer event is fed in through
//! [`ModalSelector::handle_pointer`] and the resulting [`SelectorEvent`]s are
//! returned to the caller.

mod event;
mod geometry;

pub use event::{DismissReason, PointerEvent, PointerKind, SelectorEvent};
pub use geometry::{PopupGeometry, Rect};

/// Lifecycle phase of the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPhase {
    /// No popup exists
    Closed,
    /// Popup shown, waiting for the release of the press that opened it
    OpenPendingRelease,
    /// Popup owns all pointer input
    OpenGrabbed,
}

/// Transient data that lives only while the popup is open
#[derive(Debug, Clone)]
struct PopupSession {
    geometry: PopupGeometry,
    grabbed: bool,
    index_at_open: Option<usize>,
    highlighted: Option<usize>,
}

/// Single-select list with a self-managed popup
#[derive(Debug, Clone)]
pub struct ModalSelector {
    items: Vec<String>,
    selected: Option<usize>,
    text_size: i32,
    max_height: i32,
    session: Option<PopupSession>,
}

impl ModalSelector {
    /// Create an empty selector.
    ///
    /// `text_size` sets the row height, `max_height` caps the popup height.
    pub fn new(text_size: i32, max_height: i32) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            text_size,
            max_height,
            session: None,
        }
    }

    /// Replace the item list.
    ///
    /// An open popup is cancelled first. The first item becomes selected, or
    /// nothing when the list is empty.
    pub fn set_items(&mut self, items: Vec<String>) -> Vec<SelectorEvent> {
        let events = self.cancel();
        self.selected = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        events
    }

    /// Select an index without notification. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.items.get(index))
            .map(String::as_str)
    }

    pub fn phase(&self) -> SelectorPhase {
        match &self.session {
            None => SelectorPhase::Closed,
            Some(session) if session.grabbed => SelectorPhase::OpenGrabbed,
            Some(_) => SelectorPhase::OpenPendingRelease,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Layout of the open popup
    pub fn geometry(&self) -> Option<&PopupGeometry> {
        self.session.as_ref().map(|session| &session.geometry)
    }

    /// Open the popup over `anchor`, kept inside `screen`.
    ///
    /// Does nothing when already open or when there is nothing to choose.
    pub fn activate(&mut self, anchor: Rect, screen: Rect) -> Vec<SelectorEvent> {
        if self.session.is_some() || self.items.is_empty() {
            return Vec::new();
        }

        let geometry = PopupGeometry::layout(
            anchor,
            screen,
            self.items.len(),
            self.text_size,
            self.max_height,
            self.selected,
        );
        self.session = Some(PopupSession {
            geometry,
            grabbed: false,
            index_at_open: self.selected,
            highlighted: self.selected,
        });

        log::debug!("Selector opened with {} items", self.items.len());
        vec![SelectorEvent::PopupOpened { geometry }]
    }

    /// Advance the state machine by one pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<SelectorEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        if let PointerKind::Wheel(rows) = event.kind {
            if session.geometry.rect.contains(event.x, event.y)
                && session.geometry.scroll_by(rows)
            {
                return vec![SelectorEvent::Scrolled {
                    first_visible: session.geometry.first_visible,
                }];
            }
            return Vec::new();
        }

        if !session.grabbed {
            if event.kind == PointerKind::Release {
                session.grabbed = true;
                return vec![SelectorEvent::InputGrabbed];
            }
            return Vec::new();
        }

        let inside = session.geometry.rect.contains(event.x, event.y);
        let item = session.geometry.item_at(event.x, event.y);

        match event.kind {
            PointerKind::Press if !inside => self.dismiss(DismissReason::OutsidePress),
            PointerKind::Press | PointerKind::Drag => match item {
                Some(index) if session.highlighted != Some(index) => {
                    session.highlighted = Some(index);
                    vec![SelectorEvent::Highlighted { index }]
                }
                _ => Vec::new(),
            },
            PointerKind::Release => match item {
                Some(index) => self.commit(index),
                None => Vec::new(),
            },
            PointerKind::Move | PointerKind::Wheel(_) => Vec::new(),
        }
    }

    /// Force the popup closed without changing the selection.
    pub fn cancel(&mut self) -> Vec<SelectorEvent> {
        if self.session.is_none() {
            return Vec::new();
        }
        self.dismiss(DismissReason::Cancelled)
    }

    fn commit(&mut self, index: usize) -> Vec<SelectorEvent> {
        let index_at_open = self.session.as_ref().and_then(|s| s.index_at_open);
        self.selected = Some(index);

        let mut events = self.dismiss(DismissReason::Committed);
        if index_at_open != Some(index) {
            log::debug!("Selector committed new index {}", index);
            events.push(SelectorEvent::SelectionChanged { index });
        }
        events
    }

    fn dismiss(&mut self, reason: DismissReason) -> Vec<SelectorEvent> {
        self.session = None;
        log::debug!("Selector dismissed: {}", reason);
        vec![SelectorEvent::Dismissed { reason }]
    }
}

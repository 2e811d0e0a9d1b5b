//! Pointer input consumed by the selector and the events it emits.

use super::geometry::PopupGeometry;
use strum::Display;

/// Kind of pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Release,
    Drag,
    Move,
    /// Wheel rotation in rows; negative scrolls up
    Wheel(i32),
}

/// A pointer gesture at a screen position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn press(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Press,
            x,
            y,
        }
    }

    pub fn release(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Release,
            x,
            y,
        }
    }

    pub fn drag(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Drag,
            x,
            y,
        }
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
        }
    }

    pub fn wheel(x: i32, y: i32, rows: i32) -> Self {
        Self {
            kind: PointerKind::Wheel(rows),
            x,
            y,
        }
    }
}

/// Why an open popup went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DismissReason {
    /// Press outside the popup while it held the grab
    OutsidePress,
    /// An item was released on
    Committed,
    /// Closed programmatically (window hidden, items replaced)
    Cancelled,
}

/// Events emitted by the selector for the display layer to act on.
///
/// The selector never touches a window itself. Whoever draws the popup
/// creates it on [`PopupOpened`](SelectorEvent::PopupOpened), takes the
/// pointer grab on [`InputGrabbed`](SelectorEvent::InputGrabbed) and releases
/// the grab and destroys the popup on [`Dismissed`](SelectorEvent::Dismissed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Popup should be shown with this layout
    PopupOpened { geometry: PopupGeometry },

    /// The triggering release was seen; pointer input now belongs to the popup
    InputGrabbed,

    /// Row under the pointer while a button is held
    Highlighted { index: usize },

    /// The visible window of rows moved
    Scrolled { first_visible: usize },

    /// Popup closed; grab released
    Dismissed { reason: DismissReason },

    /// A commit picked an index different from the one selected at open
    SelectionChanged { index: usize },
}

//! # hlds-console
//!
//! Core of an in-process administration console for a dedicated game server.
//! It mirrors the server's own console output, interleaves operator commands
//! and console notices into one bounded scrollback feed, and offers map
//! selection, command history and player kick/ban on top of live server state.
//!
//! ## Design
//!
//! Nothing here draws a window. The crate is driven by its embedder:
//!
//! - Server state is read through [`ServerState`] and commands go out through
//!   [`HostCommands`]; both are passed into each call.
//! - The log display is a [`LogSink`] held weakly by the feed.
//! - The map popup is a state machine fed with [`PointerEvent`]s that answers
//!   with [`SelectorEvent`]s for the display layer to act on.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hlds_console::{ConsoleController, ConsoleConfig};
//!
//! let mut console = ConsoleController::new(ConsoleConfig::load());
//! console.initialize(&host);
//! console.show(&log_view, &host, Instant::now());
//!
//! // Once per server frame
//! console.tick(Instant::now(), &host);
//!
//! // Operator pressed enter in the command field
//! console.submit_command("status", &mut host);
//! ```

pub mod controller;
pub mod feed;
pub mod history;
pub mod host;
pub mod maps;
pub mod scroll;
pub mod selector;
pub mod status;

pub use controller::ConsoleController;
pub use feed::{LogEntry, LogFeed, LogOrigin, LogSink};
pub use history::CommandHistory;
pub use host::{ConsoleHost, HostCommands, PlayerInfo, ServerState};
pub use maps::{load_map_list, scan_map_dir};
pub use scroll::{ScrollPinTracker, ScrollPosition, ViewportEvent};
pub use selector::{
    DismissReason, ModalSelector, PointerEvent, PointerKind, PopupGeometry, Rect, SelectorEvent,
    SelectorPhase,
};
pub use status::{format_clock, PlayerColumn, ServerStatus};

pub use hlds_console_capture::{CaptureError, CapturedLine, OutputCaptureRedirector, StdStream};
pub use hlds_console_config::ConsoleConfig;

//! # hlds-console-capture
//!
//! Mirrors the process's own standard output and standard error into an
//! in-process console without taking them away from their original
//! destination.
//!
//! Each stream is swapped for the write end of a pipe. The console drains the
//! read end once per host tick, copies every byte back to the saved original
//! descriptor, and reassembles complete lines for display.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hlds_console_capture::OutputCaptureRedirector;
//!
//! let mut capture = OutputCaptureRedirector::new();
//! if let Err(e) = capture.start() {
//!     // Capture stays disabled; host output is unaffected.
//!     log::warn!("{e}");
//! }
//!
//! // Once per host tick
//! for line in capture.poll() {
//!     feed.append(&line.text, LogOrigin::Captured);
//! }
//!
//! // On shutdown (also done on drop)
//! capture.stop();
//! ```
//!
//! Only Unix-like targets are supported.

mod channel;
mod error;
mod reassembler;
mod redirector;

pub use channel::{CaptureChannel, StdStream};
pub use error::CaptureError;
pub use reassembler::{LineReassembler, MAX_LINE_BYTES};
pub use redirector::{CapturedLine, OutputCaptureRedirector};

//! Log display that writes straight to the terminal.
//!
//! Standard output is redirected into the console once capture starts, so
//! the view keeps its own copy of the terminal descriptor, taken before that.

use anyhow::{Context, Result};
use hlds_console::{LogEntry, LogOrigin, LogSink, ScrollPosition};
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::AsFd;

/// Terminal-backed log view with a simulated scrollback window
#[derive(Debug)]
pub struct TerminalView {
    out: File,
    visible_rows: usize,
    total_lines: usize,
    offset: usize,
}

impl TerminalView {
    /// Duplicate the current stdout. Call before output capture starts.
    pub fn open(visible_rows: usize) -> Result<Self> {
        let fd = io::stdout()
            .as_fd()
            .try_clone_to_owned()
            .context("Failed to duplicate stdout for the console view")?;
        Ok(Self {
            out: File::from(fd),
            visible_rows: visible_rows.max(1),
            total_lines: 0,
            offset: 0,
        })
    }

    /// Write a line to the terminal, bypassing the log feed
    pub fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            log::trace!("Console view write failed: {}", e);
        }
    }

    /// Move the simulated viewport, clamped to the scrollable range
    pub fn scroll_to(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_rows)
    }
}

impl LogSink for TerminalView {
    fn write_entry(&mut self, entry: &LogEntry) {
        let marker = match entry.origin() {
            LogOrigin::Command => ">",
            LogOrigin::Captured => "|",
            LogOrigin::System => "*",
        };
        self.total_lines += 1;
        self.print(&format!("console {} {}", marker, entry.text()));
    }

    fn scroll_to_tail(&mut self) {
        self.offset = self.max_offset();
    }

    fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::new(self.offset, self.max_offset())
    }
}

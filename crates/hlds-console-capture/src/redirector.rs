//! Capture of both standard streams, drained once per host tick.

use crate::channel::{CaptureChannel, StdStream};
use crate::error::CaptureError;
use std::os::fd::RawFd;

/// A complete line read from one of the captured streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub stream: StdStream,
    pub text: String,
}

/// Owns the stdout and stderr capture channels.
///
/// Redirection is attempted once. If it fails, the redirector stays inactive
/// for the rest of the session and [`poll`](Self::poll) returns nothing; the
/// host's own output keeps going to its original destination.
#[derive(Debug, Default)]
pub struct OutputCaptureRedirector {
    channels: Vec<CaptureChannel>,
}

impl OutputCaptureRedirector {
    /// Create an inactive redirector
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect the process's stdout and stderr.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        self.start_with_targets(StdStream::Stdout.fileno(), StdStream::Stderr.fileno())
    }

    /// Redirect two arbitrary descriptors standing in for stdout and stderr.
    ///
    /// Either both channels are acquired or neither is: if the second one
    /// fails, the first is restored before the error is returned. Calling
    /// this while already active does nothing.
    pub fn start_with_targets(
        &mut self,
        stdout: RawFd,
        stderr: RawFd,
    ) -> Result<(), CaptureError> {
        if self.is_active() {
            return Ok(());
        }

        let out = CaptureChannel::redirect(StdStream::Stdout, stdout)?;
        let err = CaptureChannel::redirect(StdStream::Stderr, stderr)?;
        self.channels = vec![out, err];

        log::info!("Output capture started");
        Ok(())
    }

    /// Check if both streams are currently redirected
    pub fn is_active(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Drain both channels without blocking.
    ///
    /// Returns completed lines, stdout first, then stderr, each in the order
    /// they were written.
    pub fn poll(&mut self) -> Vec<CapturedLine> {
        let mut lines = Vec::new();
        for channel in &mut self.channels {
            let stream = channel.stream();
            lines.extend(
                channel
                    .drain()
                    .into_iter()
                    .map(|text| CapturedLine { stream, text }),
            );
        }
        lines
    }

    /// Restore both original streams and close every descriptor.
    ///
    /// Safe to call any number of times; only the first call on an active
    /// redirector does anything. Returns whether anything was stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        // Dropping a channel restores its target.
        self.channels.clear();
        log::info!("Output capture stopped");
        true
    }
}

impl Drop for OutputCaptureRedirector {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::os::fd::AsRawFd;

    fn read_back(file: &mut File) -> String {
        let mut content = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn line(stream: StdStream, text: &str) -> CapturedLine {
        CapturedLine {
            stream,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_poll_keeps_streams_apart() {
        let mut out = tempfile::tempfile().unwrap();
        let mut err = tempfile::tempfile().unwrap();
        let mut capture = OutputCaptureRedirector::new();
        capture
            .start_with_targets(out.as_raw_fd(), err.as_raw_fd())
            .unwrap();
        assert!(capture.is_active());

        // Interleaved partial writes must not merge across streams.
        out.write_all(b"Loading map ").unwrap();
        err.write_all(b"WARNING: low ").unwrap();
        assert!(capture.poll().is_empty());

        out.write_all(b"de_dust\n").unwrap();
        err.write_all(b"memory\n").unwrap();
        assert_eq!(
            capture.poll(),
            vec![
                line(StdStream::Stdout, "Loading map de_dust"),
                line(StdStream::Stderr, "WARNING: low memory"),
            ]
        );

        assert!(capture.stop());
        assert_eq!(read_back(&mut out), "Loading map de_dust\n");
        assert_eq!(read_back(&mut err), "WARNING: low memory\n");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let out = tempfile::tempfile().unwrap();
        let err = tempfile::tempfile().unwrap();
        let mut capture = OutputCaptureRedirector::new();
        capture
            .start_with_targets(out.as_raw_fd(), err.as_raw_fd())
            .unwrap();

        assert!(capture.stop());
        assert!(!capture.stop());
        assert!(!capture.is_active());
        assert!(capture.poll().is_empty());
    }

    #[test]
    fn test_failed_start_leaves_capture_disabled() {
        let mut out = tempfile::tempfile().unwrap();
        let mut capture = OutputCaptureRedirector::new();

        assert!(capture.start_with_targets(out.as_raw_fd(), -1).is_err());
        assert!(!capture.is_active());
        assert!(capture.poll().is_empty());

        // The first channel was rolled back: writes reach the file directly.
        out.write_all(b"still visible\n").unwrap();
        assert_eq!(read_back(&mut out), "still visible\n");
    }

    #[test]
    fn test_inactive_redirector_stop_does_nothing() {
        let mut capture = OutputCaptureRedirector::new();
        assert!(!capture.stop());
    }
}

//! A single redirected standard stream.

use crate::error::CaptureError;
use crate::reassembler::LineReassembler;
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use strum::Display;

/// Read size per `read(2)` call while draining a pipe.
const READ_CHUNK: usize = 4096;

/// Which standard stream a channel redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    /// The process-wide descriptor number for this stream
    pub fn fileno(self) -> RawFd {
        match self {
            Self::Stdout => libc::STDOUT_FILENO,
            Self::Stderr => libc::STDERR_FILENO,
        }
    }
}

/// One redirected stream: pipe, saved original descriptor, partial-line buffer.
///
/// While the channel exists, everything written to `target` lands in the
/// pipe. [`CaptureChannel::drain`] copies it back to the original destination
/// and returns the completed lines. Dropping the channel points `target` back
/// at the original destination and closes every descriptor it owns.
///
/// The host blocks on writes once the pipe buffer is full, so the channel must
/// be drained regularly.
pub struct CaptureChannel {
    stream: StdStream,
    target: RawFd,
    reader: File,
    /// Kept open so the read end never reports end-of-file.
    _writer: OwnedFd,
    original: File,
    reassembler: LineReassembler,
    read_error_logged: bool,
}

impl CaptureChannel {
    /// Redirect the real process stream (`stdout` or `stderr`).
    pub fn open(stream: StdStream) -> Result<Self, CaptureError> {
        Self::redirect(stream, stream.fileno())
    }

    /// Redirect an arbitrary descriptor, labelled as `stream`.
    ///
    /// `target` must stay open for the lifetime of the channel.
    pub fn redirect(stream: StdStream, target: RawFd) -> Result<Self, CaptureError> {
        let (read_end, write_end) =
            create_pipe().map_err(|source| CaptureError::Pipe { stream, source })?;

        set_nonblocking(read_end.as_raw_fd())
            .map_err(|source| CaptureError::Configure { stream, source })?;

        let original =
            duplicate(target).map_err(|source| CaptureError::Duplicate { stream, source })?;

        // On any early return above, the OwnedFds close themselves and
        // `target` is untouched.
        // SAFETY: both descriptors are open; dup2 only replaces `target`.
        if unsafe { libc::dup2(write_end.as_raw_fd(), target) } == -1 {
            return Err(CaptureError::Redirect {
                stream,
                source: io::Error::last_os_error(),
            });
        }

        log::debug!("Redirected {} (fd {}) into capture pipe", stream, target);

        Ok(Self {
            stream,
            target,
            reader: File::from(read_end),
            _writer: write_end,
            original: File::from(original),
            reassembler: LineReassembler::new(),
            read_error_logged: false,
        })
    }

    /// The stream this channel redirects
    pub fn stream(&self) -> StdStream {
        self.stream
    }

    /// Read everything currently queued without blocking.
    ///
    /// Every byte read is written through to the original destination before
    /// line reassembly. Returns the lines completed by this drain.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut buf = [0u8; READ_CHUNK];

        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = &buf[..n];
                    self.pass_through(chunk);
                    lines.extend(self.reassembler.push(chunk));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Same as "no data this tick"; the channel stays open.
                    if !self.read_error_logged {
                        log::warn!("Reading captured {} failed: {}", self.stream, e);
                        self.read_error_logged = true;
                    }
                    break;
                }
            }
        }

        lines
    }

    /// Bytes of an unterminated line still waiting for a line feed
    pub fn pending(&self) -> &[u8] {
        self.reassembler.pending()
    }

    fn pass_through(&mut self, chunk: &[u8]) {
        if let Err(e) = self.original.write_all(chunk) {
            log::trace!("Pass-through to original {} failed: {}", self.stream, e);
        }
    }

    /// Copy whatever is still queued to the original destination.
    fn flush_remaining(&mut self) {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => self.pass_through(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }
}

impl Drop for CaptureChannel {
    fn drop(&mut self) {
        // SAFETY: `original` is owned by this channel and still open.
        if unsafe { libc::dup2(self.original.as_raw_fd(), self.target) } == -1 {
            log::warn!(
                "Failed to restore original {}: {}",
                self.stream,
                io::Error::last_os_error()
            );
        }
        self.flush_remaining();
        log::debug!("Restored {} (fd {})", self.stream, self.target);
    }
}

impl std::fmt::Debug for CaptureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureChannel")
            .field("stream", &self.stream)
            .field("target", &self.target)
            .field("pending", &self.reassembler.pending().len())
            .finish()
    }
}

/// Create a pipe whose ends are both close-on-exec.
#[cfg(target_os = "linux")]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: `fds` has room for the two descriptors pipe2 writes.
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2(2) succeeded, so both descriptors are open and owned by us.
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

/// Create a pipe whose ends are both close-on-exec.
///
/// Without pipe2 the flag is set after creation, so a concurrent fork can
/// still inherit the descriptors.
#[cfg(not(target_os = "linux"))]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    // SAFETY: `fds` has room for the two descriptors pipe writes.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe(2) succeeded, so both descriptors are open and owned by us.
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    set_cloexec(read_end.as_raw_fd())?;
    set_cloexec(write_end.as_raw_fd())?;
    Ok((read_end, write_end))
}

fn duplicate(fd: RawFd) -> io::Result<OwnedFd> {
    // SAFETY: fcntl on an invalid descriptor fails with EBADF, nothing else.
    let copy = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
    if copy == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: fcntl(F_DUPFD_CLOEXEC) returned a fresh descriptor we now own.
    Ok(unsafe { OwnedFd::from_raw_fd(copy) })
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: F_GETFL/F_SETFL only touch the status flags of `fd`.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_cloexec(fd: RawFd) -> io::Result<()> {
    // SAFETY: F_GETFD/F_SETFD only touch the descriptor flags of `fd`.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFD);
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Seek, SeekFrom};

    fn read_back(file: &mut File) -> String {
        let mut content = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_drain_reassembles_and_passes_through() {
        let mut target = tempfile::tempfile().unwrap();
        let mut channel = CaptureChannel::redirect(StdStream::Stdout, target.as_raw_fd()).unwrap();

        target.write_all(b"hel").unwrap();
        assert!(channel.drain().is_empty());
        assert_eq!(channel.pending(), b"hel");

        target.write_all(b"lo\r\nwor").unwrap();
        assert_eq!(channel.drain(), vec!["hello"]);

        target.write_all(b"ld\n").unwrap();
        assert_eq!(channel.drain(), vec!["world"]);

        drop(channel);
        assert_eq!(read_back(&mut target), "hello\r\nworld\n");
    }

    #[test]
    fn test_drain_without_data_returns_immediately() {
        let target = tempfile::tempfile().unwrap();
        let mut channel = CaptureChannel::redirect(StdStream::Stderr, target.as_raw_fd()).unwrap();

        assert!(channel.drain().is_empty());
        assert!(channel.drain().is_empty());
        assert_eq!(channel.stream(), StdStream::Stderr);
    }

    #[test]
    fn test_drop_restores_target_and_flushes_queued_bytes() {
        let mut target = tempfile::tempfile().unwrap();
        let channel = CaptureChannel::redirect(StdStream::Stdout, target.as_raw_fd()).unwrap();

        target.write_all(b"never drained\n").unwrap();
        drop(channel);

        // Writes after restoration go straight to the file.
        target.write_all(b"direct\n").unwrap();
        assert_eq!(read_back(&mut target), "never drained\ndirect\n");
    }

    #[test]
    fn test_redirect_invalid_descriptor_fails_closed() {
        let err = CaptureChannel::redirect(StdStream::Stdout, -1).unwrap_err();
        assert!(matches!(err, CaptureError::Duplicate { .. }));
        assert_eq!(err.stream(), StdStream::Stdout);
    }

    fn is_cloexec(fd: RawFd) -> bool {
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
        flags != -1 && flags & libc::FD_CLOEXEC != 0
    }

    #[test]
    fn test_owned_descriptors_are_close_on_exec() {
        let target = tempfile::tempfile().unwrap();
        let channel = CaptureChannel::redirect(StdStream::Stdout, target.as_raw_fd()).unwrap();

        assert!(is_cloexec(channel.reader.as_raw_fd()));
        assert!(is_cloexec(channel._writer.as_raw_fd()));
        assert!(is_cloexec(channel.original.as_raw_fd()));
    }

    #[test]
    fn test_stream_display() {
        assert_eq!(StdStream::Stdout.to_string(), "stdout");
        assert_eq!(StdStream::Stderr.to_string(), "stderr");
    }
}

//! Line reassembly from arbitrarily chunked byte reads.

/// Longest line kept in one piece.
///
/// A stream that never sends a line feed is cut into lines of this size, so
/// the buffered partial line stays bounded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Accumulates bytes until a line feed completes a line.
///
/// Each capture channel owns one of these, so partial lines from stdout and
/// stderr never interleave.
#[derive(Debug, Default, Clone)]
pub struct LineReassembler {
    partial: Vec<u8>,
    /// Prefix of `partial` already known to hold no line feed
    scanned: usize,
}

impl LineReassembler {
    /// Create an empty reassembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in order.
    ///
    /// Lines are split on `\n` and lose one trailing `\r`. Lines that are
    /// empty after stripping are dropped. Bytes after the last line feed stay
    /// buffered for the next call, up to [`MAX_LINE_BYTES`]; a longer run
    /// without a line feed is emitted in pieces of that size. The output does
    /// not depend on how the stream was split into chunks.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.partial.extend_from_slice(bytes);

        let mut lines = Vec::new();
        let mut start = 0;
        loop {
            let limit = self.partial.len().min(start + MAX_LINE_BYTES);
            match self.partial[self.scanned..limit]
                .iter()
                .position(|&b| b == b'\n')
            {
                Some(pos) => {
                    let end = self.scanned + pos;
                    let raw = &self.partial[start..end];
                    push_line(&mut lines, raw.strip_suffix(b"\r").unwrap_or(raw));
                    start = end + 1;
                }
                None if limit - start == MAX_LINE_BYTES => {
                    push_line(&mut lines, &self.partial[start..limit]);
                    start = limit;
                }
                None => {
                    self.scanned = limit;
                    break;
                }
            }
            self.scanned = start;
        }

        self.partial.drain(..start);
        self.scanned -= start;

        lines
    }

    /// Bytes received after the last line feed
    pub fn pending(&self) -> &[u8] {
        &self.partial
    }

    /// Check if no partial line is buffered
    pub fn is_empty(&self) -> bool {
        self.partial.is_empty()
    }

    /// Discard any buffered partial line
    pub fn clear(&mut self) {
        self.partial.clear();
        self.scanned = 0;
    }
}

fn push_line(lines: &mut Vec<String>, line: &[u8]) {
    if !line.is_empty() {
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lines_span_chunks() {
        let mut reassembler = LineReassembler::new();

        assert!(reassembler.push(b"hel").is_empty());
        assert_eq!(reassembler.push(b"lo\nwor"), vec!["hello"]);
        assert_eq!(reassembler.push(b"ld\n"), vec!["world"]);
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_bare_crlf_yields_nothing() {
        let mut reassembler = LineReassembler::new();
        assert!(reassembler.push(b"\r\n").is_empty());
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_crlf_stripped_and_blank_lines_dropped() {
        let mut reassembler = LineReassembler::new();
        let lines = reassembler.push(b"one\r\n\n\r\ntwo\n");
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_only_one_trailing_cr_is_stripped() {
        let mut reassembler = LineReassembler::new();
        assert_eq!(reassembler.push(b"a\r\r\n"), vec!["a\r"]);
    }

    #[test]
    fn test_partial_line_is_kept() {
        let mut reassembler = LineReassembler::new();
        assert_eq!(reassembler.push(b"done\npart"), vec!["done"]);
        assert_eq!(reassembler.pending(), b"part");

        reassembler.clear();
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_split_point_does_not_change_output() {
        let stream: &[u8] = b"Server started\r\nmap de_dust\n\nplayer \"bob\" joined\r\n\r\ntail";
        let mut whole = LineReassembler::new();
        let expected = whole.push(stream);

        for first in 0..=stream.len() {
            for second in first..=stream.len() {
                let mut chunked = LineReassembler::new();
                let mut lines = chunked.push(&stream[..first]);
                lines.extend(chunked.push(&stream[first..second]));
                lines.extend(chunked.push(&stream[second..]));

                assert_eq!(lines, expected, "split at {first}/{second}");
                assert_eq!(chunked.pending(), b"tail");
            }
        }
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "café\n".as_bytes();
        let mut reassembler = LineReassembler::new();
        assert!(reassembler.push(&text[..4]).is_empty());
        assert_eq!(reassembler.push(&text[4..]), vec!["café"]);
    }

    #[test]
    fn test_unterminated_progress_output_stays_bounded() {
        let frame: &[u8] = b"Loading 42%\r";
        let frames = 20_000;

        let mut chunked = LineReassembler::new();
        let mut lines = Vec::new();
        for _ in 0..frames {
            lines.extend(chunked.push(frame));
            assert!(chunked.pending().len() < MAX_LINE_BYTES);
        }

        let stream = frame.repeat(frames);
        let mut whole = LineReassembler::new();
        let expected = whole.push(&stream);

        assert_eq!(lines, expected);
        assert_eq!(chunked.pending(), whole.pending());
        assert_eq!(
            expected.iter().map(String::len).sum::<usize>() + whole.pending().len(),
            stream.len()
        );
    }

    #[test]
    fn test_overlong_line_is_cut_at_the_limit() {
        let mut reassembler = LineReassembler::new();
        let mut stream = vec![b'x'; MAX_LINE_BYTES + 3];
        stream.extend_from_slice(b"\nnext\n");

        let lines = reassembler.push(&stream);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), MAX_LINE_BYTES);
        assert_eq!(lines[1], "xxx");
        assert_eq!(lines[2], "next");
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_line_feed_right_after_the_limit_adds_no_blank_line() {
        let mut stream = vec![b'y'; MAX_LINE_BYTES];
        stream.extend_from_slice(b"\ndone\n");

        let mut whole = LineReassembler::new();
        let expected = whole.push(&stream);
        assert_eq!(expected.len(), 2);

        let mut chunked = LineReassembler::new();
        let mut lines = Vec::new();
        for chunk in stream.chunks(4096) {
            lines.extend(chunked.push(chunk));
        }
        assert_eq!(lines, expected);
    }
}

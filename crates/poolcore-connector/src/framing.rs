//! Line-delimited JSON framing over a per-session byte buffer.

use poolcore_core::MAX_MSGSIZE;

/// Result of scanning a session's buffer for a complete line.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameResult {
    /// A complete line (newline stripped) was extracted and removed from
    /// the buffer.
    Line(Vec<u8>),
    /// No newline found yet and the buffer has grown past the limit, or a
    /// newline was found but the line including it exceeds the limit. The
    /// session must be invalidated; the caller should not keep scanning.
    Overflow,
    /// No complete line yet; wait for more data.
    NeedMore,
}

/// Extracts at most one complete line from `buf`, draining the consumed
/// bytes (including the newline) on success. Call repeatedly until
/// `NeedMore` to drain every line a single `recv` may have delivered.
pub fn next_frame(buf: &mut Vec<u8>) -> FrameResult {
    match buf.iter().position(|&b| b == b'\n') {
        Some(pos) => {
            let line_len = pos + 1;
            if line_len > MAX_MSGSIZE {
                return FrameResult::Overflow;
            }
            let mut line: Vec<u8> = buf.drain(..line_len).collect();
            line.pop(); // drop the trailing '\n'
            FrameResult::Line(line)
        }
        None => {
            if buf.len() > MAX_MSGSIZE {
                FrameResult::Overflow
            } else {
                FrameResult::NeedMore
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_one_line_at_a_time() {
        let mut buf = b"{\"a\":1}\n{\"b\":2}\n".to_vec();
        assert_eq!(next_frame(&mut buf), FrameResult::Line(b"{\"a\":1}".to_vec()));
        assert_eq!(next_frame(&mut buf), FrameResult::Line(b"{\"b\":2}".to_vec()));
        assert_eq!(next_frame(&mut buf), FrameResult::NeedMore);
    }

    #[test]
    fn partial_line_needs_more() {
        let mut buf = b"{\"a\":1}".to_vec();
        assert_eq!(next_frame(&mut buf), FrameResult::NeedMore);
        assert_eq!(buf, b"{\"a\":1}");
    }

    #[test]
    fn oversize_line_without_newline_overflows() {
        let mut buf = vec![b'x'; MAX_MSGSIZE + 200];
        assert_eq!(next_frame(&mut buf), FrameResult::Overflow);
    }

    #[test]
    fn oversize_line_with_newline_overflows() {
        let mut buf = vec![b'x'; MAX_MSGSIZE + 5];
        buf.push(b'\n');
        assert_eq!(next_frame(&mut buf), FrameResult::Overflow);
    }
}

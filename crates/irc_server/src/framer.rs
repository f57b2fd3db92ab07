//! Line Framer (spec.md §4.1): turns a growing byte buffer into whole,
//! CRLF-terminated frames.
//!
//! Grounded on `examples/original_source/src/daemon/server.py`'s
//! buffer-and-slice-on-CRLF approach (`in_buffer.find(IRC_TERMINATION_DELIMITER)`)
//! and on the teacher's `bin/irc_server.rs` read loop.

/// Drains every complete CRLF-terminated frame currently in `buf`,
/// including the CRLF. Any trailing partial frame is left in `buf` for the
/// next read. spec.md §5's open question (c): no cap is enforced on `buf`'s
/// growth while no CRLF has arrived, left as a TODO, same as the
/// reference implementation.
pub fn extract_frames(buf: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    while let Some(pos) = find_crlf(buf) {
        let frame: Vec<u8> = buf.drain(..pos + 2).collect();
        frames.push(frame);
    }
    frames
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_frame() {
        let mut buf = b"NICK alice\r\n".to_vec();
        let frames = extract_frames(&mut buf);
        assert_eq!(frames, vec![b"NICK alice\r\n".to_vec()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn leaves_partial_frame_in_buffer() {
        let mut buf = b"NICK alice\r\nJOIN #ro".to_vec();
        let frames = extract_frames(&mut buf);
        assert_eq!(frames, vec![b"NICK alice\r\n".to_vec()]);
        assert_eq!(buf, b"JOIN #ro".to_vec());
    }

    #[test]
    fn extracts_multiple_frames_from_one_read() {
        let mut buf = b"NICK alice\r\nUSER alice 0 * :Alice\r\n".to_vec();
        let frames = extract_frames(&mut buf);
        assert_eq!(frames.len(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn eof_mid_frame_discards_partial_buffer_when_connection_resets() {
        let mut buf = b"NICK ali".to_vec();
        let frames = extract_frames(&mut buf);
        assert!(frames.is_empty());
        // A real EOF simply drops `buf` (the connection task ends); nothing
        // special happens inside the framer itself.
        buf.clear();
        assert!(buf.is_empty());
    }
}

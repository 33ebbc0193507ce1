//! SSE event decoding for streaming completions
//!
//! The upstream API delivers streaming completions as Server-Sent Events.
//! Network chunks do not align with event boundaries, so the decoder buffers
//! partial lines across `feed` calls and yields only the payloads of complete
//! `data:` lines. Comment lines, event names, and blank separators are
//! dropped.

/// Incremental decoder turning raw SSE bytes into `data:` payloads
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the wire and return the payloads of all `data:`
    /// lines completed by this chunk, in order.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; a truncated line is
    /// held until a later chunk completes it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(bytes));

        let mut payloads = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                payloads.push(payload.trim_start().to_string());
            }
        }
        payloads
    }

    /// Whether a partial line is still buffered (truncated stream detection)
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"").is_empty());
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"data: {\"x\":1}\n\n"), vec!["{\"x\":1}"]);
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_payload_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"content\":\"hel").is_empty());
        assert!(decoder.has_partial());
        assert_eq!(decoder.feed(b"lo\"}\n"), vec!["{\"content\":\"hello\"}"]);
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: one\n\ndata: two\n\ndata: [DONE]\n\n");
        assert_eq!(payloads, vec!["one", "two", "[DONE]"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"data: test\r\n\r\n"), vec!["test"]);
    }

    #[test]
    fn test_non_data_lines_dropped() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b": keep-alive\nevent: message\ndata: payload\n\n");
        assert_eq!(payloads, vec!["payload"]);
    }

    #[test]
    fn test_chunk_boundary_at_newline() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: first").is_empty());
        assert_eq!(decoder.feed(b"\ndata: second\n"), vec!["first", "second"]);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: hello \xff world\n");
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].starts_with("hello"));
        assert!(payloads[0].ends_with("world"));
    }
}

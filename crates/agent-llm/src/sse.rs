//! Incremental decoding of server-sent event bodies
//!
//! Streaming chat completions arrive as `data: {...}` lines separated by blank
//! lines. Network chunks split those lines at arbitrary byte offsets, so the
//! decoder buffers until a full line is available.

/// Payload terminating an OpenAI-style stream
pub const DONE_MARKER: &str = "[DONE]";

/// Buffers raw bytes and yields complete `data:` payloads
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every payload completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = parse_line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);
    let payload = line.strip_prefix("data:")?;
    Some(payload.trim_start().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        let payloads = decoder.push(b":1}\n\ndata: [DONE]\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string(), DONE_MARKER.to_string()]);
    }

    #[test]
    fn test_ignores_comments_and_events() {
        let mut decoder = SseLineDecoder::new();
        let payloads = decoder.push(b": keep-alive\nevent: message\r\ndata: x\r\n");
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_multibyte_split() {
        let mut decoder = SseLineDecoder::new();
        let text = "data: ₹\n".as_bytes();
        assert!(decoder.push(&text[..7]).is_empty());
        assert_eq!(decoder.push(&text[7..]), vec!["₹".to_string()]);
    }
}

//! Server-sent event framing for streamed chat completions

/// Accumulates raw body bytes and hands out complete event blocks.
/// Bytes are only decoded once a whole block is present, so a multibyte
/// character split across network chunks survives intact.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_chunk(&mut self, chunk: &[u8]) {
        // A CR at the end of the previous chunk may pair with an LF here
        let start = self.buffer.len().saturating_sub(1);
        self.buffer.extend_from_slice(chunk);
        strip_crlf(&mut self.buffer, start);
    }

    /// Next block terminated by a blank line, if one is complete
    pub(crate) fn next_event_block(&mut self) -> Option<String> {
        let boundary = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let block: Vec<u8> = self.buffer.drain(..boundary + 2).collect();
        Some(String::from_utf8_lossy(&block).into_owned())
    }

    /// Whatever is left once the body has ended
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&rest).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

/// Collapse `\r\n` into `\n` from `start` onwards
fn strip_crlf(bytes: &mut Vec<u8>, start: usize) {
    let mut read = start;
    let mut write = start;
    while read < bytes.len() {
        if bytes[read] == b'\r' && bytes.get(read + 1) == Some(&b'\n') {
            read += 1;
            continue;
        }
        bytes[write] = bytes[read];
        write += 1;
        read += 1;
    }
    bytes.truncate(write);
}

/// One `data:` payload out of an event block
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseData<'a> {
    Json(&'a str),
    Done,
}

pub(crate) fn data_lines(event_block: &str) -> impl Iterator<Item = SseData<'_>> {
    event_block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .map(|data| if data == "[DONE]" { SseData::Done } else { SseData::Json(data) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_split_across_chunks() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"data: {\"a\":");
        assert!(buffer.next_event_block().is_none());

        buffer.push_chunk(b"1}\n\ndata: [DONE]\n\n");
        let first = buffer.next_event_block().unwrap();
        assert_eq!(data_lines(&first).collect::<Vec<_>>(), [SseData::Json("{\"a\":1}")]);

        let second = buffer.next_event_block().unwrap();
        assert_eq!(data_lines(&second).collect::<Vec<_>>(), [SseData::Done]);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_crlf_and_comments() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b": keep-alive\r\n\r\ndata:{\"b\":2}\r\n\r\n");
        let comment = buffer.next_event_block().unwrap();
        assert_eq!(data_lines(&comment).count(), 0);
        let block = buffer.next_event_block().unwrap();
        assert_eq!(data_lines(&block).collect::<Vec<_>>(), [SseData::Json("{\"b\":2}")]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let payload = "data: {\"c\":\"你好\"}\n\n".as_bytes();
        let cut = payload.iter().position(|&b| b >= 0x80).unwrap() + 1;

        let mut buffer = SseBuffer::new();
        buffer.push_chunk(&payload[..cut]);
        assert!(buffer.next_event_block().is_none());
        buffer.push_chunk(&payload[cut..]);

        let block = buffer.next_event_block().unwrap();
        assert!(block.contains("你好"), "{block:?}");
        assert!(!block.contains('\u{fffd}'));
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"data: {\"d\":4}\r");
        buffer.push_chunk(b"\n\r");
        assert!(buffer.next_event_block().is_none());
        buffer.push_chunk(b"\ndata: [DONE]\r\n\r\n");

        let block = buffer.next_event_block().unwrap();
        assert_eq!(block, "data: {\"d\":4}\n\n");
        let done = buffer.next_event_block().unwrap();
        assert_eq!(data_lines(&done).collect::<Vec<_>>(), [SseData::Done]);
    }

    #[test]
    fn test_unterminated_tail() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"data: {\"c\":3}");
        assert!(buffer.next_event_block().is_none());
        assert_eq!(buffer.finish().as_deref(), Some("data: {\"c\":3}"));
    }
}

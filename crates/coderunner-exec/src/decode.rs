//! Incremental UTF-8 decoding of pipe chunks.
//!
//! Pipe reads split output at arbitrary byte offsets, so a multi-byte
//! character can straddle two chunks. [`Utf8ChunkDecoder`] holds back an
//! incomplete trailing sequence until the next chunk arrives. Bytes that
//! are invalid regardless of what follows are replaced with U+FFFD.

#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of `pending + chunk` as forms complete characters.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let complete = incomplete_tail_start(&bytes);
        self.pending = bytes.split_off(complete);

        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Flushes whatever is still held back at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Index where a truncated trailing UTF-8 sequence begins, or `bytes.len()`
/// if the buffer does not end mid-character.
fn incomplete_tail_start(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(3) {
        let byte = bytes[len - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            // continuation byte, keep looking for the lead
            continue;
        }
        let width = match byte {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 1,
        };
        return if width > back { len - back } else { len };
    }
    len
}

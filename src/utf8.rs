/// Incremental UTF-8 decoder for byte streams that arrive in arbitrary chunks.
///
/// A character split across two chunks is held back until the rest of it
/// arrives. Bytes that can never form a character are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use serialterm::Utf8Decoder;
///
/// let mut decoder = Utf8Decoder::new();
/// assert_eq!(decoder.decode(&[0xff, 0xc3]), "\u{fffd}");
/// assert_eq!(decoder.decode(&[0xa4, b'!']), "ä!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk` together with any bytes held back from the previous call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let keep_from = bytes.len() - incomplete_tail_len(&bytes);
        self.pending = bytes.split_off(keep_from);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Number of bytes currently held back.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Length of a truncated but so far valid character at the end of `bytes`.
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    // A character is at most 4 bytes, so a truncated one starts in the last 3.
    let start = bytes.len().saturating_sub(3);
    for lead in (start..bytes.len()).rev() {
        if bytes[lead] & 0xc0 == 0x80 {
            continue;
        }
        return match std::str::from_utf8(&bytes[lead..]) {
            Err(e) if e.valid_up_to() == 0 && e.error_len().is_none() => bytes.len() - lead,
            _ => 0,
        };
    }
    0
}

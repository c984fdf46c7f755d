//! Fixed-capacity ring buffer that segments a raw byte stream into whole
//! FIX messages.

const CAPACITY: usize = 32_768;
const WRAP_BOUNDARY: usize = 8_192;

/// Owns the receive ring. `writable_region()` hands the socket a
/// contiguous tail slice to read into; `take_message(n)` then scans the
/// newly written bytes for a complete trailer.
///
/// A found message is copied into an internal scratch buffer before any
/// compaction runs: compaction can `memmove` the unread tail over the
/// region the message occupied (its destination range starts at offset 0
/// and can extend well past the message's own offset), so the message must
/// be captured first. Any single message is guaranteed to be at most
/// `WRAP_BOUNDARY` bytes (the same bound the wrap guarantee promises), so
/// the scratch buffer never grows past that after its first use.
pub struct ReceiveFramer {
    buffer: Box<[u8; CAPACITY]>,
    start: usize,
    end: usize,
    scratch: Vec<u8>,
}

impl ReceiveFramer {
    pub fn new() -> Self {
        ReceiveFramer {
            buffer: Box::new([0u8; CAPACITY]),
            start: 0,
            end: 0,
            scratch: Vec::with_capacity(WRAP_BOUNDARY),
        }
    }

    /// Contiguous tail available for the next socket read.
    pub fn writable_region(&mut self) -> &mut [u8] {
        &mut self.buffer[self.end..]
    }

    /// Call after writing `bytes_written` bytes into the slice returned by
    /// `writable_region()`. Scans from the last-consumed offset for the
    /// byte pattern `SOH,'1','0','='` followed by three checksum digits.
    ///
    /// Returns the framed message — a span ending at the last checksum
    /// digit, *not* the trailing SOH that conventionally follows it; the
    /// parser is built to accept exactly this span.
    pub fn take_message(&mut self, bytes_written: usize) -> Option<&[u8]> {
        let new_end = self.end + bytes_written;
        debug_assert!(new_end <= CAPACITY, "writable_region() slice was overrun");

        let mut i = self.start;
        let mut trailer_end = None;
        while i + 3 < new_end {
            if self.buffer[i] == crate::wire::SOH
                && self.buffer[i + 1] == b'1'
                && self.buffer[i + 2] == b'0'
                && self.buffer[i + 3] == b'='
            {
                let j = i + 6; // '=' then two more checksum-digit positions
                if j >= new_end {
                    break; // trailer started but checksum digits not fully buffered yet
                }
                trailer_end = Some(j);
                break;
            }
            i += 1;
        }

        match trailer_end {
            Some(j) => {
                self.scratch.clear();
                self.scratch.extend_from_slice(&self.buffer[self.start..=j]);
                self.advance_move_overflow(j + 1, new_end);
                Some(&self.scratch[..])
            }
            None => {
                self.advance_move_overflow(self.start, new_end);
                None
            }
        }
    }

    fn advance_move_overflow(&mut self, new_start: usize, new_end: usize) {
        if new_end < CAPACITY - WRAP_BOUNDARY {
            self.start = new_start;
            self.end = new_end;
        } else {
            let len = new_end - new_start;
            self.buffer.copy_within(new_start..new_end, 0);
            self.start = 0;
            self.end = len;
        }
    }
}

impl Default for ReceiveFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(framer: &mut ReceiveFramer, bytes: &[u8]) {
        let region = framer.writable_region();
        region[..bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn frames_a_single_whole_message() {
        let mut framer = ReceiveFramer::new();
        let msg = b"35=0\x0110=128\x01";
        push(&mut framer, msg);
        let framed = framer.take_message(msg.len()).unwrap().to_vec();
        assert_eq!(framed, b"35=0\x0110=128");
    }

    #[test]
    fn returns_none_on_incomplete_trailer() {
        let mut framer = ReceiveFramer::new();
        let partial = b"35=0\x0110=1";
        push(&mut framer, partial);
        assert!(framer.take_message(partial.len()).is_none());
    }

    #[test]
    fn frames_messages_split_across_arbitrary_chunk_boundaries() {
        let mut framer = ReceiveFramer::new();
        let full = b"35=W\x01269=0\x0110=042\x01".to_vec();

        for split in 1..full.len() {
            let mut framer = ReceiveFramer::new();
            let (a, b) = full.split_at(split);
            push(&mut framer, a);
            assert!(framer.take_message(a.len()).is_none(), "split at {split}");

            let region = framer.writable_region();
            region[..b.len()].copy_from_slice(b);
            let framed = framer.take_message(b.len()).unwrap().to_vec();
            assert_eq!(framed, &full[..full.len() - 1], "split at {split}");
        }
    }

    #[test]
    fn frames_back_to_back_messages_in_order() {
        let mut framer = ReceiveFramer::new();
        let first = b"35=0\x0110=001\x01";
        let second = b"35=1\x0110=002\x01";
        let mut combined = first.to_vec();
        combined.extend_from_slice(second);
        push(&mut framer, &combined);

        let a = framer.take_message(combined.len()).unwrap().to_vec();
        assert_eq!(a, b"35=0\x0110=001");
        let b = framer.take_message(0).unwrap().to_vec();
        assert_eq!(b, b"35=1\x0110=002");
    }
}

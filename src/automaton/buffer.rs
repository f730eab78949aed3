//! Compiled record schema and bounds-checked buffer accessors.
//!
//! The compacted automaton is one contiguous byte buffer. Every state is a
//! variable-length record and every link between states - failure link,
//! transition target - is a little-endian u32 byte offset into that buffer,
//! never a live reference. That is what makes the whole structure
//! relocatable and safe to share read-only across threads.
//!
//! Layout, all offsets relative to the buffer start:
//!
//! ```text
//! 0              magic       u32
//! 4              state count u32
//! 8              root offset u32
//! 12             total len   u32
//! 16             first state record (the root)
//! ...
//! ```
//!
//! Each state record, aligned to 4 bytes:
//!
//! ```text
//! +0             failure-link offset  u32   (0 on the root)
//! +4             depth                u16
//! +6             goto count           u16   (<= 256)
//! +8             flags                u8    (tag bits | terminal bit)
//! +9             keys[goto count + 1]       (sorted ascending; one slack byte)
//! pad to 4
//! targets[goto count]                 u32 each, parallel to keys
//! pad to 4
//! ```
//!
//! The header occupies offset 0, so no real record ever sits there and an
//! all-zero offset doubles as the invalid/unset sentinel. All reads go
//! through accessor methods that slice the buffer; a corrupted offset panics
//! on the bounds check instead of yielding a plausible wrong answer.

/// Tag embedded in the buffer header; checked before every scan.
pub(crate) const BUFFER_MAGIC: u32 = 0x00AC_005A;

/// High bits of every record's flags byte, a per-record sanity tag.
pub(crate) const STATE_TAG: u8 = 0xA0;
/// Low bit of the flags byte: a complete pattern ends at this state.
pub(crate) const TERMINAL_BIT: u8 = 0x01;

/// Size of the reserved header prefix; the root record starts here.
pub(crate) const HEADER_LEN: usize = 16;

// Field offsets within a state record.
const FAIL_AT: usize = 0;
const DEPTH_AT: usize = 4;
const GOTO_COUNT_AT: usize = 6;
const FLAGS_AT: usize = 8;
pub(crate) const KEYS_AT: usize = 9;

/// Round up to the natural alignment of an offset-sized integer.
pub(crate) const fn align_ofst(n: usize) -> usize {
    (n + 3) & !3
}

/// Exact byte size of a record with `goto_count` transitions.
pub(crate) const fn record_size(goto_count: usize) -> usize {
    align_ofst(KEYS_AT + goto_count + 1) + 4 * goto_count
}

pub(crate) fn write_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Byte offset of a state record within the shared buffer.
///
/// Plays the role a node reference plays at build time; freely copyable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StateOfst(pub(crate) u32);

impl StateOfst {
    /// The invalid/unset sentinel; no record can live at offset 0.
    pub(crate) const NONE: StateOfst = StateOfst(0);

    fn get(self) -> usize {
        self.0 as usize
    }
}

/// Set of bytes with an outgoing transition from the root.
///
/// Derived from the root's transition keys at compaction; purely a cache for
/// the matcher's fast-skip, it holds nothing the root record doesn't.
#[derive(Clone, Debug, Default)]
pub(crate) struct RootCharset {
    bits: [u64; 4],
}

impl RootCharset {
    pub(crate) fn set(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1 << (byte & 63);
    }

    #[inline]
    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1 << (byte & 63)) != 0
    }
}

/// The raw record arena: owned bytes plus typed, bounds-checked reads.
pub(crate) struct StateBuffer {
    bytes: Box<[u8]>,
}

impl StateBuffer {
    pub(crate) fn from_bytes(bytes: Box<[u8]>) -> StateBuffer {
        StateBuffer { bytes }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read_u16(&self, at: usize) -> u16 {
        u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]])
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_le_bytes([
            self.bytes[at],
            self.bytes[at + 1],
            self.bytes[at + 2],
            self.bytes[at + 3],
        ])
    }

    pub(crate) fn magic(&self) -> u32 {
        self.read_u32(0)
    }

    pub(crate) fn state_count(&self) -> u32 {
        self.read_u32(4)
    }

    pub(crate) fn root(&self) -> StateOfst {
        StateOfst(self.read_u32(8))
    }

    pub(crate) fn total_len(&self) -> u32 {
        self.read_u32(12)
    }

    #[inline]
    pub(crate) fn fail_link(&self, s: StateOfst) -> StateOfst {
        StateOfst(self.read_u32(s.get() + FAIL_AT))
    }

    #[inline]
    pub(crate) fn depth(&self, s: StateOfst) -> u16 {
        self.read_u16(s.get() + DEPTH_AT)
    }

    #[inline]
    pub(crate) fn goto_count(&self, s: StateOfst) -> usize {
        self.read_u16(s.get() + GOTO_COUNT_AT) as usize
    }

    #[inline]
    pub(crate) fn flags(&self, s: StateOfst) -> u8 {
        self.bytes[s.get() + FLAGS_AT]
    }

    #[inline]
    pub(crate) fn is_terminal(&self, s: StateOfst) -> bool {
        debug_assert_eq!(self.flags(s) & !TERMINAL_BIT, STATE_TAG);
        self.flags(s) & TERMINAL_BIT != 0
    }

    /// The record's sorted transition keys (slack byte excluded).
    pub(crate) fn keys(&self, s: StateOfst) -> &[u8] {
        let base = s.get();
        &self.bytes[base + KEYS_AT..base + KEYS_AT + self.goto_count(s)]
    }

    /// Binary-search the record's keys for `byte`; on a hit, return the
    /// target record's offset from the parallel array.
    #[inline]
    pub(crate) fn find_goto(&self, s: StateOfst, byte: u8) -> Option<StateOfst> {
        let count = self.goto_count(s);
        let i = self.keys(s).binary_search(&byte).ok()?;
        let targets_at = Self::targets_at(s, count);
        Some(StateOfst(self.read_u32(targets_at + 4 * i)))
    }

    /// Where the parallel target array starts for a record with `count` keys.
    pub(crate) fn targets_at(s: StateOfst, count: usize) -> usize {
        s.get() + align_ofst(KEYS_AT + count + 1)
    }
}

/// The compiled automaton: buffer, root offset, and the root charset cache.
///
/// Immutable once built. The buffer is the sole owned resource; dropping the
/// automaton releases exactly that allocation.
pub(crate) struct DenseAutomaton {
    buf: StateBuffer,
    root: StateOfst,
    root_charset: RootCharset,
}

impl DenseAutomaton {
    pub(crate) fn new(buf: StateBuffer, root: StateOfst, root_charset: RootCharset) -> Self {
        DenseAutomaton {
            buf,
            root,
            root_charset,
        }
    }

    #[inline]
    pub(crate) fn buf(&self) -> &StateBuffer {
        &self.buf
    }

    #[inline]
    pub(crate) fn root(&self) -> StateOfst {
        self.root
    }

    #[inline]
    pub(crate) fn root_charset(&self) -> &RootCharset {
        &self.root_charset
    }

    pub(crate) fn state_count(&self) -> usize {
        self.buf.state_count() as usize
    }

    pub(crate) fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Validate the header tag. A mismatch means the buffer was never
    /// produced by the compactor (or has been corrupted) - a programming
    /// error, not user input, so it stops hard.
    #[inline]
    pub(crate) fn verify_tag(&self) {
        assert_eq!(
            self.buf.magic(),
            BUFFER_MAGIC,
            "buffer tag mismatch: not a compiled automaton"
        );
        debug_assert_eq!(self.buf.total_len() as usize, self.buf.len());
    }

    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size() {
        // header is 9 bytes, plus count+1 key bytes, padded, plus targets
        assert_eq!(record_size(0), 12); // 9+1=10 -> 12, no targets
        assert_eq!(record_size(1), 16); // 9+2=11 -> 12, + 4
        assert_eq!(record_size(2), 20); // 9+3=12 -> 12, + 8
        assert_eq!(record_size(3), 28); // 9+4=13 -> 16, + 12
        assert_eq!(record_size(256), 1292); // 9+257=266 -> 268, + 1024
    }

    #[test]
    fn test_record_size_aligned() {
        for count in 0..=256 {
            assert_eq!(record_size(count) % 4, 0);
        }
    }

    #[test]
    fn test_align_ofst() {
        assert_eq!(align_ofst(0), 0);
        assert_eq!(align_ofst(1), 4);
        assert_eq!(align_ofst(4), 4);
        assert_eq!(align_ofst(9), 12);
        assert_eq!(align_ofst(13), 16);
    }

    #[test]
    fn test_root_charset() {
        let mut cs = RootCharset::default();
        assert!(!cs.contains(0));
        assert!(!cs.contains(255));

        cs.set(0);
        cs.set(b'h');
        cs.set(255);

        assert!(cs.contains(0));
        assert!(cs.contains(b'h'));
        assert!(cs.contains(255));
        assert!(!cs.contains(b'g'));
        assert!(!cs.contains(254));
    }

    #[test]
    fn test_state_ofst_none() {
        assert_eq!(StateOfst::NONE, StateOfst(0));
        assert_ne!(StateOfst(HEADER_LEN as u32), StateOfst::NONE);
    }

    #[test]
    fn test_roundtrip_reads() {
        let mut bytes = vec![0u8; HEADER_LEN + record_size(2)];
        let total = bytes.len() as u32;
        write_u32(&mut bytes, 0, BUFFER_MAGIC);
        write_u32(&mut bytes, 4, 1);
        write_u32(&mut bytes, 8, HEADER_LEN as u32);
        write_u32(&mut bytes, 12, total);

        let base = HEADER_LEN;
        write_u32(&mut bytes, base, 0); // fail: root sentinel
        write_u16(&mut bytes, base + 4, 0); // depth
        write_u16(&mut bytes, base + 6, 2); // goto count
        bytes[base + 8] = STATE_TAG;
        bytes[base + 9] = b'a';
        bytes[base + 10] = b'c';
        let s = StateOfst(base as u32);
        let targets = StateBuffer::targets_at(s, 2);
        write_u32(&mut bytes, targets, 100);
        write_u32(&mut bytes, targets + 4, 200);

        let buf = StateBuffer::from_bytes(bytes.into_boxed_slice());
        assert_eq!(buf.magic(), BUFFER_MAGIC);
        assert_eq!(buf.root(), s);
        assert_eq!(buf.total_len() as usize, buf.len());
        assert_eq!(buf.depth(s), 0);
        assert_eq!(buf.goto_count(s), 2);
        assert!(!buf.is_terminal(s));
        assert_eq!(buf.keys(s), b"ac");
        assert_eq!(buf.find_goto(s, b'a'), Some(StateOfst(100)));
        assert_eq!(buf.find_goto(s, b'c'), Some(StateOfst(200)));
        assert_eq!(buf.find_goto(s, b'b'), None);
    }
}

//! aho-dense: multi-pattern substring search over a dense automaton buffer.
//!
//! Given a dictionary of byte patterns, [`AhoCorasick::new`] builds an
//! Aho-Corasick automaton and compacts it into one contiguous, immutable
//! buffer in which every state is a variable-length record addressed by byte
//! offset. [`AhoCorasick::find`] then scans an input in a single forward pass
//! and reports whether any dictionary pattern occurs as a substring.
//!
//! This is deliberately *not* a full multi-match reporter: a scan stops at
//! the first terminal state the forward walk reaches and returns that single
//! span. The reported substring is always a literal dictionary member, but it
//! is not necessarily the leftmost or shortest occurrence in the input.
//!
//! Match positions are 0-based byte indices and the span is inclusive on both
//! ends; [`Match::range`] converts to the half-open range Rust slicing wants.
//!
//! ```
//! use aho_dense::AhoCorasick;
//!
//! let ac = AhoCorasick::new(["he", "she", "his", "her"]).unwrap();
//!
//! let haystack = b"ushers";
//! let m = ac.find(haystack).unwrap();
//! assert_eq!(&haystack[m.range()], b"she");
//! assert_eq!((m.begin, m.end), (1, 3));
//!
//! assert!(ac.find(b"utopia").is_none());
//! ```
//!
//! The compiled automaton carries no mutable state, so one instance can serve
//! any number of concurrent scans:
//!
//! ```
//! use aho_dense::AhoCorasick;
//! use std::sync::Arc;
//!
//! let ac = Arc::new(AhoCorasick::new(["needle"]).unwrap());
//! let ac2 = Arc::clone(&ac);
//! let t = std::thread::spawn(move || ac2.find(b"a needle in a haystack").is_some());
//! assert!(t.join().unwrap());
//! assert!(ac.find(b"hayneedlestack").is_some());
//! ```
//!
//! For workloads that accumulate patterns over time, [`SharedAutomaton`]
//! wraps the same engine behind an atomically swappable handle: pattern
//! additions recompile under a lock while scans stay lock-free.

mod automaton;

pub use automaton::SharedAutomaton;

use std::fmt;
use std::ops::Range;

/// Errors that can occur while compiling a pattern dictionary.
///
/// All variants are build-time configuration errors; a scan that finds
/// nothing reports `None`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcError {
    /// The pattern set was empty.
    EmptyPatternSet,
    /// A pattern was the empty byte string, which cannot occur as a substring
    /// in any meaningful way for a first-match engine.
    EmptyPattern,
    /// A pattern exceeded the representable state depth (65,535 bytes).
    PatternTooLong { len: usize },
}

impl fmt::Display for AcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcError::EmptyPatternSet => write!(f, "empty pattern set"),
            AcError::EmptyPattern => write!(f, "empty pattern"),
            AcError::PatternTooLong { len } => {
                write!(f, "pattern of {} bytes exceeds the 65535-byte depth limit", len)
            }
        }
    }
}

impl std::error::Error for AcError {}

/// An inclusive byte span within a scanned input.
///
/// `begin` and `end` are 0-based indices of the first and last byte of the
/// matched substring; `end - begin + 1` always equals the length of the
/// dictionary pattern that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Index of the first byte of the match.
    pub begin: usize,
    /// Index of the last byte of the match (inclusive).
    pub end: usize,
}

impl Match {
    /// Length of the matched substring in bytes.
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    /// A match span is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The half-open range `begin..end + 1`, suitable for slicing.
    pub fn range(&self) -> Range<usize> {
        self.begin..self.end + 1
    }
}

/// A compiled, immutable multi-pattern substring searcher.
///
/// The searcher owns a single contiguous buffer holding the whole automaton;
/// dropping it releases exactly that buffer. It is `Send + Sync` and scans
/// never mutate it, so it can be shared freely (e.g. behind an `Arc`).
pub struct AhoCorasick {
    aut: automaton::DenseAutomaton,
}

impl AhoCorasick {
    /// Compile a dictionary of byte patterns into a searcher.
    ///
    /// Patterns are arbitrary byte strings; embedded zero bytes are ordinary
    /// pattern content. Duplicate patterns are harmless. Fails on an empty
    /// pattern set, an empty pattern, or a pattern longer than 65,535 bytes.
    pub fn new<I, P>(patterns: I) -> Result<AhoCorasick, AcError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let trie = automaton::Trie::build(patterns)?;
        Ok(AhoCorasick {
            aut: automaton::compact(&trie),
        })
    }

    /// Scan `haystack` and report the first match the forward walk reaches.
    ///
    /// Returns `None` when no dictionary pattern occurs in `haystack`. When a
    /// span is returned, the slice at [`Match::range`] is a literal member of
    /// the compiled dictionary.
    pub fn find(&self, haystack: &[u8]) -> Option<Match> {
        automaton::find(&self.aut, haystack)
    }

    /// Like [`find`](Self::find), but reports only the start index.
    ///
    /// Numerically consistent with `find`: whenever `find` returns a span,
    /// this returns that span's `begin`.
    pub fn find_begin(&self, haystack: &[u8]) -> Option<usize> {
        self.find(haystack).map(|m| m.begin)
    }

    /// Number of states in the compiled automaton, root included.
    pub fn state_count(&self) -> usize {
        self.aut.state_count()
    }

    /// Size in bytes of the compiled buffer.
    pub fn buffer_len(&self) -> usize {
        self.aut.buffer_len()
    }
}

impl fmt::Debug for AhoCorasick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AhoCorasick")
            .field("states", &self.state_count())
            .field("buffer_len", &self.buffer_len())
            .finish()
    }
}

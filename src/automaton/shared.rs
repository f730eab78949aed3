//! Thread-safe wrapper that rebuilds the automaton as patterns accumulate.
//!
//! The compiled automaton is immutable, which buys lock-free concurrent
//! scans but means growing the dictionary takes a recompile. This wrapper
//! packages that trade: the live automaton sits in an `ArcSwapOption` so
//! readers load it without locks, while pattern additions serialize on a
//! mutex, recompile the accumulated dictionary, and swap the result in
//! atomically. Scans running against the previous automaton finish on it
//! undisturbed; its buffer is freed when the last of them drops the `Arc`.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use super::buffer::DenseAutomaton;
use super::compact::compact;
use super::matcher::find;
use super::trie::Trie;
use crate::{AcError, Match};

/// Accumulated dictionary, protected by the build mutex.
struct BuildState {
    /// Patterns in insertion order; this is what gets compiled.
    patterns: Vec<Vec<u8>>,
    /// Dedup set - duplicate patterns are idempotent, so re-adding one
    /// should not trigger a rebuild.
    seen: FxHashSet<Vec<u8>>,
}

impl BuildState {
    fn new() -> Self {
        BuildState {
            patterns: Vec::new(),
            seen: FxHashSet::default(),
        }
    }
}

/// A substring searcher whose dictionary can grow over time.
///
/// `find` is lock-free and may be called concurrently from any number of
/// threads; `add_patterns` is serialized and atomically publishes a freshly
/// compiled automaton. Until the first successful `add_patterns`, every scan
/// reports no match.
///
/// ```
/// use aho_dense::SharedAutomaton;
///
/// let shared = SharedAutomaton::new();
/// assert!(shared.find(b"nothing compiled yet").is_none());
///
/// shared.add_patterns(["pot", "handle"]).unwrap();
/// let text = b"The pot had a handle";
/// let m = shared.find(text).unwrap();
/// assert_eq!(&text[m.range()], b"pot");
/// ```
pub struct SharedAutomaton {
    /// The live compiled automaton - atomically swappable, lock-free reads.
    current: ArcSwapOption<DenseAutomaton>,
    /// Serializes dictionary growth and recompilation.
    build_lock: Mutex<BuildState>,
}

impl SharedAutomaton {
    /// Create an empty searcher with no compiled automaton.
    pub fn new() -> Self {
        SharedAutomaton {
            current: ArcSwapOption::empty(),
            build_lock: Mutex::new(BuildState::new()),
        }
    }

    /// Add patterns to the dictionary and publish a recompiled automaton.
    ///
    /// Validation happens before the dictionary is touched, so a rejected
    /// batch leaves both the pattern list and the live automaton unchanged.
    /// A batch containing only already-known patterns is a no-op.
    pub fn add_patterns<I, P>(&self, patterns: I) -> Result<(), AcError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let incoming: Vec<Vec<u8>> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_vec())
            .collect();
        for pattern in &incoming {
            if pattern.is_empty() {
                return Err(AcError::EmptyPattern);
            }
            if pattern.len() > u16::MAX as usize {
                return Err(AcError::PatternTooLong {
                    len: pattern.len(),
                });
            }
        }

        let mut state = self.build_lock.lock();

        let mut added = false;
        for pattern in incoming {
            if state.seen.insert(pattern.clone()) {
                state.patterns.push(pattern);
                added = true;
            }
        }
        if !added {
            return Ok(());
        }

        let trie = Trie::build(state.patterns.iter())?;
        self.current.store(Some(Arc::new(compact(&trie))));
        Ok(())
    }

    /// Scan `haystack` against the most recently published automaton.
    pub fn find(&self, haystack: &[u8]) -> Option<Match> {
        let current = self.current.load();
        current.as_ref().and_then(|aut| find(aut, haystack))
    }

    /// Like [`find`](Self::find), but reports only the start index.
    pub fn find_begin(&self, haystack: &[u8]) -> Option<usize> {
        self.find(haystack).map(|m| m.begin)
    }

    /// Number of distinct patterns in the dictionary.
    pub fn pattern_count(&self) -> usize {
        self.build_lock.lock().patterns.len()
    }
}

impl Default for SharedAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

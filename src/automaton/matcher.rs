//! The matching walk over a compiled automaton.
//!
//! One forward pass over the input. For each byte, the current record's
//! sorted keys are binary-searched; a hit consumes the byte and moves to the
//! target record, a miss follows the failure link and retries the *same*
//! byte against the shallower record. Failure hops strictly decrease depth
//! and depth only grows by consuming a byte, so the hops amortize to O(1)
//! per input byte.
//!
//! Two deliberate departures from textbook Aho-Corasick:
//!
//! - while the walk sits at the root, bytes with no outgoing root transition
//!   are skipped through the precomputed charset bitmap without any lookup
//!   (an optimization only; results are identical without it)
//! - the scan stops at the *first* terminal record any transition lands on -
//!   including a failure hop - and reports that single span; it never keeps
//!   going to find a longer or later match
//!
//! The walk never mutates the buffer, so any number of scans may run
//! concurrently against one automaton.

use super::buffer::{DenseAutomaton, StateOfst};
use crate::Match;

/// Scan `haystack`, reporting the first match the forward walk reaches.
///
/// Positions are 0-based and the returned span is inclusive on both ends:
/// the matched pattern is `haystack[begin..=end]`.
pub(crate) fn find(aut: &DenseAutomaton, haystack: &[u8]) -> Option<Match> {
    aut.verify_tag();

    let buf = aut.buf();
    let root = aut.root();
    let charset = aut.root_charset();

    let mut cur = root;
    let mut i = 0usize; // next unconsumed byte

    while i < haystack.len() {
        if cur == root {
            // Fast-skip: no pattern can start on a byte the root has no
            // transition for.
            while i < haystack.len() && !charset.contains(haystack[i]) {
                i += 1;
            }
            if i == haystack.len() {
                return None;
            }
        }

        match buf.find_goto(cur, haystack[i]) {
            Some(next) => {
                cur = next;
                i += 1;
            }
            None => {
                if cur == root {
                    // The root accepts anything by ignoring it. Unreachable
                    // while the fast-skip runs, but the loop must stay
                    // correct without it.
                    i += 1;
                    continue;
                }
                // Retry the same byte one failure link up.
                let fail = buf.fail_link(cur);
                debug_assert_ne!(fail, StateOfst::NONE);
                debug_assert!(buf.depth(fail) < buf.depth(cur));
                cur = fail;
            }
        }

        // Either arm above landed on a record; a failure hop can land on a
        // terminal record too (a shorter pattern ending at the last consumed
        // byte), so the check sits after both.
        if buf.is_terminal(cur) {
            let pos = i - 1; // index of the last consumed byte
            let depth = buf.depth(cur) as usize;
            return Some(Match {
                begin: pos + 1 - depth,
                end: pos,
            });
        }
    }

    None
}

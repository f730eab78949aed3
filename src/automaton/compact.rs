//! One-way conversion from the build-time trie to the dense runtime buffer.
//!
//! Two forward passes over the trie's node enumeration:
//!
//! 1. size every record and assign each node its byte offset, starting after
//!    the reserved header so offset 0 stays the invalid sentinel
//! 2. serialize every record, resolving failure links and transition targets
//!    to the offsets assigned in pass 1
//!
//! The transition keys land in the buffer sorted ascending. That ordering is
//! mandatory, not cosmetic: the matcher binary-searches them. The trie keeps
//! children sorted already; a debug assertion guards the invariant anyway.
//!
//! A non-root node without a resolved failure link at this point is a trie
//! builder defect. It would corrupt every downstream offset, so it panics
//! rather than surfacing as a recoverable error.

use super::buffer::{
    record_size, write_u16, write_u32, DenseAutomaton, RootCharset, StateBuffer, StateOfst,
    BUFFER_MAGIC, HEADER_LEN, KEYS_AT, STATE_TAG, TERMINAL_BIT,
};
use super::trie::{NodeId, Trie};

/// Serialize a completed trie into a compiled automaton.
pub(crate) fn compact(trie: &Trie) -> DenseAutomaton {
    let nodes = trie.nodes();

    // Pass 1: assign offsets in enumeration order.
    let mut offsets: Vec<u32> = Vec::with_capacity(nodes.len());
    let mut total = HEADER_LEN;
    for node in nodes {
        offsets.push(total as u32);
        total += record_size(node.children.len());
    }

    let mut bytes = vec![0u8; total];
    write_u32(&mut bytes, 0, BUFFER_MAGIC);
    write_u32(&mut bytes, 4, nodes.len() as u32);
    write_u32(&mut bytes, 8, offsets[NodeId::ROOT.index()]);
    write_u32(&mut bytes, 12, total as u32);

    // Pass 2: write each record with links resolved to offsets.
    for (idx, node) in nodes.iter().enumerate() {
        let base = offsets[idx] as usize;

        let fail_ofst = if idx == NodeId::ROOT.index() {
            // The root's link is never followed; store the sentinel.
            StateOfst::NONE.0
        } else {
            let fail = node.fail.unwrap_or_else(|| {
                panic!("state {idx} reached compaction without a resolved failure link")
            });
            offsets[fail.index()]
        };

        write_u32(&mut bytes, base, fail_ofst);
        write_u16(&mut bytes, base + 4, node.depth);
        write_u16(&mut bytes, base + 6, node.children.len() as u16);
        bytes[base + 8] = STATE_TAG | if node.terminal { TERMINAL_BIT } else { 0 };

        let targets_at = StateBuffer::targets_at(StateOfst(offsets[idx]), node.children.len());
        for (i, &(byte, child)) in node.children.iter().enumerate() {
            debug_assert!(i == 0 || node.children[i - 1].0 < byte, "keys not ascending");
            bytes[base + KEYS_AT + i] = byte;
            write_u32(&mut bytes, targets_at + 4 * i, offsets[child.index()]);
        }
    }

    // Derived cache for the matcher's fast-skip: every byte with an outgoing
    // transition from the root.
    let mut root_charset = RootCharset::default();
    for &(byte, _) in &nodes[NodeId::ROOT.index()].children {
        root_charset.set(byte);
    }

    DenseAutomaton::new(
        StateBuffer::from_bytes(bytes.into_boxed_slice()),
        StateOfst(offsets[NodeId::ROOT.index()]),
        root_charset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(patterns: &[&[u8]]) -> DenseAutomaton {
        compact(&Trie::build(patterns.iter()).unwrap())
    }

    #[test]
    fn test_header() {
        let aut = compile(&[b"he", b"she", b"his", b"her"]);
        let buf = aut.buf();
        assert_eq!(buf.magic(), BUFFER_MAGIC);
        assert_eq!(buf.state_count(), 9);
        assert_eq!(buf.root(), StateOfst(HEADER_LEN as u32));
        assert_eq!(buf.total_len() as usize, buf.len());
    }

    #[test]
    fn test_root_record() {
        let aut = compile(&[b"he", b"she"]);
        let buf = aut.buf();
        let root = aut.root();
        assert_eq!(buf.depth(root), 0);
        assert!(!buf.is_terminal(root));
        assert_eq!(buf.fail_link(root), StateOfst::NONE);
        assert_eq!(buf.keys(root), b"hs");
    }

    #[test]
    fn test_walk_compiled_path() {
        let aut = compile(&[b"he", b"she", b"his", b"her"]);
        let buf = aut.buf();

        let s = buf.find_goto(aut.root(), b's').unwrap();
        let sh = buf.find_goto(s, b'h').unwrap();
        let she = buf.find_goto(sh, b'e').unwrap();
        assert_eq!(buf.depth(she), 3);
        assert!(buf.is_terminal(she));
        assert!(!buf.is_terminal(sh));

        // "she" fails to "he", which is itself terminal at depth 2
        let she_fail = buf.fail_link(she);
        assert_eq!(buf.depth(she_fail), 2);
        assert!(buf.is_terminal(she_fail));

        let h = buf.find_goto(aut.root(), b'h').unwrap();
        let he = buf.find_goto(h, b'e').unwrap();
        assert_eq!(she_fail, he);
    }

    #[test]
    fn test_all_offsets_aligned_and_in_bounds() {
        let aut = compile(&[b"he", b"she", b"his", b"her", b"str\0ing"]);
        let buf = aut.buf();

        let mut stack = vec![aut.root()];
        let mut seen = Vec::new();
        while let Some(s) = stack.pop() {
            if seen.contains(&s) {
                continue;
            }
            seen.push(s);
            assert_eq!(s.0 % 4, 0);
            assert!((s.0 as usize) >= HEADER_LEN);
            assert!((s.0 as usize) < buf.len());
            if s != aut.root() {
                let fail = buf.fail_link(s);
                assert_ne!(fail, StateOfst::NONE);
                assert!(buf.depth(fail) < buf.depth(s));
            }
            for &byte in buf.keys(s) {
                stack.push(buf.find_goto(s, byte).unwrap());
            }
        }
        assert_eq!(seen.len(), buf.state_count() as usize);
    }

    #[test]
    fn test_root_charset_matches_root_keys() {
        let aut = compile(&[b"he", b"she", b"str\0ing"]);
        let root_keys = aut.buf().keys(aut.root()).to_vec();
        for b in 0..=255u8 {
            assert_eq!(aut.root_charset().contains(b), root_keys.contains(&b));
        }
    }

    #[test]
    fn test_deterministic() {
        let patterns: &[&[u8]] = &[b"he", b"she", b"his", b"her"];
        let a = compile(patterns);
        let b = compile(patterns);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_single_pattern_sizes() {
        // "ab": root {a}, "a" {b}, "ab" {} -> 16 + 16 + 16 + 12
        let aut = compile(&[b"ab"]);
        assert_eq!(aut.buffer_len(), HEADER_LEN + 2 * record_size(1) + record_size(0));
        assert_eq!(aut.state_count(), 3);
    }
}

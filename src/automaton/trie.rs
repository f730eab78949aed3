//! Build-time trie construction and failure-link propagation.
//!
//! This is the "easy to construct" half of the two-phase design: an
//! arena-allocated prefix tree that exists only long enough to be compacted
//! into the dense runtime buffer. Performance here is not critical - it runs
//! once per dictionary - so the structures favor clarity.
//!
//! ## Key points:
//! - Arena allocation: all nodes live in a `Vec`, referenced by index
//! - Children kept as a sorted `SmallVec` of `(byte, index)` pairs; the
//!   compactor relies on this ordering when it emits transition keys
//! - Failure links computed breadth-first, so a node's link is resolved only
//!   after its parent's

use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::AcError;

/// Index into the trie arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the pattern trie, stored in an arena.
///
/// Uses SmallVec for children since most nodes have few of them.
#[derive(Default)]
pub(crate) struct TrieNode {
    /// Distance from the root; the root itself is 0.
    pub(crate) depth: u16,
    /// True if a complete pattern ends exactly at this node. A pattern that
    /// is a prefix of a longer one still marks its own node.
    pub(crate) terminal: bool,
    /// Children as (byte, index) pairs, kept sorted by byte.
    pub(crate) children: SmallVec<[(u8, NodeId); 4]>,
    /// Failure link: the deepest proper suffix of this node's path that is
    /// also a trie prefix. None until the BFS pass resolves it; stays None
    /// on the root, whose link is never followed.
    pub(crate) fail: Option<NodeId>,
}

/// The pattern trie: root plus a deterministic enumeration of every node.
///
/// Node enumeration order is arena insertion order, which is fixed for a
/// given pattern sequence; the compactor lays records out in that order.
pub(crate) struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    /// Build the trie for a pattern dictionary and resolve failure links.
    ///
    /// Duplicate patterns are idempotent: the second insertion walks existing
    /// nodes and re-marks an already-terminal node.
    pub(crate) fn build<I, P>(patterns: I) -> Result<Trie, AcError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut trie = Trie {
            nodes: vec![TrieNode::default()],
        };

        let mut inserted = 0usize;
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                return Err(AcError::EmptyPattern);
            }
            if pattern.len() > u16::MAX as usize {
                return Err(AcError::PatternTooLong {
                    len: pattern.len(),
                });
            }
            trie.insert(pattern);
            inserted += 1;
        }
        if inserted == 0 {
            return Err(AcError::EmptyPatternSet);
        }

        trie.propagate_fail_links();
        Ok(trie)
    }

    /// All nodes in enumeration order; index 0 is the root.
    pub(crate) fn nodes(&self) -> &[TrieNode] {
        &self.nodes
    }

    fn alloc(&mut self, depth: u16) -> NodeId {
        let idx = self.nodes.len();
        self.nodes.push(TrieNode {
            depth,
            ..TrieNode::default()
        });
        NodeId(idx as u32)
    }

    /// Find or create a child of `parent` on `byte`.
    fn get_or_create_child(&mut self, parent: NodeId, byte: u8, depth: u16) -> NodeId {
        let children = &self.nodes[parent.index()].children;
        match children.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let child = self.alloc(depth);
                self.nodes[parent.index()]
                    .children
                    .insert(pos, (byte, child));
                child
            }
        }
    }

    /// Walk/create the path for one pattern and mark its final node terminal.
    fn insert(&mut self, pattern: &[u8]) {
        let mut node = NodeId::ROOT;
        for (i, &byte) in pattern.iter().enumerate() {
            node = self.get_or_create_child(node, byte, (i + 1) as u16);
        }
        self.nodes[node.index()].terminal = true;
    }

    /// Child of `node` on `byte`, if present.
    fn child_of(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let children = &self.nodes[node.index()].children;
        children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|pos| children[pos].1)
    }

    /// Resolve every non-root node's failure link, breadth-first.
    ///
    /// Processing in non-decreasing depth order is load-bearing: a node's
    /// link derives from its parent's, which must already be resolved.
    fn propagate_fail_links(&mut self) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        // Depth-1 nodes can only fall back to the root.
        let root_children = self.nodes[NodeId::ROOT.index()].children.clone();
        for &(_, child) in &root_children {
            self.nodes[child.index()].fail = Some(NodeId::ROOT);
            queue.push_back(child);
        }

        while let Some(node) = queue.pop_front() {
            let parent_fail = self.nodes[node.index()]
                .fail
                .expect("BFS order guarantees the parent's failure link is resolved");
            let children = self.nodes[node.index()].children.clone();

            for (byte, child) in children {
                let mut f = parent_fail;
                let link = loop {
                    if let Some(next) = self.child_of(f, byte) {
                        break next;
                    }
                    if f == NodeId::ROOT {
                        break NodeId::ROOT;
                    }
                    f = self.nodes[f.index()]
                        .fail
                        .expect("failure links at shallower depth are already resolved");
                };
                self.nodes[child.index()].fail = Some(link);
                queue.push_back(child);
            }
        }
    }
}

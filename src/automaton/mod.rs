//! Aho-Corasick automaton engine
//!
//! This module implements the whole pipeline from pattern dictionary to
//! single-pass substring scan. The key components are:
//!
//! - `Trie`: build-time prefix tree with breadth-first failure-link
//!   propagation
//! - `DenseAutomaton`: the compiled form - one contiguous byte buffer of
//!   offset-addressed state records plus the root charset bitmap
//! - `find`: the matching walk (binary-search dispatch, failure-link retry,
//!   root fast-skip, first-terminal early return)
//!
//! # Module Organization
//!
//! - `trie`: build-time trie construction and failure links
//! - `buffer`: compiled record schema and bounds-checked accessors
//! - `compact`: one-way conversion from trie to compiled buffer
//! - `matcher`: the scan loop
//! - `shared`: thread-safe rebuildable wrapper (lock-free scans)

mod buffer;
mod compact;
mod matcher;
mod shared;
mod trie;

pub(crate) use buffer::DenseAutomaton;
pub(crate) use compact::compact;
pub(crate) use matcher::find;
pub(crate) use trie::Trie;

pub use shared::SharedAutomaton;

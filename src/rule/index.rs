//! FST-backed longest-prefix index.
//!
//! Keys are stored in a [`fst::Map`]; the value carries the rule's schedule
//! id shifted by one so that `0` means "no schedule". The map is immutable
//! once built, so a compiled index can be shared between threads freely.
//!
//! Suffix rules are inserted reversed (`example.com` -> `moc.elpmaxe`), which
//! turns "name ends with rule" into "reversed name starts with key".

use fst::raw::Output;
use fst::Map;
use std::collections::BTreeMap;

use crate::schedule::WindowId;
use crate::{Error, Result};

/// Collects keys before building a [`NameIndex`].
///
/// FST construction needs sorted, unique keys, so entries are staged in a
/// `BTreeMap`. Inserting the same key twice keeps the last schedule.
#[derive(Debug, Default)]
pub struct NameIndexBuilder {
    entries: BTreeMap<Vec<u8>, u64>,
}

impl NameIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a key with its optional schedule.
    pub fn insert(&mut self, key: &str, window: Option<WindowId>) {
        let value = window.map(|id| id as u64 + 1).unwrap_or(0);
        self.entries.insert(key.as_bytes().to_vec(), value);
    }

    /// Number of distinct keys staged so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the immutable index.
    pub fn build(self) -> Result<NameIndex> {
        let map = Map::from_iter(self.entries)
            .map_err(|e| Error::Index(format!("Failed to build FST: {}", e)))?;
        Ok(NameIndex { map })
    }
}

/// Immutable longest-prefix lookup over byte keys.
pub struct NameIndex {
    map: Map<Vec<u8>>,
}

impl NameIndex {
    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Find the longest key that is a prefix of `input` and whose schedule
    /// `accept` allows. Rejected keys give way to shorter ones.
    ///
    /// Returns the matched length in bytes and the key's schedule.
    pub fn longest_prefix<F>(&self, input: &[u8], accept: F) -> Option<(usize, Option<WindowId>)>
    where
        F: Fn(Option<WindowId>) -> bool,
    {
        let fst = self.map.as_fst();
        let mut node = fst.root();
        let mut out = Output::zero();
        let mut best = None;

        let mut consider = |len: usize, value: u64| {
            let window = decode_window(value);
            if accept(window) {
                best = Some((len, window));
            }
        };

        if node.is_final() {
            consider(0, out.cat(node.final_output()).value());
        }

        for (i, &byte) in input.iter().enumerate() {
            let Some(idx) = node.find_input(byte) else {
                break;
            };
            let transition = node.transition(idx);
            out = out.cat(transition.out);
            node = fst.node(transition.addr);
            if node.is_final() {
                consider(i + 1, out.cat(node.final_output()).value());
            }
        }

        best
    }
}

fn decode_window(value: u64) -> Option<WindowId> {
    value.checked_sub(1).map(|id| id as WindowId)
}

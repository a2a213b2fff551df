//! Byte-bounded LRU store
//!
//! Entries live in an arena-backed doubly-linked list ordered by recency
//! (head = most recently used). The index maps each key to its arena slot, so
//! lookup, move-to-front and removal are all O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::stats::StoreStats;
use crate::value::Value;

/// Callback invoked with every entry evicted for exceeding the byte budget
pub type EvictionCallback<K, V> = Box<dyn FnMut(K, V) + Send>;

/// Node in the recency list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU store bounded by the total byte-cost of its entries
///
/// Every entry costs `key.as_ref().len() + value.len()` bytes. Whenever an
/// [`add`](LruStore::add) pushes the total above `max_bytes`, entries are
/// evicted from the least recently used end until it fits again. A
/// `max_bytes` of `0` means unbounded.
///
/// The store is single-owner: all mutating calls, including
/// [`get`](LruStore::get), take `&mut self`. Wrap it in a lock for shared use.
pub struct LruStore<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    max_bytes: usize,
    used_bytes: usize,
    on_evicted: Option<EvictionCallback<K, V>>,
    stats: StoreStats,
}

impl<K, V> LruStore<K, V>
where
    K: Hash + Eq + Clone + AsRef<[u8]>,
    V: Value,
{
    /// Create an empty store with the given byte budget (`0` = unbounded)
    pub fn new(max_bytes: usize) -> Self {
        Self::build(max_bytes, None)
    }

    /// Create an empty store that reports capacity evictions to `on_evicted`
    pub fn with_eviction_callback<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(K, V) + Send + 'static,
    {
        Self::build(max_bytes, Some(Box::new(on_evicted)))
    }

    /// Create an empty store from a loaded [`StoreConfig`]
    pub fn from_config(config: StoreConfig, on_evicted: Option<EvictionCallback<K, V>>) -> Self {
        Self::build(config.max_bytes, on_evicted)
    }

    fn build(max_bytes: usize, on_evicted: Option<EvictionCallback<K, V>>) -> Self {
        debug!(
            "Creating LRU store: max_bytes={}, eviction callback={}",
            max_bytes,
            on_evicted.is_some()
        );

        Self {
            map: HashMap::with_hasher(RandomState::new()),
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
            max_bytes,
            used_bytes: 0,
            on_evicted,
            stats: StoreStats::new(),
        }
    }

    /// Insert or replace a value, then evict until the byte budget holds
    ///
    /// An entry that alone exceeds `max_bytes` is evicted by its own add,
    /// leaving the store empty.
    pub fn add(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                let old = std::mem::replace(&mut node.value, value);
                self.used_bytes = self.used_bytes - old.len() + node.value.len();
            }
            self.move_to_front(idx);
            self.stats.record_update();
        } else {
            self.used_bytes += charge(&key, &value);

            let idx = self.alloc_node();
            self.nodes[idx] = Some(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
            self.map.insert(key, idx);
            self.stats.record_insert();
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes && !self.is_empty() {
            self.remove_oldest();
        }

        if self.max_bytes != 0 && self.is_empty() {
            debug!(
                "Entry exceeded max_bytes={} on its own and was evicted",
                self.max_bytes
            );
        }
    }

    /// Look up a value and mark it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key) {
            Some(&idx) => {
                self.stats.record_hit();
                self.move_to_front(idx);
                self.nodes[idx].as_ref().map(|node| &node.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Look up a value without touching its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Check for a key without touching its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Evict the least recently used entry, if any
    ///
    /// The eviction callback runs after the entry is fully detached.
    pub fn remove_oldest(&mut self) {
        let Some(tail_idx) = self.tail else {
            return;
        };
        let Some(node) = self.detach(tail_idx) else {
            return;
        };
        self.map.remove(&node.key);
        self.stats.record_eviction();

        trace!(
            "Evicted entry of {} bytes, {} bytes still in use",
            charge(&node.key, &node.value),
            self.used_bytes
        );

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(node.key, node.value);
        }
    }

    /// Remove a key without invoking the eviction callback
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        self.detach(idx).map(|node| node.value)
    }

    /// Drop every entry without invoking the eviction callback
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.used_bytes = 0;
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bytes currently charged against the budget
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Configured byte budget (`0` = unbounded)
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Usage counters
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Zero the usage counters
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Iterate from most to least recently used without touching recency
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.head,
            remaining: self.len(),
        }
    }

    /// Unlink a node, release its slot and uncharge it. The index is left alone.
    fn detach(&mut self, idx: usize) -> Option<Node<K, V>> {
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free_list.push(idx);
        self.used_bytes -= charge(&node.key, &node.value);
        Some(node)
    }

    fn push_front(&mut self, idx: usize) {
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

impl<K, V> fmt::Debug for LruStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.map.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn charge<K: AsRef<[u8]>, V: Value>(key: &K, value: &V) -> usize {
    key.as_ref().len() + value.len()
}

/// Iterator over store entries, most recently used first
pub struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes[self.next?].as_ref()?;
        self.next = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LruStore<K, V>
where
    K: Hash + Eq + Clone + AsRef<[u8]>,
    V: Value,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! Subscription trie
//!
//! `SubscriptionTrie` maps subscribed topic prefixes to reference counts. A
//! message matches when any prefix of its topic (the empty prefix included)
//! has a live subscription, so a lookup costs one child-map probe per topic
//! byte no matter how many subscriptions are stored.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to their children by index.
//! Removing the last reference to a prefix only deactivates its node; the
//! structure is reclaimed later by [`SubscriptionTrie::prune`], which returns
//! dead leaf chains to a free list reused by subsequent adds.

use std::collections::HashMap;

const ROOT: usize = 0;

#[derive(Debug, Default, Clone)]
struct Node {
    children: HashMap<u8, usize>,
    /// Subscribe calls for exactly the prefix ending at this node.
    count: u32,
}

/// Result of [`SubscriptionTrie::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// One reference was dropped; `remaining` references to the same prefix are left.
    Removed { remaining: u32 },
    /// The prefix had no live subscription. Nothing was changed.
    NotFound,
}

#[derive(Debug, Clone)]
pub struct SubscriptionTrie {
    nodes: Vec<Node>,
    free: Vec<usize>,
    /// Distinct prefixes with a count of at least one.
    active: usize,
}

impl Default for SubscriptionTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            free: Vec::new(),
            active: 0,
        }
    }

    /// Add one reference to `topic`. Returns `true` when this call activated
    /// the prefix (its count went from 0 to 1).
    pub fn add(&mut self, topic: &[u8]) -> bool {
        let mut idx = ROOT;
        for &byte in topic {
            idx = match self.nodes[idx].children.get(&byte) {
                Some(&child) => child,
                None => {
                    let child = self.alloc();
                    self.nodes[idx].children.insert(byte, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[idx];
        node.count = node
            .count
            .checked_add(1)
            .expect("subscription refcount overflow");
        let activated = node.count == 1;
        if activated {
            self.active += 1;
        }
        activated
    }

    /// Drop one reference to `topic`.
    pub fn remove(&mut self, topic: &[u8]) -> Removal {
        let Some(idx) = self.find(topic) else {
            return Removal::NotFound;
        };

        let node = &mut self.nodes[idx];
        if node.count == 0 {
            return Removal::NotFound;
        }
        node.count -= 1;
        let remaining = node.count;
        if remaining == 0 {
            self.active = self
                .active
                .checked_sub(1)
                .expect("active subscription count underflow");
        }
        Removal::Removed { remaining }
    }

    /// Whether any live subscription is a prefix of `message`.
    pub fn matches(&self, message: &[u8]) -> bool {
        let mut node = &self.nodes[ROOT];
        if node.count > 0 {
            return true;
        }
        for byte in message {
            match node.children.get(byte) {
                Some(&child) => {
                    node = &self.nodes[child];
                    if node.count > 0 {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }

    /// References held for exactly `topic`.
    pub fn count(&self, topic: &[u8]) -> u32 {
        self.find(topic).map_or(0, |idx| self.nodes[idx].count)
    }

    /// Number of distinct live prefixes.
    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Nodes currently allocated, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Every live prefix with its reference count, sorted by topic bytes.
    pub fn subscriptions(&self) -> Vec<(Vec<u8>, u32)> {
        let mut out = Vec::with_capacity(self.active);
        let mut stack = vec![(ROOT, Vec::new())];
        while let Some((idx, prefix)) = stack.pop() {
            let node = &self.nodes[idx];
            for (&byte, &child) in &node.children {
                let mut next = prefix.clone();
                next.push(byte);
                stack.push((child, next));
            }
            if node.count > 0 {
                out.push((prefix, node.count));
            }
        }
        out.sort();
        out
    }

    /// Reclaim nodes that hold no subscription and have no descendants.
    /// Returns the number of nodes freed. Matching results are unchanged.
    pub fn prune(&mut self) -> usize {
        // Pre-order edge list; walking it backwards visits children before parents.
        let mut edges = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(idx) = stack.pop() {
            for (&byte, &child) in &self.nodes[idx].children {
                edges.push((idx, byte, child));
                stack.push(child);
            }
        }

        let mut freed = 0;
        for &(parent, byte, child) in edges.iter().rev() {
            let node = &self.nodes[child];
            if node.count == 0 && node.children.is_empty() {
                self.nodes[parent].children.remove(&byte);
                self.release(child);
                freed += 1;
            }
        }
        freed
    }

    /// Drop every subscription and node.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn find(&self, topic: &[u8]) -> Option<usize> {
        let mut idx = ROOT;
        for byte in topic {
            idx = *self.nodes[idx].children.get(byte)?;
        }
        Some(idx)
    }

    fn alloc(&mut self) -> usize {
        match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.nodes.push(Node::default());
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        debug_assert_ne!(idx, ROOT, "the root node is never released");
        self.nodes[idx] = Node::default();
        self.free.push(idx);
    }
}

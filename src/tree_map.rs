#![warn(missing_docs)]
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::{replace, swap};
use tracing::{debug, trace};

use crate::compare::{Comparator, LessThan, Natural};
use crate::error::TreeMapError;

// Index of a slot in the node arena.  Ids stay valid until the node they name
// is erased; the slot is then recycled by a later insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    val: V,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

// Outcome of a descent from the root looking for a key.
enum Probe {
    Found(NodeId),
    // The empty child slot where the key belongs; None for an empty tree.
    Vacant(Option<(NodeId, Side)>),
}

/// A map from keys to values, sorted by a caller-supplied comparator.
///
/// The map is a plain (unbalanced) binary search tree.  Nodes live in an
/// arena and refer to their parent and children by index, so the map can walk
/// upwards as cheaply as downwards.  Inserting keys in sorted order produces a
/// degenerate tree with O(n) operations; no rebalancing is ever attempted.
///
/// Besides the usual map operations, the map keeps a *cursor*: the node most
/// recently touched by [`insert`](#method.insert), [`search`](#method.search),
/// [`first`](#method.first), [`last`](#method.last) or
/// [`next`](#method.next).  Calling `next` resumes an in-order walk from the
/// cursor without searching from the root again.  Every call to
/// [`erase`](#method.erase) clears the cursor.
///
/// The map owns whatever `K` and `V` are.  To keep only references to data
/// owned elsewhere, use reference types such as `TreeMap<&str, &Record, _>`;
/// erasing an entry then hands the references back and frees nothing of the
/// caller's.
///
/// # Examples
/// ```
/// use cursor_bst::TreeMap;
///
/// let mut m = TreeMap::new();
/// for k in [10, 20, 30] {
///     m.insert(k, k * 100);
/// }
///
/// assert_eq!(m.search(&20), Some((&20, &2000)));
/// assert_eq!(m.next(), Some((&30, &3000)));
/// assert_eq!(m.next(), None);
/// ```
#[derive(Clone)]
pub struct TreeMap<K, V, C = Natural> {
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    cursor: Option<NodeId>,
    len: usize,
    cmp: C,
}

// Structural helpers.  None of these consult the comparator.
impl<K, V, C> TreeMap<K, V, C> {
    fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.nodes[id.0] {
            Some(n) => n,
            None => panic!("Dangling node id {}", id.0),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.nodes[id.0] {
            Some(n) => n,
            None => panic!("Dangling node id {}", id.0),
        }
    }

    fn pair(&self, id: NodeId) -> (&K, &V) {
        let n = self.node(id);
        (&n.key, &n.val)
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(lf) = self.node(id).left {
            id = lf;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(rt) = self.node(id).right {
            id = rt;
        }
        id
    }

    // The in-order successor: the leftmost node of the right subtree if there
    // is one, else the nearest ancestor reached from its left side.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(rt) = self.node(id).right {
            return Some(self.leftmost(rt));
        }

        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            let n = self.node(p);
            if n.left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = n.parent;
        }

        None
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                trace!(slot = id.0, "reusing vacant node slot");
                self.nodes[id.0] = Some(node);
                id
            }

            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    // Hangs a fresh node in the slot found by a failed probe.
    fn attach(&mut self, link: Option<(NodeId, Side)>, key: K, val: V) -> NodeId {
        let id = self.alloc(Node {
            key,
            val,
            parent: link.map(|(p, _)| p),
            left: None,
            right: None,
        });

        match link {
            None => self.root = Some(id),
            Some((p, Side::Left)) => self.node_mut(p).left = Some(id),
            Some((p, Side::Right)) => self.node_mut(p).right = Some(id),
        }

        trace!(node = id.0, parent = ?link.map(|(p, _)| p.0), "attached node");
        self.len += 1;
        self.cursor = Some(id);
        id
    }

    // Points whichever link of `parent` referred to `old` at `new` instead.
    // With no parent, `old` was the root.
    fn relink(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let n = self.node_mut(p);
                if n.left == Some(old) {
                    n.left = new;
                } else {
                    n.right = new;
                }
            }
        }
    }

    // Detaches node `id` from the tree and returns its pair.
    //
    // A node with two children keeps its place in the tree: it trades pairs
    // with its in-order successor, which has no left child, and the successor
    // is unlinked instead.
    fn unlink(&mut self, id: NodeId) -> (K, V) {
        let n = self.node(id);
        match (n.left, n.right) {
            (Some(_), Some(rt)) => {
                let succ = self.leftmost(rt);
                trace!(node = id.0, successor = succ.0, "moving successor pair");

                let mut donor = match self.nodes[succ.0].take() {
                    Some(s) => s,
                    None => panic!("Dangling node id {}", succ.0),
                };
                let n = self.node_mut(id);
                swap(&mut n.key, &mut donor.key);
                swap(&mut n.val, &mut donor.val);
                self.nodes[succ.0] = Some(donor);

                self.unlink(succ)
            }

            (child, None) | (None, child) => {
                let parent = n.parent;
                if let Some(c) = child {
                    self.node_mut(c).parent = parent;
                }
                self.relink(parent, id, child);
                trace!(node = id.0, child = ?child.map(|c| c.0), "spliced out node");
                self.release(id)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> (K, V) {
        let n = match self.nodes[id.0].take() {
            Some(n) => n,
            None => panic!("Dangling node id {}", id.0),
        };
        self.len -= 1;

        if self.len == 0 {
            // nothing is reachable, so every slot is vacant
            self.nodes.clear();
            self.free.clear();
        } else {
            self.free.push(id);
        }

        (n.key, n.val)
    }

    /// Creates an empty map ordered by `cmp`.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    ///
    /// let mut m = TreeMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// m.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
    /// assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    /// Creates an empty map ordered by `cmp` with room for `capacity` entries
    /// before the node arena needs to grow.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        TreeMap {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            cursor: None,
            len: 0,
            cmp,
        }
    }

    /// Creates an empty map from an optional comparator.
    ///
    /// Fails with [`TreeMapError::MissingComparator`] when `cmp` is `None`.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::{Natural, TreeMap, TreeMapError};
    ///
    /// let m = TreeMap::<u8, u8, Natural>::try_with_comparator(None);
    /// assert_eq!(m.err(), Some(TreeMapError::MissingComparator));
    /// ```
    pub fn try_with_comparator(cmp: Option<C>) -> Result<Self, TreeMapError> {
        match cmp {
            Some(cmp) => Ok(Self::with_comparator(cmp)),
            None => {
                debug!("refusing to create a tree map without a comparator");
                Err(TreeMapError::MissingComparator)
            }
        }
    }

    /// Reserves arena space for at least `additional` more entries.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TreeMapError> {
        let spare = self.free.len();
        if additional > spare {
            self.nodes.try_reserve(additional - spare).map_err(|e| {
                debug!(additional, "node arena reservation failed");
                e
            })?;
        }
        Ok(())
    }

    /// Drops all entries and clears the cursor.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.cursor = None;
        self.len = 0;
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entry with the least key and moves the cursor onto it, so
    /// that [`next`](#method.next) continues from there.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    ///
    /// let mut m: TreeMap<_, _> = [(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    /// let mut seen = Vec::new();
    /// let mut e = m.first().map(|(k, _)| *k);
    /// while let Some(k) = e {
    ///     seen.push(k);
    ///     e = m.next().map(|(k, _)| *k);
    /// }
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    pub fn first(&mut self) -> Option<(&K, &V)> {
        self.cursor = self.root.map(|r| self.leftmost(r));
        self.cursor.map(|id| self.pair(id))
    }

    /// Returns the entry with the greatest key and moves the cursor onto it.
    pub fn last(&mut self) -> Option<(&K, &V)> {
        self.cursor = self.root.map(|r| self.rightmost(r));
        self.cursor.map(|id| self.pair(id))
    }

    /// Advances the cursor to the next greater key and returns that entry.
    ///
    /// Returns `None` and clears the cursor when the cursor was on the greatest
    /// key.  Returns `None` when there is no cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &V)> {
        let curr = self.cursor?;
        self.cursor = self.successor(curr);
        self.cursor.map(|id| self.pair(id))
    }

    /// Returns the entry under the cursor without moving it.
    pub fn current(&self) -> Option<(&K, &V)> {
        self.cursor.map(|id| self.pair(id))
    }

    /// Forgets the cursor position.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Returns the entry with the least key.  The cursor does not move.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.pair(self.leftmost(r)))
    }

    /// Returns the entry with the greatest key.  The cursor does not move.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.pair(self.rightmost(r)))
    }

    /// Creates an iterator over the entries, sorted by key.
    ///
    /// The iterator follows parent links and does not disturb the cursor.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            map: self,
            next: self.root.map(|r| self.leftmost(r)),
            len: self.len,
        }
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Verifies the structure of the tree.
    ///
    /// Checks that parent and child links agree, that keys ascend strictly in
    /// order, that the entry count is right, that every arena slot is either
    /// reachable or recyclable, and that the cursor names a live node.
    pub fn check(&self) -> Result<(), TreeMapError>
    where
        C: Comparator<K>,
    {
        let broken = |msg: String| Err(TreeMapError::BrokenInvariant(msg));
        let slot = |id: NodeId| self.nodes.get(id.0).and_then(Option::as_ref);

        let mut reached = 0;
        let mut work = Vec::new();
        if let Some(r) = self.root {
            match slot(r) {
                None => return broken(format!("root {} is vacant", r.0)),
                Some(n) if n.parent.is_some() => {
                    return broken(format!("root {} has a parent", r.0))
                }
                Some(_) => work.push(r),
            }
        }

        while let Some(id) = work.pop() {
            reached += 1;
            if reached > self.nodes.len() {
                return broken("links form a cycle".to_string());
            }

            let n = self.node(id);
            for child in [n.left, n.right].into_iter().flatten() {
                match slot(child) {
                    None => {
                        return broken(format!(
                            "node {} links to vacant slot {}",
                            id.0, child.0
                        ))
                    }
                    Some(c) if c.parent != Some(id) => {
                        return broken(format!(
                            "node {} does not point back to its parent {}",
                            child.0, id.0
                        ))
                    }
                    Some(_) => work.push(child),
                }
            }
        }

        if reached != self.len {
            return broken(format!("{} nodes reachable, len is {}", reached, self.len));
        }

        let live = self.nodes.iter().filter(|s| s.is_some()).count();
        if live != reached {
            return broken(format!("{} live slots, {} reachable", live, reached));
        }

        if self.free.len() + live != self.nodes.len()
            || self.free.iter().any(|&id| slot(id).is_some())
        {
            return broken("free list disagrees with the arena".to_string());
        }

        if let Some(c) = self.cursor {
            if slot(c).is_none() {
                return broken(format!("cursor names vacant slot {}", c.0));
            }
        }

        let mut keys = self.keys();
        if let Some(mut prev) = keys.next() {
            for k in keys {
                if self.cmp.compare(prev, k) != Less {
                    return broken("keys out of order".to_string());
                }
                prev = k;
            }
        }

        Ok(())
    }
}

impl<K, V, C: Comparator<K>> TreeMap<K, V, C> {
    fn probe(&self, key: &K) -> Probe {
        let mut link = None;
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = self.node(id);
            match self.cmp.compare(key, &n.key) {
                Less => {
                    link = Some((id, Side::Left));
                    curr = n.left;
                }
                Equal => return Probe::Found(id),
                Greater => {
                    link = Some((id, Side::Right));
                    curr = n.right;
                }
            }
        }

        Probe::Vacant(link)
    }

    /// Inserts a key-value pair in the map and moves the cursor onto it.
    ///
    /// If the key was already present, only the value is replaced (the stored
    /// key is kept) and the old value is returned.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    ///
    /// let mut m = TreeMap::new();
    /// assert_eq!(m.insert(7, "a"), None);
    /// assert_eq!(m.insert(7, "b"), Some("a"));
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        match self.probe(&key) {
            Probe::Found(id) => {
                self.cursor = Some(id);
                Some(replace(&mut self.node_mut(id).val, val))
            }

            Probe::Vacant(link) => {
                self.attach(link, key, val);
                None
            }
        }
    }

    /// Like [`insert`](#method.insert), but reports a failure to grow the node
    /// arena instead of aborting.  On failure the map is unchanged.
    pub fn try_insert(&mut self, key: K, val: V) -> Result<Option<V>, TreeMapError> {
        match self.probe(&key) {
            Probe::Found(id) => {
                self.cursor = Some(id);
                Ok(Some(replace(&mut self.node_mut(id).val, val)))
            }

            Probe::Vacant(link) => {
                self.try_reserve(1)?;
                self.attach(link, key, val);
                Ok(None)
            }
        }
    }

    /// Looks up `key` and moves the cursor onto its entry.
    ///
    /// A failed search leaves the cursor where it was.
    pub fn search(&mut self, key: &K) -> Option<(&K, &V)> {
        match self.probe(key) {
            Probe::Found(id) => {
                self.cursor = Some(id);
                Some(self.pair(id))
            }
            Probe::Vacant(_) => None,
        }
    }

    /// Returns the entry with the least key that is not less than `key`.
    ///
    /// The cursor does not move.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    ///
    /// let m: TreeMap<_, _> = [(10, ()), (20, ()), (30, ())].into_iter().collect();
    /// assert_eq!(m.upper_bound(&15).map(|e| *e.0), Some(20));
    /// assert_eq!(m.upper_bound(&20).map(|e| *e.0), Some(20));
    /// assert_eq!(m.upper_bound(&31), None);
    /// ```
    pub fn upper_bound(&self, key: &K) -> Option<(&K, &V)> {
        let mut best = None;
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = self.node(id);
            match self.cmp.compare(&n.key, key) {
                Less => curr = n.right,
                Equal => return Some((&n.key, &n.val)),
                Greater => {
                    best = Some(id);
                    curr = n.left;
                }
            }
        }

        best.map(|id| self.pair(id))
    }

    /// Removes `key` from the map and returns the removed entry.
    ///
    /// Every call clears the cursor, whether or not anything was removed.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    ///
    /// let mut m: TreeMap<_, _> = [(1, 'a'), (2, 'b')].into_iter().collect();
    /// assert_eq!(m.erase(&1), Some((1, 'a')));
    /// assert_eq!(m.erase(&1), None);
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn erase(&mut self, key: &K) -> Option<(K, V)> {
        self.cursor = None;
        match self.probe(key) {
            Probe::Found(id) => Some(self.unlink(id)),
            Probe::Vacant(_) => None,
        }
    }

    /// Removes `key` from the map and returns its value.  Clears the cursor.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.erase(key).map(|e| e.1)
    }

    /// Returns a reference to the value associated with `key`.  The cursor
    /// does not move.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|e| e.1)
    }

    /// Returns the stored key and value for `key`.  The cursor does not move.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        match self.probe(key) {
            Probe::Found(id) => Some(self.pair(id)),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.probe(key) {
            Probe::Found(id) => Some(&mut self.node_mut(id).val),
            Probe::Vacant(_) => None,
        }
    }

    /// Tests if the map contains an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        matches!(self.probe(key), Probe::Found(_))
    }
}

impl<K: Ord, V> TreeMap<K, V> {
    /// Creates a new, empty map ordered by `K`'s [`Ord`] implementation.
    ///
    /// # Examples
    /// ```
    /// use cursor_bst::TreeMap;
    /// let m: TreeMap<usize, usize> = TreeMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, F> TreeMap<K, V, LessThan<F>>
where
    F: Fn(&K, &K) -> bool,
{
    /// Creates an empty map ordered by a strict less-than predicate.
    pub fn from_less_than(lt: F) -> Self {
        Self::with_comparator(LessThan(lt))
    }
}

impl<K, V, C: Default> Default for TreeMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Debug, V: Debug, C> Debug for TreeMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for TreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for TreeMap<K, V, C> {}

impl<K, V, C: Comparator<K>> std::ops::Index<&K> for TreeMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &Self::Output {
        match self.get(key) {
            Some(v) => v,
            None => panic!("Key not found in TreeMap"),
        }
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for TreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = TreeMap::new();
        m.extend(iter);
        m
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        TreeMap::from_iter(vs)
    }
}

impl<'a, K, V, C> IntoIterator for &'a TreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over the entries of a [`TreeMap`].
pub struct Iter<'a, K, V, C> {
    map: &'a TreeMap<K, V, C>,
    next: Option<NodeId>,
    len: usize,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.map.successor(id);
        self.len -= 1;
        Some(self.map.pair(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V, C> ExactSizeIterator for Iter<'a, K, V, C> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V, C> FusedIterator for Iter<'a, K, V, C> {}

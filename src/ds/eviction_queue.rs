//! Slab-backed eviction queue with stable cursors.
//!
//! Stores the cache's eviction order as a doubly linked list whose nodes
//! live in a `Vec<Option<Node>>` slab and are linked by integer [`Cursor`]
//! handles. Freed slots are recycled through a free list, so cursors stay
//! valid across unrelated insertions and removals and no per-node heap
//! allocation is needed.
//!
//! ## Architecture
//!
//! ```text
//!   slots: Vec<Option<Node<K>>>          free_list = [1]
//!
//!   index: 0                1     2                3
//!          [key_a]         [ ]   [key_b]          [key_c]
//!
//!   head ─► [0] ◄──► [2] ◄──► [3] ◄── tail
//!           next victim        most recent arrival
//! ```
//!
//! The front of the queue is the next eviction victim; `push_back` and
//! `move_to_back` place fresh arrivals and refreshed entries at the tail.
//!
//! ## Operations
//! - `push_back` / `pop_front` / `pop_back`: O(1)
//! - `remove(cursor)` / `move_to_back(cursor)`: O(1)
//! - `iter`: O(n), front to back
//!
//! [`QueueProctor`] provides scoped rollback of trailing `push_back` calls
//! for insert paths that can unwind between the queue append and the
//! matching index update.

/// Stable handle to a key's position in an [`EvictionQueue`].
///
/// A `Cursor` remains valid until the position it refers to is removed;
/// after removal the slot index may be recycled by a later `push_back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor(usize);

impl Cursor {
    /// Returns the underlying slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<Cursor>,
    next: Option<Cursor>,
}

/// Ordered sequence of keys giving eviction precedence (front = next victim).
#[derive(Debug)]
pub struct EvictionQueue<K> {
    slots: Vec<Option<Node<K>>>,
    free_list: Vec<usize>,
    head: Option<Cursor>,
    tail: Option<Cursor>,
    len: usize,
}

impl<K> EvictionQueue<K> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty queue with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of keys in the queue.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the key at the front (the next eviction victim).
    pub fn front(&self) -> Option<&K> {
        self.head.and_then(|id| self.node(id)).map(|node| &node.key)
    }

    /// Returns the key at the back (the most recent arrival).
    pub fn back(&self) -> Option<&K> {
        self.tail.and_then(|id| self.node(id)).map(|node| &node.key)
    }

    /// Returns the key at `cursor`, if the position is live.
    pub fn get(&self, cursor: Cursor) -> Option<&K> {
        self.node(cursor).map(|node| &node.key)
    }

    /// Returns `true` if `cursor` refers to a live position.
    pub fn contains(&self, cursor: Cursor) -> bool {
        self.node(cursor).is_some()
    }

    /// Returns `true` if `cursor` is the back of the queue.
    pub fn is_back(&self, cursor: Cursor) -> bool {
        self.tail == Some(cursor) && self.contains(cursor)
    }

    /// Appends a key at the back and returns its cursor.
    pub fn push_back(&mut self, key: K) -> Cursor {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let slot = match self.free_list.pop() {
            Some(recycled) => {
                self.slots[recycled] = Some(node);
                recycled
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        let id = Cursor(slot);
        self.attach_back(id);
        self.len += 1;
        id
    }

    /// Removes and returns the front key.
    pub fn pop_front(&mut self) -> Option<K> {
        let id = self.head?;
        self.remove(id)
    }

    /// Removes and returns the back key.
    pub fn pop_back(&mut self) -> Option<K> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Removes the position at `cursor` and returns its key.
    pub fn remove(&mut self, cursor: Cursor) -> Option<K> {
        self.detach(cursor)?;
        let node = self.slots.get_mut(cursor.0)?.take()?;
        self.free_list.push(cursor.0);
        self.len -= 1;
        Some(node.key)
    }

    /// Moves a live position to the back; returns `false` if `cursor` is
    /// not present. Moving the current back is a no-op that still returns
    /// `true`.
    pub fn move_to_back(&mut self, cursor: Cursor) -> bool {
        if self.detach(cursor).is_none() {
            return false;
        }
        self.attach_back(cursor);
        true
    }

    /// Drops all positions and resets internal state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates keys from front (next victim) to back.
    pub fn iter(&self) -> QueueIter<'_, K> {
        QueueIter {
            queue: self,
            current: self.head,
        }
    }

    /// Iterates `(cursor, key)` pairs from front to back.
    pub fn cursors(&self) -> impl Iterator<Item = (Cursor, &K)> {
        CursorIter {
            queue: self,
            current: self.head,
        }
    }

    fn node(&self, id: Cursor) -> Option<&Node<K>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: Cursor) -> Option<&mut Node<K>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Splices `left` and `right` together as forward/backward neighbors.
    /// `None` on either side stands for the corresponding end of the list,
    /// so this single primitive also maintains `head` and `tail`.
    fn link(&mut self, left: Option<Cursor>, right: Option<Cursor>) {
        match left {
            Some(id) => {
                if let Some(node) = self.node_mut(id) {
                    node.next = right;
                }
            }
            None => self.head = right,
        }
        match right {
            Some(id) => {
                if let Some(node) = self.node_mut(id) {
                    node.prev = left;
                }
            }
            None => self.tail = left,
        }
    }

    /// Strips the node's own links and splices its former neighbors
    /// together. The slot stays allocated; callers re-link or free it.
    fn detach(&mut self, id: Cursor) -> Option<()> {
        let node = self.node_mut(id)?;
        let former_prev = node.prev.take();
        let former_next = node.next.take();
        self.link(former_prev, former_next);
        Some(())
    }

    fn attach_back(&mut self, id: Cursor) {
        self.link(self.tail, Some(id));
        self.link(Some(id), None);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let live_count = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(self.len, live_count);
        assert_eq!(self.slots.len(), self.free_list.len() + self.len);
        for &idx in &self.free_list {
            assert!(idx < self.slots.len());
            assert!(self.slots[idx].is_none());
        }

        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            let node = self.node(id).expect("linked node missing from slab");
            assert_eq!(node.prev, prev);
            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len, "cycle detected in queue links");
        }
        assert_eq!(self.tail, prev);
        assert_eq!(count, self.len);
    }
}

impl<K> Default for EvictionQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back key iterator over an [`EvictionQueue`].
pub struct QueueIter<'a, K> {
    queue: &'a EvictionQueue<K>,
    current: Option<Cursor>,
}

impl<'a, K> Iterator for QueueIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.queue.node(id)?;
        self.current = node.next;
        Some(&node.key)
    }
}

struct CursorIter<'a, K> {
    queue: &'a EvictionQueue<K>,
    current: Option<Cursor>,
}

impl<'a, K> Iterator for CursorIter<'a, K> {
    type Item = (Cursor, &'a K);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.queue.node(id)?;
        self.current = node.next;
        Some((id, &node.key))
    }
}

// ---------------------------------------------------------------------------
// QueueProctor
// ---------------------------------------------------------------------------

/// Scoped rollback guard for trailing queue appends.
///
/// Records the queue length at construction; if dropped without
/// [`release`](QueueProctor::release), pops the back of the queue until the
/// recorded length is restored. Insert paths append the key through the
/// proctor, perform the index update that may unwind (user `Hash`/`Eq`
/// panics), and release on success, keeping the index and queue in
/// lockstep on every exit path.
#[derive(Debug)]
pub struct QueueProctor<'a, K> {
    queue: &'a mut EvictionQueue<K>,
    restore_len: usize,
    armed: bool,
}

impl<'a, K> QueueProctor<'a, K> {
    /// Starts monitoring `queue`, recording its current length.
    pub fn new(queue: &'a mut EvictionQueue<K>) -> Self {
        let restore_len = queue.len();
        Self {
            queue,
            restore_len,
            armed: true,
        }
    }

    /// Appends a key through the guard and returns its cursor.
    pub fn push_back(&mut self, key: K) -> Cursor {
        self.queue.push_back(key)
    }

    /// Disarms the guard; the monitored appends are kept.
    pub fn release(mut self) {
        self.armed = false;
    }
}

impl<K> Drop for QueueProctor<'_, K> {
    fn drop(&mut self) {
        if self.armed {
            while self.queue.len() > self.restore_len {
                self.queue.pop_back();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_front_order() {
        let mut queue = EvictionQueue::new();
        queue.push_back("a");
        queue.push_back("b");
        queue.push_back("c");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front(), Some(&"a"));
        assert_eq!(queue.back(), Some(&"c"));

        assert_eq!(queue.pop_front(), Some("a"));
        assert_eq!(queue.pop_front(), Some("b"));
        assert_eq!(queue.pop_front(), Some("c"));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn remove_by_cursor_middle_and_ends() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back("a");
        let b = queue.push_back("b");
        let c = queue.push_back("c");

        assert_eq!(queue.remove(b), Some("b"));
        let keys: Vec<_> = queue.iter().copied().collect();
        assert_eq!(keys, vec!["a", "c"]);

        assert_eq!(queue.remove(a), Some("a"));
        assert_eq!(queue.front(), Some(&"c"));
        assert_eq!(queue.back(), Some(&"c"));

        assert_eq!(queue.remove(c), Some("c"));
        assert!(queue.is_empty());
        assert_eq!(queue.front(), None);
        assert_eq!(queue.back(), None);
        queue.debug_validate_invariants();
    }

    #[test]
    fn removed_cursor_is_dead() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back(1);
        assert!(queue.contains(a));
        queue.remove(a);
        assert!(!queue.contains(a));
        assert_eq!(queue.remove(a), None);
        assert!(!queue.move_to_back(a));
        assert_eq!(queue.get(a), None);
    }

    #[test]
    fn slot_reuse_after_removal() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back(1);
        queue.push_back(2);
        queue.remove(a);

        let c = queue.push_back(3);
        assert_eq!(c.index(), a.index());
        let keys: Vec<_> = queue.iter().copied().collect();
        assert_eq!(keys, vec![2, 3]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn move_to_back_reorders() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back("a");
        let b = queue.push_back("b");
        queue.push_back("c");

        assert!(queue.move_to_back(a));
        let keys: Vec<_> = queue.iter().copied().collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
        assert!(queue.is_back(a));
        assert!(!queue.is_back(b));

        // moving the tail is a no-op
        assert!(queue.move_to_back(a));
        let keys: Vec<_> = queue.iter().copied().collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn move_to_back_singleton() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back(7);
        assert!(queue.move_to_back(a));
        assert_eq!(queue.front(), Some(&7));
        assert_eq!(queue.back(), Some(&7));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn clear_resets_state() {
        let mut queue = EvictionQueue::with_capacity(4);
        let a = queue.push_back(1);
        queue.push_back(2);
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.front(), None);
        assert!(!queue.contains(a));
        assert_eq!(queue.iter().count(), 0);
        queue.debug_validate_invariants();
    }

    #[test]
    fn cursors_iterate_in_queue_order() {
        let mut queue = EvictionQueue::new();
        let a = queue.push_back("a");
        let b = queue.push_back("b");
        queue.move_to_back(a);

        let pairs: Vec<_> = queue.cursors().map(|(c, k)| (c, *k)).collect();
        assert_eq!(pairs, vec![(b, "b"), (a, "a")]);
    }

    // -- QueueProctor -----------------------------------------------------

    #[test]
    fn proctor_rolls_back_on_drop() {
        let mut queue = EvictionQueue::new();
        queue.push_back("kept");

        {
            let mut proctor = QueueProctor::new(&mut queue);
            proctor.push_back("rolled back");
            // dropped without release
        }

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.back(), Some(&"kept"));
        queue.debug_validate_invariants();
    }

    #[test]
    fn proctor_release_keeps_append() {
        let mut queue = EvictionQueue::new();
        let mut proctor = QueueProctor::new(&mut queue);
        let cursor = proctor.push_back("kept");
        proctor.release();

        assert_eq!(queue.len(), 1);
        assert!(queue.is_back(cursor));
    }

    #[test]
    fn proctor_rollback_restores_reusable_slot() {
        let mut queue = EvictionQueue::new();
        {
            let mut proctor = QueueProctor::new(&mut queue);
            proctor.push_back(1);
        }
        let a = queue.push_back(2);
        assert_eq!(a.index(), 0);
        assert_eq!(queue.front(), Some(&2));
    }

    #[test]
    fn proctor_on_empty_queue_rolls_back_to_empty() {
        let mut queue: EvictionQueue<u32> = EvictionQueue::new();
        {
            let mut proctor = QueueProctor::new(&mut queue);
            proctor.push_back(1);
            proctor.push_back(2);
        }
        assert!(queue.is_empty());
        queue.debug_validate_invariants();
    }
}

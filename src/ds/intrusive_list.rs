//! Doubly linked list whose nodes live in a [`SlotArena`].
//!
//! Links are [`SlotId`]s rather than pointers, so handles stay stable across
//! splices and no `unsafe` is needed.
//!
//! ```text
//!   head ─► [id_4] ◄──► [id_1] ◄──► [id_7] ◄── tail
//!           front                    back
//! ```
//!
//! `push_front`, `remove` and `move_to_front` are O(1); `iter` walks front
//! to back.
use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Link<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug)]
pub struct IntrusiveList<T> {
    links: SlotArena<Link<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Handle of the back node, the next candidate for eviction.
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.links.get(id).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.links.get_mut(id).map(|link| &mut link.value)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.links.insert(Link {
            value,
            prev: None,
            next: None,
        });
        self.link_front(id);
        id
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.links.remove(id).map(|link| link.value)
    }

    /// Returns `false` if `id` is not in the list.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.head == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_front(id);
        true
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let link = self.links.get_mut(id)?;
        let (prev, next) = (link.prev.take(), link.next.take());

        match prev {
            Some(p) => {
                if let Some(before) = self.links.get_mut(p) {
                    before.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(after) = self.links.get_mut(n) {
                    after.prev = prev;
                }
            },
            None => self.tail = prev,
        }
        Some(())
    }

    /// Splices a detached node in at the head.
    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head.replace(id);
        if let Some(link) = self.links.get_mut(id) {
            link.next = old_head;
        }
        match old_head.and_then(|h| self.links.get_mut(h)) {
            Some(first) => first.prev = Some(id),
            None => self.tail = Some(id),
        }
    }

    /// Walks the list in both directions and panics on a broken link.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut forward = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        let mut expected_prev = None;
        while let Some(id) = cursor {
            assert!(forward.len() < self.len(), "cycle in forward links");
            let link = self.links.get(id).expect("dangling forward link");
            assert_eq!(link.prev, expected_prev, "prev link mismatch");
            forward.push(id);
            expected_prev = Some(id);
            cursor = link.next;
        }
        assert_eq!(forward.len(), self.len());
        assert_eq!(self.tail, forward.last().copied());

        let mut backward = Vec::with_capacity(self.len());
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            assert!(backward.len() < self.len(), "cycle in backward links");
            backward.push(id);
            cursor = self.links.get(id).and_then(|link| link.prev);
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }
}

/// Front-to-back iterator over list values.
pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.list.links.get(self.cursor?)?;
        self.cursor = link.next;
        Some(&link.value)
    }
}

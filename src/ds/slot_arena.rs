//! Slot arena with stable handles.
//!
//! Occupied and vacant slots share one `Vec`. Vacant slots form a chain
//! threaded through the slots themselves, so a freed slot is reused by the
//! next insert and a [`SlotId`] stays valid until its value is removed.

/// Stable handle to a value stored in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_vacant: Option<usize> },
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    first_vacant: Option<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            first_vacant: None,
            occupied: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        self.occupied += 1;
        if let Some(idx) = self.first_vacant {
            if let Slot::Vacant { next_vacant } = self.slots[idx] {
                self.first_vacant = next_vacant;
            }
            self.slots[idx] = Slot::Occupied(value);
            return SlotId(idx);
        }
        self.slots.push(Slot::Occupied(value));
        SlotId(self.slots.len() - 1)
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let vacated = Slot::Vacant {
            next_vacant: self.first_vacant,
        };
        self.first_vacant = Some(id.0);
        self.occupied -= 1;
        match std::mem::replace(slot, vacated) {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Drops every value and invalidates all handles.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.first_vacant = None;
        self.occupied = 0;
    }
}

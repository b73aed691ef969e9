//! Slot arena with stable handles.
//!
//! Vacant slots form a free chain threaded through the slots themselves, so a
//! removal costs no allocation and the next insert reuses the most recently
//! freed slot. A [`SlotId`] stays valid until its slot is removed, which lets
//! the cache engines keep key → handle indexes without holding references into
//! the backing storage.
//!
//! ```text
//!   slots:     [ Occupied(a) | Vacant(→3) | Occupied(c) | Vacant(end) ]
//!   free_head: 1
//!   insert(e) reuses slot 1 → SlotId(1), free_head becomes 3
//! ```

/// Stable handle into a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            occupied: 0,
        }
    }

    /// Stores `value` and returns its handle, reusing the last freed slot.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.occupied += 1;
        let Some(idx) = self.free_head else {
            self.slots.push(Slot::Occupied(value));
            return SlotId(self.slots.len() - 1);
        };
        let vacated = std::mem::replace(&mut self.slots[idx], Slot::Occupied(value));
        if let Slot::Vacant { next_free } = vacated {
            self.free_head = next_free;
        }
        SlotId(idx)
    }

    /// Frees the slot behind `id`; `None` if it was already vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let freed = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        self.occupied -= 1;
        match freed {
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

    pub fn contains(&self, id: SlotId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Occupied(_)))
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Drops every value and forgets all handles.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.occupied = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

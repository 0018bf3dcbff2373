use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// A stack of fungible items: an item identity paired with a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemId, count: u32) -> Self {
        Self { item, count }
    }

    /// A stack of exactly one item, the unit of belt and inserter transfer.
    pub fn unit(item: ItemId) -> Self {
        Self { item, count: 1 }
    }
}

/// A bounded inventory of distinct-item stacks.
///
/// Stacks are insertion-ordered (so "first output stack" is well defined
/// for FIFO takes) but all mutation goes through item-keyed methods, and
/// a stack that reaches zero is dropped. The capacity is a ceiling on the
/// total item count across all stacks, not on the number of stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
    capacity: u32,
}

impl Inventory {
    pub fn new(capacity: u32) -> Self {
        Self {
            stacks: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total items across all stacks.
    pub fn total(&self) -> u32 {
        self.stacks.iter().map(|s| s.count).sum()
    }

    /// Count held for a specific item.
    pub fn count_of(&self, item: ItemId) -> u32 {
        self.stacks
            .iter()
            .find(|s| s.item == item)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    /// Whether `count` more items would still fit under the capacity.
    pub fn has_room_for(&self, count: u32) -> bool {
        self.total() + count <= self.capacity
    }

    /// Add items, all or nothing. Returns false (and leaves the inventory
    /// untouched) if the capacity would be exceeded.
    #[must_use = "a false return means nothing was added"]
    pub fn try_add(&mut self, item: ItemId, count: u32) -> bool {
        if !self.has_room_for(count) {
            return false;
        }
        if let Some(stack) = self.stacks.iter_mut().find(|s| s.item == item) {
            stack.count += count;
        } else {
            self.stacks.push(ItemStack::new(item, count));
        }
        true
    }

    /// Remove exactly `count` of an item. Returns false (and removes
    /// nothing) if fewer are held. A stack that reaches zero is dropped.
    #[must_use = "a false return means nothing was removed"]
    pub fn remove_exact(&mut self, item: ItemId, count: u32) -> bool {
        let Some(index) = self.stacks.iter().position(|s| s.item == item) else {
            return false;
        };
        if self.stacks[index].count < count {
            return false;
        }
        self.stacks[index].count -= count;
        if self.stacks[index].count == 0 {
            self.stacks.remove(index);
        }
        true
    }

    /// Pop the oldest stack (FIFO by insertion).
    pub fn pop_front(&mut self) -> Option<ItemStack> {
        if self.stacks.is_empty() {
            None
        } else {
            Some(self.stacks.remove(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    /// The stacks in insertion order, for snapshot export.
    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    /// Replace the contents wholesale. Snapshot import uses this; it does
    /// not re-validate against the capacity, matching what the reference
    /// loader does with a hand-edited save.
    pub fn restore<I: IntoIterator<Item = ItemStack>>(&mut self, stacks: I) {
        self.stacks = stacks.into_iter().filter(|s| s.count > 0).collect();
    }
}

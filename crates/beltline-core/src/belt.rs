//! Ordered item conveyance with continuous progress and discrete
//! collision avoidance.
//!
//! Progress is a fixed-point proxy for position along the belt: 0 at the
//! entry, 1 at the exit. The three thresholds below encode the minimum
//! item gap and the entry/pull eligibility windows. They are load-bearing
//! for collision avoidance, not tuning knobs.

use crate::fixed::{Fixed64, from_millis};
use crate::id::ItemId;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// Minimum spacing between two items on the same belt.
pub const ITEM_SPACING: Fixed64 = from_millis(350);

/// A new item is refused while any existing item sits below this
/// progress, preventing a collision at the belt entry.
pub const ENTRY_GUARD: Fixed64 = from_millis(200);

/// An item below this progress cannot be pulled off by an inserter,
/// so a freshly inserted item is never yanked straight back off.
pub const PULL_GUARD: Fixed64 = from_millis(500);

/// One item riding a belt. Owned exclusively by its belt; destroyed on
/// ejection downstream or consumption by an inserter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemOnBelt {
    pub item: ItemId,
    /// Normalized position, 0 (entry) to 1 (exit).
    pub progress: Fixed64,
}

/// A conveyor belt. Items are kept ordered by progress: index 0 is the
/// head (nearest the exit), and progress is non-increasing toward the
/// tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belt {
    /// Cells per simulated second.
    pub speed: Fixed64,
    items: Vec<ItemOnBelt>,
}

impl Belt {
    pub fn new(speed: Fixed64) -> Self {
        Self {
            speed,
            items: Vec::new(),
        }
    }

    /// Advance every item by `speed * dt`, head to tail, clamping the
    /// head to 1.0 and each follower to the item ahead minus
    /// [`ITEM_SPACING`].
    ///
    /// The follower clamp can push a just-inserted item slightly negative
    /// when the item ahead is still close to the entry; that is the
    /// reference behavior and it self-corrects as the gap opens up.
    pub fn advance(&mut self, dt: Fixed64) {
        let delta = self.speed * dt;
        for i in 0..self.items.len() {
            self.items[i].progress += delta;
            let limit = if i == 0 {
                Fixed64::ONE
            } else {
                self.items[i - 1].progress - ITEM_SPACING
            };
            if self.items[i].progress > limit {
                self.items[i].progress = limit;
            }
        }
    }

    /// The head item, if it has reached the exit and is waiting to eject.
    pub fn head_ready(&self) -> Option<ItemId> {
        self.items
            .first()
            .filter(|head| head.progress >= Fixed64::ONE)
            .map(|head| head.item)
    }

    /// Remove the head item after a successful hand-off downstream.
    pub fn pop_head(&mut self) -> Option<ItemOnBelt> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Receiver capability: accept a stack onto the entry of the belt.
    /// Refused while any item is still inside the entry guard window.
    pub fn try_receive(&mut self, stack: ItemStack) -> bool {
        if self.items.iter().any(|i| i.progress < ENTRY_GUARD) {
            return false;
        }
        self.items.push(ItemOnBelt {
            item: stack.item,
            progress: Fixed64::ZERO,
        });
        true
    }

    /// Source capability: take the item nearest the exit as a unit stack.
    /// Items below [`PULL_GUARD`] are not eligible.
    pub fn take_item(&mut self) -> Option<ItemStack> {
        let (index, candidate) = self
            .items
            .iter()
            .enumerate()
            .max_by_key(|(_, i)| i.progress)?;
        if candidate.progress < PULL_GUARD {
            return None;
        }
        let taken = self.items.remove(index);
        Some(ItemStack::unit(taken.item))
    }

    /// The items in head-to-tail order.
    pub fn items(&self) -> &[ItemOnBelt] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the item list wholesale (snapshot import). The caller is
    /// expected to supply records in head-to-tail order, as export wrote
    /// them.
    pub fn restore<I: IntoIterator<Item = ItemOnBelt>>(&mut self, items: I) {
        self.items = items.into_iter().collect();
    }
}

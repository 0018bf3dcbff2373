//! Boundary buildings: the item source (spawns from nothing) and the
//! item sink (absorbs without limit).

use crate::fixed::Fixed64;
use crate::id::ItemId;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spawns one item type on a fixed interval. An item becomes available
/// once the timer fills; the timer then caps there, so availability never
/// accumulates beyond one pending item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub item: ItemId,
    /// Seconds between spawns.
    pub interval: Fixed64,
    /// Accumulated time toward the next spawn, capped at `interval`.
    pub timer: Fixed64,
}

impl Source {
    pub fn new(item: ItemId, interval: Fixed64) -> Self {
        Self {
            item,
            interval,
            timer: Fixed64::ZERO,
        }
    }

    pub fn tick(&mut self, dt: Fixed64) {
        self.timer += dt;
        if self.timer > self.interval {
            self.timer = self.interval;
        }
    }

    pub fn has_item(&self) -> bool {
        self.timer >= self.interval
    }

    /// Source capability: yield the pending item and restart the interval.
    pub fn take_item(&mut self) -> Option<ItemStack> {
        if self.has_item() {
            self.timer = Fixed64::ZERO;
            Some(ItemStack::unit(self.item))
        } else {
            None
        }
    }
}

/// Absorbs any item unconditionally, tallying what arrived. The tallies
/// exist for throughput inspection; they have no effect on behavior.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sink {
    received: BTreeMap<ItemId, u64>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver capability: always succeeds.
    pub fn try_receive(&mut self, stack: ItemStack) -> bool {
        *self.received.entry(stack.item).or_insert(0) += u64::from(stack.count);
        true
    }

    pub fn count_of(&self, item: ItemId) -> u64 {
        self.received.get(&item).copied().unwrap_or(0)
    }

    pub fn total_received(&self) -> u64 {
        self.received.values().sum()
    }

    pub fn tallies(&self) -> impl Iterator<Item = (ItemId, u64)> + '_ {
        self.received.iter().map(|(&item, &count)| (item, count))
    }

    /// Replace the tallies wholesale (snapshot import).
    pub fn restore<I: IntoIterator<Item = (ItemId, u64)>>(&mut self, tallies: I) {
        self.received = tallies.into_iter().filter(|&(_, n)| n > 0).collect();
    }
}

//! The inserter: a timed five-state automaton moving one stack at a time
//! from the building behind it to the building ahead of it.
//!
//! The state machine is cyclic with no terminal state:
//!
//! ```text
//! Idle -> MoveToPick -> Pick -> MoveToDrop -> Drop -> MoveToPick -> ...
//! ```
//!
//! Source and destination are re-resolved from the grid in Idle and
//! revalidated whenever they are actually used; the versioned
//! [`BuildingId`] keys make a removed neighbor show up as a dead key
//! rather than as whatever was placed next. The engine drives the
//! choreography ([`crate::engine::Engine`]); this module owns the state,
//! the move timer, and the single held stack.

use crate::id::BuildingId;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// The five inserter states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InserterState {
    #[default]
    Idle,
    MoveToPick,
    Pick,
    MoveToDrop,
    Drop,
}

/// A timed transfer automaton. Holds at most one stack at a time; the
/// state plus the timer fully determine behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inserter {
    pub state: InserterState,
    /// Ticks one arm swing takes (MoveToPick / MoveToDrop each wait this
    /// long).
    pub ticks_per_move: u32,
    state_timer: u32,
    held: Option<ItemStack>,
    /// Resolved in Idle: the building behind (against facing).
    pub source: Option<BuildingId>,
    /// Resolved in Idle: the building ahead (in facing direction).
    pub destination: Option<BuildingId>,
}

impl Inserter {
    pub fn new(ticks_per_move: u32) -> Self {
        Self {
            state: InserterState::Idle,
            ticks_per_move,
            state_timer: 0,
            held: None,
            source: None,
            destination: None,
        }
    }

    /// Transition to a new state, resetting the move timer.
    pub fn enter(&mut self, state: InserterState) {
        self.state = state;
        self.state_timer = 0;
    }

    /// Count one tick of the current timed wait. Returns true when the
    /// configured duration has elapsed.
    pub fn advance_timer(&mut self) -> bool {
        self.state_timer += 1;
        self.state_timer >= self.ticks_per_move
    }

    pub fn held(&self) -> Option<ItemStack> {
        self.held
    }

    /// Store a picked stack. The one-stack invariant is structural: the
    /// previous stack, if any, is returned rather than silently dropped.
    pub fn hold(&mut self, stack: ItemStack) -> Option<ItemStack> {
        self.held.replace(stack)
    }

    /// Clear the held stack after a successful drop.
    pub fn clear_held(&mut self) -> Option<ItemStack> {
        self.held.take()
    }
}

//! Beltline Core -- a deterministic grid factory simulation engine.
//!
//! This crate provides the building blocks for factory games on a fixed
//! logical clock: a bounded spatial grid, conveyor belts with collision
//! avoidance, timed inserters, recipe-driven machines, and a flat
//! snapshot transform for save/load.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one
//! tick:
//!
//! 1. **Snapshot** -- Copy the active-building list so placements and
//!    removals triggered mid-tick cannot corrupt the iteration.
//! 2. **Step** -- Invoke each building's tick behavior in registration
//!    order, skipping any building removed earlier in the same tick. A
//!    building's step may look up a grid neighbor and synchronously
//!    invoke its capability methods (take / receive).
//! 3. **Bookkeeping** -- Increment the tick counter.
//!
//! There is one logical thread of control; a tick is atomic and nothing
//! suspends or blocks. Receive/take refusals are backpressure, retried
//! on later ticks, never errors.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Grid plus tick clock; the orchestrator.
//! - [`grid::Grid`] -- Bounded W x H spatial index owning all buildings.
//! - [`building::BuildingKind`] -- Enum-dispatched building variants with
//!   an explicit capability contract (item source / item receiver).
//! - [`belt::Belt`] -- Ordered conveyance with progress clamping.
//! - [`inserter::Inserter`] -- Five-state timed transfer automaton.
//! - [`machine::Machine`] -- Recipe processor with bounded inventories.
//! - [`catalog::Catalog`] -- Immutable item/recipe definitions (frozen at
//!   startup).
//! - [`snapshot`] -- Flat per-building records and the two-pass
//!   export/import transform.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod belt;
pub mod building;
pub mod catalog;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod endpoint;
pub mod engine;
pub mod fixed;
pub mod grid;
pub mod id;
pub mod inserter;
pub mod item;
pub mod machine;
pub mod sim;
pub mod snapshot;

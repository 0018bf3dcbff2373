//! The orchestrator: one grid, one clock, and the per-kind tick steps.
//!
//! A tick iterates a snapshot of the active-building list in
//! registration order. Each step may synchronously move items into a
//! grid neighbor; `Grid::get_pair_mut` provides the disjoint mutable
//! access that makes a belt-to-neighbor hand-off a single atomic
//! operation within the tick. The catalog is passed in per call rather
//! than owned, so one catalog can serve many engines.

use crate::building::{Building, BuildingKind};
use crate::catalog::Catalog;
use crate::fixed::{Fixed64, Ticks};
use crate::grid::Grid;
use crate::id::BuildingId;
use crate::inserter::InserterState;
use crate::item::ItemStack;
use crate::sim::{TICK_INTERVAL, TickClock};

/// The simulation engine. The grid is public: placement and removal are
/// external operations, valid between any two ticks.
#[derive(Debug)]
pub struct Engine {
    pub grid: Grid,
    clock: TickClock,
}

/// Tick dispatch tag, copied out of the grid so the building itself can
/// be mutably borrowed during its step.
#[derive(Clone, Copy)]
enum StepKind {
    Belt,
    Inserter,
    Machine,
    Source,
    Inert,
}

impl Engine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            clock: TickClock::new(),
        }
    }

    /// Ticks stepped since construction.
    pub fn tick(&self) -> Ticks {
        self.clock.tick()
    }

    /// Feed elapsed wall time to the clock; runs at most one tick.
    /// Returns true when a tick ran.
    pub fn advance(&mut self, catalog: &Catalog, elapsed: Fixed64) -> bool {
        if self.clock.advance(elapsed) {
            self.run_tick(catalog);
            true
        } else {
            false
        }
    }

    /// Run exactly one tick, bypassing the wall-time accumulator.
    pub fn step(&mut self, catalog: &Catalog) {
        self.clock.fire();
        self.run_tick(catalog);
    }

    fn run_tick(&mut self, catalog: &Catalog) {
        // Snapshot the order: a building removed earlier in this tick is
        // skipped via the liveness check, and one placed mid-tick waits
        // for the next.
        let order: Vec<BuildingId> = self.grid.active().to_vec();
        for id in order {
            let step = match self.grid.get(id) {
                Some(building) => match building.kind {
                    BuildingKind::Belt(_) => StepKind::Belt,
                    BuildingKind::Inserter(_) => StepKind::Inserter,
                    BuildingKind::Machine(_) => StepKind::Machine,
                    BuildingKind::Source(_) => StepKind::Source,
                    BuildingKind::Sink(_) => StepKind::Inert,
                },
                None => continue,
            };
            match step {
                StepKind::Belt => self.step_belt(id, catalog),
                StepKind::Inserter => self.step_inserter(id, catalog),
                StepKind::Machine => self.step_machine(id, catalog),
                StepKind::Source => self.step_source(id),
                StepKind::Inert => {}
            }
        }
    }

    // -- Belt --

    /// Advance the belt, then try to eject a ready head into the
    /// neighbor the belt faces. Refusal parks the head at the exit.
    fn step_belt(&mut self, id: BuildingId, catalog: &Catalog) {
        let Some(building) = self.grid.get_mut(id) else {
            return;
        };
        let position = building.position;
        let direction = building.direction;
        let Some(belt) = building.as_belt_mut() else {
            return;
        };
        belt.advance(TICK_INTERVAL);
        let Some(head) = belt.head_ready() else {
            return;
        };

        let Some(dest_id) = self.grid.id_at(position.step(direction)) else {
            return;
        };
        let Some([belt_building, dest]) = self.grid.get_pair_mut(id, dest_id) else {
            return;
        };
        if dest.try_receive(ItemStack::unit(head), catalog)
            && let Some(belt) = belt_building.as_belt_mut()
        {
            belt.pop_head();
        }
    }

    // -- Inserter --

    /// One step of the five-state cycle. The state is copied out first;
    /// all neighbor interaction goes through fresh grid lookups, so a
    /// neighbor removed since Idle resolves to a dead key and the
    /// automaton falls back rather than touching a replacement building.
    fn step_inserter(&mut self, id: BuildingId, catalog: &Catalog) {
        let Some(building) = self.grid.get(id) else {
            return;
        };
        let position = building.position;
        let direction = building.direction;
        let Some(inserter) = building.as_inserter() else {
            return;
        };
        let state = inserter.state;
        let held = inserter.held();
        let source = inserter.source;
        let destination = inserter.destination;

        match state {
            InserterState::Idle => {
                // Re-resolve both ends: pick from behind, drop ahead.
                let src = self
                    .grid
                    .id_at(position.step(direction.opposite()))
                    .filter(|&sid| {
                        sid != id
                            && self
                                .grid
                                .get(sid)
                                .is_some_and(|b| b.kind.is_item_source())
                    });
                let dst = self.grid.id_at(position.step(direction)).filter(|&did| {
                    did != id
                        && self
                            .grid
                            .get(did)
                            .is_some_and(|b| b.kind.is_item_receiver())
                });
                if let Some(inserter) = self.inserter_mut(id) {
                    inserter.source = src;
                    inserter.destination = dst;
                    if held.is_some() {
                        // A stack stranded by a lost destination gets
                        // redelivered before anything new is picked.
                        if dst.is_some() {
                            inserter.enter(InserterState::MoveToDrop);
                        }
                    } else if src.is_some() && dst.is_some() {
                        inserter.enter(InserterState::MoveToPick);
                    }
                }
            }
            InserterState::MoveToPick => {
                if let Some(inserter) = self.inserter_mut(id)
                    && inserter.advance_timer()
                {
                    inserter.enter(InserterState::Pick);
                }
            }
            InserterState::Pick => {
                let taken = source.and_then(|sid| self.grid.get_mut(sid)?.take_item());
                if let Some(inserter) = self.inserter_mut(id) {
                    match taken {
                        Some(stack) => {
                            inserter.hold(stack);
                            inserter.enter(InserterState::MoveToDrop);
                        }
                        // Nothing to pick (or the source is gone): start
                        // over from Idle so both ends get re-resolved.
                        None => inserter.enter(InserterState::Idle),
                    }
                }
            }
            InserterState::MoveToDrop => {
                if let Some(inserter) = self.inserter_mut(id)
                    && inserter.advance_timer()
                {
                    inserter.enter(InserterState::Drop);
                }
            }
            InserterState::Drop => {
                let Some(stack) = held else {
                    if let Some(inserter) = self.inserter_mut(id) {
                        inserter.enter(InserterState::Idle);
                    }
                    return;
                };
                let live_dest = destination.filter(|&did| self.grid.contains(did));
                match live_dest {
                    Some(did) => {
                        let delivered = self
                            .grid
                            .get_mut(did)
                            .is_some_and(|dest| dest.try_receive(stack, catalog));
                        if delivered
                            && let Some(inserter) = self.inserter_mut(id)
                        {
                            inserter.clear_held();
                            inserter.enter(InserterState::MoveToPick);
                        }
                        // Refusal: stay in Drop and retry next tick.
                    }
                    // Destination gone. Fall back to Idle with the stack
                    // still in hand; it is delivered once a new
                    // destination resolves.
                    None => {
                        if let Some(inserter) = self.inserter_mut(id) {
                            inserter.enter(InserterState::Idle);
                        }
                    }
                }
            }
        }
    }

    fn inserter_mut(&mut self, id: BuildingId) -> Option<&mut crate::inserter::Inserter> {
        self.grid.get_mut(id).and_then(Building::as_inserter_mut)
    }

    // -- Machine / Source --

    fn step_machine(&mut self, id: BuildingId, catalog: &Catalog) {
        let Some(building) = self.grid.get_mut(id) else {
            return;
        };
        if let BuildingKind::Machine(machine) = &mut building.kind {
            let recipe = machine.recipe.and_then(|rid| catalog.recipe(rid));
            machine.tick(TICK_INTERVAL, recipe);
        }
    }

    fn step_source(&mut self, id: BuildingId) {
        let Some(building) = self.grid.get_mut(id) else {
            return;
        };
        if let BuildingKind::Source(source) = &mut building.kind {
            source.tick(TICK_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::Belt;
    use crate::endpoint::{Sink, Source};
    use crate::fixed::from_millis;
    use crate::grid::{Direction, GridPosition};
    use crate::id::ItemId;

    fn belt() -> BuildingKind {
        BuildingKind::Belt(Belt::new(Fixed64::ONE))
    }

    fn pos(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    #[test]
    fn advance_fires_one_tick_per_interval() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(4, 4);
        assert!(!engine.advance(&catalog, from_millis(50)));
        assert!(engine.advance(&catalog, from_millis(50)));
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn belt_hands_off_to_downstream_belt() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(4, 4);
        let first = engine.grid.place(belt(), pos(0, 0), Direction::East).unwrap();
        let second = engine.grid.place(belt(), pos(1, 0), Direction::East).unwrap();

        let fed = engine
            .grid
            .get_mut(first)
            .unwrap()
            .try_receive(ItemStack::unit(ItemId(7)), &catalog);
        assert!(fed);

        // Ten ticks bring the head to the exit; the same tick ejects it.
        for _ in 0..10 {
            engine.step(&catalog);
        }
        assert!(engine.grid.get(first).unwrap().as_belt().unwrap().is_empty());
        assert_eq!(engine.grid.get(second).unwrap().as_belt().unwrap().len(), 1);
    }

    #[test]
    fn belt_head_parks_without_a_receiver() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(4, 4);
        // Nothing downstream of the belt: the head has nowhere to go.
        let id = engine.grid.place(belt(), pos(0, 0), Direction::East).unwrap();
        let _ = engine
            .grid
            .get_mut(id)
            .unwrap()
            .try_receive(ItemStack::unit(ItemId(0)), &catalog);
        for _ in 0..30 {
            engine.step(&catalog);
        }
        let b = engine.grid.get(id).unwrap();
        let items = b.as_belt().unwrap().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].progress, Fixed64::ONE);
    }

    #[test]
    fn inserter_moves_source_items_to_a_sink() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(1, 4);
        // Column: source at the bottom, inserter facing north, sink above.
        engine
            .grid
            .place(
                BuildingKind::Source(Source::new(ItemId(0), Fixed64::ONE)),
                pos(0, 0),
                Direction::North,
            )
            .unwrap();
        engine
            .grid
            .place(
                BuildingKind::Inserter(crate::inserter::Inserter::new(2)),
                pos(0, 1),
                Direction::North,
            )
            .unwrap();
        let sink_id = engine
            .grid
            .place(BuildingKind::Sink(Sink::new()), pos(0, 2), Direction::North)
            .unwrap();

        // The first spawn lands at tick 10; the automaton needs an Idle
        // resolve, two timed swings (2 ticks each), and the Pick and Drop
        // steps. The first delivery completes on tick 15.
        for _ in 0..14 {
            engine.step(&catalog);
        }
        let sink = engine.grid.get(sink_id).unwrap().as_sink().unwrap();
        assert_eq!(sink.total_received(), 0);

        engine.step(&catalog);
        let sink = engine.grid.get(sink_id).unwrap().as_sink().unwrap();
        assert_eq!(sink.total_received(), 1);
        assert_eq!(sink.count_of(ItemId(0)), 1);
    }

    #[test]
    fn inserter_with_no_neighbors_stays_idle() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(4, 4);
        let id = engine
            .grid
            .place(
                BuildingKind::Inserter(crate::inserter::Inserter::new(2)),
                pos(2, 2),
                Direction::North,
            )
            .unwrap();
        for _ in 0..20 {
            engine.step(&catalog);
        }
        let inserter = engine.grid.get(id).unwrap().as_inserter().unwrap();
        assert_eq!(inserter.state, InserterState::Idle);
        assert!(inserter.held().is_none());
    }

    #[test]
    fn removing_a_source_mid_cycle_recovers_to_idle() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(1, 4);
        engine
            .grid
            .place(
                BuildingKind::Source(Source::new(ItemId(0), Fixed64::ONE)),
                pos(0, 0),
                Direction::North,
            )
            .unwrap();
        let ins_id = engine
            .grid
            .place(
                BuildingKind::Inserter(crate::inserter::Inserter::new(2)),
                pos(0, 1),
                Direction::North,
            )
            .unwrap();
        engine
            .grid
            .place(BuildingKind::Sink(Sink::new()), pos(0, 2), Direction::North)
            .unwrap();

        // Let the automaton commit to a pick cycle, then pull the source.
        for _ in 0..2 {
            engine.step(&catalog);
        }
        assert_eq!(
            engine.grid.get(ins_id).unwrap().as_inserter().unwrap().state,
            InserterState::MoveToPick
        );
        engine.grid.remove(pos(0, 0));

        // The stale key resolves to nothing at Pick; the automaton drops
        // back to Idle and stays there (no live source to resolve).
        for _ in 0..10 {
            engine.step(&catalog);
        }
        let inserter = engine.grid.get(ins_id).unwrap().as_inserter().unwrap();
        assert_eq!(inserter.state, InserterState::Idle);
        assert!(inserter.held().is_none());
    }

    #[test]
    fn lost_destination_strands_then_redelivers_the_held_stack() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(1, 4);
        engine
            .grid
            .place(
                BuildingKind::Source(Source::new(ItemId(0), Fixed64::ONE)),
                pos(0, 0),
                Direction::North,
            )
            .unwrap();
        let ins_id = engine
            .grid
            .place(
                BuildingKind::Inserter(crate::inserter::Inserter::new(2)),
                pos(0, 1),
                Direction::North,
            )
            .unwrap();
        engine
            .grid
            .place(BuildingKind::Sink(Sink::new()), pos(0, 2), Direction::North)
            .unwrap();

        // Tick 12 picks the first spawned item; pull the sink while the
        // arm is still mid-swing toward it.
        for _ in 0..13 {
            engine.step(&catalog);
        }
        assert!(engine.grid.get(ins_id).unwrap().as_inserter().unwrap().held().is_some());
        engine.grid.remove(pos(0, 2));

        for _ in 0..2 {
            engine.step(&catalog);
        }
        let inserter = engine.grid.get(ins_id).unwrap().as_inserter().unwrap();
        assert_eq!(inserter.state, InserterState::Idle);
        assert!(inserter.held().is_some(), "the stack survives the lost destination");

        // A replacement sink gets the stranded stack before any new pick.
        let new_sink = engine
            .grid
            .place(BuildingKind::Sink(Sink::new()), pos(0, 2), Direction::North)
            .unwrap();
        for _ in 0..4 {
            engine.step(&catalog);
        }
        let sink = engine.grid.get(new_sink).unwrap().as_sink().unwrap();
        assert_eq!(sink.total_received(), 1);
        assert!(engine.grid.get(ins_id).unwrap().as_inserter().unwrap().held().is_none());
    }

    #[test]
    fn removed_building_is_skipped_in_the_tick() {
        let catalog = Catalog::empty();
        let mut engine = Engine::new(4, 4);
        let id = engine.grid.place(belt(), pos(0, 0), Direction::East).unwrap();
        engine.grid.remove(pos(0, 0));
        engine.step(&catalog);
        assert!(engine.grid.get(id).is_none());
        assert_eq!(engine.tick(), 1);
    }
}

//! The building sum type and its capability contract.
//!
//! Buildings are closed-set enum variants rather than trait objects; the
//! engine matches on the variant for tick behavior, and the capability
//! methods below give inserters and belts a uniform surface for moving
//! items between arbitrary neighbor kinds.
//!
//! Capabilities per kind:
//!
//! | Kind     | item source | item receiver |
//! |----------|-------------|---------------|
//! | Belt     | yes         | yes           |
//! | Inserter | no          | no            |
//! | Machine  | yes         | yes           |
//! | Source   | yes         | no            |
//! | Sink     | no          | yes           |

use crate::belt::Belt;
use crate::catalog::Catalog;
use crate::endpoint::{Sink, Source};
use crate::grid::{Direction, Footprint, GridPosition};
use crate::inserter::Inserter;
use crate::item::ItemStack;
use crate::machine::Machine;

/// A placed building: spatial data plus the kind-specific state.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// Anchor cell (minimum corner of the footprint).
    pub position: GridPosition,
    pub footprint: Footprint,
    pub direction: Direction,
    pub kind: BuildingKind,
}

/// The closed set of building kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingKind {
    Belt(Belt),
    Inserter(Inserter),
    Machine(Machine),
    Source(Source),
    Sink(Sink),
}

impl BuildingKind {
    /// Stable kind name, used as the `type` discriminator in snapshot
    /// records and as the prototype key.
    pub fn name(&self) -> &'static str {
        match self {
            BuildingKind::Belt(_) => "Belt",
            BuildingKind::Inserter(_) => "Inserter",
            BuildingKind::Machine(_) => "Machine",
            BuildingKind::Source(_) => "Source",
            BuildingKind::Sink(_) => "Sink",
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            BuildingKind::Machine(m) => m.footprint(),
            _ => Footprint::single(),
        }
    }

    /// Whether this kind can ever yield items via [`Building::take_item`].
    pub fn is_item_source(&self) -> bool {
        matches!(
            self,
            BuildingKind::Belt(_) | BuildingKind::Machine(_) | BuildingKind::Source(_)
        )
    }

    /// Whether this kind can ever accept items via [`Building::try_receive`].
    pub fn is_item_receiver(&self) -> bool {
        matches!(
            self,
            BuildingKind::Belt(_) | BuildingKind::Machine(_) | BuildingKind::Sink(_)
        )
    }
}

impl Building {
    /// Receiver capability. A refusal is backpressure, not an error; the
    /// caller keeps the stack and retries later.
    pub fn try_receive(&mut self, stack: ItemStack, catalog: &Catalog) -> bool {
        match &mut self.kind {
            BuildingKind::Belt(belt) => belt.try_receive(stack),
            BuildingKind::Machine(machine) => {
                let recipe = machine.recipe.and_then(|id| catalog.recipe(id));
                machine.try_receive(stack, recipe)
            }
            BuildingKind::Sink(sink) => sink.try_receive(stack),
            BuildingKind::Inserter(_) | BuildingKind::Source(_) => false,
        }
    }

    /// Source capability: relinquish one stack, or None when nothing is
    /// currently available.
    pub fn take_item(&mut self) -> Option<ItemStack> {
        match &mut self.kind {
            BuildingKind::Belt(belt) => belt.take_item(),
            BuildingKind::Machine(machine) => machine.take_item(),
            BuildingKind::Source(source) => source.take_item(),
            BuildingKind::Inserter(_) | BuildingKind::Sink(_) => None,
        }
    }

    // -- Typed accessors --

    pub fn as_belt(&self) -> Option<&Belt> {
        match &self.kind {
            BuildingKind::Belt(belt) => Some(belt),
            _ => None,
        }
    }

    pub fn as_belt_mut(&mut self) -> Option<&mut Belt> {
        match &mut self.kind {
            BuildingKind::Belt(belt) => Some(belt),
            _ => None,
        }
    }

    pub fn as_inserter(&self) -> Option<&Inserter> {
        match &self.kind {
            BuildingKind::Inserter(inserter) => Some(inserter),
            _ => None,
        }
    }

    pub fn as_inserter_mut(&mut self) -> Option<&mut Inserter> {
        match &mut self.kind {
            BuildingKind::Inserter(inserter) => Some(inserter),
            _ => None,
        }
    }

    pub fn as_machine(&self) -> Option<&Machine> {
        match &self.kind {
            BuildingKind::Machine(machine) => Some(machine),
            _ => None,
        }
    }

    pub fn as_machine_mut(&mut self) -> Option<&mut Machine> {
        match &mut self.kind {
            BuildingKind::Machine(machine) => Some(machine),
            _ => None,
        }
    }

    pub fn as_source(&self) -> Option<&Source> {
        match &self.kind {
            BuildingKind::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_source_mut(&mut self) -> Option<&mut Source> {
        match &mut self.kind {
            BuildingKind::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_sink(&self) -> Option<&Sink> {
        match &self.kind {
            BuildingKind::Sink(sink) => Some(sink),
            _ => None,
        }
    }

    pub fn as_sink_mut(&mut self) -> Option<&mut Sink> {
        match &mut self.kind {
            BuildingKind::Sink(sink) => Some(sink),
            _ => None,
        }
    }
}

//! The save/load boundary: one flat record per building.
//!
//! Export walks the grid in registration order and flattens each
//! building into a [`BuildingRecord`]; live `Fixed64` progress travels
//! as `f64` in the record. Import is the inverse, run in two passes
//! against a [`BuildingPrototypes`] registry so that a record only
//! carries what the prototype cannot know (position, direction, and the
//! per-building dynamic state). The byte format is the caller's concern;
//! records are plain serde structs.
//!
//! Import degrades rather than fails: an unknown building type, a bad
//! direction index, or an unplaceable record is skipped, and unknown
//! item or recipe ids in dynamic state simply never resolve against the
//! catalog at tick time.

use crate::belt::ItemOnBelt;
use crate::building::{Building, BuildingKind};
use crate::fixed::{f64_to_fixed64, fixed64_to_f64};
use crate::grid::{Direction, Grid, GridPosition};
use crate::id::{ItemId, RecipeId};
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An item stack in a flat record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
    pub item: u32,
    pub count: u32,
}

impl From<ItemStack> for StackRecord {
    fn from(stack: ItemStack) -> Self {
        Self {
            item: stack.item.0,
            count: stack.count,
        }
    }
}

impl From<StackRecord> for ItemStack {
    fn from(record: StackRecord) -> Self {
        ItemStack::new(ItemId(record.item), record.count)
    }
}

/// An item riding a belt, progress flattened to f64.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeltItemRecord {
    pub item: u32,
    pub progress: f64,
}

/// One building, flattened. Only the fields relevant to the recorded
/// type are populated; the rest stay `None` and are omitted from the
/// serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Building type discriminator; the prototype key on import.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i32,
    pub y: i32,
    /// Direction as a clockwise index (0 = North).
    pub dir: u8,
    /// Belt contents, head first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<BeltItemRecord>>,
    /// Machine recipe assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<u32>,
    /// Machine production progress, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_inventory: Option<Vec<StackRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_inventory: Option<Vec<StackRecord>>,
    /// Inserter hand contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held_item: Option<StackRecord>,
}

impl BuildingRecord {
    fn bare(kind: &str, position: GridPosition, direction: Direction) -> Self {
        Self {
            kind: kind.to_string(),
            x: position.x,
            y: position.y,
            dir: direction.index(),
            items: None,
            recipe_id: None,
            progress: None,
            input_inventory: None,
            output_inventory: None,
            held_item: None,
        }
    }
}

/// A whole factory, flattened.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorySnapshot {
    pub buildings: Vec<BuildingRecord>,
}

// ---------------------------------------------------------------------------
// Prototypes
// ---------------------------------------------------------------------------

/// Name-keyed building templates. Import instantiates a record by
/// cloning the prototype registered under its `type` string, so static
/// configuration (belt speed, machine capacities, source item and
/// interval) lives here rather than in the record.
#[derive(Debug, Default)]
pub struct BuildingPrototypes {
    templates: HashMap<String, BuildingKind>,
}

impl BuildingPrototypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a name. Re-registering replaces.
    pub fn register(&mut self, name: &str, template: BuildingKind) {
        self.templates.insert(name.to_string(), template);
    }

    /// A fresh building kind cloned from the named template.
    pub fn instantiate(&self, name: &str) -> Option<BuildingKind> {
        self.templates.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

/// Flatten the grid into records, in registration order.
pub fn export(grid: &Grid) -> FactorySnapshot {
    let buildings = grid
        .active()
        .iter()
        .filter_map(|&id| grid.get(id))
        .map(export_building)
        .collect();
    FactorySnapshot { buildings }
}

fn export_building(building: &Building) -> BuildingRecord {
    let mut record = BuildingRecord::bare(
        building.kind.name(),
        building.position,
        building.direction,
    );
    match &building.kind {
        BuildingKind::Belt(belt) => {
            record.items = Some(
                belt.items()
                    .iter()
                    .map(|i| BeltItemRecord {
                        item: i.item.0,
                        progress: fixed64_to_f64(i.progress),
                    })
                    .collect(),
            );
        }
        BuildingKind::Inserter(inserter) => {
            record.held_item = inserter.held().map(StackRecord::from);
        }
        BuildingKind::Machine(machine) => {
            record.recipe_id = machine.recipe.map(|r| r.0);
            record.progress = Some(fixed64_to_f64(machine.progress));
            record.input_inventory = Some(
                machine
                    .input
                    .stacks()
                    .iter()
                    .copied()
                    .map(StackRecord::from)
                    .collect(),
            );
            record.output_inventory = Some(
                machine
                    .output
                    .stacks()
                    .iter()
                    .copied()
                    .map(StackRecord::from)
                    .collect(),
            );
        }
        BuildingKind::Source(_) | BuildingKind::Sink(_) => {}
    }
    record
}

/// Rebuild the grid from a snapshot.
///
/// Pass 1 clears the grid and places a prototype instance for every
/// record whose type is known and whose footprint fits; records that
/// fail either test are skipped. Pass 2 resolves each placed record by
/// position and applies its dynamic state on top of the prototype
/// defaults. Returns how many buildings were placed.
pub fn import(grid: &mut Grid, prototypes: &BuildingPrototypes, snapshot: &FactorySnapshot) -> usize {
    grid.clear();

    let mut placed = 0;
    for record in &snapshot.buildings {
        let Some(kind) = prototypes.instantiate(&record.kind) else {
            continue;
        };
        let direction = Direction::from_index(record.dir).unwrap_or_default();
        let position = GridPosition::new(record.x, record.y);
        if grid.place(kind, position, direction).is_ok() {
            placed += 1;
        }
    }

    for record in &snapshot.buildings {
        let position = GridPosition::new(record.x, record.y);
        let Some(building) = grid.building_at_mut(position) else {
            continue;
        };
        apply_record(building, record);
    }
    placed
}

fn apply_record(building: &mut Building, record: &BuildingRecord) {
    match &mut building.kind {
        BuildingKind::Belt(belt) => {
            if let Some(items) = &record.items {
                belt.restore(items.iter().map(|i| ItemOnBelt {
                    item: ItemId(i.item),
                    progress: f64_to_fixed64(i.progress),
                }));
            }
        }
        BuildingKind::Inserter(inserter) => {
            if let Some(held) = record.held_item {
                inserter.hold(held.into());
            }
        }
        BuildingKind::Machine(machine) => {
            machine.recipe = record.recipe_id.map(RecipeId);
            if let Some(progress) = record.progress {
                machine.progress = f64_to_fixed64(progress);
            }
            if let Some(input) = &record.input_inventory {
                machine.input.restore(input.iter().copied().map(ItemStack::from));
            }
            if let Some(output) = &record.output_inventory {
                machine
                    .output
                    .restore(output.iter().copied().map(ItemStack::from));
            }
        }
        BuildingKind::Source(_) | BuildingKind::Sink(_) => {}
    }
}

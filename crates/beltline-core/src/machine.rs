//! The recipe processor: bounded input/output inventories, progress
//! accumulation gated on production being possible, and an explicit
//! recipe-swap operation.

use crate::catalog::RecipeDef;
use crate::fixed::Fixed64;
use crate::grid::Footprint;
use crate::id::RecipeId;
use crate::item::{Inventory, ItemStack};
use serde::{Deserialize, Serialize};

/// Subtype-defined machine parameters: inventory ceilings (total item
/// counts) and the grid footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub input_capacity: u32,
    pub output_capacity: u32,
    pub footprint: Footprint,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            input_capacity: 10,
            output_capacity: 10,
            footprint: Footprint::single(),
        }
    }
}

/// A recipe processor. The assigned recipe is a catalog id; an id the
/// catalog no longer knows simply never satisfies the production check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub recipe: Option<RecipeId>,
    /// Accumulated production progress, in simulated seconds.
    pub progress: Fixed64,
    pub input: Inventory,
    pub output: Inventory,
    footprint: Footprint,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            recipe: None,
            progress: Fixed64::ZERO,
            input: Inventory::new(config.input_capacity),
            output: Inventory::new(config.output_capacity),
            footprint: config.footprint,
        }
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// One tick of production. `recipe` is the resolved definition for
    /// `self.recipe` (None when unassigned or unknown to the catalog).
    ///
    /// While production is possible, progress accumulates by the tick
    /// interval; on completion the machine produces and progress resets
    /// to zero, discarding any excess rather than carrying it forward.
    pub fn tick(&mut self, dt: Fixed64, recipe: Option<&RecipeDef>) {
        let Some(recipe) = recipe else {
            return;
        };
        if self.can_produce(recipe) {
            self.progress += dt;
            if self.progress >= recipe.duration {
                self.produce(recipe);
                self.progress = Fixed64::ZERO;
            }
        }
    }

    /// Whether one full crafting cycle could complete right now: the
    /// output has headroom for the entire product count and every
    /// ingredient requirement is met.
    pub fn can_produce(&self, recipe: &RecipeDef) -> bool {
        let product_total: u32 = recipe.products.iter().map(|p| p.count).sum();
        if !self.output.has_room_for(product_total) {
            return false;
        }
        recipe
            .ingredients
            .iter()
            .all(|required| self.input.count_of(required.item) >= required.count)
    }

    /// Consume one set of ingredients and emit one set of products.
    /// Callers must have checked [`can_produce`](Self::can_produce).
    fn produce(&mut self, recipe: &RecipeDef) {
        for required in &recipe.ingredients {
            let removed = self.input.remove_exact(required.item, required.count);
            debug_assert!(removed, "can_produce must hold before produce");
        }
        for product in &recipe.products {
            let added = self.output.try_add(product.item, product.count);
            debug_assert!(added, "can_produce must hold before produce");
        }
    }

    /// Receiver capability. Rejects when no recipe is assigned, when the
    /// item is not one of its ingredients, or when accepting the whole
    /// stack would exceed the input capacity.
    pub fn try_receive(&mut self, stack: ItemStack, recipe: Option<&RecipeDef>) -> bool {
        let Some(recipe) = recipe else {
            return false;
        };
        if !recipe.ingredients.iter().any(|ing| ing.item == stack.item) {
            return false;
        }
        self.input.try_add(stack.item, stack.count)
    }

    /// Source capability: pop the oldest output stack.
    pub fn take_item(&mut self) -> Option<ItemStack> {
        self.output.pop_front()
    }

    /// Assign a different recipe (or none). This is an explicit external
    /// operation, never a tick side effect: both inventories are cleared
    /// and progress resets, so a stale mismatched-ingredient state cannot
    /// wedge the machine.
    pub fn set_recipe(&mut self, recipe: Option<RecipeId>) {
        self.recipe = recipe;
        self.input.clear();
        self.output.clear();
        self.progress = Fixed64::ZERO;
    }
}

use crate::fixed::Fixed64;
use crate::id::{ItemId, RecipeId};
use std::collections::HashMap;

/// An item definition in the catalog.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
}

/// A recipe ingredient/product entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub count: u32,
}

/// A recipe definition. Duration is in simulated seconds; a machine
/// accumulates one tick interval of progress per tick while production
/// is possible.
#[derive(Debug, Clone)]
pub struct RecipeDef {
    pub name: String,
    pub ingredients: Vec<RecipeEntry>,
    pub products: Vec<RecipeEntry>,
    pub duration: Fixed64,
}

/// Builder for constructing an immutable Catalog.
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. Returns its ID.
    pub fn register_item(&mut self, name: &str) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(ItemDef {
            name: name.to_string(),
        });
        self.item_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a recipe. Returns its ID.
    pub fn register_recipe(
        &mut self,
        name: &str,
        ingredients: Vec<RecipeEntry>,
        products: Vec<RecipeEntry>,
        duration: Fixed64,
    ) -> RecipeId {
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(RecipeDef {
            name: name.to_string(),
            ingredients,
            products,
            duration,
        });
        self.recipe_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Lookup item ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    /// Lookup recipe ID by name.
    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        // Validate: every recipe item reference must exist.
        for recipe in &self.recipes {
            for entry in recipe.ingredients.iter().chain(recipe.products.iter()) {
                if entry.item.0 as usize >= self.items.len() {
                    return Err(CatalogError::InvalidItemRef(entry.item));
                }
            }
        }

        Ok(Catalog {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            recipes: self.recipes,
            recipe_name_to_id: self.recipe_name_to_id,
        })
    }
}

/// Immutable catalog of items and recipes. Frozen after build().
///
/// The simulation consumes this as an opaque collaborator: unknown ids
/// resolve to `None`, never to an error.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
}

impl Catalog {
    /// An empty catalog, for factories that only move opaque items around.
    pub fn empty() -> Self {
        Catalog {
            items: Vec::new(),
            item_name_to_id: HashMap::new(),
            recipes: Vec::new(),
            recipe_name_to_id: HashMap::new(),
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
}

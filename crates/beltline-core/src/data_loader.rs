//! Data-driven catalog loading from JSON.
//!
//! Feature-gated behind `data-loader`. Item and recipe content lives in
//! data files; recipe entries reference items by name and are resolved
//! against the builder during loading.

use crate::catalog::{CatalogBuilder, CatalogError, RecipeEntry};
use crate::fixed::from_millis;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("unknown item reference: {0}")]
    UnknownItemRef(String),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level catalog data structure for JSON deserialization.
#[derive(Debug, serde::Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub recipes: Vec<RecipeData>,
}

/// JSON representation of an item.
#[derive(Debug, serde::Deserialize)]
pub struct ItemData {
    pub name: String,
}

/// JSON representation of a recipe. Duration is in milliseconds of
/// simulated time, so data files never carry floats.
#[derive(Debug, serde::Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeEntryData>,
    #[serde(default)]
    pub products: Vec<RecipeEntryData>,
    pub duration_ms: i64,
}

/// JSON representation of a recipe ingredient/product entry.
#[derive(Debug, serde::Deserialize)]
pub struct RecipeEntryData {
    pub item: String, // references item by name
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a catalog builder from a JSON string.
pub fn load_catalog_json(json: &str) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    build_catalog(data)
}

/// Load a catalog builder from JSON bytes.
pub fn load_catalog_json_bytes(bytes: &[u8]) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_slice(bytes)?;
    build_catalog(data)
}

fn build_catalog(data: CatalogData) -> Result<CatalogBuilder, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    // Phase 1: register all items.
    for item in &data.items {
        builder.register_item(&item.name);
    }

    // Phase 2: register all recipes (resolve item refs by name).
    for recipe in &data.recipes {
        let ingredients = resolve_entries(&builder, &recipe.ingredients)?;
        let products = resolve_entries(&builder, &recipe.products)?;
        builder.register_recipe(
            &recipe.name,
            ingredients,
            products,
            from_millis(recipe.duration_ms),
        );
    }

    Ok(builder)
}

fn resolve_entries(
    builder: &CatalogBuilder,
    entries: &[RecipeEntryData],
) -> Result<Vec<RecipeEntry>, DataLoadError> {
    entries
        .iter()
        .map(|entry| {
            let item = builder
                .item_id(&entry.item)
                .ok_or_else(|| DataLoadError::UnknownItemRef(entry.item.clone()))?;
            Ok(RecipeEntry {
                item,
                count: entry.count,
            })
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

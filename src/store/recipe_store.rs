//! Ordered recipe collection persisted as one JSON blob under the `recipes` key.
//!
//! The whole collection is loaded once when the store is opened and rewritten
//! wholesale after every mutation. Anything that cannot be read back is
//! normalized here, once, so consumers only ever see well-formed [`Recipe`]s.

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::kv::KeyValueStore;
use crate::error::{RecipeBookError, Result};
use crate::ingredient_parser::parse_ingredient_lines;
use crate::recipe::{parse_leading_float, Ingredient, NewRecipe, Recipe};

pub const RECIPES_KEY: &str = "recipes";

/// Lenient on-disk shape. Older data may hold ingredients as one newline-delimited string.
#[derive(Debug, Deserialize)]
struct StoredRecipe {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    servings: Option<f64>,
    #[serde(default)]
    ingredients: Option<StoredIngredients>,
    #[serde(default)]
    steps: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredIngredients {
    List(Vec<StoredIngredient>),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct StoredIngredient {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<StoredQuantity>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredQuantity {
    Number(f64),
    Text(String),
}

impl From<StoredIngredient> for Ingredient {
    fn from(stored: StoredIngredient) -> Self {
        let quantity = match stored.quantity {
            Some(StoredQuantity::Number(q)) if q.is_finite() && q > 0.0 => q,
            Some(StoredQuantity::Text(text)) => parse_leading_float(&text)
                .filter(|q| q.is_finite() && *q > 0.0)
                .unwrap_or(0.0),
            _ => 0.0,
        };
        Ingredient::new(
            stored.name.unwrap_or_default().trim(),
            quantity,
            stored.unit.unwrap_or_default().trim(),
        )
    }
}

impl From<StoredRecipe> for Recipe {
    fn from(stored: StoredRecipe) -> Self {
        let ingredients = match stored.ingredients {
            Some(StoredIngredients::List(list)) => list.into_iter().map(Ingredient::from).collect(),
            Some(StoredIngredients::Text(text)) => parse_ingredient_lines(&text)
                .into_iter()
                .map(|parsed| match parsed.quantity {
                    Some(q) if q > 0.0 => Ingredient::new(parsed.name, q, parsed.unit),
                    // Kept with a zero quantity so the line still passes through verbatim.
                    _ => Ingredient::new(parsed.original.trim(), 0.0, ""),
                })
                .collect(),
            None => Vec::new(),
        };

        let servings = stored
            .servings
            .filter(|s| s.is_finite())
            .map(|s| s.round().clamp(1.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(1);

        Recipe {
            id: stored.id,
            name: stored.name.unwrap_or_default(),
            servings,
            ingredients,
            steps: stored.steps.unwrap_or_default(),
            tags: stored.tags.unwrap_or_default(),
        }
    }
}

/// Decodes a persisted blob, falling back to an empty collection when it is unusable.
pub fn decode_recipes(bytes: &[u8]) -> Vec<Recipe> {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored recipes are not valid JSON, starting empty: {}", e);
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        other => {
            warn!("Stored recipes are not an array (found {}), starting empty", type_name(&other));
            return Vec::new();
        }
    };

    let mut seen_ids = HashSet::new();
    let mut recipes = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<StoredRecipe>(item) {
            Ok(stored) => {
                if !seen_ids.insert(stored.id) {
                    warn!("Dropping recipe at index {}: duplicate id {}", index, stored.id);
                    continue;
                }
                recipes.push(Recipe::from(stored));
            }
            Err(e) => warn!("Dropping unreadable recipe at index {}: {}", index, e),
        }
    }
    recipes
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug)]
pub struct RecipeStore<S: KeyValueStore> {
    backend: S,
    recipes: Vec<Recipe>,
}

impl<S: KeyValueStore> RecipeStore<S> {
    /// Loads the collection from `backend`. Missing, unreadable or corrupt data yields an empty store.
    pub fn open(backend: S) -> Self {
        let recipes = match backend.get(RECIPES_KEY) {
            Ok(Some(bytes)) => decode_recipes(&bytes),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read stored recipes, starting empty: {}", e);
                Vec::new()
            }
        };
        info!("Recipe store opened with {} recipes", recipes.len());
        Self { backend, recipes }
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Appends a recipe under a freshly generated id and persists the collection.
    pub fn create(&mut self, new_recipe: NewRecipe) -> Result<&Recipe> {
        let id = self.next_id();
        let mut next = self.recipes.clone();
        next.push(new_recipe.into_recipe(id));
        self.commit(next)?;
        debug!("Created recipe {}", id);
        Ok(&self.recipes[self.recipes.len() - 1])
    }

    /// Replaces the recipe stored under `id`, keeping the id and its position.
    pub fn update(&mut self, id: i64, new_recipe: NewRecipe) -> Result<&Recipe> {
        let pos = self
            .recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or(RecipeBookError::NotFound(id))?;
        let mut next = self.recipes.clone();
        next[pos] = new_recipe.into_recipe(id);
        self.commit(next)?;
        debug!("Updated recipe {}", id);
        Ok(&self.recipes[pos])
    }

    /// Removes the recipe stored under `id`. Returns whether anything was removed;
    /// deleting an unknown id is a no-op and does not touch storage.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        if self.get(id).is_none() {
            debug!("Delete of unknown recipe {} ignored", id);
            return Ok(false);
        }
        let next: Vec<Recipe> = self.recipes.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(next)?;
        debug!("Deleted recipe {}", id);
        Ok(true)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Writes `next` and only then makes it the visible collection.
    fn commit(&mut self, next: Vec<Recipe>) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(&next)?;
        self.backend.set(RECIPES_KEY, &serialized)?;
        self.recipes = next;
        Ok(())
    }

    // Creation timestamp in ms, bumped past the largest id so two creates in the same ms stay unique.
    // When the largest id cannot be bumped, the first free id from `now` on is used instead.
    fn next_id(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        match self.recipes.iter().map(|r| r.id).max() {
            Some(max_id) if max_id >= now => match max_id.checked_add(1) {
                Some(id) => id,
                None => {
                    let used: HashSet<i64> = self.recipes.iter().map(|r| r.id).collect();
                    (now..=i64::MAX)
                        .chain((i64::MIN..now).rev())
                        .find(|id| !used.contains(id))
                        .unwrap_or(now)
                }
            },
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::{FileKvStore, MemoryKvStore};
    use tempfile::tempdir;

    fn new_recipe(name: &str, ingredients: Vec<Ingredient>) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            servings: 2,
            ingredients,
            steps: "混ぜる\n焼く".to_string(),
            tags: vec!["簡単".to_string()],
        }
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let mut store = RecipeStore::open(MemoryKvStore::new());
        let a = store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap().id;
        let b = store.create(new_recipe("B", vec![Ingredient::new("卵", 1.0, "個")])).unwrap().id;
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].name, "A");
    }

    #[test]
    fn test_update_preserves_id_and_position() {
        let mut store = RecipeStore::open(MemoryKvStore::new());
        let first = store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap().id;
        store.create(new_recipe("B", vec![Ingredient::new("米", 150.0, "g")])).unwrap();

        let updated = store
            .update(first, new_recipe("A2", vec![Ingredient::new("卵", 3.0, "個")]))
            .unwrap();
        assert_eq!(updated.id, first);
        assert_eq!(store.all()[0].name, "A2");
        assert_eq!(store.all()[1].name, "B");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = RecipeStore::open(MemoryKvStore::new());
        let result = store.update(7, new_recipe("X", vec![]));
        assert!(matches!(result, Err(RecipeBookError::NotFound(7))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = RecipeStore::open(MemoryKvStore::new());
        let id = store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap().id;
        assert!(store.delete(id).unwrap());
        assert!(store.get(id).is_none());
        assert!(!store.delete(id).unwrap());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_round_trip_through_file_backend() {
        let dir = tempdir().unwrap();
        let mut store = RecipeStore::open(FileKvStore::new(dir.path()));
        store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap();
        store.create(new_recipe("B", vec![Ingredient::new("牛乳", 0.5, "ml")])).unwrap();
        let before = store.all().to_vec();

        let reopened = RecipeStore::open(FileKvStore::new(dir.path()));
        assert_eq!(reopened.all(), before.as_slice());
    }

    #[test]
    fn test_create_after_largest_possible_id() {
        let blob = format!(r#"[{{"id": {}, "name": "max", "ingredients": [], "steps": "焼く"}}]"#, i64::MAX);
        let mut store = RecipeStore::open(MemoryKvStore::new().with_entry(RECIPES_KEY, blob));
        let id = store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap().id;
        assert_ne!(id, i64::MAX);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(id).unwrap().name, "A");
    }

    #[test]
    fn test_reopen_from_returned_backend() {
        let mut store = RecipeStore::open(MemoryKvStore::new());
        store.create(new_recipe("A", vec![Ingredient::new("卵", 2.0, "個")])).unwrap();
        let before = store.all().to_vec();

        let reopened = RecipeStore::open(store.into_backend());
        assert_eq!(reopened.all(), before.as_slice());
    }

    #[test]
    fn test_corrupt_blob_opens_empty() {
        let store = RecipeStore::open(MemoryKvStore::new().with_entry(RECIPES_KEY, "{not json"));
        assert!(store.is_empty());

        let store = RecipeStore::open(MemoryKvStore::new().with_entry(RECIPES_KEY, r#"{"id": 1}"#));
        assert!(store.is_empty());
    }

    #[test]
    fn test_decode_normalizes_malformed_records() {
        let blob = r#"[
            {"id": 1, "name": "Legacy", "servings": 0, "ingredients": "卵 2個\n塩 少々\n卵 0個\n", "steps": "焼く"},
            {"id": 2, "name": null, "ingredients": [{"name": " 米 ", "quantity": "150", "unit": "g"}]},
            {"name": "no id"},
            {"id": 1, "name": "duplicate"}
        ]"#;
        let recipes = decode_recipes(blob.as_bytes());
        assert_eq!(recipes.len(), 2);

        let legacy = &recipes[0];
        assert_eq!(legacy.servings, 1);
        assert_eq!(
            legacy.ingredients,
            vec![
                Ingredient::new("卵", 2.0, "個"),
                Ingredient::new("塩 少々", 0.0, ""),
                Ingredient::new("卵 0個", 0.0, ""),
            ]
        );
        assert!(legacy.tags.is_empty());

        let second = &recipes[1];
        assert_eq!(second.name, "");
        assert_eq!(second.ingredients, vec![Ingredient::new("米", 150.0, "g")]);
        assert_eq!(second.steps, "");
    }
}

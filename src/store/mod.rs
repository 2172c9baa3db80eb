pub mod kv;
pub mod preferences;
pub mod recipe_store;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use preferences::{PreferenceKind, PreferenceStore, Preferences};
pub use recipe_store::{RecipeStore, RECIPES_KEY};

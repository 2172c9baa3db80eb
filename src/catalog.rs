//! Browsing helpers for the recipe list: tag filter, text search and the
//! shopping-list selection.

use std::collections::HashSet;

use crate::recipe::Recipe;

/// Distinct tags across `recipes`, in first-seen order.
pub fn all_tags(recipes: &[Recipe]) -> Vec<String> {
    let mut seen = HashSet::new();
    recipes
        .iter()
        .flat_map(|r| r.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

/// Recipes carrying `tag` (when given) whose text contains `search` case-insensitively.
/// An empty search term matches everything.
pub fn filter_recipes<'a>(recipes: &'a [Recipe], tag: Option<&str>, search: &str) -> Vec<&'a Recipe> {
    let needle = search.to_lowercase();
    recipes
        .iter()
        .filter(|r| tag.map_or(true, |t| r.has_tag(t)))
        .filter(|r| needle.is_empty() || r.search_text().to_lowercase().contains(&needle))
        .collect()
}

/// Recipe ids picked for the shopping list, in selection order.
///
/// Deleting a recipe does not prune this set; [`Selection::live_ids`] drops
/// ids that no longer exist every time it is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.select(id);
        }
        selection
    }

    pub fn select(&mut self, id: i64) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Flips membership and returns whether `id` is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids that still name a recipe in `recipes`.
    pub fn live_ids(&self, recipes: &[Recipe]) -> Vec<i64> {
        let live: HashSet<i64> = recipes.iter().map(|r| r.id).collect();
        self.ids.iter().copied().filter(|id| live.contains(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn recipe(id: i64, name: &str, ingredient: &str, tags: &[&str]) -> Recipe {
        Recipe {
            id,
            name: name.to_string(),
            servings: 1,
            ingredients: vec![Ingredient::new(ingredient, 1.0, "個")],
            steps: "Bake it".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample() -> Vec<Recipe> {
        vec![
            recipe(1, "オムレツ", "卵", &["定番", "簡単"]),
            recipe(2, "肉じゃが", "じゃがいも", &["定番", "和食"]),
            recipe(3, "Pancake", "小麦粉", &[]),
        ]
    }

    #[test]
    fn test_all_tags_first_seen_order() {
        assert_eq!(all_tags(&sample()), vec!["定番", "簡単", "和食"]);
    }

    #[test]
    fn test_filter_by_tag_and_search() {
        let recipes = sample();
        let ids = |found: Vec<&Recipe>| found.iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(filter_recipes(&recipes, None, "")), vec![1, 2, 3]);
        assert_eq!(ids(filter_recipes(&recipes, Some("定番"), "")), vec![1, 2]);
        assert_eq!(ids(filter_recipes(&recipes, Some("定番"), "じゃが")), vec![2]);
        assert_eq!(ids(filter_recipes(&recipes, None, "PANCAKE")), vec![3]);
        assert_eq!(ids(filter_recipes(&recipes, None, "bake")), vec![1, 2, 3]);
        assert!(filter_recipes(&recipes, Some("洋食"), "").is_empty());
    }

    #[test]
    fn test_selection_toggle_and_live_ids() {
        let recipes = sample();
        let mut selection = Selection::from_ids([3, 1, 3]);
        assert!(selection.contains(3));
        assert!(!selection.toggle(3));
        assert!(selection.toggle(2));
        selection.select(42);

        assert_eq!(selection.live_ids(&recipes), vec![1, 2]);
        assert!(!selection.is_empty());
    }
}

use serde::Serialize;

use crate::recipe::Recipe;
use crate::store::preferences::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreferenceVerdict {
    /// Contains a disliked or allergen term.
    Warned,
    /// Contains a liked term and nothing to warn about.
    Recommended,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceAnalysis {
    /// Matching disliked terms followed by matching allergen terms.
    pub warnings: Vec<String>,
    pub is_liked: bool,
}

impl PreferenceAnalysis {
    pub fn verdict(&self) -> PreferenceVerdict {
        if !self.warnings.is_empty() {
            PreferenceVerdict::Warned
        } else if self.is_liked {
            PreferenceVerdict::Recommended
        } else {
            PreferenceVerdict::Neutral
        }
    }
}

/// Case-insensitive substring scan of `text` against the preference lists.
///
/// Liked terms are only consulted when there is no warning, so a recipe is
/// never both warned and liked.
pub fn analyze_text(text: &str, preferences: &Preferences) -> PreferenceAnalysis {
    let haystack = text.to_lowercase();
    let contains = |term: &String| !term.trim().is_empty() && haystack.contains(&term.to_lowercase());

    let warnings: Vec<String> = preferences
        .dislikes
        .iter()
        .chain(preferences.allergies.iter())
        .filter(|term| contains(*term))
        .cloned()
        .collect();
    let is_liked = warnings.is_empty() && preferences.likes.iter().any(contains);

    PreferenceAnalysis { warnings, is_liked }
}

pub fn analyze_recipe(recipe: &Recipe, preferences: &Preferences) -> PreferenceAnalysis {
    analyze_text(&recipe.search_text(), preferences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    fn prefs(likes: &[&str], dislikes: &[&str], allergies: &[&str]) -> Preferences {
        let owned = |terms: &[&str]| -> Vec<String> { terms.iter().map(|s| s.to_string()).collect() };
        Preferences {
            likes: owned(likes),
            dislikes: owned(dislikes),
            allergies: owned(allergies),
        }
    }

    fn satay() -> Recipe {
        Recipe {
            id: 1,
            name: "牛肉のサテ".to_string(),
            servings: 2,
            ingredients: vec![
                Ingredient::new("牛肉", 200.0, "g"),
                Ingredient::new("ピーナッツ", 30.0, "g"),
            ],
            steps: "Grill the BEEF\nソースをかける".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn test_allergen_suppresses_liked() {
        let analysis = analyze_recipe(&satay(), &prefs(&["牛肉"], &[], &["ピーナッツ"]));
        assert_eq!(analysis.warnings, vec!["ピーナッツ"]);
        assert!(!analysis.is_liked);
        assert_eq!(analysis.verdict(), PreferenceVerdict::Warned);
    }

    #[test]
    fn test_liked_when_no_warnings() {
        let analysis = analyze_recipe(&satay(), &prefs(&["beef"], &["パクチー"], &[]));
        assert!(analysis.warnings.is_empty());
        assert!(analysis.is_liked);
        assert_eq!(analysis.verdict(), PreferenceVerdict::Recommended);
    }

    #[test]
    fn test_warnings_keep_dislike_then_allergen_order() {
        let analysis = analyze_recipe(&satay(), &prefs(&[], &["ソース", "牛"], &["ピーナッツ"]));
        assert_eq!(analysis.warnings, vec!["ソース", "牛", "ピーナッツ"]);
    }

    #[test]
    fn test_neutral_and_blank_terms() {
        let analysis = analyze_recipe(&satay(), &prefs(&["  "], &[""], &["えび"]));
        assert_eq!(analysis.verdict(), PreferenceVerdict::Neutral);
    }

    #[test]
    fn test_terms_match_as_stored() {
        assert!(analyze_recipe(&satay(), &prefs(&[" beef"], &[], &[])).is_liked);
        assert!(!analyze_recipe(&satay(), &prefs(&["beef "], &[], &[])).is_liked);
    }
}

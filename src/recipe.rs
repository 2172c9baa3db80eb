use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

lazy_static! {
    static ref TAG_SEPARATOR_RE: Regex = Regex::new(r"[\s,，]+").unwrap();
    static ref LEADING_FLOAT_RE: Regex =
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").unwrap();
    static ref LEADING_INT_RE: Regex = Regex::new(r"^[+-]?[0-9]+").unwrap();
}

const DEFAULT_DRAFT_SERVINGS: u32 = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }

    /// Renders the ingredient as a free-text line, e.g. `"卵 2個"`.
    ///
    /// A zero quantity renders the name alone so the line reads as unparsed.
    pub fn to_line(&self) -> String {
        if self.quantity > 0.0 {
            format!("{} {}{}", self.name, format_number(self.quantity), self.unit)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: String,
    pub tags: Vec<String>,
}

impl Recipe {
    /// Ingredient lines in the free-text form the parser understands.
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients.iter().map(Ingredient::to_line).collect()
    }

    /// Non-blank instruction lines.
    pub fn step_lines(&self) -> Vec<String> {
        self.steps
            .lines()
            .filter(|step| !step.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Name, ingredient names and steps joined by spaces. Used for search and preference matching.
    pub fn search_text(&self) -> String {
        let ingredient_names = self
            .ingredients
            .iter()
            .map(|ing| ing.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {} {}", self.name, ingredient_names, self.steps)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A validated recipe that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: String,
    pub tags: Vec<String>,
}

impl NewRecipe {
    pub fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            name: self.name,
            servings: self.servings,
            ingredients: self.ingredients,
            steps: self.steps,
            tags: self.tags,
        }
    }
}

/// One editable ingredient row. The quantity stays text until the form is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientRow {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

impl IngredientRow {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
        }
    }
}

/// Create/edit form state.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub servings: String,
    pub ingredients: Vec<IngredientRow>,
    pub steps: String,
    pub tags_input: String,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            servings: DEFAULT_DRAFT_SERVINGS.to_string(),
            ingredients: vec![IngredientRow::default()],
            steps: String::new(),
            tags_input: String::new(),
        }
    }
}

impl RecipeDraft {
    /// Prefills the form from a stored recipe for editing.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let mut ingredients: Vec<IngredientRow> = recipe
            .ingredients
            .iter()
            .map(|ing| IngredientRow::new(ing.name.clone(), format_number(ing.quantity), ing.unit.clone()))
            .collect();
        if ingredients.is_empty() {
            ingredients.push(IngredientRow::default());
        }

        Self {
            name: recipe.name.clone(),
            servings: recipe.servings.to_string(),
            ingredients,
            steps: recipe.steps.clone(),
            tags_input: recipe.tags.join(", "),
        }
    }

    pub fn add_ingredient_row(&mut self) {
        self.ingredients.push(IngredientRow::default());
    }

    /// Removes a row; the last remaining row is kept.
    pub fn remove_ingredient_row(&mut self, index: usize) {
        if self.ingredients.len() > 1 && index < self.ingredients.len() {
            self.ingredients.remove(index);
        }
    }

    pub fn validate(&self) -> Result<NewRecipe, ValidationError> {
        if self.name.trim().is_empty() || self.steps.trim().is_empty() {
            return Err(ValidationError::MissingNameOrSteps);
        }

        let servings = parse_leading_int(&self.servings)
            .filter(|n| *n != 0)
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX)) as u32;

        let ingredients: Vec<Ingredient> = self
            .ingredients
            .iter()
            .map(|row| {
                Ingredient::new(
                    row.name.trim(),
                    parse_leading_float(&row.quantity).unwrap_or(0.0),
                    row.unit.trim(),
                )
            })
            .filter(|ing| !ing.name.is_empty() && ing.quantity > 0.0)
            .collect();
        if ingredients.is_empty() {
            return Err(ValidationError::NoValidIngredient);
        }

        Ok(NewRecipe {
            name: self.name.clone(),
            servings,
            ingredients,
            steps: self.steps.clone(),
            tags: parse_tags(&self.tags_input),
        })
    }
}

/// Splits the tag input on whitespace, ASCII commas and full-width commas.
pub fn parse_tags(input: &str) -> Vec<String> {
    TAG_SEPARATOR_RE
        .split(input)
        .filter(|tag| !tag.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Shortest decimal form: `4.0` prints as `4`, `0.5` as `0.5`.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Quantity multiplied by a serving count, one decimal place, trailing `.0` dropped.
pub fn scaled_quantity(quantity: f64, servings: u32) -> String {
    let formatted = format!("{:.1}", quantity * f64::from(servings));
    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

pub(crate) fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let m = LEADING_FLOAT_RE.find(text)?;
    m.as_str().trim_end_matches('.').parse::<f64>().ok()
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let m = LEADING_INT_RE.find(text)?;
    m.as_str().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> RecipeDraft {
        RecipeDraft {
            name: "トマトと卵の炒め物".to_string(),
            servings: "2".to_string(),
            ingredients: vec![
                IngredientRow::new(" トマト ", "2", " 個 "),
                IngredientRow::new("卵", "3", "個"),
            ],
            steps: "トマトを切る\n卵を溶く".to_string(),
            tags_input: "定番, 簡単　中華，卵".to_string(),
        }
    }

    #[test]
    fn test_validate_trims_and_collects() {
        let recipe = valid_draft().validate().unwrap();
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.ingredients[0], Ingredient::new("トマト", 2.0, "個"));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.tags, vec!["定番", "簡単", "中華", "卵"]);
    }

    #[test]
    fn test_validate_requires_name_and_steps() {
        let mut draft = valid_draft();
        draft.name = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingNameOrSteps));

        let mut draft = valid_draft();
        draft.steps = "\n".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingNameOrSteps));
    }

    #[test]
    fn test_validate_drops_invalid_rows() {
        let mut draft = valid_draft();
        draft.ingredients = vec![
            IngredientRow::new("", "2", "個"),
            IngredientRow::new("塩", "少々", ""),
            IngredientRow::new("砂糖", "0", "g"),
        ];
        assert_eq!(draft.validate(), Err(ValidationError::NoValidIngredient));

        draft.ingredients.push(IngredientRow::new("牛乳", "200ml", ""));
        let recipe = draft.validate().unwrap();
        assert_eq!(recipe.ingredients, vec![Ingredient::new("牛乳", 200.0, "")]);
    }

    #[test]
    fn test_servings_fallbacks() {
        let mut draft = valid_draft();
        for (input, expected) in [("abc", 1), ("0", 1), ("-3", 1), ("4.7", 4), (" 6人分", 6)] {
            draft.servings = input.to_string();
            assert_eq!(draft.validate().unwrap().servings, expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_from_recipe_round_trips_through_validation() {
        let original = valid_draft().validate().unwrap().into_recipe(42);
        let draft = RecipeDraft::from_recipe(&original);
        assert_eq!(draft.tags_input, "定番, 簡単, 中華, 卵");
        let again = draft.validate().unwrap().into_recipe(42);
        assert_eq!(again, original);
    }

    #[test]
    fn test_remove_row_keeps_last() {
        let mut draft = RecipeDraft::default();
        draft.remove_ingredient_row(0);
        assert_eq!(draft.ingredients.len(), 1);
        draft.add_ingredient_row();
        draft.remove_ingredient_row(0);
        assert_eq!(draft.ingredients.len(), 1);
    }

    #[test]
    fn test_to_line_and_step_lines() {
        let recipe = valid_draft().validate().unwrap().into_recipe(1);
        assert_eq!(recipe.ingredient_lines(), vec!["トマト 2個", "卵 3個"]);
        assert_eq!(recipe.step_lines(), vec!["トマトを切る", "卵を溶く"]);
        assert_eq!(Ingredient::new("塩 少々", 0.0, "").to_line(), "塩 少々");
    }

    #[test]
    fn test_scaled_quantity() {
        assert_eq!(scaled_quantity(2.0, 3), "6");
        assert_eq!(scaled_quantity(0.25, 3), "0.8");
        assert_eq!(scaled_quantity(1.5, 1), "1.5");
    }
}

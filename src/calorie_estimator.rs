use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::recipe::{Ingredient, Recipe};

/// Calories for one unit of an ingredient, in the unit the table expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieEntry {
    pub calories_per_unit: f64,
    pub unit: &'static str,
}

const CALORIE_TABLE: &[(&str, f64, &str)] = &[
    // 主食類
    ("小麦粉", 3.64, "g"),
    ("米", 3.46, "g"),
    ("パン", 2.65, "g"),
    // 野菜類
    ("トマト", 0.20, "g"),
    ("ブロッコリー", 0.34, "g"),
    ("じゃがいも", 0.77, "g"),
    ("玉ねぎ", 0.39, "g"),
    ("卵", 150.0, "個"),
    // タンパク質類
    ("鶏胸肉", 1.08, "g"),
    ("牛肉", 2.50, "g"),
    ("豚肉", 3.86, "g"),
    ("豆腐", 0.57, "g"),
    // 調味料・その他
    ("砂糖", 3.84, "g"),
    ("サラダ油", 9.21, "g"),
    ("牛乳", 0.67, "ml"),
];

lazy_static! {
    static ref CALORIE_INDEX: HashMap<&'static str, CalorieEntry> = CALORIE_TABLE
        .iter()
        .map(|&(name, calories_per_unit, unit)| (name, CalorieEntry { calories_per_unit, unit }))
        .collect();
}

/// Exact-name lookup in the built-in table.
pub fn lookup(name: &str) -> Option<CalorieEntry> {
    CALORIE_INDEX.get(name).copied()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieEstimate {
    /// Unrounded sum over matched ingredients.
    pub raw_total: f64,
    pub matched: usize,
}

impl CalorieEstimate {
    pub fn total(&self) -> i64 {
        self.raw_total.round() as i64
    }

    /// Real division by the serving count, then rounding. Zero servings count as one.
    pub fn per_serving(&self, servings: u32) -> i64 {
        (self.raw_total / f64::from(servings.max(1))).round() as i64
    }

    /// A zero total is shown as "not computable" rather than "0 kcal".
    pub fn is_computable(&self) -> bool {
        self.total() > 0
    }
}

/// Sums `quantity * calories_per_unit` over ingredients found in the table.
///
/// Units are not compared: "卵 100g" is counted as 100 eggs. Ingredients missing
/// from the table, or with a zero or non-finite quantity, contribute nothing.
pub fn estimate_ingredients<'a, I>(ingredients: I) -> CalorieEstimate
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut estimate = CalorieEstimate { raw_total: 0.0, matched: 0 };
    for (name, quantity) in ingredients {
        if !quantity.is_finite() || quantity == 0.0 {
            continue;
        }
        if let Some(entry) = lookup(name) {
            estimate.raw_total += quantity * entry.calories_per_unit;
            estimate.matched += 1;
        }
    }
    estimate
}

pub fn estimate(ingredients: &[Ingredient]) -> CalorieEstimate {
    estimate_ingredients(ingredients.iter().map(|ing| (ing.name.as_str(), ing.quantity)))
}

pub fn estimate_recipe(recipe: &Recipe) -> CalorieEstimate {
    estimate(&recipe.ingredients)
}

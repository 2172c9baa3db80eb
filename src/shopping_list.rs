use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::ingredient_parser::{parse_ingredient_line, ParsedIngredient};
use crate::recipe::{format_number, Recipe};

/// One merged `(name, unit)` entry.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AggregatedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl AggregatedItem {
    pub fn display(&self) -> String {
        format!("{} {}{}", self.name, format_number(self.quantity), self.unit)
    }
}

/// Accumulates ingredient lines into a shopping list.
///
/// Parsed lines are summed per exact `name|unit` key in first-seen order; lines
/// without a quantity are kept verbatim (trimmed, deduplicated) after them.
#[derive(Debug, Default)]
pub struct ShoppingListBuilder {
    items: Vec<AggregatedItem>,
    index: HashMap<String, usize>,
    unparsed: Vec<String>,
    seen_unparsed: HashSet<String>,
}

impl ShoppingListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.add_parsed(parse_ingredient_line(line));
    }

    pub fn add_parsed(&mut self, parsed: ParsedIngredient) {
        let Some(quantity) = parsed.quantity else {
            self.add_pass_through(&parsed.original);
            return;
        };

        let key = format!("{}|{}", parsed.name, parsed.unit);
        match self.index.get(&key) {
            Some(&pos) => self.items[pos].quantity += quantity,
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(AggregatedItem {
                    name: parsed.name,
                    quantity,
                    unit: parsed.unit,
                });
            }
        }
    }

    /// Stored ingredients are merged from their fields; only zero-quantity
    /// entries (kept free text) pass through as lines.
    pub fn add_recipe(&mut self, recipe: &Recipe) {
        for ing in &recipe.ingredients {
            if ing.quantity > 0.0 {
                self.add_parsed(ParsedIngredient {
                    original: ing.to_line(),
                    name: ing.name.clone(),
                    quantity: Some(ing.quantity),
                    unit: ing.unit.clone(),
                });
            } else if !ing.name.trim().is_empty() {
                self.add_pass_through(&ing.to_line());
            }
        }
    }

    fn add_pass_through(&mut self, line: &str) {
        let text = line.trim().to_string();
        if self.seen_unparsed.insert(text.clone()) {
            self.unparsed.push(text);
        }
    }

    pub fn items(&self) -> &[AggregatedItem] {
        &self.items
    }

    pub fn unparsed(&self) -> &[String] {
        &self.unparsed
    }

    /// Display lines: aggregated entries first, then pass-through lines.
    pub fn build(self) -> Vec<String> {
        self.items
            .iter()
            .map(AggregatedItem::display)
            .chain(self.unparsed)
            .collect()
    }
}

/// Shopping list for the recipes whose ids are in `selected_ids`, in collection order.
///
/// Ids that match no recipe are ignored.
pub fn generate_shopping_list(recipes: &[Recipe], selected_ids: &[i64]) -> Vec<String> {
    let selected: HashSet<i64> = selected_ids.iter().copied().collect();
    let mut builder = ShoppingListBuilder::new();
    let mut used = 0;
    for recipe in recipes.iter().filter(|r| selected.contains(&r.id)) {
        builder.add_recipe(recipe);
        used += 1;
    }
    debug!(
        "Shopping list from {} recipe(s): {} aggregated, {} pass-through",
        used,
        builder.items().len(),
        builder.unparsed().len()
    );
    builder.build()
}

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // ASCII digits only: full-width numerals stay part of the name.
    static ref INGREDIENT_LINE_RE: Regex = Regex::new(r"^(.*?)([0-9]+\.?[0-9]*)(.*)$").unwrap();
}

/// One free-text ingredient line split into its parts.
///
/// `quantity` is `None` when the line carries no number at all; such lines are
/// passed through untouched wherever they are used.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParsedIngredient {
    pub original: String,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: String,
}

impl ParsedIngredient {
    pub fn is_parsed(&self) -> bool {
        self.quantity.is_some()
    }
}

/// Splits a line on its first number: everything before is the name, everything after the unit.
///
/// Never fails. A line without digits comes back as a name-only entry with no quantity.
pub fn parse_ingredient_line(line: &str) -> ParsedIngredient {
    if let Some(caps) = INGREDIENT_LINE_RE.captures(line) {
        // "2." is a valid match; parse the digits without the dangling dot.
        let number = caps[2].trim_end_matches('.');
        if let Ok(quantity) = number.parse::<f64>() {
            return ParsedIngredient {
                original: line.to_string(),
                name: caps[1].trim().to_string(),
                quantity: Some(quantity),
                unit: caps[3].trim().to_string(),
            };
        }
    }

    ParsedIngredient {
        original: line.to_string(),
        name: line.trim().to_string(),
        quantity: None,
        unit: String::new(),
    }
}

/// Parses newline-delimited ingredient text, skipping blank lines.
pub fn parse_ingredient_lines(text: &str) -> Vec<ParsedIngredient> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_ingredient_line)
        .collect()
}

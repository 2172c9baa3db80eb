use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::store::preferences::PreferenceKind;

#[derive(Parser, Debug)]
#[command(name = "recipe-book", author, version, about = "Personal recipe book: recipes, shopping lists, calories and cooking mode", long_about = None)]
pub struct Cli {
    /// Directory holding the stored recipes and preferences
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new recipe
    Add(RecipeArgs),

    /// Edit an existing recipe; fields that are not given keep their current value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: RecipeArgs,
    },

    /// Delete a recipe (deleting an unknown id does nothing)
    Delete { id: i64 },

    /// List recipes with calories and preference warnings
    List {
        /// Only recipes carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Case-insensitive search over name, ingredients and steps
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show one recipe in detail
    Show {
        id: i64,

        /// Multiply ingredient quantities by this factor
        #[arg(short, long, default_value_t = 1)]
        servings: u32,
    },

    /// Build a shopping list from the given recipe ids
    ShoppingList {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Estimate calories for a recipe
    Calories {
        id: i64,

        /// Divide the total by the recipe's serving count
        #[arg(long)]
        per_serving: bool,
    },

    /// Manage liked, disliked and allergen terms
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Walk through a recipe's steps one at a time (n: next, p: back, q: quit)
    Cook { id: i64 },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RecipeArgs {
    /// Recipe name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Number of servings
    #[arg(long)]
    pub servings: Option<String>,

    /// Ingredient as "name,quantity,unit" or free text such as "トマト 2個" (repeatable)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// One instruction step (repeatable, kept in order)
    #[arg(long = "step")]
    pub steps: Vec<String>,

    /// Tags separated by spaces or commas
    #[arg(long)]
    pub tags: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Show all three lists
    List,
    /// Add a term to a list
    Add { kind: PreferenceKind, term: String },
    /// Remove a term from a list
    Remove { kind: PreferenceKind, term: String },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

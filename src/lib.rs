pub mod app;
pub mod calorie_estimator;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod cooking_mode;
pub mod error;
pub mod ingredient_parser;
pub mod preference_matcher;
pub mod recipe;
pub mod shopping_list;
pub mod store;

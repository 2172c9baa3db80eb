//! Command handlers behind the `recipe-book` binary.
//!
//! Output goes to any `Write` so the same code serves the terminal and tests.

use anyhow::{Context, Result};
use log::info;
use std::io::{BufRead, Write};

use crate::calorie_estimator::{estimate_recipe, CalorieEstimate};
use crate::catalog::{all_tags, filter_recipes, Selection};
use crate::cli::{Command, PrefsAction, RecipeArgs};
use crate::cooking_mode::{CookingEvent, CookingMode};
use crate::error::RecipeBookError;
use crate::ingredient_parser::parse_ingredient_line;
use crate::preference_matcher::{analyze_recipe, PreferenceAnalysis};
use crate::recipe::{format_number, scaled_quantity, IngredientRow, Recipe, RecipeDraft};
use crate::shopping_list::generate_shopping_list;
use crate::store::kv::KeyValueStore;
use crate::store::preferences::{PreferenceKind, PreferenceStore};
use crate::store::recipe_store::RecipeStore;

const NOT_FOUND_MESSAGE: &str = "レシピが見つかりません。指定されたレシピは存在しないか、削除された可能性があります。";

/// Converts one `--ingredient` argument into a form row.
///
/// `"name,quantity,unit"` is split on commas; anything else is read like a
/// free-text ingredient line.
pub fn ingredient_row_from_arg(arg: &str) -> IngredientRow {
    if arg.contains(',') {
        let mut parts = arg.splitn(3, ',');
        let name = parts.next().unwrap_or_default();
        let quantity = parts.next().unwrap_or_default();
        let unit = parts.next().unwrap_or_default();
        return IngredientRow::new(name, quantity, unit);
    }
    let parsed = parse_ingredient_line(arg);
    IngredientRow::new(
        parsed.name,
        parsed.quantity.map(format_number).unwrap_or_default(),
        parsed.unit,
    )
}

/// Overlays the given arguments on `draft`. Absent arguments leave the field untouched.
fn apply_args(draft: &mut RecipeDraft, args: &RecipeArgs) {
    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    if let Some(servings) = &args.servings {
        draft.servings = servings.clone();
    }
    if !args.ingredients.is_empty() {
        draft.ingredients = args.ingredients.iter().map(|a| ingredient_row_from_arg(a)).collect();
    }
    if !args.steps.is_empty() {
        draft.steps = args.steps.join("\n");
    }
    if let Some(tags) = &args.tags {
        draft.tags_input = tags.clone();
    }
}

pub struct App<S: KeyValueStore> {
    recipes: RecipeStore<S>,
    preferences: PreferenceStore<S>,
}

impl<S: KeyValueStore + Clone> App<S> {
    /// Opens both stores on the same backend.
    pub fn open(backend: S) -> Self {
        Self {
            recipes: RecipeStore::open(backend.clone()),
            preferences: PreferenceStore::open(backend),
        }
    }
}

impl<S: KeyValueStore> App<S> {
    pub fn recipes(&self) -> &RecipeStore<S> {
        &self.recipes
    }

    pub fn preferences(&self) -> &PreferenceStore<S> {
        &self.preferences
    }

    pub fn run<R: BufRead, W: Write>(&mut self, command: Command, input: &mut R, out: &mut W) -> Result<()> {
        match command {
            Command::Add(args) => self.add(&args, out),
            Command::Edit { id, fields } => self.edit(id, &fields, out),
            Command::Delete { id } => self.delete(id, out),
            Command::List { tag, search } => self.list(tag.as_deref(), &search, out),
            Command::Show { id, servings } => self.show(id, servings, out),
            Command::ShoppingList { ids } => self.shopping_list(&ids, out),
            Command::Calories { id, per_serving } => self.calories(id, per_serving, out),
            Command::Prefs { action } => self.prefs(action, out),
            Command::Cook { id } => self.cook(id, input, out),
        }
    }

    fn add<W: Write>(&mut self, args: &RecipeArgs, out: &mut W) -> Result<()> {
        let mut draft = RecipeDraft::default();
        apply_args(&mut draft, args);
        let new_recipe = draft.validate().map_err(RecipeBookError::from)?;
        let recipe = self.recipes.create(new_recipe).context("Failed to save the new recipe")?;
        info!("Added recipe {} ({})", recipe.id, recipe.name);
        writeln!(out, "レシピを追加しました: [{}] {}", recipe.id, recipe.name)?;
        Ok(())
    }

    fn edit<W: Write>(&mut self, id: i64, args: &RecipeArgs, out: &mut W) -> Result<()> {
        let Some(existing) = self.recipes.get(id) else {
            writeln!(out, "{}", NOT_FOUND_MESSAGE)?;
            return Ok(());
        };
        let mut draft = RecipeDraft::from_recipe(existing);
        apply_args(&mut draft, args);
        let new_recipe = draft.validate().map_err(RecipeBookError::from)?;
        let recipe = self
            .recipes
            .update(id, new_recipe)
            .with_context(|| format!("Failed to update recipe {}", id))?;
        writeln!(out, "レシピを更新しました: [{}] {}", recipe.id, recipe.name)?;
        Ok(())
    }

    fn delete<W: Write>(&mut self, id: i64, out: &mut W) -> Result<()> {
        let removed = self
            .recipes
            .delete(id)
            .with_context(|| format!("Failed to delete recipe {}", id))?;
        if removed {
            writeln!(out, "レシピを削除しました: [{}]", id)?;
        } else {
            writeln!(out, "削除するレシピはありません: [{}]", id)?;
        }
        Ok(())
    }

    fn list<W: Write>(&self, tag: Option<&str>, search: &str, out: &mut W) -> Result<()> {
        let all = self.recipes.all();
        if all.is_empty() {
            writeln!(out, "レシピがまだありません。")?;
            return Ok(());
        }

        let tags = all_tags(all);
        if !tags.is_empty() {
            writeln!(out, "タグ: {}", tags.join(", "))?;
        }

        let found = filter_recipes(all, tag, search);
        if found.is_empty() {
            writeln!(out, "検索結果に一致するレシピはありません。")?;
            return Ok(());
        }

        let preferences = self.preferences.preferences();
        for recipe in found {
            write_summary(out, recipe, &estimate_recipe(recipe), &analyze_recipe(recipe, preferences))?;
        }
        Ok(())
    }

    fn show<W: Write>(&self, id: i64, factor: u32, out: &mut W) -> Result<()> {
        let Some(recipe) = self.recipes.get(id) else {
            writeln!(out, "{}", NOT_FOUND_MESSAGE)?;
            return Ok(());
        };

        writeln!(out, "{}", recipe.name)?;
        let mut header = format!("{}人分", recipe.servings);
        for tag in &recipe.tags {
            header.push_str(&format!("  # {}", tag));
        }
        writeln!(out, "{}", header)?;

        writeln!(out)?;
        writeln!(out, "材料:")?;
        for ing in &recipe.ingredients {
            if ing.quantity > 0.0 {
                writeln!(out, "  {} {}{}", ing.name, scaled_quantity(ing.quantity, factor), ing.unit)?;
            } else {
                writeln!(out, "  {}", ing.name)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "作り方:")?;
        for (n, step) in recipe.step_lines().iter().enumerate() {
            writeln!(out, "  {}. {}", n + 1, step)?;
        }
        Ok(())
    }

    fn shopping_list<W: Write>(&self, ids: &[i64], out: &mut W) -> Result<()> {
        let all = self.recipes.all();
        let live = Selection::from_ids(ids.iter().copied()).live_ids(all);
        let list = generate_shopping_list(all, &live);

        writeln!(out, "買い物リスト")?;
        if list.is_empty() {
            writeln!(out, "購入する材料はありません。")?;
        }
        for item in list {
            writeln!(out, "- {}", item)?;
        }
        Ok(())
    }

    fn calories<W: Write>(&self, id: i64, per_serving: bool, out: &mut W) -> Result<()> {
        let Some(recipe) = self.recipes.get(id) else {
            writeln!(out, "{}", NOT_FOUND_MESSAGE)?;
            return Ok(());
        };
        let estimate = estimate_recipe(recipe);
        if !estimate.is_computable() {
            writeln!(out, "推定カロリー: 計算不可")?;
        } else if per_serving {
            writeln!(
                out,
                "推定カロリー: {} kcal / 1人分 ({}人分で {} kcal)",
                estimate.per_serving(recipe.servings),
                recipe.servings,
                estimate.total()
            )?;
        } else {
            writeln!(out, "推定カロリー: {} kcal", estimate.total())?;
        }
        Ok(())
    }

    fn prefs<W: Write>(&mut self, action: PrefsAction, out: &mut W) -> Result<()> {
        match action {
            PrefsAction::List => {
                let preferences = self.preferences.preferences();
                for kind in PreferenceKind::ALL {
                    writeln!(out, "{}: {}", kind.label(), preferences.list(kind).join(", "))?;
                }
            }
            PrefsAction::Add { kind, term } => {
                if self.preferences.add(kind, &term).context("Failed to save preferences")? {
                    writeln!(out, "{}に追加しました: {}", kind.label(), term.trim())?;
                } else {
                    writeln!(out, "変更はありません。")?;
                }
            }
            PrefsAction::Remove { kind, term } => {
                if self.preferences.remove(kind, &term).context("Failed to save preferences")? {
                    writeln!(out, "{}から削除しました: {}", kind.label(), term)?;
                } else {
                    writeln!(out, "変更はありません。")?;
                }
            }
        }
        Ok(())
    }

    /// Reads one command per line: `n` (or empty) moves on, `p` goes back, `q` quits.
    fn cook<R: BufRead, W: Write>(&self, id: i64, input: &mut R, out: &mut W) -> Result<()> {
        let Some(recipe) = self.recipes.get(id) else {
            writeln!(out, "{}", NOT_FOUND_MESSAGE)?;
            return Ok(());
        };
        let mut mode = CookingMode::start(recipe);
        if mode.is_empty() {
            writeln!(out, "このレシピには作り方の手順がありません。")?;
            return Ok(());
        }

        writeln!(out, "{}", mode.recipe_name())?;
        loop {
            let (Some(label), Some(step)) = (mode.progress_label(), mode.current_step().map(str::to_string)) else {
                break;
            };
            writeln!(out, "{}", label)?;
            writeln!(out, "  {}", step)?;
            let hint = if mode.is_last() { "[Enter] 完了  [p] 戻る  [q] 閉じる" } else { "[Enter] 次へ  [p] 戻る  [q] 閉じる" };
            writeln!(out, "{}", hint)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line).context("Failed to read cooking-mode input")? == 0 {
                mode.handle(CookingEvent::Close);
                break;
            }
            let event = match line.trim() {
                "p" => CookingEvent::Prev,
                "q" => CookingEvent::Close,
                _ if mode.is_last() => CookingEvent::Finish,
                _ => CookingEvent::Next,
            };
            mode.handle(event);
        }
        writeln!(out, "お疲れさまでした！")?;
        Ok(())
    }
}

fn write_summary<W: Write>(
    out: &mut W,
    recipe: &Recipe,
    calories: &CalorieEstimate,
    analysis: &PreferenceAnalysis,
) -> std::io::Result<()> {
    let tags: String = recipe.tags.iter().map(|t| format!(" #{}", t)).collect();
    writeln!(out, "[{}] {}{}", recipe.id, recipe.name, tags)?;
    if calories.is_computable() {
        writeln!(out, "    推定カロリー: {} kcal", calories.total())?;
    } else {
        writeln!(out, "    推定カロリー: 計算不可")?;
    }
    if !analysis.warnings.is_empty() {
        writeln!(
            out,
            "    ⚠️ 注意：苦手・アレルギーの食材が含まれています：{}",
            analysis.warnings.join(", ")
        )?;
    } else if analysis.is_liked {
        writeln!(out, "    👍 おすすめ：好みの食材が含まれています！")?;
    }
    Ok(())
}

use thiserror::Error;

/// Reasons a recipe form cannot be saved. Nothing is written when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("レシピ名と作り方を入力してください！")]
    MissingNameOrSteps,

    #[error("有効な材料を少なくとも1つ入力してください！ (材料名と数量が必要です)")]
    NoValidIngredient,
}

#[derive(Error, Debug)]
pub enum RecipeBookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Recipe not found: {0}")]
    NotFound(i64),

    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecipeBookError>;

use log::debug;
use std::env;
use std::path::PathBuf;

/// Environment variable overriding where recipe data is stored.
pub const DATA_DIR_ENV_VAR: &str = "RECIPE_BOOK_DATA_DIR";
const APP_DIR_NAME: &str = "recipe-book";
const FALLBACK_DATA_DIR: &str = ".recipe-book";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Resolves the data directory, highest priority first:
    /// 1. `--data-dir` on the command line
    /// 2. `RECIPE_BOOK_DATA_DIR` (a `.env` file is loaded before this runs)
    /// 3. the platform data directory, e.g. `~/.local/share/recipe-book`
    /// 4. `./.recipe-book`
    pub fn resolve(cli_data_dir: Option<PathBuf>) -> Self {
        let env_dir = env::var(DATA_DIR_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self::resolve_from(cli_data_dir, env_dir, dirs::data_dir())
    }

    fn resolve_from(
        cli_data_dir: Option<PathBuf>,
        env_data_dir: Option<PathBuf>,
        platform_data_dir: Option<PathBuf>,
    ) -> Self {
        let data_dir = cli_data_dir
            .or(env_data_dir)
            .or_else(|| platform_data_dir.map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR));
        debug!("Using data directory {:?}", data_dir);
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_wins_over_env() {
        let config = AppConfig::resolve_from(
            Some(PathBuf::from("/cli")),
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/platform")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/cli"));
    }

    #[test]
    fn test_env_wins_over_platform() {
        let config = AppConfig::resolve_from(None, Some(PathBuf::from("/env")), Some(PathBuf::from("/platform")));
        assert_eq!(config.data_dir, PathBuf::from("/env"));
    }

    #[test]
    fn test_platform_then_fallback() {
        let config = AppConfig::resolve_from(None, None, Some(PathBuf::from("/platform")));
        assert_eq!(config.data_dir, PathBuf::from("/platform").join("recipe-book"));

        let config = AppConfig::resolve_from(None, None, None);
        assert_eq!(config.data_dir, PathBuf::from(".recipe-book"));
    }
}

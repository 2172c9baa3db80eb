use anyhow::{Context, Result};
use log::debug;
use recipe_book::app::App;
use recipe_book::cli::parse_args;
use recipe_book::config::AppConfig;
use recipe_book::store::FileKvStore;
use std::io;

fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env so RECIPE_BOOK_DATA_DIR can live there

    let cli_args = parse_args();

    let default_filter = if cli_args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = AppConfig::resolve(cli_args.data_dir);
    debug!("Loaded config: {:?}", config);

    let mut app = App::open(FileKvStore::new(&config.data_dir));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    app.run(cli_args.command, &mut input, &mut out)
        .with_context(|| format!("Command failed (data directory: {})", config.data_dir.display()))
}

// Entrypoint for the scraper.
// - Keeps `main` small: resolve config, build the API client and hand it
//   to `scraper::run`.
// - Returns `anyhow::Result` so any setup failure is printed with context.

use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use yt_genre_scraper::config::{self, Args, Config};
use yt_genre_scraper::{scraper, ui, ApiClient};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let home = dirs::home_dir();
    let api_key = config::resolve_api_key(&args, home.as_deref(), ui::prompt_api_key)?;
    let config = Config::from_args(&args, api_key);

    let api = ApiClient::from_config(&config)?;
    let show_progress = std::io::stderr().is_terminal();
    let summary = scraper::run(api, &config, show_progress)?;

    let runtime = summary.elapsed.as_secs_f64();
    println!(
        "Data saved to {} ({} records)",
        summary.path.display(),
        summary.records
    );
    println!(
        "Total runtime: {:.2} seconds ({:.2} minutes)",
        runtime,
        runtime / 60.0
    );
    println!("Data collection complete!");
    Ok(())
}

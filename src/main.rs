//! matchday - Football fixtures from API-Football with an on-disk cache
//!
//! Prints JSON to stdout; logs go to stderr.

use std::io::{self, Write};

use clap::Parser;
use serde::Serialize;
use matchday::cli::{leagues_or_default, Cli, Command};
use matchday::config::ServiceConfig;
use matchday::MatchesService;

/// Writes `value` as pretty JSON followed by a newline
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn build_service(cli: &Cli) -> Result<MatchesService, Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_parts(cli.api_key.clone(), cli.cache_dir.clone())?;
    Ok(MatchesService::new(config)?)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    matchday::logging::init(cli.verbose);

    match run(&cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs the selected command; `Ok(false)` means it completed but reported failure
async fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Fetch {
            leagues,
            range,
            no_cache,
            max,
        } => {
            let service = build_service(cli)?;
            let options = range.to_options(*no_cache, *max);
            let leagues = leagues_or_default(leagues);
            let result = service.get_matches(leagues.as_slice(), &options).await;
            print_json(&result)?;
            return Ok(result.success);
        }
        Command::League {
            league,
            range,
            no_cache,
        } => {
            let service = build_service(cli)?;
            let date_range = range
                .to_options(*no_cache, None)
                .date_range(chrono::Utc::now().date_naive());
            let fixtures = service
                .get_league_matches(league, date_range.from, date_range.to, !no_cache)
                .await?;
            print_json(&fixtures)?;
        }
        Command::Leagues => {
            let service = MatchesService::offline(cli.cache_dir.clone())?;
            print_json(&service.get_available_leagues())?;
        }
        Command::ClearCache { league } => {
            let service = MatchesService::offline(cli.cache_dir.clone())?;
            let removed = service.clear_cache(league.as_deref())?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
    }

    Ok(true)
}

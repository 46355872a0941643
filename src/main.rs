//! pp-gateway - Query pp reworks, player breakdowns and beatmaps
//!
//! A command-line front end for the Huis pp-rework API and the osu! v1 API.
//! Logs go to stderr and are controlled with `RUST_LOG`.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pp_gateway::app::{self, App};
use pp_gateway::cli::{Cli, Command};
use pp_gateway::config::Settings;
use pp_gateway::sort::PlayerSort;

/// Sets up the tracing subscriber, defaulting to warnings and errors only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Prints `value` as pretty JSON when requested, otherwise the rendered text
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;

    // Sort options are static and need no provider access
    match &cli.command {
        Command::Sorts => {
            let sorts = PlayerSort::all();
            return emit(json, sorts, || app::render_sorts(sorts));
        }
        Command::Sort { id } => {
            let sort = PlayerSort::from_id(id)?;
            return emit(json, &sort, || sort.display_name().to_string());
        }
        _ => {}
    }

    let settings = Settings::from_args(&cli.connection)?;
    let app = App::from_settings(&settings)?;

    match cli.command {
        Command::Status => {
            let status = app.status().await?;
            emit(json, &status, || app::render_status(&status))?;
            if !status.all_up() {
                return Err("one or more providers are unavailable".into());
            }
        }
        Command::Reworks => {
            let reworks = app.reworks().await?;
            emit(json, &*reworks, || app::render_reworks(&reworks))?;
        }
        Command::Player { player, rework } => {
            let report = app.player(&player, &rework).await?;
            emit(json, &report, || app::render_player(&report))?;
        }
        Command::Beatmap { id } => {
            let beatmap = app.beatmap(id).await?;
            emit(json, &beatmap, || app::render_beatmap(&beatmap))?;
        }
        Command::Sorts | Command::Sort { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Command-line interface parsing for pp-gateway
//!
//! This module handles parsing of CLI arguments using clap. Connection
//! settings can also be supplied through environment variables.

use clap::{Args, Parser, Subcommand};

use crate::data::{HUIS_BASE_URL, OSU_BASE_URL};

/// pp-gateway - Query pp reworks on Huis and players and beatmaps on osu!
#[derive(Parser, Debug)]
#[command(name = "pp-gateway")]
#[command(about = "Query pp reworks, player breakdowns and beatmaps from Huis and osu!")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Provider endpoints and credentials
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// osu! v1 API key, required by status, beatmap and player lookups by name
    #[arg(long, env = "OSU_API_KEY", hide_env_values = true, global = true)]
    pub osu_api_key: Option<String>,

    /// Huis onion key, unlocks onion-level reworks
    #[arg(long, env = "HUIS_ONION_KEY", hide_env_values = true, global = true)]
    pub huis_onion_key: Option<String>,

    /// Base URL of the Huis API
    #[arg(long, env = "HUIS_BASE_URL", default_value = HUIS_BASE_URL, global = true)]
    pub huis_url: String,

    /// Base URL of the osu! v1 API
    #[arg(long, env = "OSU_BASE_URL", default_value = OSU_BASE_URL, global = true)]
    pub osu_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "PP_GATEWAY_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check whether both APIs are reachable
    Status,
    /// List the reworks available on Huis
    Reworks,
    /// Show a player's pp breakdown in a rework
    ///
    /// Examples:
    ///   pp-gateway player mrekk
    ///   pp-gateway player 7562902 --rework xexxar
    Player {
        /// osu! user name or numeric user id
        player: String,
        /// Rework code or numeric id
        #[arg(long, default_value = "live")]
        rework: String,
    },
    /// Show metadata for a beatmap
    Beatmap {
        /// Beatmap (difficulty) id
        id: u64,
    },
    /// List the player ranking sort options
    Sorts,
    /// Look up a player ranking sort option by id
    Sort {
        /// Sort id, e.g. old_pp_desc
        id: String,
    },
}

impl Command {
    /// Whether the command talks to the providers and so needs connection settings
    pub fn needs_providers(&self) -> bool {
        !matches!(self, Command::Sorts | Command::Sort { .. })
    }
}

//! Core data models and provider clients
//!
//! This module contains the value types returned by the Huis and osu!
//! providers, and the clients that fetch, validate and cache them.

pub(crate) mod de;
pub mod error;
pub mod huis;
pub mod osu;
pub mod transport;

pub use error::FetchError;
pub use huis::{HuisClient, HUIS_BASE_URL, REWORKS_TTL};
pub use osu::{OsuClient, UserLookup, OSU_BASE_URL};
pub use transport::{HttpTransport, RawResponse, Transport};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A variant of the pp algorithm hosted on Huis
///
/// Only `code` is required; everything else is best effort so that new or
/// renamed fields on the provider side do not break the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rework {
    /// Numeric id used in player and score endpoints
    #[serde(default, deserialize_with = "de::optional_number")]
    pub id: Option<u64>,
    /// Short code, e.g. `live`
    pub code: String,
    /// Human-readable name
    pub name: Option<String>,
    /// Link to the source of the rework
    pub url: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub description: Option<String>,
    /// Kind of rework as reported by Huis, e.g. `LIVE`, `REWORK`, `MASTER`
    pub rework_type: Option<String>,
    /// osu! ruleset the rework applies to
    #[serde(default, deserialize_with = "de::optional_number")]
    pub gamemode: Option<u8>,
}

impl Rework {
    /// The name if the provider sent one, otherwise the code
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }

    /// Whether `key` names this rework, by code (any case) or numeric id
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        if self.code.eq_ignore_ascii_case(key) {
            return true;
        }
        match (self.id, key.parse::<u64>()) {
            (Some(id), Ok(wanted)) => id == wanted,
            _ => false,
        }
    }
}

/// Finds the rework named by `key` (code or numeric id) in a rework list
pub fn find_rework<'a>(reworks: &'a [Rework], key: &str) -> Option<&'a Rework> {
    reworks.iter().find(|rework| rework.matches(key))
}

/// A player's pp breakdown in one rework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// osu! user id
    #[serde(deserialize_with = "de::number")]
    pub user_id: u64,
    pub name: Option<String>,
    /// pp under the live algorithm
    #[serde(default, deserialize_with = "de::optional_number")]
    pub old_pp: Option<f64>,
    /// pp under the rework, bonus pp included
    #[serde(default, deserialize_with = "de::optional_number")]
    pub new_pp_incl_bonus: Option<f64>,
    pub bonus_pp: f64,
    pub weighted_acc_pp: f64,
    pub weighted_aim_pp: f64,
    pub weighted_tap_pp: f64,
    pub weighted_fl_pp: f64,
    /// When Huis last recalculated the player
    #[serde(deserialize_with = "de::timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Player {
    /// New pp minus old pp, when both are known
    pub fn pp_difference(&self) -> Option<f64> {
        Some(self.new_pp_incl_bonus? - self.old_pp?)
    }

    /// New pp without the bonus pp component
    pub fn new_pp_excl_bonus(&self) -> Option<f64> {
        self.new_pp_incl_bonus.map(|pp| pp - self.bonus_pp)
    }
}

/// An osu! user as returned by the v1 `get_user` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsuUser {
    #[serde(deserialize_with = "de::number")]
    pub user_id: u64,
    pub username: String,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub pp_raw: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub pp_rank: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub pp_country_rank: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub accuracy: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub playcount: Option<u64>,
}

/// A beatmap difficulty as returned by the v1 `get_beatmaps` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    #[serde(deserialize_with = "de::number")]
    pub beatmap_id: u64,
    #[serde(deserialize_with = "de::number")]
    pub beatmapset_id: u64,
    pub title: String,
    pub artist: String,
    /// Difficulty name
    pub version: String,
    /// Mapper
    pub creator: String,
    /// Star rating
    #[serde(default, deserialize_with = "de::optional_number")]
    pub difficultyrating: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub bpm: Option<f64>,
    /// Length in seconds
    #[serde(default, deserialize_with = "de::optional_number")]
    pub total_length: Option<u32>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub max_combo: Option<u32>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub mode: Option<u8>,
    /// Circle size
    #[serde(default, deserialize_with = "de::optional_number")]
    pub diff_size: Option<f64>,
    /// Overall difficulty
    #[serde(default, deserialize_with = "de::optional_number")]
    pub diff_overall: Option<f64>,
    /// Approach rate
    #[serde(default, deserialize_with = "de::optional_number")]
    pub diff_approach: Option<f64>,
    /// HP drain
    #[serde(default, deserialize_with = "de::optional_number")]
    pub diff_drain: Option<f64>,
}

impl Beatmap {
    /// `Artist - Title [Version]`
    pub fn display_title(&self) -> String {
        format!("{} - {} [{}]", self.artist, self.title, self.version)
    }
}

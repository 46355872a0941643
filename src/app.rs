//! Command handling for pp-gateway
//!
//! `App` owns one client per provider for the lifetime of the process and
//! turns provider answers into reports for the command line. Provider
//! failures arrive here as absences; this layer only decides which message
//! to show for them.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::data::{
    Beatmap, HttpTransport, HuisClient, OsuClient, Player, Rework, Transport, UserLookup,
};
use crate::sort::PlayerSort;

/// Reasons a command could not produce its result
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// A provider could not be reached or gave an unusable answer
    #[error("The {0} API is currently unavailable, see the log for details")]
    Unavailable(&'static str),
    #[error("This command needs {0} (set the environment variable or pass the flag)")]
    MissingSetting(&'static str),
    #[error("No rework matches '{0}'. Run `pp-gateway reworks` for the list")]
    ReworkNotFound(String),
    #[error("No osu! user is named '{0}'")]
    UserNotFound(String),
    #[error("Huis has no data for player {player_id} in rework '{rework}'")]
    PlayerUnavailable { player_id: u64, rework: String },
    #[error("No beatmap with id {0} could be fetched")]
    BeatmapUnavailable(u64),
}

/// Result of probing both providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub huis: bool,
    pub osu: bool,
}

impl ProviderStatus {
    pub fn all_up(&self) -> bool {
        self.huis && self.osu
    }
}

/// A player's breakdown together with the rework it was computed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub rework: Rework,
    pub player: Player,
}

/// Holds the provider clients and runs commands against them
///
/// The osu! client exists only when an API key is configured; commands that
/// need it fail with [`AppError::MissingSetting`] otherwise.
pub struct App<T = HttpTransport> {
    huis: HuisClient<T>,
    osu: Option<OsuClient<T>>,
}

impl App<HttpTransport> {
    /// Creates the provider clients from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let huis = HuisClient::from_settings(settings)?;
        let osu = settings
            .osu_api_key
            .is_some()
            .then(|| OsuClient::from_settings(settings))
            .transpose()?;

        Ok(Self { huis, osu })
    }
}

impl<T: Transport> App<T> {
    pub fn with_clients(huis: HuisClient<T>, osu: OsuClient<T>) -> Self {
        Self {
            huis,
            osu: Some(osu),
        }
    }

    /// An app that can only run Huis commands
    pub fn without_osu(huis: HuisClient<T>) -> Self {
        Self { huis, osu: None }
    }

    pub fn huis(&self) -> &HuisClient<T> {
        &self.huis
    }

    pub fn osu(&self) -> Option<&OsuClient<T>> {
        self.osu.as_ref()
    }

    fn require_osu(&self) -> Result<&OsuClient<T>, AppError> {
        self.osu
            .as_ref()
            .ok_or(AppError::MissingSetting("OSU_API_KEY"))
    }

    /// Probes both providers concurrently
    pub async fn status(&self) -> Result<ProviderStatus, AppError> {
        let osu = self.require_osu()?;
        let (huis, osu) = futures::join!(self.huis.is_available(), osu.is_available());
        Ok(ProviderStatus { huis, osu })
    }

    pub async fn reworks(&self) -> Result<Arc<[Rework]>, AppError> {
        self.huis
            .get_reworks()
            .await
            .ok_or(AppError::Unavailable("Huis"))
    }

    /// Looks up a player's breakdown in a rework
    ///
    /// `player` is taken as an osu! user id when numeric and resolved as a
    /// user name otherwise. The rework lookup and the user lookup run
    /// concurrently.
    pub async fn player(&self, player: &str, rework: &str) -> Result<PlayerReport, AppError> {
        let player = player.trim();
        let (found, player_id) =
            futures::join!(self.huis.find_rework(rework), self.player_id(player));

        let rework = found.map_err(|e| {
            if e.is_not_found() {
                AppError::ReworkNotFound(rework.to_string())
            } else {
                AppError::Unavailable("Huis")
            }
        })?;
        let player_id = player_id?;

        // Reworks without a numeric id cannot be queried per player
        let rework_id = rework
            .id
            .ok_or_else(|| AppError::ReworkNotFound(rework.code.clone()))?;

        let player = self
            .huis
            .get_player(player_id, rework_id)
            .await
            .ok_or_else(|| AppError::PlayerUnavailable {
                player_id,
                rework: rework.code.clone(),
            })?;

        Ok(PlayerReport { rework, player })
    }

    async fn player_id(&self, player: &str) -> Result<u64, AppError> {
        if let Ok(id) = player.parse::<u64>() {
            return Ok(id);
        }

        match self.require_osu()?.resolve_user_id(player).await {
            UserLookup::Found(id) => Ok(id),
            UserLookup::NotFound => Err(AppError::UserNotFound(player.to_string())),
            UserLookup::Failed => Err(AppError::Unavailable("osu!")),
        }
    }

    pub async fn beatmap(&self, id: u64) -> Result<Beatmap, AppError> {
        self.require_osu()?
            .get_beatmap(id)
            .await
            .ok_or(AppError::BeatmapUnavailable(id))
    }
}

/// Formats a pp value the way Huis displays it
fn pp(value: f64) -> String {
    format!("{:.2}pp", value)
}

fn optional_pp(value: Option<f64>) -> String {
    value.map(pp).unwrap_or_else(|| "-".to_string())
}

/// Renders the provider status as one line per provider
pub fn render_status(status: &ProviderStatus) -> String {
    let line = |name: &str, up: bool| format!("{:<6} {}", name, if up { "up" } else { "down" });
    format!("{}\n{}", line("Huis", status.huis), line("osu!", status.osu))
}

/// Renders the rework list, one rework per line
pub fn render_reworks(reworks: &[Rework]) -> String {
    reworks
        .iter()
        .map(|rework| {
            let id = rework
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            match &rework.rework_type {
                Some(kind) => format!("{:>4}  {:<24} {} ({})", id, rework.code, rework.label(), kind),
                None => format!("{:>4}  {:<24} {}", id, rework.code, rework.label()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a player's breakdown
pub fn render_player(report: &PlayerReport) -> String {
    let player = &report.player;
    let name = player.name.as_deref().unwrap_or("<unknown>");
    let difference = player
        .pp_difference()
        .map(|diff| format!("{:+.2}pp", diff))
        .unwrap_or_else(|| "-".to_string());

    [
        format!("{} ({}) in {}", name, player.user_id, report.rework.label()),
        format!("  Old PP      {}", optional_pp(player.old_pp)),
        format!("  New PP      {} ({})", optional_pp(player.new_pp_incl_bonus), difference),
        format!("  Excl. bonus {}", optional_pp(player.new_pp_excl_bonus())),
        format!("  Bonus       {}", pp(player.bonus_pp)),
        format!("  Aim         {}", pp(player.weighted_aim_pp)),
        format!("  Tap         {}", pp(player.weighted_tap_pp)),
        format!("  Acc         {}", pp(player.weighted_acc_pp)),
        format!("  FL          {}", pp(player.weighted_fl_pp)),
        format!("  Updated     {}", player.last_updated.format("%Y-%m-%d %H:%M UTC")),
    ]
    .join("\n")
}

/// Renders beatmap metadata
pub fn render_beatmap(map: &Beatmap) -> String {
    let stat = |value: Option<f64>| {
        value
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut lines = vec![
        format!("{} by {}", map.display_title(), map.creator),
        format!(
            "  https://osu.ppy.sh/b/{}  (set {})",
            map.beatmap_id, map.beatmapset_id
        ),
        format!(
            "  CS {}  OD {}  AR {}  HP {}",
            stat(map.diff_size),
            stat(map.diff_overall),
            stat(map.diff_approach),
            stat(map.diff_drain)
        ),
    ];
    if let Some(stars) = map.difficultyrating {
        lines.push(format!("  {:.2}*", stars));
    }
    if let (Some(length), Some(bpm)) = (map.total_length, map.bpm) {
        lines.push(format!("  {}:{:02}  {} BPM", length / 60, length % 60, bpm));
    }
    lines.join("\n")
}

/// Renders the sort options as `id  label` lines
pub fn render_sorts(sorts: &[PlayerSort]) -> String {
    sorts
        .iter()
        .map(|sort| format!("{:<28} {}", sort.id(), sort.display_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

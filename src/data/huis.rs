//! Huis pp-rework API client
//!
//! Fetches the list of reworks (cached for five minutes) and per-player pp
//! breakdowns from https://pp-api.huismetbenen.nl/.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, error, warn};

use super::transport::{HttpTransport, Transport};
use super::{find_rework, FetchError, Player, Rework};
use crate::cache::ExpiringCache;
use crate::config::{ConfigError, Settings};

/// Base URL of the Huis API
pub const HUIS_BASE_URL: &str = "https://pp-api.huismetbenen.nl/";

/// How long a fetched rework list is served without refetching
pub const REWORKS_TTL: Duration = Duration::from_secs(5 * 60);

/// Exact body the API root answers with while the service is up
const AVAILABILITY_SENTINEL: &str = "Cannot GET /";

const REWORKS_PATH: &str = "reworks/list";

/// Header carrying the optional onion key
const ONION_KEY_HEADER: &str = "x-onion-key";

/// Client for the Huis API
///
/// Construct once and share by reference: the rework cache lives inside the
/// client, so every caller benefits from the same cached list.
#[derive(Debug)]
pub struct HuisClient<T = HttpTransport> {
    transport: T,
    reworks: ExpiringCache<Arc<[Rework]>>,
}

impl HuisClient<HttpTransport> {
    /// Creates a client for the configured base URL, attaching the onion key if set
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &settings.huis_onion_key {
            let value = HeaderValue::from_str(key).map_err(|e| ConfigError::InvalidValue {
                field: "huis_onion_key",
                reason: e.to_string(),
            })?;
            headers.insert(ONION_KEY_HEADER, value);
        }

        let client = HttpTransport::client_builder(settings.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_transport(HttpTransport::new(
            client,
            settings.huis_base_url.clone(),
        )))
    }
}

impl<T: Transport> HuisClient<T> {
    /// Creates a client on top of an arbitrary transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            reworks: ExpiringCache::new(REWORKS_TTL),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns whether the Huis API is reachable and answering as expected
    ///
    /// Never fails; the reason for a negative answer is logged.
    pub async fn is_available(&self) -> bool {
        match self.check_availability().await {
            Ok(()) => true,
            Err(e) => {
                error!(provider = "huis", error = %e, "Availability probe failed");
                false
            }
        }
    }

    async fn check_availability(&self) -> Result<(), FetchError> {
        let response = self.transport.get("", &[]).await?.expect_success()?;
        if response.body != AVAILABILITY_SENTINEL {
            return Err(FetchError::UnexpectedBody(response.body));
        }
        Ok(())
    }

    /// Returns all reworks, from cache while fresh
    ///
    /// Returns `None` if the list could not be fetched or came back empty.
    /// An expired list is never returned, even when the refresh fails.
    pub async fn get_reworks(&self) -> Option<Arc<[Rework]>> {
        match self.try_get_reworks().await {
            Ok(reworks) => Some(reworks),
            Err(e) => {
                error!(
                    provider = "huis",
                    endpoint = REWORKS_PATH,
                    error = %e,
                    "Failed to get the list of reworks"
                );
                None
            }
        }
    }

    /// Like [`HuisClient::get_reworks`], but reports why the list is unavailable
    pub async fn try_get_reworks(&self) -> Result<Arc<[Rework]>, FetchError> {
        if let Some(reworks) = self.reworks.get_fresh() {
            return Ok(reworks);
        }

        let response = self
            .transport
            .get(REWORKS_PATH, &[])
            .await?
            .expect_success()?;
        let reworks: Vec<Rework> = serde_json::from_str(&response.body)?;

        // There is always at least the live rework; an empty list means a broken response
        if reworks.is_empty() {
            return Err(FetchError::Empty);
        }

        let reworks: Arc<[Rework]> = reworks.into();
        self.reworks.set(Arc::clone(&reworks));
        debug!(count = reworks.len(), "Refreshed cached rework list");

        Ok(reworks)
    }

    /// Finds a rework by code or numeric id in the (cached) rework list
    ///
    /// Fails with [`FetchError::NotFound`] when the list has no such rework;
    /// any other error means the list itself is unavailable.
    pub async fn find_rework(&self, key: &str) -> Result<Rework, FetchError> {
        let reworks = self.try_get_reworks().await.inspect_err(|e| {
            error!(
                provider = "huis",
                endpoint = REWORKS_PATH,
                error = %e,
                "Failed to get the list of reworks"
            );
        })?;

        find_rework(&reworks, key).cloned().ok_or_else(|| {
            warn!(provider = "huis", rework = key, "No rework matches");
            FetchError::NotFound
        })
    }

    /// Returns the given player's pp breakdown in the given rework
    ///
    /// Always hits the API. Returns `None` on any failure; whether the
    /// request or the payload was at fault only shows up in the log.
    pub async fn get_player(&self, player_id: u64, rework_id: u64) -> Option<Player> {
        match self.try_get_player(player_id, rework_id).await {
            Ok(player) => Some(player),
            Err(e @ FetchError::Parse(_)) => {
                error!(
                    provider = "huis",
                    player_id,
                    rework_id,
                    error = %e,
                    "Failed to deserialize the player"
                );
                None
            }
            Err(e) => {
                error!(
                    provider = "huis",
                    player_id,
                    rework_id,
                    error = %e,
                    "Failed to get the player"
                );
                None
            }
        }
    }

    /// Like [`HuisClient::get_player`], but reports why the player is unavailable
    pub async fn try_get_player(&self, player_id: u64, rework_id: u64) -> Result<Player, FetchError> {
        let path = player_path(player_id, rework_id);
        let response = self.transport.get(&path, &[]).await?.expect_success()?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

fn player_path(player_id: u64, rework_id: u64) -> String {
    format!("player/userdata/{}/{}", player_id, rework_id)
}

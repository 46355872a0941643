//! osu! v1 API client
//!
//! Resolves user names to ids and fetches beatmap metadata from
//! https://osu.ppy.sh/api/. Every request carries the configured API key as
//! the `k` query parameter; the key is never logged.

use reqwest::redirect::Policy;
use tracing::{error, warn};

use super::transport::{HttpTransport, Transport};
use super::{Beatmap, FetchError, OsuUser};
use crate::config::{ConfigError, Settings};

/// Base URL of the osu! v1 API
pub const OSU_BASE_URL: &str = "https://osu.ppy.sh/api/";

/// Status the API root answers with while the service is up
const AVAILABILITY_STATUS: u16 = 302;

const USER_PATH: &str = "get_user";
const BEATMAPS_PATH: &str = "get_beatmaps";

/// Outcome of resolving a user name to an id
///
/// "No such user" and "could not ask" are different answers: the first is
/// final, the second may succeed on a later attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup {
    /// The user exists and has this id
    Found(u64),
    /// The API answered that no user has this name
    NotFound,
    /// The API could not be asked or gave an unusable answer
    Failed,
}

impl UserLookup {
    pub fn id(&self) -> Option<u64> {
        match self {
            UserLookup::Found(id) => Some(*id),
            UserLookup::NotFound | UserLookup::Failed => None,
        }
    }
}

/// Client for the osu! v1 API
#[derive(Debug)]
pub struct OsuClient<T = HttpTransport> {
    transport: T,
    api_key: String,
}

impl OsuClient<HttpTransport> {
    /// Creates a client for the configured base URL and API key
    ///
    /// Fails when no API key is configured. Redirects are not followed,
    /// since the availability probe looks for the redirect itself.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = settings
            .osu_api_key
            .clone()
            .ok_or(ConfigError::MissingValue("OSU_API_KEY"))?;

        let client = HttpTransport::client_builder(settings.request_timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self::with_transport(
            HttpTransport::new(client, settings.osu_base_url.clone()),
            api_key,
        ))
    }
}

impl<T: Transport> OsuClient<T> {
    /// Creates a client on top of an arbitrary transport
    pub fn with_transport(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns whether the osu! API is reachable
    ///
    /// The API root redirects to the website, so only a 302 counts as up.
    pub async fn is_available(&self) -> bool {
        match self.check_availability().await {
            Ok(()) => true,
            Err(e) => {
                error!(provider = "osu", error = %e, "Availability probe failed");
                false
            }
        }
    }

    async fn check_availability(&self) -> Result<(), FetchError> {
        let response = self.transport.get("", &[]).await?;
        if response.status != AVAILABILITY_STATUS {
            return Err(FetchError::UnexpectedStatus {
                expected: "302",
                actual: response.status,
            });
        }
        Ok(())
    }

    /// Fetches the user with the given name
    ///
    /// The API answers `[]` for unknown names, which becomes
    /// [`FetchError::NotFound`].
    pub async fn get_user(&self, name: &str) -> Result<OsuUser, FetchError> {
        let query = [("u", name), ("type", "string"), ("k", self.api_key.as_str())];
        let response = self
            .transport
            .get(USER_PATH, &query)
            .await?
            .expect_success()?;
        let users: Vec<OsuUser> = serde_json::from_str(&response.body)?;

        users.into_iter().next().ok_or(FetchError::NotFound)
    }

    /// Resolves a user name to an osu! user id
    pub async fn resolve_user_id(&self, name: &str) -> UserLookup {
        match self.get_user(name).await {
            Ok(user) => UserLookup::Found(user.user_id),
            Err(e) if e.is_not_found() => {
                warn!(provider = "osu", endpoint = USER_PATH, user = name, "User not found");
                UserLookup::NotFound
            }
            Err(e) => {
                error!(
                    provider = "osu",
                    endpoint = USER_PATH,
                    user = name,
                    error = %e,
                    "Failed to get the user"
                );
                UserLookup::Failed
            }
        }
    }

    /// Fetches the beatmap with the given id
    ///
    /// Returns `None` when the request fails or the API does not return a
    /// beatmap with exactly this id.
    pub async fn get_beatmap(&self, id: u64) -> Option<Beatmap> {
        match self.try_get_beatmap(id).await {
            Ok(beatmap) => Some(beatmap),
            Err(e) => {
                error!(
                    provider = "osu",
                    endpoint = BEATMAPS_PATH,
                    beatmap_id = id,
                    error = %e,
                    "Failed to get the beatmap"
                );
                None
            }
        }
    }

    /// Like [`OsuClient::get_beatmap`], but reports why no beatmap was returned
    ///
    /// The API may answer with loosely matching candidates; only a record
    /// whose own id equals `id` is accepted.
    pub async fn try_get_beatmap(&self, id: u64) -> Result<Beatmap, FetchError> {
        let id_param = id.to_string();
        let query = [("b", id_param.as_str()), ("k", self.api_key.as_str())];
        let response = self
            .transport
            .get(BEATMAPS_PATH, &query)
            .await?
            .expect_success()?;
        let candidates: Vec<Beatmap> = serde_json::from_str(&response.body)?;

        if candidates.is_empty() {
            return Err(FetchError::NotFound);
        }

        let returned: Vec<u64> = candidates.iter().map(|map| map.beatmap_id).collect();
        candidates
            .into_iter()
            .find(|map| map.beatmap_id == id)
            .ok_or(FetchError::Mismatch {
                requested: id,
                returned,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transport::{fake::FakeTransport, local};
    use crate::data::HUIS_BASE_URL;
    use reqwest::Url;
    use std::time::Duration;

    const KEY: &str = "test-key";

    fn settings(osu_base_url: Url, api_key: Option<&str>) -> Settings {
        Settings {
            huis_base_url: Url::parse(HUIS_BASE_URL).unwrap(),
            osu_base_url,
            osu_api_key: api_key.map(str::to_string),
            huis_onion_key: None,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn beatmap_json(id: u64) -> String {
        format!(
            r#"{{
                "beatmap_id": "{id}",
                "beatmapset_id": "1000",
                "title": "Blue Zenith",
                "artist": "xi",
                "version": "FOUR DIMENSIONS",
                "creator": "Asphyxia",
                "difficultyrating": "7.1",
                "bpm": "200",
                "total_length": "245",
                "max_combo": "2402",
                "mode": "0"
            }}"#
        )
    }

    fn client(fake: FakeTransport) -> OsuClient<FakeTransport> {
        OsuClient::with_transport(fake, KEY)
    }

    #[tokio::test]
    async fn test_available_on_redirect() {
        let osu = client(FakeTransport::new().reply("", 302, ""));
        assert!(osu.is_available().await);
    }

    #[tokio::test]
    async fn test_unavailable_on_other_statuses() {
        for status in [200, 301, 404, 500] {
            let osu = client(FakeTransport::new().reply("", status, ""));
            assert!(!osu.is_available().await, "status {status} should not count as up");
        }
    }

    #[tokio::test]
    async fn test_unavailable_on_transport_error() {
        let osu = client(FakeTransport::new().fail("", "dns failure"));
        assert!(!osu.is_available().await);
    }

    #[tokio::test]
    async fn test_resolve_user_id_found() {
        let osu = client(FakeTransport::new().reply(
            USER_PATH,
            200,
            r#"[{"user_id": "124493", "username": "Cookiezi"}]"#,
        ));

        assert_eq!(osu.resolve_user_id("Cookiezi").await, UserLookup::Found(124493));

        let calls = osu.transport().calls();
        assert_eq!(
            calls[0].query,
            vec![
                ("u".to_string(), "Cookiezi".to_string()),
                ("type".to_string(), "string".to_string()),
                ("k".to_string(), KEY.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_user_id_distinguishes_not_found_from_failure() {
        let not_found = client(FakeTransport::new().reply(USER_PATH, 200, "[]"));
        assert_eq!(not_found.resolve_user_id("nobody").await, UserLookup::NotFound);

        let broken = client(FakeTransport::new().reply(USER_PATH, 200, "<html>"));
        assert_eq!(broken.resolve_user_id("nobody").await, UserLookup::Failed);

        let down = client(FakeTransport::new().fail(USER_PATH, "connection reset"));
        assert_eq!(down.resolve_user_id("nobody").await, UserLookup::Failed);

        let rejected = client(FakeTransport::new().reply(USER_PATH, 401, "[]"));
        assert_eq!(rejected.resolve_user_id("nobody").await, UserLookup::Failed);
    }

    #[tokio::test]
    async fn test_get_user_not_found_error() {
        let osu = client(FakeTransport::new().reply(USER_PATH, 200, "[]"));
        assert!(osu.get_user("nobody").await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_user_lookup_id() {
        assert_eq!(UserLookup::Found(3).id(), Some(3));
        assert_eq!(UserLookup::NotFound.id(), None);
        assert_eq!(UserLookup::Failed.id(), None);
    }

    #[tokio::test]
    async fn test_get_beatmap_exact_match() {
        let body = format!("[{}]", beatmap_json(42));
        let osu = client(FakeTransport::new().reply(BEATMAPS_PATH, 200, &body));

        let map = osu.get_beatmap(42).await.expect("Exact match should be returned");
        assert_eq!(map.beatmap_id, 42);

        let calls = osu.transport().calls();
        assert_eq!(calls[0].query[0], ("b".to_string(), "42".to_string()));
    }

    #[tokio::test]
    async fn test_get_beatmap_rejects_mismatched_id() {
        let body = format!("[{}]", beatmap_json(43));
        let osu = client(FakeTransport::new().reply(BEATMAPS_PATH, 200, &body));

        assert!(osu.get_beatmap(42).await.is_none());
        match osu.try_get_beatmap(42).await {
            Err(FetchError::Mismatch {
                requested,
                returned,
            }) => {
                assert_eq!(requested, 42);
                assert_eq!(returned, vec![43]);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_beatmap_picks_match_among_candidates() {
        let body = format!("[{}, {}]", beatmap_json(41), beatmap_json(42));
        let osu = client(FakeTransport::new().reply(BEATMAPS_PATH, 200, &body));

        assert_eq!(osu.get_beatmap(42).await.unwrap().beatmap_id, 42);
    }

    #[tokio::test]
    async fn test_get_beatmap_empty_is_not_found() {
        let osu = client(FakeTransport::new().reply(BEATMAPS_PATH, 200, "[]"));

        assert!(osu.get_beatmap(42).await.is_none());
        assert!(osu.try_get_beatmap(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_beatmap_malformed_payload() {
        let osu = client(FakeTransport::new().reply(
            BEATMAPS_PATH,
            200,
            r#"{"error": "Please provide a valid API key."}"#,
        ));

        assert!(matches!(
            osu.try_get_beatmap(42).await,
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_from_settings_requires_api_key() {
        let settings = settings(Url::parse(OSU_BASE_URL).unwrap(), None);
        assert!(matches!(
            OsuClient::from_settings(&settings),
            Err(ConfigError::MissingValue("OSU_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn test_probe_sees_redirect_instead_of_following_it() {
        // Following the redirect would hit a closed port and fail the probe
        let target = local::closed_base_url().await;
        let redirect = format!("Location: {target}\r\n");
        let (base_url, server) = local::serve_once(local::response("302 Found", &redirect, "")).await;

        let osu = OsuClient::from_settings(&settings(base_url, Some(KEY))).unwrap();
        assert!(osu.is_available().await);
        assert!(server.await.unwrap().starts_with("GET /api/ HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_user_name_is_encoded_in_request() {
        let (base_url, server) = local::serve_once(local::response(
            "200 OK",
            "Content-Type: application/json\r\n",
            r#"[{"user_id": "7", "username": "some name"}]"#,
        ))
        .await;

        let osu = OsuClient::from_settings(&settings(base_url, Some(KEY))).unwrap();
        assert_eq!(osu.resolve_user_id("some name").await, UserLookup::Found(7));

        let head = server.await.unwrap();
        assert!(
            head.starts_with("GET /api/get_user?u=some+name&type=string&k=test-key HTTP/1.1\r\n"),
            "{head}"
        );
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_reveal_api_key() {
        let base_url = local::closed_base_url().await;
        let osu = OsuClient::from_settings(&settings(base_url, Some("SUPERSECRET"))).unwrap();

        let err = osu.try_get_beatmap(42).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));

        let mut rendered = vec![err.to_string(), format!("{err:?}")];
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            rendered.push(inner.to_string());
            source = inner.source();
        }
        for text in rendered {
            assert!(!text.contains("SUPERSECRET"), "API key leaked: {text}");
        }
        assert!(osu.get_beatmap(42).await.is_none());
    }
}

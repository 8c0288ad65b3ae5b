// Typed helpers for backend resources
//
// Record shapes are owned by the backend, so everything is returned as JSON.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ClientError, Result};
use crate::http_client::ApiClient;

/// Default page size for the leaderboard
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;

impl ApiClient {
    pub fn tournaments(&self) -> TournamentsApi<'_> {
        TournamentsApi { client: self }
    }

    pub fn players(&self) -> PlayersApi<'_> {
        PlayersApi { client: self }
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi { client: self }
    }

    pub fn achievements(&self) -> AchievementsApi<'_> {
        AchievementsApi { client: self }
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi { client: self }
    }

    pub fn player_finder(&self) -> PlayerFinderApi<'_> {
        PlayerFinderApi { client: self }
    }

    pub fn upl(&self) -> UplApi<'_> {
        UplApi { client: self }
    }
}

pub struct TournamentsApi<'a> {
    client: &'a ApiClient,
}

impl TournamentsApi<'_> {
    pub async fn list(&self, params: &[(&str, String)]) -> Result<Value> {
        Ok(self.client.get("/tournaments/", params).await?.into_json())
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        let endpoint = format!("/tournaments/{}/", id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }

    pub async fn create<T: Serialize + ?Sized>(&self, data: &T) -> Result<Value> {
        Ok(self.client.post("/tournaments/", data).await?.into_json())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let endpoint = format!("/tournaments/{}/", id);
        self.client.delete(&endpoint).await?;
        Ok(())
    }
}

pub struct PlayersApi<'a> {
    client: &'a ApiClient,
}

impl PlayersApi<'_> {
    pub async fn list(&self, params: &[(&str, String)]) -> Result<Value> {
        Ok(self.client.get("/players/", params).await?.into_json())
    }

    pub async fn get(&self, id: u64) -> Result<Value> {
        let endpoint = format!("/players/{}/", id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }

    /// Top players, optionally restricted to one position
    pub async fn leaderboard(&self, position: Option<&str>, limit: Option<u32>) -> Result<Value> {
        let mut params = vec![(
            "limit",
            limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).to_string(),
        )];
        if let Some(position) = position.filter(|p| !p.is_empty()) {
            params.push(("position", position.to_string()));
        }
        Ok(self
            .client
            .get("/players/leaderboard/", &params)
            .await?
            .into_json())
    }

    pub async fn update_stats<T: Serialize + ?Sized>(&self, id: u64, stats: &T) -> Result<Value> {
        let endpoint = format!("/players/{}/update_stats/", id);
        Ok(self.client.post(&endpoint, stats).await?.into_json())
    }

    pub async fn rating_history(&self, id: u64) -> Result<Value> {
        let endpoint = format!("/players/{}/rating_history/", id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }

    pub async fn search(&self, query: &str, filters: &[(&str, String)]) -> Result<Value> {
        let mut params = vec![("q", query.to_string())];
        params.extend(filters.iter().cloned());
        Ok(self
            .client
            .get("/players/search/", &params)
            .await?
            .into_json())
    }
}

pub struct AnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl AnalyticsApi<'_> {
    pub async fn team(&self, team_id: u64) -> Result<Value> {
        let endpoint = format!("/analytics/teams/{}/", team_id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }

    pub async fn performance_trend(&self, team_id: u64) -> Result<Value> {
        let endpoint = format!("/analytics/teams/{}/performance_trend/", team_id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }

    pub async fn strengths_weaknesses(&self, team_id: u64) -> Result<Value> {
        let endpoint = format!("/analytics/teams/{}/strengths_weaknesses/", team_id);
        Ok(self.client.get(&endpoint, &[]).await?.into_json())
    }
}

pub struct AchievementsApi<'a> {
    client: &'a ApiClient,
}

impl AchievementsApi<'_> {
    pub async fn all(&self) -> Result<Value> {
        Ok(self.client.get("/achievements/", &[]).await?.into_json())
    }

    pub async fn mine(&self) -> Result<Value> {
        Ok(self
            .client
            .get("/user-achievements/", &[])
            .await?
            .into_json())
    }

    pub async fn check_progress(&self) -> Result<Value> {
        Ok(self
            .client
            .get("/user-achievements/check_progress/", &[])
            .await?
            .into_json())
    }
}

pub struct NotificationsApi<'a> {
    client: &'a ApiClient,
}

impl NotificationsApi<'_> {
    pub async fn all(&self) -> Result<Value> {
        Ok(self.client.get("/notifications/", &[]).await?.into_json())
    }

    pub async fn unread(&self) -> Result<Value> {
        Ok(self
            .client
            .get("/notifications/unread/", &[])
            .await?
            .into_json())
    }

    pub async fn mark_read(&self, id: u64) -> Result<Value> {
        let endpoint = format!("/notifications/{}/mark_read/", id);
        Ok(self.client.post_empty(&endpoint).await?.into_json())
    }

    pub async fn mark_all_read(&self) -> Result<Value> {
        Ok(self
            .client
            .post_empty("/notifications/mark_all_read/")
            .await?
            .into_json())
    }
}

pub struct PlayerFinderApi<'a> {
    client: &'a ApiClient,
}

impl PlayerFinderApi<'_> {
    pub async fn search(&self, filters: &[(&str, String)]) -> Result<Value> {
        Ok(self
            .client
            .get("/player-finder/search/", filters)
            .await?
            .into_json())
    }

    pub async fn team_requests(&self) -> Result<Value> {
        Ok(self.client.get("/team-requests/", &[]).await?.into_json())
    }
}

/// Real UPL squads, cached server-side
pub struct UplApi<'a> {
    client: &'a ApiClient,
}

impl UplApi<'_> {
    /// Squad for `team_name`; any failure yields an empty squad with `source: "error"`
    pub async fn squad(&self, team_name: &str) -> Value {
        match self.fetch_squad(team_name).await {
            Ok(squad) => squad,
            Err(e) => {
                tracing::warn!(team = %team_name, error = %e, "Could not fetch UPL squad");
                json!({ "players": [], "source": "error" })
            }
        }
    }

    async fn fetch_squad(&self, team_name: &str) -> Result<Value> {
        let mut url = self.client.resolve_url("/upl/squad/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("base url cannot have a path".to_string()))?
            .pop_if_empty()
            .push(team_name)
            .push("");

        Ok(self.client.get_public(url).await?.into_json())
    }
}

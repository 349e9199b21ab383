//! Match query endpoints

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{MatchRecord, PastMatchesResponse};

/// Filters for the past-matches query
///
/// All fields are optional and combine on the server side. An empty query
/// returns the most recent matches up to the server default limit.
#[derive(Debug, Clone, Default)]
pub struct PastMatchesQuery {
    /// Substring match on either participant name
    pub player: Option<String>,
    /// Restrict to one tournament id
    pub tournament: Option<String>,
    /// Maximum number of records to return
    pub limit: Option<u32>,
}

impl PastMatchesQuery {
    /// Query with no filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by participant name
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    /// Filter by tournament id
    pub fn with_tournament(mut self, tournament: impl Into<String>) -> Self {
        self.tournament = Some(tournament.into());
        self
    }

    /// Cap the number of returned records
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(player) = &self.player {
            params.push(("player", player.clone()));
        }
        if let Some(tournament) = &self.tournament {
            params.push(("tournament", tournament.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

impl Client {
    /// Fetch the bootstrap snapshot of currently-live matches
    ///
    /// Issues `GET {base_url}/api/matches?status=Live` and decodes a JSON
    /// array of [`MatchRecord`]. Called once per engine activation; the
    /// engine treats any error as an empty snapshot and leans on the
    /// stream, so no retry happens here.
    pub async fn live_matches(&self) -> Result<Vec<MatchRecord>> {
        let url = self.config().live_matches_url();
        let response = self.http().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "live matches fetch returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Fetch past matches matching the given filters
    ///
    /// Issues `GET {base_url}/api/matches/past` with `player`, `tournament`
    /// and `limit` query parameters as provided.
    pub async fn past_matches(&self, query: &PastMatchesQuery) -> Result<Vec<MatchRecord>> {
        let url = self.config().past_matches_url();
        let response = self.http().get(&url).query(&query.params()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "past matches fetch returned {}",
                response.status()
            )));
        }
        let body: PastMatchesResponse = response.json().await?;
        Ok(body.matches)
    }
}

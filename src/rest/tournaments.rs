//! Tournament query endpoints

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::Tournament;

impl Client {
    /// Fetch tournaments, optionally filtered by status
    ///
    /// Issues `GET {base_url}/api/tournaments` or
    /// `GET {base_url}/api/tournaments?status={status}`. Status values are
    /// the backend's labels: "upcoming", "ongoing", "completed".
    pub async fn tournaments(&self, status: Option<&str>) -> Result<Vec<Tournament>> {
        let url = self.config().tournaments_url(status);
        let response = self.http().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "tournaments fetch returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

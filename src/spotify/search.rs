use crate::{
    error::ServiceError,
    types::{SearchResponse, TokenPair, TrackObject},
};

use super::{SpotifyClient, decode};

impl SpotifyClient {
    /// Runs a single track search against `GET /search`.
    ///
    /// `query` is passed as the `q` parameter unchanged; reqwest takes care of
    /// the percent-encoding. Only the first page is fetched, so at most
    /// `limit` tracks are returned. `null` entries in the page are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// let tracks = client.search(&token, "genre:\"rock\"", 5).await?;
    /// ```
    pub(crate) async fn search(
        &self,
        token: &TokenPair,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, ServiceError> {
        let limit = limit.to_string();
        let res = self
            .http
            .get(self.api("search"))
            .bearer_auth(&token.access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        let page: SearchResponse = decode(res).await?;
        Ok(page
            .tracks
            .map(|t| t.items.into_iter().flatten().collect())
            .unwrap_or_default())
    }
}

use crate::{
    error::ServiceError,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUser, TokenPair,
    },
};

use super::{SpotifyClient, decode};

impl SpotifyClient {
    /// Fetches the profile of the user the token belongs to.
    pub(crate) async fn me(&self, token: &TokenPair) -> Result<CurrentUser, ServiceError> {
        let res = self
            .http
            .get(self.api("me"))
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        decode(res).await
    }

    /// Creates a playlist owned by `owner_id`.
    ///
    /// The response carries the playlist id needed to add items and the
    /// `external_urls.spotify` link shown to the user.
    pub(crate) async fn create(
        &self,
        token: &TokenPair,
        owner_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ServiceError> {
        let res = self
            .http
            .post(self.api(&format!("users/{}/playlists", owner_id)))
            .bearer_auth(&token.access_token)
            .json(request)
            .send()
            .await?;

        decode(res).await
    }

    /// Adds tracks to a playlist in one request.
    ///
    /// Spotify accepts up to 100 URIs per call; the search limit keeps us
    /// well below that.
    pub(crate) async fn add_tracks(
        &self,
        token: &TokenPair,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ServiceError> {
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let res = self
            .http
            .post(self.api(&format!("playlists/{}/tracks", playlist_id)))
            .bearer_auth(&token.access_token)
            .json(&body)
            .send()
            .await?;

        decode(res).await
    }
}

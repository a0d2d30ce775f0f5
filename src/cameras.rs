// Camera endpoints
//
// Group listing on the camera host, two-tier group selection, camera
// UUID resolution, and the pure stream-URL builder.

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::client::IntersvyazClient;
use crate::error::Error;
use crate::models::{AuthToken, Camera, CameraEntry, CameraGroup};

impl IntersvyazClient {
    /// List camera groups visible to the account.
    ///
    /// `GET /api/get-group/` on the camera host, with `?selfCams=true`
    /// when asking for self-owned cameras instead of shared ones.
    pub async fn list_camera_groups(
        &self,
        token: &AuthToken,
        self_cams: bool,
    ) -> Result<Vec<CameraGroup>, Error> {
        let path = if self_cams {
            "/api/get-group/?selfCams=true"
        } else {
            "/api/get-group/"
        };
        let url = self.cams_url(path)?;
        debug!(self_cams, "listing camera groups");

        let (status, text) = self.get_with_token(url, token).await?;
        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        self.parse_json(&text)
    }

    /// Resolve the camera group for the account.
    ///
    /// Prefers the shared building-wide group, selected by name prefix
    /// from the primary listing. Not every account has the communal
    /// group provisioned, so when no name matches, a second request with
    /// `?selfCams=true` looks for the group exactly named as the
    /// self-owned fallback. Neither match is [`Error::NoGroupFound`].
    pub async fn resolve_camera_group(&self, token: &AuthToken) -> Result<CameraGroup, Error> {
        let names = self.group_names();

        let groups = self.list_camera_groups(token, false).await?;
        if let Some(group) = groups
            .into_iter()
            .find(|g| g.name.starts_with(&names.shared_prefix))
        {
            debug!(group_id = %group.id, name = %group.name, "selected shared camera group");
            return Ok(group);
        }

        debug!("no shared courtyard group; falling back to self-owned cameras");
        let own = self.list_camera_groups(token, true).await?;
        own.into_iter()
            .find(|g| g.name == names.own_exact)
            .inspect(|group| {
                debug!(group_id = %group.id, "selected self-owned camera group");
            })
            .ok_or(Error::NoGroupFound)
    }

    /// Resolve the cameras of a group.
    ///
    /// `GET /api/get-group/{id}` on the camera host. Members without a
    /// usable `UUID` field are silently skipped; an empty result set is
    /// [`Error::NoCamerasFound`].
    pub async fn resolve_cameras(
        &self,
        token: &AuthToken,
        group_id: &str,
    ) -> Result<Vec<Camera>, Error> {
        let url = self.cams_url(&format!("/api/get-group/{group_id}"))?;
        debug!(%group_id, "listing group cameras");

        let (status, text) = self.get_with_token(url, token).await?;
        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let entries: Vec<CameraEntry> = self.parse_json(&text)?;
        let cameras: Vec<Camera> = entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .uuid
                    .filter(|uuid| !uuid.is_empty())
                    .map(|uuid| Camera {
                        uuid,
                        name: entry.name,
                    })
            })
            .collect();

        if cameras.is_empty() {
            Err(Error::NoCamerasFound)
        } else {
            Ok(cameras)
        }
    }

    /// Build the HLS playback URL for a camera.
    ///
    /// Pure formatting, no network call -- byte-for-byte reproducible
    /// given the same inputs.
    pub fn stream_url(&self, camera_uuid: &str, token: &AuthToken) -> String {
        stream_url(self.cdn_base(), camera_uuid, token)
    }
}

fn stream_url(cdn_base: &Url, camera_uuid: &str, token: &AuthToken) -> String {
    format!(
        "{}/hls/playlists/multivariant.m3u8?uuid={camera_uuid}&realtime=1&token=bearer-{}",
        cdn_base.as_str().trim_end_matches('/'),
        token.as_str(),
    )
}

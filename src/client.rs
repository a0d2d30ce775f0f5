// Provider HTTP client
//
// Wraps `reqwest::Client` with the two provider hosts (intercom API and
// camera API), bearer-header plumbing, and shared response handling.
// All endpoint surfaces (auth, relays, cameras) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::AuthToken;
use crate::transport::TransportConfig;

/// Default intercom API host.
pub const DEFAULT_API_BASE: &str = "https://api.is74.ru";
/// Default camera API host (separate from the intercom host).
pub const DEFAULT_CAMS_BASE: &str = "https://cams.is74.ru";
/// Default HLS stream CDN.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.cams.is74.ru";

/// Camera-group names used by the resolver's two-tier selection.
///
/// Name matching against provider-controlled strings is inherently
/// fragile, so the literals are configuration rather than hard-coded
/// logic. Defaults match today's production values.
#[derive(Debug, Clone)]
pub struct GroupNames {
    /// Prefix of the shared building-wide "smart yard" group, preferred
    /// when present.
    pub shared_prefix: String,
    /// Exact name of the self-owned fallback group, looked up with
    /// `?selfCams=true`.
    pub own_exact: String,
}

impl Default for GroupNames {
    fn default() -> Self {
        Self {
            shared_prefix: "Умный двор".into(),
            own_exact: "Свои камеры".into(),
        }
    }
}

/// HTTP client for the Intersvyaz intercom and camera cloud API.
///
/// Holds the shared connection pool and both provider base URLs. The
/// client itself is stateless with respect to authentication: bearer
/// tokens are plain data passed into each call, so one client instance
/// can serve any number of accounts and is safe to share across tasks.
pub struct IntersvyazClient {
    http: reqwest::Client,
    api_base: Url,
    cams_base: Url,
    cdn_base: Url,
    group_names: GroupNames,
}

impl IntersvyazClient {
    /// Create a client against the production hosts.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_urls(DEFAULT_API_BASE, DEFAULT_CAMS_BASE, transport)
    }

    /// Create a client with explicit intercom and camera base URLs.
    pub fn with_base_urls(
        api_base: &str,
        cams_base: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(api_base, cams_base, http)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when the caller already owns a configured client (or, in
    /// tests, to point both surfaces at a mock server).
    pub fn from_reqwest(
        api_base: &str,
        cams_base: &str,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            api_base: Url::parse(api_base)?,
            cams_base: Url::parse(cams_base)?,
            cdn_base: Url::parse(DEFAULT_CDN_BASE)?,
            group_names: GroupNames::default(),
        })
    }

    /// Override the stream CDN base URL.
    pub fn with_cdn_base(mut self, cdn_base: &str) -> Result<Self, Error> {
        self.cdn_base = Url::parse(cdn_base)?;
        Ok(self)
    }

    /// Override the camera-group selection names.
    pub fn with_group_names(mut self, group_names: GroupNames) -> Self {
        self.group_names = group_names;
        self
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The intercom API base URL.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// The camera API base URL.
    pub fn cams_base(&self) -> &Url {
        &self.cams_base
    }

    pub(crate) fn cdn_base(&self) -> &Url {
        &self.cdn_base
    }

    pub(crate) fn group_names(&self) -> &GroupNames {
        &self.group_names
    }

    // ── URL builders ─────────────────────────────────────────────────

    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.api_base.join(path).map_err(Error::InvalidUrl)
    }

    pub(crate) fn cams_url(&self, path: &str) -> Result<Url, Error> {
        self.cams_base.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue a bearer-authorized GET against a full URL.
    pub(crate) async fn get_with_token(
        &self,
        url: Url,
        token: &AuthToken,
    ) -> Result<(StatusCode, String), Error> {
        debug!("GET {url}");
        self.send(self.http.get(url).bearer_auth(token.as_str()))
            .await
    }

    /// Execute a request, returning the status and the raw body.
    ///
    /// Every response body is logged at debug granularity here so each
    /// endpoint method doesn't have to.
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        debug!(status = %status, body = %body, "provider response");
        Ok((status, body))
    }

    /// Parse a JSON body, keeping the raw text for diagnostics on failure.
    pub(crate) fn parse_json<T: DeserializeOwned>(&self, body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })
    }
}

/// First 200 characters of a body, char-safe (bodies are often Cyrillic).
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

// Door relay endpoints
//
// Relay listing, first-relay resolution, and the open command. The
// protocol supports single-relay accounts only, so resolution always
// picks the first element of the provider's ordered list.

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::client::IntersvyazClient;
use crate::error::Error;
use crate::models::{AuthToken, Relay};

impl IntersvyazClient {
    /// List the door relays associated with the account.
    ///
    /// `GET /domofon/relays` (Bearer)
    pub async fn list_relays(&self, token: &AuthToken) -> Result<Vec<Relay>, Error> {
        let url = self.api_url("/domofon/relays")?;
        debug!("listing door relays");

        let (status, text) = self.get_with_token(url, token).await?;
        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        self.parse_json(&text)
    }

    /// Resolve the account's door relay identifier.
    ///
    /// Deterministically the FIRST relay in the provider's list. An
    /// empty or non-sequence response is [`Error::NoRelayFound`] -- a
    /// relay-less account is a resolution failure, not a degraded
    /// success.
    pub async fn resolve_relay(&self, token: &AuthToken) -> Result<String, Error> {
        let relays = match self.list_relays(token).await {
            Ok(relays) => relays,
            Err(Error::Deserialization { .. }) => return Err(Error::NoRelayFound),
            Err(e) => return Err(e),
        };
        relays
            .into_iter()
            .next()
            .map(|relay| relay.id)
            .ok_or(Error::NoRelayFound)
    }

    /// Issue the open command against a resolved relay.
    ///
    /// `POST /domofon/relays/{id}/open?from=app` (Bearer). HTTP 200 is
    /// the only success criterion; there is no confirmation polling --
    /// the provider API is the final authority on the action's effect.
    pub async fn open_door(&self, token: &AuthToken, relay_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("/domofon/relays/{relay_id}/open?from=app"))?;
        debug!(%relay_id, "opening door");

        let (status, _text) = self
            .send(self.http().post(url).bearer_auth(token.as_str()))
            .await?;
        if status == StatusCode::OK {
            info!(%relay_id, "door opened");
            Ok(())
        } else {
            Err(Error::OpenDoorFailed {
                status: status.as_u16(),
            })
        }
    }
}

// Authentication endpoints
//
// Two independent protocols terminate in a bearer token: credential
// login (one POST) and the three-step phone/SMS dialogue driven by
// `PhoneAuthFlow`. The individual phone-flow requests live here so the
// state machine stays pure correlation logic.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::IntersvyazClient;
use crate::error::Error;
use crate::models::{Address, AuthToken, ConfirmResponse, SmsErrorBody, TokenResponse};

impl IntersvyazClient {
    /// Authenticate with username and password.
    ///
    /// `POST /auth/mobile`. Success is HTTP 200 with a token field under
    /// either known casing; any other status, or a 200 without a token,
    /// is [`Error::AuthFailed`] carrying the status and raw body.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthToken, Error> {
        let url = self.api_url("/auth/mobile")?;
        debug!(%username, "logging in with credentials");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let (status, text) = self.send(self.http().post(url).json(&body)).await?;
        if status != StatusCode::OK {
            return Err(Error::AuthFailed {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TokenResponse = self.parse_json(&text)?;
        match parsed.token {
            Some(token) => Ok(AuthToken::new(token)),
            None => Err(Error::AuthFailed {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    /// Request an SMS code for a phone login attempt.
    ///
    /// `POST /mobile/auth/send-sms` with `{phone, uniqueDeviceId}`.
    /// `device_id` is the attempt's correlation token -- the server ties
    /// the later confirmation to this exact value. Any non-200 is
    /// [`Error::SmsSendFailed`] with the server's `message` when present.
    pub async fn send_sms(&self, phone: &str, device_id: &str) -> Result<(), Error> {
        let url = self.api_url("/mobile/auth/send-sms")?;
        debug!(%device_id, "requesting SMS code");

        let body = json!({
            "phone": phone,
            "uniqueDeviceId": device_id,
        });

        let (status, text) = self.send(self.http().post(url).json(&body)).await?;
        if status == StatusCode::OK {
            return Ok(());
        }

        let message = serde_json::from_str::<SmsErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);
        Err(Error::SmsSendFailed { message })
    }

    /// Confirm an SMS code.
    ///
    /// `POST /mobile/auth/confirm` with `{confirmCode, phone,
    /// uniqueDeviceId}` -- the same `device_id` the SMS was requested
    /// with. Acceptance is defined by the payload: the response must
    /// contain both `authId` and `addresses`; anything else is
    /// [`Error::InvalidCode`].
    pub async fn confirm_code(
        &self,
        code: &str,
        phone: &str,
        device_id: &str,
    ) -> Result<(String, Vec<Address>), Error> {
        let url = self.api_url("/mobile/auth/confirm")?;
        debug!(%device_id, "confirming SMS code");

        let body = json!({
            "confirmCode": code,
            "phone": phone,
            "uniqueDeviceId": device_id,
        });

        let (_status, text) = self.send(self.http().post(url).json(&body)).await?;

        let Ok(parsed) = serde_json::from_str::<ConfirmResponse>(&text) else {
            return Err(Error::InvalidCode);
        };
        match (parsed.auth_id, parsed.addresses) {
            (Some(auth_id), Some(addresses)) => Ok((auth_id, addresses)),
            _ => Err(Error::InvalidCode),
        }
    }

    /// Exchange a confirmed phone login for a bearer token.
    ///
    /// `POST /mobile/auth/get-token` with `{authId, userId}` (both
    /// string-trimmed). The failure taxonomy is deliberately fine-grained
    /// because the caller shows different remediation text for each case:
    /// [`Error::Http`] for non-200, [`Error::NoTokenInResponse`] for a
    /// 200 missing the token field, [`Error::Transport`] and
    /// [`Error::Deserialization`] for the rest.
    pub async fn exchange_token(&self, auth_id: &str, user_id: &str) -> Result<AuthToken, Error> {
        let url = self.api_url("/mobile/auth/get-token")?;
        debug!("exchanging confirmed login for token");

        let body = json!({
            "authId": auth_id.trim(),
            "userId": user_id.trim(),
        });

        let (status, text) = self.send(self.http().post(url).json(&body)).await?;
        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let parsed: TokenResponse = self.parse_json(&text)?;
        parsed
            .token
            .map(AuthToken::new)
            .ok_or(Error::NoTokenInResponse)
    }
}

// Wire models for the provider's JSON API.
//
// The API is inconsistent about field casing and numeric-vs-string IDs
// across endpoints, so identifier fields go through `string_or_number`
// and unknown fields land in `extra` catch-alls.

use std::fmt;

use serde::{Deserialize, Deserializer};

// ── Token ────────────────────────────────────────────────────────────

/// Opaque bearer token issued by the provider.
///
/// No declared expiry and no refresh protocol -- an expired token simply
/// makes future requests fail with an authorization error. `Debug` is
/// redacted so tokens don't leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Token response body. The provider is inconsistent about casing: the
/// credential login returns `TOKEN`, the exchange endpoint has been seen
/// returning both `TOKEN` and `token`. Anything else fails closed.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "TOKEN", alias = "token", default)]
    pub token: Option<String>,
}

// ── Phone auth ───────────────────────────────────────────────────────

/// One of possibly several accounts/addresses tied to a phone number.
/// The user must pick exactly one before a token is issued.
#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(rename = "ADDRESS")]
    pub label: String,
    #[serde(rename = "USER_ID", deserialize_with = "string_or_number")]
    pub user_id: String,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of a successful code confirmation. Both fields must be present
/// for the confirmation to count as accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmResponse {
    #[serde(rename = "authId", default, deserialize_with = "opt_string_or_number")]
    pub auth_id: Option<String>,
    #[serde(default)]
    pub addresses: Option<Vec<Address>>,
}

/// Error body returned by the SMS-send endpoint on rejection.
#[derive(Debug, Deserialize)]
pub(crate) struct SmsErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Relays ───────────────────────────────────────────────────────────

/// Door relay from `/domofon/relays`.
#[derive(Debug, Clone, Deserialize)]
pub struct Relay {
    #[serde(rename = "RELAY_ID", deserialize_with = "string_or_number")]
    pub id: String,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Cameras ──────────────────────────────────────────────────────────

/// Camera group from the camera host's `/api/get-group/` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraGroup {
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "NAME", default)]
    pub name: String,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A camera with a usable stream UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub uuid: String,
    pub name: String,
}

/// Raw group-member entry; `UUID` is missing on malformed entries,
/// which the resolver skips.
#[derive(Debug, Deserialize)]
pub(crate) struct CameraEntry {
    #[serde(rename = "UUID", default)]
    pub uuid: Option<String>,
    #[serde(rename = "NAME", default)]
    pub name: String,
}

// ── Deserialization helpers ──────────────────────────────────────────

/// Accept a JSON string or number and normalize to `String`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}

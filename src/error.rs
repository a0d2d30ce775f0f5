use thiserror::Error;

/// Top-level error type for the `intersvyaz-api` crate.
///
/// Covers every failure mode across all API surfaces: transport,
/// authentication (credential and phone/SMS flows), resource resolution,
/// and door control. Callers map these into user-facing diagnostics --
/// protocol rejections get remediation text, resolution misses get
/// "configuration incomplete" messaging, and `InvalidTransition` is a
/// programming error rather than a user-facing condition.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-200 status where the protocol demands exactly 200.
    #[error("Unexpected HTTP status {status}")]
    Http { status: u16 },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Credential login rejected, or a 200 response without a token field.
    /// Carries the server status and raw body for diagnostics.
    #[error("Authentication failed (HTTP {status})")]
    AuthFailed { status: u16, body: String },

    /// The SMS-send step was rejected. `message` is the server's own
    /// explanation when it provided one, otherwise the raw body.
    #[error("SMS send failed: {message}")]
    SmsSendFailed { message: String },

    /// The confirmation response did not contain both `authId` and
    /// `addresses` -- the code was wrong or stale. The flow stays in
    /// `AwaitingCode` so the caller may resubmit.
    #[error("SMS code rejected by the provider")]
    InvalidCode,

    /// Token exchange returned 200 but neither `TOKEN` nor `token` was
    /// present in the body. Never guess a third casing.
    #[error("No token field in response")]
    NoTokenInResponse,

    /// The terminal token-exchange step of the phone flow failed; the
    /// flow stays in `AwaitingAddress` so the caller may retry or pick
    /// a different address.
    #[error("Token exchange failed: {cause}")]
    TokenExchangeFailed {
        #[source]
        cause: Box<Error>,
    },

    /// No stored address matches the label supplied to `select_address`.
    /// A caller/UI bug -- the label must come from the stored list.
    #[error("No address with label {label:?}")]
    AddressNotFound { label: String },

    // ── Resource resolution ─────────────────────────────────────────
    /// The relay list came back empty or malformed.
    #[error("No door relay found for this account")]
    NoRelayFound,

    /// Neither the shared courtyard group nor the self-owned group exists.
    #[error("No camera group found for this account")]
    NoGroupFound,

    /// The selected group contains no camera with a usable UUID.
    #[error("No cameras found in the selected group")]
    NoCamerasFound,

    // ── Door control ────────────────────────────────────────────────
    /// The open command returned something other than HTTP 200.
    #[error("Door open command failed (HTTP {status})")]
    OpenDoorFailed { status: u16 },

    // ── State machine ───────────────────────────────────────────────
    /// A phone-flow step was called out of order. No network call is made.
    #[error("Invalid flow transition: expected {expected}, flow is {got}")]
    InvalidTransition {
        expected: &'static str,
        got: &'static str,
    },
}

impl Error {
    /// Returns `true` if this is a transient transport failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this error means the account lacks a provisioned
    /// resource -- setup is incomplete rather than broken.
    pub fn is_configuration_incomplete(&self) -> bool {
        matches!(
            self,
            Self::NoRelayFound | Self::NoGroupFound | Self::NoCamerasFound
        )
    }

    /// Returns `true` if this error indicates the bearer token was
    /// rejected and re-authentication might resolve it.
    pub fn is_auth_failed(&self) -> bool {
        match self {
            Self::AuthFailed { .. } => true,
            Self::Http { status } => *status == 401,
            _ => false,
        }
    }
}

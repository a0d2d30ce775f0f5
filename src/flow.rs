// Phone login state machine
//
// The provider's SMS login is three physically separate round-trips with
// server-side session correlation: the device id binds send-sms to
// confirm, and the auth id binds confirm to the token exchange. This
// machine holds exactly that correlation state between steps and rejects
// out-of-order calls before any network traffic.
//
// Single-writer discipline: a flow belongs to one login dialogue and is
// never shared across concurrent callers -- `&mut self` on every step
// makes the borrow checker enforce that.

use tracing::debug;
use uuid::Uuid;

use crate::client::IntersvyazClient;
use crate::error::Error;
use crate::models::{Address, AuthToken};

/// Leading country prefix stripped from phone numbers before any request.
const PHONE_COUNTRY_PREFIX: &str = "+7";

/// Where a [`PhoneAuthFlow`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    AwaitingCode,
    AwaitingAddress,
    Completed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingCode => "AwaitingCode",
            Self::AwaitingAddress => "AwaitingAddress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    AwaitingCode {
        phone: String,
        device_id: String,
    },
    AwaitingAddress {
        auth_id: String,
        addresses: Vec<Address>,
    },
    Completed {
        token: AuthToken,
    },
}

/// Driver for the three-step phone login:
/// `Idle -> AwaitingCode -> AwaitingAddress -> Completed`.
///
/// `Completed` is terminal; create a fresh instance for a new login. A
/// failed step leaves the state where it was, so the caller can retry
/// that step -- critically, resubmitting a code reuses the device id the
/// SMS was requested with.
#[derive(Debug, Default)]
pub struct PhoneAuthFlow {
    state: State,
}

impl PhoneAuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current stage.
    pub fn stage(&self) -> Stage {
        match self.state {
            State::Idle => Stage::Idle,
            State::AwaitingCode { .. } => Stage::AwaitingCode,
            State::AwaitingAddress { .. } => Stage::AwaitingAddress,
            State::Completed { .. } => Stage::Completed,
        }
    }

    /// Addresses returned by code confirmation, once available.
    pub fn addresses(&self) -> Option<&[Address]> {
        match &self.state {
            State::AwaitingAddress { addresses, .. } => Some(addresses),
            _ => None,
        }
    }

    /// The token obtained by a completed flow.
    pub fn token(&self) -> Option<&AuthToken> {
        match &self.state {
            State::Completed { token } => Some(token),
            _ => None,
        }
    }

    /// Step 1: normalize the phone number, generate a fresh device id,
    /// and request an SMS code.
    ///
    /// On [`Error::SmsSendFailed`] the flow stays `Idle` so the caller
    /// can retry with the same phone number; the retry generates a new
    /// device id, which starts a new attempt.
    pub async fn submit_phone(
        &mut self,
        client: &IntersvyazClient,
        phone: &str,
    ) -> Result<(), Error> {
        let State::Idle = self.state else {
            return Err(self.invalid_transition("Idle"));
        };

        let phone = normalize_phone(phone).to_owned();
        let device_id = Uuid::new_v4().simple().to_string();
        debug!(%device_id, "starting phone login attempt");

        client.send_sms(&phone, &device_id).await?;
        self.state = State::AwaitingCode { phone, device_id };
        Ok(())
    }

    /// Step 2: confirm the SMS code, reusing the attempt's device id.
    ///
    /// On [`Error::InvalidCode`] the flow stays in `AwaitingCode` and the
    /// caller may resubmit; the device id is NOT regenerated, since the
    /// server correlates by the value the SMS was requested with. Success
    /// stores the auth id and returns the account addresses to choose from.
    pub async fn submit_code(
        &mut self,
        client: &IntersvyazClient,
        code: &str,
    ) -> Result<Vec<Address>, Error> {
        let State::AwaitingCode { phone, device_id } = &self.state else {
            return Err(self.invalid_transition("AwaitingCode"));
        };

        let (auth_id, addresses) = client.confirm_code(code, phone, device_id).await?;
        self.state = State::AwaitingAddress {
            auth_id,
            addresses: addresses.clone(),
        };
        Ok(addresses)
    }

    /// Step 3: pick an address by exact label and exchange for a token.
    ///
    /// An unknown label is [`Error::AddressNotFound`] -- a caller/UI bug,
    /// no state change and no network call. An exchange failure keeps the
    /// flow in `AwaitingAddress` (pick another address or retry) and is
    /// surfaced as [`Error::TokenExchangeFailed`]. Success is terminal.
    pub async fn select_address(
        &mut self,
        client: &IntersvyazClient,
        label: &str,
    ) -> Result<AuthToken, Error> {
        let State::AwaitingAddress { auth_id, addresses } = &self.state else {
            return Err(self.invalid_transition("AwaitingAddress"));
        };

        let address = addresses
            .iter()
            .find(|a| a.label == label)
            .ok_or_else(|| Error::AddressNotFound {
                label: label.to_owned(),
            })?;

        match client.exchange_token(auth_id, &address.user_id).await {
            Ok(token) => {
                self.state = State::Completed {
                    token: token.clone(),
                };
                Ok(token)
            }
            Err(cause) => Err(Error::TokenExchangeFailed {
                cause: Box::new(cause),
            }),
        }
    }

    fn invalid_transition(&self, expected: &'static str) -> Error {
        Error::InvalidTransition {
            expected,
            got: self.stage().as_str(),
        }
    }
}

/// Strip the leading international prefix; the provider expects bare
/// national numbers.
fn normalize_phone(phone: &str) -> &str {
    phone.strip_prefix(PHONE_COUNTRY_PREFIX).unwrap_or(phone)
}

// intersvyaz-api: Async Rust client for the Intersvyaz intercom and
// courtyard-camera cloud API.
//
// Two authentication protocols (credential and phone/SMS), resource
// resolution (door relay id, camera group, camera UUIDs), the door-open
// command, and a pure stream-URL builder. All plain data in and out --
// host platforms store the token and schedule the calls themselves.

pub mod auth;
pub mod cameras;
pub mod client;
pub mod error;
pub mod flow;
pub mod models;
pub mod relays;
pub mod transport;

pub use client::{GroupNames, IntersvyazClient};
pub use error::Error;
pub use flow::{PhoneAuthFlow, Stage};
pub use models::{Address, AuthToken, Camera, CameraGroup, Relay};
pub use transport::{TlsMode, TransportConfig};

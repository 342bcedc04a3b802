//! Room-scoped chat relay over WebSockets.
//!
//! Clients join named rooms (optionally password protected), post text
//! messages that are fanned out to every member, and receive the room's
//! recent history on join. Rooms live in memory and disappear with their
//! last member.
//!
//! The protocol core is [`relay::Relay`]; it is transport agnostic and is
//! wrapped by [`WebsocketRelay`] (raw tokio-tungstenite listener),
//! [`AxumRelay`] (axum route) and [`MpscRelay`] (in-process channels).
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod registry;
pub mod relay;
pub mod response;
pub mod room;
pub mod utils;

pub use config::RelayConfig;
pub use error::{DeliveryError, ProtocolError, RoomError, TransportError};
pub use registry::RoomRegistry;
pub use relay::axum::AxumRelay;
pub use relay::mpsc::MpscRelay;
pub use relay::ws::WebsocketRelay;
pub use relay::Relay;
pub use response::Response;

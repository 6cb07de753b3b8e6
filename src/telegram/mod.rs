//! Telegram Integration Module
//!
//! Implements the profile gate over the Telegram Bot API:
//! - Membership updates and button presses arrive via getUpdates long polling
//! - Profile inspection is pure and re-fetches on every trigger
//! - All restriction state lives in Telegram; nothing persists here

pub mod api;
pub mod client;
pub mod gate;
pub mod inspector;
pub mod mock;
pub mod traits;

pub use client::BotApiClient;
pub use gate::{GateConfig, MembershipGate};
pub use inspector::{ProfileInspector, Verdict};
pub use mock::MockChatGateway;
pub use traits::{ChatGateway, GatewayError, GatewayResult};

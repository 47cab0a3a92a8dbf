//! Core domain + application logic for the Best Friend Telegram bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / OpenAI /
//! Postgres live behind ports (traits) implemented in adapter crates. The
//! pipeline here is strictly linear per inbound turn: normalize (done by the
//! transport adapter) -> entitlement gate -> responder dispatch -> usage
//! recorder -> reply.

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod gate;
pub mod logging;
pub mod ports;
pub mod recorder;
pub mod replies;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};

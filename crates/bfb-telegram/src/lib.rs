//! Telegram transport (teloxide).
//!
//! Inbound: normalizes messages into `UserTurn`s (downloading voice, photo
//! and document payloads through the Bot API) and feeds them to the core
//! pipeline. Outbound: maps the pipeline's `Reply` back onto the Bot API.

pub mod handlers;
pub mod router;

//! Inbound message handling: normalize, run the pipeline, send the reply.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ChatAction, InputFile, Message},
};

use bfb_core::domain::{ChatId as CoreChatId, Reply, TurnPayload, UserId, UserTurn};

use crate::router::AppState;

mod commands;
mod download;

fn is_start_command(text: &str) -> bool {
    let t = text.trim_start();
    t == "/start" || t.starts_with("/start ") || t.starts_with("/start@")
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        if is_start_command(text) {
            return commands::handle_start(bot, chat_id).await;
        }
    }

    let Some(payload) = build_payload(&bot, &state, &msg).await else {
        // Unsupported message type (stickers, locations, ...): stay quiet.
        return Ok(());
    };

    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;

    let turn = UserTurn {
        user_id,
        chat_id: CoreChatId(chat_id.0),
        payload,
    };
    let reply = state.pipeline.handle_turn(turn).await;

    send_reply(&bot, chat_id, reply).await
}

/// Normalize one Telegram message into a turn payload, downloading media
/// through the Bot API. `None` means the message type is not handled.
async fn build_payload(bot: &Bot, state: &AppState, msg: &Message) -> Option<TurnPayload> {
    if let Some(text) = msg.text() {
        if text.trim().is_empty() {
            return None;
        }
        return Some(TurnPayload::Text(text.to_string()));
    }

    if let Some(voice) = msg.voice() {
        let bytes = match download::fetch(bot, state, &voice.file.id, "ogg").await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "voice download failed");
                return None;
            }
        };
        return Some(TurnPayload::Voice {
            bytes,
            language_hint: state.cfg.voice_language_hint.clone(),
        });
    }

    if let Some(photos) = msg.photo() {
        // Sizes are ordered smallest-first; take the largest rendition.
        let best = photos.last()?;
        let bytes = match download::fetch(bot, state, &best.file.id, "jpg").await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "photo download failed");
                return None;
            }
        };
        return Some(TurnPayload::Photo { bytes });
    }

    if let Some(doc) = msg.document() {
        let file_name = doc
            .file_name
            .clone()
            .unwrap_or_else(|| "document".to_string());
        let bytes = match download::fetch(bot, state, &doc.file.id, "bin").await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "document download failed");
                return None;
            }
        };
        return Some(TurnPayload::Document { file_name, bytes });
    }

    None
}

async fn send_reply(bot: &Bot, chat_id: TeloxideChatId, reply: Reply) -> ResponseResult<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Photo(url) => {
            bot.send_photo(chat_id, InputFile::url(url)).await?;
        }
        Reply::Voice(bytes) => {
            bot.send_voice(chat_id, InputFile::memory(bytes).file_name("voice.mp3"))
                .await?;
        }
    }
    Ok(())
}

type TeloxideChatId = teloxide::types::ChatId;

use teloxide::prelude::*;

use bfb_core::{domain::Reply, replies};

/// `/start` is answered at the transport layer; it never enters the
/// pipeline and is not metered.
pub async fn handle_start(bot: Bot, chat_id: teloxide::types::ChatId) -> ResponseResult<()> {
    if let Reply::Text(text) = replies::greeting() {
        bot.send_message(chat_id, text).await?;
    }
    Ok(())
}

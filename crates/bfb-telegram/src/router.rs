use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use bfb_core::{config::Config, dispatch::Pipeline};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
}

pub async fn run_polling(cfg: Arc<Config>, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "bot started");
    }

    let state = Arc::new(AppState { cfg, pipeline });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

use std::sync::Arc;

use bfb_core::{
    config::Config,
    dispatch::{Collaborators, Pipeline},
    extract::PlainTextExtractor,
};
use bfb_db::Db;
use bfb_openai::OpenAiClient;

#[tokio::main]
async fn main() -> Result<(), bfb_core::Error> {
    bfb_core::logging::init("bfb")?;

    let cfg = Arc::new(Config::load()?);

    let db = Db::connect(&cfg.database_url).await?;
    db.run_migrations().await?;
    tracing::info!("database ready");

    let openai = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.chat_model.clone(),
        cfg.system_prompt.clone(),
    ));

    let pipeline = Arc::new(Pipeline::new(
        cfg.clone(),
        Collaborators {
            store: Arc::new(db),
            chat: openai.clone(),
            images: openai.clone(),
            transcriber: openai.clone(),
            speech: openai,
            extractor: Arc::new(PlainTextExtractor),
        },
    ));

    bfb_telegram::router::run_polling(cfg, pipeline)
        .await
        .map_err(|e| bfb_core::Error::Config(format!("telegram bot failed: {e}")))?;

    Ok(())
}

use std::sync::atomic::{AtomicUsize, Ordering};

use teloxide::{net::Download, prelude::*};

use crate::router::AppState;

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Download one Bot API file into memory via a uniquely-named temp file.
pub async fn fetch(bot: &Bot, state: &AppState, file_id: &str, ext: &str) -> anyhow::Result<Vec<u8>> {
    let file = bot.get_file(file_id.to_string()).await?;

    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = state.cfg.temp_dir.join(format!("in_{ts}_{n}.{ext}"));

    let mut dst = tokio::fs::File::create(&path).await?;
    bot.download_file(&file.path, &mut dst).await?;
    drop(dst);

    let bytes = tokio::fs::read(&path).await?;
    let _ = tokio::fs::remove_file(&path).await;
    Ok(bytes)
}

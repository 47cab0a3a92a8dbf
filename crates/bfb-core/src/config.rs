use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{domain::UserId, errors::Error, Result};

/// Typed configuration, loaded from the environment (plus an optional `.env`
/// file that never overrides already-set variables).
#[derive(Clone, Debug)]
pub struct Config {
    // Required
    pub telegram_bot_token: String,
    pub openai_api_key: String,
    pub database_url: String,
    /// Owner identity: always allowed through the gate, never metered.
    pub owner_chat_id: UserId,

    // Entitlement
    pub daily_free_quota: u32,

    // Dispatch
    pub dialog_context_turns: u32,
    pub document_excerpt_chars: usize,
    pub image_keywords: Vec<String>,
    pub speak_commands: Vec<String>,
    pub voice_language_hint: Option<String>,

    // Chat model
    pub chat_model: String,
    pub system_prompt: String,

    // Runtime
    pub temp_dir: PathBuf,
}

const DEFAULT_SYSTEM_PROMPT: &str = "Ты — честный и дерзкий помощник, всегда говоришь по делу.";

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = require("TELEGRAM_BOT_TOKEN")?;
        let openai_api_key = require("OPENAI_API_KEY")?;
        let database_url = require("DATABASE_URL")?;

        let owner_chat_id = require("OWNER_CHAT_ID")?
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| Error::Config("OWNER_CHAT_ID must be a numeric chat id".to_string()))?;

        let daily_free_quota = env_u32("DAILY_FREE_QUOTA").unwrap_or(3);
        let dialog_context_turns = env_u32("DIALOG_CONTEXT_TURNS").unwrap_or(16);
        let document_excerpt_chars = env_usize("DOCUMENT_EXCERPT_CHARS").unwrap_or(3000);

        let image_keywords = parse_csv_lower(
            env_str("IMAGE_KEYWORDS")
                .or_else(|| Some("/сгенерируй,нарисуй,draw,generate image".to_string())),
        );
        let speak_commands =
            parse_csv_lower(env_str("SPEAK_COMMANDS").or_else(|| Some("/скажи,/say".to_string())));

        let voice_language_hint = env_str("VOICE_LANGUAGE_HINT").and_then(non_empty);

        let chat_model = env_str("CHAT_MODEL").unwrap_or_else(|| "gpt-4-turbo".to_string());
        let system_prompt =
            env_str("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let temp_dir = PathBuf::from(env_str("TEMP_DIR").unwrap_or_else(|| "/tmp/bfb".to_string()));
        fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            telegram_bot_token,
            openai_api_key,
            database_url,
            owner_chat_id,
            daily_free_quota,
            dialog_context_turns,
            document_excerpt_chars,
            image_keywords,
            speak_commands,
            voice_language_hint,
            chat_model,
            system_prompt,
            temp_dir,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_is_lowercased_and_trimmed() {
        let v = parse_csv_lower(Some(" Нарисуй , DRAW ,,generate image ".to_string()));
        assert_eq!(v, vec!["нарисуй", "draw", "generate image"]);
    }

    #[test]
    fn non_empty_rejects_whitespace() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}

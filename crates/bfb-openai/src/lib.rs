//! OpenAI adapter: chat completions, DALL-E image generation, Whisper
//! transcription and TTS speech synthesis behind the core model ports.

use async_trait::async_trait;
use url::Url;

use bfb_core::{
    domain::ChatTurn,
    ports::{ChatModel, ImageModel, SpeechModel, Transcriber},
    Error, Result,
};

const API_BASE: &str = "https://api.openai.com/v1";

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_key: String,
    chat_model: String,
    system_prompt: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client build");

        Self {
            api_key: api_key.into(),
            chat_model: chat_model.into(),
            system_prompt: system_prompt.into(),
            http,
        }
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(format!("{API_BASE}{path}"))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::collaborator("openai", format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(api_error(path, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| Error::collaborator("openai", format!("json error: {e}")))
    }
}

async fn api_error(path: &str, resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Error::collaborator(
        "openai",
        format!(
            "{path} failed: {status} {}",
            body.chars().take(200).collect::<String>()
        ),
    )
}

fn build_chat_messages(system_prompt: &str, context: &[ChatTurn]) -> serde_json::Value {
    let mut messages = Vec::with_capacity(context.len() + 1);
    messages.push(serde_json::json!({
        "role": "system",
        "content": system_prompt,
    }));
    for turn in context {
        messages.push(serde_json::json!({
            "role": turn.role.as_str(),
            "content": turn.content,
        }));
    }
    serde_json::Value::Array(messages)
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, context: &[ChatTurn]) -> Result<String> {
        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": build_chat_messages(&self.system_prompt, context),
            "temperature": 0.7,
        });

        let v = self.post_json("/chat/completions", &body).await?;
        let text = v
            .pointer("/choices/0/message/content")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(Error::collaborator(
                "openai",
                "chat completion returned empty text",
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl ImageModel for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<Url> {
        let body = serde_json::json!({
            "model": "dall-e-3",
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
        });

        let v = self.post_json("/images/generations", &body).await?;
        let raw = v
            .pointer("/data/0/url")
            .and_then(|u| u.as_str())
            .ok_or_else(|| Error::collaborator("openai", "image response missing url"))?;

        Url::parse(raw).map_err(|e| Error::collaborator("openai", format!("bad image url: {e}")))
    }
}

#[async_trait]
impl Transcriber for OpenAiClient {
    /// An empty transcript is returned as-is; deciding what to tell the
    /// user about inaudible audio is the dispatcher's job.
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<String> {
        let mut form = reqwest::multipart::Form::new().text("model", "whisper-1").part(
            "file",
            reqwest::multipart::Part::bytes(audio.to_vec())
                .file_name("voice.ogg")
                .mime_str("audio/ogg")
                .map_err(|e| Error::collaborator("openai", format!("multipart error: {e}")))?,
        );

        if let Some(lang) = language_hint {
            if !lang.trim().is_empty() {
                form = form.text("language", lang.to_string());
            }
        }

        let resp = self
            .http
            .post(format!("{API_BASE}/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::collaborator("openai", format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(api_error("/audio/transcriptions", resp).await);
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::collaborator("openai", format!("json error: {e}")))?;

        Ok(v.get("text").and_then(|t| t.as_str()).unwrap_or("").to_string())
    }
}

#[async_trait]
impl SpeechModel for OpenAiClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let body = serde_json::json!({
            "model": "tts-1",
            "voice": "onyx",
            "input": text,
        });

        let resp = self
            .http
            .post(format!("{API_BASE}/audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::collaborator("openai", format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(api_error("/audio/speech", resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::collaborator("openai", format!("body error: {e}")))?;
        Ok(bytes.to_vec())
    }
}

//! Responder dispatch: the per-turn pipeline.
//!
//! One inbound turn flows strictly linearly: entitlement gate -> strategy
//! classification -> collaborator call -> usage recorder -> reply. First
//! matching strategy wins; the fixed evaluation order (speech command, image
//! request, voice, document/photo, plain chat) is the whole algorithm.
//!
//! `handle_turn` is infallible from the transport's point of view: every
//! internal failure is logged with detail here and collapsed into the one
//! generic user-facing template.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::{
    config::Config,
    domain::{Reply, Role, TurnPayload, UserId, UserTurn},
    gate::{Entitlement, EntitlementGate},
    ports::{ChatModel, DocumentExtractor, ImageModel, SpeechModel, Transcriber, UserStore},
    recorder::{RecordedTurn, UsageRecorder},
    replies, Result,
};

/// The external capabilities the pipeline calls through ports.
pub struct Collaborators {
    pub store: Arc<dyn UserStore>,
    pub chat: Arc<dyn ChatModel>,
    pub images: Arc<dyn ImageModel>,
    pub transcriber: Arc<dyn Transcriber>,
    pub speech: Arc<dyn SpeechModel>,
    pub extractor: Arc<dyn DocumentExtractor>,
}

pub struct Pipeline {
    cfg: Arc<Config>,
    c: Collaborators,
    gate: EntitlementGate,
    recorder: UsageRecorder,
}

/// Result of one dispatched strategy. `record` is `None` for validation
/// replies, which must not be metered.
struct Outcome {
    reply: Reply,
    record: Option<RecordedTurn>,
}

impl Outcome {
    fn validation(reply: Reply) -> Self {
        Self {
            reply,
            record: None,
        }
    }
}

enum TextIntent {
    /// `/скажи <text>` — synthesize speech. Remainder may be empty.
    Speak(String),
    /// `/сгенерируй <prompt>` or an image keyword. Remainder may be empty.
    Draw(String),
    Chat,
}

impl Pipeline {
    pub fn new(cfg: Arc<Config>, c: Collaborators) -> Self {
        let gate = EntitlementGate::new(c.store.clone(), cfg.owner_chat_id, cfg.daily_free_quota);
        let recorder = UsageRecorder::new(c.store.clone(), cfg.owner_chat_id);
        Self {
            cfg,
            c,
            gate,
            recorder,
        }
    }

    /// Handle one normalized turn end to end and produce the reply to send.
    pub async fn handle_turn(&self, turn: UserTurn) -> Reply {
        match self.run(&turn).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user_id = turn.user_id.0, error = %err, "turn failed");
                replies::generic_failure()
            }
        }
    }

    async fn run(&self, turn: &UserTurn) -> Result<Reply> {
        self.c.store.upsert_user(turn.user_id).await?;

        if let Entitlement::Denied(reason) = self.gate.check(turn.user_id, Utc::now()).await? {
            info!(user_id = turn.user_id.0, ?reason, "turn denied");
            return Ok(replies::denied(reason));
        }

        let outcome = self.dispatch(turn).await?;

        // Exactly once, and only after the collaborator call succeeded: a
        // failed dispatch must not cost the user a free request.
        if let Some(record) = &outcome.record {
            self.recorder.record(turn.user_id, record).await?;
        }

        Ok(outcome.reply)
    }

    async fn dispatch(&self, turn: &UserTurn) -> Result<Outcome> {
        match &turn.payload {
            TurnPayload::Text(text) => self.respond_to_text(turn.user_id, text).await,

            TurnPayload::Voice {
                bytes,
                language_hint,
            } => {
                let transcript = self
                    .c
                    .transcriber
                    .transcribe(bytes, language_hint.as_deref())
                    .await?;
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    return Ok(Outcome::validation(replies::voice_not_understood()));
                }
                debug!(user_id = turn.user_id.0, "voice transcribed");
                // Transcribed voice goes straight to chat; keyword
                // classification applies to typed text only.
                self.chat_reply(turn.user_id, transcript).await
            }

            TurnPayload::Photo { bytes } => {
                self.extracted_reply(turn.user_id, "photo.jpg", bytes).await
            }

            TurnPayload::Document { file_name, bytes } => {
                self.extracted_reply(turn.user_id, file_name, bytes).await
            }
        }
    }

    async fn respond_to_text(&self, user_id: UserId, text: &str) -> Result<Outcome> {
        match self.classify(text) {
            TextIntent::Speak(phrase) => {
                if phrase.is_empty() {
                    return Ok(Outcome::validation(replies::speech_text_missing()));
                }
                let audio = self.c.speech.synthesize(&phrase).await?;
                Ok(Outcome {
                    reply: Reply::Voice(audio),
                    record: Some(RecordedTurn {
                        user_content: Some(text.to_string()),
                        assistant_content: phrase,
                    }),
                })
            }

            TextIntent::Draw(prompt) => {
                if prompt.is_empty() {
                    return Ok(Outcome::validation(replies::image_prompt_missing()));
                }
                let url = self.c.images.generate(&prompt).await?;
                Ok(Outcome {
                    reply: Reply::Photo(url.clone()),
                    record: Some(RecordedTurn {
                        user_content: Some(text.to_string()),
                        assistant_content: url.to_string(),
                    }),
                })
            }

            TextIntent::Chat => self.chat_reply(user_id, text).await,
        }
    }

    /// Plain chat completion over the bounded recent-history window. The
    /// user's turn is appended first so the fetched context ends with it.
    async fn chat_reply(&self, user_id: UserId, text: &str) -> Result<Outcome> {
        self.c
            .store
            .append_dialog_turn(user_id, Role::User, text)
            .await?;

        let context = self
            .c
            .store
            .get_recent_dialog(user_id, self.cfg.dialog_context_turns)
            .await?;

        let answer = self.c.chat.complete(&context).await?;

        Ok(Outcome {
            reply: Reply::Text(answer.clone()),
            record: Some(RecordedTurn {
                // Already appended above.
                user_content: None,
                assistant_content: answer,
            }),
        })
    }

    async fn extracted_reply(
        &self,
        user_id: UserId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Outcome> {
        let extracted = self.c.extractor.extract(file_name, bytes).await?;
        if extracted.text.trim().is_empty() {
            return Ok(Outcome::validation(replies::nothing_to_read()));
        }

        let excerpt: String = extracted
            .text
            .chars()
            .take(self.cfg.document_excerpt_chars)
            .collect();
        let prompt = format!("{}:\n{}", extracted.label, excerpt);

        self.chat_reply(user_id, &prompt).await
    }

    fn classify(&self, text: &str) -> TextIntent {
        let trimmed = text.trim();

        for cmd in &self.cfg.speak_commands {
            if let Some(rest) = strip_keyword(trimmed, cmd) {
                return TextIntent::Speak(rest);
            }
        }
        for kw in &self.cfg.image_keywords {
            if let Some(rest) = strip_keyword(trimmed, kw) {
                return TextIntent::Draw(rest);
            }
        }

        TextIntent::Chat
    }
}

/// Case-insensitive prefix match with a word boundary: "нарисуй кота"
/// matches "нарисуй" (remainder "кота"), "нарисуйте" does not.
fn strip_keyword(text: &str, keyword: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if !lower.starts_with(keyword) {
        return None;
    }

    let rest: String = text.chars().skip(keyword.chars().count()).collect();
    match rest.chars().next() {
        None => Some(String::new()),
        Some(c) if c.is_alphanumeric() => None,
        _ => {
            let rest = rest.trim_start().trim_start_matches([',', ':', '-']);
            Some(rest.trim().to_string())
        }
    }
}

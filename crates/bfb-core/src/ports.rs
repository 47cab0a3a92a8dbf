//! Hexagonal ports for the external collaborators.
//!
//! The core never talks to OpenAI, Postgres or Telegram directly; it calls
//! these traits. Adapter crates (`bfb-openai`, `bfb-db`) implement them, and
//! the test doubles in `testing` implement them in memory.

use async_trait::async_trait;
use url::Url;

use crate::{
    domain::{ChatTurn, Role, Subscription, UserId},
    Result,
};

/// Chat-completion collaborator. The context is ordered oldest-to-newest;
/// the adapter is responsible for prepending its own system prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, context: &[ChatTurn]) -> Result<String>;
}

/// Image-generation collaborator.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Url>;
}

/// Speech-to-text collaborator. An empty transcript is not an error; the
/// dispatcher turns it into a validation reply.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<String>;
}

/// Text-to-speech collaborator.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Result of running a document/photo through an extractor: a short format
/// label plus the extracted text (uncapped; the dispatcher applies the
/// excerpt budget).
#[derive(Clone, Debug)]
pub struct Extracted {
    pub label: String,
    pub text: String,
}

/// Document/photo text extraction, keyed by file name. Format-specific
/// parsers plug in behind this trait; the core only sees the excerpt.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<Extracted>;
}

/// Persistence collaborator. All durable state lives behind this port so any
/// number of handler processes can run against shared storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert the user row if absent; no-op if present.
    async fn upsert_user(&self, user_id: UserId) -> Result<()>;

    /// Daily counter; 0 if the user row does not exist yet.
    async fn get_requests_today(&self, user_id: UserId) -> Result<u32>;

    async fn increment_requests(&self, user_id: UserId) -> Result<()>;

    /// Bulk daily reset, called by an external scheduled job.
    async fn reset_all_requests(&self) -> Result<()>;

    /// Latest subscription row flagged active, if any. The expiry check
    /// against the current time is the gate's job, not the store's.
    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<Subscription>>;

    async fn append_dialog_turn(&self, user_id: UserId, role: Role, content: &str) -> Result<()>;

    /// The most recent `limit` dialog turns, ordered oldest-to-newest.
    async fn get_recent_dialog(&self, user_id: UserId, limit: u32) -> Result<Vec<ChatTurn>>;

    /// Append one usage-audit row.
    async fn log_usage(&self, user_id: UserId) -> Result<()>;
}

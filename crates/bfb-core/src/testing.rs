//! Hand-rolled in-memory doubles for the collaborator ports, shared by the
//! unit tests across this crate.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    sync::Mutex,
};

use async_trait::async_trait;
use url::Url;

use crate::{
    domain::{ChatTurn, Role, Subscription, UserId},
    errors::Error,
    ports::{ChatModel, DocumentExtractor, Extracted, ImageModel, SpeechModel, Transcriber,
            UserStore},
    Result,
};

#[derive(Default)]
pub struct MemoryStore {
    counters: Mutex<HashMap<i64, u32>>,
    subs: Mutex<HashMap<i64, Subscription>>,
    dialog: Mutex<HashMap<i64, Vec<ChatTurn>>>,
    usage: Mutex<HashMap<i64, u32>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn set_requests_today(&self, user_id: UserId, n: u32) {
        self.counters.lock().unwrap().insert(user_id.0, n);
    }

    pub fn requests_today(&self, user_id: UserId) -> u32 {
        self.counters
            .lock()
            .unwrap()
            .get(&user_id.0)
            .copied()
            .unwrap_or(0)
    }

    pub fn set_subscription(&self, sub: Subscription) {
        self.subs.lock().unwrap().insert(sub.user_id.0, sub);
    }

    pub fn seed_dialog(&self, user_id: UserId, role: Role, content: &str) {
        self.dialog
            .lock()
            .unwrap()
            .entry(user_id.0)
            .or_default()
            .push(ChatTurn {
                role,
                content: content.to_string(),
            });
    }

    pub fn dialog(&self, user_id: UserId) -> Vec<ChatTurn> {
        self.dialog
            .lock()
            .unwrap()
            .get(&user_id.0)
            .cloned()
            .unwrap_or_default()
    }

    pub fn usage_rows(&self, user_id: UserId) -> u32 {
        self.usage
            .lock()
            .unwrap()
            .get(&user_id.0)
            .copied()
            .unwrap_or(0)
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    fn read_guard(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Store("injected read failure".to_string()));
        }
        Ok(())
    }

    fn write_guard(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Store("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_user(&self, user_id: UserId) -> Result<()> {
        self.write_guard()?;
        self.counters.lock().unwrap().entry(user_id.0).or_insert(0);
        Ok(())
    }

    async fn get_requests_today(&self, user_id: UserId) -> Result<u32> {
        self.read_guard()?;
        Ok(self.requests_today(user_id))
    }

    async fn increment_requests(&self, user_id: UserId) -> Result<()> {
        self.write_guard()?;
        *self.counters.lock().unwrap().entry(user_id.0).or_insert(0) += 1;
        Ok(())
    }

    async fn reset_all_requests(&self) -> Result<()> {
        self.write_guard()?;
        for v in self.counters.lock().unwrap().values_mut() {
            *v = 0;
        }
        Ok(())
    }

    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<Subscription>> {
        self.read_guard()?;
        Ok(self
            .subs
            .lock()
            .unwrap()
            .get(&user_id.0)
            .filter(|s| s.is_active)
            .cloned())
    }

    async fn append_dialog_turn(&self, user_id: UserId, role: Role, content: &str) -> Result<()> {
        self.write_guard()?;
        self.seed_dialog(user_id, role, content);
        Ok(())
    }

    async fn get_recent_dialog(&self, user_id: UserId, limit: u32) -> Result<Vec<ChatTurn>> {
        self.read_guard()?;
        let all = self.dialog(user_id);
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn log_usage(&self, user_id: UserId) -> Result<()> {
        self.write_guard()?;
        *self.usage.lock().unwrap().entry(user_id.0).or_insert(0) += 1;
        Ok(())
    }
}

pub struct StubChat {
    pub reply: String,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<ChatTurn>>>,
}

impl StubChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(&self, context: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(context.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::collaborator("chat", "injected failure"));
        }
        Ok(self.reply.clone())
    }
}

pub struct StubImage {
    pub url: Url,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl StubImage {
    pub fn new(url: &str) -> Self {
        Self {
            url: Url::parse(url).unwrap(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for StubImage {
    async fn generate(&self, prompt: &str) -> Result<Url> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.url.clone())
    }
}

pub struct StubTranscriber {
    pub transcript: String,
    pub calls: AtomicUsize,
}

impl StubTranscriber {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _audio: &[u8], _language_hint: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

pub struct StubSpeech {
    pub audio: Vec<u8>,
    pub calls: AtomicUsize,
}

impl StubSpeech {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechModel for StubSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.audio.clone())
    }
}

pub struct StubExtractor {
    pub label: String,
    pub text: String,
}

#[async_trait]
impl DocumentExtractor for StubExtractor {
    async fn extract(&self, _file_name: &str, _bytes: &[u8]) -> Result<Extracted> {
        Ok(Extracted {
            label: self.label.clone(),
            text: self.text.clone(),
        })
    }
}

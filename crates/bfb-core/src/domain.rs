use chrono::{DateTime, Utc};
use url::Url;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Author of a dialog turn as persisted in the conversation log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One entry of the dialog context window passed to the chat model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plan {
    Monthly,
    Yearly,
}

impl Plan {
    pub fn parse(s: &str) -> Option<Plan> {
        match s {
            "monthly" => Some(Plan::Monthly),
            "yearly" => Some(Plan::Yearly),
            _ => None,
        }
    }
}

/// Paid subscription row. Written by the payment webhook (out of scope
/// here), read by the entitlement gate.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub user_id: UserId,
    pub plan: Plan,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub transaction_id: Option<String>,
    pub payment_method: Option<String>,
}

impl Subscription {
    /// An active subscription removes the daily quota until it expires.
    pub fn covers(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}

/// Payload of one normalized inbound event.
#[derive(Clone, Debug)]
pub enum TurnPayload {
    Text(String),
    Voice {
        bytes: Vec<u8>,
        language_hint: Option<String>,
    },
    Photo {
        bytes: Vec<u8>,
    },
    Document {
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// One normalized inbound event, produced by the transport adapter.
#[derive(Clone, Debug)]
pub struct UserTurn {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub payload: TurnPayload,
}

/// What the pipeline asks the transport to send back.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Photo(Url),
    Voice(Vec<u8>),
}

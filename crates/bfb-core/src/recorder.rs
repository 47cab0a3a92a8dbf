//! Usage recorder: persists that one successful turn was attributed to a
//! user.
//!
//! Not idempotent: calling it twice for the same logical turn double-counts.
//! The pipeline in `dispatch` is responsible for invoking it exactly once
//! per successfully dispatched turn.

use std::sync::Arc;

use crate::{
    domain::{Role, UserId},
    ports::UserStore,
    Result,
};

/// What a successful dispatch wants persisted. `user_content` is `None` when
/// the strategy already appended the user's turn itself (the chat strategy
/// does, so the fetched context ends with the current message).
#[derive(Clone, Debug)]
pub struct RecordedTurn {
    pub user_content: Option<String>,
    pub assistant_content: String,
}

pub struct UsageRecorder {
    store: Arc<dyn UserStore>,
    owner: UserId,
}

impl UsageRecorder {
    pub fn new(store: Arc<dyn UserStore>, owner: UserId) -> Self {
        Self { store, owner }
    }

    /// Append the dialog rows, then meter. The owner's dialog is still
    /// logged (conversational context must keep working for unmetered
    /// identities) but the counter and the usage audit row are skipped.
    pub async fn record(&self, user_id: UserId, turn: &RecordedTurn) -> Result<()> {
        if let Some(content) = &turn.user_content {
            self.store
                .append_dialog_turn(user_id, Role::User, content)
                .await?;
        }
        self.store
            .append_dialog_turn(user_id, Role::Assistant, &turn.assistant_content)
            .await?;

        if user_id != self.owner {
            self.store.increment_requests(user_id).await?;
            self.store.log_usage(user_id).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn recorder(store: &Arc<MemoryStore>) -> UsageRecorder {
        UsageRecorder::new(store.clone() as Arc<dyn UserStore>, UserId(777))
    }

    #[tokio::test]
    async fn records_both_rows_and_meters() {
        let store = Arc::new(MemoryStore::default());
        let r = recorder(&store);
        let u = UserId(1);

        r.record(
            u,
            &RecordedTurn {
                user_content: Some("нарисуй кота".to_string()),
                assistant_content: "https://img.example/cat.png".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.requests_today(u), 1);
        assert_eq!(store.usage_rows(u), 1);
        let dialog = store.dialog(u);
        assert_eq!(dialog.len(), 2);
        assert_eq!(dialog[0].role, Role::User);
        assert_eq!(dialog[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn skips_user_row_when_already_appended() {
        let store = Arc::new(MemoryStore::default());
        let r = recorder(&store);
        let u = UserId(2);

        r.record(
            u,
            &RecordedTurn {
                user_content: None,
                assistant_content: "ответ".to_string(),
            },
        )
        .await
        .unwrap();

        let dialog = store.dialog(u);
        assert_eq!(dialog.len(), 1);
        assert_eq!(dialog[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn owner_dialog_is_logged_but_not_metered() {
        let store = Arc::new(MemoryStore::default());
        let r = recorder(&store);
        let owner = UserId(777);

        r.record(
            owner,
            &RecordedTurn {
                user_content: Some("привет".to_string()),
                assistant_content: "привет!".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.requests_today(owner), 0);
        assert_eq!(store.usage_rows(owner), 0);
        assert_eq!(store.dialog(owner).len(), 2);
    }
}

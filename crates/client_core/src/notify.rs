//! User-facing feedback and confirmation seams.

use async_trait::async_trait;
use shared::domain::NoticeKind;

pub trait Notifier: Send + Sync {
    fn show(&self, kind: NoticeKind, title: &str, message: &str);
}

/// Asks the user to approve a destructive action before it runs.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, title: &str, body: &str) -> bool;
}

/// Answers every confirmation with a fixed value.
pub struct StaticConfirmation(pub bool);

#[async_trait]
impl ConfirmationGate for StaticConfirmation {
    async fn confirm(&self, _title: &str, _body: &str) -> bool {
        self.0
    }
}

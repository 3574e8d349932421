//! Terminal implementations of the feedback and confirmation seams.

use async_trait::async_trait;
use client_core::{ConfirmationGate, Notifier};
use shared::domain::NoticeKind;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show(&self, kind: NoticeKind, title: &str, message: &str) {
        match kind {
            NoticeKind::Error => eprintln!("[{kind}] {title}: {message}"),
            NoticeKind::Success => println!("[{kind}] {title}: {message}"),
        }
    }
}

/// Asks on stdin; only `y` or `yes` confirms.
pub struct PromptConfirmation;

#[async_trait]
impl ConfirmationGate for PromptConfirmation {
    async fn confirm(&self, title: &str, body: &str) -> bool {
        let mut stdout = io::stdout();
        let prompt = format!("{title} {body} [y/N]: ");
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        match BufReader::new(io::stdin()).read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

//! Background tasks for the application.
//!
//! Call `spawn_all` once during startup; it detaches every worker via
//! `tokio::spawn` and does not block.

use crate::external::{MailJob, Mailer};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn spawn_all(mail_rx: mpsc::Receiver<MailJob>, mailer: Arc<dyn Mailer>) {
    spawn_mail_worker(mail_rx, mailer);
}

/// Drains the mail queue until every producer is dropped. Delivery failures
/// are logged and never retried.
pub fn spawn_mail_worker(
    mut rx: mpsc::Receiver<MailJob>,
    mailer: Arc<dyn Mailer>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = mailer.send(&job.to, job.kind, &job.payload).await {
                log::error!("Failed to deliver {:?} mail to {}: {e:?}", job.kind, job.to);
            }
        }
        log::debug!("Mail worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use crate::external::{MailKind, MailQueue};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, MailKind)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, kind: MailKind, _payload: &Value) -> AppResult<()> {
            self.sent.lock().await.push((to.to_string(), kind));
            Ok(())
        }
    }

    #[tokio::test]
    async fn worker_delivers_queued_jobs() {
        let mailer = Arc::new(RecordingMailer::default());
        let (queue, rx) = MailQueue::new(8);
        let handle = spawn_mail_worker(rx, mailer.clone());

        queue.submit(MailJob {
            to: "guest@example.com".into(),
            kind: MailKind::OrderReceipt,
            payload: json!({}),
        });
        drop(queue);
        handle.await.unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.as_slice(), &[("guest@example.com".to_string(), MailKind::OrderReceipt)]);
    }
}

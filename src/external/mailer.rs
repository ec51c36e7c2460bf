use crate::config::MailerConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    Welcome,
    OrderReceipt,
}

impl MailKind {
    pub fn subject(&self) -> &'static str {
        match self {
            MailKind::Welcome => "Welcome to DrinkQuick",
            MailKind::OrderReceipt => "Your DrinkQuick receipt",
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    template: MailKind,
    data: &'a Value,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, kind: MailKind, payload: &Value) -> AppResult<()>;
}

/// Posts templated mail to a transactional e-mail HTTP API.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    config: MailerConfig,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, kind: MailKind, payload: &Value) -> AppResult<()> {
        let body = SendMailRequest {
            from: &self.config.from_address,
            to,
            subject: kind.subject(),
            template: kind,
            data: payload,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Mail {:?} sent to {}", kind, to);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Mail {:?} to {} failed: {}", kind, to, error_text);
            Err(AppError::ExternalApiError(format!(
                "Mail sending failed: {}",
                error_text
            )))
        }
    }
}

/// Stand-in used when no mail API is configured.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, kind: MailKind, _payload: &Value) -> AppResult<()> {
        log::info!("Mail delivery disabled, dropping {:?} for {}", kind, to);
        Ok(())
    }
}

pub fn build_mailer(config: &MailerConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        Arc::new(HttpMailer::new(config.clone()))
    } else {
        Arc::new(LogMailer)
    }
}

#[derive(Debug, Clone)]
pub struct MailJob {
    pub to: String,
    pub kind: MailKind,
    pub payload: Value,
}

/// Producer half of the mail queue. Submitting never blocks the request path:
/// a full or closed queue drops the job with a warning.
#[derive(Clone)]
pub struct MailQueue {
    sender: Option<mpsc::Sender<MailJob>>,
}

impl MailQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MailJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A queue that accepts and discards everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn submit(&self, job: MailJob) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                log::warn!("Mail queue full, dropping {:?} for {}", job.kind, job.to);
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                log::warn!("Mail queue closed, dropping {:?} for {}", job.kind, job.to);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(to: &str) -> MailJob {
        MailJob {
            to: to.to_string(),
            kind: MailKind::OrderReceipt,
            payload: json!({"orderNumber": "ORD-20260101-0001"}),
        }
    }

    #[tokio::test]
    async fn queue_delivers_in_order() {
        let (queue, mut rx) = MailQueue::new(4);
        assert!(queue.submit(job("a@example.com")));
        assert!(queue.submit(job("b@example.com")));
        assert_eq!(rx.recv().await.unwrap().to, "a@example.com");
        assert_eq!(rx.recv().await.unwrap().to, "b@example.com");
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (queue, _rx) = MailQueue::new(1);
        assert!(queue.submit(job("a@example.com")));
        assert!(!queue.submit(job("b@example.com")));
    }

    #[test]
    fn disabled_queue_discards() {
        assert!(!MailQueue::disabled().submit(job("a@example.com")));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        mailer
            .send("a@example.com", MailKind::Welcome, &json!({}))
            .await
            .unwrap();
    }
}

//! Confirmation mail delivery.
//!
//! Handlers never wait on mail. [`ChannelMailer`] implements the `Mailer`
//! port over a bounded Tokio channel; a single worker spawned by
//! [`spawn_mail_worker`] drains it and hands each message to a
//! [`MailTransport`]. Delivery failures are logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{Mailer, MailerError};
use crate::domain::{MailMessage, TraceId};

/// Failures raised while delivering a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailDeliveryError {
    /// The transport could not be configured.
    #[error("mail transport misconfigured: {message}")]
    Configuration { message: String },
    /// An address or body was rejected before sending.
    #[error("invalid message: {message}")]
    InvalidMessage { message: String },
    /// The relay refused or dropped the message.
    #[error("mail delivery failed: {message}")]
    Send { message: String },
}

/// Something that can put a message on the wire.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message.
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailDeliveryError>;
}

/// Transport that records messages in the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailDeliveryError> {
        info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            "mail delivered to log transport"
        );
        debug!(content = %message.content, "mail body");
        Ok(())
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Username and password, when the relay requires authentication.
    pub credentials: Option<(String, String)>,
}

/// Transport that relays through an SMTP server.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build a STARTTLS relay transport.
    ///
    /// # Errors
    /// Returns `Configuration` when the relay host is rejected.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailDeliveryError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|err| MailDeliveryError::Configuration {
                message: format!("SMTP relay error: {err}"),
            })?
            .port(settings.port);
        if let Some((username, password)) = settings.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn build_message(message: &MailMessage) -> Result<Message, MailDeliveryError> {
    let invalid = |err: &dyn std::fmt::Display| MailDeliveryError::InvalidMessage {
        message: err.to_string(),
    };
    Message::builder()
        .from(message.from.parse().map_err(|e| invalid(&e))?)
        .to(message.to.parse().map_err(|e| invalid(&e))?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(message.content.clone())
        .map_err(|e| invalid(&e))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailDeliveryError> {
        let email = build_message(message)?;
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|err| MailDeliveryError::Send {
                message: err.to_string(),
            })
    }
}

#[derive(Debug)]
struct QueuedMail {
    message: MailMessage,
    trace_id: Option<TraceId>,
}

/// `Mailer` that queues onto the delivery worker's channel.
#[derive(Debug, Clone)]
pub struct ChannelMailer {
    sender: mpsc::Sender<QueuedMail>,
}

impl Mailer for ChannelMailer {
    fn enqueue(&self, message: MailMessage) -> Result<(), MailerError> {
        let queued = QueuedMail {
            message,
            trace_id: TraceId::current(),
        };
        self.sender.try_send(queued).map_err(|err| match err {
            TrySendError::Full(_) => MailerError::queue_full(),
            TrySendError::Closed(_) => MailerError::closed(),
        })
    }
}

/// Start the delivery worker and return the mailer feeding it.
///
/// The worker stops once every `ChannelMailer` clone has been dropped and
/// the queue is drained. Each delivery runs under the trace id of the
/// request that queued it.
pub fn spawn_mail_worker(
    transport: Arc<dyn MailTransport>,
    capacity: usize,
) -> (ChannelMailer, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<QueuedMail>(capacity.max(1));
    let handle = tokio::spawn(async move {
        while let Some(QueuedMail { message, trace_id }) = receiver.recv().await {
            let delivery = deliver_logged(transport.as_ref(), message);
            match trace_id {
                Some(id) => TraceId::scope(id, delivery).await,
                None => delivery.await,
            }
        }
        debug!("mail worker stopped");
    });
    (ChannelMailer { sender }, handle)
}

async fn deliver_logged(transport: &dyn MailTransport, message: MailMessage) {
    if let Err(error) = transport.deliver(&message).await {
        warn!(
            trace_id = ?TraceId::current(),
            to = %message.to,
            subject = %message.subject,
            %error,
            "mail delivery failed"
        );
    }
}

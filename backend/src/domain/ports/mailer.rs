//! Driven port for handing confirmation mail to the delivery worker.

use crate::domain::MailMessage;

use super::define_port_error;

define_port_error! {
    /// Reasons a message could not be queued.
    pub enum MailerError {
        /// The queue is at capacity.
        QueueFull => "mail queue is full" as ServiceUnavailable,
        /// The delivery worker has stopped.
        Closed => "mail queue is closed" as ServiceUnavailable,
    }
}

/// Non-blocking mail queue.
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    /// Queue `message` for delivery without waiting.
    fn enqueue(&self, message: MailMessage) -> Result<(), MailerError>;
}

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::SharedState;

/// Failure raised by an activation mail sender.
#[derive(Debug, Error)]
pub enum MailError {
    /// The underlying transport refused or dropped the message.
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// External mail delivery consumed by the invitation flows.
///
/// Delivery happens after the inviting transaction committed; a failure is
/// reported to the caller as a degraded success, never rolled back.
pub trait ActivationMailer: Send + Sync {
    /// Send the activation email carrying the single-use token.
    fn send_activation<'a>(
        &'a self,
        to: &'a str,
        token: &'a str,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Development mailer that logs the activation link instead of delivering it.
pub struct LogMailer {
    front_url: String,
}

impl LogMailer {
    /// Build a mailer pointing activation links at the given frontend.
    pub fn new(front_url: String) -> Self {
        Self { front_url }
    }
}

impl ActivationMailer for LogMailer {
    fn send_activation<'a>(
        &'a self,
        to: &'a str,
        token: &'a str,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let link = format!(
                "{}/activar-cuenta?email={}&token={}",
                self.front_url, email, token
            );
            info!(to, %link, "activation email dispatched");
            Ok(())
        })
    }
}

/// Dispatch an activation email, reporting delivery as a boolean.
///
/// The caller's state change already committed, so a transport failure only
/// degrades the outcome: it is logged and surfaced as `false`.
pub(crate) async fn dispatch_activation_email(state: &SharedState, to: &str, token: &str) -> bool {
    match state.mailer().send_activation(to, token, to).await {
        Ok(()) => true,
        Err(err) => {
            warn!(to, error = %err, "activation email dispatch failed");
            false
        }
    }
}

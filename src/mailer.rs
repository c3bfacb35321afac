use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{config::SmtpConfig, dto::Draft, error::DispatchError, render::body_to_html};

/// Port that speaks TLS from the first byte instead of upgrading.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Delivers a finished draft to a single recipient.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(
        &self,
        config: &SmtpConfig,
        recipient: &str,
        draft: &Draft,
    ) -> Result<(), DispatchError>;
}

pub fn build_message(
    config: &SmtpConfig,
    recipient: &str,
    draft: &Draft,
) -> Result<Message, DispatchError> {
    let from: Mailbox = config.from.parse()?;
    let to: Mailbox = recipient.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(draft.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            draft.body.clone(),
            body_to_html(&draft.body),
        ))?;

    Ok(message)
}

fn transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, DispatchError> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());

    let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        .port(config.port)
        .tls(tls_mode(config)?)
        .credentials(creds)
        .build();

    Ok(transport)
}

/// Implicit TLS on 465, opportunistic STARTTLS everywhere else.
fn tls_mode(config: &SmtpConfig) -> Result<Tls, DispatchError> {
    let params = TlsParameters::new(config.host.clone())?;

    if config.port == IMPLICIT_TLS_PORT {
        Ok(Tls::Wrapper(params))
    } else {
        Ok(Tls::Opportunistic(params))
    }
}

/// Opens a fresh SMTP connection for every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpDispatcher;

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    async fn send(
        &self,
        config: &SmtpConfig,
        recipient: &str,
        draft: &Draft,
    ) -> Result<(), DispatchError> {
        let email = build_message(config, recipient, draft)?;
        let mailer = transport(config)?;

        tracing::info!(
            "Sending email to '{}' with subject '{}' via {}:{}",
            recipient,
            draft.subject,
            config.host,
            config.port
        );

        mailer.send(email).await?;

        tracing::info!("Message to {} sent successfully", recipient);

        Ok(())
    }
}

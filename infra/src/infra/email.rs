use anyhow::{Context, Result};
use bifrost_base::error::BifrostError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmailBackend {
    Smtp,
    #[default]
    Console,
    Memory,
}

/// # Environment Variables (prefix `EMAIL_`)
/// - `EMAIL_BACKEND`: smtp | console | memory (default: console)
/// - `EMAIL_HOST`, `EMAIL_PORT`: smtp server
/// - `EMAIL_HOST_USER`, `EMAIL_HOST_PASSWORD`: smtp credentials
/// - `EMAIL_USE_TLS`: relay over tls (default: true)
#[derive(Deserialize, Clone, Debug)]
pub struct EmailConfig {
    #[serde(default)]
    pub backend: EmailBackend,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub host_user: Option<String>,
    pub host_password: Option<String>,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    25
}
fn default_use_tls() -> bool {
    true
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            backend: EmailBackend::default(),
            host: default_host(),
            port: default_port(),
            host_user: None,
            host_password: None,
            use_tls: default_use_tls(),
        }
    }
}

pub fn load_email_config_from_env() -> Result<EmailConfig> {
    envy::prefixed("EMAIL_")
        .from_env::<EmailConfig>()
        .context("cannot read email config from env")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}

impl EmailMessage {
    fn to_lettre(&self) -> Result<Message> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(self.subject.clone());
        for to in &self.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        let message = match &self.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                self.body.clone(),
                html.clone(),
            )),
            None => builder.body(self.body.clone()),
        };
        message.map_err(|e| BifrostError::EmailError(format!("cannot build message: {:?}", e)).into())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| BifrostError::EmailError(format!("invalid address {}: {:?}", address, e)).into())
}

/// outgoing mail backends
#[derive(Clone)]
pub enum EmailSender {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// writes mails to the log
    Console,
    /// keeps sent mails (for tests)
    Memory(Arc<Mutex<Vec<EmailMessage>>>),
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailSender::Smtp(_) => write!(f, "EmailSender::Smtp"),
            EmailSender::Console => write!(f, "EmailSender::Console"),
            EmailSender::Memory(_) => write!(f, "EmailSender::Memory"),
        }
    }
}

impl EmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        match config.backend {
            EmailBackend::Smtp => {
                let builder = if config.use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(|e| {
                        BifrostError::EmailError(format!("smtp relay {}: {:?}", &config.host, e))
                    })?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                };
                let builder = builder.port(config.port);
                let builder = match (&config.host_user, &config.host_password) {
                    (Some(user), Some(password)) => {
                        builder.credentials(Credentials::new(user.clone(), password.clone()))
                    }
                    _ => builder,
                };
                Ok(EmailSender::Smtp(builder.build()))
            }
            EmailBackend::Console => Ok(EmailSender::Console),
            EmailBackend::Memory => Ok(Self::new_memory()),
        }
    }

    pub fn new_memory() -> Self {
        EmailSender::Memory(Arc::new(Mutex::new(Vec::new())))
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<()> {
        match self {
            EmailSender::Smtp(transport) => {
                let m = message.to_lettre()?;
                transport
                    .send(m)
                    .await
                    .map_err(|e| BifrostError::EmailError(format!("smtp send: {:?}", e)))?;
                Ok(())
            }
            EmailSender::Console => {
                // validates addresses like the other backends
                message.to_lettre()?;
                tracing::info!(
                    "email: from={}, to={:?}, subject={}\n{}",
                    &message.from,
                    &message.to,
                    &message.subject,
                    &message.body
                );
                Ok(())
            }
            EmailSender::Memory(outbox) => {
                message.to_lettre()?;
                outbox
                    .lock()
                    .map_err(|e| BifrostError::RuntimeError(format!("outbox lock: {:?}", e)))?
                    .push(message.clone());
                Ok(())
            }
        }
    }

    /// mails kept by the memory backend (empty for the others)
    pub fn outbox(&self) -> Vec<EmailMessage> {
        match self {
            EmailSender::Memory(outbox) => outbox.lock().map(|o| o.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

pub trait UseEmailSender {
    fn email_sender(&self) -> &EmailSender;
}

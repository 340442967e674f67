use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("invalid mailbox address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP settings for the contact-form relay.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    /// Defaults to 587 (STARTTLS submission port).
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender mailbox for both outbound messages.
    pub from_address: String,
    /// Display name used in the From header and message bodies.
    pub from_name: String,
    pub tls: bool,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            from_address: "noreply@localhost".to_string(),
            from_name: "Patient Portal".to_string(),
            tls: true,
        }
    }
}

impl MailerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or(default.smtp_host),

            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.smtp_port),

            username: env::var("SMTP_USERNAME").ok(),

            password: env::var("SMTP_PASSWORD").ok(),

            from_address: env::var("SMTP_FROM_ADDRESS").unwrap_or(default.from_address),

            from_name: env::var("SMTP_FROM_NAME").unwrap_or(default.from_name),

            tls: env::var("SMTP_TLS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.tls),
        }
    }
}

/// Sends contact-form mail through a single long-lived SMTP transport.
pub struct Mailer {
    config: MailerConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Inject a pre-built transport. Test seam.
    pub fn with_transport(
        config: MailerConfig,
        transport: AsyncSmtpTransport<Tokio1Executor>,
    ) -> Self {
        Self { config, transport }
    }

    /// Relay one contact-form submission: a notification carrying the form
    /// contents followed by a thank-you confirmation, both addressed to the
    /// submitter. Fails on the first send error; nothing is retried.
    pub async fn send_contact(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<(), MailerError> {
        let notification = build_notification(&self.config, name, email, message)?;
        let confirmation = build_confirmation(&self.config, name, email)?;

        self.transport.send(notification).await.map_err(|e| {
            error!("SMTP send failed (notification): {}", e);
            e
        })?;
        self.transport.send(confirmation).await.map_err(|e| {
            error!("SMTP send failed (confirmation): {}", e);
            e
        })?;

        info!("📧 Contact emails sent to {}", email);
        Ok(())
    }
}

fn sender_mailbox(config: &MailerConfig) -> Result<Mailbox, MailerError> {
    format!("\"{}\" <{}>", config.from_name, config.from_address)
        .parse()
        .map_err(|e| MailerError::Address(format!("invalid from address: {e}")))
}

/// Build a text+HTML multipart message.
fn build_multipart(
    config: &MailerConfig,
    to: &str,
    subject: &str,
    text: String,
    html: String,
) -> Result<Message, MailerError> {
    let to_mailbox: Mailbox = to
        .parse()
        .map_err(|e| MailerError::Address(format!("invalid recipient address: {e}")))?;

    let message = Message::builder()
        .from(sender_mailbox(config)?)
        .to(to_mailbox)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html),
                ),
        )?;

    Ok(message)
}

/// The form contents, echoed to the submitter.
pub fn build_notification(
    config: &MailerConfig,
    name: &str,
    email: &str,
    message: &str,
) -> Result<Message, MailerError> {
    build_multipart(
        config,
        email,
        &format!("Contact Form Submission from {name}"),
        format!("Name: {name}\nEmail: {email}\nMessage: {message}"),
        format!(
            "<p><strong>Name:</strong> {name}</p>\
             <p><strong>Email:</strong> {email}</p>\
             <p><strong>Message:</strong> {message}</p>"
        ),
    )
}

/// The thank-you acknowledgement.
pub fn build_confirmation(
    config: &MailerConfig,
    name: &str,
    email: &str,
) -> Result<Message, MailerError> {
    let team = &config.from_name;
    build_multipart(
        config,
        email,
        &format!("Thank You for Contacting {team}"),
        format!(
            "Dear {name},\n\nThank you for reaching out to us! \
             Our team will contact you within 24 hours.\n\n\
             Best regards,\n{team}"
        ),
        format!(
            "<p>Dear {name},</p>\
             <p>Thank you for reaching out to us! Our team will contact you within 24 hours.</p>\
             <p>Best regards,<br>{team}</p>"
        ),
    )
}

fn build_transport(
    config: &MailerConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);

    let builder = if let (Some(user), Some(pass)) = (&config.username, &config.password) {
        builder.credentials(Credentials::new(user.clone(), pass.clone()))
    } else {
        builder
    };

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MailerConfig {
        MailerConfig {
            from_address: "portal@example.com".to_string(),
            tls: false,
            ..MailerConfig::default()
        }
    }

    #[test]
    fn test_build_notification_ok() {
        let config = test_config();
        let message = build_notification(&config, "Ada", "ada@example.com", "Hello there");
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_confirmation_ok() {
        let config = test_config();
        let message = build_confirmation(&config, "Ada", "ada@example.com");
        assert!(message.is_ok());
    }

    #[test]
    fn test_invalid_recipient_is_address_error() {
        let config = test_config();
        let err = build_notification(&config, "Ada", "not-an-email", "Hello").unwrap_err();
        assert!(matches!(err, MailerError::Address(_)));
    }

    #[test]
    fn test_invalid_from_is_address_error() {
        let config = MailerConfig {
            from_address: "broken".to_string(),
            ..test_config()
        };
        let err = build_confirmation(&config, "Ada", "ada@example.com").unwrap_err();
        assert!(matches!(err, MailerError::Address(_)));
    }

    #[tokio::test]
    async fn test_build_transport_without_tls() {
        let config = test_config();
        assert!(build_transport(&config).is_ok());
    }

    #[tokio::test]
    async fn test_build_transport_with_credentials() {
        let config = MailerConfig {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..test_config()
        };
        assert!(build_transport(&config).is_ok());
    }

    #[tokio::test]
    async fn test_mailer_new_without_tls() {
        assert!(Mailer::new(test_config()).is_ok());
    }
}

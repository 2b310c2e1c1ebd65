use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{self, authentication::Credentials, response::Code},
    Message, SmtpTransport, Transport as _,
};
use log::{debug, error, trace};

use crate::{
    config::{Credential, Settings, DEFAULT_SMTP_PORT},
    notification::{
        transport::{ConnectFailure, FailureReason, Transport},
        Notification,
    },
    utils::make_single_line,
};

/// SMTP server reached over TLS. A new connection is opened for every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpRelay {
    host: String,
    port: u16,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.smtp_host.clone(), settings.smtp_port)
    }

    /// Implicit TLS on the submissions port, STARTTLS on anything else
    fn mailer(&self, user: &str, credential: &Credential) -> Result<SmtpTransport, smtp::Error> {
        let builder = if self.port == DEFAULT_SMTP_PORT {
            SmtpTransport::relay(&self.host)?
        } else {
            SmtpTransport::starttls_relay(&self.host)?
        };
        trace!("Building SMTP transport for {}:{} as {user}", self.host, self.port);
        Ok(builder
            .port(self.port)
            .credentials(Credentials::new(
                user.to_owned(),
                credential.expose().to_owned(),
            ))
            .build())
    }
}

pub fn build_message(notification: &Notification) -> anyhow::Result<Message> {
    let from: Mailbox = notification
        .from
        .parse()
        .with_context(|| format!("Invalid sender address {:?}", notification.from))?;
    let to: Mailbox = notification
        .to
        .parse()
        .with_context(|| format!("Invalid recipient address {:?}", notification.to))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(notification.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())
        .context("Failed to build email")
}

/// 530, 534 and 535 are the replies servers use to reject a login
fn is_auth_code(code: Code) -> bool {
    matches!(code.to_string().as_str(), "530" | "534" | "535")
}

/// `protocol` is true when the server answered or the client refused to continue,
/// as opposed to network or TLS trouble
fn failure_for(status: Option<Code>, protocol: bool, msg: String) -> FailureReason {
    if status.is_some_and(is_auth_code) {
        FailureReason::Authentication { msg }
    } else if protocol {
        FailureReason::Protocol { msg }
    } else {
        FailureReason::Unexpected { msg }
    }
}

fn connect_failure_for(status: Option<Code>, msg: String) -> ConnectFailure {
    if status.is_some_and(is_auth_code) {
        ConnectFailure::Authentication { msg }
    } else {
        ConnectFailure::Connection { msg }
    }
}

fn classify_send_error(err: &smtp::Error) -> FailureReason {
    failure_for(
        err.status(),
        err.is_response() || err.is_permanent() || err.is_transient() || err.is_client(),
        make_single_line(&err.to_string()).into_owned(),
    )
}

impl Transport for SmtpRelay {
    fn connect_and_authenticate(
        &self,
        sender: &str,
        credential: &Credential,
    ) -> Result<(), ConnectFailure> {
        debug!("Testing SMTP login on {}:{}", self.host, self.port);
        let mailer = self
            .mailer(sender, credential)
            .map_err(|e| ConnectFailure::Connection {
                msg: make_single_line(&e.to_string()).into_owned(),
            })?;
        match mailer.test_connection() {
            Ok(true) => {
                trace!("SMTP login accepted");
                Ok(())
            }
            Ok(false) => Err(ConnectFailure::Connection {
                msg: "el servidor cerró la conexión".to_string(),
            }),
            Err(e) => {
                let msg = make_single_line(&e.to_string()).into_owned();
                trace!("SMTP login failed: {msg}");
                Err(connect_failure_for(e.status(), msg))
            }
        }
    }

    fn send(
        &self,
        credential: &Credential,
        notification: &Notification,
    ) -> Result<(), FailureReason> {
        let message = build_message(notification).map_err(|e| {
            error!("{e:?}");
            FailureReason::Unexpected {
                msg: format!("{e:#}"),
            }
        })?;
        let mailer = self
            .mailer(&notification.from, credential)
            .map_err(|e| classify_send_error(&e))?;

        debug!("Sending email to {}", notification.to);
        match mailer.send(&message) {
            Ok(response) => {
                trace!(
                    "Server replied {} {}",
                    response.code(),
                    response.first_line().unwrap_or_default()
                );
                Ok(())
            }
            Err(e) => {
                trace!("Send to {} failed: {e:?}", notification.to);
                Err(classify_send_error(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::transport::smtp::response::{Category, Detail, Severity};
    use rstest::rstest;

    fn code(severity: Severity, category: Category, detail: Detail) -> Code {
        Code::new(severity, category, detail)
    }

    #[rstest]
    #[case(Detail::Zero)]
    #[case(Detail::Four)]
    #[case(Detail::Five)]
    fn login_rejections_are_auth_failures(#[case] detail: Detail) {
        let status = code(
            Severity::PermanentNegativeCompletion,
            Category::Unspecified3,
            detail,
        );
        assert!(matches!(
            failure_for(Some(status), true, "rejected".into()),
            FailureReason::Authentication { .. }
        ));
        assert!(matches!(
            connect_failure_for(Some(status), "rejected".into()),
            ConnectFailure::Authentication { .. }
        ));
    }

    #[rstest]
    #[case(Some(code(Severity::PermanentNegativeCompletion, Category::MailSystem, Detail::Zero)), true)]
    #[case(Some(code(Severity::TransientNegativeCompletion, Category::Unspecified4, Detail::Four)), true)]
    #[case(Some(code(Severity::PermanentNegativeCompletion, Category::Unspecified3, Detail::Three)), true)]
    #[case(None, true)]
    fn other_server_errors_are_protocol_failures(
        #[case] status: Option<Code>,
        #[case] protocol: bool,
    ) {
        assert_eq!(
            failure_for(status, protocol, "550 mailbox unavailable".into()),
            FailureReason::Protocol {
                msg: "550 mailbox unavailable".into()
            }
        );
        assert!(matches!(
            connect_failure_for(status, "no".into()),
            ConnectFailure::Connection { .. }
        ));
    }

    #[test]
    fn network_errors_are_unexpected() {
        assert_eq!(
            failure_for(None, false, "connection refused".into()),
            FailureReason::Unexpected {
                msg: "connection refused".into()
            }
        );
    }

    #[test]
    fn reply_codes_render_as_digits() {
        let status = code(
            Severity::PermanentNegativeCompletion,
            Category::Unspecified3,
            Detail::Five,
        );
        assert_eq!(status.to_string(), "535");
        assert!(is_auth_code(status));
    }

    #[test]
    fn message_from_notification() {
        let n = Notification::gift_assignment("santa@example.com", "ana@example.com", "Beto");
        let message = build_message(&n).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: santa@example.com"));
        assert!(formatted.contains("To: ana@example.com"));
        assert!(formatted.contains("Content-Type: text/plain; charset=utf-8"));
    }

    #[test]
    fn invalid_address_is_an_error() {
        let n = Notification::gift_assignment("santa@example.com", "not an address", "Beto");
        assert!(build_message(&n).is_err());
    }

    #[test]
    fn bad_address_is_unexpected_failure_not_panic() {
        // Fails while building the message so no connection is attempted
        let relay = SmtpRelay::new("localhost", 2525);
        let n = Notification::gift_assignment("santa@example.com", "not an address", "Beto");
        let actual = relay.send(&Credential::new("secret"), &n);
        assert!(matches!(actual, Err(FailureReason::Unexpected { .. })));
    }
}

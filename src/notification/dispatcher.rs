use std::io::{self, Write};

use log::{debug, info, warn};

use crate::{
    config::{Credential, Mode, Settings},
    notification::{
        transport::{ConnectFailure, FailureReason, Transport, AUTH_HINT},
        Notification,
    },
    Assignment,
};

/// Result of notifying one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub email: String,
    pub failure: Option<FailureReason>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failed_addresses(&self) -> Vec<&str> {
        self.failed().map(|o| o.email.as_str()).collect()
    }

    pub fn print_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let failures = self.failed_addresses();
        writeln!(
            out,
            "✅ Intentos: {} enviados correctamente, {} fallos.",
            self.succeeded(),
            failures.len()
        )?;
        if !failures.is_empty() {
            writeln!(out, "Correos fallidos para:")?;
            for email in failures {
                writeln!(out, " - {email}")?;
            }
        }
        Ok(())
    }
}

/// Sends one notification per giver, one after the other, never stopping on a failure
pub struct Dispatcher<'a, T: Transport + ?Sized> {
    transport: &'a T,
    sender: &'a str,
    credential: Option<&'a Credential>,
    mode: Mode,
}

impl<'a, T: Transport + ?Sized> Dispatcher<'a, T> {
    pub fn new(
        transport: &'a T,
        sender: &'a str,
        credential: Option<&'a Credential>,
        mode: Mode,
    ) -> Self {
        Self {
            transport,
            sender,
            credential,
            mode,
        }
    }

    pub fn from_settings(transport: &'a T, settings: &'a Settings) -> Self {
        Self::new(
            transport,
            &settings.sender,
            settings.credential.as_ref(),
            settings.mode,
        )
    }

    pub fn dispatch<W: Write>(&self, assignment: &Assignment, out: &mut W) -> io::Result<RunSummary> {
        info!(
            "Dispatching {} notifications in {:?} mode",
            assignment.participants().len(),
            self.mode
        );
        let mut summary = RunSummary::default();
        for pairing in assignment.pairings() {
            debug!("Notifying {}", pairing.giver);
            let notification = Notification::gift_assignment(
                self.sender,
                &pairing.giver.email,
                &pairing.recipient_name,
            );
            let failure = self.deliver(&notification, out)?;
            summary.outcomes.push(DeliveryOutcome {
                email: pairing.giver.email,
                failure,
            });
        }
        debug_assert_eq!(summary.total(), assignment.participants().len());
        Ok(summary)
    }

    /// Returns the failure reason, if any. Only errors writing to `out` are propagated
    fn deliver<W: Write>(
        &self,
        notification: &Notification,
        out: &mut W,
    ) -> io::Result<Option<FailureReason>> {
        if self.mode == Mode::DryRun {
            writeln!(out, "{}", notification.preview())?;
            return Ok(None);
        }

        let Some(credential) = self.credential else {
            let reason = FailureReason::MissingCredential;
            writeln!(out, "ERROR: {reason}. Revisá tu archivo .env")?;
            return Ok(Some(reason));
        };

        writeln!(out, "Enviando correo a {}...", notification.to)?;
        match self.transport.send(credential, notification) {
            Ok(()) => {
                debug!("Email sent to {}", notification.to);
                Ok(None)
            }
            Err(reason) => {
                warn!("Failed to send to {}: {reason}", notification.to);
                writeln!(out, "Error enviando a {} -> {reason}", notification.to)?;
                if matches!(reason, FailureReason::Authentication { .. }) {
                    writeln!(out, "{AUTH_HINT}")?;
                }
                Ok(Some(reason))
            }
        }
    }
}

/// Only logs in, sends nothing. Returns true if the login succeeded
pub fn check_connectivity<T: Transport + ?Sized, W: Write>(
    transport: &T,
    sender: &str,
    credential: Option<&Credential>,
    out: &mut W,
) -> io::Result<bool> {
    let result = match credential {
        Some(credential) => transport.connect_and_authenticate(sender, credential),
        None => Err(ConnectFailure::MissingCredential),
    };
    match result {
        Ok(()) => {
            writeln!(out, "Conexión SMTP: OK (inicio de sesión correcto)")?;
            Ok(true)
        }
        Err(failure) => {
            writeln!(out, "ERROR: {failure}")?;
            if matches!(failure, ConnectFailure::Authentication { .. }) {
                writeln!(out, "{AUTH_HINT}")?;
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Participant;
    use rstest::rstest;
    use std::{cell::RefCell, collections::HashMap};

    /// Records every call instead of talking to a server
    #[derive(Default)]
    struct FakeTransport {
        sent: RefCell<Vec<Notification>>,
        logins: RefCell<usize>,
        fail_for: HashMap<String, FailureReason>,
        connect_failure: Option<ConnectFailure>,
    }

    impl FakeTransport {
        fn failing(failures: &[(&str, FailureReason)]) -> Self {
            Self {
                fail_for: failures
                    .iter()
                    .map(|(email, reason)| (email.to_string(), reason.clone()))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl Transport for FakeTransport {
        fn connect_and_authenticate(
            &self,
            _sender: &str,
            _credential: &Credential,
        ) -> Result<(), ConnectFailure> {
            *self.logins.borrow_mut() += 1;
            match &self.connect_failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(()),
            }
        }

        fn send(
            &self,
            _credential: &Credential,
            notification: &Notification,
        ) -> Result<(), FailureReason> {
            self.sent.borrow_mut().push(notification.clone());
            match self.fail_for.get(&notification.to) {
                Some(reason) => Err(reason.clone()),
                None => Ok(()),
            }
        }
    }

    fn assignment(n: usize) -> Assignment {
        Assignment::from_order(
            (0..n)
                .map(|i| Participant::new(format!("P{i}"), format!("p{i}@example.com")))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn dry_run_two_participants() {
        let transport = FakeTransport::default();
        let credential = Credential::new("secret");
        let dispatcher = Dispatcher::new(
            &transport,
            "santa@example.com",
            Some(&credential),
            Mode::DryRun,
        );
        let mut out = Vec::new();

        let summary = dispatcher.dispatch(&assignment(2), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("SIMULACIÓN: vista previa del correo").count(), 2);
        assert!(transport.sent.borrow().is_empty());
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.total(), 2);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(10)]
    fn dry_run_never_sends(#[case] n: usize) {
        let transport = FakeTransport::default();
        let dispatcher = Dispatcher::new(&transport, "santa@example.com", None, Mode::DryRun);
        let summary = dispatcher.dispatch(&assignment(n), &mut io::sink()).unwrap();
        assert!(transport.sent.borrow().is_empty());
        assert_eq!(summary.succeeded(), n);
    }

    #[test]
    fn live_sends_each_giver_their_recipient() {
        let transport = FakeTransport::default();
        let credential = Credential::new("secret");
        let dispatcher =
            Dispatcher::new(&transport, "santa@example.com", Some(&credential), Mode::Live);

        let summary = dispatcher.dispatch(&assignment(3), &mut io::sink()).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].to, "p0@example.com");
        assert!(sent[0].body.contains("P1"));
        assert!(sent[2].body.contains("P0"));
        assert!(sent.iter().all(|n| n.from == "santa@example.com"));
        assert_eq!(summary.succeeded(), 3);
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let transport = FakeTransport::failing(&[
            (
                "p0@example.com",
                FailureReason::Authentication {
                    msg: "535 bad credentials".into(),
                },
            ),
            (
                "p2@example.com",
                FailureReason::Protocol {
                    msg: "550 mailbox unavailable".into(),
                },
            ),
        ]);
        let credential = Credential::new("secret");
        let dispatcher =
            Dispatcher::new(&transport, "santa@example.com", Some(&credential), Mode::Live);
        let mut out = Vec::new();

        let summary = dispatcher.dispatch(&assignment(4), &mut out).unwrap();

        assert_eq!(transport.sent.borrow().len(), 4);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(
            summary.failed_addresses(),
            vec!["p0@example.com", "p2@example.com"]
        );
        assert_eq!(summary.succeeded() + summary.failed().count(), 4);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(AUTH_HINT));
    }

    #[test]
    fn missing_credential_fails_every_send_without_transport() {
        let transport = FakeTransport::default();
        let dispatcher = Dispatcher::new(&transport, "santa@example.com", None, Mode::Live);
        let mut out = Vec::new();

        let summary = dispatcher.dispatch(&assignment(3), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed
                .matches("ERROR: no se encontró la variable 'password'. Revisá tu archivo .env")
                .count(),
            3
        );
        assert!(transport.sent.borrow().is_empty());
        assert_eq!(summary.succeeded(), 0);
        assert!(summary
            .failed()
            .all(|o| o.failure == Some(FailureReason::MissingCredential)));
    }

    #[test]
    fn summary_output() {
        let summary = RunSummary {
            outcomes: vec![
                DeliveryOutcome {
                    email: "a@example.com".into(),
                    failure: None,
                },
                DeliveryOutcome {
                    email: "b@example.com".into(),
                    failure: Some(FailureReason::Unexpected { msg: "boom".into() }),
                },
            ],
        };
        let mut out = Vec::new();
        summary.print_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "✅ Intentos: 1 enviados correctamente, 1 fallos.\nCorreos fallidos para:\n - b@example.com\n"
        );
    }

    #[test]
    fn connectivity_ok() {
        let transport = FakeTransport::default();
        let credential = Credential::new("secret");
        let mut out = Vec::new();
        assert!(
            check_connectivity(&transport, "santa@example.com", Some(&credential), &mut out)
                .unwrap()
        );
        assert_eq!(*transport.logins.borrow(), 1);
        assert!(transport.sent.borrow().is_empty());
    }

    #[rstest]
    #[case(Some(ConnectFailure::Authentication { msg: "535".into() }), true)]
    #[case(Some(ConnectFailure::Connection { msg: "refused".into() }), false)]
    fn connectivity_failures(#[case] failure: Option<ConnectFailure>, #[case] hint: bool) {
        let transport = FakeTransport {
            connect_failure: failure,
            ..Default::default()
        };
        let credential = Credential::new("secret");
        let mut out = Vec::new();
        assert!(
            !check_connectivity(&transport, "santa@example.com", Some(&credential), &mut out)
                .unwrap()
        );
        assert_eq!(String::from_utf8(out).unwrap().contains(AUTH_HINT), hint);
    }

    #[test]
    fn connectivity_without_credential_skips_login() {
        let transport = FakeTransport::default();
        assert!(!check_connectivity(&transport, "santa@example.com", None, &mut io::sink()).unwrap());
        assert_eq!(*transport.logins.borrow(), 0);
    }
}

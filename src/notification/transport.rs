use std::fmt::Display;

use crate::{config::Credential, notification::Notification};

/// Why a single email was not delivered. None of these stop the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No `password` configured so nothing could be sent
    MissingCredential,
    Authentication { msg: String },
    Protocol { msg: String },
    Unexpected { msg: String },
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::MissingCredential => {
                write!(f, "no se encontró la variable 'password'")
            }
            FailureReason::Authentication { msg } => write!(f, "error de autenticación SMTP: {msg}"),
            FailureReason::Protocol { msg } => write!(f, "error SMTP: {msg}"),
            FailureReason::Unexpected { msg } => write!(f, "error inesperado: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectFailure {
    MissingCredential,
    Authentication { msg: String },
    Connection { msg: String },
}

impl Display for ConnectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectFailure::MissingCredential => {
                write!(f, "no se encontró la variable 'password'")
            }
            ConnectFailure::Authentication { msg } => {
                write!(f, "error de autenticación SMTP: {msg}")
            }
            ConnectFailure::Connection { msg } => write!(f, "error de conexión SMTP: {msg}"),
        }
    }
}

/// Authenticated delivery of notifications
pub trait Transport {
    /// Logs in as `sender` without sending anything
    fn connect_and_authenticate(
        &self,
        sender: &str,
        credential: &Credential,
    ) -> Result<(), ConnectFailure>;

    /// Logs in as the notification's sender and delivers it
    fn send(&self, credential: &Credential, notification: &Notification)
        -> Result<(), FailureReason>;
}

/// Printed after any authentication failure
pub const AUTH_HINT: &str =
    "Sugerencia: Gmail suele pedir una contraseña de aplicación (cuenta con 2FA) en lugar de la contraseña de la cuenta.";

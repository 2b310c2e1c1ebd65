pub mod confirm;
mod dispatcher;
mod message;
mod smtp;
mod transport;

pub use dispatcher::{check_connectivity, DeliveryOutcome, Dispatcher, RunSummary};
pub use message::Notification;
pub use smtp::SmtpRelay;
pub use transport::{ConnectFailure, FailureReason, Transport};

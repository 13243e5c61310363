//! Outbound adapters driven by the application core.

mod smtp;

pub use smtp::{SmtpConfig, SmtpMailer, SmtpTls};

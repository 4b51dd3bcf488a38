//! Notification transports - SMTP mail and a logging fallback

mod smtp;
mod templates;

pub use smtp::{LogNotifier, SmtpNotifier};
pub use templates::{
    otp_email, otp_sms, password_reset_email, warranty_confirmation_email, EmailContent,
};

//! Transactional email delivery through the Resend HTTP API

mod resend_client;

pub use resend_client::{EmailError, EmailMessage, ResendClient};

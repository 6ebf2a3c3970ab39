mod email_notifier;
mod notifier;
mod templates;

pub use email_notifier::EmailNotifier;
pub use notifier::{LogNotifier, Notifier};

pub mod services;

pub use services::{EmailNotifier, LogNotifier, Notifier};

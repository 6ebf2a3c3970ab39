mod user_dashboard_handler;

pub use user_dashboard_handler::*;

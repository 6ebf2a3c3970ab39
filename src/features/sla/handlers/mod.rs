mod sla_handler;

pub use sla_handler::*;

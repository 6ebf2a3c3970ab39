mod sla_dto;

pub use sla_dto::*;

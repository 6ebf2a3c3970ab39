mod sla_monitor;

pub use sla_monitor::{SlaMonitor, SweepSummary};

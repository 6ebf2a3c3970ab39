/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// DUPLICATE DETECTION
// =============================================================================

/// Peers farther than this from a new submission are never duplicates
pub const DUPLICATE_RADIUS_METERS: f64 = 100.0;

/// Only peers created within this many hours of "now" are eligible
pub const DUPLICATE_WINDOW_HOURS: i64 = 24;

/// Earth's radius in meters (for Haversine formula)
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Description excerpt length used in titles and admin alerts
pub const DESCRIPTION_EXCERPT_CHARS: usize = 50;

/// Longer excerpt used in the body of critical-report alerts
pub const ALERT_EXCERPT_CHARS: usize = 100;

/// Ticket numbers are `CE` followed by a zero-padded sequence value
pub const TICKET_PREFIX: &str = "CE";

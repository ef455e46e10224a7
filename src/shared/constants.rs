/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage departments, override routing and report status
pub const ROLE_ADMIN: &str = "admin";

/// Staff role - department members that get reports load-balanced onto them
pub const ROLE_STAFF: &str = "staff";

/// Citizen role - can submit reports and track their progress
#[allow(dead_code)]
pub const ROLE_CITIZEN: &str = "citizen";

// =============================================================================
// REAL-TIME
// =============================================================================

/// Capacity of each broadcast channel in the real-time hub; slow consumers
/// that lag behind simply miss messages (at-most-once delivery)
pub const REALTIME_CHANNEL_CAPACITY: usize = 256;

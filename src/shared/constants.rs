/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Student role - owns a profile and submits it for review
pub const ROLE_STUDENT: &str = "student";

/// Admin role - staff reviewing student submissions
pub const ROLE_ADMIN: &str = "admin";

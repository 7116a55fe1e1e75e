//! Unique test identifiers, so suites sharing one process never collide.

use ulid::Ulid;

/// `{prefix}-{ulid}`.
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("match");
/// assert_ne!(a, unique_str("match"));
/// assert!(a.starts_with("match-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A match id that is unique and valid for the `[A-Za-z0-9_-]{1,64}` format.
pub fn unique_match_id() -> String {
    unique_str("m")
}

/// A role name for a throwaway team.
pub fn unique_role(team: &str) -> String {
    unique_str(&format!("role-{team}"))
}

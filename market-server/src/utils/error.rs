//! Shared handler helpers

/// Parse a path segment as an entity id
///
/// Ids are opaque integers; anything that does not parse behaves exactly
/// like an id that does not exist, so callers turn `None` into their own
/// structured 404.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

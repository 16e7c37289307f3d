/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a readable record id such as `mem_1f0c2b7e9a4d4c55b8e3d1a6f0e2c9b4`.
///
/// The suffix is a random v4 UUID in simple (hex) form, so ids created in
/// the same millisecond never collide in practice.
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Trim a text value, mapping blank input to `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

//! Serde helpers shared by request payloads

/// Distinguish an absent key from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>` field:
/// - key absent: `None` (leave the stored value alone)
/// - `null`: `Some(None)` (clear the stored value)
/// - value: `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        level: Option<Option<String>>,
    }

    #[test]
    fn test_absent_null_and_value() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.level, None);

        let null: Patch = serde_json::from_str(r#"{"level":null}"#).unwrap();
        assert_eq!(null.level, Some(None));

        let set: Patch = serde_json::from_str(r#"{"level":"GOLD"}"#).unwrap();
        assert_eq!(set.level, Some(Some("GOLD".to_string())));
    }
}

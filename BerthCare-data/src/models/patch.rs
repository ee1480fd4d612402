use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]` this distinguishes a missing field
/// (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn test_missing_null_and_value_are_distinct() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"phone": "555-0100"}"#).unwrap();

        assert_eq!(missing.phone, None);
        assert_eq!(cleared.phone, Some(None));
        assert_eq!(set.phone, Some(Some("555-0100".to_string())));
    }
}

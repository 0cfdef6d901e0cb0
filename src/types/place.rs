use std::{borrow::Borrow, fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalize an administrative name into its join-key form (trimmed, uppercase).
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalized administrative place name, used as the join key between the
/// aggregation index, the selection and the boundary layers.
/// Cheap to clone; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceName(Arc<str>);

impl PlaceName {
    /// Returns `None` when the name is empty after trimming.
    pub fn new(raw: &str) -> Option<PlaceName> {
        let normalized = normalize_name(raw);
        if normalized.is_empty() { None } else { Some(PlaceName(Arc::from(normalized))) }
    }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl Borrow<str> for PlaceName {
    fn borrow(&self) -> &str { &self.0 }
}

impl AsRef<str> for PlaceName {
    fn as_ref(&self) -> &str { &self.0 }
}

impl PartialEq<str> for PlaceName {
    fn eq(&self, other: &str) -> bool { &*self.0 == other }
}

impl PartialEq<&str> for PlaceName {
    fn eq(&self, other: &&str) -> bool { &*self.0 == *other }
}

impl fmt::Display for PlaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PlaceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PlaceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PlaceName::new(&raw).ok_or_else(|| serde::de::Error::custom("empty place name"))
    }
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;

    use super::PlaceName;

    #[test]
    fn normalizes_case_and_whitespace() {
        let name = PlaceName::new("  Lima  ").unwrap();
        assert_eq!(name, "LIMA");
        assert_ne!(name, "LIMA METROPOLITANA");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(PlaceName::new("").is_none());
        assert!(PlaceName::new("   ").is_none());
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = AHashMap::new();
        map.insert(PlaceName::new("cusco").unwrap(), 3);
        assert_eq!(map.get("CUSCO"), Some(&3));
    }

    #[test]
    fn deserialize_normalizes() {
        let name: PlaceName = serde_json::from_str("\" arequipa\"").unwrap();
        assert_eq!(name.as_str(), "AREQUIPA");
        assert!(serde_json::from_str::<PlaceName>("\"  \"").is_err());
    }
}

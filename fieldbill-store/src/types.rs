/// Identifier for a persisted delivery request
///
/// A globally unique ULID. ULIDs are lexicographically sortable by creation
/// time and collision-resistant, so listings come back in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId {
    id: ulid::Ulid,
}

impl RequestId {
    /// Create a request ID from an existing ULID
    #[must_use]
    pub const fn new(id: ulid::Ulid) -> Self {
        Self { id }
    }

    /// Generate a new unique request ID
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: ulid::Ulid::new(),
        }
    }

    /// Parse a request ID from its string form
    pub fn from_string(value: &str) -> Option<Self> {
        ulid::Ulid::from_string(value).ok().map(|id| Self { id })
    }

    /// Get the underlying ULID
    #[must_use]
    pub const fn ulid(&self) -> ulid::Ulid {
        self.id
    }

    /// Get the timestamp (milliseconds since Unix epoch) encoded in this ULID
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl serde::Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.id.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let id = ulid::Ulid::from_string(&s).map_err(serde::de::Error::custom)?;
        Ok(Self { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_parsing() {
        assert!(RequestId::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_some());
        assert!(RequestId::from_string("not a ulid").is_none());
        assert!(RequestId::from_string("").is_none());
    }

    #[test]
    fn test_request_id_round_trip() {
        let id = RequestId::generate();
        let parsed = RequestId::from_string(&id.to_string()).expect("parse own string form");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_request_id_carries_its_creation_time() {
        let before = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_millis() as u64;
        let id = RequestId::generate();
        assert!(id.timestamp_ms() >= before);
        assert_eq!(
            RequestId::new(id.ulid()).timestamp_ms(),
            id.timestamp_ms()
        );
    }
}

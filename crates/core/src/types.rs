/// Game identifiers are assigned by the embedding application and are opaque
/// here (the registry treats unseen ids as valid-but-empty).
pub type GameId = String;

/// User identifiers come from the auth provider and are opaque strings.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

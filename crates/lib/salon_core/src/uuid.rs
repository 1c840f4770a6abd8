// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// Every record id is generated app-side so that the in-memory store and the
// PostgreSQL store hand out ids with the same shape and ordering.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a path segment into a UUID, returning `None` for anything malformed.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

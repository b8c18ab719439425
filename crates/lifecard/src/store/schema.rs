//! `SQLite` schema definitions for lifecard.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the persons table.
pub const CREATE_PERSONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS persons (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    photo_url TEXT,
    emergency_contact_name TEXT NOT NULL,
    emergency_contact_phone TEXT NOT NULL,
    address_street TEXT NOT NULL,
    address_city TEXT NOT NULL,
    address_state TEXT NOT NULL,
    address_postal_code TEXT NOT NULL,
    address_country TEXT NOT NULL,
    medical_info TEXT,
    public_link_id TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on owner and creation time for the
/// directory listing (newest-created first, per owner).
pub const CREATE_OWNER_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_persons_owner_created
    ON persons(user_id, created_at DESC)
";

/// SQL statement to create an index on `public_link_id` for the anonymous
/// lookup path. The UNIQUE constraint already creates one; this keeps the
/// name stable for introspection.
pub const CREATE_PUBLIC_LINK_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_persons_public_link ON persons(public_link_id)
";

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_salt TEXT NOT NULL,
    password_digest TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the sessions table.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PERSONS_TABLE,
    CREATE_OWNER_CREATED_INDEX,
    CREATE_PUBLIC_LINK_INDEX,
    CREATE_USERS_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_persons_table_contains_required_columns() {
        assert!(CREATE_PERSONS_TABLE.contains("id TEXT PRIMARY KEY"));
        assert!(CREATE_PERSONS_TABLE.contains("user_id TEXT NOT NULL"));
        assert!(CREATE_PERSONS_TABLE.contains("name TEXT NOT NULL"));
        assert!(CREATE_PERSONS_TABLE.contains("public_link_id TEXT NOT NULL UNIQUE"));
        assert!(CREATE_PERSONS_TABLE.contains("created_at TEXT NOT NULL"));
        assert!(CREATE_PERSONS_TABLE.contains("updated_at TEXT NOT NULL"));
    }

    #[test]
    fn test_create_users_table_structure() {
        assert!(CREATE_USERS_TABLE.contains("email TEXT NOT NULL UNIQUE"));
        assert!(CREATE_USERS_TABLE.contains("password_digest TEXT NOT NULL"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}

//! Record store for lifecard.
//!
//! This module provides `SQLite`-based persistent storage for person
//! records: owner-scoped create/read/update/delete, offset-based
//! pagination with total counts, and the anonymous lookup by public link
//! identifier.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::link;
use crate::person::{self, Address, EmergencyContact, NewPerson, Person, PersonUpdate};

/// How many times `create` retries when a freshly generated public link
/// identifier collides with an existing one. With a 20-character
/// alphanumeric token this effectively never happens.
const LINK_ID_RETRIES: usize = 3;

/// One page of an owner's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The records on this page, newest-created first.
    pub items: Vec<T>,
    /// Total records for the owner across all pages.
    pub total_count: u64,
    /// The 1-based page number that was requested.
    pub page: usize,
    /// The page size that was requested.
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Number of pages needed to show `total_count` records.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        let total = usize::try_from(self.total_count).unwrap_or(usize::MAX);
        total.div_ceil(self.page_size)
    }
}

/// Storage engine for person records.
///
/// Owner scoping is enforced on every write and every authenticated read;
/// the public-identifier read path deliberately bypasses it.
#[derive(Debug)]
pub struct PersonStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl PersonStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new record for the given owner.
    ///
    /// Validates the payload, assigns a record identifier, a fresh public
    /// link identifier, and both timestamps, then returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if a required field is missing or
    /// malformed, or a database error if the insert fails.
    pub fn create(&self, owner_id: &str, new_person: &NewPerson) -> Result<Person> {
        person::validate_new(new_person)?;

        let now = Utc::now();
        let mut person = Person {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: new_person.name.clone(),
            photo_url: new_person.photo_url.clone(),
            emergency_contact: new_person.emergency_contact.clone(),
            address: new_person.address.clone(),
            medical_info: new_person.medical_info.clone(),
            public_link_id: link::generate(),
            created_at: now,
            updated_at: now,
        };

        let mut attempts = 0;
        loop {
            match self.insert_row(&person) {
                Ok(()) => break,
                Err(Error::DatabaseQuery(e)) if is_unique_violation(&e) => {
                    attempts += 1;
                    if attempts >= LINK_ID_RETRIES {
                        return Err(Error::internal(
                            "could not generate a unique public link identifier",
                        ));
                    }
                    warn!("Public link identifier collision, regenerating");
                    person.public_link_id = link::generate();
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Created record {} for owner {}", person.id, owner_id);
        Ok(person)
    }

    fn insert_row(&self, p: &Person) -> Result<()> {
        let medical_json = match &p.medical_info {
            Some(info) => Some(serde_json::to_string(info)?),
            None => None,
        };

        self.conn.execute(
            r"
            INSERT INTO persons (
                id, user_id, name, photo_url,
                emergency_contact_name, emergency_contact_phone,
                address_street, address_city, address_state,
                address_postal_code, address_country,
                medical_info, public_link_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ",
            params![
                p.id,
                p.user_id,
                p.name,
                p.photo_url,
                p.emergency_contact.name,
                p.emergency_contact.phone,
                p.address.street,
                p.address.city,
                p.address.state,
                p.address.postal_code,
                p.address.country,
                medical_json,
                p.public_link_id,
                p.created_at.to_rfc3339(),
                p.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get one page of an owner's records, newest-created first.
    ///
    /// Page numbers are 1-based; a page beyond the end returns an empty
    /// item list with the correct total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, owner_id: &str, page: usize, page_size: usize) -> Result<Page<Person>> {
        let page = page.max(1);
        let total_count = self.count(owner_id)?;

        // Saturate rather than overflow on absurd page numbers
        let offset_rows = (page - 1).checked_mul(page_size).unwrap_or(usize::MAX);
        let offset = i64::try_from(offset_rows).unwrap_or(i64::MAX);
        let limit = i64::try_from(page_size).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {COLUMNS} FROM persons WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3
            "
        ))?;

        let items = stmt
            .query_map(params![owner_id, limit, offset], Self::row_to_person)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total_count,
            page,
            page_size,
        })
    }

    /// Count all records belonging to an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, owner_id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM persons WHERE user_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Get a record by id, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: &str, owner_id: &str) -> Result<Option<Person>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM persons WHERE id = ?1 AND user_id = ?2"),
                params![id, owner_id],
                Self::row_to_person,
            )
            .optional()?;
        Ok(result)
    }

    /// Anonymous lookup by public link identifier.
    ///
    /// Never consults or checks an owner. Returns `None` for unknown
    /// identifiers, including those of deleted records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_by_public_id(&self, public_id: &str) -> Result<Option<Person>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM persons WHERE public_link_id = ?1"),
                [public_id],
                Self::row_to_person,
            )
            .optional()?;
        Ok(result)
    }

    /// Apply a partial update to the record matching both id and owner.
    ///
    /// Omitted fields keep their stored values; `updated_at` is refreshed.
    /// The record identifier, owner, public link identifier, and creation
    /// time never change.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the id/owner pair matches no row,
    /// `Error::Validation` if a provided field is malformed, or a database
    /// error if the update fails.
    pub fn update(&self, id: &str, owner_id: &str, update: &PersonUpdate) -> Result<Person> {
        person::validate_update(update)?;

        let current = self
            .get(id, owner_id)?
            .ok_or_else(|| Error::not_found(format!("record {id}")))?;

        let merged = Person {
            name: update.name.clone().unwrap_or(current.name),
            photo_url: update.photo_url.clone().or(current.photo_url),
            emergency_contact: update
                .emergency_contact
                .clone()
                .unwrap_or(current.emergency_contact),
            address: update.address.clone().unwrap_or(current.address),
            medical_info: update.medical_info.clone().or(current.medical_info),
            updated_at: Utc::now(),
            ..current
        };

        let medical_json = match &merged.medical_info {
            Some(info) => Some(serde_json::to_string(info)?),
            None => None,
        };

        let affected = self.conn.execute(
            r"
            UPDATE persons SET
                name = ?1, photo_url = ?2,
                emergency_contact_name = ?3, emergency_contact_phone = ?4,
                address_street = ?5, address_city = ?6, address_state = ?7,
                address_postal_code = ?8, address_country = ?9,
                medical_info = ?10, updated_at = ?11
            WHERE id = ?12 AND user_id = ?13
            ",
            params![
                merged.name,
                merged.photo_url,
                merged.emergency_contact.name,
                merged.emergency_contact.phone,
                merged.address.street,
                merged.address.city,
                merged.address.state,
                merged.address.postal_code,
                merged.address.country,
                medical_json,
                merged.updated_at.to_rfc3339(),
                id,
                owner_id,
            ],
        )?;

        if affected == 0 {
            return Err(Error::not_found(format!("record {id}")));
        }

        debug!("Updated record {} for owner {}", id, owner_id);
        Ok(merged)
    }

    /// Delete the record matching both id and owner.
    ///
    /// Idempotent: deleting a non-existent id is not an error. The
    /// record's public link identifier stops resolving immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: &str, owner_id: &str) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM persons WHERE id = ?1 AND user_id = ?2",
            params![id, owner_id],
        )?;

        if affected > 0 {
            info!("Deleted record {} for owner {}", id, owner_id);
        } else {
            debug!("Delete of absent record {} was a no-op", id);
        }
        Ok(())
    }

    /// Convert a database row to a Person struct.
    fn row_to_person(row: &rusqlite::Row) -> rusqlite::Result<Person> {
        let medical_json: Option<String> = row.get(11)?;
        let medical_info = medical_json.and_then(|json| match serde_json::from_str(&json) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Dropping unreadable medical_info column: {}", e);
                None
            }
        });

        let created_at: String = row.get(13)?;
        let updated_at: String = row.get(14)?;

        Ok(Person {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            photo_url: row.get(3)?,
            emergency_contact: EmergencyContact {
                name: row.get(4)?,
                phone: row.get(5)?,
            },
            address: Address {
                street: row.get(6)?,
                city: row.get(7)?,
                state: row.get(8)?,
                postal_code: row.get(9)?,
                country: row.get(10)?,
            },
            medical_info,
            public_link_id: row.get(12)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

/// Column list shared by every SELECT, in `row_to_person` order.
const COLUMNS: &str = "id, user_id, name, photo_url, \
     emergency_contact_name, emergency_contact_phone, \
     address_street, address_city, address_state, \
     address_postal_code, address_country, \
     medical_info, public_link_id, created_at, updated_at";

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}

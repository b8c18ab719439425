//! Authentication and session handling for lifecard.
//!
//! `AuthService` manages user accounts and session tokens in the same
//! `SQLite` database the record store uses. `SessionContext` is the
//! process-wide session state: it is initialized once at startup, exposes
//! the current user as an opaque owner identifier, and publishes session
//! changes on a watch channel so interested components can react to
//! sign-in and sign-out.
//!
//! Passwords are stored as salted blake3 digests. Session tokens are
//! random alphanumeric strings from the same generator the public link
//! identifiers use.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::link;
use crate::store::migrations;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque user identifier, used as the owner scoping key.
    pub id: String,
    /// Sign-in email address.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Account and session store.
#[derive(Debug)]
pub struct AuthService {
    conn: Connection,
}

impl AuthService {
    /// Open the auth service over the database at the given path.
    ///
    /// Creates the parent directories and database file if they don't
    /// exist, so the first command on a fresh install can sign up.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory auth service for testing.
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
        Ok(Self { conn })
    }

    /// Register a new account and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a malformed email, a too-short
    /// password, or an email that is already registered.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<(User, String)> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("email", "is not a valid email address"));
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        if self.find_user_by_email(&email)?.is_some() {
            return Err(Error::validation("email", "is already registered"));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            created_at: Utc::now(),
        };
        let salt = link::generate();
        let digest = password_digest(&salt, password);

        self.conn.execute(
            r"
            INSERT INTO users (id, email, password_salt, password_digest, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                user.id,
                user.email,
                salt,
                digest,
                user.created_at.to_rfc3339()
            ],
        )?;
        info!("Registered account for {}", user.email);

        let token = self.open_session(&user.id)?;
        Ok((user, token))
    }

    /// Verify credentials and open a new session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when the email is unknown or the
    /// password does not match.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(User, String)> {
        let email = email.trim().to_lowercase();
        let Some((user, salt, digest)) = self.find_credentials(&email)? else {
            return Err(Error::validation(
                "credentials",
                "unknown email or wrong password",
            ));
        };

        if password_digest(&salt, password) != digest {
            return Err(Error::validation(
                "credentials",
                "unknown email or wrong password",
            ));
        }

        let token = self.open_session(&user.id)?;
        debug!("Opened session for {}", user.email);
        Ok((user, token))
    }

    /// Close the session for a token. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn sign_out(&self, token: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(())
    }

    /// Resolve the user a session token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_user(&self, token: &str) -> Result<Option<User>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT u.id, u.email, u.created_at
                FROM sessions s JOIN users u ON u.id = s.user_id
                WHERE s.token = ?1
                ",
                [token],
                row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    fn open_session(&self, user_id: &str) -> Result<String> {
        let token = format!("{}{}", link::generate(), link::generate());
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, Utc::now().to_rfc3339()],
        )?;
        Ok(token)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, email, created_at FROM users WHERE email = ?1",
                [email],
                row_to_user,
            )
            .optional()?;
        Ok(result)
    }

    fn find_credentials(&self, email: &str) -> Result<Option<(User, String, String)>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, email, created_at, password_salt, password_digest
                FROM users WHERE email = ?1
                ",
                [email],
                |row| {
                    let user = row_to_user(row)?;
                    let salt: String = row.get(3)?;
                    let digest: String = row.get(4)?;
                    Ok((user, salt, digest))
                },
            )
            .optional()?;
        Ok(result)
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(2)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
    })
}

fn password_digest(salt: &str, password: &str) -> String {
    blake3::hash(format!("{salt}:{password}").as_bytes())
        .to_hex()
        .to_string()
}

/// Process-wide session state.
///
/// Holds the current session token, resolves the current user, and
/// publishes changes on a watch channel. Initialized once at startup;
/// `teardown` clears the published state on shutdown.
#[derive(Debug)]
pub struct SessionContext {
    auth: AuthService,
    tx: watch::Sender<Option<User>>,
    token: Option<String>,
}

impl SessionContext {
    /// Initialize the session context over an auth service.
    #[must_use]
    pub fn init(auth: AuthService) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            auth,
            tx,
            token: None,
        }
    }

    /// Resume a previously persisted session token.
    ///
    /// An unknown or expired token leaves the context signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn resume(&mut self, token: &str) -> Result<Option<User>> {
        let user = self.auth.current_user(token)?;
        if user.is_some() {
            self.token = Some(token.to_string());
        }
        self.tx.send_replace(user.clone());
        Ok(user)
    }

    /// Register a new account and sign in as it.
    ///
    /// # Errors
    ///
    /// See [`AuthService::sign_up`].
    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<User> {
        let (user, token) = self.auth.sign_up(email, password)?;
        self.token = Some(token);
        self.tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign in with existing credentials.
    ///
    /// # Errors
    ///
    /// See [`AuthService::sign_in`].
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<User> {
        let (user, token) = self.auth.sign_in(email, password)?;
        self.token = Some(token);
        self.tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign out the current session, if any. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn sign_out(&mut self) -> Result<()> {
        if let Some(token) = self.token.take() {
            self.auth.sign_out(&token)?;
        }
        self.tx.send_replace(None);
        Ok(())
    }

    /// The currently signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// The current user's id, or `Error::Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthenticated` when no session is active.
    pub fn require_owner(&self) -> Result<String> {
        self.current_user()
            .map(|u| u.id)
            .ok_or(Error::Unauthenticated)
    }

    /// The active session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Subscribe to session changes.
    ///
    /// The receiver's value tracks the current user across sign-in and
    /// sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }

    /// Clear the published session state on shutdown.
    ///
    /// Subscribers observe a sign-out; the session row itself is kept so
    /// a persisted token can be resumed on the next start.
    pub fn teardown(&mut self) {
        self.token = None;
        self.tx.send_replace(None);
    }
}

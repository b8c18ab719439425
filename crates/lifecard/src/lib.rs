//! `lifecard` - A directory of emergency profiles with shareable public links
//!
//! This library provides the core functionality for recording people's
//! identity, emergency-contact, address, and medical information, and for
//! sharing individual records through unguessable public link identifiers
//! and QR codes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod form;
pub mod link;
pub mod logging;
pub mod person;
pub mod photos;
pub mod public_view;
pub mod store;

pub use auth::{AuthService, SessionContext, User};
pub use config::Config;
pub use directory::Directory;
pub use error::{Error, Result};
pub use form::{FormState, PersonForm, Submission};
pub use logging::init_logging;
pub use person::{Address, EmergencyContact, MedicalInfo, NewPerson, Person, PersonUpdate};
pub use photos::PhotoStore;
pub use public_view::{PublicView, ViewState};
pub use store::{Page, PersonStore};

//! Record form for creating and editing person records.
//!
//! The form is a small state machine: `Idle` while displaying values,
//! `Submitting` while the store call is in flight, back to `Idle` on
//! success, or `Error` on failure (the form stays open so the user can
//! retry manually).
//!
//! A photo failure never blocks the save: the upload runs first, and any
//! upload error is downgraded to a warning carried on the successful
//! submission.

use tracing::{debug, warn};

use crate::error::Result;
use crate::person::{self, Address, EmergencyContact, MedicalInfo, NewPerson, Person, PersonUpdate};
use crate::photos::PhotoStore;
use crate::store::PersonStore;

/// The form's UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Displaying current values, ready for input.
    Idle,
    /// Validation passed, store call in flight.
    Submitting,
    /// The last submit failed; the form stays open showing the message.
    Error(String),
}

/// A photo file attached to the form, pending upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    /// Original file name, used to preserve the extension.
    pub file_name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// The result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The stored record.
    pub person: Person,
    /// Non-fatal photo upload warning, if the upload failed.
    pub photo_warning: Option<String>,
}

/// A create/edit form over one person record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonForm {
    /// Display name field.
    pub name: String,
    /// Emergency contact fields.
    pub emergency_contact: EmergencyContact,
    /// Address fields.
    pub address: Address,
    /// Medical block fields, if the section was filled in.
    pub medical_info: Option<MedicalInfo>,
    /// Photo selected for upload, if any.
    pub photo: Option<PhotoAttachment>,
    state: FormState,
    /// The record being edited, `None` when creating.
    editing: Option<Person>,
}

impl PersonForm {
    /// Create an empty form for a new record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            emergency_contact: EmergencyContact::default(),
            address: Address::default(),
            medical_info: None,
            photo: None,
            state: FormState::Idle,
            editing: None,
        }
    }

    /// Create a form pre-filled from an existing record.
    #[must_use]
    pub fn edit(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            emergency_contact: person.emergency_contact.clone(),
            address: person.address.clone(),
            medical_info: person.medical_info.clone(),
            photo: None,
            state: FormState::Idle,
            editing: Some(person.clone()),
        }
    }

    /// The form's current state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Whether the form edits an existing record.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Run local validation without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        person::validate_new(&self.payload(None))
    }

    /// Submit the form: validate, upload the photo if one is attached,
    /// then create or update the record.
    ///
    /// Validation failures leave the form `Idle` and never reach the
    /// store. A photo upload failure is downgraded to a warning on the
    /// returned [`Submission`]; only a store failure moves the form to
    /// `Error` and keeps it open.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for invalid fields, or the store error
    /// if the create/update fails.
    pub fn submit(
        &mut self,
        store: &PersonStore,
        photos: &PhotoStore,
        owner_id: &str,
    ) -> Result<Submission> {
        // Validation is local; a failure keeps the form Idle.
        if let Err(e) = self.validate() {
            debug!("Form validation failed: {}", e);
            return Err(e);
        }

        self.state = FormState::Submitting;

        let mut photo_warning = None;
        let mut uploaded_url = None;
        if let Some(photo) = &self.photo {
            match photos.upload(owner_id, &photo.file_name, &photo.bytes) {
                Ok(url) => uploaded_url = Some(url),
                Err(e) => {
                    // Recoverable by contract: save proceeds without a photo.
                    warn!("Photo upload failed, saving without photo: {}", e);
                    photo_warning = Some(e.to_string());
                }
            }
        }

        let result = match &self.editing {
            Some(current) => {
                let update = PersonUpdate {
                    name: Some(self.name.clone()),
                    photo_url: uploaded_url,
                    emergency_contact: Some(self.emergency_contact.clone()),
                    address: Some(self.address.clone()),
                    medical_info: self.medical_info.clone(),
                };
                store.update(&current.id, owner_id, &update)
            }
            None => store.create(owner_id, &self.payload(uploaded_url)),
        };

        match result {
            Ok(person) => {
                self.state = FormState::Idle;
                self.photo = None;
                Ok(Submission {
                    person,
                    photo_warning,
                })
            }
            Err(e) => {
                self.state = FormState::Error(e.to_string());
                Err(e)
            }
        }
    }

    fn payload(&self, photo_url: Option<String>) -> NewPerson {
        NewPerson {
            name: self.name.clone(),
            photo_url,
            emergency_contact: self.emergency_contact.clone(),
            address: self.address.clone(),
            medical_info: self.medical_info.clone(),
        }
    }
}

impl Default for PersonForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filled_form(name: &str) -> PersonForm {
        let mut form = PersonForm::new();
        form.name = name.to_string();
        form.emergency_contact = EmergencyContact {
            name: "Bob".to_string(),
            phone: "+1 555-0100".to_string(),
        };
        form.address = Address {
            street: "12 Elm St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "USA".to_string(),
        };
        form
    }

    fn test_store() -> PersonStore {
        PersonStore::open_in_memory().expect("failed to create test store")
    }

    fn missing_photos() -> PhotoStore {
        PhotoStore::new(
            PathBuf::from("/nonexistent/lifecard-bucket"),
            "https://photos.example",
        )
    }

    fn working_photos(tag: &str) -> (PhotoStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("lifecard_form_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        (PhotoStore::new(&dir, "https://photos.example"), dir)
    }

    #[test]
    fn test_new_form_is_idle() {
        let form = PersonForm::new();
        assert_eq!(*form.state(), FormState::Idle);
        assert!(!form.is_editing());
    }

    #[test]
    fn test_edit_form_prefills() {
        let store = test_store();
        let created = store
            .create("owner-1", &filled_form("Alice").payload(None))
            .unwrap();

        let form = PersonForm::edit(&created);
        assert!(form.is_editing());
        assert_eq!(form.name, "Alice");
        assert_eq!(form.address.city, "Springfield");
    }

    #[test]
    fn test_submit_creates_record() {
        let store = test_store();
        let mut form = filled_form("Alice");

        let submission = form.submit(&store, &missing_photos(), "owner-1").unwrap();
        assert_eq!(submission.person.name, "Alice");
        assert!(submission.photo_warning.is_none());
        assert_eq!(*form.state(), FormState::Idle);
        assert_eq!(store.count("owner-1").unwrap(), 1);
    }

    #[test]
    fn test_validation_failure_stays_idle_and_skips_store() {
        let store = test_store();
        let mut form = filled_form("");

        let err = form.submit(&store, &missing_photos(), "owner-1").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(*form.state(), FormState::Idle);
        assert_eq!(store.count("owner-1").unwrap(), 0);
    }

    #[test]
    fn test_photo_failure_does_not_block_save() {
        let store = test_store();
        let mut form = filled_form("Alice");
        form.photo = Some(PhotoAttachment {
            file_name: "me.jpg".to_string(),
            bytes: b"jpegbytes".to_vec(),
        });

        // Bucket is missing: upload fails, save proceeds
        let submission = form.submit(&store, &missing_photos(), "owner-1").unwrap();
        assert!(submission.photo_warning.is_some());
        assert!(submission.person.photo_url.is_none());
        assert_eq!(store.count("owner-1").unwrap(), 1);
    }

    #[test]
    fn test_photo_upload_attaches_url() {
        let store = test_store();
        let (photos, dir) = working_photos("attach");
        let mut form = filled_form("Alice");
        form.photo = Some(PhotoAttachment {
            file_name: "me.jpg".to_string(),
            bytes: b"jpegbytes".to_vec(),
        });

        let submission = form.submit(&store, &photos, "owner-1").unwrap();
        assert!(submission.photo_warning.is_none());
        let url = submission.person.photo_url.unwrap();
        assert!(url.starts_with("https://photos.example/owner-1/"));
        // Attachment is consumed by a successful submit
        assert!(form.photo.is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_submit_updates_existing_record() {
        let store = test_store();
        let created = store
            .create("owner-1", &filled_form("Alice").payload(None))
            .unwrap();

        let mut form = PersonForm::edit(&created);
        form.name = "Alice B.".to_string();
        let submission = form.submit(&store, &missing_photos(), "owner-1").unwrap();

        assert_eq!(submission.person.name, "Alice B.");
        assert_eq!(submission.person.id, created.id);
        assert_eq!(submission.person.public_link_id, created.public_link_id);
        assert_eq!(store.count("owner-1").unwrap(), 1);
    }

    #[test]
    fn test_edit_photo_failure_keeps_previous_photo() {
        let store = test_store();
        let mut payload = filled_form("Alice").payload(None);
        payload.photo_url = Some("https://photos.example/owner-1/old.jpg".to_string());
        let created = store.create("owner-1", &payload).unwrap();

        let mut form = PersonForm::edit(&created);
        form.photo = Some(PhotoAttachment {
            file_name: "new.jpg".to_string(),
            bytes: b"newbytes".to_vec(),
        });

        let submission = form.submit(&store, &missing_photos(), "owner-1").unwrap();
        assert!(submission.photo_warning.is_some());
        assert_eq!(
            submission.person.photo_url.as_deref(),
            Some("https://photos.example/owner-1/old.jpg")
        );
    }

    #[test]
    fn test_store_failure_moves_to_error_state() {
        let store = test_store();
        let created = store
            .create("owner-1", &filled_form("Alice").payload(None))
            .unwrap();
        store.delete(&created.id, "owner-1").unwrap();

        // Editing a record that no longer exists fails at the store
        let mut form = PersonForm::edit(&created);
        let err = form.submit(&store, &missing_photos(), "owner-1").unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(form.state(), FormState::Error(_)));
    }

    #[test]
    fn test_error_state_allows_manual_retry() {
        let store = test_store();
        let created = store
            .create("owner-1", &filled_form("Alice").payload(None))
            .unwrap();
        store.delete(&created.id, "owner-1").unwrap();

        let mut form = PersonForm::edit(&created);
        assert!(form.submit(&store, &missing_photos(), "owner-1").is_err());

        // Re-create the row, then retry the same form
        let restored = store
            .create("owner-1", &filled_form("Alice").payload(None))
            .unwrap();
        form.editing = Some(restored);
        assert!(form.submit(&store, &missing_photos(), "owner-1").is_ok());
        assert_eq!(*form.state(), FormState::Idle);
    }

    #[test]
    fn test_validate_reports_phone_error() {
        let mut form = filled_form("Alice");
        form.emergency_contact.phone = "not a phone".to_string();

        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn test_medical_info_carried_through_submit() {
        let store = test_store();
        let mut form = filled_form("Alice");
        form.medical_info = Some(MedicalInfo {
            blood_type: Some("O-".to_string()),
            ..MedicalInfo::default()
        });

        let submission = form.submit(&store, &missing_photos(), "owner-1").unwrap();
        assert_eq!(
            submission
                .person
                .medical_info
                .as_ref()
                .and_then(|m| m.blood_type.as_deref()),
            Some("O-")
        );
    }
}

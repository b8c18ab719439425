//! Core record types for lifecard.
//!
//! This module defines the fundamental data structures for representing
//! a person record: identity, emergency contact, address, and the optional
//! medical block. Validation rules shared by the form and the store
//! boundary also live here.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Permissive phone pattern: digits, spaces, parentheses, hyphens, and an
/// optional leading `+`.
const PHONE_PATTERN: &str = r"^\+?[\d\s\-()]+$";

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).unwrap_or_else(|_| unreachable!()))
}

/// A person's emergency contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Contact person's name.
    pub name: String,
    /// Contact person's phone number.
    pub phone: String,
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number.
    pub street: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

/// A single medication entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    /// Medication name.
    pub name: String,
    /// Dosage, free text (e.g. "20mg").
    pub dosage: String,
    /// How often the medication is taken.
    pub frequency: String,
    /// Prescribing doctor, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescribing_doctor: Option<String>,
    /// Additional notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A healthcare provider reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcareProvider {
    /// Provider or practice name.
    pub name: String,
    /// Provider phone number.
    pub phone: String,
    /// Provider address, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Medical specialty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

/// Insurance details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    /// Insurance provider name.
    pub provider: String,
    /// Policy number.
    pub policy_number: String,
    /// Group number, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    /// Insurer contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// The optional medical block attached to a record.
///
/// Every subfield is optional; the block as a whole is only rendered on the
/// public view when something in it is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalInfo {
    /// Blood type (e.g. "O+").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    /// Known allergies.
    pub allergies: Vec<String>,
    /// Ongoing medical conditions.
    pub medical_conditions: Vec<String>,
    /// Current medications.
    pub medications: Vec<Medication>,
    /// Free-text information for emergency responders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_medical_info: Option<String>,
    /// Primary healthcare provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcare_provider: Option<HealthcareProvider>,
    /// Insurance details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_info: Option<InsuranceInfo>,
    /// General medical notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_notes: Option<String>,
    /// Date of birth, free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Height, free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    /// Weight, free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Registered organ donor flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organ_donor: Option<bool>,
}

impl MedicalInfo {
    /// Check whether nothing in the block is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blood_type.is_none()
            && self.allergies.is_empty()
            && self.medical_conditions.is_empty()
            && self.medications.is_empty()
            && self.emergency_medical_info.is_none()
            && self.healthcare_provider.is_none()
            && self.insurance_info.is_none()
            && self.medical_notes.is_none()
            && self.date_of_birth.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.organ_donor.is_none()
    }
}

/// A stored person record.
///
/// `id`, `user_id`, `public_link_id`, and both timestamps are assigned by
/// the store and never change after creation (`updated_at` excepted, which
/// the store refreshes on every update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique record identifier (UUID, assigned by the store).
    pub id: String,
    /// Owning user identifier. Never exposed on the public read path.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Public URL of the profile photo, if one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Emergency contact.
    pub emergency_contact: EmergencyContact,
    /// Postal address.
    pub address: Address,
    /// Optional medical block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_info: Option<MedicalInfo>,
    /// Unguessable public share identifier. Immutable once set.
    pub public_link_id: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    /// Display name (required, non-empty).
    pub name: String,
    /// Public photo URL, if a photo was already uploaded.
    pub photo_url: Option<String>,
    /// Emergency contact (name and phone required).
    pub emergency_contact: EmergencyContact,
    /// Postal address (all five fields required).
    pub address: Address,
    /// Optional medical block.
    pub medical_info: Option<MedicalInfo>,
}

/// Partial payload for updating a record.
///
/// `None` fields are left unchanged, never nulled. The photo URL is only
/// replaced when a new photo was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New photo URL.
    pub photo_url: Option<String>,
    /// New emergency contact.
    pub emergency_contact: Option<EmergencyContact>,
    /// New address.
    pub address: Option<Address>,
    /// New medical block.
    pub medical_info: Option<MedicalInfo>,
}

impl PersonUpdate {
    /// Check whether the update carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.photo_url.is_none()
            && self.emergency_contact.is_none()
            && self.address.is_none()
            && self.medical_info.is_none()
    }
}

/// Check a phone number against the permissive pattern.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.trim().is_empty() && phone_regex().is_match(phone)
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

fn check_contact(contact: &EmergencyContact) -> Result<()> {
    require("emergency_contact_name", &contact.name)?;
    require("emergency_contact_phone", &contact.phone)?;
    if !is_valid_phone(&contact.phone) {
        return Err(Error::validation(
            "emergency_contact_phone",
            "is not a valid phone number",
        ));
    }
    Ok(())
}

fn check_address(address: &Address) -> Result<()> {
    require("address_street", &address.street)?;
    require("address_city", &address.city)?;
    require("address_state", &address.state)?;
    require("address_postal_code", &address.postal_code)?;
    require("address_country", &address.country)?;
    Ok(())
}

/// Validate a create payload.
///
/// The same rules run in the form (before any store call) and at the store
/// boundary, so a misbehaving caller cannot insert an incomplete record.
///
/// # Errors
///
/// Returns `Error::Validation` naming the first offending field.
pub fn validate_new(person: &NewPerson) -> Result<()> {
    require("name", &person.name)?;
    check_contact(&person.emergency_contact)?;
    check_address(&person.address)?;
    Ok(())
}

/// Validate the provided subset of an update payload.
///
/// Only fields present in the update are checked; omitted fields keep their
/// stored values and need no re-validation.
///
/// # Errors
///
/// Returns `Error::Validation` naming the first offending field.
pub fn validate_update(update: &PersonUpdate) -> Result<()> {
    if let Some(name) = &update.name {
        require("name", name)?;
    }
    if let Some(contact) = &update.emergency_contact {
        check_contact(contact)?;
    }
    if let Some(address) = &update.address {
        check_address(address)?;
    }
    Ok(())
}

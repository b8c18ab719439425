//! Public, unauthenticated view of one record.
//!
//! Resolves a candidate public link identifier to a record without any
//! owner check, renders a read-only representation (medical sections only
//! when data is present), and produces a QR code for the share URL.

use std::fmt::Write as _;
use std::path::Path;

use qrcode::render::svg;
use qrcode::QrCode;
use tracing::debug;

use crate::error::{Error, Result};
use crate::link;
use crate::person::Person;
use crate::store::PersonStore;

/// Rendered size of the QR code in pixels.
const QR_SIZE: u32 = 180;

/// The resolution state of a public view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Lookup in flight.
    Loading,
    /// The identifier is malformed, unknown, or belonged to a deleted
    /// record.
    NotFound,
    /// The record was found and may be rendered in full.
    Found(Person),
}

/// Read-only public view of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicView {
    state: ViewState,
}

impl PublicView {
    /// A view that has not resolved yet.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            state: ViewState::Loading,
        }
    }

    /// Resolve a candidate identifier against the store.
    ///
    /// Malformed identifiers are rejected without touching the store;
    /// unknown and deleted identifiers both come back `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn resolve(store: &PersonStore, raw_id: &str) -> Result<Self> {
        let candidate = raw_id.trim();
        if !link::looks_valid(candidate) {
            debug!("Rejected malformed public identifier");
            return Ok(Self {
                state: ViewState::NotFound,
            });
        }

        let state = match store.get_by_public_id(candidate)? {
            Some(person) => ViewState::Found(person),
            None => ViewState::NotFound,
        };
        Ok(Self { state })
    }

    /// The view's current state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The resolved record, if found.
    #[must_use]
    pub fn person(&self) -> Option<&Person> {
        match &self.state {
            ViewState::Found(person) => Some(person),
            _ => None,
        }
    }

    /// Render the record as text, with medical sections included only
    /// when the corresponding data is present.
    ///
    /// Returns `None` unless the view is in the `Found` state.
    #[must_use]
    pub fn render_text(&self) -> Option<String> {
        let person = self.person()?;
        let mut out = String::new();

        let _ = writeln!(out, "{}", person.name);
        if let Some(url) = &person.photo_url {
            let _ = writeln!(out, "Photo: {url}");
        }
        let _ = writeln!(
            out,
            "Emergency contact: {} ({})",
            person.emergency_contact.name, person.emergency_contact.phone
        );
        let _ = writeln!(
            out,
            "Address: {}, {}, {} {}, {}",
            person.address.street,
            person.address.city,
            person.address.state,
            person.address.postal_code,
            person.address.country
        );

        if let Some(medical) = person.medical_info.as_ref().filter(|m| !m.is_empty()) {
            let _ = writeln!(out, "\nMedical information");
            if let Some(blood) = &medical.blood_type {
                let _ = writeln!(out, "  Blood type: {blood}");
            }
            if !medical.allergies.is_empty() {
                let _ = writeln!(out, "  Allergies: {}", medical.allergies.join(", "));
            }
            if !medical.medical_conditions.is_empty() {
                let _ = writeln!(
                    out,
                    "  Conditions: {}",
                    medical.medical_conditions.join(", ")
                );
            }
            for med in &medical.medications {
                let _ = write!(out, "  Medication: {} {} {}", med.name, med.dosage, med.frequency);
                if let Some(doctor) = &med.prescribing_doctor {
                    let _ = write!(out, " (prescribed by {doctor})");
                }
                let _ = writeln!(out);
            }
            if let Some(info) = &medical.emergency_medical_info {
                let _ = writeln!(out, "  Emergency info: {info}");
            }
            if let Some(provider) = &medical.healthcare_provider {
                let _ = write!(out, "  Provider: {} ({})", provider.name, provider.phone);
                if let Some(specialty) = &provider.specialty {
                    let _ = write!(out, ", {specialty}");
                }
                if let Some(address) = &provider.address {
                    let _ = write!(out, ", {address}");
                }
                let _ = writeln!(out);
            }
            if let Some(insurance) = &medical.insurance_info {
                let _ = write!(
                    out,
                    "  Insurance: {} policy {}",
                    insurance.provider, insurance.policy_number
                );
                if let Some(group) = &insurance.group_number {
                    let _ = write!(out, " group {group}");
                }
                if let Some(phone) = &insurance.contact_phone {
                    let _ = write!(out, " ({phone})");
                }
                let _ = writeln!(out);
            }
            if let Some(notes) = &medical.medical_notes {
                let _ = writeln!(out, "  Notes: {notes}");
            }
            if let Some(dob) = &medical.date_of_birth {
                let _ = writeln!(out, "  Date of birth: {dob}");
            }
            if let Some(height) = &medical.height {
                let _ = writeln!(out, "  Height: {height}");
            }
            if let Some(weight) = &medical.weight {
                let _ = writeln!(out, "  Weight: {weight}");
            }
            if let Some(donor) = medical.organ_donor {
                let _ = writeln!(out, "  Organ donor: {}", if donor { "yes" } else { "no" });
            }
        }

        Some(out)
    }
}

/// Render a share URL as an SVG QR code.
///
/// # Errors
///
/// Returns an error if the URL does not fit in a QR code.
pub fn qr_svg(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| Error::internal(format!("QR encoding failed: {e}")))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build())
}

/// Write the QR code for a share URL to a file (the download action).
///
/// # Errors
///
/// Returns an error if QR encoding or the file write fails.
pub fn save_qr(url: &str, path: impl AsRef<Path>) -> Result<()> {
    let svg = qr_svg(url)?;
    std::fs::write(path.as_ref(), svg)?;
    debug!("Wrote QR code to {}", path.as_ref().display());
    Ok(())
}

//! `lifecard` - CLI for the emergency-profile directory
//!
//! This binary provides the command-line interface for managing records,
//! accounts, and share links.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context as _;
use clap::Parser;

use lifecard::cli::{
    AccountCommand, AddCommand, Cli, Command, ConfigCommand, DeleteCommand, EditCommand,
    ListCommand, RecordFields, ShareCommand, ShowCommand,
};
use lifecard::form::PhotoAttachment;
use lifecard::person::{MedicalInfo, Medication};
use lifecard::{
    init_logging, link, public_view, AuthService, Config, Directory, Error, PersonForm,
    PersonStore, PhotoStore, PublicView, SessionContext, ViewState,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Account(account_cmd) => handle_account(&config, &account_cmd),
        Command::List(list_cmd) => handle_list(&config, &list_cmd),
        Command::Add(add_cmd) => handle_add(&config, &add_cmd),
        Command::Edit(edit_cmd) => handle_edit(&config, &edit_cmd),
        Command::Delete(delete_cmd) => handle_delete(&config, &delete_cmd),
        Command::Show(show_cmd) => handle_show(&config, &show_cmd),
        Command::Share(share_cmd) => handle_share(&config, &share_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the session context, resuming a persisted session token if one
/// exists.
fn open_session(config: &Config) -> anyhow::Result<SessionContext> {
    let auth = AuthService::open(config.database_path())?;
    let mut ctx = SessionContext::init(auth);

    let session_file = config.session_file_path();
    if let Ok(token) = std::fs::read_to_string(&session_file) {
        ctx.resume(token.trim())?;
    }
    Ok(ctx)
}

fn persist_session(config: &Config, ctx: &SessionContext) -> anyhow::Result<()> {
    let session_file = config.session_file_path();
    if let Some(parent) = session_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    match ctx.token() {
        Some(token) => std::fs::write(&session_file, token)?,
        None => {
            if session_file.exists() {
                std::fs::remove_file(&session_file)?;
            }
        }
    }
    Ok(())
}

fn handle_account(config: &Config, cmd: &AccountCommand) -> anyhow::Result<()> {
    let mut ctx = open_session(config)?;

    match cmd {
        AccountCommand::SignUp { email, password } => {
            let user = ctx.sign_up(email, password)?;
            persist_session(config, &ctx)?;
            println!("Account created. Signed in as {}.", user.email);
        }
        AccountCommand::SignIn { email, password } => {
            let user = ctx.sign_in(email, password)?;
            persist_session(config, &ctx)?;
            println!("Signed in as {}.", user.email);
        }
        AccountCommand::SignOut => {
            ctx.sign_out()?;
            persist_session(config, &ctx)?;
            println!("Signed out.");
        }
        AccountCommand::Whoami => match ctx.current_user() {
            Some(user) => println!("{}", user.email),
            None => println!("Not signed in."),
        },
    }
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let ctx = open_session(config)?;
    let owner = ctx.require_owner()?;
    let store = PersonStore::open(config.database_path())?;

    let mut directory = Directory::new(config.directory.page_size);
    directory.load(&store, &owner, cmd.page)?;
    if let Some(term) = &cmd.search {
        directory.set_search(term);
    }

    let visible = directory.visible();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        if directory.search().is_some() {
            println!("No records match your search on this page.");
        } else {
            println!("No records yet. Create one with `lifecard add`.");
        }
        return Ok(());
    }

    for person in &visible {
        println!(
            "{}  {} | {} ({}) | {}",
            person.id,
            person.name,
            person.emergency_contact.name,
            person.emergency_contact.phone,
            person.address.city,
        );
    }
    println!();
    if directory.can_paginate() {
        println!(
            "Page {} of {} ({} records)",
            directory.current_page(),
            directory.total_pages().max(1),
            directory.total_count()
        );
    } else {
        println!("Search active: showing matches on the loaded page only.");
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let ctx = open_session(config)?;
    let owner = ctx.require_owner()?;
    let store = PersonStore::open(config.database_path())?;
    let photos = PhotoStore::new(config.bucket_dir(), &config.photos.public_base_url);

    let mut form = PersonForm::new();
    apply_fields(&mut form, &cmd.fields)?;

    let submission = form.submit(&store, &photos, &owner)?;
    if let Some(warning) = &submission.photo_warning {
        eprintln!("Warning: {warning}");
    }
    println!("Created record {}.", submission.person.id);
    println!(
        "Share link: {}",
        link::share_url(&config.share.base_url, &submission.person.public_link_id)
    );
    Ok(())
}

fn handle_edit(config: &Config, cmd: &EditCommand) -> anyhow::Result<()> {
    let ctx = open_session(config)?;
    let owner = ctx.require_owner()?;
    let store = PersonStore::open(config.database_path())?;
    let photos = PhotoStore::new(config.bucket_dir(), &config.photos.public_base_url);

    let person = store
        .get(&cmd.id, &owner)?
        .ok_or_else(|| Error::not_found(format!("record {}", cmd.id)))?;

    let mut form = PersonForm::edit(&person);
    apply_fields(&mut form, &cmd.fields)?;

    let submission = form.submit(&store, &photos, &owner)?;
    if let Some(warning) = &submission.photo_warning {
        eprintln!("Warning: {warning}");
    }
    println!("Updated record {}.", submission.person.id);
    Ok(())
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will permanently delete the record and invalidate its share link.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let ctx = open_session(config)?;
    let owner = ctx.require_owner()?;
    let store = PersonStore::open(config.database_path())?;

    store.delete(&cmd.id, &owner)?;
    println!("Deleted record {}.", cmd.id);
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    // The public read path requires no session
    let store = PersonStore::open(config.database_path())?;
    let view = PublicView::resolve(&store, &cmd.public_id)?;

    match view.state() {
        ViewState::Found(person) => {
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(person)?);
            } else if let Some(text) = view.render_text() {
                print!("{text}");
            }
        }
        _ => println!("No record found for that link."),
    }
    Ok(())
}

fn handle_share(config: &Config, cmd: &ShareCommand) -> anyhow::Result<()> {
    let ctx = open_session(config)?;
    let owner = ctx.require_owner()?;
    let store = PersonStore::open(config.database_path())?;

    let person = store
        .get(&cmd.id, &owner)?
        .ok_or_else(|| Error::not_found(format!("record {}", cmd.id)))?;

    let url = link::share_url(&config.share.base_url, &person.public_link_id);
    println!("{url}");

    if let Some(path) = &cmd.qr_out {
        public_view::save_qr(&url, path)?;
        println!("QR code written to {}.", path.display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!(
                    "  Session file:     {}",
                    config.session_file_path().display()
                );
                println!();
                println!("[Photos]");
                println!("  Bucket dir:       {}", config.bucket_dir().display());
                println!("  Public base URL:  {}", config.photos.public_base_url);
                println!();
                println!("[Share]");
                println!("  Base URL:         {}", config.share.base_url);
                println!();
                println!("[Directory]");
                println!("  Page size:        {}", config.directory.page_size);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Apply CLI field flags onto a form. Omitted flags leave the form's
/// current values untouched, which is what makes `edit` partial.
fn apply_fields(form: &mut PersonForm, fields: &RecordFields) -> anyhow::Result<()> {
    if let Some(name) = &fields.name {
        form.name.clone_from(name);
    }
    if let Some(contact_name) = &fields.contact_name {
        form.emergency_contact.name.clone_from(contact_name);
    }
    if let Some(contact_phone) = &fields.contact_phone {
        form.emergency_contact.phone.clone_from(contact_phone);
    }
    if let Some(street) = &fields.street {
        form.address.street.clone_from(street);
    }
    if let Some(city) = &fields.city {
        form.address.city.clone_from(city);
    }
    if let Some(state) = &fields.state {
        form.address.state.clone_from(state);
    }
    if let Some(postal_code) = &fields.postal_code {
        form.address.postal_code.clone_from(postal_code);
    }
    if let Some(country) = &fields.country {
        form.address.country.clone_from(country);
    }

    form.medical_info = merge_medical(form.medical_info.take(), fields);

    if let Some(photo_path) = &fields.photo {
        let bytes = std::fs::read(photo_path)
            .with_context(|| format!("reading photo {}", photo_path.display()))?;
        form.photo = Some(PhotoAttachment {
            file_name: file_name_of(photo_path),
            bytes,
        });
    }
    Ok(())
}

/// Merge CLI medical flags over an existing block. Flags that weren't
/// passed leave the stored values alone; repeatable list flags replace
/// their list when given at least once.
fn merge_medical(existing: Option<MedicalInfo>, fields: &RecordFields) -> Option<MedicalInfo> {
    let mut info = existing.unwrap_or_default();

    if let Some(blood) = &fields.blood_type {
        info.blood_type = Some(blood.clone());
    }
    if !fields.allergies.is_empty() {
        info.allergies.clone_from(&fields.allergies);
    }
    if !fields.conditions.is_empty() {
        info.medical_conditions.clone_from(&fields.conditions);
    }
    if !fields.medications.is_empty() {
        info.medications = fields
            .medications
            .iter()
            .map(|spec| parse_medication(spec))
            .collect();
    }
    if let Some(text) = &fields.emergency_info {
        info.emergency_medical_info = Some(text.clone());
    }
    if let Some(notes) = &fields.medical_notes {
        info.medical_notes = Some(notes.clone());
    }
    if let Some(dob) = &fields.date_of_birth {
        info.date_of_birth = Some(dob.clone());
    }
    if let Some(height) = &fields.height {
        info.height = Some(height.clone());
    }
    if let Some(weight) = &fields.weight {
        info.weight = Some(weight.clone());
    }
    if fields.organ_donor {
        info.organ_donor = Some(true);
    }

    if fields.provider_name.is_some()
        || fields.provider_phone.is_some()
        || fields.provider_address.is_some()
        || fields.provider_specialty.is_some()
    {
        let mut provider = info.healthcare_provider.take().unwrap_or_default();
        if let Some(name) = &fields.provider_name {
            provider.name = name.clone();
        }
        if let Some(phone) = &fields.provider_phone {
            provider.phone = phone.clone();
        }
        if let Some(address) = &fields.provider_address {
            provider.address = Some(address.clone());
        }
        if let Some(specialty) = &fields.provider_specialty {
            provider.specialty = Some(specialty.clone());
        }
        info.healthcare_provider = Some(provider);
    }

    if fields.insurance_provider.is_some()
        || fields.insurance_policy.is_some()
        || fields.insurance_group.is_some()
        || fields.insurance_phone.is_some()
    {
        let mut insurance = info.insurance_info.take().unwrap_or_default();
        if let Some(provider) = &fields.insurance_provider {
            insurance.provider = provider.clone();
        }
        if let Some(policy) = &fields.insurance_policy {
            insurance.policy_number = policy.clone();
        }
        if let Some(group) = &fields.insurance_group {
            insurance.group_number = Some(group.clone());
        }
        if let Some(phone) = &fields.insurance_phone {
            insurance.contact_phone = Some(phone.clone());
        }
        info.insurance_info = Some(insurance);
    }

    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

/// Parse a `NAME:DOSAGE:FREQUENCY[:DOCTOR]` medication flag value.
fn parse_medication(spec: &str) -> Medication {
    let mut parts = spec.splitn(4, ':');
    Medication {
        name: parts.next().unwrap_or_default().trim().to_string(),
        dosage: parts.next().unwrap_or_default().trim().to_string(),
        frequency: parts.next().unwrap_or_default().trim().to_string(),
        prescribing_doctor: parts.next().map(|s| s.trim().to_string()),
        notes: None,
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "photo".to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifecard::person::{EmergencyContact, Person};

    fn fields_from(args: &[&str]) -> RecordFields {
        let mut full = vec!["lifecard", "edit", "record-id"];
        full.extend_from_slice(args);
        let cli = Cli::try_parse_from(full).unwrap();
        let Command::Edit(cmd) = cli.command else {
            panic!("expected edit command");
        };
        cmd.fields
    }

    #[test]
    fn test_merge_medical_no_flags_keeps_block() {
        let existing = Some(MedicalInfo {
            blood_type: Some("O+".to_string()),
            allergies: vec!["penicillin".to_string()],
            ..MedicalInfo::default()
        });

        let merged = merge_medical(existing.clone(), &fields_from(&[]));
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_merge_medical_no_flags_no_block() {
        assert!(merge_medical(None, &fields_from(&[])).is_none());
    }

    #[test]
    fn test_merge_medical_preserves_unrelated_fields() {
        let existing = Some(MedicalInfo {
            blood_type: Some("O+".to_string()),
            allergies: vec!["penicillin".to_string()],
            ..MedicalInfo::default()
        });

        let merged = merge_medical(existing, &fields_from(&["--condition", "asthma"])).unwrap();
        // The new condition lands without clobbering the rest of the block
        assert_eq!(merged.medical_conditions, vec!["asthma"]);
        assert_eq!(merged.blood_type.as_deref(), Some("O+"));
        assert_eq!(merged.allergies, vec!["penicillin"]);
    }

    #[test]
    fn test_merge_medical_replaces_given_list() {
        let existing = Some(MedicalInfo {
            allergies: vec!["penicillin".to_string()],
            ..MedicalInfo::default()
        });

        let merged = merge_medical(
            existing,
            &fields_from(&["--allergy", "latex", "--allergy", "peanuts"]),
        )
        .unwrap();
        assert_eq!(merged.allergies, vec!["latex", "peanuts"]);
    }

    #[test]
    fn test_merge_medical_provider_and_insurance() {
        let merged = merge_medical(
            None,
            &fields_from(&[
                "--provider-name",
                "Springfield Clinic",
                "--provider-phone",
                "(217) 555-0199",
                "--insurance-provider",
                "Acme Health",
                "--insurance-policy",
                "P-1234",
            ]),
        )
        .unwrap();

        let provider = merged.healthcare_provider.unwrap();
        assert_eq!(provider.name, "Springfield Clinic");
        let insurance = merged.insurance_info.unwrap();
        assert_eq!(insurance.policy_number, "P-1234");
    }

    #[test]
    fn test_merge_medical_updates_provider_in_place() {
        let existing = Some(MedicalInfo {
            healthcare_provider: Some(lifecard::person::HealthcareProvider {
                name: "Springfield Clinic".to_string(),
                phone: "(217) 555-0199".to_string(),
                address: None,
                specialty: Some("General".to_string()),
            }),
            ..MedicalInfo::default()
        });

        let merged = merge_medical(
            existing,
            &fields_from(&["--provider-phone", "(217) 555-0200"]),
        )
        .unwrap();
        let provider = merged.healthcare_provider.unwrap();
        assert_eq!(provider.phone, "(217) 555-0200");
        assert_eq!(provider.name, "Springfield Clinic");
        assert_eq!(provider.specialty.as_deref(), Some("General"));
    }

    #[test]
    fn test_parse_medication_full_spec() {
        let med = parse_medication("Lisinopril:10mg:daily:Dr. Reyes");
        assert_eq!(med.name, "Lisinopril");
        assert_eq!(med.dosage, "10mg");
        assert_eq!(med.frequency, "daily");
        assert_eq!(med.prescribing_doctor.as_deref(), Some("Dr. Reyes"));
    }

    #[test]
    fn test_parse_medication_name_only() {
        let med = parse_medication("Aspirin");
        assert_eq!(med.name, "Aspirin");
        assert!(med.dosage.is_empty());
        assert!(med.prescribing_doctor.is_none());
    }

    #[test]
    fn test_apply_fields_edit_keeps_medical_block() {
        let person = Person {
            id: "id-1".to_string(),
            user_id: "owner-1".to_string(),
            name: "Alice".to_string(),
            photo_url: None,
            emergency_contact: EmergencyContact {
                name: "Bob".to_string(),
                phone: "+1 555-0100".to_string(),
            },
            address: lifecard::person::Address {
                street: "12 Elm St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
                country: "USA".to_string(),
            },
            medical_info: Some(MedicalInfo {
                blood_type: Some("O+".to_string()),
                allergies: vec!["penicillin".to_string()],
                ..MedicalInfo::default()
            }),
            public_link_id: "abcdefghij0123456789".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let mut form = PersonForm::edit(&person);
        apply_fields(&mut form, &fields_from(&["--condition", "asthma"])).unwrap();

        let medical = form.medical_info.unwrap();
        assert_eq!(medical.blood_type.as_deref(), Some("O+"));
        assert_eq!(medical.allergies, vec!["penicillin"]);
        assert_eq!(medical.medical_conditions, vec!["asthma"]);
    }
}

//! Subcommand definitions for the `lifecard` CLI.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Account management commands.
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create an account and sign in
    SignUp {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(long)]
        password: String,
    },

    /// Sign in with existing credentials
    SignIn {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the stored session
    SignOut,

    /// Show the currently signed-in account
    Whoami,
}

/// List records in the directory.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Filter the loaded page by name, city, or contact name.
    /// Pagination is disabled while a search is active.
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fields shared by `add` and `edit`.
#[derive(Debug, Args)]
pub struct RecordFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Emergency contact name
    #[arg(long)]
    pub contact_name: Option<String>,

    /// Emergency contact phone
    #[arg(long)]
    pub contact_phone: Option<String>,

    /// Street address
    #[arg(long)]
    pub street: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State or province
    #[arg(long)]
    pub state: Option<String>,

    /// Postal or ZIP code
    #[arg(long)]
    pub postal_code: Option<String>,

    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// Photo file to upload
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// Blood type (e.g. O+)
    #[arg(long)]
    pub blood_type: Option<String>,

    /// Known allergy (repeatable)
    #[arg(long = "allergy")]
    pub allergies: Vec<String>,

    /// Medical condition (repeatable)
    #[arg(long = "condition")]
    pub conditions: Vec<String>,

    /// Medication as NAME:DOSAGE:FREQUENCY[:DOCTOR] (repeatable)
    #[arg(long = "medication", value_name = "SPEC")]
    pub medications: Vec<String>,

    /// Free-text information for emergency responders
    #[arg(long)]
    pub emergency_info: Option<String>,

    /// General medical notes
    #[arg(long)]
    pub medical_notes: Option<String>,

    /// Date of birth
    #[arg(long)]
    pub date_of_birth: Option<String>,

    /// Height
    #[arg(long)]
    pub height: Option<String>,

    /// Weight
    #[arg(long)]
    pub weight: Option<String>,

    /// Mark as registered organ donor
    #[arg(long)]
    pub organ_donor: bool,

    /// Healthcare provider or practice name
    #[arg(long)]
    pub provider_name: Option<String>,

    /// Healthcare provider phone
    #[arg(long)]
    pub provider_phone: Option<String>,

    /// Healthcare provider address
    #[arg(long)]
    pub provider_address: Option<String>,

    /// Healthcare provider specialty
    #[arg(long)]
    pub provider_specialty: Option<String>,

    /// Insurance provider name
    #[arg(long)]
    pub insurance_provider: Option<String>,

    /// Insurance policy number
    #[arg(long)]
    pub insurance_policy: Option<String>,

    /// Insurance group number
    #[arg(long)]
    pub insurance_group: Option<String>,

    /// Insurer contact phone
    #[arg(long)]
    pub insurance_phone: Option<String>,
}

/// Create a new record.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Record fields
    #[command(flatten)]
    pub fields: RecordFields,
}

/// Edit an existing record.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// The record identifier
    pub id: String,

    /// Fields to change; omitted fields keep their current values
    #[command(flatten)]
    pub fields: RecordFields,
}

/// Delete a record.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// The record identifier
    pub id: String,

    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

/// Show a record through its public link identifier.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// The public link identifier
    pub public_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print the share link for a record.
#[derive(Debug, Args)]
pub struct ShareCommand {
    /// The record identifier
    pub id: String,

    /// Also write the QR code as an SVG to this path
    #[arg(long, value_name = "FILE")]
    pub qr_out: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate (defaults to the standard path)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

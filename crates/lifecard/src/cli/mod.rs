//! Command-line interface for lifecard.
//!
//! This module provides the CLI structure and command definitions for the
//! `lifecard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccountCommand, AddCommand, ConfigCommand, DeleteCommand, EditCommand, ListCommand,
    RecordFields, ShareCommand, ShowCommand,
};

/// lifecard - An emergency-profile directory with shareable links
///
/// Records people's identity, emergency-contact, address, and medical
/// information, and shares individual records through unguessable public
/// links and QR codes.
#[derive(Debug, Parser)]
#[command(name = "lifecard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the signed-in account
    #[command(subcommand)]
    Account(AccountCommand),

    /// List your records
    List(ListCommand),

    /// Create a record
    Add(AddCommand),

    /// Edit a record
    Edit(EditCommand),

    /// Delete a record
    Delete(DeleteCommand),

    /// Show a record by its public link identifier
    Show(ShowCommand),

    /// Print a record's share link and QR code
    Share(ShareCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "lifecard");
    }

    #[test]
    fn test_verbosity_levels() {
        let args = vec!["lifecard", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);

        let args = vec!["lifecard", "-v", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);

        let args = vec!["lifecard", "-vv", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);

        let args = vec!["lifecard", "-q", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_parse_account_sign_up() {
        let args = vec![
            "lifecard",
            "account",
            "sign-up",
            "--email",
            "alice@example.com",
            "--password",
            "hunter2hunter2",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Account(AccountCommand::SignUp { .. })
        ));
    }

    #[test]
    fn test_parse_list_defaults() {
        let args = vec!["lifecard", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(list.page, 1);
        assert!(list.search.is_none());
        assert!(!list.json);
    }

    #[test]
    fn test_parse_list_with_search() {
        let args = vec!["lifecard", "list", "--page", "2", "--search", "alice"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(list.page, 2);
        assert_eq!(list.search.as_deref(), Some("alice"));
    }

    #[test]
    fn test_parse_add_with_fields() {
        let args = vec![
            "lifecard",
            "add",
            "--name",
            "Alice",
            "--contact-name",
            "Bob",
            "--contact-phone",
            "+1 555-0100",
            "--city",
            "Springfield",
            "--allergy",
            "penicillin",
            "--allergy",
            "latex",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Add(add) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(add.fields.name.as_deref(), Some("Alice"));
        assert_eq!(add.fields.allergies.len(), 2);
    }

    #[test]
    fn test_parse_add_with_full_medical_block() {
        let args = vec![
            "lifecard",
            "add",
            "--name",
            "Alice",
            "--medication",
            "Lisinopril:10mg:daily:Dr. Reyes",
            "--medical-notes",
            "prefers left arm for blood draws",
            "--height",
            "170cm",
            "--weight",
            "65kg",
            "--provider-name",
            "Springfield Clinic",
            "--provider-phone",
            "(217) 555-0199",
            "--insurance-provider",
            "Acme Health",
            "--insurance-policy",
            "P-1234",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Add(add) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(add.fields.medications.len(), 1);
        assert_eq!(add.fields.height.as_deref(), Some("170cm"));
        assert_eq!(
            add.fields.provider_name.as_deref(),
            Some("Springfield Clinic")
        );
        assert_eq!(add.fields.insurance_policy.as_deref(), Some("P-1234"));
    }

    #[test]
    fn test_parse_delete_requires_id() {
        let args = vec!["lifecard", "delete"];
        assert!(Cli::try_parse_from(args).is_err());

        let args = vec!["lifecard", "delete", "some-id", "--yes"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Delete(del) = cli.command else {
            panic!("expected delete command");
        };
        assert_eq!(del.id, "some-id");
        assert!(del.yes);
    }

    #[test]
    fn test_parse_show() {
        let args = vec!["lifecard", "show", "abcdefghij0123456789"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Show(_)));
    }

    #[test]
    fn test_parse_share_with_qr_out() {
        let args = vec!["lifecard", "share", "some-id", "--qr-out", "/tmp/qr.svg"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Share(share) = cli.command else {
            panic!("expected share command");
        };
        assert_eq!(share.qr_out, Some(PathBuf::from("/tmp/qr.svg")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["lifecard", "-c", "/custom/config.toml", "list"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}

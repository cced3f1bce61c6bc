//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--file <path>`: Use this key file instead of the configured one
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// caja-metadata - Inspect and edit desktop icon metadata
#[derive(Parser, Debug)]
#[command(name = "caja-metadata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this key file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the metadata of a desktop icon
    #[command(after_help = "\
EXAMPLES:
    # Every key of the trash icon
    caja-metadata get trash

    # A single key, as JSON
    caja-metadata get trash icon-position --json")]
    Get {
        /// Group (icon name)
        group: String,

        /// Only show this key
        key: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a key to a single string
    Set {
        /// Group (icon name)
        group: String,
        /// Metadata key
        key: String,
        /// Value to store
        value: String,
    },

    /// Set a key to a list of strings
    #[command(
        name = "set-list",
        long_about = "Set a key to a list of strings.\n\n\
            Passing no values stores an empty list, which is different from \
            removing the key."
    )]
    SetList {
        /// Group (icon name)
        group: String,
        /// Metadata key
        key: String,
        /// Values to store, in order
        values: Vec<String>,
    },

    /// Remove a key from a group
    Unset {
        /// Group (icon name)
        group: String,
        /// Metadata key
        key: String,
    },

    /// Remove all metadata of a desktop icon
    Remove {
        /// Group (icon name)
        group: String,
    },

    /// List icons that have metadata
    List {
        /// Dump every group and key as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    caja-metadata completion bash > ~/.local/share/bash-completion/completions/caja-metadata

    # Zsh
    caja-metadata completion zsh > ~/.zfunc/_caja-metadata

    # Fish
    caja-metadata completion fish > ~/.config/fish/completions/caja-metadata.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_list_without_values() {
        let cli = Cli::try_parse_from(["caja-metadata", "set-list", "home", "emblems"])
            .expect("parse");
        match cli.command {
            Command::SetList { group, key, values } => {
                assert_eq!(group, "home");
                assert_eq!(key, "emblems");
                assert!(values.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "caja-metadata",
            "list",
            "--file",
            "/tmp/desktop-metadata",
            "-q",
        ])
        .expect("parse");

        assert!(cli.quiet);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/desktop-metadata")));
    }
}

//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::privacy::username_from_location;

/// Mask command arguments.
#[derive(Debug, Args)]
pub struct MaskCommand {
    /// Text to mask (joined with spaces). Reads FILE or stdin when omitted.
    #[arg(conflicts_with = "file")]
    pub text: Vec<String>,

    /// Read the text to mask from this file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Username to mask in paths
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Infer the username from a session path such as a home directory
    #[arg(long, value_name = "PATH")]
    pub session_path: Option<String>,

    /// Mask even when privacy mode is off
    #[arg(long)]
    pub force: bool,

    /// Print which rules fired instead of only the masked text
    #[arg(short, long)]
    pub report: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl MaskCommand {
    /// Collect the text to mask from the arguments, the file or `stdin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or `stdin` cannot be read.
    pub fn read_input(&self, mut stdin: impl Read) -> Result<String> {
        if !self.text.is_empty() {
            return Ok(self.text.join(" "));
        }

        if let Some(path) = &self.file {
            return Ok(std::fs::read_to_string(path)?);
        }

        let mut input = String::new();
        stdin.read_to_string(&mut input)?;
        Ok(input)
    }

    /// Pick the username to mask: `--user`, then `--session-path`, then the
    /// configured username.
    #[must_use]
    pub fn username(&self, config: &Config) -> Option<String> {
        self.user
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| {
                self.session_path
                    .as_deref()
                    .and_then(username_from_location)
            })
            .or_else(|| config.privacy.username.clone())
    }
}

/// Privacy mode commands.
#[derive(Debug, Subcommand)]
pub enum PrivacyCommand {
    /// Turn privacy mode on
    On,

    /// Turn privacy mode off
    Off,

    /// Flip privacy mode
    Toggle,

    /// Show whether privacy mode is on
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

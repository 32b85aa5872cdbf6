//! `privmask` - CLI for the privmask redaction engine
//!
//! This binary masks sensitive text and manages the persisted privacy switch.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use privmask::cli::{Cli, Command, ConfigCommand, MaskCommand, PrivacyCommand};
use privmask::privacy::UsernameSource;
use privmask::{init_logging, Config, PreferenceStore, PrivacyToggle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Mask(mask_cmd) => handle_mask(&config, &mask_cmd),
        Command::Privacy(privacy_cmd) => handle_privacy(&config, &privacy_cmd),
        Command::Config(config_cmd) => handle_config(&config, cli.config, config_cmd),
    }
}

fn open_toggle(config: &Config) -> privmask::Result<PrivacyToggle<PreferenceStore>> {
    let store = PreferenceStore::open(config.preferences_path())?;
    PrivacyToggle::load(store, config.privacy.default_enabled)
}

fn handle_mask(config: &Config, cmd: &MaskCommand) -> Result<(), Box<dyn std::error::Error>> {
    let enabled = cmd.force || open_toggle(config)?.is_enabled();
    let input = cmd.read_input(std::io::stdin().lock())?;
    let username = cmd.username(config);

    let redaction = privmask::redact(&input, username.as_deref(), enabled);

    if cmd.json {
        let output = if cmd.report {
            serde_json::to_value(&redaction)?
        } else {
            serde_json::json!({ "content": redaction.content })
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if redaction.content.ends_with('\n') {
        print!("{}", redaction.content);
    } else {
        println!("{}", redaction.content);
    }

    if cmd.report {
        let rules = if redaction.rules_applied.is_empty() {
            "none".to_string()
        } else {
            redaction.rules_applied.join(", ")
        };
        let source = match redaction.username_source {
            UsernameSource::None => "none".to_string(),
            UsernameSource::Supplied => "supplied".to_string(),
            UsernameSource::Inferred(style) => format!("inferred ({style})"),
        };
        eprintln!("Privacy:  {}", if enabled { "on" } else { "off" });
        eprintln!("Rules:    {rules}");
        eprintln!("Username: {source}");
    }
    Ok(())
}

fn handle_privacy(config: &Config, cmd: &PrivacyCommand) -> Result<(), Box<dyn std::error::Error>> {
    let toggle = open_toggle(config)?;

    match cmd {
        PrivacyCommand::On | PrivacyCommand::Off => {
            let enabled = matches!(cmd, PrivacyCommand::On);
            let changed = toggle.set(enabled)?;
            let state = if enabled { "on" } else { "off" };
            if changed {
                println!("Privacy mode is now {state}.");
            } else {
                println!("Privacy mode is already {state}.");
            }
        }
        PrivacyCommand::Toggle => {
            let enabled = toggle.toggle()?;
            println!(
                "Privacy mode is now {}.",
                if enabled { "on" } else { "off" }
            );
        }
        PrivacyCommand::Status { json } => {
            let enabled = toggle.is_enabled();
            let store = toggle.into_backend();
            let updated_at = store.updated_at(privmask::toggle::PRIVACY_ENABLED_KEY)?;

            if *json {
                let status = serde_json::json!({
                    "enabled": enabled,
                    "updated_at": updated_at,
                    "preferences_path": store.path(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("privmask status");
                println!("---------------");
                println!("Privacy mode:  {}", if enabled { "on" } else { "off" });
                match updated_at {
                    Some(ts) => println!("Last changed:  {}", ts.to_rfc3339()),
                    None => println!("Last changed:  never (using default)"),
                }
                println!("Preferences:   {}", store.path().display());
            }
        }
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Privacy]");
                println!("  Default enabled:    {}", config.privacy.default_enabled);
                println!(
                    "  Username:           {}",
                    config
                        .privacy
                        .username
                        .as_deref()
                        .unwrap_or("(inferred per text)")
                );
                println!();
                println!("[Storage]");
                println!(
                    "  Preferences path:   {}",
                    config.preferences_path().display()
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

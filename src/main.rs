#![warn(clippy::pedantic)]

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use console::style;
use human_panic::setup_panic;
use serde_json::Value;

use date_only::{
    config::{self, read_option, PropertyConfig, FORMAT_ALIAS},
    converter::DateOnlyValueConverter,
    editor::DateOnlyEditor,
    format::{display_text, DEFAULT_FORMAT},
    normalize::normalize,
};

/// Normalize, format and convert date-only property values
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the host configuration file (TOML, or JSON with a .json extension)
    #[arg(long, default_value = "~/.config/date-only/config.toml")]
    config_path: PathBuf,

    /// If set, logs debug output unless `RUST_LOG` says otherwise
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize values to canonical YYYY-MM-DD dates, one per line
    Normalize {
        /// Values to normalize
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Render a canonical date with a display template
    Format {
        /// Canonical YYYY-MM-DD date
        date: String,

        /// Display template, defaults to the configured one
        #[arg(long)]
        format: Option<String>,
    },

    /// Convert a stored value to a calendar date the way the server does
    Convert {
        /// Raw stored value
        source: String,
    },

    /// Drive an editor: attach configuration, set a value, apply user actions
    Edit {
        /// Value supplied by the host
        #[arg(long)]
        value: Option<String>,

        /// Value entered in the date input
        #[arg(long)]
        pick: Option<String>,

        /// If set, uses today's date as the user would with the button
        #[arg(long)]
        today: bool,
    },
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    log::trace!("Parsed command line arguments: {args:#?}");

    let config_path = expand_homedir(&args.config_path)?;

    match args.command {
        Command::Normalize { inputs } => {
            for input in &inputs {
                println!("{}", normalize(Some(input.as_str())));
            }
        }
        Command::Format { date, format } => {
            let format = match format {
                Some(format) => format,
                None => {
                    let config = config::load(&config_path)?;
                    read_option(Some(&config), FORMAT_ALIAS, DEFAULT_FORMAT)
                }
            };
            println!("{}", display_text(&date, &format));
        }
        Command::Convert { source } => {
            let date = DateOnlyValueConverter
                .convert(Some(&Value::String(source)))
                .unwrap_or_else(|err| {
                    log::debug!("Conversion failed: {err}");
                    None
                });
            match date {
                Some(date) => println!("{date}"),
                None => println!("null"),
            }
        }
        Command::Edit { value, pick, today } => {
            let config = config::load(&config_path)?;
            run_editor(Box::new(config), value.as_deref(), pick.as_deref(), today)?;
        }
    }

    Ok(())
}

fn run_editor(
    config: Box<dyn PropertyConfig>,
    value: Option<&str>,
    pick: Option<&str>,
    today: bool,
) -> anyhow::Result<()> {
    let mut editor = DateOnlyEditor::new();
    editor.add_listener(|event| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(err) => log::warn!("Could not serialize change event: {err}"),
    });

    log::info!("Attaching configuration...");
    editor.set_config(Some(config));

    if value.is_some() {
        log::info!("Setting host value...");
        editor.set_value(value);
    }
    if let Some(pick) = pick {
        editor.pick(pick);
    }
    if today {
        editor.use_today();
    }

    let value = serde_json::to_string(editor.value()).context("could not serialize value")?;
    println!("{} {value}", style("value:").bold());
    println!("{} {}", style("display:").bold(), editor.display());
    Ok(())
}

fn expand_homedir(path: &Path) -> anyhow::Result<PathBuf> {
    Ok(path
        .to_string_lossy()
        .replace('~', &env::var("HOME")?)
        .into())
}

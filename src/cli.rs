//! Command-line interface implementation for templeton.
//! Provides argument parsing and the run settings derived from it.

use std::path::PathBuf;

use clap::{error::ErrorKind, CommandFactory, Parser};

use crate::config::project_config_path;
use crate::context::{load_answers, parse_key_value, supplied_data, DataMapping};
use crate::error::{Error, Result};

/// Command-line arguments structure for templeton.
#[derive(Parser, Debug)]
#[command(author, version, about = "templeton: project scaffolding from YAML templates", long_about = None)]
pub struct Args {
    /// Directory where files are generated
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Variable values as KEY=VALUE pairs; skips prompting when given
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value, value_delimiter = ',')]
    pub data: Vec<(String, String)>,

    /// Path to the YAML configuration
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Name of a configuration stored under ~/.templeton
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    /// Read answers as a JSON object from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run operates on, resolved from [`Args`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: PathBuf,
    pub config_path: PathBuf,
    /// Values supplied up front; `None` means they have to be collected.
    pub data: Option<DataMapping>,
}

impl Settings {
    /// Resolves `args`, reading stdin when `--stdin` is set.
    ///
    /// # Errors
    /// * `Error::ConfigError` if no configuration is named or `$HOME` is unset
    /// * `Error::JsonError` if stdin does not hold a JSON object
    pub fn from_args(args: Args) -> Result<Self> {
        let config_path = resolve_config_path(args.template, args.project.as_deref())?;
        let answers = if args.stdin { Some(load_answers(std::io::stdin().lock())?) } else { None };
        Ok(Self { root: args.root, config_path, data: supplied_data(args.data, answers) })
    }
}

/// Picks the configuration file: `--template` wins over `--project`.
pub fn resolve_config_path(template: Option<PathBuf>, project: Option<&str>) -> Result<PathBuf> {
    match (template, project) {
        (Some(path), _) => Ok(path),
        (None, Some(name)) => {
            let home = std::env::var_os("HOME")
                .ok_or_else(|| Error::ConfigError("HOME is not set, cannot locate projects".to_string()))?;
            Ok(project_config_path(home, name))
        }
        (None, None) => Err(Error::ConfigError(
            "no yaml template specified. use --template or --project to specify one".to_string(),
        )),
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

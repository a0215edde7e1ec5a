//! Configuration handling for templeton.
//!
//! A configuration is a YAML document describing the files to generate and,
//! optionally, metadata for the variables they use:
//!
//! ```yaml
//! variables:
//!   Name:
//!     description: Project name
//!     default: demo
//!     validate: required
//! templates:
//!   - path: "{{.Name}}/README.md"
//!     contents: "# {{.Name}}"
//!   - path: Makefile
//!     contents: "<< .Name >>"
//!     delims: ["<<", ">>"]
//! ```
//!
//! A bare list of templates, without the `variables` section, is accepted
//! as well.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::constants::{CONFIG_EXTENSION, PROJECTS_DIR};
use crate::error::{Error, Result};
use crate::template::Delimiters;
use crate::validate::{compile_rules, Rule};

/// One file to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    /// Destination path template, relative to the output root.
    pub path: String,
    /// Content template.
    pub contents: String,
    pub delimiters: Delimiters,
}

impl FileDescriptor {
    /// A descriptor using the default delimiters.
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self { path: path.into(), contents: contents.into(), delimiters: Delimiters::default() }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    path: String,
    #[serde(default)]
    contents: String,
    #[serde(default)]
    delims: Option<Vec<String>>,
}

impl TryFrom<RawDescriptor> for FileDescriptor {
    type Error = Error;

    fn try_from(raw: RawDescriptor) -> Result<Self> {
        let delimiters = match raw.delims.as_deref() {
            None => Delimiters::default(),
            Some([left, right]) if !left.is_empty() && !right.is_empty() => Delimiters::new(left, right),
            Some(other) => {
                return Err(Error::ConfigError(format!(
                    "template '{}' must declare exactly two non-empty delimiters, got {other:?}",
                    raw.path
                )))
            }
        };
        Ok(Self { path: raw.path, contents: raw.contents, delimiters })
    }
}

/// Prompting metadata for one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VariableSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: String,
    /// Comma-separated rule names, see [`crate::validate`].
    #[serde(default)]
    pub validate: String,
}

impl VariableSpec {
    pub fn rules(&self) -> Vec<Rule> {
        compile_rules(&self.validate)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    variables: IndexMap<String, VariableSpec>,
    #[serde(default)]
    templates: Vec<RawDescriptor>,
}

/// A loaded configuration. Delimiters are already defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub variables: IndexMap<String, VariableSpec>,
    pub templates: Vec<FileDescriptor>,
}

/// Parses configuration content.
///
/// The structured shape is tried first; when it does not decode or declares
/// no templates, the content is read as a bare list of templates.
///
/// # Errors
/// * `Error::ConfigError` if neither shape decodes or a delimiter pair is malformed
pub fn parse_config(content: &str) -> Result<Config> {
    let raw = match serde_yaml::from_str::<RawConfig>(content) {
        Ok(raw) if !raw.templates.is_empty() => raw,
        structured => {
            if let Err(e) = structured {
                debug!("Configuration is not in the structured format ({e}), trying a template list");
            }
            let templates: Vec<RawDescriptor> = serde_yaml::from_str(content)
                .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}")))?;
            RawConfig { templates, ..RawConfig::default() }
        }
    };

    let templates = raw
        .templates
        .into_iter()
        .map(FileDescriptor::try_from)
        .collect::<Result<Vec<_>>>()?;
    debug!("Loaded {} template(s) and {} variable spec(s)", templates.len(), raw.variables.len());

    Ok(Config { variables: raw.variables, templates })
}

/// Reads and parses the configuration file at `path`.
///
/// # Errors
/// * `Error::ConfigError` if the file does not exist or cannot be decoded
/// * `Error::IoError` if the file cannot be read
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigError(format!("Invalid configuration path: {}", path.display())));
    }
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Location of a named project configuration under `home`.
pub fn project_config_path<P: AsRef<Path>>(home: P, project: &str) -> PathBuf {
    home.as_ref().join(PROJECTS_DIR).join(format!("{project}{CONFIG_EXTENSION}"))
}

/// The static asset directory that sits next to a configuration file:
/// `templates/web.yaml` has its assets in `templates/web/`.
pub fn asset_dir<P: AsRef<Path>>(config_path: P) -> PathBuf {
    let config_path = config_path.as_ref();
    let raw = config_path.to_string_lossy();
    match raw.strip_suffix(CONFIG_EXTENSION) {
        Some(stem) => PathBuf::from(stem),
        None => config_path.to_path_buf(),
    }
}

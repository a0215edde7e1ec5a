//! Interactive collection of variable values.

use dialoguer::Input;
use indexmap::IndexMap;
use log::debug;

use crate::config::VariableSpec;
use crate::context::DataMapping;
use crate::error::{Error, Result};
use crate::validate::{validate, Rule};

/// Everything a prompter needs to ask for one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub title: String,
    pub description: String,
    pub default: String,
    pub rules: Vec<Rule>,
}

impl Field {
    /// Builds the field for `key`, falling back to the key itself as the
    /// description when no spec is given.
    pub fn new(key: &str, spec: Option<&VariableSpec>) -> Self {
        let (description, default, rules) = match spec {
            Some(spec) => (spec.description.clone(), spec.default.clone(), spec.rules()),
            None => (key.to_string(), String::new(), Vec::new()),
        };
        Self { key: key.to_string(), title: format!("Value for {key}"), description, default, rules }
    }
}

/// Source of values for fields.
pub trait Prompter {
    /// Asks for a candidate value.
    fn prompt(&self, field: &Field) -> Result<String>;

    /// Reports that the last candidate for `field` failed validation.
    fn reject(&self, field: &Field, err: &Error) {
        let _ = (field, err);
    }
}

/// Terminal prompter backed by `dialoguer`.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn prompt(&self, field: &Field) -> Result<String> {
        let prompt = if field.description.is_empty() || field.description == field.key {
            field.title.clone()
        } else {
            format!("{} ({})", field.title, field.description)
        };
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if !field.default.is_empty() {
            input = input.default(field.default.clone());
        }
        Ok(input.interact_text()?)
    }

    fn reject(&self, _field: &Field, err: &Error) {
        eprintln!("{err}");
    }
}

/// Asks `prompter` for every key in order, re-asking until the value passes
/// the key's rules.
///
/// # Errors
/// Anything the prompter returns other than a validation failure.
pub fn collect_variables(
    prompter: &dyn Prompter,
    keys: &[String],
    specs: &IndexMap<String, VariableSpec>,
) -> Result<DataMapping> {
    let mut data = DataMapping::new();
    for key in keys {
        let field = Field::new(key, specs.get(key));
        let value = loop {
            let candidate = prompter.prompt(&field)?;
            match validate(&field.rules, &candidate) {
                Ok(()) => break candidate,
                Err(err @ Error::ValidationError(_)) => {
                    debug!("Rejected value for '{key}': {err}");
                    prompter.reject(&field, &err);
                }
                Err(err) => return Err(err),
            }
        };
        data.insert(key.clone(), value);
    }
    Ok(data)
}

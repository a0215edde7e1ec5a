//! Validation rules for collected variable values.
//!
//! Rules are declared per variable as a comma-separated list, e.g.
//! `validate: "required, number"`.

use log::trace;

use crate::constants::DATE_LAYOUTS;
use crate::error::{Error, Result};
use crate::template::layout::parse_date;

/// A single named check on a candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Rejects blank input.
    Required,
    /// Rejects non-empty input that is not a floating-point number.
    Number,
    /// Rejects non-empty input that is not a date in one of the accepted layouts.
    Date,
}

impl Rule {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "required" => Some(Rule::Required),
            "number" => Some(Rule::Number),
            "date" => Some(Rule::Date),
            _ => None,
        }
    }

    pub fn check(&self, input: &str) -> Result<()> {
        let valid = match self {
            Rule::Required => !input.trim().is_empty(),
            Rule::Number => input.is_empty() || input.parse::<f64>().is_ok(),
            Rule::Date => input.is_empty() || parse_date(input, &DATE_LAYOUTS).is_some(),
        };
        if valid {
            Ok(())
        } else {
            Err(Error::ValidationError(self.message().to_string()))
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Rule::Required => "this field is required",
            Rule::Number => "must be a valid number",
            Rule::Date => "must be a valid date (YYYY-MM-DD)",
        }
    }
}

/// Compiles a comma-separated rule list. Unknown names are skipped.
pub fn compile_rules(spec: &str) -> Vec<Rule> {
    spec.split(',')
        .map(str::trim)
        .filter_map(|name| {
            let rule = Rule::from_name(name);
            if rule.is_none() && !name.is_empty() {
                trace!("Ignoring unknown validation rule '{name}'");
            }
            rule
        })
        .collect()
}

/// Applies `rules` in order and reports the first failure.
pub fn validate(rules: &[Rule], input: &str) -> Result<()> {
    rules.iter().try_for_each(|rule| rule.check(input))
}

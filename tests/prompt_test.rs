use std::cell::RefCell;
use std::collections::VecDeque;

use indexmap::IndexMap;
use templeton::config::VariableSpec;
use templeton::error::{Error, Result};
use templeton::prompt::{collect_variables, Field, Prompter};
use templeton::validate::Rule;

/// Answers from a script and records what it was asked.
#[derive(Default)]
struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<Field>>,
    rejected: RefCell<Vec<(String, String)>>,
}

impl ScriptedPrompter {
    fn new(answers: &[&str]) -> Self {
        Self { answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()), ..Self::default() }
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, field: &Field) -> Result<String> {
        self.asked.borrow_mut().push(field.clone());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::ConfigError("script exhausted".to_string()))
    }

    fn reject(&self, field: &Field, err: &Error) {
        self.rejected.borrow_mut().push((field.key.clone(), err.to_string()));
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_no_keys_never_prompts() {
    let prompter = ScriptedPrompter::new(&[]);
    let data = collect_variables(&prompter, &[], &IndexMap::new()).unwrap();
    assert!(data.is_empty());
    assert!(prompter.asked.borrow().is_empty());
}

#[test]
fn test_values_are_collected_in_key_order() {
    let prompter = ScriptedPrompter::new(&["demo", "me"]);
    let data = collect_variables(&prompter, &keys(&["Name", "Author"]), &IndexMap::new()).unwrap();

    assert_eq!(data.iter().collect::<Vec<_>>(), vec![(&"Name".to_string(), &"demo".to_string()), (&"Author".to_string(), &"me".to_string())]);

    let asked = prompter.asked.borrow();
    assert_eq!(asked[0].title, "Value for Name");
    assert_eq!(asked[0].description, "Name");
    assert!(asked[0].rules.is_empty());
}

#[test]
fn test_fields_use_variable_specs() {
    let mut specs = IndexMap::new();
    specs.insert(
        "Price".to_string(),
        VariableSpec { description: "Price in USD".into(), default: "10".into(), validate: "required,number".into() },
    );
    let prompter = ScriptedPrompter::new(&["12.5"]);
    collect_variables(&prompter, &keys(&["Price"]), &specs).unwrap();

    let asked = prompter.asked.borrow();
    assert_eq!(asked[0].description, "Price in USD");
    assert_eq!(asked[0].default, "10");
    assert_eq!(asked[0].rules, vec![Rule::Required, Rule::Number]);
}

#[test_log::test]
fn test_invalid_values_are_asked_again() {
    let mut specs = IndexMap::new();
    specs.insert("Due".to_string(), VariableSpec { validate: "required, date".into(), ..VariableSpec::default() });
    let prompter = ScriptedPrompter::new(&["", "tomorrow", "2024-01-31"]);

    let data = collect_variables(&prompter, &keys(&["Due"]), &specs).unwrap();

    assert_eq!(data["Due"], "2024-01-31");
    assert_eq!(prompter.asked.borrow().len(), 3);
    assert_eq!(
        *prompter.rejected.borrow(),
        vec![
            ("Due".to_string(), "this field is required".to_string()),
            ("Due".to_string(), "must be a valid date (YYYY-MM-DD)".to_string()),
        ]
    );
}

#[test]
fn test_prompter_errors_abort() {
    let prompter = ScriptedPrompter::new(&["only one"]);
    let result = collect_variables(&prompter, &keys(&["A", "B"]), &IndexMap::new());
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

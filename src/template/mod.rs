//! Template parsing and rendering.
//!
//! Templates are literal text interleaved with actions between a pair of
//! delimiters (`{{` and `}}` unless configured otherwise). Actions reference
//! fields of the data mapping (`{{.Name}}`), call functions
//! (`{{ToUpper .Name}}`, `{{.Name | ToLower}}`) and drive control flow with
//! `if`, `range` and `with` blocks.
//!
//! Parsing produces a [`Tree`](ast::Tree) that can be inspected without
//! executing it; the key extractor relies on this.

pub mod ast;
mod exec;
pub mod funcs;
pub mod helpers;
pub mod layout;
mod lexer;
mod parser;
mod value;

use log::trace;

use crate::constants::DEFAULT_DELIMITERS;
use crate::context::DataMapping;
use crate::error::Result;

pub use funcs::FuncMap;
pub use value::Value;

/// Open/close markers bounding template actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { left: left.into(), right: right.into() }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITERS.0, DEFAULT_DELIMITERS.1)
    }
}

/// A parsed template, ready to be inspected or executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    tree: ast::Tree,
}

impl Template {
    /// Parses `text` under `delims`. `name` is used in error messages.
    pub fn parse(name: &str, text: &str, delims: &Delimiters) -> Result<Self> {
        let tree = parser::parse(name, text, delims)?;
        Ok(Self { tree })
    }

    pub fn tree(&self) -> &ast::Tree {
        &self.tree
    }

    /// Executes the template with `data` as the root value.
    pub fn execute(&self, data: &Value, funcs: &FuncMap) -> Result<String> {
        exec::execute(&self.tree, data, funcs)
    }
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Parses a template with the engine's delimiters handling.
    fn parse(&self, name: &str, text: &str, delims: &Delimiters) -> Result<Template>;

    /// Executes a parsed template against a data mapping.
    fn execute(&self, template: &Template, data: &DataMapping) -> Result<String>;

    /// Parses and executes in one step.
    fn render(&self, name: &str, text: &str, delims: &Delimiters, data: &DataMapping) -> Result<String> {
        let template = self.parse(name, text, delims)?;
        self.execute(&template, data)
    }
}

/// The rendering engine used for scaffolding: builtins plus the text helpers
/// from [`helpers`].
#[derive(Debug, Clone)]
pub struct Engine {
    funcs: FuncMap,
}

impl Engine {
    pub fn new() -> Self {
        Self { funcs: helpers::render_functions() }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl TemplateRenderer for Engine {
    fn parse(&self, name: &str, text: &str, delims: &Delimiters) -> Result<Template> {
        trace!("Parsing template '{name}' with delimiters {} {}", delims.left, delims.right);
        Template::parse(name, text, delims)
    }

    fn execute(&self, template: &Template, data: &DataMapping) -> Result<String> {
        template.execute(&Value::from(data), &self.funcs)
    }
}

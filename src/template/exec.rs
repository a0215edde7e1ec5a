//! Tree-walking executor.

use super::ast::{Arg, Branch, Command, List, Node, Pipeline, Tree};
use super::funcs::FuncMap;
use super::Value;
use crate::error::{Error, Result};

/// How a list finished; `break` and `continue` unwind to the nearest range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

struct State<'a> {
    name: &'a str,
    funcs: &'a FuncMap,
    vars: Vec<(String, Value)>,
    out: String,
}

/// Executes `tree` with `data` as both `.` and `$`.
pub fn execute(tree: &Tree, data: &Value, funcs: &FuncMap) -> Result<String> {
    let mut state = State {
        name: &tree.name,
        funcs,
        vars: vec![("$".to_string(), data.clone())],
        out: String::new(),
    };
    state.walk_list(data, &tree.root)?;
    Ok(state.out)
}

impl State<'_> {
    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(Error::RenderError { template: self.name.to_string(), message: message.into() })
    }

    fn walk_list(&mut self, dot: &Value, list: &List) -> Result<Flow> {
        for node in &list.nodes {
            let flow = self.walk(dot, node)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn walk(&mut self, dot: &Value, node: &Node) -> Result<Flow> {
        match node {
            Node::Text(text) => self.out.push_str(text),
            Node::Comment(_) => {}
            Node::Action(pipe) => {
                let value = self.eval_pipeline(dot, pipe)?;
                if pipe.decl.is_empty() {
                    self.out.push_str(&value.to_string());
                }
            }
            Node::If(branch) => return self.walk_if_or_with(dot, branch, false),
            Node::With(branch) => return self.walk_if_or_with(dot, branch, true),
            Node::Range(branch) => return self.walk_range(dot, branch),
            Node::Break => return Ok(Flow::Break),
            Node::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    fn walk_if_or_with(&mut self, dot: &Value, branch: &Branch, rebind: bool) -> Result<Flow> {
        let mark = self.vars.len();
        let value = self.eval_pipeline(dot, &branch.pipe)?;
        let flow = if value.is_true() {
            let inner = if rebind { &value } else { dot };
            self.walk_list(inner, &branch.list)?
        } else if let Some(else_list) = &branch.else_list {
            self.walk_list(dot, else_list)?
        } else {
            Flow::Normal
        };
        self.vars.truncate(mark);
        Ok(flow)
    }

    fn walk_range(&mut self, dot: &Value, branch: &Branch) -> Result<Flow> {
        let mark = self.vars.len();
        let value = self.eval_commands(dot, &branch.pipe)?;
        let pairs: Vec<(Value, Value)> = match value {
            Value::List(items) => {
                items.into_iter().enumerate().map(|(i, item)| (Value::Int(i as i64), item)).collect()
            }
            Value::Map(map) => {
                let mut entries: Vec<(String, Value)> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries.into_iter().map(|(k, v)| (Value::Str(k), v)).collect()
            }
            Value::Int(n) => {
                if branch.pipe.decl.len() > 1 {
                    return self.error("can't use two range variables with an integer");
                }
                (0..n.max(0)).map(|i| (Value::Int(i), Value::Int(i))).collect()
            }
            Value::Nil => Vec::new(),
            other => return self.error(format!("range can't iterate over {other}")),
        };

        if pairs.is_empty() {
            let flow = match &branch.else_list {
                Some(else_list) => self.walk_list(dot, else_list)?,
                None => Flow::Normal,
            };
            self.vars.truncate(mark);
            return Ok(flow);
        }

        for (key, elem) in pairs {
            self.vars.truncate(mark);
            match branch.pipe.decl.as_slice() {
                [] => {}
                [only] => self.bind(only, elem.clone(), branch.pipe.is_assign)?,
                [first, second, ..] => {
                    self.bind(first, key, branch.pipe.is_assign)?;
                    self.bind(second, elem.clone(), branch.pipe.is_assign)?;
                }
            }
            if self.walk_list(&elem, &branch.list)? == Flow::Break {
                break;
            }
        }
        self.vars.truncate(mark);
        Ok(Flow::Normal)
    }

    fn bind(&mut self, name: &str, value: Value, assign: bool) -> Result<()> {
        if !assign {
            self.vars.push((name.to_string(), value));
            return Ok(());
        }
        match self.vars.iter_mut().rev().find(|(n, _)| n == name) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => self.error(format!("undefined variable: {name}")),
        }
    }

    fn var(&self, name: &str) -> Result<Value> {
        match self.vars.iter().rev().find(|(n, _)| n == name) {
            Some((_, value)) => Ok(value.clone()),
            None => self.error(format!("undefined variable: {name}")),
        }
    }

    /// Evaluates the pipeline and binds its declarations.
    fn eval_pipeline(&mut self, dot: &Value, pipe: &Pipeline) -> Result<Value> {
        let value = self.eval_commands(dot, pipe)?;
        for name in &pipe.decl {
            self.bind(name, value.clone(), pipe.is_assign)?;
        }
        Ok(value)
    }

    fn eval_commands(&mut self, dot: &Value, pipe: &Pipeline) -> Result<Value> {
        let mut value = None;
        for cmd in &pipe.cmds {
            value = Some(self.eval_command(dot, cmd, value.take())?);
        }
        Ok(value.unwrap_or(Value::Nil))
    }

    fn eval_command(&mut self, dot: &Value, cmd: &Command, last: Option<Value>) -> Result<Value> {
        let Some((first, rest)) = cmd.args.split_first() else {
            return self.error("empty command");
        };
        match first {
            Arg::Identifier(name) => self.eval_function(dot, name, rest, last),
            Arg::Field(idents) => self.eval_fields(dot.clone(), idents, rest, last),
            Arg::Variable(idents) => {
                let value = self.var(&idents[0])?;
                self.eval_fields(value, &idents[1..], rest, last)
            }
            Arg::Chain { node, fields } => {
                let value = self.eval_arg(dot, node)?;
                self.eval_fields(value, fields, rest, last)
            }
            Arg::Pipe(pipe) => {
                self.not_a_function(first, rest, &last)?;
                self.eval_pipeline(dot, pipe)
            }
            Arg::Nil => self.error("nil is not a command"),
            Arg::Dot | Arg::Bool(_) | Arg::Int(_) | Arg::Float(_) | Arg::Str(_) => {
                self.not_a_function(first, rest, &last)?;
                self.eval_arg(dot, first)
            }
        }
    }

    fn not_a_function(&self, arg: &Arg, rest: &[Arg], last: &Option<Value>) -> Result<()> {
        if rest.is_empty() && last.is_none() {
            Ok(())
        } else {
            self.error(format!("can't give argument to non-function {}", describe(arg)))
        }
    }

    /// Walks `fields` starting from `receiver`. Values have no methods, so a
    /// field access that receives arguments is an error.
    fn eval_fields(&mut self, mut receiver: Value, fields: &[String], args: &[Arg], last: Option<Value>) -> Result<Value> {
        if !args.is_empty() || last.is_some() {
            return match fields.last() {
                Some(field) => self.error(format!("{field} is not a method but has arguments")),
                None => self.error("can't give argument to non-function variable"),
            };
        }
        for field in fields {
            receiver = match receiver {
                Value::Map(mut map) => match map.swap_remove(field) {
                    Some(value) => value,
                    None => return self.error(format!("map has no entry for key {field:?}")),
                },
                Value::Nil => return self.error(format!("nil pointer evaluating <nil>.{field}")),
                other => {
                    return self.error(format!("can't evaluate field {field} in type {}", other.type_name()))
                }
            };
        }
        Ok(receiver)
    }

    fn eval_function(&mut self, dot: &Value, name: &str, args: &[Arg], last: Option<Value>) -> Result<Value> {
        if name == "and" || name == "or" {
            return self.eval_logical(dot, name == "and", args, last);
        }
        let Some(func) = self.funcs.get(name) else {
            return self.error(format!("function {name:?} not defined"));
        };
        let mut values = Vec::with_capacity(args.len() + 1);
        for arg in args {
            values.push(self.eval_arg(dot, arg)?);
        }
        values.extend(last);
        func(&values).or_else(|message| self.error(format!("error calling {name}: {message}")))
    }

    /// `and` returns the first false argument or the last one; `or` the first
    /// true argument or the last one. Evaluation stops as soon as the result
    /// is known.
    fn eval_logical(&mut self, dot: &Value, is_and: bool, args: &[Arg], last: Option<Value>) -> Result<Value> {
        let name = if is_and { "and" } else { "or" };
        if args.is_empty() && last.is_none() {
            return self.error(format!("error calling {name}: wrong number of args: want at least 1 got 0"));
        }
        let mut value = Value::Nil;
        for arg in args {
            value = self.eval_arg(dot, arg)?;
            if value.is_true() != is_and {
                return Ok(value);
            }
        }
        Ok(last.unwrap_or(value))
    }

    fn eval_arg(&mut self, dot: &Value, arg: &Arg) -> Result<Value> {
        match arg {
            Arg::Dot => Ok(dot.clone()),
            Arg::Nil => Ok(Value::Nil),
            Arg::Bool(b) => Ok(Value::Bool(*b)),
            Arg::Int(i) => Ok(Value::Int(*i)),
            Arg::Float(x) => Ok(Value::Float(*x)),
            Arg::Str(s) => Ok(Value::Str(s.clone())),
            Arg::Field(idents) => self.eval_fields(dot.clone(), idents, &[], None),
            Arg::Variable(idents) => {
                let value = self.var(&idents[0])?;
                self.eval_fields(value, &idents[1..], &[], None)
            }
            Arg::Pipe(pipe) => self.eval_pipeline(dot, pipe),
            Arg::Identifier(name) => self.eval_function(dot, name, &[], None),
            Arg::Chain { node, fields } => {
                let value = self.eval_arg(dot, node)?;
                self.eval_fields(value, fields, &[], None)
            }
        }
    }
}

fn describe(arg: &Arg) -> String {
    match arg {
        Arg::Dot => ".".to_string(),
        Arg::Nil => "nil".to_string(),
        Arg::Bool(b) => b.to_string(),
        Arg::Int(i) => i.to_string(),
        Arg::Float(x) => x.to_string(),
        Arg::Str(s) => format!("{s:?}"),
        Arg::Field(idents) => format!(".{}", idents.join(".")),
        Arg::Variable(idents) => idents.join("."),
        Arg::Identifier(name) => name.clone(),
        Arg::Pipe(_) => "(pipeline)".to_string(),
        Arg::Chain { fields, .. } => format!("(...).{}", fields.join(".")),
    }
}

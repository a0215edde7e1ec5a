//! Syntax tree produced by the parser.
//!
//! Node kinds form a closed set. Code walking the tree (the executor and the
//! key extractor) matches exhaustively, so a new construct has to be handled
//! at every recursion site.

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub name: String,
    pub root: List,
}

/// A sequence of nodes, rendered in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output.
    Text(String),
    /// `{{/* ... */}}`; produces no output.
    Comment(String),
    /// `{{ pipeline }}`
    Action(Pipeline),
    /// `{{if pipeline}} list {{else}} list {{end}}`
    If(Branch),
    /// `{{range pipeline}} list {{else}} list {{end}}`
    Range(Branch),
    /// `{{with pipeline}} list {{else}} list {{end}}`
    With(Branch),
    /// `{{break}}` inside a range.
    Break,
    /// `{{continue}}` inside a range.
    Continue,
}

/// Shared shape of the control structures.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub line: usize,
    pub pipe: Pipeline,
    pub list: List,
    pub else_list: Option<List>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub line: usize,
    /// `=` rather than `:=`.
    pub is_assign: bool,
    pub decl: Vec<String>,
    pub cmds: Vec<Command>,
}

/// One stage of a pipeline: an operand followed by its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `.A.B`; never empty.
    Field(Vec<String>),
    /// `$x.A.B`; the first element is the variable name including `$`.
    Variable(Vec<String>),
    /// A function name.
    Identifier(String),
    /// `.`
    Dot,
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A parenthesized pipeline.
    Pipe(Pipeline),
    /// Field access on a term that is not itself a field or variable,
    /// e.g. `(pipeline).A`.
    Chain { node: Box<Arg>, fields: Vec<String> },
}

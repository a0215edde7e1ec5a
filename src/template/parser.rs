//! Recursive-descent parser turning lexer tokens into a [`Tree`].

use super::ast::{Arg, Branch, Command, List, Node, Pipeline, Tree};
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::Delimiters;
use crate::error::{Error, Result};

/// Parses `text` into a tree named `name`.
///
/// Function names are not resolved here; an unknown function only fails when
/// the tree is executed. Undefined `$variables` are rejected.
pub fn parse(name: &str, text: &str, delims: &Delimiters) -> Result<Tree> {
    if delims.left.is_empty() || delims.right.is_empty() {
        return Err(Error::ParseError {
            template: name.to_string(),
            line: 1,
            message: "delimiters must not be empty".to_string(),
        });
    }
    let tokens = Lexer::new(text, delims).tokenize().map_err(|e| Error::ParseError {
        template: name.to_string(),
        line: e.line,
        message: e.message,
    })?;
    Parser::new(name, tokens).parse()
}

/// What ended a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    End,
    Else,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    Delim,
    Paren,
}

struct Parser<'a> {
    name: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    vars: Vec<String>,
    range_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(name: &'a str, tokens: Vec<Token>) -> Self {
        Self { name, tokens, pos: 0, vars: vec!["$".to_string()], range_depth: 0 }
    }

    fn parse(mut self) -> Result<Tree> {
        let (root, stop) = self.parse_list()?;
        match stop {
            Stop::Eof => Ok(Tree { name: self.name.to_string(), root }),
            Stop::End => self.error("unexpected {{end}}"),
            Stop::Else => self.error("unexpected {{else}}"),
        }
    }

    fn peek(&self) -> &Token {
        // the token vector always ends with Eof and `next` never moves past it
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(Error::ParseError {
            template: self.name.to_string(),
            line: self.peek().line,
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, context: &str) -> Result<T> {
        self.error(format!("unexpected {} in {context}", describe(&self.peek().kind)))
    }

    fn at_closer(&self, closer: Closer) -> bool {
        matches!(
            (closer, &self.peek().kind),
            (Closer::Delim, TokenKind::RightDelim) | (Closer::Paren, TokenKind::RightParen)
        )
    }

    fn expect_right_delim(&mut self, context: &str) -> Result<()> {
        if self.at_closer(Closer::Delim) {
            self.next();
            Ok(())
        } else {
            self.unexpected(context)
        }
    }

    fn parse_list(&mut self) -> Result<(List, Stop)> {
        let mut list = List::default();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Text(text) => list.nodes.push(Node::Text(text)),
                TokenKind::Comment(text) => list.nodes.push(Node::Comment(text)),
                TokenKind::LeftDelim => {
                    if let Some(stop) = self.parse_action(&mut list)? {
                        return Ok((list, stop));
                    }
                }
                TokenKind::Eof => return Ok((list, Stop::Eof)),
                other => return self.error(format!("unexpected {}", describe(&other))),
            }
        }
    }

    /// Parses what follows a left delimiter, appending to `list` unless the
    /// action closes the enclosing list.
    fn parse_action(&mut self, list: &mut List) -> Result<Option<Stop>> {
        let keyword = match self.peek().kind {
            TokenKind::Keyword(keyword) => keyword,
            _ => {
                let pipe = self.parse_pipeline("command", Closer::Delim)?;
                list.nodes.push(Node::Action(pipe));
                return Ok(None);
            }
        };
        self.next();
        match keyword {
            Keyword::End => {
                self.expect_right_delim("end")?;
                return Ok(Some(Stop::End));
            }
            Keyword::Else => return Ok(Some(Stop::Else)),
            Keyword::If => list.nodes.push(Node::If(self.parse_control(Keyword::If)?)),
            Keyword::Range => list.nodes.push(Node::Range(self.parse_control(Keyword::Range)?)),
            Keyword::With => list.nodes.push(Node::With(self.parse_control(Keyword::With)?)),
            Keyword::Break | Keyword::Continue => {
                let name = if keyword == Keyword::Break { "break" } else { "continue" };
                if self.range_depth == 0 {
                    return self.error(format!("{{{{{name}}}}} outside {{{{range}}}}"));
                }
                self.expect_right_delim(name)?;
                list.nodes.push(if keyword == Keyword::Break { Node::Break } else { Node::Continue });
            }
            Keyword::Define | Keyword::Template | Keyword::Block => {
                return self.error("nested template definitions are not supported");
            }
        }
        Ok(None)
    }

    fn parse_control(&mut self, keyword: Keyword) -> Result<Branch> {
        let context = match keyword {
            Keyword::If => "if",
            Keyword::Range => "range",
            _ => "with",
        };
        let line = self.peek().line;
        let vars_len = self.vars.len();
        let pipe = self.parse_pipeline(context, Closer::Delim)?;

        if keyword == Keyword::Range {
            self.range_depth += 1;
        }
        let (list, stop) = self.parse_list()?;
        if keyword == Keyword::Range {
            self.range_depth -= 1;
        }

        let else_list = match stop {
            Stop::End => None,
            Stop::Eof => return self.error(format!("unexpected EOF in {context}")),
            Stop::Else => {
                let chained = matches!(keyword, Keyword::If | Keyword::With)
                    && self.peek().kind == TokenKind::Keyword(keyword);
                if chained {
                    // `{{else if x}}` reads as `{{else}}{{if x}}...{{end}}{{end}}`;
                    // the nested block consumes the shared {{end}}
                    self.next();
                    let nested = self.parse_control(keyword)?;
                    let node = if keyword == Keyword::If { Node::If(nested) } else { Node::With(nested) };
                    Some(List { nodes: vec![node] })
                } else {
                    self.expect_right_delim("else")?;
                    let (else_list, stop) = self.parse_list()?;
                    match stop {
                        Stop::End => {}
                        Stop::Else => return self.error(format!("expected end; found {{{{else}}}} in {context}")),
                        Stop::Eof => return self.error(format!("unexpected EOF in {context}")),
                    }
                    Some(else_list)
                }
            }
        };

        self.vars.truncate(vars_len);
        Ok(Branch { line, pipe, list, else_list })
    }

    fn parse_pipeline(&mut self, context: &str, closer: Closer) -> Result<Pipeline> {
        let mut pipe = Pipeline { line: self.peek().line, ..Pipeline::default() };
        self.parse_declarations(context, &mut pipe)?;

        loop {
            if self.at_closer(closer) {
                self.next();
                break;
            }
            pipe.cmds.push(self.parse_command(context)?);
            match self.peek().kind {
                TokenKind::Pipe => {
                    self.next();
                    if self.at_closer(closer) {
                        return self.error(format!("missing command after | in {context}"));
                    }
                }
                _ if self.at_closer(closer) => {}
                _ => return self.unexpected(context),
            }
        }

        if pipe.cmds.is_empty() {
            return self.error(format!("missing value for {context}"));
        }
        Ok(pipe)
    }

    fn parse_declarations(&mut self, context: &str, pipe: &mut Pipeline) -> Result<()> {
        let TokenKind::Variable(first) = self.peek().kind.clone() else {
            return Ok(());
        };
        let names = match self.peek_at(1) {
            TokenKind::Declare | TokenKind::Assign => {
                self.next();
                vec![first]
            }
            TokenKind::Comma if context == "range" => {
                self.next();
                self.next();
                let TokenKind::Variable(second) = self.next().kind else {
                    return self.error("range can only initialize variables");
                };
                vec![first, second]
            }
            _ => return Ok(()),
        };

        match self.next().kind {
            TokenKind::Declare => self.vars.extend(names.iter().cloned()),
            TokenKind::Assign => {
                pipe.is_assign = true;
                if let Some(name) = names.iter().find(|name| !self.vars.contains(name)) {
                    return self.error(format!("undefined variable {name:?}"));
                }
            }
            _ => return self.unexpected(context),
        }
        pipe.decl = names;
        Ok(())
    }

    fn parse_command(&mut self, context: &str) -> Result<Command> {
        let mut args = Vec::new();
        loop {
            let adjacent = !args.is_empty() && !self.peek().space_before;
            let Some(arg) = self.parse_operand()? else {
                break;
            };
            if adjacent {
                return self.error(format!("missing space between operands in {context}"));
            }
            args.push(arg);
        }
        if args.is_empty() {
            return self.unexpected(context);
        }
        Ok(Command { args })
    }

    fn parse_operand(&mut self) -> Result<Option<Arg>> {
        let term = match self.peek().kind.clone() {
            TokenKind::Identifier(name) => Arg::Identifier(name),
            TokenKind::Dot => Arg::Dot,
            TokenKind::Nil => Arg::Nil,
            TokenKind::Bool(value) => Arg::Bool(value),
            TokenKind::Int(value) => Arg::Int(value),
            TokenKind::Float(value) => Arg::Float(value),
            TokenKind::Str(value) => Arg::Str(value),
            TokenKind::Field(name) => Arg::Field(vec![name]),
            TokenKind::Variable(name) => {
                if !self.vars.contains(&name) {
                    return self.error(format!("undefined variable {name:?}"));
                }
                Arg::Variable(vec![name])
            }
            TokenKind::LeftParen => {
                self.next();
                let pipe = self.parse_pipeline("parenthesized pipeline", Closer::Paren)?;
                return self.parse_chain(Arg::Pipe(pipe)).map(Some);
            }
            _ => return Ok(None),
        };
        self.next();
        self.parse_chain(term).map(Some)
    }

    /// Folds directly adjacent `.Field` tokens into `term`.
    fn parse_chain(&mut self, term: Arg) -> Result<Arg> {
        let mut fields = Vec::new();
        while let TokenKind::Field(name) = &self.peek().kind {
            if self.peek().space_before {
                break;
            }
            fields.push(name.clone());
            self.next();
        }
        if fields.is_empty() {
            return Ok(term);
        }
        match term {
            Arg::Field(mut idents) => {
                idents.extend(fields);
                Ok(Arg::Field(idents))
            }
            Arg::Variable(mut idents) => {
                idents.extend(fields);
                Ok(Arg::Variable(idents))
            }
            Arg::Identifier(_) | Arg::Pipe(_) | Arg::Chain { .. } => {
                Ok(Arg::Chain { node: Box::new(term), fields })
            }
            Arg::Dot | Arg::Nil | Arg::Bool(_) | Arg::Int(_) | Arg::Float(_) | Arg::Str(_) => {
                self.error(format!("unexpected .{} after term", fields[0]))
            }
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Text(_) => "text".to_string(),
        TokenKind::Comment(_) => "comment".to_string(),
        TokenKind::LeftDelim => "left delimiter".to_string(),
        TokenKind::RightDelim => "right delimiter".to_string(),
        TokenKind::Identifier(name) => format!("<{name}>"),
        TokenKind::Keyword(keyword) => format!("<{}>", format!("{keyword:?}").to_lowercase()),
        TokenKind::Field(name) => format!("<.{name}>"),
        TokenKind::Variable(name) => format!("<{name}>"),
        TokenKind::Dot => "<.>".to_string(),
        TokenKind::Bool(value) => format!("<{value}>"),
        TokenKind::Nil => "<nil>".to_string(),
        TokenKind::Int(value) => format!("<{value}>"),
        TokenKind::Float(value) => format!("<{value}>"),
        TokenKind::Str(value) => format!("{value:?}"),
        TokenKind::Pipe => "<|>".to_string(),
        TokenKind::LeftParen => "<(>".to_string(),
        TokenKind::RightParen => "<)>".to_string(),
        TokenKind::Declare => "<:=>".to_string(),
        TokenKind::Assign => "<=>".to_string(),
        TokenKind::Comma => "<,>".to_string(),
        TokenKind::Eof => "EOF".to_string(),
    }
}

//! Splits template text into literal text and action tokens.
//!
//! The lexer runs over the whole input at once and produces a flat token
//! vector. Whitespace inside actions is not emitted as a token; instead every
//! token records whether whitespace preceded it, which is all the parser
//! needs to tell `$x.Field` (a chained access) from `$x .Field` (two
//! arguments).

use super::Delimiters;

const TRIM_MARKER: char = '-';

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Text(String),
    Comment(String),
    LeftDelim,
    RightDelim,
    Identifier(String),
    Keyword(Keyword),
    Field(String),
    Variable(String),
    Dot,
    Bool(bool),
    Nil,
    Int(i64),
    Float(f64),
    Str(String),
    Pipe,
    LeftParen,
    RightParen,
    Declare,
    Assign,
    Comma,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    End,
    Range,
    With,
    Break,
    Continue,
    Define,
    Template,
    Block,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        Some(match word {
            "if" => Self::If,
            "else" => Self::Else,
            "end" => Self::End,
            "range" => Self::Range,
            "with" => Self::With,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "define" => Self::Define,
            "template" => Self::Template,
            "block" => Self::Block,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub space_before: bool,
}

/// A lexing failure, reported with the line it happened on.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

pub struct Lexer<'a> {
    input: &'a str,
    delims: &'a Delimiters,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    trim_next_text: bool,
    paren_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, delims: &'a Delimiters) -> Self {
        Self {
            input,
            delims,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            trim_next_text: false,
            paren_depth: 0,
        }
    }

    /// Consumes the lexer, returning every token followed by a final `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.input.len() {
            self.lex_text()?;
        }
        self.emit(TokenKind::Eof, false);
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, LexError> {
        Err(LexError { line: self.line, message: message.into() })
    }

    fn emit(&mut self, kind: TokenKind, space_before: bool) {
        self.tokens.push(Token { kind, line: self.line, space_before });
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.input[self.pos..self.pos + len];
        self.line += consumed.matches('\n').count();
        self.pos += len;
    }

    fn lex_text(&mut self) -> Result<(), LexError> {
        let rest = self.rest();
        let (mut text, found) = match rest.find(&self.delims.left) {
            Some(idx) => (&rest[..idx], true),
            None => (rest, false),
        };
        let text_len = text.len();
        let left_trim = found && has_left_trim_marker(&rest[text_len + self.delims.left.len()..]);

        if std::mem::take(&mut self.trim_next_text) {
            text = text.trim_start();
        }
        if left_trim {
            text = text.trim_end();
        }
        if !text.is_empty() {
            let text = text.to_string();
            self.emit(TokenKind::Text(text), false);
        }
        self.advance(text_len);

        if found {
            self.lex_left_delim(left_trim)?;
        }
        Ok(())
    }

    fn lex_left_delim(&mut self, trimmed: bool) -> Result<(), LexError> {
        self.advance(self.delims.left.len());
        if trimmed {
            // marker plus the single whitespace character that follows it
            let ws = self.rest()[1..].chars().next().map_or(0, char::len_utf8);
            self.advance(1 + ws);
        }
        if self.rest().starts_with("/*") {
            return self.lex_comment();
        }
        self.emit(TokenKind::LeftDelim, false);
        self.paren_depth = 0;
        self.lex_inside_action()
    }

    fn lex_comment(&mut self) -> Result<(), LexError> {
        let Some(end) = self.rest().find("*/") else {
            return self.error("unclosed comment");
        };
        let body = self.rest()[2..end].to_string();
        self.advance(end + 2);
        let rest = self.rest();
        if let Some(after) = right_trim_marker_len(rest, &self.delims.right) {
            self.emit(TokenKind::Comment(body), false);
            self.advance(after);
            self.trim_next_text = true;
        } else if rest.starts_with(&self.delims.right) {
            self.emit(TokenKind::Comment(body), false);
            self.advance(self.delims.right.len());
        } else {
            return self.error("comment ends before closing delimiter");
        }
        Ok(())
    }

    fn lex_inside_action(&mut self) -> Result<(), LexError> {
        let mut space_before = false;
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return self.error("unclosed action");
            }
            if let Some(len) = right_trim_marker_len(rest, &self.delims.right) {
                self.finish_action()?;
                self.advance(len);
                self.trim_next_text = true;
                return Ok(());
            }
            if rest.starts_with(&self.delims.right) {
                self.finish_action()?;
                self.advance(self.delims.right.len());
                return Ok(());
            }

            let Some(c) = rest.chars().next() else {
                return self.error("unclosed action");
            };
            if c.is_whitespace() {
                self.advance(c.len_utf8());
                space_before = true;
                continue;
            }

            match c {
                '|' => self.single(TokenKind::Pipe, space_before),
                ',' => self.single(TokenKind::Comma, space_before),
                '=' => self.single(TokenKind::Assign, space_before),
                '(' => {
                    self.paren_depth += 1;
                    self.single(TokenKind::LeftParen, space_before);
                }
                ')' => {
                    if self.paren_depth == 0 {
                        return self.error("unexpected right paren");
                    }
                    self.paren_depth -= 1;
                    self.single(TokenKind::RightParen, space_before);
                }
                ':' => {
                    if !rest.starts_with(":=") {
                        return self.error("expected :=");
                    }
                    self.emit(TokenKind::Declare, space_before);
                    self.advance(2);
                }
                '"' => self.lex_quote(space_before)?,
                '`' => self.lex_raw_quote(space_before)?,
                '\'' => self.lex_char(space_before)?,
                '$' => {
                    let name_len = 1 + ident_len(&rest[1..]);
                    self.emit(TokenKind::Variable(rest[..name_len].to_string()), space_before);
                    self.advance(name_len);
                }
                '.' => {
                    let after = &rest[1..];
                    if after.starts_with(|c: char| c.is_ascii_digit()) {
                        self.lex_number(space_before)?;
                    } else {
                        let len = ident_len(after);
                        if len == 0 {
                            self.single(TokenKind::Dot, space_before);
                        } else {
                            self.emit(TokenKind::Field(after[..len].to_string()), space_before);
                            self.advance(1 + len);
                        }
                    }
                }
                '+' | '-' | '0'..='9' => self.lex_number(space_before)?,
                c if c == '_' || c.is_alphabetic() => {
                    let len = ident_len(rest);
                    let word = &rest[..len];
                    let kind = match word {
                        "true" => TokenKind::Bool(true),
                        "false" => TokenKind::Bool(false),
                        "nil" => TokenKind::Nil,
                        _ => match Keyword::lookup(word) {
                            Some(keyword) => TokenKind::Keyword(keyword),
                            None => TokenKind::Identifier(word.to_string()),
                        },
                    };
                    self.emit(kind, space_before);
                    self.advance(len);
                }
                other => return self.error(format!("unrecognized character in action: {other:?}")),
            }
            space_before = false;
        }
    }

    fn finish_action(&mut self) -> Result<(), LexError> {
        if self.paren_depth > 0 {
            return self.error("unclosed left paren");
        }
        self.emit(TokenKind::RightDelim, false);
        Ok(())
    }

    fn single(&mut self, kind: TokenKind, space_before: bool) {
        self.emit(kind, space_before);
        self.advance(1);
    }

    fn lex_quote(&mut self, space_before: bool) -> Result<(), LexError> {
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((idx, c)) = chars.next() {
            match c {
                '"' => {
                    self.emit(TokenKind::Str(value), space_before);
                    self.advance(idx + 1);
                    return Ok(());
                }
                '\n' => break,
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, '0')) => value.push('\0'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, '"')) => value.push('"'),
                    Some((_, '\'')) => value.push('\''),
                    Some((_, other)) => return self.error(format!("unknown escape sequence: \\{other}")),
                    None => break,
                },
                c => value.push(c),
            }
        }
        self.error("unterminated quoted string")
    }

    fn lex_raw_quote(&mut self, space_before: bool) -> Result<(), LexError> {
        let Some(end) = self.rest()[1..].find('`') else {
            return self.error("unterminated raw quoted string");
        };
        let value = self.rest()[1..end + 1].to_string();
        self.emit(TokenKind::Str(value), space_before);
        self.advance(end + 2);
        Ok(())
    }

    fn lex_char(&mut self, space_before: bool) -> Result<(), LexError> {
        let rest = self.rest();
        let mut chars = rest.char_indices().skip(1);
        let value = match chars.next() {
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => '\n',
                Some((_, 't')) => '\t',
                Some((_, '\\')) => '\\',
                Some((_, '\'')) => '\'',
                _ => return self.error("unterminated character constant"),
            },
            Some((_, '\'')) | Some((_, '\n')) | None => {
                return self.error("unterminated character constant")
            }
            Some((_, c)) => c,
        };
        match chars.next() {
            Some((idx, '\'')) => {
                self.emit(TokenKind::Int(i64::from(u32::from(value))), space_before);
                self.advance(idx + 1);
                Ok(())
            }
            _ => self.error("unterminated character constant"),
        }
    }

    fn lex_number(&mut self, space_before: bool) -> Result<(), LexError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(idx, c)| {
                !(c.is_ascii_alphanumeric()
                    || c == '.'
                    || c == '_'
                    || (idx == 0 && (c == '+' || c == '-'))
                    || ((c == '+' || c == '-') && matches!(rest[..idx].chars().last(), Some('e' | 'E'))))
            })
            .map_or(rest.len(), |(idx, _)| idx);
        let text = &rest[..len];
        let kind = match parse_number(text) {
            Some(kind) => kind,
            None => return self.error(format!("bad number syntax: {text:?}")),
        };
        self.emit(kind, space_before);
        self.advance(len);
        Ok(())
    }
}

fn has_left_trim_marker(after_delim: &str) -> bool {
    let mut chars = after_delim.chars();
    chars.next() == Some(TRIM_MARKER) && chars.next().is_some_and(char::is_whitespace)
}

/// Length of ` -<right delim>` at the start of `rest`, if present.
fn right_trim_marker_len(rest: &str, right: &str) -> Option<usize> {
    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    let after = &rest[ws.len_utf8()..];
    let after = after.strip_prefix(TRIM_MARKER)?;
    after
        .starts_with(right)
        .then(|| ws.len_utf8() + 1 + right.len())
}

fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !(c == '_' || c.is_alphanumeric()))
        .map_or(s.len(), |(idx, _)| idx)
}

fn parse_number(text: &str) -> Option<TokenKind> {
    let cleaned = text.replace('_', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|&(prefix, radix)| digits.strip_prefix(prefix).map(|d| (d, radix)));
    if let Some((body, radix)) = radix {
        let value = i64::from_str_radix(body, radix).ok()?;
        return Some(TokenKind::Int(if negative { -value } else { value }));
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(TokenKind::Int(value));
    }
    let value = cleaned.parse::<f64>().ok()?;
    if value.is_finite() && !digits.chars().all(char::is_alphabetic) {
        Some(TokenKind::Float(value))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input, &Delimiters::default())
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_text_only() {
        assert_eq!(kinds("plain"), vec![TokenKind::Text("plain".into()), TokenKind::Eof]);
    }

    #[test]
    fn test_field_chain_and_function() {
        assert_eq!(
            kinds("a{{ToUpper .Name.First}}"),
            vec![
                TokenKind::Text("a".into()),
                TokenKind::LeftDelim,
                TokenKind::Identifier("ToUpper".into()),
                TokenKind::Field("Name".into()),
                TokenKind::Field("First".into()),
                TokenKind::RightDelim,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_space_before_is_recorded() {
        let tokens = Lexer::new("{{$x.A $x .B}}", &Delimiters::default()).tokenize().unwrap();
        let spaces: Vec<bool> = tokens.iter().map(|t| t.space_before).collect();
        assert_eq!(spaces, vec![false, false, false, true, true, false, false]);
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(
            kinds("a  {{- 3 -}}\n  b"),
            vec![
                TokenKind::Text("a".into()),
                TokenKind::LeftDelim,
                TokenKind::Int(3),
                TokenKind::RightDelim,
                TokenKind::Text("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_negative_number_is_not_trim_marker() {
        assert_eq!(
            kinds("{{-3}}"),
            vec![TokenKind::LeftDelim, TokenKind::Int(-3), TokenKind::RightDelim, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            kinds("{{/* note */}}x"),
            vec![TokenKind::Comment(" note ".into()), TokenKind::Text("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds(r#"{{"a\n" `raw` 'x' 1.5 0x10 true nil}}"#),
            vec![
                TokenKind::LeftDelim,
                TokenKind::Str("a\n".into()),
                TokenKind::Str("raw".into()),
                TokenKind::Int(120),
                TokenKind::Float(1.5),
                TokenKind::Int(16),
                TokenKind::Bool(true),
                TokenKind::Nil,
                TokenKind::RightDelim,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_custom_delimiters() {
        let delims = Delimiters::new("<%", "%>");
        let tokens = Lexer::new("{{x}} <% .A %>", &delims).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Text("{{x}} ".into()));
        assert_eq!(tokens[2].kind, TokenKind::Field("A".into()));
    }

    #[test]
    fn test_unclosed_action() {
        let err = Lexer::new("line\n{{ .A", &Delimiters::default()).tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "unclosed action");
    }
}

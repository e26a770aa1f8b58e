//! Token types produced by the lexer.

use std::fmt;

use serde::Serialize;

use super::span::Span;

/// The closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    Colon,
    Comma,
    Period,
    Equal,
    Color,
    String,
    StringName,
    Number,
    Identifier,
    /// A whole `( ... )` argument list, split into literals.
    ConstructedArray,
    Error,
    EndOfInput,
}

impl TokenKind {
    /// Kinds a value can be read from directly.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::StringName
                | TokenKind::Color
                | TokenKind::Identifier
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::BracketOpen => "'['",
            TokenKind::BracketClose => "']'",
            TokenKind::BraceOpen => "'{'",
            TokenKind::BraceClose => "'}'",
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Period => "'.'",
            TokenKind::Equal => "'='",
            TokenKind::Color => "color",
            TokenKind::String => "string",
            TokenKind::StringName => "string name",
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::ConstructedArray => "argument list",
            TokenKind::Error => "invalid character",
            TokenKind::EndOfInput => "end of input",
        };
        f.write_str(s)
    }
}

/// One element of a parenthesized argument list.
///
/// Arguments are split on every comma without regard to quoting, so a
/// fragment such as `"a` is kept verbatim as [`Literal::Raw`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(String),
    Raw(String),
}

impl Literal {
    /// Classify one trimmed argument.
    pub fn classify(arg: &str) -> Self {
        if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
            return Literal::String(arg[1..arg.len() - 1].to_string());
        }
        match arg.parse::<f64>() {
            Ok(n) => Literal::Number(n),
            Err(_) => Literal::Raw(arg.to_string()),
        }
    }

    /// The string contents, for string literals.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) | Literal::Raw(s) => Some(s),
            Literal::Number(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Raw(s) => f.write_str(s),
        }
    }
}

/// Decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Number(f64),
    Bool(bool),
    Text(String),
    Arguments(Vec<Literal>),
}

/// A token with its decoded value, source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// The exact source text matched.
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, value: TokenValue, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value,
            text: text.into(),
            span,
        }
    }

    /// Line the token starts on.
    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    /// Whether the token starts in the first column of its line.
    pub fn at_line_start(&self) -> bool {
        self.span.start.column == 1
    }
}

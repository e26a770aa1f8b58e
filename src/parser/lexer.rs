//! Rule-ordered tokenizer for the scene text format.
//!
//! Rules are tried in declaration order at the current offset and the first
//! one that matches wins. Nothing scans ahead for a later match. Whitespace
//! and `;` comments are discarded; every other rule yields one token.
//!
//! The `( ... )` rule is a deliberate shortcut: the whole argument list
//! becomes a single [`TokenKind::ConstructedArray`] whose arguments are
//! split on every comma and classified as strings or numbers, with no
//! recursive tokenization. Nested parentheses and commas inside quoted
//! arguments are not special-cased.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SceneError};

use super::span::{Location, Span};
use super::token::{Literal, Token, TokenKind, TokenValue};

/// What a matched rule produces.
#[derive(Debug, Clone, Copy)]
enum Action {
    Skip,
    Arguments,
    Symbol,
    Color,
    Str,
    Number,
    Identifier,
    Error,
}

struct Rule {
    name: &'static str,
    pattern: Regex,
    action: Action,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, action: Action) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("lexer rule patterns are valid"),
            action,
        }
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("whitespace", r"^\s+", Action::Skip),
        Rule::new("comment", r"^;[^\n]*", Action::Skip),
        Rule::new("arguments", r"^\([^)]*\)?", Action::Arguments),
        Rule::new("structural", r"^[{}\[\]()]", Action::Symbol),
        Rule::new("punctuation", r"^[:,.=]", Action::Symbol),
        Rule::new("color", r"^#[0-9A-Fa-f]+", Action::Color),
        Rule::new("string", r#"(?s)^&?"(?:[^"\\]|\\.)*""#, Action::Str),
        Rule::new(
            "number",
            r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?",
            Action::Number,
        ),
        Rule::new("identifier", r"^[A-Za-z_][A-Za-z0-9_/]*", Action::Identifier),
        Rule::new("error", r"(?s)^.", Action::Error),
    ]
});

/// Saved lexer position for backtracking.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    cursor: Location,
    peeked: Option<Token>,
}

/// Tokenizer over one in-memory source text.
///
/// Each parse owns its own lexer; tokens are produced lazily with one token
/// of lookahead.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: Location,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    /// Lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Location::start(),
            peeked: None,
        }
    }

    /// The full text being tokenized.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Consume the next token, failing if it is not of the expected kind.
    ///
    /// A mismatched token is left in place.
    pub fn consume(&mut self, expected: TokenKind) -> Result<Token> {
        let token = self.next_token()?;
        if token.kind == expected {
            return Ok(token);
        }

        let err = SceneError::UnexpectedToken {
            expected,
            found: token.kind,
            location: token.span.start,
        };
        self.peeked = Some(token);
        Err(err)
    }

    /// Save the current position, including any peeked token.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            peeked: self.peeked.clone(),
        }
    }

    /// Rewind to a saved position. Tokens scanned since are scanned again.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.peeked = checkpoint.peeked;
    }

    /// Run the rules at the cursor until one produces a token.
    fn scan(&mut self) -> Result<Token> {
        loop {
            let rest = &self.source[self.cursor.offset..];
            if rest.is_empty() {
                let here = Span::new(self.cursor, self.cursor);
                return Ok(Token::new(TokenKind::EndOfInput, TokenValue::None, "", here));
            }

            let (rule, matched) = RULES
                .iter()
                .find_map(|rule| rule.pattern.find(rest).map(|m| (rule, m.as_str())))
                .ok_or_else(|| SceneError::Lex {
                    message: "No lexer rule matched".to_string(),
                    location: self.cursor,
                })?;

            let start = self.cursor;
            let end = start.advance(matched);
            let span = Span::new(start, end);

            let token = match rule.action {
                Action::Skip => None,
                Action::Arguments => Some(arguments_token(matched, span)?),
                Action::Symbol => Some(symbol_token(matched, span)),
                Action::Color => Some(Token::new(
                    TokenKind::Color,
                    TokenValue::Text(matched.to_string()),
                    matched,
                    span,
                )),
                Action::Str => Some(string_token(matched, span)),
                Action::Number => Some(number_token(matched, span)),
                Action::Identifier => Some(identifier_token(matched, span)),
                Action::Error => Some(Token::new(
                    TokenKind::Error,
                    TokenValue::Text(format!("Unexpected character '{}'", matched)),
                    matched,
                    span,
                )),
            };

            self.cursor = end;
            if let Some(token) = token {
                tracing::trace!(rule = rule.name, kind = ?token.kind, at = %start, "token");
                return Ok(token);
            }
        }
    }
}

/// Tokenize a whole text, including the trailing end-of-input token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::EndOfInput;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn arguments_token(matched: &str, span: Span) -> Result<Token> {
    let inner = matched
        .strip_prefix('(')
        .and_then(|m| m.strip_suffix(')'))
        .ok_or_else(|| SceneError::Lex {
            message: "Unterminated argument list".to_string(),
            location: span.start,
        })?;

    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(|arg| Literal::classify(arg.trim())).collect()
    };

    Ok(Token::new(
        TokenKind::ConstructedArray,
        TokenValue::Arguments(args),
        matched,
        span,
    ))
}

fn symbol_token(matched: &str, span: Span) -> Token {
    let kind = match matched {
        "{" => TokenKind::BraceOpen,
        "}" => TokenKind::BraceClose,
        "[" => TokenKind::BracketOpen,
        "]" => TokenKind::BracketClose,
        "(" => TokenKind::ParenOpen,
        ")" => TokenKind::ParenClose,
        ":" => TokenKind::Colon,
        "," => TokenKind::Comma,
        "." => TokenKind::Period,
        _ => TokenKind::Equal,
    };
    Token::new(kind, TokenValue::None, matched, span)
}

fn string_token(matched: &str, span: Span) -> Token {
    let (kind, quoted) = match matched.strip_prefix('&') {
        Some(rest) => (TokenKind::StringName, rest),
        None => (TokenKind::String, matched),
    };
    let body = &quoted[1..quoted.len() - 1];

    Token::new(kind, TokenValue::Text(unescape(body)), matched, span)
}

fn number_token(matched: &str, span: Span) -> Token {
    // The rule only matches ASCII float syntax, all of which `f64` accepts.
    let value = matched.parse::<f64>().unwrap_or(f64::NAN);
    Token::new(TokenKind::Number, TokenValue::Number(value), matched, span)
}

fn identifier_token(matched: &str, span: Span) -> Token {
    let value = match matched {
        "true" => TokenValue::Bool(true),
        "false" => TokenValue::Bool(false),
        other => TokenValue::Text(other.to_string()),
    };
    Token::new(TokenKind::Identifier, value, matched, span)
}

/// Decode backslash escapes inside a quoted string.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

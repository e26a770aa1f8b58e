use miette::Diagnostic;
use thiserror::Error;

use crate::parser::span::Location;
use crate::parser::token::TokenKind;

/// Main error type for scene parsing and the tools around it
#[derive(Error, Diagnostic, Debug)]
pub enum SceneError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(tscn::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Lex error at {location}: {message}")]
    #[diagnostic(code(tscn::lex))]
    Lex { message: String, location: Location },

    #[error("Unexpected token at {location}: expected {expected}, found {found}")]
    #[diagnostic(code(tscn::parse::unexpected_token))]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        location: Location,
    },

    #[error("Unexpected token at {location}: expected a value, found {found}")]
    #[diagnostic(code(tscn::parse::expected_value))]
    ExpectedValue { found: TokenKind, location: Location },

    #[error("Unresolved {kind} reference \"{id}\" on line {line}")]
    #[diagnostic(
        code(tscn::parse::unresolved_reference),
        help("Declare the resource before the section that uses it")
    )]
    UnresolvedReference {
        kind: &'static str,
        id: String,
        line: u32,
    },

    #[error("Duplicate node path \"{path}\" on line {line}")]
    #[diagnostic(code(tscn::parse::duplicate_node))]
    DuplicateNode { path: String, line: u32 },

    #[error("Node \"{path}\" on line {line} references unknown parent \"{parent}\"")]
    #[diagnostic(
        code(tscn::parse::orphan_node),
        help("Parents must be declared before their children")
    )]
    OrphanNode {
        path: String,
        parent: String,
        line: u32,
    },

    #[error("Value nesting deeper than {limit} at {location}")]
    #[diagnostic(code(tscn::parse::depth))]
    DepthExceeded { limit: usize, location: Location },

    #[error("Failed to serialize scene: {0}")]
    #[diagnostic(code(tscn::export))]
    Export(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(tscn::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Check failed: {message}")]
    #[diagnostic(code(tscn::check))]
    Check {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl SceneError {
    /// Source position of the error, when it came from the token stream.
    pub fn location(&self) -> Option<Location> {
        match self {
            SceneError::Lex { location, .. }
            | SceneError::UnexpectedToken { location, .. }
            | SceneError::ExpectedValue { location, .. }
            | SceneError::DepthExceeded { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Whether a value parser may backtrack past this error and try another alternative.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SceneError::UnexpectedToken { .. } | SceneError::ExpectedValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;

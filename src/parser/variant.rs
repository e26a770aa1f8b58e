//! Recursive-descent parser for property values.
//!
//! A value is one of four productions, tried in order: a constructor call
//! (`Vector2(1, 2)`), a primitive token, an array, or a dictionary. Each
//! attempt starts from a lexer checkpoint and restores it on failure, so a
//! failed alternative never leaves tokens consumed. When every alternative
//! fails, the error that got furthest into the input is reported.

use crate::error::{Result, SceneError};

use super::lexer::Lexer;
use super::token::{Literal, Token, TokenKind, TokenValue};
use super::value::{NodeProperty, PropertyValue, ReferenceKind, Value};

/// Default limit on array/dictionary nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

type Production<'a> = fn(&mut Parser<'a>) -> Result<PropertyValue>;

/// Value and tag parser over an owned lexer.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser with the default nesting limit.
    pub fn new(source: &'a str) -> Self {
        Self::with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Create a parser that rejects values nested deeper than `max_depth`.
    pub fn with_max_depth(source: &'a str, max_depth: usize) -> Self {
        Self {
            lexer: Lexer::new(source),
            depth: 0,
            max_depth,
        }
    }

    /// The underlying lexer, for token-level lookahead.
    pub fn lexer(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    /// Parse `identifier = value`.
    pub fn parse_property(&mut self) -> Result<NodeProperty> {
        let name = self.lexer.consume(TokenKind::Identifier)?;
        self.lexer.consume(TokenKind::Equal)?;
        let value = self.parse_value()?;

        let mut property = NodeProperty::named(name.text, value);
        property.line = name.span.start.line;
        Ok(property)
    }

    /// Parse one value of any kind.
    pub fn parse_value(&mut self) -> Result<PropertyValue> {
        if self.depth >= self.max_depth {
            let location = self.lexer.peek()?.span.start;
            return Err(SceneError::DepthExceeded {
                limit: self.max_depth,
                location,
            });
        }

        self.depth += 1;
        let result = self.parse_alternatives();
        self.depth -= 1;
        result
    }

    fn parse_alternatives(&mut self) -> Result<PropertyValue> {
        let alternatives: [Production<'a>; 4] = [
            Self::parse_construct,
            Self::parse_primitive,
            Self::parse_array,
            Self::parse_dictionary,
        ];

        let (found, start) = {
            let token = self.lexer.peek()?;
            (token.kind, token.span.start)
        };
        let mut furthest: Option<SceneError> = None;

        for production in alternatives {
            let saved = self.lexer.checkpoint();
            match production(self) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_recoverable() => {
                    self.lexer.restore(saved);
                    furthest = Some(match furthest {
                        Some(best) if offset_of(&best) >= offset_of(&err) => best,
                        _ => err,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        // An error at the first token means no value starts here
        Err(match furthest {
            Some(err) if offset_of(&err) > start.offset => err,
            _ => SceneError::ExpectedValue {
                found,
                location: start,
            },
        })
    }

    /// `Name(args...)`, with resource references singled out.
    fn parse_construct(&mut self) -> Result<PropertyValue> {
        let name = self.lexer.consume(TokenKind::Identifier)?;
        let args_token = self.lexer.consume(TokenKind::ConstructedArray)?;

        let args = match args_token.value {
            TokenValue::Arguments(args) => args,
            _ => Vec::new(),
        };
        let text = format!("{}{}", name.text, args_token.text);

        let reference = match (ReferenceKind::from_constructor(&name.text), args.as_slice()) {
            (Some(kind), [Literal::String(id)]) => Some((kind, id.clone())),
            _ => None,
        };
        let value = match reference {
            Some((kind, id)) => Value::Reference { kind, id },
            None => Value::Construct {
                name: name.text.clone(),
                args,
            },
        };

        Ok(PropertyValue::new(value, text, name.line()))
    }

    fn parse_primitive(&mut self) -> Result<PropertyValue> {
        let token = self.lexer.peek()?;
        if !token.kind.is_primitive() {
            return Err(SceneError::UnexpectedToken {
                expected: TokenKind::Number,
                found: token.kind,
                location: token.span.start,
            });
        }

        let token = self.lexer.next_token()?;
        Ok(primitive_value(token))
    }

    fn parse_array(&mut self) -> Result<PropertyValue> {
        let open = self.lexer.consume(TokenKind::BracketOpen)?;
        let mut items = Vec::new();

        loop {
            match self.lexer.peek()?.kind {
                TokenKind::BracketClose => {
                    self.lexer.next_token()?;
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next_token()?;
                }
                _ => items.push(self.parse_value()?),
            }
        }

        let text = format!(
            "[{}]",
            items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(PropertyValue::new(Value::Array(items), text, open.line()))
    }

    fn parse_dictionary(&mut self) -> Result<PropertyValue> {
        let open = self.lexer.consume(TokenKind::BraceOpen)?;
        let mut entries = Vec::new();

        loop {
            match self.lexer.peek()?.kind {
                TokenKind::BraceClose => {
                    self.lexer.next_token()?;
                    break;
                }
                TokenKind::Comma => {
                    self.lexer.next_token()?;
                }
                _ => {
                    let key = self.parse_primitive()?;
                    self.lexer.consume(TokenKind::Colon)?;
                    let value = self.parse_value()?;
                    entries.push((key, value));
                }
            }
        }

        let text = format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(k, v)| format!("{}: {}", k.text, v.text))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(PropertyValue::new(Value::Dictionary(entries), text, open.line()))
    }
}

fn primitive_value(token: Token) -> PropertyValue {
    let line = token.line();
    let value = match (token.kind, token.value) {
        (TokenKind::Number, TokenValue::Number(n)) => Value::Number(n),
        (TokenKind::Identifier, TokenValue::Bool(b)) => Value::Bool(b),
        (TokenKind::Identifier, TokenValue::Text(s)) => Value::Identifier(s),
        (TokenKind::String, TokenValue::Text(s)) => Value::String(s),
        (TokenKind::StringName, TokenValue::Text(s)) => Value::StringName(s),
        (TokenKind::Color, TokenValue::Text(s)) => Value::Color(s),
        _ => Value::Identifier(token.text.clone()),
    };
    PropertyValue::new(value, token.text, line)
}

fn offset_of(err: &SceneError) -> usize {
    err.location().map(|l| l.offset).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::span::Location;
    use crate::parser::value::ValueKind;

    fn value(source: &str) -> PropertyValue {
        Parser::new(source).parse_value().unwrap()
    }

    #[test]
    fn test_primitives() {
        assert_eq!(value("1.5").value, Value::Number(1.5));
        assert_eq!(value("\"hi\"").value, Value::String("hi".to_string()));
        assert_eq!(value("&\"hi\"").value, Value::StringName("hi".to_string()));
        assert_eq!(value("#ffffff").value, Value::Color("#ffffff".to_string()));
        assert_eq!(value("true").value, Value::Bool(true));
        assert_eq!(value("null").value, Value::Identifier("null".to_string()));
    }

    #[test]
    fn test_primitive_keeps_source_text() {
        let v = value("&\"walk\"");
        assert_eq!(v.text, "&\"walk\"");
        assert_eq!(v.line, 1);
    }

    #[test]
    fn test_construct() {
        let v = value("Vector2(16, -8.5)");

        assert_eq!(
            v.value,
            Value::Construct {
                name: "Vector2".to_string(),
                args: vec![Literal::Number(16.0), Literal::Number(-8.5)],
            }
        );
        assert_eq!(v.text, "Vector2(16, -8.5)");
    }

    #[test]
    fn test_resource_references() {
        assert_eq!(
            value("ExtResource(\"1_abc\")").value,
            Value::Reference {
                kind: ReferenceKind::External,
                id: "1_abc".to_string(),
            }
        );
        assert_eq!(
            value("SubResource(\"Shape_x\")").value,
            Value::Reference {
                kind: ReferenceKind::Sub,
                id: "Shape_x".to_string(),
            }
        );
    }

    #[test]
    fn test_numeric_resource_id_stays_construct() {
        // Pre-4.0 files use bare integer ids
        let v = value("ExtResource( 2 )");
        assert_eq!(v.kind(), ValueKind::Construct);
        assert_eq!(v.value.reference_id().as_deref(), Some("2"));
    }

    #[test]
    fn test_array_preserves_order() {
        let v = value("[3, \"b\", 1]");

        match &v.value {
            Value::Array(items) => {
                let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
                assert_eq!(texts, vec!["3", "\"b\"", "1"]);
            }
            other => panic!("expected array, got {other:?}"),
        }
        assert_eq!(v.text, "[3, \"b\", 1]");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(value("[]").value, Value::Array(vec![]));
        assert_eq!(value("{}").value, Value::Dictionary(vec![]));
        assert_eq!(value("[ ]").text, "[]");
    }

    #[test]
    fn test_dictionary() {
        let v = value("{\n\"a\": 1,\n\"b\": [true]\n}");

        match &v.value {
            Value::Dictionary(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0.value, Value::String("a".to_string()));
                assert_eq!(entries[1].1.kind(), ValueKind::Array);
            }
            other => panic!("expected dictionary, got {other:?}"),
        }
        assert_eq!(v.text, "{\"a\": 1, \"b\": [true]}");
    }

    #[test]
    fn test_dictionary_rejects_container_key() {
        let result = Parser::new("{[1]: 2}").parse_value();
        assert!(matches!(result, Err(SceneError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_nested_arrays() {
        let v = value("[[1, [2]], []]");
        assert_eq!(v.text, "[[1, [2]], []]");
    }

    #[test]
    fn test_constructs_inside_array() {
        let v = value("[Vector2(0, 0), Color(1, 1, 1, 1)]");

        match v.value {
            Value::Array(items) => {
                assert!(items.iter().all(|i| i.kind() == ValueKind::Construct));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let source = "[".repeat(10) + &"]".repeat(10);

        let ok = Parser::with_max_depth(&source, 10).parse_value();
        assert!(ok.is_ok());

        let err = Parser::with_max_depth(&source, 9).parse_value().unwrap_err();
        assert!(matches!(err, SceneError::DepthExceeded { limit: 9, .. }));
    }

    #[test]
    fn test_unclosed_array_reports_end_of_input() {
        let err = Parser::new("[1, 2").parse_value().unwrap_err();

        match err {
            SceneError::ExpectedValue { found, location } => {
                assert_eq!(found, TokenKind::EndOfInput);
                assert_eq!(location, Location::new(5, 1, 6));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_value_restores_position() {
        let mut parser = Parser::new("] x");
        assert!(parser.parse_value().is_err());
        assert_eq!(parser.lexer().peek().unwrap().kind, TokenKind::BracketClose);
    }

    #[test]
    fn test_error_token_fails_value() {
        let err = Parser::new("@").parse_value().unwrap_err();
        assert!(matches!(
            err,
            SceneError::ExpectedValue {
                found: TokenKind::Error,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_value_names_a_value() {
        let err = Parser::new("  ]").parse_value().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unexpected token at 1:3: expected a value, found ']'"
        );
        assert_eq!(err.location(), Some(Location::new(2, 1, 3)));
    }

    #[test]
    fn test_nested_missing_value_keeps_inner_location() {
        let err = Parser::new("[1 @]").parse_value().unwrap_err();
        assert!(matches!(
            err,
            SceneError::ExpectedValue {
                found: TokenKind::Error,
                location: Location { offset: 3, .. },
            }
        ));
    }

    #[test]
    fn test_property() {
        let prop = Parser::new("position = Vector2(1, 2)").parse_property().unwrap();

        assert_eq!(prop.name.as_deref(), Some("position"));
        assert_eq!(prop.kind, ValueKind::Construct);
        assert_eq!(prop.text, "position = Vector2(1, 2)");
    }

    #[test]
    fn test_property_missing_equal() {
        let err = Parser::new("position Vector2(1, 2)").parse_property().unwrap_err();
        assert!(matches!(
            err,
            SceneError::UnexpectedToken {
                expected: TokenKind::Equal,
                ..
            }
        ));
    }
}

//! Section header parsing: `[node name="Player" type="CharacterBody2D"]`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, SceneError};

use super::token::TokenKind;
use super::value::PropertyValue;
use super::variant::Parser;

/// A bracket-delimited section header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    /// Tag name, including a `:`/`.` suffix when present.
    pub name: String,
    pub fields: BTreeMap<String, PropertyValue>,
    /// Header rebuilt from its parts.
    pub text: String,
    pub line: u32,
    /// Byte offset of the opening bracket.
    pub position: usize,
}

impl Tag {
    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }

    /// A field as plain text (strings verbatim, integral numbers without a fraction).
    pub fn field_str(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|v| v.value.to_key())
    }
}

impl<'a> Parser<'a> {
    /// Parse a header from `[` through the matching `]`.
    pub fn parse_tag(&mut self) -> Result<Tag> {
        let open = self.lexer().consume(TokenKind::BracketOpen)?;
        let mut name = self.lexer().consume(TokenKind::Identifier)?.text;

        if matches!(
            self.lexer().peek()?.kind,
            TokenKind::Colon | TokenKind::Period
        ) {
            let punct = self.lexer().next_token()?;
            let suffix = self.lexer().consume(TokenKind::Identifier)?;
            name.push_str(&punct.text);
            name.push_str(&suffix.text);
        }

        let mut fields = BTreeMap::new();
        let mut parts = vec![name.clone()];

        loop {
            let next = self.lexer().peek()?;
            match next.kind {
                TokenKind::BracketClose => {
                    self.lexer().next_token()?;
                    break;
                }
                TokenKind::EndOfInput => {
                    return Err(SceneError::UnexpectedToken {
                        expected: TokenKind::BracketClose,
                        found: TokenKind::EndOfInput,
                        location: next.span.start,
                    });
                }
                _ => {
                    let key = self.lexer().consume(TokenKind::Identifier)?;
                    self.lexer().consume(TokenKind::Equal)?;
                    let value = self.parse_value()?;
                    parts.push(format!("{}={}", key.text, value.text));
                    fields.insert(key.text, value);
                }
            }
        }

        Ok(Tag {
            name,
            fields,
            text: format!("[{}]", parts.join(" ")),
            line: open.span.start.line,
            position: open.span.start.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::span::Location;
    use crate::parser::value::Value;

    fn tag(source: &str) -> Tag {
        Parser::new(source).parse_tag().unwrap()
    }

    #[test]
    fn test_bare_tag() {
        let t = tag("[editable]");

        assert_eq!(t.name, "editable");
        assert!(t.fields.is_empty());
        assert_eq!(t.text, "[editable]");
    }

    #[test]
    fn test_tag_fields() {
        let t = tag(r#"[ext_resource type="Script" uid="uid://b1" path="res://p.gd" id="1_x"]"#);

        assert_eq!(t.name, "ext_resource");
        assert_eq!(t.field_str("type").as_deref(), Some("Script"));
        assert_eq!(t.field_str("path").as_deref(), Some("res://p.gd"));
        assert_eq!(t.field_str("id").as_deref(), Some("1_x"));
        assert_eq!(t.line, 1);
        assert_eq!(t.position, 0);
    }

    #[test]
    fn test_numeric_id() {
        let t = tag("[ext_resource path=\"res://a.png\" type=\"Texture\" id=1]");
        assert_eq!(t.field_str("id").as_deref(), Some("1"));
    }

    #[test]
    fn test_compound_tag_name() {
        assert_eq!(tag("[gd_resource:Theme]").name, "gd_resource:Theme");
        assert_eq!(tag("[a.b x=1]").name, "a.b");
    }

    #[test]
    fn test_text_round_trips_fields() {
        let t = tag(r#"[node name="Sprite"   parent="."  groups=["a", "b"] instance=ExtResource("2")]"#);
        let again = tag(&t.text);

        assert_eq!(again.name, t.name);
        assert_eq!(
            again.fields.iter().map(|(k, v)| (k, &v.value)).collect::<Vec<_>>(),
            t.fields.iter().map(|(k, v)| (k, &v.value)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_field_values_are_typed() {
        let t = tag("[node name=\"A\" index=\"3\" unique_id=12 owner=true]");

        assert_eq!(t.field("unique_id").unwrap().value, Value::Number(12.0));
        assert_eq!(t.field("owner").unwrap().value, Value::Bool(true));
    }

    #[test]
    fn test_unclosed_tag_fails_at_end_of_input() {
        let err = Parser::new("[node name=\"A\"").parse_tag().unwrap_err();

        match err {
            SceneError::UnexpectedToken {
                expected, found, ..
            } => {
                assert_eq!(expected, TokenKind::BracketClose);
                assert_eq!(found, TokenKind::EndOfInput);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_value_points_at_bracket() {
        let err = Parser::new("[node name=]").parse_tag().unwrap_err();

        match err {
            SceneError::ExpectedValue { found, location } => {
                assert_eq!(found, TokenKind::BracketClose);
                assert_eq!(location, Location::new(11, 1, 12));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

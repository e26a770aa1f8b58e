//! Typed property values.

use std::fmt;

use serde::Serialize;

use super::token::Literal;

/// Which resource table a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    External,
    Sub,
}

impl ReferenceKind {
    /// Map a constructor name to a reference kind.
    pub fn from_constructor(name: &str) -> Option<Self> {
        match name {
            "ExtResource" => Some(ReferenceKind::External),
            "SubResource" => Some(ReferenceKind::Sub),
            _ => None,
        }
    }

    /// Lowercase name used in output.
    pub fn name(self) -> &'static str {
        match self {
            ReferenceKind::External => "external",
            ReferenceKind::Sub => "sub",
        }
    }
}

/// A parsed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Number(f64),
    String(String),
    StringName(String),
    Bool(bool),
    /// Raw `#rrggbb` text.
    Color(String),
    Identifier(String),
    Array(Vec<PropertyValue>),
    /// Entries in source order; keys are always primitive.
    Dictionary(Vec<(PropertyValue, PropertyValue)>),
    /// `Name(args...)` with the argument list as split by the lexer.
    Construct { name: String, args: Vec<Literal> },
    /// `ExtResource("id")` or `SubResource("id")`.
    Reference { kind: ReferenceKind, id: String },
}

/// The variant name of a [`Value`], for display and property typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Number,
    String,
    StringName,
    Bool,
    Color,
    Identifier,
    Array,
    Dictionary,
    Construct,
    Reference,
}

impl ValueKind {
    /// Lowercase name used in output.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::StringName => "string_name",
            ValueKind::Bool => "bool",
            ValueKind::Color => "color",
            ValueKind::Identifier => "identifier",
            ValueKind::Array => "array",
            ValueKind::Dictionary => "dictionary",
            ValueKind::Construct => "construct",
            ValueKind::Reference => "reference",
        }
    }

    /// Kinds allowed as dictionary keys.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ValueKind::Number
                | ValueKind::String
                | ValueKind::StringName
                | ValueKind::Bool
                | ValueKind::Color
                | ValueKind::Identifier
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Which kind of value this is.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::StringName(_) => ValueKind::StringName,
            Value::Bool(_) => ValueKind::Bool,
            Value::Color(_) => ValueKind::Color,
            Value::Identifier(_) => ValueKind::Identifier,
            Value::Array(_) => ValueKind::Array,
            Value::Dictionary(_) => ValueKind::Dictionary,
            Value::Construct { .. } => ValueKind::Construct,
            Value::Reference { .. } => ValueKind::Reference,
        }
    }

    /// Text of string-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::StringName(s) | Value::Identifier(s) | Value::Color(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    /// The boolean, for `true`/`false` values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, for numeric values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The id a value refers to: the id of a resource reference, or the
    /// first argument of any other constructor call.
    pub fn reference_id(&self) -> Option<String> {
        match self {
            Value::Reference { id, .. } => Some(id.clone()),
            Value::Construct { args, .. } => match args.first()? {
                Literal::Number(n) => Some(format_number(*n)),
                Literal::String(s) | Literal::Raw(s) => Some(s.clone()),
            },
            _ => None,
        }
    }

    /// String form used for ids and keys: strings as-is, integral numbers
    /// without a fraction.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            other => other.as_str().map(str::to_string),
        }
    }
}

/// A value together with the source text it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    #[serde(flatten)]
    pub value: Value,
    /// Source-equivalent text (whitespace normalized for containers).
    pub text: String,
    pub line: u32,
}

impl PropertyValue {
    /// Create a value with its source text and line.
    pub fn new(value: Value, text: impl Into<String>, line: u32) -> Self {
        Self {
            value,
            text: text.into(),
            line,
        }
    }

    /// Which kind of value this is.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One `name = value` line, or an unnamed element of a container value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProperty {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: PropertyValue,
    pub text: String,
    pub line: u32,
}

impl NodeProperty {
    /// Create a `name = value` property.
    pub fn named(name: impl Into<String>, value: PropertyValue) -> Self {
        let name = name.into();
        Self {
            kind: value.kind(),
            text: format!("{} = {}", name, value.text),
            line: value.line,
            name: Some(name),
            value,
        }
    }

    /// Create a nameless property for an array element.
    pub fn element(value: PropertyValue) -> Self {
        Self {
            kind: value.kind(),
            name: None,
            text: value.text.clone(),
            line: value.line,
            value,
        }
    }

    /// Unnamed properties for the elements of an array, or the values of a
    /// dictionary. Empty for every other kind.
    pub fn elements(&self) -> Vec<NodeProperty> {
        match &self.value.value {
            Value::Array(items) => items.iter().cloned().map(NodeProperty::element).collect(),
            Value::Dictionary(entries) => entries
                .iter()
                .map(|(_, v)| NodeProperty::element(v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Format a number the way ids are written: `3` rather than `3.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

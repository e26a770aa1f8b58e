//! Tokenizer and grammar for the text scene format.
//!
//! The format is a sequence of bracketed section headers, each followed by
//! `name = value` property lines:
//!
//! ```text
//! [gd_scene load_steps=3 format=3 uid="uid://c4m1"]
//!
//! [ext_resource type="Script" path="res://player.gd" id="1_k2p"]
//!
//! [node name="Player" type="CharacterBody2D"]
//! script = ExtResource("1_k2p")
//! position = Vector2(64, 32)
//! ```
//!
//! Nothing in this module knows what a node or resource is. The
//! [`crate::scene`] builder drives the parser and gives the tags meaning.
//!
//! # Usage
//!
//! ```ignore
//! use tscn::parser::Parser;
//!
//! let mut parser = Parser::new("[node name=\"Root\"]\nvisible = false");
//! let tag = parser.parse_tag()?;
//! let property = parser.parse_property()?;
//! ```

pub mod lexer;
pub mod span;
pub mod tag;
pub mod token;
pub mod value;
pub mod variant;

pub use lexer::{tokenize, Checkpoint, Lexer};
pub use span::{Location, Span};
pub use tag::Tag;
pub use token::{Literal, Token, TokenKind, TokenValue};
pub use value::{NodeProperty, PropertyValue, ReferenceKind, Value, ValueKind};
pub use variant::{Parser, DEFAULT_MAX_DEPTH};

//! Parse-time errors.
//!
//! These never abort a parse. They are collected in order and returned as
//! part of the [`ParseResult`](crate::ParseResult).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::ResultId;
use crate::token::Token;

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// An option- or command-shaped token that matched nothing in scope.
    UnrecognizedToken,
    /// Too few or too many tokens bound to a symbol, or a missing required
    /// option or argument.
    Arity,
    /// A token could not be converted to the declared value type.
    Conversion,
    /// Reported by a validator.
    Validation,
    /// An exclusive option combined with other input.
    Exclusive,
    /// The deepest command has subcommands but no handler.
    RequiredCommand,
    /// An unterminated quote.
    Quote,
    /// A response file that could not be expanded.
    ResponseFile,
}

/// One problem found while parsing.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Result node the error is attached to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultId>,
    /// Offending token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            result: None,
            token: None,
        }
    }

    pub(crate) fn at(mut self, result: ResultId) -> Self {
        self.result = Some(result);
        self
    }

    pub(crate) fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub(crate) fn quote(remainder: &str) -> Self {
        Self::new(
            ParseErrorKind::Quote,
            format!("Unterminated quote in input: '{remainder}'."),
        )
    }

    pub(crate) fn unrecognized(token: &Token) -> Self {
        Self::new(
            ParseErrorKind::UnrecognizedToken,
            format!("Unrecognized command or argument '{}'.", token.value),
        )
        .with_token(token.clone())
    }
}

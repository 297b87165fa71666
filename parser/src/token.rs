//! Classified input tokens.

use std::fmt;

use command_line_core::SymbolId;
use serde::{Deserialize, Serialize};

/// How the tokenizer classified a piece of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Command,
    Option,
    Argument,
    Directive,
    /// The `--` separator.
    DoubleDash,
    /// An `@file` reference that could not be expanded.
    ResponseFile,
    /// Remainder of an unterminated quote.
    Unparsed,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Command => "command",
            Self::Option => "option",
            Self::Argument => "argument",
            Self::Directive => "directive",
            Self::DoubleDash => "double_dash",
            Self::ResponseFile => "response_file",
            Self::Unparsed => "unparsed",
        };
        f.write_str(s)
    }
}

/// One classified token.
///
/// `symbol` is the command or option a `Command`/`Option` token resolved to.
/// On an `Argument` token it names the option the value is forced onto,
/// either because it was split from `-x:value` or bundled `-ovalue`, or
/// because it would otherwise have been read as a subcommand while that
/// option still needed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
    /// Index of the token in the full token list.
    pub position: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, position: usize) -> Self {
        Self {
            value: value.into(),
            kind,
            symbol: None,
            position,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.kind)
    }
}

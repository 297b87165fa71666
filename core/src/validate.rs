//! Construction-time validation of symbol declarations.
//!
//! Every mutation of a [`SymbolTree`](crate::SymbolTree) goes through these
//! checks before anything is inserted, so a failed call leaves the tree as it
//! was. Parse-time problems are never reported here; they are collected into
//! the parse result instead.
//!
//! # Examples
//!
//! ```
//! use command_line_core::*;
//!
//! assert!(validate_aliases(&["-v", "--verbose"]).is_ok());
//! assert_eq!(validate_aliases::<&str>(&[]), Err(SymbolError::NoAliases));
//! assert_eq!(
//!     validate_alias("--dry run"),
//!     Err(SymbolError::WhitespaceAlias("--dry run".to_string()))
//! );
//! ```

use thiserror::Error;

/// Symbol tree construction errors.
///
/// Each variant describes a declaration that cannot be part of a usable
/// tree. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// A symbol was declared without any alias.
    #[error("a symbol must declare at least one alias")]
    NoAliases,
    /// An alias is the empty string.
    #[error("alias cannot be empty")]
    EmptyAlias,
    /// An alias is whitespace-only or contains whitespace.
    #[error("alias cannot contain whitespace: {0:?}")]
    WhitespaceAlias(String),
    /// Two siblings under the same command share an alias.
    #[error("duplicate alias '{alias}' under command '{command}'")]
    DuplicateAlias { alias: String, command: String },
    /// An arity whose minimum exceeds its maximum.
    #[error("invalid arity: minimum {minimum} exceeds maximum {maximum}")]
    InvalidArity { minimum: usize, maximum: usize },
    /// A symbol id that does not belong to this tree.
    #[error("unknown symbol id: {0}")]
    UnknownSymbol(usize),
    /// A symbol that should be a command is not.
    #[error("symbol '{0}' is not a command")]
    NotACommand(String),
    /// Arguments are addressed by name only.
    #[error("argument '{0}' does not accept aliases")]
    AliasNotSupported(String),
    /// Attaching a command would make it its own ancestor.
    #[error("subcommand cycle detected at path: {0}")]
    SubcommandCycle(String),
}

/// Validates a single alias.
///
/// # Errors
///
/// Returns [`SymbolError::EmptyAlias`] for `""` and
/// [`SymbolError::WhitespaceAlias`] when the alias is blank or contains any
/// whitespace character.
pub fn validate_alias(alias: &str) -> Result<(), SymbolError> {
    if alias.is_empty() {
        return Err(SymbolError::EmptyAlias);
    }
    if alias.chars().any(char::is_whitespace) {
        return Err(SymbolError::WhitespaceAlias(alias.to_string()));
    }
    Ok(())
}

/// Validates an alias list: non-empty, every alias well-formed.
///
/// # Errors
///
/// Returns [`SymbolError::NoAliases`] for an empty list, otherwise the first
/// error reported by [`validate_alias`].
pub fn validate_aliases<S: AsRef<str>>(aliases: &[S]) -> Result<(), SymbolError> {
    if aliases.is_empty() {
        return Err(SymbolError::NoAliases);
    }
    aliases.iter().try_for_each(|a| validate_alias(a.as_ref()))
}

/// Strips a leading option prefix (`--`, `-` or `/`) from an alias.
///
/// # Examples
///
/// ```
/// use command_line_core::strip_prefix;
///
/// assert_eq!(strip_prefix("--verbose"), "verbose");
/// assert_eq!(strip_prefix("-v"), "v");
/// assert_eq!(strip_prefix("/help"), "help");
/// assert_eq!(strip_prefix("build"), "build");
/// ```
pub fn strip_prefix(alias: &str) -> &str {
    alias
        .strip_prefix("--")
        .or_else(|| alias.strip_prefix('-'))
        .or_else(|| alias.strip_prefix('/'))
        .unwrap_or(alias)
}

/// Picks the display name for an option: the longest alias after prefix
/// stripping, earliest alias on ties.
pub(crate) fn longest_stripped(aliases: &[String]) -> String {
    let mut best = "";
    for alias in aliases {
        let stripped = strip_prefix(alias);
        if stripped.len() > best.len() {
            best = stripped;
        }
    }
    best.to_string()
}

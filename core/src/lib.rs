//! Symbol tree and value model for command-line parsing.
//!
//! This crate defines what a command line *may* contain:
//!
//! - [`SymbolTree`]: an arena of commands, options and positional arguments
//!   addressed by [`SymbolId`], with multi-parent attachment and a lazy
//!   depth-first [`walk`](SymbolTree::walk).
//! - [`Arity`]: how many tokens a symbol accepts, derived from its
//!   [`ValueType`] unless declared.
//! - [`Value`]: converted token values with `TryFrom` extraction.
//! - [`CommandSchema`], [`OptionSchema`], [`ArgumentSchema`]: serializable
//!   declarations that build a tree via [`SymbolTree::from_schema`].
//! - [`ParserConfig`]: tokenizer and matcher settings, loadable from YAML.
//!
//! Construction errors ([`SymbolError`]) are returned immediately and leave
//! the tree untouched. Parsing lives in the `command-line-parser` crate.
//!
//! # Example
//!
//! ```
//! use command_line_core::*;
//!
//! let schema = CommandSchema::new("app")
//!     .with_option(OptionSchema::flag(["-v", "--verbose"]).global())
//!     .with_option(OptionSchema::new(["-x"], ValueType::Int).with_default(123))
//!     .with_subcommand(
//!         CommandSchema::new("run")
//!             .with_argument(ArgumentSchema::new("script", ValueType::Path)),
//!     );
//!
//! let tree = SymbolTree::from_schema(&schema).unwrap();
//! let root = tree.root();
//! let x = tree.option(root, "-x").unwrap();
//!
//! assert_eq!(tree.symbol(x).name(), "x");
//! assert_eq!(tree.symbol(x).slot().unwrap().arity(), Arity::EXACTLY_ONE);
//! assert!(tree.find_command(&["run"]).is_some());
//! ```

mod arity;
mod config;
mod schema;
mod symbol;
mod tree;
mod validate;
mod value;

pub use arity::Arity;
pub use config::{ConfigError, ParserConfig};
pub use schema::{ArgumentSchema, CommandSchema, OptionSchema};
pub use symbol::{
    ArgumentSymbol, CommandSymbol, DefaultFactory, DefaultValue, OptionSymbol, ResultContext,
    Symbol, SymbolId, SymbolKind, ValueSlot, Validator,
};
pub use tree::{SymbolTree, Walk};
pub use validate::{SymbolError, strip_prefix, validate_alias, validate_aliases};
pub use value::{ConversionError, Value, ValueError, ValueType, is_bool_literal};

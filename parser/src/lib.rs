//! Command-line parsing against a [`SymbolTree`].
//!
//! A parse runs in fixed stages:
//!
//! 1. **Tokenize**: expand response files, pull out directives, split
//!    `-x:value` and `-abc` forms, and classify each token against the
//!    command path seen so far.
//! 2. **Match**: bind options to their values and distribute loose tokens
//!    over each command's declared arguments.
//! 3. **Defaults**: synthesize implicit results for unmatched symbols with
//!    defaults and report required ones that are missing.
//! 4. **Validate**: arity, value conversion and custom validators for every
//!    result node.
//!
//! Parsing never fails outright. Every problem is collected as a
//! [`ParseError`] on the returned [`ParseResult`].
//!
//! # Examples
//!
//! ```
//! use command_line_core::*;
//! use command_line_parser::Parser;
//!
//! let schema = CommandSchema::new("app")
//!     .with_option(OptionSchema::new(["-x", "--count"], ValueType::Int))
//!     .with_argument(ArgumentSchema::new("name", ValueType::String));
//! let tree = SymbolTree::from_schema(&schema).unwrap();
//! let x = tree.option(tree.root(), "-x").unwrap();
//!
//! let result = Parser::new(&tree).parse(&["--count", "123", "world"]);
//! assert!(result.is_success());
//! assert_eq!(result.get::<i64>(x), Some(123));
//! ```

mod alias;
mod diagram;
mod error;
mod matcher;
pub mod output;
mod response_file;
mod result;
mod token;
mod tokenizer;
mod validate;

use command_line_core::{ParserConfig, SymbolTree};
use tracing::debug;

pub use alias::AliasIndex;
pub use error::{ParseError, ParseErrorKind};
pub use output::{OutputFormat, format_report};
pub use result::{ParseReport, ParseResult, ResultId, ResultKind, ResultReport, SymbolResult};
pub use token::{Token, TokenKind};
pub use tokenizer::{SplitLine, Tokenized, split_command_line, tokenize, tokenize_str};

use crate::matcher::match_tokens;
use crate::validate::{apply_defaults, check_exclusive, validate};

/// Parses argument lists against one symbol tree.
///
/// Holds no per-parse state, so one parser can be reused and shared
/// between threads.
#[derive(Debug, Clone)]
pub struct Parser<'t> {
    tree: &'t SymbolTree,
    config: ParserConfig,
}

impl<'t> Parser<'t> {
    /// A parser with the default configuration.
    pub fn new(tree: &'t SymbolTree) -> Self {
        Self::with_config(tree, ParserConfig::default())
    }

    pub fn with_config(tree: &'t SymbolTree, config: ParserConfig) -> Self {
        Self { tree, config }
    }

    pub fn tree(&self) -> &'t SymbolTree {
        self.tree
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses an already split argument list. The program name must not be
    /// included.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> ParseResult<'t> {
        let tokenized = tokenize(args, self.tree, &self.config);
        self.finish(tokenized)
    }

    /// Splits `line` like a shell would (whitespace separated, with single
    /// and double quotes) and parses the parts.
    ///
    /// ```
    /// use command_line_core::*;
    /// use command_line_parser::Parser;
    ///
    /// let schema = CommandSchema::new("greet")
    ///     .with_argument(ArgumentSchema::new("who", ValueType::String));
    /// let tree = SymbolTree::from_schema(&schema).unwrap();
    /// let who = tree.argument(tree.root(), "who").unwrap();
    ///
    /// let result = Parser::new(&tree).parse_str(r#""big world""#);
    /// assert_eq!(result.get::<String>(who).as_deref(), Some("big world"));
    /// ```
    pub fn parse_str(&self, line: &str) -> ParseResult<'t> {
        let tokenized = tokenize_str(line, self.tree, &self.config);
        self.finish(tokenized)
    }

    fn finish(&self, tokenized: Tokenized) -> ParseResult<'t> {
        let Tokenized {
            tokens,
            errors: token_errors,
            directives,
        } = tokenized;
        debug!(
            tokens = tokens.len(),
            directives = directives.len(),
            "tokenized input"
        );

        let mut matched = match_tokens(self.tree, &tokens);
        let exclusive = check_exclusive(self.tree, &matched.results, &matched.path, &tokens);
        let default_errors = apply_defaults(
            self.tree,
            &mut matched.results,
            &matched.path,
            exclusive.option.is_some(),
        );
        let validation_errors = validate(self.tree, &matched.results);

        let errors = match exclusive.violation {
            Some(violation) => vec![violation],
            None => token_errors
                .into_iter()
                .chain(matched.errors)
                .chain(default_errors)
                .chain(validation_errors)
                .collect(),
        };

        let command = matched
            .path
            .last()
            .copied()
            .unwrap_or_else(|| matched.results.root());
        debug!(
            depth = matched.path.len(),
            unmatched = matched.unmatched.len(),
            errors = errors.len(),
            "parse finished"
        );

        ParseResult {
            tree: self.tree,
            config: self.config.clone(),
            results: matched.results,
            command,
            tokens,
            unmatched: matched.unmatched,
            errors,
            directives,
            short_circuit: exclusive.option,
        }
    }
}

/// Parses `args` against `tree` with the default configuration.
pub fn parse<'t, S: AsRef<str>>(tree: &'t SymbolTree, args: &[S]) -> ParseResult<'t> {
    Parser::new(tree).parse(args)
}

/// Parses a single command line against `tree` with the default
/// configuration.
pub fn parse_str<'t>(tree: &'t SymbolTree, line: &str) -> ParseResult<'t> {
    Parser::new(tree).parse_str(line)
}

//! Input splitting and token classification.
//!
//! The tokenizer turns raw input into a flat list of [`Token`]s. It already
//! knows the symbol tree: option tokens carry the option they resolved to and
//! command tokens the subcommand they descend into, so the matcher only has
//! to bind values.
//!
//! Classification of each piece, in order:
//!
//! 1. a contiguous leading run of `[name]` / `[name:value]` is directives;
//! 2. `--` is the separator; everything after it is an argument;
//! 3. an exact option alias is an option;
//! 4. an option-shaped token (configured prefix plus a non-blank character)
//!    is tried as `alias<sep>value`, then as a POSIX bundle, then as an
//!    abbreviation; a numeric literal is an argument; anything left is an
//!    unresolved option;
//! 5. a subcommand alias of the current command is a command, unless the
//!    preceding option still needs values to reach its minimum arity;
//! 6. everything else is an argument.

use std::sync::LazyLock;

use command_line_core::{ParserConfig, SymbolId, SymbolTree};
use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace};

use crate::alias::AliasCache;
use crate::error::ParseError;
use crate::response_file::Expander;
use crate::token::{Token, TokenKind};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\[\]:]+)(?::(.*))?\]$").expect("static regex must compile")
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").expect("static regex must compile")
});

/// A raw piece of input before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    /// Remainder of an unterminated quote.
    Unparsed(String),
    /// An `@file` reference that failed to expand.
    ResponseFile(String),
}

/// Result of [`split_command_line`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitLine {
    pub parts: Vec<String>,
    /// Text of a token whose quote was never closed.
    pub unterminated: Option<String>,
}

/// Splits a command-line string with shell-like quoting.
///
/// Whitespace separates tokens and the quotes themselves are removed. A
/// double-quoted span is part of one token, with `\"` inside it a literal
/// quote. A single-quoted span is taken literally, backslashes included. An
/// unterminated quote never fails the split: the text of that token is
/// returned in [`SplitLine::unterminated`].
///
/// # Examples
///
/// ```
/// use command_line_parser::split_command_line;
///
/// let split = split_command_line(r#"run "hello world" -m "say \"hi\"""#);
/// assert_eq!(split.parts, vec!["run", "hello world", "-m", "say \"hi\""]);
/// assert!(split.unterminated.is_none());
///
/// let split = split_command_line(r#"grep 'a "b" \c' file"#);
/// assert_eq!(split.parts, vec!["grep", r#"a "b" \c"#, "file"]);
///
/// let split = split_command_line(r#"echo "oops"#);
/// assert_eq!(split.parts, vec!["echo"]);
/// assert_eq!(split.unterminated.as_deref(), Some("oops"));
/// ```
pub fn split_command_line(line: &str) -> SplitLine {
    let mut split = SplitLine::default();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (Some(open), c) if c == open => quote = None,
            (Some('"'), '\\') if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    split.parts.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (_, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        split.unterminated = Some(current);
    } else if in_token {
        split.parts.push(current);
    }
    split
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
    /// Directive name to values, in first-seen order.
    pub directives: IndexMap<String, Vec<String>>,
}

/// Tokenizes an already split argument list.
///
/// # Examples
///
/// ```
/// use command_line_core::*;
/// use command_line_parser::{TokenKind, tokenize};
///
/// let schema = CommandSchema::new("app")
///     .with_option(OptionSchema::new(["-x"], ValueType::Int))
///     .with_subcommand(CommandSchema::new("build"));
/// let tree = SymbolTree::from_schema(&schema).unwrap();
///
/// let out = tokenize(&["[debug]", "-x:1", "build"], &tree, &ParserConfig::default());
/// let kinds: Vec<TokenKind> = out.tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![TokenKind::Directive, TokenKind::Option, TokenKind::Argument, TokenKind::Command]
/// );
/// assert_eq!(out.directives["debug"], Vec::<String>::new());
/// ```
pub fn tokenize<S: AsRef<str>>(args: &[S], tree: &SymbolTree, config: &ParserConfig) -> Tokenized {
    let mut expander = Expander::new(config);
    for arg in args {
        expander.push(Piece::Text(arg.as_ref().to_string()), None, 0);
    }
    classify(expander, tree, config)
}

/// Splits `line` with [`split_command_line`] and tokenizes the parts.
pub fn tokenize_str(line: &str, tree: &SymbolTree, config: &ParserConfig) -> Tokenized {
    let split = split_command_line(line);
    let mut expander = Expander::new(config);
    for part in split.parts {
        expander.push(Piece::Text(part), None, 0);
    }
    if let Some(rest) = split.unterminated {
        expander.errors.push(ParseError::quote(&rest));
        expander.pieces.push(Piece::Unparsed(rest));
    }
    classify(expander, tree, config)
}

fn classify(expander: Expander<'_>, tree: &SymbolTree, config: &ParserConfig) -> Tokenized {
    let mut tokenizer = Tokenizer {
        tree,
        config,
        aliases: AliasCache::default(),
        path: vec![tree.root()],
        out: Tokenized {
            errors: expander.errors,
            ..Default::default()
        },
        open: None,
        after_double_dash: false,
    };
    let mut in_directives = config.enable_directives;
    for piece in expander.pieces {
        if in_directives {
            if let Piece::Text(text) = &piece
                && tokenizer.directive(text)
            {
                continue;
            }
            in_directives = false;
        }
        tokenizer.piece(piece);
    }
    tokenizer.out
}

/// The option whose values are currently being read.
#[derive(Debug, Clone, Copy)]
struct OpenOption {
    symbol: SymbolId,
    /// Values still needed to reach the minimum arity.
    needed: usize,
}

struct Tokenizer<'a> {
    tree: &'a SymbolTree,
    config: &'a ParserConfig,
    aliases: AliasCache,
    path: Vec<SymbolId>,
    out: Tokenized,
    open: Option<OpenOption>,
    after_double_dash: bool,
}

impl Tokenizer<'_> {
    fn current(&self) -> SymbolId {
        self.path.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn emit(&mut self, value: &str, kind: TokenKind, symbol: Option<SymbolId>) {
        let mut token = Token::new(value, kind, self.out.tokens.len());
        token.symbol = symbol;
        trace!(token = %value, kind = %kind, "classified token");
        self.out.tokens.push(token);
    }

    fn directive(&mut self, text: &str) -> bool {
        let Some(caps) = DIRECTIVE_RE.captures(text) else {
            return false;
        };
        let name = caps[1].to_string();
        let values = self.out.directives.entry(name).or_default();
        if let Some(value) = caps.get(2) {
            values.push(value.as_str().to_string());
        }
        self.emit(text, TokenKind::Directive, None);
        true
    }

    fn piece(&mut self, piece: Piece) {
        let text = match piece {
            Piece::Text(text) => text,
            Piece::Unparsed(text) => return self.emit(&text, TokenKind::Unparsed, None),
            Piece::ResponseFile(text) => return self.emit(&text, TokenKind::ResponseFile, None),
        };

        if self.after_double_dash {
            return self.emit(&text, TokenKind::Argument, None);
        }
        if text == "--" {
            self.after_double_dash = true;
            self.open = None;
            return self.emit(&text, TokenKind::DoubleDash, None);
        }

        let index = self.aliases.get(self.tree, &self.path);
        if let Some(option) = index.exact(&text) {
            return self.option(&text, option, None);
        }
        if self.config.is_option_like(&text) {
            return self.option_like(&text);
        }

        let current = self.current();
        if let Some(sub) = self.tree.subcommand(current, &text) {
            if let Some(open) = self.open.filter(|o| o.needed > 0) {
                trace!(token = %text, "subcommand name bound to preceding option");
                return self.argument(&text, Some(open.symbol));
            }
            debug!(command = %self.tree.symbol(sub).name(), "descending into subcommand");
            self.open = None;
            self.path.push(sub);
            return self.emit(&text, TokenKind::Command, Some(sub));
        }

        self.argument(&text, None);
    }

    fn argument(&mut self, text: &str, bound_to: Option<SymbolId>) {
        if let Some(open) = &mut self.open {
            open.needed = open.needed.saturating_sub(1);
        }
        self.emit(text, TokenKind::Argument, bound_to);
    }

    /// Emits a resolved option token and, for split or bundled input, its
    /// attached value.
    fn option(&mut self, alias: &str, option: SymbolId, value: Option<&str>) {
        let minimum = self
            .tree
            .symbol(option)
            .slot()
            .map_or(0, |slot| slot.arity().minimum);
        self.open = Some(OpenOption {
            symbol: option,
            needed: minimum,
        });
        self.emit(alias, TokenKind::Option, Some(option));
        if let Some(value) = value {
            self.argument(value, Some(option));
        }
    }

    fn option_like(&mut self, text: &str) {
        if let Some((alias, option, value)) = self.split_separator(text) {
            return self.option(&alias, option, Some(&value));
        }
        if let Some(bundle) = self.bundle(text) {
            debug!(token = %text, count = bundle.len(), "expanded option bundle");
            for (alias, option, value) in bundle {
                self.option(&alias, option, value.as_deref());
            }
            return;
        }
        if self.config.allow_abbreviations {
            let index = self.aliases.get(self.tree, &self.path);
            if let Some(option) = index.abbreviation(text) {
                return self.option(text, option, None);
            }
        }
        if NUMERIC_RE.is_match(text) {
            return self.argument(text, None);
        }

        trace!(token = %text, "unresolved option");
        self.open = None;
        self.emit(text, TokenKind::Option, None);
    }

    /// `-x:value` / `--name=value` split at the first separator.
    fn split_separator(&mut self, text: &str) -> Option<(String, SymbolId, String)> {
        let prefix_len = self.config.option_prefix(text)?.len();
        let sep = text[prefix_len..]
            .char_indices()
            .find(|(_, c)| self.config.argument_separators.contains(c))
            .map(|(i, _)| prefix_len + i)?;
        if sep == prefix_len {
            return None;
        }

        let (alias, rest) = text.split_at(sep);
        let value = &rest[rest.chars().next().map_or(0, char::len_utf8)..];
        let allow = self.config.allow_abbreviations;
        let option = self.aliases.get(self.tree, &self.path).resolve(alias, allow)?;
        Some((alias.to_string(), option, value.to_string()))
    }

    /// `-abc` as `-a -b -c`; `-ovalue` as `-o value` when `-o` takes values.
    ///
    /// All or nothing: any character that is not an alias rejects the bundle.
    #[allow(clippy::type_complexity)]
    fn bundle(&mut self, text: &str) -> Option<Vec<(String, SymbolId, Option<String>)>> {
        if !self.config.enable_posix_bundling {
            return None;
        }
        let prefix = self.config.option_prefix(text)?;
        if prefix.chars().count() != 1 {
            return None;
        }
        let body = &text[prefix.len()..];
        if body.chars().count() < 2 {
            return None;
        }

        let prefix = prefix.to_string();
        let index = self.aliases.get(self.tree, &self.path);
        let mut bundle = Vec::new();
        for (i, c) in body.char_indices() {
            let alias = format!("{prefix}{c}");
            let option = index.exact(&alias)?;
            let takes_value = self
                .tree
                .symbol(option)
                .slot()
                .is_some_and(|slot| !slot.is_flag() && slot.arity().max_count() > 0);
            if takes_value {
                let rest = &body[i + c.len_utf8()..];
                let value = (!rest.is_empty()).then(|| rest.to_string());
                bundle.push((alias, option, value));
                return Some(bundle);
            }
            bundle.push((alias, option, None));
        }
        Some(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_line_core::{ArgumentSchema, CommandSchema, OptionSchema, ValueType};

    fn tree() -> SymbolTree {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::flag(["-a"]))
            .with_option(OptionSchema::flag(["-b"]))
            .with_option(OptionSchema::new(["-o", "--output"], ValueType::String))
            .with_option(OptionSchema::new(["-option"], ValueType::String))
            .with_argument(ArgumentSchema::new("rest", ValueType::List(Box::new(ValueType::String))))
            .with_subcommand(CommandSchema::new("build").with_option(OptionSchema::flag(["-f"])));
        SymbolTree::from_schema(&schema).unwrap()
    }

    fn kinds(out: &Tokenized) -> Vec<(&str, TokenKind)> {
        out.tokens
            .iter()
            .map(|t| (t.value.as_str(), t.kind))
            .collect()
    }

    #[test]
    fn test_split_empty_quotes_is_empty_token() {
        assert_eq!(split_command_line(r#"a "" b"#).parts, vec!["a", "", "b"]);
        assert_eq!(split_command_line("  ").parts, Vec::<String>::new());
    }

    #[test]
    fn test_split_quote_inside_token() {
        assert_eq!(split_command_line(r#"--name="a b""#).parts, vec!["--name=a b"]);
    }

    #[test]
    fn test_split_single_quotes_are_literal() {
        assert_eq!(
            split_command_line(r#"say 'it''s' "don't" 'x\"'"#).parts,
            vec!["say", "its", "don't", r#"x\""#]
        );
        let split = split_command_line("say 'open");
        assert_eq!(split.parts, vec!["say"]);
        assert_eq!(split.unterminated.as_deref(), Some("open"));
    }

    #[test]
    fn test_exact_alias_beats_bundle() {
        let tree = tree();
        let out = tokenize(&["-option", "v"], &tree, &ParserConfig::default());
        let option = tree.option(tree.root(), "-option");
        assert_eq!(out.tokens[0].symbol, option);
        assert_eq!(kinds(&out), vec![("-option", TokenKind::Option), ("v", TokenKind::Argument)]);
    }

    #[test]
    fn test_bundle_flags_and_attached_value() {
        let tree = tree();
        let out = tokenize(&["-abofile"], &tree, &ParserConfig::default());
        assert_eq!(
            kinds(&out),
            vec![
                ("-a", TokenKind::Option),
                ("-b", TokenKind::Option),
                ("-o", TokenKind::Option),
                ("file", TokenKind::Argument),
            ]
        );
        assert_eq!(out.tokens[3].symbol, tree.option(tree.root(), "-o"));
    }

    #[test]
    fn test_bundle_rejected_when_a_char_is_unknown() {
        let tree = tree();
        let config = ParserConfig {
            allow_abbreviations: false,
            ..Default::default()
        };
        let out = tokenize(&["-abz"], &tree, &config);
        assert_eq!(kinds(&out), vec![("-abz", TokenKind::Option)]);
        assert_eq!(out.tokens[0].symbol, None);
    }

    #[test]
    fn test_separator_split() {
        let tree = tree();
        let out = tokenize(&["--output=x:y", "-o:"], &tree, &ParserConfig::default());
        assert_eq!(
            kinds(&out),
            vec![
                ("--output", TokenKind::Option),
                ("x:y", TokenKind::Argument),
                ("-o", TokenKind::Option),
                ("", TokenKind::Argument),
            ]
        );
    }

    #[test]
    fn test_numeric_literal_is_argument() {
        let tree = tree();
        let out = tokenize(&["-5", "-1.5e3"], &tree, &ParserConfig::default());
        assert!(out.tokens.iter().all(|t| t.kind == TokenKind::Argument));
    }

    #[test]
    fn test_subcommand_name_binds_to_option_needing_value() {
        let tree = tree();
        let out = tokenize(&["-o", "build", "build", "-f"], &tree, &ParserConfig::default());
        assert_eq!(
            kinds(&out),
            vec![
                ("-o", TokenKind::Option),
                ("build", TokenKind::Argument),
                ("build", TokenKind::Command),
                ("-f", TokenKind::Option),
            ]
        );
    }

    #[test]
    fn test_double_dash_stops_option_resolution() {
        let tree = tree();
        let out = tokenize(&["--", "-a", "build", "[x]"], &tree, &ParserConfig::default());
        assert_eq!(out.tokens[0].kind, TokenKind::DoubleDash);
        assert!(out.tokens[1..].iter().all(|t| t.kind == TokenKind::Argument));
    }

    #[test]
    fn test_directives_only_as_prefix() {
        let tree = tree();
        let out = tokenize(
            &["[parse]", "[env:A=1]", "[env:B=2]", "-a", "[late]"],
            &tree,
            &ParserConfig::default(),
        );
        assert_eq!(out.directives.len(), 2);
        assert_eq!(out.directives["env"], vec!["A=1", "B=2"]);
        assert_eq!(out.tokens[4].kind, TokenKind::Argument);
    }

    #[test]
    fn test_directives_disabled() {
        let tree = tree();
        let config = ParserConfig {
            enable_directives: false,
            ..Default::default()
        };
        let out = tokenize(&["[parse]"], &tree, &config);
        assert!(out.directives.is_empty());
        assert_eq!(out.tokens[0].kind, TokenKind::Argument);
    }

    #[test]
    fn test_unterminated_quote_becomes_unparsed_token() {
        let tree = tree();
        let out = tokenize_str(r#"-a "never closed"#, &tree, &ParserConfig::default());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            kinds(&out),
            vec![("-a", TokenKind::Option), ("never closed", TokenKind::Unparsed)]
        );
    }

    #[test]
    fn test_positions_are_sequential() {
        let tree = tree();
        let out = tokenize(&["-ab", "x"], &tree, &ParserConfig::default());
        let positions: Vec<usize> = out.tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}

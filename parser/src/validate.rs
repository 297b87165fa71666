//! Defaults, required-symbol checks and validation.
//!
//! Runs after matching. First every command on the matched path gets
//! implicit results for its unmatched options and arguments that have
//! defaults, and errors for the required ones that have none. Then every
//! result node is checked depth-first: arity, value conversion, then the
//! symbol's validators. A command's own validators run after its children.
//! Nothing here stops early; every check of every node runs.

use std::collections::HashSet;

use command_line_core::{
    ConversionError, ResultContext, SymbolId, SymbolKind, SymbolTree, ValueSlot, Validator, Value,
};
use tracing::debug;

use crate::error::{ParseError, ParseErrorKind};
use crate::result::{ResultId, ResultKind, ResultTree};
use crate::token::{Token, TokenKind};

/// Synthesizes implicit default results and reports missing required
/// symbols. Required checks are skipped when `short_circuit` is set.
pub(crate) fn apply_defaults(
    tree: &SymbolTree,
    results: &mut ResultTree,
    path: &[ResultId],
    short_circuit: bool,
) -> Vec<ParseError> {
    let mut errors = Vec::new();

    for (depth, &command) in path.iter().enumerate() {
        let command_symbol = tree.symbol(results.node(command).symbol);
        let Some(cmd) = command_symbol.as_command() else {
            continue;
        };

        for &option in cmd.options() {
            if results.find(option, true).is_some() {
                continue;
            }
            let symbol = tree.symbol(option);
            let Some(opt) = symbol.as_option() else {
                continue;
            };
            if let Some(default) = opt.slot().default_value() {
                debug!(option = %symbol.name(), "using default value");
                results.add_implicit(command, option, ResultKind::Option, default.produce());
            } else if opt.is_required() && !short_circuit {
                errors.push(
                    ParseError::new(
                        ParseErrorKind::Arity,
                        format!("Option '{}' is required.", symbol.display_alias()),
                    )
                    .at(command),
                );
            }
        }

        for &argument in cmd.arguments() {
            if results.child_for(command, argument).is_some() {
                continue;
            }
            let symbol = tree.symbol(argument);
            let Some(arg) = symbol.as_argument() else {
                continue;
            };
            if let Some(default) = arg.slot().default_value() {
                debug!(argument = %symbol.name(), "using default value");
                results.add_implicit(command, argument, ResultKind::Argument, default.produce());
            } else if arg.is_required() && !short_circuit {
                errors.push(missing_argument(command_symbol.name()).at(command));
            }
        }

        let deepest = depth + 1 == path.len();
        if deepest && !short_circuit && !cmd.subcommands().is_empty() && cmd.handler().is_none() {
            errors.push(
                ParseError::new(
                    ParseErrorKind::RequiredCommand,
                    "Required command was not provided.",
                )
                .at(command),
            );
        }
    }

    results.sort_children();
    errors
}

fn missing_argument(command: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Arity,
        format!("Required argument missing for command: '{command}'."),
    )
}

/// Checks every result node: arity, conversion, validators.
pub(crate) fn validate(tree: &SymbolTree, results: &ResultTree) -> Vec<ParseError> {
    let mut errors = Vec::new();
    visit(tree, results, results.root(), &mut errors);
    errors
}

fn visit(tree: &SymbolTree, results: &ResultTree, id: ResultId, errors: &mut Vec<ParseError>) {
    let node = results.node(id);
    let symbol = tree.symbol(node.symbol);

    match symbol.kind() {
        SymbolKind::Command(cmd) => {
            for &child in &node.children {
                visit(tree, results, child, errors);
            }
            run_validators(tree, results, id, cmd.validators(), errors);
        }
        SymbolKind::Option(opt) => check_value(tree, results, id, opt.slot(), errors),
        SymbolKind::Argument(arg) => check_value(tree, results, id, arg.slot(), errors),
    }
}

fn check_value(
    tree: &SymbolTree,
    results: &ResultTree,
    id: ResultId,
    slot: &ValueSlot,
    errors: &mut Vec<ParseError>,
) {
    let node = results.node(id);
    if node.implicit.is_none()
        && let Some(message) = arity_message(tree, results, id, slot)
    {
        errors.push(ParseError::new(ParseErrorKind::Arity, message).at(id));
    }

    if let Err(err) = results.value(tree, id) {
        let message = conversion_message(tree, results, id, err);
        let token = node.tokens.iter().find(|t| t.value == err.token()).cloned();
        let mut error = ParseError::new(ParseErrorKind::Conversion, message).at(id);
        error.token = token;
        errors.push(error);
    }

    run_validators(tree, results, id, slot.validators(), errors);
}

/// How a result is named in messages: the token the user typed for options,
/// the declared name for arguments.
fn describe<'t>(
    tree: &'t SymbolTree,
    results: &'t ResultTree,
    id: ResultId,
) -> (&'static str, &'t str) {
    let node = results.node(id);
    let symbol = tree.symbol(node.symbol);
    match node.kind {
        ResultKind::Option => {
            let alias = node
                .occurrences
                .first()
                .map_or(symbol.display_alias(), |t| t.value.as_str());
            ("option", alias)
        }
        _ => ("argument", symbol.name()),
    }
}

fn parent_command_name<'t>(tree: &'t SymbolTree, results: &ResultTree, id: ResultId) -> &'t str {
    let parent = results.node(id).parent.unwrap_or_else(|| results.root());
    tree.symbol(results.node(parent).symbol).name()
}

fn arity_message(
    tree: &SymbolTree,
    results: &ResultTree,
    id: ResultId,
    slot: &ValueSlot,
) -> Option<String> {
    let node = results.node(id);
    let arity = slot.arity();
    let count = node.tokens.len();
    let (noun, name) = describe(tree, results, id);
    let subject = match node.kind {
        ResultKind::Option => format!("Option '{name}'"),
        _ => format!("Argument '{name}'"),
    };

    if count < arity.minimum {
        return Some(match node.kind {
            ResultKind::Argument => missing_argument(parent_command_name(tree, results, id)).message,
            _ if count == 0 => format!("Required argument missing for {noun}: '{name}'."),
            _ => format!(
                "{subject} expects at least {} arguments, but {count} were provided.",
                arity.minimum
            ),
        });
    }
    match arity.maximum {
        Some(1) if count > 1 => Some(format!(
            "{subject} expects a single argument but {count} were provided."
        )),
        Some(max) if count > max => Some(format!(
            "{subject} expects no more than {max} arguments, but {count} were provided."
        )),
        _ => None,
    }
}

fn conversion_message(
    tree: &SymbolTree,
    results: &ResultTree,
    id: ResultId,
    err: &ConversionError,
) -> String {
    match err {
        ConversionError::InvalidFormat { token, expected } => {
            let (noun, name) = describe(tree, results, id);
            format!(
                "Cannot parse argument '{token}' for {noun} '{name}' as expected type '{expected}'."
            )
        }
        ConversionError::NotAChoice { token, choices } => {
            let choices: Vec<String> = choices.iter().map(|c| format!("'{c}'")).collect();
            format!(
                "Argument '{token}' not recognized. Must be one of: {}.",
                choices.join(", ")
            )
        }
    }
}

fn run_validators(
    tree: &SymbolTree,
    results: &ResultTree,
    id: ResultId,
    validators: &[Validator],
    errors: &mut Vec<ParseError>,
) {
    if validators.is_empty() {
        return;
    }
    let context = Context { tree, results, id };
    let mut messages = Vec::new();
    for validator in validators {
        validator(&context, &mut messages);
    }
    errors.extend(
        messages
            .into_iter()
            .map(|m| ParseError::new(ParseErrorKind::Validation, m).at(id)),
    );
}

/// The [`ResultContext`] handed to validators.
struct Context<'a> {
    tree: &'a SymbolTree,
    results: &'a ResultTree,
    id: ResultId,
}

impl ResultContext for Context<'_> {
    fn symbol(&self) -> SymbolId {
        self.results.node(self.id).symbol
    }

    fn tokens(&self) -> Vec<&str> {
        self.results
            .node(self.id)
            .tokens
            .iter()
            .map(|t| t.value.as_str())
            .collect()
    }

    fn value(&self) -> Option<Value> {
        self.results.value(self.tree, self.id).clone().ok().flatten()
    }

    fn value_of(&self, symbol: SymbolId) -> Option<Value> {
        match self.results.find(symbol, true) {
            Some(id) => self.results.value(self.tree, id).clone().ok().flatten(),
            None => self
                .tree
                .get(symbol)
                .and_then(|s| s.slot())
                .and_then(|slot| slot.default_value())
                .map(|d| d.produce()),
        }
    }

    fn is_present(&self, symbol: SymbolId) -> bool {
        self.results.find(symbol, false).is_some()
    }
}

/// Outcome of [`check_exclusive`].
#[derive(Debug, Default)]
pub(crate) struct Exclusive {
    /// The exclusive option present on input.
    pub(crate) option: Option<SymbolId>,
    /// Set when it was combined with other input.
    pub(crate) violation: Option<ParseError>,
}

/// Finds an explicitly given exclusive option and checks that nothing but
/// the option, its values, and the commands leading to it was given.
pub(crate) fn check_exclusive(
    tree: &SymbolTree,
    results: &ResultTree,
    path: &[ResultId],
    tokens: &[Token],
) -> Exclusive {
    let found = results.preorder().into_iter().find(|id| {
        let node = results.node(*id);
        node.implicit.is_none()
            && tree
                .symbol(node.symbol)
                .as_option()
                .is_some_and(|o| o.is_exclusive())
    });
    let Some(id) = found else {
        return Exclusive::default();
    };
    let node = results.node(id);

    let mut allowed: HashSet<usize> = node
        .occurrences
        .iter()
        .chain(&node.tokens)
        .map(|t| t.position)
        .collect();
    let owner = node.parent.unwrap_or_else(|| results.root());
    for &command in path {
        allowed.extend(
            results
                .node(command)
                .occurrences
                .iter()
                .filter(|t| t.kind == TokenKind::Command)
                .map(|t| t.position),
        );
        if command == owner {
            break;
        }
    }

    let combined = tokens
        .iter()
        .any(|t| t.kind != TokenKind::Directive && !allowed.contains(&t.position));
    let violation = combined.then(|| {
        let alias = node
            .occurrences
            .first()
            .map_or_else(|| tree.symbol(node.symbol).display_alias(), |t| t.value.as_str());
        ParseError::new(
            ParseErrorKind::Exclusive,
            format!("'{alias}' option cannot be combined with other arguments."),
        )
        .at(id)
    });

    Exclusive {
        option: Some(node.symbol),
        violation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_tokens;
    use crate::tokenizer::tokenize;
    use command_line_core::{
        ArgumentSchema, CommandSchema, OptionSchema, ParserConfig, ValueType,
    };

    fn check(tree: &SymbolTree, args: &[&str]) -> Vec<String> {
        let tokenized = tokenize(args, tree, &ParserConfig::default());
        let mut matched = match_tokens(tree, &tokenized.tokens);
        let mut errors = apply_defaults(tree, &mut matched.results, &matched.path, false);
        errors.extend(validate(tree, &matched.results));
        errors.into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_option_arity_messages() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["-x"], ValueType::Int))
            .allow_unmatched_tokens();
        let tree = SymbolTree::from_schema(&schema).unwrap();

        assert_eq!(
            check(&tree, &["-x"]),
            vec!["Required argument missing for option: '-x'."]
        );
        assert_eq!(
            check(&tree, &["-x", "1", "-x", "2"]),
            vec!["Option '-x' expects a single argument but 2 were provided."]
        );
    }

    #[test]
    fn test_conversion_message() {
        let schema =
            CommandSchema::new("app").with_option(OptionSchema::new(["-x"], ValueType::Int));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        assert_eq!(
            check(&tree, &["-x", "abc"]),
            vec!["Cannot parse argument 'abc' for option '-x' as expected type 'int'."]
        );
    }

    #[test]
    fn test_choice_message() {
        let schema = CommandSchema::new("app").with_argument(ArgumentSchema::new(
            "format",
            ValueType::Choice(vec!["json".into(), "yaml".into()]),
        ));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        assert_eq!(
            check(&tree, &["xml"]),
            vec!["Argument 'xml' not recognized. Must be one of: 'json', 'yaml'."]
        );
    }

    #[test]
    fn test_required_option_and_argument() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["-o", "--output"], ValueType::Path).required())
            .with_argument(ArgumentSchema::new("input", ValueType::Path));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        assert_eq!(
            check(&tree, &[]),
            vec![
                "Option '--output' is required.",
                "Required argument missing for command: 'app'.",
            ]
        );
    }

    #[test]
    fn test_required_command() {
        let schema = CommandSchema::new("git").with_subcommand(CommandSchema::new("status"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        assert_eq!(check(&tree, &[]), vec!["Required command was not provided."]);
        assert!(check(&tree, &["status"]).is_empty());

        let schema = CommandSchema::new("git")
            .with_handler("git")
            .with_subcommand(CommandSchema::new("status"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        assert!(check(&tree, &[]).is_empty());
    }

    #[test]
    fn test_validators_all_run_and_command_runs_last() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["-n"], ValueType::Int))
            .allow_unmatched_tokens();
        let mut tree = SymbolTree::from_schema(&schema).unwrap();
        let root = tree.root();
        let n = tree.option(root, "-n").unwrap();
        tree.add_validator(n, |ctx, errors| {
            if ctx.value().and_then(|v| v.as_int()).is_some_and(|v| v > 10) {
                errors.push("n too large".into());
            }
        })
        .unwrap();
        tree.add_validator(n, |_, errors| errors.push("second".into()))
            .unwrap();
        tree.add_validator(root, move |ctx, errors| {
            if ctx.is_present(n) {
                errors.push("command saw n".into());
            }
        })
        .unwrap();

        assert_eq!(
            check(&tree, &["-n", "11"]),
            vec!["n too large", "second", "command saw n"]
        );
    }

    #[test]
    fn test_value_of_sees_defaults() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::new(["--level"], ValueType::Int).with_default(3));
        let mut tree = SymbolTree::from_schema(&schema).unwrap();
        let root = tree.root();
        let level = tree.option(root, "--level").unwrap();
        tree.add_validator(root, move |ctx, errors| {
            if ctx.value_of(level) != Some(Value::Int(3)) || ctx.is_present(level) {
                errors.push("unexpected".into());
            }
        })
        .unwrap();
        assert!(check(&tree, &[]).is_empty());
    }

    #[test]
    fn test_exclusive_allows_command_path() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::version().global())
            .with_option(OptionSchema::flag(["-x"]))
            .with_subcommand(CommandSchema::new("sub"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let run = |args: &[&str]| {
            let tokenized = tokenize(args, &tree, &ParserConfig::default());
            let matched = match_tokens(&tree, &tokenized.tokens);
            check_exclusive(&tree, &matched.results, &matched.path, &tokenized.tokens)
        };

        let alone = run(&["--version"]);
        assert!(alone.option.is_some());
        assert!(alone.violation.is_none());

        assert!(run(&["sub", "--version"]).violation.is_none());
        assert!(run(&["--version", "sub"]).violation.is_some());
        assert!(run(&["--version", "-x"]).violation.is_some());
        assert!(run(&["-x"]).option.is_none());
    }
}

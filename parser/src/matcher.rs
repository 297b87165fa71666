//! Binding classified tokens to symbols.
//!
//! One left-to-right pass over the tokens. The current command only ever
//! moves deeper. Options bind their values greedily, and loose arguments are
//! collected per command and distributed over its declared arguments once
//! all tokens have been seen.

use std::collections::HashMap;

use command_line_core::{SymbolId, SymbolTree, ValueSlot, is_bool_literal};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::result::{ResultId, ResultKind, ResultTree};
use crate::token::{Token, TokenKind};

/// Output of [`match_tokens`].
#[derive(Debug)]
pub(crate) struct Matched {
    pub(crate) results: ResultTree,
    /// Matched command results, root first.
    pub(crate) path: Vec<ResultId>,
    pub(crate) unmatched: Vec<Token>,
    pub(crate) errors: Vec<ParseError>,
}

pub(crate) fn match_tokens(tree: &SymbolTree, tokens: &[Token]) -> Matched {
    let mut results = ResultTree::new(tree.root());
    let mut path = vec![results.root()];
    let mut loose: HashMap<ResultId, Vec<Token>> = HashMap::new();
    let mut unmatched = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;
        let current = path.last().copied().unwrap_or_else(|| results.root());

        match (token.kind, token.symbol) {
            (TokenKind::Directive, _) => {}
            (TokenKind::Command, Some(sub)) => {
                let child = results.add(current, sub, ResultKind::Command);
                results.node_mut(child).occurrences.push(token.clone());
                debug!(command = %tree.symbol(sub).name(), "matched command");
                path.push(child);
            }
            (TokenKind::DoubleDash, _) => {
                results.node_mut(current).occurrences.push(token.clone());
            }
            (TokenKind::Option, Some(option)) => {
                let result = option_result(&mut results, &path, option);
                results.node_mut(result).occurrences.push(token.clone());
                let Some(slot) = tree.symbol(option).slot() else {
                    continue;
                };
                let taken = take_values(slot, option, &tokens[i..]);
                trace!(option = %tree.symbol(option).name(), count = taken, "bound option values");
                results
                    .node_mut(result)
                    .tokens
                    .extend_from_slice(&tokens[i..i + taken]);
                i += taken;
            }
            (TokenKind::Argument, _) => {
                loose.entry(current).or_default().push(token.clone());
            }
            _ => {
                trace!(token = %token.value, "unmatched token");
                unmatched.push(token.clone());
            }
        }
    }

    for &command in &path {
        let args = loose.remove(&command).unwrap_or_default();
        let overflow = distribute(tree, &mut results, command, args);
        unmatched.extend(overflow);
    }
    unmatched.sort_by_key(|t| t.position);

    let deepest = path.last().copied().unwrap_or_else(|| results.root());
    let deepest_symbol = results.node(deepest).symbol;
    let report_unmatched = tree
        .symbol(deepest_symbol)
        .as_command()
        .is_some_and(|c| c.treat_unmatched_tokens_as_errors());
    let errors = if report_unmatched {
        unmatched
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::ResponseFile | TokenKind::Unparsed))
            .map(|t| ParseError::unrecognized(t).at(deepest))
            .collect()
    } else {
        Vec::new()
    };

    Matched {
        results,
        path,
        unmatched,
        errors,
    }
}

/// Existing result for `option` anywhere on the command path, or a new one
/// under the current command.
fn option_result(results: &mut ResultTree, path: &[ResultId], option: SymbolId) -> ResultId {
    if let Some(existing) = path
        .iter()
        .find_map(|command| results.child_for(*command, option))
    {
        return existing;
    }
    let current = path.last().copied().unwrap_or_else(|| results.root());
    results.add(current, option, ResultKind::Option)
}

/// Number of tokens at the start of `rest` bound to one occurrence of
/// `option`.
fn take_values(slot: &ValueSlot, option: SymbolId, rest: &[Token]) -> usize {
    let max = slot.arity().max_count();
    let bool_only = slot.value_type().is_bool();
    let mut count = 0;
    for token in rest {
        if token.kind != TokenKind::Argument {
            break;
        }
        match token.symbol {
            Some(bound) if bound == option => {}
            Some(_) => break,
            None => {
                if count >= max || (bool_only && !is_bool_literal(&token.value)) {
                    break;
                }
            }
        }
        count += 1;
    }
    count
}

/// Spreads loose argument tokens over a command's declared arguments in
/// declaration order. Each argument takes as many tokens as its maximum
/// allows before the next one gets any; a later argument left short is
/// reported as missing by the defaults pass. Returns the tokens no argument
/// could take.
fn distribute(
    tree: &SymbolTree,
    results: &mut ResultTree,
    command: ResultId,
    mut tokens: Vec<Token>,
) -> Vec<Token> {
    let symbol = results.node(command).symbol;
    let Some(cmd) = tree.symbol(symbol).as_command() else {
        return tokens;
    };
    for &argument in cmd.arguments() {
        if tokens.is_empty() {
            break;
        }
        let Some(slot) = tree.symbol(argument).slot() else {
            continue;
        };
        let take = slot.arity().max_count().min(tokens.len());
        if take == 0 {
            continue;
        }

        let rest = tokens.split_off(take);
        let result = results.add(command, argument, ResultKind::Argument);
        trace!(argument = %tree.symbol(argument).name(), count = take, "bound argument values");
        results.node_mut(result).tokens = std::mem::replace(&mut tokens, rest);
    }
    tokens
}

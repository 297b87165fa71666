//! The parse result model.
//!
//! Results form a tree parallel to the symbol tree: one command result per
//! matched command, and under each one option results and argument results.
//! Nodes live in an arena owned by the [`ParseResult`]; [`SymbolResult`] is a
//! cheap borrowed view of one node.

use std::sync::OnceLock;

use command_line_core::{
    ConversionError, ParserConfig, Symbol, SymbolId, SymbolTree, Value,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagram;
use crate::error::ParseError;
use crate::token::Token;

/// Index of a node in a parse's result arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(pub(crate) usize);

impl ResultId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which kind of symbol a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Command,
    Option,
    Argument,
}

fn is_false(b: &bool) -> bool {
    !*b
}

type Converted = Result<Option<Value>, ConversionError>;

#[derive(Debug, Clone)]
pub(crate) struct ResultNode {
    pub(crate) symbol: SymbolId,
    pub(crate) kind: ResultKind,
    pub(crate) parent: Option<ResultId>,
    pub(crate) children: Vec<ResultId>,
    /// Tokens naming the symbol: the command token, `--`, or each
    /// occurrence of an option.
    pub(crate) occurrences: Vec<Token>,
    /// Value tokens bound to the symbol.
    pub(crate) tokens: Vec<Token>,
    /// Set for results synthesized from a default.
    pub(crate) implicit: Option<Value>,
    value: OnceLock<Converted>,
}

/// Arena of result nodes; index 0 is the root command.
#[derive(Debug, Clone)]
pub(crate) struct ResultTree {
    nodes: Vec<ResultNode>,
}

impl ResultTree {
    pub(crate) fn new(root: SymbolId) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(None, root, ResultKind::Command);
        tree
    }

    pub(crate) fn root(&self) -> ResultId {
        ResultId(0)
    }

    pub(crate) fn node(&self, id: ResultId) -> &ResultNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: ResultId) -> &mut ResultNode {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, parent: Option<ResultId>, symbol: SymbolId, kind: ResultKind) -> ResultId {
        let id = ResultId(self.nodes.len());
        self.nodes.push(ResultNode {
            symbol,
            kind,
            parent,
            children: Vec::new(),
            occurrences: Vec::new(),
            tokens: Vec::new(),
            implicit: None,
            value: OnceLock::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub(crate) fn add(&mut self, parent: ResultId, symbol: SymbolId, kind: ResultKind) -> ResultId {
        self.push(Some(parent), symbol, kind)
    }

    pub(crate) fn add_implicit(
        &mut self,
        parent: ResultId,
        symbol: SymbolId,
        kind: ResultKind,
        value: Value,
    ) -> ResultId {
        let id = self.push(Some(parent), symbol, kind);
        self.nodes[id.0].implicit = Some(value);
        id
    }

    pub(crate) fn child_for(&self, parent: ResultId, symbol: SymbolId) -> Option<ResultId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).symbol == symbol)
    }

    pub(crate) fn find(&self, symbol: SymbolId, include_implicit: bool) -> Option<ResultId> {
        self.nodes
            .iter()
            .position(|n| n.symbol == symbol && (include_implicit || n.implicit.is_none()))
            .map(ResultId)
    }

    /// Converted value of a node, computed once.
    pub(crate) fn value(&self, tree: &SymbolTree, id: ResultId) -> &Converted {
        let node = self.node(id);
        node.value.get_or_init(|| {
            if let Some(value) = &node.implicit {
                return Ok(Some(value.clone()));
            }
            let Some(slot) = tree.symbol(node.symbol).slot() else {
                return Ok(None);
            };
            let raw: Vec<&str> = node.tokens.iter().map(|t| t.value.as_str()).collect();
            slot.value_type().convert_tokens(&raw)
        })
    }

    /// Node ids in depth-first pre-order.
    pub(crate) fn preorder(&self) -> Vec<ResultId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev());
        }
        order
    }

    /// Orders each command's children: options, then arguments, then the
    /// subcommand. Insertion order is kept within each group.
    pub(crate) fn sort_children(&mut self) {
        let kinds: Vec<ResultKind> = self.nodes.iter().map(|n| n.kind).collect();
        for node in &mut self.nodes {
            node.children.sort_by_key(|c| match kinds[c.0] {
                ResultKind::Option => 0,
                ResultKind::Argument => 1,
                ResultKind::Command => 2,
            });
        }
    }
}

/// Borrowed view of one result node.
#[derive(Clone, Copy)]
pub struct SymbolResult<'a> {
    tree: &'a SymbolTree,
    results: &'a ResultTree,
    errors: &'a [ParseError],
    id: ResultId,
}

impl<'a> SymbolResult<'a> {
    pub(crate) fn new(
        tree: &'a SymbolTree,
        results: &'a ResultTree,
        errors: &'a [ParseError],
        id: ResultId,
    ) -> Self {
        Self {
            tree,
            results,
            errors,
            id,
        }
    }

    fn node(&self) -> &'a ResultNode {
        self.results.node(self.id)
    }

    fn view(&self, id: ResultId) -> SymbolResult<'a> {
        SymbolResult { id, ..*self }
    }

    pub fn id(&self) -> ResultId {
        self.id
    }

    pub fn symbol(&self) -> SymbolId {
        self.node().symbol
    }

    /// The declared symbol this result belongs to.
    pub fn declaration(&self) -> &'a Symbol {
        self.tree.symbol(self.node().symbol)
    }

    pub fn name(&self) -> &'a str {
        self.declaration().name()
    }

    pub fn kind(&self) -> ResultKind {
        self.node().kind
    }

    /// The first token naming this symbol, if any.
    pub fn token(&self) -> Option<&'a Token> {
        self.node().occurrences.first()
    }

    /// Every token naming this symbol (each occurrence of a repeated option).
    pub fn occurrences(&self) -> &'a [Token] {
        &self.node().occurrences
    }

    /// Value tokens bound to this symbol.
    pub fn tokens(&self) -> &'a [Token] {
        &self.node().tokens
    }

    pub fn children(self) -> impl Iterator<Item = SymbolResult<'a>> {
        self.node().children.iter().map(move |c| self.view(*c))
    }

    /// Child result for `symbol`, implicit results included.
    pub fn child(&self, symbol: SymbolId) -> Option<SymbolResult<'a>> {
        self.results
            .child_for(self.id, symbol)
            .map(|id| self.view(id))
    }

    pub fn parent(&self) -> Option<SymbolResult<'a>> {
        self.node().parent.map(|id| self.view(id))
    }

    /// Errors attached to this node.
    pub fn errors(self) -> impl Iterator<Item = &'a ParseError> {
        let id = self.id;
        self.errors.iter().filter(move |e| e.result == Some(id))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// `true` when synthesized from a default without any input.
    pub fn is_implicit(&self) -> bool {
        self.node().implicit.is_some()
    }

    /// The converted value, `None` for commands, absent values or failed
    /// conversions.
    pub fn value(&self) -> Option<Value> {
        self.results
            .value(self.tree, self.id)
            .as_ref()
            .ok()
            .and_then(Clone::clone)
    }

    /// The conversion failure, if conversion failed.
    pub fn conversion_error(&self) -> Option<&'a ConversionError> {
        self.results.value(self.tree, self.id).as_ref().err()
    }

    /// Serializable snapshot of this node and its descendants.
    pub fn report(&self) -> ResultReport {
        ResultReport {
            kind: self.kind(),
            name: self.name().to_string(),
            tokens: self.tokens().iter().map(|t| t.value.clone()).collect(),
            implicit: self.is_implicit(),
            value: self.value(),
            children: self.children().map(|c| c.report()).collect(),
        }
    }
}

impl std::fmt::Debug for SymbolResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolResult")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("tokens", &self.tokens())
            .field("implicit", &self.is_implicit())
            .finish()
    }
}

/// The immutable outcome of one parse.
///
/// Borrows the [`SymbolTree`] it was parsed against, so the tree cannot be
/// mutated while the result is alive.
#[derive(Debug, Clone)]
pub struct ParseResult<'t> {
    pub(crate) tree: &'t SymbolTree,
    pub(crate) config: ParserConfig,
    pub(crate) results: ResultTree,
    pub(crate) command: ResultId,
    pub(crate) tokens: Vec<Token>,
    pub(crate) unmatched: Vec<Token>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) directives: IndexMap<String, Vec<String>>,
    pub(crate) short_circuit: Option<SymbolId>,
}

impl<'t> ParseResult<'t> {
    fn view(&self, id: ResultId) -> SymbolResult<'_> {
        SymbolResult::new(self.tree, &self.results, &self.errors, id)
    }

    pub fn tree(&self) -> &'t SymbolTree {
        self.tree
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Result for the root command.
    pub fn root_result(&self) -> SymbolResult<'_> {
        self.view(self.results.root())
    }

    /// Result for the deepest matched command.
    pub fn command_result(&self) -> SymbolResult<'_> {
        self.view(self.command)
    }

    /// Result for `symbol` if it was matched from input. Results synthesized
    /// from defaults are not returned; see
    /// [`find_result_including_defaults`](Self::find_result_including_defaults).
    pub fn find_result_for(&self, symbol: SymbolId) -> Option<SymbolResult<'_>> {
        self.results.find(symbol, false).map(|id| self.view(id))
    }

    /// Result for `symbol`, implicit default results included.
    pub fn find_result_including_defaults(&self, symbol: SymbolId) -> Option<SymbolResult<'_>> {
        self.results.find(symbol, true).map(|id| self.view(id))
    }

    /// The converted value of `symbol`, or its default when it was not
    /// matched.
    pub fn get_value(&self, symbol: SymbolId) -> Option<Value> {
        if let Some(result) = self.find_result_including_defaults(symbol) {
            return result.value();
        }
        self.tree
            .get(symbol)
            .and_then(Symbol::slot)
            .and_then(|slot| slot.default_value())
            .map(|default| default.produce())
    }

    /// Typed variant of [`get_value`](Self::get_value).
    ///
    /// Returns `None` when there is no value or it has a different type.
    pub fn get<T>(&self, symbol: SymbolId) -> Option<T>
    where
        T: TryFrom<Value>,
    {
        self.get_value(symbol).and_then(|v| T::try_from(v).ok())
    }

    /// Whether `symbol` was explicitly given on input.
    pub fn is_present(&self, symbol: SymbolId) -> bool {
        self.find_result_for(symbol).is_some()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Raw text of every token no symbol consumed, in input order.
    pub fn unmatched_tokens(&self) -> Vec<&str> {
        self.unmatched.iter().map(|t| t.value.as_str()).collect()
    }

    pub fn unmatched(&self) -> &[Token] {
        &self.unmatched
    }

    /// Every token produced from the input, directives included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn directives(&self) -> &IndexMap<String, Vec<String>> {
        &self.directives
    }

    /// The exclusive option present on input, if any. Callers may use it to
    /// short-circuit (print a version, say) instead of running a command.
    pub fn short_circuit_option(&self) -> Option<SymbolId> {
        self.short_circuit
    }

    /// Names of the matched commands, root first.
    pub fn command_path(&self) -> Vec<&'t str> {
        let mut path = Vec::new();
        let mut current = Some(self.command);
        while let Some(id) = current {
            let node = self.results.node(id);
            path.push(self.tree.symbol(node.symbol).name());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Bracketed rendering of the result tree, e.g.
    /// `[ app [ -x <123> ] <value> ]`.
    pub fn diagram(&self) -> String {
        diagram::render(self)
    }

    /// Serializable snapshot of the whole result.
    pub fn report(&self) -> ParseReport {
        ParseReport {
            command_path: self.command_path().into_iter().map(str::to_string).collect(),
            root: self.root_result().report(),
            errors: self.errors.clone(),
            unmatched_tokens: self.unmatched.iter().map(|t| t.value.clone()).collect(),
            directives: self.directives.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

/// Serializable snapshot of one result node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultReport {
    pub kind: ResultKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub implicit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResultReport>,
}

/// Serializable snapshot of a [`ParseResult`]. Two parses of the same input
/// against the same tree produce equal reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    pub command_path: Vec<String>,
    pub root: ResultReport,
    pub errors: Vec<ParseError>,
    pub unmatched_tokens: Vec<String>,
    pub directives: IndexMap<String, Vec<String>>,
    pub tokens: Vec<Token>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_line_core::{CommandSchema, OptionSchema, ValueType};

    #[test]
    fn test_value_is_converted_once() {
        let schema =
            CommandSchema::new("app").with_option(OptionSchema::new(["-x"], ValueType::Int));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let x = tree.option(tree.root(), "-x").unwrap();

        let mut results = ResultTree::new(tree.root());
        let id = results.add(results.root(), x, ResultKind::Option);
        results
            .node_mut(id)
            .tokens
            .push(Token::new("12", crate::TokenKind::Argument, 1));

        let first: *const Converted = results.value(&tree, id);
        let second: *const Converted = results.value(&tree, id);
        assert_eq!(first, second);
        assert_eq!(results.value(&tree, id), &Ok(Some(Value::Int(12))));
    }

    #[test]
    fn test_find_skips_implicit_unless_asked() {
        let schema =
            CommandSchema::new("app").with_option(OptionSchema::new(["-x"], ValueType::Int));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let x = tree.option(tree.root(), "-x").unwrap();

        let mut results = ResultTree::new(tree.root());
        results.add_implicit(results.root(), x, ResultKind::Option, Value::Int(1));
        assert_eq!(results.find(x, false), None);
        assert!(results.find(x, true).is_some());
    }

    #[test]
    fn test_sort_children_puts_subcommand_last() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::flag(["-v"]))
            .with_subcommand(CommandSchema::new("run"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let v = tree.option(tree.root(), "-v").unwrap();
        let run = tree.subcommand(tree.root(), "run").unwrap();

        let mut results = ResultTree::new(tree.root());
        let root = results.root();
        let sub = results.add(root, run, ResultKind::Command);
        let opt = results.add(root, v, ResultKind::Option);
        results.sort_children();
        assert_eq!(results.node(root).children, vec![opt, sub]);
        assert_eq!(results.preorder(), vec![root, opt, sub]);
    }
}

//! The symbol tree: an arena of commands, options and arguments.
//!
//! Symbols live in a flat `Vec` and refer to each other by [`SymbolId`].
//! Parent links are kept in a separate adjacency list so one symbol (a
//! shared option, say) can hang under several commands without any cyclic
//! ownership.
//!
//! A tree is built once and then parsed against any number of times. All
//! mutating methods take `&mut self`, so a tree cannot change while a parse
//! result borrows it.
//!
//! # Example
//!
//! ```
//! use command_line_core::*;
//!
//! let mut tree = SymbolTree::new("app").unwrap();
//! let root = tree.root();
//! let verbose = tree
//!     .add_option(root, OptionSchema::flag(["-v", "--verbose"]).global())
//!     .unwrap();
//! let build = tree.add_command(root, &CommandSchema::new("build")).unwrap();
//!
//! assert_eq!(tree.symbol(verbose).name(), "verbose");
//! assert_eq!(tree.subcommand(root, "build"), Some(build));
//! assert_eq!(tree.parents(build), &[root]);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::symbol::{ArgumentSymbol, CommandSymbol, OptionSymbol, ValueSlot};
use crate::validate::{longest_stripped, validate_alias, validate_aliases};
use crate::{
    ArgumentSchema, CommandSchema, DefaultValue, OptionSchema, ResultContext, Symbol, SymbolError,
    SymbolId, SymbolKind, Validator, Value,
};

/// Arena of declared symbols rooted at a single command.
#[derive(Debug, Clone)]
pub struct SymbolTree {
    symbols: Vec<Symbol>,
    parents: Vec<Vec<SymbolId>>,
}

impl SymbolTree {
    /// Creates a tree holding only a root command.
    ///
    /// # Errors
    ///
    /// Returns a [`SymbolError`] if `name` is not a valid alias.
    pub fn new(name: &str) -> Result<Self, SymbolError> {
        validate_alias(name)?;
        let root = Symbol {
            name: name.to_string(),
            aliases: vec![name.to_string()],
            description: None,
            hidden: false,
            kind: SymbolKind::Command(CommandSymbol {
                treat_unmatched_tokens_as_errors: true,
                ..Default::default()
            }),
        };
        Ok(Self {
            symbols: vec![root],
            parents: vec![Vec::new()],
        })
    }

    /// Builds a validated tree from a declarative schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SymbolError`] found anywhere in the schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_line_core::*;
    ///
    /// let schema = CommandSchema::new("app")
    ///     .with_option(OptionSchema::new(["-x"], ValueType::Int))
    ///     .with_option(OptionSchema::new(["-x", "--extra"], ValueType::Int));
    /// assert!(matches!(
    ///     SymbolTree::from_schema(&schema),
    ///     Err(SymbolError::DuplicateAlias { .. })
    /// ));
    /// ```
    pub fn from_schema(schema: &CommandSchema) -> Result<Self, SymbolError> {
        check_command_schema(schema)?;
        let mut tree = Self::new(&schema.name)?;
        let root = tree.root();
        for alias in &schema.aliases {
            if !tree.symbols[root.0].has_alias(alias) {
                tree.symbols[root.0].aliases.push(alias.clone());
            }
        }
        tree.fill_command(root, schema);
        Ok(tree)
    }

    /// The root command.
    pub fn root(&self) -> SymbolId {
        SymbolId(0)
    }

    /// Number of symbols in the tree.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// Looks up a symbol.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    /// Every command this symbol is attached to, in attachment order.
    pub fn parents(&self, id: SymbolId) -> &[SymbolId] {
        self.parents.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Adds a command (and everything it declares) under `parent`.
    ///
    /// # Errors
    ///
    /// Fails without modifying the tree when any alias is malformed, collides
    /// with a sibling, or `parent` is not a command.
    pub fn add_command(
        &mut self,
        parent: SymbolId,
        schema: &CommandSchema,
    ) -> Result<SymbolId, SymbolError> {
        self.command(parent)?;
        check_command_schema(schema)?;
        self.check_siblings(parent, &schema.all_aliases(), None)?;

        let id = self.push(
            Symbol {
                name: schema.name.clone(),
                aliases: schema.all_aliases(),
                description: schema.description.clone(),
                hidden: schema.hidden,
                kind: SymbolKind::Command(CommandSymbol::default()),
            },
            parent,
        );
        self.command_mut(parent).subcommands.push(id);
        self.fill_command(id, schema);
        Ok(id)
    }

    /// Adds an option under `parent`.
    ///
    /// # Errors
    ///
    /// Fails without modifying the tree on malformed or duplicate aliases,
    /// an inverted arity, or a non-command parent.
    pub fn add_option(
        &mut self,
        parent: SymbolId,
        schema: OptionSchema,
    ) -> Result<SymbolId, SymbolError> {
        self.command(parent)?;
        check_option_schema(&schema)?;
        self.check_siblings(parent, &schema.aliases, None)?;
        Ok(self.insert_option(parent, schema))
    }

    /// Adds a positional argument under `parent`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed name, an inverted arity, a name already used by
    /// another argument of `parent`, or a non-command parent.
    pub fn add_argument(
        &mut self,
        parent: SymbolId,
        schema: ArgumentSchema,
    ) -> Result<SymbolId, SymbolError> {
        self.command(parent)?;
        check_argument_schema(&schema)?;
        self.check_argument_name(parent, &schema.name)?;
        Ok(self.insert_argument(parent, schema))
    }

    /// Attaches an existing symbol under an additional parent command.
    ///
    /// # Errors
    ///
    /// Fails on unknown ids, alias collisions under `parent`, or when
    /// attaching a command would create a cycle.
    pub fn attach(&mut self, parent: SymbolId, child: SymbolId) -> Result<(), SymbolError> {
        self.command(parent)?;
        let symbol = self
            .get(child)
            .ok_or(SymbolError::UnknownSymbol(child.0))?;
        if self.parents(child).contains(&parent) {
            return Ok(());
        }

        if matches!(symbol.kind, SymbolKind::Command(_))
            && (child == parent || self.is_ancestor(child, parent))
        {
            let mut path = self.path_names(parent);
            path.push(symbol.name.clone());
            return Err(SymbolError::SubcommandCycle(path.join(" ")));
        }
        if matches!(symbol.kind, SymbolKind::Argument(_)) {
            let name = symbol.name.clone();
            self.check_argument_name(parent, &name)?;
        } else {
            let aliases = symbol.aliases.clone();
            self.check_siblings(parent, &aliases, None)?;
        }

        let kind = self.symbols[child.0].kind_name();
        let parent_cmd = self.command_mut(parent);
        match kind {
            "command" => parent_cmd.subcommands.push(child),
            "option" => parent_cmd.options.push(child),
            _ => parent_cmd.arguments.push(child),
        }
        self.parents[child.0].push(parent);
        Ok(())
    }

    /// Adds an alias to a command or option.
    ///
    /// For options, the new alias becomes the name only if it is strictly
    /// longer (after prefix stripping) than the current name.
    ///
    /// # Errors
    ///
    /// Fails on a malformed alias, a collision with a sibling under any
    /// parent, or when `id` is an argument.
    pub fn add_alias(&mut self, id: SymbolId, alias: &str) -> Result<(), SymbolError> {
        let symbol = self.get(id).ok_or(SymbolError::UnknownSymbol(id.0))?;
        if let SymbolKind::Argument(_) = symbol.kind {
            return Err(SymbolError::AliasNotSupported(symbol.name.clone()));
        }
        validate_alias(alias)?;
        if symbol.has_alias(alias) {
            return Ok(());
        }
        let alias = alias.to_string();
        for parent in self.parents(id).to_vec() {
            self.check_siblings(parent, std::slice::from_ref(&alias), Some(id))?;
        }

        let symbol = &mut self.symbols[id.0];
        symbol.aliases.push(alias);
        if let SymbolKind::Option(_) = symbol.kind {
            let candidate = longest_stripped(&symbol.aliases);
            if candidate.len() > symbol.name.len() {
                symbol.name = candidate;
            }
        }
        Ok(())
    }

    /// Sets the default value of an option or argument.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::UnknownSymbol`] when `id` is not an option or
    /// argument of this tree.
    pub fn set_default(&mut self, id: SymbolId, default: DefaultValue) -> Result<(), SymbolError> {
        let slot = self
            .symbols
            .get_mut(id.0)
            .and_then(Symbol::slot_mut)
            .ok_or(SymbolError::UnknownSymbol(id.0))?;
        slot.set_default(default);
        Ok(())
    }

    /// Registers a default-value factory, called once per parse that needs it.
    ///
    /// # Errors
    ///
    /// Same as [`set_default`](Self::set_default).
    pub fn set_default_factory<F>(&mut self, id: SymbolId, factory: F) -> Result<(), SymbolError>
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.set_default(id, DefaultValue::Factory(Arc::new(factory)))
    }

    /// Attaches a validator to a command, option or argument.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::UnknownSymbol`] for ids not in this tree.
    pub fn add_validator<F>(&mut self, id: SymbolId, validator: F) -> Result<(), SymbolError>
    where
        F: Fn(&dyn ResultContext, &mut Vec<String>) + Send + Sync + 'static,
    {
        let validator: Validator = Arc::new(validator);
        let symbol = self
            .symbols
            .get_mut(id.0)
            .ok_or(SymbolError::UnknownSymbol(id.0))?;
        match &mut symbol.kind {
            SymbolKind::Command(c) => c.validators.push(validator),
            SymbolKind::Option(o) => o.slot.validators.push(validator),
            SymbolKind::Argument(a) => a.slot.validators.push(validator),
        }
        Ok(())
    }

    /// Subcommand of `command` with the given alias (exact match).
    pub fn subcommand(&self, command: SymbolId, alias: &str) -> Option<SymbolId> {
        let cmd = self.get(command)?.as_command()?;
        cmd.subcommands
            .iter()
            .copied()
            .find(|id| self.symbol(*id).has_alias(alias))
    }

    /// Option declared directly on `command` with the given alias.
    pub fn option(&self, command: SymbolId, alias: &str) -> Option<SymbolId> {
        let cmd = self.get(command)?.as_command()?;
        cmd.options
            .iter()
            .copied()
            .find(|id| self.symbol(*id).has_alias(alias))
    }

    /// Argument declared directly on `command` with the given name.
    pub fn argument(&self, command: SymbolId, name: &str) -> Option<SymbolId> {
        let cmd = self.get(command)?.as_command()?;
        cmd.arguments
            .iter()
            .copied()
            .find(|id| self.symbol(*id).name == name)
    }

    /// Follows a path of subcommand aliases from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_line_core::*;
    ///
    /// let schema = CommandSchema::new("git").with_subcommand(
    ///     CommandSchema::new("remote").with_subcommand(CommandSchema::new("add")),
    /// );
    /// let tree = SymbolTree::from_schema(&schema).unwrap();
    /// let add = tree.find_command(&["remote", "add"]).unwrap();
    /// assert_eq!(tree.symbol(add).name(), "add");
    /// assert_eq!(tree.find_command(&[]), Some(tree.root()));
    /// assert!(tree.find_command(&["remote", "rm"]).is_none());
    /// ```
    pub fn find_command(&self, path: &[&str]) -> Option<SymbolId> {
        path.iter()
            .try_fold(self.root(), |current, alias| self.subcommand(current, alias))
    }

    /// Returns `true` if `ancestor` is reachable by following parent links
    /// upward from `id`.
    pub fn is_ancestor(&self, ancestor: SymbolId, id: SymbolId) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<SymbolId> = self.parents(id).to_vec();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if seen.insert(current) {
                stack.extend_from_slice(self.parents(current));
            }
        }
        false
    }

    /// Lazy depth-first traversal starting at `id`: a command, then its
    /// subcommands (recursively), options and arguments in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_line_core::*;
    ///
    /// let schema = CommandSchema::new("app")
    ///     .with_argument(ArgumentSchema::new("file", ValueType::Path))
    ///     .with_option(OptionSchema::flag(["-q"]))
    ///     .with_subcommand(CommandSchema::new("run").with_option(OptionSchema::flag(["-f"])));
    /// let tree = SymbolTree::from_schema(&schema).unwrap();
    ///
    /// let names: Vec<&str> = tree.walk(tree.root()).map(|id| tree.symbol(id).name()).collect();
    /// assert_eq!(names, vec!["app", "run", "f", "q", "file"]);
    /// ```
    pub fn walk(&self, id: SymbolId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: if self.get(id).is_some() {
                vec![id]
            } else {
                Vec::new()
            },
        }
    }

    /// Subcommand names from the root down to `id` along first parents.
    pub fn path_names(&self, id: SymbolId) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if !seen.insert(cur) {
                break;
            }
            names.push(self.symbol(cur).name.clone());
            current = self.parents(cur).first().copied();
        }
        names.reverse();
        names
    }

    fn command(&self, id: SymbolId) -> Result<&CommandSymbol, SymbolError> {
        let symbol = self.get(id).ok_or(SymbolError::UnknownSymbol(id.0))?;
        symbol
            .as_command()
            .ok_or_else(|| SymbolError::NotACommand(symbol.name.clone()))
    }

    fn command_mut(&mut self, id: SymbolId) -> &mut CommandSymbol {
        match &mut self.symbols[id.0].kind {
            SymbolKind::Command(c) => c,
            _ => unreachable!("callers check the parent is a command"),
        }
    }

    fn check_siblings(
        &self,
        parent: SymbolId,
        aliases: &[String],
        except: Option<SymbolId>,
    ) -> Result<(), SymbolError> {
        let cmd = self.command(parent)?;
        let siblings = cmd
            .options
            .iter()
            .chain(cmd.subcommands.iter())
            .filter(|id| Some(**id) != except);
        for sibling in siblings {
            let sibling = self.symbol(*sibling);
            if let Some(alias) = aliases.iter().find(|a| sibling.has_alias(a)) {
                return Err(SymbolError::DuplicateAlias {
                    alias: alias.clone(),
                    command: self.symbol(parent).name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Arguments live in their own namespace, apart from options and
    /// subcommands.
    fn check_argument_name(&self, parent: SymbolId, name: &str) -> Result<(), SymbolError> {
        let cmd = self.command(parent)?;
        if cmd.arguments.iter().any(|id| self.symbol(*id).name == name) {
            return Err(SymbolError::DuplicateAlias {
                alias: name.to_string(),
                command: self.symbol(parent).name.clone(),
            });
        }
        Ok(())
    }

    fn push(&mut self, symbol: Symbol, parent: SymbolId) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        self.parents.push(vec![parent]);
        id
    }

    fn insert_option(&mut self, parent: SymbolId, schema: OptionSchema) -> SymbolId {
        let slot = ValueSlot::new(
            schema.value_type,
            schema.arity,
            schema.default.map(DefaultValue::Static),
            true,
        );
        let id = self.push(
            Symbol {
                name: longest_stripped(&schema.aliases),
                aliases: schema.aliases,
                description: schema.description,
                hidden: schema.hidden,
                kind: SymbolKind::Option(OptionSymbol {
                    slot,
                    required: schema.required,
                    global: schema.global,
                    exclusive: schema.exclusive,
                }),
            },
            parent,
        );
        self.command_mut(parent).options.push(id);
        id
    }

    fn insert_argument(&mut self, parent: SymbolId, schema: ArgumentSchema) -> SymbolId {
        let slot = ValueSlot::new(
            schema.value_type,
            schema.arity,
            schema.default.map(DefaultValue::Static),
            false,
        );
        let id = self.push(
            Symbol {
                aliases: vec![schema.name.clone()],
                name: schema.name,
                description: schema.description,
                hidden: schema.hidden,
                kind: SymbolKind::Argument(ArgumentSymbol { slot }),
            },
            parent,
        );
        self.command_mut(parent).arguments.push(id);
        id
    }

    /// Populates an inserted command from an already-validated schema.
    fn fill_command(&mut self, id: SymbolId, schema: &CommandSchema) {
        {
            let cmd = self.command_mut(id);
            cmd.handler = schema.handler.clone();
            cmd.treat_unmatched_tokens_as_errors = schema.treat_unmatched_tokens_as_errors;
        }
        if let Some(desc) = &schema.description {
            self.symbols[id.0].description = Some(desc.clone());
        }
        self.symbols[id.0].hidden = schema.hidden;

        for option in &schema.options {
            self.insert_option(id, option.clone());
        }
        for argument in &schema.arguments {
            self.insert_argument(id, argument.clone());
        }
        for sub in &schema.subcommands {
            let sub_id = self.push(
                Symbol {
                    name: sub.name.clone(),
                    aliases: sub.all_aliases(),
                    description: sub.description.clone(),
                    hidden: sub.hidden,
                    kind: SymbolKind::Command(CommandSymbol::default()),
                },
                id,
            );
            self.command_mut(id).subcommands.push(sub_id);
            self.fill_command(sub_id, sub);
        }
    }
}

/// Depth-first iterator returned by [`SymbolTree::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    tree: &'a SymbolTree,
    stack: Vec<SymbolId>,
}

impl Iterator for Walk<'_> {
    type Item = SymbolId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(cmd) = self.tree.symbol(id).as_command() {
            self.stack.extend(cmd.arguments.iter().rev());
            self.stack.extend(cmd.options.iter().rev());
            self.stack.extend(cmd.subcommands.iter().rev());
        }
        Some(id)
    }
}

fn check_option_schema(schema: &OptionSchema) -> Result<(), SymbolError> {
    validate_aliases(&schema.aliases)?;
    if let Some(arity) = schema.arity {
        crate::Arity::new(arity.minimum, arity.maximum)?;
    }
    Ok(())
}

fn check_argument_schema(schema: &ArgumentSchema) -> Result<(), SymbolError> {
    validate_alias(&schema.name)?;
    if let Some(arity) = schema.arity {
        crate::Arity::new(arity.minimum, arity.maximum)?;
    }
    Ok(())
}

/// Validates a whole command schema before any of it is inserted.
fn check_command_schema(schema: &CommandSchema) -> Result<(), SymbolError> {
    validate_aliases(&schema.all_aliases())?;

    let mut seen: HashSet<&str> = HashSet::new();
    let sibling_aliases = schema
        .options
        .iter()
        .flat_map(|o| o.aliases.iter())
        .chain(schema.subcommands.iter().flat_map(|s| {
            std::iter::once(&s.name).chain(s.aliases.iter())
        }));
    for alias in sibling_aliases {
        if !seen.insert(alias.as_str()) {
            return Err(SymbolError::DuplicateAlias {
                alias: alias.clone(),
                command: schema.name.clone(),
            });
        }
    }

    let mut argument_names: HashSet<&str> = HashSet::new();
    for argument in &schema.arguments {
        if !argument_names.insert(argument.name.as_str()) {
            return Err(SymbolError::DuplicateAlias {
                alias: argument.name.clone(),
                command: schema.name.clone(),
            });
        }
    }

    schema.options.iter().try_for_each(check_option_schema)?;
    schema.arguments.iter().try_for_each(check_argument_schema)?;
    schema.subcommands.iter().try_for_each(check_command_schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arity, ValueType};

    fn app() -> (SymbolTree, SymbolId) {
        let tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        (tree, root)
    }

    #[test]
    fn test_option_name_is_longest_stripped_alias() {
        let (mut tree, root) = app();
        let id = tree
            .add_option(root, OptionSchema::new(["-o", "--output", "/out"], ValueType::Path))
            .unwrap();
        assert_eq!(tree.symbol(id).name(), "output");
    }

    #[test]
    fn test_add_alias_promotes_only_strictly_longer() {
        let (mut tree, root) = app();
        let id = tree
            .add_option(root, OptionSchema::new(["-x", "--abc"], ValueType::Int))
            .unwrap();

        tree.add_alias(id, "--xyz").unwrap();
        assert_eq!(tree.symbol(id).name(), "abc");

        tree.add_alias(id, "--longer").unwrap();
        assert_eq!(tree.symbol(id).name(), "longer");
        assert_eq!(tree.symbol(id).aliases().len(), 4);
    }

    #[test]
    fn test_add_option_rejects_malformed_aliases_without_side_effects() {
        let (mut tree, root) = app();
        let before = tree.len();

        let cases: Vec<(Vec<&str>, SymbolError)> = vec![
            (vec![], SymbolError::NoAliases),
            (vec![""], SymbolError::EmptyAlias),
            (vec![" "], SymbolError::WhitespaceAlias(" ".into())),
            (vec!["-a", "-b c"], SymbolError::WhitespaceAlias("-b c".into())),
        ];
        for (aliases, expected) in cases {
            let err = tree
                .add_option(root, OptionSchema::new(aliases, ValueType::String))
                .unwrap_err();
            assert_eq!(err, expected);
        }
        assert_eq!(tree.len(), before);
        assert!(tree.symbol(root).as_command().unwrap().options().is_empty());
    }

    #[test]
    fn test_argument_rejects_empty_name_and_aliases() {
        let (mut tree, root) = app();
        assert_eq!(
            tree.add_argument(root, ArgumentSchema::new("", ValueType::String)),
            Err(SymbolError::EmptyAlias)
        );
        let arg = tree
            .add_argument(root, ArgumentSchema::new("file", ValueType::Path))
            .unwrap();
        assert_eq!(
            tree.add_alias(arg, "f"),
            Err(SymbolError::AliasNotSupported("file".into()))
        );
    }

    #[test]
    fn test_sibling_alias_collision() {
        let (mut tree, root) = app();
        tree.add_option(root, OptionSchema::flag(["-v"])).unwrap();
        let err = tree
            .add_command(root, &CommandSchema::new("-v"))
            .unwrap_err();
        assert_eq!(
            err,
            SymbolError::DuplicateAlias {
                alias: "-v".into(),
                command: "app".into()
            }
        );
    }

    #[test]
    fn test_add_alias_checks_every_parent() {
        let (mut tree, root) = app();
        let sub = tree.add_command(root, &CommandSchema::new("sub")).unwrap();
        tree.add_option(sub, OptionSchema::flag(["-q"])).unwrap();
        let shared = tree.add_option(root, OptionSchema::flag(["-s"])).unwrap();
        tree.attach(sub, shared).unwrap();

        assert_eq!(tree.parents(shared), &[root, sub]);
        assert!(matches!(
            tree.add_alias(shared, "-q"),
            Err(SymbolError::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn test_attach_rejects_cycle() {
        let schema = CommandSchema::new("git")
            .with_subcommand(CommandSchema::new("remote").with_subcommand(CommandSchema::new("add")));
        let mut tree = SymbolTree::from_schema(&schema).unwrap();
        let remote = tree.find_command(&["remote"]).unwrap();
        let add = tree.find_command(&["remote", "add"]).unwrap();

        assert_eq!(
            tree.attach(add, remote),
            Err(SymbolError::SubcommandCycle("git remote add remote".into()))
        );
    }

    #[test]
    fn test_from_schema_rejects_bad_arity() {
        let schema = CommandSchema::new("app").with_argument(
            ArgumentSchema::new("n", ValueType::Int).with_arity(Arity {
                minimum: 3,
                maximum: Some(1),
            }),
        );
        assert!(matches!(
            SymbolTree::from_schema(&schema),
            Err(SymbolError::InvalidArity { .. })
        ));
    }

    #[test]
    fn test_from_schema_keeps_root_aliases() {
        let schema = CommandSchema::new("git")
            .with_alias("g")
            .with_alias("git")
            .with_subcommand(CommandSchema::new("status"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let root = tree.symbol(tree.root());

        assert_eq!(root.name(), "git");
        assert_eq!(root.aliases(), &["git".to_string(), "g".to_string()]);
        assert!(tree.find_command(&["status"]).is_some());
    }

    #[test]
    fn test_duplicate_argument_names_are_rejected() {
        let schema = CommandSchema::new("cp")
            .with_argument(ArgumentSchema::new("path", ValueType::Path))
            .with_argument(ArgumentSchema::new("path", ValueType::Path));
        assert_eq!(
            SymbolTree::from_schema(&schema).unwrap_err(),
            SymbolError::DuplicateAlias {
                alias: "path".into(),
                command: "cp".into()
            }
        );

        let (mut tree, root) = app();
        tree.add_argument(root, ArgumentSchema::new("file", ValueType::Path))
            .unwrap();
        assert!(matches!(
            tree.add_argument(root, ArgumentSchema::new("file", ValueType::String)),
            Err(SymbolError::DuplicateAlias { .. })
        ));
        // Arguments do not collide with option or subcommand spellings.
        tree.add_command(root, &CommandSchema::new("file")).unwrap();
    }

    #[test]
    fn test_walk_is_restartable() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::flag(["-a"]))
            .with_subcommand(CommandSchema::new("x"));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let walk = tree.walk(tree.root());
        let first: Vec<_> = walk.clone().collect();
        let second: Vec<_> = walk.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_set_default_factory_rejects_commands() {
        let (mut tree, root) = app();
        assert!(tree.set_default_factory(root, || Value::Int(1)).is_err());
    }
}

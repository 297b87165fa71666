//! Option alias lookup for one command.
//!
//! An [`AliasIndex`] covers every option visible from a command: its own
//! options plus the global options of the commands above it on the current
//! parse path. Own options shadow inherited ones with the same alias.
//!
//! Resolution rules:
//!
//! 1. an exact alias always wins;
//! 2. otherwise, with abbreviations enabled, every alias the token is a
//!    strict prefix of is a candidate and the longest candidate wins;
//! 3. candidates of equal length are ranked by declaration order, own options
//!    first, then nearer ancestors.
//!
//! # Examples
//!
//! ```
//! use command_line_core::*;
//! use command_line_parser::AliasIndex;
//!
//! let schema = CommandSchema::new("app")
//!     .with_option(OptionSchema::flag(["-o"]))
//!     .with_option(OptionSchema::new(["-option"], ValueType::String))
//!     .with_option(OptionSchema::new(["-optional-thing"], ValueType::String));
//! let tree = SymbolTree::from_schema(&schema).unwrap();
//! let index = AliasIndex::build(&tree, &[tree.root()]);
//!
//! let long = tree.option(tree.root(), "-optional-thing").unwrap();
//! let option = tree.option(tree.root(), "-option").unwrap();
//! assert_eq!(index.resolve("-option", true), Some(option));
//! assert_eq!(index.resolve("-opt", true), Some(long));
//! assert_eq!(index.resolve("-opt", false), None);
//! ```

use std::collections::HashMap;

use command_line_core::{SymbolId, SymbolTree};
use tracing::trace;

/// Alias lookup table for the options visible from one command.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    exact: HashMap<String, SymbolId>,
    /// Aliases in precedence order for abbreviation ties.
    ordered: Vec<(String, SymbolId)>,
}

impl AliasIndex {
    /// Builds the index for the last command of `path` (root first).
    pub fn build(tree: &SymbolTree, path: &[SymbolId]) -> Self {
        let mut index = Self::default();
        let Some((&current, ancestors)) = path.split_last() else {
            return index;
        };

        if let Some(cmd) = tree.symbol(current).as_command() {
            for &option in cmd.options() {
                index.insert(tree, option);
            }
        }
        for &ancestor in ancestors.iter().rev() {
            let Some(cmd) = tree.symbol(ancestor).as_command() else {
                continue;
            };
            let globals = cmd
                .options()
                .iter()
                .copied()
                .filter(|id| tree.symbol(*id).as_option().is_some_and(|o| o.is_global()));
            for option in globals {
                index.insert(tree, option);
            }
        }
        index
    }

    fn insert(&mut self, tree: &SymbolTree, option: SymbolId) {
        for alias in tree.symbol(option).aliases() {
            if self.exact.contains_key(alias) {
                continue;
            }
            self.exact.insert(alias.clone(), option);
            self.ordered.push((alias.clone(), option));
        }
    }

    /// Exact alias lookup.
    pub fn exact(&self, token: &str) -> Option<SymbolId> {
        self.exact.get(token).copied()
    }

    /// Longest alias `token` is a strict prefix of.
    pub fn abbreviation(&self, token: &str) -> Option<SymbolId> {
        let mut best: Option<&(String, SymbolId)> = None;
        for entry in &self.ordered {
            let alias = &entry.0;
            if alias.len() <= token.len() || !alias.starts_with(token) {
                continue;
            }
            if best.is_none_or(|(b, _)| alias.len() > b.len()) {
                best = Some(entry);
            }
        }
        if let Some((alias, _)) = best {
            trace!(token, alias = %alias, "resolved abbreviation");
        }
        best.map(|(_, id)| *id)
    }

    /// Exact match, then abbreviation when `allow_abbreviations` is set.
    pub fn resolve(&self, token: &str, allow_abbreviations: bool) -> Option<SymbolId> {
        self.exact(token).or_else(|| {
            if allow_abbreviations {
                self.abbreviation(token)
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Per-parse cache of alias indexes keyed by command.
#[derive(Debug, Default)]
pub(crate) struct AliasCache {
    indexes: HashMap<SymbolId, AliasIndex>,
}

impl AliasCache {
    /// Index for the last command of `path`, built on first use.
    pub(crate) fn get(&mut self, tree: &SymbolTree, path: &[SymbolId]) -> &AliasIndex {
        let current = path.last().copied().unwrap_or_else(|| tree.root());
        self.indexes
            .entry(current)
            .or_insert_with(|| AliasIndex::build(tree, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_line_core::{CommandSchema, OptionSchema, ValueType};

    fn nested() -> SymbolTree {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::flag(["-v", "--verbose"]).global())
            .with_option(OptionSchema::flag(["--local"]))
            .with_subcommand(
                CommandSchema::new("run")
                    .with_option(OptionSchema::new(["-v", "--value"], ValueType::Int)),
            );
        SymbolTree::from_schema(&schema).unwrap()
    }

    #[test]
    fn test_globals_are_inherited_but_shadowed() {
        let tree = nested();
        let root = tree.root();
        let run = tree.find_command(&["run"]).unwrap();
        let index = AliasIndex::build(&tree, &[root, run]);

        let value = tree.option(run, "--value").unwrap();
        let verbose = tree.option(root, "--verbose").unwrap();
        assert_eq!(index.exact("-v"), Some(value));
        assert_eq!(index.exact("--verbose"), Some(verbose));
        assert_eq!(index.exact("--local"), None);
    }

    #[test]
    fn test_abbreviation_tie_goes_to_own_option() {
        let tree = nested();
        let root = tree.root();
        let run = tree.find_command(&["run"]).unwrap();
        let index = AliasIndex::build(&tree, &[root, run]);

        // "--v" prefixes both "--value" and "--verbose"; the longer one wins.
        let verbose = tree.option(root, "--verbose").unwrap();
        assert_eq!(index.abbreviation("--v"), Some(verbose));
        assert_eq!(index.abbreviation("--val"), tree.option(run, "--value"));
    }

    #[test]
    fn test_equal_length_candidates_use_declaration_order() {
        let schema = CommandSchema::new("app")
            .with_option(OptionSchema::flag(["--abc"]))
            .with_option(OptionSchema::flag(["--abd"]));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let index = AliasIndex::build(&tree, &[tree.root()]);
        assert_eq!(index.abbreviation("--ab"), tree.option(tree.root(), "--abc"));
    }

    #[test]
    fn test_exact_alias_is_not_an_abbreviation() {
        let schema = CommandSchema::new("app").with_option(OptionSchema::flag(["--all"]));
        let tree = SymbolTree::from_schema(&schema).unwrap();
        let index = AliasIndex::build(&tree, &[tree.root()]);
        assert_eq!(index.abbreviation("--all"), None);
        assert!(index.resolve("--all", false).is_some());
    }

    #[test]
    fn test_cache_builds_once_per_command() {
        let tree = nested();
        let mut cache = AliasCache::default();
        let len = cache.get(&tree, &[tree.root()]).len();
        assert_eq!(len, 3);
        assert_eq!(cache.indexes.len(), 1);
        cache.get(&tree, &[tree.root()]);
        assert_eq!(cache.indexes.len(), 1);
    }
}

//! Symbol records stored in a [`SymbolTree`](crate::SymbolTree).
//!
//! A symbol is one of three variants sharing a common record (name, aliases,
//! description, hidden flag). Options and arguments carry a [`ValueSlot`]
//! describing what they accept.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::{Arity, Value, ValueType};

/// Index of a symbol inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Produces a default value on demand.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Inspects one parse result node and pushes error messages.
///
/// Validators never abort the validation pass; every validator of every
/// node runs even when earlier ones reported errors.
pub type Validator = Arc<dyn Fn(&dyn ResultContext, &mut Vec<String>) + Send + Sync>;

/// View of a parse result node handed to [`Validator`]s.
///
/// Implemented by the parser; the core crate only defines the seam.
pub trait ResultContext {
    /// Symbol the result belongs to.
    fn symbol(&self) -> SymbolId;
    /// Raw tokens bound to the result (empty for implicit results).
    fn tokens(&self) -> Vec<&str>;
    /// Converted value of the result, `None` if absent or unconvertible.
    fn value(&self) -> Option<Value>;
    /// Converted value of any symbol in the same parse, defaults included.
    fn value_of(&self, symbol: SymbolId) -> Option<Value>;
    /// Whether `symbol` was explicitly given on input.
    fn is_present(&self, symbol: SymbolId) -> bool;
}

/// Where a default value comes from.
#[derive(Clone)]
pub enum DefaultValue {
    Static(Value),
    Factory(DefaultFactory),
}

impl DefaultValue {
    pub fn produce(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// What an option or argument accepts.
#[derive(Clone)]
pub struct ValueSlot {
    pub(crate) value_type: ValueType,
    pub(crate) declared_arity: Option<Arity>,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) for_option: bool,
    arity: OnceLock<Arity>,
}

impl ValueSlot {
    pub(crate) fn new(
        value_type: ValueType,
        declared_arity: Option<Arity>,
        default: Option<DefaultValue>,
        for_option: bool,
    ) -> Self {
        Self {
            value_type,
            declared_arity,
            default,
            validators: Vec::new(),
            for_option,
            arity: OnceLock::new(),
        }
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Effective arity: the declared one, or one derived from the value type.
    ///
    /// Computed on first access and cached until the slot is mutated.
    pub fn arity(&self) -> Arity {
        *self.arity.get_or_init(|| {
            self.declared_arity.unwrap_or_else(|| {
                derive_arity(&self.value_type, self.for_option, self.default.is_some())
            })
        })
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Whether this is a boolean flag (bool type, accepting zero tokens).
    pub fn is_flag(&self) -> bool {
        self.value_type.is_bool() && self.arity().minimum == 0
    }

    pub(crate) fn set_default(&mut self, default: DefaultValue) {
        self.default = Some(default);
        self.arity = OnceLock::new();
    }
}

impl fmt::Debug for ValueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSlot")
            .field("value_type", &self.value_type)
            .field("arity", &self.arity())
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .finish()
    }
}

fn derive_arity(value_type: &ValueType, for_option: bool, has_default: bool) -> Arity {
    match (value_type, for_option) {
        (ValueType::Bool, true) => Arity::ZERO_OR_ONE,
        (ValueType::List(_), true) => Arity::ONE_OR_MORE,
        (ValueType::List(_), false) => Arity::ZERO_OR_MORE,
        (_, false) if has_default => Arity::ZERO_OR_ONE,
        _ => Arity::EXACTLY_ONE,
    }
}

/// Command-specific data.
#[derive(Clone, Default)]
pub struct CommandSymbol {
    pub(crate) arguments: Vec<SymbolId>,
    pub(crate) options: Vec<SymbolId>,
    pub(crate) subcommands: Vec<SymbolId>,
    pub(crate) handler: Option<String>,
    pub(crate) treat_unmatched_tokens_as_errors: bool,
    pub(crate) validators: Vec<Validator>,
}

impl CommandSymbol {
    pub fn arguments(&self) -> &[SymbolId] {
        &self.arguments
    }

    pub fn options(&self) -> &[SymbolId] {
        &self.options
    }

    pub fn subcommands(&self) -> &[SymbolId] {
        &self.subcommands
    }

    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    pub fn treat_unmatched_tokens_as_errors(&self) -> bool {
        self.treat_unmatched_tokens_as_errors
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

impl fmt::Debug for CommandSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSymbol")
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("subcommands", &self.subcommands)
            .field("handler", &self.handler)
            .field(
                "treat_unmatched_tokens_as_errors",
                &self.treat_unmatched_tokens_as_errors,
            )
            .finish()
    }
}

/// Option-specific data.
#[derive(Debug, Clone)]
pub struct OptionSymbol {
    pub(crate) slot: ValueSlot,
    pub(crate) required: bool,
    pub(crate) global: bool,
    pub(crate) exclusive: bool,
}

impl OptionSymbol {
    pub fn slot(&self) -> &ValueSlot {
        &self.slot
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// AppliesToSelfAndChildren: visible from every descendant command.
    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}

/// Argument-specific data.
#[derive(Debug, Clone)]
pub struct ArgumentSymbol {
    pub(crate) slot: ValueSlot,
}

impl ArgumentSymbol {
    pub fn slot(&self) -> &ValueSlot {
        &self.slot
    }

    /// An argument is required when its arity demands at least one token.
    pub fn is_required(&self) -> bool {
        self.slot.arity().minimum > 0
    }
}

/// Variant-specific part of a [`Symbol`].
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Command(CommandSymbol),
    Option(OptionSymbol),
    Argument(ArgumentSymbol),
}

/// A declared command, option or argument.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) kind: SymbolKind,
}

impl Symbol {
    /// Display name. For options, the longest alias without its prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    /// `"command"`, `"option"` or `"argument"`.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Command(_) => "command",
            SymbolKind::Option(_) => "option",
            SymbolKind::Argument(_) => "argument",
        }
    }

    pub fn as_command(&self) -> Option<&CommandSymbol> {
        match &self.kind {
            SymbolKind::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&OptionSymbol> {
        match &self.kind {
            SymbolKind::Option(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_argument(&self) -> Option<&ArgumentSymbol> {
        match &self.kind {
            SymbolKind::Argument(a) => Some(a),
            _ => None,
        }
    }

    /// Value slot of an option or argument.
    pub fn slot(&self) -> Option<&ValueSlot> {
        match &self.kind {
            SymbolKind::Option(o) => Some(&o.slot),
            SymbolKind::Argument(a) => Some(&a.slot),
            SymbolKind::Command(_) => None,
        }
    }

    pub(crate) fn slot_mut(&mut self) -> Option<&mut ValueSlot> {
        match &mut self.kind {
            SymbolKind::Option(o) => Some(&mut o.slot),
            SymbolKind::Argument(a) => Some(&mut a.slot),
            SymbolKind::Command(_) => None,
        }
    }

    /// The alias the user most likely typed: the longest one, as declared.
    ///
    /// Used in error messages (`Option '--output' is required.`).
    pub fn display_alias(&self) -> &str {
        match self.kind {
            SymbolKind::Option(_) => self
                .aliases
                .iter()
                .fold("", |best, a| if a.len() > best.len() { a.as_str() } else { best }),
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_arity() {
        let flag = ValueSlot::new(ValueType::Bool, None, None, true);
        assert_eq!(flag.arity(), Arity::ZERO_OR_ONE);
        assert!(flag.is_flag());

        let list_opt = ValueSlot::new(ValueType::List(Box::new(ValueType::Int)), None, None, true);
        assert_eq!(list_opt.arity(), Arity::ONE_OR_MORE);

        let list_arg = ValueSlot::new(ValueType::List(Box::new(ValueType::Int)), None, None, false);
        assert_eq!(list_arg.arity(), Arity::ZERO_OR_MORE);

        let scalar = ValueSlot::new(ValueType::Int, None, None, false);
        assert_eq!(scalar.arity(), Arity::EXACTLY_ONE);
    }

    #[test]
    fn test_default_relaxes_argument_arity() {
        let mut slot = ValueSlot::new(ValueType::Int, None, None, false);
        assert_eq!(slot.arity(), Arity::EXACTLY_ONE);
        slot.set_default(DefaultValue::Static(Value::Int(1)));
        assert_eq!(slot.arity(), Arity::ZERO_OR_ONE);
    }

    #[test]
    fn test_declared_arity_wins() {
        let slot = ValueSlot::new(ValueType::Bool, Some(Arity::EXACTLY_ONE), None, true);
        assert_eq!(slot.arity(), Arity::EXACTLY_ONE);
        assert!(!slot.is_flag());
    }

    #[test]
    fn test_factory_default_is_called_each_time() {
        let default = DefaultValue::Factory(Arc::new(|| Value::Int(5)));
        assert_eq!(default.produce(), Value::Int(5));
        assert_eq!(format!("{default:?}"), "Factory(..)");
    }
}

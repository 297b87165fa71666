//! Declarative, serializable descriptions of a command tree.
//!
//! A [`CommandSchema`] can be written in Rust with the builder methods or
//! loaded from JSON/YAML, then turned into a validated
//! [`SymbolTree`](crate::SymbolTree) with
//! [`SymbolTree::from_schema`](crate::SymbolTree::from_schema). Behavior
//! that cannot be serialized (default factories, validators) is attached to
//! the built tree afterwards.

use serde::{Deserialize, Serialize};

use crate::{Arity, Value, ValueType};

fn default_true() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Declaration of an option.
///
/// # Examples
///
/// ```
/// use command_line_core::{OptionSchema, ValueType};
///
/// let verbose = OptionSchema::flag(["-v", "--verbose"])
///     .with_description("Enable verbose output")
///     .global();
/// assert!(verbose.global);
/// assert_eq!(verbose.value_type, ValueType::Bool);
///
/// let output = OptionSchema::new(["-o", "--output"], ValueType::Path).required();
/// assert!(output.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    /// Every spelling, prefix included (e.g. `-o`, `--output`).
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub value_type: ValueType,
    /// Explicit arity; derived from `value_type` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<Arity>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Visible to every descendant command.
    #[serde(default, skip_serializing_if = "is_false")]
    pub global: bool,
    /// Cannot be combined with any other input.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl OptionSchema {
    /// Creates an option taking values of `value_type`.
    pub fn new<I, S>(aliases: I, value_type: ValueType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            description: None,
            value_type,
            arity: None,
            required: false,
            global: false,
            exclusive: false,
            hidden: false,
            default: None,
        }
    }

    /// Creates a boolean flag.
    pub fn flag<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(aliases, ValueType::Bool)
    }

    /// The conventional `--version` flag: exclusive, bool.
    pub fn version() -> Self {
        Self::flag(["--version"])
            .with_description("Show version information")
            .exclusive()
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Makes the option visible to every descendant command.
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Marks the option as not combinable with other input.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Declaration of a positional argument.
///
/// # Examples
///
/// ```
/// use command_line_core::{Arity, ArgumentSchema, ValueType};
///
/// let files = ArgumentSchema::new("files", ValueType::List(Box::new(ValueType::Path)))
///     .with_arity(Arity::ONE_OR_MORE);
/// assert_eq!(files.name, "files");
/// assert_eq!(files.arity, Some(Arity::ONE_OR_MORE));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<Arity>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ArgumentSchema {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            value_type,
            arity: None,
            hidden: false,
            default: None,
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Declaration of a command with its options, arguments and subcommands.
///
/// # Examples
///
/// ```
/// use command_line_core::*;
///
/// let schema = CommandSchema::new("git")
///     .with_option(OptionSchema::flag(["-v", "--verbose"]).global())
///     .with_subcommand(
///         CommandSchema::new("commit")
///             .with_alias("ci")
///             .with_option(OptionSchema::new(["-m", "--message"], ValueType::String)),
///     );
///
/// assert_eq!(schema.subcommands[0].aliases, vec!["ci"]);
/// assert!(schema.treat_unmatched_tokens_as_errors);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    pub name: String,
    /// Extra spellings besides `name`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Handler key for the invocation layer; never called by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default = "default_true")]
    pub treat_unmatched_tokens_as_errors: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSchema>,
}

impl CommandSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            hidden: false,
            handler: None,
            treat_unmatched_tokens_as_errors: true,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_handler(mut self, handler: &str) -> Self {
        self.handler = Some(handler.to_string());
        self
    }

    pub fn with_option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_argument(mut self, argument: ArgumentSchema) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_subcommand(mut self, sub: CommandSchema) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Collects unmatched tokens silently instead of reporting them.
    pub fn allow_unmatched_tokens(mut self) -> Self {
        self.treat_unmatched_tokens_as_errors = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// All spellings: the name first, then the declared aliases.
    pub fn all_aliases(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.aliases.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_schema_json_defaults() {
        let option: OptionSchema = serde_json::from_str(r#"{"aliases": ["-x"]}"#).unwrap();
        assert_eq!(option.value_type, ValueType::String);
        assert!(option.arity.is_none());
        assert!(!option.required);
    }

    #[test]
    fn test_command_schema_yaml_round_trip() {
        let yaml = r#"
name: app
options:
  - aliases: ["-x"]
    value_type: int
    default: 123
subcommands:
  - name: build
    treat_unmatched_tokens_as_errors: false
    arguments:
      - name: target
"#;
        let schema: CommandSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.options[0].default, Some(Value::Int(123)));
        assert!(schema.treat_unmatched_tokens_as_errors);
        assert!(!schema.subcommands[0].treat_unmatched_tokens_as_errors);

        let back: CommandSchema =
            serde_yaml::from_str(&serde_yaml::to_string(&schema).unwrap()).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_version_option_is_exclusive_flag() {
        let version = OptionSchema::version();
        assert!(version.exclusive);
        assert_eq!(version.value_type, ValueType::Bool);
    }

    #[test]
    fn test_all_aliases_starts_with_name() {
        let schema = CommandSchema::new("remove").with_alias("rm");
        assert_eq!(schema.all_aliases(), vec!["remove", "rm"]);
    }
}

//! Declared value types and the values produced by converting tokens.
//!
//! Conversion is deliberately small: booleans, integers, floats, paths, URLs
//! and fixed choice sets, plus lists of any of these. Callers that need richer
//! types convert from [`Value`] themselves via the `TryFrom` impls.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("static regex must compile")
});

/// Value type for options and arguments.
///
/// # Examples
///
/// ```
/// use command_line_core::{Value, ValueType};
///
/// assert_eq!(ValueType::Int.convert_one("42"), Ok(Value::Int(42)));
/// assert!(ValueType::Int.convert_one("forty-two").is_err());
///
/// let list = ValueType::List(Box::new(ValueType::Int));
/// assert_eq!(
///     list.convert_tokens(&["1", "2"]),
///     Ok(Some(Value::List(vec![Value::Int(1), Value::Int(2)])))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Boolean flag; presence alone means `true`.
    Bool,
    /// Any string (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// File or directory path.
    Path,
    /// URL with an explicit scheme.
    Url,
    /// One of a fixed set of strings.
    Choice(Vec<String>),
    /// Raw token, no conversion.
    Any,
    /// Several values of the inner type.
    List(Box<ValueType>),
}

impl ValueType {
    /// Returns `true` for `Bool`.
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Returns `true` for `List(_)`.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Converts a single raw token.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the token does not fit the type.
    pub fn convert_one(&self, raw: &str) -> Result<Value, ConversionError> {
        let invalid = || ConversionError::InvalidFormat {
            token: raw.to_string(),
            expected: self.to_string(),
        };

        match self {
            Self::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(invalid),
            Self::String | Self::Any => Ok(Value::String(raw.to_string())),
            Self::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            Self::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
            Self::Path => {
                if raw.is_empty() {
                    Err(invalid())
                } else {
                    Ok(Value::Path(PathBuf::from(raw)))
                }
            }
            Self::Url => {
                if URL_RE.is_match(raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(invalid())
                }
            }
            Self::Choice(choices) => {
                if choices.iter().any(|c| c == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(ConversionError::NotAChoice {
                        token: raw.to_string(),
                        choices: choices.clone(),
                    })
                }
            }
            Self::List(inner) => inner.convert_one(raw).map(|v| Value::List(vec![v])),
        }
    }

    /// Converts all tokens bound to one symbol.
    ///
    /// Lists convert every token; a boolean with no tokens is `true`; other
    /// scalars with no tokens have no value, and with several tokens use the
    /// last one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConversionError`] encountered.
    pub fn convert_tokens(&self, tokens: &[&str]) -> Result<Option<Value>, ConversionError> {
        match self {
            Self::List(inner) => tokens
                .iter()
                .map(|raw| inner.convert_one(raw))
                .collect::<Result<Vec<_>, _>>()
                .map(|values| Some(Value::List(values))),
            Self::Bool if tokens.is_empty() => Ok(Some(Value::Bool(true))),
            _ => match tokens.last() {
                Some(raw) => self.convert_one(raw).map(Some),
                None => Ok(None),
            },
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Path => f.write_str("path"),
            Self::Url => f.write_str("url"),
            Self::Choice(_) => f.write_str("choice"),
            Self::Any => f.write_str("any"),
            Self::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Returns `true` if `raw` is a boolean literal accepted by [`ValueType::Bool`].
pub fn is_bool_literal(raw: &str) -> bool {
    parse_bool(raw).is_some()
}

/// A converted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String view of `String` and `Path` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Path(p) => p.to_str(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

/// Failure to convert a raw token to a declared [`ValueType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The token does not parse as the expected type.
    #[error("cannot convert '{token}' to {expected}")]
    InvalidFormat { token: String, expected: String },
    /// The token is not one of the declared choices.
    #[error("'{token}' is not one of: {}", choices.join(", "))]
    NotAChoice { token: String, choices: Vec<String> },
}

impl ConversionError {
    /// The raw token that failed to convert.
    pub fn token(&self) -> &str {
        match self {
            Self::InvalidFormat { token, .. } | Self::NotAChoice { token, .. } => token,
        }
    }
}

/// Failure to extract a Rust type from a [`Value`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueError {
    pub expected: &'static str,
    pub found: Value,
}

macro_rules! try_from_value {
    ($ty:ty, $expected:literal, $pat:pat => $out:expr) => {
        impl TryFrom<Value> for $ty {
            type Error = ValueError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    $pat => Ok($out),
                    found => Err(ValueError {
                        expected: $expected,
                        found,
                    }),
                }
            }
        }
    };
}

try_from_value!(bool, "bool", Value::Bool(b) => b);
try_from_value!(i64, "int", Value::Int(i) => i);
try_from_value!(String, "string", Value::String(s) => s);

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            found => Err(ValueError {
                expected: "float",
                found,
            }),
        }
    }
}

impl TryFrom<Value> for PathBuf {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Path(p) => Ok(p),
            Value::String(s) => Ok(PathBuf::from(s)),
            found => Err(ValueError {
                expected: "path",
                found,
            }),
        }
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = ValueError>,
{
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::List(items) => items.into_iter().map(T::try_from).collect(),
            found => Err(ValueError {
                expected: "list",
                found,
            }),
        }
    }
}

//! Token-count constraints for options and arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::SymbolError;

/// Inclusive range of tokens a symbol may consume.
///
/// `maximum == None` means the range is unbounded.
///
/// # Examples
///
/// ```
/// use command_line_core::Arity;
///
/// assert!(Arity::ZERO_OR_ONE.allows(1));
/// assert!(!Arity::EXACTLY_ONE.allows(2));
/// assert!(Arity::ONE_OR_MORE.allows(1000));
/// assert!(Arity::new(3, Some(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    /// Fewest tokens required.
    pub minimum: usize,
    /// Most tokens accepted (`None` = unbounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
}

impl Arity {
    pub const ZERO: Arity = Arity {
        minimum: 0,
        maximum: Some(0),
    };
    pub const ZERO_OR_ONE: Arity = Arity {
        minimum: 0,
        maximum: Some(1),
    };
    pub const EXACTLY_ONE: Arity = Arity {
        minimum: 1,
        maximum: Some(1),
    };
    pub const ZERO_OR_MORE: Arity = Arity {
        minimum: 0,
        maximum: None,
    };
    pub const ONE_OR_MORE: Arity = Arity {
        minimum: 1,
        maximum: None,
    };

    /// Creates an arity, rejecting `minimum > maximum`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::InvalidArity`] when the bounds are inverted.
    pub fn new(minimum: usize, maximum: Option<usize>) -> Result<Self, SymbolError> {
        if let Some(max) = maximum
            && minimum > max
        {
            return Err(SymbolError::InvalidArity {
                minimum,
                maximum: max,
            });
        }
        Ok(Self { minimum, maximum })
    }

    /// Upper bound as a plain count, with `usize::MAX` standing in for unbounded.
    pub fn max_count(&self) -> usize {
        self.maximum.unwrap_or(usize::MAX)
    }

    /// Returns `true` if `count` tokens satisfy this arity.
    pub fn allows(&self, count: usize) -> bool {
        count >= self.minimum && count <= self.max_count()
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::EXACTLY_ONE
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maximum {
            Some(max) => write!(f, "[{}, {max}]", self.minimum),
            None => write!(f, "[{}, ∞]", self.minimum),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_bounds() {
        assert!(Arity::ZERO.allows(0));
        assert!(!Arity::ZERO.allows(1));
        assert!(!Arity::ONE_OR_MORE.allows(0));
        assert!(Arity::ZERO_OR_MORE.allows(0));
        assert_eq!(Arity::ZERO_OR_MORE.max_count(), usize::MAX);
    }

    #[test]
    fn test_arity_rejects_inverted_range() {
        assert_eq!(
            Arity::new(2, Some(1)),
            Err(SymbolError::InvalidArity {
                minimum: 2,
                maximum: 1
            })
        );
        assert_eq!(Arity::new(1, None), Ok(Arity::ONE_OR_MORE));
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::ZERO_OR_ONE.to_string(), "[0, 1]");
        assert_eq!(Arity::ONE_OR_MORE.to_string(), "[1, ∞]");
    }

    #[test]
    fn test_arity_serde_omits_unbounded_maximum() {
        let json = serde_json::to_string(&Arity::ONE_OR_MORE).unwrap();
        assert_eq!(json, r#"{"minimum":1}"#);
        let back: Arity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Arity::ONE_OR_MORE);
    }
}

//! Errors raised while evaluating directive expressions.

use std::fmt;

use thiserror::Error;

/// Failure evaluating an expression or calling a function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("cannot read property '{property}' of {target}")]
    PropertyOfNullish {
        property: String,
        target: &'static str,
    },

    #[error("{callee} is not a function")]
    NotCallable { callee: String },

    #[error("cannot iterate over {target}")]
    NotIterable { target: &'static str },

    #[error("cannot use 'in' to search for '{key}' in {target}")]
    InvalidIn { key: String, target: String },

    #[error("template path must be a string, found {found}")]
    InvalidPath { found: &'static str },

    #[error("{function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("too much recursion (more than {limit} nested calls)")]
    CallDepth { limit: usize },

    /// Raised by a host function.
    #[error("{0}")]
    Host(String),
}

impl EvalError {
    /// An error raised by a host function.
    pub fn host(message: impl fmt::Display) -> Self {
        Self::Host(message.to_string())
    }

    pub(crate) fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for expression evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EvalError::PropertyOfNullish {
            property: "name".to_string(),
            target: "undefined",
        };
        assert_eq!(err.to_string(), "cannot read property 'name' of undefined");

        let err = EvalError::NotCallable {
            callee: "user.greet".to_string(),
        };
        assert_eq!(err.to_string(), "user.greet is not a function");

        assert_eq!(EvalError::host("boom").to_string(), "boom");
        assert_eq!(
            EvalError::invalid_argument("reduce", "empty array").to_string(),
            "reduce: empty array"
        );
    }
}

//! Crate-level error type.

use thiserror::Error;

use crate::compiler::SyntaxError;
use crate::runtime::EvalError;

/// Everything that can go wrong compiling or rendering a template.
#[derive(Debug, Error)]
pub enum Error {
    /// A template failed to compile.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// No template exists at a resolved path.
    #[error("template not found: {path} (referenced from {referenced_from})")]
    Resolution {
        path: String,
        referenced_from: String,
    },

    /// An expression failed while rendering.
    #[error("\"{{{{{directive}}}}}\" in {path} on line {line}: {source}")]
    Eval {
        path: String,
        line: usize,
        directive: String,
        source: EvalError,
    },

    /// A tag renderer failed.
    #[error("tag `{name}` in {path} on line {line} failed: {source}")]
    Tag {
        name: String,
        path: String,
        line: usize,
        source: anyhow::Error,
    },

    /// Extends, include or tag rerenders nested too deeply.
    #[error("template nesting deeper than {limit} at {path}")]
    DepthExceeded { path: String, limit: usize },

    /// The engine configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_error_names_the_directive() {
        let err = Error::Eval {
            path: "/views/home".to_string(),
            line: 3,
            directive: "user.name".to_string(),
            source: EvalError::PropertyOfNullish {
                property: "name".to_string(),
                target: "undefined",
            },
        };
        assert_eq!(
            err.to_string(),
            "\"{{user.name}}\" in /views/home on line 3: cannot read property 'name' of undefined"
        );
    }

    #[test]
    fn test_resolution_message() {
        let err = Error::Resolution {
            path: "/views/missing".to_string(),
            referenced_from: "/views/home".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "template not found: /views/missing (referenced from /views/home)"
        );
    }
}

use std::fmt;

use crate::lexer::Position;

/// The six fatal error kinds of the checker, per the error taxonomy.
///
/// Every one of these aborts verification; there is no partial success and
/// no retry. Each variant carries whatever context is useful for printing a
/// message that points at the offending line or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Malformed surface syntax, reported by the lexer or parser.
    Parse { message: String, pos: Position },

    /// A cited line number does not exist, or a `ded` cites a line set that
    /// is not a registered sub-proof.
    Structure { message: String, line: i64 },

    /// A rule precondition failed: `mt` given a non-negation, `ds` given a
    /// non-disjunction, `de` given mismatched branches, and so on.
    Shape { message: String, line: i64 },

    /// The computed conclusion differs from the asserted `typ`.
    Equality { message: String, line: i64 },

    /// No orientation of the cited rewrite rule takes the cited line to the
    /// asserted one.
    Rewrite { message: String, line: i64 },

    /// A quantifier rule's side condition failed: a non-fresh EI constant,
    /// a UG variable with dependent EI constants still in scope, a UG
    /// variable that was never introduced, or an alpha-renaming that
    /// witnesses no unique substitution (or would instantiate into a bound
    /// variable).
    QuantifierSideCondition { message: String, line: i64 },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckError::Parse { message, pos } => {
                write!(f, "parse error at {}: {}", pos, message)
            }
            CheckError::Structure { message, line } => {
                write!(f, "line {}: structure error: {}", line, message)
            }
            CheckError::Shape { message, line } => {
                write!(f, "line {}: shape error: {}", line, message)
            }
            CheckError::Equality { message, line } => {
                write!(f, "line {}: equality error: {}", line, message)
            }
            CheckError::Rewrite { message, line } => {
                write!(f, "line {}: rewrite error: {}", line, message)
            }
            CheckError::QuantifierSideCondition { message, line } => {
                write!(f, "line {}: quantifier side condition failed: {}", line, message)
            }
        }
    }
}

impl std::error::Error for CheckError {}

impl CheckError {
    pub fn line(&self) -> Option<i64> {
        match self {
            CheckError::Parse { .. } => None,
            CheckError::Structure { line, .. }
            | CheckError::Shape { line, .. }
            | CheckError::Equality { line, .. }
            | CheckError::Rewrite { line, .. }
            | CheckError::QuantifierSideCondition { line, .. } => Some(*line),
        }
    }

    pub fn shape(line: i64, message: impl Into<String>) -> CheckError {
        CheckError::Shape {
            message: message.into(),
            line,
        }
    }

    pub fn equality(line: i64, message: impl Into<String>) -> CheckError {
        CheckError::Equality {
            message: message.into(),
            line,
        }
    }

    pub fn rewrite(line: i64, message: impl Into<String>) -> CheckError {
        CheckError::Rewrite {
            message: message.into(),
            line,
        }
    }

    pub fn quantifier(line: i64, message: impl Into<String>) -> CheckError {
        CheckError::QuantifierSideCondition {
            message: message.into(),
            line,
        }
    }

    pub fn structure(line: i64, message: impl Into<String>) -> CheckError {
        CheckError::Structure {
            message: message.into(),
            line,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;

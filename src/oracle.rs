//! Matching oracle: counting, enumeration and fullmatch over rendered regexes.

use thiserror::Error;

use crate::ast::Pattern;
use crate::compiler::{self, Program};
use crate::language;
use crate::parser::{self, ParseError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("invalid regex: {0}")]
    Syntax(#[from] ParseError),
    /// Enumeration produced an inconsistent composition of partial results.
    #[error("cannot compose matches of {regex:?}")]
    Composition { regex: String },
    /// The candidate handed to fullmatch was not a usable string value.
    #[error("candidate {candidate:?} is not a string value for {regex:?}")]
    TypeMismatch { regex: String, candidate: String },
    #[error("{regex:?} matches infinitely many strings")]
    Unbounded { regex: String },
}

/// Regex services the generation pipeline depends on.
///
/// Implementations must be deterministic: the same regex always yields the
/// same count, the same enumeration order and the same witness.
pub trait MatchOracle {
    /// Distinct matches of `regex`, saturating at `cap`.
    fn bounded_count(&self, regex: &str, cap: usize) -> Result<usize, OracleError>;

    /// All distinct matches in a stable order.
    fn enumerate(&self, regex: &str) -> Result<Vec<String>, OracleError>;

    fn fullmatch(&self, regex: &str, candidate: &str) -> Result<bool, OracleError>;

    /// One arbitrary match, `None` when the language is empty.
    fn sample_one(&self, regex: &str) -> Result<Option<String>, OracleError>;
}

/// Oracle that parses each regex and walks its language exhaustively.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveOracle;

/// A parsed and compiled regex.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub pattern: Pattern,
    pub program: Program,
}

impl Compiled {
    pub fn new(regex: &str) -> Result<Self, ParseError> {
        let pattern = parser::parse(regex)?;
        let program = compiler::compile(&pattern);
        Ok(Compiled { pattern, program })
    }

    pub fn fullmatch(&self, candidate: &str) -> bool {
        crate::vm::fullmatch(&self.program, candidate)
    }
}

impl MatchOracle for ExhaustiveOracle {
    fn bounded_count(&self, regex: &str, cap: usize) -> Result<usize, OracleError> {
        let pattern = parser::parse(regex)?;
        Ok(language::count(&pattern, cap))
    }

    fn enumerate(&self, regex: &str) -> Result<Vec<String>, OracleError> {
        let pattern = parser::parse(regex)?;
        language::enumerate(&pattern)
            .map_err(|_| OracleError::Unbounded { regex: regex.to_string() })
    }

    fn fullmatch(&self, regex: &str, candidate: &str) -> Result<bool, OracleError> {
        Ok(Compiled::new(regex)?.fullmatch(candidate))
    }

    fn sample_one(&self, regex: &str) -> Result<Option<String>, OracleError> {
        let pattern = parser::parse(regex)?;
        Ok(language::witness(&pattern))
    }
}

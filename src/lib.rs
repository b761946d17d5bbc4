//! Random regular expressions with exhaustive, verified example sets.
//!
//! A [`RegexGenerator`] synthesizes random pattern trees, renders them to
//! regex text and keeps only candidates whose language is finite, small
//! and fully enumerable. Every emitted [`GenerationRecord`] carries all the
//! strings its regex fullmatches, and no regex is emitted twice.
//!
//! ```no_run
//! use random_regex::{GeneratorConfig, RegexGenerator};
//!
//! let mut generator = RegexGenerator::seeded(GeneratorConfig::default(), 42)?;
//! for record in generator.generate().take(3) {
//!     let record = record?;
//!     println!("{} -> {:?}", record.regex, record.examples);
//! }
//! # Ok::<(), random_regex::Error>(())
//! ```

pub mod ast;
pub mod chars;
pub mod charset;
pub mod compiler;
pub mod config;
pub mod dedup;
pub mod error;
pub mod generator;
pub mod language;
pub mod oracle;
pub mod parser;
pub mod pattern;
mod render;
pub mod vm;

pub use ast::{ClassKind, Pattern, RepeatKind, SetItem};
pub use config::{ComplexityBudget, ConfigError, GeneratorConfig};
pub use dedup::{BloomFilter, ExactFilter, MembershipFilter, ScalableBloomFilter};
pub use error::Error;
pub use generator::{
    Generate, GenerationRecord, GeneratorState, PipelineStats, RegexGenerator, Rejection,
};
pub use oracle::{ExhaustiveOracle, MatchOracle, OracleError};
pub use parser::{ParseError, parse};

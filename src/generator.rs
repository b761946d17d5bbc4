//! Generation pipeline: synthesize, render, filter, deduplicate.
//!
//! Each pull runs whole attempts until one candidate survives every stage:
//!
//! 1. bounds: `2 < complexity < max_complexity` and `1 <= length < max_length`
//! 2. feasibility: one sampled match fullmatches
//! 3. expansion: enumerate every match
//! 4. consistency: the enumeration has exactly `complexity` strings
//! 5. exhaustive fullmatch: every enumerated string fullmatches
//! 6. dedup: the regex was never emitted by this generator
//!
//! The dedup filter is written only after a candidate passes all six stages.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::dedup::{MembershipFilter, ScalableBloomFilter};
use crate::error::Error;
use crate::oracle::{ExhaustiveOracle, MatchOracle, OracleError};
use crate::pattern::PatternGenerator;

/// One emitted regex together with its ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub regex: String,
    /// Number of distinct fullmatching strings.
    pub complexity: usize,
    /// `regex.chars().count()`
    pub length: usize,
    /// Every fullmatching string, in enumeration order.
    pub examples: Vec<String>,
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    Infeasible,
    Composition,
    Inconsistent,
    Mismatch,
    Duplicate,
}

/// Per-stage counters over the lifetime of a generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub attempts: u64,
    pub out_of_bounds: u64,
    pub infeasible: u64,
    pub composition: u64,
    pub inconsistent: u64,
    pub mismatch: u64,
    pub duplicates: u64,
    pub accepted: u64,
}

impl PipelineStats {
    fn record(&mut self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::OutOfBounds => &mut self.out_of_bounds,
            Rejection::Infeasible => &mut self.infeasible,
            Rejection::Composition => &mut self.composition,
            Rejection::Inconsistent => &mut self.inconsistent,
            Rejection::Mismatch => &mut self.mismatch,
            Rejection::Duplicate => &mut self.duplicates,
        };
        *counter += 1;
    }

    pub fn rejected(&self) -> u64 {
        self.attempts - self.accepted
    }
}

enum Verdict {
    Accept { complexity: usize, examples: Vec<String> },
    Reject(Rejection),
}

/// What a generator persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorState<F> {
    pub config: GeneratorConfig,
    pub filter: F,
}

#[derive(Serialize)]
struct GeneratorStateRef<'a, F> {
    config: &'a GeneratorConfig,
    filter: &'a F,
}

/// Stream of non-repeating random regexes with exhaustive examples.
pub struct RegexGenerator<R, O = ExhaustiveOracle, F = ScalableBloomFilter> {
    config: GeneratorConfig,
    patterns: PatternGenerator,
    rng: R,
    oracle: O,
    filter: F,
    stats: PipelineStats,
}

impl RegexGenerator<StdRng> {
    /// Deterministic generator: equal configs and seeds give equal streams.
    pub fn seeded(config: GeneratorConfig, seed: u64) -> Result<Self, Error> {
        Self::new(config, StdRng::seed_from_u64(seed), ExhaustiveOracle)
    }

    pub fn from_entropy(config: GeneratorConfig) -> Result<Self, Error> {
        Self::new(config, StdRng::from_entropy(), ExhaustiveOracle)
    }
}

impl<R: Rng, O: MatchOracle> RegexGenerator<R, O> {
    /// Generator deduplicating through a [`ScalableBloomFilter`] sized from
    /// `item_count` and `false_positive_rate`.
    pub fn new(config: GeneratorConfig, rng: R, oracle: O) -> Result<Self, Error> {
        let filter = ScalableBloomFilter::new(config.item_count, config.false_positive_rate);
        Self::with_filter(config, rng, oracle, filter)
    }
}

impl<R: Rng, O: MatchOracle, F: MembershipFilter> RegexGenerator<R, O, F> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn with_filter(
        config: GeneratorConfig,
        rng: R,
        oracle: O,
        filter: F,
    ) -> Result<Self, Error> {
        config.validate()?;
        let patterns = PatternGenerator::new(config.budget)?;
        tracing::debug!(
            max_complexity = config.max_complexity,
            max_length = config.max_length,
            known = filter.len(),
            "regex generator ready"
        );
        Ok(Self { config, patterns, rng, oracle, filter, stats: PipelineStats::default() })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn dedup_filter(&self) -> &F {
        &self.filter
    }

    /// Lazy, endless stream of records. Nothing runs until the first pull.
    pub fn generate(&mut self) -> Generate<'_, R, O, F> {
        Generate { generator: self }
    }

    /// Run attempts until one is accepted.
    ///
    /// Never returns if the configuration makes acceptance impossible; see
    /// [`next_within`](Self::next_within) for a bounded variant.
    pub fn next_record(&mut self) -> Result<GenerationRecord, Error> {
        loop {
            if let Some(record) = self.attempt()? {
                return Ok(record);
            }
        }
    }

    /// Like [`next_record`](Self::next_record) but gives up after
    /// `max_attempts` candidates.
    pub fn next_within(&mut self, max_attempts: usize) -> Result<Option<GenerationRecord>, Error> {
        for _ in 0..max_attempts {
            if let Some(record) = self.attempt()? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Synthesize and screen a single candidate.
    pub fn attempt(&mut self) -> Result<Option<GenerationRecord>, Error> {
        self.stats.attempts += 1;
        let regex = self.patterns.random_pattern(&mut self.rng).to_string();
        match self.screen(&regex)? {
            Verdict::Accept { complexity, examples } => {
                self.filter.add(&regex);
                self.stats.accepted += 1;
                let length = regex.chars().count();
                Ok(Some(GenerationRecord { regex, complexity, length, examples }))
            }
            Verdict::Reject(rejection) => {
                tracing::trace!(%regex, ?rejection, "candidate rejected");
                self.stats.record(rejection);
                Ok(None)
            }
        }
    }

    fn screen(&self, regex: &str) -> Result<Verdict, Error> {
        let max_complexity = self.config.max_complexity;

        // a length miss settles the bounds stage without paying for a count
        let length = regex.chars().count();
        if !(1..self.config.max_length).contains(&length) {
            return Ok(Verdict::Reject(Rejection::OutOfBounds));
        }
        let complexity = self.oracle.bounded_count(regex, max_complexity)?;
        if !(complexity > 2 && complexity < max_complexity) {
            return Ok(Verdict::Reject(Rejection::OutOfBounds));
        }

        if !self.can_fullmatch(regex)? {
            return Ok(Verdict::Reject(Rejection::Infeasible));
        }

        let examples = match self.oracle.enumerate(regex) {
            Ok(examples) => examples,
            Err(OracleError::Composition { .. }) => {
                return Ok(Verdict::Reject(Rejection::Composition));
            }
            Err(err) => return Err(err.into()),
        };

        if examples.len() != complexity {
            return Ok(Verdict::Reject(Rejection::Inconsistent));
        }

        for example in &examples {
            match self.oracle.fullmatch(regex, example) {
                Ok(true) => {}
                Ok(false) | Err(OracleError::TypeMismatch { .. }) => {
                    return Ok(Verdict::Reject(Rejection::Mismatch));
                }
                Err(err) => return Err(err.into()),
            }
        }

        if self.filter.contains(regex) {
            return Ok(Verdict::Reject(Rejection::Duplicate));
        }
        Ok(Verdict::Accept { complexity, examples })
    }

    fn can_fullmatch(&self, regex: &str) -> Result<bool, Error> {
        let Some(example) = self.oracle.sample_one(regex)? else {
            return Ok(false);
        };
        match self.oracle.fullmatch(regex, &example) {
            Ok(matched) => Ok(matched),
            Err(OracleError::TypeMismatch { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl<R, O, F: MembershipFilter + Serialize> RegexGenerator<R, O, F> {
    /// Configuration plus dedup state, encoded with bincode.
    pub fn save_state(&self) -> Result<Vec<u8>, Error> {
        let state = GeneratorStateRef { config: &self.config, filter: &self.filter };
        Ok(bincode::serialize(&state)?)
    }
}

impl<R: Rng, O: MatchOracle, F: MembershipFilter + DeserializeOwned> RegexGenerator<R, O, F> {
    /// Rebuild a generator from [`save_state`](Self::save_state) output. The
    /// restored filter still rejects everything emitted before.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
    pub fn restore(bytes: &[u8], rng: R, oracle: O) -> Result<Self, Error> {
        let state: GeneratorState<F> = bincode::deserialize(bytes)?;
        Self::with_filter(state.config, rng, oracle, state.filter)
    }
}

/// Borrowing iterator returned by [`RegexGenerator::generate`].
pub struct Generate<'a, R, O, F> {
    generator: &'a mut RegexGenerator<R, O, F>,
}

impl<R: Rng, O: MatchOracle, F: MembershipFilter> Iterator for Generate<'_, R, O, F> {
    type Item = Result<GenerationRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.next_record())
    }
}

impl<R: Rng, O: MatchOracle, F: MembershipFilter> Iterator for RegexGenerator<R, O, F> {
    type Item = Result<GenerationRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ExactFilter;
    use std::cell::Cell;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig { max_complexity: 200, max_length: 16, ..Default::default() }
    }

    #[test]
    fn records_satisfy_invariants() {
        let mut generator = RegexGenerator::seeded(small_config(), 17).unwrap();
        for record in generator.generate().take(25) {
            let record = record.unwrap();
            assert_eq!(record.length, record.regex.chars().count());
            assert_eq!(record.complexity, record.examples.len());
            assert!(record.complexity > 2 && record.complexity < 200);
            assert!(record.length >= 1 && record.length < 16);
        }
        let stats = generator.stats();
        assert_eq!(stats.accepted, 25);
        assert_eq!(
            stats.rejected(),
            stats.out_of_bounds
                + stats.infeasible
                + stats.composition
                + stats.inconsistent
                + stats.mismatch
                + stats.duplicates
        );
    }

    #[test]
    fn accepted_regexes_land_in_the_filter() {
        let rng = StdRng::seed_from_u64(5);
        let mut generator =
            RegexGenerator::with_filter(small_config(), rng, ExhaustiveOracle, ExactFilter::new())
                .unwrap();
        let records: Vec<_> = generator.generate().take(10).map(Result::unwrap).collect();
        assert_eq!(generator.dedup_filter().len(), 10);
        assert!(records.iter().all(|r| generator.dedup_filter().contains(&r.regex)));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = GeneratorConfig { item_count: 0, ..Default::default() };
        assert!(matches!(RegexGenerator::seeded(config, 1), Err(Error::Config(_))));
    }

    /// Oracle with canned answers. The witness "x" always fullmatches.
    struct StubOracle {
        count: usize,
        enumerate: Result<Vec<String>, OracleError>,
        fullmatch: Result<bool, OracleError>,
        enumerate_calls: Cell<usize>,
    }

    impl MatchOracle for StubOracle {
        fn bounded_count(&self, _regex: &str, cap: usize) -> Result<usize, OracleError> {
            Ok(self.count.min(cap))
        }

        fn enumerate(&self, _regex: &str) -> Result<Vec<String>, OracleError> {
            self.enumerate_calls.set(self.enumerate_calls.get() + 1);
            self.enumerate.clone()
        }

        fn fullmatch(&self, _regex: &str, candidate: &str) -> Result<bool, OracleError> {
            if candidate == "x" { Ok(true) } else { self.fullmatch.clone() }
        }

        fn sample_one(&self, _regex: &str) -> Result<Option<String>, OracleError> {
            Ok(Some("x".to_string()))
        }
    }

    fn xyz() -> Vec<String> {
        ["x", "y", "z"].map(String::from).to_vec()
    }

    fn stubbed(
        count: usize,
        enumerate: Result<Vec<String>, OracleError>,
        fullmatch: Result<bool, OracleError>,
    ) -> RegexGenerator<StdRng, StubOracle, ExactFilter> {
        // every rendered pattern fits, so only the stub decides
        let config = GeneratorConfig { max_length: 1_000_000, ..Default::default() };
        let oracle = StubOracle { count, enumerate, fullmatch, enumerate_calls: Cell::new(0) };
        let rng = StdRng::seed_from_u64(0);
        RegexGenerator::with_filter(config, rng, oracle, ExactFilter::new()).unwrap()
    }

    #[test]
    fn stub_answers_are_accepted() {
        let mut generator = stubbed(3, Ok(xyz()), Ok(true));
        let record = generator.attempt().unwrap().unwrap();
        assert_eq!(record.complexity, 3);
        assert_eq!(record.examples, xyz());
        assert!(generator.dedup_filter().contains(&record.regex));
    }

    #[test]
    fn composition_failure_rejects() {
        let composition = OracleError::Composition { regex: String::new() };
        let mut generator = stubbed(3, Err(composition), Ok(true));
        assert_eq!(generator.attempt().unwrap(), None);
        assert_eq!(generator.stats().composition, 1);
        assert!(generator.dedup_filter().is_empty());
    }

    #[test]
    fn type_mismatch_rejects() {
        let mismatch =
            OracleError::TypeMismatch { regex: String::new(), candidate: "y".to_string() };
        let mut generator = stubbed(3, Ok(xyz()), Err(mismatch));
        assert_eq!(generator.attempt().unwrap(), None);
        assert_eq!(generator.stats().mismatch, 1);
    }

    #[test]
    fn other_oracle_errors_propagate() {
        let unbounded = OracleError::Unbounded { regex: "a+".to_string() };
        let mut generator = stubbed(3, Err(unbounded), Ok(true));
        assert!(matches!(generator.attempt(), Err(Error::Oracle(OracleError::Unbounded { .. }))));
        assert!(generator.dedup_filter().is_empty());
    }

    #[test]
    fn count_mismatch_rejects() {
        let mut generator = stubbed(4, Ok(xyz()), Ok(true));
        assert_eq!(generator.attempt().unwrap(), None);
        assert_eq!(generator.stats().inconsistent, 1);
    }

    #[test]
    fn oversized_languages_are_never_enumerated() {
        let mut generator = stubbed(1_000_000, Ok(xyz()), Ok(true));
        assert_eq!(generator.next_within(20).unwrap(), None);
        assert_eq!(generator.stats().out_of_bounds, 20);
        assert_eq!(generator.oracle.enumerate_calls.get(), 0);
    }

    #[test]
    fn false_fullmatch_rejects() {
        let mut generator = stubbed(3, Ok(xyz()), Ok(false));
        assert_eq!(generator.attempt().unwrap(), None);
        assert_eq!(generator.stats().mismatch, 1);
    }
}

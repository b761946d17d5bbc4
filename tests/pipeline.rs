//! End-to-end runs of the generator with the built-in oracle.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use random_regex::{
    ExactFilter, ExhaustiveOracle, GenerationRecord, GeneratorConfig, MatchOracle, MembershipFilter,
    RegexGenerator, ScalableBloomFilter,
};

fn take(generator: &mut RegexGenerator<StdRng>, n: usize) -> Vec<GenerationRecord> {
    generator.generate().take(n).collect::<Result<_, _>>().unwrap()
}

fn check_default_stream(n: usize) {
    let config = GeneratorConfig::default();
    let mut generator = RegexGenerator::seeded(config.clone(), 2024).unwrap();
    let records = take(&mut generator, n);
    assert_eq!(records.len(), n);

    let oracle = ExhaustiveOracle;
    let mut seen = HashSet::new();
    for record in &records {
        assert!(seen.insert(record.regex.clone()), "repeated {}", record.regex);
        assert_eq!(record.length, record.regex.chars().count());
        assert!(record.length >= 1 && record.length < config.max_length);
        assert!(record.complexity > 2 && record.complexity < config.max_complexity);
        assert_eq!(record.examples.len(), record.complexity);

        let distinct: HashSet<&String> = record.examples.iter().collect();
        assert_eq!(distinct.len(), record.examples.len());
        for example in &record.examples {
            let matched = oracle.fullmatch(&record.regex, example).unwrap();
            assert!(matched, "{example:?} vs {}", record.regex);
        }
    }
}

#[test]
fn default_config_records_hold_every_invariant() {
    check_default_stream(150);
}

#[test]
#[ignore = "slow in debug builds; run with --ignored"]
fn thousand_default_records_hold_every_invariant() {
    check_default_stream(1000);
}

#[test]
fn impossible_bounds_starve_the_stream() {
    // no count satisfies 2 < c < 3
    let config = GeneratorConfig { max_complexity: 3, ..Default::default() };
    let mut generator = RegexGenerator::seeded(config, 8).unwrap();
    assert_eq!(generator.next_within(300).unwrap(), None);
    assert_eq!(generator.stats().accepted, 0);
    assert_eq!(generator.stats().attempts, 300);
    assert!(generator.dedup_filter().is_empty());
}

#[test]
fn same_seed_same_stream() {
    let mut a = RegexGenerator::seeded(GeneratorConfig::default(), 99).unwrap();
    let mut b = RegexGenerator::seeded(GeneratorConfig::default(), 99).unwrap();
    assert_eq!(take(&mut a, 20), take(&mut b, 20));
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn tight_length_bound_is_respected() {
    let config = GeneratorConfig { max_length: 14, ..Default::default() };
    let mut generator = RegexGenerator::seeded(config, 3).unwrap();
    for record in take(&mut generator, 10) {
        assert!(record.length < 14, "{}", record.regex);
    }
}

#[test]
fn regexes_are_never_repeated_with_an_exact_filter() {
    // narrow budget: one terminal group of at most three chars
    let mut config = GeneratorConfig::default();
    config.budget.breadth_complexity = 1;
    config.budget.group_complexity = 3;
    config.budget.complex_group_prob = 0.0;
    let rng = StdRng::seed_from_u64(12);
    let mut generator =
        RegexGenerator::with_filter(config, rng, ExhaustiveOracle, ExactFilter::new()).unwrap();

    let mut seen = HashSet::new();
    for record in generator.generate().take(60) {
        let record = record.unwrap();
        assert!(seen.insert(record.regex));
    }
    assert_eq!(generator.dedup_filter().len(), 60);
}

#[test]
fn restored_generator_skips_everything_emitted_before() {
    let config = GeneratorConfig::default();
    let mut first = RegexGenerator::seeded(config.clone(), 5).unwrap();
    let emitted: HashSet<String> = take(&mut first, 30).into_iter().map(|r| r.regex).collect();
    let bytes = first.save_state().unwrap();

    // replaying the same seed proposes the same candidates again
    let mut restored: RegexGenerator<StdRng, ExhaustiveOracle, ScalableBloomFilter> =
        RegexGenerator::restore(&bytes, StdRng::seed_from_u64(5), ExhaustiveOracle).unwrap();
    assert_eq!(restored.config(), &config);
    for record in take(&mut restored, 10) {
        assert!(!emitted.contains(&record.regex), "re-emitted {}", record.regex);
    }
    assert!(restored.stats().duplicates >= 30);
}

#[test]
fn corrupt_state_is_an_error() {
    let result: Result<RegexGenerator<StdRng>, _> =
        RegexGenerator::restore(&[1, 2, 3], StdRng::seed_from_u64(0), ExhaustiveOracle);
    assert!(matches!(result, Err(random_regex::Error::State(_))));
}

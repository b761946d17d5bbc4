//! Language enumeration: the distinct strings a pattern fullmatches.
//!
//! Everything is computed over [`charset::PRINTABLE`]. Sets keep insertion
//! order, so enumeration is deterministic for a given tree.
//!
//! Capped enumeration relies on monotonicity: concatenating with a non-empty
//! language never shrinks the set, and a union is at least as large as its
//! largest branch. Any intermediate set that exceeds the cap therefore proves
//! the whole language exceeds it, and the walk stops there. Sequences with an
//! empty factor are cut off before any factor is expanded, which keeps the
//! same bound for uncapped enumeration.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::ast::Pattern;
use crate::charset;

pub type StringSet = IndexSet<String, FxBuildHasher>;

/// Result of walking a node.
#[derive(Debug)]
enum Lang {
    Finite(StringSet),
    /// More strings than the cap, or infinitely many.
    TooLarge,
}

/// The language is infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unbounded;

/// Number of distinct matches, saturating at `cap`.
pub fn count(pattern: &Pattern, cap: usize) -> usize {
    match walk(pattern, Some(cap)) {
        Lang::Finite(set) => set.len().min(cap),
        Lang::TooLarge => cap,
    }
}

/// Every distinct match in walk order.
///
/// Unlike [`count`] there is no cap; callers bound the size first. No
/// intermediate set grows past the final language, so the cost follows the
/// size of the result.
pub fn enumerate(pattern: &Pattern) -> Result<Vec<String>, Unbounded> {
    match walk(pattern, None) {
        Lang::Finite(set) => Ok(set.into_iter().collect()),
        Lang::TooLarge => Err(Unbounded),
    }
}

/// One matching string, or `None` when nothing matches.
pub fn witness(pattern: &Pattern) -> Option<String> {
    match pattern {
        Pattern::Sequence(nodes) => nodes.iter().map(witness).collect(),
        Pattern::Union(branches) if branches.is_empty() => Some(String::new()),
        Pattern::Union(branches) => branches.iter().find_map(witness),
        Pattern::Repeat { node, kind } => match kind.min() {
            0 => Some(String::new()),
            n => witness(node).map(|w| w.repeat(n as usize)),
        },
        Pattern::Optional(_) => Some(String::new()),
        Pattern::Group(node) => witness(node),
        single => charset::PRINTABLE.chars().find(|ch| single.accepts_char(*ch)).map(String::from),
    }
}

fn singleton_empty() -> StringSet {
    let mut set = StringSet::default();
    set.insert(String::new());
    set
}

fn exceeds(set: &StringSet, cap: Option<usize>) -> bool {
    cap.is_some_and(|cap| set.len() > cap)
}

fn walk(node: &Pattern, cap: Option<usize>) -> Lang {
    match node {
        Pattern::Sequence(nodes) => walk_sequence(nodes, cap),
        Pattern::Union(branches) => walk_union(branches, cap),
        Pattern::Repeat { node, kind } => walk_repeat(node, kind.min(), kind.max(), cap),
        Pattern::Optional(node) => walk_repeat(node, 0, Some(1), cap),
        Pattern::Group(node) => walk(node, cap),
        single => {
            let mut set = StringSet::default();
            for ch in charset::PRINTABLE.chars().filter(|ch| single.accepts_char(*ch)) {
                set.insert(ch.to_string());
            }
            if exceeds(&set, cap) { Lang::TooLarge } else { Lang::Finite(set) }
        }
    }
}

fn walk_sequence(nodes: &[Pattern], cap: Option<usize>) -> Lang {
    // an empty factor empties the product, so settle that before expanding any sibling
    if nodes.iter().any(|node| witness(node).is_none()) {
        return Lang::Finite(StringSet::default());
    }
    let mut acc = singleton_empty();
    for node in nodes {
        let part = match walk(node, cap) {
            Lang::Finite(set) => set,
            Lang::TooLarge => return Lang::TooLarge,
        };
        acc = match product(&acc, &part, cap) {
            Lang::Finite(set) => set,
            Lang::TooLarge => return Lang::TooLarge,
        };
    }
    Lang::Finite(acc)
}

fn walk_union(branches: &[Pattern], cap: Option<usize>) -> Lang {
    if branches.is_empty() {
        return Lang::Finite(singleton_empty());
    }
    let mut acc = StringSet::default();
    for branch in branches {
        match walk(branch, cap) {
            Lang::Finite(set) => acc.extend(set),
            Lang::TooLarge => return Lang::TooLarge,
        }
        if exceeds(&acc, cap) {
            return Lang::TooLarge;
        }
    }
    Lang::Finite(acc)
}

fn walk_repeat(node: &Pattern, min: u32, max: Option<u32>, cap: Option<usize>) -> Lang {
    if max == Some(0) {
        return Lang::Finite(singleton_empty());
    }
    let base = match walk(node, cap) {
        Lang::Finite(set) => set,
        Lang::TooLarge => return Lang::TooLarge,
    };
    if base.is_empty() {
        return if min == 0 { Lang::Finite(singleton_empty()) } else { Lang::Finite(base) };
    }
    if base.len() == 1 && base.contains("") {
        return Lang::Finite(base);
    }
    // a non-empty string repeated without bound
    let Some(max) = max else {
        return Lang::TooLarge;
    };

    let mut result = StringSet::default();
    let mut power = singleton_empty();
    for k in 0..=max {
        if k >= min {
            result.extend(power.iter().cloned());
            if exceeds(&result, cap) {
                return Lang::TooLarge;
            }
        }
        if k < max {
            power = match product(&power, &base, cap) {
                Lang::Finite(set) => set,
                Lang::TooLarge => return Lang::TooLarge,
            };
        }
    }
    Lang::Finite(result)
}

fn product(left: &StringSet, right: &StringSet, cap: Option<usize>) -> Lang {
    let mut out = StringSet::default();
    for l in left {
        for r in right {
            let mut joined = String::with_capacity(l.len() + r.len());
            joined.push_str(l);
            joined.push_str(r);
            out.insert(joined);
            if exceeds(&out, cap) {
                return Lang::TooLarge;
            }
        }
    }
    Lang::Finite(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn strings(pattern: &str) -> Vec<String> {
        enumerate(&parse(pattern).unwrap()).unwrap()
    }

    #[test]
    fn enumerates_in_walk_order() {
        assert_eq!(strings("a[bc]"), vec!["ab", "ac"]);
        assert_eq!(strings("x{1,2}"), vec!["x", "xx"]);
        assert_eq!(strings("(?:a|b)?"), vec!["", "a", "b"]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(strings("(?:a|a)"), vec!["a"]);
        assert_eq!(strings("a?a?"), vec!["", "a", "aa"]);
        assert_eq!(count(&parse("(?:(?:a{0,4}){0,8})").unwrap(), 1000), 33);
    }

    #[test]
    fn classes_count_over_printable() {
        let cap = 1000;
        assert_eq!(count(&parse(".").unwrap(), cap), 99);
        assert_eq!(count(&parse("\\s").unwrap(), cap), 6);
        assert_eq!(count(&parse("\\w").unwrap(), cap), 63);
        assert_eq!(count(&parse("[^a]").unwrap(), cap), 99);
        assert_eq!(count(&parse("[\\r- ]").unwrap(), cap), 2);
    }

    #[test]
    fn count_saturates_at_cap() {
        assert_eq!(count(&parse("\\d\\d\\d\\d").unwrap(), 1000), 1000);
        assert_eq!(count(&parse("\\d\\d\\d").unwrap(), 1000), 1000);
        assert_eq!(count(&parse("\\d\\d").unwrap(), 1000), 100);
        assert_eq!(count(&parse("a+").unwrap(), 50), 50);
    }

    #[test]
    fn empty_factor_wins_over_large_one() {
        let pattern = Pattern::Sequence(vec![
            parse("\\w{5}").unwrap(),
            Pattern::Set { items: vec![], negated: false },
        ]);
        assert_eq!(count(&pattern, 10), 0);
        assert_eq!(witness(&pattern), None);
    }

    #[test]
    fn empty_factor_stops_expansion_of_earlier_siblings() {
        // `[^\S\W]` matches nothing, so only the digit branch survives
        let pattern = parse("(?:\\w{6}[^\\S\\W]|\\d)").unwrap();
        assert_eq!(count(&pattern, 1000), 10);
        let digits: Vec<String> = ('0'..='9').map(String::from).collect();
        assert_eq!(enumerate(&pattern).unwrap(), digits);
        assert_eq!(strings("(?:\\d{6}[^\\d\\D]){0,3}"), vec![""]);
    }

    #[test]
    fn infinite_language_is_unbounded() {
        assert_eq!(enumerate(&parse("ab*").unwrap()), Err(Unbounded));
        assert_eq!(strings("(?:)*"), vec![""]);
    }

    #[test]
    fn witness_prefers_minimal_repeats() {
        assert_eq!(witness(&parse("a{2,4}b?").unwrap()), Some("aa".to_string()));
        assert_eq!(witness(&parse("(?:)").unwrap()), Some(String::new()));
        assert_eq!(witness(&parse("[^\\d\\D]?x").unwrap()), Some("x".to_string()));
    }
}

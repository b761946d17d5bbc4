//! Char-level pattern generator.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::ast::{ClassKind, Pattern, RepeatKind, SetItem};
use crate::charset;
use crate::config::{ComplexityBudget, ConfigError};

/// Wrap `node` in a bounded repeat: `{lo}` or `{lo,lo+extra}`, both drawn
/// from `0..=amount`. The upper bound saturates at `u32::MAX`.
pub fn bounded_repeat<R: Rng>(node: Pattern, amount: u32, rng: &mut R) -> Pattern {
    let lo = rng.gen_range(0..=amount);
    if rng.gen_bool(0.5) {
        Pattern::repeat(node, RepeatKind::Exactly(lo))
    } else {
        let hi = lo.saturating_add(rng.gen_range(0..=amount));
        Pattern::repeat(node, RepeatKind::Between(lo, hi))
    }
}

/// Candidate member of a random set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Class(ClassKind),
    Literal(char),
}

impl Member {
    fn into_item(self) -> SetItem {
        match self {
            Member::Class(kind) => SetItem::Class(kind),
            Member::Literal(ch) => SetItem::Literal(ch),
        }
    }
}

/// Generates single-character nodes, optionally under a bounded repeat.
#[derive(Debug, Clone)]
pub struct CharGenerator {
    set_complexity: usize,
    amount_complexity: u32,
    special_char_prob: f64,
    complex_char_prob: f64,
    members: Vec<Member>,
}

impl CharGenerator {
    pub fn new(budget: &ComplexityBudget) -> Result<Self, ConfigError> {
        budget.validate_chars()?;
        let members = ClassKind::ALL
            .into_iter()
            .map(Member::Class)
            .chain(charset::LITERALS.chars().map(Member::Literal))
            .collect();
        Ok(Self {
            set_complexity: budget.set_complexity,
            amount_complexity: budget.amount_complexity,
            special_char_prob: budget.special_char_prob,
            complex_char_prob: budget.complex_char_prob,
            members,
        })
    }

    /// `length` independent draws of [`next_char`](Self::next_char).
    pub fn chars<R: Rng>(&self, length: usize, rng: &mut R) -> Vec<Pattern> {
        (0..length).map(|_| self.next_char(rng)).collect()
    }

    /// A complex char (repeat-wrapped, or plain by a coin flip) with
    /// `complex_char_prob`, a simple char otherwise.
    pub fn next_char<R: Rng>(&self, rng: &mut R) -> Pattern {
        if rng.gen_bool(self.complex_char_prob) && rng.gen_bool(0.5) {
            let simple = self.simple_char(rng);
            bounded_repeat(simple, self.amount_complexity, rng)
        } else {
            self.simple_char(rng)
        }
    }

    /// With `special_char_prob`, one of plain special / range / set in equal
    /// shares; a printable literal otherwise.
    fn simple_char<R: Rng>(&self, rng: &mut R) -> Pattern {
        if !rng.gen_bool(self.special_char_prob) {
            return random_literal(rng);
        }
        match rng.gen_range(0..3) {
            0 => plain_special(rng),
            1 => random_range(rng),
            _ => self.random_set(rng),
        }
    }

    fn random_set<R: Rng>(&self, rng: &mut R) -> Pattern {
        let count = rng.gen_range(1..=self.set_complexity);
        let items = self.distinct_members(count, rng).into_iter().map(Member::into_item).collect();
        Pattern::Set { items, negated: rng.gen_bool(0.5) }
    }

    /// `count` distinct members without a class next to its complement,
    /// sorted by their rendered text.
    fn distinct_members<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Member> {
        // at most one class of each complementary pair fits
        let conflict_free = self.members.len() - ClassKind::ALL.len() / 2;
        let mut picked: Vec<Member> = if count > conflict_free {
            charset::LITERALS.chars().map(Member::Literal).collect()
        } else {
            loop {
                let sample: Vec<Member> =
                    self.members.choose_multiple(rng, count).copied().collect();
                if !has_conflict(&sample) {
                    break sample;
                }
            }
        };
        picked.sort_by_cached_key(|member| member.into_item().to_string());
        picked
    }
}

fn has_conflict(members: &[Member]) -> bool {
    members.iter().any(|member| match member {
        Member::Class(kind) => members.contains(&Member::Class(kind.complement())),
        Member::Literal(_) => false,
    })
}

fn plain_special<R: Rng>(rng: &mut R) -> Pattern {
    let pick = rng.gen_range(0..=ClassKind::ALL.len());
    match ClassKind::ALL.get(pick) {
        Some(kind) => Pattern::SpecialClass(*kind),
        None => Pattern::AnySingle,
    }
}

/// `[a-b]` over two printable chars, ordered ascending.
fn random_range<R: Rng>(rng: &mut R) -> Pattern {
    let printable = charset::PRINTABLE.as_bytes();
    match (printable.choose(rng), printable.choose(rng)) {
        (Some(&a), Some(&b)) => Pattern::range(char::from(a), char::from(b)),
        _ => random_literal(rng),
    }
}

fn random_literal<R: Rng>(rng: &mut R) -> Pattern {
    match charset::LITERALS.as_bytes().choose(rng) {
        Some(&ch) => Pattern::Literal(char::from(ch)),
        None => Pattern::AnySingle,
    }
}

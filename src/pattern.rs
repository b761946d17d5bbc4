//! Recursive pattern synthesis under depth, breadth and complexity budgets.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::ast::Pattern;
use crate::chars::{CharGenerator, bounded_repeat};
use crate::config::{ComplexityBudget, ConfigError};

/// The forms a base group can take in the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupVariant {
    Plain,
    Union,
    Repeat,
    Optional,
}

impl GroupVariant {
    pub const ALL: [GroupVariant; 4] =
        [GroupVariant::Plain, GroupVariant::Union, GroupVariant::Repeat, GroupVariant::Optional];

    /// Selection weight given the probability of picking any wrapped form.
    pub fn weight(self, complex_group_prob: f64) -> f64 {
        match self {
            GroupVariant::Plain => 1.0 - complex_group_prob,
            GroupVariant::Union | GroupVariant::Repeat | GroupVariant::Optional => {
                complex_group_prob / 3.0
            }
        }
    }
}

/// Builds whole pattern trees out of char nodes and wrapped groups.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    budget: ComplexityBudget,
    chars: CharGenerator,
}

impl PatternGenerator {
    pub fn new(budget: ComplexityBudget) -> Result<Self, ConfigError> {
        budget.validate()?;
        let chars = CharGenerator::new(&budget)?;
        Ok(Self { budget, chars })
    }

    pub fn budget(&self) -> &ComplexityBudget {
        &self.budget
    }

    /// A fresh candidate regex body.
    pub fn random_pattern<R: Rng>(&self, rng: &mut R) -> Pattern {
        self.random_pattern_at(0, rng)
    }

    /// `Sequence` of `1..=breadth` groups drawn from the weighted pool.
    pub fn random_pattern_at<R: Rng>(&self, depth: usize, rng: &mut R) -> Pattern {
        let group_count = rng.gen_range(1..=self.budget.breadth_complexity);
        Pattern::Sequence(self.random_groups(group_count, depth, rng))
    }

    /// Builds all four variants for each of `group_count` slots, then samples
    /// `group_count` of them with replacement by variant weight.
    fn random_groups<R: Rng>(&self, group_count: usize, depth: usize, rng: &mut R) -> Vec<Pattern> {
        let mut candidates = Vec::with_capacity(group_count * GroupVariant::ALL.len());
        let mut weights = Vec::with_capacity(candidates.capacity());
        for _ in 0..group_count {
            let base = self.group_pattern(depth, rng);
            for variant in GroupVariant::ALL {
                let candidate = match variant {
                    GroupVariant::Plain => base.clone(),
                    GroupVariant::Union => self.union_group(depth, rng),
                    GroupVariant::Repeat => {
                        let amount = self.budget.amount_complexity;
                        Pattern::group(bounded_repeat(base.clone(), amount, rng))
                    }
                    GroupVariant::Optional => Pattern::group(Pattern::optional(base.clone())),
                };
                candidates.push(candidate);
                weights.push(variant.weight(self.budget.complex_group_prob));
            }
        }

        match WeightedIndex::new(&weights) {
            Ok(dist) => (0..group_count).map(|_| candidates[dist.sample(rng)].clone()).collect(),
            // only reachable when every weight is zero, which validation rules out
            Err(_) => candidates.into_iter().step_by(GroupVariant::ALL.len()).collect(),
        }
    }

    /// `Group(Union(..))` of `0..=union_complexity` fresh groups.
    fn union_group<R: Rng>(&self, depth: usize, rng: &mut R) -> Pattern {
        let count = rng.gen_range(0..=self.budget.union_complexity);
        let branches = (0..count).map(|_| self.group_pattern(depth, rng)).collect();
        Pattern::group(Pattern::Union(branches))
    }

    /// Terminal group of chars past the depth budget, a nested pattern otherwise.
    fn group_pattern<R: Rng>(&self, depth: usize, rng: &mut R) -> Pattern {
        if depth > self.budget.depth_complexity {
            let length = rng.gen_range(0..=self.budget.group_complexity);
            Pattern::group(Pattern::Sequence(self.chars.chars(length, rng)))
        } else {
            Pattern::group(self.random_pattern_at(depth + 1, rng))
        }
    }
}

//! Split planning: shuffle, allocate, build, rebalance, check coverage.
//!
//! Planning is pure bookkeeping over [`Pair`]s; nothing here touches the
//! filesystem.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use log::debug;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use super::allocate::{allocate_species, first_max_by, PerSplit, Split, SplitCounts, SplitRatios};

/// Upper bound on single-pair moves while chasing the exact targets.
pub const MAX_REBALANCE_MOVES: usize = 2000;

/// Species with at least this many pairs are expected in every split.
pub const COVERAGE_MIN_PAIRS: usize = 3;

/// An image and its label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub image: PathBuf,
    pub label: PathBuf,
    pub species: String,
}

/// Pairs grouped by species, in species order.
pub type SpeciesGroups = BTreeMap<String, Vec<Pair>>;

/// Pairs assigned to each split.
pub type Assignment = PerSplit<Vec<Pair>>;

/// Species missing from a split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    pub split: Split,
    pub missing: Vec<String>,
}

/// The outcome of planning a split.
#[derive(Clone, Debug)]
pub struct SplitPlan {
    pub assignment: Assignment,
    /// Totals straight after per-species allocation.
    pub initial: SplitCounts,
    /// Totals after rebalancing.
    pub totals: SplitCounts,
    /// Number of pairs moved while rebalancing.
    pub moves: usize,
    pub coverage: Vec<CoverageGap>,
}

/// Plan a train/val/test split of `groups` aiming at `targets` totals.
///
/// Each species group is shuffled with a generator seeded from `seed`, so
/// the plan is deterministic for a given input and seed.
pub fn plan_split(mut groups: SpeciesGroups, targets: &SplitCounts, seed: u64) -> SplitPlan {
    let mut rng = StdRng::seed_from_u64(seed);
    for pairs in groups.values_mut() {
        pairs.shuffle(&mut rng);
    }

    let total: usize = groups.values().map(Vec::len).sum();
    let species_sizes: BTreeMap<String, usize> = groups
        .iter()
        .map(|(species, pairs)| (species.clone(), pairs.len()))
        .collect();

    let mut assignment = if total == 0 {
        Assignment::default()
    } else {
        let ratios = SplitRatios::from_targets(targets, total);
        build_assignment(groups, &ratios)
    };

    let initial = totals(&assignment);
    debug!("initial totals -> {initial}");

    let moves = rebalance(&mut assignment, targets);
    let final_totals = totals(&assignment);
    debug!("final totals -> {final_totals} after {moves} move(s)");

    let coverage = coverage_gaps(&assignment, &species_sizes);

    SplitPlan {
        assignment,
        initial,
        totals: final_totals,
        moves,
        coverage,
    }
}

/// Hand out each species' pairs in consecutive train, val, test slices.
fn build_assignment(groups: SpeciesGroups, ratios: &SplitRatios) -> Assignment {
    let mut assignment = Assignment::default();

    for (species, pairs) in groups {
        let counts = allocate_species(pairs.len(), ratios);
        debug!("{species}: {counts}");

        let mut rest = pairs.into_iter();
        for split in Split::ALL {
            assignment
                .get_mut(split)
                .extend(rest.by_ref().take(*counts.get(split)));
        }
    }

    assignment
}

pub fn totals(assignment: &Assignment) -> SplitCounts {
    assignment.map(Vec::len)
}

/// Move pairs one at a time from the most over-target split to the most
/// under-target split until the totals match or no move can help.
///
/// Returns the number of pairs moved.
pub fn rebalance(assignment: &mut Assignment, targets: &SplitCounts) -> usize {
    let mut moves = 0;

    while moves < MAX_REBALANCE_MOVES {
        let current = totals(assignment);
        if current == *targets {
            break;
        }

        let over: Vec<Split> = Split::ALL
            .into_iter()
            .filter(|&s| current.get(s) > targets.get(s))
            .collect();
        let under: Vec<Split> = Split::ALL
            .into_iter()
            .filter(|&s| current.get(s) < targets.get(s))
            .collect();
        if over.is_empty() || under.is_empty() {
            break;
        }

        let from = first_max_by(&over, |s| (current.get(s) - targets.get(s)) as f64);
        let to = first_max_by(&under, |s| (targets.get(s) - current.get(s)) as f64);
        if !move_one(assignment, from, to) {
            break;
        }
        moves += 1;
    }

    moves
}

/// Move one pair from `from` to `to`, preferring a pair whose species keeps
/// at least one other pair in `from`.
fn move_one(assignment: &mut Assignment, from: Split, to: Split) -> bool {
    let source = assignment.get_mut(from);
    if source.is_empty() {
        return false;
    }

    let mut species_counts: HashMap<&str, usize> = HashMap::new();
    for pair in source.iter() {
        *species_counts.entry(pair.species.as_str()).or_insert(0) += 1;
    }

    let index = source
        .iter()
        .position(|pair| species_counts[pair.species.as_str()] > 1)
        .unwrap_or(source.len() - 1);

    let pair = source.remove(index);
    assignment.get_mut(to).push(pair);
    true
}

/// Species with enough pairs that are nonetheless absent from a split.
pub fn coverage_gaps(
    assignment: &Assignment,
    species_sizes: &BTreeMap<String, usize>,
) -> Vec<CoverageGap> {
    let mut gaps = Vec::new();

    for split in Split::ALL {
        let present: HashSet<&str> = assignment
            .get(split)
            .iter()
            .map(|pair| pair.species.as_str())
            .collect();

        let missing: Vec<String> = species_sizes
            .iter()
            .filter(|&(species, &size)| {
                size >= COVERAGE_MIN_PAIRS && !present.contains(species.as_str())
            })
            .map(|(species, _)| species.clone())
            .collect();

        if !missing.is_empty() {
            gaps.push(CoverageGap { split, missing });
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(species: &str, index: usize) -> Pair {
        Pair {
            image: PathBuf::from(format!("{species}({index}).jpg")),
            label: PathBuf::from(format!("{species}({index}).txt")),
            species: species.to_string(),
        }
    }

    fn groups(sizes: &[(&str, usize)]) -> SpeciesGroups {
        sizes
            .iter()
            .map(|&(species, n)| {
                (
                    species.to_string(),
                    (1..=n).map(|i| pair(species, i)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn exact_targets_are_met_with_full_coverage() {
        let input = groups(&[("Rose", 10), ("Fern", 6), ("Lily", 4)]);
        let targets = SplitCounts::new(12, 5, 3);

        let plan = plan_split(input, &targets, 42);

        assert_eq!(plan.totals, targets);
        assert!(plan.coverage.is_empty(), "gaps: {:?}", plan.coverage);
    }

    #[test]
    fn plan_is_deterministic_for_a_seed() {
        let targets = SplitCounts::new(12, 5, 3);
        let a = plan_split(groups(&[("Rose", 10), ("Fern", 10)]), &targets, 7);
        let b = plan_split(groups(&[("Rose", 10), ("Fern", 10)]), &targets, 7);
        assert_eq!(a.assignment, b.assignment);
    }

    #[test]
    fn every_pair_is_assigned_exactly_once() {
        let input = groups(&[("Rose", 9), ("Fern", 2), ("Lily", 1)]);
        let targets = SplitCounts::new(90, 35, 20);

        let plan = plan_split(input, &targets, 42);

        let mut all: Vec<Pair> = Split::ALL
            .iter()
            .flat_map(|&s| plan.assignment.get(s).clone())
            .collect();
        all.sort_by(|a, b| a.image.cmp(&b.image));
        let mut expected: Vec<Pair> = groups(&[("Rose", 9), ("Fern", 2), ("Lily", 1)])
            .into_values()
            .flatten()
            .collect();
        expected.sort_by(|a, b| a.image.cmp(&b.image));
        assert_eq!(all, expected);
    }

    #[test]
    fn rebalance_stops_when_nothing_is_under_target() {
        // Targets exceed the pairs available: every split ends up under,
        // so nothing moves.
        let mut assignment = Assignment::new(
            vec![pair("Rose", 1), pair("Rose", 2)],
            vec![pair("Rose", 3)],
            vec![],
        );
        let moves = rebalance(&mut assignment, &SplitCounts::new(90, 35, 20));
        assert_eq!(moves, 0);
        assert_eq!(totals(&assignment), SplitCounts::new(2, 1, 0));
    }

    #[test]
    fn move_prefers_species_with_company() {
        let mut assignment = Assignment::new(
            vec![pair("Lily", 1), pair("Rose", 1), pair("Rose", 2)],
            vec![],
            vec![],
        );
        assert!(move_one(&mut assignment, Split::Train, Split::Val));
        assert_eq!(assignment.val, vec![pair("Rose", 1)]);
        assert_eq!(assignment.train, vec![pair("Lily", 1), pair("Rose", 2)]);

        // Only singletons left: the last pair goes.
        assert!(move_one(&mut assignment, Split::Train, Split::Test));
        assert_eq!(assignment.test, vec![pair("Rose", 2)]);
    }

    #[test]
    fn coverage_ignores_small_species() {
        let assignment = Assignment::new(
            vec![pair("Rose", 1), pair("Rose", 2), pair("Fern", 1)],
            vec![pair("Rose", 3)],
            vec![],
        );
        let sizes: BTreeMap<String, usize> =
            [("Rose".to_string(), 3), ("Fern".to_string(), 1)].into();

        let gaps = coverage_gaps(&assignment, &sizes);
        assert_eq!(
            gaps,
            vec![CoverageGap {
                split: Split::Test,
                missing: vec!["Rose".to_string()],
            }]
        );
    }
}

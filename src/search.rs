use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::machine::Machine;
use crate::network::{AmplifierConfig, AmplifierNetwork};

/// Every ordering of `items`, generated with Heap's algorithm.
///
/// The order of the output is fixed for a given input, which keeps searches
/// over it reproducible.
pub fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
    let mut current = items.to_vec();
    let n = current.len();
    let mut out = vec![current.clone()];
    let mut counters = vec![0usize; n];

    let mut i = 1;
    while i < n {
        if counters[i] < i {
            if i % 2 == 0 {
                current.swap(0, i);
            } else {
                current.swap(counters[i], i);
            }
            out.push(current.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    out
}

/// The best phase ordering found by [`max_signal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    pub signal: i64,
    pub phases: Vec<i64>,
}

/// Try every ordering of `config.phases` and return the one producing the
/// highest final signal.
///
/// Each network is single-threaded; independent networks are evaluated in
/// parallel. Results are gathered in permutation order, so ties go to the
/// first ordering generated and repeated runs agree. Any network error
/// aborts the search.
pub fn max_signal(program: &[i64], config: &AmplifierConfig) -> Result<Tuning> {
    let orderings = permutations(&config.phases);
    info!(
        amplifiers = config.phases.len(),
        orderings = orderings.len(),
        "searching phase orderings"
    );

    let signals: Vec<i64> = orderings
        .par_iter()
        .map(|phases| AmplifierNetwork::new(program, phases, config.seed_signal)?.run())
        .collect::<Result<_>>()?;

    let mut best = 0;
    for (idx, &signal) in signals.iter().enumerate() {
        if signal > signals[best] {
            best = idx;
        }
    }
    debug!(signal = signals[best], phases = ?orderings[best], "best ordering");

    Ok(Tuning {
        signal: signals[best],
        phases: orderings[best].clone(),
    })
}

/// Find the first `(noun, verb)` in `range x range` such that running
/// `program` with cell 1 set to noun and cell 2 set to verb leaves `target`
/// in cell 0.
///
/// Candidates that fault are skipped rather than aborting the search.
pub fn find_noun_verb(
    program: &[i64],
    target: i64,
    range: std::ops::RangeInclusive<i64>,
) -> Option<(i64, i64)> {
    let mut machine = Machine::with_program(program);
    for noun in range.clone() {
        for verb in range.clone() {
            match run_patched(&mut machine, noun, verb) {
                Ok(value) if value == target => return Some((noun, verb)),
                Ok(_) => {}
                Err(err) => debug!(noun, verb, %err, "candidate faulted"),
            }
        }
    }
    None
}

/// Reset `machine`, patch cells 1 and 2, run to completion and read cell 0.
pub fn run_patched(machine: &mut Machine, noun: i64, verb: i64) -> Result<i64> {
    machine.reset();
    machine.poke(1, noun)?;
    machine.poke(2, verb)?;
    machine.run()?;
    machine.peek(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_permutations_count_and_uniqueness() {
        let perms = permutations(&[0, 1, 2, 3, 4]);
        assert_eq!(perms.len(), 120);
        let unique: HashSet<_> = perms.iter().cloned().collect();
        assert_eq!(unique.len(), 120);
        for p in &perms {
            let mut sorted = p.clone();
            sorted.sort();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_permutations_small() {
        assert_eq!(permutations(&[]), vec![Vec::<i64>::new()]);
        assert_eq!(permutations(&[7]), vec![vec![7]]);
        assert_eq!(permutations(&[1, 2]), vec![vec![1, 2], vec![2, 1]]);
        assert_eq!(permutations(&[1, 2, 3]).len(), 6);
    }

    #[test]
    fn test_series_examples() {
        let cases: [(&[i64], i64, [i64; 5]); 3] = [
            (
                &[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0],
                43210,
                [4, 3, 2, 1, 0],
            ),
            (
                &[
                    3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23,
                    23, 4, 23, 99, 0, 0,
                ],
                54321,
                [0, 1, 2, 3, 4],
            ),
            (
                &[
                    3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7,
                    33, 1, 33, 31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
                ],
                65210,
                [1, 0, 4, 3, 2],
            ),
        ];
        for (program, signal, phases) in cases {
            let tuning = max_signal(program, &AmplifierConfig::series()).unwrap();
            assert_eq!(tuning.signal, signal);
            assert_eq!(tuning.phases, phases.to_vec());
        }
    }

    #[test]
    fn test_feedback_examples() {
        let program = [
            3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1,
            28, 1005, 28, 6, 99, 0, 0, 5,
        ];
        let tuning = max_signal(&program, &AmplifierConfig::default()).unwrap();
        assert_eq!(tuning.signal, 139629729);
        assert_eq!(tuning.phases, vec![9, 8, 7, 6, 5]);

        let program = [
            3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001,
            54, -5, 54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55,
            53, 4, 53, 1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
        ];
        let tuning = max_signal(&program, &AmplifierConfig::default()).unwrap();
        assert_eq!(tuning.signal, 18216);
        assert_eq!(tuning.phases, vec![9, 7, 8, 5, 6]);
    }

    #[test]
    fn test_search_is_repeatable() {
        let program = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
        let a = max_signal(&program, &AmplifierConfig::series()).unwrap();
        let b = max_signal(&program, &AmplifierConfig::series()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_propagates_errors() {
        assert!(max_signal(&[3, 0, 99], &AmplifierConfig::series()).is_err());
    }

    #[test]
    fn test_noun_verb() {
        // cell0 = cell[noun] * cell[verb] over a table of distinct values.
        let program = [2, 0, 0, 0, 99, 3, 5, 7, 11, 13];
        // 7 * 13 = 91 at cells 7 and 9.
        assert_eq!(find_noun_verb(&program, 91, 0..=9), Some((7, 9)));
        assert_eq!(find_noun_verb(&program, 1_000_000, 0..=9), None);
    }

    #[test]
    fn test_run_patched_resets_between_runs() {
        let mut machine = Machine::with_program(&[1, 0, 0, 0, 99]);
        assert_eq!(run_patched(&mut machine, 4, 4).unwrap(), 198);
        assert_eq!(run_patched(&mut machine, 0, 0).unwrap(), 2);
    }
}

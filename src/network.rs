use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::machine::{Machine, State};

/// Configuration for an amplifier network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmplifierConfig {
    /// Phase settings to assign, one amplifier per phase. The search in
    /// [`crate::search`] tries every ordering of these.
    pub phases: Vec<i64>,
    /// Signal fed to the first amplifier after its phase.
    pub seed_signal: i64,
}

impl Default for AmplifierConfig {
    fn default() -> Self {
        Self {
            phases: (5..=9).collect(), // feedback loop
            seed_signal: 0,
        }
    }
}

impl AmplifierConfig {
    /// Phases 0..=4: each amplifier runs once and the chain ends at the last.
    pub fn series() -> Self {
        Self {
            phases: (0..=4).collect(),
            ..Default::default()
        }
    }
}

/// A ring of machines where each output feeds the next machine's input and
/// the last machine feeds the first.
///
/// Exactly one machine is active at a time. The active machine is stepped
/// until it produces a value, which is handed to its successor, which then
/// becomes active. Scheduling is strictly round-robin, so the result depends
/// only on the program and the phase order.
pub struct AmplifierNetwork {
    machines: Vec<Machine>,
    /// Whether each machine has handed on at least one value.
    produced: Vec<bool>,
    active: usize,
    last_output: Option<i64>,
}

impl AmplifierNetwork {
    /// Build one independent machine per phase and seed the first with
    /// `seed_signal`.
    pub fn new(program: &[i64], phases: &[i64], seed_signal: i64) -> Result<Self> {
        if phases.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        let mut machines: Vec<Machine> = phases
            .iter()
            .map(|&phase| {
                let mut machine = Machine::with_program(program);
                machine.push_input(phase);
                machine
            })
            .collect();
        machines[0].push_input(seed_signal);

        Ok(Self {
            produced: vec![false; machines.len()],
            machines,
            active: 0,
            last_output: None,
        })
    }

    pub fn from_config(program: &[i64], config: &AmplifierConfig) -> Result<Self> {
        Self::new(program, &config.phases, config.seed_signal)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// The most recent value handed between amplifiers.
    pub fn last_output(&self) -> Option<i64> {
        self.last_output
    }

    pub fn is_halted(&self) -> bool {
        self.machines.iter().all(|m| m.state() == State::Halted)
    }

    /// Drive the active machine until it produces one value, then pass that
    /// value to the next machine in the ring and make it active.
    ///
    /// Returns `None` when the active machine halted instead. That is the
    /// normal end of an amplifier that has already produced output, and the
    /// cursor moves on without forwarding anything. Halting before ever
    /// producing output is [`Error::NoOutput`].
    pub fn step(&mut self) -> Result<Option<i64>> {
        let index = self.active;
        let next = (index + 1) % self.machines.len();
        let machine = &mut self.machines[index];

        while !machine.has_output() {
            match machine.state() {
                State::Halted if self.produced[index] => {
                    debug!(amplifier = index, steps = machine.steps(), "finished");
                    self.active = next;
                    return Ok(None);
                }
                State::Halted => {
                    warn!(amplifier = index, ip = machine.ip(), "halted without output");
                    return Err(Error::NoOutput {
                        machine: index,
                        ip: machine.ip(),
                    });
                }
                State::WaitingForInput if !machine.has_input() => {
                    warn!(amplifier = index, ip = machine.ip(), "deadlocked on input");
                    return Err(Error::Deadlock {
                        machine: index,
                        ip: machine.ip(),
                    });
                }
                State::Idle | State::Running | State::WaitingForInput => {
                    machine.step()?;
                }
            }
        }

        let value = machine.pop_output()?;
        self.produced[index] = true;
        self.last_output = Some(value);
        self.active = next;
        debug!(from = index, to = next, value, "handoff");
        self.machines[next].push_input(value);
        Ok(Some(value))
    }

    /// Step until every machine has halted and return the final signal.
    pub fn run(&mut self) -> Result<i64> {
        while !self.is_halted() {
            self.step()?;
        }
        self.last_output.ok_or(Error::NoOutput {
            machine: self.active,
            ip: self.machines[self.active].ip(),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn same_phases_same_result(phases in Just(vec![5i64, 6, 7, 8, 9]).prop_shuffle()) {
            let program = [
                3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28,
                -1, 28, 1005, 28, 6, 99, 0, 0, 5,
            ];
            let first = AmplifierNetwork::new(&program, &phases, 0).and_then(|mut n| n.run());
            let second = AmplifierNetwork::new(&program, &phases, 0).and_then(|mut n| n.run());
            prop_assert_eq!(first.ok(), second.ok());
        }
    }
}

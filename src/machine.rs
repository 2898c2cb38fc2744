use tracing::{debug, trace};

use crate::channel::Channel;
use crate::decode::{Instruction, Opcode, ParameterMode, decode};
use crate::error::{Error, Fault, Result};
use crate::memory::Memory;

type FaultResult<T> = std::result::Result<T, Fault>;

/// Execution state of a [`Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Loaded but not yet stepped.
    #[default]
    Idle,
    Running,
    /// Suspended on an input instruction with an empty input channel. The
    /// instruction pointer still points at that instruction.
    WaitingForInput,
    /// Executed a halt. Terminal until the next `load` or `reset`.
    Halted,
}

/// An integer-program virtual machine.
///
/// Each machine exclusively owns its memory and its two channels. A program
/// is installed with [`Machine::load`] and driven with [`Machine::step`] or
/// [`Machine::run`]. Running out of input is not an error: the machine parks
/// in [`State::WaitingForInput`] without side effects, and the next step after
/// [`Machine::push_input`] re-executes the same instruction.
#[derive(Debug, Clone, Default)]
pub struct Machine {
    /// Image installed by the last `load`, restored by `reset`.
    program: Vec<i64>,
    memory: Memory,
    ip: i64,
    relative_base: i64,
    input: Channel,
    output: Channel,
    state: State,
    steps: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: &[i64]) -> Self {
        let mut machine = Self::new();
        machine.load(program);
        machine
    }

    /// Install `program` and reset all state.
    pub fn load(&mut self, program: &[i64]) {
        self.program = program.to_vec();
        self.reset();
    }

    /// Restore the last loaded program and clear registers, channels and
    /// counters.
    pub fn reset(&mut self) {
        self.memory = Memory::from_program(&self.program);
        self.ip = 0;
        self.relative_base = 0;
        self.input.clear();
        self.output.clear();
        self.state = State::Idle;
        self.steps = 0;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn ip(&self) -> i64 {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Number of instructions executed since the last reset. A stalled input
    /// does not count.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn peek(&self, address: i64) -> Result<i64> {
        self.memory
            .read(address)
            .map_err(|kind| Error::Fault { ip: self.ip, kind })
    }

    pub fn poke(&mut self, address: i64, value: i64) -> Result<()> {
        let ip = self.ip;
        self.memory
            .write(address, value)
            .map_err(|kind| Error::Fault { ip, kind })
    }

    pub fn push_input(&mut self, value: i64) {
        self.input.push(value);
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// Remove and return the oldest queued output.
    pub fn pop_output(&mut self) -> Result<i64> {
        self.output.pop().ok_or(Error::EmptyOutput)
    }

    /// Drain every queued output, oldest first.
    pub fn take_outputs(&mut self) -> Vec<i64> {
        self.output.drain()
    }

    /// Execute exactly one instruction and return the resulting state.
    pub fn step(&mut self) -> Result<State> {
        if self.state == State::Halted {
            return Err(Error::NotRunning);
        }
        let ip = self.ip;
        let next = self.execute().map_err(|kind| Error::Fault { ip, kind })?;
        if next != State::WaitingForInput {
            self.steps += 1;
        }
        self.state = next;
        Ok(next)
    }

    /// Step until the machine halts or stalls on input.
    pub fn run(&mut self) -> Result<State> {
        match self.state {
            State::Running => return Err(Error::AlreadyRunning),
            State::Halted => return Err(Error::NotRunning),
            State::Idle | State::WaitingForInput => {}
        }
        loop {
            match self.step()? {
                State::Halted | State::WaitingForInput => return Ok(self.state),
                State::Idle | State::Running => {}
            }
        }
    }

    /// Convenience: push `inputs`, run, and drain the outputs.
    pub fn run_with(&mut self, inputs: &[i64]) -> Result<Vec<i64>> {
        self.input.extend(inputs.iter().copied());
        self.run()?;
        Ok(self.take_outputs())
    }

    fn execute(&mut self) -> FaultResult<State> {
        let instr = decode(self.memory.read(self.ip)?)?;
        trace!(
            ip = self.ip,
            op = instr.opcode.mnemonic(),
            relative_base = self.relative_base,
            "exec"
        );

        match instr.opcode {
            Opcode::Add => {
                let (a, b) = self.operands(&instr)?;
                let sum = a.checked_add(b).ok_or(Fault::Overflow)?;
                self.store(&instr, 2, sum)?;
            }
            Opcode::Multiply => {
                let (a, b) = self.operands(&instr)?;
                let product = a.checked_mul(b).ok_or(Fault::Overflow)?;
                self.store(&instr, 2, product)?;
            }
            Opcode::Input => {
                let dest = self.destination(&instr, 0)?;
                let Some(value) = self.input.pop() else {
                    if self.state != State::WaitingForInput {
                        debug!(ip = self.ip, "waiting for input");
                    }
                    return Ok(State::WaitingForInput);
                };
                self.memory.write(dest, value)?;
            }
            Opcode::Output => {
                let value = self.operand(&instr, 0)?;
                self.output.push(value);
            }
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let (cond, target) = self.operands(&instr)?;
                if (cond != 0) == (instr.opcode == Opcode::JumpIfTrue) {
                    self.ip = target;
                    return Ok(State::Running);
                }
            }
            Opcode::LessThan => {
                let (a, b) = self.operands(&instr)?;
                self.store(&instr, 2, i64::from(a < b))?;
            }
            Opcode::Equals => {
                let (a, b) = self.operands(&instr)?;
                self.store(&instr, 2, i64::from(a == b))?;
            }
            Opcode::AdjustBase => {
                let delta = self.operand(&instr, 0)?;
                self.relative_base = self
                    .relative_base
                    .checked_add(delta)
                    .ok_or(Fault::Overflow)?;
            }
            Opcode::Halt => {
                debug!(ip = self.ip, steps = self.steps + 1, "halted");
                return Ok(State::Halted);
            }
        }

        self.ip = self.ip.checked_add(instr.width()).ok_or(Fault::Overflow)?;
        Ok(State::Running)
    }

    /// Raw parameter word `param` of the current instruction.
    fn raw(&self, param: usize) -> FaultResult<i64> {
        let address = self
            .ip
            .checked_add(1 + param as i64)
            .ok_or(Fault::Overflow)?;
        self.memory.read(address)
    }

    fn operand(&self, instr: &Instruction, param: usize) -> FaultResult<i64> {
        let raw = self.raw(param)?;
        match instr.modes[param] {
            ParameterMode::Position => self.memory.read(raw),
            ParameterMode::Immediate => Ok(raw),
            ParameterMode::Relative => {
                let address = self.relative_base.checked_add(raw).ok_or(Fault::Overflow)?;
                self.memory.read(address)
            }
        }
    }

    fn operands(&self, instr: &Instruction) -> FaultResult<(i64, i64)> {
        Ok((self.operand(instr, 0)?, self.operand(instr, 1)?))
    }

    /// Resolve a write target. Validated up front so that no instruction
    /// consumes input or mutates state before discovering a bad address.
    fn destination(&self, instr: &Instruction, param: usize) -> FaultResult<i64> {
        let raw = self.raw(param)?;
        let address = match instr.modes[param] {
            ParameterMode::Position => raw,
            ParameterMode::Immediate => return Err(Fault::InvalidWriteTarget(param)),
            ParameterMode::Relative => {
                self.relative_base.checked_add(raw).ok_or(Fault::Overflow)?
            }
        };
        if address < 0 {
            return Err(Fault::InvalidAddress(address));
        }
        Ok(address)
    }

    fn store(&mut self, instr: &Instruction, param: usize, value: i64) -> FaultResult<()> {
        let dest = self.destination(instr, param)?;
        self.memory.write(dest, value)
    }
}

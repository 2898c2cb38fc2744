use crate::error::Fault;

/// How an instruction parameter is resolved to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    /// The parameter is an address.
    #[default]
    Position,
    /// The parameter is the value itself. Never valid as a destination.
    Immediate,
    /// The parameter is an offset from the relative base.
    Relative,
}

impl ParameterMode {
    fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }

    pub fn digit(self) -> i64 {
        match self {
            ParameterMode::Position => 0,
            ParameterMode::Immediate => 1,
            ParameterMode::Relative => 2,
        }
    }
}

/// The instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustBase,
    Halt,
}

impl Opcode {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Opcode::Add,
            2 => Opcode::Multiply,
            3 => Opcode::Input,
            4 => Opcode::Output,
            5 => Opcode::JumpIfTrue,
            6 => Opcode::JumpIfFalse,
            7 => Opcode::LessThan,
            8 => Opcode::Equals,
            9 => Opcode::AdjustBase,
            99 => Opcode::Halt,
            _ => return None,
        })
    }

    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustBase => 9,
            Opcode::Halt => 99,
        }
    }

    /// Number of parameters following the instruction word.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustBase => 1,
            Opcode::Halt => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Multiply => "mul",
            Opcode::Input => "in",
            Opcode::Output => "out",
            Opcode::JumpIfTrue => "jnz",
            Opcode::JumpIfFalse => "jz",
            Opcode::LessThan => "lt",
            Opcode::Equals => "eq",
            Opcode::AdjustBase => "arb",
            Opcode::Halt => "halt",
        }
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [ParameterMode; 3],
}

impl Instruction {
    /// Words occupied by this instruction, including the instruction word.
    pub fn width(&self) -> i64 {
        self.opcode.arity() as i64 + 1
    }

    /// Re-pack into an instruction word. Inverse of [`decode`].
    pub fn encode(&self) -> i64 {
        let mut word = self.opcode.code();
        let mut scale = 100;
        for mode in self.modes {
            word += mode.digit() * scale;
            scale *= 10;
        }
        word
    }
}

/// Split an instruction word into opcode and parameter modes.
///
/// The low two decimal digits are the opcode; the next three digits are the
/// modes of parameters 0, 1 and 2. Absent digits read as `Position`.
pub fn decode(word: i64) -> Result<Instruction, Fault> {
    if word < 0 {
        return Err(Fault::UnknownOpcode(word));
    }
    let code = word % 100;
    let opcode = Opcode::from_code(code).ok_or(Fault::UnknownOpcode(code))?;

    let mut modes = [ParameterMode::Position; 3];
    let mut rest = word / 100;
    for (param, mode) in modes.iter_mut().enumerate() {
        let digit = rest % 10;
        *mode = ParameterMode::from_digit(digit)
            .ok_or(Fault::InvalidMode { word, param, digit })?;
        rest /= 10;
    }

    Ok(Instruction { opcode, modes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::ParameterMode::*;

    #[test]
    fn test_no_mode_digits() {
        let instr = decode(2).unwrap();
        assert_eq!(instr.opcode, Opcode::Multiply);
        assert_eq!(instr.modes, [Position; 3]);
    }

    #[test]
    fn test_one_mode_digit() {
        let instr = decode(104).unwrap();
        assert_eq!(instr.opcode, Opcode::Output);
        assert_eq!(instr.modes, [Immediate, Position, Position]);
    }

    #[test]
    fn test_two_mode_digits() {
        let instr = decode(1002).unwrap();
        assert_eq!(instr.opcode, Opcode::Multiply);
        assert_eq!(instr.modes, [Position, Immediate, Position]);
    }

    #[test]
    fn test_three_mode_digits() {
        let instr = decode(21107).unwrap();
        assert_eq!(instr.opcode, Opcode::LessThan);
        assert_eq!(instr.modes, [Immediate, Immediate, Relative]);
    }

    #[test]
    fn test_relative_mode() {
        let instr = decode(204).unwrap();
        assert_eq!(instr.modes[0], Relative);
        let instr = decode(109).unwrap();
        assert_eq!(instr.opcode, Opcode::AdjustBase);
        assert_eq!(instr.modes[0], Immediate);
    }

    #[test]
    fn test_halt() {
        let instr = decode(99).unwrap();
        assert_eq!(instr.opcode, Opcode::Halt);
        assert_eq!(instr.width(), 1);
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(decode(0), Err(Fault::UnknownOpcode(0)));
        assert_eq!(decode(42), Err(Fault::UnknownOpcode(42)));
        assert_eq!(decode(198), Err(Fault::UnknownOpcode(98)));
        assert_eq!(decode(-1), Err(Fault::UnknownOpcode(-1)));
    }

    #[test]
    fn test_bad_mode_digit() {
        assert_eq!(
            decode(301),
            Err(Fault::InvalidMode { word: 301, param: 0, digit: 3 })
        );
        assert_eq!(
            decode(90001),
            Err(Fault::InvalidMode { word: 90001, param: 2, digit: 9 })
        );
    }

    #[test]
    fn test_seven_and_eight_are_distinct() {
        assert_eq!(decode(7).unwrap().opcode, Opcode::LessThan);
        assert_eq!(decode(8).unwrap().opcode, Opcode::Equals);
    }
}

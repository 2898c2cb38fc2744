use thiserror::Error;

/// A fault raised while executing a single instruction.
///
/// Faults are fatal for the machine that raised them. They are wrapped in
/// [`Error::Fault`] together with the instruction pointer of the offending
/// instruction before they reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// A negative memory address was read or written.
    #[error("invalid address {0}")]
    InvalidAddress(i64),
    /// The low two digits of the instruction word name no known opcode.
    #[error("unknown opcode {0}")]
    UnknownOpcode(i64),
    /// A parameter mode digit other than 0, 1 or 2.
    #[error("invalid mode digit {digit} for parameter {param} in instruction {word}")]
    InvalidMode { word: i64, param: usize, digit: i64 },
    /// A destination parameter was encoded in immediate mode.
    #[error("parameter {0} is a write target in immediate mode")]
    InvalidWriteTarget(usize),
    /// Arithmetic left the range of `i64`.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Errors surfaced by machines, networks and program loading.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} at ip {ip}")]
    Fault { ip: i64, kind: Fault },
    #[error("machine is already running")]
    AlreadyRunning,
    #[error("machine has halted")]
    NotRunning,
    #[error("no output available")]
    EmptyOutput,
    #[error("amplifier {machine} is waiting for input that will never arrive (ip {ip})")]
    Deadlock { machine: usize, ip: i64 },
    #[error("amplifier {machine} halted without producing output (ip {ip})")]
    NoOutput { machine: usize, ip: i64 },
    #[error("network has no amplifiers")]
    EmptyNetwork,
    #[error("invalid integer {token:?} at position {index}")]
    Parse { index: usize, token: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The underlying fault, if this error came from instruction execution.
    pub fn fault(&self) -> Option<Fault> {
        match self {
            Error::Fault { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod error;
pub mod memory;
pub mod decode;
pub mod channel;
pub mod machine;
pub mod network;
pub mod program;
pub mod search;
pub mod disasm;

pub use error::{Error, Fault, Result};
pub use machine::{Machine, State};
pub use network::{AmplifierConfig, AmplifierNetwork};

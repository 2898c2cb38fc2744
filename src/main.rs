use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use intcode::disasm::disassemble;
use intcode::search::{find_noun_verb, max_signal};
use intcode::{AmplifierConfig, Machine, State, program};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intcode", about = "Integer program virtual machine and amplifier network")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv per-instruction trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program and print its outputs, one per line.
    Run {
        /// Comma-separated program file.
        file: PathBuf,

        /// Value to queue as input (repeatable, consumed in order).
        #[arg(short, long, allow_negative_numbers = true)]
        input: Vec<i64>,

        /// Patch memory before running, as ADDR=VALUE (repeatable).
        #[arg(long, value_parser = parse_poke)]
        poke: Vec<(i64, i64)>,
    },

    /// Find the phase ordering that maximises the amplifier output.
    Amplify {
        file: PathBuf,

        /// Use phases 0..=4 with no feedback instead of 5..=9 in a loop.
        #[arg(long, conflicts_with = "phases")]
        series: bool,

        /// Explicit phase settings to permute (e.g. 5,6,7,8,9).
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        phases: Option<Vec<i64>>,

        /// Signal fed to the first amplifier.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        seed: i64,
    },

    /// Find the noun and verb that leave TARGET in cell 0.
    NounVerb {
        file: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        target: i64,

        /// Largest noun and verb to try.
        #[arg(long, default_value_t = 99)]
        max: i64,
    },

    /// Print a disassembly of a program.
    Disasm { file: PathBuf },
}

/// Parse an "ADDR=VALUE" memory patch.
fn parse_poke(s: &str) -> Result<(i64, i64), String> {
    let (addr, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid patch '{s}', expected ADDR=VALUE"))?;
    let addr = addr.trim().parse::<i64>().map_err(|e| format!("Invalid address: {e}"))?;
    let value = value.trim().parse::<i64>().map_err(|e| format!("Invalid value: {e}"))?;
    if addr < 0 {
        return Err("Address must be non-negative".to_string());
    }
    Ok((addr, value))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dispatch(cli.command) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> intcode::Result<()> {
    match command {
        Command::Run { file, input, poke } => run_program(file, &input, &poke),
        Command::Amplify {
            file,
            series,
            phases,
            seed,
        } => {
            let program = program::load(&file)?;
            let mut config = if series {
                AmplifierConfig::series()
            } else {
                AmplifierConfig::default()
            };
            if let Some(phases) = phases {
                config.phases = phases;
            }
            config.seed_signal = seed;

            let tuning = max_signal(&program, &config)?;
            let phases = tuning
                .phases
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(",");
            println!("{}", tuning.signal);
            eprintln!("phases: {phases}");
            Ok(())
        }
        Command::NounVerb { file, target, max } => {
            let program = program::load(&file)?;
            match find_noun_verb(&program, target, 0..=max) {
                Some((noun, verb)) => {
                    println!("{}", 100 * noun + verb);
                    eprintln!("noun: {noun}, verb: {verb}");
                }
                None => {
                    eprintln!("No noun/verb in 0..={max} produces {target}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Command::Disasm { file } => {
            let program = program::load(&file)?;
            print!("{}", disassemble(&program));
            Ok(())
        }
    }
}

fn run_program(file: PathBuf, input: &[i64], poke: &[(i64, i64)]) -> intcode::Result<()> {
    let program = program::load(&file)?;
    let mut machine = Machine::with_program(&program);
    for &(addr, value) in poke {
        machine.poke(addr, value)?;
    }

    let outputs = machine.run_with(input)?;
    for value in &outputs {
        println!("{value}");
    }

    info!(steps = machine.steps(), state = ?machine.state(), "finished");
    if machine.state() == State::WaitingForInput {
        eprintln!("program is waiting for more input (ip {})", machine.ip());
        std::process::exit(2);
    }
    if !poke.is_empty() {
        eprintln!("cell 0: {}", machine.peek(0)?);
    }
    Ok(())
}

use std::{fs, process::ExitCode};

use anyhow::Context;
use argh::FromArgs;
use synacor::{
    bytecode::Bytecode,
    console::{Console, ScriptedConsole, StdConsole},
    vm::Machine,
};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

/// Run a program image on the 15-bit virtual machine.
#[derive(FromArgs)]
struct Arguments {
    /// the binary program file, little-endian 16-bit words
    #[argh(positional)]
    binary_file: String,

    /// a transcript of input lines to replay before reading stdin
    #[argh(option, short = 'i')]
    input: Option<String>,

    /// stop after this many instructions
    #[argh(option)]
    max_steps: Option<u64>,
}

enum Outcome {
    Halted,
    StepLimit,
}

fn run<C: Console>(vm: &mut Machine<C>, max_steps: Option<u64>) -> anyhow::Result<Outcome> {
    match max_steps {
        None => vm.run()?,
        Some(limit) => {
            while vm.is_running() {
                if vm.steps() >= limit {
                    return Ok(Outcome::StepLimit);
                }
                vm.step()?;
            }
        }
    }

    Ok(Outcome::Halted)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Arguments = argh::from_env();

    match start(&args) {
        Ok(Outcome::Halted) => ExitCode::SUCCESS,
        Ok(Outcome::StepLimit) => {
            eprintln!("Step limit of {} reached.", args.max_steps.unwrap_or_default());
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn start(args: &Arguments) -> anyhow::Result<Outcome> {
    let bytecode = Bytecode::from_file(&args.binary_file)
        .with_context(|| format!("couldn't load {:?}", args.binary_file))?;

    let transcript = match &args.input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("couldn't read {path:?}"))?
        }
        None => String::new(),
    };

    let console = ScriptedConsole::new(&transcript, StdConsole::new());
    let mut vm = Machine::from_bytecode(&bytecode, console);

    let outcome = run(&mut vm, args.max_steps)?;
    info!(steps = vm.steps(), "program finished");

    Ok(outcome)
}

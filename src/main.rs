//! Intcode - CLI Entry Point
//!
//! Commands:
//! - `intcode run <program>` - Run a program until it halts
//! - `intcode disasm <program>` - Disassemble a program
//! - `intcode sweep <program>` - Search noun/verb pairs
//! - `intcode amplify <program>` - Run an amplifier chain
//! - `intcode paint <program>` - Drive the hull painting robot
//! - `intcode arcade <program>` - Draw the arcade screen

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use intcode::cpu::disasm::disassemble_at;
use intcode::cpu::memory::DEFAULT_LIMIT;
use intcode::peripherals::{arcade, Color, Hull, Point, Robot, Tile};
use intcode::pipeline::{self, find_noun_verb, run_noun_verb, Wiring};
use intcode::{load_program, Cell, Computer, State};
use log::{info, warn};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "intcode")]
#[command(version)]
#[command(about = "An Intcode virtual machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the program file
        program: PathBuf,
        /// Comma separated values for Read instructions
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        input: Vec<Cell>,
        /// Stop after this many instructions
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Print each instruction to stderr before executing it
        #[arg(short, long)]
        trace: bool,
        /// Print a JSON report instead of the raw outputs
        #[arg(long)]
        json: bool,
        /// Highest number of memory cells the program may use
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        memory_limit: usize,
    },
    /// Disassemble a program to readable text
    Disasm {
        /// Path to the program file
        program: PathBuf,
    },
    /// Seed addresses 1 and 2 with a noun and a verb and report address 0
    Sweep {
        /// Path to the program file
        program: PathBuf,
        /// Search for the first pair producing this value
        #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["noun", "verb"])]
        target: Option<Cell>,
        #[arg(long, requires = "verb")]
        noun: Option<Cell>,
        #[arg(long, requires = "noun")]
        verb: Option<Cell>,
    },
    /// Run amplifiers and report the strongest signal
    Amplify {
        /// Path to the program file
        program: PathBuf,
        /// Comma separated phase settings
        #[arg(short, long, value_delimiter = ',', required = true)]
        phases: Vec<Cell>,
        /// Chain the amplifiers once instead of in a feedback loop
        #[arg(long)]
        series: bool,
        /// Use the phases in the given order instead of trying every ordering
        #[arg(long)]
        fixed: bool,
    },
    /// Drive the hull painting robot
    Paint {
        /// Path to the program file
        program: PathBuf,
        /// Start on a white panel
        #[arg(long)]
        start_white: bool,
    },
    /// Draw the arcade screen
    Arcade {
        /// Path to the program file
        program: PathBuf,
    },
}

#[derive(Serialize)]
struct RunReport<'a> {
    outputs: &'a [Cell],
    cycles: u64,
    state: State,
    computer: &'a Computer,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().filter_or("INTCODE_LOG", "warn");
    env_logger::init_from_env(env);

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { program, input, max_cycles, trace, json, memory_limit } => {
            run_program(&program, input, max_cycles, trace, json, memory_limit)
        }
        Commands::Disasm { program } => {
            let program = load(&program)?;
            print!("{}", intcode::disassemble(&program));
            Ok(())
        }
        Commands::Sweep { program, target, noun, verb } => {
            sweep_program(&program, target, noun.zip(verb))
        }
        Commands::Amplify { program, phases, series, fixed } => {
            amplify(&program, &phases, series, fixed)
        }
        Commands::Paint { program, start_white } => paint(&program, start_white),
        Commands::Arcade { program } => {
            let program = load(&program)?;
            let screen = arcade::draw(&program).context("arcade failed")?;
            print!("{}", screen.render());
            println!("Blocks: {}", screen.count(Tile::Block));
            println!("Score: {}", screen.score);
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Vec<Cell>> {
    let program = load_program(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!("loaded {} cells from {}", program.len(), path.display());
    Ok(program)
}

fn run_program(
    path: &Path,
    input: Vec<Cell>,
    max_cycles: Option<u64>,
    trace: bool,
    json: bool,
    memory_limit: usize,
) -> Result<()> {
    let program = load(path)?;
    let mut computer = Computer::with_memory_limit(memory_limit);
    computer.load(&program);

    let mut input: VecDeque<Cell> = input.into();
    let mut outputs: Vec<Cell> = Vec::new();
    let max_cycles = max_cycles.unwrap_or(u64::MAX);

    let result = if trace {
        let mut result = Ok(());
        while computer.is_running() && computer.cycles() < max_cycles {
            let pc = computer.pc();
            if let Ok(addr) = usize::try_from(pc) {
                let (text, _) = disassemble_at(computer.memory().as_slice(), addr);
                eprintln!("{:05}: {:<28} rb={}", pc, text, computer.relative_base());
            }
            if let Err(e) = computer.step(&mut input, &mut outputs) {
                result = Err(e);
                break;
            }
        }
        result
    } else {
        computer
            .execute_limited(&mut input, &mut outputs, max_cycles)
            .map(|_| ())
    };

    if json {
        let report = RunReport {
            outputs: &outputs,
            cycles: computer.cycles(),
            state: computer.state(),
            computer: &computer,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for value in &outputs {
            println!("{}", value);
        }
    }

    result.with_context(|| format!("execution failed at pc={}", computer.pc()))?;
    if computer.is_running() {
        warn!("stopped after {} cycles without halting", computer.cycles());
    }
    Ok(())
}

fn sweep_program(path: &Path, target: Option<Cell>, pair: Option<(Cell, Cell)>) -> Result<()> {
    let program = load(path)?;
    if let Some((noun, verb)) = pair {
        let output = run_noun_verb(&program, noun, verb)
            .with_context(|| format!("noun={} verb={} failed", noun, verb))?;
        println!("{}", output);
    } else if let Some(target) = target {
        let Some(hit) = find_noun_verb(&program, target, 0..100, 0..100) else {
            bail!("no noun/verb pair produces {}", target);
        };
        println!("noun={} verb={} code={}", hit.noun, hit.verb, hit.code());
    } else {
        let hits = pipeline::sweep(&program, 0..100, 0..100);
        for hit in &hits {
            println!("{:2} {:2} {}", hit.noun, hit.verb, hit.output);
        }
        info!("{} of 10000 pairs ran to completion", hits.len());
    }
    Ok(())
}

fn amplify(path: &Path, phases: &[Cell], series: bool, fixed: bool) -> Result<()> {
    let program = load(path)?;
    let wiring = if series { Wiring::Series } else { Wiring::Feedback };
    let signal = if fixed {
        wiring.run(&program, phases)?
    } else {
        pipeline::highest_signal(&program, phases, wiring)?
    };
    println!("{}", signal);
    Ok(())
}

fn paint(path: &Path, start_white: bool) -> Result<()> {
    let program = load(path)?;
    let mut hull = Hull::new();
    if start_white {
        hull.paint(Point::default(), Color::White);
    }
    Robot::new()
        .paint(&mut hull, &program)
        .context("robot failed")?;
    print!("{}", hull.render());
    println!("Painted panels: {}", hull.painted_count());
    Ok(())
}

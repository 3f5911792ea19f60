mod stopwatch;

use anyhow::{anyhow, Context};
use clap::Parser;
use linsolve::{
    system::{load_system, save_system},
    Elimination, LinearSystem, SolveError, Vector,
};
use serde::Serialize;
use std::{
    fs::File,
    io::BufWriter,
    num::IntErrorKind,
    path::{Path, PathBuf},
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};
use stopwatch::Stopwatch;
use thiserror::Error;

const MAXN: usize = 2000;

// matrices this small are echoed before solving, solutions below the second limit after
const PRINT_INPUTS_BELOW: usize = 10;
const PRINT_SOLUTION_BELOW: usize = 100;

const USAGE: &str = "Uso: gauss <dimensão_matriz> [semente_aleatória]";
const SEPARATOR: &str = "--------------------------------------------";

#[derive(Parser, Debug)]
#[command(
    name = "gauss",
    about = "Solve a random dense linear system by Gaussian elimination and time it",
    allow_negative_numbers = true
)]
struct Cli {
    /// Matrix dimension N (1 to 2000)
    n: Option<String>,

    /// Random seed (defaults to the current time in nanoseconds)
    seed: Option<String>,

    /// Anything after the seed is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,

    /// Update the rows under each pivot in parallel
    #[arg(long)]
    parallel: bool,

    /// Report the largest entry of |A·x - b| against the original system
    #[arg(long)]
    residual: bool,

    /// Write the generated system to a JSON file before solving
    #[arg(long, value_name = "PATH")]
    save_system: Option<PathBuf>,

    /// Solve a system written by --save-system instead of generating one
    #[arg(long, value_name = "PATH", conflicts_with = "save_system")]
    load_system: Option<PathBuf>,

    /// Write a JSON report of the run
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Debug, Error)]
#[error("N = {0} é inválido. Deve ser entre 1 e {}", MAXN)]
struct InvalidDimension(i64);

#[derive(Serialize)]
struct RunReport<'a> {
    n: usize,
    seed: i64,
    parallel: bool,
    elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_residual: Option<f64>,
    solution: &'a Vector,
}

/// Unparsable input counts as zero and overflow saturates, so both are rejected
/// along with out of range values.
fn parse_dimension(arg: &str) -> Result<usize, InvalidDimension> {
    let n = match arg.parse::<i64>() {
        Ok(n) => n,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    };
    if (1..=MAXN as i64).contains(&n) {
        Ok(n as usize)
    } else {
        Err(InvalidDimension(n))
    }
}

fn parse_seed(arg: Option<&str>) -> i64 {
    arg.and_then(|s| s.parse().ok()).unwrap_or_else(time_seed)
}

fn time_seed() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

fn join(values: &[f64], separator: &str) -> String {
    values
        .iter()
        .map(|v| format!("{:5.2}", v))
        .collect::<Vec<_>>()
        .join(separator)
}

fn format_inputs(system: &LinearSystem) -> String {
    let mut out = String::from("\nA =\n");
    for row in &system.a.rows {
        out.push('\t');
        out.push_str(&join(row, ", "));
        out.push_str(";\n");
    }
    out.push_str("\nB = [\n");
    out.push_str(&join(&system.b, "; "));
    out.push_str("]\n");
    out
}

fn format_solution(x: &Vector) -> String {
    format!("\nX = [\n{}]\n", join(x, "; "))
}

fn diagnostic(err: &SolveError) -> &'static str {
    match err {
        SolveError::SingularPivot { .. } => "Erro: Divisão por zero detectada",
        SolveError::NearSingularPivot { .. } => "Erro: Pivô zero na substituição regressiva",
    }
}

fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

fn load_input(path: &Path) -> anyhow::Result<(i64, LinearSystem)> {
    let (seed, system) = load_system(path)
        .map_err(|err| anyhow!("failed to load {}: {}", path.display(), err))?;
    let n = system.dimension();
    if !(1..=MAXN).contains(&n) {
        return Err(InvalidDimension(n as i64).into());
    }
    Ok((seed, system))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let (seed, system) = match &cli.load_system {
        Some(path) => {
            if cli.n.is_some() {
                log::warn!("dimension argument ignored, using {}", path.display());
            }
            load_input(path)?
        }
        None => {
            if !cli.rest.is_empty() {
                log::debug!("ignoring extra arguments {:?}", cli.rest);
            }
            let arg = match cli.n.as_deref() {
                Some(arg) => arg,
                None => {
                    println!("{}", USAGE);
                    return Ok(());
                }
            };
            let n = parse_dimension(arg)?;
            let seed = parse_seed(cli.seed.as_deref());
            (seed, LinearSystem::random(n, seed))
        }
    };
    let n = system.dimension();

    println!("\nDimensão da matriz N = {}", n);
    println!("Semente aleatória = {}", seed);

    if let Some(path) = &cli.save_system {
        save_system(path, seed, &system)
            .map_err(|err| anyhow!("failed to save {}: {}", path.display(), err))?;
        log::info!("saved system to {}", path.display());
    }

    if n < PRINT_INPUTS_BELOW {
        print!("{}", format_inputs(&system));
    }

    let original = if cli.residual {
        Some(system.clone())
    } else {
        None
    };
    let elimination = if cli.parallel {
        Elimination::Parallel
    } else {
        Elimination::Sequential
    };

    let mut watch = Stopwatch::start();
    let result = linsolve::solve_with(system, elimination);
    watch.stop();
    let x = result?;

    if n < PRINT_SOLUTION_BELOW {
        print!("{}", format_solution(&x));
    }

    let max_residual = original.map(|system| system.max_residual(&x));
    if let Some(residual) = max_residual {
        println!("\nResíduo máximo = {:e}", residual);
    }

    println!("\nTempo decorrido = {:.3} ms", watch.elapsed_ms());
    println!("{}", SEPARATOR);

    if let Some(path) = &cli.report {
        write_report(
            path,
            &RunReport {
                n,
                seed,
                parallel: cli.parallel,
                elapsed_ms: watch.elapsed_ms(),
                max_residual,
                solution: &x,
            },
        )?;
        log::info!("wrote report to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(solve_err) = err.downcast_ref::<SolveError>() {
                log::debug!("{}", solve_err);
                println!("{}", diagnostic(solve_err));
            } else if let Some(invalid) = err.downcast_ref::<InvalidDimension>() {
                println!("{}", invalid);
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

//! Stoch CLI
//!
//! A thin wrapper around the stoch library: read a program, run it once,
//! print the final point.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use stoch::{DEFAULT_ITER_MAX, ErrorKind, EvalConfig, Evaluator, Point, StochError, sexp};

#[derive(Parser)]
#[command(name = "stoch")]
#[command(about = "Run a stochastic 2D transform program")]
#[command(after_help = "\
EXAMPLES:
    # Sample a point and move it
    echo 'init ([0, 0], [0, 0]); translation(3, 4)' | stoch

    # Reproducible run with a step-by-step trace
    stoch -v -s 42 program.stoch

    # Cap every iter block at 10 repetitions
    stoch -m 10 program.stoch
")]
struct Args {
    /// Program file. Reads standard input when omitted.
    input: Option<PathBuf>,

    /// Print the parsed program as an S-expression before running it
    #[arg(short, long)]
    print_ast: bool,

    /// Trace every sample, transform, choice and iteration on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Upper bound on the repetition count drawn by `iter`
    #[arg(
        short = 'm',
        long,
        default_value_t = DEFAULT_ITER_MAX,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(i32::MAX))
    )]
    iter_max: u32,

    /// Random seed. Defaults to the current time in seconds.
    #[arg(short, long)]
    seed: Option<u64>,
}

const EXIT_PARSE: u8 = 4;
const EXIT_IO: u8 = 5;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_IO } else { 0 };
            // Help and version output go to stdout; only real errors fail.
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match execute(&args) {
        Ok(point) => {
            println!("({:.6}, {:.6})", point.x, point.y);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let (message, code) = match err.downcast_ref::<StochError>() {
                Some(e) => (e.to_string(), exit_code(e)),
                None => (format!("{err:#}"), EXIT_IO),
            };
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}

fn execute(args: &Args) -> anyhow::Result<Point> {
    let src = read_source(args.input.as_deref())?;
    let program = stoch::parse_program(&src).map_err(StochError::from)?;

    if args.print_ast {
        eprintln!("{}", sexp(program.arena(), program.root()));
    }

    let seed = args.seed.unwrap_or_else(seed_from_clock);
    log::info!("seed: {seed}");
    let config = EvalConfig::new()
        .with_iter_max(args.iter_max)
        .with_verbose(args.verbose)
        .with_seed(seed);

    let point = Evaluator::new(&program, &config)
        .with_trace_sink(|line| eprintln!("{line}"))
        .run()
        .map_err(StochError::from)?;
    Ok(point)
}

fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut src = String::new();
            std::io::stdin()
                .read_to_string(&mut src)
                .context("failed to read standard input")?;
            Ok(src)
        }
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn exit_code(err: &StochError) -> u8 {
    match err {
        StochError::Parse(_) => EXIT_PARSE,
        StochError::Eval(e) => match e.kind() {
            ErrorKind::UninitializedUse => 1,
            ErrorKind::NonNumericArgument => 2,
            ErrorKind::PolynomialError => 3,
        },
    }
}

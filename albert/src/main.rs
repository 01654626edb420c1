use albert_core::{
    CancelToken, Field, FreeAlgebra, GenerateConfig, Status, Type, generate_for_type,
    parse_identity,
};
use clap::Parser;
use std::{
    fmt::Write as _,
    fs,
    io::{self, Read as _, Write as _},
    path::PathBuf,
    process::ExitCode,
};
use tracing::Level;

/// Generate the linear equations that identities impose on the products of
/// the free nonassociative algebra, one degree below a target type.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Identities such as "(xx)y - x(xy)". Read from --input or stdin if none are given.
    identities: Vec<String>,

    /// File with one identity per line. Lines starting with ';' or '#' are ignored.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file, if not stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Target type, one multiplicity per generator, e.g. 3,2,1.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    target: Type,

    /// Characteristic of the scalar field.
    #[arg(long, default_value_t = u32::from(Field::DEFAULT_PRIME))]
    field: u32,

    /// Evaluate on a dedicated pool of this many threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Evaluate permutations on the calling thread.
    #[arg(long)]
    sequential: bool,

    /// Permutation assignments evaluated per batch.
    #[arg(long, default_value_t = GenerateConfig::default().batch_size)]
    batch_size: usize,

    /// Also print the basis, with the factors of every product.
    #[arg(long)]
    basis: bool,

    /// Print statistics only.
    #[arg(short, long)]
    quiet: bool,

    /// Log more, repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let sources = if cli.identities.is_empty() {
        let text = match &cli.input {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut text = String::new();
                io::stdin().lock().read_to_string(&mut text)?;
                text
            }
        };
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with([';', '#']))
            .map(str::to_owned)
            .collect()
    } else {
        cli.identities
    };
    let identities = sources
        .iter()
        .map(|src| parse_identity(src).map_err(|err| format!("{src:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    if identities.is_empty() {
        return Err("no identities given".into());
    }

    let field = Field::new(cli.field)?;
    let below = cli.target.degree().saturating_sub(1);
    let free = FreeAlgebra::with_field(field, cli.target, below)?;
    let config = GenerateConfig {
        parallel: !cli.sequential,
        threads: cli.threads,
        batch_size: cli.batch_size,
    };
    let outcome = generate_for_type(
        &identities,
        free.types.target_name(),
        free.algebra(),
        &config,
        &CancelToken::new(),
    );

    let mut out = String::new();
    if cli.basis {
        for b in (0..free.basis.len()).map(albert_core::ids::BasisId) {
            let ty = free.types.type_of(free.basis.type_of(b));
            match free.basis.factors(b) {
                Some((l, r)) => writeln!(out, "; {b} = {l}*{r} {ty}")?,
                None => writeln!(out, "; {b} generator {ty}")?,
            }
        }
    }
    if !cli.quiet {
        for (i, equation) in outcome.equations.iter().enumerate() {
            writeln!(out, "{i}: {equation} = 0")?;
        }
    }
    writeln!(out, "; {}", outcome.stats)?;

    match cli.output {
        Some(path) => fs::write(path, out)?,
        None => io::stdout().lock().write_all(out.as_bytes())?,
    }

    match outcome.status {
        Status::Complete | Status::Empty => Ok(ExitCode::SUCCESS),
        Status::Cancelled => {
            eprintln!("cancelled");
            Ok(ExitCode::FAILURE)
        }
        Status::Failed(err) => Err(err.into()),
    }
}

//! cellcalc CLI - evaluate spreadsheets stored as CSV

use anyhow::{bail, Context, Result};
use cellcalc::prelude::*;
use cellcalc::{
    evaluate, format_number, parse_formula, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter,
    ValueCache,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "cellcalc")]
#[command(author, version, about = "Spreadsheet formula evaluator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every cell of a CSV sheet and print the resolved values
    #[command(alias = "calc")]
    Eval {
        /// Input CSV file ("-" for stdin)
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Grid)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter for input and CSV output
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Evaluate independent cells in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// List every cell that fails to evaluate; exits non-zero if any do
    Check {
        /// Input CSV file ("-" for stdin)
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Evaluate a single formula without cell references
    Expr {
        /// Formula text, e.g. "=(1+2)*3"
        formula: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned text table with row and column headers
    Grid,
    /// Comma-separated values
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            input,
            format,
            output,
            delimiter,
            parallel,
        } => eval(&input, format, output.as_deref(), delimiter, parallel),
        Commands::Check { input, delimiter } => check(&input, delimiter),
        Commands::Expr { formula } => expr(&formula),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn eval(
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    delimiter: char,
    parallel: bool,
) -> Result<()> {
    let sheet = load_sheet(input, delimiter)?;

    let options = CalculationOptions {
        mode: if parallel {
            RecalcMode::MultiThreaded
        } else {
            RecalcMode::SingleThreaded
        },
    };
    let result = sheet.calculate_with_options(&options);

    let stats = result.stats();
    info!(
        "Calculated {} cells ({} errors, {} circular)",
        stats.cells_calculated, stats.errors, stats.circular_references
    );

    let rendered = match format {
        OutputFormat::Grid => result.to_grid_string().into_bytes(),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            let options = CsvWriteOptions {
                delimiter: delimiter_byte(delimiter)?,
                ..Default::default()
            };
            CsvWriter::write(&result.to_rows(), &mut buffer, &options)
                .context("Failed to encode CSV")?;
            buffer
        }
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &rendered)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        info!(
            "Wrote {} rows to '{}'",
            result.dimensions().0,
            output_path.display()
        );
    } else {
        io::stdout()
            .write_all(&rendered)
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn check(input: &Path, delimiter: char) -> Result<()> {
    let sheet = load_sheet(input, delimiter)?;
    let result = sheet.calculate();

    let mut failed = 0usize;
    for (cell, error) in result.errors() {
        println!("{}\t{}\t{}", cell, error.marker(), error);
        failed += 1;
    }

    if failed > 0 {
        bail!(
            "{} of {} cells failed to evaluate",
            failed,
            result.stats().cell_count
        );
    }

    println!("{} cells OK", result.stats().cell_count);
    Ok(())
}

fn expr(formula: &str) -> Result<()> {
    let ast = parse_formula(formula).with_context(|| format!("Failed to parse '{}'", formula))?;
    debug!("parsed {:?} as {}", formula, ast);

    let value = evaluate(&ast, &ValueCache::new())
        .with_context(|| format!("Failed to evaluate '{}'", formula))?;
    println!("{}", format_number(value));

    Ok(())
}

fn load_sheet(input: &Path, delimiter: char) -> Result<Sheet> {
    let options = CsvReadOptions {
        delimiter: delimiter_byte(delimiter)?,
        ..Default::default()
    };

    let sheet = if input == Path::new("-") {
        CsvReader::read(io::stdin().lock(), &options).context("Failed to read stdin")?
    } else {
        CsvReader::read_file(input, &options)
            .with_context(|| format!("Failed to open '{}'", input.display()))?
    };

    debug!("loaded {} cells", sheet.len());
    Ok(sheet)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::{debug, info, LevelFilter};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use unit_calculator::definitions;
use unit_calculator::interpreter::calculate;
use unit_calculator::UnitResolver;

/// Evaluates arithmetic on quantities with physical units, e.g. "60 mile/hour in m/s"
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Arguments {
    /// The expressions to evaluate, read line by line from standard input when omitted
    expressions: Vec<String>,

    /// A definitions file loaded on top of the standard units
    #[clap(short, long, value_name = "FILE", parse(from_os_str))]
    definitions: Option<PathBuf>,

    /// Start from an empty unit table instead of the standard units
    #[clap(long)]
    no_standard: bool,

    #[clap(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<ExitCode> {
    let args = Arguments::parse();
    env_logger::Builder::new()
        .filter_level(
            args.verbose
                .log_level()
                .map_or(LevelFilter::Off, |level| level.to_level_filter()),
        )
        .init();

    let mut units = load_units(&args)?;
    info!("{} units available", units.len());

    let all_succeeded = if args.expressions.is_empty() {
        let stdin = io::stdin();
        let mut all_succeeded = true;
        for line in stdin.lock().lines() {
            let line = line.context("Failed to read expression from standard input")?;
            if line.trim().is_empty() {
                continue;
            }
            all_succeeded &= report(&line, &mut units);
        }
        all_succeeded
    } else {
        args.expressions
            .iter()
            .map(|expression| report(expression, &mut units))
            .fold(true, |all_succeeded, succeeded| all_succeeded && succeeded)
    };

    debug!(
        "{} unit definitions were evaluated",
        units.evaluated_definitions()
    );
    Ok(if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_units(args: &Arguments) -> Result<UnitResolver> {
    let mut units = if args.no_standard {
        UnitResolver::new()
    } else {
        UnitResolver::standard()
    };
    if let Some(path) = &args.definitions {
        definitions::load_file(&mut units, path)?;
    }
    Ok(units)
}

/// Prints the value of the expression, or why it has none.
fn report(expression: &str, units: &mut UnitResolver) -> bool {
    match calculate(expression, units) {
        Ok(value) => {
            println!("{}", value);
            true
        }
        Err(error) => {
            eprintln!("error: {}", error);
            false
        }
    }
}

//! formulactl - evaluate, check and tabulate run-time formulas
//!
//! A thin command-line front end over `formula-core`. Formulas are given on
//! the command line or named in a configuration file.

mod commands;
mod config;
mod logging;

use crate::commands::Output;
use crate::config::FormulactlConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "formulactl")]
#[command(about = "Evaluate, check and tabulate run-time formulas")]
#[command(long_about = "Evaluate, check and tabulate run-time formulas

A formula is an expression followed by its declared variables:

    sqrt(x*x + y*y); x; y

Arguments bind to the variables in declaration order.

Examples:
  formulactl eval 'sqrt(x*x + y*y); x; y' 3 4     # 5
  formulactl check 'pow(2'                         # caret under the error
  formulactl table 'sin(t); t' --from 0 --to 3.1416 --steps 8
  formulactl integrate 'exp(-(t - 5)*(t - 5)/0.1); t' --from 0 --to 10
  formulactl -c formulas.yaml run radius
  formulactl functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, global = true, env = "FORMULACTL_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a formula and evaluate it once
    Eval {
        /// Formula text, `<expression> [; <variable>]*`
        definition: String,

        /// Values for the declared variables, in declaration order
        #[arg(allow_negative_numbers = true)]
        args: Vec<f64>,
    },

    /// Compile a formula and report its variables or the error position
    Check {
        /// Formula text, `<expression> [; <variable>]*`
        definition: String,
    },

    /// Evaluate a one-variable formula over an evenly spaced range
    Table {
        /// Formula text with exactly one declared variable
        definition: String,

        /// First point of the range
        #[arg(long, allow_negative_numbers = true)]
        from: f64,

        /// Last point of the range
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        /// Number of intervals; the table has steps + 1 rows
        #[arg(long, default_value_t = 10)]
        steps: usize,
    },

    /// Integrate a formula of one to three variables with Gauss-Legendre quadrature
    ///
    /// Every variable ranges over [from, to].
    Integrate {
        /// Formula text with one to three declared variables
        definition: String,

        /// Lower bound of every variable
        #[arg(long, allow_negative_numbers = true)]
        from: f64,

        /// Upper bound of every variable
        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        /// Quadrature points per variable (1 to 64)
        #[arg(long, default_value_t = 16)]
        points: usize,
    },

    /// Evaluate formulas from the configuration file
    Run {
        /// Formula names (default: all)
        names: Vec<String>,
    },

    /// List formulas from the configuration file
    List,

    /// List builtin functions and constants
    Functions,
}

/// Load configuration, install logging, then validate
///
/// Validation runs after the subscriber is installed so its events are kept.
fn prepare(cli: &Cli) -> Result<FormulactlConfig> {
    let config = FormulactlConfig::load(cli.config.as_deref())?;

    let directive = logging::default_directive(cli.verbose, &config.logging.level);
    if !logging::init(&directive, !cli.no_color) {
        debug!("log subscriber already installed");
    }

    debug!(
        path = ?cli.config,
        formulas = config.formulas.len(),
        "configuration loaded"
    );
    config.validate()?;
    Ok(config)
}

/// Run one command; `Ok(false)` means it completed but reported a failure
fn dispatch(command: Commands, config: &FormulactlConfig, output: Output) -> Result<bool> {
    match command {
        Commands::Eval { definition, args } => {
            commands::eval_command(&definition, &args, output)?;
        },
        Commands::Check { definition } => {
            return commands::check_command(&definition, output);
        },
        Commands::Table {
            definition,
            from,
            to,
            steps,
        } => {
            commands::table_command(&definition, from, to, steps, output)?;
        },
        Commands::Integrate {
            definition,
            from,
            to,
            points,
        } => {
            commands::integrate_command(&definition, from, to, points, output)?;
        },
        Commands::Run { names } => {
            commands::run_command(config, &names, output)?;
        },
        Commands::List => {
            commands::list_command(config, output)?;
        },
        Commands::Functions => {
            commands::functions_command(output)?;
        },
    }
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = prepare(&cli)?;
    let output = if cli.json { Output::Json } else { Output::Text };

    let succeeded = match dispatch(cli.command, &config, output) {
        Ok(succeeded) => succeeded,
        Err(e) if output == Output::Json => match commands::failure_document(&e) {
            Some(document) => {
                println!("{}", serde_json::to_string_pretty(&document)?);
                false
            },
            None => return Err(e),
        },
        Err(e) => return Err(e),
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

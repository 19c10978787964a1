//! Command handlers
//!
//! Each handler computes a serializable result and then prints it, either as
//! colored text or as a JSON document when `--json` is given.

use crate::config::{FormulaEntry, FormulactlConfig};
use anyhow::{bail, Result};
use colored::*;
use formula_core::{builtin_functions, quadrature, ErrorReport, Formula};
use serde::Serialize;
use tracing::{debug, info};

/// Output mode shared by all handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        match self {
            Output::Json => println!("{}", serde_json::to_string_pretty(value)?),
            Output::Text => text(value),
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Evaluation {
    pub definition: String,
    pub variables: Vec<String>,
    pub args: Vec<f64>,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Check {
    Valid {
        arity: usize,
        variables: Vec<String>,
        nodes: usize,
    },
    Invalid {
        error: ErrorReport,
    },
}

#[derive(Debug, Serialize)]
pub struct Table {
    pub definition: String,
    pub variable: String,
    pub rows: Vec<(f64, f64)>,
}

#[derive(Debug, Serialize)]
pub struct Listing {
    pub name: String,
    pub definition: String,
    pub arity: usize,
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Function {
    pub name: &'static str,
    pub arity: usize,
}

#[derive(Debug, Serialize)]
pub struct Constant {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub functions: Vec<Function>,
    pub constants: Vec<Constant>,
}

#[derive(Debug, Serialize)]
pub struct Integral {
    pub definition: String,
    pub variables: Vec<String>,
    pub from: f64,
    pub to: f64,
    /// Points per axis
    pub points: usize,
    pub value: f64,
}

/// A definition that failed to compile, printed with a caret under the offset
#[derive(Debug)]
pub struct CompileFailure(pub ErrorReport);

impl std::fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.message)?;
        if let Some(caret) = self.0.caret_line() {
            write!(f, "\n{}", caret)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileFailure {}

/// JSON document for an error carrying a compile failure
///
/// Other errors have no structured form and return `None`.
pub fn failure_document(err: &anyhow::Error) -> Option<Check> {
    err.downcast_ref::<CompileFailure>().map(|failure| Check::Invalid {
        error: failure.0.clone(),
    })
}

fn compile(definition: &str) -> Result<Formula<f64>> {
    Formula::parse(definition).map_err(|e| CompileFailure(e.report(definition)).into())
}

fn bind(formula: &mut Formula<f64>, args: &[f64]) -> Result<f64> {
    if args.len() != formula.arity() {
        bail!(
            "Formula declares {} variables ({}) but {} arguments were given",
            formula.arity(),
            formula.variables().collect::<Vec<_>>().join(", "),
            args.len()
        );
    }
    Ok(formula.evaluate(args))
}

// ============================================================================
// eval
// ============================================================================

pub fn evaluate(definition: &str, args: &[f64]) -> Result<Evaluation> {
    let mut formula = compile(definition)?;
    let value = bind(&mut formula, args)?;
    debug!(definition, value, "evaluated");

    Ok(Evaluation {
        definition: definition.to_string(),
        variables: formula.variables().map(str::to_string).collect(),
        args: args.to_vec(),
        value,
    })
}

pub fn eval_command(definition: &str, args: &[f64], output: Output) -> Result<()> {
    let evaluation = evaluate(definition, args)?;
    output.emit(&evaluation, |e| println!("{}", e.value.to_string().bright_green()))
}

// ============================================================================
// check
// ============================================================================

pub fn check(definition: &str) -> Check {
    match Formula::<f64>::parse(definition) {
        Ok(formula) => Check::Valid {
            arity: formula.arity(),
            variables: formula.variables().map(str::to_string).collect(),
            nodes: formula.node_count(),
        },
        Err(e) => Check::Invalid {
            error: e.report(definition),
        },
    }
}

/// Returns whether the definition compiled
pub fn check_command(definition: &str, output: Output) -> Result<bool> {
    let outcome = check(definition);
    output.emit(&outcome, |outcome| match outcome {
        Check::Valid {
            arity, variables, ..
        } => {
            println!("{} {}", "✓".bright_green(), "valid".bright_green());
            println!("  {} {}", "arity:".bright_cyan(), arity);
            if !variables.is_empty() {
                println!("  {} {}", "variables:".bright_cyan(), variables.join(", "));
            }
        },
        Check::Invalid { error } => {
            println!("{} {}", "✗".bright_red(), error.message.bright_red());
            if let Some(caret) = error.caret_line() {
                println!("{}", caret);
            }
        },
    })?;
    Ok(matches!(outcome, Check::Valid { .. }))
}

// ============================================================================
// table
// ============================================================================

/// Evaluate a one-variable formula at `steps + 1` evenly spaced points
pub fn sweep(definition: &str, from: f64, to: f64, steps: usize) -> Result<Table> {
    if steps == 0 {
        bail!("--steps must be at least 1");
    }
    let mut formula = compile(definition)?;
    if formula.arity() != 1 {
        bail!(
            "table needs a formula with exactly one variable, this one declares {}",
            formula.arity()
        );
    }
    let variable = formula.variables().next().unwrap_or_default().to_string();

    let width = to - from;
    let rows = (0..=steps)
        .map(|i| {
            let x = from + width * i as f64 / steps as f64;
            (x, formula.evaluate(&[x]))
        })
        .collect();

    Ok(Table {
        definition: definition.to_string(),
        variable,
        rows,
    })
}

pub fn table_command(
    definition: &str,
    from: f64,
    to: f64,
    steps: usize,
    output: Output,
) -> Result<()> {
    let table = sweep(definition, from, to, steps)?;
    output.emit(&table, |table| {
        println!(
            "{:>16}  {:>24}",
            table.variable.bright_cyan(),
            "value".bright_cyan()
        );
        for (x, y) in &table.rows {
            println!("{:>16}  {:>24}", x, y);
        }
    })
}

// ============================================================================
// integrate
// ============================================================================

fn integrate_over<const D: usize>(
    formula: &mut Formula<f64>,
    from: f64,
    to: f64,
    points: usize,
) -> f64 {
    let nodes = quadrature::gauss_legendre::<f64, D>(points);
    quadrature::integrate(&nodes, [from; D], [to; D], |point| formula.evaluate(point))
}

/// Integrate a formula of one to three variables over `[from, to]^arity`
pub fn integral(definition: &str, from: f64, to: f64, points: usize) -> Result<Integral> {
    if !(1..=quadrature::MAX_POINTS).contains(&points) {
        bail!(
            "--points must be between 1 and {}, got {}",
            quadrature::MAX_POINTS,
            points
        );
    }
    let mut formula = compile(definition)?;

    let value = match formula.arity() {
        1 => integrate_over::<1>(&mut formula, from, to, points),
        2 => integrate_over::<2>(&mut formula, from, to, points),
        3 => integrate_over::<3>(&mut formula, from, to, points),
        arity => bail!(
            "integrate needs a formula with one to three variables, this one declares {}",
            arity
        ),
    };
    debug!(definition, points, value, "integrated");

    Ok(Integral {
        definition: definition.to_string(),
        variables: formula.variables().map(str::to_string).collect(),
        from,
        to,
        points,
        value,
    })
}

pub fn integrate_command(
    definition: &str,
    from: f64,
    to: f64,
    points: usize,
    output: Output,
) -> Result<()> {
    let integral = integral(definition, from, to, points)?;
    output.emit(&integral, |i| println!("{}", i.value.to_string().bright_green()))
}

// ============================================================================
// run / list
// ============================================================================

fn run_entry(entry: &FormulaEntry) -> Result<Evaluation> {
    let mut formula = compile(&entry.definition)?;
    let value = bind(&mut formula, &entry.args)
        .map_err(|e| e.context(format!("Formula '{}'", entry.name)))?;
    info!(name = %entry.name, value, "formula evaluated");

    Ok(Evaluation {
        definition: entry.definition.clone(),
        variables: formula.variables().map(str::to_string).collect(),
        args: entry.args.clone(),
        value,
    })
}

/// Evaluate configured formulas, all of them when `names` is empty
pub fn run(config: &FormulactlConfig, names: &[String]) -> Result<Vec<(String, Evaluation)>> {
    let entries: Vec<&FormulaEntry> = if names.is_empty() {
        config.formulas.iter().collect()
    } else {
        names
            .iter()
            .map(|name| match config.find(name) {
                Some(entry) => Ok(entry),
                None => bail!("Formula not found in configuration: {}", name),
            })
            .collect::<Result<_>>()?
    };

    entries
        .into_iter()
        .map(|entry| Ok((entry.name.clone(), run_entry(entry)?)))
        .collect()
}

pub fn run_command(config: &FormulactlConfig, names: &[String], output: Output) -> Result<()> {
    let results = run(config, names)?;
    if results.is_empty() && output == Output::Text {
        println!("{}", "No formulas configured".yellow());
        return Ok(());
    }

    output.emit(&results, |results| {
        for (name, evaluation) in results {
            println!(
                "{} = {}",
                name.bright_yellow(),
                evaluation.value.to_string().bright_green()
            );
        }
    })
}

pub fn list(config: &FormulactlConfig) -> Result<Vec<Listing>> {
    config
        .formulas
        .iter()
        .map(|entry| {
            let formula = compile(&entry.definition)?;
            Ok(Listing {
                name: entry.name.clone(),
                definition: entry.definition.clone(),
                arity: formula.arity(),
                variables: formula.variables().map(str::to_string).collect(),
                description: entry.description.clone(),
            })
        })
        .collect()
}

pub fn list_command(config: &FormulactlConfig, output: Output) -> Result<()> {
    let listings = list(config)?;
    output.emit(&listings, |listings| {
        if listings.is_empty() {
            println!("{}", "No formulas configured".yellow());
        }
        for listing in listings {
            println!(
                "{} ({}) {}",
                listing.name.bright_yellow(),
                listing.arity,
                listing.definition
            );
            if let Some(description) = &listing.description {
                println!("    {}", description.dimmed());
            }
        }
    })
}

// ============================================================================
// functions
// ============================================================================

pub fn catalog() -> Catalog {
    let mut functions: Vec<Function> = builtin_functions::names()
        .map(|(name, arity)| Function { name, arity })
        .collect();
    functions.sort_by_key(|f| f.name);

    let constants = builtin_functions::CONSTANTS
        .iter()
        .filter_map(|&name| {
            builtin_functions::constant::<f64>(name.as_bytes()).map(|value| Constant { name, value })
        })
        .collect();

    Catalog {
        functions,
        constants,
    }
}

pub fn functions_command(output: Output) -> Result<()> {
    output.emit(&catalog(), |catalog| {
        for function in &catalog.functions {
            let params = if function.arity == 1 { "x" } else { "x, y" };
            println!("{}({})", function.name.bright_cyan(), params);
        }
        for constant in &catalog.constants {
            println!("{} = {}", constant.name.bright_cyan(), constant.value);
        }
    })
}

//! Formula - compiled expression with positional variables
//!
//! # Example
//! ```rust
//! use formula_core::Formula;
//!
//! let mut radius = Formula::<f64>::new();
//! radius.define("sqrt(x*x + y*y); x; y").unwrap();
//! assert_eq!(radius.arity(), 2);
//! assert_eq!(radius.evaluate(&[3.0, 4.0]), 5.0);
//! ```

use crate::declaration;
use crate::error::{FormulaError, Result};
use crate::evaluator;
use crate::node::{NodeId, NodeStore};
use crate::parser;
use num_traits::{Float, FloatConst};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// A formula compiled from text
///
/// A formula is either empty or fully defined. A failed [`Formula::define`]
/// always leaves it empty, never holding part of a tree or the previous one.
#[derive(Debug, Clone)]
pub struct Formula<T = f64> {
    /// Declared variable names, in declaration order
    names: Vec<String>,
    /// Current variable values, parallel to `names`
    slots: Vec<T>,
    store: NodeStore<T>,
    root: Option<NodeId>,
    text: String,
}

impl<T: Float + FloatConst> Default for Formula<T> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            slots: Vec::new(),
            store: NodeStore::new(),
            root: None,
            text: String::new(),
        }
    }
}

impl<T: Float + FloatConst> Formula<T> {
    /// Create an empty formula
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `text` into a new formula
    pub fn parse(text: &str) -> Result<Self> {
        let mut formula = Self::new();
        formula.define(text)?;
        Ok(formula)
    }

    /// Replace the current definition with `text`
    ///
    /// `text` is `<expression> [; <name>]*`. On error the formula is left
    /// empty and the error carries the byte offset into `text` where the
    /// failure was detected.
    ///
    /// # Limits
    /// Parsing recurses once per nesting level, so deeply nested text can
    /// overflow the thread's stack (see [`crate::parser`]).
    pub fn define(&mut self, text: &str) -> Result<()> {
        self.clear();

        let result = declaration::split(text).and_then(|declarations| {
            let root = parser::parse(
                declarations.expression,
                &declarations.variables,
                &mut self.store,
            )?;
            Ok((root, declarations.variables))
        });

        match result {
            Ok((root, variables)) => {
                self.names = variables.iter().map(|name| name.to_string()).collect();
                self.slots = vec![T::zero(); self.names.len()];
                self.root = Some(root);
                self.text = text.to_string();
                debug!(
                    arity = self.names.len(),
                    nodes = self.store.len(),
                    "formula defined"
                );
                Ok(())
            },
            Err(e) => {
                self.clear();
                debug!(error = %e, text, "formula definition failed");
                Err(e)
            },
        }
    }

    /// Discard the definition, leaving the formula empty
    pub fn clear(&mut self) {
        self.names.clear();
        self.slots.clear();
        self.store.clear();
        self.root = None;
        self.text.clear();
    }

    pub fn is_defined(&self) -> bool {
        self.root.is_some()
    }

    /// Number of declared variables
    pub fn arity(&self) -> usize {
        self.names.len()
    }

    /// Declared variable names, in positional order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Text of the current definition
    pub fn text(&self) -> Option<&str> {
        self.is_defined().then_some(self.text.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.store.len()
    }

    /// Bind `args` to the variables in declaration order and evaluate
    ///
    /// # Panics
    /// Panics if the formula is not defined or `args.len()` differs from
    /// [`Formula::arity`].
    pub fn evaluate(&mut self, args: &[T]) -> T {
        assert_eq!(
            args.len(),
            self.slots.len(),
            "formula expects {} arguments",
            self.slots.len()
        );
        self.slots.copy_from_slice(args);
        self.value()
    }

    /// Bind a single variable by position
    ///
    /// # Panics
    /// Panics if `index` is not below [`Formula::arity`].
    pub fn set_variable(&mut self, index: usize, value: T) {
        assert!(
            index < self.slots.len(),
            "variable index {} out of range for arity {}",
            index,
            self.slots.len()
        );
        self.slots[index] = value;
    }

    /// Bind variables by name and evaluate
    ///
    /// Every declared variable must be present in `values`; extra entries are
    /// ignored. Nothing is bound if a name is missing.
    pub fn evaluate_named(&mut self, values: &HashMap<String, T>) -> Result<T> {
        let bound = self
            .names
            .iter()
            .map(|name| {
                values
                    .get(name)
                    .copied()
                    .ok_or_else(|| FormulaError::variable_not_found(name))
            })
            .collect::<Result<Vec<T>>>()?;
        Ok(self.evaluate(&bound))
    }

    /// Evaluate with the current variable bindings
    ///
    /// Variables that were never bound evaluate as zero.
    ///
    /// # Panics
    /// Panics if the formula is not defined.
    ///
    /// # Limits
    /// Evaluation recurses once per tree level; a formula whose definition
    /// nested deeply enough to stress the stack while parsing needs the same
    /// stack here.
    pub fn value(&self) -> T {
        let Some(root) = self.root else {
            panic!("formula evaluated before a successful define");
        };
        evaluator::evaluate(&self.store, root, &self.slots)
    }
}

impl<T: Float + FloatConst> FromStr for Formula<T> {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
